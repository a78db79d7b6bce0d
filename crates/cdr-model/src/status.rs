//! Derived shipment statuses.
//!
//! Every status here is recomputed from raw dates on each run and never
//! stored as a transition. The string forms are what downstream consumers
//! (dashboards, the table store) already key on, so they must not change.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Lifecycle state written to `Current_Status`.
///
/// Conceptually `OnSea -> InStock -> Outbounded` for a well-formed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CurrentStatus {
    /// No inbound and no outbound date yet.
    OnSea,
    /// Received at a warehouse, or outbound planned in the future.
    InStock,
    /// Outbound date is today or earlier (or could not be parsed).
    Outbounded,
}

impl CurrentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CurrentStatus::OnSea => "On Sea",
            CurrentStatus::InStock => "In-Stock",
            CurrentStatus::Outbounded => "Outbounded",
        }
    }
}

impl fmt::Display for CurrentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CurrentStatus {
    type Err = ModelError;

    /// Case-insensitive; accepts the hyphen/space/underscore variants seen in exports.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|ch| ch.is_ascii_alphanumeric())
            .collect::<String>()
            .to_uppercase();
        match normalized.as_str() {
            "ONSEA" => Ok(CurrentStatus::OnSea),
            "INSTOCK" => Ok(CurrentStatus::InStock),
            "OUTBOUNDED" => Ok(CurrentStatus::Outbounded),
            _ => Err(ModelError::UnknownStatus {
                kind: "current status",
                value: s.to_string(),
            }),
        }
    }
}

/// Coarse outbound class written to `Outbound_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OutboundClass {
    NotOutbounded,
    OutboundPlanned,
    Outbounded,
}

impl OutboundClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutboundClass::NotOutbounded => "not-outbounded",
            OutboundClass::OutboundPlanned => "outbound-planned",
            OutboundClass::Outbounded => "outbounded",
        }
    }

    /// Classes that count as an outbound movement for the logistics report.
    pub fn is_outbound_movement(&self) -> bool {
        matches!(
            self,
            OutboundClass::OutboundPlanned | OutboundClass::Outbounded
        )
    }
}

impl fmt::Display for OutboundClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OutboundClass {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "not-outbounded" => Ok(OutboundClass::NotOutbounded),
            "outbound-planned" => Ok(OutboundClass::OutboundPlanned),
            "outbounded" => Ok(OutboundClass::Outbounded),
            _ => Err(ModelError::UnknownStatus {
                kind: "outbound class",
                value: s.to_string(),
            }),
        }
    }
}

/// Written to `Release_Status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReleaseStatus {
    Released,
    NotReleased,
}

impl ReleaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseStatus::Released => "Released",
            ReleaseStatus::NotReleased => "Not released",
        }
    }
}

impl fmt::Display for ReleaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Written to `Delivery_Status`. Depends on the whole dataset, not one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryStatus {
    /// The record's `Ref1` occurs more than once.
    Partial,
    Full,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Partial => "Partial_delivery",
            DeliveryStatus::Full => "Full_delivery",
        }
    }

    pub fn from_occurrences(count: usize) -> Self {
        if count > 1 {
            DeliveryStatus::Partial
        } else {
            DeliveryStatus::Full
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_status_parses_export_variants() {
        assert_eq!(
            "In-Stock".parse::<CurrentStatus>().unwrap(),
            CurrentStatus::InStock
        );
        assert_eq!(
            " in stock ".parse::<CurrentStatus>().unwrap(),
            CurrentStatus::InStock
        );
        assert_eq!(
            "On Sea".parse::<CurrentStatus>().unwrap(),
            CurrentStatus::OnSea
        );
        assert!("Delivered".parse::<CurrentStatus>().is_err());
    }

    #[test]
    fn outbound_class_round_trips_display() {
        for class in [
            OutboundClass::NotOutbounded,
            OutboundClass::OutboundPlanned,
            OutboundClass::Outbounded,
        ] {
            assert_eq!(class.to_string().parse::<OutboundClass>().unwrap(), class);
        }
    }

    #[test]
    fn delivery_status_from_occurrences() {
        assert_eq!(DeliveryStatus::from_occurrences(1), DeliveryStatus::Full);
        assert_eq!(DeliveryStatus::from_occurrences(2), DeliveryStatus::Partial);
        assert_eq!(DeliveryStatus::Partial.as_str(), "Partial_delivery");
    }
}

//! Lifecycle classification from raw dates.
//!
//! Every function here is pure: the same dates and reference date always
//! give the same status. The reference date is passed in, never read from
//! the clock.

use std::collections::HashMap;

use chrono::NaiveDate;

use cdr_model::{CurrentStatus, DateField, DeliveryStatus, OutboundClass, ReleaseStatus};

/// `Current_Status` decision table.
///
/// | outbound          | inbound  | status       |
/// |-------------------|----------|--------------|
/// | missing           | missing  | `OnSea`      |
/// | missing           | present  | `InStock`    |
/// | after reference   | any      | `InStock`    |
/// | on/before ref.    | any      | `Outbounded` |
/// | unparseable       | any      | `Outbounded` |
pub fn classify(outbound: &DateField, inbound: &DateField, reference: NaiveDate) -> CurrentStatus {
    match outbound {
        DateField::Missing if inbound.is_missing() => CurrentStatus::OnSea,
        DateField::Missing => CurrentStatus::InStock,
        DateField::Valid(date) if *date > reference => CurrentStatus::InStock,
        DateField::Valid(_) => CurrentStatus::Outbounded,
        DateField::Invalid(_) => CurrentStatus::Outbounded,
    }
}

/// The Unix epoch, which some exports write instead of leaving the cell empty.
fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// `Outbound_status`: coarse outbound class.
///
/// Unparseable dates give `NotOutbounded` here, unlike [`classify`].
pub fn classify_outbound(outbound: &DateField, reference: NaiveDate) -> OutboundClass {
    match outbound {
        DateField::Missing | DateField::Invalid(_) => OutboundClass::NotOutbounded,
        DateField::Valid(date) if *date == epoch() => OutboundClass::NotOutbounded,
        DateField::Valid(date) if *date > reference => OutboundClass::OutboundPlanned,
        DateField::Valid(_) => OutboundClass::Outbounded,
    }
}

/// `Release_Status`: released once a release date exists or the goods left.
pub fn classify_release(release_date: &DateField, current: CurrentStatus) -> ReleaseStatus {
    if !release_date.is_missing() || current == CurrentStatus::Outbounded {
        ReleaseStatus::Released
    } else {
        ReleaseStatus::NotReleased
    }
}

/// `Delivery_Status` for every key, relative to the whole dataset.
pub fn delivery_statuses<K: AsRef<str>>(keys: &[K]) -> Vec<DeliveryStatus> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for key in keys {
        *counts.entry(key.as_ref()).or_default() += 1;
    }
    keys.iter()
        .map(|key| DeliveryStatus::from_occurrences(counts.get(key.as_ref()).copied().unwrap_or(0)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn missing_dates() {
        let reference = ymd(2024, 1, 1);
        assert_eq!(
            classify(&DateField::Missing, &DateField::Missing, reference),
            CurrentStatus::OnSea
        );
        assert_eq!(
            classify(&DateField::Missing, &DateField::Valid(ymd(2023, 12, 1)), reference),
            CurrentStatus::InStock
        );
        assert_eq!(
            classify(&DateField::Missing, &DateField::Invalid("?".into()), reference),
            CurrentStatus::InStock
        );
    }

    #[test]
    fn outbound_boundary_is_inclusive() {
        let reference = ymd(2024, 1, 1);
        let inbound = DateField::Missing;
        assert_eq!(
            classify(&DateField::Valid(reference), &inbound, reference),
            CurrentStatus::Outbounded
        );
        assert_eq!(
            classify(&DateField::Valid(ymd(2024, 1, 2)), &inbound, reference),
            CurrentStatus::InStock
        );
        assert_eq!(
            classify(&DateField::Invalid("soon".into()), &inbound, reference),
            CurrentStatus::Outbounded
        );
    }

    #[test]
    fn outbound_class() {
        let reference = ymd(2024, 6, 15);
        assert_eq!(
            classify_outbound(&DateField::Valid(ymd(1970, 1, 1)), reference),
            OutboundClass::NotOutbounded
        );
        assert_eq!(
            classify_outbound(&DateField::Valid(ymd(2024, 6, 16)), reference),
            OutboundClass::OutboundPlanned
        );
        assert_eq!(
            classify_outbound(&DateField::Valid(reference), reference),
            OutboundClass::Outbounded
        );
        assert_eq!(
            classify_outbound(&DateField::Invalid("x".into()), reference),
            OutboundClass::NotOutbounded
        );
    }

    #[test]
    fn release_status() {
        assert_eq!(
            classify_release(&DateField::Missing, CurrentStatus::Outbounded),
            ReleaseStatus::Released
        );
        assert_eq!(
            classify_release(&DateField::Valid(ymd(2024, 1, 1)), CurrentStatus::OnSea),
            ReleaseStatus::Released
        );
        assert_eq!(
            classify_release(&DateField::Missing, CurrentStatus::InStock),
            ReleaseStatus::NotReleased
        );
    }

    #[test]
    fn delivery_status_counts_whole_dataset() {
        let keys = ["5XC7", "5XC7", "2AB1"];
        assert_eq!(
            delivery_statuses(&keys),
            vec![
                DeliveryStatus::Partial,
                DeliveryStatus::Partial,
                DeliveryStatus::Full
            ]
        );
    }
}

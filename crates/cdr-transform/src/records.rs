//! Typed record extraction from a shipment frame.

use cdr_ingest::parse_f64;
use cdr_model::ShipmentRecord;
use cdr_model::columns::{
    AGREED_DELIVERY_DATE, CONTAINER_NO, DELIVERY_DATE, INBOUND_DATE, OUTBOUND_DATE, PIECE,
    RELEASE_DATE, RELEASE_NUMBER, WATTAGE,
};
use polars::prelude::DataFrame;

use crate::data_utils::{optional_column_dates, optional_column_strings};
use crate::error::Result;
use crate::normalize::strip_special_chars;

/// Reads one [`ShipmentRecord`] per row.
///
/// Columns the frame does not carry read as missing. Identifiers are
/// normalized; quantities that do not parse are `None`.
pub fn records_from_frame(df: &DataFrame) -> Result<Vec<ShipmentRecord>> {
    let releases = optional_column_strings(df, RELEASE_NUMBER)?;
    let containers = optional_column_strings(df, CONTAINER_NO)?;
    let wattages = optional_column_strings(df, WATTAGE)?;
    let pieces = optional_column_strings(df, PIECE)?;
    let mut inbound = optional_column_dates(df, INBOUND_DATE)?.into_iter();
    let mut outbound = optional_column_dates(df, OUTBOUND_DATE)?.into_iter();
    let mut agreed = optional_column_dates(df, AGREED_DELIVERY_DATE)?.into_iter();
    let mut delivery = optional_column_dates(df, DELIVERY_DATE)?.into_iter();
    let mut release = optional_column_dates(df, RELEASE_DATE)?.into_iter();

    let mut records = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let wattage_text = wattages[idx].clone();
        records.push(ShipmentRecord {
            release_number: strip_special_chars(releases[idx].as_deref()),
            container_number: strip_special_chars(containers[idx].as_deref()),
            wattage: wattage_text.as_deref().and_then(parse_f64),
            wattage_text,
            piece: pieces[idx].as_deref().and_then(parse_f64),
            inbound_date: inbound.next().unwrap_or_default(),
            outbound_date: outbound.next().unwrap_or_default(),
            agreed_delivery_date: agreed.next().unwrap_or_default(),
            delivery_date: delivery.next().unwrap_or_default(),
            release_date: release.next().unwrap_or_default(),
        });
    }
    Ok(records)
}

//! Enrichment of raw `daily_report` rows before they become `current_report`.

use chrono::NaiveDate;
use polars::prelude::DataFrame;
use tracing::{debug, info};

use cdr_model::columns::{
    AGREED_DELIVERY_DATE, CONTAINER_NO, CURRENT_STATUS, DELIVERY_STATUS, IMPORT_INVOICE,
    MEGAWATTAGE, OUTBOUND_STATUS, POWER, REF1, REF2, RELEASE_NUMBER, RELEASE_STATUS, WATTAGE,
};
use cdr_model::schema::DAILY_TRANSFER_PROJECTION;
use cdr_model::{DateField, OutboundClass, RulesConfig};

use crate::classify::{classify, classify_outbound, classify_release, delivery_statuses};
use crate::data_utils::{
    column_strings, filter_rows, has_column, is_blank, optional_column_strings, set_f64s,
    set_strings,
};
use crate::error::Result;
use crate::filter::project;
use crate::normalize::{build_ref1, build_ref2, normalize_identifier_columns};
use crate::records::records_from_frame;

/// Row counts from one enrichment pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichStats {
    pub input_rows: usize,
    pub blank_container_rows: usize,
    pub archived_rows: usize,
    pub blanked_agreed_dates: usize,
    /// Outbound dates present but unparseable (classified fail-closed).
    pub invalid_outbound_dates: usize,
    pub output_rows: usize,
}

#[derive(Debug, Clone)]
pub struct Enriched {
    pub frame: DataFrame,
    pub stats: EnrichStats,
}

/// Derives keys, power and statuses for the daily transfer.
///
/// Rows without a container number are dropped first. Delivery status is
/// counted over every remaining row, before outbounded rows older than
/// `rules.archive_before_year` are removed.
pub fn enrich_daily(df: &DataFrame, rules: &RulesConfig, reference: NaiveDate) -> Result<Enriched> {
    let mut stats = EnrichStats {
        input_rows: df.height(),
        ..EnrichStats::default()
    };

    let containers = optional_column_strings(df, CONTAINER_NO)?;
    let keep: Vec<bool> = containers.iter().map(|c| !is_blank(c.as_deref())).collect();
    let mut frame = filter_rows(df, &keep)?;
    stats.blank_container_rows = stats.input_rows - frame.height();

    normalize_identifier_columns(&mut frame, &[CONTAINER_NO, RELEASE_NUMBER, IMPORT_INVOICE])?;
    let records = records_from_frame(&frame)?;

    let power: Vec<Option<f64>> = records.iter().map(|r| r.power()).collect();
    let megawattage: Vec<Option<f64>> = records.iter().map(|r| r.megawattage()).collect();
    let ref1: Vec<String> = records
        .iter()
        .map(|r| build_ref1(r.release_number.as_deref(), r.container_number.as_deref()))
        .collect();
    let ref2: Vec<Option<String>> = if has_column(&frame, WATTAGE) {
        records
            .iter()
            .map(|r| {
                Some(build_ref2(
                    r.release_number.as_deref(),
                    r.container_number.as_deref(),
                    r.wattage_text.as_deref(),
                ))
            })
            .collect()
    } else {
        vec![None; records.len()]
    };

    let mut current = Vec::with_capacity(records.len());
    let mut outbound = Vec::with_capacity(records.len());
    let mut release = Vec::with_capacity(records.len());
    for record in &records {
        if matches!(record.outbound_date, DateField::Invalid(_)) {
            stats.invalid_outbound_dates += 1;
        }
        let status = classify(&record.outbound_date, &record.inbound_date, reference);
        current.push(status);
        outbound.push(classify_outbound(&record.outbound_date, reference));
        release.push(classify_release(&record.release_date, status));
    }
    let delivery = delivery_statuses(&ref1);

    set_f64s(&mut frame, POWER, power)?;
    set_f64s(&mut frame, MEGAWATTAGE, megawattage)?;
    set_strings(&mut frame, REF1, ref1.into_iter().map(Some).collect())?;
    set_strings(&mut frame, REF2, ref2)?;
    set_strings(&mut frame, CURRENT_STATUS, as_strings(&current))?;
    set_strings(&mut frame, OUTBOUND_STATUS, as_strings(&outbound))?;
    set_strings(&mut frame, RELEASE_STATUS, as_strings(&release))?;
    set_strings(&mut frame, DELIVERY_STATUS, as_strings(&delivery))?;

    let keep: Vec<bool> = records
        .iter()
        .zip(&outbound)
        .map(|(record, class)| {
            !(*class == OutboundClass::Outbounded
                && record
                    .outbound_date
                    .year()
                    .is_some_and(|year| year < rules.archive_before_year))
        })
        .collect();
    let archived_before = frame.height();
    frame = filter_rows(&frame, &keep)?;
    stats.archived_rows = archived_before - frame.height();

    if has_column(&frame, AGREED_DELIVERY_DATE) {
        stats.blanked_agreed_dates =
            blank_placeholder_dates(&mut frame, &rules.placeholder_agreed_years)?;
    }

    let frame = project(&frame, &DAILY_TRANSFER_PROJECTION)?;
    stats.output_rows = frame.height();

    if stats.invalid_outbound_dates > 0 {
        debug!(
            count = stats.invalid_outbound_dates,
            "unparseable outbound dates classified as outbounded"
        );
    }
    info!(
        input = stats.input_rows,
        blank_container = stats.blank_container_rows,
        archived = stats.archived_rows,
        blanked_agreed = stats.blanked_agreed_dates,
        output = stats.output_rows,
        "enriched daily rows"
    );

    Ok(Enriched { frame, stats })
}

fn as_strings<T: ToString>(values: &[T]) -> Vec<Option<String>> {
    values.iter().map(|value| Some(value.to_string())).collect()
}

/// Nulls agreed delivery dates whose year is a known placeholder.
fn blank_placeholder_dates(frame: &mut DataFrame, years: &[i32]) -> Result<usize> {
    let raw = column_strings(frame, AGREED_DELIVERY_DATE)?;
    let mut blanked = 0;
    let values = raw
        .into_iter()
        .map(|value| {
            let year = cdr_ingest::parse_date(value.as_deref()).year();
            if year.is_some_and(|year| years.contains(&year)) {
                blanked += 1;
                None
            } else {
                value
            }
        })
        .collect();
    set_strings(frame, AGREED_DELIVERY_DATE, values)?;
    Ok(blanked)
}

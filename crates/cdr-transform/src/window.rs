//! Date windows anchored on the run's reference date.

use chrono::{Datelike, NaiveDate};

use cdr_model::DateField;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// First of the reference month through the reference date, inclusive.
    MonthToDate,
    /// The whole reference month, including future days.
    CurrentMonth,
    /// Exactly the reference date.
    Day,
}

impl Window {
    pub fn contains(&self, date: NaiveDate, reference: NaiveDate) -> bool {
        match self {
            Window::MonthToDate => date <= reference && date >= first_of_month(reference),
            Window::CurrentMonth => {
                date.year() == reference.year() && date.month() == reference.month()
            }
            Window::Day => date == reference,
        }
    }
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// One flag per date; missing and unparseable dates are outside every window.
pub fn window_mask(dates: &[DateField], window: Window, reference: NaiveDate) -> Vec<bool> {
    dates
        .iter()
        .map(|date| date.date().is_some_and(|d| window.contains(d, reference)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_to_date_bounds_are_inclusive() {
        let reference = ymd(2025, 3, 10);
        assert!(Window::MonthToDate.contains(ymd(2025, 3, 1), reference));
        assert!(Window::MonthToDate.contains(reference, reference));
        assert!(!Window::MonthToDate.contains(ymd(2025, 3, 11), reference));
        assert!(!Window::MonthToDate.contains(ymd(2025, 2, 28), reference));
    }

    #[test]
    fn current_month_includes_future_days() {
        let reference = ymd(2025, 3, 10);
        assert!(Window::CurrentMonth.contains(ymd(2025, 3, 31), reference));
        assert!(!Window::CurrentMonth.contains(ymd(2024, 3, 5), reference));
    }

    #[test]
    fn mask_skips_missing_dates() {
        let reference = ymd(2025, 3, 10);
        let dates = vec![
            DateField::Valid(ymd(2025, 3, 2)),
            DateField::Missing,
            DateField::Invalid("x".into()),
        ];
        assert_eq!(
            window_mask(&dates, Window::MonthToDate, reference),
            vec![true, false, false]
        );
    }
}

//! Calendar helpers: month proration and Finnish date formatting

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

/// Day after `date`, saturating at the last representable date
pub fn next_day(date: NaiveDate) -> NaiveDate {
    date.succ_opt().unwrap_or(NaiveDate::MAX)
}

/// Day before `date`, saturating at the first representable date
pub fn previous_day(date: NaiveDate) -> NaiveDate {
    date.pred_opt().unwrap_or(NaiveDate::MIN)
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn first_of_next_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MAX)
}

/// Number of days in the calendar month containing `date`
pub fn days_in_month(date: NaiveDate) -> i64 {
    (first_of_next_month(date) - first_of_month(date)).num_days()
}

/// Length of the inclusive range `[start, end]` in months.
///
/// Each calendar month touched by the range counts as the share of its days
/// that fall inside the range, so 1.1.-31.3. is exactly 3 and 1.1.-15.1. is 15/31.
/// Rounded to two decimals. An empty range (end before start) is zero.
pub fn duration_in_months(start: NaiveDate, end: NaiveDate) -> Decimal {
    let mut months = Decimal::ZERO;
    let mut cursor = start;

    while cursor <= end {
        let month_end = previous_day(first_of_next_month(cursor));
        let segment_end = month_end.min(end);
        let days = (segment_end - cursor).num_days() + 1;

        months += Decimal::from(days) / Decimal::from(days_in_month(cursor));

        if segment_end == NaiveDate::MAX {
            break;
        }
        cursor = next_day(segment_end);
    }

    months.round_dp(2)
}

/// dd.mm.yyyy, as shown in row descriptions
pub fn format_fi(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

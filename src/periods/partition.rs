//! Split a calculation period into sub-ranges with constant modifiers
//!
//! A sub-range boundary falls wherever a pay subsidy or training compensation
//! starts or stops inside the calculation period. Each sub-range records the
//! pay subsidy and training compensation in effect on its first day.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::months::{next_day, previous_day};
use crate::application::{PaySubsidy, TrainingCompensation};
use crate::error::{CalculatorError, Result};

/// A period during which the same modifiers apply. Dates are inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct BenefitSubRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub pay_subsidy: Option<PaySubsidy>,
    pub training_compensation: Option<TrainingCompensation>,
}

impl BenefitSubRange {
    pub fn has_modifiers(&self) -> bool {
        self.pay_subsidy.is_some() || self.training_compensation.is_some()
    }
}

/// Anything with an id and an inclusive validity period
pub trait ModifierPeriod: Clone {
    fn id(&self) -> u64;
    fn dates(&self) -> Option<(NaiveDate, NaiveDate)>;
}

impl ModifierPeriod for PaySubsidy {
    fn id(&self) -> u64 {
        self.id
    }

    fn dates(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.start_date.zip(self.end_date)
    }
}

impl ModifierPeriod for TrainingCompensation {
    fn id(&self) -> u64 {
        self.id
    }

    fn dates(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.start_date, self.end_date))
    }
}

/// Modifier with validated dates
#[derive(Debug, Clone)]
struct Dated<T> {
    start: NaiveDate,
    end: NaiveDate,
    item: T,
}

impl<T> Dated<T> {
    fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

/// Validate dates and sort by start date, then id.
/// Overlapping modifiers resolve to the earliest-starting one.
fn dated<T: ModifierPeriod>(items: &[T], kind: &str) -> Result<Vec<Dated<T>>> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let (start, end) = item.dates().ok_or_else(|| {
            CalculatorError::Input(format!("{} {} is missing start or end date", kind, item.id()))
        })?;
        if start > end {
            return Err(CalculatorError::Input(format!(
                "{} {} ends ({}) before it starts ({})",
                kind,
                item.id(),
                end,
                start
            )));
        }
        out.push(Dated { start, end, item: item.clone() });
    }
    out.sort_by_key(|d| (d.start, d.item.id()));
    Ok(out)
}

fn merge_dated(subsidies: Vec<Dated<PaySubsidy>>) -> Vec<Dated<PaySubsidy>> {
    let mut merged: Vec<Dated<PaySubsidy>> = Vec::with_capacity(subsidies.len());
    for next in subsidies {
        if let Some(last) = merged.last_mut() {
            if next_day(last.end) == next.start && last.item.same_terms(&next.item) {
                last.end = next.end;
                last.item.end_date = Some(next.end);
                continue;
            }
        }
        merged.push(next);
    }
    merged
}

/// Merge date-adjacent pay subsidies with identical terms into one period.
///
/// Handlers sometimes enter one subsidy decision as several consecutive
/// records; merging them keeps those seams out of the sub-range split.
/// The merged period keeps the id of its first record.
pub fn merge_compatible_subsidies(subsidies: &[PaySubsidy]) -> Result<Vec<PaySubsidy>> {
    Ok(merge_dated(dated(subsidies, "pay subsidy")?)
        .into_iter()
        .map(|d| d.item)
        .collect())
}

fn item_in_effect<T: Clone>(items: &[Dated<T>], day: NaiveDate) -> Option<T> {
    items.iter().find(|d| d.contains(day)).map(|d| d.item.clone())
}

/// Split `[calc_start, calc_end]` into contiguous sub-ranges.
///
/// Every modifier must have both dates set. The result is sorted, does not
/// overlap, and covers the calculation period exactly.
pub fn partition(
    calc_start: NaiveDate,
    calc_end: NaiveDate,
    pay_subsidies: &[PaySubsidy],
    training_compensations: &[TrainingCompensation],
) -> Result<Vec<BenefitSubRange>> {
    if calc_start > calc_end {
        return Err(CalculatorError::Input(format!(
            "calculation ends ({}) before it starts ({})",
            calc_end, calc_start
        )));
    }

    let subsidies = merge_dated(dated(pay_subsidies, "pay subsidy")?);
    let compensations = dated(training_compensations, "training compensation")?;

    // Exclusive end: the first day after the calculation
    let calc_end_exclusive = next_day(calc_end);

    let mut change_days = BTreeSet::new();
    change_days.insert(calc_start);
    change_days.insert(calc_end_exclusive);

    let bounds = subsidies
        .iter()
        .map(|d| (d.start, d.end))
        .chain(compensations.iter().map(|d| (d.start, d.end)));
    for (start, end) in bounds {
        if start > calc_start && start < calc_end_exclusive {
            change_days.insert(start);
        }
        // end is the last day in effect, so the change happens the day after
        if end >= calc_start && end < calc_end {
            change_days.insert(next_day(end));
        }
    }

    let days: Vec<NaiveDate> = change_days.into_iter().collect();
    let ranges: Vec<BenefitSubRange> = days
        .windows(2)
        .map(|pair| BenefitSubRange {
            start_date: pair[0],
            end_date: previous_day(pair[1]),
            pay_subsidy: item_in_effect(&subsidies, pair[0]),
            training_compensation: item_in_effect(&compensations, pair[0]),
        })
        .collect();

    match (ranges.first(), ranges.last()) {
        (Some(first), Some(last)) if first.start_date == calc_start && last.end_date == calc_end => {}
        (None, _) | (_, None) => {
            return Err(CalculatorError::consistency(format!(
                "no sub-ranges produced for {} - {}",
                calc_start, calc_end
            )));
        }
        (Some(first), Some(last)) => {
            return Err(CalculatorError::consistency(format!(
                "sub-ranges cover {} - {}, expected {} - {}",
                first.start_date, last.end_date, calc_start, calc_end
            )));
        }
    }

    log::debug!(
        "partitioned {} - {} into {} sub-ranges",
        calc_start,
        calc_end,
        ranges.len()
    );
    Ok(ranges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn assert_covers(ranges: &[BenefitSubRange], start: NaiveDate, end: NaiveDate) {
        assert!(!ranges.is_empty());
        assert_eq!(ranges[0].start_date, start);
        assert_eq!(ranges.last().unwrap().end_date, end);
        for range in ranges {
            assert!(range.start_date <= range.end_date);
        }
        for pair in ranges.windows(2) {
            assert_eq!(next_day(pair[0].end_date), pair[1].start_date);
        }
    }

    #[test]
    fn test_no_modifiers_single_range() {
        let ranges = partition(date(2024, 1, 1), date(2024, 3, 31), &[], &[]).unwrap();
        assert_eq!(ranges.len(), 1);
        assert!(!ranges[0].has_modifiers());
        assert_covers(&ranges, date(2024, 1, 1), date(2024, 3, 31));
    }

    #[test]
    fn test_modifier_equal_to_full_range() {
        let subsidy = PaySubsidy::new(1, date(2024, 1, 1), date(2024, 3, 31), 100);
        let ranges = partition(date(2024, 1, 1), date(2024, 3, 31), &[subsidy.clone()], &[]).unwrap();

        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].pay_subsidy, Some(subsidy));
    }

    #[test]
    fn test_subsidy_covers_first_half() {
        let subsidy = PaySubsidy::new(1, date(2024, 1, 1), date(2024, 2, 29), 50);
        let ranges = partition(date(2024, 1, 1), date(2024, 4, 30), &[subsidy], &[]).unwrap();

        assert_eq!(ranges.len(), 2);
        assert_eq!((ranges[0].start_date, ranges[0].end_date), (date(2024, 1, 1), date(2024, 2, 29)));
        assert_eq!((ranges[1].start_date, ranges[1].end_date), (date(2024, 3, 1), date(2024, 4, 30)));
        assert!(ranges[0].pay_subsidy.is_some());
        assert!(ranges[1].pay_subsidy.is_none());
    }

    #[test]
    fn test_gapped_and_mixed_modifiers() {
        let subsidies = vec![
            PaySubsidy::new(1, date(2024, 1, 1), date(2024, 1, 31), 100),
            PaySubsidy::new(2, date(2024, 3, 1), date(2024, 6, 30), 50),
        ];
        let compensations = vec![TrainingCompensation::new(
            7,
            date(2024, 2, 15),
            date(2024, 3, 15),
            dec!(300),
        )];

        let ranges = partition(date(2024, 1, 1), date(2024, 4, 30), &subsidies, &compensations).unwrap();
        assert_covers(&ranges, date(2024, 1, 1), date(2024, 4, 30));

        let starts: Vec<NaiveDate> = ranges.iter().map(|r| r.start_date).collect();
        assert_eq!(
            starts,
            vec![
                date(2024, 1, 1),
                date(2024, 2, 1),
                date(2024, 2, 15),
                date(2024, 3, 1),
                date(2024, 3, 16),
            ]
        );

        let ids: Vec<(Option<u64>, Option<u64>)> = ranges
            .iter()
            .map(|r| (r.pay_subsidy.as_ref().map(|p| p.id), r.training_compensation.as_ref().map(|t| t.id)))
            .collect();
        assert_eq!(
            ids,
            vec![
                (Some(1), None),
                (None, None),
                (None, Some(7)),
                (Some(2), Some(7)),
                (Some(2), None),
            ]
        );
    }

    #[test]
    fn test_out_of_range_modifiers_ignored() {
        let subsidies = vec![
            PaySubsidy::new(1, date(2023, 1, 1), date(2023, 12, 31), 100),
            PaySubsidy::new(2, date(2024, 6, 1), date(2024, 12, 31), 70),
        ];
        let ranges = partition(date(2024, 1, 1), date(2024, 3, 31), &subsidies, &[]).unwrap();

        assert_eq!(ranges.len(), 1);
        assert!(ranges[0].pay_subsidy.is_none());
    }

    #[test]
    fn test_modifier_overhanging_both_ends() {
        let subsidy = PaySubsidy::new(1, date(2023, 12, 1), date(2024, 5, 31), 70);
        let ranges = partition(date(2024, 1, 1), date(2024, 3, 31), &[subsidy], &[]).unwrap();

        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].pay_subsidy.as_ref().map(|p| p.id), Some(1));
    }

    #[test]
    fn test_adjacent_identical_subsidies_merged() {
        let subsidies = vec![
            PaySubsidy::new(2, date(2024, 2, 1), date(2024, 3, 31), 50),
            PaySubsidy::new(1, date(2024, 1, 1), date(2024, 1, 31), 50),
        ];
        let merged = merge_compatible_subsidies(&subsidies).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id, 1);
        assert_eq!(merged[0].end_date, Some(date(2024, 3, 31)));

        let ranges = partition(date(2024, 1, 1), date(2024, 3, 31), &subsidies, &[]).unwrap();
        assert_eq!(ranges.len(), 1);
    }

    #[test]
    fn test_adjacent_different_terms_not_merged() {
        let subsidies = vec![
            PaySubsidy::new(1, date(2024, 1, 1), date(2024, 1, 31), 50),
            PaySubsidy::new(2, date(2024, 2, 1), date(2024, 3, 31), 50).with_work_time_percent(dec!(60)),
            PaySubsidy::new(3, date(2024, 4, 2), date(2024, 4, 30), 50),
        ];
        let merged = merge_compatible_subsidies(&subsidies).unwrap();
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_overlap_resolves_to_earliest_start() {
        let subsidies = vec![
            PaySubsidy::new(9, date(2024, 2, 1), date(2024, 3, 31), 100),
            PaySubsidy::new(4, date(2024, 1, 1), date(2024, 2, 29), 50),
        ];
        let ranges = partition(date(2024, 1, 1), date(2024, 3, 31), &subsidies, &[]).unwrap();

        let ids: Vec<u64> = ranges.iter().filter_map(|r| r.pay_subsidy.as_ref().map(|p| p.id)).collect();
        // 1.1.-31.1. and 1.2.-29.2. belong to id 4, March to id 9
        assert_eq!(ids, vec![4, 4, 9]);
    }

    #[test]
    fn test_invalid_input() {
        let err = partition(date(2024, 2, 1), date(2024, 1, 1), &[], &[]).unwrap_err();
        assert!(matches!(err, CalculatorError::Input(_)));

        let mut undated = PaySubsidy::new(1, date(2024, 1, 1), date(2024, 1, 31), 50);
        undated.end_date = None;
        let err = partition(date(2024, 1, 1), date(2024, 3, 31), &[undated], &[]).unwrap_err();
        assert!(matches!(err, CalculatorError::Input(_)));
    }

    #[test]
    fn test_single_day_calculation() {
        let subsidy = PaySubsidy::new(1, date(2024, 1, 1), date(2024, 1, 1), 100);
        let ranges = partition(date(2024, 1, 1), date(2024, 1, 1), &[subsidy], &[]).unwrap();
        assert_eq!(ranges.len(), 1);
        assert_covers(&ranges, date(2024, 1, 1), date(2024, 1, 1));
    }

    #[test]
    fn test_coverage_over_many_layouts() {
        let calc_start = date(2024, 1, 1);
        let calc_end = date(2024, 12, 31);

        for offset in 0..40u64 {
            let start = calc_start + chrono::Days::new(offset * 7);
            let end = start + chrono::Days::new(20 + offset * 3);
            let subsidies = vec![PaySubsidy::new(1, start, end, 100)];
            let compensations = vec![TrainingCompensation::new(
                2,
                start + chrono::Days::new(10),
                end + chrono::Days::new(45),
                dec!(250),
            )];

            let ranges = partition(calc_start, calc_end, &subsidies, &compensations).unwrap();
            assert_covers(&ranges, calc_start, calc_end);
        }
    }
}

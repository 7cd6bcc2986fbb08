//! CSV-based rule loader
//!
//! Loads rule parameters from CSV files in data/rules/

use crate::error::{CalculatorError, Result};
use rust_decimal::Decimal;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

/// Default path to the rules directory
pub const DEFAULT_RULES_PATH: &str = "data/rules";

/// Marker in pay_subsidy_caps.csv for the cap used by every other percent
const OTHER_PERCENT: &str = "other";

fn parse_decimal(value: &str) -> Result<Decimal> {
    Decimal::from_str(value.trim())
        .map_err(|err| CalculatorError::Parse(format!("invalid amount {:?}: {}", value, err)))
}

/// Load pay subsidy caps from CSV
/// Returns the exact-percent tiers and the cap for all other percents
pub fn load_pay_subsidy_caps(path: &Path) -> Result<(Vec<(u32, Decimal)>, Decimal)> {
    let file = File::open(path.join("pay_subsidy_caps.csv"))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut tiers = Vec::new();
    let mut default_cap = None;

    for result in reader.records() {
        let record = result?;
        let percent = record[0].trim();
        let cap = parse_decimal(&record[1])?;

        if percent == OTHER_PERCENT {
            default_cap = Some(cap);
        } else {
            let percent: u32 = percent
                .parse()
                .map_err(|_| CalculatorError::Parse(format!("invalid percent {:?}", percent)))?;
            tiers.push((percent, cap));
        }
    }

    let default_cap = default_cap.ok_or_else(|| {
        CalculatorError::Parse(format!("pay_subsidy_caps.csv has no {:?} row", OTHER_PERCENT))
    })?;

    Ok((tiers, default_cap))
}

/// Load named benefit limits from CSV
/// Returns (salary benefit monthly max, employment benefit monthly amount)
pub fn load_benefit_limits(path: &Path) -> Result<(Decimal, Decimal)> {
    let file = File::open(path.join("benefit_limits.csv"))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut salary_max = None;
    let mut employment_monthly = None;

    for result in reader.records() {
        let record = result?;
        let amount = parse_decimal(&record[1])?;
        match record[0].trim() {
            "salary_benefit_max_monthly" => salary_max = Some(amount),
            "employment_benefit_monthly" => employment_monthly = Some(amount),
            other => log::warn!("ignoring unknown benefit limit {:?}", other),
        }
    }

    match (salary_max, employment_monthly) {
        (Some(salary_max), Some(employment_monthly)) => Ok((salary_max, employment_monthly)),
        _ => Err(CalculatorError::Parse(
            "benefit_limits.csv must define salary_benefit_max_monthly and employment_benefit_monthly"
                .to_string(),
        )),
    }
}

/// All rule parameters loaded from one directory
pub struct LoadedRules {
    pub pay_subsidy_tiers: Vec<(u32, Decimal)>,
    pub pay_subsidy_default_cap: Decimal,
    pub salary_benefit_max_monthly: Decimal,
    pub employment_benefit_monthly: Decimal,
}

impl LoadedRules {
    /// Load all rules from the default path
    pub fn load_default() -> Result<Self> {
        Self::load_from(Path::new(DEFAULT_RULES_PATH))
    }

    /// Load all rules from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let (pay_subsidy_tiers, pay_subsidy_default_cap) = load_pay_subsidy_caps(path)?;
        let (salary_benefit_max_monthly, employment_benefit_monthly) = load_benefit_limits(path)?;

        Ok(Self {
            pay_subsidy_tiers,
            pay_subsidy_default_cap,
            salary_benefit_max_monthly,
            employment_benefit_monthly,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_load_default_rules() {
        let result = LoadedRules::load_default();
        assert!(result.is_ok(), "Failed to load rules: {:?}", result.err());

        let rules = result.unwrap();
        assert!(rules.pay_subsidy_tiers.contains(&(100, dec!(2020))));
        assert!(rules.pay_subsidy_tiers.contains(&(70, dec!(1770))));
        assert_eq!(rules.pay_subsidy_default_cap, dec!(1260));
        assert_eq!(rules.salary_benefit_max_monthly, dec!(800));
        assert_eq!(rules.employment_benefit_monthly, dec!(500));
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let result = LoadedRules::load_from(Path::new("data/no-such-rules"));
        assert!(matches!(result, Err(CalculatorError::Io(_))));
    }
}

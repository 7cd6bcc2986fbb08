//! Benefit rule parameters: pay subsidy caps and monthly benefit amounts

mod tables;
pub mod loader;

pub use tables::{EmploymentBenefitRules, PaySubsidyCapTable, SalaryBenefitRules};
pub use loader::LoadedRules;

use crate::error::Result;
use std::path::Path;

/// Container for all rule parameters used by the strategies
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    pub salary: SalaryBenefitRules,
    pub employment: EmploymentBenefitRules,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::default_2023()
    }
}

impl RuleSet {
    /// Rules in effect from 1.7.2023
    pub fn default_2023() -> Self {
        Self {
            salary: SalaryBenefitRules::default(),
            employment: EmploymentBenefitRules::default(),
        }
    }

    /// Load rules from CSV files in the default location (data/rules/)
    pub fn from_csv() -> Result<Self> {
        Self::from_csv_path(Path::new(loader::DEFAULT_RULES_PATH))
    }

    /// Load rules from CSV files in a specific directory
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let loaded = LoadedRules::load_from(path)?;
        log::info!("loaded benefit rules from {}", path.display());

        Ok(Self {
            salary: SalaryBenefitRules::from_loaded(&loaded),
            employment: EmploymentBenefitRules::from_loaded(&loaded),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_rules_match_builtin_defaults() {
        let from_csv = RuleSet::from_csv().expect("Failed to load rules");
        let builtin = RuleSet::default_2023();

        assert_eq!(from_csv.salary.max_monthly_benefit, builtin.salary.max_monthly_benefit);
        assert_eq!(from_csv.employment.monthly_amount, builtin.employment.monthly_amount);
        for percent in [30, 40, 50, 70, 100] {
            assert_eq!(
                from_csv.salary.pay_subsidy_caps.max_monthly(percent),
                builtin.salary.pay_subsidy_caps.max_monthly(percent),
            );
        }
    }
}

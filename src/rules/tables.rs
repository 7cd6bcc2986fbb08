//! Rule parameter tables for the salary and employment benefit formulas

use rust_decimal::Decimal;
use super::loader::LoadedRules;

/// Maximum monthly pay subsidy by subsidy percent
#[derive(Debug, Clone, PartialEq)]
pub struct PaySubsidyCapTable {
    /// (subsidy percent, monthly cap) pairs with an exact percent match
    tiers: Vec<(u32, Decimal)>,
    /// Cap for any percent without its own tier
    default_cap: Decimal,
}

impl PaySubsidyCapTable {
    pub fn new(tiers: Vec<(u32, Decimal)>, default_cap: Decimal) -> Self {
        Self { tiers, default_cap }
    }

    /// Caps in effect from 1.7.2023
    pub fn rules_2023() -> Self {
        Self {
            tiers: vec![
                (100, Decimal::from(2020)),
                (70, Decimal::from(1770)),
            ],
            default_cap: Decimal::from(1260),
        }
    }

    pub fn from_loaded(loaded: &LoadedRules) -> Self {
        Self {
            tiers: loaded.pay_subsidy_tiers.clone(),
            default_cap: loaded.pay_subsidy_default_cap,
        }
    }

    /// Monthly cap for the given subsidy percent
    pub fn max_monthly(&self, pay_subsidy_percent: u32) -> Decimal {
        self.tiers
            .iter()
            .find(|(percent, _)| *percent == pay_subsidy_percent)
            .map(|(_, cap)| *cap)
            .unwrap_or(self.default_cap)
    }
}

/// Salary benefit rules (1.7.2023 onwards)
#[derive(Debug, Clone, PartialEq)]
pub struct SalaryBenefitRules {
    pub pay_subsidy_caps: PaySubsidyCapTable,
    /// Monthly ceiling of the salary benefit itself
    pub max_monthly_benefit: Decimal,
}

impl Default for SalaryBenefitRules {
    fn default() -> Self {
        Self {
            pay_subsidy_caps: PaySubsidyCapTable::rules_2023(),
            max_monthly_benefit: Decimal::from(800),
        }
    }
}

impl SalaryBenefitRules {
    pub fn from_loaded(loaded: &LoadedRules) -> Self {
        Self {
            pay_subsidy_caps: PaySubsidyCapTable::from_loaded(loaded),
            max_monthly_benefit: loaded.salary_benefit_max_monthly,
        }
    }
}

/// Employment benefit rules (2021 onwards): a flat monthly rate
#[derive(Debug, Clone, PartialEq)]
pub struct EmploymentBenefitRules {
    pub monthly_amount: Decimal,
}

impl Default for EmploymentBenefitRules {
    fn default() -> Self {
        Self {
            monthly_amount: Decimal::from(500),
        }
    }
}

impl EmploymentBenefitRules {
    pub fn from_loaded(loaded: &LoadedRules) -> Self {
        Self {
            monthly_amount: loaded.employment_benefit_monthly,
        }
    }
}

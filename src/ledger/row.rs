//! Ledger row types and committed rows

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of a ledger row, the key used for "latest amount of type X" lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowType {
    /// Heading or date-range label without an amount
    Description,
    SalaryCostsEur,
    StateAidMaxMonthlyEur,
    PaySubsidyMonthlyEur,
    TrainingCompensationMonthlyEur,
    /// Pay subsidy plus training compensation per month
    DeductionsTotalEur,
    HelsinkiBenefitMonthlyEur,
    HelsinkiBenefitSubTotalEur,
    /// Terminal total; its latest amount is the calculated benefit
    HelsinkiBenefitTotalEur,
}

impl RowType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowType::Description => "description",
            RowType::SalaryCostsEur => "salary_costs_eur",
            RowType::StateAidMaxMonthlyEur => "state_aid_max_monthly_eur",
            RowType::PaySubsidyMonthlyEur => "pay_subsidy_monthly_eur",
            RowType::TrainingCompensationMonthlyEur => "training_compensation_monthly_eur",
            RowType::DeductionsTotalEur => "deductions_total_eur",
            RowType::HelsinkiBenefitMonthlyEur => "helsinki_benefit_monthly_eur",
            RowType::HelsinkiBenefitSubTotalEur => "helsinki_benefit_sub_total_eur",
            RowType::HelsinkiBenefitTotalEur => "helsinki_benefit_total_eur",
        }
    }

    pub fn is_total(&self) -> bool {
        matches!(self, RowType::HelsinkiBenefitTotalEur)
    }
}

/// One committed ledger row. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRow {
    pub row_type: RowType,
    /// Position in the ledger, starting from 0
    pub ordering: u32,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// None for description rows
    pub amount: Option<Decimal>,
    pub description_fi: String,
}

impl CalculationRow {
    pub fn has_amount(&self) -> bool {
        self.amount.is_some()
    }
}

/// Amount of the latest total row, the authoritative result of a ledger
pub fn total_amount(rows: &[CalculationRow]) -> Option<Decimal> {
    rows.iter()
        .filter(|row| row.row_type.is_total())
        .max_by_key(|row| row.ordering)
        .and_then(|row| row.amount)
}

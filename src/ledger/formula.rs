//! Row formulas: how each kind of ledger row derives its amount
//!
//! A formula sees the calculation inputs and the rows created before it.
//! Lookups of earlier rows go through [`LedgerBuilder::amount_of`], which
//! returns the latest row of the requested type.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::builder::LedgerBuilder;
use super::row::RowType;
use crate::application::Calculation;
use crate::error::{CalculatorError, Result};
use crate::periods::{duration_in_months, format_fi};

/// A ledger row before it is appended
#[derive(Debug, Clone, PartialEq)]
pub enum RowFormula {
    Description {
        text: String,
    },
    /// Label such as "Ajalta 01.01.2024 - 29.02.2024"
    DateRangeDescription {
        prefix: String,
        start: NaiveDate,
        end: NaiveDate,
    },
    /// Monthly pay + other expenses + vacation money spread over the period
    SalaryCosts,
    /// Salary costs times the state aid max percentage
    StateAidMaxMonthly,
    PaySubsidyMonthly {
        pay_subsidy_percent: u32,
        work_time_percent: Decimal,
        /// Tier cap for a full-time employee
        max_subsidy: Decimal,
    },
    TrainingCompensationMonthly {
        monthly_amount: Decimal,
    },
    TotalDeductionsMonthly {
        monthly_deductions: Decimal,
    },
    SalaryBenefitMonthly {
        max_benefit: Decimal,
        monthly_deductions: Decimal,
    },
    SalaryBenefitSubTotal {
        start: NaiveDate,
        end: NaiveDate,
    },
    SalaryBenefitSumSubTotals {
        start: NaiveDate,
        end: NaiveDate,
    },
    /// Monthly benefit over the whole period; dates may be absent for the dummy ledger
    SalaryBenefitTotal {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
    EmployeeBenefitMonthly {
        monthly_amount: Decimal,
    },
    EmployeeBenefitTotal {
        start: NaiveDate,
        end: NaiveDate,
    },
    ManualOverrideTotal {
        amount: Decimal,
        start: NaiveDate,
        end: NaiveDate,
    },
}

fn cents(amount: Decimal) -> Decimal {
    amount.round_dp(2)
}

fn percent_of(amount: Decimal, percent: Decimal) -> Decimal {
    amount * percent / Decimal::ONE_HUNDRED
}

fn date_range_fi(start: NaiveDate, end: NaiveDate) -> String {
    format!("{} - {}", format_fi(start), format_fi(end))
}

impl RowFormula {
    pub fn row_type(&self) -> RowType {
        match self {
            RowFormula::Description { .. } | RowFormula::DateRangeDescription { .. } => {
                RowType::Description
            }
            RowFormula::SalaryCosts => RowType::SalaryCostsEur,
            RowFormula::StateAidMaxMonthly => RowType::StateAidMaxMonthlyEur,
            RowFormula::PaySubsidyMonthly { .. } => RowType::PaySubsidyMonthlyEur,
            RowFormula::TrainingCompensationMonthly { .. } => RowType::TrainingCompensationMonthlyEur,
            RowFormula::TotalDeductionsMonthly { .. } => RowType::DeductionsTotalEur,
            RowFormula::SalaryBenefitMonthly { .. } | RowFormula::EmployeeBenefitMonthly { .. } => {
                RowType::HelsinkiBenefitMonthlyEur
            }
            RowFormula::SalaryBenefitSubTotal { .. } => RowType::HelsinkiBenefitSubTotalEur,
            RowFormula::SalaryBenefitSumSubTotals { .. }
            | RowFormula::SalaryBenefitTotal { .. }
            | RowFormula::EmployeeBenefitTotal { .. }
            | RowFormula::ManualOverrideTotal { .. } => RowType::HelsinkiBenefitTotalEur,
        }
    }

    /// Whether rows of this formula carry an amount
    pub fn has_amount(&self) -> bool {
        self.row_type() != RowType::Description
    }

    /// Dates stored on the row; only period-bearing rows have them
    pub fn period(&self) -> (Option<NaiveDate>, Option<NaiveDate>) {
        match self {
            RowFormula::DateRangeDescription { start, end, .. }
            | RowFormula::SalaryBenefitSubTotal { start, end }
            | RowFormula::SalaryBenefitSumSubTotals { start, end }
            | RowFormula::EmployeeBenefitTotal { start, end }
            | RowFormula::ManualOverrideTotal { start, end, .. } => (Some(*start), Some(*end)),
            RowFormula::SalaryBenefitTotal { start, end } => (*start, *end),
            _ => (None, None),
        }
    }

    pub fn description_fi(&self, calculation: &Calculation) -> String {
        match self {
            RowFormula::Description { text } => text.clone(),
            RowFormula::DateRangeDescription { prefix, start, end } => {
                format!("{} {}", prefix, date_range_fi(*start, *end))
            }
            RowFormula::SalaryCosts => "Palkkauskustannukset / kk".to_string(),
            RowFormula::StateAidMaxMonthly => match calculation.state_aid_max_percentage {
                Some(percent) => format!("Valtiontuen enimmäismäärä {} % / kk", percent.normalize()),
                None => "Valtiontuen enimmäismäärä / kk".to_string(),
            },
            RowFormula::PaySubsidyMonthly { pay_subsidy_percent, .. } => {
                format!("Palkkatuki {} % / kk", pay_subsidy_percent)
            }
            RowFormula::TrainingCompensationMonthly { .. } => "Koulutuskorvaus / kk".to_string(),
            RowFormula::TotalDeductionsMonthly { .. } => "Vähennykset yhteensä / kk".to_string(),
            RowFormula::SalaryBenefitMonthly { .. } => "Helsinki-lisä / kk".to_string(),
            RowFormula::SalaryBenefitSubTotal { start, end } => {
                format!("Helsinki-lisä yhteensä ajalta {}", date_range_fi(*start, *end))
            }
            RowFormula::SalaryBenefitSumSubTotals { .. } | RowFormula::SalaryBenefitTotal { .. } => {
                "Helsinki-lisä yhteensä".to_string()
            }
            RowFormula::EmployeeBenefitMonthly { .. } => "Työllistämisen Helsinki-lisä / kk".to_string(),
            RowFormula::EmployeeBenefitTotal { .. } => {
                "Työllistämisen Helsinki-lisä yhteensä".to_string()
            }
            RowFormula::ManualOverrideTotal { .. } => {
                "Helsinki-lisä yhteensä (käsittelijän syöttämä)".to_string()
            }
        }
    }

    /// Amount of the row, from its own parameters and earlier rows
    pub fn amount(&self, calculation: &Calculation, ledger: &LedgerBuilder) -> Result<Option<Decimal>> {
        let amount = match self {
            RowFormula::Description { .. } | RowFormula::DateRangeDescription { .. } => {
                return Ok(None);
            }
            RowFormula::SalaryCosts => {
                let (start, end) = calculation.period().ok_or_else(|| {
                    CalculatorError::consistency("salary costs need the calculation period")
                })?;
                let months = duration_in_months(start, end);
                let vacation_money_monthly = if months.is_zero() {
                    Decimal::ZERO
                } else {
                    calculation.vacation_money / months
                };
                calculation.monthly_pay + calculation.other_expenses + vacation_money_monthly
            }
            RowFormula::StateAidMaxMonthly => {
                let percent = calculation.state_aid_max_percentage.ok_or_else(|| {
                    CalculatorError::consistency("state aid max percentage is not set")
                })?;
                percent_of(ledger.amount_of(RowType::SalaryCostsEur)?, percent)
            }
            RowFormula::PaySubsidyMonthly {
                pay_subsidy_percent,
                work_time_percent,
                max_subsidy,
            } => {
                let subsidy = percent_of(
                    ledger.amount_of(RowType::SalaryCostsEur)?,
                    Decimal::from(*pay_subsidy_percent),
                );
                subsidy.min(percent_of(*max_subsidy, *work_time_percent))
            }
            RowFormula::TrainingCompensationMonthly { monthly_amount } => *monthly_amount,
            RowFormula::TotalDeductionsMonthly { monthly_deductions } => *monthly_deductions,
            RowFormula::SalaryBenefitMonthly {
                max_benefit,
                monthly_deductions,
            } => {
                let available = ledger.amount_of(RowType::StateAidMaxMonthlyEur)? - *monthly_deductions;
                available.min(*max_benefit).max(Decimal::ZERO)
            }
            RowFormula::SalaryBenefitSubTotal { start, end }
            | RowFormula::EmployeeBenefitTotal { start, end } => {
                ledger.amount_of(RowType::HelsinkiBenefitMonthlyEur)? * duration_in_months(*start, *end)
            }
            RowFormula::SalaryBenefitSumSubTotals { .. } => {
                ledger.sum_of(RowType::HelsinkiBenefitSubTotalEur)
            }
            RowFormula::SalaryBenefitTotal { start, end } => match (start, end) {
                (Some(start), Some(end)) => {
                    ledger.amount_of(RowType::HelsinkiBenefitMonthlyEur)?
                        * duration_in_months(*start, *end)
                }
                _ => {
                    return Err(CalculatorError::consistency(
                        "salary benefit total needs a start and end date",
                    ))
                }
            },
            RowFormula::EmployeeBenefitMonthly { monthly_amount } => *monthly_amount,
            RowFormula::ManualOverrideTotal { amount, .. } => *amount,
        };

        Ok(Some(cents(amount)))
    }
}

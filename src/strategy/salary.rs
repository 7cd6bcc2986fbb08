//! Salary benefit, rules in effect starting from 1.7.2023

use rust_decimal::Decimal;

use crate::application::Application;
use crate::error::{CalculatorError, Result};
use crate::ledger::{LedgerBuilder, RowFormula};
use crate::periods::{partition, BenefitSubRange};
use crate::rules::SalaryBenefitRules;

const SUB_RANGE_PREFIX: &str = "Ajalta";
const WHOLE_PERIOD_PREFIX: &str = "Koko ajalta";
const DEDUCTIONS_HEADING: &str = "Vähennettävät korvaukset / kk";

/// Emit the salary benefit ledger.
///
/// Salary costs and the state aid maximum come first. Each sub-range then
/// gets its deductions, a monthly benefit and a sub-total. A single range
/// closes with a plain total; several ranges close with the sum of sub-totals.
pub fn create_salary_benefit_rows(
    application: &Application,
    rules: &SalaryBenefitRules,
    ledger: &mut LedgerBuilder,
) -> Result<()> {
    let (calc_start, calc_end) = ledger
        .calculation()
        .period()
        .ok_or_else(|| CalculatorError::consistency("salary benefit needs the calculation period"))?;

    let sub_ranges = partition(
        calc_start,
        calc_end,
        &application.pay_subsidies,
        &application.training_compensations,
    )?;
    let split = sub_ranges.len() > 1;

    ledger.push(RowFormula::SalaryCosts)?;
    ledger.push(RowFormula::StateAidMaxMonthly)?;

    for sub_range in &sub_ranges {
        if split {
            ledger.push(RowFormula::DateRangeDescription {
                prefix: SUB_RANGE_PREFIX.to_string(),
                start: sub_range.start_date,
                end: sub_range.end_date,
            })?;
        }
        let monthly_deductions = create_deduction_rows(sub_range, rules, ledger)?;

        ledger.push(RowFormula::SalaryBenefitMonthly {
            max_benefit: rules.max_monthly_benefit,
            monthly_deductions,
        })?;
        ledger.push(RowFormula::SalaryBenefitSubTotal {
            start: sub_range.start_date,
            end: sub_range.end_date,
        })?;
    }

    if split {
        ledger.push(RowFormula::DateRangeDescription {
            prefix: WHOLE_PERIOD_PREFIX.to_string(),
            start: calc_start,
            end: calc_end,
        })?;
        ledger.push(RowFormula::SalaryBenefitSumSubTotals {
            start: calc_start,
            end: calc_end,
        })?;
    } else {
        ledger.push(RowFormula::SalaryBenefitTotal {
            start: Some(calc_start),
            end: Some(calc_end),
        })?;
    }
    Ok(())
}

/// Rows for the pay subsidy and training compensation in effect; returns
/// the monthly deduction total.
fn create_deduction_rows(
    sub_range: &BenefitSubRange,
    rules: &SalaryBenefitRules,
    ledger: &mut LedgerBuilder,
) -> Result<Decimal> {
    if sub_range.has_modifiers() {
        ledger.push(RowFormula::Description {
            text: DEDUCTIONS_HEADING.to_string(),
        })?;
    }

    let pay_subsidy_monthly = match &sub_range.pay_subsidy {
        Some(pay_subsidy) => ledger
            .push(RowFormula::PaySubsidyMonthly {
                pay_subsidy_percent: pay_subsidy.pay_subsidy_percent,
                work_time_percent: pay_subsidy.work_time_percent,
                max_subsidy: rules.pay_subsidy_caps.max_monthly(pay_subsidy.pay_subsidy_percent),
            })?
            .amount
            .unwrap_or_default(),
        None => Decimal::ZERO,
    };

    // A zero compensation is shown under the heading only
    let compensation = sub_range
        .training_compensation
        .as_ref()
        .filter(|c| c.monthly_amount > Decimal::ZERO);
    let training_compensation_monthly = match compensation {
        Some(compensation) => ledger
            .push(RowFormula::TrainingCompensationMonthly {
                monthly_amount: compensation.monthly_amount,
            })?
            .amount
            .unwrap_or_default(),
        None => Decimal::ZERO,
    };

    let monthly_deductions = pay_subsidy_monthly + training_compensation_monthly;
    if sub_range.pay_subsidy.is_some() && compensation.is_some() {
        ledger.push(RowFormula::TotalDeductionsMonthly { monthly_deductions })?;
    }
    Ok(monthly_deductions)
}

//! Employment benefit, rules in effect from 2021

use crate::error::{CalculatorError, Result};
use crate::ledger::{LedgerBuilder, RowFormula};
use crate::rules::EmploymentBenefitRules;

/// A flat monthly amount over the whole calculation period
pub fn create_employment_benefit_rows(
    rules: &EmploymentBenefitRules,
    ledger: &mut LedgerBuilder,
) -> Result<()> {
    let (start, end) = ledger
        .calculation()
        .period()
        .ok_or_else(|| CalculatorError::consistency("employment benefit needs the calculation period"))?;

    ledger.push(RowFormula::EmployeeBenefitMonthly {
        monthly_amount: rules.monthly_amount,
    })?;
    ledger.push(RowFormula::EmployeeBenefitTotal { start, end })?;
    Ok(())
}

//! Calculation strategies, one per benefit formula
//!
//! The set is closed: a calculation with a manual override always uses
//! [`CalculationStrategy::ManualOverride`], otherwise the benefit type picks
//! the formula, and anything unrecognised falls back to the dummy ledger.

mod salary;
mod employment;

use crate::application::{Application, BenefitType, Calculation};
use crate::error::{CalculatorError, Result};
use crate::ledger::{AmountSource, LedgerBuilder, RowFormula};
use crate::rules::RuleSet;

pub use salary::create_salary_benefit_rows;
pub use employment::create_employment_benefit_rows;

/// Description of the dummy ledger
pub const CALCULATION_NOT_IN_USE: &str = "Laskentalogiikka ei käytössä";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalculationStrategy {
    /// No formula for the benefit type; always totals zero
    Dummy,
    /// Handler-entered total replaces the formula
    ManualOverride,
    /// Salary benefit, rules in effect from 1.7.2023
    SalaryBenefit,
    /// Employment benefit, rules in effect from 2021
    EmploymentBenefit,
}

impl CalculationStrategy {
    /// Manual override first, then the benefit type, then the dummy fallback
    pub fn select(application: &Application, calculation: &Calculation) -> Self {
        if calculation.override_benefit_amount.is_some() {
            return CalculationStrategy::ManualOverride;
        }
        match application.benefit_type {
            Some(BenefitType::SalaryBenefit) => CalculationStrategy::SalaryBenefit,
            Some(BenefitType::EmploymentBenefit) => CalculationStrategy::EmploymentBenefit,
            Some(BenefitType::CommissionBenefit) | None => CalculationStrategy::Dummy,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CalculationStrategy::Dummy => "dummy",
            CalculationStrategy::ManualOverride => "manual_override",
            CalculationStrategy::SalaryBenefit => "salary_benefit_2023",
            CalculationStrategy::EmploymentBenefit => "employment_benefit_2021",
        }
    }

    /// Whether the inputs are complete enough to build a ledger
    pub fn can_calculate(&self, application: &Application, calculation: &Calculation) -> bool {
        match self {
            CalculationStrategy::Dummy => true,
            CalculationStrategy::ManualOverride | CalculationStrategy::EmploymentBenefit => {
                calculation.period().is_some()
            }
            CalculationStrategy::SalaryBenefit => {
                calculation.period().is_some()
                    && calculation
                        .state_aid_max_percentage
                        .is_some_and(|percent| !percent.is_zero())
                    && application.pay_subsidies.iter().all(|p| p.has_dates())
            }
        }
    }

    /// The dummy ledger reads every amount as zero
    pub fn amount_source(&self) -> AmountSource {
        match self {
            CalculationStrategy::Dummy => AmountSource::AlwaysZero,
            _ => AmountSource::Ledger,
        }
    }

    /// Append this strategy's rows. Call only after [`Self::can_calculate`].
    pub fn create_rows(
        &self,
        application: &Application,
        rules: &RuleSet,
        ledger: &mut LedgerBuilder,
    ) -> Result<()> {
        match self {
            CalculationStrategy::Dummy => create_dummy_rows(ledger),
            CalculationStrategy::ManualOverride => create_manual_override_rows(ledger),
            CalculationStrategy::SalaryBenefit => {
                create_salary_benefit_rows(application, &rules.salary, ledger)
            }
            CalculationStrategy::EmploymentBenefit => {
                create_employment_benefit_rows(&rules.employment, ledger)
            }
        }
    }
}

fn create_dummy_rows(ledger: &mut LedgerBuilder) -> Result<()> {
    let (start, end) = (ledger.calculation().start_date, ledger.calculation().end_date);
    ledger.push(RowFormula::Description {
        text: CALCULATION_NOT_IN_USE.to_string(),
    })?;
    ledger.push(RowFormula::SalaryBenefitTotal { start, end })?;
    Ok(())
}

fn create_manual_override_rows(ledger: &mut LedgerBuilder) -> Result<()> {
    let calculation = ledger.calculation();
    let (start, end) = calculation
        .period()
        .ok_or_else(|| CalculatorError::consistency("manual override needs the calculation period"))?;
    let amount = calculation
        .override_benefit_amount
        .ok_or_else(|| CalculatorError::consistency("manual override amount is not set"))?;

    ledger.push(RowFormula::ManualOverrideTotal { amount, start, end })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{ApplicationStatus, PaySubsidy};
    use crate::ledger::RowType;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn calculation() -> Calculation {
        Calculation::new(1, date(2024, 1, 1), date(2024, 3, 31), dec!(3000))
    }

    #[test]
    fn test_selection_precedence() {
        let mut app = Application::new(1, ApplicationStatus::Handling, Some(BenefitType::SalaryBenefit));
        let mut calc = calculation();

        assert_eq!(CalculationStrategy::select(&app, &calc), CalculationStrategy::SalaryBenefit);

        app.benefit_type = Some(BenefitType::EmploymentBenefit);
        assert_eq!(CalculationStrategy::select(&app, &calc), CalculationStrategy::EmploymentBenefit);

        app.benefit_type = Some(BenefitType::CommissionBenefit);
        assert_eq!(CalculationStrategy::select(&app, &calc), CalculationStrategy::Dummy);

        app.benefit_type = None;
        assert_eq!(CalculationStrategy::select(&app, &calc), CalculationStrategy::Dummy);

        calc.override_benefit_amount = Some(dec!(1234));
        for benefit_type in [None, Some(BenefitType::SalaryBenefit), Some(BenefitType::EmploymentBenefit)] {
            app.benefit_type = benefit_type;
            assert_eq!(CalculationStrategy::select(&app, &calc), CalculationStrategy::ManualOverride);
        }
    }

    #[test]
    fn test_salary_benefit_preconditions() {
        let mut app = Application::new(1, ApplicationStatus::Handling, Some(BenefitType::SalaryBenefit));
        let mut calc = calculation();
        let strategy = CalculationStrategy::SalaryBenefit;

        assert!(!strategy.can_calculate(&app, &calc), "state aid percentage missing");

        calc.state_aid_max_percentage = Some(Decimal::ZERO);
        assert!(!strategy.can_calculate(&app, &calc), "zero state aid percentage counts as unset");

        calc.state_aid_max_percentage = Some(dec!(50));
        assert!(strategy.can_calculate(&app, &calc));

        let mut undated = PaySubsidy::new(1, date(2024, 1, 1), date(2024, 1, 31), 50);
        undated.start_date = None;
        app.pay_subsidies.push(undated);
        assert!(!strategy.can_calculate(&app, &calc), "pay subsidy without dates");

        app.pay_subsidies.clear();
        calc.end_date = None;
        assert!(!strategy.can_calculate(&app, &calc));
    }

    #[test]
    fn test_dummy_always_calculates() {
        let app = Application::new(1, ApplicationStatus::Handling, None);
        let mut calc = calculation();
        calc.start_date = None;
        calc.end_date = None;

        let strategy = CalculationStrategy::Dummy;
        assert!(strategy.can_calculate(&app, &calc));

        let mut ledger = LedgerBuilder::with_source(&calc, strategy.amount_source());
        strategy.create_rows(&app, &RuleSet::default(), &mut ledger).unwrap();

        let rows = ledger.into_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].description_fi, CALCULATION_NOT_IN_USE);
        assert_eq!(rows[0].amount, None);
        assert_eq!(rows[1].row_type, RowType::HelsinkiBenefitTotalEur);
        assert_eq!(rows[1].amount, Some(Decimal::ZERO));
    }

    #[test]
    fn test_manual_override_single_row() {
        let app = Application::new(1, ApplicationStatus::Handling, Some(BenefitType::SalaryBenefit));
        let mut calc = calculation();
        calc.override_benefit_amount = Some(dec!(4321.50));

        let strategy = CalculationStrategy::select(&app, &calc);
        let mut ledger = LedgerBuilder::with_source(&calc, strategy.amount_source());
        strategy.create_rows(&app, &RuleSet::default(), &mut ledger).unwrap();

        let rows = ledger.into_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amount, Some(dec!(4321.50)));
        assert_eq!(rows[0].start_date, Some(date(2024, 1, 1)));
        assert_eq!(rows[0].end_date, Some(date(2024, 3, 31)));
    }
}

//! Calculation orchestrator
//!
//! Selects the strategy, enforces the status gate and regenerates the whole
//! ledger. The new rows are built and validated in memory; the calculation is
//! only touched once everything succeeded.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::application::{Application, ApplicationStatus, Calculation};
use crate::error::{CalculatorError, Result};
use crate::ledger::{total_amount, validate, CalculationRow, LedgerBuilder};
use crate::rules::RuleSet;
use crate::strategy::CalculationStrategy;

/// Engine configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatorConfig {
    pub rules: RuleSet,
    /// Application statuses in which the ledger may be regenerated
    pub allowed_statuses: Vec<ApplicationStatus>,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            rules: RuleSet::default_2023(),
            allowed_statuses: ApplicationStatus::CALCULATION_ALLOWED.to_vec(),
        }
    }
}

impl CalculatorConfig {
    /// The one status gate: may a ledger be regenerated in this status
    pub fn allows(&self, status: ApplicationStatus) -> bool {
        self.allowed_statuses.contains(&status)
    }
}

/// What a call to [`CalculationEngine::calculate`] did
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "value", rename_all = "snake_case")]
pub enum CalculationOutcome {
    /// Ledger regenerated; the total is now the calculated benefit amount
    Calculated(Decimal),
    /// Inputs incomplete; the ledger was cleared and the amount set to none
    Incomplete,
    /// The application status does not allow changes; nothing was touched
    Locked(ApplicationStatus),
}

impl CalculationOutcome {
    pub fn amount(&self) -> Option<Decimal> {
        match self {
            CalculationOutcome::Calculated(amount) => Some(*amount),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CalculationOutcome::Calculated(_) => "calculated",
            CalculationOutcome::Incomplete => "incomplete",
            CalculationOutcome::Locked(_) => "locked",
        }
    }
}

/// A regenerated ledger waiting to be committed
struct Regenerated {
    rows: Vec<CalculationRow>,
    amount: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct CalculationEngine {
    config: CalculatorConfig,
}

impl CalculationEngine {
    pub fn new(config: CalculatorConfig) -> Self {
        Self { config }
    }

    pub fn with_rules(rules: RuleSet) -> Self {
        Self::new(CalculatorConfig {
            rules,
            ..CalculatorConfig::default()
        })
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    /// Regenerate the calculation's ledger and benefit amount.
    ///
    /// Only `calculation.rows` and `calculation.calculated_benefit_amount` are
    /// written, and only when this returns `Ok`. Consistency errors leave the
    /// previous ledger in place.
    pub fn calculate(
        &self,
        application: &Application,
        calculation: &mut Calculation,
    ) -> Result<CalculationOutcome> {
        if !self.config.allows(application.status) {
            log::info!(
                "calculation {} locked: application {} is {}",
                calculation.id,
                application.id,
                application.status.as_str()
            );
            return Ok(CalculationOutcome::Locked(application.status));
        }

        let strategy = CalculationStrategy::select(application, calculation);
        log::debug!(
            "calculation {} (application {}) uses {}",
            calculation.id,
            application.id,
            strategy.name()
        );

        let regenerated = self.regenerate(strategy, application, calculation);
        commit(strategy.name(), calculation, regenerated)
    }

    /// Build and validate a new ledger without committing it.
    /// `None` when the strategy cannot calculate with these inputs.
    fn regenerate(
        &self,
        strategy: CalculationStrategy,
        application: &Application,
        calculation: &Calculation,
    ) -> Result<Option<Regenerated>> {
        if !strategy.can_calculate(application, calculation) {
            return Ok(None);
        }

        let build = || -> Result<Vec<CalculationRow>> {
            let mut ledger = LedgerBuilder::with_source(calculation, strategy.amount_source());
            strategy.create_rows(application, &self.config.rules, &mut ledger)?;
            Ok(ledger.into_rows())
        };

        build()
            .and_then(checked)
            .map(Some)
            .map_err(|err| err.in_calculation(calculation.id, strategy.name()))
    }
}

/// Validate a finished ledger and read its total
fn checked(rows: Vec<CalculationRow>) -> Result<Regenerated> {
    validate(&rows)?;
    let amount = total_amount(&rows)
        .ok_or_else(|| CalculatorError::consistency("ledger has no total amount"))?;
    Ok(Regenerated { rows, amount })
}

/// Swap a regenerated ledger onto the calculation. Errors other than bad
/// input leave the calculation exactly as it was.
fn commit(
    strategy_name: &'static str,
    calculation: &mut Calculation,
    regenerated: Result<Option<Regenerated>>,
) -> Result<CalculationOutcome> {
    match regenerated {
        Ok(Some(Regenerated { rows, amount })) => {
            log::info!(
                "calculation {} ({}): {} rows, total {}",
                calculation.id,
                strategy_name,
                rows.len(),
                amount
            );
            calculation.rows = rows;
            calculation.calculated_benefit_amount = Some(amount);
            Ok(CalculationOutcome::Calculated(amount))
        }
        Ok(None) => {
            log::info!(
                "calculation {} ({}): inputs incomplete",
                calculation.id,
                strategy_name
            );
            Ok(clear(calculation))
        }
        Err(CalculatorError::Input(detail)) => {
            log::warn!(
                "calculation {} ({}): invalid input, {}",
                calculation.id,
                strategy_name,
                detail
            );
            Ok(clear(calculation))
        }
        Err(err) => {
            log::error!("calculation {} failed: {}", calculation.id, err);
            Err(err)
        }
    }
}

fn clear(calculation: &mut Calculation) -> CalculationOutcome {
    calculation.rows.clear();
    calculation.calculated_benefit_amount = None;
    CalculationOutcome::Incomplete
}

//! Batch recalculation of many independent cases
//!
//! Loads the rule set once and runs the engine over a slice of cases,
//! sequentially or in parallel with rayon. Each case owns its calculation,
//! so parallel runs never share a ledger.

use std::path::Path;

use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::Serialize;

use super::engine::{CalculationEngine, CalculationOutcome, CalculatorConfig};
use crate::application::BenefitCase;
use crate::error::Result;
use crate::rules::RuleSet;
use crate::strategy::CalculationStrategy;

/// How one case in a batch ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchOutcome {
    Calculated,
    Incomplete,
    Locked,
    /// The engine returned an error
    Failed,
}

impl BatchOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            BatchOutcome::Calculated => "calculated",
            BatchOutcome::Incomplete => "incomplete",
            BatchOutcome::Locked => "locked",
            BatchOutcome::Failed => "failed",
        }
    }
}

impl From<&CalculationOutcome> for BatchOutcome {
    fn from(outcome: &CalculationOutcome) -> Self {
        match outcome {
            CalculationOutcome::Calculated(_) => BatchOutcome::Calculated,
            CalculationOutcome::Incomplete => BatchOutcome::Incomplete,
            CalculationOutcome::Locked(_) => BatchOutcome::Locked,
        }
    }
}

/// Result for one case in a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult {
    pub application_id: u64,
    pub calculation_id: u64,
    pub strategy: &'static str,
    pub outcome: BatchOutcome,
    pub benefit_amount: Option<Decimal>,
    pub row_count: usize,
    /// Set when the engine returned an error
    pub error: Option<String>,
}

impl BatchResult {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Totals over a finished batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub calculated: usize,
    pub incomplete: usize,
    pub locked: usize,
    pub failed: usize,
    pub total_benefit: Decimal,
}

impl BatchSummary {
    pub fn from_results(results: &[BatchResult]) -> Self {
        let mut summary = Self::default();
        for result in results {
            match result.outcome {
                BatchOutcome::Calculated => summary.calculated += 1,
                BatchOutcome::Incomplete => summary.incomplete += 1,
                BatchOutcome::Locked => summary.locked += 1,
                BatchOutcome::Failed => summary.failed += 1,
            }
            if let Some(amount) = result.benefit_amount {
                summary.total_benefit += amount;
            }
        }
        summary
    }
}

#[derive(Debug, Clone, Default)]
pub struct BatchRunner {
    engine: CalculationEngine,
}

impl BatchRunner {
    /// Runner with the built-in rule set
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CalculatorConfig) -> Self {
        Self {
            engine: CalculationEngine::new(config),
        }
    }

    /// Runner with rules loaded from a directory of CSV tables
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        Ok(Self {
            engine: CalculationEngine::with_rules(RuleSet::from_csv_path(path)?),
        })
    }

    pub fn engine(&self) -> &CalculationEngine {
        &self.engine
    }

    /// Recalculate one case in place
    pub fn run(&self, case: &mut BenefitCase) -> BatchResult {
        let strategy = CalculationStrategy::select(&case.application, &case.calculation);
        let result = self.engine.calculate(&case.application, &mut case.calculation);

        let (outcome, benefit_amount, error) = match result {
            Ok(outcome) => (BatchOutcome::from(&outcome), outcome.amount(), None),
            Err(err) => (BatchOutcome::Failed, None, Some(err.to_string())),
        };

        BatchResult {
            application_id: case.application.id,
            calculation_id: case.calculation.id,
            strategy: strategy.name(),
            outcome,
            benefit_amount,
            row_count: case.calculation.rows.len(),
            error,
        }
    }

    /// Recalculate cases one after another
    pub fn run_batch(&self, cases: &mut [BenefitCase]) -> Vec<BatchResult> {
        cases.iter_mut().map(|case| self.run(case)).collect()
    }

    /// Recalculate cases in parallel; results keep the input order
    pub fn run_parallel(&self, cases: &mut [BenefitCase]) -> Vec<BatchResult> {
        cases.par_iter_mut().map(|case| self.run(case)).collect()
    }
}

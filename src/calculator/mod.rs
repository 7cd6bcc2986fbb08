//! Calculation orchestration, persistence boundary and batch runs

mod engine;
pub mod store;
pub mod batch;

pub use engine::{CalculationEngine, CalculationOutcome, CalculatorConfig};
pub use store::{CalculationStore, InMemoryCalculationStore};
pub use batch::{BatchOutcome, BatchResult, BatchRunner, BatchSummary};

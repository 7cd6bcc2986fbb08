//! Benefit Calculator - Calculation engine for Helsinki benefit applications
//!
//! This library provides:
//! - Partitioning of the calculation period by pay subsidies and training compensations
//! - An ordered, append-only ledger of calculation rows ending in the benefit total
//! - Salary benefit, employment benefit, manual override and fallback strategies
//! - Recalculation with a status gate, an in-memory store and batch runs
//! - Rule parameters with built-in defaults or loaded from CSV

pub mod error;
pub mod application;
pub mod rules;
pub mod periods;
pub mod ledger;
pub mod strategy;
pub mod calculator;

// Re-export commonly used types
pub use error::{CalculatorError, Result};
pub use application::{Application, ApplicationStatus, BenefitCase, BenefitType, Calculation, PaySubsidy, TrainingCompensation};
pub use rules::RuleSet;
pub use ledger::{CalculationRow, RowType};
pub use strategy::CalculationStrategy;
pub use calculator::{CalculationEngine, CalculationOutcome, CalculatorConfig};

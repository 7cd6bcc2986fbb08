//! Calculation row ledger: row types, formulas, builder and export

mod row;
mod formula;
mod builder;
pub mod export;

pub use row::{total_amount, CalculationRow, RowType};
pub use formula::RowFormula;
pub use builder::{validate, AmountSource, LedgerBuilder};

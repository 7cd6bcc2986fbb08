//! Append-only ledger builder
//!
//! A builder owns the row counter and an index from row type to the most
//! recent row of that type. Strategies append rows through [`LedgerBuilder::push`];
//! nothing is visible outside the builder until the orchestrator commits it.

use std::collections::HashMap;

use rust_decimal::Decimal;

use super::formula::RowFormula;
use super::row::{CalculationRow, RowType};
use crate::application::Calculation;
use crate::error::{CalculatorError, Result};

/// Where formula lookups get their amounts from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountSource {
    /// Amounts come from earlier rows
    Ledger,
    /// Every amount is zero, whatever the ledger holds
    AlwaysZero,
}

pub struct LedgerBuilder<'a> {
    calculation: &'a Calculation,
    source: AmountSource,
    rows: Vec<CalculationRow>,
    latest: HashMap<RowType, usize>,
}

impl<'a> LedgerBuilder<'a> {
    pub fn new(calculation: &'a Calculation) -> Self {
        Self::with_source(calculation, AmountSource::Ledger)
    }

    pub fn with_source(calculation: &'a Calculation, source: AmountSource) -> Self {
        Self {
            calculation,
            source,
            rows: Vec::new(),
            latest: HashMap::new(),
        }
    }

    pub fn calculation(&self) -> &Calculation {
        self.calculation
    }

    /// Evaluate a formula and append the resulting row
    pub fn push(&mut self, formula: RowFormula) -> Result<&CalculationRow> {
        let amount = match self.source {
            AmountSource::Ledger => formula.amount(self.calculation, self)?,
            AmountSource::AlwaysZero => formula.has_amount().then_some(Decimal::ZERO),
        };
        let (start_date, end_date) = formula.period();
        let row_type = formula.row_type();

        let row = CalculationRow {
            row_type,
            ordering: self.rows.len() as u32,
            start_date,
            end_date,
            amount,
            description_fi: formula.description_fi(self.calculation),
        };
        log::trace!(
            "row {} {} amount={:?}",
            row.ordering,
            row_type.as_str(),
            row.amount
        );

        let index = self.rows.len();
        self.rows.push(row);
        self.latest.insert(row_type, index);
        Ok(&self.rows[index])
    }

    /// Amount of the latest row of `row_type`
    pub fn amount_of(&self, row_type: RowType) -> Result<Decimal> {
        if self.source == AmountSource::AlwaysZero {
            return Ok(Decimal::ZERO);
        }
        self.latest
            .get(&row_type)
            .and_then(|&index| self.rows[index].amount)
            .ok_or_else(|| {
                CalculatorError::consistency(format!("no {} row in ledger", row_type.as_str()))
            })
    }

    /// Sum over every row of `row_type`
    pub fn sum_of(&self, row_type: RowType) -> Decimal {
        if self.source == AmountSource::AlwaysZero {
            return Decimal::ZERO;
        }
        self.rows
            .iter()
            .filter(|row| row.row_type == row_type)
            .filter_map(|row| row.amount)
            .sum()
    }

    pub fn rows(&self) -> &[CalculationRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<CalculationRow> {
        self.rows
    }
}

/// Check the invariants of a finished ledger before it is committed.
///
/// - orderings run 0, 1, 2, ... without gaps
/// - exactly one total row, and it is the last row with an amount
/// - when sub-totals exist, the total equals their sum
pub fn validate(rows: &[CalculationRow]) -> Result<()> {
    for (index, row) in rows.iter().enumerate() {
        if row.ordering as usize != index {
            return Err(CalculatorError::consistency(format!(
                "row at position {} has ordering {}",
                index, row.ordering
            )));
        }
    }

    let totals: Vec<&CalculationRow> = rows.iter().filter(|row| row.row_type.is_total()).collect();
    let total = match totals.as_slice() {
        [total] => *total,
        _ => {
            return Err(CalculatorError::consistency(format!(
                "expected exactly one total row, found {}",
                totals.len()
            )))
        }
    };

    let last_with_amount = rows.iter().rev().find(|row| row.has_amount());
    if last_with_amount.map(|row| row.ordering) != Some(total.ordering) {
        return Err(CalculatorError::consistency(
            "total row is not the last row with an amount",
        ));
    }

    let sub_totals: Vec<Decimal> = rows
        .iter()
        .filter(|row| row.row_type == RowType::HelsinkiBenefitSubTotalEur)
        .filter_map(|row| row.amount)
        .collect();
    if !sub_totals.is_empty() {
        let sum: Decimal = sub_totals.iter().sum();
        if total.amount != Some(sum) {
            return Err(CalculatorError::consistency(format!(
                "total {:?} does not match the sum of sub-totals {}",
                total.amount, sum
            )));
        }
    }

    Ok(())
}

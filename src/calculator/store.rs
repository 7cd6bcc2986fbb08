//! Persistence boundary for calculations
//!
//! Recalculations of the same calculation must not interleave. The in-memory
//! store keeps every case behind its own mutex: a second recalculation waits
//! for the first to commit, while other calculations proceed independently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use super::engine::{CalculationEngine, CalculationOutcome};
use crate::application::BenefitCase;
use crate::error::{CalculatorError, Result};
use crate::ledger::CalculationRow;

pub trait CalculationStore: Send + Sync {
    /// Snapshot of a stored case
    fn load(&self, calculation_id: u64) -> Result<BenefitCase>;

    /// Regenerate the ledger of a stored case and persist the result
    fn recalculate(&self, calculation_id: u64, engine: &CalculationEngine) -> Result<CalculationOutcome>;

    /// Committed rows in ledger order
    fn ledger(&self, calculation_id: u64) -> Result<Vec<CalculationRow>>;
}

/// Cases keyed by calculation id
#[derive(Debug, Default)]
pub struct InMemoryCalculationStore {
    cases: RwLock<HashMap<u64, Arc<Mutex<BenefitCase>>>>,
}

impl InMemoryCalculationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cases(cases: impl IntoIterator<Item = BenefitCase>) -> Self {
        let store = Self::new();
        for case in cases {
            store.insert(case);
        }
        store
    }

    /// Insert or replace a case; returns the previous one
    pub fn insert(&self, case: BenefitCase) -> Option<BenefitCase> {
        let id = case.calculation.id;
        let previous = self
            .cases
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(Mutex::new(case)));
        previous.map(|entry| snapshot(&entry))
    }

    pub fn remove(&self, calculation_id: u64) -> Option<BenefitCase> {
        let removed = self
            .cases
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&calculation_id);
        removed.map(|entry| snapshot(&entry))
    }

    pub fn contains(&self, calculation_id: u64) -> bool {
        self.cases
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&calculation_id)
    }

    pub fn len(&self) -> usize {
        self.cases.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stored calculation ids, ascending
    pub fn ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self
            .cases
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect();
        ids.sort_unstable();
        ids
    }

    fn entry(&self, calculation_id: u64) -> Result<Arc<Mutex<BenefitCase>>> {
        self.cases
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&calculation_id)
            .cloned()
            .ok_or(CalculatorError::NotFound(calculation_id))
    }
}

/// A failed recalculation never commits, so a poisoned case is still consistent
fn lock(entry: &Mutex<BenefitCase>) -> MutexGuard<'_, BenefitCase> {
    entry.lock().unwrap_or_else(PoisonError::into_inner)
}

fn snapshot(entry: &Mutex<BenefitCase>) -> BenefitCase {
    lock(entry).clone()
}

impl CalculationStore for InMemoryCalculationStore {
    fn load(&self, calculation_id: u64) -> Result<BenefitCase> {
        let entry = self.entry(calculation_id)?;
        Ok(snapshot(&entry))
    }

    fn recalculate(&self, calculation_id: u64, engine: &CalculationEngine) -> Result<CalculationOutcome> {
        let entry = self.entry(calculation_id)?;
        let mut guard = lock(&entry);
        let BenefitCase {
            application,
            calculation,
        } = &mut *guard;
        engine.calculate(application, calculation)
    }

    fn ledger(&self, calculation_id: u64) -> Result<Vec<CalculationRow>> {
        let entry = self.entry(calculation_id)?;
        let mut rows = lock(&entry).calculation.rows.clone();
        rows.sort_by_key(|row| row.ordering);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{Application, ApplicationStatus, BenefitType, Calculation, PaySubsidy};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::thread;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn case(calculation_id: u64) -> BenefitCase {
        let mut application =
            Application::new(calculation_id + 100, ApplicationStatus::Handling, Some(BenefitType::SalaryBenefit));
        application
            .pay_subsidies
            .push(PaySubsidy::new(1, date(2024, 1, 1), date(2024, 2, 29), 50));
        let mut calculation = Calculation::new(calculation_id, date(2024, 1, 1), date(2024, 4, 30), dec!(3000));
        calculation.other_expenses = dec!(500);
        calculation.state_aid_max_percentage = Some(dec!(50));
        BenefitCase {
            application,
            calculation,
        }
    }

    #[test]
    fn test_insert_and_remove() {
        let store = InMemoryCalculationStore::new();
        assert!(store.is_empty());

        assert!(store.insert(case(1)).is_none());
        assert!(store.insert(case(2)).is_none());
        assert!(store.insert(case(1)).is_some());
        assert_eq!(store.len(), 2);
        assert_eq!(store.ids(), vec![1, 2]);

        assert!(store.remove(1).is_some());
        assert!(!store.contains(1));
        assert!(store.remove(1).is_none());
    }

    #[test]
    fn test_unknown_id() {
        let store = InMemoryCalculationStore::new();
        let engine = CalculationEngine::default();

        assert!(matches!(store.load(9), Err(CalculatorError::NotFound(9))));
        assert!(matches!(store.recalculate(9, &engine), Err(CalculatorError::NotFound(9))));
        assert!(matches!(store.ledger(9), Err(CalculatorError::NotFound(9))));
    }

    #[test]
    fn test_recalculate_persists_ledger() {
        let store = InMemoryCalculationStore::from_cases([case(1)]);
        let engine = CalculationEngine::default();

        assert!(store.ledger(1).unwrap().is_empty());
        let outcome = store.recalculate(1, &engine).unwrap();
        assert_eq!(outcome, CalculationOutcome::Calculated(dec!(2580)));

        let stored = store.load(1).unwrap();
        assert_eq!(stored.calculation.calculated_benefit_amount, Some(dec!(2580)));
        assert_eq!(store.ledger(1).unwrap(), stored.calculation.rows);
    }

    #[test]
    fn test_concurrent_recalculations_serialize() {
        let store = InMemoryCalculationStore::from_cases([case(1), case(2)]);
        let engine = CalculationEngine::default();

        store.recalculate(1, &engine).unwrap();
        let expected = store.ledger(1).unwrap();

        thread::scope(|scope| {
            for i in 0..8 {
                let store = &store;
                let engine = &engine;
                scope.spawn(move || {
                    let id = if i % 2 == 0 { 1 } else { 2 };
                    store.recalculate(id, engine).unwrap();
                });
            }
        });

        // Every run rebuilt the same ledger; none appended to another's rows
        assert_eq!(store.ledger(1).unwrap(), expected);
        assert_eq!(store.ledger(2).unwrap().len(), expected.len());
        let orderings: Vec<u32> = store.ledger(2).unwrap().iter().map(|r| r.ordering).collect();
        assert_eq!(orderings, (0..expected.len() as u32).collect::<Vec<_>>());
    }
}

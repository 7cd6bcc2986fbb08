//! Application, calculation and modifier-period records

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::CalculationRow;

fn default_work_time_percent() -> Decimal {
    Decimal::ONE_HUNDRED
}

/// Lifecycle status of an application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Draft,
    Received,
    Handling,
    AdditionalInformationNeeded,
    Cancelled,
    Accepted,
    Rejected,
    Archival,
}

impl ApplicationStatus {
    /// Statuses in which the handler may still change the calculation.
    /// Decided applications, and anything transferred to Ahjo, stay locked.
    pub const CALCULATION_ALLOWED: [ApplicationStatus; 3] = [
        ApplicationStatus::Received,
        ApplicationStatus::Handling,
        ApplicationStatus::AdditionalInformationNeeded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Draft => "draft",
            ApplicationStatus::Received => "received",
            ApplicationStatus::Handling => "handling",
            ApplicationStatus::AdditionalInformationNeeded => "additional_information_needed",
            ApplicationStatus::Cancelled => "cancelled",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Archival => "archival",
        }
    }
}

/// Kind of benefit applied for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenefitType {
    EmploymentBenefit,
    SalaryBenefit,
    CommissionBenefit,
}

/// A pay subsidy decision covering part or all of the employment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaySubsidy {
    pub id: u64,

    /// First day in effect (None until the handler fills it in)
    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    /// Last day in effect, inclusive
    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    /// Subsidy percent from the decision (30, 40, 50, 70 or 100)
    pub pay_subsidy_percent: u32,

    /// Working time as a percentage of full time
    #[serde(default = "default_work_time_percent")]
    pub work_time_percent: Decimal,
}

impl PaySubsidy {
    pub fn new(id: u64, start_date: NaiveDate, end_date: NaiveDate, pay_subsidy_percent: u32) -> Self {
        Self {
            id,
            start_date: Some(start_date),
            end_date: Some(end_date),
            pay_subsidy_percent,
            work_time_percent: default_work_time_percent(),
        }
    }

    pub fn with_work_time_percent(mut self, work_time_percent: Decimal) -> Self {
        self.work_time_percent = work_time_percent;
        self
    }

    pub fn has_dates(&self) -> bool {
        self.start_date.is_some() && self.end_date.is_some()
    }

    /// Same subsidy terms, so two adjacent periods can be treated as one
    pub fn same_terms(&self, other: &PaySubsidy) -> bool {
        self.pay_subsidy_percent == other.pay_subsidy_percent
            && self.work_time_percent == other.work_time_percent
    }
}

/// Monthly training compensation paid for part of the employment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingCompensation {
    pub id: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub monthly_amount: Decimal,
}

impl TrainingCompensation {
    pub fn new(id: u64, start_date: NaiveDate, end_date: NaiveDate, monthly_amount: Decimal) -> Self {
        Self {
            id,
            start_date,
            end_date,
            monthly_amount,
        }
    }
}

/// Handler-entered calculation parameters plus the generated ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calculation {
    pub id: u64,

    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    pub monthly_pay: Decimal,

    #[serde(default)]
    pub vacation_money: Decimal,

    #[serde(default)]
    pub other_expenses: Decimal,

    /// Maximum share of salary costs that may be covered by state aid, in percent
    #[serde(default)]
    pub state_aid_max_percentage: Option<Decimal>,

    /// When set, replaces the formula result entirely
    #[serde(default)]
    pub override_benefit_amount: Option<Decimal>,

    #[serde(default)]
    pub override_benefit_amount_comment: String,

    /// Derived total, written only by the calculation engine
    #[serde(default)]
    pub calculated_benefit_amount: Option<Decimal>,

    /// Ledger rows in `ordering` order, written only by the calculation engine
    #[serde(default)]
    pub rows: Vec<CalculationRow>,
}

impl Calculation {
    pub fn new(id: u64, start_date: NaiveDate, end_date: NaiveDate, monthly_pay: Decimal) -> Self {
        Self {
            id,
            start_date: Some(start_date),
            end_date: Some(end_date),
            monthly_pay,
            vacation_money: Decimal::ZERO,
            other_expenses: Decimal::ZERO,
            state_aid_max_percentage: None,
            override_benefit_amount: None,
            override_benefit_amount_comment: String::new(),
            calculated_benefit_amount: None,
            rows: Vec::new(),
        }
    }

    /// Both dates, when set and in order
    pub fn period(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if start <= end => Some((start, end)),
            _ => None,
        }
    }
}

/// A benefit application with its modifier periods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: u64,
    pub status: ApplicationStatus,

    #[serde(default)]
    pub benefit_type: Option<BenefitType>,

    #[serde(default)]
    pub pay_subsidies: Vec<PaySubsidy>,

    #[serde(default)]
    pub training_compensations: Vec<TrainingCompensation>,
}

impl Application {
    pub fn new(id: u64, status: ApplicationStatus, benefit_type: Option<BenefitType>) -> Self {
        Self {
            id,
            status,
            benefit_type,
            pay_subsidies: Vec::new(),
            training_compensations: Vec::new(),
        }
    }
}

/// An application together with its calculation, the unit the store keeps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenefitCase {
    pub application: Application,
    pub calculation: Calculation,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_calculation_period() {
        let mut calc = Calculation::new(1, date(2024, 1, 1), date(2024, 3, 31), dec!(3000));
        assert_eq!(calc.period(), Some((date(2024, 1, 1), date(2024, 3, 31))));

        calc.end_date = Some(date(2023, 12, 31));
        assert_eq!(calc.period(), None);

        calc.end_date = None;
        assert_eq!(calc.period(), None);
    }

    #[test]
    fn test_pay_subsidy_terms() {
        let a = PaySubsidy::new(1, date(2024, 1, 1), date(2024, 1, 31), 50);
        let b = PaySubsidy::new(2, date(2024, 2, 1), date(2024, 2, 29), 50);
        let c = b.clone().with_work_time_percent(dec!(80));

        assert!(a.same_terms(&b));
        assert!(!a.same_terms(&c));
        assert_eq!(a.work_time_percent, dec!(100));
    }

    #[test]
    fn test_status_deserializes_snake_case() {
        let status: ApplicationStatus =
            serde_json::from_str("\"additional_information_needed\"").unwrap();
        assert_eq!(status, ApplicationStatus::AdditionalInformationNeeded);
    }
}

//! Benefit application records and case loading

mod data;
pub mod loader;

pub use data::{
    Application, ApplicationStatus, BenefitCase, BenefitType, Calculation, PaySubsidy,
    TrainingCompensation,
};
pub use loader::{load_case, load_cases, load_cases_from_reader, load_pay_subsidies};

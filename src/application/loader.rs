//! Load benefit cases from JSON and pay subsidy decisions from CSV

use super::{BenefitCase, PaySubsidy};
use crate::error::{CalculatorError, Result};
use chrono::NaiveDate;
use csv::Reader;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Subsidy percents that appear in pay subsidy decisions
pub const PAY_SUBSIDY_PERCENTS: [u32; 5] = [30, 40, 50, 70, 100];

/// Raw CSV row of a pay subsidy export
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "PaySubsidyID")]
    id: u64,
    #[serde(rename = "StartDate")]
    start_date: Option<NaiveDate>,
    #[serde(rename = "EndDate")]
    end_date: Option<NaiveDate>,
    #[serde(rename = "PaySubsidyPercent")]
    pay_subsidy_percent: u32,
    #[serde(rename = "WorkTimePercent")]
    work_time_percent: Option<Decimal>,
}

impl CsvRow {
    fn to_pay_subsidy(self) -> Result<PaySubsidy> {
        if !PAY_SUBSIDY_PERCENTS.contains(&self.pay_subsidy_percent) {
            return Err(CalculatorError::Parse(format!(
                "Unknown PaySubsidyPercent: {}",
                self.pay_subsidy_percent
            )));
        }

        let work_time_percent = self.work_time_percent.unwrap_or(Decimal::ONE_HUNDRED);
        if work_time_percent <= Decimal::ZERO || work_time_percent > Decimal::ONE_HUNDRED {
            return Err(CalculatorError::Parse(format!(
                "WorkTimePercent out of range: {}",
                work_time_percent
            )));
        }

        Ok(PaySubsidy {
            id: self.id,
            start_date: self.start_date,
            end_date: self.end_date,
            pay_subsidy_percent: self.pay_subsidy_percent,
            work_time_percent,
        })
    }
}

/// Load pay subsidies from a CSV file, ordered by start date
pub fn load_pay_subsidies<P: AsRef<Path>>(path: P) -> Result<Vec<PaySubsidy>> {
    let file = File::open(path)?;
    load_pay_subsidies_from_reader(file)
}

/// Load pay subsidies from any reader
pub fn load_pay_subsidies_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<PaySubsidy>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut subsidies = Vec::new();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        subsidies.push(row.to_pay_subsidy()?);
    }

    // Undated subsidies sort first; they block salary benefit calculation anyway
    subsidies.sort_by_key(|s| (s.start_date, s.id));
    Ok(subsidies)
}

/// Load a single benefit case from a JSON file
pub fn load_case<P: AsRef<Path>>(path: P) -> Result<BenefitCase> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Load a JSON array of benefit cases
pub fn load_cases<P: AsRef<Path>>(path: P) -> Result<Vec<BenefitCase>> {
    let file = File::open(path)?;
    load_cases_from_reader(BufReader::new(file))
}

pub fn load_cases_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<BenefitCase>> {
    let cases: Vec<BenefitCase> = serde_json::from_reader(reader)?;
    log::debug!("loaded {} benefit cases", cases.len());
    Ok(cases)
}

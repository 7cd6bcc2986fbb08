//! CSV export of a committed ledger for reports and handler review

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use super::row::CalculationRow;
use crate::error::Result;
use crate::periods::format_fi;

/// One CSV line; dates in the Finnish format used in descriptions
#[derive(Debug, Serialize)]
struct CsvRecord<'a> {
    #[serde(rename = "Ordering")]
    ordering: u32,
    #[serde(rename = "RowType")]
    row_type: &'static str,
    #[serde(rename = "StartDate")]
    start_date: String,
    #[serde(rename = "EndDate")]
    end_date: String,
    #[serde(rename = "Amount")]
    amount: String,
    #[serde(rename = "Description")]
    description_fi: &'a str,
}

impl<'a> From<&'a CalculationRow> for CsvRecord<'a> {
    fn from(row: &'a CalculationRow) -> Self {
        Self {
            ordering: row.ordering,
            row_type: row.row_type.as_str(),
            start_date: row.start_date.map(format_fi).unwrap_or_default(),
            end_date: row.end_date.map(format_fi).unwrap_or_default(),
            amount: row.amount.map(|a| format!("{:.2}", a)).unwrap_or_default(),
            description_fi: &row.description_fi,
        }
    }
}

/// Write rows in ledger order to any writer
pub fn write_rows_csv<W: Write>(writer: W, rows: &[CalculationRow]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut ordered: Vec<&CalculationRow> = rows.iter().collect();
    ordered.sort_by_key(|row| row.ordering);

    for row in ordered {
        csv_writer.serialize(CsvRecord::from(row))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write rows to a CSV file
pub fn write_rows_csv_file<P: AsRef<Path>>(path: P, rows: &[CalculationRow]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_rows_csv(file, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::RowType;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_csv_output() {
        let rows = vec![
            CalculationRow {
                row_type: RowType::HelsinkiBenefitTotalEur,
                ordering: 1,
                start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
                end_date: NaiveDate::from_ymd_opt(2024, 3, 31),
                amount: Some(dec!(1500)),
                description_fi: "Helsinki-lisä yhteensä".to_string(),
            },
            CalculationRow {
                row_type: RowType::Description,
                ordering: 0,
                start_date: None,
                end_date: None,
                amount: None,
                description_fi: "Laskentalogiikka ei käytössä".to_string(),
            },
        ];

        let mut buffer = Vec::new();
        write_rows_csv(&mut buffer, &rows).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Ordering,RowType,StartDate,EndDate,Amount,Description");
        assert_eq!(lines[1], "0,description,,,,Laskentalogiikka ei käytössä");
        assert_eq!(
            lines[2],
            "1,helsinki_benefit_total_eur,01.01.2024,31.03.2024,1500.00,Helsinki-lisä yhteensä"
        );
    }
}

//! CSV table adapter: Reads batch input into records.

use std::io::Read;

use crate::domain::{FieldValue, Record};

/// Read a CSV table with a header row into records.
///
/// Empty cells become missing values and numeric-looking cells become numbers;
/// everything else is kept as text for the normalizer to deal with.
///
/// # Errors
/// Returns `csv::Error` if the input is not valid CSV.
pub fn read_csv_records<R: Read>(reader: R) -> Result<Vec<Record>, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row?;
        records.push(
            headers
                .iter()
                .zip(row.iter())
                .map(|(column, cell)| (column, FieldValue::from_cell(cell)))
                .collect(),
        );
    }

    tracing::debug!("Read {} records ({} columns)", records.len(), headers.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_table() {
        let csv = "id,Age,Gender,Diabetes\n7,0.5,Male,\n8,0.2,0.0,1\n";
        let records = read_csv_records(csv.as_bytes()).expect("Should parse");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("Age"), Some(&FieldValue::Number(0.5)));
        assert_eq!(records[0].get("Gender"), Some(&FieldValue::Text("Male".into())));
        assert!(records[0].get("Diabetes").expect("present").is_missing());
        assert_eq!(records[1].get("Gender"), Some(&FieldValue::Number(0.0)));
        assert_eq!(records[1].id(), Some(crate::RecordId::Integer(8)));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let csv = "Age,BMI\n0.5\n";
        assert!(read_csv_records(csv.as_bytes()).is_err());
    }
}

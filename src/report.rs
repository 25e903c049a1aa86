use super::Error;
use indexmap::IndexMap;
use std::io::{Read, Write};

/// Label columns that carry identity rather than metrics.
pub const LABEL_COLUMNS: &[&str] = &["Benchmark", "bmk", "point", "workload"];

/// One row of a report table: label columns plus numeric columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub labels: IndexMap<String, String>,
    pub values: IndexMap<String, f64>,
}

/// Column order over a set of rows: labels first, then numeric columns,
/// both in first-seen order.
#[must_use]
pub fn columns(rows: &[Row]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for row in rows {
        for key in row.labels.keys().chain(row.values.keys()) {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

pub fn write_csv(rows: &[Row], writer: impl Write) -> Result<(), Error> {
    let mut csv_writer = csv::WriterBuilder::new().from_writer(writer);
    let columns = columns(rows);
    csv_writer.write_record(&columns)?;
    for row in rows {
        let record: Vec<String> = columns
            .iter()
            .map(|col| {
                row.labels
                    .get(col)
                    .cloned()
                    .or_else(|| row.values.get(col).map(ToString::to_string))
                    .unwrap_or_default()
            })
            .collect();
        csv_writer.write_record(&record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Reads a table written by `write_csv` (or any headered CSV). Columns
/// in `LABEL_COLUMNS` stay strings, everything else is parsed as a
/// number; empty cells are skipped.
pub fn read_csv(reader: impl Read) -> Result<Vec<Row>, Error> {
    let mut csv_reader = csv::ReaderBuilder::new().from_reader(reader);
    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(ToString::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let mut row = Row::default();
        for (header, cell) in headers.iter().zip(record.iter()) {
            if cell.is_empty() {
                continue;
            }
            if LABEL_COLUMNS.contains(&header.as_str()) {
                row.labels.insert(header.clone(), cell.to_string());
            } else {
                let value: f64 = cell.parse().map_err(|_| Error::ParseValue {
                    value: cell.to_string(),
                })?;
                row.values.insert(header.clone(), value);
            }
        }
        rows.push(row);
    }
    Ok(rows)
}

//! Spreadsheet imports.
//!
//! Parsing validates every row up front and yields a plan; applying the
//! plan is the repository's job and happens in a single transaction.

mod placements;
mod users;

use std::collections::HashMap;

use csv::StringRecord;
use serde_json::json;

pub use placements::{
    ContactRow, PLACEMENT_COLUMNS, PlacementImportPlan, PlacementImportReport, PlacementImportRow,
};
pub use users::{UserImportPlan, UserImportReport, UserImportRow};

use super::Error;

/// Column positions keyed by header name.
struct Columns(HashMap<String, usize>);

impl Columns {
    fn from_headers(headers: &StringRecord) -> Self {
        Self(
            headers
                .iter()
                .enumerate()
                .map(|(idx, name)| (name.trim().to_owned(), idx))
                .collect(),
        )
    }

    fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    fn missing<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        let mut missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|name| !self.contains(name))
            .collect();
        missing.sort_unstable();
        missing
    }

    /// Trimmed cell; empty when the column or cell is absent.
    fn get<'r>(&self, record: &'r StringRecord, name: &str) -> &'r str {
        self.0
            .get(name)
            .and_then(|idx| record.get(*idx))
            .map_or("", str::trim)
    }
}

/// Headers and records of a CSV document.
struct Sheet {
    columns: Columns,
    records: Vec<(usize, StringRecord)>,
}

impl Sheet {
    /// Read `content`; `None` when there is no header row.
    ///
    /// Records are numbered as a spreadsheet would, the header being row 1.
    fn read(content: &str) -> Result<Option<Self>, Vec<String>> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());
        let headers = match reader.headers() {
            Ok(headers) if headers.iter().any(|name| !name.trim().is_empty()) => headers.clone(),
            Ok(_) => return Ok(None),
            Err(err) => return Err(vec![format!("Unreadable CSV: {err}")]),
        };
        let mut records = Vec::new();
        let mut errors = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let row = idx + 2;
            match result {
                Ok(record) => records.push((row, record)),
                Err(err) => errors.push(format!("Row {row}: {err}")),
            }
        }
        if errors.is_empty() {
            Ok(Some(Self {
                columns: Columns::from_headers(&headers),
                records,
            }))
        } else {
            Err(errors)
        }
    }
}

/// Invalid-request error carrying every message under `details.errors`.
fn rejected(errors: Vec<String>) -> Error {
    let message = errors
        .first()
        .cloned()
        .unwrap_or_else(|| "import rejected".to_owned());
    Error::invalid_request(message).with_details(json!({ "errors": errors }))
}

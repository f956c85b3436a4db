use std::path::Path;

use csv::ReaderBuilder;

use bids_model::Sheet;

use crate::error::{IngestError, Result};

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Read a CSV file into a [`Sheet`].
///
/// The first non-blank record is the header row; data rows are padded or
/// truncated to the header width and all-blank rows are dropped.
pub fn read_csv_sheet(path: &Path) -> Result<Sheet> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|source| IngestError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("sheet")
        .to_string();

    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| IngestError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let row: Vec<String> = record.iter().map(normalize_cell).collect();
        if row.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        raw_rows.push(row);
    }

    let Some(header_row) = raw_rows.first() else {
        return Ok(Sheet::new(name, Vec::new()));
    };
    let headers: Vec<String> = header_row.iter().map(|value| normalize_header(value)).collect();

    let mut sheet = Sheet::new(name, headers);
    for record in raw_rows.iter().skip(1) {
        let mut row = Vec::with_capacity(sheet.headers.len());
        for idx in 0..sheet.headers.len() {
            let value = record.get(idx).map(String::as_str).unwrap_or("");
            row.push(value.to_string());
        }
        sheet.push_row(row);
    }
    Ok(sheet)
}

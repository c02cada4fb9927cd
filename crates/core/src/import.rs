//! Header-driven CSV import parsing.
//!
//! The first row names columns; data rows follow. Headers are matched
//! against an importer's column declarations by canonical key or by
//! display label, case-insensitively, so a file exported from a list
//! view re-imports without editing. Unknown headers are ignored, which
//! lets users keep extra spreadsheet columns around.
//!
//! Parsing is all-or-nothing only for structural problems (malformed
//! CSV, missing required columns). Cell-level problems are reported per
//! row so one bad line never blocks the rest of the file.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::export::csv::UTF8_BOM;
use crate::validation;

// ---------------------------------------------------------------------------
// Column declarations
// ---------------------------------------------------------------------------

/// One column an importer understands.
#[derive(Debug, Clone, Copy)]
pub struct ImportColumn {
    /// Canonical key, also accepted as a header spelling.
    pub key: &'static str,
    /// Display label as written by the exporters.
    pub label: &'static str,
    /// Required columns must appear in the header row; a file without
    /// them is rejected before any row is processed.
    pub required: bool,
}

/// Columns understood by the asset importer.
pub const ASSET_COLUMNS: &[ImportColumn] = &[
    ImportColumn { key: "inventory_code", label: "Inventory Code", required: true },
    ImportColumn { key: "product_name", label: "Product", required: true },
    ImportColumn { key: "serial_number", label: "Serial Number", required: false },
    ImportColumn { key: "description", label: "Description", required: false },
    ImportColumn { key: "status", label: "Status", required: false },
    ImportColumn { key: "section", label: "Section", required: false },
    ImportColumn { key: "location", label: "Location", required: false },
    ImportColumn { key: "purchase_date", label: "Purchase Date", required: false },
    ImportColumn { key: "invoice_number", label: "Invoice Number", required: false },
    ImportColumn { key: "supplier", label: "Supplier", required: false },
    ImportColumn { key: "warranty_expiry_date", label: "Warranty Expiry", required: false },
    // Legacy files encoded an initial movement inside free-text notes.
    ImportColumn { key: "movement_notes", label: "Movement Notes", required: false },
];

/// Columns understood by the license importer.
pub const LICENSE_COLUMNS: &[ImportColumn] = &[
    ImportColumn { key: "software_name", label: "Software", required: true },
    ImportColumn { key: "license_key", label: "License Key", required: true },
    ImportColumn { key: "license_type", label: "Type", required: true },
    ImportColumn { key: "version", label: "Version", required: false },
    ImportColumn { key: "seats", label: "Seats", required: false },
    ImportColumn { key: "purchase_date", label: "Purchase Date", required: false },
    ImportColumn { key: "expiry_date", label: "Expiry Date", required: false },
    ImportColumn { key: "supplier", label: "Supplier", required: false },
    ImportColumn { key: "assigned_email", label: "Assigned To", required: false },
    ImportColumn { key: "inventory_code", label: "Installed On", required: false },
];

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("CSV is malformed: {0}")]
    Malformed(String),

    #[error("Missing required columns: {}", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    #[error("CSV has no data rows")]
    Empty,
}

/// One parsed data row. Blank cells are absent rather than empty
/// strings, so "missing" checks are uniform.
#[derive(Debug, Clone)]
pub struct RawRow {
    /// 1-based line number in the uploaded file (the header is line 1).
    pub line: u64,
    values: HashMap<&'static str, String>,
}

impl RawRow {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Cell that must carry a value; the error names the column key.
    pub fn required(&self, key: &str) -> Result<&str, String> {
        self.get(key)
            .ok_or_else(|| format!("Missing value for required column '{key}'"))
    }

    /// Optional `YYYY-MM-DD` cell.
    pub fn date(&self, key: &str) -> Result<Option<NaiveDate>, String> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => validation::parse_iso_date(raw)
                .map(Some)
                .map_err(|e| format!("Column '{key}': {e}")),
        }
    }

    /// Optional integer cell.
    pub fn integer(&self, key: &str) -> Result<Option<i64>, String> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<i64>()
                .map(Some)
                .map_err(|_| format!("Column '{key}': '{raw}' is not a whole number")),
        }
    }
}

/// Parse an uploaded CSV against an importer's column declarations.
pub fn parse_rows(data: &[u8], columns: &[ImportColumn]) -> Result<Vec<RawRow>, ImportError> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(data);

    let headers = reader
        .headers()
        .map_err(|e| ImportError::Malformed(e.to_string()))?
        .clone();

    // Header position -> canonical key. Unknown headers map to nothing.
    let mapping: Vec<Option<&'static str>> = headers
        .iter()
        .map(|header| {
            columns
                .iter()
                .find(|c| {
                    header.eq_ignore_ascii_case(c.key) || header.eq_ignore_ascii_case(c.label)
                })
                .map(|c| c.key)
        })
        .collect();

    let missing: Vec<String> = columns
        .iter()
        .filter(|c| c.required && !mapping.contains(&Some(c.key)))
        .map(|c| c.key.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ImportError::MissingColumns { missing });
    }

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| ImportError::Malformed(e.to_string()))?;
        // Quoted cells may span lines; the reader tracks real positions.
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(idx as u64 + 2);
        let mut values = HashMap::new();
        for (pos, key) in mapping.iter().enumerate() {
            let Some(key) = key else { continue };
            if let Some(cell) = record.get(pos) {
                if !cell.is_empty() {
                    values.insert(*key, cell.to_string());
                }
            }
        }
        rows.push(RawRow { line, values });
    }
    if rows.is_empty() {
        return Err(ImportError::Empty);
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Outcome report
// ---------------------------------------------------------------------------

/// A rejected row with its 1-based line number.
#[derive(Debug, Clone, Serialize)]
pub struct RowError {
    pub line: u64,
    pub message: String,
}

/// Outcome of importing one file: totals plus per-row failures.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub total_rows: usize,
    pub imported: usize,
    pub failed: usize,
    pub errors: Vec<RowError>,
}

impl ImportReport {
    pub fn new(total_rows: usize) -> Self {
        Self {
            total_rows,
            imported: 0,
            failed: 0,
            errors: Vec::new(),
        }
    }

    pub fn record_success(&mut self) {
        self.imported += 1;
    }

    pub fn record_failure(&mut self, line: u64, message: impl Into<String>) {
        self.failed += 1;
        self.errors.push(RowError {
            line,
            message: message.into(),
        });
    }

    /// True when every row imported.
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const COLS: &[ImportColumn] = &[
        ImportColumn { key: "inventory_code", label: "Inventory Code", required: true },
        ImportColumn { key: "product_name", label: "Product", required: true },
        ImportColumn { key: "purchase_date", label: "Purchase Date", required: false },
        ImportColumn { key: "seats", label: "Seats", required: false },
    ];

    #[test]
    fn headers_match_by_key() {
        let rows = parse_rows(
            b"inventory_code,product_name\nINV-1,Laptop\n",
            COLS,
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("inventory_code"), Some("INV-1"));
        assert_eq!(rows[0].get("product_name"), Some("Laptop"));
    }

    #[test]
    fn headers_match_by_label_case_insensitively() {
        let rows = parse_rows(
            b"INVENTORY CODE,Product\nINV-2,Dock\n",
            COLS,
        )
        .unwrap();
        assert_eq!(rows[0].get("inventory_code"), Some("INV-2"));
    }

    #[test]
    fn utf8_bom_is_stripped_before_header_matching() {
        let mut data = Vec::from(UTF8_BOM);
        data.extend_from_slice(b"inventory_code,product_name\nINV-3,Mouse\n");
        let rows = parse_rows(&data, COLS).unwrap();
        assert_eq!(rows[0].get("inventory_code"), Some("INV-3"));
    }

    #[test]
    fn missing_required_columns_reject_the_whole_file() {
        let err = parse_rows(b"product_name\nLaptop\n", COLS).unwrap_err();
        assert_matches!(err, ImportError::MissingColumns { missing } if missing == vec!["inventory_code"]);
    }

    #[test]
    fn missing_optional_columns_are_fine() {
        let rows = parse_rows(b"inventory_code,product_name\nINV-4,Hub\n", COLS).unwrap();
        assert_eq!(rows[0].get("purchase_date"), None);
    }

    #[test]
    fn unknown_headers_are_ignored() {
        let rows = parse_rows(
            b"inventory_code,product_name,color\nINV-5,Lamp,red\n",
            COLS,
        )
        .unwrap();
        assert_eq!(rows[0].get("color"), None);
        assert_eq!(rows[0].get("product_name"), Some("Lamp"));
    }

    #[test]
    fn blank_cells_are_absent_not_empty() {
        let rows = parse_rows(
            b"inventory_code,product_name,purchase_date\nINV-6,Desk,\n",
            COLS,
        )
        .unwrap();
        assert_eq!(rows[0].get("purchase_date"), None);
        assert!(rows[0].required("purchase_date").is_err());
    }

    #[test]
    fn cells_are_trimmed() {
        let rows = parse_rows(
            b"inventory_code,product_name\n  INV-7  ,  Chair \n",
            COLS,
        )
        .unwrap();
        assert_eq!(rows[0].get("inventory_code"), Some("INV-7"));
        assert_eq!(rows[0].get("product_name"), Some("Chair"));
    }

    #[test]
    fn line_numbers_start_after_the_header() {
        let rows = parse_rows(
            b"inventory_code,product_name\nINV-8,A\nINV-9,B\n",
            COLS,
        )
        .unwrap();
        assert_eq!(rows[0].line, 2);
        assert_eq!(rows[1].line, 3);
    }

    #[test]
    fn quoted_multiline_cells_keep_line_numbers_honest() {
        let rows = parse_rows(
            b"inventory_code,product_name\nINV-10,\"two\nlines\"\nINV-11,C\n",
            COLS,
        )
        .unwrap();
        assert_eq!(rows[0].line, 2);
        assert_eq!(rows[1].line, 4);
    }

    #[test]
    fn short_rows_leave_trailing_cells_absent() {
        let rows = parse_rows(b"inventory_code,product_name\nINV-12\n", COLS).unwrap();
        assert_eq!(rows[0].get("product_name"), None);
    }

    #[test]
    fn header_only_file_is_empty() {
        let err = parse_rows(b"inventory_code,product_name\n", COLS).unwrap_err();
        assert_matches!(err, ImportError::Empty);
    }

    #[test]
    fn date_cells_parse_iso_or_name_the_column() {
        let rows = parse_rows(
            b"inventory_code,product_name,purchase_date\nINV-13,Cam,2024-02-29\nINV-14,Mic,02/03/2024\n",
            COLS,
        )
        .unwrap();
        assert_eq!(
            rows[0].date("purchase_date").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        let err = rows[1].date("purchase_date").unwrap_err();
        assert!(err.contains("purchase_date"));
    }

    #[test]
    fn integer_cells_parse_or_name_the_column() {
        let rows = parse_rows(
            b"inventory_code,product_name,seats\nINV-15,Suite,12\nINV-16,Suite,many\n",
            COLS,
        )
        .unwrap();
        assert_eq!(rows[0].integer("seats").unwrap(), Some(12));
        assert!(rows[1].integer("seats").unwrap_err().contains("seats"));
    }

    #[test]
    fn report_tracks_totals_and_failures() {
        let mut report = ImportReport::new(3);
        report.record_success();
        report.record_failure(2, "bad date");
        report.record_success();
        assert_eq!(report.imported, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.errors[0].line, 2);
        assert!(!report.is_clean());
        assert!(ImportReport::new(0).is_clean());
    }

    #[test]
    fn exporter_labels_round_trip_as_headers() {
        // The asset exporter writes labels like "Inventory Code"; those
        // headers must come straight back in.
        let rows = parse_rows(
            b"Inventory Code,Product,Warranty Expiry\nINV-1,Laptop,2025-01-01\n",
            ASSET_COLUMNS,
        )
        .unwrap();
        assert_eq!(rows[0].get("inventory_code"), Some("INV-1"));
        assert_eq!(rows[0].get("warranty_expiry_date"), Some("2025-01-01"));
    }
}

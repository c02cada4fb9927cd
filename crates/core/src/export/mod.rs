//! Export writers for the supported download formats.
//!
//! Every exporter consumes a [`Table`]: a snapshot of the same
//! filtered/sorted rows the list endpoint would return, flattened to
//! display strings through the record's column allow-list. Building the
//! table from [`crate::view::filter_and_sort`] output is what guarantees
//! an export matches the screen it was requested from.

pub mod csv;
pub mod html;
pub mod pdf;

use chrono::NaiveDate;

use crate::view::ListRecord;

/// A fully formatted table ready for any writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Heading printed at the top of PDF and HTML output.
    pub title: String,
    /// Column display labels, in allow-list order.
    pub headers: Vec<String>,
    /// Display-formatted cells, one inner vec per record.
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Snapshot filtered rows into display strings.
    pub fn from_records<R: ListRecord>(title: impl Into<String>, records: &[&R]) -> Table {
        let columns = R::columns();
        Table {
            title: title.into(),
            headers: columns.iter().map(|c| c.label.to_string()).collect(),
            rows: records
                .iter()
                .map(|r| columns.iter().map(|c| r.cell(c.key).display()).collect())
                .collect(),
        }
    }
}

/// Download filename: `{entity}-{YYYY-MM-DD}.{extension}`.
pub fn export_filename(entity: &str, today: NaiveDate, extension: &str) -> String {
    format!("{entity}-{}.{extension}", today.format("%Y-%m-%d"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{CellValue, Column, ColumnKind};

    struct Item {
        name: &'static str,
        tagged: Option<NaiveDate>,
    }

    impl ListRecord for Item {
        fn columns() -> &'static [Column] {
            const COLS: &[Column] = &[
                Column { key: "name", label: "Name", kind: ColumnKind::Text },
                Column { key: "tagged", label: "Tagged On", kind: ColumnKind::Date },
            ];
            COLS
        }

        fn cell(&self, key: &str) -> CellValue {
            match key {
                "name" => CellValue::Text(self.name.to_string()),
                "tagged" => self.tagged.map(CellValue::Date).unwrap_or(CellValue::Missing),
                _ => CellValue::Missing,
            }
        }
    }

    #[test]
    fn table_uses_column_labels_and_display_values() {
        let items = vec![
            Item { name: "Router", tagged: NaiveDate::from_ymd_opt(2024, 2, 1) },
            Item { name: "Switch", tagged: None },
        ];
        let refs: Vec<&Item> = items.iter().collect();
        let table = Table::from_records("Network Gear", &refs);

        assert_eq!(table.title, "Network Gear");
        assert_eq!(table.headers, vec!["Name", "Tagged On"]);
        assert_eq!(table.rows[0], vec!["Router", "2024-02-01"]);
        // Missing cells render as empty strings, not "null".
        assert_eq!(table.rows[1], vec!["Switch", ""]);
    }

    #[test]
    fn filename_embeds_entity_and_date() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();
        assert_eq!(export_filename("assets", today, "csv"), "assets-2024-06-05.csv");
        assert_eq!(export_filename("licenses", today, "pdf"), "licenses-2024-06-05.pdf");
    }
}

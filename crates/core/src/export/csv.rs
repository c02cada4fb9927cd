//! CSV writer for list exports.
//!
//! Output targets spreadsheet tools: a UTF-8 BOM so non-ASCII text
//! survives a double-click into Excel, every field quoted with embedded
//! quotes doubled, CRLF row terminators.

use csv::{QuoteStyle, Terminator, WriterBuilder};

use super::Table;

/// Byte-order mark emitted before the header row.
pub const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// Serialize a table to CSV bytes, header row first.
pub fn write_csv(table: &Table) -> Result<Vec<u8>, csv::Error> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::CRLF)
        .from_writer(Vec::from(UTF8_BOM));
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: Vec<Vec<&str>>) -> Table {
        Table {
            title: "Assets".to_string(),
            headers: vec!["Name".to_string(), "Notes".to_string()],
            rows: rows
                .into_iter()
                .map(|r| r.into_iter().map(str::to_string).collect())
                .collect(),
        }
    }

    fn body(bytes: &[u8]) -> String {
        assert!(bytes.starts_with(UTF8_BOM), "output must start with a BOM");
        String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap()
    }

    #[test]
    fn quotes_every_field_and_uses_crlf() {
        let bytes = write_csv(&table(vec![vec!["Dell", "shelf 3"]])).unwrap();
        assert_eq!(body(&bytes), "\"Name\",\"Notes\"\r\n\"Dell\",\"shelf 3\"\r\n");
    }

    #[test]
    fn doubles_embedded_quotes() {
        let bytes = write_csv(&table(vec![vec!["Monitor 24\"", "a,b"]])).unwrap();
        assert_eq!(
            body(&bytes),
            "\"Name\",\"Notes\"\r\n\"Monitor 24\"\"\",\"a,b\"\r\n"
        );
    }

    #[test]
    fn newlines_inside_cells_stay_quoted() {
        let bytes = write_csv(&table(vec![vec!["Router", "line one\nline two"]])).unwrap();
        assert_eq!(
            body(&bytes),
            "\"Name\",\"Notes\"\r\n\"Router\",\"line one\nline two\"\r\n"
        );
    }

    #[test]
    fn empty_table_still_writes_the_header_row() {
        let bytes = write_csv(&table(vec![])).unwrap();
        assert_eq!(body(&bytes), "\"Name\",\"Notes\"\r\n");
    }

    #[test]
    fn non_ascii_text_round_trips_as_utf8() {
        let bytes = write_csv(&table(vec![vec!["Impresora láser", "área común"]])).unwrap();
        assert!(body(&bytes).contains("Impresora láser"));
    }
}

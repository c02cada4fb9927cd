//! Printable HTML export.
//!
//! The original reporting screen rendered a fixed A4 print template;
//! this keeps that format available for deployments that archive the
//! print view instead of the PDF. Every piece of record content passes
//! through [`escape_html`] before interpolation, so a malicious cell
//! value ends up as inert text in the report.

use super::Table;

const PRINT_CSS: &str = "\
@page { size: A4; margin: 12mm; }\n\
body { font-family: Helvetica, Arial, sans-serif; font-size: 10px; margin: 0; color: #111; }\n\
h1 { font-size: 16px; margin: 0 0 8px 0; }\n\
table { border-collapse: collapse; width: 100%; }\n\
th, td { border: 1px solid #555; padding: 3px 5px; text-align: left; vertical-align: top; }\n\
th { background: #eee; }\n\
tr { page-break-inside: avoid; }\n";

/// Escape text for interpolation into HTML element content or
/// double-quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Render a table as a self-contained printable page.
pub fn write_html(table: &Table) -> String {
    let mut out = String::with_capacity(1024 + table.rows.len() * 128);
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>");
    out.push_str(&escape_html(&table.title));
    out.push_str("</title>\n<style>\n");
    out.push_str(PRINT_CSS);
    out.push_str("</style>\n</head>\n<body>\n<h1>");
    out.push_str(&escape_html(&table.title));
    out.push_str("</h1>\n<table>\n<thead>\n<tr>");
    for header in &table.headers {
        out.push_str("<th>");
        out.push_str(&escape_html(header));
        out.push_str("</th>");
    }
    out.push_str("</tr>\n</thead>\n<tbody>\n");
    for row in &table.rows {
        out.push_str("<tr>");
        for cell in row {
            out.push_str("<td>");
            out.push_str(&escape_html(cell));
            out.push_str("</td>");
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table {
            title: "Assets".to_string(),
            headers: vec!["Name".to_string()],
            rows: vec![vec!["Dell".to_string()]],
        }
    }

    #[test]
    fn escape_html_neutralizes_markup() {
        assert_eq!(
            escape_html(r#"<script>alert("x")</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("a & b's"), "a &amp; b&#39;s");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn page_is_sized_for_a4_print() {
        let html = write_html(&table());
        assert!(html.contains("@page { size: A4;"));
        assert!(html.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn headers_and_cells_are_rendered() {
        let html = write_html(&table());
        assert!(html.contains("<th>Name</th>"));
        assert!(html.contains("<td>Dell</td>"));
        assert!(html.contains("<h1>Assets</h1>"));
    }

    #[test]
    fn hostile_cell_content_is_escaped_everywhere() {
        let mut t = table();
        t.title = "<img src=x onerror=alert(1)>".to_string();
        t.rows = vec![vec!["<b>bold</b>".to_string()]];
        let html = write_html(&t);
        assert!(!html.contains("<img"));
        assert!(!html.contains("<b>"));
        assert!(html.contains("&lt;img src=x onerror=alert(1)&gt;"));
        assert!(html.contains("<td>&lt;b&gt;bold&lt;/b&gt;</td>"));
    }
}

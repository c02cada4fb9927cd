//! PDF writer for list exports, composed directly with `lopdf`.
//!
//! The document is built object by object (fonts, per-page content
//! streams, page tree, catalog) with no timestamps or generated IDs, so
//! the same table always produces byte-identical output. Long cells are
//! truncated to their column width rather than wrapped; the CSV export
//! is the lossless format.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use super::Table;

// A4 landscape, in PDF points.
const PAGE_WIDTH: f32 = 841.89;
const PAGE_HEIGHT: f32 = 595.28;
const MARGIN: f32 = 36.0;

const TITLE_SIZE: f32 = 14.0;
const HEADER_SIZE: f32 = 9.0;
const BODY_SIZE: f32 = 8.0;
const ROW_HEIGHT: f32 = 13.0;
/// Vertical space reserved for the title line above the header row.
const TITLE_GAP: f32 = 30.0;
/// Approximate Helvetica glyph width as a fraction of the font size,
/// used to decide how many characters fit a column.
const GLYPH_FACTOR: f32 = 0.5;

struct Layout {
    col_width: f32,
    max_chars: usize,
    rows_per_page: usize,
}

impl Layout {
    fn for_columns(count: usize) -> Layout {
        let cols = count.max(1) as f32;
        let col_width = (PAGE_WIDTH - 2.0 * MARGIN) / cols;
        let max_chars = ((col_width - 4.0) / (BODY_SIZE * GLYPH_FACTOR)).max(1.0) as usize;
        let rows_per_page =
            (((PAGE_HEIGHT - 2.0 * MARGIN - TITLE_GAP - ROW_HEIGHT) / ROW_HEIGHT) as usize).max(1);
        Layout {
            col_width,
            max_chars,
            rows_per_page,
        }
    }
}

/// Compose a table into a complete PDF document.
pub fn write_pdf(table: &Table) -> Result<Vec<u8>, lopdf::Error> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let body_font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => body_font_id,
            "F2" => bold_font_id,
        },
    });

    let layout = Layout::for_columns(table.headers.len());
    // An empty table still yields one page carrying title and headers.
    let chunks: Vec<&[Vec<String>]> = if table.rows.is_empty() {
        vec![&[]]
    } else {
        table.rows.chunks(layout.rows_per_page).collect()
    };

    let mut kids: Vec<Object> = Vec::with_capacity(chunks.len());
    for chunk in &chunks {
        let content = Content {
            operations: page_operations(table, chunk, &layout),
        };
        let stream_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => stream_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}

/// Content stream for one page: title, bold header row, an underline,
/// then the chunk's body rows.
fn page_operations(table: &Table, rows: &[Vec<String>], layout: &Layout) -> Vec<Operation> {
    let mut ops = Vec::new();
    let top = PAGE_HEIGHT - MARGIN;

    text_at(&mut ops, "F2", TITLE_SIZE, MARGIN, top - TITLE_SIZE, &truncate(&table.title, 120));

    let header_y = top - TITLE_GAP - HEADER_SIZE;
    for (i, header) in table.headers.iter().enumerate() {
        text_at(
            &mut ops,
            "F2",
            HEADER_SIZE,
            MARGIN + i as f32 * layout.col_width,
            header_y,
            &truncate(header, layout.max_chars),
        );
    }

    let rule_y = header_y - 3.0;
    ops.push(Operation::new("w", vec![0.7f32.into()]));
    ops.push(Operation::new("m", vec![MARGIN.into(), rule_y.into()]));
    ops.push(Operation::new(
        "l",
        vec![(PAGE_WIDTH - MARGIN).into(), rule_y.into()],
    ));
    ops.push(Operation::new("S", vec![]));

    let mut y = header_y - ROW_HEIGHT;
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            text_at(
                &mut ops,
                "F1",
                BODY_SIZE,
                MARGIN + i as f32 * layout.col_width,
                y,
                &truncate(cell, layout.max_chars),
            );
        }
        y -= ROW_HEIGHT;
    }
    ops
}

fn text_at(ops: &mut Vec<Operation>, font: &str, size: f32, x: f32, y: f32, text: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec![font.into(), size.into()]));
    ops.push(Operation::new("Td", vec![x.into(), y.into()]));
    ops.push(Operation::new(
        "Tj",
        vec![Object::string_literal(encode_win_ansi(text))],
    ));
    ops.push(Operation::new("ET", vec![]));
}

/// WinAnsi covers printable ASCII plus the Latin-1 block above 0x9F;
/// anything else becomes '?'.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            let code = c as u32;
            if (0x20..=0x7E).contains(&code) || (0xA0..=0xFF).contains(&code) {
                code as u8
            } else {
                b'?'
            }
        })
        .collect()
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars <= 3 {
        return text.chars().take(max_chars).collect();
    }
    let kept: String = text.chars().take(max_chars - 3).collect();
    format!("{kept}...")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    fn table(rows: usize) -> Table {
        Table {
            title: "Asset Inventory".to_string(),
            headers: vec!["Code".to_string(), "Product".to_string()],
            rows: (0..rows)
                .map(|i| vec![format!("INV-{i:04}"), format!("Device {i}")])
                .collect(),
        }
    }

    #[test]
    fn produces_a_parsable_pdf() {
        let bytes = write_pdf(&table(3)).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        let parsed = Document::load_mem(&bytes).unwrap();
        assert_eq!(parsed.get_pages().len(), 1);
    }

    #[test]
    fn output_is_byte_deterministic() {
        let t = table(10);
        assert_eq!(write_pdf(&t).unwrap(), write_pdf(&t).unwrap());
    }

    #[test]
    fn title_and_cells_appear_in_the_content_stream() {
        // Streams are left uncompressed, so literals are visible.
        let bytes = write_pdf(&table(2)).unwrap();
        assert!(contains(&bytes, b"(Asset Inventory)"));
        assert!(contains(&bytes, b"(INV-0001)"));
        assert!(contains(&bytes, b"(Device 1)"));
    }

    #[test]
    fn long_tables_flow_onto_multiple_pages() {
        let layout = Layout::for_columns(2);
        let bytes = write_pdf(&table(layout.rows_per_page * 2 + 1)).unwrap();
        let parsed = Document::load_mem(&bytes).unwrap();
        assert_eq!(parsed.get_pages().len(), 3);
    }

    #[test]
    fn empty_table_still_renders_one_page_with_headers() {
        let bytes = write_pdf(&table(0)).unwrap();
        let parsed = Document::load_mem(&bytes).unwrap();
        assert_eq!(parsed.get_pages().len(), 1);
        assert!(contains(&bytes, b"(Code)"));
    }

    #[test]
    fn oversized_cells_are_truncated_not_wrapped() {
        let mut t = table(1);
        t.rows[0][1] = "x".repeat(500);
        let bytes = write_pdf(&t).unwrap();
        assert!(!contains(&bytes, "x".repeat(500).as_bytes()));
        assert!(contains(&bytes, b"...)"));
    }

    #[test]
    fn non_latin_text_degrades_to_placeholders() {
        assert_eq!(encode_win_ansi("café"), b"caf\xe9".to_vec());
        assert_eq!(encode_win_ansi("札幌"), b"??".to_vec());
    }
}

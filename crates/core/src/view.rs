//! Shared list-view engine: filtering, sorting, and pagination.
//!
//! Exactly one implementation of the list semantics exists, and both the
//! interactive list endpoints and the export pipeline consume it, so a
//! filtered export always contains precisely the rows the user was
//! looking at. Records describe themselves through [`ListRecord`]: an
//! allow-list of columns plus a display-formatted cell per column. All
//! matching happens against display values, which is what the original
//! screens did (a status filter matches "In Use", not `in_use`).

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Columns and cells
// ---------------------------------------------------------------------------

/// Value class of a column, which decides how it filters and sorts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Date,
    Integer,
}

/// One entry in an entity's column allow-list.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    /// Stable key used in filter/sort specs and import headers.
    pub key: &'static str,
    /// Human label used for export headers and display.
    pub label: &'static str,
    pub kind: ColumnKind,
}

/// A single display-formatted cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Text(String),
    Date(NaiveDate),
    Integer(i64),
    Missing,
}

impl CellValue {
    /// The text rendered in list views and exports. Missing cells render
    /// as the empty string.
    pub fn display(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
            Self::Integer(n) => n.to_string(),
            Self::Missing => String::new(),
        }
    }
}

/// A record that can be listed, filtered, sorted, and exported.
pub trait ListRecord {
    /// Allow-list of filter/sort columns. Keys outside this list are
    /// rejected, which is what keeps filter input out of SQL entirely.
    fn columns() -> &'static [Column];

    /// Display-formatted value for a column key. Unknown keys return
    /// [`CellValue::Missing`]; they cannot be reached through a validated
    /// spec.
    fn cell(&self, key: &str) -> CellValue;

    /// Column the secondary status multi-select applies to, if the
    /// entity has one.
    fn status_column() -> Option<&'static str> {
        None
    }
}

// ---------------------------------------------------------------------------
// Specs
// ---------------------------------------------------------------------------

/// Primary attribute filter plus the status multi-select.
///
/// Text and enum attributes take a case-insensitive substring (`text`);
/// date attributes take an inclusive `[date_from, date_to]` range with
/// either bound optional. The status selection is ANDed on top.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Column key the primary filter applies to.
    pub attribute: Option<String>,
    pub text: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    /// Status labels to keep; empty means no status filtering.
    #[serde(default)]
    pub statuses: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortSpec {
    /// Column key; must be in the record's allow-list.
    pub column: String,
    pub direction: SortDirection,
}

/// Everything the view engine needs besides the rows themselves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewSpec {
    #[serde(default)]
    pub filter: FilterSpec,
    #[serde(default)]
    pub sort: Option<SortSpec>,
}

/// Preset page sizes offered by the UI. Anything else falls back to the
/// default.
pub const PAGE_SIZES: &[usize] = &[10, 25, 50, 100];

pub const DEFAULT_PAGE_SIZE: usize = 25;

/// 1-based page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSpec {
    pub page: usize,
    pub per_page: usize,
}

impl Default for PageSpec {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageSpec {
    /// Clamp to a 1-based page index and a preset page size.
    pub fn normalized(self) -> PageSpec {
        PageSpec {
            page: self.page.max(1),
            per_page: if PAGE_SIZES.contains(&self.per_page) {
                self.per_page
            } else {
                DEFAULT_PAGE_SIZE
            },
        }
    }
}

/// One page of results with the totals the pager needs.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ViewError {
    #[error("Unknown filter attribute: '{0}'")]
    UnknownAttribute(String),

    #[error("Unknown sort column: '{0}'")]
    UnknownSortColumn(String),

    #[error("Filter text or date range given without an attribute")]
    MissingAttribute,

    #[error("Attribute '{0}' holds dates; filter it with date_from/date_to")]
    TextOnDateColumn(String),

    #[error("Attribute '{0}' does not hold dates; filter it with text")]
    DateRangeOnTextColumn(String),
}

impl From<ViewError> for CoreError {
    fn from(err: ViewError) -> Self {
        CoreError::Validation(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Apply the filter and sort of `spec` to `records`, preserving input
/// order where the sort considers rows equal (stable sort).
///
/// Validation is up front: an invalid spec fails identically on empty
/// and non-empty data.
pub fn filter_and_sort<'a, R: ListRecord>(
    records: &'a [R],
    spec: &ViewSpec,
) -> Result<Vec<&'a R>, ViewError> {
    let columns = R::columns();

    let primary = match &spec.filter.attribute {
        Some(key) => Some(
            columns
                .iter()
                .find(|c| c.key == key)
                .ok_or_else(|| ViewError::UnknownAttribute(key.clone()))?,
        ),
        None => None,
    };

    let has_text = spec.filter.text.is_some();
    let has_range = spec.filter.date_from.is_some() || spec.filter.date_to.is_some();
    match primary {
        None if has_text || has_range => return Err(ViewError::MissingAttribute),
        Some(col) if col.kind == ColumnKind::Date && has_text => {
            return Err(ViewError::TextOnDateColumn(col.key.to_string()));
        }
        Some(col) if col.kind != ColumnKind::Date && has_range => {
            return Err(ViewError::DateRangeOnTextColumn(col.key.to_string()));
        }
        _ => {}
    }

    let sort = match &spec.sort {
        Some(s) => Some((
            columns
                .iter()
                .find(|c| c.key == s.column)
                .ok_or_else(|| ViewError::UnknownSortColumn(s.column.clone()))?,
            s.direction,
        )),
        None => None,
    };

    let needle = spec.filter.text.as_deref().map(str::to_lowercase);
    let statuses: Vec<String> = spec
        .filter
        .statuses
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    let status_col = R::status_column();

    let mut rows: Vec<&R> = records
        .iter()
        .filter(|record| {
            if let Some(col) = primary {
                match col.kind {
                    ColumnKind::Date if has_range => {
                        let CellValue::Date(d) = record.cell(col.key) else {
                            // A bounded range never matches a missing date.
                            return false;
                        };
                        if spec.filter.date_from.is_some_and(|from| d < from) {
                            return false;
                        }
                        if spec.filter.date_to.is_some_and(|to| d > to) {
                            return false;
                        }
                    }
                    ColumnKind::Date => {}
                    _ => {
                        if let Some(needle) = &needle {
                            let haystack = record.cell(col.key).display().to_lowercase();
                            if !haystack.contains(needle) {
                                return false;
                            }
                        }
                    }
                }
            }
            if !statuses.is_empty() {
                if let Some(key) = status_col {
                    let label = record.cell(key).display().to_lowercase();
                    if !statuses.iter().any(|s| *s == label) {
                        return false;
                    }
                }
            }
            true
        })
        .collect();

    if let Some((col, direction)) = sort {
        rows.sort_by(|a, b| {
            let ord = compare_cells(&a.cell(col.key), &b.cell(col.key));
            match direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
    }

    Ok(rows)
}

/// Missing compares greater than any present value, so ascending sorts
/// push blank cells to the bottom of the screen.
fn compare_cells(a: &CellValue, b: &CellValue) -> Ordering {
    use CellValue::*;
    match (a, b) {
        (Missing, Missing) => Ordering::Equal,
        (Missing, _) => Ordering::Greater,
        (_, Missing) => Ordering::Less,
        (Date(x), Date(y)) => x.cmp(y),
        (Integer(x), Integer(y)) => x.cmp(y),
        (Text(x), Text(y)) => x.to_lowercase().cmp(&y.to_lowercase()),
        // Mixed kinds cannot occur within one well-formed column; compare
        // displays so the order is still total.
        _ => a.display().to_lowercase().cmp(&b.display().to_lowercase()),
    }
}

/// Slice one page out of an already filtered/sorted row set.
///
/// Out-of-range pages return empty items with the real totals so the
/// pager can recover.
pub fn paginate<T>(rows: Vec<T>, spec: PageSpec) -> Page<T> {
    let spec = spec.normalized();
    let total = rows.len();
    let total_pages = total.div_ceil(spec.per_page);
    let start = (spec.page - 1).saturating_mul(spec.per_page);
    let items: Vec<T> = rows.into_iter().skip(start).take(spec.per_page).collect();
    Page {
        items,
        page: spec.page,
        per_page: spec.per_page,
        total,
        total_pages,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[derive(Debug)]
    struct Row {
        name: String,
        status: &'static str,
        acquired: Option<NaiveDate>,
        count: i64,
    }

    impl Row {
        fn new(name: &str, status: &'static str, acquired: Option<(i32, u32, u32)>, count: i64) -> Self {
            Self {
                name: name.to_string(),
                status,
                acquired: acquired.map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap()),
                count,
            }
        }
    }

    impl ListRecord for Row {
        fn columns() -> &'static [Column] {
            const COLS: &[Column] = &[
                Column { key: "name", label: "Name", kind: ColumnKind::Text },
                Column { key: "status", label: "Status", kind: ColumnKind::Text },
                Column { key: "acquired", label: "Acquired", kind: ColumnKind::Date },
                Column { key: "count", label: "Count", kind: ColumnKind::Integer },
            ];
            COLS
        }

        fn cell(&self, key: &str) -> CellValue {
            match key {
                "name" => CellValue::Text(self.name.clone()),
                "status" => CellValue::Text(self.status.to_string()),
                "acquired" => self.acquired.map(CellValue::Date).unwrap_or(CellValue::Missing),
                "count" => CellValue::Integer(self.count),
                _ => CellValue::Missing,
            }
        }

        fn status_column() -> Option<&'static str> {
            Some("status")
        }
    }

    fn fixture() -> Vec<Row> {
        vec![
            Row::new("Dell Latitude", "In Use", Some((2024, 3, 15)), 2),
            Row::new("HP ProBook", "In Storage", Some((2024, 1, 10)), 10),
            Row::new("MacBook Air", "In Use", None, 9),
            Row::new("dell monitor", "Under Repair", Some((2023, 12, 31)), 1),
        ]
    }

    fn text_filter(attribute: &str, text: &str) -> ViewSpec {
        ViewSpec {
            filter: FilterSpec {
                attribute: Some(attribute.to_string()),
                text: Some(text.to_string()),
                ..FilterSpec::default()
            },
            sort: None,
        }
    }

    fn names(rows: &[&Row]) -> Vec<String> {
        rows.iter().map(|r| r.name.clone()).collect()
    }

    // -- filtering --

    #[test]
    fn empty_spec_returns_all_rows_in_input_order() {
        let rows = fixture();
        let out = filter_and_sort(&rows, &ViewSpec::default()).unwrap();
        assert_eq!(
            names(&out),
            vec!["Dell Latitude", "HP ProBook", "MacBook Air", "dell monitor"]
        );
    }

    #[test]
    fn substring_filter_is_case_insensitive() {
        let rows = fixture();
        let out = filter_and_sort(&rows, &text_filter("name", "DELL")).unwrap();
        assert_eq!(names(&out), vec!["Dell Latitude", "dell monitor"]);
    }

    #[test]
    fn substring_filter_matches_display_labels() {
        let rows = fixture();
        // "repair" only appears in the display label "Under Repair".
        let out = filter_and_sort(&rows, &text_filter("status", "repair")).unwrap();
        assert_eq!(names(&out), vec!["dell monitor"]);
    }

    #[test]
    fn date_range_is_inclusive_on_both_ends() {
        let rows = fixture();
        let spec = ViewSpec {
            filter: FilterSpec {
                attribute: Some("acquired".to_string()),
                date_from: Some(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()),
                date_to: Some(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()),
                ..FilterSpec::default()
            },
            sort: None,
        };
        let out = filter_and_sort(&rows, &spec).unwrap();
        assert_eq!(names(&out), vec!["Dell Latitude", "HP ProBook"]);
    }

    #[test]
    fn open_ended_date_range_excludes_missing_dates() {
        let rows = fixture();
        let spec = ViewSpec {
            filter: FilterSpec {
                attribute: Some("acquired".to_string()),
                date_from: Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
                ..FilterSpec::default()
            },
            sort: None,
        };
        let out = filter_and_sort(&rows, &spec).unwrap();
        // MacBook Air has no acquisition date and must not slip through.
        assert_eq!(names(&out), vec!["Dell Latitude", "HP ProBook"]);
    }

    #[test]
    fn status_multi_select_is_anded_with_primary_filter() {
        let rows = fixture();
        let spec = ViewSpec {
            filter: FilterSpec {
                attribute: Some("name".to_string()),
                text: Some("dell".to_string()),
                statuses: vec!["in use".to_string()],
                ..FilterSpec::default()
            },
            sort: None,
        };
        let out = filter_and_sort(&rows, &spec).unwrap();
        assert_eq!(names(&out), vec!["Dell Latitude"]);
    }

    #[test]
    fn status_multi_select_alone_keeps_any_selected_label() {
        let rows = fixture();
        let spec = ViewSpec {
            filter: FilterSpec {
                statuses: vec!["IN STORAGE".to_string(), "Under Repair".to_string()],
                ..FilterSpec::default()
            },
            sort: None,
        };
        let out = filter_and_sort(&rows, &spec).unwrap();
        assert_eq!(names(&out), vec!["HP ProBook", "dell monitor"]);
    }

    // -- spec validation --

    #[test]
    fn unknown_attribute_rejected() {
        let rows = fixture();
        let err = filter_and_sort(&rows, &text_filter("nope", "x")).unwrap_err();
        assert_matches!(err, ViewError::UnknownAttribute(a) if a == "nope");
    }

    #[test]
    fn unknown_sort_column_rejected() {
        let rows = fixture();
        let spec = ViewSpec {
            filter: FilterSpec::default(),
            sort: Some(SortSpec {
                column: "nope".to_string(),
                direction: SortDirection::Asc,
            }),
        };
        let err = filter_and_sort(&rows, &spec).unwrap_err();
        assert_matches!(err, ViewError::UnknownSortColumn(c) if c == "nope");
    }

    #[test]
    fn filter_value_without_attribute_rejected() {
        let rows = fixture();
        let spec = ViewSpec {
            filter: FilterSpec {
                text: Some("dell".to_string()),
                ..FilterSpec::default()
            },
            sort: None,
        };
        assert_matches!(
            filter_and_sort(&rows, &spec).unwrap_err(),
            ViewError::MissingAttribute
        );
    }

    #[test]
    fn text_on_date_column_rejected() {
        let rows = fixture();
        let err = filter_and_sort(&rows, &text_filter("acquired", "2024")).unwrap_err();
        assert_matches!(err, ViewError::TextOnDateColumn(_));
    }

    #[test]
    fn date_range_on_text_column_rejected() {
        let rows = fixture();
        let spec = ViewSpec {
            filter: FilterSpec {
                attribute: Some("name".to_string()),
                date_from: Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
                ..FilterSpec::default()
            },
            sort: None,
        };
        assert_matches!(
            filter_and_sort(&rows, &spec).unwrap_err(),
            ViewError::DateRangeOnTextColumn(_)
        );
    }

    #[test]
    fn invalid_spec_fails_the_same_way_on_empty_data() {
        let rows: Vec<Row> = vec![];
        let err = filter_and_sort(&rows, &text_filter("nope", "x")).unwrap_err();
        assert_matches!(err, ViewError::UnknownAttribute(_));
    }

    // -- sorting --

    fn sorted(column: &str, direction: SortDirection) -> ViewSpec {
        ViewSpec {
            filter: FilterSpec::default(),
            sort: Some(SortSpec {
                column: column.to_string(),
                direction,
            }),
        }
    }

    #[test]
    fn string_sort_is_case_insensitive() {
        let rows = fixture();
        let out = filter_and_sort(&rows, &sorted("name", SortDirection::Asc)).unwrap();
        assert_eq!(
            names(&out),
            vec!["Dell Latitude", "dell monitor", "HP ProBook", "MacBook Air"]
        );
    }

    #[test]
    fn integer_sort_is_numeric_not_lexicographic() {
        let rows = fixture();
        let out = filter_and_sort(&rows, &sorted("count", SortDirection::Asc)).unwrap();
        // Lexicographic order would put 10 before 9.
        let counts: Vec<i64> = out.iter().map(|r| r.count).collect();
        assert_eq!(counts, vec![1, 2, 9, 10]);
    }

    #[test]
    fn missing_dates_sort_last_ascending_and_first_descending() {
        let rows = fixture();
        let asc = filter_and_sort(&rows, &sorted("acquired", SortDirection::Asc)).unwrap();
        assert_eq!(
            names(&asc),
            vec!["dell monitor", "HP ProBook", "Dell Latitude", "MacBook Air"]
        );
        let desc = filter_and_sort(&rows, &sorted("acquired", SortDirection::Desc)).unwrap();
        assert_eq!(
            names(&desc),
            vec!["MacBook Air", "Dell Latitude", "HP ProBook", "dell monitor"]
        );
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let rows = vec![
            Row::new("b-first", "In Use", None, 1),
            Row::new("a-second", "In Use", None, 1),
            Row::new("c-third", "In Use", None, 1),
        ];
        let out = filter_and_sort(&rows, &sorted("count", SortDirection::Asc)).unwrap();
        assert_eq!(names(&out), vec!["b-first", "a-second", "c-third"]);
    }

    // -- pagination --

    #[test]
    fn paginate_slices_one_based_pages() {
        let page = paginate((1..=30).collect::<Vec<i32>>(), PageSpec { page: 2, per_page: 10 });
        assert_eq!(page.items, (11..=20).collect::<Vec<i32>>());
        assert_eq!(page.page, 2);
        assert_eq!(page.per_page, 10);
        assert_eq!(page.total, 30);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn invalid_page_size_falls_back_to_default() {
        let page = paginate((1..=60).collect::<Vec<i32>>(), PageSpec { page: 1, per_page: 33 });
        assert_eq!(page.per_page, DEFAULT_PAGE_SIZE);
        assert_eq!(page.items.len(), DEFAULT_PAGE_SIZE);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn page_zero_clamps_to_first_page() {
        let page = paginate((1..=5).collect::<Vec<i32>>(), PageSpec { page: 0, per_page: 10 });
        assert_eq!(page.page, 1);
        assert_eq!(page.items, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn out_of_range_page_is_empty_with_real_totals() {
        let page = paginate((1..=5).collect::<Vec<i32>>(), PageSpec { page: 7, per_page: 10 });
        assert!(page.items.is_empty());
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn last_partial_page_counts_toward_total_pages() {
        let page = paginate((1..=26).collect::<Vec<i32>>(), PageSpec { page: 3, per_page: 10 });
        assert_eq!(page.items, vec![21, 22, 23, 24, 25, 26]);
        assert_eq!(page.total_pages, 3);
    }
}

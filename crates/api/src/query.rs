//! Shared query parameter types for list endpoints.
//!
//! List endpoints take the filter/sort/page selection as query params;
//! export endpoints take the identical [`ViewSpec`] shape as a JSON
//! body. Both funnel into `stocktake_core::view`, which is what keeps
//! an export consistent with the list it was requested from.

use chrono::NaiveDate;
use serde::Deserialize;
use stocktake_core::view::{FilterSpec, PageSpec, SortDirection, SortSpec, ViewSpec};

/// Filter, sort, and page selection for a list endpoint.
///
/// `statuses` is comma-separated (`?statuses=In Use,In Storage`); blank
/// entries are dropped. `page`/`per_page` are normalized downstream.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub attribute: Option<String>,
    pub text: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub statuses: Option<String>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<SortDirection>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

impl ListParams {
    /// The view spec these params describe, shared with exports.
    pub fn view_spec(&self) -> ViewSpec {
        let statuses = self
            .statuses
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        ViewSpec {
            filter: FilterSpec {
                attribute: self.attribute.clone(),
                text: self.text.clone(),
                date_from: self.date_from,
                date_to: self.date_to,
                statuses,
            },
            sort: self.sort_by.as_ref().map(|column| SortSpec {
                column: column.clone(),
                direction: self.sort_dir.unwrap_or(SortDirection::Asc),
            }),
        }
    }

    pub fn page_spec(&self) -> PageSpec {
        let defaults = PageSpec::default();
        PageSpec {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

/// Query flag for detail endpoints that may surface soft-deleted rows
/// for audit (`?include_deleted=true`).
#[derive(Debug, Default, Deserialize)]
pub struct IncludeDeletedParams {
    #[serde(default)]
    pub include_deleted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_split_on_commas_and_drop_blanks() {
        let params = ListParams {
            statuses: Some("In Use, ,In Storage".to_string()),
            ..ListParams::default()
        };
        assert_eq!(
            params.view_spec().filter.statuses,
            vec!["In Use".to_string(), "In Storage".to_string()]
        );
    }

    #[test]
    fn sort_defaults_to_ascending() {
        let params = ListParams {
            sort_by: Some("name".to_string()),
            ..ListParams::default()
        };
        let spec = params.view_spec();
        assert_eq!(spec.sort.unwrap().direction, SortDirection::Asc);
    }

    #[test]
    fn empty_params_mean_the_default_view() {
        let params = ListParams::default();
        assert_eq!(params.view_spec(), ViewSpec::default());
        assert_eq!(params.page_spec(), PageSpec::default());
    }
}

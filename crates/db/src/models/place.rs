//! Section and location models and DTOs.
//!
//! A section is an organizational unit (department, lab); a location is
//! a physical place within exactly one section. Section names are the
//! natural key the CSV importer resolves against.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stocktake_core::types::{DbId, Timestamp};
use stocktake_core::view::{CellValue, Column, ColumnKind, ListRecord};

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// A section row from the `sections` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Section {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new section.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSection {
    pub name: String,
    pub description: Option<String>,
}

/// DTO for updating an existing section. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSection {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl ListRecord for Section {
    fn columns() -> &'static [Column] {
        const COLS: &[Column] = &[
            Column { key: "name", label: "Name", kind: ColumnKind::Text },
            Column { key: "description", label: "Description", kind: ColumnKind::Text },
        ];
        COLS
    }

    fn cell(&self, key: &str) -> CellValue {
        match key {
            "name" => CellValue::Text(self.name.clone()),
            "description" => self
                .description
                .as_ref()
                .map(|s| CellValue::Text(s.clone()))
                .unwrap_or(CellValue::Missing),
            _ => CellValue::Missing,
        }
    }
}

// ---------------------------------------------------------------------------
// Locations
// ---------------------------------------------------------------------------

/// A location row from the `locations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Location {
    pub id: DbId,
    pub section_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new location.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLocation {
    pub section_id: DbId,
    pub name: String,
    pub description: Option<String>,
}

/// DTO for updating an existing location. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateLocation {
    pub section_id: Option<DbId>,
    pub name: Option<String>,
    pub description: Option<String>,
}

/// A location joined with its section name, for list views and export.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LocationRow {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub section_id: DbId,
    pub section_name: String,
}

impl ListRecord for LocationRow {
    fn columns() -> &'static [Column] {
        const COLS: &[Column] = &[
            Column { key: "name", label: "Name", kind: ColumnKind::Text },
            Column { key: "section", label: "Section", kind: ColumnKind::Text },
            Column { key: "description", label: "Description", kind: ColumnKind::Text },
        ];
        COLS
    }

    fn cell(&self, key: &str) -> CellValue {
        match key {
            "name" => CellValue::Text(self.name.clone()),
            "section" => CellValue::Text(self.section_name.clone()),
            "description" => self
                .description
                .as_ref()
                .map(|s| CellValue::Text(s.clone()))
                .unwrap_or(CellValue::Missing),
            _ => CellValue::Missing,
        }
    }
}

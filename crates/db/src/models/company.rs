//! Supplier company model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stocktake_core::types::{DbId, Timestamp};
use stocktake_core::view::{CellValue, Column, ColumnKind, ListRecord};

/// A company row from the `companies` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Company {
    pub id: DbId,
    pub name: String,
    pub trade_name: Option<String>,
    pub tax_id: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new company.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCompany {
    pub name: String,
    pub trade_name: Option<String>,
    pub tax_id: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// DTO for updating an existing company. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCompany {
    pub name: Option<String>,
    pub trade_name: Option<String>,
    pub tax_id: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl ListRecord for Company {
    fn columns() -> &'static [Column] {
        const COLS: &[Column] = &[
            Column { key: "name", label: "Name", kind: ColumnKind::Text },
            Column { key: "trade_name", label: "Trade Name", kind: ColumnKind::Text },
            Column { key: "tax_id", label: "Tax ID", kind: ColumnKind::Text },
            Column { key: "email", label: "Email", kind: ColumnKind::Text },
            Column { key: "phone", label: "Phone", kind: ColumnKind::Text },
        ];
        COLS
    }

    fn cell(&self, key: &str) -> CellValue {
        let text = |v: &Option<String>| {
            v.as_ref()
                .map(|s| CellValue::Text(s.clone()))
                .unwrap_or(CellValue::Missing)
        };
        match key {
            "name" => CellValue::Text(self.name.clone()),
            "trade_name" => text(&self.trade_name),
            "tax_id" => text(&self.tax_id),
            "email" => text(&self.email),
            "phone" => text(&self.phone),
            _ => CellValue::Missing,
        }
    }
}

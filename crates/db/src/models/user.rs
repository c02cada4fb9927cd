//! Platform user models and DTOs.
//!
//! The row struct carries the password hash and is deliberately not
//! serializable; handlers convert to [`UserResponse`] before anything
//! leaves the process. Roles live in a `user_roles` join and are
//! attached to the response separately.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stocktake_core::status::UserStatus;
use stocktake_core::types::{DbId, Timestamp};
use stocktake_core::view::{CellValue, Column, ColumnKind, ListRecord};

/// A user row from the `users` table. Never serialized directly.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub status: String,
    pub avatar_url: Option<String>,
    pub password_hash: String,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// The user shape returned by the API: hash stripped, roles attached.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub status: String,
    pub avatar_url: Option<String>,
    pub roles: Vec<String>,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl UserResponse {
    pub fn from_user(user: User, roles: Vec<String>) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            phone: user.phone,
            status: user.status,
            avatar_url: user.avatar_url,
            roles,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

/// DTO for creating a new user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub password_confirmation: String,
    pub phone: Option<String>,
    /// Defaults to `pending_approval` if omitted.
    pub status: Option<UserStatus>,
    pub avatar_url: Option<String>,
    /// Role names; each must exist in the `roles` table.
    #[serde(default)]
    pub roles: Vec<String>,
}

/// DTO for updating an existing user. All fields are optional; the
/// password changes through its own endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub status: Option<UserStatus>,
    pub avatar_url: Option<String>,
    /// When present, replaces the user's role set.
    pub roles: Option<Vec<String>>,
}

/// DTO for the password-change endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangePassword {
    pub new_password: String,
    pub confirmation: String,
}

/// A user joined with an aggregated role list, as listed and exported.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserRow {
    pub id: DbId,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub status: String,
    /// Role names joined with `", "`; empty for users with no roles.
    pub roles: String,
    pub last_login_at: Option<Timestamp>,
}

impl UserRow {
    fn status_label(&self) -> String {
        UserStatus::from_str(&self.status)
            .map(|s| s.label().to_string())
            .unwrap_or_else(|| self.status.clone())
    }
}

impl ListRecord for UserRow {
    fn columns() -> &'static [Column] {
        const COLS: &[Column] = &[
            Column { key: "full_name", label: "Full Name", kind: ColumnKind::Text },
            Column { key: "email", label: "Email", kind: ColumnKind::Text },
            Column { key: "phone", label: "Phone", kind: ColumnKind::Text },
            Column { key: "status", label: "Status", kind: ColumnKind::Text },
            Column { key: "roles", label: "Roles", kind: ColumnKind::Text },
            Column { key: "last_login", label: "Last Login", kind: ColumnKind::Date },
        ];
        COLS
    }

    fn cell(&self, key: &str) -> CellValue {
        match key {
            "full_name" => CellValue::Text(self.full_name.clone()),
            "email" => CellValue::Text(self.email.clone()),
            "phone" => self
                .phone
                .as_ref()
                .map(|p| CellValue::Text(p.clone()))
                .unwrap_or(CellValue::Missing),
            "status" => CellValue::Text(self.status_label()),
            "roles" => CellValue::Text(self.roles.clone()),
            "last_login" => self
                .last_login_at
                .map(|t| CellValue::Date(t.date_naive()))
                .unwrap_or(CellValue::Missing),
            _ => CellValue::Missing,
        }
    }

    fn status_column() -> Option<&'static str> {
        Some("status")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn user() -> User {
        User {
            id: 3,
            email: "ana@example.edu".to_string(),
            full_name: "Ana Ruiz".to_string(),
            phone: None,
            status: "on_vacation".to_string(),
            avatar_url: None,
            password_hash: "$argon2id$secret".to_string(),
            last_login_at: Some(Utc.with_ymd_and_hms(2024, 5, 2, 9, 30, 0).unwrap()),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn response_strips_the_hash_and_attaches_roles() {
        let resp = UserResponse::from_user(user(), vec!["staff".to_string()]);
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["roles"], serde_json::json!(["staff"]));
    }

    #[test]
    fn row_status_cell_shows_the_label_and_login_is_a_date() {
        let row = UserRow {
            id: 3,
            full_name: "Ana Ruiz".to_string(),
            email: "ana@example.edu".to_string(),
            phone: None,
            status: "on_vacation".to_string(),
            roles: "admin, staff".to_string(),
            last_login_at: Some(Utc.with_ymd_and_hms(2024, 5, 2, 23, 59, 0).unwrap()),
        };
        assert_eq!(row.cell("status"), CellValue::Text("On Vacation".to_string()));
        assert_eq!(
            row.cell("last_login"),
            CellValue::Date(chrono::NaiveDate::from_ymd_opt(2024, 5, 2).unwrap())
        );
    }
}

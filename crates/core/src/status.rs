//! Entity status enums and the derived license status calculator.
//!
//! Asset and user statuses are stored in the database as snake_case keys
//! and rendered with human labels. License status is never stored: it is
//! derived from the expiry date on every read so that a license crossing
//! its expiry date changes status without any background job.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Days before expiry at which a license counts as "expiring soon",
/// used when no deployment override is configured.
pub const DEFAULT_EXPIRING_SOON_DAYS: i64 = 30;

// ---------------------------------------------------------------------------
// Asset status
// ---------------------------------------------------------------------------

/// Lifecycle status of a fixed asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    InUse,
    InStorage,
    UnderRepair,
    Disposed,
    Lost,
}

impl AssetStatus {
    /// Return the status name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InUse => "in_use",
            Self::InStorage => "in_storage",
            Self::UnderRepair => "under_repair",
            Self::Disposed => "disposed",
            Self::Lost => "lost",
        }
    }

    /// Human label shown in list views and exports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::InUse => "In Use",
            Self::InStorage => "In Storage",
            Self::UnderRepair => "Under Repair",
            Self::Disposed => "Disposed",
            Self::Lost => "Lost",
        }
    }

    /// Parse a stored status key. Returns `None` for unknown values.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "in_use" => Some(Self::InUse),
            "in_storage" => Some(Self::InStorage),
            "under_repair" => Some(Self::UnderRepair),
            "disposed" => Some(Self::Disposed),
            "lost" => Some(Self::Lost),
            _ => None,
        }
    }

    /// Parse either the storage key or the display label, case-insensitively.
    ///
    /// CSV import accepts both so that a file exported from a list view
    /// (which carries labels) re-imports without editing.
    pub fn from_input(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        Self::ALL_VARIANTS.iter().copied().find(|v| {
            trimmed.eq_ignore_ascii_case(v.as_str()) || trimmed.eq_ignore_ascii_case(v.label())
        })
    }

    /// All valid status values.
    pub const ALL: &'static [&'static str] =
        &["in_use", "in_storage", "under_repair", "disposed", "lost"];

    const ALL_VARIANTS: &'static [AssetStatus] = &[
        Self::InUse,
        Self::InStorage,
        Self::UnderRepair,
        Self::Disposed,
        Self::Lost,
    ];
}

impl std::fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// User status
// ---------------------------------------------------------------------------

/// Account status of a platform user.
///
/// Users are never hard-deleted; `Disabled` is the terminal state the
/// admin "delete" operation moves an account into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Disabled,
    OnVacation,
    PendingApproval,
}

impl UserStatus {
    /// Return the status name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Disabled => "disabled",
            Self::OnVacation => "on_vacation",
            Self::PendingApproval => "pending_approval",
        }
    }

    /// Human label shown in list views and exports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Disabled => "Disabled",
            Self::OnVacation => "On Vacation",
            Self::PendingApproval => "Pending Approval",
        }
    }

    /// Parse a stored status key. Returns `None` for unknown values.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "disabled" => Some(Self::Disabled),
            "on_vacation" => Some(Self::OnVacation),
            "pending_approval" => Some(Self::PendingApproval),
            _ => None,
        }
    }

    /// Parse either the storage key or the display label, case-insensitively.
    pub fn from_input(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        Self::ALL_VARIANTS.iter().copied().find(|v| {
            trimmed.eq_ignore_ascii_case(v.as_str()) || trimmed.eq_ignore_ascii_case(v.label())
        })
    }

    /// Whether an account in this status may authenticate.
    ///
    /// Vacation marks absence, not revoked access, so it still logs in.
    pub fn may_log_in(&self) -> bool {
        matches!(self, Self::Active | Self::OnVacation)
    }

    /// All valid status values.
    pub const ALL: &'static [&'static str] =
        &["active", "disabled", "on_vacation", "pending_approval"];

    const ALL_VARIANTS: &'static [UserStatus] = &[
        Self::Active,
        Self::Disabled,
        Self::OnVacation,
        Self::PendingApproval,
    ];
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// License type
// ---------------------------------------------------------------------------

/// Commercial model of a software license.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseType {
    Perpetual,
    Subscription,
    Volume,
    Trial,
    Educational,
}

impl LicenseType {
    /// Return the type name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Perpetual => "perpetual",
            Self::Subscription => "subscription",
            Self::Volume => "volume",
            Self::Trial => "trial",
            Self::Educational => "educational",
        }
    }

    /// Human label shown in list views and exports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Perpetual => "Perpetual",
            Self::Subscription => "Subscription",
            Self::Volume => "Volume",
            Self::Trial => "Trial",
            Self::Educational => "Educational",
        }
    }

    /// Parse a stored type key. Returns `None` for unknown values.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "perpetual" => Some(Self::Perpetual),
            "subscription" => Some(Self::Subscription),
            "volume" => Some(Self::Volume),
            "trial" => Some(Self::Trial),
            "educational" => Some(Self::Educational),
            _ => None,
        }
    }

    /// Parse either the storage key or the display label, case-insensitively.
    pub fn from_input(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        Self::ALL_VARIANTS.iter().copied().find(|v| {
            trimmed.eq_ignore_ascii_case(v.as_str()) || trimmed.eq_ignore_ascii_case(v.label())
        })
    }

    /// All valid type values.
    pub const ALL: &'static [&'static str] =
        &["perpetual", "subscription", "volume", "trial", "educational"];

    const ALL_VARIANTS: &'static [LicenseType] = &[
        Self::Perpetual,
        Self::Subscription,
        Self::Volume,
        Self::Trial,
        Self::Educational,
    ];
}

impl std::fmt::Display for LicenseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Derived license status
// ---------------------------------------------------------------------------

/// Badge severity attached to a derived status, mirrored by the frontend
/// badge palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Danger,
    Neutral,
}

/// Display label for a license that is soft-deleted.
pub const LICENSE_DELETED: &str = "Deleted";
/// Display label for a license with no expiry date.
pub const LICENSE_PERPETUAL: &str = "Perpetual";
/// Display label for a license whose expiry date has passed.
pub const LICENSE_EXPIRED: &str = "Expired";
/// Display label for a license expiring within the configured window.
pub const LICENSE_EXPIRING_SOON: &str = "Expiring Soon";
/// Display label for a license comfortably inside its validity period.
pub const LICENSE_ACTIVE: &str = "Active";

/// All derived license status labels, in filter-dropdown order.
pub const ALL_LICENSE_STATUS_LABELS: &[&str] = &[
    LICENSE_ACTIVE,
    LICENSE_EXPIRING_SOON,
    LICENSE_EXPIRED,
    LICENSE_PERPETUAL,
    LICENSE_DELETED,
];

/// A computed license status: human label plus badge severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DerivedStatus {
    pub label: &'static str,
    pub severity: Severity,
}

/// Derive the display status of a software license.
///
/// `today` is the caller's UTC calendar date (`Utc::now().date_naive()`),
/// computed once per request so every row in a listing is judged against
/// the same day. All comparisons are at day granularity.
///
/// Precedence: deleted > no-expiry > expired > expiring-soon > active.
/// Both window boundaries are inclusive: a license expiring today is
/// "Expiring Soon", not "Expired".
pub fn license_status(
    expiry_date: Option<NaiveDate>,
    deleted: bool,
    today: NaiveDate,
    window_days: i64,
) -> DerivedStatus {
    if deleted {
        return DerivedStatus {
            label: LICENSE_DELETED,
            severity: Severity::Neutral,
        };
    }
    let Some(expiry) = expiry_date else {
        return DerivedStatus {
            label: LICENSE_PERPETUAL,
            severity: Severity::Info,
        };
    };
    if expiry < today {
        DerivedStatus {
            label: LICENSE_EXPIRED,
            severity: Severity::Danger,
        }
    } else if expiry <= today + Duration::days(window_days) {
        DerivedStatus {
            label: LICENSE_EXPIRING_SOON,
            severity: Severity::Warning,
        }
    } else {
        DerivedStatus {
            label: LICENSE_ACTIVE,
            severity: Severity::Success,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // -- enum string round-trips --

    #[test]
    fn asset_status_round_trips_through_as_str() {
        for key in AssetStatus::ALL {
            let parsed = AssetStatus::from_str(key).unwrap();
            assert_eq!(parsed.as_str(), *key);
        }
    }

    #[test]
    fn user_status_round_trips_through_as_str() {
        for key in UserStatus::ALL {
            let parsed = UserStatus::from_str(key).unwrap();
            assert_eq!(parsed.as_str(), *key);
        }
    }

    #[test]
    fn license_type_round_trips_through_as_str() {
        for key in LicenseType::ALL {
            let parsed = LicenseType::from_str(key).unwrap();
            assert_eq!(parsed.as_str(), *key);
        }
    }

    #[test]
    fn unknown_status_key_rejected() {
        assert!(AssetStatus::from_str("broken").is_none());
        assert!(UserStatus::from_str("retired").is_none());
        assert!(LicenseType::from_str("oem").is_none());
    }

    // -- from_input --

    #[test]
    fn from_input_accepts_keys_and_labels_case_insensitively() {
        assert_eq!(AssetStatus::from_input("in_use"), Some(AssetStatus::InUse));
        assert_eq!(AssetStatus::from_input("In Use"), Some(AssetStatus::InUse));
        assert_eq!(AssetStatus::from_input("UNDER REPAIR"), Some(AssetStatus::UnderRepair));
        assert_eq!(AssetStatus::from_input("  lost  "), Some(AssetStatus::Lost));
        assert_eq!(
            UserStatus::from_input("on vacation"),
            Some(UserStatus::OnVacation)
        );
        assert_eq!(
            LicenseType::from_input("Subscription"),
            Some(LicenseType::Subscription)
        );
    }

    #[test]
    fn from_input_rejects_unknown_values() {
        assert!(AssetStatus::from_input("parked").is_none());
        assert!(AssetStatus::from_input("").is_none());
    }

    // -- may_log_in --

    #[test]
    fn vacation_still_logs_in_but_disabled_does_not() {
        assert!(UserStatus::Active.may_log_in());
        assert!(UserStatus::OnVacation.may_log_in());
        assert!(!UserStatus::Disabled.may_log_in());
        assert!(!UserStatus::PendingApproval.may_log_in());
    }

    // -- license_status --

    #[test]
    fn deleted_wins_over_everything() {
        let today = date(2024, 6, 1);
        let st = license_status(Some(date(2020, 1, 1)), true, today, 30);
        assert_eq!(st.label, LICENSE_DELETED);
        assert_eq!(st.severity, Severity::Neutral);

        let st = license_status(None, true, today, 30);
        assert_eq!(st.label, LICENSE_DELETED);
    }

    #[test]
    fn no_expiry_is_perpetual() {
        let st = license_status(None, false, date(2024, 6, 1), 30);
        assert_eq!(st.label, LICENSE_PERPETUAL);
        assert_eq!(st.severity, Severity::Info);
    }

    #[test]
    fn expiry_before_today_is_expired() {
        let today = date(2024, 6, 1);
        let st = license_status(Some(date(2024, 5, 31)), false, today, 30);
        assert_eq!(st.label, LICENSE_EXPIRED);
        assert_eq!(st.severity, Severity::Danger);
    }

    #[test]
    fn expiry_today_is_expiring_soon_not_expired() {
        let today = date(2024, 6, 1);
        let st = license_status(Some(today), false, today, 30);
        assert_eq!(st.label, LICENSE_EXPIRING_SOON);
        assert_eq!(st.severity, Severity::Warning);
    }

    #[test]
    fn window_boundary_is_inclusive() {
        let today = date(2024, 6, 1);
        // Exactly 30 days out: still inside the window.
        let st = license_status(Some(date(2024, 7, 1)), false, today, 30);
        assert_eq!(st.label, LICENSE_EXPIRING_SOON);
        // One day past the window: active.
        let st = license_status(Some(date(2024, 7, 2)), false, today, 30);
        assert_eq!(st.label, LICENSE_ACTIVE);
        assert_eq!(st.severity, Severity::Success);
    }

    #[test]
    fn zero_window_only_flags_same_day_expiry() {
        let today = date(2024, 6, 1);
        assert_eq!(
            license_status(Some(today), false, today, 0).label,
            LICENSE_EXPIRING_SOON
        );
        assert_eq!(
            license_status(Some(date(2024, 6, 2)), false, today, 0).label,
            LICENSE_ACTIVE
        );
    }

    #[test]
    fn custom_window_moves_the_boundary() {
        let today = date(2024, 6, 1);
        let st = license_status(Some(date(2024, 8, 1)), false, today, 90);
        assert_eq!(st.label, LICENSE_EXPIRING_SOON);
        let st = license_status(Some(date(2024, 8, 1)), false, today, 30);
        assert_eq!(st.label, LICENSE_ACTIVE);
    }
}

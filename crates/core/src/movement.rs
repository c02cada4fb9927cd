//! Movement kinds for asset transfers.
//!
//! The old system encoded the movement type inside the transfer's
//! free-text notes ("type: repair, sent to workshop"). The kind is now a
//! first-class column; the notes parser survives only as an import shim
//! for files produced by that system.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Matches the legacy `type: <kind>` marker anywhere in the notes.
static LEGACY_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\btype\s*:\s*(transfer|assignment|repair|return|disposal)\b")
        .expect("valid regex")
});

/// Why an asset changed hands or place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    Transfer,
    Assignment,
    Repair,
    Return,
    Disposal,
}

impl MovementKind {
    /// Return the kind name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transfer => "transfer",
            Self::Assignment => "assignment",
            Self::Repair => "repair",
            Self::Return => "return",
            Self::Disposal => "disposal",
        }
    }

    /// Human label shown in movement history and exports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Transfer => "Transfer",
            Self::Assignment => "Assignment",
            Self::Repair => "Repair",
            Self::Return => "Return",
            Self::Disposal => "Disposal",
        }
    }

    /// Parse a stored kind key. Returns `None` for unknown values.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "transfer" => Some(Self::Transfer),
            "assignment" => Some(Self::Assignment),
            "repair" => Some(Self::Repair),
            "return" => Some(Self::Return),
            "disposal" => Some(Self::Disposal),
            _ => None,
        }
    }

    /// Parse either the storage key or the display label, case-insensitively.
    pub fn from_input(s: &str) -> Option<Self> {
        Self::from_str(s.trim().to_lowercase().as_str())
    }

    /// All valid kind values.
    pub const ALL: &'static [&'static str] =
        &["transfer", "assignment", "repair", "return", "disposal"];
}

impl std::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extract a movement kind from legacy free-text notes. Returns `None`
/// when the notes carry no recognizable marker; the importer then falls
/// back to [`MovementKind::Transfer`].
pub fn kind_from_legacy_notes(notes: &str) -> Option<MovementKind> {
    LEGACY_MARKER_RE
        .captures(notes)
        .and_then(|caps| caps.get(1))
        .and_then(|m| MovementKind::from_str(&m.as_str().to_lowercase()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_as_str() {
        for key in MovementKind::ALL {
            assert_eq!(MovementKind::from_str(key).unwrap().as_str(), *key);
        }
        assert!(MovementKind::from_str("teleport").is_none());
    }

    #[test]
    fn from_input_accepts_labels() {
        assert_eq!(MovementKind::from_input("Repair"), Some(MovementKind::Repair));
        assert_eq!(MovementKind::from_input(" RETURN "), Some(MovementKind::Return));
        assert!(MovementKind::from_input("teleport").is_none());
    }

    #[test]
    fn legacy_marker_is_extracted() {
        assert_eq!(
            kind_from_legacy_notes("type: repair, sent to workshop"),
            Some(MovementKind::Repair)
        );
        assert_eq!(
            kind_from_legacy_notes("urgent. TYPE : Disposal (budget)"),
            Some(MovementKind::Disposal)
        );
    }

    #[test]
    fn notes_without_marker_return_none() {
        assert_eq!(kind_from_legacy_notes("moved to storage"), None);
        assert_eq!(kind_from_legacy_notes(""), None);
    }

    #[test]
    fn marker_requires_a_word_boundary() {
        // "retype:" must not count as a marker.
        assert_eq!(kind_from_legacy_notes("retype: repair"), None);
        // An unknown kind after the marker is not a match either.
        assert_eq!(kind_from_legacy_notes("type: teleport"), None);
    }
}

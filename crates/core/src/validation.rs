//! Field validation shared by the create/update DTOs and the CSV
//! importers.
//!
//! DTO-level checks return [`CoreError::Validation`] so handlers can map
//! them straight to a 400. The importer helpers return plain messages
//! because their errors are collected per row, not raised.

use chrono::NaiveDate;
use validator::ValidateEmail;

use crate::error::CoreError;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Longest accepted value for single-line text fields.
pub const MAX_TEXT_LENGTH: usize = 255;

/// Strict `YYYY-MM-DD` parsing for import cells and query params.
pub fn parse_iso_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| format!("'{value}' is not a valid date (expected YYYY-MM-DD)"))
}

/// Reject blank or whitespace-only required text.
pub fn require_text(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Cap single-line text fields; counts characters, not bytes.
pub fn validate_length(field: &str, value: &str, max: usize) -> Result<(), CoreError> {
    if value.chars().count() > max {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

pub fn validate_email(value: &str) -> Result<(), CoreError> {
    if value.validate_email() {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "'{value}' is not a valid email address"
        )))
    }
}

/// License seat counts start at one; zero-seat licenses are data errors.
pub fn validate_seats(seats: i32) -> Result<(), CoreError> {
    if seats >= 1 {
        Ok(())
    } else {
        Err(CoreError::Validation(
            "Seats must be at least 1".to_string(),
        ))
    }
}

/// Length floor plus confirmation match for password changes.
pub fn validate_new_password(password: &str, confirmation: &str) -> Result<(), CoreError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CoreError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if password != confirmation {
        return Err(CoreError::Validation(
            "Password confirmation does not match".to_string(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- parse_iso_date --

    #[test]
    fn iso_dates_parse() {
        assert_eq!(
            parse_iso_date("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert_eq!(
            parse_iso_date("  2024-01-01 ").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
    }

    #[test]
    fn non_iso_dates_rejected() {
        assert!(parse_iso_date("01/02/2024").is_err());
        assert!(parse_iso_date("2023-02-29").is_err());
        assert!(parse_iso_date("yesterday").is_err());
        assert!(parse_iso_date("").is_err());
    }

    // -- require_text / validate_length --

    #[test]
    fn blank_required_text_rejected() {
        assert!(require_text("Name", "Dell").is_ok());
        let err = require_text("Name", "   ").unwrap_err();
        assert!(err.to_string().contains("Name must not be empty"));
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // Four characters, eight bytes.
        assert!(validate_length("Name", "éééé", 4).is_ok());
        assert!(validate_length("Name", "ééééé", 4).is_err());
    }

    // -- validate_email --

    #[test]
    fn emails_are_checked() {
        assert!(validate_email("ana@example.edu").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("a@").is_err());
    }

    // -- validate_seats --

    #[test]
    fn seats_start_at_one() {
        assert!(validate_seats(1).is_ok());
        assert!(validate_seats(500).is_ok());
        assert!(validate_seats(0).is_err());
        assert!(validate_seats(-3).is_err());
    }

    // -- validate_new_password --

    #[test]
    fn short_passwords_rejected() {
        let err = validate_new_password("short", "short").unwrap_err();
        assert!(err.to_string().contains("at least 8"));
    }

    #[test]
    fn mismatched_confirmation_rejected() {
        let err = validate_new_password("longenough", "different").unwrap_err();
        assert!(err.to_string().contains("confirmation"));
    }

    #[test]
    fn matching_confirmation_accepted() {
        assert!(validate_new_password("longenough", "longenough").is_ok());
    }
}

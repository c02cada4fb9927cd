//! Tri-state field for partial updates of nullable columns.
//!
//! A JSON partial update has to tell an omitted field apart from one
//! sent as `null`: omitted keeps the stored value, `null` clears it.
//! A plain `Option<T>` collapses the two, so nullable update fields
//! use [`Patch<T>`] instead. Update DTOs mark these fields
//! `#[serde(default)]` so absence deserializes to [`Patch::Keep`].

use serde::{Deserialize, Deserializer};

/// What a partial update does to one nullable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Patch<T> {
    /// Field absent from the request; the stored value stays.
    Keep,
    /// Field sent as `null`; the stored value is cleared.
    Clear,
    /// Field sent with a value.
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Keep
    }
}

impl<T> Patch<T> {
    /// True when the request mentioned the field at all.
    pub fn is_touched(&self) -> bool {
        !matches!(self, Patch::Keep)
    }

    /// The new value, if one was given.
    pub fn as_set(&self) -> Option<&T> {
        match self {
            Patch::Set(value) => Some(value),
            _ => None,
        }
    }

    /// The column value a touched field writes: `Some` sets, `None`
    /// clears. Meaningless for `Keep`; pair with [`Patch::is_touched`].
    pub fn to_column(&self) -> Option<&T> {
        self.as_set()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Patch::Set(value),
            None => Patch::Clear,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Form {
        #[serde(default)]
        note: Patch<String>,
    }

    #[test]
    fn absent_field_keeps() {
        let form: Form = serde_json::from_str("{}").unwrap();
        assert_eq!(form.note, Patch::Keep);
        assert!(!form.note.is_touched());
    }

    #[test]
    fn null_field_clears() {
        let form: Form = serde_json::from_str(r#"{"note": null}"#).unwrap();
        assert_eq!(form.note, Patch::Clear);
        assert!(form.note.is_touched());
        assert_eq!(form.note.to_column(), None);
    }

    #[test]
    fn value_field_sets() {
        let form: Form = serde_json::from_str(r#"{"note": "hi"}"#).unwrap();
        assert_eq!(form.note, Patch::Set("hi".to_string()));
        assert_eq!(form.note.as_set().map(String::as_str), Some("hi"));
    }
}

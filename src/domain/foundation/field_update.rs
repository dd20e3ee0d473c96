//! Tri-state partial update for nullable columns.
//!
//! Callers send `null` to leave a column alone and an empty string to clear
//! it. `FieldUpdate` keeps those two cases apart all the way to storage.

use serde::Serialize;

/// Partial update of a nullable field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FieldUpdate<T> {
    /// Leave the stored value unchanged.
    Keep,
    /// Set the stored value to NULL.
    Clear,
    /// Replace the stored value.
    Set(T),
}

impl<T> Default for FieldUpdate<T> {
    fn default() -> Self {
        FieldUpdate::Keep
    }
}

impl FieldUpdate<String> {
    /// `None` keeps, a blank string clears, anything else is trimmed and set.
    pub fn from_nullable(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None => FieldUpdate::Keep,
            Some("") => FieldUpdate::Clear,
            Some(v) => FieldUpdate::Set(v.to_string()),
        }
    }
}

impl<T> FieldUpdate<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, FieldUpdate::Keep)
    }

    /// Applies the update to the current value.
    pub fn apply(self, current: Option<T>) -> Option<T> {
        match self {
            FieldUpdate::Keep => current,
            FieldUpdate::Clear => None,
            FieldUpdate::Set(v) => Some(v),
        }
    }

    /// Validates or converts the `Set` payload, passing the other states through.
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<FieldUpdate<U>, E> {
        Ok(match self {
            FieldUpdate::Keep => FieldUpdate::Keep,
            FieldUpdate::Clear => FieldUpdate::Clear,
            FieldUpdate::Set(v) => FieldUpdate::Set(f(v)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_keeps_current_value() {
        let update = FieldUpdate::from_nullable(None);
        assert!(update.is_keep());
        assert_eq!(update.apply(Some("old".to_string())), Some("old".to_string()));
    }

    #[test]
    fn empty_string_clears_value() {
        let update = FieldUpdate::from_nullable(Some("   "));
        assert_eq!(update, FieldUpdate::Clear);
        assert_eq!(update.apply(Some("old".to_string())), None);
    }

    #[test]
    fn value_is_trimmed_and_set() {
        let update = FieldUpdate::from_nullable(Some(" new "));
        assert_eq!(update.apply(None), Some("new".to_string()));
    }

    #[test]
    fn try_map_only_touches_set() {
        let parsed: Result<FieldUpdate<u32>, String> =
            FieldUpdate::Set("42".to_string()).try_map(|s| s.parse().map_err(|_| s));
        assert_eq!(parsed, Ok(FieldUpdate::Set(42)));

        let cleared: Result<FieldUpdate<u32>, String> =
            FieldUpdate::<String>::Clear.try_map(|_| Err("unused".to_string()));
        assert_eq!(cleared, Ok(FieldUpdate::Clear));
    }
}

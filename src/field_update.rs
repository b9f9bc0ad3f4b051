//! Partial-update wrapper for optional fields.
//!
//! `Keep` leaves the stored value alone, `Clear` removes it and `Set`
//! replaces it. In JSON an absent field is `Keep`, `null` is `Clear` and any
//! other value is `Set`; use it with `#[serde(default, skip_serializing_if =
//! "FieldUpdate::is_keep")]`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    Keep,
    Clear,
    Set(T),
}

impl<T> Default for FieldUpdate<T> {
    fn default() -> Self {
        FieldUpdate::Keep
    }
}

impl<T> FieldUpdate<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, FieldUpdate::Keep)
    }

    /// Apply to a stored optional value.
    pub fn apply_to(self, current: &mut Option<T>) {
        match self {
            FieldUpdate::Keep => {}
            FieldUpdate::Clear => *current = None,
            FieldUpdate::Set(value) => *current = Some(value),
        }
    }
}

impl FieldUpdate<String> {
    /// Build from CLI-style input: an explicit clear flag wins, an empty
    /// string also clears, and no value keeps the field.
    pub fn from_input(value: Option<String>, clear: bool) -> Self {
        if clear {
            return FieldUpdate::Clear;
        }
        match value {
            None => FieldUpdate::Keep,
            Some(value) if value.trim().is_empty() => FieldUpdate::Clear,
            Some(value) => FieldUpdate::Set(value),
        }
    }
}

impl<T> From<Option<T>> for FieldUpdate<T> {
    /// `Some` sets, `None` clears.
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => FieldUpdate::Set(value),
            None => FieldUpdate::Clear,
        }
    }
}

impl<T: Serialize> Serialize for FieldUpdate<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldUpdate::Keep | FieldUpdate::Clear => serializer.serialize_none(),
            FieldUpdate::Set(value) => serializer.serialize_some(value),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for FieldUpdate<T> {
    // Only called when the field is present; absence is handled by
    // `#[serde(default)]` on the containing struct.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<T>::deserialize(deserializer)?.into())
    }
}

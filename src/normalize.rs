//! Canonical comparison values for raw cells

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between components of a composite key. Normalized values only
/// contain ASCII alphanumerics, so it can never appear inside a component.
pub const KEY_SEPARATOR: char = '|';

/// Comparison form of a field value
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NormalizedValue {
    /// The value was absent (as opposed to present but blank)
    Missing,
    /// ASCII letters and digits of the raw text, in order
    Text(String),
}

impl NormalizedValue {
    /// Feed-back form, so that `normalize(v.as_field()) == v`
    pub fn as_field(&self) -> Option<&str> {
        match self {
            Self::Missing => None,
            Self::Text(s) => Some(s),
        }
    }

    /// Text used when building composite keys
    pub fn as_str(&self) -> &str {
        self.as_field().unwrap_or("")
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// True for missing values and values with no alphanumeric content
    pub fn is_blank(&self) -> bool {
        self.as_str().is_empty()
    }
}

impl fmt::Display for NormalizedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "<missing>"),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Normalize a raw value: absent stays absent, text keeps only `[A-Za-z0-9]`.
pub fn normalize(value: Option<&str>) -> NormalizedValue {
    match value {
        None => NormalizedValue::Missing,
        Some(raw) => NormalizedValue::Text(
            raw.chars().filter(|c| c.is_ascii_alphanumeric()).collect(),
        ),
    }
}

/// Row identity: normalized key components joined with [`KEY_SEPARATOR`].
///
/// Ordering is the ordering of the joined string, which is what every
/// partition of a reconciliation is sorted by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompositeKey(String);

impl CompositeKey {
    pub fn from_components<'a, I>(components: I) -> Self
    where
        I: IntoIterator<Item = &'a NormalizedValue>,
    {
        let mut joined = String::new();
        for (i, value) in components.into_iter().enumerate() {
            if i > 0 {
                joined.push(KEY_SEPARATOR);
            }
            joined.push_str(value.as_str());
        }
        Self(joined)
    }

    /// Build a key straight from raw component strings
    pub fn from_raw<'a, I>(raw: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let normalized: Vec<NormalizedValue> = raw.into_iter().map(|s| normalize(Some(s))).collect();
        Self::from_components(&normalized)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split(KEY_SEPARATOR)
    }

    /// True when every component is blank
    pub fn is_empty(&self) -> bool {
        self.0.chars().all(|c| c == KEY_SEPARATOR)
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

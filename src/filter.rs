//! Categorical filter values shared by the review and ticket selectors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Keyword the view layer uses for "no constraint".
const ALL: &str = "all";

/// A categorical filter: either no constraint or an exact value.
///
/// Serialized as a plain string: `"all"` for [`Filter::All`], otherwise the
/// value's display form. These are the strings the view layer's filter
/// dropdowns send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter<T> {
    /// Matches every value.
    All,
    /// Matches only this value.
    Only(T),
}

impl<T: PartialEq> Filter<T> {
    /// Whether `value` passes this filter.
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == value,
        }
    }
}

impl<T> Default for Filter<T> {
    fn default() -> Self {
        Self::All
    }
}

impl<T> From<T> for Filter<T> {
    fn from(value: T) -> Self {
        Self::Only(value)
    }
}

impl<T: fmt::Display> fmt::Display for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL),
            Self::Only(value) => value.fmt(f),
        }
    }
}

impl<T: FromStr> FromStr for Filter<T> {
    type Err = T::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == ALL {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}

impl<T: fmt::Display> Serialize for Filter<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de, T> Deserialize<'de> for Filter<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Case-sensitive, unescaped substring test used by the filtered selectors.
///
/// An empty needle matches everything.
pub(crate) fn contains(haystack: &str, needle: &str) -> bool {
    haystack.contains(needle)
}

/// Case-insensitive substring test used by the page-level searches.
pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

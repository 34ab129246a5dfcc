//! Color identifiers and canonical unordered pair keys.
//!
//! A [`PairKey`] sorts its two colors on construction, so `(A, B)` and `(B, A)`
//! resolve to the same belief. The textual form `"A|B"` is what snapshots
//! persist.

use std::fmt;
use std::str::FromStr;

use crate::engine::errors::ChromaError;

/// Separator between the two colors in a persisted pair key.
pub const PAIR_KEY_SEPARATOR: char = '|';

/// A validated color identifier (typically a hex code such as `#FF0000`).
///
/// Identifiers are trimmed and must be non-empty, contain no whitespace, and
/// never contain the pair-key separator. No color-space interpretation is done.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct ColorId(String);

impl ColorId {
    /// Validates and wraps a raw identifier.
    pub fn new(raw: impl Into<String>) -> Result<Self, ChromaError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ChromaError::InvalidInput(
                "color identifier is empty".into(),
            ));
        }
        if let Some(bad) = trimmed
            .chars()
            .find(|c| c.is_whitespace() || *c == PAIR_KEY_SEPARATOR)
        {
            return Err(ChromaError::InvalidInput(format!(
                "color identifier '{}' contains forbidden character {:?}",
                trimmed, bad
            )));
        }
        if trimmed.len() == raw.len() {
            Ok(Self(raw))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ColorId {
    type Err = ChromaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ColorId {
    type Error = ChromaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ColorId> for String {
    fn from(value: ColorId) -> Self {
        value.0
    }
}

impl AsRef<str> for ColorId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An unordered pair of colors in canonical (sorted) order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct PairKey {
    first: ColorId,
    second: ColorId,
}

impl PairKey {
    /// Builds the canonical key; argument order is irrelevant.
    pub fn new(a: ColorId, b: ColorId) -> Self {
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    /// Parses and validates two raw identifiers into a canonical key.
    pub fn from_strs(a: &str, b: &str) -> Result<Self, ChromaError> {
        Ok(Self::new(ColorId::new(a)?, ColorId::new(b)?))
    }

    /// The lexicographically smaller color.
    pub fn first(&self) -> &ColorId {
        &self.first
    }

    /// The lexicographically larger color.
    pub fn second(&self) -> &ColorId {
        &self.second
    }

    pub fn colors(&self) -> [&ColorId; 2] {
        [&self.first, &self.second]
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.first, PAIR_KEY_SEPARATOR, self.second)
    }
}

impl FromStr for PairKey {
    type Err = ChromaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (a, b) = s.split_once(PAIR_KEY_SEPARATOR).ok_or_else(|| {
            ChromaError::InvalidInput(format!(
                "pair key '{}' is missing the '{}' separator",
                s, PAIR_KEY_SEPARATOR
            ))
        })?;
        Self::from_strs(a, b)
    }
}

impl TryFrom<String> for PairKey {
    type Error = ChromaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PairKey> for String {
    fn from(value: PairKey) -> Self {
        value.to_string()
    }
}

//! Trials, responses, and the append-only history record.

use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::engine::errors::ChromaError;
use crate::engine::pair::{ColorId, PairKey};

pub const MIN_DIFFICULTY: u8 = 1;
pub const MAX_DIFFICULTY: u8 = 10;

/// Clamps a requested difficulty into `1..=10`.
pub fn clamp_difficulty(difficulty: u8) -> u8 {
    difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
}

/// Milliseconds since the Unix epoch, or 0 if the clock is before it.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Which slot of the trial holds the reference color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Position {
    Color1,
    Color2,
}

/// A user's answer to a discrimination trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Response {
    /// The two colors looked identical.
    Same,
    /// The user picked the first color as the reference.
    Color1,
    /// The user picked the second color as the reference.
    Color2,
}

impl Response {
    pub fn as_str(self) -> &'static str {
        match self {
            Response::Same => "same",
            Response::Color1 => "color1",
            Response::Color2 => "color2",
        }
    }

    /// Any answer other than "same" counts as telling the colors apart.
    pub fn is_distinguished(self) -> bool {
        self != Response::Same
    }

    /// Whether this answer names the slot that actually holds the reference.
    pub fn identifies(self, position: Position) -> bool {
        matches!(
            (self, position),
            (Response::Color1, Position::Color1) | (Response::Color2, Position::Color2)
        )
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Response {
    type Err = ChromaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "same" => Ok(Response::Same),
            "color1" => Ok(Response::Color1),
            "color2" => Ok(Response::Color2),
            other => Err(ChromaError::InvalidInput(format!(
                "unknown response '{}' (expected same, color1 or color2)",
                other
            ))),
        }
    }
}

/// A stimulus pair presented to the user.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Trial {
    pub reference: ColorId,
    pub color1: ColorId,
    pub color2: ColorId,
    pub reference_position: Position,
    /// Simulated confusion probability the generator expected for the pair.
    pub expected_confusion_prob: f64,
    pub difficulty: u8,
    #[cfg_attr(feature = "serde", serde(default))]
    pub started_at_ms: Option<u64>,
}

impl Trial {
    /// Places `reference` and `comparison` according to `reference_position`.
    pub fn new(
        reference: ColorId,
        comparison: ColorId,
        reference_position: Position,
        expected_confusion_prob: f64,
        difficulty: u8,
    ) -> Self {
        let (color1, color2) = match reference_position {
            Position::Color1 => (reference.clone(), comparison),
            Position::Color2 => (comparison, reference.clone()),
        };
        Self {
            reference,
            color1,
            color2,
            reference_position,
            expected_confusion_prob,
            difficulty: clamp_difficulty(difficulty),
            started_at_ms: None,
        }
    }

    pub fn pair_key(&self) -> PairKey {
        PairKey::new(self.color1.clone(), self.color2.clone())
    }

    /// The non-reference color.
    pub fn comparison(&self) -> &ColorId {
        match self.reference_position {
            Position::Color1 => &self.color2,
            Position::Color2 => &self.color1,
        }
    }

    /// Checks the structural contract every generator must honor.
    pub fn validate(&self) -> Result<(), ChromaError> {
        if self.color1 == self.color2 {
            return Err(ChromaError::InvalidTrial(format!(
                "trial presents the same color twice ({})",
                self.color1
            )));
        }
        let at_position = match self.reference_position {
            Position::Color1 => &self.color1,
            Position::Color2 => &self.color2,
        };
        if at_position != &self.reference {
            return Err(ChromaError::InvalidTrial(format!(
                "reference {} is not at its declared position",
                self.reference
            )));
        }
        Ok(())
    }
}

/// One scored observation. History is append-only.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct HistoryEntry {
    pub color1: ColorId,
    pub color2: ColorId,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub reference: Option<ColorId>,
    pub user_response: Response,
    pub user_distinguished: bool,
    /// True only when the user told the colors apart *and* named the
    /// reference slot.
    pub identified_correctly: bool,
    pub delta_e: f64,
    pub update_weight: f64,
    /// Posterior mean P(distinguishable) right after this update.
    pub belief_after: f64,
    pub timestamp: u64,
}

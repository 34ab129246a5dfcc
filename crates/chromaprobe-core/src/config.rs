//! Tunable constants for the belief model, the selector, and sessions.
//!
//! Every config has a `Default` carrying the calibrated values and a
//! `validate()` that rejects values the algorithms cannot work with.

use crate::engine::belief::PriorInitializer;
use crate::engine::errors::ChromaError;
use crate::engine::evidence::EvidenceWeighting;

/// Configuration for [`BeliefModel`](crate::engine::model::BeliefModel).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct EngineConfig {
    /// Pseudo-observation mass of the simulation-derived prior.
    pub prior_strength: f64,
    pub evidence: EvidenceWeighting,
    /// Confusion probability at or above which a pair counts as confusable.
    pub confusion_threshold: f64,
    /// Observation count a pair needs before it can make a color a hotspot.
    pub hotspot_min_observations: f64,
    /// History length required before severity can be estimated.
    pub severity_min_history: usize,
    /// Observation count a pair needs to contribute to the severity estimate.
    pub severity_min_pair_observations: f64,
    /// Severity assumed when observed confusion matches simulation.
    pub severity_base: f64,
    /// Multiplier applied to the average observed-minus-simulated deviation.
    pub severity_scale: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            prior_strength: PriorInitializer::DEFAULT_STRENGTH,
            evidence: EvidenceWeighting::default(),
            confusion_threshold: 0.7,
            hotspot_min_observations: 3.0,
            severity_min_history: 50,
            severity_min_pair_observations: 3.0,
            severity_base: 0.6,
            severity_scale: 2.0,
        }
    }
}

impl EngineConfig {
    pub fn validate(self) -> Result<Self, ChromaError> {
        PriorInitializer::new(self.prior_strength)?;
        self.evidence.validate()?;
        check_unit_interval("confusion_threshold", self.confusion_threshold)?;
        check_unit_interval("severity_base", self.severity_base)?;
        if !(self.hotspot_min_observations.is_finite() && self.hotspot_min_observations >= 0.0) {
            return Err(ChromaError::Validation(
                "hotspot_min_observations must be finite and >= 0".into(),
            ));
        }
        if !(self.severity_min_pair_observations.is_finite()
            && self.severity_min_pair_observations >= 0.0)
        {
            return Err(ChromaError::Validation(
                "severity_min_pair_observations must be finite and >= 0".into(),
            ));
        }
        if !self.severity_scale.is_finite() {
            return Err(ChromaError::Validation(
                "severity_scale must be finite".into(),
            ));
        }
        Ok(self)
    }
}

/// Configuration for [`AdaptiveSelector`](crate::selection::AdaptiveSelector).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct SelectorConfig {
    /// Probability that balanced mode routes to exploitation.
    pub balanced_exploit_ratio: f64,
    /// Priority colors sampled (with replacement) per exploitation pick.
    pub exploitation_samples: usize,
    /// Untested-color suggestions merged into the exploration pool.
    pub exploration_suggestions: usize,
    /// Below this many observations, `suggest_mode` always explores.
    pub explore_below_observations: usize,
    /// Average uncertainty above which `suggest_mode` exploits.
    pub exploit_above_uncertainty: f64,
    /// Priority-color coverage below which `suggest_mode` explores.
    pub coverage_explore_below: f64,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            balanced_exploit_ratio: 0.7,
            exploitation_samples: 10,
            exploration_suggestions: 5,
            explore_below_observations: 20,
            exploit_above_uncertainty: 0.7,
            coverage_explore_below: 0.6,
        }
    }
}

impl SelectorConfig {
    pub fn validate(self) -> Result<Self, ChromaError> {
        check_unit_interval("balanced_exploit_ratio", self.balanced_exploit_ratio)?;
        check_unit_interval("exploit_above_uncertainty", self.exploit_above_uncertainty)?;
        if self.exploitation_samples == 0 {
            return Err(ChromaError::Validation(
                "exploitation_samples must be > 0".into(),
            ));
        }
        if !(self.coverage_explore_below.is_finite() && self.coverage_explore_below >= 0.0) {
            return Err(ChromaError::Validation(
                "coverage_explore_below must be finite and >= 0".into(),
            ));
        }
        Ok(self)
    }
}

/// Configuration for [`TestSession`](crate::session::TestSession).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct SessionConfig {
    /// Save a snapshot after every N recorded observations (0 disables).
    pub snapshot_every: usize,
    pub default_difficulty: u8,
    /// User severity assumed when none is supplied.
    pub default_severity: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            snapshot_every: 5,
            default_difficulty: 5,
            default_severity: 0.6,
        }
    }
}

impl SessionConfig {
    pub fn validate(self) -> Result<Self, ChromaError> {
        check_unit_interval("default_severity", self.default_severity)?;
        if !(1..=10).contains(&self.default_difficulty) {
            return Err(ChromaError::Validation(
                "default_difficulty must be in 1..=10".into(),
            ));
        }
        Ok(self)
    }
}

fn check_unit_interval(name: &str, value: f64) -> Result<(), ChromaError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ChromaError::Validation(format!(
            "{} must be in [0, 1], got {}",
            name, value
        )));
    }
    Ok(())
}

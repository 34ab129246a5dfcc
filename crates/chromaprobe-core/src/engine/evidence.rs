//! Evidence weighting from perceptual color distance.
//!
//! Converts ΔE between the two presented colors into the strength of a single
//! belief update:
//!
//! ```text
//! w(ΔE) = w_min + (w_max − w_min) · σ(k · (ΔE − center))
//! ```
//!
//! Responses about near-identical colors are weak evidence (rendering noise,
//! ambient lighting). Past the wide-separation point the weight is capped so
//! that obviously different pairs never outweigh a normal observation.

use crate::engine::errors::ChromaError;

/// Parameters of the sigmoid evidence weighting.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct EvidenceWeighting {
    /// Lower asymptote of the weight.
    pub min_weight: f64,
    /// Upper asymptote of the weight.
    pub max_weight: f64,
    /// ΔE at which the weight is the midpoint of the two asymptotes.
    pub center: f64,
    /// Sigmoid steepness.
    pub steepness: f64,
    /// ΔE beyond which the cap applies (strictly greater than).
    pub wide_separation: f64,
    /// Maximum weight for pairs beyond `wide_separation`.
    pub wide_separation_cap: f64,
}

impl Default for EvidenceWeighting {
    fn default() -> Self {
        Self {
            min_weight: 0.5,
            max_weight: 1.5,
            center: 10.0,
            steepness: 0.1,
            wide_separation: 30.0,
            wide_separation_cap: 1.0,
        }
    }
}

impl EvidenceWeighting {
    pub fn validate(self) -> Result<Self, ChromaError> {
        let all_finite = [
            self.min_weight,
            self.max_weight,
            self.center,
            self.steepness,
            self.wide_separation,
            self.wide_separation_cap,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !all_finite {
            return Err(ChromaError::Validation(
                "evidence weighting: all parameters must be finite".into(),
            ));
        }
        if self.min_weight <= 0.0 {
            return Err(ChromaError::Validation(
                "evidence weighting: min_weight must be > 0".into(),
            ));
        }
        if self.max_weight < self.min_weight {
            return Err(ChromaError::Validation(
                "evidence weighting: max_weight must be >= min_weight".into(),
            ));
        }
        if self.wide_separation_cap <= 0.0 {
            return Err(ChromaError::Validation(
                "evidence weighting: wide_separation_cap must be > 0".into(),
            ));
        }
        Ok(self)
    }

    /// Update strength for an observation of two colors `delta_e` apart.
    pub fn weight(&self, delta_e: f64) -> f64 {
        let sigmoid = 1.0 / (1.0 + (-self.steepness * (delta_e - self.center)).exp());
        let weight = self.min_weight + (self.max_weight - self.min_weight) * sigmoid;
        if delta_e > self.wide_separation {
            weight.min(self.wide_separation_cap)
        } else {
            weight
        }
    }
}

//! Collaborator seams.
//!
//! The engine never simulates color vision, computes color differences, or
//! renders stimuli itself. It consumes those capabilities through the traits
//! below. Closures implement the two stateless traits directly, and the
//! table-backed implementations give deterministic behavior for tests and for
//! offline inspection of persisted models.

use rustc_hash::FxHashMap;

use crate::engine::errors::ChromaError;
use crate::engine::pair::{ColorId, PairKey};
use crate::engine::trial::Trial;
use crate::profiles::CvdType;

/// Supplies the simulated probability that a pair looks identical under a
/// given condition. Must return a value in `[0, 1]`; out-of-range values are
/// clamped by the caller.
pub trait ConfusionSimulator: Send + Sync {
    fn simulated_confusion_probability(&self, a: &ColorId, b: &ColorId, cvd: CvdType) -> f64;
}

impl<F> ConfusionSimulator for F
where
    F: Fn(&ColorId, &ColorId, CvdType) -> f64 + Send + Sync,
{
    fn simulated_confusion_probability(&self, a: &ColorId, b: &ColorId, cvd: CvdType) -> f64 {
        self(a, b, cvd)
    }
}

/// Perceptual distance (ΔE) between two colors under typical vision.
pub trait PerceptualMetric: Send + Sync {
    fn delta_e(&self, a: &ColorId, b: &ColorId) -> f64;
}

impl<F> PerceptualMetric for F
where
    F: Fn(&ColorId, &ColorId) -> f64 + Send + Sync,
{
    fn delta_e(&self, a: &ColorId, b: &ColorId) -> f64 {
        self(a, b)
    }
}

/// Builds a discrimination trial around a reference color.
///
/// Implementations may search randomly, so two calls with the same reference
/// can return different comparison colors. A returned trial must never present
/// the same color twice.
pub trait StimulusGenerator {
    fn generate_trial(
        &mut self,
        reference: &ColorId,
        cvd: CvdType,
        difficulty: u8,
    ) -> Result<Trial, ChromaError>;
}

impl<G: StimulusGenerator + ?Sized> StimulusGenerator for Box<G> {
    fn generate_trial(
        &mut self,
        reference: &ColorId,
        cvd: CvdType,
        difficulty: u8,
    ) -> Result<Trial, ChromaError> {
        (**self).generate_trial(reference, cvd, difficulty)
    }
}

/// Ordered list of colors worth testing first for a condition.
pub trait ProfileProvider: Send + Sync {
    fn priority_colors(&self, cvd: CvdType) -> Vec<ColorId>;
}

/// Confusion probabilities from an explicit pair table.
///
/// Pairs are symmetric. Missing pairs fall back to `default_probability`.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TableSimulator {
    pub default_probability: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub pairs: FxHashMap<PairKey, f64>,
}

impl TableSimulator {
    pub fn new(default_probability: f64) -> Self {
        Self {
            default_probability: default_probability.clamp(0.0, 1.0),
            pairs: FxHashMap::default(),
        }
    }

    pub fn with_pair(mut self, pair: PairKey, probability: f64) -> Self {
        self.insert(pair, probability);
        self
    }

    pub fn insert(&mut self, pair: PairKey, probability: f64) {
        self.pairs.insert(pair, probability.clamp(0.0, 1.0));
    }
}

impl ConfusionSimulator for TableSimulator {
    fn simulated_confusion_probability(&self, a: &ColorId, b: &ColorId, _cvd: CvdType) -> f64 {
        let key = PairKey::new(a.clone(), b.clone());
        self.pairs
            .get(&key)
            .copied()
            .unwrap_or(self.default_probability)
            .clamp(0.0, 1.0)
    }
}

/// ΔE values from an explicit pair table.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TablePerceptualMetric {
    pub default_delta_e: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub pairs: FxHashMap<PairKey, f64>,
}

impl TablePerceptualMetric {
    pub fn new(default_delta_e: f64) -> Self {
        Self {
            default_delta_e,
            pairs: FxHashMap::default(),
        }
    }

    pub fn with_pair(mut self, pair: PairKey, delta_e: f64) -> Self {
        self.pairs.insert(pair, delta_e);
        self
    }
}

impl PerceptualMetric for TablePerceptualMetric {
    fn delta_e(&self, a: &ColorId, b: &ColorId) -> f64 {
        let key = PairKey::new(a.clone(), b.clone());
        self.pairs.get(&key).copied().unwrap_or(self.default_delta_e)
    }
}

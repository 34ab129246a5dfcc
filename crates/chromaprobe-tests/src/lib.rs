//! Shared fixtures for chromaprobe integration and property tests.
//!
//! - [`ScriptedGenerator`]: a deterministic [`StimulusGenerator`] that records
//!   every reference it was asked for
//! - [`ListProfiles`]: a fixed priority-color list
//! - model builders over table-backed collaborators

use std::sync::{Arc, Mutex};

use chromaprobe_core::engine::trial::Position;
use chromaprobe_core::{
    BeliefModel, ChromaError, ColorId, CvdType, PairKey, ProfileProvider, StimulusGenerator,
    TablePerceptualMetric, TableSimulator, Trial,
};

pub fn color(s: &str) -> ColorId {
    ColorId::new(s).expect("valid color id")
}

pub fn key(a: &str, b: &str) -> PairKey {
    PairKey::from_strs(a, b).expect("valid pair key")
}

pub fn colors(list: &[&str]) -> Vec<ColorId> {
    list.iter().map(|c| color(c)).collect()
}

pub fn assert_close(actual: f64, expected: f64, tol: f64, label: &str) {
    assert!(
        (actual - expected).abs() <= tol,
        "{} mismatch: expected {:.15}, got {:.15}, diff={:.3e}",
        label,
        expected,
        actual,
        (actual - expected).abs()
    );
}

/// Model whose simulator answers `simulated` for every pair and whose metric
/// answers `delta_e` for every pair.
pub fn uniform_model(cvd: CvdType, simulated: f64, delta_e: f64) -> BeliefModel {
    BeliefModel::new(
        cvd,
        Arc::new(TableSimulator::new(simulated)),
        Arc::new(TablePerceptualMetric::new(delta_e)),
    )
}

/// Generator pairing each reference with the next color of a fixed ring.
///
/// The reference goes to slot 1 on even calls and slot 2 on odd calls. The
/// log of requested references is shared so tests can inspect it after the
/// generator has moved into a selector.
#[derive(Debug, Clone)]
pub struct ScriptedGenerator {
    ring: Vec<ColorId>,
    calls: usize,
    requested: Arc<Mutex<Vec<ColorId>>>,
}

impl ScriptedGenerator {
    pub fn new(ring: &[&str]) -> Self {
        Self {
            ring: colors(ring),
            calls: 0,
            requested: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handle onto the request log.
    pub fn log(&self) -> Arc<Mutex<Vec<ColorId>>> {
        Arc::clone(&self.requested)
    }

    fn comparison_for(&self, reference: &ColorId) -> ColorId {
        let at = self
            .ring
            .iter()
            .position(|c| c == reference)
            .map_or(0, |i| i + 1);
        let candidate = &self.ring[at % self.ring.len()];
        if candidate == reference {
            color("#FEFEFE")
        } else {
            candidate.clone()
        }
    }
}

impl StimulusGenerator for ScriptedGenerator {
    fn generate_trial(
        &mut self,
        reference: &ColorId,
        _cvd: CvdType,
        difficulty: u8,
    ) -> Result<Trial, ChromaError> {
        self.requested
            .lock()
            .expect("request log poisoned")
            .push(reference.clone());
        let position = if self.calls % 2 == 0 {
            Position::Color1
        } else {
            Position::Color2
        };
        self.calls += 1;
        Ok(Trial::new(
            reference.clone(),
            self.comparison_for(reference),
            position,
            0.5,
            difficulty,
        ))
    }
}

/// Fixed priority colors, identical for every CVD type.
#[derive(Debug, Clone)]
pub struct ListProfiles(pub Vec<ColorId>);

impl ListProfiles {
    pub fn new(list: &[&str]) -> Self {
        Self(colors(list))
    }
}

impl ProfileProvider for ListProfiles {
    fn priority_colors(&self, _cvd: CvdType) -> Vec<ColorId> {
        self.0.clone()
    }
}

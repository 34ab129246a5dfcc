//! Severity calibration from explicit threshold tests.
//!
//! Independent of the Bayesian model: a calibration run shows the user
//! progressively stronger simulations of a reference color and records
//! where they stop seeing a difference.

use crate::engine::errors::ChromaError;
use crate::engine::model::DEFAULT_SEVERITY;
use crate::engine::pair::ColorId;
use crate::profiles::{testing_profile, CvdType};

/// Severity reported when the user distinguished every level.
pub const MILD_SEVERITY: f64 = 0.1;
/// Severity reported when the user confused even the weakest level.
pub const SEVERE_SEVERITY: f64 = 0.9;
/// Levels at or below this are treated as "confused from the start".
pub const SEVERE_THRESHOLD: f64 = 0.2;

/// One calibration stage: a reference color and its confusable partner.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CalibrationStage {
    pub stage_name: String,
    pub reference: ColorId,
    pub comparison: ColorId,
}

/// Severity measured for one stage.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct StageResult {
    pub stage_name: String,
    pub severity: f64,
}

/// Answer to a single calibration level.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CalibrationResult {
    /// Simulation strength shown, in [0, 1].
    pub severity: f64,
    pub user_said_same: bool,
}

/// One stage per priority range of the CVD type's profile, pairing the
/// range's first two colors.
pub fn calibration_stages(cvd: CvdType) -> Result<Vec<CalibrationStage>, ChromaError> {
    testing_profile(cvd)
        .ranges
        .iter()
        .filter(|r| r.colors.len() >= 2)
        .map(|r| {
            Ok(CalibrationStage {
                stage_name: r.name.to_string(),
                reference: ColorId::new(r.colors[0])?,
                comparison: ColorId::new(r.colors[1])?,
            })
        })
        .collect()
}

/// Mean severity across stages; the default severity when there are none.
pub fn overall_severity(stage_results: &[StageResult]) -> f64 {
    if stage_results.is_empty() {
        return DEFAULT_SEVERITY;
    }
    stage_results.iter().map(|r| r.severity).sum::<f64>() / stage_results.len() as f64
}

/// Severity from a graduated calibration run.
///
/// The weakest level answered "same" is the estimate. No such level means a
/// mild deficiency; a first confusion at or below [`SEVERE_THRESHOLD`] means
/// a severe one.
pub fn severity_from_calibration(results: &[CalibrationResult]) -> f64 {
    let threshold = results
        .iter()
        .filter(|r| r.user_said_same)
        .map(|r| r.severity)
        .min_by(|a, b| a.total_cmp(b));

    match threshold {
        None => MILD_SEVERITY,
        Some(s) if s <= SEVERE_THRESHOLD => SEVERE_SEVERITY,
        Some(s) => s,
    }
}

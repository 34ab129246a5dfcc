//! # Belief model and update engine
//!
//! [`BeliefModel`] owns one user's belief store (canonical pair key → Beta
//! belief) and the append-only observation history. Beliefs are created lazily
//! from simulated confusion on the first update of a pair; read-only queries
//! evaluate the prior transiently instead of inserting it.
//!
//! One model per logical session. The model holds no global state and is not
//! meant to be mutated from several threads at once.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::engine::belief::{Belief, PriorInitializer};
use crate::engine::errors::ChromaError;
use crate::engine::pair::{ColorId, PairKey};
use crate::engine::trial::{now_millis, HistoryEntry, Position, Response, Trial};
use crate::external::{ConfusionSimulator, PerceptualMetric};
use crate::profiles::CvdType;

/// Per-user Bayesian model of which color pairs can be told apart.
pub struct BeliefModel {
    cvd_type: CvdType,
    severity: f64,
    beliefs: BTreeMap<PairKey, Belief>,
    history: Vec<HistoryEntry>,
    config: EngineConfig,
    prior: PriorInitializer,
    simulator: Arc<dyn ConfusionSimulator>,
    metric: Arc<dyn PerceptualMetric>,
}

impl fmt::Debug for BeliefModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeliefModel")
            .field("cvd_type", &self.cvd_type)
            .field("severity", &self.severity)
            .field("beliefs", &self.beliefs.len())
            .field("history", &self.history.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Default user severity before any estimate exists.
pub const DEFAULT_SEVERITY: f64 = 0.6;

impl BeliefModel {
    /// Creates an empty model with the default configuration.
    pub fn new(
        cvd_type: CvdType,
        simulator: Arc<dyn ConfusionSimulator>,
        metric: Arc<dyn PerceptualMetric>,
    ) -> Self {
        Self {
            cvd_type,
            severity: DEFAULT_SEVERITY,
            beliefs: BTreeMap::new(),
            history: Vec::new(),
            config: EngineConfig::default(),
            prior: PriorInitializer::default(),
            simulator,
            metric,
        }
    }

    /// Creates an empty model with a validated custom configuration.
    pub fn with_config(
        cvd_type: CvdType,
        config: EngineConfig,
        simulator: Arc<dyn ConfusionSimulator>,
        metric: Arc<dyn PerceptualMetric>,
    ) -> Result<Self, ChromaError> {
        let config = config.validate()?;
        let prior = PriorInitializer::new(config.prior_strength)?;
        Ok(Self {
            config,
            prior,
            ..Self::new(cvd_type, simulator, metric)
        })
    }

    pub fn cvd_type(&self) -> CvdType {
        self.cvd_type
    }

    /// User severity in [0, 1]. Informational; not used by the update rule.
    pub fn severity(&self) -> f64 {
        self.severity
    }

    pub fn set_severity(&mut self, severity: f64) {
        self.severity = if severity.is_nan() {
            DEFAULT_SEVERITY
        } else {
            severity.clamp(0.0, 1.0)
        };
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Number of recorded observations.
    pub fn total_observations(&self) -> usize {
        self.history.len()
    }

    /// The stored belief for a pair, if it has ever been updated or imported.
    pub fn belief(&self, pair: &PairKey) -> Option<&Belief> {
        self.beliefs.get(pair)
    }

    /// Stored beliefs in canonical key order.
    pub fn beliefs(&self) -> impl Iterator<Item = (&PairKey, &Belief)> {
        self.beliefs.iter()
    }

    pub fn belief_count(&self) -> usize {
        self.beliefs.len()
    }

    /// Simulated confusion probability for a pair under this model's CVD type.
    pub fn simulated_confusion(&self, pair: &PairKey) -> f64 {
        let p = self
            .simulator
            .simulated_confusion_probability(pair.first(), pair.second(), self.cvd_type);
        if p.is_nan() {
            0.5
        } else {
            p.clamp(0.0, 1.0)
        }
    }

    /// The prior a pair would start from.
    pub fn prior_for(&self, pair: &PairKey) -> Belief {
        self.prior.belief_for(self.simulated_confusion(pair))
    }

    /// The stored belief, or the prior evaluated on the fly.
    pub fn belief_or_prior(&self, pair: &PairKey) -> Belief {
        match self.beliefs.get(pair) {
            Some(b) => *b,
            None => self.prior_for(pair),
        }
    }

    /// Applies one observation of `pair` and appends it to history.
    ///
    /// `perceptual_distance` is the ΔE between the two colors; it sets the
    /// update strength through the configured evidence weighting.
    pub fn update(
        &mut self,
        pair: &PairKey,
        response: Response,
        perceptual_distance: f64,
    ) -> Result<&HistoryEntry, ChromaError> {
        self.apply(
            pair.first().clone(),
            pair.second().clone(),
            None,
            response,
            perceptual_distance,
        )
    }

    /// Like [`update`](Self::update) but from raw identifiers.
    ///
    /// Fails with [`ChromaError::InvalidTrial`] if either identifier is empty
    /// or malformed. Nothing is mutated on failure.
    pub fn update_raw(
        &mut self,
        color1: &str,
        color2: &str,
        response: Response,
        perceptual_distance: f64,
    ) -> Result<&HistoryEntry, ChromaError> {
        let c1 = parse_trial_color(color1)?;
        let c2 = parse_trial_color(color2)?;
        self.apply(c1, c2, None, response, perceptual_distance)
    }

    /// Scores a presented trial.
    ///
    /// ΔE comes from the injected perceptual metric. The history entry keeps
    /// the trial's slot order, its reference, and whether the user named the
    /// reference slot.
    pub fn update_from_response(
        &mut self,
        trial: &Trial,
        response: Response,
    ) -> Result<&HistoryEntry, ChromaError> {
        trial.validate()?;
        let delta_e = self.metric.delta_e(&trial.color1, &trial.color2);
        self.apply(
            trial.color1.clone(),
            trial.color2.clone(),
            Some((trial.reference.clone(), trial.reference_position)),
            response,
            delta_e,
        )
    }

    fn apply(
        &mut self,
        color1: ColorId,
        color2: ColorId,
        reference: Option<(ColorId, Position)>,
        response: Response,
        perceptual_distance: f64,
    ) -> Result<&HistoryEntry, ChromaError> {
        if !(perceptual_distance.is_finite() && perceptual_distance >= 0.0) {
            return Err(ChromaError::InvalidInput(format!(
                "perceptual distance must be finite and >= 0, got {}",
                perceptual_distance
            )));
        }

        let pair = PairKey::new(color1.clone(), color2.clone());
        let success = response.is_distinguished();
        let weight = self.config.evidence.weight(perceptual_distance);

        let mut belief = self.belief_or_prior(&pair);
        belief.update(success, weight)?;
        let belief_after = belief.mean();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            pair = %pair,
            delta_e = perceptual_distance,
            weight,
            distinguished = success,
            confusion = 1.0 - belief_after,
            "bayesian update"
        );

        self.beliefs.insert(pair, belief);

        let identified_correctly = match &reference {
            Some((_, position)) => response.identifies(*position),
            None => false,
        };
        self.history.push(HistoryEntry {
            color1,
            color2,
            reference: reference.map(|(c, _)| c),
            user_response: response,
            user_distinguished: success,
            identified_correctly,
            delta_e: perceptual_distance,
            update_weight: weight,
            belief_after,
            timestamp: now_millis(),
        });
        let last = self.history.len() - 1;
        Ok(&self.history[last])
    }

    /// Replaces CVD type, beliefs, and history wholesale.
    pub(crate) fn replace_state(
        &mut self,
        cvd_type: CvdType,
        beliefs: BTreeMap<PairKey, Belief>,
        history: Vec<HistoryEntry>,
    ) {
        self.cvd_type = cvd_type;
        self.beliefs = beliefs;
        self.history = history;
    }
}

fn parse_trial_color(raw: &str) -> Result<ColorId, ChromaError> {
    ColorId::new(raw).map_err(|e| match e {
        ChromaError::InvalidInput(msg) => ChromaError::InvalidTrial(msg),
        other => other,
    })
}

//! Adaptive trial selection.
//!
//! Three policies pick the next reference color:
//! - **Explore**: the least-tested color in an expanded pool (priority colors,
//!   confusion hotspots, and untested suggestions).
//! - **Exploit**: sample priority colors, probe a trial for each, and keep the
//!   reference whose probe pair promises the most information gain.
//! - **Balanced**: exploit with probability 0.7, explore otherwise.
//!
//! The winning exploitation reference gets a freshly generated trial, which can
//! differ from the probe that won because generation is stochastic.
//!
//! The random source is a type parameter so tests can inject a seeded RNG.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::SelectorConfig;
use crate::engine::errors::ChromaError;
use crate::engine::model::BeliefModel;
use crate::engine::pair::ColorId;
use crate::engine::trial::{clamp_difficulty, Trial};
use crate::external::{ProfileProvider, StimulusGenerator};

/// Selection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SelectionMode {
    Explore,
    Exploit,
    #[default]
    Balanced,
}

impl SelectionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SelectionMode::Explore => "explore",
            SelectionMode::Exploit => "exploit",
            SelectionMode::Balanced => "balanced",
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectionMode {
    type Err = ChromaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "explore" => Ok(SelectionMode::Explore),
            "exploit" => Ok(SelectionMode::Exploit),
            "balanced" => Ok(SelectionMode::Balanced),
            other => Err(ChromaError::InvalidMode(other.to_string())),
        }
    }
}

/// Progress summary of a testing session.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SelectorStats {
    pub total_tests: usize,
    pub unique_pairs_tested: usize,
    pub unique_colors_tested: usize,
    pub confirmed_confusions: usize,
    /// Mean entropy over tested pairs; 1.0 when nothing is tested yet.
    pub average_uncertainty: f64,
    pub mode: SelectionMode,
}

impl SelectorStats {
    /// Collects stats from `model`, counting confusions at the model's
    /// configured threshold.
    pub fn collect(model: &BeliefModel, mode: SelectionMode) -> Self {
        let tested = model.tested_pairs();
        let threshold = model.config().confusion_threshold;

        let average_uncertainty = if tested.is_empty() {
            1.0
        } else {
            tested.iter().map(|p| p.uncertainty).sum::<f64>() / tested.len() as f64
        };
        let unique_colors: FxHashSet<&ColorId> =
            tested.iter().flat_map(|p| p.pair.colors()).collect();
        let confirmed_confusions = tested
            .iter()
            .filter(|p| p.confusion_probability >= threshold)
            .count();

        Self {
            total_tests: model.total_observations(),
            unique_pairs_tested: tested.len(),
            unique_colors_tested: unique_colors.len(),
            confirmed_confusions,
            average_uncertainty,
            mode,
        }
    }
}

/// Recommends a mode from progress alone.
///
/// Few observations → explore; high average uncertainty → exploit; low
/// coverage of `priority_colors` → explore; otherwise balanced.
pub fn suggest_mode_for(
    model: &BeliefModel,
    priority_colors: &[ColorId],
    config: &SelectorConfig,
) -> SelectionMode {
    let stats = SelectorStats::collect(model, SelectionMode::default());
    if stats.total_tests < config.explore_below_observations {
        return SelectionMode::Explore;
    }
    if stats.average_uncertainty > config.exploit_above_uncertainty {
        return SelectionMode::Exploit;
    }
    if !priority_colors.is_empty() {
        let coverage = stats.unique_colors_tested as f64 / priority_colors.len() as f64;
        if coverage < config.coverage_explore_below {
            return SelectionMode::Explore;
        }
    }
    SelectionMode::Balanced
}

/// Chooses the next trial for a session.
///
/// The selector reads the model but never mutates it; the caller scores the
/// returned trial through [`BeliefModel::update_from_response`].
pub struct AdaptiveSelector<G, R = StdRng> {
    mode: SelectionMode,
    config: SelectorConfig,
    generator: G,
    profiles: Arc<dyn ProfileProvider>,
    rng: R,
}

impl<G, R> fmt::Debug for AdaptiveSelector<G, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdaptiveSelector")
            .field("mode", &self.mode)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<G: StimulusGenerator> AdaptiveSelector<G, StdRng> {
    /// Creates a selector in balanced mode, seeded from OS entropy.
    pub fn new(generator: G, profiles: Arc<dyn ProfileProvider>) -> Self {
        Self::with_rng(generator, profiles, StdRng::from_os_rng())
    }
}

impl<G: StimulusGenerator, R: Rng> AdaptiveSelector<G, R> {
    /// Creates a selector in balanced mode with an explicit random source.
    pub fn with_rng(generator: G, profiles: Arc<dyn ProfileProvider>, rng: R) -> Self {
        Self {
            mode: SelectionMode::default(),
            config: SelectorConfig::default(),
            generator,
            profiles,
            rng,
        }
    }

    pub fn with_config(mut self, config: SelectorConfig) -> Result<Self, ChromaError> {
        self.config = config.validate()?;
        Ok(self)
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    pub fn set_mode(&mut self, mode: SelectionMode) {
        self.mode = mode;
    }

    /// Sets the mode from its string name. Unknown names are ignored and the
    /// current mode is kept; returns whether the mode was accepted.
    pub fn set_mode_str(&mut self, mode: &str) -> bool {
        match mode.parse::<SelectionMode>() {
            Ok(m) => {
                self.mode = m;
                true
            }
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(error = %_e, current = %self.mode, "ignoring unknown selection mode");
                false
            }
        }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Picks the next trial according to the current mode.
    pub fn select_next_trial(
        &mut self,
        model: &BeliefModel,
        difficulty: u8,
    ) -> Result<Trial, ChromaError> {
        match self.mode {
            SelectionMode::Explore => self.select_exploration(model, difficulty),
            SelectionMode::Exploit => self.select_exploitation(model, difficulty),
            SelectionMode::Balanced => {
                if self.rng.random::<f64>() < self.config.balanced_exploit_ratio {
                    self.select_exploitation(model, difficulty)
                } else {
                    self.select_exploration(model, difficulty)
                }
            }
        }
    }

    /// The deduplicated exploration pool: priority colors, then hotspots, then
    /// untested suggestions.
    pub fn exploration_pool(&self, model: &BeliefModel) -> Vec<ColorId> {
        let priority = self.profiles.priority_colors(model.cvd_type());
        let cfg = model.config();
        let hotspots =
            model.confusion_hotspots(cfg.confusion_threshold, cfg.hotspot_min_observations);
        let suggested = model.suggest_next_colors(&priority, self.config.exploration_suggestions);

        let mut seen = FxHashSet::default();
        priority
            .into_iter()
            .chain(hotspots)
            .chain(suggested)
            .filter(|c| seen.insert(c.clone()))
            .collect()
    }

    /// Trial for the least-tested color of the exploration pool (ties go to
    /// the earliest pool member).
    pub fn select_exploration(
        &mut self,
        model: &BeliefModel,
        difficulty: u8,
    ) -> Result<Trial, ChromaError> {
        let pool = self.exploration_pool(model);

        let mut counts: FxHashMap<ColorId, usize> = FxHashMap::default();
        for tp in model.tested_pairs() {
            for color in tp.pair.colors() {
                *counts.entry(color.clone()).or_insert(0) += 1;
            }
        }

        let mut best: Option<(&ColorId, usize)> = None;
        for color in &pool {
            let count = counts.get(color).copied().unwrap_or(0);
            match best {
                Some((_, min)) if count >= min => {}
                _ => best = Some((color, count)),
            }
        }
        let (reference, _count) = best.ok_or_else(|| {
            ChromaError::InvalidInput(format!(
                "no candidate colors to explore for {}",
                model.cvd_type()
            ))
        })?;

        #[cfg(feature = "tracing")]
        tracing::debug!(reference = %reference, tests = _count, pool = pool.len(), "exploration pick");

        self.generate(reference, model, difficulty)
    }

    /// Trial for the sampled priority color whose probe pair has the highest
    /// information gain.
    pub fn select_exploitation(
        &mut self,
        model: &BeliefModel,
        difficulty: u8,
    ) -> Result<Trial, ChromaError> {
        let priority = self.profiles.priority_colors(model.cvd_type());
        if priority.is_empty() {
            return Err(ChromaError::InvalidInput(format!(
                "no priority colors to exploit for {}",
                model.cvd_type()
            )));
        }

        let samples = self.config.exploitation_samples.min(priority.len());
        let mut best: Option<(usize, f64)> = None;
        for _ in 0..samples {
            let idx = self.rng.random_range(0..priority.len());
            let probe = self.generate(&priority[idx], model, difficulty)?;
            let gain = model.information_gain(&probe.pair_key());

            #[cfg(feature = "tracing")]
            tracing::trace!(reference = %priority[idx], pair = %probe.pair_key(), gain, "exploitation probe");

            if best.map_or(true, |(_, g)| gain > g) {
                best = Some((idx, gain));
            }
        }

        let winner = best.map_or(0, |(idx, _)| idx);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            reference = %priority[winner],
            gain = best.map_or(0.0, |(_, g)| g),
            "exploitation pick"
        );

        self.generate(&priority[winner], model, difficulty)
    }

    /// Progress stats for `model` under the current mode.
    pub fn stats(&self, model: &BeliefModel) -> SelectorStats {
        SelectorStats::collect(model, self.mode)
    }

    /// Recommended mode given the model's progress.
    pub fn suggest_mode(&self, model: &BeliefModel) -> SelectionMode {
        let priority = self.profiles.priority_colors(model.cvd_type());
        suggest_mode_for(model, &priority, &self.config)
    }

    fn generate(
        &mut self,
        reference: &ColorId,
        model: &BeliefModel,
        difficulty: u8,
    ) -> Result<Trial, ChromaError> {
        let trial =
            self.generator
                .generate_trial(reference, model.cvd_type(), clamp_difficulty(difficulty))?;
        trial.validate()?;
        Ok(trial)
    }
}

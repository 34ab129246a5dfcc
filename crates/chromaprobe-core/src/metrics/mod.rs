//! Derived, read-only queries over a [`BeliefModel`].
//!
//! - `confusion_probability`, `are_colors_confusable`, `uncertainty`
//! - `information_gain` (exact one-step lookahead over the two outcomes)
//! - `tested_pairs`, `confused_pairs`, `confusion_hotspots`
//! - `suggest_next_colors` (coverage gaps first, then uncertainty)
//! - `estimate_severity` (observed vs. simulated confusion)
//!
//! Notes:
//! - No query inserts a belief; unseen pairs are answered from the prior.
//! - Deterministic: pairs are visited in canonical key order.

use rustc_hash::FxHashSet;

use crate::engine::belief::Belief;
use crate::engine::model::BeliefModel;
use crate::engine::pair::{ColorId, PairKey};

/// A pair with a stored belief, annotated with its derived metrics.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TestedPair {
    pub pair: PairKey,
    pub confusion_probability: f64,
    pub uncertainty: f64,
    pub observations: f64,
}

/// Outcome of a severity estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "status", rename_all = "camelCase"))]
pub enum SeverityEstimate {
    /// Not enough history to say anything.
    Unavailable { history_len: usize, required: usize },
    /// Estimated severity in [0, 1]. `qualifying_pairs == 0` means the base
    /// default was returned.
    Estimated {
        severity: f64,
        qualifying_pairs: usize,
    },
}

impl SeverityEstimate {
    pub fn value(&self) -> Option<f64> {
        match self {
            SeverityEstimate::Unavailable { .. } => None,
            SeverityEstimate::Estimated { severity, .. } => Some(*severity),
        }
    }

    pub fn is_available(&self) -> bool {
        self.value().is_some()
    }
}

/// Expected entropy reduction from one more unit observation of `belief`.
///
/// `H(now) − [p·H(α+1, β) + (1−p)·H(α, β+1)]` with `p = mean`. Non-negative by
/// concavity of entropy; rounding residue below zero is clamped.
pub fn information_gain(belief: &Belief) -> f64 {
    let p_success = belief.mean();
    let expected_after = p_success * belief.lookahead(true).entropy()
        + (1.0 - p_success) * belief.lookahead(false).entropy();
    (belief.entropy() - expected_after).max(0.0)
}

impl BeliefModel {
    /// P(pair looks identical) = 1 − E[distinguishable].
    pub fn confusion_probability(&self, pair: &PairKey) -> f64 {
        1.0 - self.belief_or_prior(pair).mean()
    }

    pub fn are_colors_confusable(&self, pair: &PairKey, threshold: f64) -> bool {
        self.confusion_probability(pair) >= threshold
    }

    /// Entropy in bits of the pair's belief. Higher means testing it teaches more.
    pub fn uncertainty(&self, pair: &PairKey) -> f64 {
        self.belief_or_prior(pair).entropy()
    }

    pub fn information_gain(&self, pair: &PairKey) -> f64 {
        information_gain(&self.belief_or_prior(pair))
    }

    /// Every pair with a stored belief, in canonical key order.
    pub fn tested_pairs(&self) -> Vec<TestedPair> {
        self.beliefs()
            .map(|(pair, b)| TestedPair {
                pair: pair.clone(),
                confusion_probability: 1.0 - b.mean(),
                uncertainty: b.entropy(),
                observations: b.observation_count(),
            })
            .collect()
    }

    /// Tested pairs whose confusion probability is at or above `threshold`.
    pub fn confused_pairs(&self, threshold: f64) -> Vec<TestedPair> {
        self.tested_pairs()
            .into_iter()
            .filter(|p| p.confusion_probability >= threshold)
            .collect()
    }

    /// Distinct colors appearing in confusable, well-observed pairs.
    ///
    /// Colors are returned in first-seen order.
    pub fn confusion_hotspots(&self, threshold: f64, min_observations: f64) -> Vec<ColorId> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        for tp in self.tested_pairs() {
            if tp.confusion_probability < threshold || tp.observations < min_observations {
                continue;
            }
            for color in tp.pair.colors() {
                if seen.insert(color.clone()) {
                    out.push(color.clone());
                }
            }
        }
        out
    }

    /// Up to `count` members of `pool` that appear in no tested pair, in pool
    /// order.
    ///
    /// When fewer than `count` untested colors remain, returns instead the
    /// first color of the `count` most uncertain tested pairs.
    pub fn suggest_next_colors(&self, pool: &[ColorId], count: usize) -> Vec<ColorId> {
        let tested = self.tested_pairs();
        let tested_colors: FxHashSet<&ColorId> =
            tested.iter().flat_map(|tp| tp.pair.colors()).collect();

        let untested: Vec<ColorId> = pool
            .iter()
            .filter(|c| !tested_colors.contains(c))
            .cloned()
            .collect();

        if untested.len() >= count {
            return untested.into_iter().take(count).collect();
        }

        let mut by_uncertainty: Vec<&TestedPair> = tested.iter().collect();
        by_uncertainty.sort_by(|a, b| b.uncertainty.total_cmp(&a.uncertainty));
        by_uncertainty
            .into_iter()
            .take(count)
            .map(|tp| tp.pair.first().clone())
            .collect()
    }

    /// Estimates CVD severity by comparing observed confusion against the
    /// simulator's prediction on well-observed pairs.
    ///
    /// `severity = clamp(base + scale · mean(observed − simulated), 0, 1)`.
    /// Below the configured history length the result is
    /// [`SeverityEstimate::Unavailable`]; with no qualifying pair it is the
    /// base severity.
    pub fn estimate_severity(&self) -> SeverityEstimate {
        let cfg = self.config();
        let history_len = self.total_observations();
        if history_len < cfg.severity_min_history {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                history_len,
                required = cfg.severity_min_history,
                "insufficient data for severity estimation"
            );
            return SeverityEstimate::Unavailable {
                history_len,
                required: cfg.severity_min_history,
            };
        }

        let (total_deviation, count) = self
            .tested_pairs()
            .iter()
            .filter(|tp| tp.observations >= cfg.severity_min_pair_observations)
            .fold((0.0, 0usize), |(sum, n), tp| {
                let expected = self.simulated_confusion(&tp.pair);
                (sum + (tp.confusion_probability - expected), n + 1)
            });

        if count == 0 {
            return SeverityEstimate::Estimated {
                severity: cfg.severity_base,
                qualifying_pairs: 0,
            };
        }

        let avg_deviation = total_deviation / count as f64;
        let severity = (cfg.severity_base + avg_deviation * cfg.severity_scale).clamp(0.0, 1.0);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            qualifying_pairs = count,
            avg_deviation,
            severity,
            "estimated severity"
        );

        SeverityEstimate::Estimated {
            severity,
            qualifying_pairs: count,
        }
    }
}

//! # Pair beliefs
//!
//! - **Belief**: Beta(α, β) posterior over "this color pair is distinguishable".
//!   α accumulates evidence of distinguishing, β evidence of confusion.
//!   Updates are weighted conjugate Beta-Bernoulli updates.
//!
//! - **PriorInitializer**: maps an externally simulated confusion probability
//!   to a weak Beta prior that a handful of real observations can overturn.

use crate::engine::errors::ChromaError;

/// Pseudo-observations contributed by the unit priors (α=1, β=1).
pub const UNIT_PRIOR_MASS: f64 = 2.0;

/// Binary entropy in bits. Zero at p ∈ {0, 1}, one bit at p = 0.5.
pub fn binary_entropy(p: f64) -> f64 {
    if p <= 0.0 || p >= 1.0 || p.is_nan() {
        return 0.0;
    }
    -(p * p.log2() + (1.0 - p) * (1.0 - p).log2())
}

/// A Beta posterior over the probability that a color pair is distinguishable.
///
/// Both parameters are strictly positive and finite. Parameters only ever grow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Belief {
    alpha: f64,
    beta: f64,
}

impl Default for Belief {
    /// Uniform Beta(1, 1).
    fn default() -> Self {
        Self {
            alpha: 1.0,
            beta: 1.0,
        }
    }
}

impl Belief {
    /// Creates a belief, rejecting non-positive or non-finite parameters.
    pub fn new(alpha: f64, beta: f64) -> Result<Self, ChromaError> {
        if !(alpha.is_finite() && alpha > 0.0) || !(beta.is_finite() && beta > 0.0) {
            return Err(ChromaError::InvalidInput(format!(
                "belief parameters must be finite and > 0 (alpha={}, beta={})",
                alpha, beta
            )));
        }
        Ok(Self { alpha, beta })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Posterior mean E[p] = α / (α + β).
    pub fn mean(&self) -> f64 {
        self.alpha / (self.alpha + self.beta)
    }

    /// Var[p] = αβ / ((α+β)² (α+β+1)).
    pub fn variance(&self) -> f64 {
        let sum = self.alpha + self.beta;
        (self.alpha * self.beta) / (sum * sum * (sum + 1.0))
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Binary entropy (bits) of the posterior mean.
    pub fn entropy(&self) -> f64 {
        binary_entropy(self.mean())
    }

    /// Pseudo-count of observations beyond the unit priors. Fractional when
    /// weighted evidence or a simulation-derived prior is involved.
    pub fn observation_count(&self) -> f64 {
        self.alpha + self.beta - UNIT_PRIOR_MASS
    }

    /// Weighted conjugate update.
    ///
    /// `success` (the pair was told apart) adds `weight` to α; a confusion adds
    /// it to β.
    pub fn update(&mut self, success: bool, weight: f64) -> Result<(), ChromaError> {
        if !(weight.is_finite() && weight > 0.0) {
            return Err(ChromaError::InvalidInput(format!(
                "evidence weight must be finite and > 0, got {}",
                weight
            )));
        }
        if success {
            self.alpha += weight;
        } else {
            self.beta += weight;
        }
        Ok(())
    }

    /// The belief after one more unit-weight observation, leaving `self` intact.
    pub fn lookahead(&self, success: bool) -> Belief {
        if success {
            Belief {
                alpha: self.alpha + 1.0,
                beta: self.beta,
            }
        } else {
            Belief {
                alpha: self.alpha,
                beta: self.beta + 1.0,
            }
        }
    }
}

/// Derives initial beliefs from simulated confusion probabilities.
///
/// `α = s·(1−p) + 1`, `β = s·p + 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriorInitializer {
    strength: f64,
}

impl Default for PriorInitializer {
    fn default() -> Self {
        Self {
            strength: Self::DEFAULT_STRENGTH,
        }
    }
}

impl PriorInitializer {
    pub const DEFAULT_STRENGTH: f64 = 2.0;

    pub fn new(strength: f64) -> Result<Self, ChromaError> {
        if !(strength.is_finite() && strength >= 0.0) {
            return Err(ChromaError::Validation(format!(
                "prior strength must be finite and >= 0, got {}",
                strength
            )));
        }
        Ok(Self { strength })
    }

    pub fn strength(&self) -> f64 {
        self.strength
    }

    /// Prior for a pair whose simulated confusion probability is `p`.
    ///
    /// `p` is clamped to [0, 1]; a NaN probability is treated as maximally
    /// uninformative (0.5).
    pub fn belief_for(&self, simulated_confusion: f64) -> Belief {
        let p = if simulated_confusion.is_nan() {
            0.5
        } else {
            simulated_confusion.clamp(0.0, 1.0)
        };
        Belief {
            alpha: self.strength * (1.0 - p) + 1.0,
            beta: self.strength * p + 1.0,
        }
    }
}

//! # Chromaprobe Core
//!
//! Bayesian belief engine for color-discrimination testing: per-pair Beta
//! beliefs seeded from simulated confusion, evidence weighted by perceptual
//! distance, derived metrics, and adaptive trial selection.

#![forbid(unsafe_code)]

pub mod calibration;
pub mod config;
pub mod engine;
pub mod external;
pub mod metrics;
pub mod profiles;
pub mod selection;
pub mod session;

// Re-export commonly used types
pub use config::{EngineConfig, SelectorConfig, SessionConfig};
pub use engine::belief::{Belief, PriorInitializer};
pub use engine::errors::ChromaError;
pub use engine::evidence::EvidenceWeighting;
pub use engine::model::BeliefModel;
pub use engine::pair::{ColorId, PairKey};
pub use engine::snapshot::{BeliefRecord, ModelSnapshot};
pub use engine::trial::{HistoryEntry, Position, Response, Trial};
pub use external::{
    ConfusionSimulator, PerceptualMetric, ProfileProvider, StimulusGenerator, TablePerceptualMetric,
    TableSimulator,
};
pub use metrics::{SeverityEstimate, TestedPair};
pub use profiles::{BuiltinProfiles, CvdType};
pub use selection::{AdaptiveSelector, SelectionMode, SelectorStats};
pub use session::{MemorySnapshotStore, SnapshotStatus, SnapshotStore, TestSession};

//! Interactive testing sessions.
//!
//! A [`TestSession`] wires one [`BeliefModel`] to one [`AdaptiveSelector`]
//! and a [`SnapshotStore`]. Every session owns its state outright; nothing
//! is shared between sessions.
//!
//! Persistence is best effort: load and save failures are logged and
//! reported to the caller, but never undo an observation.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::Rng;

use crate::config::{EngineConfig, SelectorConfig, SessionConfig};
use crate::engine::errors::ChromaError;
use crate::engine::model::BeliefModel;
use crate::engine::snapshot::ModelSnapshot;
use crate::engine::trial::{clamp_difficulty, now_millis, HistoryEntry, Response, Trial};
use crate::external::{ConfusionSimulator, PerceptualMetric, ProfileProvider, StimulusGenerator};
use crate::profiles::CvdType;
use crate::selection::{AdaptiveSelector, SelectionMode, SelectorStats};

/// Where model snapshots are persisted between sessions.
pub trait SnapshotStore: Send {
    /// The last saved snapshot, if any.
    fn load(&self) -> Result<Option<ModelSnapshot>, ChromaError>;
    /// Overwrites the stored snapshot.
    fn save(&mut self, snapshot: &ModelSnapshot) -> Result<(), ChromaError>;
}

/// In-memory [`SnapshotStore`], mostly for tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    snapshot: Option<ModelSnapshot>,
    saves: usize,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: ModelSnapshot) -> Self {
        Self {
            snapshot: Some(snapshot),
            saves: 0,
        }
    }

    pub fn snapshot(&self) -> Option<&ModelSnapshot> {
        self.snapshot.as_ref()
    }

    /// Number of successful saves.
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self) -> Result<Option<ModelSnapshot>, ChromaError> {
        Ok(self.snapshot.clone())
    }

    fn save(&mut self, snapshot: &ModelSnapshot) -> Result<(), ChromaError> {
        self.snapshot = Some(snapshot.clone());
        self.saves += 1;
        Ok(())
    }
}

/// [`SnapshotStore`] backed by a JSON file. A missing file loads as `None`.
#[cfg(feature = "serde")]
#[derive(Debug, Clone)]
pub struct JsonFileSnapshotStore {
    path: std::path::PathBuf,
}

#[cfg(feature = "serde")]
impl JsonFileSnapshotStore {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[cfg(feature = "serde")]
impl SnapshotStore for JsonFileSnapshotStore {
    fn load(&self) -> Result<Option<ModelSnapshot>, ChromaError> {
        match std::fs::read_to_string(&self.path) {
            Ok(json) => crate::engine::snapshot::load_snapshot_json(&json).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ChromaError::Persistence(format!(
                "failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn save(&mut self, snapshot: &ModelSnapshot) -> Result<(), ChromaError> {
        let json = crate::engine::snapshot::save_snapshot_json(snapshot)?;
        std::fs::write(&self.path, json).map_err(|e| {
            ChromaError::Persistence(format!("failed to write {}: {}", self.path.display(), e))
        })
    }
}

/// What happened to the snapshot after an observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotStatus {
    /// Not a snapshot point.
    Skipped,
    Saved,
    /// The save failed; the observation is kept regardless.
    Failed(String),
}

/// Result of [`TestSession::record_response`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseOutcome {
    pub entry: HistoryEntry,
    /// Milliseconds between presenting the trial and recording the answer.
    pub response_time_ms: Option<u64>,
    pub snapshot: SnapshotStatus,
}

/// Collaborators and tuning for [`TestSession::start`].
pub struct SessionParts<G, R = StdRng> {
    pub simulator: Arc<dyn ConfusionSimulator>,
    pub metric: Arc<dyn PerceptualMetric>,
    pub generator: G,
    pub profiles: Arc<dyn ProfileProvider>,
    pub rng: R,
    pub store: Box<dyn SnapshotStore>,
    pub engine: EngineConfig,
    pub selector: SelectorConfig,
}

/// One user's testing session.
pub struct TestSession<G, R = StdRng> {
    model: BeliefModel,
    selector: AdaptiveSelector<G, R>,
    store: Box<dyn SnapshotStore>,
    config: SessionConfig,
    difficulty: u8,
    current: Option<Trial>,
    started_at_ms: u64,
}

impl<G: StimulusGenerator, R: Rng> TestSession<G, R> {
    /// Builds the model and selector, then restores the last stored snapshot.
    ///
    /// A snapshot that fails to load or import is logged and ignored; the
    /// session starts from an empty model instead.
    pub fn start(
        cvd_type: CvdType,
        user_severity: Option<f64>,
        parts: SessionParts<G, R>,
        config: SessionConfig,
    ) -> Result<Self, ChromaError> {
        let config = config.validate()?;
        let mut model =
            BeliefModel::with_config(cvd_type, parts.engine, parts.simulator, parts.metric)?;
        model.set_severity(user_severity.unwrap_or(config.default_severity));

        match parts.store.load() {
            Ok(Some(snapshot)) => {
                if let Err(_e) = model.import_state(snapshot) {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(error = %_e, "could not import stored snapshot");
                }
            }
            Ok(None) => {}
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %_e, "could not load stored snapshot");
            }
        }

        let selector = AdaptiveSelector::with_rng(parts.generator, parts.profiles, parts.rng)
            .with_config(parts.selector)?;

        #[cfg(feature = "tracing")]
        tracing::info!(
            cvd_type = %model.cvd_type(),
            severity = model.severity(),
            restored = model.total_observations(),
            "session started"
        );

        Ok(Self {
            model,
            selector,
            store: parts.store,
            difficulty: config.default_difficulty,
            config,
            current: None,
            started_at_ms: now_millis(),
        })
    }

    pub fn model(&self) -> &BeliefModel {
        &self.model
    }

    pub fn selector(&self) -> &AdaptiveSelector<G, R> {
        &self.selector
    }

    pub fn current_trial(&self) -> Option<&Trial> {
        self.current.as_ref()
    }

    pub fn started_at_ms(&self) -> u64 {
        self.started_at_ms
    }

    pub fn difficulty(&self) -> u8 {
        self.difficulty
    }

    pub fn set_difficulty(&mut self, difficulty: u8) {
        self.difficulty = clamp_difficulty(difficulty);
    }

    /// Selects, stamps, and remembers the next trial. Replaces any trial
    /// still awaiting a response.
    pub fn next_trial(&mut self) -> Result<&Trial, ChromaError> {
        let mut trial = self
            .selector
            .select_next_trial(&self.model, self.difficulty)?;
        trial.started_at_ms = Some(now_millis());
        Ok(self.current.insert(trial))
    }

    /// Scores the current trial and clears it.
    ///
    /// Saves a snapshot whenever the history length reaches a multiple of
    /// `snapshot_every`.
    pub fn record_response(&mut self, response: Response) -> Result<ResponseOutcome, ChromaError> {
        let trial = self
            .current
            .as_ref()
            .ok_or_else(|| ChromaError::InvalidTrial("no trial awaiting a response".into()))?;

        let entry = self.model.update_from_response(trial, response)?.clone();
        let response_time_ms = trial
            .started_at_ms
            .map(|start| entry.timestamp.saturating_sub(start));
        self.current = None;

        let every = self.config.snapshot_every;
        let snapshot = if every > 0 && self.model.total_observations() % every == 0 {
            self.save()
        } else {
            SnapshotStatus::Skipped
        };

        Ok(ResponseOutcome {
            entry,
            response_time_ms,
            snapshot,
        })
    }

    pub fn set_mode(&mut self, mode: SelectionMode) {
        self.selector.set_mode(mode);
    }

    /// See [`AdaptiveSelector::set_mode_str`].
    pub fn set_mode_str(&mut self, mode: &str) -> bool {
        self.selector.set_mode_str(mode)
    }

    pub fn stats(&self) -> SelectorStats {
        self.selector.stats(&self.model)
    }

    pub fn suggested_mode(&self) -> SelectionMode {
        self.selector.suggest_mode(&self.model)
    }

    /// Drops any pending trial and saves a final snapshot.
    pub fn end(&mut self) -> SnapshotStatus {
        self.current = None;
        let status = self.save();

        #[cfg(feature = "tracing")]
        tracing::info!(
            observations = self.model.total_observations(),
            duration_ms = now_millis().saturating_sub(self.started_at_ms),
            "session ended"
        );

        status
    }

    fn save(&mut self) -> SnapshotStatus {
        match self.store.save(&self.model.export_state()) {
            Ok(()) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    observations = self.model.total_observations(),
                    "saved model snapshot"
                );
                SnapshotStatus::Saved
            }
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %e, "could not save model snapshot");
                SnapshotStatus::Failed(e.to_string())
            }
        }
    }
}

//! Whole-model export and import.
//!
//! A [`ModelSnapshot`] is the only unit of persistence: CVD type, every
//! stored belief, and the full history. Import is a validated, idempotent
//! overwrite of all in-memory state; nothing is merged.

use std::collections::BTreeMap;

use crate::engine::belief::Belief;
use crate::engine::errors::ChromaError;
use crate::engine::model::BeliefModel;
use crate::engine::pair::PairKey;
use crate::engine::trial::HistoryEntry;
use crate::profiles::CvdType;

/// Persisted parameters of one pair belief.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BeliefRecord {
    pub key: PairKey,
    pub alpha: f64,
    pub beta: f64,
}

/// Serializable state of a [`BeliefModel`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ModelSnapshot {
    #[cfg_attr(feature = "serde", serde(alias = "colorblindnessType"))]
    pub cvd_type: CvdType,
    #[cfg_attr(feature = "serde", serde(default, alias = "pairBeliefs"))]
    pub beliefs: Vec<BeliefRecord>,
    #[cfg_attr(feature = "serde", serde(default, alias = "testHistory"))]
    pub history: Vec<HistoryEntry>,
}

impl BeliefModel {
    /// Captures the full model state.
    pub fn export_state(&self) -> ModelSnapshot {
        ModelSnapshot {
            cvd_type: self.cvd_type(),
            beliefs: self
                .beliefs()
                .map(|(key, b)| BeliefRecord {
                    key: key.clone(),
                    alpha: b.alpha(),
                    beta: b.beta(),
                })
                .collect(),
            history: self.history().to_vec(),
        }
    }

    /// Replaces CVD type, history, and the entire belief store.
    ///
    /// Every record is validated before anything is replaced, so a rejected
    /// snapshot leaves the model untouched. Duplicate keys keep the last record.
    pub fn import_state(&mut self, snapshot: ModelSnapshot) -> Result<(), ChromaError> {
        let mut beliefs = BTreeMap::new();
        for record in snapshot.beliefs {
            let belief = Belief::new(record.alpha, record.beta).map_err(|e| {
                ChromaError::InvalidInput(format!("snapshot belief '{}': {}", record.key, e))
            })?;
            beliefs.insert(record.key, belief);
        }

        #[cfg(feature = "tracing")]
        tracing::info!(
            cvd_type = %snapshot.cvd_type,
            beliefs = beliefs.len(),
            history = snapshot.history.len(),
            "imported model snapshot"
        );

        self.replace_state(snapshot.cvd_type, beliefs, snapshot.history);
        Ok(())
    }
}

/// Encodes a snapshot as pretty-printed JSON.
#[cfg(feature = "serde")]
pub fn save_snapshot_json(snapshot: &ModelSnapshot) -> Result<String, ChromaError> {
    serde_json::to_string_pretty(snapshot)
        .map_err(|e| ChromaError::Serialization(format!("failed to encode snapshot: {}", e)))
}

/// Decodes a snapshot from JSON.
#[cfg(feature = "serde")]
pub fn load_snapshot_json(json: &str) -> Result<ModelSnapshot, ChromaError> {
    serde_json::from_str(json)
        .map_err(|e| ChromaError::Serialization(format!("failed to decode snapshot: {}", e)))
}

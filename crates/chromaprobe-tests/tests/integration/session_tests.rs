//! Integration tests for testing sessions and snapshot cadence.

use std::sync::{Arc, Mutex};

use chromaprobe_core::engine::trial::Response;
use chromaprobe_core::session::SessionParts;
use chromaprobe_core::{
    ChromaError, CvdType, EngineConfig, ModelSnapshot, SelectionMode, SelectorConfig,
    SessionConfig, SnapshotStatus, SnapshotStore, TablePerceptualMetric, TableSimulator,
    TestSession,
};
use chromaprobe_tests::{ListProfiles, ScriptedGenerator};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Store whose saves can be inspected from the test after the session owns it.
#[derive(Clone, Default)]
struct SharedStore {
    saved: Arc<Mutex<Vec<ModelSnapshot>>>,
    fail_saves: bool,
}

impl SnapshotStore for SharedStore {
    fn load(&self) -> Result<Option<ModelSnapshot>, ChromaError> {
        Ok(self.saved.lock().unwrap().last().cloned())
    }

    fn save(&mut self, snapshot: &ModelSnapshot) -> Result<(), ChromaError> {
        if self.fail_saves {
            return Err(ChromaError::Persistence("store unavailable".into()));
        }
        self.saved.lock().unwrap().push(snapshot.clone());
        Ok(())
    }
}

fn start(store: SharedStore, config: SessionConfig) -> TestSession<ScriptedGenerator, StdRng> {
    let parts = SessionParts {
        simulator: Arc::new(TableSimulator::new(0.5)),
        metric: Arc::new(TablePerceptualMetric::new(10.0)),
        generator: ScriptedGenerator::new(&["#A00000", "#B00000", "#C00000"]),
        profiles: Arc::new(ListProfiles::new(&["#A00000", "#B00000", "#C00000"])),
        rng: StdRng::seed_from_u64(17),
        store: Box::new(store),
        engine: EngineConfig::default(),
        selector: SelectorConfig::default(),
    };
    TestSession::start(CvdType::Deuteranomaly, None, parts, config).unwrap()
}

#[test]
fn snapshots_every_five_observations() {
    let store = SharedStore::default();
    let saved = Arc::clone(&store.saved);
    let mut session = start(store, SessionConfig::default());

    let mut statuses = Vec::new();
    for _ in 0..10 {
        session.next_trial().unwrap();
        statuses.push(session.record_response(Response::Same).unwrap().snapshot);
    }

    let saved_at: Vec<usize> = statuses
        .iter()
        .enumerate()
        .filter(|(_, s)| **s == SnapshotStatus::Saved)
        .map(|(i, _)| i + 1)
        .collect();
    assert_eq!(saved_at, vec![5, 10]);
    assert_eq!(saved.lock().unwrap().len(), 2);
    assert_eq!(saved.lock().unwrap()[1].history.len(), 10);
}

#[test]
fn save_failures_do_not_roll_back() {
    let store = SharedStore {
        fail_saves: true,
        ..Default::default()
    };
    let mut session = start(
        store,
        SessionConfig {
            snapshot_every: 1,
            ..Default::default()
        },
    );

    session.next_trial().unwrap();
    let outcome = session.record_response(Response::Color1).unwrap();
    assert!(matches!(outcome.snapshot, SnapshotStatus::Failed(_)));
    assert_eq!(session.model().total_observations(), 1);
    assert_eq!(session.stats().total_tests, 1);
}

#[test]
fn sessions_resume_from_the_last_snapshot() {
    let store = SharedStore::default();
    let mut first = start(store.clone(), SessionConfig::default());
    for _ in 0..3 {
        first.next_trial().unwrap();
        first.record_response(Response::Color2).unwrap();
    }
    assert_eq!(first.end(), SnapshotStatus::Saved);

    let second = start(store, SessionConfig::default());
    assert_eq!(second.model().total_observations(), 3);
    assert_eq!(second.model().export_state(), first.model().export_state());
}

#[test]
fn trials_are_stamped_and_consumed() {
    let mut session = start(SharedStore::default(), SessionConfig::default());
    let trial = session.next_trial().unwrap().clone();
    assert!(trial.started_at_ms.is_some());
    assert_eq!(session.current_trial(), Some(&trial));

    let outcome = session.record_response(Response::Same).unwrap();
    assert!(outcome.response_time_ms.is_some());
    assert!(session.current_trial().is_none());
    assert!(matches!(
        session.record_response(Response::Same),
        Err(ChromaError::InvalidTrial(_))
    ));
}

#[test]
fn mode_controls_pass_through() {
    let mut session = start(SharedStore::default(), SessionConfig::default());
    assert_eq!(session.suggested_mode(), SelectionMode::Explore);
    assert!(!session.set_mode_str("sideways"));
    session.set_mode(SelectionMode::Exploit);
    assert_eq!(session.stats().mode, SelectionMode::Exploit);
    session.set_difficulty(42);
    assert_eq!(session.difficulty(), 10);
}

#[cfg(feature = "serde")]
mod json_file_store {
    use super::*;
    use chromaprobe_core::session::JsonFileSnapshotStore;
    use chromaprobe_tests::{key, uniform_model};

    #[test]
    fn json_file_store_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileSnapshotStore::new(dir.path().join("model.json"));
        assert_eq!(store.load().unwrap(), None);

        let mut model = uniform_model(CvdType::Protanomaly, 0.4, 10.0);
        model
            .update(&key("#FF0000", "#00FF00"), Response::Same, 12.0)
            .unwrap();
        let snapshot = model.export_state();
        store.save(&snapshot).unwrap();
        assert!(store.path().exists());
        assert_eq!(store.load().unwrap(), Some(snapshot));
    }

    #[test]
    fn json_file_store_reports_corrupt_and_unreadable_files() {
        let dir = tempfile::tempdir().unwrap();
        let corrupt = dir.path().join("corrupt.json");
        std::fs::write(&corrupt, "{garbage").unwrap();
        assert!(matches!(
            JsonFileSnapshotStore::new(&corrupt).load(),
            Err(ChromaError::Serialization(_))
        ));

        // A directory exists but cannot be read as a file.
        assert!(matches!(
            JsonFileSnapshotStore::new(dir.path()).load(),
            Err(ChromaError::Persistence(_))
        ));

        let mut missing_parent = JsonFileSnapshotStore::new(dir.path().join("absent/model.json"));
        let snapshot = uniform_model(CvdType::Normal, 0.1, 10.0).export_state();
        assert!(matches!(
            missing_parent.save(&snapshot),
            Err(ChromaError::Persistence(_))
        ));
    }

    #[test]
    fn sessions_resume_from_a_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let file_parts = |path: &std::path::Path| SessionParts {
            simulator: Arc::new(TableSimulator::new(0.5)),
            metric: Arc::new(TablePerceptualMetric::new(10.0)),
            generator: ScriptedGenerator::new(&["#FF0000", "#00FF00"]),
            profiles: Arc::new(ListProfiles::new(&["#FF0000", "#00FF00"])),
            rng: StdRng::seed_from_u64(3),
            store: Box::new(JsonFileSnapshotStore::new(path)),
            engine: EngineConfig::default(),
            selector: SelectorConfig::default(),
        };

        let mut first =
            TestSession::start(CvdType::Deuteranopia, None, file_parts(&path), SessionConfig::default())
                .unwrap();
        assert_eq!(first.model().total_observations(), 0);
        for _ in 0..2 {
            first.next_trial().unwrap();
            first.record_response(Response::Same).unwrap();
        }
        assert_eq!(first.end(), SnapshotStatus::Saved);

        let second =
            TestSession::start(CvdType::Deuteranopia, None, file_parts(&path), SessionConfig::default())
                .unwrap();
        assert_eq!(second.model().export_state(), first.model().export_state());
    }
}

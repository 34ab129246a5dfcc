//! Integration tests for model export/import.

use chromaprobe_core::engine::trial::Response;
use chromaprobe_core::CvdType;
use chromaprobe_tests::{key, uniform_model};

#[test]
fn export_import_round_trip_preserves_metrics() {
    let mut original = uniform_model(CvdType::Protanomaly, 0.3, 10.0);
    let pairs = [
        key("#FF0000", "#8B0000"),
        key("#FF8C00", "#A52A2A"),
        key("#C71585", "#0000FF"),
    ];
    for (i, pair) in pairs.iter().enumerate() {
        for j in 0..=i {
            let r = if j % 2 == 0 { Response::Same } else { Response::Color1 };
            original.update(pair, r, 5.0 + 10.0 * j as f64).unwrap();
        }
    }

    let mut restored = uniform_model(CvdType::Normal, 0.9, 10.0);
    restored.import_state(original.export_state()).unwrap();

    assert_eq!(restored.cvd_type(), CvdType::Protanomaly);
    assert_eq!(restored.history(), original.history());
    for pair in &pairs {
        assert_eq!(
            restored.confusion_probability(pair),
            original.confusion_probability(pair)
        );
        assert_eq!(restored.uncertainty(pair), original.uncertainty(pair));
    }
}

#[cfg(feature = "serde")]
mod serde_tests {
    use chromaprobe_core::engine::snapshot::{load_snapshot_json, save_snapshot_json};
    use chromaprobe_core::engine::trial::Response;
    use chromaprobe_core::{ChromaError, CvdType};
    use chromaprobe_tests::{key, uniform_model};

    #[test]
    fn json_round_trip_through_a_fresh_model() {
        let mut model = uniform_model(CvdType::Tritanomaly, 0.6, 10.0);
        let pair = key("#0000FF", "#008080");
        model.update(&pair, Response::Same, 3.0).unwrap();
        model.update(&pair, Response::Color2, 25.0).unwrap();

        let json = save_snapshot_json(&model.export_state()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["cvdType"], "tritanomaly");
        assert_eq!(value["beliefs"][0]["key"], "#0000FF|#008080");
        assert_eq!(value["history"].as_array().map(Vec::len), Some(2));

        let mut fresh = uniform_model(CvdType::Normal, 0.1, 10.0);
        fresh.import_state(load_snapshot_json(&json).unwrap()).unwrap();
        assert_eq!(
            fresh.confusion_probability(&pair),
            model.confusion_probability(&pair)
        );
    }

    #[test]
    fn unknown_cvd_type_is_rejected() {
        let json = r#"{"cvdType": "tetrachromacy", "beliefs": [], "history": []}"#;
        assert!(matches!(
            load_snapshot_json(json),
            Err(ChromaError::Serialization(_))
        ));
    }

    #[test]
    fn non_positive_parameters_fail_import() {
        let json = r##"{"cvdType": "normal", "beliefs": [{"key": "#A|#B", "alpha": -1.0, "beta": 2.0}]}"##;
        let snapshot = load_snapshot_json(json).unwrap();
        let mut model = uniform_model(CvdType::Normal, 0.1, 10.0);
        assert!(model.import_state(snapshot).is_err());
        assert_eq!(model.belief_count(), 0);
    }
}

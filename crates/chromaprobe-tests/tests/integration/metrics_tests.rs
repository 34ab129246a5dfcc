//! Integration tests for derived metrics and severity estimation.

use chromaprobe_core::engine::trial::Response;
use chromaprobe_core::selection::SelectorStats;
use chromaprobe_core::{CvdType, SelectionMode, SeverityEstimate};
use chromaprobe_tests::{assert_close, color, key, uniform_model};

const GRAYS: [&str; 6] = [
    "#000000", "#404040", "#808080", "#C0C0C0", "#FFFFFF", "#1A1A1A",
];

fn observe(model: &mut chromaprobe_core::BeliefModel, a: &str, b: &str, r: Response, n: usize) {
    let pair = key(a, b);
    for _ in 0..n {
        model.update(&pair, r, 10.0).unwrap();
    }
}

#[test]
fn empty_model_stats() {
    let model = uniform_model(CvdType::Normal, 0.1, 10.0);
    let stats = SelectorStats::collect(&model, SelectionMode::Explore);
    assert_eq!(stats.total_tests, 0);
    assert_eq!(stats.unique_colors_tested, 0);
    assert_eq!(stats.confirmed_confusions, 0);
    assert_eq!(stats.average_uncertainty, 1.0);
    assert_eq!(stats.mode, SelectionMode::Explore);
}

#[test]
fn stats_count_colors_pairs_and_confusions() {
    let mut model = uniform_model(CvdType::Deuteranomaly, 0.5, 10.0);
    observe(&mut model, "#FF0000", "#00FF00", Response::Same, 4);
    observe(&mut model, "#FF0000", "#808000", Response::Color2, 2);

    let stats = SelectorStats::collect(&model, SelectionMode::Balanced);
    assert_eq!(stats.total_tests, 6);
    assert_eq!(stats.unique_pairs_tested, 2);
    assert_eq!(stats.unique_colors_tested, 3);
    assert_eq!(stats.confirmed_confusions, 1);
    assert!(stats.average_uncertainty < 1.0);
}

#[test]
fn confused_pairs_and_hotspots_agree() {
    let mut model = uniform_model(CvdType::Protanopia, 0.5, 10.0);
    observe(&mut model, "#FF0000", "#8B0000", Response::Same, 5);
    observe(&mut model, "#006400", "#228B22", Response::Color1, 5);

    let confused = model.confused_pairs(0.7);
    assert_eq!(confused.len(), 1);
    assert_eq!(confused[0].pair, key("#FF0000", "#8B0000"));
    assert_eq!(
        model.confusion_hotspots(0.7, 3.0),
        vec![color("#8B0000"), color("#FF0000")]
    );
    assert!(model.are_colors_confusable(&key("#8B0000", "#FF0000"), 0.7));
}

#[test]
fn severity_in_unit_interval_with_qualifying_pairs() {
    let mut model = uniform_model(CvdType::Deuteranopia, 0.4, 10.0);
    for (i, r) in [Response::Same, Response::Color1, Response::Color2, Response::Same, Response::Same]
        .into_iter()
        .enumerate()
    {
        observe(&mut model, "#FF0000", &format!("#00FF0{}", i), r, 10);
    }
    match model.estimate_severity() {
        SeverityEstimate::Estimated {
            severity,
            qualifying_pairs,
        } => {
            assert!((0.0..=1.0).contains(&severity));
            assert_eq!(qualifying_pairs, 5);
        }
        other => panic!("expected an estimate, got {:?}", other),
    }
}

#[test]
fn achromatopsia_matching_simulation_stays_near_base() {
    // Coarse simulation: every gray pair is predicted highly confusable.
    let mut model = uniform_model(CvdType::Achromatopsia, 0.9, 10.0);
    for pair in GRAYS.windows(2) {
        observe(&mut model, pair[0], pair[1], Response::Same, 10);
    }
    // Each pair: Beta(1.2, 12.8) → confusion 12.8/14, deviation 1/70.
    let estimate = model.estimate_severity();
    assert_close(
        estimate.value().unwrap(),
        0.6 + 2.0 / 70.0,
        1e-12,
        "achromatopsia severity",
    );
}

#[test]
fn achromatopsia_discriminating_user_saturates_at_zero() {
    let mut model = uniform_model(CvdType::Achromatopsia, 0.9, 10.0);
    for pair in GRAYS.windows(2) {
        observe(&mut model, pair[0], pair[1], Response::Color1, 10);
    }
    // Each pair: Beta(11.2, 2.8) → confusion 0.2, deviation −0.7.
    assert_eq!(
        model.estimate_severity(),
        SeverityEstimate::Estimated {
            severity: 0.0,
            qualifying_pairs: 5
        }
    );
}

#[test]
fn suggestions_for_fresh_model_are_the_pool_prefix() {
    let model = uniform_model(CvdType::Tritanopia, 0.5, 10.0);
    let pool = chromaprobe_tests::colors(&["#0000FF", "#FFFF00", "#00FFFF"]);
    assert_eq!(model.suggest_next_colors(&pool, 2), pool[..2].to_vec());
}

#[test]
fn queries_on_untested_pairs_leave_the_store_untouched() {
    let mut model = uniform_model(CvdType::Deuteranopia, 0.5, 10.0);
    let queried = key("#FF0000", "#00FF00");
    let _ = model.confusion_probability(&queried);
    let _ = model.uncertainty(&queried);
    let _ = model.information_gain(&queried);
    let _ = model.are_colors_confusable(&queried, 0.7);
    assert!(model.tested_pairs().is_empty());
    assert_eq!(model.belief_count(), 0);

    let tested = key("#808080", "#A0A0A0");
    model.update(&tested, Response::Same, 10.0).unwrap();
    let _ = model.information_gain(&queried);
    let pairs: Vec<_> = model.tested_pairs().into_iter().map(|p| p.pair).collect();
    assert_eq!(pairs, vec![tested]);
    assert_eq!(
        SelectorStats::collect(&model, SelectionMode::Balanced).unique_pairs_tested,
        1
    );
}

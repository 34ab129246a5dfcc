//! Integration tests for adaptive trial selection.

use std::sync::Arc;

use chromaprobe_core::engine::trial::Response;
use chromaprobe_core::{AdaptiveSelector, CvdType, SelectionMode, SelectorConfig};
use chromaprobe_tests::{color, key, uniform_model, ListProfiles, ScriptedGenerator};
use rand::rngs::StdRng;
use rand::SeedableRng;

const RING: [&str; 12] = [
    "#A00000", "#B00000", "#C00000", "#D00000", "#E00000", "#F00000", "#0A0000", "#0B0000",
    "#0C0000", "#0D0000", "#0E0000", "#0F0000",
];

fn selector(
    priority: &[&str],
    seed: u64,
) -> (
    AdaptiveSelector<ScriptedGenerator, StdRng>,
    Arc<std::sync::Mutex<Vec<chromaprobe_core::ColorId>>>,
) {
    let generator = ScriptedGenerator::new(&RING);
    let log = generator.log();
    let selector = AdaptiveSelector::with_rng(
        generator,
        Arc::new(ListProfiles::new(priority)),
        StdRng::seed_from_u64(seed),
    );
    (selector, log)
}

#[test]
fn bogus_mode_is_ignored_and_explore_uses_the_pool() {
    let model = uniform_model(CvdType::Deuteranomaly, 0.5, 10.0);
    let (mut s, log) = selector(&["#A00000", "#B00000", "#C00000"], 3);

    assert!(!s.set_mode_str("bogus"));
    assert_eq!(s.mode(), SelectionMode::Balanced);
    assert!(s.set_mode_str("explore"));

    let trial = s.select_next_trial(&model, 5).unwrap();
    // One generation, no probing: the least-tested pool member in pool order.
    assert_eq!(log.lock().unwrap().len(), 1);
    assert_eq!(trial.reference, color("#A00000"));
}

#[test]
fn exploration_reaches_hotspots_outside_priority_colors() {
    let mut model = uniform_model(CvdType::Deuteranomaly, 0.5, 10.0);
    model.update(&key("#A00000", "#B00000"), Response::Color1, 10.0).unwrap();
    model.update(&key("#A00000", "#C00000"), Response::Color1, 10.0).unwrap();
    model.update(&key("#B00000", "#D00000"), Response::Color1, 10.0).unwrap();
    let hot = key("#A00000", "#F00000");
    for _ in 0..4 {
        model.update(&hot, Response::Same, 10.0).unwrap();
    }

    let pool_owner = selector(&["#A00000", "#B00000"], 5).0;
    let pool = pool_owner.exploration_pool(&model);
    assert!(pool.contains(&color("#F00000")));

    let (mut s, _) = selector(&["#A00000", "#B00000"], 5);
    s.set_mode(SelectionMode::Explore);
    let trial = s.select_next_trial(&model, 5).unwrap();
    assert_eq!(trial.reference, color("#F00000"));
}

#[test]
fn exploration_pool_is_deduplicated() {
    let mut model = uniform_model(CvdType::Deuteranomaly, 0.5, 10.0);
    for _ in 0..4 {
        model.update(&key("#A00000", "#B00000"), Response::Same, 10.0).unwrap();
    }
    let (s, _) = selector(&["#A00000", "#B00000", "#C00000"], 1);
    let pool = s.exploration_pool(&model);
    assert_eq!(
        pool,
        vec![color("#A00000"), color("#B00000"), color("#C00000")]
    );
}

#[test]
fn exploitation_probes_then_regenerates_the_winner() {
    let model = uniform_model(CvdType::Deuteranomaly, 0.5, 10.0);
    let (mut s, log) = selector(&RING, 11);
    s.set_mode(SelectionMode::Exploit);

    let trial = s.select_next_trial(&model, 5).unwrap();
    let requested = log.lock().unwrap().clone();
    // Ten probes plus the final generation.
    assert_eq!(requested.len(), 11);
    assert_eq!(requested.last(), Some(&trial.reference));
    assert!(requested[..10].contains(&trial.reference));
}

#[test]
fn exploitation_sample_is_capped_by_priority_list() {
    let model = uniform_model(CvdType::Deuteranomaly, 0.5, 10.0);
    let (mut s, log) = selector(&["#A00000", "#B00000", "#C00000"], 2);
    s.select_exploitation(&model, 5).unwrap();
    assert_eq!(log.lock().unwrap().len(), 4);
}

#[test]
fn seeded_selectors_are_reproducible() {
    let model = uniform_model(CvdType::Deuteranomaly, 0.5, 10.0);
    let run = |seed| {
        let (mut s, log) = selector(&RING, seed);
        for _ in 0..5 {
            s.select_next_trial(&model, 5).unwrap();
        }
        let requested = log.lock().unwrap().clone();
        requested
    };
    assert_eq!(run(42), run(42));
}

#[test]
fn balanced_ratio_extremes_route_deterministically() {
    let model = uniform_model(CvdType::Deuteranomaly, 0.5, 10.0);

    let (s, log) = selector(&RING, 9);
    let mut always_exploit = s
        .with_config(SelectorConfig {
            balanced_exploit_ratio: 1.0,
            ..Default::default()
        })
        .unwrap();
    always_exploit.select_next_trial(&model, 5).unwrap();
    assert_eq!(log.lock().unwrap().len(), 11);

    let (s, log) = selector(&RING, 9);
    let mut always_explore = s
        .with_config(SelectorConfig {
            balanced_exploit_ratio: 0.0,
            ..Default::default()
        })
        .unwrap();
    always_explore.select_next_trial(&model, 5).unwrap();
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[test]
fn suggested_mode_follows_progress() {
    let (s, _) = selector(&["#A00000", "#B00000", "#C00000", "#D00000", "#E00000"], 1);

    // Fewer than 20 observations.
    let mut model = uniform_model(CvdType::Deuteranomaly, 0.5, 10.0);
    assert_eq!(s.suggest_mode(&model), SelectionMode::Explore);

    // 20 mixed observations on one pair keep uncertainty high.
    let pair = key("#A00000", "#B00000");
    for i in 0..20 {
        let r = if i % 2 == 0 { Response::Same } else { Response::Color1 };
        model.update(&pair, r, 10.0).unwrap();
    }
    assert_eq!(s.suggest_mode(&model), SelectionMode::Exploit);

    // Settled beliefs on 2 of 5 priority colors → low coverage.
    let mut model = uniform_model(CvdType::Deuteranomaly, 0.5, 10.0);
    for _ in 0..20 {
        model.update(&pair, Response::Color1, 10.0).unwrap();
    }
    assert_eq!(s.suggest_mode(&model), SelectionMode::Explore);

    // Settled beliefs covering 4 of 5 colors → balanced.
    let other = key("#C00000", "#D00000");
    for _ in 0..20 {
        model.update(&other, Response::Color1, 10.0).unwrap();
    }
    assert_eq!(s.suggest_mode(&model), SelectionMode::Balanced);
}

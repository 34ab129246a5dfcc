//! Chromaprobe CLI - inspect a persisted color-discrimination belief model
//!
//! Usage:
//!   chromaprobe <snapshot.json>                      # Summary report
//!   chromaprobe <snapshot.json> -o json              # Report as JSON
//!   chromaprobe <snapshot.json> --simulation sim.json  # Use a simulation table for priors/severity

use std::process;
use std::sync::Arc;

use chromaprobe_core::engine::snapshot::load_snapshot_json;
use chromaprobe_core::metrics::TestedPair;
use chromaprobe_core::profiles::testing_profile;
use chromaprobe_core::selection::{suggest_mode_for, SelectorStats};
use chromaprobe_core::{
    BeliefModel, BuiltinProfiles, ColorId, EngineConfig, ProfileProvider, SelectionMode,
    SelectorConfig, SeverityEstimate, TablePerceptualMetric, TableSimulator,
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chromaprobe")]
#[command(version)]
#[command(about = "Chromaprobe - inspect color-discrimination belief models")]
#[command(long_about = "Load an exported belief model and report confusions, hotspots, and severity")]
struct Cli {
    /// Exported model snapshot (JSON)
    #[arg(value_name = "SNAPSHOT")]
    file: String,

    /// Output format: summary, json, or debug
    #[arg(short, long, default_value = "summary", value_name = "FORMAT")]
    output: String,

    /// Confusion probability at or above which a pair counts as confused
    #[arg(short, long, value_name = "F")]
    threshold: Option<f64>,

    /// Observations a pair needs before its colors can be hotspots
    #[arg(short, long, value_name = "N")]
    min_observations: Option<f64>,

    /// Simulated confusion table (JSON) used for priors and severity
    #[arg(short, long, value_name = "FILE")]
    simulation: Option<String>,
}

struct Report {
    model: BeliefModel,
    stats: SelectorStats,
    tested: Vec<TestedPair>,
    confused: Vec<TestedPair>,
    hotspots: Vec<ColorId>,
    severity: SeverityEstimate,
    suggested_mode: SelectionMode,
    threshold: f64,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let report = match build_report(&cli) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    match cli.output.as_str() {
        "json" => match serde_json::to_string_pretty(&report_json(&report)) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing to JSON: {}", e);
                process::exit(1);
            }
        },
        "debug" => {
            println!("{:#?}", report.model);
            println!("{:#?}", report.stats);
            println!("{:#?}", report.tested);
            println!("{:#?}", report.confused);
            println!("{:#?}", report.severity);
        }
        _ => print_summary(&cli.file, &report),
    }
}

/// Logs go to stderr; filter with `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_report(cli: &Cli) -> Result<Report, String> {
    let source = std::fs::read_to_string(&cli.file)
        .map_err(|e| format!("Error reading file '{}': {}", cli.file, e))?;
    let snapshot = load_snapshot_json(&source).map_err(|e| format!("Snapshot error: {}", e))?;

    let simulator = match &cli.simulation {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| format!("Error reading simulation '{}': {}", path, e))?;
            serde_json::from_str::<TableSimulator>(&raw)
                .map_err(|e| format!("Simulation table error: {}", e))?
        }
        None => TableSimulator::new(0.5),
    };

    let mut config = EngineConfig::default();
    if let Some(t) = cli.threshold {
        config.confusion_threshold = t;
    }
    if let Some(n) = cli.min_observations {
        config.hotspot_min_observations = n;
    }

    let mut model = BeliefModel::with_config(
        snapshot.cvd_type,
        config,
        Arc::new(simulator),
        Arc::new(TablePerceptualMetric::new(0.0)),
    )
    .map_err(|e| format!("Invalid options: {}", e))?;
    model
        .import_state(snapshot)
        .map_err(|e| format!("Snapshot error: {}", e))?;

    tracing::info!(
        cvd_type = %model.cvd_type(),
        beliefs = model.belief_count(),
        history = model.total_observations(),
        "loaded snapshot"
    );

    let cfg = *model.config();
    let priority = BuiltinProfiles.priority_colors(model.cvd_type());
    let stats = SelectorStats::collect(&model, SelectionMode::default());
    let tested = model.tested_pairs();
    let confused = model.confused_pairs(cfg.confusion_threshold);
    let hotspots = model.confusion_hotspots(cfg.confusion_threshold, cfg.hotspot_min_observations);
    let severity = model.estimate_severity();
    let suggested_mode = suggest_mode_for(&model, &priority, &SelectorConfig::default());

    Ok(Report {
        model,
        stats,
        tested,
        confused,
        hotspots,
        severity,
        suggested_mode,
        threshold: cfg.confusion_threshold,
    })
}

fn print_summary(file: &str, report: &Report) {
    let model = &report.model;
    let profile = testing_profile(model.cvd_type());
    println!("✓ Loaded '{}'\n", file);
    println!("CVD type: {} ({})", model.cvd_type().label(), profile.description);
    println!(
        "Observations: {} over {} pairs, {} colors",
        report.stats.total_tests, report.stats.unique_pairs_tested, report.stats.unique_colors_tested
    );
    println!("Average uncertainty: {:.3} bits", report.stats.average_uncertainty);

    match report.severity {
        SeverityEstimate::Unavailable {
            history_len,
            required,
        } => println!(
            "Severity: unavailable ({} of {} observations)",
            history_len, required
        ),
        SeverityEstimate::Estimated {
            severity,
            qualifying_pairs,
        } => println!(
            "Severity: {:.2} (from {} pairs)",
            severity, qualifying_pairs
        ),
    }
    println!("Suggested mode: {}", report.suggested_mode);

    if !report.confused.is_empty() {
        println!(
            "\nConfused pairs (≥ {:.2}): {}",
            report.threshold,
            report.confused.len()
        );
        for p in &report.confused {
            println!(
                "  {}  confusion={:.3} uncertainty={:.3} n={:.1}",
                p.pair, p.confusion_probability, p.uncertainty, p.observations
            );
        }
    }

    if !report.hotspots.is_empty() {
        println!("\nHotspots ({}):", report.hotspots.len());
        for c in &report.hotspots {
            println!("  - {}", c);
        }
    }
}

fn report_json(report: &Report) -> serde_json::Value {
    use serde_json::json;
    json!({
        "cvdType": report.model.cvd_type(),
        "stats": report.stats,
        "testedPairs": report.tested,
        "confusedPairs": report.confused,
        "hotspots": report.hotspots,
        "severity": report.severity,
        "suggestedMode": report.suggested_mode,
        "threshold": report.threshold,
    })
}

//! recommend: one speed-limit sweep from the command line.
//!
//! ```text
//! recommend <network.net.xml> <fixes.csv|fixes.json> [config.json]
//! ```
//!
//! Loads the SUMO network and the position fixes, simulates every candidate
//! speed limit in its own SUMO process, and prints the recommendation as
//! `{"recommendedSpeed":"35 km/h"}` on stdout.  Progress goes to stderr via
//! `tracing`; set `RUST_LOG=debug` for per-run detail.

mod config;


use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use vsl_core::GeoFix;
use vsl_network::load_net_xml;
use vsl_oracle::{LeaseAllocator, SumoOracle};
use vsl_sweep::{load_fixes_csv, load_fixes_json, log_summary, write_report_csv, SweepOptimizer};

use config::AppConfig;

const USAGE: &str = "usage: recommend <network.net.xml> <fixes.csv|fixes.json> [config.json]";

fn load_fixes(path: &Path) -> Result<Vec<GeoFix>> {
    let fixes = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => load_fixes_json(path),
        Some("csv") => load_fixes_csv(path),
        _ => bail!("cannot tell the format of {} (expected .csv or .json)", path.display()),
    };
    fixes.with_context(|| format!("loading fixes from {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (net_path, fixes_path, config_path) = match args.as_slice() {
        [net, fixes] => (PathBuf::from(net), PathBuf::from(fixes), None),
        [net, fixes, config] => (PathBuf::from(net), PathBuf::from(fixes), Some(PathBuf::from(config))),
        _ => bail!(USAGE),
    };

    let config = match &config_path {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    // ── Load inputs ───────────────────────────────────────────────────────────
    let t0 = Instant::now();
    let network = load_net_xml(&net_path)
        .with_context(|| format!("loading network {}", net_path.display()))?;
    info!(
        edges = network.edge_count(),
        nodes = network.node_count(),
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "network loaded"
    );

    let fixes = load_fixes(&fixes_path)?;
    info!(fixes = fixes.len(), "fixes loaded");

    // ── Sweep ─────────────────────────────────────────────────────────────────
    let leases = LeaseAllocator::new(&config.sumo.work_dir, config.sumo.keep_artifacts)
        .with_context(|| format!("preparing work dir {}", config.sumo.work_dir.display()))?;
    let oracle = SumoOracle::new(&network, config.sumo.clone());
    let optimizer = SweepOptimizer::new(&network, oracle, leases, config.sweep.clone())?;

    let t1 = Instant::now();
    let rec = optimizer.optimize(&fixes)?;
    info!(elapsed_s = t1.elapsed().as_secs_f64(), "sweep finished");
    log_summary(&rec);

    if let Some(path) = &config.report_csv {
        write_report_csv(path, &rec).with_context(|| format!("writing report {}", path.display()))?;
        info!(path = %path.display(), "report written");
    }

    println!("{}", serde_json::to_string(&rec.payload())?);
    Ok(())
}

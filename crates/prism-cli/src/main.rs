//! PRISM Diversity CLI entry point.
//!
//! `dist` compares SMILES collections and prints the reduced distances as
//! JSON; `report` turns a compound table into distance tables, 2-D
//! projections and a dendrogram-ordered Tanimoto matrix.

mod config;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use config::DiversityConfig;
use prism_chem::NativeToolkit;
use prism_core::{
    CalcMode, DistanceKind, FeatureType, LogObserver, Metric, PrismError, VectorMetric,
    DEFAULT_FINGERPRINT_RADIUS,
};
use prism_diversity::{
    load_compounds, run_diversity_report, summarize_computed, ClassicalMds, DistanceEngine,
    ReportOptions, Summary,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// PRISM version from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
#[command(name = "prism-cli")]
#[command(version = VERSION)]
#[command(about = "PRISM: molecular distance engine and diversity report", long_about = None)]
struct Cli {
    /// Config TOML file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Distances within one SMILES file or between two, reduced per --mode
    Dist(DistArgs),
    /// Diversity report over a compound CSV
    Report(ReportArgs),
}

#[derive(Args, Debug)]
struct DistArgs {
    /// SMILES file, one structure per line (first token used)
    #[arg(short, long)]
    input: PathBuf,

    /// Second SMILES file to compare against
    #[arg(long, conflicts_with = "query")]
    against: Option<PathBuf>,

    /// Single SMILES to compare against
    #[arg(long)]
    query: Option<String>,

    /// Feature type: ecfp, descriptors, moe
    #[arg(long, default_value = "ecfp")]
    feature: String,

    /// Metric: tanimoto, mcs, or a vector metric (euclidean, cosine, ...)
    #[arg(long, default_value = "tanimoto")]
    metric: String,

    /// Order p of the minkowski metric
    #[arg(long)]
    minkowski_p: Option<f64>,

    /// Reduction: nearest, farthest, average, all
    #[arg(long)]
    mode: Option<String>,

    /// Neighbors kept per row
    #[arg(short)]
    k: Option<usize>,

    /// Morgan fingerprint radius
    #[arg(long)]
    radius: Option<u32>,

    /// Write JSON here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ReportArgs {
    /// Compound CSV with a header row
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// File name for the Tanimoto projection
    #[arg(long)]
    projection_file: Option<PathBuf>,

    #[arg(long)]
    id_col: Option<String>,

    #[arg(long)]
    smiles_col: Option<String>,

    /// Response column carried into the projection files
    #[arg(long)]
    response_col: Option<String>,

    /// Morgan fingerprint radius
    #[arg(long)]
    radius: Option<u32>,

    /// Skip the MCS matrix above this many compounds
    #[arg(long)]
    max_for_mcs: Option<usize>,

    /// SMILES are parent structures; do not strip salts
    #[arg(long)]
    base_smiles: bool,
}

/// JSON document written by `dist`.
#[derive(Debug, Serialize)]
struct DistOutput {
    kind: String,
    within_dataset: bool,
    mode: CalcMode,
    k: usize,
    rows: usize,
    cols: usize,
    result: Summary,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env().filter_level(level).init();

    log::debug!("PRISM {} - Starting", VERSION);

    let config = match &cli.config {
        Some(path) => DiversityConfig::from_file(path)?,
        None => DiversityConfig::default(),
    };

    let outcome = match cli.command {
        Commands::Dist(args) => run_dist(config, args),
        Commands::Report(args) => run_report(config, args),
    };

    if let Err(err) = &outcome {
        if let Some(prism) = err.downcast_ref::<PrismError>() {
            log::error!("{}", prism.user_message());
        }
    }
    outcome
}

fn run_dist(mut config: DiversityConfig, args: DistArgs) -> Result<()> {
    if let Some(mode) = &args.mode {
        config.summary.mode = mode.parse()?;
    }
    if let Some(k) = args.k {
        config.summary.k = k;
    }
    if args.radius.is_some() {
        config.fingerprint.radius = args.radius;
    }
    config.validate()?;

    let feature: FeatureType = args.feature.parse()?;
    let metric = resolve_metric(&args.metric, args.minkowski_p)?;
    let kind = DistanceKind::resolve(feature, metric)?;

    let a = read_smiles_file(&args.input)?;
    let b = match (&args.against, &args.query) {
        (Some(path), _) => Some(read_smiles_file(path)?),
        (None, Some(smiles)) => Some(vec![smiles.clone()]),
        (None, None) => None,
    };

    let toolkit = NativeToolkit::new().with_mcs_node_budget(config.mcs.node_budget);
    let observer = LogObserver;
    let radius = config.fingerprint.radius.unwrap_or(DEFAULT_FINGERPRINT_RADIUS);
    let engine =
        DistanceEngine::new(&toolkit, &observer).with_fingerprint(radius, config.fingerprint.nbits);

    log::info!(
        "Computing {} distances for {} structures{}",
        kind,
        a.len(),
        b.as_ref()
            .map(|b| format!(" against {}", b.len()))
            .unwrap_or_default()
    );
    let computed = engine.compute(kind, a.as_slice(), b.as_deref())?;
    let result = summarize_computed(&computed, config.summary.mode, config.summary.k)?;

    let document = DistOutput {
        kind: kind.to_string(),
        within_dataset: computed.within_dataset,
        mode: config.summary.mode,
        k: config.summary.k,
        rows: computed.distances.rows(),
        cols: computed.distances.cols(),
        result,
    };
    let json = serde_json::to_string_pretty(&document)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Distances written to: {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn run_report(mut config: DiversityConfig, args: ReportArgs) -> Result<()> {
    if args.out_dir.is_some() {
        config.output.out_dir = args.out_dir;
    }
    if args.projection_file.is_some() {
        config.output.projection_file = args.projection_file;
    }
    if let Some(id) = args.id_col {
        config.columns.id = id;
    }
    if let Some(smiles) = args.smiles_col {
        config.columns.smiles = smiles;
    }
    if args.response_col.is_some() {
        config.columns.response = args.response_col;
    }
    if args.radius.is_some() {
        config.fingerprint.radius = args.radius;
    }
    if let Some(max) = args.max_for_mcs {
        config.mcs.max_for_mcs = max;
    }
    if args.base_smiles {
        config.structures.is_base_smiles = true;
    }
    config.validate()?;

    let input = args.input.as_path();

    let records = load_compounds(input, &config.columns)
        .with_context(|| format!("Failed to load compounds from {}", input.display()))?;
    log::info!("Loaded {} compounds from {}", records.len(), input.display());

    let mut options = ReportOptions::for_input(input);
    if let Some(radius) = config.fingerprint.radius {
        options.radius = radius;
    }
    options.nbits = config.fingerprint.nbits;
    options.max_for_mcs = config.mcs.max_for_mcs;
    if let Some(dir) = config.output.out_dir {
        options.out_dir = dir;
    }
    options.projection_file = config.output.projection_file;
    options.is_base_smiles = config.structures.is_base_smiles;

    let toolkit = NativeToolkit::new().with_mcs_node_budget(config.mcs.node_budget);
    let report = run_diversity_report(&toolkit, &LogObserver, &ClassicalMds, records, &options)?;

    log::info!(
        "Report complete: {} compounds, {} files",
        report.compound_ids.len(),
        report.written.len()
    );
    Ok(())
}

/// Parses `--metric`, applying `--minkowski-p` which only minkowski accepts.
fn resolve_metric(name: &str, minkowski_p: Option<f64>) -> Result<Metric> {
    let metric: Metric = name.parse()?;
    match (metric, minkowski_p) {
        (_, None) => Ok(metric),
        (Metric::Vector(m @ VectorMetric::Minkowski { .. }), Some(p)) => {
            Ok(Metric::Vector(m.with_minkowski_p(p)))
        }
        (other, Some(_)) => anyhow::bail!(
            "--minkowski-p only applies to the minkowski metric, not '{}'",
            other
        ),
    }
}

/// Reads one SMILES per line, keeping the first whitespace-separated token.
/// Blank lines and `#` comments are skipped.
fn read_smiles_file(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read SMILES file {}", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn smiles_file_skips_comments_and_names() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("set.smi");
        std::fs::write(&path, "# library\nCCO ethanol\n\n  c1ccccc1\tbenzene\n").unwrap();

        let smiles = read_smiles_file(&path).unwrap();
        assert_eq!(smiles, vec!["CCO", "c1ccccc1"]);
    }

    #[test]
    fn minkowski_order_only_for_minkowski() {
        assert!(matches!(
            resolve_metric("minkowski", Some(3.0)).unwrap(),
            Metric::Vector(VectorMetric::Minkowski { .. })
        ));
        assert!(resolve_metric("euclidean", None).is_ok());

        let err = resolve_metric("euclidean", Some(3.0)).unwrap_err();
        assert!(err.to_string().contains("--minkowski-p"));
        assert!(resolve_metric("tanimoto", Some(1.0)).is_err());
    }
}

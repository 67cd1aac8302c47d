#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for analysing, generating, and classifying levels.

mod config;

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    process::ExitCode,
    time::Duration,
};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info};
use roboyard_core::Level;
use roboyard_system_analysis::{AnalysisReport, Analyzer};
use roboyard_system_classification::{
    run_campaign, CampaignConfig, DirectorySink, ExternalSolver,
};
use roboyard_system_generation::LevelGenerator;
use serde::Serialize;

use crate::config::Settings;

/// Roboyard level tooling.
#[derive(Debug, Parser)]
#[command(name = "roboyard", version)]
struct Cli {
    /// TOML settings file; command-line flags take precedence.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Report unreachable regions and trapped robots as JSON.
    Analyze {
        /// Level artifacts to analyse.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print freshly generated level artifacts.
    Generate {
        /// Board width in cells.
        #[arg(long)]
        width: Option<u32>,
        /// Board height in cells.
        #[arg(long)]
        height: Option<u32>,
        /// Base seed; a random one is logged when omitted.
        #[arg(long)]
        seed: Option<u64>,
        /// Number of levels to print.
        #[arg(long, default_value_t = 1)]
        count: u64,
    },
    /// Generate and classify levels until every tier quota is full.
    Campaign {
        /// Solver command line; receives the artifact on stdin.
        #[arg(long)]
        solver: Option<String>,
        /// Directory receiving `<tier>/generatedMap_<n>.txt` files.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Levels wanted per tier.
        #[arg(long)]
        quota: Option<usize>,
        /// Worker threads.
        #[arg(long)]
        workers: Option<usize>,
        /// Seconds a solver may run per level.
        #[arg(long)]
        timeout_secs: Option<u64>,
        /// Base seed for candidate generation.
        #[arg(long)]
        seed: Option<u64>,
        /// Stop after this many candidates.
        #[arg(long)]
        max_candidates: Option<u64>,
    },
}

/// One `analyze` result, keyed by the file it came from.
#[derive(Debug, Serialize)]
struct FileReport<'a> {
    file: &'a Path,
    #[serde(flatten)]
    report: AnalysisReport,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Command::Analyze { files } => analyze(&settings, &files),
        Command::Generate {
            width,
            height,
            seed,
            count,
        } => generate(&settings, width, height, seed, count),
        Command::Campaign {
            solver,
            output,
            quota,
            workers,
            timeout_secs,
            seed,
            max_candidates,
        } => {
            let overrides = CampaignOverrides {
                solver,
                output,
                quota,
                workers,
                timeout_secs,
                seed,
                max_candidates,
            };
            campaign(&settings, overrides)
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn analyze(settings: &Settings, files: &[PathBuf]) -> Result<ExitCode> {
    let analyzer = Analyzer::new(settings.analysis);
    let mut reports = Vec::with_capacity(files.len());
    let mut failures = 0usize;

    for file in files {
        match load_level(file) {
            Ok(level) => reports.push(FileReport {
                file,
                report: analyzer.analyze(&level),
            }),
            Err(err) => {
                failures += 1;
                error!("{err:#}");
            }
        }
    }

    let anomalous = reports
        .iter()
        .filter(|entry| entry.report.has_anomalies())
        .count();
    info!(
        "analysed {} files, {anomalous} with anomalies, {failures} unreadable",
        reports.len()
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, &reports).context("failed to write report")?;
    writeln!(out).context("failed to write report")?;

    Ok(if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn load_level(path: &Path) -> Result<Level> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    Level::from_artifact(&text).with_context(|| format!("failed to parse {}", path.display()))
}

fn generate(
    settings: &Settings,
    width: Option<u32>,
    height: Option<u32>,
    seed: Option<u64>,
    count: u64,
) -> Result<ExitCode> {
    let mut config = settings.generator.clone();
    config.width = width.unwrap_or(config.width);
    config.height = height.unwrap_or(config.height);
    let seed = seed.unwrap_or_else(rand::random);
    info!("generating {count} levels from seed {seed}");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for index in 0..count {
        let generated = LevelGenerator::for_candidate(config.clone(), seed, index)
            .and_then(|mut generator| generator.generate())
            .context("level generation failed")?;
        if index > 0 {
            writeln!(out).context("failed to write level")?;
        }
        writeln!(out, "{}", generated.level.to_artifact()).context("failed to write level")?;
    }
    Ok(ExitCode::SUCCESS)
}

/// `campaign` flags; each one replaces the settings file value.
struct CampaignOverrides {
    solver: Option<String>,
    output: Option<PathBuf>,
    quota: Option<usize>,
    workers: Option<usize>,
    timeout_secs: Option<u64>,
    seed: Option<u64>,
    max_candidates: Option<u64>,
}

/// Merges the settings file with the command-line flags and validates the result.
fn campaign_config(settings: &Settings, overrides: &CampaignOverrides) -> Result<CampaignConfig> {
    let mut config = settings.campaign_config();
    config.quota = overrides.quota.unwrap_or(config.quota);
    config.workers = overrides.workers.unwrap_or(config.workers);
    config.seed = overrides.seed.unwrap_or(config.seed);
    config.max_candidates = overrides.max_candidates.or(config.max_candidates);
    if config.quota == 0 {
        bail!("the campaign quota must be at least 1");
    }
    Ok(config)
}

fn campaign(settings: &Settings, overrides: CampaignOverrides) -> Result<ExitCode> {
    let config = campaign_config(settings, &overrides)?;
    let file = &settings.campaign;
    let command = overrides
        .solver
        .or_else(|| file.solver.clone())
        .ok_or_else(|| anyhow!("no solver configured; pass --solver or set campaign.solver"))?;
    let timeout = overrides
        .timeout_secs
        .or(file.timeout_secs)
        .map_or(ExternalSolver::DEFAULT_TIMEOUT, Duration::from_secs);
    let solver = ExternalSolver::from_command_line(&command)
        .ok_or_else(|| anyhow!("solver command is empty"))?
        .with_timeout(timeout);

    let output = overrides
        .output
        .or_else(|| file.output.clone())
        .unwrap_or_else(|| PathBuf::from("Maps"));
    let sink = DirectorySink::new(output);

    info!(
        "writing levels below {} using `{command}`",
        sink.root().display()
    );

    let summary = run_campaign(&config, &solver, &sink).context("campaign could not start")?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, &summary).context("failed to write summary")?;
    writeln!(out).context("failed to write summary")?;

    Ok(if summary.complete {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn campaign_flags_are_optional_overrides() {
        let cli = Cli::try_parse_from([
            "roboyard",
            "--verbose",
            "campaign",
            "--solver",
            "java Solver",
            "--quota",
            "4",
            "--max-candidates",
            "100",
        ])
        .expect("arguments parse");

        assert!(cli.verbose);
        match cli.command {
            Command::Campaign {
                solver,
                quota,
                workers,
                max_candidates,
                ..
            } => {
                assert_eq!(solver.as_deref(), Some("java Solver"));
                assert_eq!(quota, Some(4));
                assert_eq!(workers, None);
                assert_eq!(max_candidates, Some(100));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    fn overrides(quota: Option<usize>) -> CampaignOverrides {
        CampaignOverrides {
            solver: None,
            output: None,
            quota,
            workers: Some(2),
            timeout_secs: None,
            seed: None,
            max_candidates: None,
        }
    }

    #[test]
    fn flags_replace_file_values() {
        let settings = Settings::default();
        let config = campaign_config(&settings, &overrides(Some(4))).expect("valid config");
        assert_eq!(config.quota, 4);
        assert_eq!(config.workers, 2);
        assert_eq!(config.seed, 0);
    }

    #[test]
    fn zero_quota_is_rejected_from_either_source() {
        let settings = Settings::default();
        assert!(campaign_config(&settings, &overrides(Some(0))).is_err());

        let mut settings = Settings::default();
        settings.campaign.quota = Some(0);
        assert!(campaign_config(&settings, &overrides(None)).is_err());
        assert!(campaign_config(&settings, &overrides(Some(3))).is_ok());
    }

    #[test]
    fn analyze_requires_files() {
        assert!(Cli::try_parse_from(["roboyard", "analyze"]).is_err());
    }
}

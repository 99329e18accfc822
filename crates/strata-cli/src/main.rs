// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `strata`: inspect AABB recordings and run the subdomain pipeline over them.
//!
//! # Usage
//! ```text
//! strata info <csv> [--objects N]
//! strata run <csv> [--objects N] [--subdomains K] [--strategy greedy|balanced]
//!                  [--threshold T] [--config-dir DIR] [--json]
//! strata config [--config-dir DIR] [overrides...] [--save]
//! ```
//!
//! Results go to stdout; logs go to stderr (filter with `RUST_LOG`).

mod output;
mod store;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use strata_core::config::{ConfigService, PipelineConfig, CONFIG_KEY};
use strata_core::{FramePipeline, PartitionStrategy};
use strata_frames::CsvFrameSource;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::output::{JsonLinesSink, TableSink};
use crate::store::FsConfigStore;

#[derive(Parser, Debug)]
#[command(name = "strata", author, version, about = "BVH subdomain partitioning with stable identities")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Summarize a CSV recording
    Info {
        /// Path to the recording
        csv: PathBuf,
        /// Objects per frame (inferred from the first row when omitted)
        #[arg(long)]
        objects: Option<usize>,
    },
    /// Run the pipeline over every frame of a CSV recording
    Run {
        /// Path to the recording
        csv: PathBuf,
        /// Objects per frame (inferred from the first row when omitted)
        #[arg(long)]
        objects: Option<usize>,
        #[command(flatten)]
        config: ConfigArgs,
        /// Emit one JSON object per frame instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration
    Config {
        #[command(flatten)]
        config: ConfigArgs,
        /// Persist the effective configuration
        #[arg(long)]
        save: bool,
    },
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// Directory holding pipeline.json (defaults to the platform config dir)
    #[arg(long)]
    config_dir: Option<PathBuf>,
    /// Requested number of subdomains
    #[arg(long)]
    subdomains: Option<usize>,
    /// Partitioning strategy
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,
    /// Sibling overlap ratio above which the tree is rebuilt
    #[arg(long)]
    threshold: Option<f32>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyArg {
    Greedy,
    Balanced,
}

impl From<StrategyArg> for PartitionStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Greedy => Self::Greedy,
            StrategyArg::Balanced => Self::Balanced,
        }
    }
}

impl ConfigArgs {
    fn store(&self) -> Result<FsConfigStore> {
        match &self.config_dir {
            Some(dir) => Ok(FsConfigStore::at(dir)),
            None => FsConfigStore::platform().context("failed to open config store"),
        }
    }

    /// Stored config with command-line overrides applied, validated.
    fn resolve(&self, service: &ConfigService<FsConfigStore>) -> Result<PipelineConfig> {
        let mut config = service.pipeline().context("failed to load stored config")?;
        if let Some(subdomains) = self.subdomains {
            config.subdomains = subdomains;
        }
        if let Some(strategy) = self.strategy {
            config.strategy = strategy.into();
        }
        if let Some(threshold) = self.threshold {
            config.overlap_threshold = threshold;
        }
        config.validate().context("invalid pipeline config")?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    match cli.command {
        Commands::Info { csv, objects } => info_cmd(&csv, objects),
        Commands::Run {
            csv,
            objects,
            config,
            json,
        } => run_cmd(&csv, objects, &config, json),
        Commands::Config { config, save } => config_cmd(&config, save),
    }
}

fn load(csv: &Path, objects: Option<usize>) -> Result<CsvFrameSource> {
    let source = CsvFrameSource::from_path(csv, objects)
        .with_context(|| format!("failed to load recording {}", csv.display()))?;
    info!(
        path = %csv.display(),
        frames = source.len(),
        objects = source.object_count(),
        "loaded recording"
    );
    Ok(source)
}

fn info_cmd(csv: &Path, objects: Option<usize>) -> Result<()> {
    let source = load(csv, objects)?;
    let mut out = std::io::stdout().lock();
    writeln!(out, "frames: {}", source.len())?;
    writeln!(out, "objects: {}", source.object_count())?;
    match source.time_range() {
        Some((start, end)) => writeln!(out, "time: {start} .. {end}")?,
        None => writeln!(out, "time: -")?,
    }
    Ok(())
}

fn run_cmd(csv: &Path, objects: Option<usize>, args: &ConfigArgs, json: bool) -> Result<()> {
    let service = ConfigService::new(args.store()?);
    let config = args.resolve(&service)?;
    let source = load(csv, objects)?;
    let mut pipeline = FramePipeline::new(config)?;

    let processed = if json {
        let mut sink = JsonLinesSink::new(std::io::stdout().lock());
        pipeline.run(&source, &mut sink)?
    } else {
        let mut sink = TableSink::new();
        let processed = pipeline.run(&source, &mut sink)?;
        writeln!(std::io::stdout().lock(), "{}", sink.into_table())?;
        processed
    };

    info!(
        frames = processed,
        subdomains = config.subdomains,
        strategy = ?config.strategy,
        "pipeline finished"
    );
    Ok(())
}

fn config_cmd(args: &ConfigArgs, save: bool) -> Result<()> {
    let service = ConfigService::new(args.store()?);
    let config = args.resolve(&service)?;
    if save {
        service
            .save(CONFIG_KEY, &config)
            .context("failed to save config")?;
        let path = service.into_inner().path_for(CONFIG_KEY);
        info!(path = %path.display(), "saved config");
    }
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &config)?;
    writeln!(out)?;
    Ok(())
}

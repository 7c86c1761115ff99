use std::path::PathBuf;
use std::sync::Arc;

use alcove_core::utils::init_logging;
use alcove_core::{LogLevel, MemorySink, StdoutSink};
use alcove_runtime::{AttemptReport, Playground, RunnerConfig, StrategyKind};
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, warn};

/// Alcove Command Line Interface
///
/// Loads a module into an unloadable context once per resolver strategy,
/// invokes it, unloads the context and reports whether it was reclaimed.
#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one attempt per strategy (the default)
    Run(RunArgs),

    /// List the available strategies
    Strategies,

    /// Print the effective configuration as TOML
    Config(ConfigArgs),
}

#[derive(Args, Default)]
struct RunArgs {
    #[clap(flatten)]
    source: ConfigArgs,

    /// Print machine-readable reports
    #[clap(long)]
    json: bool,

    /// Fail unless every attempt has its expected outcome
    #[clap(long)]
    strict: bool,

    /// Log debug output to stderr
    #[clap(short, long)]
    verbose: bool,
}

/// Where the configuration comes from and what overrides it.
#[derive(Args, Default)]
struct ConfigArgs {
    /// Path to a TOML configuration file
    #[clap(long)]
    config: Option<PathBuf>,

    /// Sweep budget of the liveness probe
    #[clap(long)]
    retries: Option<usize>,

    /// Strategy to run; repeat to run several, in order
    #[clap(long = "strategy")]
    strategies: Vec<StrategyKind>,

    /// Ship the interface image inside the module package
    #[clap(long)]
    ship_interface: bool,
}

#[derive(Serialize)]
struct JsonAttempt {
    #[serde(flatten)]
    report: AttemptReport,
    output: Vec<String>,
}

#[derive(Serialize)]
struct JsonRun {
    attempts: Vec<JsonAttempt>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or_else(|| Commands::Run(RunArgs::default())) {
        Commands::Run(args) => run(args),
        Commands::Strategies => {
            for kind in StrategyKind::ALL {
                println!("{:<16} {}", kind, kind.description());
            }
            Ok(())
        }
        Commands::Config(args) => {
            let config = effective_config(&args)?;
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

/// Load the configuration file and apply command line overrides.
fn effective_config(args: &ConfigArgs) -> Result<RunnerConfig> {
    let mut config = RunnerConfig::load(args.config.as_deref()).with_context(|| {
        format!(
            "Failed to load configuration{}",
            args.config
                .as_ref()
                .map(|p| format!(" from {}", p.display()))
                .unwrap_or_default()
        )
    })?;

    if let Some(retries) = args.retries {
        config.max_probe_retries = retries;
    }
    if !args.strategies.is_empty() {
        config.strategies = args.strategies.clone();
    }
    if args.ship_interface {
        config.ship_interface();
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn run(args: RunArgs) -> Result<()> {
    let mut config = effective_config(&args.source)?;
    if args.verbose {
        config.logging.level = LogLevel::Debug;
    }
    init_logging(config.logging.level, config.logging.json).context("Failed to initialize logging")?;

    // Logging did not exist yet when the configuration was read.
    if let Some(path) = args.source.config.as_ref().filter(|p| !p.exists()) {
        warn!(
            "Configuration file not found: {}; using defaults",
            path.display()
        );
    }
    debug!("Effective configuration: {:?}", config);

    let reports = if args.json {
        let sink = MemorySink::new();
        let playground = Playground::new(config, Arc::new(sink.clone()))?;
        let mut attempts = Vec::new();
        let reports = playground.run_with(|report| {
            attempts.push(JsonAttempt {
                report: report.clone(),
                output: sink.drain(),
            })
        })?;
        println!("{}", serde_json::to_string_pretty(&JsonRun { attempts })?);
        reports
    } else {
        let playground = Playground::new(config, Arc::new(StdoutSink))?;
        playground.run_with(|report| println!("{}", report))?
    };

    if args.strict {
        let unexpected: Vec<String> = reports
            .iter()
            .filter(|r| !r.matches_expectation())
            .map(|r| format!("#{} ({})", r.number, r.strategy))
            .collect();
        if !unexpected.is_empty() {
            bail!("Unexpected outcome for attempts {}", unexpected.join(", "));
        }
    }

    Ok(())
}

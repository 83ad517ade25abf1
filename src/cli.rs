//! # Command-Line Interface Module
//!
//! Binds the orchestrator to configured shell-command generators.
//!
//! Two commands:
//!
//! - `apiforge generate --config apiforge.yaml` — one-shot regeneration, used
//!   from build and packaging scripts. Exits non-zero on configuration errors
//!   or when generation fails outright. When the configuration sets
//!   `reload_handler: true` this behaves like `watch`.
//! - `apiforge watch --config apiforge.yaml` — regenerate once, then keep
//!   watching the source tree until the process is terminated.

use crate::config::Config;
use crate::generators::{ClientGenerator, CommandGenerator, Generators};
use crate::orchestrator::Orchestrator;
use crate::pipeline::RunOutcome;
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Command-line interface for apiforge.
#[derive(Parser)]
#[command(name = "apiforge")]
#[command(about = "Incremental API artifact regeneration", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug-level logging
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Regenerate spec, routes, and client artifacts once
    Generate {
        /// Path to the apiforge configuration file (YAML or JSON)
        #[arg(short, long, default_value = "apiforge.yaml")]
        config: PathBuf,
    },
    /// Regenerate once, then watch the source tree and regenerate on change
    Watch {
        /// Path to the apiforge configuration file (YAML or JSON)
        #[arg(short, long, default_value = "apiforge.yaml")]
        config: PathBuf,
    },
}

/// Execute the CLI command provided by the user.
///
/// # Errors
///
/// Returns an error if the configuration file cannot be loaded, required
/// configuration is missing, generator commands are not declared, or the
/// filesystem watcher cannot be started.
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Generate { config } => {
            let (mut orchestrator, reload) = build_orchestrator(config)?;
            if reload {
                orchestrator.generate_and_watch()?.wait();
                return Ok(());
            }
            let run = orchestrator.generate()?;
            if run.outcome == RunOutcome::Failed {
                error!("generation failed; see warnings above");
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Watch { config } => {
            let (orchestrator, _) = build_orchestrator(config)?;
            orchestrator.generate_and_watch()?.wait();
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A host or test harness may already have installed a subscriber
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Load configuration and bind command-backed generators. The project root is
/// the configuration file's directory.
fn build_orchestrator(config_path: &Path) -> anyhow::Result<(Orchestrator, bool)> {
    let config = Config::load(config_path)?;
    config.validate()?;

    let root = config_path
        .canonicalize()
        .with_context(|| format!("config file {} not found", config_path.display()))?
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let spec_command = match config.spec.as_ref().and_then(|s| s.command.clone()) {
        Some(command) => command,
        None => bail!("configuration error: `spec.command` is required when running through the CLI"),
    };
    let routes_command = match config.routes.as_ref().and_then(|r| r.command.clone()) {
        Some(command) => command,
        None => {
            bail!("configuration error: `routes.command` is required when running through the CLI")
        }
    };
    let client: Option<Box<dyn ClientGenerator>> = match &config.client {
        Some(client_cfg) => match client_cfg.command() {
            Some(command) => Some(Box::new(CommandGenerator::new(command))),
            None => bail!(
                "configuration error: `client.command` is required when a client artifact is configured through the CLI"
            ),
        },
        None => None,
    };

    let generators = Generators {
        spec: Box::new(CommandGenerator::new(spec_command)),
        routes: Box::new(CommandGenerator::new(routes_command)),
        client,
    };

    let reload = config.reload_handler;
    let orchestrator = Orchestrator::new(&root, config, generators)?;
    Ok((orchestrator, reload))
}

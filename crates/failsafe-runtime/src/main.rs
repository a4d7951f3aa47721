//! # tetra-failsafe
//!
//! Operator CLI for the failsafe coordination engine.
//!
//! ```text
//! tetra-failsafe report
//! tetra-failsafe test
//! tetra-failsafe switch <COMPONENT> <ID>
//! tetra-failsafe simulate-failure <COMPONENT>
//! tetra-failsafe monitor [--interval <SECS>]
//! tetra-failsafe metrics
//! ```
//!
//! Every invocation is its own process, so `metrics` shows only what this
//! process recorded while bootstrapping.
//!
//! Exit codes: `report` exits with the overall status severity (0 online ..
//! 4 offline); the other commands exit 1 when the requested action did not
//! happen.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use failsafe_engine::ComponentType;
use failsafe_runtime::{commands, FailsafeContainer, RuntimeConfig};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "tetra-failsafe")]
#[command(about = "Failsafe coordination for security-critical components")]
#[command(version)]
struct Cli {
    /// Filesystem storage root (overrides TETRA_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the system report as JSON
    Report,

    /// Self-test every registered implementation
    Test,

    /// Switch a component to a specific implementation
    Switch {
        /// network, cryptography, storage, identity, communication, execution
        component: ComponentType,
        /// Implementation id, e.g. aes256gcm
        id: String,
    },

    /// Fail a component over to its next implementation
    SimulateFailure { component: ComponentType },

    /// Test and report periodically until Ctrl+C
    Monitor {
        /// Seconds between cycles (overrides TETRA_MONITOR_INTERVAL_SECS)
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Print Prometheus metrics recorded by this process (bootstrap only; live values come from `monitor`)
    Metrics,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            error!(error = %e, "tetra-failsafe failed");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> Result<i32> {
    let mut config = RuntimeConfig::from_env().context("Invalid configuration")?;
    if let Some(dir) = cli.data_dir {
        config.backends.data_dir = dir;
    }
    if let Command::Monitor {
        interval: Some(secs),
    } = cli.command
    {
        anyhow::ensure!(secs > 0, "--interval must be greater than zero");
        config.monitor_interval = Duration::from_secs(secs);
    }

    tetra_telemetry::init_telemetry(&config.telemetry)
        .context("Failed to initialize telemetry")?;
    info!(
        service = %config.telemetry.service_name,
        version = env!("CARGO_PKG_VERSION"),
        "Starting"
    );

    let container = FailsafeContainer::bootstrap(config)
        .await
        .context("Failed to register backends")?;

    let output = match cli.command {
        Command::Report => commands::report(&container),
        Command::Test => commands::test(&container).await,
        Command::Switch { component, id } => commands::switch(&container, component, &id).await,
        Command::SimulateFailure { component } => {
            commands::simulate_failure(&container, component).await
        }
        Command::Monitor { .. } => {
            commands::monitor(&container, async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!(error = %e, "Failed to listen for Ctrl+C");
                }
            })
            .await
        }
        Command::Metrics => commands::metrics(),
    };

    container.shutdown().await;
    let output = output?;
    println!("{}", output.body);
    Ok(output.exit_code)
}

//! IBM Q Experience command-line interface.
//!
//! Lists remote backends, inspects their status and calibration, submits
//! Qobj files, and manages stored accounts. Credentials are discovered from
//! `QE_TOKEN`/`QE_URL` first, then from the accounts file.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{account, backends, inspect, run, version};

/// ibmq - IBM Q Experience accounts, backends and jobs
#[derive(Parser)]
#[command(name = "ibmq")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Client configuration file (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Accounts file (defaults to the user config directory)
    #[arg(long, env = "IBMQ_ACCOUNTS_FILE", global = true)]
    accounts_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List backends of every enabled account
    Backends {
        /// Only simulators
        #[arg(long, conflicts_with = "devices")]
        simulator: bool,

        /// Only real devices
        #[arg(long)]
        devices: bool,

        /// Only backends currently accepting jobs
        #[arg(long)]
        operational: bool,

        /// Minimum number of qubits
        #[arg(long)]
        min_qubits: Option<u32>,
    },

    /// Show the queue status of a backend
    Status {
        /// Backend name (aliases and deprecated names accepted)
        backend: String,
    },

    /// Print a backend's configuration as JSON
    Config {
        /// Backend name
        backend: String,
    },

    /// Print a device's calibration properties
    Properties {
        /// Backend name
        backend: String,
    },

    /// Submit a Qobj file and wait for the result
    Run {
        /// Qobj JSON file
        #[arg(short, long)]
        qobj: PathBuf,

        /// Backend to run on
        #[arg(short, long, default_value = "ibmq_qasm_simulator")]
        backend: String,

        /// Override the number of shots
        #[arg(short, long)]
        shots: Option<u32>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage stored accounts
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum AccountAction {
    /// List stored and environment accounts
    Show,

    /// Store an account in the accounts file
    Save {
        /// API token
        #[arg(long, env = "QE_TOKEN", hide_env_values = true)]
        token: String,

        /// API URL
        #[arg(long, env = "QE_URL")]
        url: String,

        #[arg(long)]
        hub: Option<String>,

        #[arg(long)]
        group: Option<String>,

        #[arg(long)]
        project: Option<String>,

        /// Replace an existing entry with the same hub/group/project
        #[arg(long)]
        overwrite: bool,
    },

    /// Remove an account from the accounts file
    Remove {
        #[arg(long)]
        hub: Option<String>,

        #[arg(long)]
        group: Option<String>,

        #[arg(long)]
        project: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    let ctx = commands::common::Context {
        config_file: cli.config,
        accounts_file: cli.accounts_file,
    };

    let result = match cli.command {
        Commands::Backends {
            simulator,
            devices,
            operational,
            min_qubits,
        } => {
            let kind = match (simulator, devices) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            backends::execute(&ctx, kind, operational, min_qubits).await
        }

        Commands::Status { backend } => inspect::execute_status(&ctx, &backend).await,

        Commands::Config { backend } => inspect::execute_config(&ctx, &backend).await,

        Commands::Properties { backend } => inspect::execute_properties(&ctx, &backend).await,

        Commands::Run {
            qobj,
            backend,
            shots,
            json,
        } => run::execute(&ctx, &qobj, &backend, shots, json).await,

        Commands::Account { action } => match action {
            AccountAction::Show => account::execute_show(&ctx),
            AccountAction::Save {
                token,
                url,
                hub,
                group,
                project,
                overwrite,
            } => account::execute_save(&ctx, token, url, hub, group, project, overwrite),
            AccountAction::Remove {
                hub,
                group,
                project,
            } => account::execute_remove(&ctx, hub, group, project),
        },

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

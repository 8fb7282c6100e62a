//! recall CLI — runs word and sign recall sessions.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use recall_core::model::Hearing;
use recall_core::ExperimentError;

mod commands;
mod config;

/// Exit status of a session aborted by the participant.
const EXIT_CANCELLED: i32 = 130;

/// Log file of interactive sessions, relative to the experiment directory.
const SESSION_LOG: &str = "recall-session.log";

#[derive(Parser)]
#[command(name = "recall", version, about = "Word and sign recall experiment runner")]
struct Cli {
    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a recall session
    Run {
        /// Experiment directory (input table, sound/, video/)
        #[arg(long, default_value = ".")]
        dir: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Participant id; asked for in the intake dialog when omitted
        #[arg(long)]
        participant: Option<String>,

        /// Whether the participant is hearing (yes/no)
        #[arg(long)]
        hearing: Option<Hearing>,

        /// RNG seed for a reproducible session
        #[arg(long)]
        seed: Option<u64>,

        /// Line-oriented mode: scenes on stdout, one answer per stdin line
        #[arg(long)]
        headless: bool,
    },

    /// Check the input table and media files
    Validate {
        /// Experiment directory
        #[arg(long, default_value = ".")]
        dir: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the phases a participant would get, without presenting them
    Plan {
        /// Whether the participant is hearing (yes/no)
        #[arg(long)]
        hearing: Hearing,

        /// RNG seed
        #[arg(long)]
        seed: Option<u64>,

        /// Experiment directory
        #[arg(long, default_value = ".")]
        dir: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config, sample input table and media directories
    Init {
        /// Experiment directory
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}

fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("recall=info".parse()?);
    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    // The full-screen UI owns the terminal, so its logs go to a file.
    let log_file = cli.log_file.clone().or_else(|| match &cli.command {
        Commands::Run {
            dir,
            headless: false,
            ..
        } => Some(dir.join(SESSION_LOG)),
        _ => None,
    });
    if let Err(e) = init_tracing(log_file.as_deref()) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }

    let result = match cli.command {
        Commands::Run {
            dir,
            config,
            participant,
            hearing,
            seed,
            headless,
        } => commands::run::execute(commands::run::RunArgs {
            dir,
            config,
            participant,
            hearing,
            seed,
            headless,
        }),
        Commands::Validate { dir, config } => commands::validate::execute(dir, config),
        Commands::Plan {
            hearing,
            seed,
            dir,
            config,
        } => commands::plan::execute(hearing, seed, dir, config),
        Commands::Init { dir } => commands::init::execute(dir),
    };

    if let Err(e) = result {
        let domain = e.downcast_ref::<ExperimentError>();
        if domain.is_some_and(ExperimentError::is_cancelled) {
            tracing::info!("session cancelled by participant");
            eprintln!("Session cancelled; no results were written.");
            process::exit(EXIT_CANCELLED);
        }
        eprintln!("Error: {e:#}");
        if domain.is_some_and(ExperimentError::is_setup_error) {
            eprintln!("Run `recall validate` to check the experiment directory.");
        }
        process::exit(1);
    }
}

mod commands;
mod config;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use ipfee_core::FeeSchedule;
use ipfee_verify::{MonotonicityDirection, VerifyLimits};
use tracing_subscriber::EnvFilter;

/// Exit code when a check ran but the property does not hold.
pub(crate) const EXIT_PROPERTY_FAILED: i32 = 2;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Fee schedule verification toolkit.
#[derive(Parser)]
#[command(name = "ipfee", version, about = "Fee schedule verification toolkit")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// TOML file overriding verification limits
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that every input combination is covered by some yield
    Completeness {
        /// Path to the schedule JSON document
        file: PathBuf,
        /// Check only this fee
        #[arg(long)]
        fee: Option<String>,
    },

    /// Check that a fee moves in one direction as a numeric input grows
    Monotonicity {
        /// Path to the schedule JSON document
        file: PathBuf,
        /// Fee to check
        #[arg(long)]
        fee: String,
        /// Numeric input to vary
        #[arg(long)]
        input: String,
        /// Expected direction
        #[arg(long, default_value = "non-decreasing")]
        direction: MonotonicityDirection,
    },

    /// List each input's domain, cardinality and representative values
    Domains {
        /// Path to the schedule JSON document
        file: PathBuf,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let limits = match &cli.config {
        Some(path) => match config::read_config(path) {
            Ok(c) => c.limits,
            Err(msg) => {
                report_error(&msg, cli.output, cli.quiet);
                process::exit(1);
            }
        },
        None => VerifyLimits::default(),
    };

    match cli.command {
        Commands::Completeness { file, fee } => {
            commands::completeness::cmd_completeness(
                &file,
                fee.as_deref(),
                &limits,
                cli.output,
                cli.quiet,
            );
        }
        Commands::Monotonicity {
            file,
            fee,
            input,
            direction,
        } => {
            commands::monotonicity::cmd_monotonicity(
                &file, &fee, &input, direction, &limits, cli.output, cli.quiet,
            );
        }
        Commands::Domains { file } => {
            commands::domains::cmd_domains(&file, &limits, cli.output, cli.quiet);
        }
    }
}

/// Read and load a schedule document, exiting with status 1 on failure.
pub(crate) fn load_schedule(path: &Path, output: OutputFormat, quiet: bool) -> FeeSchedule {
    let src = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            let msg = format!("error reading file '{}': {}", path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };
    match FeeSchedule::from_json_str(&src) {
        Ok(schedule) => {
            tracing::debug!(
                file = %path.display(),
                inputs = schedule.inputs.len(),
                fees = schedule.fees.len(),
                "schedule loaded"
            );
            schedule
        }
        Err(e) => {
            let msg = format!("error loading '{}': {}", path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    }
}

/// Print a serializable value as pretty JSON on stdout.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) {
    let json = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("{{\"error\": \"serialization: {}\"}}", e));
    println!("{}", json);
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}

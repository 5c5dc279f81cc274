//! lineprof CLI
//!
//! Attributes profiler trace measurements to Python source lines and scopes.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use lineprof::commands::{
    display_version, execute_annotate, execute_scopes, execute_summary, FileArgs, SummaryArgs,
    TraceArgs,
};
use lineprof::utils::config::DEFAULT_TOP_FILES;

/// lineprof - line-level attribution of profiler traces
#[derive(Parser, Debug)]
#[command(name = "lineprof")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Trace input and path reconciliation flags
#[derive(Args, Debug)]
struct TraceOpts {
    /// Extracted trace document (JSON)
    trace: PathBuf,

    /// Directory holding the current sources
    #[arg(long, env = "LINEPROF_SRC")]
    src: Option<PathBuf>,

    /// Root the trace was recorded under; requires --src
    #[arg(long)]
    filter_src: Option<PathBuf>,
}

impl From<TraceOpts> for TraceArgs {
    fn from(opts: TraceOpts) -> Self {
        Self {
            trace: opts.trace,
            source_root: opts.src,
            filter_root: opts.filter_src,
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// List attributed files by CPU time
    Summary {
        #[command(flatten)]
        trace: TraceOpts,

        /// Number of files to list
        #[arg(long, default_value_t = DEFAULT_TOP_FILES)]
        top: usize,
    },

    /// Print a source file with per-line measurements
    Annotate {
        #[command(flatten)]
        trace: TraceOpts,

        /// Source file to annotate (full path or unique suffix)
        file: PathBuf,
    },

    /// List the functions and classes of a source file with their stats
    Scopes {
        #[command(flatten)]
        trace: TraceOpts,

        /// Source file to inspect (full path or unique suffix)
        file: PathBuf,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Summary { trace, top } => {
            execute_summary(SummaryArgs {
                trace: trace.into(),
                top,
            })?;
        }

        Commands::Annotate { trace, file } => {
            execute_annotate(FileArgs {
                trace: trace.into(),
                file,
            })?;
        }

        Commands::Scopes { trace, file } => {
            execute_scopes(FileArgs {
                trace: trace.into(),
                file,
            })?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

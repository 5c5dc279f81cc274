use super::models::TraceArgs;
use crate::attribution::{attribute, File};
use crate::parser::{group_operations, load_trace};
use crate::utils::diagnostics::LogDiagnostics;
use anyhow::{bail, Context, Result};
use log::{debug, info};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Validate trace arguments before running a command
///
/// **Public** - should be called before any attributing command
pub fn validate_trace_args(args: &TraceArgs) -> Result<()> {
    if !args.trace.is_file() {
        bail!("Trace file not found: {}", args.trace.display());
    }

    args.to_config()
        .validate()
        .context("Invalid source roots")?;

    Ok(())
}

/// Load a trace and attribute it to source files
///
/// **Public** - shared first half of every attributing command
///
/// # Errors
/// * Trace file cannot be read or is not a trace document
pub fn load_and_attribute(args: &TraceArgs) -> Result<BTreeMap<PathBuf, File>> {
    let start_time = Instant::now();

    info!("Step 1/3: Loading trace from {}...", args.trace.display());
    let operations = load_trace(&args.trace)
        .with_context(|| format!("Failed to load trace {}", args.trace.display()))?;

    debug!("Loaded {} operations", operations.len());

    info!("Step 2/3: Grouping call records by source line...");
    let grouped = group_operations(&operations, &LogDiagnostics);

    debug!("Call records reference {} files", grouped.len());

    info!("Step 3/3: Attributing to source files...");
    let files = attribute(grouped, &args.to_config(), &LogDiagnostics);

    info!(
        "Attributed {} files in {:.2}s",
        files.len(),
        start_time.elapsed().as_secs_f64()
    );

    Ok(files)
}

/// Look up a file by its exact key, or by a unique key suffix
///
/// **Public** - lets users name `model.py` instead of the full path
///
/// # Errors
/// * No key matches, or the suffix matches several keys
pub fn find_file<'a>(
    files: &'a BTreeMap<PathBuf, File>,
    wanted: &Path,
) -> Result<(&'a PathBuf, &'a File)> {
    if let Some(found) = files.get_key_value(wanted) {
        return Ok(found);
    }

    let matches: Vec<(&PathBuf, &File)> = files
        .iter()
        .filter(|(path, _)| path.ends_with(wanted))
        .collect();

    match matches.as_slice() {
        [found] => Ok(*found),
        [] => bail!("No attributed file matches {}", wanted.display()),
        _ => bail!(
            "{} matches {} files, use a longer path",
            wanted.display(),
            matches.len()
        ),
    }
}

/// Display version information
pub fn display_version() {
    println!("lineprof v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Attributes profiler trace measurements to Python source lines and scopes.");
}

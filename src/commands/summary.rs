//! Summary command implementation.
//!
//! The summary command:
//! 1. Loads and attributes the trace
//! 2. Sorts files by host time, most expensive first
//! 3. Prints a table of the top files

use super::format::fmt_time;
use super::models::SummaryArgs;
use super::utils::{load_and_attribute, validate_trace_args};
use crate::attribution::File;
use anyhow::Result;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Execute the summary command
///
/// **Public** - main entry point called from main.rs
pub fn execute_summary(args: SummaryArgs) -> Result<()> {
    validate_trace_args(&args.trace)?;

    let files = load_and_attribute(&args.trace)?;
    println!("{}", render_summary(&files, args.top));

    Ok(())
}

/// Render the file table
///
/// **Public** - separated from printing for testing
pub fn render_summary(files: &BTreeMap<PathBuf, File>, top: usize) -> String {
    let mut rows: Vec<(&PathBuf, &File)> = files.iter().collect();
    rows.sort_by(|a, b| b.1.overall().host_total.total_cmp(&a.1.overall().host_total));

    let mut output = String::new();
    output.push_str(&format!("{:>12} {:>12} {:>8}  Path\n", "CPU time", "GPU time", "Calls"));
    output.push_str(&format!("{}\n", "-".repeat(80)));

    for (path, file) in rows.iter().take(top) {
        let stats = file.overall();
        output.push_str(&format!(
            "{:>12} {:>12} {:>8}  {}\n",
            fmt_time(stats.host_total),
            fmt_time(stats.device_total),
            stats.calls,
            path.display()
        ));
    }

    if rows.len() > top {
        output.push_str(&format!("... and {} more files\n", rows.len() - top));
    }

    output
}

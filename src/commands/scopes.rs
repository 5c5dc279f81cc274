//! Scopes command implementation.
//!
//! Lists every function and class of a source file with its line range and
//! aggregate stats, enclosing scopes before the scopes nested in them.

use super::format::fmt_time;
use super::models::FileArgs;
use super::utils::{find_file, load_and_attribute, validate_trace_args};
use crate::attribution::File;
use crate::scope::{ScopeKind, ScopeNode};
use anyhow::Result;

/// Execute the scopes command
///
/// **Public** - main entry point called from main.rs
pub fn execute_scopes(args: FileArgs) -> Result<()> {
    validate_trace_args(&args.trace)?;

    let files = load_and_attribute(&args.trace)?;
    let (path, file) = find_file(&files, &args.file)?;

    println!("Scopes of {}", path.display());
    println!("{}", render_scopes(file));

    Ok(())
}

/// Render the scope table, one row per scope
///
/// Lines are shown one-based and inclusive.
pub fn render_scopes(file: &File) -> String {
    let mut scopes: Vec<&ScopeNode> = file.scopes().iter().collect();
    scopes.sort_by_key(|node| (node.range().start, std::cmp::Reverse(node.len())));

    let mut output = String::new();
    output.push_str(&format!(
        "{:<11} {:>12} {:>12} {:>8} {:>4}  Scope\n",
        "Lines", "CPU time", "GPU time", "Calls", "TC"
    ));
    output.push_str(&format!("{}\n", "-".repeat(80)));

    for node in scopes {
        let range = node.range();
        let stats = node.stats();
        output.push_str(&format!(
            "{:<11} {:>12} {:>12} {:>8} {:>3.0}%  {} {}\n",
            format!("{}-{}", range.start + 1, range.end),
            fmt_time(stats.host_total),
            fmt_time(stats.device_total),
            stats.calls,
            stats.tc_ratio,
            kind_label(node.kind()),
            node.qualified_name()
        ));
    }

    output
}

fn kind_label(kind: ScopeKind) -> &'static str {
    match kind {
        ScopeKind::Function => "def",
        ScopeKind::AsyncFunction => "async def",
        ScopeKind::Class => "class",
    }
}

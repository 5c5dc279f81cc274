//! Annotate command implementation.
//!
//! Prints a source file with each measured line suffixed by its CPU and GPU
//! time, their share of the owning scope, and the mean tensor-core ratio.

use super::format::{clip, fmt_share, fmt_time};
use super::models::FileArgs;
use super::utils::{find_file, load_and_attribute, validate_trace_args};
use crate::attribution::File;
use crate::utils::config::MAX_CODE_WIDTH;
use anyhow::{Context, Result};
use log::info;
use std::fs;

/// Execute the annotate command
///
/// **Public** - main entry point called from main.rs
pub fn execute_annotate(args: FileArgs) -> Result<()> {
    validate_trace_args(&args.trace)?;

    let files = load_and_attribute(&args.trace)?;
    let (path, file) = find_file(&files, &args.file)?;
    info!("Annotating {}", path.display());

    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read source file {}", path.display()))?;

    for line in render_annotated(file, &source) {
        println!("{}", line);
    }

    Ok(())
}

/// Render every source line followed by its measurement cell
///
/// **Public** - separated from printing for testing
pub fn render_annotated(file: &File, source: &str) -> Vec<String> {
    let code_lines: Vec<&str> = source.lines().map(str::trim_end).collect();
    let width = code_lines
        .iter()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0)
        .min(MAX_CODE_WIDTH);

    code_lines
        .iter()
        .enumerate()
        .map(|(line_no, code)| {
            let info = file.line_share(line_no).map(|share| {
                format!(
                    "{} ({}) {} ({}) {:3.0}%",
                    fmt_time(share.stats.host_total),
                    fmt_share(share.host_share),
                    fmt_time(share.stats.device_total),
                    fmt_share(share.device_share),
                    share.stats.tc_ratio
                )
            });
            format!(
                "{:<width$} | {}",
                clip(code, width),
                info.unwrap_or_default(),
                width = width
            )
            .trim_end()
            .to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{LineLookup, Stats};

    #[test]
    fn test_render_annotated() {
        let source = "def f():\n    a()\n    b()\n";
        let lines: LineLookup = vec![
            (
                1,
                Stats {
                    calls: 1,
                    device_total: 300.0,
                    host_total: 10.0,
                    tc_ratio: 50.0,
                },
            ),
            (
                2,
                Stats {
                    calls: 1,
                    device_total: 100.0,
                    host_total: 30.0,
                    tc_ratio: 0.0,
                },
            ),
        ]
        .into_iter()
        .collect();
        let file = File::build("f.py", source, lines).unwrap();

        let rendered = render_annotated(&file, source);
        assert_eq!(rendered.len(), 3);
        assert_eq!(rendered[0], "def f(): |");
        assert_eq!(rendered[1], "    a()  | 10.0us ( 25%) 300.0us ( 75%)  50%");
        assert!(rendered[2].ends_with("30.0us ( 75%) 100.0us ( 25%)   0%"));
    }

    #[test]
    fn test_long_lines_are_clipped() {
        let long = format!("x = '{}'", "a".repeat(200));
        let file = File::build("x.py", &long, LineLookup::new()).unwrap();
        let rendered = render_annotated(&file, &long);

        assert_eq!(rendered[0].chars().count(), MAX_CODE_WIDTH + 2);
    }
}

//! Attribution of grouped trace records to source files.
//!
//! Pipeline:
//! 1. Resolve recorded paths (`make_absolute`, then `replace_paths`)
//! 2. Per file, in parallel: read the source, index its scopes, attach stats
//!
//! A file that cannot be read, parsed or aggregated is reported through
//! [`Diagnostics::file_skipped`] and left out. Other files are unaffected.

pub mod file;

pub use file::{File, LineShare};

use crate::parser::trace::TraceLocations;
use crate::reconcile::{make_absolute, replace_paths};
use crate::utils::config::AttributionConfig;
use crate::utils::diagnostics::Diagnostics;
use crate::utils::error::FileError;
use log::debug;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Build a [`File`] for every source path in the trace
///
/// **Public** - main entry point for attribution
///
/// # Arguments
/// * `grouped` - Call records grouped by recorded path and line
/// * `config` - Source and filter roots for path reconciliation
/// * `diagnostics` - Receives dropped paths, skipped frames and skipped files
///
/// # Returns
/// Attributed files keyed by their resolved path
pub fn attribute(
    grouped: TraceLocations,
    config: &AttributionConfig,
    diagnostics: &dyn Diagnostics,
) -> BTreeMap<PathBuf, File> {
    let mut grouped = grouped;

    if let Some(source_root) = &config.source_root {
        grouped = make_absolute(grouped, source_root);

        if let Some(filter_root) = &config.filter_root {
            grouped = replace_paths(grouped, source_root, filter_root, diagnostics);
        }
    }

    debug!("Attributing {} files", grouped.len());

    grouped
        .into_par_iter()
        .filter_map(|(path, events)| {
            let built = events
                .to_line_lookup()
                .map_err(FileError::from)
                .and_then(|lines| File::from_path(&path, lines));

            match built {
                Ok(file) => Some((path, file)),
                Err(e) => {
                    diagnostics.file_skipped(&path, &e);
                    None
                }
            }
        })
        .collect()
}

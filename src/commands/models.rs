use crate::utils::config::{AttributionConfig, DEFAULT_TOP_FILES};
use std::path::PathBuf;

/// Arguments shared by every command that attributes a trace
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone, Default)]
pub struct TraceArgs {
    /// Extracted trace document (JSON)
    pub trace: PathBuf,

    /// Directory holding the current sources
    pub source_root: Option<PathBuf>,

    /// Root the trace was recorded under
    pub filter_root: Option<PathBuf>,
}

impl TraceArgs {
    pub fn new(trace: impl Into<PathBuf>) -> Self {
        Self {
            trace: trace.into(),
            ..Default::default()
        }
    }

    /// Path reconciliation settings for the attribution core
    pub fn to_config(&self) -> AttributionConfig {
        AttributionConfig {
            source_root: self.source_root.clone(),
            filter_root: self.filter_root.clone(),
        }
    }
}

/// Arguments for the summary command
#[derive(Debug, Clone)]
pub struct SummaryArgs {
    pub trace: TraceArgs,

    /// Number of files to list
    pub top: usize,
}

impl Default for SummaryArgs {
    fn default() -> Self {
        Self {
            trace: TraceArgs::default(),
            top: DEFAULT_TOP_FILES,
        }
    }
}

/// Arguments for the annotate and scopes commands
#[derive(Debug, Clone, Default)]
pub struct FileArgs {
    pub trace: TraceArgs,

    /// Source file to show, as keyed in the attribution or a unique suffix of it
    pub file: PathBuf,
}

//! Configuration and constants for attribution and the CLI.

use std::path::PathBuf;
use thiserror::Error;

/// Separator between frames in a call-stack string
pub const FRAME_SEPARATOR: char = ';';

/// Separator between a frame's location and its scope name
pub const SCOPE_SEPARATOR: char = ':';

/// Joiner used when composing qualified scope names (`Class.method`)
pub const QUALIFIED_NAME_JOINER: &str = ".";

// Trace durations are recorded in microseconds
pub const MICROS_PER_SECOND: f64 = 1_000_000.0;
pub const MICROS_PER_MILLI: f64 = 1_000.0;

/// Widest code column rendered by the annotate command
pub const MAX_CODE_WIDTH: usize = 77;

/// Default number of files listed by the summary command
pub const DEFAULT_TOP_FILES: usize = 20;

/// Errors in the attribution configuration
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("--filter-src requires --src")]
    FilterWithoutSource,

    #[error("Source root is not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Where trace-recorded paths should be resolved against
///
/// **Public** - consumed by `attribution::attribute`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributionConfig {
    /// Directory holding the current sources (enables `make_absolute`)
    pub source_root: Option<PathBuf>,

    /// Root the trace was recorded under (enables `replace_paths`)
    pub filter_root: Option<PathBuf>,
}

impl AttributionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.source_root = Some(root.into());
        self
    }

    pub fn with_filter_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.filter_root = Some(root.into());
        self
    }

    /// Check that the roots can be used together
    ///
    /// The filter root only has to be a valid prefix; it usually names a
    /// directory from the machine the trace was recorded on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match (&self.source_root, &self.filter_root) {
            (None, Some(_)) => Err(ConfigError::FilterWithoutSource),
            (Some(root), _) if !root.is_dir() => Err(ConfigError::NotADirectory(root.clone())),
            _ => Ok(()),
        }
    }
}

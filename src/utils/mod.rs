//! Utility modules for configuration, error handling, and logging.

pub mod config;
pub mod diagnostics;
pub mod error;

// Re-export commonly used types for convenience
pub use config::{AttributionConfig, ConfigError};
pub use diagnostics::{Diagnostics, DropReason, LogDiagnostics, NoopDiagnostics};
pub use error::{AggregationError, FileError, FrameParseError, LoadError, ParseError};

//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod annotate;
pub mod format;
pub mod models;
pub mod scopes;
pub mod summary;
pub mod utils;

// Re-export main command functions
pub use annotate::{execute_annotate, render_annotated};
pub use models::{FileArgs, SummaryArgs, TraceArgs};
pub use scopes::{execute_scopes, render_scopes};
pub use summary::{execute_summary, render_summary};
pub use utils::{display_version, find_file, load_and_attribute, validate_trace_args};

//! Diagnostics capability threaded through the attribution core.
//!
//! Core components never decide on their own how a skipped frame or file is
//! reported. They are handed a `&dyn Diagnostics` and call its hooks; the CLI
//! passes [`LogDiagnostics`], pure callers and tests pass [`NoopDiagnostics`].

use super::error::{FileError, FrameParseError};
use log::{debug, warn};
use std::path::Path;

/// Why the path reconciler removed an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The recorded path is not under the filter root
    OutsideFilterRoot,

    /// The remapped path does not exist under the source root
    MissingUnderSourceRoot,

    /// The remapped path is the recorded path itself
    UnchangedPath,
}

/// Receiver for recoverable problems found during attribution
///
/// Every hook defaults to doing nothing. Implementations must be `Sync`
/// because files are attributed in parallel.
pub trait Diagnostics: Sync {
    /// A call-stack frame was malformed and skipped
    fn frame_skipped(&self, _frame: &str, _error: &FrameParseError) {}

    /// A source file could not be attributed and was excluded
    fn file_skipped(&self, _path: &Path, _error: &FileError) {}

    /// A recorded path was removed by path reconciliation
    fn path_dropped(&self, _path: &Path, _reason: DropReason) {}
}

/// Discards every diagnostic
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDiagnostics;

impl Diagnostics for NoopDiagnostics {}

/// Forwards diagnostics to the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn frame_skipped(&self, frame: &str, error: &FrameParseError) {
        // Module frames such as `nn.Module: Linear_0` appear in most stacks
        debug!("Skipping call-stack frame {:?}: {}", frame, error);
    }

    fn file_skipped(&self, path: &Path, error: &FileError) {
        warn!("Skipping {}: {}", path.display(), error);
    }

    fn path_dropped(&self, path: &Path, reason: DropReason) {
        debug!("Dropping recorded path {} ({:?})", path.display(), reason);
    }
}

//! Parse profiler call-stack strings into source frames.
//!
//! A call stack is a `;`-separated list of frames, innermost last:
//!
//! `/src/model.py(42): forward;/src/layers.py(10): __call__`
//!
//! Line numbers are one-based in the trace and converted to zero-based here,
//! exactly once.

use crate::utils::config::{FRAME_SEPARATOR, SCOPE_SEPARATOR};
use crate::utils::diagnostics::Diagnostics;
use crate::utils::error::FrameParseError;
use std::path::PathBuf;

/// One parsed call-stack frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Source path as recorded by the trace
    pub path: PathBuf,

    /// Zero-based line number
    pub line: usize,

    /// Name of the enclosing function
    pub scope: String,
}

/// Parse a single frame of the form `<path>(<one-based-line>): <scope>`
///
/// **Public** - the frame grammar entry point
///
/// # Errors
/// One `FrameParseError` variant per grammar violation.
pub fn parse_frame(frame: &str) -> Result<Frame, FrameParseError> {
    let frame = frame.trim();

    let (location, scope) = frame
        .rsplit_once(SCOPE_SEPARATOR)
        .ok_or_else(|| FrameParseError::MissingScopeSeparator(frame.to_string()))?;

    let (path, line) = location
        .rsplit_once('(')
        .ok_or_else(|| FrameParseError::MissingLineNumber(frame.to_string()))?;

    let line = line
        .trim_end()
        .strip_suffix(')')
        .ok_or_else(|| FrameParseError::UnterminatedLineNumber(frame.to_string()))?;

    let one_based = line
        .trim()
        .parse::<usize>()
        .map_err(|source| FrameParseError::InvalidLineNumber {
            frame: frame.to_string(),
            source,
        })?;

    let line = one_based
        .checked_sub(1)
        .ok_or_else(|| FrameParseError::ZeroLineNumber(frame.to_string()))?;

    Ok(Frame {
        path: PathBuf::from(path.trim()),
        line,
        scope: scope.trim().to_string(),
    })
}

/// Parse a full call stack into frames
///
/// **Public** - used when grouping call records by location
///
/// Empty frames (stray separators) are discarded. A malformed frame is
/// reported through `diagnostics` and skipped; the rest of the stack is
/// still parsed.
pub fn parse_call_stack(call_stack: &str, diagnostics: &dyn Diagnostics) -> Vec<Frame> {
    call_stack
        .split(FRAME_SEPARATOR)
        .filter(|frame| !frame.trim().is_empty())
        .filter_map(|frame| match parse_frame(frame) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                diagnostics.frame_skipped(frame, &e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::diagnostics::NoopDiagnostics;

    #[test]
    fn test_parse_frame() {
        let frame = parse_frame("/a/b.py(42): my_func").unwrap();
        assert_eq!(frame.path, PathBuf::from("/a/b.py"));
        assert_eq!(frame.line, 41);
        assert_eq!(frame.scope, "my_func");
    }

    #[test]
    fn test_parse_frame_splits_on_last_separators() {
        // Drive letters and parenthesised directories stay part of the path
        let frame = parse_frame(r"C:\work (copy)\m.py(7): <module>").unwrap();
        assert_eq!(frame.path, PathBuf::from(r"C:\work (copy)\m.py"));
        assert_eq!(frame.line, 6);
        assert_eq!(frame.scope, "<module>");
    }

    #[test]
    fn test_parse_frame_errors() {
        assert!(matches!(
            parse_frame("garbage"),
            Err(FrameParseError::MissingScopeSeparator(_))
        ));
        assert!(matches!(
            parse_frame("nn.Module: Linear_0"),
            Err(FrameParseError::MissingLineNumber(_))
        ));
        assert!(matches!(
            parse_frame("/a.py(3: f"),
            Err(FrameParseError::UnterminatedLineNumber(_))
        ));
        assert!(matches!(
            parse_frame("/a.py(x): f"),
            Err(FrameParseError::InvalidLineNumber { .. })
        ));
        assert!(matches!(
            parse_frame("/a.py(0): f"),
            Err(FrameParseError::ZeroLineNumber(_))
        ));
    }

    #[test]
    fn test_parse_call_stack_skips_malformed_frames() {
        let frames = parse_call_stack("/a/b.py(10): f;garbage;/a/b.py(20): g", &NoopDiagnostics);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].line, 9);
        assert_eq!(frames[1].line, 19);
        assert_eq!(frames[1].scope, "g");
    }

    #[test]
    fn test_parse_call_stack_discards_empty_frames() {
        let frames = parse_call_stack(";/a.py(1): f;;", &NoopDiagnostics);
        assert_eq!(frames.len(), 1);
        assert!(parse_call_stack("", &NoopDiagnostics).is_empty());
    }
}

//! Per-file attribution: line stats, scope stats and the file total.

use crate::aggregator::{LineLookup, Stats};
use crate::scope::{ScopeIndex, ScopeNode};
use crate::utils::error::{FileError, ParseError};
use std::fs;
use std::path::Path;

/// Attributed statistics for one source file
///
/// Built once and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct File {
    overall: Stats,
    lines: LineLookup,
    scopes: ScopeIndex,
}

/// A line's stats relative to the scope that owns it
#[derive(Debug, Clone, Copy)]
pub struct LineShare<'a> {
    pub stats: &'a Stats,

    /// Innermost scope covering the line
    pub scope: &'a ScopeNode,

    /// Fraction of the scope's device time spent on this line
    pub device_share: f64,

    /// Fraction of the scope's host time spent on this line
    pub host_share: f64,
}

impl File {
    /// Attribute per-line stats to the scopes of `source`
    ///
    /// **Public** - builds the scope index, combines every line into the
    /// file total and each scope's covered lines into its stats
    ///
    /// # Arguments
    /// * `path` - Used in parse error messages
    /// * `source` - Python source text
    /// * `lines` - Per-line stats, zero-based
    ///
    /// # Errors
    /// * `ParseError::Syntax` - `source` is not valid Python
    pub fn build(path: &str, source: &str, lines: LineLookup) -> Result<Self, ParseError> {
        let mut scopes = ScopeIndex::from_source(source, path)?;
        scopes.attach_stats(&lines);
        let overall = Stats::combine(lines.values());

        Ok(Self {
            overall,
            lines,
            scopes,
        })
    }

    /// Read `path` from disk and build its attribution
    ///
    /// # Errors
    /// * `FileError::Io` - source text cannot be read
    /// * `FileError::Parse` - source text is not valid Python
    pub fn from_path(path: &Path, lines: LineLookup) -> Result<Self, FileError> {
        let source = fs::read_to_string(path).map_err(|source| FileError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self::build(&path.display().to_string(), &source, lines)?)
    }

    /// Combined stats of every line with stats
    pub fn overall(&self) -> &Stats {
        &self.overall
    }

    pub fn lines(&self) -> &LineLookup {
        &self.lines
    }

    pub fn scopes(&self) -> &ScopeIndex {
        &self.scopes
    }

    /// Direct stats of a zero-based line
    pub fn line(&self, line: usize) -> Option<&Stats> {
        self.lines.get(line)
    }

    /// Qualified name of the scopes covering `line`
    pub fn scope_name(&self, line: usize) -> Option<String> {
        self.scopes.qualified_name(line)
    }

    /// Innermost scope covering `line`
    pub fn owner(&self, line: usize) -> Option<&ScopeNode> {
        self.scopes.owner(line)
    }

    /// The line's stats as a share of its owning scope
    ///
    /// `None` unless the line has stats, a scope covers it, and that scope
    /// saw at least one call.
    pub fn line_share(&self, line: usize) -> Option<LineShare<'_>> {
        let stats = self.lines.get(line)?;
        let scope = self.scopes.owner(line)?;
        if scope.stats().calls == 0 {
            return None;
        }

        Some(LineShare {
            stats,
            scope,
            device_share: stats.device_share_of(scope.stats()),
            host_share: stats.host_share_of(scope.stats()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "\
import os

class Model:
    def forward(self, x):
        y = x + 1
        return y

def main():
    Model().forward(1)
";

    fn stats(calls: u64, device: f64, host: f64) -> Stats {
        Stats {
            calls,
            device_total: device,
            host_total: host,
            tc_ratio: 0.0,
        }
    }

    fn lookup() -> LineLookup {
        vec![(4, stats(1, 30.0, 3.0)), (5, stats(1, 10.0, 1.0)), (8, stats(2, 40.0, 6.0))]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_build_attaches_scope_stats() {
        let file = File::build("model.py", SOURCE, lookup()).unwrap();

        assert_eq!(file.overall().calls, 4);
        assert_eq!(file.overall().device_total, 80.0);

        let forward = file.owner(4).unwrap();
        assert_eq!(forward.qualified_name(), "Model.forward");
        assert_eq!(forward.stats().device_total, 40.0);

        let model = file.scopes().iter().find(|n| n.name() == "Model").unwrap();
        assert_eq!(model.stats().device_total, 40.0);
    }

    #[test]
    fn test_line_share() {
        let file = File::build("model.py", SOURCE, lookup()).unwrap();

        let share = file.line_share(4).unwrap();
        assert_eq!(share.scope.name(), "forward");
        assert_eq!(share.device_share, 0.75);
        assert_eq!(share.host_share, 0.75);

        // No stats on the line
        assert!(file.line_share(3).is_none());
        // Module level, no covering scope
        assert!(file.line_share(0).is_none());
    }

    #[test]
    fn test_scope_name() {
        let file = File::build("model.py", SOURCE, LineLookup::new()).unwrap();
        assert_eq!(file.scope_name(5).as_deref(), Some("Model.forward"));
        assert_eq!(file.scope_name(8).as_deref(), Some("main"));
        assert_eq!(file.scope_name(0), None);
    }

    #[test]
    fn test_line_share_requires_calls_in_scope() {
        let lines: LineLookup = vec![(8, stats(0, 0.0, 0.0))].into_iter().collect();
        let file = File::build("model.py", SOURCE, lines).unwrap();
        assert!(file.line_share(8).is_none());
    }

    #[test]
    fn test_build_rejects_invalid_source() {
        let result = File::build("bad.py", "def (:\n", LineLookup::new());
        assert!(matches!(result, Err(ParseError::Syntax { .. })));
    }
}

//! Load extracted trace documents and group call records by source location.
//!
//! The document is the per-operation call-stack table produced by a
//! profiler front-end: an object keyed by operation name whose values may
//! carry a `data` array of call records. A bare array of call records is
//! accepted as well.

use super::call_stack::parse_call_stack;
use super::schema::{CallRecord, OperationCalls};
use crate::aggregator::{LineLookup, StatsAccumulator};
use crate::reconcile::Merge;
use crate::utils::diagnostics::Diagnostics;
use crate::utils::error::{AggregationError, LoadError};
use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Key of the call-record array inside an operation entry
const DATA_FIELD: &str = "data";

/// Name given to records from a bare top-level array
const UNNAMED_OPERATION: &str = "<records>";

/// Call records grouped by source path, then by zero-based line
pub type TraceLocations = BTreeMap<PathBuf, FileEvents>;

/// Running per-line aggregates for one source file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileEvents {
    lines: BTreeMap<usize, StatsAccumulator>,
}

impl FileEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a call record into a line's aggregate
    pub fn record(&mut self, line: usize, record: &CallRecord) {
        self.lines.entry(line).or_default().add(record);
    }

    pub fn get(&self, line: usize) -> Option<&StatsAccumulator> {
        self.lines.get(&line)
    }

    /// Number of distinct lines seen
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Finish every line into a lookup
    ///
    /// # Errors
    /// * `AggregationError::Empty` - only if an empty accumulator was merged in
    pub fn to_line_lookup(&self) -> Result<LineLookup, AggregationError> {
        LineLookup::from_accumulators(&self.lines)
    }
}

impl Merge for FileEvents {
    fn merge(&mut self, other: Self) {
        for (line, acc) in other.lines {
            self.lines.entry(line).or_default().merge(&acc);
        }
    }
}

/// Load a trace document from disk
///
/// **Public** - main entry point for trace loading
///
/// # Errors
/// * `LoadError::Io` - file cannot be opened
/// * `LoadError::JsonError` - file is not valid JSON
/// * `LoadError::InvalidFormat` - JSON is neither an object nor an array
pub fn load_trace(path: impl AsRef<Path>) -> Result<Vec<OperationCalls>, LoadError> {
    let path = path.as_ref();
    debug!("Reading trace from: {}", path.display());

    let file = File::open(path)?;
    let raw: Value = serde_json::from_reader(BufReader::new(file))?;

    parse_trace_document(&raw)
}

/// Extract per-operation call records from a parsed trace document
///
/// **Public** - also useful for in-memory documents
pub fn parse_trace_document(raw: &Value) -> Result<Vec<OperationCalls>, LoadError> {
    match raw {
        Value::Object(operations) => {
            let mut parsed = Vec::with_capacity(operations.len());
            for (name, entry) in operations {
                let Some(data) = entry.get(DATA_FIELD) else {
                    debug!("Operation {} has no call data, skipping", name);
                    continue;
                };
                let Some(records) = data.as_array() else {
                    warn!("Operation {} has non-array call data, skipping", name);
                    continue;
                };
                parsed.push(OperationCalls {
                    name: name.clone(),
                    calls: parse_records(name, records),
                });
            }
            Ok(parsed)
        }

        Value::Array(records) => Ok(vec![OperationCalls {
            name: UNNAMED_OPERATION.to_string(),
            calls: parse_records(UNNAMED_OPERATION, records),
        }]),

        _ => Err(LoadError::InvalidFormat(
            "Trace must be a JSON object or array".to_string(),
        )),
    }
}

/// Parse call records, skipping malformed entries
///
/// **Private** - internal helper for parse_trace_document
fn parse_records(operation: &str, records: &[Value]) -> Vec<CallRecord> {
    let mut calls = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        match CallRecord::deserialize(record) {
            Ok(call) => calls.push(call),
            Err(e) => {
                // Log but don't fail - one bad row shouldn't lose the operation
                warn!("Failed to parse call record {} of {}: {}", index, operation, e);
            }
        }
    }

    calls
}

/// Group call records by the (file, line) of every frame in their call stack
///
/// **Public** - feeds path reconciliation and attribution
///
/// A record whose stack lists the same location twice is counted twice.
/// Records without a call stack contribute nothing.
pub fn group_by_location<'a, I>(records: I, diagnostics: &dyn Diagnostics) -> TraceLocations
where
    I: IntoIterator<Item = &'a CallRecord>,
{
    let mut locations = TraceLocations::new();

    for record in records {
        let Some(call_stack) = record.call_stack.as_deref() else {
            continue;
        };
        for frame in parse_call_stack(call_stack, diagnostics) {
            locations
                .entry(frame.path)
                .or_default()
                .record(frame.line, record);
        }
    }

    locations
}

/// Group the records of every operation
pub fn group_operations(
    operations: &[OperationCalls],
    diagnostics: &dyn Diagnostics,
) -> TraceLocations {
    group_by_location(operations.iter().flat_map(|op| op.calls.iter()), diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::diagnostics::NoopDiagnostics;
    use serde_json::json;

    #[test]
    fn test_operations_without_data_are_skipped() {
        let raw = json!({
            "aten::mm": {"data": [{"call_stack": "/m.py(3): f", "calls": 1}]},
            "aten::add": {"rows": []},
        });

        let ops = parse_trace_document(&raw).unwrap();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].name, "aten::mm");
        assert_eq!(ops[0].calls.len(), 1);
    }

    #[test]
    fn test_malformed_records_are_skipped() {
        let raw = json!([{"calls": "many"}, {"call_stack": "/m.py(1): f"}]);
        let ops = parse_trace_document(&raw).unwrap();
        assert_eq!(ops[0].calls.len(), 1);
    }

    #[test]
    fn test_scalar_document_is_rejected() {
        assert!(matches!(
            parse_trace_document(&json!(42)),
            Err(LoadError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_group_by_location_counts_every_frame() {
        let records = vec![
            CallRecord::new("/m.py(3): f;/m.py(7): g").with_device_total(10.0),
            CallRecord::new("/m.py(7): g").with_device_total(5.0),
            CallRecord::default(),
        ];

        let grouped = group_by_location(&records, &NoopDiagnostics);
        let events = &grouped[Path::new("/m.py")];

        assert_eq!(events.line_count(), 2);
        assert_eq!(events.get(2).unwrap().len(), 1);
        assert_eq!(events.get(6).unwrap().len(), 2);

        let lookup = events.to_line_lookup().unwrap();
        assert_eq!(lookup.get(6).unwrap().device_total, 15.0);
    }

    #[test]
    fn test_merge_file_events() {
        let record = CallRecord::new("/m.py(1): f").with_calls(1);
        let mut left = FileEvents::new();
        left.record(0, &record);
        let mut right = FileEvents::new();
        right.record(0, &record);
        right.record(4, &record);

        left.merge(right);
        assert_eq!(left.line_count(), 2);
        assert_eq!(left.get(0).unwrap().len(), 2);
    }
}

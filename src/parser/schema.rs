//! Input schema for extracted profiler call records.
//!
//! A call record is one row of a profiler's per-operation call-stack table:
//! the call stack that issued the operation plus the measurements recorded
//! for it. Every measurement is optional; a missing value contributes 0.

use serde::Deserialize;

/// One call record of a named operation
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CallRecord {
    /// Semicolon-separated frames, `<path>(<line>): <scope>`
    #[serde(default)]
    pub call_stack: Option<String>,

    /// Number of calls folded into this record
    #[serde(default)]
    pub calls: Option<u64>,

    /// Accelerator time in microseconds
    #[serde(default)]
    pub device_total_duration: Option<f64>,

    /// CPU time in microseconds
    #[serde(default)]
    pub host_total_duration: Option<f64>,

    /// Tensor-core utilization, 0-100
    #[serde(default)]
    pub tc_total_ratio: Option<f64>,
}

impl CallRecord {
    /// Create a record for a call stack with no measurements
    ///
    /// **Public** - convenience for tests and programmatic callers
    pub fn new(call_stack: impl Into<String>) -> Self {
        Self {
            call_stack: Some(call_stack.into()),
            ..Default::default()
        }
    }

    pub fn with_calls(mut self, calls: u64) -> Self {
        self.calls = Some(calls);
        self
    }

    pub fn with_device_total(mut self, duration: f64) -> Self {
        self.device_total_duration = Some(duration);
        self
    }

    pub fn with_host_total(mut self, duration: f64) -> Self {
        self.host_total_duration = Some(duration);
        self
    }

    pub fn with_tc_ratio(mut self, ratio: f64) -> Self {
        self.tc_total_ratio = Some(ratio);
        self
    }
}

/// Call records collected for one named operation
#[derive(Debug, Clone, PartialEq)]
pub struct OperationCalls {
    /// Operation name (e.g. `aten::matmul`)
    pub name: String,

    /// Call records, in document order
    pub calls: Vec<CallRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_deserialize_as_none() {
        let record: CallRecord = serde_json::from_str(r#"{"call_stack": "a.py(1): f"}"#).unwrap();
        assert_eq!(record.call_stack.as_deref(), Some("a.py(1): f"));
        assert!(record.calls.is_none());
        assert!(record.device_total_duration.is_none());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let record: CallRecord = serde_json::from_str(
            r#"{"name": "aten::mm", "calls": 3, "tc_eligible": "Yes", "host_self_duration": 12, "tc_total_ratio": 40}"#,
        )
        .unwrap();
        assert_eq!(record.calls, Some(3));
        assert_eq!(record.tc_total_ratio, Some(40.0));
    }
}

//! Trace parsing and schema definitions.
//!
//! This module handles:
//! - Parsing call-stack strings into (file, line, scope) frames
//! - Loading extracted trace documents
//! - Grouping call records by source location

pub mod call_stack;
pub mod schema;
pub mod trace;

// Re-export main types
pub use call_stack::{parse_call_stack, parse_frame, Frame};
pub use schema::{CallRecord, OperationCalls};
pub use trace::{
    group_by_location, group_operations, load_trace, parse_trace_document, FileEvents,
    TraceLocations,
};

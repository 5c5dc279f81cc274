//! lineprof
//!
//! Attribution of profiler trace measurements (device time, host time,
//! call counts, tensor-core utilization) to Python source lines and to the
//! functions and classes that contain them.
//!
//! This crate provides the core implementation for the
//! `lineprof` CLI tool.
//!
//! ## Getting Started
//!
//! ```bash
//! lineprof summary trace.json --src ./project
//! lineprof annotate trace.json model.py --src ./project
//! ```
//!
//! ## Library use
//!
//! ```ignore
//! use lineprof::attribution::attribute;
//! use lineprof::parser::{group_operations, load_trace};
//! use lineprof::utils::{AttributionConfig, NoopDiagnostics};
//!
//! let operations = load_trace("trace.json")?;
//! let grouped = group_operations(&operations, &NoopDiagnostics);
//! let files = attribute(grouped, &AttributionConfig::new(), &NoopDiagnostics);
//! ```

pub mod aggregator;
pub mod attribution;
pub mod commands;
pub mod parser;
pub mod reconcile;
pub mod scope;
pub mod utils;

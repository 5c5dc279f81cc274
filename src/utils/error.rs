//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::num::ParseIntError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while parsing a source file into scopes
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Invalid syntax in {path}: {message}")]
    Syntax { path: String, message: String },
}

/// Errors that can occur while parsing a single call-stack frame
///
/// Frame grammar: `<path>(<one-based-line>): <scope-name>`
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FrameParseError {
    #[error("Frame has no ':' before the scope name: {0}")]
    MissingScopeSeparator(String),

    #[error("Frame has no '(' before the line number: {0}")]
    MissingLineNumber(String),

    #[error("Frame line number is not closed by ')': {0}")]
    UnterminatedLineNumber(String),

    #[error("Frame line number is not an integer: {frame} ({source})")]
    InvalidLineNumber {
        frame: String,
        #[source]
        source: ParseIntError,
    },

    #[error("Frame line number must be one-based: {0}")]
    ZeroLineNumber(String),
}

/// Errors that can occur while aggregating raw call records
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AggregationError {
    #[error("Cannot aggregate an empty set of call records")]
    Empty,
}

/// Errors that exclude a single file from attribution
#[derive(Error, Debug)]
pub enum FileError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Aggregation(#[from] AggregationError),

    #[error("Failed to read source file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while loading an extracted trace document
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read trace file: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid trace format: {0}")]
    InvalidFormat(String),
}

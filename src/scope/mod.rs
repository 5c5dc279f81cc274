//! Lexical scope extraction and indexing.
//!
//! This module handles:
//! - Parsing Python source into function, async function and class scopes
//! - Indexing those scopes for per-line queries

pub mod extractor;
pub mod index;

// Re-export main types
pub use extractor::{extract_scopes, ScopeDef, ScopeKind};
pub use index::{ScopeIndex, ScopeNode};

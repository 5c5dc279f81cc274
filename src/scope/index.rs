//! Interval index over the scopes of one source file.
//!
//! Scopes are stored in a balanced binary tree ordered by range start, each
//! node augmented with the maximum range end in its subtree so point
//! queries can prune whole subtrees.

use super::extractor::{extract_scopes, ScopeDef, ScopeKind};
use crate::aggregator::{LineLookup, Stats};
use crate::utils::config::QUALIFIED_NAME_JOINER;
use crate::utils::error::ParseError;
use std::ops::Range;

/// A scope of a source file together with its aggregate stats
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeNode {
    name: String,
    qualified_name: String,
    kind: ScopeKind,
    range: Range<usize>,
    stats: Stats,
}

impl ScopeNode {
    /// Unqualified definition name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Enclosing scope names joined outermost first (`Class.method`)
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    /// Zero-based half-open line range
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Combined stats of every line in range that has stats
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Number of lines covered
    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// Tree node referring to a scope by its insertion index
#[derive(Debug, Clone)]
struct IntervalNode {
    index: usize,
    start: usize,
    end: usize,
    /// Largest `end` in this subtree
    max_end: usize,
    left: Option<Box<IntervalNode>>,
    right: Option<Box<IntervalNode>>,
}

/// All scopes of a file, queryable by line
///
/// **Public** - owned by `attribution::File`
#[derive(Debug, Clone, Default)]
pub struct ScopeIndex {
    nodes: Vec<ScopeNode>,
    root: Option<Box<IntervalNode>>,
}

impl ScopeIndex {
    /// Build the index from extracted definitions
    ///
    /// Definitions keep their order; it is used to break ties between
    /// scopes with equal range lengths. Overlapping ranges are kept as they
    /// are.
    pub fn new(defs: Vec<ScopeDef>) -> Self {
        let nodes: Vec<ScopeNode> = defs
            .into_iter()
            .map(|def| ScopeNode {
                qualified_name: def.name.clone(),
                name: def.name,
                kind: def.kind,
                range: def.range,
                stats: Stats::default(),
            })
            .collect();

        let mut order: Vec<usize> = (0..nodes.len()).collect();
        order.sort_by_key(|&i| nodes[i].range.start);
        let root = build_balanced_tree(&nodes, &order);

        let mut index = Self { nodes, root };

        let qualified: Vec<String> = index
            .nodes
            .iter()
            .map(|node| {
                index
                    .qualified_name(node.range.start)
                    .unwrap_or_else(|| node.name.clone())
            })
            .collect();
        for (node, name) in index.nodes.iter_mut().zip(qualified) {
            node.qualified_name = name;
        }

        index
    }

    /// Parse `source` and index its scopes
    ///
    /// # Errors
    /// * `ParseError::Syntax` - `source` is not valid Python
    pub fn from_source(source: &str, path: &str) -> Result<Self, ParseError> {
        Ok(Self::new(extract_scopes(source, path)?))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every scope, in extraction order (enclosing before nested)
    pub fn iter(&self) -> impl Iterator<Item = &ScopeNode> + '_ {
        self.nodes.iter()
    }

    /// All scopes whose range covers `line`, in extraction order
    ///
    /// **Public** - the query both resolution policies build on
    pub fn query(&self, line: usize) -> Vec<&ScopeNode> {
        let mut hits = Vec::new();
        if let Some(root) = &self.root {
            query_recursive(root, line, &mut hits);
        }
        hits.sort_unstable();
        hits.into_iter().map(|i| &self.nodes[i]).collect()
    }

    /// Qualified name of the scopes covering `line`
    ///
    /// Covering scopes are ordered by range length, longest first, and their
    /// names joined with `.`. Returns `None` when nothing covers the line.
    pub fn qualified_name(&self, line: usize) -> Option<String> {
        let mut covering = self.query(line);
        if covering.is_empty() {
            return None;
        }

        covering.sort_by(|a, b| b.len().cmp(&a.len()));
        let names: Vec<&str> = covering.iter().map(|node| node.name.as_str()).collect();
        Some(names.join(QUALIFIED_NAME_JOINER))
    }

    /// The innermost scope covering `line`
    ///
    /// Picks the shortest covering range; among equal lengths the scope
    /// extracted first wins.
    pub fn owner(&self, line: usize) -> Option<&ScopeNode> {
        self.query(line).into_iter().min_by_key(|node| node.len())
    }

    /// Attach the combined stats of each scope's lines
    ///
    /// **Crate** - called once by the file builder
    pub(crate) fn attach_stats(&mut self, lines: &LineLookup) {
        for node in &mut self.nodes {
            node.stats = Stats::combine(lines.in_range(node.range.clone()));
        }
    }
}

/// Build a balanced subtree from indices sorted by range start
///
/// **Private** - median of each slice becomes the subtree root
fn build_balanced_tree(nodes: &[ScopeNode], order: &[usize]) -> Option<Box<IntervalNode>> {
    if order.is_empty() {
        return None;
    }

    let mid = order.len() / 2;
    let index = order[mid];
    let range = &nodes[index].range;

    let left = build_balanced_tree(nodes, &order[..mid]);
    let right = build_balanced_tree(nodes, &order[mid + 1..]);

    let mut max_end = range.end;
    if let Some(left_node) = &left {
        max_end = max_end.max(left_node.max_end);
    }
    if let Some(right_node) = &right {
        max_end = max_end.max(right_node.max_end);
    }

    Some(Box::new(IntervalNode {
        index,
        start: range.start,
        end: range.end,
        max_end,
        left,
        right,
    }))
}

/// **Private** - collect indices of intervals covering `line`
fn query_recursive(node: &IntervalNode, line: usize, hits: &mut Vec<usize>) {
    if node.start <= line && line < node.end {
        hits.push(node.index);
    }

    // Ends are exclusive: a subtree whose max_end <= line covers nothing here
    if let Some(left) = &node.left {
        if left.max_end > line {
            query_recursive(left, line, hits);
        }
    }

    // Right subtree starts at or after this node's start
    if let Some(right) = &node.right {
        if node.start <= line {
            query_recursive(right, line, hits);
        }
    }
}

//! Graph Nodes
//!
//! This module defines the node entity: identity, value, input text, and the
//! two edge sets that link it to the rest of the graph.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::formula::{FormulaRef, FormulaRefs};

/// Input given to a freshly created node, and to one whose input is cleared.
pub const DEFAULT_INPUT: &str = "0.0";

/// Unique identifier for a node.
///
/// IDs are never reused, so they stay valid keys across deletions and
/// reordering. They increase in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Generate a new unique node ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named cell in the graph.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,

    /// Display name. Compared with spaces removed.
    name: String,

    /// Current value. `NaN` marks a failed evaluation here or upstream.
    pub(crate) value: f64,

    /// The last accepted input: a canonical number or a formula starting with `=`.
    pub(crate) input: String,

    /// References recorded by the last successful evaluation of `input`.
    pub(crate) refs: FormulaRefs,

    /// Nodes this node's formula reads from.
    pub(crate) parents: BTreeSet<NodeId>,

    /// Nodes whose formulas read from this node.
    pub(crate) children: BTreeSet<NodeId>,

    /// Set when `value` was forced to `NaN` instead of computed from `input`.
    /// A stale node evaluates its input again even if it is resubmitted as is.
    pub(crate) stale: bool,

    /// Layout position, owned by the presentation layer.
    position: (f64, f64),
}

impl Node {
    pub(crate) fn new(name: String, x: f64, y: f64) -> Self {
        Self {
            id: NodeId::new(),
            name,
            value: 0.0,
            input: DEFAULT_INPUT.to_string(),
            refs: FormulaRefs::new(),
            parents: BTreeSet::new(),
            children: BTreeSet::new(),
            stale: false,
            position: (x, y),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn parents(&self) -> &BTreeSet<NodeId> {
        &self.parents
    }

    pub fn children(&self) -> &BTreeSet<NodeId> {
        &self.children
    }

    /// References in the current input, in source order.
    pub fn refs(&self) -> &[FormulaRef] {
        &self.refs
    }

    pub fn position(&self) -> (f64, f64) {
        self.position
    }

    pub(crate) fn set_position(&mut self, x: f64, y: f64) {
        self.position = (x, y);
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    /// The name as `@name` references spell it.
    pub fn lookup_key(&self) -> String {
        strip_spaces(&self.name)
    }

    /// Whether the input is a formula rather than a plain number.
    pub fn is_formula(&self) -> bool {
        self.input.trim_start().starts_with('=')
    }

    /// The value as shown on screen.
    pub fn display_value(&self) -> String {
        if self.value.is_nan() {
            "N/A".to_string()
        } else {
            format_number(self.value)
        }
    }

    /// Whether the value was forced to `NaN` by a failure rather than
    /// computed from the current input.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Force the value to `NaN` after a failed edit or evaluation.
    pub(crate) fn invalidate(&mut self) {
        self.value = f64::NAN;
        self.stale = true;
    }

    /// True if `other` is a parent or a child of this node.
    pub fn is_related(&self, other: NodeId) -> bool {
        self.children.contains(&other) || self.parents.contains(&other)
    }

    /// Replace the text of selected reference tokens.
    ///
    /// `replace` returns the new token text for a reference, or `None` to keep
    /// it. The input is rebuilt left to right and every span is moved to its
    /// new location, so the records stay aligned with the text.
    pub(crate) fn rewrite_refs<F>(&mut self, mut replace: F) -> bool
    where
        F: FnMut(&FormulaRef) -> Option<String>,
    {
        let mut rewritten = String::with_capacity(self.input.len());
        let mut cursor = 0;
        let mut changed = false;

        for r in self.refs.iter_mut() {
            rewritten.push_str(&self.input[cursor..r.span.start]);
            let start = rewritten.len();
            match replace(r) {
                Some(text) => {
                    changed = true;
                    rewritten.push_str(&text);
                }
                None => rewritten.push_str(&self.input[r.span.clone()]),
            }
            cursor = r.span.end;
            r.span = start..rewritten.len();
        }

        if changed {
            rewritten.push_str(&self.input[cursor..]);
            self.input = rewritten;
        }
        changed
    }
}

/// Remove every space character, the way names are compared.
pub(crate) fn strip_spaces(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Canonical text for a number: always shows a fractional part for
/// integral values (`3.0`).
pub fn format_number(value: f64) -> String {
    format!("{value:?}")
}

/// Names may contain only ASCII letters and whitespace.
pub fn is_valid_name(name: &str) -> bool {
    name.chars()
        .all(|c| c.is_ascii_alphabetic() || c.is_whitespace())
}

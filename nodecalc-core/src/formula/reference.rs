//! Node references inside formulas.

use std::ops::Range;

use smallvec::SmallVec;

use crate::error::Result;
use crate::graph::NodeId;

/// How a reference named its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    /// `@name`, matched against node names with spaces removed.
    Name,
    /// `@index`, the target's position in the graph.
    Index,
}

/// A resolved reference recorded during evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaRef {
    /// Byte range of the token after `@` in the evaluated text.
    pub span: Range<usize>,
    pub kind: RefKind,
    pub target: NodeId,
}

impl FormulaRef {
    /// Move the span forward by `offset` bytes.
    pub fn shifted(mut self, offset: usize) -> Self {
        self.span = self.span.start + offset..self.span.end + offset;
        self
    }
}

/// References of a single formula. Most formulas have only a few.
pub type FormulaRefs = SmallVec<[FormulaRef; 4]>;

/// A node found by a resolver, with the value to substitute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved {
    pub id: NodeId,
    pub value: f64,
}

/// Lookup capability handed to the evaluator.
///
/// Implementations are bound to the node whose formula is being evaluated
/// and decide which targets are visible to it.
pub trait ReferenceResolver {
    /// Resolve `@name`. `name` is a non-empty run of letters.
    fn resolve_name(&self, name: &str) -> Result<Resolved>;

    /// Resolve `@index`. `digits` is a non-empty run of ASCII digits.
    fn resolve_index(&self, digits: &str) -> Result<Resolved>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shifted_moves_both_ends() {
        let r = FormulaRef {
            span: 2..5,
            kind: RefKind::Name,
            target: NodeId::from(7),
        };
        assert_eq!(r.shifted(3).span, 5..8);
    }
}

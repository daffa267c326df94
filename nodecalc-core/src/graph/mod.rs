//! Formula Graph
//!
//! This module implements the node collection and the dependency edges
//! between nodes.
//!
//! # Overview
//!
//! - Nodes hold a value, the input text that produced it, and two edge sets
//! - Edges are directed: if B's formula reads A, A is a parent of B and B is
//!   a child of A
//! - Edges are created as a side effect of evaluating a formula, and both
//!   directions are always updated together
//!
//! When a node's value changes, its children are re-evaluated, recursively.
//! The graph is not required to be acyclic; a depth bound on that recursion
//! turns a reference cycle into an error instead of a hang.
//!
//! # Design Decisions
//!
//! 1. Nodes are keyed by a [`NodeId`] that survives deletion of other nodes.
//!    The position in the collection is kept separately because formulas
//!    can refer to it with `@index`.
//!
//! 2. Edge sets are ordered by ID, so every traversal is deterministic.
//!
//! 3. Formula text is rewritten through recorded reference spans, never by
//!    substring search.

mod lifecycle;
mod node;
mod propagate;
mod store;

pub use lifecycle::DANGLING_REF;
pub use node::{format_number, is_valid_name, Node, NodeId, DEFAULT_INPUT};
pub use store::Graph;

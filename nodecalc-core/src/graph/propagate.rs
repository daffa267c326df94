//! Propagation
//!
//! When a node's value changes, every node that reads from it is evaluated
//! again from its stored formula, and the walk continues from any child whose
//! value changed in turn.
//!
//! # Cycle bound
//!
//! Edges are never checked for acyclicity when they are created. A cycle
//! shows up here instead, as a walk that keeps finding changed values. The
//! walk carries its depth, and the depth is checked before any child is
//! visited, so a cycle ends in [`CoreError::Cycle`] after at most
//! `recursion_limit + 1` frames. Every node on the aborted path is left at
//! `NaN`.
//!
//! Siblings share a depth; only descending to a child's children adds one.
//!
//! # Failures
//!
//! A child whose stored formula no longer evaluates (for example `@NA` left
//! behind by a deletion) aborts the walk the same way: the child and every
//! node on the path back to the edited one are left at `NaN`, and the child's
//! error is returned. Before unwinding, the `NaN` is pushed below the failed
//! child so nothing downstream keeps a value computed from the old one.
//! Every node forced to `NaN` this way is marked stale.
//!
//! # Order
//!
//! Children are visited in ascending [`NodeId`] order, which is creation
//! order. `NaN` never compares equal to itself, so a `NaN` always counts as a
//! change and keeps travelling down.

use tracing::{trace, warn};

use super::node::NodeId;
use super::store::{Graph, Interpreted};
use crate::error::{CoreError, Result};

impl Graph {
    /// Recompute everything downstream of `id`.
    pub(crate) fn propagate_from(&mut self, id: NodeId) -> Result<()> {
        self.propagate(id, 0)
    }

    fn propagate(&mut self, id: NodeId, depth: usize) -> Result<()> {
        let limit = self.config.recursion_limit;
        if depth > limit {
            warn!(%id, depth, "propagation exceeded the cycle bound");
            self.get_mut(id)?.invalidate();
            return Err(CoreError::Cycle { limit });
        }

        let children: Vec<NodeId> = self.get(id)?.children().iter().copied().collect();
        for child in children {
            let before = self.get(child)?.value();
            let after = match self.reevaluate(child) {
                Ok(value) => value,
                Err(err) => {
                    warn!(%child, error = %err, "dependent failed to re-evaluate");
                    self.get_mut(child)?.invalidate();
                    if let Err(below) = self.propagate(child, depth + 1) {
                        warn!(%child, error = %below, "propagating a failed dependent failed");
                    }
                    self.get_mut(id)?.invalidate();
                    return Err(err);
                }
            };
            trace!(parent = %id, %child, depth, before, after, "propagated");

            if before != after {
                if let Err(err) = self.propagate(child, depth + 1) {
                    self.get_mut(id)?.invalidate();
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    /// Evaluate a node's stored formula again and commit the result.
    ///
    /// Plain numbers have no parents, so they are only reached here if the
    /// graph is already inconsistent; their value is returned unchanged.
    fn reevaluate(&mut self, id: NodeId) -> Result<f64> {
        let node = self.get(id)?;
        if !node.is_formula() {
            return Ok(node.value());
        }

        let input = node.input().to_string();
        let evaluation = self.evaluate_formula(id, &input)?;
        let value = evaluation.value;
        self.commit(
            id,
            Interpreted {
                value,
                input,
                refs: evaluation.refs,
            },
        )?;
        Ok(value)
    }
}

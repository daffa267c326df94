//! Rename and Delete
//!
//! Both operations change text inside other nodes' formulas. The rewrites
//! work on the reference tokens recorded when each formula was last
//! evaluated, never on substring matches, so `@A` is rewritten only where it
//! actually resolved to the renamed node and `@AB` is left alone.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::node::{is_valid_name, strip_spaces, NodeId};
use super::store::Graph;
use crate::error::{CoreError, Result};
use crate::formula::RefKind;

/// Token written in place of a reference to a deleted node.
pub const DANGLING_REF: &str = "NA";

impl Graph {
    /// Rename a node and rewrite `@name` references to it.
    ///
    /// The new name may contain only letters and whitespace and must not
    /// collide (ignoring spaces) with another node's name. Dependents keep
    /// their values; only their text changes.
    pub fn rename(&mut self, id: NodeId, name: &str) -> Result<()> {
        let node = self.get(id)?;
        if node.name() == name {
            return Ok(());
        }
        if !is_valid_name(name) {
            return Err(CoreError::InvalidName(
                "Node name cannot contain numbers or symbols".to_string(),
            ));
        }

        let key = strip_spaces(name);
        if !key.is_empty()
            && self
                .nodes
                .values()
                .any(|other| other.id() != id && other.lookup_key() == key)
        {
            return Err(CoreError::InvalidName(format!(
                "Node name {name} is already in use"
            )));
        }

        let children: Vec<NodeId> = node.children().iter().copied().collect();
        for child in children {
            let child = self.get_mut(child)?;
            child.rewrite_refs(|r| {
                (r.kind == RefKind::Name && r.target == id).then(|| key.clone())
            });
        }

        let node = self.get_mut(id)?;
        debug!(%id, from = node.name(), to = name, "renamed node");
        node.set_name(name.to_string());
        Ok(())
    }

    /// Delete the node at `index`.
    pub fn delete_at(&mut self, index: usize) -> Result<()> {
        let id = self
            .nodes
            .get_index(index)
            .map(|(id, _)| *id)
            .ok_or_else(|| CoreError::reference(format!("Node {index} does not exist")))?;
        self.delete_node(id)
    }

    /// Delete a node.
    ///
    /// In order:
    ///
    /// 1. The node is detached from its parents.
    /// 2. Every reference to it in its children's formulas becomes `@NA`, and
    ///    those children become `NaN`. The broken text is left for the user
    ///    to see and fix.
    /// 3. The node is removed, shifting every later node down one index.
    /// 4. `@index` references to shifted nodes are rewritten to the new index.
    ///
    /// Finally the `NaN` is propagated below the orphaned children. The first
    /// failure found while doing so (a cycle, or a dependent that no longer
    /// evaluates) is returned after the deletion is complete.
    pub fn delete_node(&mut self, id: NodeId) -> Result<()> {
        let index = self.index_of(id).ok_or(CoreError::NodeNotFound(id))?;
        let node = self.get(id)?;
        let parents: Vec<NodeId> = node.parents().iter().copied().collect();
        let children: Vec<NodeId> = node.children().iter().copied().collect();

        for parent in &parents {
            if let Some(parent) = self.nodes.get_mut(parent) {
                parent.children.remove(&id);
            }
        }

        for child in &children {
            let child = self.get_mut(*child)?;
            child.rewrite_refs(|r| (r.target == id).then(|| DANGLING_REF.to_string()));
            child.refs.retain(|r| r.target != id);
            child.parents.remove(&id);
            child.invalidate();
        }

        self.nodes.shift_remove(&id);
        debug!(%id, index, orphaned = children.len(), "deleted node");

        let shifted: HashMap<NodeId, usize> = self
            .nodes
            .keys()
            .enumerate()
            .skip(index)
            .map(|(new_index, id)| (*id, new_index))
            .collect();
        if !shifted.is_empty() {
            for node in self.nodes.values_mut() {
                node.rewrite_refs(|r| {
                    if r.kind != RefKind::Index {
                        return None;
                    }
                    shifted.get(&r.target).map(|i| i.to_string())
                });
            }
        }

        let mut first_error = None;
        for child in children {
            if let Err(err) = self.propagate_from(child) {
                warn!(%child, error = %err, "propagating a deletion failed");
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

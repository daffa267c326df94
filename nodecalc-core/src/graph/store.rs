//! Node Store
//!
//! The [`Graph`] owns every node in an insertion-ordered map. A node's
//! position in that order is its index, which `@index` references use; its
//! [`NodeId`] is the stable key everything else uses.
//!
//! # Edits
//!
//! `set_input` is the single entry point for changing a node. A value edit
//! evaluates the new text against the current graph without touching it.
//! Only when evaluation succeeds are the node's value, input and parent
//! edges replaced in one step, so a failed edit leaves the previous edges
//! exactly as they were.

use indexmap::IndexMap;
use tracing::{debug, warn};

use super::node::{format_number, strip_spaces, Node, NodeId, DEFAULT_INPUT};
use crate::config::GraphConfig;
use crate::error::{CoreError, Result};
use crate::formula::{self, FormulaRefs, ReferenceResolver, Resolved};

/// An ordered collection of nodes and the dependency edges between them.
#[derive(Debug, Default)]
pub struct Graph {
    pub(crate) nodes: IndexMap<NodeId, Node>,
    pub(crate) config: GraphConfig,
}

/// Accepted form of an input, ready to be committed.
#[derive(Debug)]
pub(crate) struct Interpreted {
    pub value: f64,
    pub input: String,
    pub refs: FormulaRefs,
}

impl Graph {
    /// Create an empty graph with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty graph with the given configuration.
    pub fn with_config(config: GraphConfig) -> Self {
        Self {
            nodes: IndexMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Add a node at the end of the collection.
    ///
    /// The node starts with input `0.0` and no edges. Names are not checked
    /// here; a duplicate name is only reachable by `@index` until renamed.
    pub fn create_node(&mut self, x: f64, y: f64, name: impl Into<String>) -> NodeId {
        let node = Node::new(name.into(), x, y);
        let id = node.id();
        debug!(%id, name = node.name(), index = self.nodes.len(), "created node");
        self.nodes.insert(id, node);
        id
    }

    /// Add a node named with the configured default name.
    pub fn create_default_node(&mut self, x: f64, y: f64) -> NodeId {
        let name = self.config.default_name.clone();
        self.create_node(x, y, name)
    }

    // === Queries ===

    /// Get the total number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node IDs in index order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_at(&self, index: usize) -> Option<&Node> {
        self.nodes.get_index(index).map(|(_, node)| node)
    }

    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.nodes.get_index_of(&id)
    }

    pub(crate) fn get(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(&id).ok_or(CoreError::NodeNotFound(id))
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(&id).ok_or(CoreError::NodeNotFound(id))
    }

    pub fn value(&self, id: NodeId) -> Result<f64> {
        Ok(self.get(id)?.value())
    }

    pub fn name(&self, id: NodeId) -> Result<String> {
        Ok(self.get(id)?.name().to_string())
    }

    pub fn input(&self, id: NodeId) -> Result<String> {
        Ok(self.get(id)?.input().to_string())
    }

    /// The value as shown on screen, `N/A` when invalid.
    pub fn display_value(&self, id: NodeId) -> Result<String> {
        Ok(self.get(id)?.display_value())
    }

    /// Caption drawn under a node: `[index] name`.
    pub fn label(&self, id: NodeId) -> Result<String> {
        let index = self.index_of(id).ok_or(CoreError::NodeNotFound(id))?;
        Ok(format!("[{}] {}", index, self.get(id)?.name()))
    }

    pub fn position(&self, id: NodeId) -> Result<(f64, f64)> {
        Ok(self.get(id)?.position())
    }

    pub fn set_position(&mut self, id: NodeId, x: f64, y: f64) -> Result<()> {
        self.get_mut(id)?.set_position(x, y);
        Ok(())
    }

    /// True if either node reads from the other.
    pub fn is_related(&self, a: NodeId, b: NodeId) -> bool {
        self.nodes.get(&a).is_some_and(|node| node.is_related(b))
    }

    /// Every `(parent, child)` edge, grouped by parent in index order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.nodes
            .values()
            .flat_map(|node| node.children().iter().map(move |&child| (node.id(), child)))
    }

    // === Edits ===

    /// Apply an edit to a node.
    ///
    /// With `tabbed` set the text is a new name (see [`Graph::rename`]);
    /// otherwise it is a new value or formula. Submitting the node's current
    /// input again does nothing, unless the node is stale after a failure, in
    /// which case the input is evaluated again.
    ///
    /// On failure the node keeps its previous input and edges, its value
    /// becomes `NaN`, and the `NaN` is pushed to its dependents before the
    /// error is returned. An accepted edit whose propagation fails (a cycle,
    /// or a dependent that no longer evaluates) also returns that error.
    pub fn set_input(&mut self, id: NodeId, text: &str, tabbed: bool) -> Result<()> {
        if tabbed {
            return self.rename(id, text);
        }

        let node = self.get(id)?;
        if node.input() == text && !node.is_stale() {
            return Ok(());
        }
        let previous = node.value();

        match self.interpret(id, text) {
            Ok(interpreted) => {
                let value = interpreted.value;
                self.commit(id, interpreted)?;
                debug!(%id, input = text, value, "accepted edit");

                if previous != value {
                    self.propagate_from(id)?;
                }
                Ok(())
            }
            Err(err) => {
                debug!(%id, input = text, error = %err, "rejected edit");
                self.get_mut(id)?.invalidate();
                if let Err(downstream) = self.propagate_from(id) {
                    warn!(%id, error = %downstream, "propagating a rejected edit failed");
                }
                Err(err)
            }
        }
    }

    /// Work out what `text` means for node `id` without changing anything.
    pub(crate) fn interpret(&self, id: NodeId, text: &str) -> Result<Interpreted> {
        let compact = strip_spaces(text);

        if compact.is_empty() {
            return Ok(Interpreted {
                value: 0.0,
                input: DEFAULT_INPUT.to_string(),
                refs: FormulaRefs::new(),
            });
        }

        if compact.starts_with('=') {
            let evaluation = self.evaluate_formula(id, text)?;
            return Ok(Interpreted {
                value: evaluation.value,
                input: text.to_string(),
                refs: evaluation.refs,
            });
        }

        let value: f64 = compact
            .parse()
            .map_err(|_| CoreError::NumberFormat(text.to_string()))?;
        Ok(Interpreted {
            value,
            input: format_number(value),
            refs: FormulaRefs::new(),
        })
    }

    /// Evaluate a formula input on behalf of node `id`.
    ///
    /// Returned spans index into `input` itself, past the `=` and any
    /// whitespace before it.
    pub(crate) fn evaluate_formula(&self, id: NodeId, input: &str) -> Result<formula::Evaluation> {
        let offset = input.len() - input.trim_start().len() + '='.len_utf8();
        let body = input
            .get(offset..)
            .ok_or_else(|| CoreError::parse("Formula must start with '='"))?;

        let lookup = Lookup {
            nodes: &self.nodes,
            host: id,
        };
        let mut evaluation = formula::evaluate(body, &lookup)?;
        evaluation.refs = evaluation
            .refs
            .into_iter()
            .map(|r| r.shifted(offset))
            .collect();
        Ok(evaluation)
    }

    /// Store an accepted input and rewire the node's parent edges to match.
    pub(crate) fn commit(&mut self, id: NodeId, interpreted: Interpreted) -> Result<()> {
        let Interpreted { value, input, refs } = interpreted;
        let parents = refs.iter().map(|r| r.target).collect();

        let node = self.get_mut(id)?;
        node.value = value;
        node.input = input;
        node.refs = refs;
        node.stale = false;
        let old_parents = std::mem::replace(&mut node.parents, parents);
        let fresh: Vec<NodeId> = node.parents.iter().copied().collect();

        for parent in &old_parents {
            if let Some(parent) = self.nodes.get_mut(parent) {
                parent.children.remove(&id);
            }
        }
        for parent in fresh {
            if let Some(parent) = self.nodes.get_mut(&parent) {
                parent.children.insert(id);
            }
        }
        Ok(())
    }
}

/// Resolves references for one node against the whole collection.
///
/// A node never resolves to itself, by name or by index.
struct Lookup<'g> {
    nodes: &'g IndexMap<NodeId, Node>,
    host: NodeId,
}

impl ReferenceResolver for Lookup<'_> {
    fn resolve_name(&self, name: &str) -> Result<Resolved> {
        let mut refers_to_self = false;
        for node in self.nodes.values() {
            if node.lookup_key() != name {
                continue;
            }
            if node.id() == self.host {
                refers_to_self = true;
                continue;
            }
            return Ok(Resolved {
                id: node.id(),
                value: node.value(),
            });
        }

        if refers_to_self {
            Err(CoreError::reference(format!("Node {name} cannot reference itself")))
        } else {
            Err(CoreError::reference(format!("Node {name} does not exist")))
        }
    }

    fn resolve_index(&self, digits: &str) -> Result<Resolved> {
        let (id, node) = digits
            .parse::<usize>()
            .ok()
            .and_then(|index| self.nodes.get_index(index))
            .ok_or_else(|| CoreError::reference(format!("Node {digits} does not exist")))?;

        if *id == self.host {
            return Err(CoreError::reference(format!(
                "Node {digits} cannot reference itself"
            )));
        }
        Ok(Resolved {
            id: *id,
            value: node.value(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with(names: &[&str]) -> (Graph, Vec<NodeId>) {
        let mut graph = Graph::new();
        let ids = names
            .iter()
            .map(|name| graph.create_node(0.0, 0.0, *name))
            .collect();
        (graph, ids)
    }

    #[test]
    fn create_and_query() {
        let (graph, ids) = graph_with(&["A", "B"]);
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.index_of(ids[1]), Some(1));
        assert_eq!(graph.node_at(0).map(Node::id), Some(ids[0]));
        assert_eq!(graph.input(ids[0]).unwrap(), "0.0");
        assert_eq!(graph.label(ids[1]).unwrap(), "[1] B");
    }

    #[test]
    fn default_node_uses_configured_name() {
        let config = GraphConfig {
            default_name: "cell".to_string(),
            ..GraphConfig::default()
        };
        let mut graph = Graph::with_config(config);
        let id = graph.create_default_node(1.0, 2.0);
        assert_eq!(graph.name(id).unwrap(), "cell");
        assert_eq!(graph.position(id).unwrap(), (1.0, 2.0));
    }

    #[test]
    fn literal_input_is_canonicalized() {
        let (mut graph, ids) = graph_with(&["A"]);
        graph.set_input(ids[0], " 4 2 ", false).unwrap();
        assert_eq!(graph.value(ids[0]).unwrap(), 42.0);
        assert_eq!(graph.input(ids[0]).unwrap(), "42.0");
    }

    #[test]
    fn blank_input_resets_to_zero() {
        let (mut graph, ids) = graph_with(&["A"]);
        graph.set_input(ids[0], "5", false).unwrap();
        graph.set_input(ids[0], "   ", false).unwrap();
        assert_eq!(graph.value(ids[0]).unwrap(), 0.0);
        assert_eq!(graph.input(ids[0]).unwrap(), "0.0");
    }

    #[test]
    fn bad_literal_is_number_format_error() {
        let (mut graph, ids) = graph_with(&["A"]);
        let err = graph.set_input(ids[0], "12abc", false).unwrap_err();
        assert_eq!(err, CoreError::NumberFormat("12abc".to_string()));
        assert!(graph.value(ids[0]).unwrap().is_nan());
        assert_eq!(graph.input(ids[0]).unwrap(), "0.0");
    }

    #[test]
    fn formula_registers_symmetric_edges() {
        let (mut graph, ids) = graph_with(&["A", "B"]);
        graph.set_input(ids[0], "3", false).unwrap();
        graph.set_input(ids[1], "=@A * 2", false).unwrap();

        assert_eq!(graph.value(ids[1]).unwrap(), 6.0);
        assert_eq!(graph.input(ids[1]).unwrap(), "=@A * 2");
        assert!(graph.node(ids[1]).unwrap().parents().contains(&ids[0]));
        assert!(graph.node(ids[0]).unwrap().children().contains(&ids[1]));
        assert!(graph.is_related(ids[0], ids[1]));
        assert!(graph.is_related(ids[1], ids[0]));
        assert_eq!(graph.edges().collect::<Vec<_>>(), vec![(ids[0], ids[1])]);
    }

    #[test]
    fn index_reference_resolves_by_position() {
        let (mut graph, ids) = graph_with(&["A", "B", "C"]);
        graph.set_input(ids[1], "7", false).unwrap();
        graph.set_input(ids[2], "=@1 + 1", false).unwrap();
        assert_eq!(graph.value(ids[2]).unwrap(), 8.0);
        assert!(graph.node(ids[1]).unwrap().children().contains(&ids[2]));
    }

    #[test]
    fn name_reference_ignores_spaces_in_target() {
        let (mut graph, ids) = graph_with(&["my node", "B"]);
        graph.set_input(ids[0], "2", false).unwrap();
        graph.set_input(ids[1], "=@mynode", false).unwrap();
        assert_eq!(graph.value(ids[1]).unwrap(), 2.0);
    }

    #[test]
    fn self_reference_is_rejected_both_ways() {
        let (mut graph, ids) = graph_with(&["A"]);
        let by_name = graph.set_input(ids[0], "=@A", false).unwrap_err();
        assert_eq!(by_name, CoreError::reference("Node A cannot reference itself"));

        let by_index = graph.set_input(ids[0], "=@0", false).unwrap_err();
        assert_eq!(by_index, CoreError::reference("Node 0 cannot reference itself"));
        assert!(graph.node(ids[0]).unwrap().parents().is_empty());
    }

    #[test]
    fn failed_edit_restores_previous_edges() {
        let (mut graph, ids) = graph_with(&["A", "B", "C"]);
        graph.set_input(ids[0], "1", false).unwrap();
        graph.set_input(ids[2], "=@A", false).unwrap();

        // B resolves, then the unknown name fails the whole edit
        let err = graph.set_input(ids[2], "=@B + @Nope", false).unwrap_err();
        assert!(matches!(err, CoreError::Reference(_)));

        let c = graph.node(ids[2]).unwrap();
        assert!(c.value().is_nan());
        assert_eq!(c.input(), "=@A");
        assert_eq!(c.parents().iter().copied().collect::<Vec<_>>(), vec![ids[0]]);
        assert!(graph.node(ids[0]).unwrap().children().contains(&ids[2]));
        assert!(graph.node(ids[1]).unwrap().children().is_empty());
    }

    #[test]
    fn replacing_formula_drops_stale_edges() {
        let (mut graph, ids) = graph_with(&["A", "B", "C"]);
        graph.set_input(ids[2], "=@A", false).unwrap();
        graph.set_input(ids[2], "=@B", false).unwrap();
        assert!(graph.node(ids[0]).unwrap().children().is_empty());
        assert!(graph.node(ids[1]).unwrap().children().contains(&ids[2]));

        graph.set_input(ids[2], "4", false).unwrap();
        assert!(graph.node(ids[1]).unwrap().children().is_empty());
        assert!(graph.node(ids[2]).unwrap().parents().is_empty());
    }

    #[test]
    fn duplicate_names_resolve_to_first_in_order() {
        let (mut graph, ids) = graph_with(&["X", "X", "C"]);
        graph.set_input(ids[0], "1", false).unwrap();
        graph.set_input(ids[1], "2", false).unwrap();
        graph.set_input(ids[2], "=@X", false).unwrap();
        assert_eq!(graph.value(ids[2]).unwrap(), 1.0);
    }

    #[test]
    fn resubmitting_same_input_skips_evaluation() {
        let (mut graph, ids) = graph_with(&["A", "B"]);
        graph.set_input(ids[0], "1", false).unwrap();
        graph.set_input(ids[1], "=@A + 1", false).unwrap();

        // Only a fresh evaluation would overwrite this
        graph.nodes.get_mut(&ids[1]).unwrap().value = 42.0;
        graph.set_input(ids[1], "=@A + 1", false).unwrap();
        assert_eq!(graph.value(ids[1]).unwrap(), 42.0);
        assert_eq!(graph.input(ids[1]).unwrap(), "=@A + 1");
    }

    #[test]
    fn retyping_formula_after_failed_edit_evaluates_again() {
        let (mut graph, ids) = graph_with(&["A", "B"]);
        graph.set_input(ids[0], "2", false).unwrap();
        graph.set_input(ids[1], "=@A+1", false).unwrap();

        assert!(graph.set_input(ids[1], "=@A+", false).is_err());
        assert!(graph.value(ids[1]).unwrap().is_nan());
        assert!(graph.node(ids[1]).unwrap().is_stale());

        graph.set_input(ids[1], "=@A+1", false).unwrap();
        assert_eq!(graph.value(ids[1]).unwrap(), 3.0);
        assert!(!graph.node(ids[1]).unwrap().is_stale());
    }

    #[test]
    fn retyping_literal_after_failed_edit_evaluates_again() {
        let (mut graph, ids) = graph_with(&["A", "B"]);
        graph.set_input(ids[0], "5", false).unwrap();
        graph.set_input(ids[1], "=@A * 2", false).unwrap();

        assert!(graph.set_input(ids[0], "5x", false).is_err());
        assert!(graph.value(ids[1]).unwrap().is_nan());

        graph.set_input(ids[0], "5.0", false).unwrap();
        assert_eq!(graph.value(ids[0]).unwrap(), 5.0);
        assert_eq!(graph.value(ids[1]).unwrap(), 10.0);
    }

    #[test]
    fn unknown_node_id() {
        let mut graph = Graph::new();
        let missing = NodeId::from(u64::MAX);
        assert_eq!(graph.value(missing), Err(CoreError::NodeNotFound(missing)));
        assert_eq!(
            graph.set_input(missing, "1", false),
            Err(CoreError::NodeNotFound(missing))
        );
    }
}

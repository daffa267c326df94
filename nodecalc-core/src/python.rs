//! Python Bindings
//!
//! Exposes the graph to Python as `nodecalc._core.Graph`. Node IDs cross the
//! boundary as plain integers, and every [`CoreError`] becomes a `ValueError`
//! carrying the user-facing message.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::error::CoreError;
use crate::graph::{Graph, NodeId};

fn to_py_err(err: CoreError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Python-exposed formula graph.
#[pyclass(name = "Graph")]
pub struct PyGraph {
    graph: Graph,
}

#[pymethods]
impl PyGraph {
    #[new]
    fn new() -> Self {
        Self {
            graph: Graph::new(),
        }
    }

    /// Create a node and return its ID.
    fn create_node(&mut self, x: f64, y: f64, name: &str) -> u64 {
        self.graph.create_node(x, y, name).raw()
    }

    /// Edit a node's value (or its name, when `tabbed` is true).
    #[pyo3(signature = (id, text, tabbed = false))]
    fn set_input(&mut self, id: u64, text: &str, tabbed: bool) -> PyResult<()> {
        self.graph
            .set_input(NodeId::from(id), text, tabbed)
            .map_err(to_py_err)
    }

    fn delete_node(&mut self, id: u64) -> PyResult<()> {
        self.graph.delete_node(NodeId::from(id)).map_err(to_py_err)
    }

    fn value(&self, id: u64) -> PyResult<f64> {
        self.graph.value(NodeId::from(id)).map_err(to_py_err)
    }

    fn name(&self, id: u64) -> PyResult<String> {
        self.graph.name(NodeId::from(id)).map_err(to_py_err)
    }

    fn input(&self, id: u64) -> PyResult<String> {
        self.graph.input(NodeId::from(id)).map_err(to_py_err)
    }

    fn display_value(&self, id: u64) -> PyResult<String> {
        self.graph.display_value(NodeId::from(id)).map_err(to_py_err)
    }

    fn is_related(&self, a: u64, b: u64) -> bool {
        self.graph.is_related(NodeId::from(a), NodeId::from(b))
    }

    /// Node IDs in index order.
    fn ids(&self) -> Vec<u64> {
        self.graph.ids().map(|id| id.raw()).collect()
    }

    fn __len__(&self) -> usize {
        self.graph.len()
    }

    fn __repr__(&self) -> String {
        format!("Graph(nodes={})", self.graph.len())
    }
}

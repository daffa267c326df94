//! Nodecalc Core
//!
//! This crate provides the formula graph engine behind the nodecalc node
//! calculator. It implements:
//!
//! - A single-pass parser/evaluator for the formula language
//! - Nodes with dependency edges registered during evaluation
//! - Propagation of changes to dependents, with a bound that turns
//!   reference cycles into errors
//! - Rename and delete, including the rewrite of dependent formulas
//!
//! Windowing, input handling, drawing and layout physics live in the
//! presentation layer. It reads node state through [`graph::Graph`] and shows
//! failures through [`status::ErrorBanner`].
//!
//! # Architecture
//!
//! - `formula`: Parser/evaluator and the reference-resolution seam
//! - `graph`: Nodes, edges, edits, propagation, rename and delete
//! - `config`: Tunables such as the cycle bound
//! - `status`: The transient error message surface
//!
//! # Example
//!
//! ```rust
//! use nodecalc_core::graph::Graph;
//!
//! let mut graph = Graph::new();
//! let a = graph.create_node(0.0, 0.0, "A");
//! let b = graph.create_node(100.0, 0.0, "B");
//!
//! graph.set_input(a, "1", false).unwrap();
//! graph.set_input(b, "=@A + 1", false).unwrap();
//!
//! // Editing A updates B
//! graph.set_input(a, "2", false).unwrap();
//! assert_eq!(graph.value(b).unwrap(), 3.0);
//! ```

pub mod config;
pub mod error;
pub mod formula;
pub mod graph;
pub mod status;

#[cfg(feature = "python")]
mod python;

pub use config::GraphConfig;
pub use error::{CoreError, Result};
pub use graph::{Graph, NodeId};
pub use status::ErrorBanner;

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Python module definition.
///
/// This function is called by Python when importing the module.
/// It registers all Python-exposed types and functions.
#[cfg(feature = "python")]
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<python::PyGraph>()?;

    // Add version info
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}

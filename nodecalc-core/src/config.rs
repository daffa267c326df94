//! Graph Configuration
//!
//! Tunables for the graph and the error surface. Every field has a default,
//! so a partial JSON document only overrides what it names.

use serde::{Deserialize, Serialize};

/// Configuration for a [`Graph`](crate::graph::Graph).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Maximum propagation depth before a reference cycle is reported.
    pub recursion_limit: usize,

    /// Number of ticks an error message stays visible.
    pub error_display_ticks: u32,

    /// Name given to nodes created without an explicit one.
    pub default_name: String,
}

impl GraphConfig {
    /// Parse a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            recursion_limit: 100,
            error_display_ticks: 300,
            default_name: "name".to_string(),
        }
    }
}

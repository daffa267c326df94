//! Error types for the formula graph.

use thiserror::Error;

use crate::graph::NodeId;

/// Result type for graph and formula operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by edits, renames and deletions.
///
/// Every variant renders as the message the presentation layer shows to the
/// user. None of them are fatal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// Malformed formula syntax.
    #[error("{0}")]
    Parse(String),

    /// A `@name` or `@index` reference that does not resolve.
    #[error("{0}")]
    Reference(String),

    /// An identifier that is not one of the built-in functions.
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Literal input that is not a number.
    #[error("{0} cannot be parsed as a number")]
    NumberFormat(String),

    /// A rename to a name containing digits or symbols, or one already taken.
    #[error("{0}")]
    InvalidName(String),

    /// Propagation recursed past the configured bound.
    #[error("Cyclical referencing error (depth limit {limit} exceeded)")]
    Cycle { limit: usize },

    /// The node was deleted or never existed.
    #[error("Node {0} does not exist")]
    NodeNotFound(NodeId),
}

impl CoreError {
    pub(crate) fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    pub(crate) fn reference(message: impl Into<String>) -> Self {
        Self::Reference(message.into())
    }

    /// Whether this error came from the cycle bound rather than from the
    /// formula text itself.
    pub fn is_cycle(&self) -> bool {
        matches!(self, Self::Cycle { .. })
    }
}

//! Error types for PhotoNodes.
//!
//! Uses thiserror for structured errors with context. Errors are designed to:
//! - Be serializable for sending to a frontend
//! - Include actionable information (which node, which socket)
//! - Leave the graph untouched when returned from a mutating call

use crate::core::socket::{SocketDirection, SocketId};
use crate::core::types::SocketType;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a node in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a node ID from a UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Unique identifier for an edge in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub Uuid);

impl EdgeId {
    /// Create a new random edge ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EdgeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Top-level error type for PhotoNodes.
///
/// This enum encompasses all error categories and enables automatic
/// conversion between specific error types.
#[derive(Error, Debug)]
pub enum PhotoNodesError {
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors related to graph structure and editing operations.
///
/// Every mutating graph call validates fully before touching any
/// collection, so returning one of these means nothing changed.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GraphError {
    #[error("Node {0} not found")]
    NodeNotFound(NodeId),

    #[error("Edge {0} not found")]
    EdgeNotFound(EdgeId),

    #[error("Socket {socket} not found")]
    SocketNotFound { socket: SocketId },

    #[error("Socket '{name}' not found on node {node_id}")]
    SocketNameNotFound { node_id: NodeId, name: String },

    #[error("Cannot connect {from} socket to {to} socket: expected output to input")]
    DirectionMismatch {
        from: SocketDirection,
        to: SocketDirection,
    },

    #[error("Cannot connect {from_type} to {to_type}")]
    TypeMismatch {
        from_type: SocketType,
        to_type: SocketType,
    },

    #[error("Node {0} is permanent and cannot be removed")]
    PermanentNodeRemoval(NodeId),

    #[error("Edge from {source_socket} has no destination yet")]
    EdgeNotFinalized { source_socket: SocketId },

    #[error("Edge from {source_socket} already has a destination")]
    EdgeAlreadyFinalized { source_socket: SocketId },

    #[error("Node {0} has an operator and does not hold a source value")]
    NotASource(NodeId),
}

/// Errors raised while evaluating the sink.
///
/// Ordinary data absence is never an error: it degrades to `Value::None`.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EvaluationError {
    #[error("Cycle detected during evaluation involving nodes: {nodes:?}")]
    CycleDetected { nodes: Vec<NodeId> },

    #[error("Evaluation exceeded the maximum depth of {limit} nodes")]
    DepthExceeded { limit: usize },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

// ============================================================================
// Error Utilities
// ============================================================================

impl GraphError {
    /// Get list of affected node IDs.
    pub fn affected_nodes(&self) -> Vec<NodeId> {
        match self {
            GraphError::NodeNotFound(node_id)
            | GraphError::PermanentNodeRemoval(node_id)
            | GraphError::NotASource(node_id)
            | GraphError::SocketNameNotFound { node_id, .. } => vec![*node_id],
            GraphError::SocketNotFound { socket }
            | GraphError::EdgeNotFinalized {
                source_socket: socket,
            }
            | GraphError::EdgeAlreadyFinalized {
                source_socket: socket,
            } => vec![socket.node],
            _ => vec![],
        }
    }

    /// Whether this error was a rejected connection attempt.
    pub fn is_connection_rejection(&self) -> bool {
        matches!(
            self,
            GraphError::DirectionMismatch { .. } | GraphError::TypeMismatch { .. }
        )
    }
}

impl EvaluationError {
    /// Get list of affected node IDs.
    pub fn affected_nodes(&self) -> Vec<NodeId> {
        match self {
            EvaluationError::CycleDetected { nodes } => nodes.clone(),
            EvaluationError::DepthExceeded { .. } => vec![],
            EvaluationError::Graph(error) => error.affected_nodes(),
        }
    }
}

/// Result type alias for PhotoNodes operations.
pub type PhotoNodesResult<T> = Result<T, PhotoNodesError>;

/// Result type alias for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Result type alias for evaluation.
pub type EvaluationResult<T> = Result<T, EvaluationError>;

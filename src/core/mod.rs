//! Core types and traits for the PhotoNodes graph.
//!
//! This module contains the foundational types of the node graph:
//! - Value types and socket type tags
//! - Socket definitions and live sockets
//! - The operator trait and node metadata
//! - Error types
//! - Resolved operator inputs

pub mod types;
pub mod socket;
pub mod error;
pub mod context;
pub mod node;

// Re-export commonly used types
pub use types::{Value, SocketType, ImageValue, Color, ImageMetadata};
pub use socket::{Socket, SocketDefinition, SocketDirection, SocketId};
pub use error::{PhotoNodesError, GraphError, EvaluationError, NodeId, EdgeId};
pub use context::InputValues;
pub use node::{Operator, NodeMetadata, Category};

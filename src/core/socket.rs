//! Socket definitions and runtime sockets.
//!
//! A [`SocketDefinition`] is part of an operator's declared interface: name,
//! type tag, and for inputs an optional default literal plus the value the
//! operator falls back to. A [`Socket`] is the live connection point owned by
//! a node in the graph; it only records which edges touch it.

use crate::core::error::{EdgeId, NodeId};
use crate::core::types::{SocketType, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a socket (input or output).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SocketDirection {
    /// Receives at most one edge
    Input,
    /// Feeds any number of edges
    Output,
}

impl fmt::Display for SocketDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocketDirection::Input => write!(f, "input"),
            SocketDirection::Output => write!(f, "output"),
        }
    }
}

/// Lightweight handle to a socket: owning node, direction and index among
/// that node's sockets of the same direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SocketId {
    /// The node owning the socket.
    pub node: NodeId,
    /// Input or output.
    pub direction: SocketDirection,
    /// Position among the node's same-direction sockets.
    pub index: usize,
}

impl SocketId {
    /// Handle to the input socket at `index` on `node`.
    pub fn input(node: NodeId, index: usize) -> Self {
        Self {
            node,
            direction: SocketDirection::Input,
            index,
        }
    }

    /// Handle to the output socket at `index` on `node`.
    pub fn output(node: NodeId, index: usize) -> Self {
        Self {
            node,
            direction: SocketDirection::Output,
            index,
        }
    }
}

impl fmt::Display for SocketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}[{}]", self.node, self.direction, self.index)
    }
}

/// Declared interface of one socket.
#[derive(Debug, Clone, PartialEq)]
pub struct SocketDefinition {
    /// Name shown next to the socket (e.g. "Factor")
    pub name: String,
    /// Type tag of the socket
    pub socket_type: SocketType,
    /// Direction (input or output)
    pub direction: SocketDirection,
    /// Initial literal override text for an input (e.g. "1.2")
    pub literal: Option<String>,
    /// Value the operator uses when nothing else resolves
    pub fallback: Value,
    /// Description for documentation and tooltips
    pub description: String,
}

impl SocketDefinition {
    /// Create a new input socket definition.
    pub fn input(name: impl Into<String>, socket_type: SocketType) -> Self {
        Self {
            name: name.into(),
            socket_type,
            direction: SocketDirection::Input,
            literal: None,
            fallback: Value::None,
            description: String::new(),
        }
    }

    /// Create a new output socket definition.
    pub fn output(name: impl Into<String>, socket_type: SocketType) -> Self {
        Self {
            name: name.into(),
            socket_type,
            direction: SocketDirection::Output,
            literal: None,
            fallback: Value::None,
            description: String::new(),
        }
    }

    /// Set the initial literal override text.
    pub fn with_literal(mut self, literal: impl Into<String>) -> Self {
        self.literal = Some(literal.into());
        self
    }

    /// Set the operator's fallback value for this input.
    pub fn with_fallback(mut self, value: impl Into<Value>) -> Self {
        self.fallback = value.into();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Whether this input exposes a literal entry control.
    pub fn has_literal_control(&self) -> bool {
        self.direction == SocketDirection::Input
            && self.literal.is_some()
            && self.socket_type.accepts_literal()
    }
}

/// A live connection point owned by a node.
///
/// The socket never validates; the graph checks direction and type before
/// calling [`Socket::connect_edge`]. Inputs hold at most one edge because the
/// graph replaces the previous one before connecting a new edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Socket {
    id: SocketId,
    socket_type: SocketType,
    name: String,
    edges: Vec<EdgeId>,
}

impl Socket {
    /// Create a socket for `node` from its definition.
    pub fn new(node: NodeId, index: usize, definition: &SocketDefinition) -> Self {
        Self {
            id: SocketId {
                node,
                direction: definition.direction,
                index,
            },
            socket_type: definition.socket_type,
            name: definition.name.clone(),
            edges: Vec::new(),
        }
    }

    /// Record an edge touching this socket.
    pub fn connect_edge(&mut self, edge: EdgeId) {
        self.edges.push(edge);
    }

    /// Forget an edge. No-op if the edge is not recorded here.
    pub fn disconnect_edge(&mut self, edge: EdgeId) {
        self.edges.retain(|e| *e != edge);
    }

    /// Handle of this socket.
    pub fn id(&self) -> SocketId {
        self.id
    }

    /// The node owning this socket.
    pub fn owner(&self) -> NodeId {
        self.id.node
    }

    /// Input or output.
    pub fn direction(&self) -> SocketDirection {
        self.id.direction
    }

    /// Position among the owner's same-direction sockets.
    pub fn index(&self) -> usize {
        self.id.index
    }

    /// Type tag, fixed at creation.
    pub fn socket_type(&self) -> SocketType {
        self.socket_type
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Edges currently touching this socket.
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    /// Number of edges currently touching this socket.
    pub fn connection_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether any edge touches this socket.
    pub fn is_connected(&self) -> bool {
        !self.edges.is_empty()
    }

    /// The single incoming edge of an input socket.
    pub fn incoming_edge(&self) -> Option<EdgeId> {
        match self.id.direction {
            SocketDirection::Input => self.edges.first().copied(),
            SocketDirection::Output => None,
        }
    }
}

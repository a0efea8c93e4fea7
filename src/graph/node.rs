//! Node instances living in the graph.
//!
//! A [`GraphNode`] owns its sockets, its literal override texts and either an
//! operator or a held source value. The socket layout comes from the
//! operator's metadata and never changes after construction.

use crate::core::error::{EdgeId, NodeId};
use crate::core::node::{NodeMetadata, Operator};
use crate::core::socket::{Socket, SocketDirection, SocketId};
use crate::core::types::{Value, NO_VALUE};

/// A node instance in the graph.
#[derive(Clone)]
pub struct GraphNode {
    /// Unique identifier
    pub id: NodeId,
    operator: Option<Box<dyn Operator>>,
    metadata: NodeMetadata,
    inputs: Vec<Socket>,
    outputs: Vec<Socket>,
    literals: Vec<Option<String>>,
    literal_enabled: Vec<bool>,
    held: Value,
    permanent: bool,
    label: Option<String>,
}

impl std::fmt::Debug for GraphNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphNode")
            .field("id", &self.id)
            .field("kind", &self.metadata.id)
            .field("inputs", &self.inputs.len())
            .field("outputs", &self.outputs.len())
            .field("literals", &self.literals)
            .field("held", &self.held)
            .field("permanent", &self.permanent)
            .field("label", &self.label)
            .finish()
    }
}

impl GraphNode {
    /// Create a node computing its output with `operator`.
    pub fn new(operator: Box<dyn Operator>) -> Self {
        let metadata = operator.metadata();
        Self::build(Some(operator), metadata)
    }

    /// Create an operator-less node that outputs whatever value it holds.
    ///
    /// Starts out holding `Value::None`.
    pub fn source(metadata: NodeMetadata) -> Self {
        Self::build(None, metadata)
    }

    fn build(operator: Option<Box<dyn Operator>>, metadata: NodeMetadata) -> Self {
        let id = NodeId::new();
        let inputs = metadata
            .inputs
            .iter()
            .enumerate()
            .map(|(i, def)| Socket::new(id, i, def))
            .collect();
        let outputs = metadata
            .outputs
            .iter()
            .enumerate()
            .map(|(i, def)| Socket::new(id, i, def))
            .collect();
        let literals: Vec<Option<String>> = metadata
            .inputs
            .iter()
            .map(|def| def.literal.clone())
            .collect();
        let literal_enabled = vec![true; literals.len()];

        Self {
            id,
            operator,
            metadata,
            inputs,
            outputs,
            literals,
            literal_enabled,
            held: Value::None,
            permanent: false,
            label: None,
        }
    }

    /// Mark the node as permanent (cannot be removed from the graph).
    pub fn permanent(mut self) -> Self {
        self.permanent = true;
        self
    }

    /// Set the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Get the display name (label or operator name).
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.metadata.name)
    }

    /// Operator metadata this node was built from.
    pub fn metadata(&self) -> &NodeMetadata {
        &self.metadata
    }

    /// The node's operator; `None` for source nodes.
    pub fn operator(&self) -> Option<&dyn Operator> {
        self.operator.as_deref()
    }

    /// Whether this node returns a held value instead of computing one.
    pub fn is_source(&self) -> bool {
        self.operator.is_none()
    }

    /// Whether the node refuses removal.
    pub fn is_permanent(&self) -> bool {
        self.permanent
    }

    // ========================================================================
    // Sockets
    // ========================================================================

    /// Input sockets in order.
    pub fn inputs(&self) -> &[Socket] {
        &self.inputs
    }

    /// Output sockets in order.
    pub fn outputs(&self) -> &[Socket] {
        &self.outputs
    }

    /// Input socket at `index`.
    pub fn input(&self, index: usize) -> Option<&Socket> {
        self.inputs.get(index)
    }

    /// Output socket at `index`.
    pub fn output(&self, index: usize) -> Option<&Socket> {
        self.outputs.get(index)
    }

    /// Handle of the input socket at `index` (not checked).
    pub fn input_socket(&self, index: usize) -> SocketId {
        SocketId::input(self.id, index)
    }

    /// Handle of the output socket at `index` (not checked).
    pub fn output_socket(&self, index: usize) -> SocketId {
        SocketId::output(self.id, index)
    }

    /// Handle of the input socket named `name`.
    pub fn input_named(&self, name: &str) -> Option<SocketId> {
        self.metadata.input_index(name).map(|i| self.input_socket(i))
    }

    /// Handle of the output socket named `name`.
    pub fn output_named(&self, name: &str) -> Option<SocketId> {
        self.metadata.output_index(name).map(|i| self.output_socket(i))
    }

    /// Look up a socket by handle. `None` if it belongs to another node.
    pub fn socket(&self, id: SocketId) -> Option<&Socket> {
        if id.node != self.id {
            return None;
        }
        match id.direction {
            SocketDirection::Input => self.inputs.get(id.index),
            SocketDirection::Output => self.outputs.get(id.index),
        }
    }

    pub(crate) fn socket_mut(&mut self, id: SocketId) -> Option<&mut Socket> {
        if id.node != self.id {
            return None;
        }
        match id.direction {
            SocketDirection::Input => self.inputs.get_mut(id.index),
            SocketDirection::Output => self.outputs.get_mut(id.index),
        }
    }

    /// Every edge touching any socket of this node.
    pub fn edges(&self) -> Vec<EdgeId> {
        let mut edges: Vec<EdgeId> = Vec::new();
        for socket in self.inputs.iter().chain(self.outputs.iter()) {
            for edge in socket.edges() {
                if !edges.contains(edge) {
                    edges.push(*edge);
                }
            }
        }
        edges
    }

    // ========================================================================
    // Literals and held values
    // ========================================================================

    /// Raw literal override text for input `index`.
    pub fn literal(&self, index: usize) -> Option<&str> {
        self.literals.get(index).and_then(|l| l.as_deref())
    }

    /// Literal override parsed as the input's declared type.
    ///
    /// Malformed text counts as no override.
    pub fn literal_value(&self, index: usize) -> Option<Value> {
        let text = self.literal(index)?;
        let socket = self.inputs.get(index)?;
        socket.socket_type().parse_literal(text)
    }

    /// The operator's declared fallback for input `index`.
    pub fn fallback(&self, index: usize) -> &Value {
        self.metadata
            .inputs
            .get(index)
            .map(|def| &def.fallback)
            .unwrap_or(&NO_VALUE)
    }

    /// Whether the literal control for input `index` is active.
    ///
    /// Reflects the state at the last refresh: a connected input reports its
    /// literal as inactive.
    pub fn is_literal_enabled(&self, index: usize) -> bool {
        self.literal_enabled.get(index).copied().unwrap_or(false)
    }

    pub(crate) fn set_literal(&mut self, index: usize, text: Option<String>) -> bool {
        match self.literals.get_mut(index) {
            Some(slot) => {
                *slot = text;
                true
            }
            None => false,
        }
    }

    pub(crate) fn refresh_literal_flags(&mut self) {
        for (flag, socket) in self.literal_enabled.iter_mut().zip(&self.inputs) {
            *flag = !socket.is_connected();
        }
    }

    /// Value held by a source node.
    pub fn held_value(&self) -> &Value {
        &self.held
    }

    pub(crate) fn set_held_value(&mut self, value: Value) {
        self.held = value;
    }
}

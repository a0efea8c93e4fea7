//! Resolved inputs handed to an operator.
//!
//! The evaluator builds an [`InputValues`] for each operator call after
//! resolving every input socket (upstream value, literal override, or
//! declared fallback). Operators read it positionally.

use crate::core::error::NodeId;
use crate::core::types::{Color, ImageValue, Value, NO_VALUE};

/// Values of a node's inputs, in socket order.
#[derive(Debug, Clone)]
pub struct InputValues {
    /// ID of the node being evaluated.
    pub node_id: NodeId,
    values: Vec<Value>,
}

impl InputValues {
    /// Create a new set of resolved inputs.
    pub fn new(node_id: NodeId, values: Vec<Value>) -> Self {
        Self { node_id, values }
    }

    /// Get the value at `index`; `Value::None` past the end.
    pub fn get(&self, index: usize) -> &Value {
        self.values.get(index).unwrap_or(&NO_VALUE)
    }

    /// Get an input as an image.
    pub fn image(&self, index: usize) -> Option<&ImageValue> {
        self.get(index).as_image()
    }

    /// Get an input as a float.
    pub fn float(&self, index: usize) -> Option<f64> {
        self.get(index).as_float()
    }

    /// Get an input as a float, or `default` if it is not a float.
    pub fn float_or(&self, index: usize, default: f64) -> f64 {
        self.float(index).unwrap_or(default)
    }

    /// Get an input as a color.
    pub fn color(&self, index: usize) -> Option<Color> {
        self.get(index).as_color()
    }

    /// Number of resolved inputs.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the node has no inputs.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All values in socket order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

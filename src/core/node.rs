//! Operator trait and node metadata.
//!
//! An [`Operator`] is the opaque computation attached to a node: a pure
//! function from resolved input values to one output value. The graph never
//! interprets what an operator does; it only reads the socket layout from
//! its [`NodeMetadata`] and calls [`Operator::evaluate`].

use crate::core::context::InputValues;
use crate::core::socket::SocketDefinition;
use crate::core::types::{SocketType, Value};
use serde::{Deserialize, Serialize};

/// Category for organizing operators in a toolbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Source nodes
    Input,
    /// Sink nodes
    Output,
    /// Color adjustments (brightness, contrast, etc.)
    Adjust,
    /// Blur effects
    Blur,
    /// Rotation, scaling, cropping
    Transform,
    /// Compositing operations
    Composite,
    /// Nodes producing images or values from literals
    Generator,
    /// Utility nodes
    Utility,
    /// Custom/user-defined
    Custom,
}

impl Category {
    /// Get the display name for this category.
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Input => "Input",
            Category::Output => "Output",
            Category::Adjust => "Adjust",
            Category::Blur => "Blur",
            Category::Transform => "Transform",
            Category::Composite => "Composite",
            Category::Generator => "Generator",
            Category::Utility => "Utility",
            Category::Custom => "Custom",
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Custom
    }
}

/// Metadata describing an operator.
///
/// The input and output definitions fix the socket layout of every node
/// created from this operator.
#[derive(Debug, Clone)]
pub struct NodeMetadata {
    /// Unique identifier for this operator (e.g., "gaussian_blur")
    pub id: String,
    /// Human-readable name (e.g., "Gaussian Blur")
    pub name: String,
    /// Category for UI organization
    pub category: Category,
    /// Detailed description
    pub description: String,
    /// Input socket definitions, in socket order
    pub inputs: Vec<SocketDefinition>,
    /// Output socket definitions, in socket order
    pub outputs: Vec<SocketDefinition>,
    /// Searchable tags
    pub tags: Vec<String>,
}

impl NodeMetadata {
    /// Create a new metadata builder.
    pub fn builder(id: impl Into<String>, name: impl Into<String>) -> NodeMetadataBuilder {
        NodeMetadataBuilder::new(id, name)
    }

    /// Find an input by name, returning its index.
    pub fn input_index(&self, name: &str) -> Option<usize> {
        self.inputs.iter().position(|p| p.name == name)
    }

    /// Find an output by name, returning its index.
    pub fn output_index(&self, name: &str) -> Option<usize> {
        self.outputs.iter().position(|p| p.name == name)
    }
}

/// Builder for NodeMetadata.
pub struct NodeMetadataBuilder {
    id: String,
    name: String,
    category: Category,
    description: String,
    inputs: Vec<SocketDefinition>,
    outputs: Vec<SocketDefinition>,
    tags: Vec<String>,
}

impl NodeMetadataBuilder {
    /// Create a new builder with required fields.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: Category::Custom,
            description: String::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Set the category.
    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add an input socket.
    pub fn input(mut self, socket: SocketDefinition) -> Self {
        self.inputs.push(socket);
        self
    }

    /// Add an output socket.
    pub fn output(mut self, socket: SocketDefinition) -> Self {
        self.outputs.push(socket);
        self
    }

    /// Add multiple tags.
    pub fn tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags.extend(tags.into_iter().map(|t| t.into()));
        self
    }

    /// Build the metadata.
    pub fn build(self) -> NodeMetadata {
        NodeMetadata {
            id: self.id,
            name: self.name,
            category: self.category,
            description: self.description,
            inputs: self.inputs,
            outputs: self.outputs,
            tags: self.tags,
        }
    }
}

/// The computation attached to a node.
///
/// # Contract
///
/// `evaluate` receives one resolved value per declared input, in socket
/// order. Each value is already the upstream result, the parsed literal
/// override, or the declared fallback. The operator must be pure: same
/// inputs, same output, no side effects. It returns `Value::None` when it
/// cannot produce a result (typically because an image input is missing);
/// it never fails.
///
/// # Example Implementation
///
/// ```ignore
/// struct Invert;
///
/// impl Operator for Invert {
///     fn metadata(&self) -> NodeMetadata {
///         NodeMetadata::builder("invert", "Invert Colors")
///             .category(Category::Adjust)
///             .input(SocketDefinition::input("Image", SocketType::Image))
///             .output(SocketDefinition::output("Image", SocketType::Image))
///             .build()
///     }
///
///     fn evaluate(&self, inputs: &InputValues) -> Value {
///         match inputs.image(0) {
///             Some(image) => Value::Image(invert(image)),
///             None => Value::None,
///         }
///     }
///
///     fn clone_box(&self) -> Box<dyn Operator> {
///         Box::new(Invert)
///     }
/// }
/// ```
pub trait Operator: Send + Sync {
    /// Get the metadata for this operator.
    ///
    /// Called when a node is created and during registration; should return
    /// consistent values.
    fn metadata(&self) -> NodeMetadata;

    /// Compute the node's output from its resolved inputs.
    fn evaluate(&self, inputs: &InputValues) -> Value;

    /// Clone this operator into a boxed trait object.
    fn clone_box(&self) -> Box<dyn Operator>;
}

// Allow cloning Box<dyn Operator>
impl Clone for Box<dyn Operator> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// A wildcard operator that forwards its input unchanged.
///
/// Both sockets are `Any`, so it can be spliced between any pair of sockets.
#[derive(Debug, Clone)]
pub struct PassthroughOperator;

impl Operator for PassthroughOperator {
    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::builder("passthrough", "Passthrough")
            .category(Category::Utility)
            .description("Passes the input through unchanged")
            .input(SocketDefinition::input("Input", SocketType::Any))
            .output(SocketDefinition::output("Output", SocketType::Any))
            .build()
    }

    fn evaluate(&self, inputs: &InputValues) -> Value {
        inputs.get(0).clone()
    }

    fn clone_box(&self) -> Box<dyn Operator> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::NodeId;

    #[test]
    fn test_metadata_builder() {
        let metadata = NodeMetadata::builder("test_op", "Test Operator")
            .category(Category::Utility)
            .description("A test operator")
            .input(SocketDefinition::input("Image", SocketType::Image))
            .input(SocketDefinition::input("Factor", SocketType::Float).with_literal("2"))
            .output(SocketDefinition::output("Image", SocketType::Image))
            .tags(["test", "debug"])
            .build();

        assert_eq!(metadata.id, "test_op");
        assert_eq!(metadata.category, Category::Utility);
        assert_eq!(metadata.inputs.len(), 2);
        assert_eq!(metadata.outputs.len(), 1);
        assert_eq!(metadata.tags.len(), 2);
        assert_eq!(metadata.input_index("Factor"), Some(1));
        assert_eq!(metadata.output_index("Missing"), None);
    }

    #[test]
    fn test_passthrough_operator() {
        let op = PassthroughOperator;
        let metadata = op.metadata();
        assert_eq!(metadata.id, "passthrough");
        assert_eq!(metadata.inputs[0].socket_type, SocketType::Any);

        let inputs = InputValues::new(NodeId::new(), vec![Value::Float(42.0)]);
        assert_eq!(op.evaluate(&inputs), Value::Float(42.0));

        let empty = InputValues::new(NodeId::new(), vec![Value::None]);
        assert_eq!(op.evaluate(&empty), Value::None);
    }

    #[test]
    fn test_category_display() {
        assert_eq!(Category::Blur.display_name(), "Blur");
        assert_eq!(Category::default(), Category::Custom);
    }
}

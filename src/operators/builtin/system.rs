//! The image source and result sink every graph starts with.

use crate::core::context::InputValues;
use crate::core::node::{Category, NodeMetadata, Operator};
use crate::core::socket::SocketDefinition;
use crate::core::types::{SocketType, Value};
use crate::graph::node::GraphNode;

/// Metadata of the image source node.
pub fn image_source_metadata() -> NodeMetadata {
    NodeMetadata::builder("image_source", "Input Image")
        .description("Holds the image loaded by the host")
        .category(Category::Input)
        .output(SocketDefinition::output("Image", SocketType::Image))
        .build()
}

/// A permanent source node holding no image yet.
pub fn image_source() -> GraphNode {
    GraphNode::source(image_source_metadata()).permanent()
}

/// A permanent sink node.
pub fn output_result() -> GraphNode {
    GraphNode::new(Box::new(OutputResult)).permanent()
}

/// Forwards whatever reaches its single image input.
#[derive(Debug, Clone)]
pub struct OutputResult;

impl Operator for OutputResult {
    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::builder("output_result", "Output Result")
            .description("Final result shown by the host")
            .category(Category::Output)
            .input(SocketDefinition::input("Image", SocketType::Image))
            .build()
    }

    fn evaluate(&self, inputs: &InputValues) -> Value {
        inputs.get(0).clone()
    }

    fn clone_box(&self) -> Box<dyn Operator> {
        Box::new(self.clone())
    }
}

//! Blur operators.

use crate::core::context::InputValues;
use crate::core::node::{Category, NodeMetadata, Operator};
use crate::core::socket::SocketDefinition;
use crate::core::types::{ImageValue, SocketType, Value};
use crate::operators::registry::OperatorRegistry;

/// Register blur operators.
pub fn register(registry: &mut OperatorRegistry) {
    registry.register(|| Box::new(GaussianBlur));
}

/// Applies Gaussian blur to an image.
#[derive(Debug, Clone)]
pub struct GaussianBlur;

impl Operator for GaussianBlur {
    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::builder("gaussian_blur", "Gaussian Blur")
            .description("Apply a Gaussian blur effect to an image")
            .category(Category::Blur)
            .input(SocketDefinition::input("Image", SocketType::Image))
            .input(
                SocketDefinition::input("Radius", SocketType::Float)
                    .with_literal("5.0")
                    .with_fallback(5.0)
                    .with_description("Blur radius in pixels (standard deviation)"),
            )
            .output(SocketDefinition::output("Image", SocketType::Image))
            .tags(["soften", "smooth"])
            .build()
    }

    fn evaluate(&self, inputs: &InputValues) -> Value {
        let Some(image) = inputs.image(0) else {
            return Value::None;
        };
        let radius = inputs.float_or(1, 5.0);

        // Zero, negative and non-finite radii leave the image as it is
        if !(radius > 0.0 && radius.is_finite()) {
            return Value::Image(image.clone());
        }

        // Past the image's longest side a wider kernel changes nothing
        let (width, height) = image.dimensions();
        let sigma = radius.min(width.max(height).max(1) as f64);

        let rgba = image.to_rgba8();
        let blurred = imageproc::filter::gaussian_blur_f32(&rgba, sigma as f32);
        Value::Image(ImageValue::from_rgba(blurred))
    }

    fn clone_box(&self) -> Box<dyn Operator> {
        Box::new(self.clone())
    }
}

//! Operators that produce values from their literals.

use crate::core::context::InputValues;
use crate::core::node::{Category, NodeMetadata, Operator};
use crate::core::socket::SocketDefinition;
use crate::core::types::{Color, ImageValue, SocketType, Value};
use crate::operators::registry::OperatorRegistry;
use image::RgbaImage;
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

/// Register generator operators.
pub fn register(registry: &mut OperatorRegistry) {
    registry.register(|| Box::new(DrawRect));
    registry.register(|| Box::new(MakeColor));
    registry.register(|| Box::new(FloatInput));
}

/// Side of the canvas drawn by [`DrawRect`].
pub const CANVAS_SIZE: u32 = 512;

fn float_socket(name: &str, value: f64) -> SocketDefinition {
    SocketDefinition::input(name, SocketType::Float)
        .with_literal(value.to_string())
        .with_fallback(value)
}

/// Draws a filled rectangle on a transparent square canvas.
///
/// Both corners are inclusive, so the filled area is `(w + 1) x (h + 1)`.
#[derive(Debug, Clone)]
pub struct DrawRect;

impl Operator for DrawRect {
    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::builder("draw_rect", "Draw Rect")
            .description("Draw a filled rectangle on a transparent canvas")
            .category(Category::Generator)
            .input(float_socket("X Position", 50.0))
            .input(float_socket("Y Position", 50.0))
            .input(float_socket("Width", 100.0))
            .input(float_socket("Height", 100.0))
            .input(SocketDefinition::input("Color", SocketType::Color).with_fallback(Color::RED))
            .output(SocketDefinition::output("Image", SocketType::Image))
            .tags(["shape", "square"])
            .build()
    }

    fn evaluate(&self, inputs: &InputValues) -> Value {
        let limit = CANVAS_SIZE as f64 * 2.0;
        let coordinate = |index: usize, default: f64| {
            inputs.float_or(index, default).trunc().clamp(-limit, limit) as i32
        };
        let x = coordinate(0, 50.0);
        let y = coordinate(1, 50.0);
        let width = coordinate(2, 100.0);
        let height = coordinate(3, 100.0);
        let color = inputs.color(4).unwrap_or(Color::RED);

        let mut canvas = RgbaImage::from_pixel(CANVAS_SIZE, CANVAS_SIZE, Color::TRANSPARENT.to_rgba());
        if width >= 0 && height >= 0 {
            let rect = Rect::at(x, y).of_size(width as u32 + 1, height as u32 + 1);
            draw_filled_rect_mut(&mut canvas, rect, color.to_rgba());
        }
        Value::Image(ImageValue::from_rgba(canvas))
    }

    fn clone_box(&self) -> Box<dyn Operator> {
        Box::new(self.clone())
    }
}

/// Builds an opaque color from red, green and blue components.
#[derive(Debug, Clone)]
pub struct MakeColor;

impl Operator for MakeColor {
    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::builder("make_color", "Make Color")
            .description("Build an opaque color from components in 0..=255")
            .category(Category::Generator)
            .input(float_socket("Red", 255.0))
            .input(float_socket("Green", 0.0))
            .input(float_socket("Blue", 0.0))
            .output(SocketDefinition::output("Color", SocketType::Color))
            .build()
    }

    fn evaluate(&self, inputs: &InputValues) -> Value {
        let component = |index: usize, default: f64| {
            inputs.float_or(index, default).trunc().clamp(0.0, 255.0) as u8
        };
        Value::Color(Color::rgb(component(0, 255.0), component(1, 0.0), component(2, 0.0)))
    }

    fn clone_box(&self) -> Box<dyn Operator> {
        Box::new(self.clone())
    }
}

/// Exposes its literal as a float output.
#[derive(Debug, Clone)]
pub struct FloatInput;

impl Operator for FloatInput {
    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::builder("float_input", "Float Input")
            .description("A constant number")
            .category(Category::Generator)
            .input(float_socket("Value", 0.0))
            .output(SocketDefinition::output("Out", SocketType::Float))
            .tags(["number", "constant"])
            .build()
    }

    fn evaluate(&self, inputs: &InputValues) -> Value {
        Value::Float(inputs.float_or(0, 0.0))
    }

    fn clone_box(&self) -> Box<dyn Operator> {
        Box::new(self.clone())
    }
}

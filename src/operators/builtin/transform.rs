//! Geometric transformation operators.

use crate::core::context::InputValues;
use crate::core::node::{Category, NodeMetadata, Operator};
use crate::core::socket::SocketDefinition;
use crate::core::types::{ImageValue, SocketType, Value};
use crate::operators::builtin::pixel_dimension;
use crate::operators::registry::OperatorRegistry;
use image::imageops::FilterType;
use image::{Rgba, RgbaImage};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};

/// Register transform operators.
pub fn register(registry: &mut OperatorRegistry) {
    registry.register(|| Box::new(Transform));
    registry.register(|| Box::new(CropCenter));
}

/// Rotates (counter-clockwise, growing the canvas) then scales an image.
#[derive(Debug, Clone)]
pub struct Transform;

impl Operator for Transform {
    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::builder("transform", "Transform")
            .description("Rotate and scale an image")
            .category(Category::Transform)
            .input(SocketDefinition::input("Image", SocketType::Image))
            .input(
                SocketDefinition::input("Rotate", SocketType::Float)
                    .with_literal("0.0")
                    .with_fallback(0.0)
                    .with_description("Counter-clockwise rotation in degrees"),
            )
            .input(
                SocketDefinition::input("Scale", SocketType::Float)
                    .with_literal("1.0")
                    .with_fallback(1.0)
                    .with_description("Uniform scale factor"),
            )
            .output(SocketDefinition::output("Image", SocketType::Image))
            .tags(["rotate", "scale", "resize"])
            .build()
    }

    fn evaluate(&self, inputs: &InputValues) -> Value {
        let Some(image) = inputs.image(0) else {
            return Value::None;
        };
        let degrees = inputs.float_or(1, 0.0);
        let scale = inputs.float_or(2, 1.0);

        let mut result = image.to_rgba8();
        if degrees.is_finite() && degrees % 360.0 != 0.0 {
            result = rotate_expanded(&result, degrees);
        }

        if scale != 1.0 && scale > 0.0 {
            let width = pixel_dimension(result.width() as f64 * scale);
            let height = pixel_dimension(result.height() as f64 * scale);
            match (width, height) {
                (Some(width), Some(height)) => {
                    result = image::imageops::resize(&result, width, height, FilterType::CatmullRom);
                }
                _ => return Value::None,
            }
        }

        Value::Image(ImageValue::from_rgba(result))
    }

    fn clone_box(&self) -> Box<dyn Operator> {
        Box::new(self.clone())
    }
}

/// Rotate counter-clockwise by `degrees` on a canvas large enough to hold
/// every corner; uncovered pixels are transparent.
fn rotate_expanded(image: &RgbaImage, degrees: f64) -> RgbaImage {
    let theta = degrees.to_radians();
    let (w, h) = (image.width() as f64, image.height() as f64);
    let (sin, cos) = (theta.sin().abs(), theta.cos().abs());
    let width = ((w * cos + h * sin) - 1e-6).ceil().max(1.0) as u32;
    let height = ((w * sin + h * cos) - 1e-6).ceil().max(1.0) as u32;

    // Work on a canvas holding both the original and the rotated bounds
    let work_width = width.max(image.width());
    let work_height = height.max(image.height());
    let mut canvas = RgbaImage::from_pixel(work_width, work_height, Rgba([0, 0, 0, 0]));
    image::imageops::replace(
        &mut canvas,
        image,
        ((work_width - image.width()) / 2) as i64,
        ((work_height - image.height()) / 2) as i64,
    );

    // imageproc rotates clockwise for positive angles
    let rotated = rotate_about_center(
        &canvas,
        -theta as f32,
        Interpolation::Bilinear,
        Rgba([0, 0, 0, 0]),
    );

    image::imageops::crop_imm(
        &rotated,
        (work_width - width) / 2,
        (work_height - height) / 2,
        width,
        height,
    )
    .to_image()
}

/// Crops a region of fixed size around the image center.
///
/// Regions reaching past the image edge are padded with transparency.
#[derive(Debug, Clone)]
pub struct CropCenter;

impl Operator for CropCenter {
    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::builder("crop_center", "Crop Center")
            .description("Crop a region around the center of an image")
            .category(Category::Transform)
            .input(SocketDefinition::input("Image", SocketType::Image))
            .input(
                SocketDefinition::input("Width", SocketType::Float)
                    .with_literal("200")
                    .with_fallback(200.0),
            )
            .input(
                SocketDefinition::input("Height", SocketType::Float)
                    .with_literal("200")
                    .with_fallback(200.0),
            )
            .output(SocketDefinition::output("Image", SocketType::Image))
            .tags(["crop", "trim"])
            .build()
    }

    fn evaluate(&self, inputs: &InputValues) -> Value {
        let Some(image) = inputs.image(0) else {
            return Value::None;
        };
        let (Some(width), Some(height)) = (
            pixel_dimension(inputs.float_or(1, 200.0)),
            pixel_dimension(inputs.float_or(2, 200.0)),
        ) else {
            return Value::None;
        };

        let rgba = image.to_rgba8();
        let left = ((rgba.width() as f64 - width as f64) / 2.0).round() as i64;
        let top = ((rgba.height() as f64 - height as f64) / 2.0).round() as i64;

        let mut canvas = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
        image::imageops::replace(&mut canvas, &rgba, -left, -top);
        Value::Image(ImageValue::from_rgba(canvas))
    }

    fn clone_box(&self) -> Box<dyn Operator> {
        Box::new(self.clone())
    }
}

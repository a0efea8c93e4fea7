//! Color adjustment operators.

use crate::core::context::InputValues;
use crate::core::node::{Category, NodeMetadata, Operator};
use crate::core::socket::SocketDefinition;
use crate::core::types::{ImageValue, SocketType, Value};
use crate::operators::registry::OperatorRegistry;
use image::{DynamicImage, RgbaImage};

/// Register color operators.
pub fn register(registry: &mut OperatorRegistry) {
    registry.register(|| Box::new(Brightness));
    registry.register(|| Box::new(Contrast));
    registry.register(|| Box::new(Grayscale));
    registry.register(|| Box::new(Invert));
}

fn image_input() -> SocketDefinition {
    SocketDefinition::input("Image", SocketType::Image).with_description("Input image")
}

fn image_output() -> SocketDefinition {
    SocketDefinition::output("Image", SocketType::Image)
}

fn to_channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Blend every color channel towards `base` by `factor`; alpha is kept.
fn enhance(image: &RgbaImage, base: f64, factor: f64) -> RgbaImage {
    let mut result = image.clone();
    for pixel in result.pixels_mut() {
        for channel in pixel.0.iter_mut().take(3) {
            *channel = to_channel(base + (*channel as f64 - base) * factor);
        }
    }
    result
}

/// Scales image brightness by a factor (1.0 leaves the image unchanged).
#[derive(Debug, Clone)]
pub struct Brightness;

impl Operator for Brightness {
    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::builder("brightness", "Brightness")
            .description("Scale the brightness of an image")
            .category(Category::Adjust)
            .input(image_input())
            .input(
                SocketDefinition::input("Factor", SocketType::Float)
                    .with_literal("1.2")
                    .with_fallback(1.0)
                    .with_description("0.0 is black, 1.0 is the original"),
            )
            .output(image_output())
            .tags(["light", "exposure"])
            .build()
    }

    fn evaluate(&self, inputs: &InputValues) -> Value {
        let Some(image) = inputs.image(0) else {
            return Value::None;
        };
        let factor = inputs.float_or(1, 1.0);
        Value::Image(ImageValue::from_rgba(enhance(&image.to_rgba8(), 0.0, factor)))
    }

    fn clone_box(&self) -> Box<dyn Operator> {
        Box::new(self.clone())
    }
}

/// Scales contrast around the image's mean gray level.
#[derive(Debug, Clone)]
pub struct Contrast;

impl Operator for Contrast {
    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::builder("contrast", "Contrast")
            .description("Adjust the contrast of an image")
            .category(Category::Adjust)
            .input(image_input())
            .input(
                SocketDefinition::input("Factor", SocketType::Float)
                    .with_literal("1.5")
                    .with_fallback(1.0)
                    .with_description("0.0 is flat gray, 1.0 is the original"),
            )
            .output(image_output())
            .build()
    }

    fn evaluate(&self, inputs: &InputValues) -> Value {
        let Some(image) = inputs.image(0) else {
            return Value::None;
        };
        let factor = inputs.float_or(1, 1.0);
        let rgba = image.to_rgba8();
        Value::Image(ImageValue::from_rgba(enhance(&rgba, mean_luma(&rgba), factor)))
    }

    fn clone_box(&self) -> Box<dyn Operator> {
        Box::new(self.clone())
    }
}

/// Mean luma of an image, rounded to a whole gray level.
fn mean_luma(image: &RgbaImage) -> f64 {
    let pixels = image.width() as u64 * image.height() as u64;
    if pixels == 0 {
        return 0.0;
    }
    let total: u64 = image::imageops::grayscale(image)
        .pixels()
        .map(|p| p.0[0] as u64)
        .sum();
    (total as f64 / pixels as f64).round()
}

/// Converts an image to grayscale (the result is opaque).
#[derive(Debug, Clone)]
pub struct Grayscale;

impl Operator for Grayscale {
    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::builder("grayscale", "Grayscale")
            .description("Convert an image to grayscale")
            .category(Category::Adjust)
            .input(image_input())
            .output(image_output())
            .tags(["desaturate", "monochrome"])
            .build()
    }

    fn evaluate(&self, inputs: &InputValues) -> Value {
        let Some(image) = inputs.image(0) else {
            return Value::None;
        };
        let gray = image::imageops::grayscale(image.get_image());
        Value::Image(ImageValue::from_rgba(DynamicImage::ImageLuma8(gray).to_rgba8()))
    }

    fn clone_box(&self) -> Box<dyn Operator> {
        Box::new(self.clone())
    }
}

/// Inverts color channels, keeping alpha.
#[derive(Debug, Clone)]
pub struct Invert;

impl Operator for Invert {
    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::builder("invert", "Invert Colors")
            .description("Invert the colors of an image")
            .category(Category::Adjust)
            .input(image_input())
            .output(image_output())
            .tags(["negative"])
            .build()
    }

    fn evaluate(&self, inputs: &InputValues) -> Value {
        let Some(image) = inputs.image(0) else {
            return Value::None;
        };
        let mut rgba = image.to_rgba8();
        image::imageops::invert(&mut rgba);
        Value::Image(ImageValue::from_rgba(rgba))
    }

    fn clone_box(&self) -> Box<dyn Operator> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::NodeId;
    use image::Rgba;

    fn solid(pixel: [u8; 4]) -> Value {
        Value::Image(ImageValue::from_rgba(RgbaImage::from_pixel(3, 2, Rgba(pixel))))
    }

    fn first_pixel(value: &Value) -> [u8; 4] {
        value.as_image().unwrap().to_rgba8().get_pixel(0, 0).0
    }

    fn run(operator: &dyn Operator, values: Vec<Value>) -> Value {
        operator.evaluate(&InputValues::new(NodeId::new(), values))
    }

    #[test]
    fn test_brightness() {
        let out = run(&Brightness, vec![solid([100, 50, 200, 128]), Value::Float(1.2)]);
        assert_eq!(first_pixel(&out), [120, 60, 240, 128]);

        let out = run(&Brightness, vec![solid([100, 50, 200, 255]), Value::Float(2.0)]);
        assert_eq!(first_pixel(&out), [200, 100, 255, 255]);
    }

    #[test]
    fn test_contrast_around_mean() {
        let mut image = RgbaImage::from_pixel(2, 1, Rgba([100, 100, 100, 255]));
        image.put_pixel(1, 0, Rgba([200, 200, 200, 255]));
        let out = run(&Contrast, vec![Value::Image(ImageValue::from_rgba(image)), Value::Float(0.0)]);
        // Factor 0 collapses every pixel to the mean gray
        assert_eq!(first_pixel(&out), [150, 150, 150, 255]);
    }

    #[test]
    fn test_grayscale_is_opaque() {
        let out = run(&Grayscale, vec![solid([255, 0, 0, 10])]);
        let [r, g, b, a] = first_pixel(&out);
        assert_eq!(r, g);
        assert_eq!(g, b);
        assert_eq!(a, 255);
    }

    #[test]
    fn test_invert_keeps_alpha() {
        let out = run(&Invert, vec![solid([10, 20, 30, 40])]);
        assert_eq!(first_pixel(&out), [245, 235, 225, 40]);
    }

    #[test]
    fn test_missing_image_yields_none() {
        for operator in [
            Box::new(Brightness) as Box<dyn Operator>,
            Box::new(Contrast),
            Box::new(Grayscale),
            Box::new(Invert),
        ] {
            assert!(run(operator.as_ref(), vec![Value::None, Value::Float(1.0)]).is_none());
        }
    }

    #[test]
    fn test_factor_defaults() {
        let metadata = Contrast.metadata();
        assert_eq!(metadata.inputs[1].literal.as_deref(), Some("1.5"));
        assert_eq!(metadata.inputs[1].fallback, Value::Float(1.0));
    }
}

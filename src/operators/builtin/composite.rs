//! Compositing operators.

use crate::core::context::InputValues;
use crate::core::node::{Category, NodeMetadata, Operator};
use crate::core::socket::SocketDefinition;
use crate::core::types::{ImageValue, SocketType, Value};
use crate::operators::registry::OperatorRegistry;
use image::imageops::FilterType;
use image::RgbaImage;

/// Register composite operators.
pub fn register(registry: &mut OperatorRegistry) {
    registry.register(|| Box::new(Layer));
    registry.register(|| Box::new(Mix));
}

/// Resize `image` to `(width, height)` unless it already matches.
fn fit_to(image: &ImageValue, width: u32, height: u32) -> RgbaImage {
    let rgba = image.to_rgba8();
    if rgba.dimensions() == (width, height) {
        rgba
    } else {
        image::imageops::resize(&rgba, width, height, FilterType::CatmullRom)
    }
}

/// Alpha-composites a foreground over a background.
///
/// The foreground is stretched to the background's size. Either input alone
/// passes through.
#[derive(Debug, Clone)]
pub struct Layer;

impl Operator for Layer {
    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::builder("layer", "Layer (Add)")
            .description("Composite a foreground image over a background")
            .category(Category::Composite)
            .input(SocketDefinition::input("Background", SocketType::Image))
            .input(SocketDefinition::input("Foreground", SocketType::Image))
            .output(SocketDefinition::output("Combined", SocketType::Image))
            .tags(["overlay", "stack"])
            .build()
    }

    fn evaluate(&self, inputs: &InputValues) -> Value {
        match (inputs.image(0), inputs.image(1)) {
            (Some(background), Some(foreground)) => {
                let mut combined = background.to_rgba8();
                let (width, height) = combined.dimensions();
                let foreground = fit_to(foreground, width, height);
                image::imageops::overlay(&mut combined, &foreground, 0, 0);
                Value::Image(ImageValue::from_rgba(combined))
            }
            (Some(only), None) | (None, Some(only)) => Value::Image(only.clone()),
            (None, None) => Value::None,
        }
    }

    fn clone_box(&self) -> Box<dyn Operator> {
        Box::new(self.clone())
    }
}

/// Linear blend of two images: `a * (1 - factor) + b * factor`.
///
/// Image B is stretched to A's size. Either input alone passes through.
#[derive(Debug, Clone)]
pub struct Mix;

impl Operator for Mix {
    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::builder("mix", "Mix (Blend)")
            .description("Blend two images by a factor")
            .category(Category::Composite)
            .input(SocketDefinition::input("Img A", SocketType::Image))
            .input(SocketDefinition::input("Img B", SocketType::Image))
            .input(
                SocketDefinition::input("Factor", SocketType::Float)
                    .with_literal("0.5")
                    .with_fallback(0.5)
                    .with_description("0.0 is all A, 1.0 is all B"),
            )
            .output(SocketDefinition::output("Image", SocketType::Image))
            .tags(["blend", "crossfade"])
            .build()
    }

    fn evaluate(&self, inputs: &InputValues) -> Value {
        let factor = inputs.float_or(2, 0.5);
        match (inputs.image(0), inputs.image(1)) {
            (Some(a), Some(b)) => {
                let mut result = a.to_rgba8();
                let (width, height) = result.dimensions();
                let b = fit_to(b, width, height);
                for (pixel, other) in result.pixels_mut().zip(b.pixels()) {
                    for (channel, target) in pixel.0.iter_mut().zip(other.0) {
                        let blended = *channel as f64 + (target as f64 - *channel as f64) * factor;
                        *channel = blended.round().clamp(0.0, 255.0) as u8;
                    }
                }
                Value::Image(ImageValue::from_rgba(result))
            }
            (Some(only), None) | (None, Some(only)) => Value::Image(only.clone()),
            (None, None) => Value::None,
        }
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

    fn solid(width: u32, height: u32, pixel: [u8; 4]) -> Value {
        Value::Image(ImageValue::from_rgba(RgbaImage::from_pixel(width, height, Rgba(pixel))))
    }

    fn run(operator: &dyn Operator, values: Vec<Value>) -> Value {
        operator.evaluate(&InputValues::new(NodeId::new(), values))
    }

    #[test]
    fn test_layer_composites_foreground() {
        let out = run(&Layer, vec![solid(4, 4, [0, 0, 255, 255]), solid(2, 2, [255, 0, 0, 255])]);
        let image = out.as_image().unwrap().to_rgba8();
        assert_eq!(image.dimensions(), (4, 4));
        assert_eq!(image.get_pixel(3, 3).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_layer_transparent_foreground_keeps_background() {
        let out = run(&Layer, vec![solid(2, 2, [0, 0, 255, 255]), solid(2, 2, [255, 0, 0, 0])]);
        assert_eq!(out.as_image().unwrap().to_rgba8().get_pixel(0, 0).0, [0, 0, 255, 255]);
    }

    #[test]
    fn test_single_input_passes_through() {
        let background = solid(2, 2, [1, 2, 3, 255]);
        assert_eq!(run(&Layer, vec![background.clone(), Value::None]), background);
        assert_eq!(run(&Layer, vec![Value::None, background.clone()]), background);
        assert_eq!(run(&Mix, vec![Value::None, background.clone(), Value::Float(0.5)]), background);
        assert!(run(&Mix, vec![Value::None, Value::None, Value::Float(0.5)]).is_none());
    }

    #[test]
    fn test_mix_blends() {
        let out = run(
            &Mix,
            vec![solid(2, 2, [0, 0, 0, 255]), solid(3, 3, [200, 100, 50, 255]), Value::Float(0.5)],
        );
        let image = out.as_image().unwrap().to_rgba8();
        assert_eq!(image.dimensions(), (2, 2));
        assert_eq!(image.get_pixel(1, 1).0, [100, 50, 25, 255]);
    }
}

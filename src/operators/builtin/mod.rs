//! Built-in operator implementations.
//!
//! This module contains the standard operators that ship with PhotoNodes.
//! Every image operator yields `Value::None` when its image input is missing.

pub mod system;
mod color;
mod blur;
mod transform;
mod composite;
mod generators;

use crate::core::node::PassthroughOperator;
use crate::operators::registry::OperatorRegistry;

/// Largest width or height an operator will allocate.
pub const MAX_DIMENSION: u32 = 16_384;

/// Register all built-in operators.
///
/// The system source and sink are not registered: every graph already
/// holds exactly one of each.
pub fn register_all(registry: &mut OperatorRegistry) {
    color::register(registry);
    blur::register(registry);
    transform::register(registry);
    generators::register(registry);
    composite::register(registry);
    registry.register(|| Box::new(PassthroughOperator));
}

/// Convert a float size into a pixel dimension.
///
/// `None` below one pixel (or NaN); capped at [`MAX_DIMENSION`].
pub(crate) fn pixel_dimension(value: f64) -> Option<u32> {
    if value >= 1.0 {
        Some(value.min(MAX_DIMENSION as f64) as u32)
    } else {
        None
    }
}

// Re-export for direct access
pub use system::{OutputResult, image_source, output_result};
pub use color::{Brightness, Contrast, Grayscale, Invert};
pub use blur::GaussianBlur;
pub use transform::{CropCenter, Transform};
pub use composite::{Layer, Mix};
pub use generators::{DrawRect, FloatInput, MakeColor};

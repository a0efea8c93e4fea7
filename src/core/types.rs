//! Core value types that flow through the node graph.
//!
//! The type system uses an enum-based approach:
//! - Closed set of types: the editor exchanges images, scalars and colors
//! - Exhaustive matching catches missing cases at compile time
//! - `Any` is a wildcard tag, never a value kind

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Values that can flow along an edge.
///
/// `Value::None` is the "no value" state: the absence of a computed result,
/// distinct from any valid operator output. It propagates through the graph
/// instead of being raised as an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Image data
    Image(ImageValue),
    /// 64-bit floating point scalar
    Float(f64),
    /// RGBA color value
    Color(Color),
    /// Absence of a computed result
    None,
}

/// Image wrapper with shared pixel storage.
///
/// Images are stored behind an `Arc` so fan-out edges and held source values
/// can share one buffer. Operators always produce a fresh image.
#[derive(Debug, Clone)]
pub struct ImageValue {
    /// Image metadata (dimensions, alpha)
    pub metadata: ImageMetadata,
    data: Arc<DynamicImage>,
}

impl PartialEq for ImageValue {
    fn eq(&self, other: &Self) -> bool {
        self.metadata == other.metadata
            && (Arc::ptr_eq(&self.data, &other.data)
                || self.data.as_bytes() == other.data.as_bytes())
    }
}

/// Image metadata without the pixel data.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageMetadata {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Whether the image has an alpha channel
    pub has_alpha: bool,
}

/// RGBA color value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Color {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha (255 is opaque)
    pub a: u8,
}

/// Data-type tag carried by every socket.
///
/// The tag is fixed when the socket is created. `Any` is wildcard-compatible
/// with every other tag during connection validation; values crossing an
/// `Any` socket are passed through uninterpreted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SocketType {
    /// Raster image
    Image,
    /// Scalar
    Float,
    /// RGBA color
    Color,
    /// Wildcard
    Any,
}

// ============================================================================
// Value Implementation
// ============================================================================

impl Value {
    /// Get the socket type tag describing this value.
    pub fn get_type(&self) -> SocketType {
        match self {
            Value::Image(_) => SocketType::Image,
            Value::Float(_) => SocketType::Float,
            Value::Color(_) => SocketType::Color,
            Value::None => SocketType::Any,
        }
    }

    /// Try to get this value as an image reference.
    pub fn as_image(&self) -> Option<&ImageValue> {
        if let Value::Image(img) = self {
            Some(img)
        } else {
            None
        }
    }

    /// Try to get this value as a float.
    pub fn as_float(&self) -> Option<f64> {
        if let Value::Float(f) = self {
            Some(*f)
        } else {
            None
        }
    }

    /// Try to get this value as a color.
    pub fn as_color(&self) -> Option<Color> {
        if let Value::Color(c) = self {
            Some(*c)
        } else {
            None
        }
    }

    /// Check if this value is the "no value" state.
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Check if this value carries a result.
    pub fn is_present(&self) -> bool {
        !self.is_none()
    }
}

/// Shared "no value" for lookups that return a reference.
pub(crate) static NO_VALUE: Value = Value::None;

impl Default for Value {
    fn default() -> Self {
        Value::None
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<Color> for Value {
    fn from(value: Color) -> Self {
        Value::Color(value)
    }
}

impl From<ImageValue> for Value {
    fn from(value: ImageValue) -> Self {
        Value::Image(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Image(img) => write!(f, "Image({}x{})", img.metadata.width, img.metadata.height),
            Value::Float(fl) => write!(f, "{:.4}", fl),
            Value::Color(c) => write!(f, "Color({}, {}, {}, {})", c.r, c.g, c.b, c.a),
            Value::None => write!(f, "None"),
        }
    }
}

// ============================================================================
// SocketType Implementation
// ============================================================================

impl SocketType {
    /// Check whether two sockets with these tags may be connected.
    ///
    /// Symmetric: `a.compatible_with(b) == b.compatible_with(a)`.
    pub fn compatible_with(&self, other: &SocketType) -> bool {
        match (self, other) {
            (SocketType::Any, _) | (_, SocketType::Any) => true,
            (a, b) => a == b,
        }
    }

    /// Parse literal override text as a value of this type.
    ///
    /// Returns `None` for malformed text or for tags that have no literal
    /// form (images). `Any` accepts either a number or a color.
    pub fn parse_literal(&self, text: &str) -> Option<Value> {
        let text = text.trim();
        match self {
            SocketType::Float => parse_float(text).map(Value::Float),
            SocketType::Color => Color::parse(text).map(Value::Color),
            SocketType::Any => parse_float(text)
                .map(Value::Float)
                .or_else(|| Color::parse(text).map(Value::Color)),
            SocketType::Image => None,
        }
    }

    /// Whether sockets of this type can carry a literal override.
    pub fn accepts_literal(&self) -> bool {
        !matches!(self, SocketType::Image)
    }

    /// Get a human-readable name for this type.
    pub fn display_name(&self) -> &'static str {
        match self {
            SocketType::Image => "Image",
            SocketType::Float => "Float",
            SocketType::Color => "Color",
            SocketType::Any => "Any",
        }
    }

    /// All tags in display order.
    pub fn all() -> &'static [SocketType] {
        &[
            SocketType::Image,
            SocketType::Float,
            SocketType::Color,
            SocketType::Any,
        ]
    }
}

impl fmt::Display for SocketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

fn parse_float(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

// ============================================================================
// ImageValue Implementation
// ============================================================================

impl ImageValue {
    /// Create a new ImageValue from a DynamicImage.
    pub fn new(image: DynamicImage) -> Self {
        let has_alpha = image.color().has_alpha();
        Self {
            metadata: ImageMetadata {
                width: image.width(),
                height: image.height(),
                has_alpha,
            },
            data: Arc::new(image),
        }
    }

    /// Create an ImageValue from an RGBA buffer.
    pub fn from_rgba(buffer: image::RgbaImage) -> Self {
        Self::new(DynamicImage::ImageRgba8(buffer))
    }

    /// Load an image from a file path, converted to RGBA.
    ///
    /// This is host-side I/O; the graph itself never touches the filesystem.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, image::ImageError> {
        let image = image::open(path.as_ref())?;
        Ok(Self::new(DynamicImage::ImageRgba8(image.to_rgba8())))
    }

    /// Get a shared reference to the underlying image.
    pub fn get_image(&self) -> &DynamicImage {
        &self.data
    }

    /// Copy the pixels out as an RGBA buffer.
    pub fn to_rgba8(&self) -> image::RgbaImage {
        self.data.to_rgba8()
    }

    /// Image dimensions as `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.metadata.width, self.metadata.height)
    }
}

// ============================================================================
// Color Implementation
// ============================================================================

impl Color {
    /// Create a new color from RGBA components.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create a color from RGB components (alpha = 255).
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse a hex color string.
    ///
    /// Supports formats: "#RGB", "#RGBA", "#RRGGBB", "#RRGGBBAA"
    pub fn from_hex(hex: &str) -> Result<Self, String> {
        let hex = hex.trim_start_matches('#');
        if !hex.is_ascii() {
            return Err(format!("Invalid hex color: {}", hex));
        }
        let short = |i: usize| -> Result<u8, String> {
            u8::from_str_radix(&hex[i..i + 1], 16)
                .map(|v| v * 17)
                .map_err(|e| e.to_string())
        };
        let long = |i: usize| -> Result<u8, String> {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| e.to_string())
        };

        match hex.len() {
            3 => Ok(Self::rgb(short(0)?, short(1)?, short(2)?)),
            4 => Ok(Self::new(short(0)?, short(1)?, short(2)?, short(3)?)),
            6 => Ok(Self::rgb(long(0)?, long(2)?, long(4)?)),
            8 => Ok(Self::new(long(0)?, long(2)?, long(4)?, long(6)?)),
            _ => Err(format!(
                "Invalid hex color format: expected 3, 4, 6, or 8 characters, got {}",
                hex.len()
            )),
        }
    }

    /// Parse literal text: either a `#` hex code or comma-separated
    /// `r, g, b[, a]` components in 0..=255.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.starts_with('#') {
            return Self::from_hex(text).ok();
        }

        let parts: Vec<u8> = text
            .split(',')
            .map(|p| p.trim().parse::<u8>())
            .collect::<Result<_, _>>()
            .ok()?;
        match parts.as_slice() {
            [r, g, b] => Some(Self::rgb(*r, *g, *b)),
            [r, g, b, a] => Some(Self::new(*r, *g, *b, *a)),
            _ => None,
        }
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    /// Convert to image crate's Rgba type.
    pub fn to_rgba(&self) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, self.a])
    }

    /// Common colors
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const TRANSPARENT: Color = Color::new(0, 0, 0, 0);
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_type_compatibility() {
        assert!(SocketType::Image.compatible_with(&SocketType::Image));
        assert!(SocketType::Any.compatible_with(&SocketType::Image));
        assert!(SocketType::Color.compatible_with(&SocketType::Any));
        assert!(!SocketType::Float.compatible_with(&SocketType::Color));
        assert!(!SocketType::Color.compatible_with(&SocketType::Float));
    }

    #[test]
    fn test_parse_float_literal() {
        assert_eq!(SocketType::Float.parse_literal("1.2"), Some(Value::Float(1.2)));
        assert_eq!(SocketType::Float.parse_literal("  3 "), Some(Value::Float(3.0)));
        assert_eq!(SocketType::Float.parse_literal("abc"), None);
        assert_eq!(SocketType::Float.parse_literal(""), None);
        assert_eq!(SocketType::Float.parse_literal("inf"), None);
    }

    #[test]
    fn test_parse_color_literal() {
        assert_eq!(
            SocketType::Color.parse_literal("#FF0000"),
            Some(Value::Color(Color::RED))
        );
        assert_eq!(
            SocketType::Color.parse_literal("0, 128, 255"),
            Some(Value::Color(Color::rgb(0, 128, 255)))
        );
        assert_eq!(SocketType::Color.parse_literal("300, 0, 0"), None);
        assert_eq!(SocketType::Color.parse_literal("#GG0000"), None);
    }

    #[test]
    fn test_image_has_no_literal_form() {
        assert_eq!(SocketType::Image.parse_literal("1.0"), None);
        assert!(!SocketType::Image.accepts_literal());
    }

    #[test]
    fn test_any_literal_prefers_number() {
        assert_eq!(SocketType::Any.parse_literal("2"), Some(Value::Float(2.0)));
        assert_eq!(
            SocketType::Any.parse_literal("#000"),
            Some(Value::Color(Color::BLACK))
        );
    }

    #[test]
    fn test_color_hex_round_trip() {
        let color = Color::from_hex("#00FF0080").unwrap();
        assert_eq!(color, Color::new(0, 255, 0, 128));
        assert_eq!(color.to_hex(), "#00FF0080");
        assert_eq!(Color::from_hex("F00").unwrap(), Color::RED);
    }

    #[test]
    fn test_image_value_equality_compares_pixels() {
        let a = ImageValue::from_rgba(image::RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 4])));
        let b = ImageValue::from_rgba(image::RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 4])));
        let c = ImageValue::from_rgba(image::RgbaImage::from_pixel(2, 2, image::Rgba([9, 2, 3, 4])));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.metadata.has_alpha);
    }

    #[test]
    fn test_value_type_inference() {
        assert_eq!(Value::Float(3.5).get_type(), SocketType::Float);
        assert_eq!(Value::Color(Color::WHITE).get_type(), SocketType::Color);
        assert_eq!(Value::None.get_type(), SocketType::Any);
        assert!(Value::None.is_none());
        assert!(Value::Float(0.0).is_present());
    }
}

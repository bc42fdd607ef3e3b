//! Math utilities and types
//!
//! Provides the small set of value types material properties are made of.

pub use nalgebra::Vector2;

/// 2D vector type (texture tiling and offset)
pub type Vec2 = Vector2<f32>;

/// RGBA color as stored in a serialized material
///
/// Components are kept exactly as read. No gamma conversion or clamping is
/// applied, HDR colors routinely exceed 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red component
    pub r: f32,
    /// Green component
    pub g: f32,
    /// Blue component
    pub b: f32,
    /// Alpha component
    pub a: f32,
}

impl Color {
    /// Create a new color from its four components
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Default texture tiling (1, 1)
pub fn unit_scale() -> Vec2 {
    Vec2::new(1.0, 1.0)
}

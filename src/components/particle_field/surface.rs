//! Drawing-target abstraction.
//!
//! The field owns exactly one surface. Browser builds use the canvas
//! implementation in `render`; anything else implementing these traits can
//! host the field.

use glam::Vec2;

use super::error::FieldError;
use super::theme::Color;

/// Container dimensions in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
	pub width: f64,
	pub height: f64,
}

impl Size {
	pub const fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}

	/// True when either dimension is zero (or not a usable number).
	pub fn is_empty(&self) -> bool {
		!(self.width > 0.0 && self.height > 0.0)
	}

	pub fn center(&self) -> Vec2 {
		Vec2::new(self.width as f32 / 2.0, self.height as f32 / 2.0)
	}

	pub fn as_vec2(&self) -> Vec2 {
		Vec2::new(self.width as f32, self.height as f32)
	}
}

/// How overlapping sprites combine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Blend {
	#[default]
	Normal,
	Additive,
}

/// One round point, in surface pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sprite {
	pub x: f64,
	pub y: f64,
	pub radius: f64,
	pub color: Color,
}

/// Everything a surface needs to present one frame.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
	pub sprites: &'a [Sprite],
	pub blend: Blend,
}

/// A drawing target sized to its container.
pub trait RenderSurface {
	/// Resize the drawing buffer to `size`.
	fn resize(&mut self, size: Size);

	/// Current dimensions.
	fn size(&self) -> Size;

	/// Clear and draw one frame.
	fn present(&mut self, frame: &Frame<'_>);

	/// Release the drawing buffer and any graphics resources.
	fn release(&mut self);
}

/// Acquires surfaces on demand, so creation can be deferred until the
/// container has a usable size.
pub trait SurfaceProvider {
	type Surface: RenderSurface;

	fn acquire(&mut self, size: Size) -> Result<Self::Surface, FieldError>;
}

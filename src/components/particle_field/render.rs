//! Canvas 2D rendering for the particle field.
//!
//! [`CanvasProvider`] hands out a [`CanvasSurface`] for the component's
//! canvas element. The surface keeps its backing store at the device pixel
//! ratio (capped at 2) while all drawing happens in CSS pixels.

use std::f64::consts::PI;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use super::error::FieldError;
use super::shading::BrightnessMap;
use super::surface::{Blend, Frame, RenderSurface, Size, SurfaceProvider};
use super::theme::Color;

const MAX_PIXEL_RATIO: f64 = 2.0;

fn pixel_ratio() -> f64 {
	web_sys::window()
		.map(|w| w.device_pixel_ratio())
		.filter(|r| r.is_finite() && *r > 0.0)
		.unwrap_or(1.0)
		.min(MAX_PIXEL_RATIO)
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, FieldError> {
	canvas
		.get_context("2d")
		.map_err(|e| FieldError::SurfaceUnavailable(format!("{e:?}")))?
		.ok_or_else(|| FieldError::SurfaceUnavailable("no 2d context".into()))?
		.dyn_into()
		.map_err(|_| FieldError::SurfaceUnavailable("unexpected context type".into()))
}

/// Acquires 2D contexts on one canvas element.
pub struct CanvasProvider {
	canvas: HtmlCanvasElement,
}

impl CanvasProvider {
	pub fn new(canvas: HtmlCanvasElement) -> Self {
		Self { canvas }
	}
}

impl SurfaceProvider for CanvasProvider {
	type Surface = CanvasSurface;

	fn acquire(&mut self, size: Size) -> Result<CanvasSurface, FieldError> {
		let ctx = context_2d(&self.canvas)?;
		let mut surface = CanvasSurface {
			canvas: self.canvas.clone(),
			ctx,
			size,
			pixel_ratio: pixel_ratio(),
		};
		surface.resize(size);
		Ok(surface)
	}
}

/// A canvas element plus its 2D context.
pub struct CanvasSurface {
	canvas: HtmlCanvasElement,
	ctx: CanvasRenderingContext2d,
	size: Size,
	pixel_ratio: f64,
}

impl RenderSurface for CanvasSurface {
	fn resize(&mut self, size: Size) {
		self.size = size;
		self.canvas
			.set_width((size.width * self.pixel_ratio).round() as u32);
		self.canvas
			.set_height((size.height * self.pixel_ratio).round() as u32);
	}

	fn size(&self) -> Size {
		self.size
	}

	fn present(&mut self, frame: &Frame<'_>) {
		let ctx = &self.ctx;
		let _ = ctx.set_transform(self.pixel_ratio, 0.0, 0.0, self.pixel_ratio, 0.0, 0.0);
		ctx.clear_rect(0.0, 0.0, self.size.width, self.size.height);

		let _ = ctx.set_global_composite_operation(match frame.blend {
			Blend::Normal => "source-over",
			Blend::Additive => "lighter",
		});

		let mut current: Option<Color> = None;
		for sprite in frame.sprites {
			if sprite.radius <= 0.0 {
				continue;
			}
			if current != Some(sprite.color) {
				ctx.set_fill_style_str(&sprite.color.to_css());
				current = Some(sprite.color);
			}
			ctx.begin_path();
			let _ = ctx.arc(sprite.x, sprite.y, sprite.radius, 0.0, PI * 2.0);
			ctx.fill();
		}

		let _ = ctx.set_global_composite_operation("source-over");
	}

	fn release(&mut self) {
		let _ = self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
		self.ctx.clear_rect(
			0.0,
			0.0,
			self.canvas.width() as f64,
			self.canvas.height() as f64,
		);
		// Shrinking the backing store frees its pixel memory.
		self.canvas.set_width(0);
		self.canvas.set_height(0);
	}
}

/// Draw `image` scaled to `size` on an offscreen canvas and read back its
/// brightness.
pub fn sample_image(
	image: &HtmlImageElement,
	size: Size,
	invert: bool,
) -> Result<BrightnessMap, FieldError> {
	let (w, h) = (size.width.round() as u32, size.height.round() as u32);
	if w == 0 || h == 0 {
		return Err(FieldError::ImageSample(format!("empty target {w}x{h}")));
	}

	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or_else(|| FieldError::ImageSample("no document".into()))?;
	let canvas: HtmlCanvasElement = document
		.create_element("canvas")
		.map_err(|e| FieldError::ImageSample(format!("{e:?}")))?
		.dyn_into()
		.map_err(|_| FieldError::ImageSample("not a canvas".into()))?;
	canvas.set_width(w);
	canvas.set_height(h);

	let ctx = context_2d(&canvas)?;
	ctx.draw_image_with_html_image_element_and_dw_and_dh(image, 0.0, 0.0, w as f64, h as f64)
		.map_err(|e| FieldError::ImageSample(format!("{e:?}")))?;
	// Throws for cross-origin images served without CORS headers.
	let pixels = ctx
		.get_image_data(0.0, 0.0, w as f64, h as f64)
		.map_err(|e| FieldError::ImageSample(format!("{e:?}")))?
		.data();

	BrightnessMap::from_rgba(w as usize, h as usize, &pixels, invert)
		.ok_or_else(|| FieldError::ImageSample("short pixel buffer".into()))
}

//! Force-field shading: palette, source-image brightness, and per-particle
//! colour and stroke size.

use super::config::LiveConfig;
use super::theme::Color;

/// Number of shades in a generated palette.
pub const PALETTE_SIZE: usize = 12;

/// Single-hue palette running from near-white to near-black.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
	hue: f64,
	saturation: f64,
	shades: Vec<Color>,
}

impl Palette {
	pub fn new(hue: f64, saturation: f64) -> Self {
		let shades = (0..PALETTE_SIZE)
			.map(|i| {
				let lightness = 95.0 - 90.0 * i as f64 / (PALETTE_SIZE - 1) as f64;
				Color::hsl(hue, saturation, lightness)
			})
			.collect();
		Self {
			hue,
			saturation,
			shades,
		}
	}

	/// Regenerate the shades if the hue or saturation changed.
	pub fn refresh(&mut self, hue: f64, saturation: f64) {
		if self.hue != hue || self.saturation != saturation {
			*self = Self::new(hue, saturation);
		}
	}

	pub fn shade(&self, index: usize) -> Color {
		self.shades[index.min(self.shades.len() - 1)]
	}

	pub fn len(&self) -> usize {
		self.shades.len()
	}
}

/// Grayscale brightness samples (0-255) covering the render surface.
#[derive(Clone, Debug, PartialEq)]
pub struct BrightnessMap {
	width: usize,
	height: usize,
	pixels: Vec<u8>,
}

impl BrightnessMap {
	/// A 1x1 map returning `value` everywhere.
	pub fn uniform(value: u8) -> Self {
		Self {
			width: 1,
			height: 1,
			pixels: vec![value],
		}
	}

	/// Build a map from RGBA bytes, converting to Rec. 709 luma.
	///
	/// Returns `None` when `rgba` is shorter than `width * height * 4` or the
	/// map would be empty.
	pub fn from_rgba(width: usize, height: usize, rgba: &[u8], invert: bool) -> Option<Self> {
		let len = width.checked_mul(height)?;
		if len == 0 || rgba.len() < len * 4 {
			return None;
		}
		let pixels = rgba
			.chunks_exact(4)
			.take(len)
			.map(|px| {
				let luma =
					0.2126 * px[0] as f64 + 0.7152 * px[1] as f64 + 0.0722 * px[2] as f64;
				let gray = luma.round().clamp(0.0, 255.0) as u8;
				if invert { 255 - gray } else { gray }
			})
			.collect();
		Some(Self {
			width,
			height,
			pixels,
		})
	}

	pub fn size(&self) -> (usize, usize) {
		(self.width, self.height)
	}

	/// Sample at a pixel position, clamping to the map bounds.
	pub fn sample(&self, x: f32, y: f32) -> u8 {
		let clamp = |v: f32, max: usize| (v.floor().max(0.0) as usize).min(max - 1);
		let (px, py) = (clamp(x, self.width), clamp(y, self.height));
		self.pixels[px + py * self.width]
	}
}

impl Default for BrightnessMap {
	fn default() -> Self {
		Self::uniform(0)
	}
}

/// Colour and stroke width for one visible particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shade {
	pub color: Color,
	pub stroke: f64,
}

/// Decide whether and how a particle is drawn.
///
/// `distance` is the particle's distance to the magnifier centre.
pub fn shade(brightness: u8, distance: f64, live: &LiveConfig, palette: &Palette) -> Option<Shade> {
	let b = brightness as f64;
	let visible = if live.invert_wireframe {
		b < live.threshold
	} else {
		b > live.threshold
	};
	if !visible {
		return None;
	}

	let t = b / 255.0;
	let index = (t * (palette.len() - 1) as f64).floor() as usize;
	let mut stroke = live.min_stroke + t * (live.max_stroke - live.min_stroke);
	if live.magnifier_enabled && distance < live.magnifier_radius {
		// Twice the size at the centre, tapering to normal at the edge.
		stroke *= 2.0 - distance / live.magnifier_radius;
	}

	Some(Shade {
		color: palette.shade(index),
		stroke,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn palette_runs_light_to_dark() {
		let palette = Palette::new(210.0, 100.0);
		assert_eq!(palette.len(), PALETTE_SIZE);
		let lightest = palette.shade(0);
		let darkest = palette.shade(PALETTE_SIZE - 1);
		let sum = |c: Color| c.r as u32 + c.g as u32 + c.b as u32;
		assert!(sum(lightest) > sum(darkest));
		assert_eq!(palette.shade(99), darkest);
	}

	#[test]
	fn palette_refresh_only_on_change() {
		let mut palette = Palette::new(210.0, 100.0);
		let before = palette.clone();
		palette.refresh(210.0, 100.0);
		assert_eq!(palette, before);
		palette.refresh(0.0, 100.0);
		assert_ne!(palette, before);
	}

	#[test]
	fn rgba_converts_to_inverted_gray() {
		let rgba = [255, 255, 255, 255, 0, 0, 0, 255];
		let map = BrightnessMap::from_rgba(2, 1, &rgba, false).unwrap();
		assert_eq!(map.sample(0.0, 0.0), 255);
		assert_eq!(map.sample(1.5, 0.0), 0);

		let inverted = BrightnessMap::from_rgba(2, 1, &rgba, true).unwrap();
		assert_eq!(inverted.sample(0.0, 0.0), 0);
		assert_eq!(inverted.sample(1.0, 0.0), 255);
	}

	#[test]
	fn short_pixel_buffer_is_rejected() {
		assert_eq!(BrightnessMap::from_rgba(2, 2, &[0; 8], false), None);
		assert_eq!(BrightnessMap::from_rgba(0, 2, &[], false), None);
	}

	#[test]
	fn sampling_clamps_out_of_bounds() {
		let rgba = [10, 10, 10, 255, 200, 200, 200, 255];
		let map = BrightnessMap::from_rgba(2, 1, &rgba, false).unwrap();
		assert_eq!(map.sample(-40.0, -3.0), 10);
		assert_eq!(map.sample(900.0, 900.0), 200);
	}

	#[test]
	fn threshold_controls_visibility() {
		let palette = Palette::new(210.0, 100.0);
		let mut live = LiveConfig {
			threshold: 100.0,
			..LiveConfig::default()
		};
		assert!(shade(50, 1000.0, &live, &palette).is_some());
		assert!(shade(150, 1000.0, &live, &palette).is_none());

		live.invert_wireframe = false;
		assert!(shade(50, 1000.0, &live, &palette).is_none());
		assert!(shade(150, 1000.0, &live, &palette).is_some());
	}

	#[test]
	fn stroke_follows_brightness_and_magnifier() {
		let palette = Palette::new(210.0, 100.0);
		let live = LiveConfig {
			threshold: 255.0,
			min_stroke: 2.0,
			max_stroke: 6.0,
			magnifier_radius: 100.0,
			..LiveConfig::default()
		};

		let dark = shade(0, 1000.0, &live, &palette).unwrap();
		assert_eq!(dark.stroke, 2.0);
		assert_eq!(dark.color, palette.shade(0));

		let centre = shade(0, 0.0, &live, &palette).unwrap();
		assert_eq!(centre.stroke, 4.0);
		let halfway = shade(0, 50.0, &live, &palette).unwrap();
		assert_eq!(halfway.stroke, 3.0);
	}
}

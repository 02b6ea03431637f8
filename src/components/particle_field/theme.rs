//! Colour handling for the particle field.
//!
//! Colours arrive as CSS strings in the configuration and leave as CSS
//! strings for the canvas; in between they are plain RGBA values.

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Neutral grey used when a colour string cannot be understood.
	pub const FALLBACK: Color = Color::rgb(128, 128, 128);

	/// Build a colour from HSL components.
	///
	/// `hue` is in degrees, `saturation` and `lightness` in percent.
	pub fn hsl(hue: f64, saturation: f64, lightness: f64) -> Self {
		let h = hue.rem_euclid(360.0) / 360.0;
		let s = (saturation / 100.0).clamp(0.0, 1.0);
		let l = (lightness / 100.0).clamp(0.0, 1.0);

		if s == 0.0 {
			let v = to_channel(l);
			return Self::rgb(v, v, v);
		}

		let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
		let p = 2.0 * l - q;
		Self::rgb(
			to_channel(hue_to_rgb(p, q, h + 1.0 / 3.0)),
			to_channel(hue_to_rgb(p, q, h)),
			to_channel(hue_to_rgb(p, q, h - 1.0 / 3.0)),
		)
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

fn to_channel(v: f64) -> u8 {
	(v * 255.0).round().clamp(0.0, 255.0) as u8
}

fn hue_to_rgb(p: f64, q: f64, t: f64) -> f64 {
	let t = t.rem_euclid(1.0);
	if t < 1.0 / 6.0 {
		p + (q - p) * 6.0 * t
	} else if t < 0.5 {
		q
	} else if t < 2.0 / 3.0 {
		p + (q - p) * (2.0 / 3.0 - t) * 6.0
	} else {
		p
	}
}

/// Parses a CSS color string into a [`Color`].
/// Supports hex (`#RGB`, `#RRGGBB`) and `rgb()`/`rgba()` functional notation.
/// Anything else yields [`Color::FALLBACK`].
pub fn parse_color(color_str: &str) -> Color {
	let color_str = color_str.trim();
	if let Some(hex) = color_str.strip_prefix('#') {
		parse_hex(hex).unwrap_or(Color::FALLBACK)
	} else if color_str.starts_with("rgb") {
		let nums: Vec<&str> = color_str
			.trim_start_matches("rgba(")
			.trim_start_matches("rgb(")
			.trim_end_matches(')')
			.split(',')
			.collect();
		let channel = |i: usize| {
			nums.get(i)
				.and_then(|s| s.trim().parse::<u8>().ok())
				.unwrap_or(128)
		};
		let a = nums
			.get(3)
			.and_then(|s| s.trim().parse().ok())
			.unwrap_or(1.0);
		Color::rgba(channel(0), channel(1), channel(2), a)
	} else {
		Color::FALLBACK
	}
}

fn parse_hex(hex: &str) -> Option<Color> {
	if !hex.is_ascii() {
		return None;
	}
	match hex.len() {
		6 => Some(Color::rgb(
			u8::from_str_radix(&hex[0..2], 16).ok()?,
			u8::from_str_radix(&hex[2..4], 16).ok()?,
			u8::from_str_radix(&hex[4..6], 16).ok()?,
		)),
		3 => {
			let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map(|v| v * 17);
			Some(Color::rgb(digit(0).ok()?, digit(1).ok()?, digit(2).ok()?))
		}
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_long_and_short_hex() {
		assert_eq!(parse_color("#4A5568"), Color::rgb(0x4a, 0x55, 0x68));
		assert_eq!(parse_color("#fff"), Color::rgb(255, 255, 255));
	}

	#[test]
	fn parses_rgba_notation() {
		assert_eq!(
			parse_color("rgba(10, 20, 30, 0.5)"),
			Color::rgba(10, 20, 30, 0.5)
		);
		assert_eq!(parse_color("rgb(1,2,3)"), Color::rgb(1, 2, 3));
	}

	#[test]
	fn unknown_strings_fall_back_to_grey() {
		assert_eq!(parse_color("papayawhip"), Color::FALLBACK);
		assert_eq!(parse_color("#12"), Color::FALLBACK);
		assert_eq!(parse_color("#zzzzzz"), Color::FALLBACK);
	}

	#[test]
	fn hsl_primaries() {
		assert_eq!(Color::hsl(0.0, 100.0, 50.0), Color::rgb(255, 0, 0));
		assert_eq!(Color::hsl(120.0, 100.0, 50.0), Color::rgb(0, 255, 0));
		assert_eq!(Color::hsl(240.0, 100.0, 50.0), Color::rgb(0, 0, 255));
		assert_eq!(Color::hsl(480.0, 100.0, 50.0), Color::rgb(0, 255, 0));
	}

	#[test]
	fn hsl_extremes_are_white_and_black() {
		assert_eq!(Color::hsl(210.0, 100.0, 100.0), Color::rgb(255, 255, 255));
		assert_eq!(Color::hsl(210.0, 100.0, 0.0), Color::rgb(0, 0, 0));
		assert_eq!(Color::hsl(210.0, 0.0, 50.0), Color::rgb(128, 128, 128));
	}

	#[test]
	fn css_output_drops_alpha_when_opaque() {
		assert_eq!(Color::rgb(255, 0, 16).to_css(), "#ff0010");
		assert_eq!(
			Color::rgb(1, 2, 3).with_alpha(0.25).to_css(),
			"rgba(1, 2, 3, 0.25)"
		);
	}
}

//! Field configuration.
//!
//! [`FieldConfig`] is fixed for the lifetime of one initialization: changing
//! it tears the field down and builds a new one. [`LiveConfig`] holds the
//! parameters that may be tweaked while the field keeps running; the frame
//! step reads it by reference every tick.

use serde::Deserialize;

/// Motion model and layout of the field.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Profile {
	/// 3D volume of particles drifting on sine waves, slowly rotating,
	/// with a parallax shift toward the pointer.
	#[default]
	Ambient,
	/// 2D grid of particles pushed away from the pointer and springing back.
	ForceField,
}

/// Initialization configuration. Every field is optional in JSON.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldConfig {
	pub profile: Profile,
	/// Number of particles for the ambient profile. Negative counts are treated
	/// as zero and counts above [`MAX_PARTICLE_COUNT`] are capped.
	pub particle_count: i64,
	/// Point size in world units (ambient).
	pub particle_size: f64,
	/// CSS colour of ambient particles.
	pub color: String,
	pub opacity: f64,
	/// Animation speed multiplier.
	pub speed: f64,
	/// Layout seed. `None` picks a fresh seed at mount.
	pub seed: Option<u32>,
	/// Source image for force-field brightness.
	pub image_url: Option<String>,
	/// Palette hue in degrees.
	pub hue: f64,
	/// Palette saturation in percent.
	pub saturation: f64,
	/// Brightness cut-off (0-255) deciding which particles are drawn.
	pub threshold: f64,
	pub min_stroke: f64,
	pub max_stroke: f64,
	/// Grid pitch in pixels. Lower is denser.
	pub spacing: f64,
	/// Scale of the placement jitter noise. Zero keeps the grid regular.
	pub noise_scale: f64,
	/// Probability that a grid cell holds a particle; values above 1 keep every cell.
	pub density: f64,
	pub invert_image: bool,
	pub invert_wireframe: bool,
	pub magnifier_enabled: bool,
	/// Influence radius around the pointer, in pixels.
	pub magnifier_radius: f64,
	pub force_strength: f64,
	pub friction: f64,
	pub restore_speed: f64,
	/// Fraction of the remaining distance the magnifier covers toward the pointer per frame.
	pub pointer_inertia: f64,
}

impl Default for FieldConfig {
	fn default() -> Self {
		Self {
			profile: Profile::Ambient,
			particle_count: 1500,
			particle_size: 1.5,
			color: "#4A5568".to_string(),
			opacity: 0.6,
			speed: 0.5,
			seed: None,
			image_url: None,
			hue: 210.0,
			saturation: 100.0,
			threshold: 255.0,
			min_stroke: 2.0,
			max_stroke: 6.0,
			spacing: 10.0,
			noise_scale: 0.0,
			density: 2.0,
			invert_image: true,
			invert_wireframe: true,
			magnifier_enabled: true,
			magnifier_radius: 150.0,
			force_strength: 10.0,
			friction: 0.9,
			restore_speed: 0.05,
			pointer_inertia: 0.1,
		}
	}
}

/// Smallest grid pitch accepted, keeps generation bounded.
pub const MIN_SPACING: f64 = 2.0;

/// Largest ambient particle count accepted.
pub const MAX_PARTICLE_COUNT: usize = 100_000;

/// Friction must stay below 1 or a pushed particle never loses speed.
pub const MAX_FRICTION: f64 = 0.99;

impl FieldConfig {
	/// Defaults for the cursor-repulsion profile.
	pub fn force_field() -> Self {
		Self {
			profile: Profile::ForceField,
			..Self::default()
		}
	}

	/// Clamp out-of-range values to safe minimums instead of failing.
	pub fn sanitized(&self) -> Self {
		let min_stroke = non_negative(self.min_stroke);
		Self {
			profile: self.profile,
			particle_count: self.count() as i64,
			particle_size: non_negative(self.particle_size),
			color: self.color.clone(),
			opacity: unit(self.opacity),
			speed: non_negative(self.speed),
			seed: self.seed,
			image_url: self.image_url.clone().filter(|url| !url.trim().is_empty()),
			hue: finite_or(self.hue, 0.0).rem_euclid(360.0),
			saturation: finite_or(self.saturation, 0.0).clamp(0.0, 100.0),
			threshold: finite_or(self.threshold, 0.0).clamp(0.0, 255.0),
			min_stroke,
			max_stroke: finite_or(self.max_stroke, min_stroke).max(min_stroke),
			spacing: finite_or(self.spacing, MIN_SPACING).max(MIN_SPACING),
			noise_scale: non_negative(self.noise_scale),
			density: non_negative(self.density),
			invert_image: self.invert_image,
			invert_wireframe: self.invert_wireframe,
			magnifier_enabled: self.magnifier_enabled,
			magnifier_radius: non_negative(self.magnifier_radius),
			force_strength: finite_or(self.force_strength, 0.0),
			friction: finite_or(self.friction, 0.0).clamp(0.0, MAX_FRICTION),
			restore_speed: unit(self.restore_speed),
			pointer_inertia: inertia(self.pointer_inertia),
		}
	}

	/// Particle count clamped to `0..=MAX_PARTICLE_COUNT`.
	pub fn count(&self) -> usize {
		usize::try_from(self.particle_count.max(0))
			.unwrap_or(usize::MAX)
			.min(MAX_PARTICLE_COUNT)
	}

	/// Initial live parameters for this configuration.
	pub fn live(&self) -> LiveConfig {
		LiveConfig {
			speed: self.speed,
			magnifier_enabled: self.magnifier_enabled,
			magnifier_radius: self.magnifier_radius,
			force_strength: self.force_strength,
			friction: self.friction,
			restore_speed: self.restore_speed,
			pointer_inertia: self.pointer_inertia,
			threshold: self.threshold,
			invert_wireframe: self.invert_wireframe,
			min_stroke: self.min_stroke,
			max_stroke: self.max_stroke,
			hue: self.hue,
			saturation: self.saturation,
		}
		.sanitized()
	}
}

/// Parameters that can change between frames without re-initialization.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct LiveConfig {
	pub speed: f64,
	pub magnifier_enabled: bool,
	pub magnifier_radius: f64,
	pub force_strength: f64,
	pub friction: f64,
	pub restore_speed: f64,
	pub pointer_inertia: f64,
	pub threshold: f64,
	pub invert_wireframe: bool,
	pub min_stroke: f64,
	pub max_stroke: f64,
	pub hue: f64,
	pub saturation: f64,
}

impl Default for LiveConfig {
	fn default() -> Self {
		FieldConfig::default().live()
	}
}

impl LiveConfig {
	pub fn sanitized(&self) -> Self {
		let min_stroke = non_negative(self.min_stroke);
		Self {
			speed: non_negative(self.speed),
			magnifier_enabled: self.magnifier_enabled,
			magnifier_radius: non_negative(self.magnifier_radius),
			force_strength: finite_or(self.force_strength, 0.0),
			friction: finite_or(self.friction, 0.0).clamp(0.0, MAX_FRICTION),
			restore_speed: unit(self.restore_speed),
			pointer_inertia: inertia(self.pointer_inertia),
			threshold: finite_or(self.threshold, 0.0).clamp(0.0, 255.0),
			invert_wireframe: self.invert_wireframe,
			min_stroke,
			max_stroke: finite_or(self.max_stroke, min_stroke).max(min_stroke),
			hue: finite_or(self.hue, 0.0).rem_euclid(360.0),
			saturation: finite_or(self.saturation, 0.0).clamp(0.0, 100.0),
		}
	}
}

fn finite_or(v: f64, fallback: f64) -> f64 {
	if v.is_finite() { v } else { fallback }
}

fn non_negative(v: f64) -> f64 {
	finite_or(v, 0.0).max(0.0)
}

fn unit(v: f64) -> f64 {
	finite_or(v, 0.0).clamp(0.0, 1.0)
}

// Zero inertia would pin the magnifier in place forever.
fn inertia(v: f64) -> f64 {
	let v = finite_or(v, 1.0);
	if v <= 0.0 { 1.0 } else { v.min(1.0) }
}

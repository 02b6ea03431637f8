//! Field simulation state.
//!
//! Owns the particle set, the vertex buffer and everything the per-frame
//! step reads or writes. Created once per initialization, then advanced by
//! the animation loop with [`FieldState::step`] and turned into sprites with
//! [`FieldState::compose`].

use glam::{Vec2, Vec3};

use super::config::{FieldConfig, LiveConfig, Profile};
use super::particles::{ParticleSet, VOLUME_EXTENT, VertexBuffer};
use super::pointer::PointerState;
use super::projection::{Camera, Rotation};
use super::rng::SeededRng;
use super::shading::{self, BrightnessMap, Palette};
use super::surface::{Blend, Frame, Size, Sprite};
use super::theme::{Color, parse_color};

/// Time added per frame at speed 1.0.
pub const TIME_STEP: f64 = 0.02;

/// Ambient wave amplitudes and frequencies.
const JITTER_AMPLITUDE: f32 = 0.5;
const WAVE_AMPLITUDE: f32 = 5.0;
const WAVE_FREQUENCY: f32 = 0.2;
const PARALLAX: f32 = 10.0;

/// Core field state combining particles, pointer and view parameters.
pub struct FieldState {
	profile: Profile,
	particles: ParticleSet,
	buffer: VertexBuffer,
	pointer: PointerState,
	pub time: f64,
	pub rotation: Rotation,
	camera: Camera,
	size: Size,
	ambient_color: Color,
	particle_size: f64,
	palette: Palette,
	brightness: BrightnessMap,
	sprites: Vec<Sprite>,
}

impl FieldState {
	/// Generate the particle set for `config` (already sanitized) at `size`.
	pub fn new(config: &FieldConfig, size: Size, seed: u32) -> Self {
		let mut rng = SeededRng::new(seed);
		let particles = match config.profile {
			Profile::Ambient => ParticleSet::volume(config.count(), VOLUME_EXTENT, &mut rng),
			Profile::ForceField => ParticleSet::grid(
				size.width,
				size.height,
				config.spacing,
				config.density,
				config.noise_scale,
				&mut rng,
			),
		};
		let buffer = VertexBuffer::from_particles(&particles);

		Self {
			profile: config.profile,
			sprites: Vec::with_capacity(particles.len()),
			particles,
			buffer,
			pointer: PointerState::centered_at(size.center()),
			time: 0.0,
			rotation: Rotation::default(),
			camera: Camera::new(size.as_vec2()),
			size,
			ambient_color: parse_color(&config.color).with_alpha(config.opacity),
			particle_size: config.particle_size,
			palette: Palette::new(config.hue, config.saturation),
			brightness: BrightnessMap::default(),
		}
	}

	pub fn profile(&self) -> Profile {
		self.profile
	}

	pub fn particles(&self) -> &ParticleSet {
		&self.particles
	}

	pub fn buffer(&self) -> &VertexBuffer {
		&self.buffer
	}

	pub fn buffer_mut(&mut self) -> &mut VertexBuffer {
		&mut self.buffer
	}

	pub fn size(&self) -> Size {
		self.size
	}

	pub fn camera(&self) -> &Camera {
		&self.camera
	}

	pub fn pointer(&self) -> &PointerState {
		&self.pointer
	}

	pub fn set_pointer(&mut self, position: Vec2) {
		self.pointer.set(position);
	}

	pub fn clear_pointer(&mut self) {
		self.pointer.clear();
	}

	pub fn set_brightness(&mut self, map: BrightnessMap) {
		self.brightness = map;
	}

	/// Track a new container size. Particles keep their origins.
	pub fn resize(&mut self, size: Size) {
		self.size = size;
		self.camera.set_viewport(size.as_vec2());
	}

	/// Advance one frame and rewrite the vertex buffer.
	pub fn step(&mut self, live: &LiveConfig) {
		self.time += TIME_STEP * live.speed;
		match self.profile {
			Profile::Ambient => self.drift(),
			Profile::ForceField => self.repel(live),
		}
		self.buffer.write(&self.particles);
	}

	/// Periodic drift plus pointer parallax. Offsets vanish at `time == 0`.
	fn drift(&mut self) {
		let t = self.time as f32;
		let m = self.pointer.latest().unwrap_or(Vec2::ZERO);

		for (i, p) in self.particles.iter_mut().enumerate() {
			let o = p.origin();
			let phase = i as f32;
			p.offset = Vec3::new(
				JITTER_AMPLITUDE * ((2.0 * t + phase).sin() - phase.sin()),
				WAVE_AMPLITUDE * ((WAVE_FREQUENCY * o.x + t).sin() - (WAVE_FREQUENCY * o.x).sin())
					+ PARALLAX * m.y,
				WAVE_AMPLITUDE * ((WAVE_FREQUENCY * o.y + t).cos() - (WAVE_FREQUENCY * o.y).cos())
					+ PARALLAX * m.x,
			);
		}

		self.rotation = Rotation {
			x: 0.0,
			y: t * 0.2,
			z: t * 0.05,
		};
	}

	/// Push particles away from the magnifier, damp, and spring back to rest.
	fn repel(&mut self, live: &LiveConfig) {
		self.pointer.follow(live.pointer_inertia as f32);

		let center = self.pointer.magnifier();
		let influence = live.magnifier_enabled && self.pointer.latest().is_some();
		let radius = live.magnifier_radius as f32;
		let strength = live.force_strength as f32;
		let friction = live.friction as f32;
		let restore = live.restore_speed as f32;

		for p in self.particles.iter_mut() {
			if influence {
				let away = p.origin().truncate() - center;
				let d = away.length();
				if d > 0.0 && d < radius {
					let push = away / d * (strength / d.max(1.0));
					p.velocity += push.extend(0.0);
				}
			}
			p.velocity *= friction;
			p.velocity += -p.offset * restore;
			p.offset += p.velocity;
		}
	}

	/// Turn the current vertex buffer into sprites for the surface.
	pub fn compose(&mut self, live: &LiveConfig) -> Frame<'_> {
		self.sprites.clear();

		let blend = match self.profile {
			Profile::Ambient => {
				let rotation = self.rotation.matrix();
				for v in self.buffer.vertices() {
					if let Some(projected) = self.camera.project(rotation * v) {
						self.sprites.push(Sprite {
							x: projected.screen.x as f64,
							y: projected.screen.y as f64,
							radius: self.particle_size * projected.scale as f64 / 2.0,
							color: self.ambient_color,
						});
					}
				}
				Blend::Additive
			}
			Profile::ForceField => {
				self.palette.refresh(live.hue, live.saturation);
				let center = self.pointer.magnifier();
				for v in self.buffer.vertices() {
					let brightness = self.brightness.sample(v.x, v.y);
					let distance = v.truncate().distance(center) as f64;
					if let Some(s) = shading::shade(brightness, distance, live, &self.palette) {
						self.sprites.push(Sprite {
							x: v.x as f64,
							y: v.y as f64,
							radius: s.stroke / 2.0,
							color: s.color,
						});
					}
				}
				Blend::Normal
			}
		};

		Frame {
			sprites: &self.sprites,
			blend,
		}
	}
}

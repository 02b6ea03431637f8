//! Particle storage and layout generation.

use glam::Vec3;

use super::rng::{SeededRng, value_noise};

/// Extent of the ambient volume in world units (x, y, z).
pub const VOLUME_EXTENT: Vec3 = Vec3::new(150.0, 100.0, 50.0);

/// A single rendered point.
///
/// The rest position is fixed at creation. Motion only ever changes the
/// offset, so the current position is always `origin + offset`.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
	origin: Vec3,
	pub offset: Vec3,
	pub velocity: Vec3,
}

impl Particle {
	pub fn at(origin: Vec3) -> Self {
		Self {
			origin,
			offset: Vec3::ZERO,
			velocity: Vec3::ZERO,
		}
	}

	pub fn origin(&self) -> Vec3 {
		self.origin
	}

	pub fn position(&self) -> Vec3 {
		self.origin + self.offset
	}
}

/// The full particle set of one initialization.
///
/// Generated once; never grown or shrunk afterwards.
#[derive(Clone, Debug, Default)]
pub struct ParticleSet {
	particles: Vec<Particle>,
}

impl ParticleSet {
	/// `count` particles spread uniformly over a box of `extent`, centred at the origin.
	pub fn volume(count: usize, extent: Vec3, rng: &mut SeededRng) -> Self {
		let particles = (0..count)
			.map(|_| {
				let x = rng.centered(extent.x);
				let y = rng.centered(extent.y);
				let z = rng.centered(extent.z);
				Particle::at(Vec3::new(x, y, z))
			})
			.collect();
		Self { particles }
	}

	/// Particles on a `spacing`-pitch grid covering `width` x `height` pixels.
	///
	/// Each cell is kept with probability `density` and nudged by up to half
	/// a cell using value noise sampled at `noise_scale`. A zero scale keeps
	/// the grid regular.
	pub fn grid(
		width: f64,
		height: f64,
		spacing: f64,
		density: f64,
		noise_scale: f64,
		rng: &mut SeededRng,
	) -> Self {
		let mut particles = Vec::new();
		if width <= 0.0 || height <= 0.0 || spacing <= 0.0 {
			return Self { particles };
		}

		let mut y = 0.0;
		while y < height {
			let mut x = 0.0;
			while x < width {
				if rng.next_f64() <= density {
					let (nx, ny) = if noise_scale > 0.0 {
						(
							value_noise(x * noise_scale, y * noise_scale) - 0.5,
							value_noise((x + 500.0) * noise_scale, (y + 500.0) * noise_scale) - 0.5,
						)
					} else {
						(0.0, 0.0)
					};
					particles.push(Particle::at(Vec3::new(
						(x + nx * spacing) as f32,
						(y + ny * spacing) as f32,
						0.0,
					)));
				}
				x += spacing;
			}
			y += spacing;
		}
		Self { particles }
	}

	pub fn len(&self) -> usize {
		self.particles.len()
	}

	pub fn is_empty(&self) -> bool {
		self.particles.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Particle> {
		self.particles.iter()
	}

	pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Particle> {
		self.particles.iter_mut()
	}
}

/// Interleaved `xyz` positions, rewritten in place once per frame.
///
/// The dirty flag tells the surface whether the contents changed since the
/// last upload.
#[derive(Clone, Debug, Default)]
pub struct VertexBuffer {
	data: Vec<f32>,
	dirty: bool,
}

impl VertexBuffer {
	pub fn from_particles(set: &ParticleSet) -> Self {
		let mut buffer = Self {
			data: vec![0.0; set.len() * 3],
			dirty: false,
		};
		buffer.write(set);
		buffer
	}

	/// Copy current positions into the buffer and flag it dirty.
	pub fn write(&mut self, set: &ParticleSet) {
		for (slot, p) in self.data.chunks_exact_mut(3).zip(set.iter()) {
			let pos = p.position();
			slot.copy_from_slice(&[pos.x, pos.y, pos.z]);
		}
		self.dirty = true;
	}

	/// Number of vertices.
	pub fn len(&self) -> usize {
		self.data.len() / 3
	}

	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	pub fn vertex(&self, i: usize) -> Vec3 {
		Vec3::from_slice(&self.data[i * 3..i * 3 + 3])
	}

	pub fn vertices(&self) -> impl Iterator<Item = Vec3> + '_ {
		self.data.chunks_exact(3).map(Vec3::from_slice)
	}

	pub fn is_dirty(&self) -> bool {
		self.dirty
	}

	/// Mark the contents as uploaded.
	pub fn mark_clean(&mut self) {
		self.dirty = false;
	}
}

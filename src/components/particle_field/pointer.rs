//! Pointer tracking.
//!
//! Pointer events arrive between frames and only record the latest
//! coordinate; the frame step reads it once per tick.

use glam::Vec2;

/// Coordinate space a profile expects pointer input in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerSpace {
	/// `[-1, 1]` across the viewport, y pointing up.
	Normalized,
	/// Pixels relative to the container's top-left corner.
	Container,
}

impl PointerSpace {
	/// Convert a client-pixel coordinate into this space.
	///
	/// `viewport` is the window's inner size, `container_origin` the
	/// container's top-left corner in client pixels.
	pub fn convert(self, client: Vec2, viewport: Vec2, container_origin: Vec2) -> Vec2 {
		match self {
			PointerSpace::Normalized => {
				if viewport.x <= 0.0 || viewport.y <= 0.0 {
					return Vec2::ZERO;
				}
				Vec2::new(
					client.x / viewport.x * 2.0 - 1.0,
					-(client.y / viewport.y) * 2.0 + 1.0,
				)
			}
			PointerSpace::Container => client - container_origin,
		}
	}
}

/// Latest pointer sample plus the smoothed magnifier centre.
#[derive(Clone, Debug, Default)]
pub struct PointerState {
	latest: Option<Vec2>,
	magnifier: Vec2,
}

impl PointerState {
	pub fn centered_at(center: Vec2) -> Self {
		Self {
			latest: None,
			magnifier: center,
		}
	}

	pub fn set(&mut self, position: Vec2) {
		self.latest = Some(position);
	}

	pub fn clear(&mut self) {
		self.latest = None;
	}

	pub fn latest(&self) -> Option<Vec2> {
		self.latest
	}

	/// Move the magnifier toward the pointer by `inertia` of the remaining distance.
	pub fn follow(&mut self, inertia: f32) {
		if let Some(target) = self.latest {
			self.magnifier = self.magnifier.lerp(target, inertia);
		}
	}

	pub fn magnifier(&self) -> Vec2 {
		self.magnifier
	}
}

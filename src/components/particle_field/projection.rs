//! Perspective projection for the 3D ambient profile.
//!
//! Mirrors a conventional point-sprite setup: a camera on the +z axis
//! looking at the origin, vertical field of view, and sprite sizes that
//! shrink with depth.

use glam::{EulerRot, Mat3, Vec2, Vec3};

/// Screen-space result of projecting one point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
	pub screen: Vec2,
	/// Point-size attenuation at this depth: half the viewport height over depth.
	pub scale: f32,
}

/// Perspective camera at `(0, 0, distance)` looking toward `-z`.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
	/// Vertical field of view in degrees.
	pub fov: f32,
	pub distance: f32,
	pub near: f32,
	pub far: f32,
	viewport: Vec2,
}

impl Camera {
	pub fn new(viewport: Vec2) -> Self {
		Self {
			fov: 75.0,
			distance: 50.0,
			near: 0.1,
			far: 1000.0,
			viewport,
		}
	}

	/// Update the viewport (and with it the aspect ratio).
	pub fn set_viewport(&mut self, viewport: Vec2) {
		self.viewport = viewport;
	}

	pub fn viewport(&self) -> Vec2 {
		self.viewport
	}

	pub fn aspect(&self) -> f32 {
		if self.viewport.y > 0.0 {
			self.viewport.x / self.viewport.y
		} else {
			1.0
		}
	}

	fn focal(&self) -> f32 {
		1.0 / (self.fov.to_radians() / 2.0).tan()
	}

	/// Project a world-space point. Points outside the near/far range are culled.
	pub fn project(&self, p: Vec3) -> Option<Projected> {
		let depth = self.distance - p.z;
		if depth < self.near || depth > self.far {
			return None;
		}

		let f = self.focal();
		let ndc = Vec2::new(p.x * f / (self.aspect() * depth), p.y * f / depth);
		let screen = Vec2::new(
			(ndc.x + 1.0) / 2.0 * self.viewport.x,
			(1.0 - ndc.y) / 2.0 * self.viewport.y,
		);
		Some(Projected {
			screen,
			scale: self.viewport.y / 2.0 / depth,
		})
	}
}

/// Euler rotation applied to the whole particle set (XYZ order).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rotation {
	pub x: f32,
	pub y: f32,
	pub z: f32,
}

impl Rotation {
	pub fn matrix(self) -> Mat3 {
		Mat3::from_euler(EulerRot::XYZ, self.x, self.y, self.z)
	}
}

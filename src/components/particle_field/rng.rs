//! Deterministic random sources for particle placement.
//!
//! Layouts are generated from an explicit seed so the same configuration
//! always produces the same field, and tests can assert exact positions.

/// Multiply-with-carry generator yielding floats in `[0, 1)`.
///
/// State is kept as signed 32-bit words: the high half is recovered with an
/// arithmetic shift, so a word with its top bit set carries a negative high
/// half into the next step.
#[derive(Clone, Debug)]
pub struct SeededRng {
	m_w: i32,
	m_z: i32,
}

impl SeededRng {
	pub fn new(seed: u32) -> Self {
		Self {
			m_w: (123_456_789 + i64::from(seed)) as i32,
			m_z: (987_654_321 - i64::from(seed)) as i32,
		}
	}

	/// Next value in `[0, 1)`.
	pub fn next_f32(&mut self) -> f32 {
		self.next_f64() as f32
	}

	pub fn next_f64(&mut self) -> f64 {
		self.m_z = (36969 * i64::from(self.m_z & 0xffff) + i64::from(self.m_z >> 16)) as i32;
		self.m_w = (18000 * i64::from(self.m_w & 0xffff) + i64::from(self.m_w >> 16)) as i32;
		let bits = (i64::from(self.m_z << 16) + i64::from(self.m_w & 0xffff)) as u32;
		f64::from(bits) / 4_294_967_296.0
	}

	/// Uniform value in `[-extent / 2, extent / 2)`.
	pub fn centered(&mut self, extent: f32) -> f32 {
		(self.next_f32() - 0.5) * extent
	}
}

/// Hash a lattice point into `[0, 1)`.
fn lattice(ix: f64, iy: f64) -> f64 {
	let x = (ix * 12.9898 + iy * 78.233).sin() * 43758.5453;
	x - x.floor()
}

fn smooth_step(t: f64) -> f64 {
	t * t * (3.0 - 2.0 * t)
}

/// Smooth 2D value noise in `[0, 1)`.
///
/// Used to jitter grid-placed particles; neighbouring inputs give
/// neighbouring outputs, so small scales produce gentle irregularity.
pub fn value_noise(x: f64, y: f64) -> f64 {
	let (x0, y0) = (x.floor(), y.floor());
	let (tx, ty) = (smooth_step(x - x0), smooth_step(y - y0));

	let top = lattice(x0, y0) + (lattice(x0 + 1.0, y0) - lattice(x0, y0)) * tx;
	let bottom = lattice(x0, y0 + 1.0) + (lattice(x0 + 1.0, y0 + 1.0) - lattice(x0, y0 + 1.0)) * tx;
	top + (bottom - top) * ty
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn same_seed_same_sequence() {
		let mut a = SeededRng::new(42);
		let mut b = SeededRng::new(42);
		for _ in 0..100 {
			assert_eq!(a.next_f64(), b.next_f64());
		}
	}

	#[test]
	fn seed_42_sequence_is_pinned() {
		// Draws 17 onward only match when the high half shifts in sign bits.
		let expected: [u32; 20] = [
			171_795_723,
			3_187_461_583,
			2_988_574_320,
			2_602_425_223,
			1_398_900_212,
			441_045_131,
			117_068_346,
			2_338_244_455,
			226_332_869,
			652_431_956,
			2_864_175_619,
			184_420_748,
			3_262_873_505,
			4_205_243_119,
			2_613_766_077,
			322_853_270,
			474_956_422,
			390_235_771,
			3_121_265_333,
			4_214_815_615,
		];
		let mut rng = SeededRng::new(42);
		for (i, want) in expected.into_iter().enumerate() {
			assert_eq!(rng.next_f64(), f64::from(want) / 4_294_967_296.0, "draw {}", i + 1);
		}
	}

	#[test]
	fn different_seeds_diverge() {
		let mut a = SeededRng::new(1);
		let mut b = SeededRng::new(2);
		let same = (0..16).filter(|_| a.next_f64() == b.next_f64()).count();
		assert!(same < 16);
	}

	#[test]
	fn values_stay_in_unit_interval() {
		let mut rng = SeededRng::new(7);
		for _ in 0..10_000 {
			let v = rng.next_f64();
			assert!((0.0..1.0).contains(&v), "{v} out of range");
		}
	}

	#[test]
	fn centered_is_symmetric_around_zero() {
		let mut rng = SeededRng::new(3);
		for _ in 0..1_000 {
			let v = rng.centered(150.0);
			assert!((-75.0..=75.0).contains(&v));
		}
	}

	#[test]
	fn noise_is_continuous_and_bounded() {
		for i in 0..200 {
			let x = i as f64 * 0.05;
			let a = value_noise(x, 1.3);
			let b = value_noise(x + 1e-4, 1.3);
			assert!((0.0..1.0).contains(&a));
			assert!((a - b).abs() < 1e-2);
		}
	}

	#[test]
	fn noise_matches_lattice_at_integer_points() {
		assert_eq!(value_noise(3.0, 5.0), lattice(3.0, 5.0));
	}
}

//! Particle field lifecycle.
//!
//! ```text
//! initialize ─┬─> Running ──teardown──> Destroyed
//!             └─> Deferred ─resize(non-zero)─> Running
//! ```
//!
//! A field is never reconfigured in place: a new configuration means
//! tearing this one down and initializing another.

use glam::Vec2;
use log::{debug, info, warn};

use super::config::{FieldConfig, LiveConfig, Profile};
use super::error::FieldError;
use super::pointer::PointerSpace;
use super::shading::BrightnessMap;
use super::state::FieldState;
use super::surface::{RenderSurface, Size, SurfaceProvider};

/// Seed used when the configuration does not pin one.
pub const DEFAULT_SEED: u32 = 42;

/// Where a field is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
	/// Waiting for a non-zero container size before creating the surface.
	Deferred,
	Running,
	Destroyed,
}

/// An animated particle field bound to one render surface.
pub struct ParticleField<P: SurfaceProvider> {
	config: FieldConfig,
	provider: P,
	surface: Option<P::Surface>,
	state: Option<FieldState>,
	lifecycle: Lifecycle,
	size: Size,
	pending_pointer: Option<Vec2>,
	pending_brightness: Option<BrightnessMap>,
}

impl<P: SurfaceProvider> ParticleField<P> {
	/// Create the surface and particles for `config` inside a container of `size`.
	///
	/// A zero-sized container defers creation until [`Self::on_resize`]
	/// reports a usable size.
	pub fn initialize(config: &FieldConfig, size: Size, provider: P) -> Result<Self, FieldError> {
		let mut field = Self {
			config: config.sanitized(),
			provider,
			surface: None,
			state: None,
			lifecycle: Lifecycle::Deferred,
			size,
			pending_pointer: None,
			pending_brightness: None,
		};

		if size.is_empty() {
			info!(
				"aether-field: container is {}x{}, deferring surface creation",
				size.width, size.height
			);
			return Ok(field);
		}

		field.start(size)?;
		Ok(field)
	}

	fn start(&mut self, size: Size) -> Result<(), FieldError> {
		let surface = self.provider.acquire(size).inspect_err(|e| {
			warn!("aether-field: {}", e);
		})?;

		let seed = self.config.seed.unwrap_or(DEFAULT_SEED);
		let mut state = FieldState::new(&self.config, size, seed);
		if let Some(position) = self.pending_pointer.take() {
			state.set_pointer(position);
		}
		if let Some(map) = self.pending_brightness.take() {
			state.set_brightness(map);
		}

		info!(
			"aether-field: running {:?} profile with {} particles at {}x{}",
			self.config.profile,
			state.particles().len(),
			size.width,
			size.height
		);

		self.surface = Some(surface);
		self.state = Some(state);
		self.size = size;
		self.lifecycle = Lifecycle::Running;
		Ok(())
	}

	pub fn lifecycle(&self) -> Lifecycle {
		self.lifecycle
	}

	pub fn config(&self) -> &FieldConfig {
		&self.config
	}

	pub fn profile(&self) -> Profile {
		self.config.profile
	}

	pub fn pointer_space(&self) -> PointerSpace {
		match self.config.profile {
			Profile::Ambient => PointerSpace::Normalized,
			Profile::ForceField => PointerSpace::Container,
		}
	}

	/// Simulation state, present only while running.
	pub fn state(&self) -> Option<&FieldState> {
		self.state.as_ref()
	}

	pub fn surface(&self) -> Option<&P::Surface> {
		self.surface.as_ref()
	}

	/// Number of particles in the current set (zero unless running).
	pub fn particle_count(&self) -> usize {
		self.state.as_ref().map_or(0, |s| s.particles().len())
	}

	/// Record the latest pointer position; read on the next frame.
	pub fn on_pointer_move(&mut self, x: f32, y: f32) {
		let position = Vec2::new(x, y);
		match (&mut self.state, self.lifecycle) {
			(Some(state), Lifecycle::Running) => state.set_pointer(position),
			(_, Lifecycle::Deferred) => self.pending_pointer = Some(position),
			_ => {}
		}
	}

	/// Drop pointer influence when the pointer leaves the document.
	///
	/// The ambient parallax holds the last position so the volume does not
	/// jump; only the force field loses its magnifier.
	pub fn on_pointer_leave(&mut self) {
		if self.config.profile == Profile::Ambient {
			return;
		}
		self.pending_pointer = None;
		if let Some(state) = &mut self.state {
			state.clear_pointer();
		}
	}

	/// Replace the brightness source used by the force-field profile.
	pub fn set_brightness(&mut self, map: BrightnessMap) {
		match (&mut self.state, self.lifecycle) {
			(Some(state), Lifecycle::Running) => state.set_brightness(map),
			(_, Lifecycle::Deferred) => self.pending_brightness = Some(map),
			_ => {}
		}
	}

	/// Follow a container size change without regenerating particles.
	///
	/// A deferred field starts once the size is non-zero. If the surface
	/// cannot be acquired then, the field is destroyed and the error returned.
	pub fn on_resize(&mut self, size: Size) -> Result<(), FieldError> {
		match self.lifecycle {
			Lifecycle::Destroyed => Ok(()),
			Lifecycle::Deferred => {
				self.size = size;
				if size.is_empty() {
					return Ok(());
				}
				self.start(size).inspect_err(|_| self.teardown())
			}
			Lifecycle::Running => {
				if size.is_empty() || size == self.size {
					return Ok(());
				}
				debug!("aether-field: resize to {}x{}", size.width, size.height);
				self.size = size;
				if let Some(surface) = &mut self.surface {
					surface.resize(size);
				}
				if let Some(state) = &mut self.state {
					state.resize(size);
				}
				Ok(())
			}
		}
	}

	/// Run one animation step and present it.
	///
	/// Returns `false` when the field is not running and nothing was drawn.
	pub fn frame(&mut self, live: &LiveConfig) -> bool {
		if self.lifecycle != Lifecycle::Running {
			return false;
		}
		let (Some(state), Some(surface)) = (&mut self.state, &mut self.surface) else {
			return false;
		};

		state.step(live);
		surface.present(&state.compose(live));
		state.buffer_mut().mark_clean();
		true
	}

	/// Release the surface and drop the particles. Safe to call repeatedly.
	pub fn teardown(&mut self) {
		if self.lifecycle == Lifecycle::Destroyed {
			return;
		}
		if let Some(mut surface) = self.surface.take() {
			surface.release();
		}
		self.state = None;
		self.pending_pointer = None;
		self.pending_brightness = None;
		self.lifecycle = Lifecycle::Destroyed;
		info!("aether-field: destroyed");
	}
}

impl<P: SurfaceProvider> Drop for ParticleField<P> {
	fn drop(&mut self) {
		self.teardown();
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::rc::Rc;

	use super::*;
	use crate::components::particle_field::surface::{Blend, Frame};

	/// Everything the test surfaces did, shared with the test body.
	#[derive(Debug, Default)]
	struct Journal {
		acquired: Vec<Size>,
		frames: Vec<(usize, Blend)>,
		releases: usize,
	}

	struct RecordingSurface {
		size: Size,
		journal: Rc<RefCell<Journal>>,
	}

	impl RenderSurface for RecordingSurface {
		fn resize(&mut self, size: Size) {
			self.size = size;
		}

		fn size(&self) -> Size {
			self.size
		}

		fn present(&mut self, frame: &Frame<'_>) {
			self.journal
				.borrow_mut()
				.frames
				.push((frame.sprites.len(), frame.blend));
		}

		fn release(&mut self) {
			self.journal.borrow_mut().releases += 1;
		}
	}

	#[derive(Default)]
	struct Recorder {
		journal: Rc<RefCell<Journal>>,
		unavailable: bool,
	}

	impl SurfaceProvider for Recorder {
		type Surface = RecordingSurface;

		fn acquire(&mut self, size: Size) -> Result<RecordingSurface, FieldError> {
			if self.unavailable {
				return Err(FieldError::SurfaceUnavailable("no context".into()));
			}
			self.journal.borrow_mut().acquired.push(size);
			Ok(RecordingSurface {
				size,
				journal: self.journal.clone(),
			})
		}
	}

	fn recorder() -> (Recorder, Rc<RefCell<Journal>>) {
		let recorder = Recorder::default();
		let journal = recorder.journal.clone();
		(recorder, journal)
	}

	fn ambient(count: i64) -> FieldConfig {
		FieldConfig {
			particle_count: count,
			seed: Some(1),
			..FieldConfig::default()
		}
	}

	#[test]
	fn initialize_runs_with_configured_count() {
		let (provider, journal) = recorder();
		let mut field =
			ParticleField::initialize(&ambient(300), Size::new(800.0, 600.0), provider).unwrap();

		assert_eq!(field.lifecycle(), Lifecycle::Running);
		assert_eq!(field.particle_count(), 300);
		assert_eq!(journal.borrow().acquired, vec![Size::new(800.0, 600.0)]);

		assert!(field.frame(&LiveConfig::default()));
		let recorded = journal.borrow();
		assert_eq!(recorded.frames.len(), 1);
		assert_eq!(recorded.frames[0].1, Blend::Additive);
		assert!(!field.state().unwrap().buffer().is_dirty());
	}

	#[test]
	fn zero_count_draws_nothing_without_error() {
		let (provider, journal) = recorder();
		let mut field =
			ParticleField::initialize(&ambient(0), Size::new(800.0, 600.0), provider).unwrap();
		assert_eq!(field.particle_count(), 0);
		assert!(field.frame(&LiveConfig::default()));
		assert_eq!(journal.borrow().frames[0].0, 0);
	}

	#[test]
	fn negative_count_is_treated_as_zero() {
		let (provider, _) = recorder();
		let field =
			ParticleField::initialize(&ambient(-10), Size::new(800.0, 600.0), provider).unwrap();
		assert_eq!(field.particle_count(), 0);
	}

	#[test]
	fn unavailable_surface_is_an_error_not_a_partial_field() {
		let provider = Recorder {
			unavailable: true,
			..Recorder::default()
		};
		let result = ParticleField::initialize(&ambient(10), Size::new(800.0, 600.0), provider);
		assert!(matches!(result, Err(FieldError::SurfaceUnavailable(_))));
	}

	#[test]
	fn zero_size_defers_until_resize() {
		let (provider, journal) = recorder();
		let mut field =
			ParticleField::initialize(&ambient(120), Size::new(0.0, 0.0), provider).unwrap();
		assert_eq!(field.lifecycle(), Lifecycle::Deferred);
		assert_eq!(field.particle_count(), 0);
		assert!(!field.frame(&LiveConfig::default()));
		assert!(journal.borrow().acquired.is_empty());

		field.on_resize(Size::new(0.0, 300.0)).unwrap();
		assert_eq!(field.lifecycle(), Lifecycle::Deferred);

		field.on_resize(Size::new(800.0, 600.0)).unwrap();
		assert_eq!(field.lifecycle(), Lifecycle::Running);
		assert_eq!(field.surface().unwrap().size(), Size::new(800.0, 600.0));
		assert_eq!(field.particle_count(), 120);
		assert_eq!(journal.borrow().acquired, vec![Size::new(800.0, 600.0)]);
	}

	#[test]
	fn deferred_acquire_failure_destroys_field() {
		let provider = Recorder {
			unavailable: true,
			..Recorder::default()
		};
		let mut field =
			ParticleField::initialize(&ambient(10), Size::new(0.0, 0.0), provider).unwrap();
		assert!(field.on_resize(Size::new(800.0, 600.0)).is_err());
		assert_eq!(field.lifecycle(), Lifecycle::Destroyed);
		assert!(!field.frame(&LiveConfig::default()));
	}

	#[test]
	fn resize_updates_surface_but_not_origins() {
		let (provider, _) = recorder();
		let mut field =
			ParticleField::initialize(&ambient(50), Size::new(800.0, 600.0), provider).unwrap();
		let before: Vec<_> = field
			.state()
			.unwrap()
			.particles()
			.iter()
			.map(|p| p.origin())
			.collect();

		field.on_resize(Size::new(1024.0, 300.0)).unwrap();

		let state = field.state().unwrap();
		let after: Vec<_> = state.particles().iter().map(|p| p.origin()).collect();
		assert_eq!(before, after);
		assert_eq!(field.surface().unwrap().size(), Size::new(1024.0, 300.0));
		assert_eq!(state.camera().aspect(), 1024.0 / 300.0);
	}

	#[test]
	fn teardown_is_idempotent() {
		let (provider, journal) = recorder();
		let mut field =
			ParticleField::initialize(&ambient(10), Size::new(800.0, 600.0), provider).unwrap();
		field.teardown();
		field.teardown();
		assert_eq!(field.lifecycle(), Lifecycle::Destroyed);
		assert_eq!(journal.borrow().releases, 1);
		assert!(field.state().is_none());

		drop(field);
		assert_eq!(journal.borrow().releases, 1);
	}

	#[test]
	fn dropping_a_running_field_releases_the_surface() {
		let (provider, journal) = recorder();
		let field =
			ParticleField::initialize(&ambient(10), Size::new(800.0, 600.0), provider).unwrap();
		drop(field);
		assert_eq!(journal.borrow().releases, 1);
	}

	#[test]
	fn no_frames_or_resizes_after_teardown() {
		let (provider, journal) = recorder();
		let mut field =
			ParticleField::initialize(&ambient(10), Size::new(800.0, 600.0), provider).unwrap();
		field.teardown();
		assert!(!field.frame(&LiveConfig::default()));
		field.on_resize(Size::new(10.0, 10.0)).unwrap();
		field.on_pointer_move(0.5, 0.5);
		assert!(journal.borrow().frames.is_empty());
	}

	#[test]
	fn pointer_input_reaches_force_field() {
		let (provider, _) = recorder();
		let config = FieldConfig {
			seed: Some(3),
			..FieldConfig::force_field()
		};
		let mut field =
			ParticleField::initialize(&config, Size::new(200.0, 200.0), provider).unwrap();
		assert_eq!(field.pointer_space(), PointerSpace::Container);

		field.on_pointer_move(100.0, 100.0);
		let live = LiveConfig {
			pointer_inertia: 1.0,
			..config.live()
		};
		field.frame(&live);
		let state = field.state().unwrap();
		assert_eq!(state.pointer().magnifier(), Vec2::new(100.0, 100.0));
		assert!(state.particles().iter().any(|p| p.offset.length() > 0.0));

		field.on_pointer_leave();
		assert_eq!(field.state().unwrap().pointer().latest(), None);
	}

	#[test]
	fn ambient_parallax_holds_after_pointer_leaves() {
		let (provider, _) = recorder();
		let mut field =
			ParticleField::initialize(&ambient(20), Size::new(800.0, 600.0), provider).unwrap();
		let still = LiveConfig {
			speed: 0.0,
			..LiveConfig::default()
		};
		field.on_pointer_move(0.5, -0.25);
		field.frame(&still);
		let before: Vec<_> = field.state().unwrap().buffer().vertices().collect();

		field.on_pointer_leave();
		field.frame(&still);
		let state = field.state().unwrap();
		assert_eq!(state.pointer().latest(), Some(Vec2::new(0.5, -0.25)));
		assert!(state.buffer().vertices().eq(before));
	}

	#[test]
	fn pointer_and_brightness_survive_deferral() {
		let (provider, journal) = recorder();
		let mut field =
			ParticleField::initialize(&FieldConfig::force_field(), Size::default(), provider)
				.unwrap();
		field.on_pointer_move(10.0, 20.0);
		field.set_brightness(BrightnessMap::uniform(255));
		field.on_resize(Size::new(100.0, 100.0)).unwrap();

		assert_eq!(
			field.state().unwrap().pointer().latest(),
			Some(Vec2::new(10.0, 20.0))
		);
		field.frame(&field.config().live());
		// Uniformly bright source hides every particle.
		assert_eq!(journal.borrow().frames[0].0, 0);
	}
}

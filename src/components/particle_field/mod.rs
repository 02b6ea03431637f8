//! Animated particle-field background.
//!
//! Renders a full-bleed field of point particles on an HTML canvas with two
//! profiles:
//! - **Ambient**: a 3D volume drifting on sine waves, slowly rotating, with
//!   a parallax shift toward the pointer
//! - **Force field**: a 2D grid pushed away from the pointer and springing
//!   back to rest, optionally shaded from a source image
//!
//! The simulation ([`ParticleField`], [`FieldState`]) is independent of the
//! browser and drives any [`RenderSurface`]; [`ParticleFieldCanvas`] wires it
//! to a canvas, `requestAnimationFrame`, pointer events and a
//! `ResizeObserver`.
//!
//! # Example
//!
//! ```ignore
//! use aether_field::{FieldConfig, ParticleFieldCanvas};
//!
//! let config = FieldConfig { particle_count: 800, ..FieldConfig::default() };
//!
//! view! {
//!     <section class="hero">
//!         <ParticleFieldCanvas config=config />
//!     </section>
//! }
//! ```

mod component;
pub mod config;
mod error;
mod field;
pub mod particles;
pub mod pointer;
pub mod projection;
mod render;
pub mod rng;
pub mod shading;
mod state;
pub mod surface;
pub mod theme;

pub use component::{FieldStatus, ParticleFieldCanvas};
pub use config::{FieldConfig, LiveConfig, Profile};
pub use error::FieldError;
pub use field::{Lifecycle, ParticleField};
pub use state::FieldState;
pub use surface::{RenderSurface, Size, SurfaceProvider};

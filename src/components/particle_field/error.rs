//! Error types for the particle field.
//!
//! None of these are fatal to the host page: the component logs them and
//! either renders nothing or shows an inline indicator.

use thiserror::Error;

/// Errors raised while setting up or feeding the particle field.
#[derive(Debug, Error)]
pub enum FieldError {
	/// No drawing context could be obtained for the surface.
	#[error("drawing surface unavailable: {0}")]
	SurfaceUnavailable(String),

	/// The source image for the force field failed to load.
	#[error("failed to load image {url}")]
	ImageLoad { url: String },

	/// Pixels could not be read back from the source image.
	#[error("failed to sample image: {0}")]
	ImageSample(String),

	/// The embedded configuration was not valid JSON for a field config.
	#[error("invalid field configuration: {0}")]
	Config(#[from] serde_json::Error),
}

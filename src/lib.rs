//! aether-field: animated particle-field backgrounds for Leptos.
//!
//! This crate provides a WASM canvas component that renders an ambient
//! drifting particle volume or an interactive cursor "force field" behind
//! page content.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::particle_field::{
	FieldConfig, FieldError, FieldStatus, LiveConfig, ParticleField, ParticleFieldCanvas, Profile,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("aether-field: logging initialized");
}

/// Parse a field configuration from embedded JSON.
pub fn parse_field_config(json: &str) -> Result<FieldConfig, FieldError> {
	Ok(serde_json::from_str(json)?)
}

/// Load the field configuration from a script element with id="field-config".
/// Expected format: a JSON object of camelCase [`FieldConfig`] fields.
fn load_field_config() -> Option<FieldConfig> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("field-config")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match parse_field_config(&json_text) {
		Ok(config) => {
			info!("aether-field: loaded {:?} configuration", config.profile);
			Some(config)
		}
		Err(e) => {
			warn!("aether-field: {}", e);
			None
		}
	}
}

/// Main application component.
/// Loads the field configuration from the DOM and renders it full-bleed.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let config = load_field_config().unwrap_or_default();
	let config_signal = Signal::derive(move || config.clone());

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Aether Field" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-field" style="position: fixed; inset: 0;">
			<ParticleFieldCanvas config=config_signal />
			<div class="field-overlay">
				<h1>"Aether Field"</h1>
				<p class="subtitle">"Move the pointer across the field."</p>
			</div>
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_embedded_configuration() {
		let config = parse_field_config(r#"{ "profile": "forceField", "spacing": 12 }"#).unwrap();
		assert_eq!(config.profile, Profile::ForceField);
		assert_eq!(config.spacing, 12.0);
	}

	#[test]
	fn malformed_configuration_is_a_config_error() {
		let err = parse_field_config("{ spacing: }").unwrap_err();
		assert!(matches!(err, FieldError::Config(_)));
	}
}

//! Leptos component wrapping the particle field canvas.
//!
//! The component renders a full-bleed container with a canvas child. An
//! effect builds a [`ParticleField`] whenever the configuration signal
//! changes, wires up the global pointer listener and a `ResizeObserver` on
//! the container, and drives the field from `requestAnimationFrame`. The
//! previous field is torn down before a new one is built.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use glam::Vec2;
use leptos::prelude::*;
use log::{info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{
	Element, HtmlCanvasElement, HtmlImageElement, MouseEvent, ResizeObserver,
	ResizeObserverEntry, Window,
};

use super::config::{FieldConfig, LiveConfig, Profile};
use super::error::FieldError;
use super::field::{Lifecycle, ParticleField};
use super::render::{self, CanvasProvider};
use super::surface::{RenderSurface, Size};

type SharedField = Rc<RefCell<Option<ParticleField<CanvasProvider>>>>;

/// What the overlay should show.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldStatus {
	/// Waiting for the source image.
	Loading,
	Ready,
	/// The effect could not start; shown to the user.
	Failed(String),
	/// No drawing context; the effect is silently absent.
	Unavailable,
}

fn viewport(window: &Window) -> Vec2 {
	let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;
	Vec2::new(dim(window.inner_width()), dim(window.inner_height()))
}

/// Whether the frame loop should request another frame.
///
/// A missing or destroyed field has nothing left to draw.
fn keeps_animating(running: bool, alive: bool, field: Option<Lifecycle>) -> bool {
	running && alive && matches!(field, Some(Lifecycle::Deferred | Lifecycle::Running))
}

fn container_size(canvas: &HtmlCanvasElement) -> Size {
	canvas
		.parent_element()
		.map(|p| Size::new(p.client_width() as f64, p.client_height() as f64))
		.unwrap_or_default()
}

/// Source image for the force-field profile and its load callbacks.
struct ImageSource {
	element: HtmlImageElement,
	_on_load: Closure<dyn FnMut()>,
	_on_error: Closure<dyn FnMut()>,
}

/// Sample `image` at the running surface's size into the field's brightness map.
fn refresh_brightness(
	field: &mut ParticleField<CanvasProvider>,
	image: &HtmlImageElement,
) -> Result<(), FieldError> {
	let Some(size) = field.surface().map(|s| s.size()) else {
		return Ok(());
	};
	let map = render::sample_image(image, size, field.config().invert_image)?;
	field.set_brightness(map);
	Ok(())
}

/// Everything one mounted field owns: the field itself, the frame loop and
/// every listener. Dropping it tears all of it down.
struct FieldHandle {
	field: SharedField,
	running: Rc<Cell<bool>>,
	frame_id: Rc<Cell<Option<i32>>>,
	animate: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>,
	pointer_move: Option<Closure<dyn FnMut(MouseEvent)>>,
	pointer_leave: Option<(Element, Closure<dyn FnMut(MouseEvent)>)>,
	resize: Option<(ResizeObserver, Closure<dyn FnMut(js_sys::Array)>)>,
	image: Rc<RefCell<Option<ImageSource>>>,
	torn_down: bool,
}

impl FieldHandle {
	fn mount(
		config: FieldConfig,
		canvas: HtmlCanvasElement,
		live: Rc<RefCell<LiveConfig>>,
		alive: Arc<AtomicBool>,
		status: RwSignal<FieldStatus>,
	) -> Result<Self, FieldError> {
		let window = web_sys::window()
			.ok_or_else(|| FieldError::SurfaceUnavailable("no window".into()))?;

		let size = container_size(&canvas);
		let field = ParticleField::initialize(&config, size, CanvasProvider::new(canvas.clone()))?;
		let wants_image = field.profile() == Profile::ForceField && field.config().image_url.is_some();
		let field: SharedField = Rc::new(RefCell::new(Some(field)));

		let mut handle = Self {
			field: field.clone(),
			running: Rc::new(Cell::new(true)),
			frame_id: Rc::new(Cell::new(None)),
			animate: Rc::new(RefCell::new(None)),
			pointer_move: None,
			pointer_leave: None,
			resize: None,
			image: Rc::new(RefCell::new(None)),
			torn_down: false,
		};
		let ready = Rc::new(Cell::new(!wants_image));

		if let Some(url) = config.image_url.as_ref().filter(|_| wants_image) {
			status.set(FieldStatus::Loading);
			handle.load_image(url, ready.clone(), status)?;
		} else {
			status.set(FieldStatus::Ready);
		}

		let (field_pm, canvas_pm) = (field.clone(), canvas.clone());
		let pointer_move = Closure::<dyn FnMut(MouseEvent)>::new(move |ev: MouseEvent| {
			let Some(window) = web_sys::window() else {
				return;
			};
			let rect = canvas_pm.get_bounding_client_rect();
			let client = Vec2::new(ev.client_x() as f32, ev.client_y() as f32);
			let corner = Vec2::new(rect.left() as f32, rect.top() as f32);
			if let Some(f) = field_pm.borrow_mut().as_mut() {
				let p = f.pointer_space().convert(client, viewport(&window), corner);
				f.on_pointer_move(p.x, p.y);
			}
		});
		let _ = window
			.add_event_listener_with_callback("mousemove", pointer_move.as_ref().unchecked_ref());
		handle.pointer_move = Some(pointer_move);

		if let Some(root) = window.document().and_then(|d| d.document_element()) {
			let field_pl = field.clone();
			let pointer_leave = Closure::<dyn FnMut(MouseEvent)>::new(move |_: MouseEvent| {
				if let Some(f) = field_pl.borrow_mut().as_mut() {
					f.on_pointer_leave();
				}
			});
			let _ = root.add_event_listener_with_callback(
				"mouseleave",
				pointer_leave.as_ref().unchecked_ref(),
			);
			handle.pointer_leave = Some((root, pointer_leave));
		}

		if let Some(container) = canvas.parent_element() {
			let (field_rs, image_rs, ready_rs, running_rs) = (
				field.clone(),
				handle.image.clone(),
				ready.clone(),
				handle.running.clone(),
			);
			let on_resize = Closure::<dyn FnMut(js_sys::Array)>::new(move |entries: js_sys::Array| {
				for entry in entries.iter() {
					let Ok(entry) = entry.dyn_into::<ResizeObserverEntry>() else {
						continue;
					};
					let rect = entry.content_rect();
					let size = Size::new(rect.width(), rect.height());

					let mut slot = field_rs.borrow_mut();
					let Some(f) = slot.as_mut() else {
						continue;
					};
					if let Err(e) = f.on_resize(size) {
						warn!("aether-field: {}", e);
						slot.take();
						running_rs.set(false);
						status.set(FieldStatus::Unavailable);
						continue;
					}
					if ready_rs.get() {
						if let Some(image) = image_rs.borrow().as_ref() {
							if let Err(e) = refresh_brightness(f, &image.element) {
								warn!("aether-field: {}", e);
							}
						}
					}
				}
			});
			match ResizeObserver::new(on_resize.as_ref().unchecked_ref()) {
				Ok(observer) => {
					observer.observe(&container);
					handle.resize = Some((observer, on_resize));
				}
				Err(e) => warn!("aether-field: resize observer unavailable: {:?}", e),
			}
		}

		let (field_anim, animate_inner, frame_inner, running_anim) = (
			field.clone(),
			handle.animate.clone(),
			handle.frame_id.clone(),
			handle.running.clone(),
		);
		*handle.animate.borrow_mut() = Some(Closure::new(move |_timestamp: f64| {
			frame_inner.set(None);
			let lifecycle = field_anim.borrow().as_ref().map(|f| f.lifecycle());
			if !keeps_animating(running_anim.get(), alive.load(Ordering::Relaxed), lifecycle) {
				running_anim.set(false);
				return;
			}
			if ready.get() {
				if let Some(f) = field_anim.borrow_mut().as_mut() {
					f.frame(&live.borrow());
				}
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				if let Some(window) = web_sys::window() {
					frame_inner.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
				}
			}
		}));
		if let Some(ref cb) = *handle.animate.borrow() {
			handle
				.frame_id
				.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
		}

		Ok(handle)
	}

	fn load_image(
		&mut self,
		url: &str,
		ready: Rc<Cell<bool>>,
		status: RwSignal<FieldStatus>,
	) -> Result<(), FieldError> {
		let element = HtmlImageElement::new().map_err(|_| FieldError::ImageLoad {
			url: url.to_string(),
		})?;
		element.set_cross_origin(Some("anonymous"));

		let (field_ok, element_ok, running_ok) =
			(self.field.clone(), element.clone(), self.running.clone());
		let on_load = Closure::<dyn FnMut()>::new(move || {
			let mut slot = field_ok.borrow_mut();
			let Some(f) = slot.as_mut() else {
				return;
			};
			match refresh_brightness(f, &element_ok) {
				Ok(()) => {
					ready.set(true);
					status.set(FieldStatus::Ready);
					info!("aether-field: source image loaded");
				}
				Err(e) => {
					warn!("aether-field: {}", e);
					slot.take();
					running_ok.set(false);
					status.set(FieldStatus::Failed("Failed to load image".into()));
				}
			}
		});

		let (field_err, url_err, running_err) =
			(self.field.clone(), url.to_string(), self.running.clone());
		let on_error = Closure::<dyn FnMut()>::new(move || {
			warn!("aether-field: {}", FieldError::ImageLoad { url: url_err.clone() });
			field_err.borrow_mut().take();
			running_err.set(false);
			status.set(FieldStatus::Failed("Failed to load image".into()));
		});

		element.set_onload(Some(on_load.as_ref().unchecked_ref()));
		element.set_onerror(Some(on_error.as_ref().unchecked_ref()));
		element.set_src(url);

		*self.image.borrow_mut() = Some(ImageSource {
			element,
			_on_load: on_load,
			_on_error: on_error,
		});
		Ok(())
	}

	/// Stop the loop, drop listeners and release the surface. Idempotent.
	fn teardown(&mut self) {
		if self.torn_down {
			return;
		}
		self.torn_down = true;
		self.running.set(false);

		let window = web_sys::window();
		if let (Some(id), Some(window)) = (self.frame_id.take(), window.as_ref()) {
			let _ = window.cancel_animation_frame(id);
		}
		self.animate.borrow_mut().take();

		if let (Some(cb), Some(window)) = (self.pointer_move.take(), window.as_ref()) {
			let _ = window
				.remove_event_listener_with_callback("mousemove", cb.as_ref().unchecked_ref());
		}
		if let Some((root, cb)) = self.pointer_leave.take() {
			let _ = root.remove_event_listener_with_callback("mouseleave", cb.as_ref().unchecked_ref());
		}
		if let Some((observer, _cb)) = self.resize.take() {
			observer.disconnect();
		}
		if let Some(image) = self.image.borrow_mut().take() {
			image.element.set_onload(None);
			image.element.set_onerror(None);
		}
		if let Some(mut field) = self.field.borrow_mut().take() {
			field.teardown();
		}
	}
}

impl Drop for FieldHandle {
	fn drop(&mut self) {
		self.teardown();
	}
}

/// Renders an animated particle field filling its positioned parent.
///
/// `config` selects the profile and layout; every change rebuilds the field.
/// `live`, when given, adjusts force, palette and speed parameters on the
/// running field without rebuilding it. Without `live`, those parameters
/// come from `config`.
#[component]
pub fn ParticleFieldCanvas(
	#[prop(into)] config: Signal<FieldConfig>,
	#[prop(optional, into)] live: Option<Signal<LiveConfig>>,
	#[prop(optional, into)] class: String,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let status = RwSignal::new(FieldStatus::Ready);
	let live_config = Rc::new(RefCell::new(LiveConfig::default()));
	let alive = Arc::new(AtomicBool::new(true));

	let alive_cleanup = alive.clone();
	on_cleanup(move || alive_cleanup.store(false, Ordering::Relaxed));

	if let Some(live) = live {
		let live_update = live_config.clone();
		Effect::new(move |_| {
			*live_update.borrow_mut() = live.get().sanitized();
		});
	}

	let live_init = live_config.clone();
	Effect::new(move |prev: Option<Option<FieldHandle>>| {
		if let Some(Some(mut handle)) = prev {
			handle.teardown();
		}

		let mut config = config.get();
		let canvas: HtmlCanvasElement = canvas_ref.get()?.into();

		if config.seed.is_none() {
			config.seed = Some((js_sys::Math::random() * u32::MAX as f64) as u32);
		}
		if live.is_none() {
			*live_init.borrow_mut() = config.live();
		}

		match FieldHandle::mount(config, canvas, live_init.clone(), alive.clone(), status) {
			Ok(handle) => Some(handle),
			Err(e) => {
				warn!("aether-field: effect disabled: {}", e);
				status.set(FieldStatus::Unavailable);
				None
			}
		}
	});

	view! {
		<div
			class=format!("particle-field {class}")
			style="position: absolute; inset: 0; overflow: hidden; pointer-events: none;"
		>
			<canvas
				node_ref=canvas_ref
				class="particle-field-canvas"
				style="display: block; width: 100%; height: 100%;"
			/>
			{move || match status.get() {
				FieldStatus::Loading => Some(view! {
					<div class="particle-field-status">"Initializing Force Field..."</div>
				}.into_any()),
				FieldStatus::Failed(message) => Some(view! {
					<div class="particle-field-status particle-field-error">{message}</div>
				}.into_any()),
				FieldStatus::Ready | FieldStatus::Unavailable => None,
			}}
		</div>
	}
}

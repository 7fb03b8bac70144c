//! Leptos component wrapping the resource graph canvas.
//!
//! The component creates the toolbar, an HTML canvas sized to its parent
//! container, and the hover tooltip. Mouse and wheel handlers forward to the
//! [`ExplorerState`]; an animation loop runs via `requestAnimationFrame`,
//! ticking the simulation and redrawing the scene each frame.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::render;
use super::scene::TooltipContent;
use super::state::ExplorerState;
use crate::config::ExplorerConfig;

/// Fixed frame step fed to the animations, in seconds.
const FRAME_DT: f64 = 0.016;

type SharedState = Rc<RefCell<Option<ExplorerState>>>;

/// Size of the canvas' parent container, or zero when it is not attached.
fn container_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.unwrap_or((0.0, 0.0))
}

/// Pointer position relative to the canvas' top-left corner.
fn canvas_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn with_state(state: &SharedState, f: impl FnOnce(&mut ExplorerState)) {
	if let Some(ref mut s) = *state.borrow_mut() {
		f(s);
	}
}

/// Interactive resource graph explorer: toolbar, canvas, and tooltip.
///
/// The canvas fills its parent container and follows window resizes.
/// `seed` drives every random draw of the session, so the same seed and
/// configuration reproduce the same sequence of graphs.
#[component]
pub fn ResourceGraphExplorer(
	/// Session configuration.
	config: ExplorerConfig,
	/// Seed for the session's random draws.
	seed: u64,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: SharedState = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());

	let tooltip = RwSignal::new(None::<TooltipContent>);
	let stats = RwSignal::new((0usize, 0usize));
	let query = RwSignal::new(String::new());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = container_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			warn!("resource-graph: canvas 2d context unavailable");
			return;
		};

		let explorer = ExplorerState::new(config.clone(), w, h, seed);
		stats.set((explorer.data.resources.len(), explorer.data.connections.len()));
		*state_init.borrow_mut() = Some(explorer);

		let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let (nw, nh) = container_size(&canvas_resize);
			if nw > 0.0 && nh > 0.0 {
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
			}
			with_state(&state_resize, |s| s.resize(nw, nh));
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			with_state(&state_anim, |s| {
				s.tick(FRAME_DT);
				if let Err(e) = render::render(&ctx, s.scene(), s.view.transform, &s.theme, s.width, s.height) {
					warn!("resource-graph: render failed: {:?}", e);
				}
			});
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if let Some((x, y)) = canvas_point(canvas_ref, &ev) {
			with_state(&state_md, |s| s.pointer_down(x, y));
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		let (page_x, page_y) = (ev.page_x() as f64, ev.page_y() as f64);
		with_state(&state_mm, |s| {
			s.pointer_move(x, y);
			tooltip.set(s.tooltip(page_x, page_y));
		});
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		with_state(&state_mu, |s| s.pointer_up());
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		with_state(&state_ml, |s| s.pointer_leave());
		tooltip.set(None);
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some((x, y)) = canvas_point(canvas_ref, &ev) {
			with_state(&state_wh, |s| s.wheel(ev.delta_y(), x, y));
		}
	};

	let state_search = state.clone();
	let on_search = move |ev: leptos::ev::Event| {
		let q = event_target_value(&ev);
		with_state(&state_search, |s| s.search(&q));
		query.set(q);
	};

	let state_zi = state.clone();
	let state_zo = state.clone();
	let state_fit = state.clone();
	let state_reset = state.clone();
	let state_regen = state.clone();

	view! {
		<div class="graph-toolbar" style="position: absolute; top: 8px; right: 8px; z-index: 1;">
			<input
				class="filter-input"
				type="text"
				placeholder="Filter by name, type, group, location or tag"
				prop:value=move || query.get()
				on:input=on_search
			/>
			<button class="control-btn" title="Zoom In" on:click=move |_| with_state(&state_zi, |s| s.zoom_in())>"+"</button>
			<button class="control-btn" title="Zoom Out" on:click=move |_| with_state(&state_zo, |s| s.zoom_out())>"−"</button>
			<button class="control-btn" title="Fit to Screen" on:click=move |_| with_state(&state_fit, |s| s.fit_to_screen())>"⤢"</button>
			<button class="control-btn" title="Reset View" on:click=move |_| with_state(&state_reset, |s| s.reset_view())>"⟲"</button>
			<button
				class="btn-primary"
				on:click=move |_| {
					with_state(&state_regen, |s| {
						s.regenerate();
						stats.set((s.data.resources.len(), s.data.connections.len()));
					});
					tooltip.set(None);
				}
			>
				"Regenerate"
			</button>
			<span class="graph-stats">
				{move || {
					let (resources, connections) = stats.get();
					format!("{resources} resources · {connections} connections")
				}}
			</span>
		</div>
		<canvas
			node_ref=canvas_ref
			class="resource-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
		{move || tooltip.get().map(|tip| view! { <Tooltip tip=tip /> })}
	}
}

/// Hover card for one resource.
#[component]
fn Tooltip(tip: TooltipContent) -> impl IntoView {
	let tags = tip
		.tags
		.iter()
		.map(|(key, value)| view! { <span class="tag">{format!("{key}: {value}")}</span> })
		.collect_view();

	view! {
		<div class="tooltip" style=format!(
			"position: absolute; pointer-events: none; left: {}px; top: {}px; opacity: 1;",
			tip.x, tip.y
		)>
			<div class="tooltip-title">
				<span class="tooltip-icon">{tip.icon}</span>
				<strong>{tip.display_name}</strong>
			</div>
			<div>{format!("Type: {}", tip.kind)}</div>
			<div>{format!("Category: {}", tip.category)}</div>
			<div>{format!("Resource Group: {}", tip.resource_group)}</div>
			<div>{format!("Location: {}", tip.location)}</div>
			<div>{format!("Subscription: {}", tip.subscription)}</div>
			<div>
				"Status: "
				<span style=format!("color: {};", tip.status_color)>
					{format!("{} {}", tip.status_icon, tip.status.as_str())}
				</span>
			</div>
			<div class="tooltip-tags">{tags}</div>
		</div>
	}
}

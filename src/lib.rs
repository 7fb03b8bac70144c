//! resource-graph-explorer: interactive topology view of synthetic cloud resources.
//!
//! This crate provides a WASM-based explorer that generates a plausible set of
//! cloud resources, derives connections between them, and lays them out with
//! a force simulation that can be dragged, panned, zoomed and searched.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;
pub mod config;

pub use components::force_graph::{ExplorerState, GraphData, ResourceGraphExplorer};
pub use config::ExplorerConfig;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("resource-graph: logging initialized");
}

/// Text of the script element with id="explorer-config", if present.
fn config_text() -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("explorer-config")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

/// Load configuration from the page. A missing element yields the defaults.
fn load_config() -> ExplorerConfig {
	let Some(text) = config_text() else {
		return ExplorerConfig::default();
	};
	let config = ExplorerConfig::from_json(&text);
	info!(
		"resource-graph: loaded config ({} resources, seed {:?})",
		config.node_count, config.seed
	);
	config
}

/// Main application component.
/// Loads configuration from the DOM and renders the explorer.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let config = load_config();
	let seed = config.seed.unwrap_or_else(|| js_sys::Date::now() as u64);

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Resource Graph Explorer" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph" id="graph-container" style="position: fixed; inset: 0; overflow: hidden;">
			<ResourceGraphExplorer config=config seed=seed />
			<div class="graph-overlay">
				<h1>"Resource Graph"</h1>
				<p class="subtitle">"Drag resources to reposition. Scroll to zoom. Drag background to pan."</p>
			</div>
		</div>
	}
}

//! Explorer session state and interaction tracking.
//!
//! Owns one generation of the resource graph together with its force
//! simulation, view transform, hover highlight, search filter, and
//! drag/pan bookkeeping. The animation loop calls [`ExplorerState::tick`]
//! once per frame: the simulation writes positions, then the scene is
//! rebuilt from them, so what is drawn always reflects that frame's layout.

use log::{debug, info};
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

use super::generator::generate;
use super::scene::{HighlightState, Scene, SearchFilter, TooltipContent};
use super::simulation::Simulation;
use super::synthesis::synthesize;
use super::theme::{Theme, resource_radius};
use super::types::GraphData;
use super::view::{FIT_DURATION, ViewState, ViewTransform, ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR, fit_transform};
use crate::config::ExplorerConfig;

/// Tracks an in-progress node drag operation.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	/// Whether a node is being dragged.
	pub active: bool,
	/// Index of the dragged node.
	pub node_idx: Option<usize>,
	/// Pointer x when the drag started, in screen coordinates.
	pub start_x: f64,
	/// Pointer y when the drag started.
	pub start_y: f64,
	/// Node x when the drag started, in graph coordinates.
	pub node_start_x: f64,
	/// Node y when the drag started.
	pub node_start_y: f64,
}

/// Tracks an in-progress canvas pan operation.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	/// Whether the background is being dragged.
	pub active: bool,
	/// Pointer x when the pan started, in screen coordinates.
	pub start_x: f64,
	/// Pointer y when the pan started.
	pub start_y: f64,
	/// View x translation when the pan started.
	pub transform_start_x: f64,
	/// View y translation when the pan started.
	pub transform_start_y: f64,
}

/// Core explorer state combining data, physics, view, and interaction.
///
/// Created once when the component mounts; [`ExplorerState::regenerate`]
/// replaces everything derived from the data in one step.
pub struct ExplorerState {
	/// Session configuration.
	pub config: ExplorerConfig,
	/// Resources and connections of the current generation.
	pub data: GraphData,
	/// Layout of the current generation.
	pub simulation: Simulation,
	/// Pan/zoom transform.
	pub view: ViewState,
	/// In-progress node drag.
	pub drag: DragState,
	/// In-progress background pan.
	pub pan: PanState,
	/// Hover emphasis.
	pub highlight: HighlightState,
	/// Search filter.
	pub search: SearchFilter,
	/// Visual theme.
	pub theme: Theme,
	/// Viewport width in pixels. Zero while the container has no size.
	pub width: f64,
	/// Viewport height in pixels.
	pub height: f64,
	generation: u32,
	rng: SmallRng,
	/// Seed of the current generation's simulation, reused when a deferred
	/// layout is rebuilt.
	sim_seed: u64,
	edges: Vec<(usize, usize)>,
	scene: Scene,
}

impl ExplorerState {
	/// Builds the first generation for a `width`×`height` viewport.
	///
	/// `seed` drives every random draw of the session.
	pub fn new(config: ExplorerConfig, width: f64, height: f64, seed: u64) -> Self {
		let rng = SmallRng::seed_from_u64(seed);
		let theme = config.resolve_theme();
		info!("resource-graph: session seeded with {}", seed);
		let mut state = Self {
			simulation: Simulation::new(&GraphData::default(), width, height, config.simulation.clone(), 0),
			config,
			data: GraphData::default(),
			view: ViewState::default(),
			drag: DragState::default(),
			pan: PanState::default(),
			highlight: HighlightState::default(),
			search: SearchFilter::default(),
			theme,
			width,
			height,
			generation: 0,
			rng,
			sim_seed: 0,
			edges: Vec::new(),
			scene: Scene::default(),
		};
		state.build_generation();
		state
	}

	/// Discards the current graph and builds a fresh one end to end.
	pub fn regenerate(&mut self) {
		self.generation += 1;
		self.build_generation();
	}

	fn build_generation(&mut self) {
		let resources = generate(self.config.node_count, self.generation, &mut self.rng);
		let connections = synthesize(&resources, &self.config.synthesis, &mut self.rng);
		info!(
			"resource-graph: generation {} with {} resources, {} connections",
			self.generation,
			resources.len(),
			connections.len()
		);
		self.data = GraphData {
			resources,
			connections,
		};

		self.sim_seed = self.rng.next_u64();
		self.rebuild_simulation();
		self.edges = self
			.simulation
			.links()
			.iter()
			.map(|l| (l.source, l.target))
			.collect();

		self.drag = DragState::default();
		self.pan = PanState::default();
		self.highlight = HighlightState::default();
		let query = self.search.query().to_string();
		self.search.set_query(&query, &self.data.resources);
		self.view.set(ViewTransform::IDENTITY);
		self.rebuild_scene();
	}

	fn rebuild_simulation(&mut self) {
		self.simulation = Simulation::new(
			&self.data,
			self.width,
			self.height,
			self.config.simulation.clone(),
			self.sim_seed,
		);
	}

	/// True while the viewport has no area yet. The layout does not run
	/// until a resize delivers real dimensions.
	pub fn layout_deferred(&self) -> bool {
		self.width <= 0.0 || self.height <= 0.0
	}

	/// Index of the current generation, starting at 0.
	pub fn generation(&self) -> u32 {
		self.generation
	}

	/// Scene as of the last tick.
	pub fn scene(&self) -> &Scene {
		&self.scene
	}

	fn rebuild_scene(&mut self) {
		self.scene = Scene::build(
			&self.data.resources,
			&self.data.connections,
			&self.simulation,
			&self.highlight,
			&self.search,
			&self.theme,
		);
	}

	/// One frame: relax the layout, advance animations, then rebuild the scene.
	pub fn tick(&mut self, dt: f64) {
		if !self.layout_deferred() {
			self.simulation.tick();
		}
		self.highlight.tick(dt);
		self.view.tick(dt);
		self.rebuild_scene();
	}

	/// Converts a screen point to graph coordinates.
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		self.view.transform.screen_to_graph(sx, sy)
	}

	/// Topmost node under a screen point.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		self.data
			.resources
			.iter()
			.zip(self.simulation.nodes())
			.enumerate()
			.rev()
			.find(|(i, (r, node))| {
				let radius = resource_radius(r.kind) * self.highlight.node_scale(*i);
				let (dx, dy) = (node.x - gx, node.y - gy);
				(dx * dx + dy * dy).sqrt() < radius
			})
			.map(|(i, _)| i)
	}

	/// Hovers `node` and its neighbours, or clears the hover.
	pub fn set_hover(&mut self, node: Option<usize>) {
		self.highlight.set_hover(node, &self.edges);
	}

	/// Tooltip for the hovered node, anchored at page coordinates.
	pub fn tooltip(&self, page_x: f64, page_y: f64) -> Option<TooltipContent> {
		let idx = self.highlight.hovered_node?;
		let resource = self.data.resources.get(idx)?;
		Some(TooltipContent::new(resource, page_x, page_y))
	}

	/// Pointer pressed: grab the node under the pointer, or start panning.
	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		match self.node_at_position(sx, sy) {
			Some(idx) => self.begin_drag(idx, sx, sy),
			None => {
				self.pan = PanState {
					active: true,
					start_x: sx,
					start_y: sy,
					transform_start_x: self.view.transform.x,
					transform_start_y: self.view.transform.y,
				};
			}
		}
	}

	/// Pointer moved: follow an active drag or pan, otherwise update hover.
	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		if self.drag.active {
			self.drag_to(sx, sy);
		} else if self.pan.active {
			let mut transform = self.view.transform;
			transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
			transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
			self.view.set(transform);
		} else {
			let hovered = self.node_at_position(sx, sy);
			self.set_hover(hovered);
		}
	}

	/// Pointer released: drop any drag or pan.
	pub fn pointer_up(&mut self) {
		self.end_drag();
		self.pan.active = false;
	}

	/// Pointer left the canvas: also clears the hover.
	pub fn pointer_leave(&mut self) {
		self.pointer_up();
		self.set_hover(None);
	}

	/// Pins the node at its current position and warms the simulation.
	pub fn begin_drag(&mut self, idx: usize, sx: f64, sy: f64) {
		let Some(node) = self.simulation.node(idx) else {
			return;
		};
		let (x, y) = (node.x, node.y);
		if !self.drag.active {
			self.simulation
				.set_alpha_target(self.config.simulation.drag_alpha_target);
			self.simulation.restart();
		}
		self.drag = DragState {
			active: true,
			node_idx: Some(idx),
			start_x: sx,
			start_y: sy,
			node_start_x: x,
			node_start_y: y,
		};
		self.simulation.pin(idx, x, y);
	}

	/// Moves the pinned node by the pointer's displacement in graph units.
	pub fn drag_to(&mut self, sx: f64, sy: f64) {
		let Some(idx) = self.drag.node_idx else {
			return;
		};
		let k = self.view.transform.k;
		let nx = self.drag.node_start_x + (sx - self.drag.start_x) / k;
		let ny = self.drag.node_start_y + (sy - self.drag.start_y) / k;
		self.simulation.pin(idx, nx, ny);
	}

	/// Releases the pin and lets the simulation cool.
	pub fn end_drag(&mut self) {
		if !self.drag.active {
			return;
		}
		if let Some(idx) = self.drag.node_idx {
			self.simulation.unpin(idx);
		}
		self.simulation.set_alpha_target(0.0);
		self.drag = DragState::default();
	}

	/// Applies a search query. Empty clears the filter.
	pub fn search(&mut self, query: &str) {
		self.search.set_query(query, &self.data.resources);
		debug!(
			"resource-graph: search {:?} matched {}",
			query,
			self.search.match_count()
		);
		self.rebuild_scene();
	}

	/// Zooms in about the viewport center.
	pub fn zoom_in(&mut self) {
		self.view.zoom_by(ZOOM_IN_FACTOR, self.width, self.height);
	}

	/// Zooms out about the viewport center.
	pub fn zoom_out(&mut self) {
		self.view.zoom_by(ZOOM_OUT_FACTOR, self.width, self.height);
	}

	/// Wheel zoom anchored at the pointer.
	pub fn wheel(&mut self, delta_y: f64, sx: f64, sy: f64) {
		self.view.wheel(delta_y, sx, sy);
	}

	/// Animates the view so all content fits in 90% of the viewport.
	/// No-op for an empty or zero-area layout.
	pub fn fit_to_screen(&mut self) {
		let Some(bounds) = self.scene.bounds() else {
			return;
		};
		match fit_transform(bounds, self.width, self.height) {
			Some(to) => {
				debug!("resource-graph: fit to k={:.3}", to.k);
				self.view.animate_to(to, FIT_DURATION);
			}
			None => debug!("resource-graph: fit skipped for degenerate bounds"),
		}
	}

	/// Animates back to the identity transform.
	pub fn reset_view(&mut self) {
		self.view.animate_to(ViewTransform::IDENTITY, FIT_DURATION);
	}

	/// Tracks the viewport size and re-centers the layout without reheating it.
	///
	/// Zero-sized viewports (container not attached yet) are ignored. The
	/// first real size after a deferred start lays the graph out from
	/// scratch around the new center.
	pub fn resize(&mut self, width: f64, height: f64) {
		if width <= 0.0 || height <= 0.0 {
			debug!("resource-graph: deferring layout for {}x{} viewport", width, height);
			return;
		}
		let was_deferred = self.layout_deferred();
		self.width = width;
		self.height = height;
		if was_deferred {
			info!("resource-graph: starting deferred layout at {}x{}", width, height);
			self.drag = DragState::default();
			self.rebuild_simulation();
			self.rebuild_scene();
		} else {
			self.simulation.set_center(width / 2.0, height / 2.0);
		}
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use super::super::view::MAX_ZOOM;
	use super::*;

	fn state(seed: u64) -> ExplorerState {
		ExplorerState::new(ExplorerConfig::default(), 800.0, 600.0, seed)
	}

	fn screen_pos(state: &ExplorerState, idx: usize) -> (f64, f64) {
		let node = &state.simulation.nodes()[idx];
		state.view.transform.graph_to_screen(node.x, node.y)
	}

	#[test]
	fn builds_default_generation() {
		let s = state(1);
		assert_eq!(s.data.resources.len(), 65);
		assert_eq!(s.scene().nodes.len(), 65);
		assert_eq!(s.scene().edges.len(), s.data.connections.len());
	}

	#[test]
	fn regeneration_replaces_everything() {
		let mut s = state(2);
		for _ in 0..50 {
			s.tick(0.016);
		}
		let old_ids: HashSet<_> = s.data.resources.iter().map(|r| r.id).collect();
		s.set_hover(Some(0));

		s.regenerate();
		assert_eq!(s.generation(), 1);
		assert_eq!(s.simulation.alpha(), 1.0);
		assert!(s.highlight.hovered_node.is_none());
		for r in &s.data.resources {
			assert!(!old_ids.contains(&r.id));
		}
		for c in &s.data.connections {
			assert!(!old_ids.contains(&c.source));
			assert!(!old_ids.contains(&c.target));
		}
	}

	#[test]
	fn drag_pins_then_releases() {
		let mut s = state(3);
		for _ in 0..400 {
			s.tick(0.016);
		}
		assert!(!s.simulation.is_running());

		let (sx, sy) = screen_pos(&s, 5);
		let idx = s.node_at_position(sx, sy).expect("node under pointer");
		s.pointer_down(sx, sy);
		assert!(s.drag.active);
		assert!(s.simulation.is_running());
		assert_eq!(s.simulation.alpha_target(), 0.3);

		s.pointer_move(sx + 40.0, sy - 30.0);
		let (px, py) = {
			let n = &s.simulation.nodes()[idx];
			(n.x, n.y)
		};
		for _ in 0..10 {
			s.tick(0.016);
			let n = &s.simulation.nodes()[idx];
			assert_eq!((n.x, n.y), (px, py));
		}

		s.pointer_up();
		let n = &s.simulation.nodes()[idx];
		assert!(!n.is_pinned());
		assert_eq!((n.x, n.y), (px, py));
		assert_eq!(s.simulation.alpha_target(), 0.0);

		s.tick(0.016);
		let n = &s.simulation.nodes()[idx];
		assert!(((n.x - px).powi(2) + (n.y - py).powi(2)).sqrt() < 30.0);
	}

	#[test]
	fn background_drag_pans() {
		let mut s = state(4);
		s.view.set(ViewTransform {
			x: 0.0,
			y: 0.0,
			k: 0.1,
		});
		// Far outside any node at this zoom.
		s.pointer_down(5000.0, 5000.0);
		assert!(s.pan.active);
		s.pointer_move(5030.0, 5010.0);
		assert_eq!((s.view.transform.x, s.view.transform.y), (30.0, 10.0));
		s.pointer_up();
		assert!(!s.pan.active);
	}

	#[test]
	fn hover_produces_tooltip() {
		let mut s = state(5);
		let (sx, sy) = screen_pos(&s, 0);
		s.pointer_move(sx, sy);
		let hovered = s.highlight.hovered_node.expect("hovering");
		let tip = s.tooltip(200.0, 100.0).expect("tooltip");
		assert_eq!(tip.display_name, s.data.resources[hovered].display_name);
		assert_eq!((tip.x, tip.y), (210.0, 110.0));

		s.pointer_leave();
		assert!(s.tooltip(0.0, 0.0).is_none());
	}

	#[test]
	fn fit_to_screen_brings_content_into_view() {
		let mut s = state(6);
		for _ in 0..300 {
			s.tick(0.016);
		}
		s.fit_to_screen();
		for _ in 0..60 {
			s.tick(0.016);
		}
		let bounds = s.scene().bounds().unwrap();
		let (x0, y0) = s.view.transform.graph_to_screen(bounds.min_x, bounds.min_y);
		let (x1, y1) = s.view.transform.graph_to_screen(bounds.max_x, bounds.max_y);
		assert!(x0 >= -1.0 && y0 >= -1.0 && x1 <= 801.0 && y1 <= 601.0);

		s.reset_view();
		for _ in 0..60 {
			s.tick(0.016);
		}
		assert_eq!(s.view.transform, ViewTransform::IDENTITY);
	}

	#[test]
	fn empty_session_is_tolerated() {
		let config = ExplorerConfig {
			node_count: 0,
			..ExplorerConfig::default()
		};
		let mut s = ExplorerState::new(config, 800.0, 600.0, 7);
		s.tick(0.016);
		s.fit_to_screen();
		s.search("vm");
		assert!(s.data.connections.is_empty());
		assert!(!s.view.is_animating());
	}

	#[test]
	fn resize_recenters_without_reheating() {
		let mut s = state(8);
		for _ in 0..20 {
			s.tick(0.016);
		}
		let alpha = s.simulation.alpha();
		s.resize(1200.0, 900.0);
		assert_eq!(s.simulation.center(), (600.0, 450.0));
		assert_eq!(s.simulation.alpha(), alpha);

		s.resize(0.0, 0.0);
		assert_eq!((s.width, s.height), (1200.0, 900.0));
	}

	fn layout_mean(s: &ExplorerState) -> (f64, f64) {
		let nodes = s.simulation.nodes();
		let n = nodes.len() as f64;
		(
			nodes.iter().map(|p| p.x).sum::<f64>() / n,
			nodes.iter().map(|p| p.y).sum::<f64>() / n,
		)
	}

	#[test]
	fn zero_sized_start_defers_layout() {
		let mut deferred = ExplorerState::new(ExplorerConfig::default(), 0.0, 0.0, 10);
		assert!(deferred.layout_deferred());
		let before: Vec<_> = deferred.simulation.nodes().iter().map(|p| (p.x, p.y)).collect();
		for _ in 0..20 {
			deferred.tick(0.016);
		}
		let after: Vec<_> = deferred.simulation.nodes().iter().map(|p| (p.x, p.y)).collect();
		assert_eq!(before, after);
		assert_eq!(deferred.simulation.alpha(), 1.0);

		deferred.resize(800.0, 600.0);
		assert!(!deferred.layout_deferred());
		let sized = state(10);
		let (a, b) = (deferred.simulation.nodes(), sized.simulation.nodes());
		assert_eq!(a.len(), b.len());
		for (p, q) in a.iter().zip(b) {
			assert_eq!((p.x, p.y), (q.x, q.y));
		}
	}

	#[test]
	fn deferred_layout_stays_centered_through_drag() {
		let mut s = ExplorerState::new(ExplorerConfig::default(), 0.0, 0.0, 11);
		s.resize(800.0, 600.0);
		for _ in 0..400 {
			s.tick(0.016);
		}

		let (sx, sy) = screen_pos(&s, 5);
		s.pointer_down(sx, sy);
		assert!(s.drag.active);
		for i in 0..200 {
			let t = i as f64 * 0.05;
			s.pointer_move(sx + 20.0 * t.cos(), sy + 20.0 * t.sin());
			s.tick(0.016);
		}
		s.pointer_up();

		let (mx, my) = layout_mean(&s);
		assert!((mx - 400.0).abs() < 5.0, "mean x {mx}");
		assert!((my - 300.0).abs() < 5.0, "mean y {my}");
	}

	#[test]
	fn fit_keeps_single_resource_within_zoom_range() {
		let config = ExplorerConfig {
			node_count: 1,
			..ExplorerConfig::default()
		};
		let mut s = ExplorerState::new(config, 800.0, 600.0, 12);
		s.fit_to_screen();
		for _ in 0..100 {
			s.tick(0.016);
		}
		assert!(s.view.transform.k <= MAX_ZOOM);
		s.zoom_in();
		for _ in 0..30 {
			s.tick(0.016);
		}
		assert!(s.view.transform.k <= MAX_ZOOM);
	}

	#[test]
	fn search_survives_regeneration() {
		let mut s = state(9);
		s.search("rg-production");
		s.regenerate();
		assert_eq!(s.search.query(), "rg-production");
		let expected = s
			.data
			.resources
			.iter()
			.filter(|r| r.resource_group == "rg-production")
			.count();
		assert!(s.search.match_count() >= expected);
	}
}

//! Scene derivation: semantic attributes to visual encodings.
//!
//! Each frame the scene is rebuilt from the resources, the simulation's live
//! positions, and the interaction state (hover highlight, search filter).
//! The output is a flat list of declarative primitives, indexed like the
//! resources and connections they come from, that the canvas renderer
//! draws as-is.

use std::collections::{HashMap, HashSet};

use super::simulation::Simulation;
use super::theme::{
	Theme, connection_color, resource_color, resource_radius, status_color,
};
use super::types::{Connection, ConnectionKind, Resource, Status};
use super::view::Bounds;

/// Labels longer than this are truncated with an ellipsis.
pub const MAX_LABEL_CHARS: usize = 14;

/// Default opacities.
pub const EDGE_OPACITY: f64 = 0.6;
const HOVER_DIM_NODE: f64 = 0.3;
const HOVER_DIM_EDGE: f64 = 0.1;
const HOVER_EDGE: f64 = 1.0;
const SEARCH_DIM_NODE: f64 = 0.2;
const SEARCH_DIM_EDGE: f64 = 0.1;

/// Scale applied to the hovered node.
pub const HOVER_SCALE: f64 = 1.2;

/// Approximate label glyph width, for content bounds.
const LABEL_CHAR_WIDTH: f64 = 6.5;
const LABEL_HEIGHT: f64 = 12.0;

/// `display_name` cut to [`MAX_LABEL_CHARS`] including a trailing `...`.
pub fn truncate_label(name: &str) -> String {
	if name.chars().count() > MAX_LABEL_CHARS {
		let head: String = name.chars().take(MAX_LABEL_CHARS - 3).collect();
		format!("{head}...")
	} else {
		name.to_string()
	}
}

/// Stroke width: heavy for network/security or strong links.
pub fn connection_width(connection: &Connection) -> f64 {
	match connection.kind {
		ConnectionKind::Network | ConnectionKind::Security => 2.0,
		_ if connection.strength > 0.7 => 2.0,
		_ => 1.0,
	}
}

/// Case-insensitive substring match over the searchable attributes.
pub fn matches_query(resource: &Resource, query: &str) -> bool {
	let query = query.to_lowercase();
	let hit = |field: &str| field.to_lowercase().contains(&query);
	hit(&resource.display_name)
		|| hit(resource.kind.display_name())
		|| hit(resource.category.as_str())
		|| hit(resource.resource_group)
		|| hit(resource.location)
		|| resource.tags.values().any(|v| hit(v))
}

/// Search filter state. An empty query filters nothing.
#[derive(Clone, Debug, Default)]
pub struct SearchFilter {
	query: String,
	matches: HashSet<usize>,
}

impl SearchFilter {
	/// Recomputes the matching set for `query`.
	pub fn set_query(&mut self, query: &str, resources: &[Resource]) {
		self.query = query.to_string();
		self.matches = if query.is_empty() {
			HashSet::new()
		} else {
			resources
				.iter()
				.enumerate()
				.filter(|(_, r)| matches_query(r, query))
				.map(|(i, _)| i)
				.collect()
		};
	}

	/// Current query, as typed.
	pub fn query(&self) -> &str {
		&self.query
	}

	/// Whether a non-empty query is applied.
	pub fn is_active(&self) -> bool {
		!self.query.is_empty()
	}

	/// Whether resource `idx` matches the active query.
	pub fn is_match(&self, idx: usize) -> bool {
		self.matches.contains(&idx)
	}

	/// Number of matching resources.
	pub fn match_count(&self) -> usize {
		self.matches.len()
	}
}

/// Hover highlight: the hovered node, its neighbours, and a smoothed
/// per-node scale so the hovered node grows and shrinks over ~200 ms.
#[derive(Clone, Debug, Default)]
pub struct HighlightState {
	/// Currently hovered node (if any)
	pub hovered_node: Option<usize>,
	/// Hovered node plus its direct neighbours.
	connected: HashSet<usize>,
	/// Per-node hover intensity (0.0 = resting, 1.0 = fully scaled).
	/// Nodes not in this map have intensity 0.
	scale_intensity: HashMap<usize, f64>,
}

impl HighlightState {
	/// Update the hovered node and recompute its neighbourhood.
	///
	/// Replaces any previous hover outright; nothing from the old set survives.
	pub fn set_hover(&mut self, node: Option<usize>, edges: &[(usize, usize)]) {
		if self.hovered_node == node {
			return;
		}

		self.hovered_node = node;
		self.connected.clear();

		if let Some(idx) = node {
			self.connected.insert(idx);
			for &(src, tgt) in edges {
				if src == idx {
					self.connected.insert(tgt);
				} else if tgt == idx {
					self.connected.insert(src);
				}
			}
		}
	}

	/// Whether a node is hovered.
	pub fn is_active(&self) -> bool {
		self.hovered_node.is_some()
	}

	/// Whether `idx` is the hovered node or one of its neighbours.
	pub fn is_connected(&self, idx: usize) -> bool {
		self.connected.contains(&idx)
	}

	/// Animate scale intensities using exponential smoothing.
	pub fn tick(&mut self, dt: f64) {
		// ~200 ms to 95%.
		const SPEED: f64 = 15.0;
		let factor = 1.0 - (-SPEED * dt).exp();

		if let Some(idx) = self.hovered_node {
			self.scale_intensity.entry(idx).or_insert(0.0);
		}
		let hovered = self.hovered_node;
		self.scale_intensity.retain(|idx, intensity| {
			let target = if hovered == Some(*idx) { 1.0 } else { 0.0 };
			*intensity += (target - *intensity) * factor;
			target > 0.0 || *intensity > 0.005
		});
	}

	/// Current scale factor for a node, 1.0 at rest.
	pub fn node_scale(&self, idx: usize) -> f64 {
		let t = self.scale_intensity.get(&idx).copied().unwrap_or(0.0);
		1.0 + (HOVER_SCALE - 1.0) * t
	}
}

/// Drawable node: circle, icon glyph, status dot.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeVisual {
	/// Horizontal center in graph coordinates.
	pub x: f64,
	/// Vertical center.
	pub y: f64,
	/// Resting radius, before hover scaling.
	pub radius: f64,
	/// CSS fill color.
	pub fill: &'static str,
	/// Glyph drawn inside the circle.
	pub icon: &'static str,
	/// CSS color of the status dot.
	pub status_color: &'static str,
	/// Opacity from hover and search state.
	pub opacity: f64,
	/// Hover scale factor, 1.0 at rest.
	pub scale: f64,
}

/// Drawable label, positioned below its node.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelVisual {
	/// Horizontal center of the text in graph coordinates.
	pub x: f64,
	/// Baseline.
	pub y: f64,
	/// Possibly truncated display name.
	pub text: String,
	/// Opacity from the search filter.
	pub opacity: f64,
}

/// Drawable connection line.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeVisual {
	/// Source x in graph coordinates.
	pub x1: f64,
	/// Source y.
	pub y1: f64,
	/// Target x in graph coordinates.
	pub x2: f64,
	/// Target y.
	pub y2: f64,
	/// CSS stroke color.
	pub stroke: &'static str,
	/// Stroke width in world units.
	pub width: f64,
	/// Drawn with the cross-group dash pattern.
	pub dashed: bool,
	/// Opacity from hover and search state.
	pub opacity: f64,
}

/// Everything the renderer needs for one frame.
#[derive(Clone, Debug, Default)]
pub struct Scene {
	/// One per resource, in resource order.
	pub nodes: Vec<NodeVisual>,
	/// Label per resource, in resource order.
	pub labels: Vec<LabelVisual>,
	/// One per resolved connection, in connection order.
	pub edges: Vec<EdgeVisual>,
}

impl Scene {
	/// Builds the frame from current positions and interaction state.
	///
	/// Hover emphasis takes precedence over the search filter on nodes and
	/// edges; labels follow the search filter only.
	pub fn build(
		resources: &[Resource],
		connections: &[Connection],
		simulation: &Simulation,
		highlight: &HighlightState,
		search: &SearchFilter,
		theme: &Theme,
	) -> Self {
		let positions = simulation.nodes();

		let nodes = resources
			.iter()
			.zip(positions)
			.enumerate()
			.map(|(i, (r, p))| NodeVisual {
				x: p.x,
				y: p.y,
				radius: resource_radius(r.kind),
				fill: resource_color(r.kind),
				icon: r.kind.icon(),
				status_color: status_color(r.status),
				opacity: node_opacity(i, highlight, search),
				scale: highlight.node_scale(i),
			})
			.collect();

		let labels = resources
			.iter()
			.zip(positions)
			.enumerate()
			.map(|(i, (r, p))| LabelVisual {
				x: p.x,
				y: p.y + resource_radius(r.kind) + theme.node.label_offset,
				text: truncate_label(&r.display_name),
				opacity: if search.is_active() && !search.is_match(i) {
					SEARCH_DIM_NODE
				} else {
					1.0
				},
			})
			.collect();

		let edges = simulation
			.links()
			.iter()
			.filter_map(|link| Some((connections.get(link.connection)?, link)))
			.map(|(c, link)| {
				let (s, t) = (&positions[link.source], &positions[link.target]);
				EdgeVisual {
					x1: s.x,
					y1: s.y,
					x2: t.x,
					y2: t.y,
					stroke: connection_color(c.kind),
					width: connection_width(c),
					dashed: c.kind == ConnectionKind::CrossRg,
					opacity: edge_opacity(link.source, link.target, highlight, search),
				}
			})
			.collect();

		Self {
			nodes,
			labels,
			edges,
		}
	}

	/// Bounds of all drawn content in graph coordinates, or `None` when empty.
	pub fn bounds(&self) -> Option<Bounds> {
		let circles = self.nodes.iter().map(|n| {
			let r = n.radius * n.scale;
			Bounds::new(n.x - r, n.y - r, n.x + r, n.y + r)
		});
		let labels = self.labels.iter().map(|l| {
			let half = l.text.chars().count() as f64 * LABEL_CHAR_WIDTH / 2.0;
			Bounds::new(l.x - half, l.y - LABEL_HEIGHT, l.x + half, l.y)
		});
		circles.chain(labels).reduce(Bounds::union)
	}
}

fn node_opacity(idx: usize, highlight: &HighlightState, search: &SearchFilter) -> f64 {
	if highlight.is_active() {
		if highlight.is_connected(idx) {
			1.0
		} else {
			HOVER_DIM_NODE
		}
	} else if search.is_active() && !search.is_match(idx) {
		SEARCH_DIM_NODE
	} else {
		1.0
	}
}

fn edge_opacity(src: usize, tgt: usize, highlight: &HighlightState, search: &SearchFilter) -> f64 {
	if let Some(hovered) = highlight.hovered_node {
		if src == hovered || tgt == hovered {
			HOVER_EDGE
		} else {
			HOVER_DIM_EDGE
		}
	} else if search.is_active() && !(search.is_match(src) || search.is_match(tgt)) {
		SEARCH_DIM_EDGE
	} else {
		EDGE_OPACITY
	}
}

/// Detail card content for the hovered resource.
#[derive(Clone, Debug, PartialEq)]
pub struct TooltipContent {
	/// Page coordinates of the card's top-left corner.
	pub x: f64,
	/// Top of the card in page coordinates.
	pub y: f64,
	/// Resource kind glyph.
	pub icon: &'static str,
	/// Resource display name.
	pub display_name: String,
	/// Resource kind display name.
	pub kind: &'static str,
	/// Category name.
	pub category: &'static str,
	/// Resource group.
	pub resource_group: &'static str,
	/// Location.
	pub location: &'static str,
	/// Subscription.
	pub subscription: &'static str,
	/// Operational status.
	pub status: Status,
	/// Glyph shown before the status.
	pub status_icon: &'static str,
	/// CSS color of the status text.
	pub status_color: &'static str,
	/// Tag key/value pairs in key order.
	pub tags: Vec<(&'static str, &'static str)>,
}

/// Offset of the card from the pointer.
const TOOLTIP_OFFSET: f64 = 10.0;

impl TooltipContent {
	/// Card for `resource`, offset from the pointer at page coordinates.
	pub fn new(resource: &Resource, page_x: f64, page_y: f64) -> Self {
		Self {
			x: page_x + TOOLTIP_OFFSET,
			y: page_y + TOOLTIP_OFFSET,
			icon: resource.kind.icon(),
			display_name: resource.display_name.clone(),
			kind: resource.kind.display_name(),
			category: resource.category.as_str(),
			resource_group: resource.resource_group,
			location: resource.location,
			subscription: resource.subscription,
			status: resource.status,
			status_icon: resource.status.icon(),
			status_color: status_color(resource.status),
			tags: resource.tags.iter().map(|(k, v)| (*k, *v)).collect(),
		}
	}
}

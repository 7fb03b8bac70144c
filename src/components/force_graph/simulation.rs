//! Force-directed layout engine.
//!
//! A continuous velocity-Verlet style relaxation driven by a decaying energy
//! parameter, `alpha`. Each tick composes five forces into node velocities:
//!
//! - link springs toward a per-connection rest length, scaled by strength
//! - many-body repulsion (per-kind charge)
//! - centering (shifts the whole layout so its mean sits on the center)
//! - collision (minimum separation by per-kind radius)
//! - weak positional pull toward the center on each axis
//!
//! then damps velocities and integrates positions. Pinned nodes (`fx`/`fy`)
//! are held in place. The simulation never terminates on its own; it idles
//! once alpha drops below `alpha_min` and wakes again on [`Simulation::restart`].
//!
//! # Usage
//! ```ignore
//! let mut sim = Simulation::new(&data, width, height, SimulationConfig::default(), seed);
//! // Each frame:
//! sim.tick();
//! for node in sim.nodes() {
//!     draw_circle(node.x, node.y);
//! }
//! ```

use std::collections::HashMap;
use std::f64::consts::PI;

use log::{debug, warn};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

use super::types::{Category, ConnectionKind, GraphData, Resource, ResourceKind};

/// Tunables for the simulation's energy schedule and drag behaviour.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
	/// Alpha below which the simulation idles.
	pub alpha_min: f64,
	/// Fraction of the distance to `alpha_target` covered each tick.
	pub alpha_decay: f64,
	/// Fraction of velocity lost each tick.
	pub velocity_decay: f64,
	/// Alpha target held while a node is dragged.
	pub drag_alpha_target: f64,
	/// Strength of the per-axis pull toward the center.
	pub position_strength: f64,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		let alpha_min: f64 = 0.001;
		Self {
			alpha_min,
			// Reaches alpha_min from 1.0 in ~300 ticks.
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			velocity_decay: 0.4,
			drag_alpha_target: 0.3,
			position_strength: 0.1,
		}
	}
}

/// Rest length of a link spring.
pub fn link_distance(kind: ConnectionKind) -> f64 {
	match kind {
		ConnectionKind::Network => 60.0,
		ConnectionKind::SameRg => 80.0,
		ConnectionKind::Security => 70.0,
		_ => 100.0,
	}
}

/// Many-body charge. Negative values repel.
pub fn charge(kind: ResourceKind) -> f64 {
	if kind.is_network_hub() {
		-400.0
	} else if kind.category() == Category::Database {
		-250.0
	} else {
		-200.0
	}
}

/// Collision radius.
pub fn collision_radius(kind: ResourceKind) -> f64 {
	if kind.is_network_hub() {
		35.0
	} else if kind.category() == Category::Database {
		30.0
	} else {
		25.0
	}
}

/// Position and velocity state of one node.
#[derive(Clone, Debug, Default)]
pub struct SimNode {
	/// Horizontal position.
	pub x: f64,
	/// Vertical position.
	pub y: f64,
	/// Horizontal velocity.
	pub vx: f64,
	/// Vertical velocity.
	pub vy: f64,
	/// Pinned x, set only while dragged.
	pub fx: Option<f64>,
	/// Pinned y, set only while dragged.
	pub fy: Option<f64>,
	charge: f64,
	radius: f64,
}

impl SimNode {
	fn new(resource: &Resource, x: f64, y: f64) -> Self {
		Self {
			x,
			y,
			charge: charge(resource.kind),
			radius: collision_radius(resource.kind),
			..Self::default()
		}
	}

	/// Whether either axis is pinned.
	pub fn is_pinned(&self) -> bool {
		self.fx.is_some() || self.fy.is_some()
	}
}

/// A connection resolved to node indices.
#[derive(Clone, Debug)]
pub struct SimLink {
	/// Index of the originating connection.
	pub connection: usize,
	/// Index of the source node.
	pub source: usize,
	/// Index of the target node.
	pub target: usize,
	/// Rest length.
	pub distance: f64,
	/// Spring strength.
	pub strength: f64,
	/// Share of the correction applied to the target, by relative degree.
	bias: f64,
}

/// Force simulation over one generation's graph.
///
/// Node `i` corresponds to `GraphData::resources[i]`. Links whose endpoints
/// cannot be resolved are dropped, so links refer back to their connection
/// by index.
#[derive(Clone, Debug)]
pub struct Simulation {
	nodes: Vec<SimNode>,
	links: Vec<SimLink>,
	/// Tuning parameters.
	pub config: SimulationConfig,
	alpha: f64,
	alpha_target: f64,
	running: bool,
	center: (f64, f64),
	/// Target of the per-axis positional pull. Fixed at construction.
	anchor: (f64, f64),
	rng: SmallRng,
}

/// Initial placement spacing, matching a phyllotaxis spiral.
const INITIAL_RADIUS: f64 = 10.0;

impl Simulation {
	/// Lays `data` out on a phyllotaxis spiral around the viewport center.
	///
	/// `seed` drives the jiggle applied to coincident nodes.
	pub fn new(data: &GraphData, width: f64, height: f64, config: SimulationConfig, seed: u64) -> Self {
		let center = (width / 2.0, height / 2.0);
		let initial_angle = PI * (3.0 - 5.0_f64.sqrt());

		let nodes: Vec<SimNode> = data
			.resources
			.iter()
			.enumerate()
			.map(|(i, resource)| {
				let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
				let angle = i as f64 * initial_angle;
				SimNode::new(
					resource,
					center.0 + radius * angle.cos(),
					center.1 + radius * angle.sin(),
				)
			})
			.collect();

		let id_to_idx: HashMap<_, _> = data
			.resources
			.iter()
			.enumerate()
			.map(|(i, r)| (r.id, i))
			.collect();

		let mut degree = vec![0usize; nodes.len()];
		let mut links = Vec::with_capacity(data.connections.len());
		for (ci, connection) in data.connections.iter().enumerate() {
			match (
				id_to_idx.get(&connection.source),
				id_to_idx.get(&connection.target),
			) {
				(Some(&source), Some(&target)) => {
					degree[source] += 1;
					degree[target] += 1;
					links.push(SimLink {
						connection: ci,
						source,
						target,
						distance: link_distance(connection.kind),
						strength: connection.strength,
						bias: 0.5,
					});
				}
				_ => warn!(
					"simulation: dropping connection {} -> {} with unknown endpoint",
					connection.source, connection.target
				),
			}
		}
		for link in &mut links {
			let (s, t) = (degree[link.source] as f64, degree[link.target] as f64);
			link.bias = s / (s + t);
		}

		Self {
			nodes,
			links,
			config,
			alpha: 1.0,
			alpha_target: 0.0,
			running: true,
			center,
			anchor: center,
			rng: SmallRng::seed_from_u64(seed),
		}
	}

	/// Nodes, indexed like `GraphData::resources`.
	pub fn nodes(&self) -> &[SimNode] {
		&self.nodes
	}

	/// Resolved links.
	pub fn links(&self) -> &[SimLink] {
		&self.links
	}

	/// Node at `idx`, if any.
	pub fn node(&self, idx: usize) -> Option<&SimNode> {
		self.nodes.get(idx)
	}

	/// Current energy.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Energy the simulation decays toward.
	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	/// Sets the energy the simulation decays toward.
	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target;
	}

	/// Whether the simulation is still actively relaxing.
	pub fn is_running(&self) -> bool {
		self.running
	}

	/// Wakes an idle simulation without resetting alpha.
	pub fn restart(&mut self) {
		self.running = true;
	}

	/// Target of the centering force.
	pub fn center(&self) -> (f64, f64) {
		self.center
	}

	/// Moves the centering force target. Alpha is left untouched.
	pub fn set_center(&mut self, x: f64, y: f64) {
		self.center = (x, y);
	}

	/// Advances one tick if running. Returns whether a step was taken.
	pub fn tick(&mut self) -> bool {
		if !self.running {
			return false;
		}
		self.step();
		if self.alpha < self.config.alpha_min {
			self.running = false;
			debug!("simulation: settled at alpha {:.5}", self.alpha);
		}
		true
	}

	/// One unconditional relaxation step.
	pub fn step(&mut self) {
		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
		if self.nodes.is_empty() {
			return;
		}

		self.apply_links();
		self.apply_many_body();
		self.apply_center();
		self.apply_collision();
		self.apply_position();

		let keep = 1.0 - self.config.velocity_decay;
		for node in &mut self.nodes {
			match node.fx {
				Some(fx) => {
					node.x = fx;
					node.vx = 0.0;
				}
				None => {
					node.vx *= keep;
					node.x += node.vx;
				}
			}
			match node.fy {
				Some(fy) => {
					node.y = fy;
					node.vy = 0.0;
				}
				None => {
					node.vy *= keep;
					node.y += node.vy;
				}
			}
		}
	}

	/// Pins a node at `(x, y)` and moves it there immediately.
	pub fn pin(&mut self, idx: usize, x: f64, y: f64) {
		if let Some(node) = self.nodes.get_mut(idx) {
			node.fx = Some(x);
			node.fy = Some(y);
			node.x = x;
			node.y = y;
		}
	}

	/// Releases a pin. The node keeps its current position and velocity.
	pub fn unpin(&mut self, idx: usize) {
		if let Some(node) = self.nodes.get_mut(idx) {
			node.fx = None;
			node.fy = None;
		}
	}

	/// Tiny random offset used to separate coincident nodes.
	fn jiggle(&mut self) -> f64 {
		(self.rng.r#gen::<f64>() - 0.5) * 1e-6
	}

	fn apply_links(&mut self) {
		for l in 0..self.links.len() {
			let link = self.links[l].clone();
			let (s, t) = (&self.nodes[link.source], &self.nodes[link.target]);
			let mut x = t.x + t.vx - s.x - s.vx;
			let mut y = t.y + t.vy - s.y - s.vy;
			if x == 0.0 {
				x = self.jiggle();
			}
			if y == 0.0 {
				y = self.jiggle();
			}
			let len = (x * x + y * y).sqrt();
			let k = (len - link.distance) / len * self.alpha * link.strength;
			x *= k;
			y *= k;

			let target = &mut self.nodes[link.target];
			target.vx -= x * link.bias;
			target.vy -= y * link.bias;
			let source = &mut self.nodes[link.source];
			source.vx += x * (1.0 - link.bias);
			source.vy += y * (1.0 - link.bias);
		}
	}

	fn apply_many_body(&mut self) {
		const DISTANCE_MIN2: f64 = 1.0;
		let n = self.nodes.len();
		let mut dv = vec![(0.0, 0.0); n];

		for i in 0..n {
			for j in 0..n {
				if i == j {
					continue;
				}
				let mut x = self.nodes[j].x - self.nodes[i].x;
				let mut y = self.nodes[j].y - self.nodes[i].y;
				if x == 0.0 {
					x = self.jiggle();
				}
				if y == 0.0 {
					y = self.jiggle();
				}
				let mut l = x * x + y * y;
				if l < DISTANCE_MIN2 {
					l = (DISTANCE_MIN2 * l).sqrt();
				}
				let w = self.nodes[j].charge * self.alpha / l;
				dv[i].0 += x * w;
				dv[i].1 += y * w;
			}
		}

		for (node, (dx, dy)) in self.nodes.iter_mut().zip(dv) {
			node.vx += dx;
			node.vy += dy;
		}
	}

	fn apply_center(&mut self) {
		let n = self.nodes.len() as f64;
		let (sx, sy) = self
			.nodes
			.iter()
			.fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
		let (dx, dy) = (sx / n - self.center.0, sy / n - self.center.1);
		for node in &mut self.nodes {
			node.x -= dx;
			node.y -= dy;
		}
	}

	fn apply_collision(&mut self) {
		let n = self.nodes.len();
		for i in 0..n {
			for j in (i + 1)..n {
				let (a, b) = (&self.nodes[i], &self.nodes[j]);
				let r = a.radius + b.radius;
				let mut x = (a.x + a.vx) - (b.x + b.vx);
				let mut y = (a.y + a.vy) - (b.y + b.vy);
				let mut l = x * x + y * y;
				if l >= r * r {
					continue;
				}
				if x == 0.0 {
					x = self.jiggle();
					l += x * x;
				}
				if y == 0.0 {
					y = self.jiggle();
					l += y * y;
				}
				let (ra2, rb2) = (self.nodes[i].radius.powi(2), self.nodes[j].radius.powi(2));
				let len = l.sqrt();
				let k = (r - len) / len;
				x *= k;
				y *= k;
				let share = rb2 / (ra2 + rb2);

				let a = &mut self.nodes[i];
				a.vx += x * share;
				a.vy += y * share;
				let b = &mut self.nodes[j];
				b.vx -= x * (1.0 - share);
				b.vy -= y * (1.0 - share);
			}
		}
	}

	fn apply_position(&mut self) {
		let k = self.config.position_strength * self.alpha;
		let (ax, ay) = self.anchor;
		for node in &mut self.nodes {
			node.vx += (ax - node.x) * k;
			node.vy += (ay - node.y) * k;
		}
	}
}

//! Explorer configuration.
//!
//! Every field has a default, so an absent or partial JSON document is valid.
//! Expected format:
//!
//! ```json
//! {
//!   "node_count": 65,
//!   "theme": "portal-light",
//!   "seed": 42,
//!   "synthesis": { "connect_noise_probability": 0.2, "cross_group_probability": 0.3 },
//!   "simulation": { "velocity_decay": 0.4, "drag_alpha_target": 0.3 }
//! }
//! ```

use log::warn;
use serde::Deserialize;

use crate::components::force_graph::{DEFAULT_NODE_COUNT, SimulationConfig, SynthesisConfig, Theme};

/// Top-level configuration for one explorer session.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
	/// Resources per generation.
	pub node_count: usize,
	/// Fixed seed for reproducible graphs. `None` seeds from the clock.
	pub seed: Option<u64>,
	/// Name of the visual theme preset.
	pub theme: String,
	/// Probabilities used when deriving connections.
	pub synthesis: SynthesisConfig,
	/// Force layout tuning.
	pub simulation: SimulationConfig,
}

impl Default for ExplorerConfig {
	fn default() -> Self {
		Self {
			node_count: DEFAULT_NODE_COUNT,
			seed: None,
			theme: Theme::default().name.to_string(),
			synthesis: SynthesisConfig::default(),
			simulation: SimulationConfig::default(),
		}
	}
}

impl ExplorerConfig {
	/// Theme preset named by `theme`, or the default preset when unknown.
	pub fn resolve_theme(&self) -> Theme {
		Theme::named(&self.theme).unwrap_or_else(|| {
			warn!("resource-graph: unknown theme {:?}, using default", self.theme);
			Theme::default()
		})
	}

	/// Parses a JSON document, falling back to defaults when it is malformed.
	pub fn from_json(text: &str) -> Self {
		match serde_json::from_str::<ExplorerConfig>(text) {
			Ok(config) => config,
			Err(e) => {
				warn!("resource-graph: ignoring malformed config: {}", e);
				Self::default()
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_document_keeps_defaults() {
		let config = ExplorerConfig::from_json(
			r#"{ "seed": 7, "synthesis": { "cross_group_probability": 0.5 } }"#,
		);
		assert_eq!(config.seed, Some(7));
		assert_eq!(config.node_count, 65);
		assert_eq!(config.synthesis.cross_group_probability, 0.5);
		assert_eq!(config.synthesis.connect_noise_probability, 0.2);
		assert_eq!(config.simulation.velocity_decay, 0.4);
	}

	#[test]
	fn theme_is_resolved_by_name() {
		let config = ExplorerConfig::from_json(r#"{ "theme": "portal-light" }"#);
		assert_eq!(config.resolve_theme().name, "portal-light");
		assert_eq!(ExplorerConfig::default().resolve_theme().name, "portal-dark");

		let unknown = ExplorerConfig::from_json(r#"{ "theme": "solarized" }"#);
		assert_eq!(unknown.resolve_theme().name, "portal-dark");
	}

	#[test]
	fn malformed_document_falls_back() {
		let config = ExplorerConfig::from_json("{ node_count: ");
		assert_eq!(config.node_count, 65);
		assert_eq!(config.seed, None);
	}
}

//! Resource graph explorer component.
//!
//! Renders a synthetic cloud-resource topology as an interactive
//! force-directed graph on an HTML canvas:
//! - Procedural resources and rule-based connections between them
//! - Physics-based layout with node dragging and pinning
//! - Pan, zoom, fit-to-screen and animated view transitions
//! - Hover highlighting with tooltips, and a free-text search filter
//!
//! Everything except `component` and `render` is plain Rust and runs
//! outside the browser.
//!
//! # Example
//!
//! ```ignore
//! use resource_graph_explorer::components::force_graph::ResourceGraphExplorer;
//! use resource_graph_explorer::config::ExplorerConfig;
//!
//! view! { <ResourceGraphExplorer config=ExplorerConfig::default() seed=42 /> }
//! ```

mod component;
pub mod generator;
mod render;
pub mod scene;
pub mod simulation;
pub mod state;
pub mod synthesis;
pub mod theme;
pub mod types;
pub mod view;

pub use component::ResourceGraphExplorer;
pub use generator::DEFAULT_NODE_COUNT;
pub use simulation::{Simulation, SimulationConfig};
pub use state::ExplorerState;
pub use synthesis::SynthesisConfig;
pub use theme::Theme;
pub use types::{Connection, ConnectionKind, GraphData, Resource, ResourceId, ResourceKind, Status};

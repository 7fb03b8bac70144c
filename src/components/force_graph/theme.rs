//! Visual theming for the resource graph.
//!
//! Holds the color type, the per-kind lookup tables (fill, size, edge
//! stroke, status dot), and the scene-wide style.

use super::types::{ConnectionKind, ResourceKind, Status};

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Opacity, 0.0 to 1.0.
	pub a: f64,
}

impl Color {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color with opacity.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Parses `#rrggbb`. Anything else falls back to mid gray.
	pub fn from_hex(hex: &str) -> Self {
		let channel = |range: std::ops::Range<usize>| {
			hex.get(range)
				.and_then(|s| u8::from_str_radix(s, 16).ok())
				.unwrap_or(128)
		};
		if hex.len() == 7 && hex.starts_with('#') {
			Self::rgb(channel(1..3), channel(3..5), channel(5..7))
		} else {
			Self::rgb(128, 128, 128)
		}
	}

	/// Same color with opacity `a`.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Lighten the color by a factor (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		let f = factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 + (255.0 - self.r as f64) * f) as u8,
			g: (self.g as f64 + (255.0 - self.g as f64) * f) as u8,
			b: (self.b as f64 + (255.0 - self.b as f64) * f) as u8,
			a: self.a,
		}
	}

	/// Darken the color by a factor (0.0 = unchanged, 1.0 = black)
	pub fn darken(self, factor: f64) -> Self {
		let f = 1.0 - factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 * f) as u8,
			g: (self.g as f64 * f) as u8,
			b: (self.b as f64 * f) as u8,
			a: self.a,
		}
	}

	/// CSS color string: hex when opaque, `rgba()` otherwise.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Fill used for kinds without an entry in [`resource_color`].
pub const DEFAULT_RESOURCE_COLOR: &str = "#0078d4";
/// Radius used for kinds without an entry in [`resource_radius`].
pub const DEFAULT_RESOURCE_RADIUS: f64 = 12.0;

/// Node fill color.
pub fn resource_color(kind: ResourceKind) -> &'static str {
	match kind {
		ResourceKind::VirtualMachine => "#0078d4",
		ResourceKind::StorageAccount => "#00bcf2",
		ResourceKind::VirtualNetwork => "#40e0d0",
		ResourceKind::KeyVault => "#ffb900",
		ResourceKind::AppService => "#00a4ef",
		ResourceKind::SqlDatabase => "#ff8c00",
		ResourceKind::LoadBalancer => "#5c2d91",
		ResourceKind::NetworkSecurityGroup => "#e81123",
		ResourceKind::PublicIp => "#107c10",
		ResourceKind::ApplicationGateway => "#881798",
		ResourceKind::ContainerRegistry => "#00188f",
		ResourceKind::FunctionApp => "#0078d4",
		_ => DEFAULT_RESOURCE_COLOR,
	}
}

/// Node radius in world units.
pub fn resource_radius(kind: ResourceKind) -> f64 {
	match kind {
		ResourceKind::VirtualNetwork => 18.0,
		ResourceKind::LoadBalancer | ResourceKind::ApplicationGateway => 16.0,
		ResourceKind::SqlDatabase | ResourceKind::CosmosDb => 15.0,
		ResourceKind::KeyVault | ResourceKind::VirtualMachine => 14.0,
		ResourceKind::AppService | ResourceKind::StorageAccount => 13.0,
		ResourceKind::FunctionApp | ResourceKind::BlobStorage => 12.0,
		_ => DEFAULT_RESOURCE_RADIUS,
	}
}

/// Edge stroke color.
pub fn connection_color(kind: ConnectionKind) -> &'static str {
	match kind {
		ConnectionKind::Network => "#0078d4",
		ConnectionKind::Security => "#ffb900",
		ConnectionKind::SameRg => "#40e0d0",
		ConnectionKind::Dependency => "#8a8886",
		ConnectionKind::CrossRg => "#5c2d91",
	}
}

/// Status dot color.
pub fn status_color(status: Status) -> &'static str {
	match status {
		Status::Running => "#107c10",
		Status::Stopped => "#d13438",
		Status::Warning => "#ffb900",
	}
}

/// Background style configuration.
#[derive(Clone, Debug)]
pub struct BackgroundStyle {
	/// Primary background color
	pub color: Color,
	/// Secondary color for gradients
	pub color_secondary: Color,
	/// Whether to use radial gradient
	pub use_gradient: bool,
	/// Vignette intensity (0.0 = none, 1.0 = strong)
	pub vignette: f64,
}

/// Node glyph style.
#[derive(Clone, Debug)]
pub struct NodeStyle {
	/// Whether nodes have inner gradients
	pub use_gradient: bool,
	/// Icon glyph size relative to the node radius
	pub icon_scale: f64,
	/// Status dot radius in world units
	pub status_radius: f64,
	/// Status dot outline
	pub status_stroke: Color,
	/// Label fill.
	pub label_color: Color,
	/// Label CSS font.
	pub label_font: &'static str,
	/// Label baseline distance below the node edge
	pub label_offset: f64,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	/// Preset name, used to select the theme from configuration.
	pub name: &'static str,
	/// Background style.
	pub background: BackgroundStyle,
	/// Node glyph style.
	pub node: NodeStyle,
	/// Dash pattern for cross-group connections
	pub cross_group_dash: (f64, f64),
}

impl Theme {
	/// Dark portal-style theme (default)
	pub fn portal_dark() -> Self {
		Self {
			name: "portal-dark",
			background: BackgroundStyle {
				color: Color::rgb(27, 26, 25),
				color_secondary: Color::rgb(37, 36, 35),
				use_gradient: true,
				vignette: 0.12,
			},
			node: NodeStyle {
				use_gradient: true,
				icon_scale: 0.8,
				status_radius: 4.0,
				status_stroke: Color::rgb(255, 255, 255),
				label_color: Color::rgba(243, 242, 241, 0.9),
				label_font: "11px 'Segoe UI', sans-serif",
				label_offset: 15.0,
			},
			cross_group_dash: (5.0, 5.0),
		}
	}

	/// Flat light theme without gradients
	pub fn portal_light() -> Self {
		Self {
			name: "portal-light",
			background: BackgroundStyle {
				color: Color::rgb(250, 249, 248),
				color_secondary: Color::rgb(250, 249, 248),
				use_gradient: false,
				vignette: 0.0,
			},
			node: NodeStyle {
				use_gradient: false,
				label_color: Color::rgba(50, 49, 48, 0.9),
				..Self::portal_dark().node
			},
			cross_group_dash: (5.0, 5.0),
		}
	}
}

impl Theme {
	/// Looks up a preset by its `name`.
	pub fn named(name: &str) -> Option<Self> {
		[Self::portal_dark(), Self::portal_light()]
			.into_iter()
			.find(|t| t.name == name)
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::portal_dark()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unlisted_kinds_fall_back() {
		assert_eq!(resource_color(ResourceKind::CosmosDb), DEFAULT_RESOURCE_COLOR);
		assert_eq!(resource_color(ResourceKind::RedisCache), DEFAULT_RESOURCE_COLOR);
		assert_eq!(resource_radius(ResourceKind::PublicIp), DEFAULT_RESOURCE_RADIUS);
		assert_eq!(resource_radius(ResourceKind::VirtualNetwork), 18.0);
		assert_eq!(resource_color(ResourceKind::KeyVault), "#ffb900");
	}

	#[test]
	fn presets_are_found_by_name() {
		let light = Theme::named("portal-light").unwrap();
		assert!(!light.background.use_gradient);
		assert_eq!(light.node.icon_scale, 0.8);
		assert_eq!(Theme::named("portal-dark").unwrap().name, Theme::default().name);
		assert!(Theme::named("neon").is_none());
	}

	#[test]
	fn hex_round_trips_through_css() {
		let c = Color::from_hex("#40e0d0");
		assert_eq!(c, Color::rgb(0x40, 0xe0, 0xd0));
		assert_eq!(c.to_css(), "#40e0d0");
		assert_eq!(c.with_alpha(0.5).to_css(), "rgba(64, 224, 208, 0.5)");
		assert_eq!(Color::from_hex("teal"), Color::rgb(128, 128, 128));
	}
}

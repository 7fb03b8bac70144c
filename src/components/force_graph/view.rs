//! Pan/zoom transform and animated view transitions.
//!
//! Screen coordinates map to graph coordinates as
//! `graph = (screen - (x, y)) / k`.

/// Smallest zoom factor, shared by wheel, button and fit zoom.
pub const MIN_ZOOM: f64 = 0.1;
/// Largest zoom factor, shared by wheel, button and fit zoom.
pub const MAX_ZOOM: f64 = 4.0;

/// Zoom-in button factor.
pub const ZOOM_IN_FACTOR: f64 = 1.2;
/// Zoom-out button factor.
pub const ZOOM_OUT_FACTOR: f64 = 0.8;

/// Share of the viewport that fitted content occupies.
const FIT_MARGIN: f64 = 0.9;

/// Duration of button zoom transitions, in seconds.
pub const ZOOM_DURATION: f64 = 0.25;
/// Duration of fit and reset transitions, in seconds.
pub const FIT_DURATION: f64 = 0.75;

/// Pan and zoom transform applied to the entire graph view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	/// Horizontal translation in screen pixels.
	pub x: f64,
	/// Vertical translation in screen pixels.
	pub y: f64,
	/// Zoom factor (1.0 = 100%).
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self::IDENTITY
	}
}

impl ViewTransform {
	/// No pan, 100% zoom.
	pub const IDENTITY: Self = Self {
		x: 0.0,
		y: 0.0,
		k: 1.0,
	};

	/// Converts a screen point to graph coordinates.
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	/// Converts a graph point to screen coordinates.
	pub fn graph_to_screen(&self, gx: f64, gy: f64) -> (f64, f64) {
		(gx * self.k + self.x, gy * self.k + self.y)
	}

	/// Rescales to `k` (clamped) keeping the screen point `(sx, sy)` fixed.
	pub fn zoom_at(&self, k: f64, sx: f64, sy: f64) -> Self {
		let k = k.clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = k / self.k;
		Self {
			x: sx - (sx - self.x) * ratio,
			y: sy - (sy - self.y) * ratio,
			k,
		}
	}

	fn lerp(self, other: Self, t: f64) -> Self {
		Self {
			x: self.x + (other.x - self.x) * t,
			y: self.y + (other.y - self.y) * t,
			k: self.k + (other.k - self.k) * t,
		}
	}
}

/// Axis-aligned bounds in graph coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	/// Left edge.
	pub min_x: f64,
	/// Top edge.
	pub min_y: f64,
	/// Right edge.
	pub max_x: f64,
	/// Bottom edge.
	pub max_y: f64,
}

impl Bounds {
	/// Bounds of a single rectangle.
	pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
		Self {
			min_x,
			min_y,
			max_x,
			max_y,
		}
	}

	/// Horizontal extent.
	pub fn width(&self) -> f64 {
		self.max_x - self.min_x
	}

	/// Vertical extent.
	pub fn height(&self) -> f64 {
		self.max_y - self.min_y
	}

	/// Smallest bounds covering both.
	pub fn union(self, other: Self) -> Self {
		Self {
			min_x: self.min_x.min(other.min_x),
			min_y: self.min_y.min(other.min_y),
			max_x: self.max_x.max(other.max_x),
			max_y: self.max_y.max(other.max_y),
		}
	}
}

/// Transform that fits `bounds` into 90% of a `width`×`height` viewport, centered.
///
/// The scale is clamped to the zoom range, so very small or very large
/// content stays centered at the nearest allowed zoom instead of filling the
/// viewport. Returns `None` for degenerate content or viewport.
pub fn fit_transform(bounds: Bounds, width: f64, height: f64) -> Option<ViewTransform> {
	let (bw, bh) = (bounds.width(), bounds.height());
	if bw <= 0.0 || bh <= 0.0 || width <= 0.0 || height <= 0.0 {
		return None;
	}
	let k = (FIT_MARGIN / (bw / width).max(bh / height)).clamp(MIN_ZOOM, MAX_ZOOM);
	let (mid_x, mid_y) = (bounds.min_x + bw / 2.0, bounds.min_y + bh / 2.0);
	Some(ViewTransform {
		x: width / 2.0 - k * mid_x,
		y: height / 2.0 - k * mid_y,
		k,
	})
}

/// Cubic in-out easing.
fn ease_cubic_in_out(t: f64) -> f64 {
	let t = t * 2.0;
	if t <= 1.0 {
		t * t * t / 2.0
	} else {
		let t = t - 2.0;
		(t * t * t + 2.0) / 2.0
	}
}

/// An in-flight interpolation between two transforms.
#[derive(Clone, Debug)]
struct Transition {
	from: ViewTransform,
	to: ViewTransform,
	elapsed: f64,
	duration: f64,
}

/// Current view transform plus any running transition toward a new one.
#[derive(Clone, Debug, Default)]
pub struct ViewState {
	/// Transform applied this frame.
	pub transform: ViewTransform,
	transition: Option<Transition>,
}

impl ViewState {
	/// Starts a transition from the current transform, superseding any running one.
	pub fn animate_to(&mut self, to: ViewTransform, duration: f64) {
		if duration <= 0.0 {
			self.set(to);
			return;
		}
		self.transition = Some(Transition {
			from: self.transform,
			to,
			elapsed: 0.0,
			duration,
		});
	}

	/// Jumps to `to`, cancelling any running transition.
	pub fn set(&mut self, to: ViewTransform) {
		self.transition = None;
		self.transform = to;
	}

	/// Whether a transition is running.
	pub fn is_animating(&self) -> bool {
		self.transition.is_some()
	}

	/// Advances the running transition by `dt` seconds.
	pub fn tick(&mut self, dt: f64) {
		let Some(transition) = self.transition.as_mut() else {
			return;
		};
		transition.elapsed += dt;
		let t = (transition.elapsed / transition.duration).min(1.0);
		self.transform = transition
			.from
			.lerp(transition.to, ease_cubic_in_out(t));
		if t >= 1.0 {
			self.transform = transition.to;
			self.transition = None;
		}
	}

	/// Button zoom about the viewport center.
	pub fn zoom_by(&mut self, factor: f64, width: f64, height: f64) {
		let base = self.transform;
		let to = base.zoom_at(base.k * factor, width / 2.0, height / 2.0);
		self.animate_to(to, ZOOM_DURATION);
	}

	/// Wheel zoom anchored at the pointer. Immediate.
	pub fn wheel(&mut self, delta_y: f64, sx: f64, sy: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let base = self.transform;
		self.set(base.zoom_at(base.k * factor, sx, sy));
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn close(a: f64, b: f64) -> bool {
		(a - b).abs() < 1e-9
	}

	#[test]
	fn fit_viewport_sized_content() {
		let t = fit_transform(Bounds::new(0.0, 0.0, 800.0, 600.0), 800.0, 600.0).unwrap();
		assert!(close(t.k, 0.9));
		assert!(close(t.x, 400.0 - 0.9 * 400.0));
		assert!(close(t.y, 300.0 - 0.9 * 300.0));

		// Content center lands on viewport center.
		let (cx, cy) = t.graph_to_screen(400.0, 300.0);
		assert!(close(cx, 400.0) && close(cy, 300.0));
	}

	#[test]
	fn fit_uses_tighter_axis() {
		let t = fit_transform(Bounds::new(-100.0, -10.0, 100.0, 10.0), 400.0, 400.0).unwrap();
		assert!(close(t.k, 0.9 * 2.0));
	}

	#[test]
	fn fit_clamps_to_zoom_range() {
		let tiny = fit_transform(Bounds::new(390.0, 290.0, 410.0, 310.0), 800.0, 600.0).unwrap();
		assert!(close(tiny.k, MAX_ZOOM));
		let (cx, cy) = tiny.graph_to_screen(400.0, 300.0);
		assert!(close(cx, 400.0) && close(cy, 300.0));

		let huge = fit_transform(Bounds::new(-50_000.0, -50_000.0, 50_000.0, 50_000.0), 800.0, 600.0).unwrap();
		assert!(close(huge.k, MIN_ZOOM));
		let (cx, cy) = huge.graph_to_screen(0.0, 0.0);
		assert!(close(cx, 400.0) && close(cy, 300.0));
	}

	#[test]
	fn fit_degenerate_is_none() {
		assert!(fit_transform(Bounds::new(5.0, 5.0, 5.0, 50.0), 800.0, 600.0).is_none());
		assert!(fit_transform(Bounds::new(0.0, 0.0, 10.0, 10.0), 0.0, 0.0).is_none());
	}

	#[test]
	fn zoom_is_clamped() {
		let mut view = ViewState::default();
		for _ in 0..40 {
			view.zoom_by(ZOOM_IN_FACTOR, 800.0, 600.0);
			view.tick(1.0);
		}
		assert!(close(view.transform.k, MAX_ZOOM));
		for _ in 0..40 {
			view.wheel(1.0, 10.0, 10.0);
		}
		assert!(close(view.transform.k, MIN_ZOOM));
	}

	#[test]
	fn zoom_keeps_anchor_fixed() {
		let t = ViewTransform {
			x: 30.0,
			y: -20.0,
			k: 1.5,
		};
		let before = t.screen_to_graph(200.0, 100.0);
		let after = t.zoom_at(2.5, 200.0, 100.0).screen_to_graph(200.0, 100.0);
		assert!(close(before.0, after.0) && close(before.1, after.1));
	}

	#[test]
	fn transition_eases_and_finishes() {
		let mut view = ViewState::default();
		let to = ViewTransform {
			x: 100.0,
			y: 50.0,
			k: 2.0,
		};
		view.animate_to(to, FIT_DURATION);
		view.tick(FIT_DURATION / 2.0);
		assert!(close(view.transform.k, 1.5));
		view.tick(FIT_DURATION);
		assert_eq!(view.transform, to);
		assert!(!view.is_animating());
	}

	#[test]
	fn new_transition_restarts_from_current() {
		let mut view = ViewState::default();
		view.animate_to(
			ViewTransform {
				x: 0.0,
				y: 0.0,
				k: 3.0,
			},
			1.0,
		);
		view.tick(0.5);
		let midway = view.transform;
		view.animate_to(ViewTransform::IDENTITY, 1.0);
		view.tick(0.0);
		assert_eq!(view.transform, midway);
		view.tick(1.0);
		assert_eq!(view.transform, ViewTransform::IDENTITY);
	}
}

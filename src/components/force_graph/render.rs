//! Canvas rendering for the resource graph.
//!
//! Draws a prepared [`Scene`] in passes so the z-order matches the layering
//! of the visualization:
//! 1. Background (screen space)
//! 2. Connections (world space)
//! 3. Nodes: circle, icon glyph, status dot
//! 4. Labels
//! 5. Vignette (screen space)

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::scene::{EdgeVisual, LabelVisual, NodeVisual, Scene};
use super::theme::{Color, Theme};
use super::view::ViewTransform;

/// Offset of the status dot from the node center, relative to the radius.
const STATUS_OFFSET: f64 = 0.7;

/// Renders one frame.
pub fn render(
	ctx: &CanvasRenderingContext2d,
	scene: &Scene,
	transform: ViewTransform,
	theme: &Theme,
	width: f64,
	height: f64,
) -> Result<(), JsValue> {
	draw_background(ctx, theme, width, height)?;

	ctx.save();
	ctx.translate(transform.x, transform.y)?;
	ctx.scale(transform.k, transform.k)?;

	for edge in &scene.edges {
		draw_edge(ctx, theme, edge)?;
	}
	ctx.set_line_dash(&js_sys::Array::new())?;

	for node in &scene.nodes {
		draw_node(ctx, theme, node)?;
	}

	ctx.set_font(theme.node.label_font);
	ctx.set_text_align("center");
	ctx.set_text_baseline("alphabetic");
	for label in &scene.labels {
		draw_label(ctx, theme, label)?;
	}

	ctx.restore();
	ctx.set_global_alpha(1.0);

	if theme.background.vignette > 0.0 {
		draw_vignette(ctx, theme, width, height)?;
	}
	Ok(())
}

fn draw_background(
	ctx: &CanvasRenderingContext2d,
	theme: &Theme,
	width: f64,
	height: f64,
) -> Result<(), JsValue> {
	if theme.background.use_gradient {
		let gradient = ctx.create_radial_gradient(
			width / 2.0,
			height / 2.0,
			0.0,
			width / 2.0,
			height / 2.0,
			width.max(height) * 0.8,
		)?;
		gradient.add_color_stop(0.0, &theme.background.color_secondary.to_css())?;
		gradient.add_color_stop(1.0, &theme.background.color.to_css())?;

		#[allow(deprecated)]
		ctx.set_fill_style(&gradient);
	} else {
		ctx.set_fill_style_str(&theme.background.color.to_css());
	}

	ctx.fill_rect(0.0, 0.0, width, height);
	Ok(())
}

fn draw_vignette(
	ctx: &CanvasRenderingContext2d,
	theme: &Theme,
	width: f64,
	height: f64,
) -> Result<(), JsValue> {
	let gradient = ctx.create_radial_gradient(
		width / 2.0,
		height / 2.0,
		width.min(height) * 0.3,
		width / 2.0,
		height / 2.0,
		width.max(height) * 0.7,
	)?;
	gradient.add_color_stop(0.0, "rgba(0, 0, 0, 0)")?;
	gradient.add_color_stop(
		1.0,
		&Color::rgba(0, 0, 0, theme.background.vignette).to_css(),
	)?;

	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill_rect(0.0, 0.0, width, height);
	Ok(())
}

fn draw_edge(
	ctx: &CanvasRenderingContext2d,
	theme: &Theme,
	edge: &EdgeVisual,
) -> Result<(), JsValue> {
	if edge.dashed {
		let (dash, gap) = theme.cross_group_dash;
		ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(dash),
			&JsValue::from_f64(gap),
		))?;
	} else {
		ctx.set_line_dash(&js_sys::Array::new())?;
	}

	ctx.set_global_alpha(edge.opacity);
	ctx.set_stroke_style_str(edge.stroke);
	ctx.set_line_width(edge.width);
	ctx.begin_path();
	ctx.move_to(edge.x1, edge.y1);
	ctx.line_to(edge.x2, edge.y2);
	ctx.stroke();
	Ok(())
}

fn draw_node(
	ctx: &CanvasRenderingContext2d,
	theme: &Theme,
	node: &NodeVisual,
) -> Result<(), JsValue> {
	let (x, y) = (node.x, node.y);
	let radius = node.radius * node.scale;

	ctx.set_global_alpha(node.opacity);

	ctx.begin_path();
	ctx.arc(x, y, radius, 0.0, 2.0 * PI)?;
	if theme.node.use_gradient {
		let gradient =
			ctx.create_radial_gradient(x - radius * 0.3, y - radius * 0.3, 0.0, x, y, radius)?;
		let base = Color::from_hex(node.fill);
		gradient.add_color_stop(0.0, &base.lighten(0.4).to_css())?;
		gradient.add_color_stop(0.7, &base.to_css())?;
		gradient.add_color_stop(1.0, &base.darken(0.2).to_css())?;

		#[allow(deprecated)]
		ctx.set_fill_style(&gradient);
	} else {
		ctx.set_fill_style_str(node.fill);
	}
	ctx.fill();

	ctx.set_fill_style_str("white");
	ctx.set_font(&format!("{}px sans-serif", radius * theme.node.icon_scale));
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	ctx.fill_text(node.icon, x, y)?;

	let (dx, dy) = (radius * STATUS_OFFSET, -radius * STATUS_OFFSET);
	ctx.begin_path();
	ctx.arc(x + dx, y + dy, theme.node.status_radius, 0.0, 2.0 * PI)?;
	ctx.set_fill_style_str(node.status_color);
	ctx.fill();
	ctx.set_stroke_style_str(&theme.node.status_stroke.to_css());
	ctx.set_line_width(1.0);
	ctx.stroke();
	Ok(())
}

fn draw_label(
	ctx: &CanvasRenderingContext2d,
	theme: &Theme,
	label: &LabelVisual,
) -> Result<(), JsValue> {
	ctx.set_global_alpha(label.opacity);
	ctx.set_fill_style_str(&theme.node.label_color.to_css());
	ctx.fill_text(&label.text, label.x, label.y)
}

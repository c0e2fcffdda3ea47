use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::state::ViewerState;

pub fn render(state: &ViewerState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str("#ffffff");
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
	draw_labels(state, ctx);
}

fn draw_edges(state: &ViewerState, ctx: &CanvasRenderingContext2d) {
	ctx.set_stroke_style_str(&format!("rgba(60, 60, 60, {})", state.edge_alpha));
	ctx.set_line_width(1.0 / state.transform.k);
	ctx.begin_path();
	state.sim.visit_edges(|(x1, y1), (x2, y2)| {
		ctx.move_to(x1, y1);
		ctx.line_to(x2, y2);
	});
	ctx.stroke();
}

fn draw_nodes(state: &ViewerState, ctx: &CanvasRenderingContext2d) {
	state.sim.visit_positions(|idx, x, y| {
		let Some(style) = state.style(idx) else {
			return;
		};
		ctx.begin_path();
		let _ = ctx.arc(x, y, style.radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&style.color);
		ctx.fill();
	});
}

/// Labels are drawn in screen space so they keep their size while zooming.
fn draw_labels(state: &ViewerState, ctx: &CanvasRenderingContext2d) {
	let t = &state.transform;
	ctx.set_fill_style_str("#111111");
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	state.sim.visit_positions(|idx, x, y| {
		let Some(style) = state.style(idx) else {
			return;
		};
		if let Some(label) = &style.label {
			ctx.set_font(&format!("{:.1}px sans-serif", style.font_px));
			let _ = ctx.fill_text(label, x * t.k + t.x, y * t.k + t.y);
		}
	});
}

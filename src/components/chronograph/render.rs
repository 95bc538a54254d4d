use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::{AGENT_RADIUS, ChronographState, NODE_RADIUS};
use crate::graph::{Graph, Mode};

const DIMMED_ALPHA: f64 = 0.25;

pub fn render(state: &ChronographState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str("#1a1a2e");
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	let Some(graph) = state.graph() else {
		return;
	};

	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, graph, ctx);
	draw_nodes(state, graph, ctx);
	draw_agents(state, graph, ctx);
	ctx.restore();

	draw_info(graph, ctx);
}

fn draw_edges(state: &ChronographState, graph: &Graph, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	ctx.set_stroke_style_str("rgba(100, 180, 255, 0.6)");
	ctx.set_line_width(1.5 / k);

	for edge in graph.edges() {
		let (Some(n1), Some(n2)) = (graph.node(edge.node1()), graph.node(edge.node2())) else {
			continue;
		};
		let (x1, y1, x2, y2) = (n1.x as f64, n1.y as f64, n2.x as f64, n2.y as f64);
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}
		let (ux, uy) = (dx / dist, dy / dist);
		ctx.begin_path();
		ctx.move_to(x1 + ux * NODE_RADIUS, y1 + uy * NODE_RADIUS);
		ctx.line_to(x2 - ux * NODE_RADIUS, y2 - uy * NODE_RADIUS);
		ctx.stroke();
	}

	// Rubber band from the first endpoint of an edge gesture to the hovered node
	let (Some(from), Some(to)) = (graph.pending_edge(), state.hover.as_deref()) else {
		return;
	};
	let (Some(n1), Some(n2)) = (graph.node(from), graph.node(to)) else {
		return;
	};
	let (dash, gap) = (8.0 / k, 4.0 / k);
	let _ = ctx.set_line_dash(&js_sys::Array::of2(
		&JsValue::from_f64(dash),
		&JsValue::from_f64(gap),
	));
	ctx.set_stroke_style_str("rgba(255, 213, 79, 0.8)");
	ctx.begin_path();
	ctx.move_to(n1.x as f64, n1.y as f64);
	ctx.line_to(n2.x as f64, n2.y as f64);
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_nodes(state: &ChronographState, graph: &Graph, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;

	for node in graph.nodes() {
		let (x, y) = (node.x as f64, node.y as f64);

		// Visit heat as a glow, scaled against the busiest node
		let heat = graph.heat(&node.id);
		if heat > 0.0 {
			let glow_radius = NODE_RADIUS * (1.4 + heat);
			if let Ok(gradient) = ctx.create_radial_gradient(x, y, NODE_RADIUS * 0.5, x, y, glow_radius)
			{
				let _ = gradient.add_color_stop(0.0, &format!("rgba(255, 120, 60, {})", 0.6 * heat));
				let _ = gradient.add_color_stop(1.0, "rgba(255, 120, 60, 0)");
				ctx.begin_path();
				let _ = ctx.arc(x, y, glow_radius, 0.0, 2.0 * PI);
				#[allow(deprecated)]
				ctx.set_fill_style(&gradient);
				ctx.fill();
			}
		}

		ctx.begin_path();
		let _ = ctx.arc(x, y, NODE_RADIUS, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(if node.color.is_empty() {
			"#777777"
		} else {
			node.color.as_str()
		});
		ctx.fill();

		let selected = graph.is_selected(&node.id) || graph.pending_edge() == Some(node.id.as_str());
		let hovered = state.hover.as_deref() == Some(node.id.as_str());
		if selected || hovered {
			ctx.begin_path();
			let _ = ctx.arc(x, y, NODE_RADIUS + 2.0 / k, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(if selected {
				"#ffd54f"
			} else {
				"rgba(255, 255, 255, 0.7)"
			});
			ctx.set_line_width(2.0 / k);
			ctx.stroke();
		}

		if !node.label.is_empty() {
			ctx.set_fill_style_str("rgba(255, 255, 255, 0.8)");
			ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));
			let _ = ctx.fill_text(&node.label, x + NODE_RADIUS + 3.0, y + 3.0);
		}
	}
}

fn draw_agents(state: &ChronographState, graph: &Graph, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;

	for agent in graph.agents() {
		let Some(position) = agent.position() else {
			continue;
		};
		ctx.set_global_alpha(if graph.is_agent_dimmed(&agent.id) {
			DIMMED_ALPHA
		} else {
			1.0
		});
		ctx.begin_path();
		let _ = ctx.arc(position.x, position.y, AGENT_RADIUS, 0.0, 2.0 * PI);
		ctx.set_fill_style_str("#f5f5f5");
		ctx.fill();
		if agent.is_selected() {
			ctx.set_stroke_style_str("#4caf50");
			ctx.set_line_width(2.0 / k);
			ctx.stroke();
		}
	}
	ctx.set_global_alpha(1.0);
}

fn draw_info(graph: &Graph, ctx: &CanvasRenderingContext2d) {
	let summary = graph.summary();
	ctx.set_fill_style_str("rgba(255, 255, 255, 0.8)");
	ctx.set_font("12px sans-serif");
	let _ = ctx.fill_text(&format!("Timestep: {}", summary.current_step), 12.0, 20.0);
	if graph.mode() == Mode::Edit {
		let _ = ctx.fill_text(&format!("Tool: {}", graph.edit_mode()), 12.0, 36.0);
	}
}

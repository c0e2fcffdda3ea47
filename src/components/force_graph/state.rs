use std::collections::HashMap;

use crate::graph::{Graph, NodeIndex};
use crate::io::DisplaySettings;
use crate::layout::{LayoutAlgorithm, Simulation};

/// Pixels per unit of label size.
const LABEL_SCALE: f64 = 8.0;

/// Drawing attributes of one node, precomputed from its visual state.
#[derive(Clone, Debug, Default)]
pub struct NodeStyle {
	pub radius: f64,
	pub color: String,
	pub label: Option<String>,
	pub font_px: f64,
}

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

pub struct ViewerState {
	pub sim: Simulation,
	pub styles: HashMap<NodeIndex, NodeStyle>,
	pub transform: ViewTransform,
	pub pan: PanState,
	pub width: f64,
	pub height: f64,
	/// Edge alpha in `[0, 1]`.
	pub edge_alpha: f64,
	pub animation_running: bool,
}

impl ViewerState {
	pub fn new(
		graph: &Graph,
		layout: &LayoutAlgorithm,
		display: &DisplaySettings,
		width: f64,
		height: f64,
	) -> Self {
		let styles = graph
			.nodes()
			.map(|(idx, node)| {
				let visual = &node.visual;
				let style = NodeStyle {
					radius: visual.size / 2.0,
					color: visual.color.to_hex(),
					label: (!visual.label.is_empty()).then(|| visual.label.clone()),
					font_px: visual.label_size * LABEL_SCALE,
				};
				(idx, style)
			})
			.collect();

		Self {
			sim: Simulation::new(graph, layout),
			styles,
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			pan: PanState::default(),
			width,
			height,
			edge_alpha: (display.edge_opacity / 100.0).clamp(0.0, 1.0),
			animation_running: true,
		}
	}

	pub fn style(&self, idx: NodeIndex) -> Option<&NodeStyle> {
		self.styles.get(&idx)
	}

	pub fn tick(&mut self, dt: f32) {
		self.sim.step(dt);
	}

	/// Zooms by `factor` keeping the screen point `(x, y)` fixed.
	pub fn zoom_at(&mut self, x: f64, y: f64, factor: f64) {
		let new_k = (self.transform.k * factor).clamp(0.1, 10.0);
		let ratio = new_k / self.transform.k;
		self.transform.x = x - (x - self.transform.x) * ratio;
		self.transform.y = y - (y - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn start_pan(&mut self, x: f64, y: f64) {
		self.pan = PanState {
			active: true,
			start_x: x,
			start_y: y,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		};
	}

	pub fn pan_to(&mut self, x: f64, y: f64) {
		if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (x - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (y - self.pan.start_y);
		}
	}

	pub fn end_pan(&mut self) {
		self.pan.active = false;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

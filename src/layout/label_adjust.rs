//! Pushes labeled nodes apart until their label boxes stop overlapping.

use std::time::{Duration, Instant};

use log::info;

use super::LayoutBudget;
use crate::graph::{Graph, Node, NodeIndex};

/// Pixels per unit of label size.
const GLYPH_SCALE: f64 = 8.0;
/// Extra separation added on every push so touching boxes end up apart.
const GAP: f64 = 0.5;

/// Axis-aligned label box centered on its node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelBox {
	/// The labeled node.
	pub node: NodeIndex,
	/// Center, horizontal.
	pub x: f64,
	/// Center, vertical.
	pub y: f64,
	/// Width in layout units.
	pub width: f64,
	/// Height in layout units.
	pub height: f64,
}

impl LabelBox {
	/// Penetration depth on each axis, or `None` when the boxes are apart.
	fn overlap(&self, other: &LabelBox) -> Option<(f64, f64)> {
		let ox = (self.width + other.width) / 2.0 - (self.x - other.x).abs();
		let oy = (self.height + other.height) / 2.0 - (self.y - other.y).abs();
		(ox > 0.0 && oy > 0.0).then_some((ox, oy))
	}
}

/// Size of `node`'s label box: `len * round(size * 8)` wide and
/// `round(size * 8)` tall. Unlabeled nodes have none.
pub fn label_box(idx: NodeIndex, node: &Node) -> Option<LabelBox> {
	if node.visual.label.is_empty() {
		return None;
	}
	let glyph = (node.visual.label_size * GLYPH_SCALE).round();
	Some(LabelBox {
		node: idx,
		x: node.x,
		y: node.y,
		width: node.visual.label.chars().count() as f64 * glyph,
		height: glyph,
	})
}

/// Outcome of [`adjust_labels`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LabelAdjustRun {
	/// Sweeps over all label pairs.
	pub passes: usize,
	/// Overlapping pairs left when the stage stopped.
	pub overlaps: usize,
	/// Wall-clock time spent.
	pub elapsed: Duration,
}

/// One sweep over all pairs. Returns how many pairs overlapped.
fn separate(boxes: &mut [LabelBox]) -> usize {
	let mut overlaps = 0;
	for i in 0..boxes.len() {
		for j in (i + 1)..boxes.len() {
			let Some((ox, oy)) = boxes[i].overlap(&boxes[j]) else {
				continue;
			};
			overlaps += 1;
			// Coincident boxes split along x with the earlier one moving left.
			let (dx, dy) = (boxes[j].x - boxes[i].x, boxes[j].y - boxes[i].y);
			if ox <= oy {
				let shift = (ox + GAP) / 2.0 * if dx < 0.0 { -1.0 } else { 1.0 };
				boxes[i].x -= shift;
				boxes[j].x += shift;
			} else {
				let shift = (oy + GAP) / 2.0 * if dy < 0.0 { -1.0 } else { 1.0 };
				boxes[i].y -= shift;
				boxes[j].y += shift;
			}
		}
	}
	overlaps
}

/// Moves labeled nodes only. Stops once a sweep finds no overlap or the
/// budget is spent; each sweep counts as one step.
pub fn adjust_labels(graph: &mut Graph, budget: &LayoutBudget) -> LabelAdjustRun {
	let start = Instant::now();
	let mut boxes: Vec<LabelBox> = graph
		.nodes()
		.filter_map(|(idx, node)| label_box(idx, node))
		.collect();

	let mut run = LabelAdjustRun::default();
	loop {
		if budget.spent(start, run.passes) {
			run.overlaps = count_overlaps(&boxes);
			break;
		}
		let found = separate(&mut boxes);
		if found == 0 {
			run.overlaps = 0;
			break;
		}
		run.passes += 1;
	}

	for b in &boxes {
		if let Some(node) = graph.node_mut(b.node) {
			node.x = b.x;
			node.y = b.y;
		}
	}
	run.elapsed = start.elapsed();
	info!(
		"label adjust: {} labels, {} passes, {} overlaps left",
		boxes.len(),
		run.passes,
		run.overlaps
	);
	run
}

fn count_overlaps(boxes: &[LabelBox]) -> usize {
	let mut count = 0;
	for (i, a) in boxes.iter().enumerate() {
		count += boxes[i + 1..].iter().filter(|b| a.overlap(b).is_some()).count();
	}
	count
}

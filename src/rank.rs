//! Percentile cutoffs and value ranges over a numeric column.

use log::debug;

use crate::error::Result;
use crate::graph::{Graph, Node};

/// Value at percentile `p` (in `(0, 100]`) of `values`.
///
/// Uses the `(n + 1) p` estimator: the 1-based position `p (n + 1) / 100`
/// is clamped to the sample and interpolated linearly between the two
/// surrounding order statistics. Returns `None` for an empty sample.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
	let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
	if sorted.is_empty() {
		return None;
	}
	sorted.sort_by(f64::total_cmp);
	let n = sorted.len();
	let pos = p * (n as f64 + 1.0) / 100.0;
	if pos < 1.0 {
		return Some(sorted[0]);
	}
	if pos >= n as f64 {
		return Some(sorted[n - 1]);
	}
	let rank = pos.floor();
	let lower = sorted[rank as usize - 1];
	let upper = sorted[rank as usize];
	Some(lower + (pos - rank) * (upper - lower))
}

/// Label cutoff for `column`: nodes strictly above it may be labeled.
///
/// A non-positive percentile disables the cutoff.
pub fn compute_cutoff(graph: &Graph, column: &str, percentile_rank: f64) -> Result<f64> {
	graph.require_column(column)?;
	if percentile_rank <= 0.0 {
		return Ok(f64::NEG_INFINITY);
	}
	let sample: Vec<f64> = graph.nodes().filter_map(|(_, n)| n.number(column)).collect();
	let cutoff = percentile(&sample, percentile_rank).unwrap_or(f64::NEG_INFINITY);
	debug!(
		"percentile {percentile_rank} of {column} over {} values: {cutoff}",
		sample.len()
	);
	Ok(cutoff)
}

/// Whether `node` ranks above `cutoff` and has something to show as label.
pub fn classify(node: &Node, column: &str, label_column: &str, cutoff: f64) -> bool {
	let above = node.number(column).is_some_and(|v| v > cutoff);
	above && node.text(label_column).is_some_and(|label| !label.is_empty())
}

/// Observed `[min, max]` of a numeric column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValueRange {
	/// Smallest value.
	pub min: f64,
	/// Largest value.
	pub max: f64,
}

impl ValueRange {
	/// Range of the finite values in `column`, `None` when there are none.
	pub fn of(graph: &Graph, column: &str) -> Option<Self> {
		graph
			.nodes()
			.filter_map(|(_, n)| n.number(column))
			.filter(|v| v.is_finite())
			.fold(None, |range, v| match range {
				None => Some(Self { min: v, max: v }),
				Some(Self { min, max }) => Some(Self {
					min: min.min(v),
					max: max.max(v),
				}),
			})
	}

	/// Position of `value` within the range, in `[0, 1]`.
	///
	/// A degenerate range maps everything to 0.
	pub fn fraction(&self, value: f64) -> f64 {
		let span = self.max - self.min;
		if span <= 0.0 {
			return 0.0;
		}
		((value - self.min) / span).clamp(0.0, 1.0)
	}

	/// Linear map of `value` onto `[low, high]`.
	pub fn scale(&self, value: f64, low: f64, high: f64) -> f64 {
		low + self.fraction(value) * (high - low)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sequential_graph(n: usize) -> Graph {
		let mut graph = Graph::new();
		for i in 0..n {
			let idx = graph.add_node(i.to_string());
			graph.set_attr(idx, "value", i as f64);
			graph.set_attr(idx, "name", format!("node {i}"));
		}
		graph
	}

	#[test]
	fn percentile_interpolates() {
		let values: Vec<f64> = (0..110).map(f64::from).collect();
		assert_eq!(percentile(&values, 50.0), Some(54.5));
		assert_eq!(percentile(&[1.0, 2.0, 3.0, 4.0], 50.0), Some(2.5));
		assert_eq!(percentile(&[5.0, 1.0, 3.0], 50.0), Some(3.0));
	}

	#[test]
	fn percentile_clamps_to_sample() {
		let values = [10.0, 20.0, 30.0];
		assert_eq!(percentile(&values, 1.0), Some(10.0));
		assert_eq!(percentile(&values, 100.0), Some(30.0));
		assert_eq!(percentile(&[7.0], 98.0), Some(7.0));
		assert_eq!(percentile(&[], 50.0), None);
	}

	#[test]
	fn median_cutoff_labels_half() {
		let graph = sequential_graph(110);
		let cutoff = compute_cutoff(&graph, "value", 50.0).unwrap();
		assert_eq!(cutoff, 54.5);
		let labeled = graph
			.nodes()
			.filter(|(_, n)| classify(n, "value", "name", cutoff))
			.count();
		assert_eq!(labeled, 55);
	}

	#[test]
	fn non_positive_percentile_disables_cutoff() {
		let graph = sequential_graph(10);
		let cutoff = compute_cutoff(&graph, "value", 0.0).unwrap();
		assert_eq!(cutoff, f64::NEG_INFINITY);
		assert!(graph.nodes().all(|(_, n)| classify(n, "value", "name", cutoff)));
	}

	#[test]
	fn empty_label_is_never_shown() {
		let mut graph = sequential_graph(3);
		let idx = graph.node_index("2").unwrap();
		graph.set_attr(idx, "name", "");
		let node = graph.node(idx).unwrap();
		assert!(!classify(node, "value", "name", 0.0));
		assert!(!classify(node, "value", "missing", 0.0));
	}

	#[test]
	fn cutoff_requires_column() {
		let graph = sequential_graph(3);
		assert!(compute_cutoff(&graph, "nope", 50.0).is_err());
	}

	#[test]
	fn value_range_scales() {
		let graph = sequential_graph(5);
		let range = ValueRange::of(&graph, "value").unwrap();
		assert_eq!(range, ValueRange { min: 0.0, max: 4.0 });
		assert_eq!(range.scale(2.0, 10.0, 20.0), 15.0);
		assert_eq!(ValueRange { min: 3.0, max: 3.0 }.scale(3.0, 10.0, 20.0), 10.0);
		assert!(ValueRange::of(&graph, "name").is_none());
	}
}

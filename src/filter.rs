//! Degree-based pruning.

use log::info;

use crate::graph::{Graph, NodeIndex};

/// Passes made before giving up on convergence.
pub const DEFAULT_FILTER_ITERATIONS: usize = 4;

/// Removes nodes with fewer than `min_degree` incident edges.
///
/// Removing a node lowers its neighbours' degrees, so the scan repeats until
/// nothing falls below the threshold or `max_iterations` passes are spent.
/// Long chains can need more passes than the cap allows; those leftovers are
/// kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DegreeFilter {
	/// Nodes with a smaller degree are removed; 0 disables filtering.
	pub min_degree: usize,
	/// Upper limit on removal passes.
	pub max_iterations: usize,
}

/// Graph size before and after a [`DegreeFilter::apply`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FilterReport {
	/// Nodes before filtering.
	pub nodes_before: usize,
	/// Edges before filtering.
	pub edges_before: usize,
	/// Nodes left afterwards.
	pub nodes_after: usize,
	/// Edges left afterwards.
	pub edges_after: usize,
	/// Passes that removed at least one node.
	pub passes: usize,
}

impl FilterReport {
	/// Number of nodes the filter removed.
	pub fn removed(&self) -> usize {
		self.nodes_before - self.nodes_after
	}
}

impl Default for DegreeFilter {
	fn default() -> Self {
		Self::new(0)
	}
}

impl DegreeFilter {
	/// A filter with the default pass limit.
	pub fn new(min_degree: usize) -> Self {
		Self {
			min_degree,
			max_iterations: DEFAULT_FILTER_ITERATIONS,
		}
	}

	/// Overrides the pass limit.
	pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
		self.max_iterations = max_iterations;
		self
	}

	/// Whether [`Self::apply`] removes anything at all.
	pub fn is_enabled(&self) -> bool {
		self.min_degree >= 1
	}

	/// Prunes `graph` in place.
	pub fn apply(&self, graph: &mut Graph) -> FilterReport {
		let mut report = FilterReport {
			nodes_before: graph.node_count(),
			edges_before: graph.edge_count(),
			..FilterReport::default()
		};
		if !self.is_enabled() {
			info!("skipping filtering based on degree");
			report.nodes_after = report.nodes_before;
			report.edges_after = report.edges_before;
			return report;
		}

		info!(
			"before filtering on degree < {}: {} nodes, {} edges",
			self.min_degree, report.nodes_before, report.edges_before
		);
		for _ in 0..self.max_iterations {
			let below: Vec<NodeIndex> = graph
				.nodes()
				.map(|(idx, _)| idx)
				.filter(|&idx| graph.degree(idx) < self.min_degree)
				.collect();
			if below.is_empty() {
				break;
			}
			for idx in below {
				graph.remove_node(idx);
			}
			report.passes += 1;
		}
		report.nodes_after = graph.node_count();
		report.edges_after = graph.edge_count();
		info!(
			"after filtering: {} nodes, {} edges ({} passes)",
			report.nodes_after, report.edges_after, report.passes
		);
		report
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	/// 100 fully connected nodes plus 10 outliers linked both ways to the
	/// first three core nodes.
	fn core_with_outliers() -> Graph {
		let mut graph = Graph::new();
		let core: Vec<_> = (0..100).map(|i| graph.add_node(i.to_string())).collect();
		for &a in &core {
			for &b in &core {
				if a != b {
					graph.add_edge(a, b, 1.0);
				}
			}
		}
		for i in 0..10 {
			let outlier = graph.add_node((100 + i).to_string());
			for &hub in &core[..3] {
				graph.add_edge(outlier, hub, 1.0);
				graph.add_edge(hub, outlier, 1.0);
			}
		}
		graph
	}

	fn chain(len: usize) -> Graph {
		let mut graph = Graph::new();
		let nodes: Vec<_> = (0..len).map(|i| graph.add_node(i.to_string())).collect();
		for pair in nodes.windows(2) {
			graph.add_edge(pair[0], pair[1], 1.0);
		}
		graph
	}

	#[test]
	fn removes_outliers() {
		let mut graph = core_with_outliers();
		assert_eq!(graph.node_count(), 110);
		let report = DegreeFilter::new(10).apply(&mut graph);
		assert_eq!(graph.node_count(), 100);
		assert_eq!(report.removed(), 10);
		assert!(report.passes <= DEFAULT_FILTER_ITERATIONS);
		assert_eq!(graph.edge_count(), 100 * 99);
	}

	#[test]
	fn zero_threshold_is_noop() {
		let mut graph = core_with_outliers();
		let report = DegreeFilter::new(0).apply(&mut graph);
		assert_eq!(graph.node_count(), 110);
		assert_eq!(report.passes, 0);
		assert_eq!(report.nodes_after, 110);
	}

	#[test]
	fn cascades_through_neighbours() {
		// Each pass strips both ends of the chain.
		let mut graph = chain(6);
		let report = DegreeFilter::new(2).apply(&mut graph);
		assert_eq!(graph.node_count(), 0);
		assert_eq!(report.passes, 3);
	}

	#[test]
	fn iteration_cap_leaves_remainder() {
		let mut graph = chain(20);
		let report = DegreeFilter::new(2).with_max_iterations(4).apply(&mut graph);
		assert_eq!(report.passes, 4);
		assert_eq!(graph.node_count(), 12);
	}

	#[test]
	fn stable_graph_stops_early() {
		let mut graph = core_with_outliers();
		let report = DegreeFilter::new(3).apply(&mut graph);
		assert_eq!(report.passes, 0);
		assert_eq!(graph.node_count(), 110);
	}
}

//! Node sizes, colors and labels derived from attribute columns.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use log::{debug, info, warn};

use crate::error::{DiagramError, Result};
use crate::graph::{Graph, Node, NodeIndex};
use crate::palette::Rgb;
use crate::rank::{self, ValueRange};

/// How node colors are derived from the color column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
	/// One palette color per distinct value.
	#[default]
	Partition,
	/// Gradient between the first and last palette color.
	Ranking,
}

impl FromStr for ColorMode {
	type Err = DiagramError;

	fn from_str(s: &str) -> Result<Self> {
		match s.to_ascii_lowercase().as_str() {
			"partition" => Ok(Self::Partition),
			"ranking" => Ok(Self::Ranking),
			_ => Err(DiagramError::InvalidColorMode(s.to_string())),
		}
	}
}

impl fmt::Display for ColorMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Partition => "partition",
			Self::Ranking => "ranking",
		})
	}
}

/// The attribute column a ranking or partition reads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnRef {
	/// Column name.
	pub column: String,
}

impl ColumnRef {
	/// Refers to `column`.
	pub fn new(column: impl Into<String>) -> Self {
		Self {
			column: column.into(),
		}
	}

	/// Numeric view of the column, deriving it from text on first use.
	pub fn numeric(&self, graph: &mut Graph) -> Result<ColumnRef> {
		graph.numeric_column(&self.column).map(ColumnRef::new)
	}
}

/// Calls `write` for every node with the node's position in the column's
/// value range, or `None` when the node has no numeric value.
pub fn apply_ranking(
	graph: &mut Graph,
	target: &ColumnRef,
	mut write: impl FnMut(&mut Node, Option<f64>),
) -> Result<()> {
	let numeric = target.numeric(graph)?;
	let range = ValueRange::of(graph, &numeric.column);
	for (_, node) in graph.nodes_mut() {
		let fraction = match (node.number(&numeric.column), range) {
			(Some(v), Some(range)) if v.is_finite() => Some(range.fraction(v)),
			_ => None,
		};
		write(node, fraction);
	}
	Ok(())
}

/// One distinct value of a partitioned column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Category {
	/// Shared text value, empty for nodes without one.
	pub value: String,
	/// Members in graph order.
	pub nodes: Vec<NodeIndex>,
}

/// Groups nodes by the text of `target`.
///
/// Categories come out largest first; equal sizes keep the order in which
/// their first node appears. Nodes without a value share the empty category.
pub fn partition(graph: &Graph, target: &ColumnRef) -> Result<Vec<Category>> {
	graph.require_column(&target.column)?;
	let mut categories: Vec<Category> = Vec::new();
	let mut positions: HashMap<String, usize> = HashMap::new();
	for (idx, node) in graph.nodes() {
		let value = node
			.text(&target.column)
			.map(|v| v.into_owned())
			.unwrap_or_default();
		match positions.get(&value) {
			Some(&pos) => categories[pos].nodes.push(idx),
			None => {
				positions.insert(value.clone(), categories.len());
				categories.push(Category {
					value,
					nodes: vec![idx],
				});
			}
		}
	}
	// Stable sort keeps first-appearance order among ties.
	categories.sort_by(|a, b| b.nodes.len().cmp(&a.nodes.len()));
	Ok(categories)
}

/// Column choices and size limits for one styling pass.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleSettings {
	/// Column ranked into node sizes.
	pub size_column: String,
	/// Column that drives node colors.
	pub color_column: String,
	/// Column whose text becomes the label.
	pub label_column: String,
	/// Partition or ranking coloring.
	pub color_mode: ColorMode,
	/// Smallest node size.
	pub min_node_size: f64,
	/// Largest node size.
	pub max_node_size: f64,
	/// Non-positive on either bound means "derive from node sizes".
	pub min_label_size: f64,
	/// Largest label size.
	pub max_label_size: f64,
	/// Size percentile a node must exceed to be labeled.
	pub label_percentile: f64,
}

impl Default for StyleSettings {
	fn default() -> Self {
		Self {
			size_column: "centrality".into(),
			color_column: "community".into(),
			label_column: "name".into(),
			color_mode: ColorMode::Partition,
			min_node_size: 3.0,
			max_node_size: 50.0,
			min_label_size: 0.0,
			max_label_size: 0.0,
			label_percentile: 98.0,
		}
	}
}

impl StyleSettings {
	/// Label size bounds, falling back to a fifth of the node size bounds.
	pub fn effective_label_bounds(&self) -> (f64, f64) {
		if self.min_label_size <= 0.0 || self.max_label_size <= 0.0 {
			(self.min_node_size / 5.0, self.max_node_size / 5.0)
		} else {
			(self.min_label_size, self.max_label_size)
		}
	}

	/// Size, color and label columns, in that order.
	pub fn columns(&self) -> [&str; 3] {
		[&self.size_column, &self.color_column, &self.label_column]
	}
}

/// What a styling pass did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyleReport {
	/// Distinct partition values; zero in ranking mode.
	pub categories: usize,
	/// More categories than palette colors.
	pub colors_reused: bool,
	/// Nodes given a label.
	pub labeled: usize,
	/// Size value a node had to exceed to be labeled.
	pub label_cutoff: f64,
}

/// Writes the visual state of every node.
pub struct NodeStyler<'a> {
	settings: &'a StyleSettings,
	palette: &'a [Rgb],
}

impl<'a> NodeStyler<'a> {
	/// A styler for `settings` drawing colors from `palette`.
	pub fn new(settings: &'a StyleSettings, palette: &'a [Rgb]) -> Self {
		Self { settings, palette }
	}

	/// Sizes, colors and labels every node. Fails before touching the graph
	/// if a column is missing.
	pub fn apply(&self, graph: &mut Graph) -> Result<StyleReport> {
		for column in self.settings.columns() {
			graph.require_column(column)?;
		}
		self.resize_nodes(graph)?;
		let mut report = self.color_nodes(graph)?;
		let (labeled, cutoff) = self.label_nodes(graph)?;
		report.labeled = labeled;
		report.label_cutoff = cutoff;
		info!(
			"styled {} nodes: {} labeled (cutoff {cutoff}), color by {} on {}",
			graph.node_count(),
			labeled,
			self.settings.color_mode,
			self.settings.color_column
		);
		Ok(report)
	}

	/// Linear size from the size column's rank.
	pub fn resize_nodes(&self, graph: &mut Graph) -> Result<()> {
		let (low, high) = (self.settings.min_node_size, self.settings.max_node_size);
		apply_ranking(graph, &ColumnRef::new(&self.settings.size_column), |node, t| {
			node.visual.size = low + t.unwrap_or(0.0) * (high - low);
		})
	}

	/// Colors by partition or by ranking, per the color mode.
	pub fn color_nodes(&self, graph: &mut Graph) -> Result<StyleReport> {
		let (Some(&first), Some(&last)) = (self.palette.first(), self.palette.last()) else {
			return Err(crate::palette::PaletteError::NoColors.into());
		};
		let target = ColumnRef::new(&self.settings.color_column);
		match self.settings.color_mode {
			ColorMode::Ranking => {
				apply_ranking(graph, &target, |node, t| {
					node.visual.color = first.lerp(last, t.unwrap_or(0.0));
				})?;
				Ok(StyleReport::default())
			}
			ColorMode::Partition => {
				let categories = partition(graph, &target)?;
				let colors_reused = categories.len() > self.palette.len();
				if colors_reused {
					warn!(
						"only {} colors in palette for {} groups; some colors will be re-used",
						self.palette.len(),
						categories.len()
					);
				}
				for (i, category) in categories.iter().enumerate() {
					let color = self.palette[i % self.palette.len()];
					for &idx in &category.nodes {
						if let Some(node) = graph.node_mut(idx) {
							node.visual.color = color;
						}
					}
				}
				debug!("partitioned {} into {} groups", target.column, categories.len());
				Ok(StyleReport {
					categories: categories.len(),
					colors_reused,
					..StyleReport::default()
				})
			}
		}
	}

	/// Assigns labels above the percentile cutoff and ranks label sizes.
	/// Returns the number of labeled nodes and the cutoff used.
	pub fn label_nodes(&self, graph: &mut Graph) -> Result<(usize, f64)> {
		let size = ColumnRef::new(&self.settings.size_column).numeric(graph)?;
		let cutoff = rank::compute_cutoff(graph, &size.column, self.settings.label_percentile)?;
		let label_column = self.settings.label_column.as_str();

		let mut labeled = 0;
		for (_, node) in graph.nodes_mut() {
			let label = if rank::classify(node, &size.column, label_column, cutoff) {
				labeled += 1;
				node.text(label_column).map(|l| l.into_owned()).unwrap_or_default()
			} else {
				String::new()
			};
			node.visual.label = label;
		}

		let (low, high) = self.settings.effective_label_bounds();
		apply_ranking(graph, &size, |node, t| {
			node.visual.label_size = low + t.unwrap_or(0.0) * (high - low);
		})?;
		Ok((labeled, cutoff))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::palette::{PaletteFamily, PaletteSet};

	fn sample_graph(n: usize) -> Graph {
		let mut graph = Graph::new();
		for i in 0..n {
			let idx = graph.add_node(i.to_string());
			graph.set_attr(idx, "float_column", i as f64);
			graph.set_attr(idx, "string_column", i.to_string());
		}
		graph
	}

	fn settings() -> StyleSettings {
		StyleSettings {
			size_column: "float_column".into(),
			color_column: "string_column".into(),
			label_column: "string_column".into(),
			label_percentile: 50.0,
			..StyleSettings::default()
		}
	}

	fn palette(count: usize) -> Vec<Rgb> {
		PaletteSet::Builtin(PaletteFamily::Qualitative)
			.colors(0, count)
			.unwrap()
	}

	#[test]
	fn parses_color_mode() {
		assert_eq!("Ranking".parse::<ColorMode>().unwrap(), ColorMode::Ranking);
		assert_eq!("PARTITION".parse::<ColorMode>().unwrap(), ColorMode::Partition);
		let err = "rainbow".parse::<ColorMode>().unwrap_err();
		assert!(matches!(err, DiagramError::InvalidColorMode(ref s) if s == "rainbow"));
	}

	#[test]
	fn sizes_increase_with_value() {
		let mut graph = sample_graph(110);
		let settings = settings();
		let colors = palette(8);
		NodeStyler::new(&settings, &colors).resize_nodes(&mut graph).unwrap();
		let sizes: Vec<f64> = graph.nodes().map(|(_, n)| n.visual.size).collect();
		assert!(sizes.windows(2).all(|w| w[0] < w[1]));
		assert_eq!(sizes[0], 3.0);
		assert_eq!(sizes[109], 50.0);
	}

	#[test]
	fn text_size_column_is_coerced() {
		let mut graph = sample_graph(5);
		let settings = StyleSettings {
			size_column: "string_column".into(),
			..settings()
		};
		let colors = palette(8);
		NodeStyler::new(&settings, &colors).resize_nodes(&mut graph).unwrap();
		assert!(graph.column("string_column_numeric").is_some());
		let last = graph.node_index("4").unwrap();
		assert_eq!(graph.node(last).unwrap().visual.size, 50.0);
	}

	#[test]
	fn partition_uses_every_color() {
		let mut graph = sample_graph(110);
		let settings = settings();
		let colors = palette(8);
		let report = NodeStyler::new(&settings, &colors).color_nodes(&mut graph).unwrap();
		assert_eq!(report.categories, 110);
		assert!(report.colors_reused);
		let seen: std::collections::HashSet<Rgb> =
			graph.nodes().map(|(_, n)| n.visual.color).collect();
		assert_eq!(seen.len(), 8);
	}

	#[test]
	fn partition_wraps_palette() {
		let colors = palette(4);
		let mut graph = sample_graph(colors.len() + 1);
		let settings = settings();
		NodeStyler::new(&settings, &colors).color_nodes(&mut graph).unwrap();
		for (i, (_, node)) in graph.nodes().enumerate() {
			assert_eq!(node.visual.color, colors[i % colors.len()]);
		}
		let last = graph.node_index("4").unwrap();
		assert_eq!(graph.node(last).unwrap().visual.color, colors[0]);
	}

	#[test]
	fn partition_orders_by_size_then_appearance() {
		let mut graph = Graph::new();
		for (id, group) in [("a", "x"), ("b", "y"), ("c", "y"), ("d", "z"), ("e", "w")] {
			let idx = graph.add_node(id);
			graph.set_attr(idx, "group", group);
		}
		let names: Vec<String> = partition(&graph, &ColumnRef::new("group"))
			.unwrap()
			.into_iter()
			.map(|c| c.value)
			.collect();
		assert_eq!(names, ["y", "x", "z", "w"]);
	}

	#[test]
	fn ranking_interpolates_palette_ends() {
		let mut graph = sample_graph(11);
		let settings = StyleSettings {
			color_column: "float_column".into(),
			color_mode: ColorMode::Ranking,
			..settings()
		};
		let colors = palette(9);
		NodeStyler::new(&settings, &colors).color_nodes(&mut graph).unwrap();
		let first = graph.node(graph.node_index("0").unwrap()).unwrap();
		let last = graph.node(graph.node_index("10").unwrap()).unwrap();
		assert_eq!(first.visual.color, colors[0]);
		assert_eq!(last.visual.color, colors[8]);
		let middle = graph.node(graph.node_index("5").unwrap()).unwrap();
		assert_eq!(middle.visual.color, colors[0].lerp(colors[8], 0.5));
	}

	#[test]
	fn labels_top_half() {
		let mut graph = sample_graph(110);
		let settings = settings();
		let colors = palette(8);
		let (labeled, cutoff) = NodeStyler::new(&settings, &colors).label_nodes(&mut graph).unwrap();
		assert_eq!(cutoff, 54.5);
		assert_eq!(labeled, 55);
		let shown = graph.nodes().filter(|(_, n)| !n.visual.label.is_empty()).count();
		assert_eq!(shown, 55);
		let top = graph.node(graph.node_index("109").unwrap()).unwrap();
		assert_eq!(top.visual.label, "109");
	}

	#[test]
	fn label_size_falls_back_to_node_size() {
		let mut graph = sample_graph(10);
		let settings = settings();
		assert_eq!(settings.effective_label_bounds(), (0.6, 10.0));
		let colors = palette(8);
		NodeStyler::new(&settings, &colors).label_nodes(&mut graph).unwrap();
		let top = graph.node(graph.node_index("9").unwrap()).unwrap();
		assert_eq!(top.visual.label_size, 10.0);

		let explicit = StyleSettings {
			min_label_size: 1.0,
			max_label_size: 4.0,
			..settings
		};
		assert_eq!(explicit.effective_label_bounds(), (1.0, 4.0));
	}

	#[test]
	fn apply_checks_columns_first() {
		let mut graph = sample_graph(3);
		let settings = StyleSettings {
			label_column: "foo".into(),
			..settings()
		};
		let colors = palette(3);
		let err = NodeStyler::new(&settings, &colors).apply(&mut graph).unwrap_err();
		assert!(matches!(err, DiagramError::ColumnNotFound(ref c) if c == "foo"));
		assert!(graph.nodes().all(|(_, n)| n.visual.size == 10.0));
	}

	proptest::proptest! {
		#[test]
		fn sizes_follow_value_order(values in proptest::collection::vec(-1e6f64..1e6, 2..40)) {
			let mut graph = Graph::new();
			for (i, v) in values.iter().enumerate() {
				let idx = graph.add_node(i.to_string());
				graph.set_attr(idx, "float_column", *v);
				graph.set_attr(idx, "string_column", i.to_string());
			}
			let settings = settings();
			let colors = palette(3);
			NodeStyler::new(&settings, &colors).resize_nodes(&mut graph).unwrap();
			let sized: Vec<(f64, f64)> = graph
				.nodes()
				.map(|(_, n)| (n.number("float_column").unwrap(), n.visual.size))
				.collect();
			for &(va, sa) in &sized {
				proptest::prop_assert!((3.0..=50.0).contains(&sa));
				for &(vb, sb) in &sized {
					if va < vb {
						proptest::prop_assert!(sa <= sb);
					}
				}
			}
		}
	}

	#[test]
	fn empty_palette_is_an_error() {
		let mut graph = sample_graph(3);
		let settings = settings();
		assert!(NodeStyler::new(&settings, &[]).color_nodes(&mut graph).is_err());
	}
}

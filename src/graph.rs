//! Directed, attributed graph owned by a diagram run.
//!
//! Nodes live in slots so that a [`NodeIndex`] stays valid after other nodes
//! are removed. Each node keeps its incoming and outgoing edge sets, which
//! makes [`Graph::degree`] O(1) and [`Graph::remove_node`] O(degree).

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fmt;

use log::debug;

use crate::error::{DiagramError, Result};
use crate::palette::Rgb;

/// Slot of a node; stable across removals.
pub type NodeIndex = usize;
/// Slot of an edge.
pub type EdgeIndex = usize;

/// Suffix of the numeric column derived from a text column.
pub const NUMERIC_SUFFIX: &str = "_numeric";

/// One node attribute as imported.
#[derive(Clone, Debug, PartialEq)]
pub enum AttrValue {
	/// A number.
	Number(f64),
	/// Anything else, kept verbatim.
	Text(String),
}

impl AttrValue {
	/// Numeric view of the value; text is parsed after trimming.
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Self::Number(n) => Some(*n),
			Self::Text(s) => s.trim().parse::<f64>().ok().filter(|n| !n.is_nan()),
		}
	}

	/// Text view of the value; whole numbers print without a fraction.
	pub fn as_text(&self) -> Cow<'_, str> {
		match self {
			Self::Number(n) => Cow::Owned(n.to_string()),
			Self::Text(s) => Cow::Borrowed(s),
		}
	}

	/// The column type this value alone would give its column.
	pub fn column_type(&self) -> ColumnType {
		match self {
			Self::Number(_) => ColumnType::Numeric,
			Self::Text(_) => ColumnType::Text,
		}
	}
}

impl fmt::Display for AttrValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.as_text())
	}
}

impl From<f64> for AttrValue {
	fn from(n: f64) -> Self {
		Self::Number(n)
	}
}

impl From<&str> for AttrValue {
	fn from(s: &str) -> Self {
		Self::Text(s.to_string())
	}
}

impl From<String> for AttrValue {
	fn from(s: String) -> Self {
		Self::Text(s)
	}
}

/// Value type of an attribute column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
	/// Every value is a number.
	Numeric,
	/// At least one value is text.
	Text,
}

/// A named attribute column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
	/// Attribute key on the nodes.
	pub name: String,
	/// Value type.
	pub kind: ColumnType,
}

/// Visual attributes written by the styler.
#[derive(Clone, Debug, PartialEq)]
pub struct VisualState {
	/// Diameter in layout units.
	pub size: f64,
	/// Fill color; also the color of outgoing edges.
	pub color: Rgb,
	/// Label text; empty means unlabeled.
	pub label: String,
	/// Label scale; 1 is the base font size.
	pub label_size: f64,
}

impl Default for VisualState {
	fn default() -> Self {
		Self {
			size: 10.0,
			color: Rgb::BLACK,
			label: String::new(),
			label_size: 1.0,
		}
	}
}

/// A node with its attributes, appearance and position.
#[derive(Clone, Debug)]
pub struct Node {
	id: String,
	attributes: HashMap<String, AttrValue>,
	/// Appearance derived from the attributes.
	pub visual: VisualState,
	/// Horizontal position in layout units.
	pub x: f64,
	/// Vertical position in layout units.
	pub y: f64,
}

impl Node {
	fn new(id: String) -> Self {
		Self {
			id,
			attributes: HashMap::new(),
			visual: VisualState::default(),
			x: 0.0,
			y: 0.0,
		}
	}

	/// Identifier from the input file.
	pub fn id(&self) -> &str {
		&self.id
	}

	/// Raw attribute value.
	pub fn attr(&self, column: &str) -> Option<&AttrValue> {
		self.attributes.get(column)
	}

	/// Attribute as a number, if it is one or parses as one.
	pub fn number(&self, column: &str) -> Option<f64> {
		self.attr(column).and_then(AttrValue::as_f64)
	}

	/// Attribute as text.
	pub fn text(&self, column: &str) -> Option<Cow<'_, str>> {
		self.attr(column).map(AttrValue::as_text)
	}
}

/// A directed, weighted edge.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
	/// Tail node.
	pub source: NodeIndex,
	/// Head node.
	pub target: NodeIndex,
	/// 1 unless the input says otherwise.
	pub weight: f64,
}

#[derive(Clone, Debug, Default)]
struct Incidence {
	outgoing: HashSet<EdgeIndex>,
	incoming: HashSet<EdgeIndex>,
}

/// The graph a run works on.
#[derive(Clone, Debug, Default)]
pub struct Graph {
	nodes: Vec<Option<Node>>,
	incidence: Vec<Incidence>,
	edges: Vec<Option<Edge>>,
	ids: HashMap<String, NodeIndex>,
	columns: Vec<Column>,
	/// Text column name to the numeric column derived from it.
	derived: HashMap<String, String>,
	node_count: usize,
	edge_count: usize,
}

impl Graph {
	/// An empty graph.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a node, or returns the existing index if `id` is already present.
	pub fn add_node(&mut self, id: impl Into<String>) -> NodeIndex {
		let id = id.into();
		if let Some(&idx) = self.ids.get(&id) {
			return idx;
		}
		let idx = self.nodes.len();
		self.ids.insert(id.clone(), idx);
		self.nodes.push(Some(Node::new(id)));
		self.incidence.push(Incidence::default());
		self.node_count += 1;
		idx
	}

	/// Adds a directed edge between two live nodes.
	pub fn add_edge(&mut self, source: NodeIndex, target: NodeIndex, weight: f64) -> Option<EdgeIndex> {
		if !self.contains(source) || !self.contains(target) {
			return None;
		}
		let idx = self.edges.len();
		self.edges.push(Some(Edge {
			source,
			target,
			weight,
		}));
		self.incidence[source].outgoing.insert(idx);
		self.incidence[target].incoming.insert(idx);
		self.edge_count += 1;
		Some(idx)
	}

	/// Registers a column; an existing column keeps its name and the
	/// narrower of the two types (any text makes the column text).
	pub fn add_column(&mut self, name: &str, kind: ColumnType) {
		match self.columns.iter_mut().find(|c| c.name == name) {
			Some(column) => {
				if kind == ColumnType::Text {
					column.kind = ColumnType::Text;
				}
			}
			None => self.columns.push(Column {
				name: name.to_string(),
				kind,
			}),
		}
	}

	/// Sets an attribute, registering its column on first use.
	pub fn set_attr(&mut self, idx: NodeIndex, column: &str, value: impl Into<AttrValue>) {
		let value = value.into();
		let kind = value.column_type();
		if let Some(Some(node)) = self.nodes.get_mut(idx) {
			node.attributes.insert(column.to_string(), value);
			self.add_column(column, kind);
		}
	}

	/// Whether `idx` is a live node.
	pub fn contains(&self, idx: NodeIndex) -> bool {
		matches!(self.nodes.get(idx), Some(Some(_)))
	}

	/// The node at `idx`, unless it was removed.
	pub fn node(&self, idx: NodeIndex) -> Option<&Node> {
		self.nodes.get(idx).and_then(Option::as_ref)
	}

	/// Mutable [`Self::node`].
	pub fn node_mut(&mut self, idx: NodeIndex) -> Option<&mut Node> {
		self.nodes.get_mut(idx).and_then(Option::as_mut)
	}

	/// Index of the node with input identifier `id`.
	pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
		self.ids.get(id).copied()
	}

	/// Live nodes in insertion order.
	pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &Node)> + '_ {
		self.nodes
			.iter()
			.enumerate()
			.filter_map(|(idx, node)| node.as_ref().map(|n| (idx, n)))
	}

	/// Live nodes in insertion order, mutably.
	pub fn nodes_mut(&mut self) -> impl Iterator<Item = (NodeIndex, &mut Node)> + '_ {
		self.nodes
			.iter_mut()
			.enumerate()
			.filter_map(|(idx, node)| node.as_mut().map(|n| (idx, n)))
	}

	/// Live edges in insertion order.
	pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
		self.edges.iter().flatten()
	}

	/// Number of live nodes.
	pub fn node_count(&self) -> usize {
		self.node_count
	}

	/// Number of live edges.
	pub fn edge_count(&self) -> usize {
		self.edge_count
	}

	/// Incoming plus outgoing edges; a self-loop counts twice.
	pub fn degree(&self, idx: NodeIndex) -> usize {
		if !self.contains(idx) {
			return 0;
		}
		let incidence = &self.incidence[idx];
		incidence.outgoing.len() + incidence.incoming.len()
	}

	/// Removes a node together with every edge touching it.
	pub fn remove_node(&mut self, idx: NodeIndex) -> Option<Node> {
		let node = self.nodes.get_mut(idx)?.take()?;
		let incidence = std::mem::take(&mut self.incidence[idx]);
		for edge_idx in incidence.outgoing.union(&incidence.incoming) {
			if let Some(edge) = self.edges[*edge_idx].take() {
				self.incidence[edge.source].outgoing.remove(edge_idx);
				self.incidence[edge.target].incoming.remove(edge_idx);
				self.edge_count -= 1;
			}
		}
		self.ids.remove(&node.id);
		self.node_count -= 1;
		Some(node)
	}

	/// Attribute columns in the order they were first seen.
	pub fn columns(&self) -> &[Column] {
		&self.columns
	}

	/// The column called `name`.
	pub fn column(&self, name: &str) -> Option<&Column> {
		self.columns.iter().find(|c| c.name == name)
	}

	/// Like [`Self::column`], but a missing column is an error.
	pub fn require_column(&self, name: &str) -> Result<&Column> {
		self.column(name)
			.ok_or_else(|| DiagramError::ColumnNotFound(name.to_string()))
	}

	/// Returns the name of a numeric view of `name`.
	///
	/// A numeric column is returned as is. A text column gets a derived
	/// `<name>_numeric` column, created on the first request and reused on
	/// every later one. Values that do not parse as numbers are left out.
	/// If an imported column already has the derived name, a numbered
	/// `<name>_numeric_<n>` is used instead.
	pub fn numeric_column(&mut self, name: &str) -> Result<String> {
		let column = self.require_column(name)?;
		if column.kind == ColumnType::Numeric {
			return Ok(column.name.clone());
		}
		if let Some(derived) = self.derived.get(name) {
			return Ok(derived.clone());
		}
		let derived = self.unused_column_name(&format!("{name}{NUMERIC_SUFFIX}"));

		let mut converted = 0usize;
		for node in self.nodes.iter_mut().flatten() {
			if let Some(value) = node.attributes.get(name).and_then(AttrValue::as_f64) {
				node.attributes.insert(derived.clone(), AttrValue::Number(value));
				converted += 1;
			}
		}
		self.columns.push(Column {
			name: derived.clone(),
			kind: ColumnType::Numeric,
		});
		self.derived.insert(name.to_string(), derived.clone());
		debug!("derived numeric column {derived} ({converted} values)");
		Ok(derived)
	}

	fn unused_column_name(&self, base: &str) -> String {
		let mut candidate = base.to_string();
		let mut n = 1;
		while self.column(&candidate).is_some() {
			n += 1;
			candidate = format!("{base}_{n}");
		}
		candidate
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn triangle() -> Graph {
		let mut graph = Graph::new();
		let a = graph.add_node("a");
		let b = graph.add_node("b");
		let c = graph.add_node("c");
		graph.add_edge(a, b, 1.0);
		graph.add_edge(b, c, 1.0);
		graph.add_edge(c, a, 1.0);
		graph
	}

	#[test]
	fn degree_counts_both_directions() {
		let graph = triangle();
		for (idx, _) in graph.nodes() {
			assert_eq!(graph.degree(idx), 2);
		}
	}

	#[test]
	fn self_loop_counts_twice() {
		let mut graph = Graph::new();
		let a = graph.add_node("a");
		graph.add_edge(a, a, 1.0);
		assert_eq!(graph.degree(a), 2);
		graph.remove_node(a);
		assert_eq!(graph.edge_count(), 0);
	}

	#[test]
	fn removing_node_drops_incident_edges() {
		let mut graph = triangle();
		let b = graph.node_index("b").unwrap();
		let removed = graph.remove_node(b).unwrap();
		assert_eq!(removed.id(), "b");
		assert_eq!(graph.node_count(), 2);
		assert_eq!(graph.edge_count(), 1);
		assert_eq!(graph.degree(graph.node_index("a").unwrap()), 1);
		assert_eq!(graph.degree(b), 0);
		assert!(graph.node_index("b").is_none());
		assert!(graph.remove_node(b).is_none());
	}

	#[test]
	fn indices_stay_stable_after_removal() {
		let mut graph = triangle();
		let c = graph.node_index("c").unwrap();
		graph.remove_node(graph.node_index("a").unwrap());
		assert_eq!(graph.node(c).unwrap().id(), "c");
	}

	#[test]
	fn duplicate_ids_reuse_node() {
		let mut graph = Graph::new();
		let first = graph.add_node("x");
		assert_eq!(graph.add_node("x"), first);
		assert_eq!(graph.node_count(), 1);
	}

	#[test]
	fn edge_to_missing_node_is_rejected() {
		let mut graph = Graph::new();
		let a = graph.add_node("a");
		assert!(graph.add_edge(a, 42, 1.0).is_none());
	}

	#[test]
	fn text_value_makes_column_text() {
		let mut graph = Graph::new();
		let a = graph.add_node("a");
		let b = graph.add_node("b");
		graph.set_attr(a, "score", 1.5);
		assert_eq!(graph.column("score").unwrap().kind, ColumnType::Numeric);
		graph.set_attr(b, "score", "2.5");
		assert_eq!(graph.column("score").unwrap().kind, ColumnType::Text);
	}

	#[test]
	fn numeric_column_is_derived_once() {
		let mut graph = Graph::new();
		for i in 0..5 {
			let idx = graph.add_node(i.to_string());
			graph.set_attr(idx, "rank", i.to_string());
		}
		let bad = graph.add_node("bad");
		graph.set_attr(bad, "rank", "n/a");

		let derived = graph.numeric_column("rank").unwrap();
		assert_eq!(derived, "rank_numeric");
		let columns = graph.columns().len();
		assert_eq!(graph.numeric_column("rank").unwrap(), derived);
		assert_eq!(graph.columns().len(), columns);

		let three = graph.node_index("3").unwrap();
		assert_eq!(graph.node(three).unwrap().number(&derived), Some(3.0));
		assert_eq!(graph.node(bad).unwrap().number(&derived), None);
		assert_eq!(
			graph.node(three).unwrap().attr("rank"),
			Some(&AttrValue::Text("3".into()))
		);
	}

	#[test]
	fn numeric_column_skips_imported_name_clash() {
		let mut graph = Graph::new();
		let a = graph.add_node("a");
		let b = graph.add_node("b");
		graph.set_attr(a, "rank", "7");
		graph.set_attr(b, "rank", "9");
		graph.set_attr(a, "rank_numeric", "high");
		graph.set_attr(b, "rank_numeric", 1.0);

		let derived = graph.numeric_column("rank").unwrap();
		assert_eq!(derived, "rank_numeric_2");
		assert_eq!(graph.column(&derived).unwrap().kind, ColumnType::Numeric);
		assert_eq!(graph.node(a).unwrap().number(&derived), Some(7.0));
		assert_eq!(graph.node(b).unwrap().number(&derived), Some(9.0));
		assert_eq!(graph.column("rank_numeric").unwrap().kind, ColumnType::Text);
		assert_eq!(graph.numeric_column("rank").unwrap(), derived);
	}

	#[test]
	fn numeric_column_passes_through_numbers() {
		let mut graph = Graph::new();
		let a = graph.add_node("a");
		graph.set_attr(a, "size", 2.0);
		assert_eq!(graph.numeric_column("size").unwrap(), "size");
		assert_eq!(graph.columns().len(), 1);
	}

	#[test]
	fn missing_column_is_reported() {
		let mut graph = Graph::new();
		let err = graph.numeric_column("foo").unwrap_err();
		assert_eq!(err.to_string(), "could not access column foo in graph");
	}

	#[test]
	fn number_text_formats_without_trailing_zero() {
		assert_eq!(AttrValue::Number(3.0).as_text(), "3");
		assert_eq!(AttrValue::Number(2.5).to_string(), "2.5");
	}
}

//! Node-link JSON reader.
//!
//! ```json
//! { "nodes": [{ "id": "a", "centrality": 0.4, "name": "A" }],
//!   "links": [{ "source": "a", "target": "b", "weight": 2 }] }
//! ```
//!
//! `edges` is accepted in place of `links`. Every node field other than
//! `id` becomes an attribute column.

use std::fs;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DiagramError, Result};
use crate::graph::{AttrValue, Graph};

/// A node-link JSON document.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GraphData {
	/// Nodes in file order.
	pub nodes: Vec<GraphNode>,
	/// Also read from an `edges` key.
	#[serde(default, alias = "edges")]
	pub links: Vec<GraphLink>,
}

/// One entry of `nodes`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GraphNode {
	/// String or number.
	pub id: Value,
	/// Every other key of the entry.
	#[serde(flatten)]
	pub attributes: Map<String, Value>,
}

/// One entry of `links`, referring to nodes by id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GraphLink {
	/// Id of the tail node.
	pub source: Value,
	/// Id of the head node.
	pub target: Value,
	/// Defaults to 1.
	#[serde(default = "default_weight")]
	pub weight: f64,
}

fn default_weight() -> f64 {
	1.0
}

fn id_text(id: &Value) -> Option<String> {
	match id {
		Value::String(s) => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		_ => None,
	}
}

fn attr_value(value: &Value) -> Option<AttrValue> {
	match value {
		Value::Number(n) => n.as_f64().map(AttrValue::Number),
		Value::String(s) => Some(AttrValue::Text(s.clone())),
		Value::Bool(b) => Some(AttrValue::Text(b.to_string())),
		Value::Null | Value::Array(_) | Value::Object(_) => None,
	}
}

impl GraphData {
	/// Builds a [`Graph`]. Links to unknown ids are skipped; a node id
	/// that is neither a string nor a number is an error.
	pub fn into_graph(self) -> std::result::Result<Graph, String> {
		let mut graph = Graph::new();
		for node in &self.nodes {
			let id = id_text(&node.id).ok_or_else(|| format!("invalid node id {}", node.id))?;
			let idx = graph.add_node(id);
			for (name, value) in &node.attributes {
				if let Some(attr) = attr_value(value) {
					graph.set_attr(idx, name, attr);
				}
			}
		}

		let mut skipped = 0usize;
		for link in &self.links {
			let source = id_text(&link.source).and_then(|id| graph.node_index(&id));
			let target = id_text(&link.target).and_then(|id| graph.node_index(&id));
			match (source, target) {
				(Some(s), Some(t)) => {
					graph.add_edge(s, t, link.weight);
				}
				_ => skipped += 1,
			}
		}
		if skipped > 0 {
			warn!("skipped {skipped} links with unknown endpoints");
		}
		Ok(graph)
	}
}

/// Parses a node-link JSON document.
pub fn parse_json(text: &str) -> std::result::Result<Graph, String> {
	let data: GraphData = serde_json::from_str(text).map_err(|e| e.to_string())?;
	data.into_graph()
}

/// Reads and parses a node-link JSON file.
pub fn read_json(path: &Path) -> Result<Graph> {
	let text = fs::read_to_string(path)?;
	parse_json(&text).map_err(|message| DiagramError::import(path, message))
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn reads_node_link_document() {
		let doc = json!({
			"nodes": [
				{ "id": "a", "centrality": 0.25, "community": 1, "name": "Alpha" },
				{ "id": "b", "centrality": 2, "flag": true, "tags": ["x"] },
				{ "id": 3 }
			],
			"links": [
				{ "source": "a", "target": "b", "weight": 3.5 },
				{ "source": "b", "target": 3 },
				{ "source": "b", "target": "zz" }
			]
		});
		let graph = parse_json(&doc.to_string()).unwrap();
		assert_eq!(graph.node_count(), 3);
		assert_eq!(graph.edge_count(), 2);

		let a = graph.node(graph.node_index("a").unwrap()).unwrap();
		assert_eq!(a.number("community"), Some(1.0));
		assert_eq!(a.text("name").unwrap(), "Alpha");
		let b = graph.node(graph.node_index("b").unwrap()).unwrap();
		assert_eq!(b.text("flag").unwrap(), "true");
		assert!(b.attr("tags").is_none());
		assert!(graph.node_index("3").is_some());

		let weights: Vec<f64> = graph.edges().map(|e| e.weight).collect();
		assert_eq!(weights, [3.5, 1.0]);
	}

	#[test]
	fn accepts_edges_alias() {
		let text = r#"{"nodes":[{"id":"x"},{"id":"y"}],"edges":[{"source":"x","target":"y"}]}"#;
		assert_eq!(parse_json(text).unwrap().edge_count(), 1);
	}

	#[test]
	fn rejects_object_ids() {
		let text = r#"{"nodes":[{"id":{"nested":1}}]}"#;
		assert!(parse_json(text).unwrap_err().starts_with("invalid node id"));
	}

	#[test]
	fn malformed_json_is_reported() {
		assert!(parse_json("{\"nodes\": [").is_err());
	}
}

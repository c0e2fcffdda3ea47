//! Reading graphs from disk and writing finished diagrams.

mod gml;
mod json;
#[cfg(not(target_arch = "wasm32"))]
mod png;
mod svg;

use std::path::Path;

use log::info;

use crate::error::{DiagramError, Result};
use crate::graph::Graph;

pub use gml::{parse_gml, read_gml};
pub use json::{GraphData, GraphLink, GraphNode, parse_json, read_json};
#[cfg(not(target_arch = "wasm32"))]
pub use png::{RasterError, export_png, render_png};
pub use svg::{DisplaySettings, export_svg, render_svg, write_svg};

fn extension(path: &Path) -> Option<String> {
	path.extension()
		.and_then(|e| e.to_str())
		.map(str::to_ascii_lowercase)
}

/// Loads a graph, picking the format from the file extension.
pub fn load_graph(path: &Path) -> Result<Graph> {
	let extension = extension(path);
	let graph = match extension.as_deref() {
		Some("gml") => read_gml(path)?,
		Some("json") => read_json(path)?,
		other => {
			return Err(DiagramError::import(
				path,
				format!(
					"unsupported file extension {}; expected .gml or .json",
					other.unwrap_or("(none)")
				),
			));
		}
	};
	info!(
		"imported {}: {} nodes, {} edges",
		path.display(),
		graph.node_count(),
		graph.edge_count()
	);
	Ok(graph)
}

/// Output image formats, chosen by file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageFormat {
	/// Vector output, written directly.
	Svg,
	/// Raster output at the figure size.
	Png,
}

impl ImageFormat {
	/// Format named by the extension of `path`, ignoring case.
	pub fn from_path(path: &Path) -> Result<Self> {
		match extension(path).as_deref() {
			Some("svg") => Ok(Self::Svg),
			Some("png") => Ok(Self::Png),
			other => Err(DiagramError::export(
				path,
				format!(
					"unsupported image extension {}; expected .svg or .png",
					other.unwrap_or("(none)")
				),
			)),
		}
	}
}

/// Writes the figure in the format named by the extension of `path`.
pub fn export_image(graph: &Graph, settings: &DisplaySettings, path: &Path) -> Result<()> {
	match ImageFormat::from_path(path)? {
		ImageFormat::Svg => export_svg(graph, settings, path),
		#[cfg(not(target_arch = "wasm32"))]
		ImageFormat::Png => export_png(graph, settings, path),
		#[cfg(target_arch = "wasm32")]
		ImageFormat::Png => Err(DiagramError::export(path, "PNG output needs a native build")),
	}
}

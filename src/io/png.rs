//! PNG export: the SVG figure rasterized with `resvg`.

use std::fs;
use std::path::Path;

use log::{debug, info};
use resvg::{tiny_skia, usvg};
use thiserror::Error;

use super::svg::{DisplaySettings, render_svg};
use crate::error::Result;
use crate::graph::Graph;

/// Why a figure could not be turned into a PNG.
#[derive(Debug, Error)]
pub enum RasterError {
	/// The generated SVG was rejected by the rasterizer.
	#[error("could not parse rendered SVG: {0}")]
	Svg(#[from] usvg::Error),

	/// The figure size is zero or too large for a pixmap.
	#[error("cannot allocate a {width}x{height} image")]
	Canvas {
		/// Requested width in pixels.
		width: u32,
		/// Requested height in pixels.
		height: u32,
	},

	/// PNG encoding failed.
	#[error("could not encode PNG: {0}")]
	Encode(String),
}

/// Rasterizes the figure [`render_svg`] draws for `graph`.
pub fn render_png(graph: &Graph, settings: &DisplaySettings) -> Result<Vec<u8>, RasterError> {
	let svg = render_svg(graph, settings);
	let mut options = usvg::Options::default();
	options.fontdb_mut().load_system_fonts();
	debug!("rasterizing with {} font faces", options.fontdb.len());

	let tree = usvg::Tree::from_str(&svg, &options)?;
	let mut pixmap =
		tiny_skia::Pixmap::new(settings.width, settings.height).ok_or(RasterError::Canvas {
			width: settings.width,
			height: settings.height,
		})?;
	resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());
	pixmap
		.encode_png()
		.map_err(|e| RasterError::Encode(e.to_string()))
}

/// Writes the figure to `path` as a PNG.
pub fn export_png(graph: &Graph, settings: &DisplaySettings, path: &Path) -> Result<()> {
	let png = render_png(graph, settings)?;
	fs::write(path, &png)?;
	info!(
		"exported {} nodes and {} edges to {} ({}x{} PNG)",
		graph.node_count(),
		graph.edge_count(),
		path.display(),
		settings.width,
		settings.height
	);
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::palette::Rgb;

	const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

	fn small() -> DisplaySettings {
		DisplaySettings {
			width: 64,
			height: 48,
			edge_opacity: 50.0,
		}
	}

	fn star() -> Graph {
		let mut graph = Graph::new();
		let hub = graph.add_node("hub");
		for i in 0..4 {
			let leaf = graph.add_node(format!("leaf {i}"));
			graph.add_edge(hub, leaf, 1.0);
			let node = graph.node_mut(leaf).unwrap();
			node.x = [-10.0, 10.0, 0.0, 0.0][i];
			node.y = [0.0, 0.0, -10.0, 10.0][i];
		}
		for (_, node) in graph.nodes_mut() {
			node.visual.size = 3.0;
			node.visual.color = Rgb::new(200, 30, 30);
		}
		graph.node_mut(hub).unwrap().visual.label = "hub".into();
		graph
	}

	/// Width and height from the IHDR chunk.
	fn dimensions(png: &[u8]) -> (u32, u32) {
		let be = |at: usize| u32::from_be_bytes([png[at], png[at + 1], png[at + 2], png[at + 3]]);
		(be(16), be(20))
	}

	#[test]
	fn renders_png_at_figure_size() {
		let png = render_png(&star(), &small()).unwrap();
		assert_eq!(png[..8], PNG_SIGNATURE);
		assert_eq!(&png[12..16], b"IHDR");
		assert_eq!(dimensions(&png), (64, 48));
	}

	#[test]
	fn export_writes_png_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("star.png");
		export_png(&star(), &small(), &path).unwrap();
		let written = fs::read(&path).unwrap();
		assert_eq!(written[..8], PNG_SIGNATURE);
		assert_eq!(dimensions(&written), (64, 48));
	}

	#[test]
	fn zero_sized_figure_is_rejected() {
		let settings = DisplaySettings {
			width: 0,
			..small()
		};
		let err = render_png(&star(), &settings).unwrap_err();
		assert!(matches!(err, RasterError::Svg(_) | RasterError::Canvas { .. }), "{err}");
	}
}

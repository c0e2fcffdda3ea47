//! SVG export of a styled, laid-out graph.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::info;

use crate::error::Result;
use crate::graph::{Graph, Node};

/// Fraction of the figure the drawing may fill.
const FIT_MARGIN: f64 = 0.9;
/// Pixels per unit of label size, matching the label-adjust boxes.
const LABEL_SCALE: f64 = 8.0;
/// Edge weights above this draw no thicker.
const MAX_EDGE_WEIGHT: f64 = 10.0;
/// Thinnest edge stroke in pixels.
const MIN_EDGE_WIDTH: f64 = 0.5;

/// Size and edge styling of the exported figure.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplaySettings {
	/// Figure width in pixels.
	pub width: u32,
	/// Figure height in pixels.
	pub height: u32,
	/// Edge opacity in percent.
	pub edge_opacity: f64,
}

impl Default for DisplaySettings {
	fn default() -> Self {
		Self {
			width: 4096,
			height: 4096,
			edge_opacity: 10.0,
		}
	}
}

/// Maps graph coordinates into the figure, centered and uniformly scaled.
struct Viewport {
	scale: f64,
	offset_x: f64,
	offset_y: f64,
}

impl Viewport {
	fn fit(graph: &Graph, settings: &DisplaySettings) -> Self {
		let (w, h) = (settings.width as f64, settings.height as f64);
		let bounds = graph.nodes().fold(None, |acc: Option<(f64, f64, f64, f64)>, (_, n)| {
			let r = n.visual.size / 2.0;
			let (x0, y0, x1, y1) = (n.x - r, n.y - r, n.x + r, n.y + r);
			Some(match acc {
				None => (x0, y0, x1, y1),
				Some((a, b, c, d)) => (a.min(x0), b.min(y0), c.max(x1), d.max(y1)),
			})
		});
		let Some((min_x, min_y, max_x, max_y)) = bounds else {
			return Self {
				scale: 1.0,
				offset_x: w / 2.0,
				offset_y: h / 2.0,
			};
		};
		let (bw, bh) = ((max_x - min_x).max(1.0), (max_y - min_y).max(1.0));
		let scale = (w * FIT_MARGIN / bw).min(h * FIT_MARGIN / bh);
		let (cx, cy) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
		Self {
			scale,
			offset_x: w / 2.0 - cx * scale,
			offset_y: h / 2.0 - cy * scale,
		}
	}

	fn project(&self, node: &Node) -> (f64, f64) {
		(
			node.x * self.scale + self.offset_x,
			node.y * self.scale + self.offset_y,
		)
	}
}

/// Stroke width in pixels for an edge of `weight`, scaled with the figure.
fn edge_width(weight: f64, scale: f64) -> f64 {
	(weight.clamp(1.0, MAX_EDGE_WEIGHT) * scale).max(MIN_EDGE_WIDTH)
}

fn escape(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	for c in text.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&apos;"),
			_ => out.push(c),
		}
	}
	out
}

/// Writes the figure: edges first in their source node's color, then nodes,
/// then labels on top.
pub fn write_svg(graph: &Graph, settings: &DisplaySettings, out: &mut impl Write) -> io::Result<()> {
	let view = Viewport::fit(graph, settings);
	let opacity = (settings.edge_opacity / 100.0).clamp(0.0, 1.0);

	writeln!(
		out,
		r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
		w = settings.width,
		h = settings.height
	)?;
	writeln!(out, r#"<rect width="100%" height="100%" fill="white"/>"#)?;

	writeln!(out, r#"<g id="edges" fill="none" stroke-opacity="{opacity}">"#)?;
	for edge in graph.edges() {
		let (Some(source), Some(target)) = (graph.node(edge.source), graph.node(edge.target)) else {
			continue;
		};
		let ((x1, y1), (x2, y2)) = (view.project(source), view.project(target));
		writeln!(
			out,
			r#"<line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}" stroke="{}" stroke-width="{:.2}"/>"#,
			source.visual.color.to_hex(),
			edge_width(edge.weight, view.scale)
		)?;
	}
	writeln!(out, "</g>")?;

	writeln!(out, r#"<g id="nodes">"#)?;
	for (_, node) in graph.nodes() {
		let (x, y) = view.project(node);
		writeln!(
			out,
			r#"<circle cx="{x:.2}" cy="{y:.2}" r="{:.2}" fill="{}"/>"#,
			node.visual.size / 2.0 * view.scale,
			node.visual.color.to_hex()
		)?;
	}
	writeln!(out, "</g>")?;

	writeln!(
		out,
		r#"<g id="labels" font-family="sans-serif" text-anchor="middle" dominant-baseline="central" fill="black">"#
	)?;
	for (_, node) in graph.nodes().filter(|(_, n)| !n.visual.label.is_empty()) {
		let (x, y) = view.project(node);
		writeln!(
			out,
			r#"<text x="{x:.2}" y="{y:.2}" font-size="{:.1}">{}</text>"#,
			node.visual.label_size * LABEL_SCALE,
			escape(&node.visual.label)
		)?;
	}
	writeln!(out, "</g>")?;
	writeln!(out, "</svg>")
}

/// [`write_svg`] into a string.
pub fn render_svg(graph: &Graph, settings: &DisplaySettings) -> String {
	let mut buf = Vec::new();
	// Writing into a Vec cannot fail.
	let _ = write_svg(graph, settings, &mut buf);
	String::from_utf8_lossy(&buf).into_owned()
}

/// Writes the figure to `path` as SVG.
pub fn export_svg(graph: &Graph, settings: &DisplaySettings, path: &Path) -> Result<()> {
	let mut out = BufWriter::new(File::create(path)?);
	write_svg(graph, settings, &mut out)?;
	out.flush()?;
	info!(
		"exported {} nodes and {} edges to {}",
		graph.node_count(),
		graph.edge_count(),
		path.display()
	);
	Ok(())
}

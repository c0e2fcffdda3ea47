//! The end-to-end diagram run.
//!
//! ```text
//! import -> validate columns -> filter -> style -> layout -> label adjust -> export
//! ```
//!
//! Each stage is a method on [`RunContext`], which owns the graph for the
//! duration of the run.

use std::path::PathBuf;

use log::info;

use crate::config::DiagramConfig;
use crate::error::Result;
use crate::filter::FilterReport;
use crate::graph::Graph;
use crate::io::{self, ImageFormat};
use crate::layout::{self, LabelAdjustRun, LayoutRun};
use crate::palette::Rgb;
use crate::style::{NodeStyler, StyleReport};

/// One run in progress: the settings, the graph they apply to and the
/// resolved palette.
pub struct RunContext<'a> {
	/// Settings for the run.
	pub config: &'a DiagramConfig,
	/// Graph being transformed.
	pub graph: Graph,
	/// Colors resolved from `config.palette`.
	pub palette: Vec<Rgb>,
}

impl<'a> RunContext<'a> {
	/// Checks the configuration and resolves the palette; nothing here
	/// touches the graph.
	pub fn new(config: &'a DiagramConfig, graph: Graph) -> Result<Self> {
		config.validate()?;
		let palette = config.palette.resolve()?;
		Ok(Self {
			config,
			graph,
			palette,
		})
	}

	/// Fails if a styling column is absent from the graph.
	pub fn validate_columns(&self) -> Result<()> {
		for column in self.config.style.columns() {
			self.graph.require_column(column)?;
		}
		Ok(())
	}

	/// Runs the degree filter.
	pub fn filter(&mut self) -> FilterReport {
		self.config.degree_filter.apply(&mut self.graph)
	}

	/// Sizes, colors and labels every node.
	pub fn style(&mut self) -> Result<StyleReport> {
		NodeStyler::new(&self.config.style, &self.palette).apply(&mut self.graph)
	}

	/// Runs the layout within its budget.
	pub fn layout(&mut self) -> LayoutRun {
		layout::run_layout(&mut self.graph, &self.config.layout, &self.config.layout_budget)
	}

	/// Separates overlapping labels; `None` when label adjust is off.
	pub fn adjust_labels(&mut self) -> Option<LabelAdjustRun> {
		let budget = self.config.label_adjust?;
		Some(layout::adjust_labels(&mut self.graph, &budget))
	}

	/// Writes the image to `config.output`.
	pub fn export(&self) -> Result<()> {
		io::export_image(&self.graph, &self.config.display, &self.config.output)
	}

	/// Filter and style without layout, for callers that animate the layout
	/// themselves.
	pub fn prepare(&mut self) -> Result<(FilterReport, StyleReport)> {
		self.validate_columns()?;
		let filtered = self.filter();
		let styled = self.style()?;
		Ok((filtered, styled))
	}
}

/// What a completed [`run`] did.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
	/// Degree filter outcome.
	pub filter: FilterReport,
	/// Styling outcome.
	pub style: StyleReport,
	/// Layout steps and time.
	pub layout: LayoutRun,
	/// Label adjust steps, if it ran.
	pub label_adjust: Option<LabelAdjustRun>,
	/// Nodes written.
	pub nodes: usize,
	/// Edges written.
	pub edges: usize,
	/// Image path.
	pub output: PathBuf,
}

/// Runs every stage for `config`.
///
/// Configuration and palette problems are reported before the input file is
/// read; missing columns before any node is removed.
pub fn run(config: &DiagramConfig) -> Result<RunSummary> {
	// Check everything that does not need the graph first.
	let mut ctx = RunContext::new(config, Graph::new())?;
	let format = ImageFormat::from_path(&config.output)?;
	ctx.graph = io::load_graph(&config.input)?;

	let (filter, style) = ctx.prepare()?;
	let layout = ctx.layout();
	let label_adjust = ctx.adjust_labels();
	ctx.export()?;

	let summary = RunSummary {
		filter,
		style,
		layout,
		label_adjust,
		nodes: ctx.graph.node_count(),
		edges: ctx.graph.edge_count(),
		output: config.output.clone(),
	};
	info!(
		"wrote {} nodes and {} edges to {} as {format:?}",
		summary.nodes,
		summary.edges,
		summary.output.display()
	);
	Ok(summary)
}

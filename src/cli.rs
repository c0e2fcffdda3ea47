//! Command-line interface of the `force-diagram` binary.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::bounds::Bounds;
use crate::config::{DiagramConfig, PaletteSelection};
use crate::error::{DiagramError, Result};
use crate::filter::DegreeFilter;
use crate::io::DisplaySettings;
use crate::layout::{LayoutAlgorithm, LayoutBudget};
use crate::palette::{PaletteFamily, PaletteSource};
use crate::style::{ColorMode, StyleSettings};

/// Layout algorithm names accepted by `--layout`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LayoutChoice {
	/// ForceAtlas
	#[value(name = "force_atlas")]
	ForceAtlas,
	/// ForceAtlas2
	#[default]
	#[value(name = "force_atlas2")]
	ForceAtlas2,
}

/// Lay out an attributed graph and render it as a styled diagram
#[derive(Debug, Parser)]
#[command(name = "force-diagram")]
#[command(version)]
pub struct Cli {
	/// Input graph (.gml or .json)
	#[arg(value_name = "INPUT")]
	pub input: PathBuf,

	/// Output image (.png or .svg)
	#[arg(short, long, value_name = "FILE")]
	pub output: PathBuf,

	/// Figure width in pixels
	#[arg(long, default_value_t = 4096, value_parser = Bounds::<i32>::greater_than(0).parser(), help_heading = "Figure")]
	pub width: i32,

	/// Figure height in pixels
	#[arg(long, default_value_t = 4096, value_parser = Bounds::<i32>::greater_than(0).parser(), help_heading = "Figure")]
	pub height: i32,

	/// Edge opacity in percent
	#[arg(long, default_value_t = 10.0, value_parser = Bounds::<f64>::between(0.0, 100.0).parser(), help_heading = "Figure")]
	pub edge_opacity: f64,

	/// Layout algorithm
	#[arg(long, value_enum, default_value_t = LayoutChoice::ForceAtlas2, help_heading = "Layout")]
	pub layout: LayoutChoice,

	/// Seconds to run the layout for
	#[arg(long, default_value_t = 60, value_parser = Bounds::<i64>::greater_than(0).parser(), help_heading = "Layout")]
	pub layout_time: i64,

	/// Stop the layout after this many steps even if time is left
	#[arg(long, value_parser = Bounds::<i64>::at_least(1).parser(), help_heading = "Layout")]
	pub max_layout_steps: Option<i64>,

	/// Pull toward the center of the figure
	#[arg(long, default_value_t = 1.0, value_parser = Bounds::<f64>::at_least(0.0).parser(), help_heading = "Layout")]
	pub gravity: f64,

	/// Repulsion between nodes; larger spreads the graph out
	#[arg(long, default_value_t = 5.0, value_parser = Bounds::<f64>::greater_than(0.0).parser(), help_heading = "Layout")]
	pub scaling_ratio: f64,

	/// force_atlas2 only [default: 1.0]
	#[arg(long, value_parser = Bounds::<f64>::greater_than(0.0).parser(), help_heading = "Layout")]
	pub jitter_tolerance: Option<f64>,

	/// force_atlas only [default: 0.1]
	#[arg(long, value_parser = Bounds::<f64>::between(0.0, 1.0).parser(), help_heading = "Layout")]
	pub inertia: Option<f64>,

	/// force_atlas only [default: 1.0]
	#[arg(long, value_parser = Bounds::<f64>::greater_than(0.0).parser(), help_heading = "Layout")]
	pub speed: Option<f64>,

	/// Move labeled nodes apart after layout so labels do not overlap
	#[arg(long, help_heading = "Labels")]
	pub label_adjust: bool,

	/// Seconds to spend on label adjustment
	#[arg(long, default_value_t = 20, value_parser = Bounds::<i64>::greater_than(0).parser(), help_heading = "Labels")]
	pub label_adjust_time: i64,

	/// Smallest label size; 0 derives it from the node size
	#[arg(long, default_value_t = 0.0, value_parser = Bounds::<f64>::at_least(0.0).parser(), help_heading = "Labels")]
	pub min_label_size: f64,

	/// Largest label size; 0 derives it from the node size
	#[arg(long, default_value_t = 0.0, value_parser = Bounds::<f64>::at_least(0.0).parser(), help_heading = "Labels")]
	pub max_label_size: f64,

	/// Only nodes above this percentile of the size column get a label
	#[arg(long, default_value_t = 98.0, value_parser = Bounds::<f64>::between(0.0, 100.0).parser(), help_heading = "Labels")]
	pub label_percentile: f64,

	/// Column holding label text
	#[arg(long, default_value = "name", help_heading = "Labels")]
	pub label_column: String,

	/// Size of the node with the smallest size-column value
	#[arg(long, default_value_t = 3.0, value_parser = Bounds::<f64>::greater_than(0.0).parser(), help_heading = "Nodes")]
	pub min_node_size: f64,

	/// Size of the node with the largest size-column value
	#[arg(long, default_value_t = 50.0, value_parser = Bounds::<f64>::greater_than(0.0).parser(), help_heading = "Nodes")]
	pub max_node_size: f64,

	/// Numeric column driving node size and labeling
	#[arg(long, default_value = "centrality", help_heading = "Nodes")]
	pub size_column: String,

	/// Column driving node color
	#[arg(long, default_value = "community", help_heading = "Nodes")]
	pub color_column: String,

	/// partition or ranking
	#[arg(long, default_value = "partition", help_heading = "Nodes")]
	pub color_mode: String,

	/// Remove nodes with fewer incident edges than this
	#[arg(long, default_value_t = 0, value_parser = Bounds::<i32>::at_least(0).parser(), help_heading = "Filtering")]
	pub degree_filter: i32,

	/// Filter passes before giving up on convergence
	#[arg(long, default_value_t = 4, value_parser = Bounds::<i32>::at_least(1).parser(), help_heading = "Filtering")]
	pub filter_iterations: i32,

	/// gephi or colorbrewer
	#[arg(long, default_value = "gephi", help_heading = "Palette")]
	pub palette_source: String,

	/// sequential, diverging or qualitative
	#[arg(long, default_value = "qualitative", help_heading = "Palette")]
	pub palette_type: String,

	/// Palette number within the chosen source and type
	#[arg(long, default_value_t = 0, value_parser = Bounds::<i32>::at_least(0).parser(), help_heading = "Palette")]
	pub palette_index: i32,

	/// Number of palette colors to use
	#[arg(long, default_value_t = 9, value_parser = Bounds::<i32>::at_least(1).parser(), help_heading = "Palette")]
	pub num_colors: i32,
}

fn seconds(secs: i64) -> Duration {
	Duration::from_secs(secs.unsigned_abs())
}

fn count(value: i32) -> usize {
	usize::try_from(value).unwrap_or_default()
}

impl Cli {
	fn layout_algorithm(&self) -> Result<LayoutAlgorithm> {
		match self.layout {
			LayoutChoice::ForceAtlas2 => {
				if self.inertia.is_some() || self.speed.is_some() {
					return Err(DiagramError::Config(
						"--inertia and --speed only apply to the force_atlas layout".into(),
					));
				}
				Ok(LayoutAlgorithm::ForceAtlas2 {
					gravity: self.gravity,
					scaling_ratio: self.scaling_ratio,
					jitter_tolerance: self.jitter_tolerance.unwrap_or(1.0),
				})
			}
			LayoutChoice::ForceAtlas => {
				if self.jitter_tolerance.is_some() {
					return Err(DiagramError::Config(
						"--jitter-tolerance only applies to the force_atlas2 layout".into(),
					));
				}
				Ok(LayoutAlgorithm::ForceAtlas {
					gravity: self.gravity,
					scaling_ratio: self.scaling_ratio,
					speed: self.speed.unwrap_or(1.0),
					inertia: self.inertia.unwrap_or(0.1),
				})
			}
		}
	}
}

impl TryFrom<Cli> for DiagramConfig {
	type Error = DiagramError;

	fn try_from(cli: Cli) -> Result<Self> {
		let layout = cli.layout_algorithm()?;
		let max_steps = cli.max_layout_steps.map(|s| usize::try_from(s).unwrap_or(usize::MAX));
		let config = DiagramConfig {
			display: DisplaySettings {
				width: cli.width.unsigned_abs(),
				height: cli.height.unsigned_abs(),
				edge_opacity: cli.edge_opacity,
			},
			layout,
			layout_budget: LayoutBudget::new(seconds(cli.layout_time)).with_max_steps(max_steps),
			label_adjust: cli
				.label_adjust
				.then(|| LayoutBudget::new(seconds(cli.label_adjust_time)).with_max_steps(max_steps)),
			degree_filter: DegreeFilter::new(count(cli.degree_filter))
				.with_max_iterations(count(cli.filter_iterations)),
			style: StyleSettings {
				color_mode: cli.color_mode.parse::<ColorMode>()?,
				size_column: cli.size_column,
				color_column: cli.color_column,
				label_column: cli.label_column,
				min_node_size: cli.min_node_size,
				max_node_size: cli.max_node_size,
				min_label_size: cli.min_label_size,
				max_label_size: cli.max_label_size,
				label_percentile: cli.label_percentile,
			},
			palette: PaletteSelection {
				source: Some(cli.palette_source.parse::<PaletteSource>()?),
				family: Some(cli.palette_type.parse::<PaletteFamily>()?),
				index: count(cli.palette_index),
				count: count(cli.num_colors),
			},
			input: cli.input,
			output: cli.output,
		};
		config.validate()?;
		Ok(config)
	}
}

//! Validated settings for one diagram run.

use std::path::PathBuf;
use std::time::Duration;

use log::info;

use crate::error::{DiagramError, Result};
use crate::filter::DegreeFilter;
use crate::io::DisplaySettings;
use crate::layout::{LayoutAlgorithm, LayoutBudget};
use crate::palette::{self, PaletteError, PaletteFamily, PaletteSource, Rgb};
use crate::style::StyleSettings;

/// Which palette to color nodes with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaletteSelection {
	/// `None` fails to resolve.
	pub source: Option<PaletteSource>,
	/// `None` fails to resolve.
	pub family: Option<PaletteFamily>,
	/// Palette number within the source and family.
	pub index: usize,
	/// Number of colors to take.
	pub count: usize,
}

impl Default for PaletteSelection {
	fn default() -> Self {
		Self {
			source: Some(PaletteSource::Builtin),
			family: Some(PaletteFamily::Qualitative),
			index: 0,
			count: 9,
		}
	}
}

impl PaletteSelection {
	/// Looks the palette up; see [`palette::resolve`].
	pub fn resolve(&self) -> Result<Vec<Rgb>, PaletteError> {
		let colors = palette::resolve(self.source, self.family, self.index, self.count)?;
		info!(
			"using {} colors from {} {} palette {}",
			colors.len(),
			self.source.unwrap_or_default(),
			self.family.unwrap_or_default(),
			self.index
		);
		Ok(colors)
	}
}

/// Everything a run needs, built once and never mutated afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct DiagramConfig {
	/// Graph to read, `.gml` or `.json`.
	pub input: PathBuf,
	/// Image to write, `.png` or `.svg`.
	pub output: PathBuf,
	/// Figure size and edge opacity.
	pub display: DisplaySettings,
	/// Layout algorithm and its knobs.
	pub layout: LayoutAlgorithm,
	/// How long the layout runs.
	pub layout_budget: LayoutBudget,
	/// `None` leaves label positions to the layout.
	pub label_adjust: Option<LayoutBudget>,
	/// Pruning applied before styling.
	pub degree_filter: DegreeFilter,
	/// Columns and ranges driving node appearance.
	pub style: StyleSettings,
	/// Colors for node coloring.
	pub palette: PaletteSelection,
}

impl Default for DiagramConfig {
	fn default() -> Self {
		Self {
			input: PathBuf::new(),
			output: PathBuf::new(),
			display: DisplaySettings::default(),
			layout: LayoutAlgorithm::default(),
			layout_budget: LayoutBudget::new(Duration::from_secs(60)),
			label_adjust: None,
			degree_filter: DegreeFilter::default(),
			style: StyleSettings::default(),
			palette: PaletteSelection::default(),
		}
	}
}

impl DiagramConfig {
	/// Default settings reading `input` and writing `output`.
	pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
		Self {
			input: input.into(),
			output: output.into(),
			..Self::default()
		}
	}

	/// Checks constraints that span more than one setting.
	pub fn validate(&self) -> Result<()> {
		let style = &self.style;
		if style.min_node_size > style.max_node_size {
			return Err(DiagramError::Config(format!(
				"min node size {} is greater than max node size {}",
				style.min_node_size, style.max_node_size
			)));
		}
		if style.min_label_size > 0.0
			&& style.max_label_size > 0.0
			&& style.min_label_size > style.max_label_size
		{
			return Err(DiagramError::Config(format!(
				"min label size {} is greater than max label size {}",
				style.min_label_size, style.max_label_size
			)));
		}
		if !(0.0..=100.0).contains(&style.label_percentile) {
			return Err(DiagramError::Config(format!(
				"label percentile {} is outside 0..=100",
				style.label_percentile
			)));
		}
		Ok(())
	}
}

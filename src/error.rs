//! Error types shared across the diagram pipeline.

use std::path::PathBuf;

use thiserror::Error;

use crate::bounds::BoundsError;
use crate::palette::PaletteError;

/// Convenience alias used throughout the crate.
pub type Result<T, E = DiagramError> = std::result::Result<T, E>;

/// Everything that can abort a diagram run.
#[derive(Debug, Error)]
pub enum DiagramError {
	/// A numeric parameter failed to parse or fell outside its bounds.
	#[error(transparent)]
	Bounds(#[from] BoundsError),

	/// The requested palette could not be resolved.
	#[error(transparent)]
	Palette(#[from] PaletteError),

	/// A styling column is missing from the imported graph.
	#[error("could not access column {0} in graph")]
	ColumnNotFound(String),

	/// The color mode is neither partition nor ranking.
	#[error("node color mode must be either 'partition' or 'ranking', got '{0}'")]
	InvalidColorMode(String),

	/// Cross-parameter validation failed.
	#[error("configuration error: {0}")]
	Config(String),

	/// The input file could not be read as a graph.
	#[error("could not import graph from {}: {message}", path.display())]
	Import {
		/// The input file.
		path: PathBuf,
		/// What the reader rejected.
		message: String,
	},

	/// The output file cannot be written in any supported format.
	#[error("could not export diagram to {}: {message}", path.display())]
	Export {
		/// The output file.
		path: PathBuf,
		/// Why the export was refused.
		message: String,
	},

	/// The finished figure could not be rasterized.
	#[cfg(not(target_arch = "wasm32"))]
	#[error(transparent)]
	Raster(#[from] crate::io::RasterError),

	/// Reading input or writing output failed.
	#[error(transparent)]
	Io(#[from] std::io::Error),
}

impl DiagramError {
	pub(crate) fn import(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
		Self::Import {
			path: path.into(),
			message: message.into(),
		}
	}

	pub(crate) fn export(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
		Self::Export {
			path: path.into(),
			message: message.into(),
		}
	}
}

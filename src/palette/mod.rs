//! Color palettes for node coloring.
//!
//! A palette is chosen by source (built-in or brewer), family (sequential,
//! diverging, qualitative), index within the family and a color count.
//! Built-in palettes have a fixed number of colors and are truncated to the
//! requested count. Brewer palettes always produce the requested count: the
//! published set for that count when there is one, an interpolated ramp
//! otherwise.

mod tables;

use std::fmt;
use std::str::FromStr;

use log::debug;
use thiserror::Error;

pub use tables::NamedPalette;

/// An sRGB color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
	/// Red.
	pub r: u8,
	/// Green.
	pub g: u8,
	/// Blue.
	pub b: u8,
}

impl Rgb {
	/// `#000000`.
	pub const BLACK: Rgb = Rgb::new(0, 0, 0);

	/// A color from its channels.
	pub const fn new(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b }
	}

	/// Builds a color from a `0xRRGGBB` literal.
	pub const fn from_hex(hex: u32) -> Self {
		Self::new((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
	}

	/// Lowercase `#rrggbb`.
	pub fn to_hex(self) -> String {
		format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
	}

	/// Linear interpolation in RGB space, `t` clamped to `[0, 1]`.
	pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
		let t = t.clamp(0.0, 1.0);
		let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
		Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
	}
}

impl fmt::Display for Rgb {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
	}
}

/// Where palettes come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PaletteSource {
	/// Fixed-size palettes shipped with the tool.
	#[default]
	Builtin,
	/// ColorBrewer palettes, available at any size.
	Brewer,
}

/// Palette type within a source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PaletteFamily {
	/// Light to dark, for ordered values.
	Sequential,
	/// Two ramps meeting at a neutral middle.
	Diverging,
	/// Distinct hues, for categories.
	#[default]
	Qualitative,
}

impl fmt::Display for PaletteSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Builtin => "built-in",
			Self::Brewer => "colorbrewer",
		})
	}
}

impl fmt::Display for PaletteFamily {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Sequential => "sequential",
			Self::Diverging => "diverging",
			Self::Qualitative => "qualitative",
		})
	}
}

impl FromStr for PaletteSource {
	type Err = PaletteError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"gephi" | "builtin" | "built-in" => Ok(Self::Builtin),
			"colorbrewer" | "brewer" => Ok(Self::Brewer),
			_ => Err(PaletteError::UnknownIdentifier {
				what: "source",
				text: s.to_string(),
			}),
		}
	}
}

impl FromStr for PaletteFamily {
	type Err = PaletteError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"sequential" => Ok(Self::Sequential),
			"diverging" => Ok(Self::Diverging),
			"qualitative" => Ok(Self::Qualitative),
			_ => Err(PaletteError::UnknownIdentifier {
				what: "type",
				text: s.to_string(),
			}),
		}
	}
}

/// Palette lookup failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaletteError {
	/// The index is past the end of the table.
	#[error("{origin} {family} palette {index} not found")]
	NotFound {
		/// Source searched.
		origin: PaletteSource,
		/// Family searched.
		family: PaletteFamily,
		/// Requested index.
		index: usize,
	},

	/// No source was given.
	#[error("unsupported color palette source")]
	UnsupportedSource,

	/// No family was given for this source.
	#[error("unsupported {0} color palette type")]
	UnsupportedType(PaletteSource),

	/// A fixed-size palette is too short.
	#[error("too many colors ({requested}) requested from palette (with only {available} colors)")]
	TooManyColors {
		/// Colors asked for.
		requested: usize,
		/// Colors in the palette.
		available: usize,
	},

	/// Zero colors were requested.
	#[error("a palette needs at least one color")]
	NoColors,

	/// A source or family name did not parse.
	#[error("unknown palette {what}: {text}")]
	UnknownIdentifier {
		/// `"source"` or `"type"`.
		what: &'static str,
		/// The text as given.
		text: String,
	},
}

/// How a palette set turns its stored colors into `count` colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountPolicy {
	/// Take the first `count` colors; asking for more is an error.
	Truncate,
	/// Take the first `count` colors while they last, otherwise resample.
	SelectOrInterpolate,
	/// Use the published set with `count` classes, otherwise resample the
	/// largest set.
	ClassOrInterpolate,
}

/// One table of palettes: a source and a family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaletteSet {
	/// Built-in palettes of one family.
	Builtin(PaletteFamily),
	/// ColorBrewer palettes of one family.
	Brewer(PaletteFamily),
}

impl PaletteSet {
	/// The set for `source` and `family`.
	pub fn new(source: PaletteSource, family: PaletteFamily) -> Self {
		match source {
			PaletteSource::Builtin => Self::Builtin(family),
			PaletteSource::Brewer => Self::Brewer(family),
		}
	}

	/// Source half of the key.
	pub fn source(self) -> PaletteSource {
		match self {
			Self::Builtin(_) => PaletteSource::Builtin,
			Self::Brewer(_) => PaletteSource::Brewer,
		}
	}

	/// Family half of the key.
	pub fn family(self) -> PaletteFamily {
		match self {
			Self::Builtin(family) | Self::Brewer(family) => family,
		}
	}

	/// Palettes of this set, in index order.
	pub fn table(self) -> &'static [NamedPalette] {
		use PaletteFamily::*;
		match self {
			Self::Builtin(Sequential) => tables::BUILTIN_SEQUENTIAL,
			Self::Builtin(Diverging) => tables::BUILTIN_DIVERGING,
			Self::Builtin(Qualitative) => tables::BUILTIN_QUALITATIVE,
			Self::Brewer(Sequential) => tables::BREWER_SEQUENTIAL,
			Self::Brewer(Diverging) => tables::BREWER_DIVERGING,
			Self::Brewer(Qualitative) => tables::BREWER_QUALITATIVE,
		}
	}

	/// How this set meets a requested count.
	pub fn policy(self) -> CountPolicy {
		match self {
			Self::Builtin(_) => CountPolicy::Truncate,
			Self::Brewer(PaletteFamily::Qualitative) => CountPolicy::SelectOrInterpolate,
			Self::Brewer(PaletteFamily::Sequential | PaletteFamily::Diverging) => {
				CountPolicy::ClassOrInterpolate
			}
		}
	}

	/// Produces exactly `count` colors from palette `index` of this set.
	pub fn colors(self, index: usize, count: usize) -> Result<Vec<Rgb>, PaletteError> {
		let palette = self.table().get(index).ok_or(PaletteError::NotFound {
			origin: self.source(),
			family: self.family(),
			index,
		})?;
		if count == 0 {
			return Err(PaletteError::NoColors);
		}
		let anchors = palette.colors();
		let colors = match self.policy() {
			CountPolicy::Truncate => {
				if count > anchors.len() {
					return Err(PaletteError::TooManyColors {
						requested: count,
						available: anchors.len(),
					});
				}
				anchors[..count].to_vec()
			}
			CountPolicy::SelectOrInterpolate if count <= anchors.len() => anchors[..count].to_vec(),
			CountPolicy::SelectOrInterpolate => resample(&anchors, count),
			CountPolicy::ClassOrInterpolate => palette
				.class(count)
				.unwrap_or_else(|| resample(&anchors, count)),
		};
		debug!(
			"resolved {} {} palette {} ({}) with {} colors",
			self.source(),
			self.family(),
			index,
			palette.name,
			colors.len()
		);
		Ok(colors)
	}
}

/// Resolves a palette selection; absent source or family is an error.
pub fn resolve(
	source: Option<PaletteSource>,
	family: Option<PaletteFamily>,
	index: usize,
	count: usize,
) -> Result<Vec<Rgb>, PaletteError> {
	let source = source.ok_or(PaletteError::UnsupportedSource)?;
	let family = family.ok_or(PaletteError::UnsupportedType(source))?;
	PaletteSet::new(source, family).colors(index, count)
}

/// Samples `count` evenly spaced colors along the ramp through `anchors`.
fn resample(anchors: &[Rgb], count: usize) -> Vec<Rgb> {
	match (anchors, count) {
		([], _) | (_, 0) => Vec::new(),
		([only], _) => vec![*only; count],
		(_, 1) => vec![anchors[0]],
		_ => {
			let last = (anchors.len() - 1) as f64;
			(0..count)
				.map(|i| {
					let pos = last * i as f64 / (count - 1) as f64;
					let lo = (pos.floor() as usize).min(anchors.len() - 2);
					anchors[lo].lerp(anchors[lo + 1], pos - lo as f64)
				})
				.collect()
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashSet;

	fn rgb(r: u8, g: u8, b: u8) -> Rgb {
		Rgb::new(r, g, b)
	}

	#[test]
	fn parses_source_case_insensitively() {
		for (text, expected) in [
			("Gephi", PaletteSource::Builtin),
			("GEPHI", PaletteSource::Builtin),
			("Colorbrewer", PaletteSource::Brewer),
			("COLORBREWER", PaletteSource::Brewer),
		] {
			assert_eq!(text.parse::<PaletteSource>(), Ok(expected), "{text}");
		}
		assert!(matches!(
			"foo".parse::<PaletteSource>(),
			Err(PaletteError::UnknownIdentifier { .. })
		));
	}

	#[test]
	fn parses_family_case_insensitively() {
		for (text, expected) in [
			("Sequential", PaletteFamily::Sequential),
			("SEQUENTIAL", PaletteFamily::Sequential),
			("Diverging", PaletteFamily::Diverging),
			("DIVERGING", PaletteFamily::Diverging),
			("Qualitative", PaletteFamily::Qualitative),
			("QUALITATIVE", PaletteFamily::Qualitative),
		] {
			assert_eq!(text.parse::<PaletteFamily>(), Ok(expected), "{text}");
		}
		assert!("foo".parse::<PaletteFamily>().is_err());
	}

	#[test]
	fn default_palette_has_nine_distinct_colors() {
		let colors = resolve(
			Some(PaletteSource::Builtin),
			Some(PaletteFamily::Qualitative),
			0,
			9,
		)
		.unwrap();
		assert_eq!(colors.len(), 9);
		assert!(colors.iter().all(|c| *c != Rgb::BLACK));
		assert_eq!(colors.iter().collect::<HashSet<_>>().len(), 9);
	}

	#[test]
	fn builtin_palettes_truncate() {
		use PaletteFamily::*;
		let cases = [
			(
				Sequential,
				7,
				vec![rgb(255, 255, 212), rgb(254, 217, 142), rgb(254, 153, 41), rgb(217, 95, 14)],
			),
			(
				Diverging,
				4,
				vec![
					rgb(215, 25, 28),
					rgb(253, 174, 97),
					rgb(255, 255, 191),
					rgb(171, 217, 233),
					rgb(44, 123, 182),
				],
			),
			(
				Qualitative,
				3,
				vec![
					rgb(141, 211, 199),
					rgb(255, 255, 179),
					rgb(190, 186, 218),
					rgb(251, 128, 114),
					rgb(128, 177, 211),
					rgb(253, 180, 98),
					rgb(179, 222, 105),
					rgb(252, 205, 229),
				],
			),
		];
		for (family, index, expected) in cases {
			let colors = PaletteSet::Builtin(family).colors(index, expected.len()).unwrap();
			assert_eq!(colors, expected, "{family} {index}");
		}
	}

	#[test]
	fn brewer_palettes_generate_requested_count() {
		let set3 = PaletteSet::Brewer(PaletteFamily::Qualitative).colors(7, 7).unwrap();
		assert_eq!(
			set3,
			vec![
				rgb(141, 211, 199),
				rgb(255, 255, 179),
				rgb(190, 186, 218),
				rgb(251, 128, 114),
				rgb(128, 177, 211),
				rgb(253, 180, 98),
				rgb(179, 222, 105),
			]
		);

		let cyan_magenta = PaletteSet::Brewer(PaletteFamily::Diverging).colors(10, 5).unwrap();
		assert_eq!(
			cyan_magenta,
			vec![
				rgb(0, 255, 255),
				rgb(128, 255, 255),
				rgb(255, 255, 255),
				rgb(255, 128, 255),
				rgb(255, 0, 255),
			]
		);

		let ylorrd = PaletteSet::Brewer(PaletteFamily::Sequential).colors(17, 3).unwrap();
		assert_eq!(ylorrd, vec![rgb(255, 237, 160), rgb(254, 178, 76), rgb(240, 59, 32)]);
	}

	#[test]
	fn brewer_uses_published_class_sets() {
		let rdbu = PaletteSet::Brewer(PaletteFamily::Diverging).colors(4, 7).unwrap();
		assert_eq!(
			rdbu.iter().map(|c| c.to_hex()).collect::<Vec<_>>(),
			["#b2182b", "#ef8a62", "#fddbc7", "#f7f7f7", "#d1e5f0", "#67a9cf", "#2166ac"]
		);
		let ylorrd = PaletteSet::Brewer(PaletteFamily::Sequential).colors(17, 9).unwrap();
		assert_eq!(ylorrd[0], Rgb::from_hex(0xffffcc));
		assert_eq!(ylorrd[8], Rgb::from_hex(0x800026));
	}

	#[test]
	fn brewer_interpolates_outside_published_counts() {
		for count in [1, 2, 10, 20] {
			let ylorrd = PaletteSet::Brewer(PaletteFamily::Sequential).colors(17, count).unwrap();
			assert_eq!(ylorrd.len(), count);
			assert_eq!(ylorrd[0], Rgb::from_hex(0xffffcc));
			if count > 1 {
				assert_eq!(ylorrd[count - 1], Rgb::from_hex(0x800026));
			}
		}
		let spectral = PaletteSet::Brewer(PaletteFamily::Diverging).colors(8, 12).unwrap();
		assert_eq!(spectral[0], Rgb::from_hex(0x9e0142));
		assert_eq!(spectral[11], Rgb::from_hex(0x5e4fa2));
	}

	#[test]
	fn brewer_qualitative_resamples_past_its_length() {
		let colors = PaletteSet::Brewer(PaletteFamily::Qualitative).colors(0, 30).unwrap();
		assert_eq!(colors.len(), 30);
	}

	#[test]
	fn missing_source_or_family_is_unsupported() {
		assert_eq!(
			resolve(None, Some(PaletteFamily::Diverging), 0, 3),
			Err(PaletteError::UnsupportedSource)
		);
		assert_eq!(
			resolve(Some(PaletteSource::Builtin), None, 0, 3),
			Err(PaletteError::UnsupportedType(PaletteSource::Builtin))
		);
	}

	#[test]
	fn unknown_palette_index() {
		let err = resolve(
			Some(PaletteSource::Builtin),
			Some(PaletteFamily::Diverging),
			100,
			3,
		)
		.unwrap_err();
		assert_eq!(err.to_string(), "built-in diverging palette 100 not found");
	}

	#[test]
	fn too_many_colors() {
		let err = resolve(
			Some(PaletteSource::Builtin),
			Some(PaletteFamily::Diverging),
			0,
			100,
		)
		.unwrap_err();
		assert_eq!(
			err,
			PaletteError::TooManyColors {
				requested: 100,
				available: 5
			}
		);
	}

	#[test]
	fn zero_colors_rejected() {
		assert_eq!(
			PaletteSet::Brewer(PaletteFamily::Sequential).colors(0, 0),
			Err(PaletteError::NoColors)
		);
	}

	#[test]
	fn lerp_endpoints() {
		let (a, b) = (rgb(0, 0, 0), rgb(255, 100, 10));
		assert_eq!(a.lerp(b, 0.0), a);
		assert_eq!(a.lerp(b, 1.0), b);
		assert_eq!(a.lerp(b, 2.0), b);
		assert_eq!(a.to_hex(), "#000000");
		assert_eq!(b.to_hex(), "#ff640a");
	}
}

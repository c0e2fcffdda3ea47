//! Palette tables: built-in palettes and ColorBrewer class sets.

use super::Rgb;

/// A named list of `0xRRGGBB` colors.
#[derive(Debug)]
pub struct NamedPalette {
	/// Name the palette is published under.
	pub name: &'static str,
	hex: &'static [u32],
	/// Hand-picked sets for particular class counts, smallest first.
	classes: &'static [&'static [u32]],
}

impl NamedPalette {
	const fn new(name: &'static str, hex: &'static [u32]) -> Self {
		Self {
			name,
			hex,
			classes: &[],
		}
	}

	/// A palette whose full color list is its largest class set.
	const fn classed(name: &'static str, classes: &'static [&'static [u32]]) -> Self {
		Self {
			name,
			hex: classes[classes.len() - 1],
			classes,
		}
	}

	/// Number of colors in the full list.
	pub fn len(&self) -> usize {
		self.hex.len()
	}

	/// Whether the full list is empty.
	pub fn is_empty(&self) -> bool {
		self.hex.is_empty()
	}

	/// The full color list.
	pub fn colors(&self) -> Vec<Rgb> {
		to_rgb(self.hex)
	}

	/// The published set with exactly `count` colors, if there is one.
	pub fn class(&self, count: usize) -> Option<Vec<Rgb>> {
		self.classes
			.iter()
			.find(|set| set.len() == count)
			.map(|set| to_rgb(set))
	}
}

fn to_rgb(hex: &[u32]) -> Vec<Rgb> {
	hex.iter().map(|&h| Rgb::from_hex(h)).collect()
}

// Qualitative sets at their largest size.
const ACCENT: &[u32] = &[
	0x7fc97f, 0xbeaed4, 0xfdc086, 0xffff99, 0x386cb0, 0xf0027f, 0xbf5b17, 0x666666,
];
const DARK2: &[u32] = &[
	0x1b9e77, 0xd95f02, 0x7570b3, 0xe7298a, 0x66a61e, 0xe6ab02, 0xa6761d, 0x666666,
];
const PAIRED: &[u32] = &[
	0xa6cee3, 0x1f78b4, 0xb2df8a, 0x33a02c, 0xfb9a99, 0xe31a1c, 0xfdbf6f, 0xff7f00, 0xcab2d6,
	0x6a3d9a, 0xffff99, 0xb15928,
];
const PASTEL1: &[u32] = &[
	0xfbb4ae, 0xb3cde3, 0xccebc5, 0xdecbe4, 0xfed9a6, 0xffffcc, 0xe5d8bd, 0xfddaec, 0xf2f2f2,
];
const PASTEL2: &[u32] = &[
	0xb3e2cd, 0xfdcdac, 0xcbd5e8, 0xf4cae4, 0xe6f5c9, 0xfff2ae, 0xf1e2cc, 0xcccccc,
];
const SET1: &[u32] = &[
	0xe41a1c, 0x377eb8, 0x4daf4a, 0x984ea3, 0xff7f00, 0xffff33, 0xa65628, 0xf781bf, 0x999999,
];
const SET2: &[u32] = &[
	0x66c2a5, 0xfc8d62, 0x8da0cb, 0xe78ac3, 0xa6d854, 0xffd92f, 0xe5c494, 0xb3b3b3,
];
const SET3: &[u32] = &[
	0x8dd3c7, 0xffffb3, 0xbebada, 0xfb8072, 0x80b1d3, 0xfdb462, 0xb3de69, 0xfccde5, 0xd9d9d9,
	0xbc80bd, 0xccebc5, 0xffed6f,
];
const CATEGORY10: &[u32] = &[
	0x1f77b4, 0xff7f0e, 0x2ca02c, 0xd62728, 0x9467bd, 0x8c564b, 0xe377c2, 0x7f7f7f, 0xbcbd22,
	0x17becf,
];

pub(super) static BUILTIN_SEQUENTIAL: &[NamedPalette] = &[
	NamedPalette::new("YlGn", &[0xffffcc, 0xc2e699, 0x78c679, 0x31a354, 0x006837]),
	NamedPalette::new("YlGnBu", &[0xffffcc, 0xa1dab4, 0x41b6c4, 0x2c7fb8, 0x253494]),
	NamedPalette::new("GnBu", &[0xf0f9e8, 0xbae4bc, 0x7bccc4, 0x43a2ca, 0x0868ac]),
	NamedPalette::new("BuGn", &[0xedf8fb, 0xb2e2e2, 0x66c2a4, 0x2ca25f, 0x006d2c]),
	NamedPalette::new("PuBuGn", &[0xf6eff7, 0xbdc9e1, 0x67a9cf, 0x1c9099, 0x016c59]),
	NamedPalette::new("PuBu", &[0xf1eef6, 0xbdc9e1, 0x74a9cf, 0x2b8cbe, 0x045a8d]),
	NamedPalette::new("BuPu", &[0xedf8fb, 0xb3cde3, 0x8c96c6, 0x8856a7, 0x810f7c]),
	NamedPalette::new("YlOrBr", &[0xffffd4, 0xfed98e, 0xfe9929, 0xd95f0e, 0x993404]),
	NamedPalette::new("YlOrRd", &[0xffffb2, 0xfecc5c, 0xfd8d3c, 0xf03b20, 0xbd0026]),
	NamedPalette::new("OrRd", &[0xfef0d9, 0xfdcc8a, 0xfc8d59, 0xe34a33, 0xb30000]),
	NamedPalette::new("RdPu", &[0xfeebe2, 0xfbb4b9, 0xf768a1, 0xc51b8a, 0x7a0177]),
	NamedPalette::new("PuRd", &[0xf1eef6, 0xd7b5d8, 0xdf65b0, 0xdd1c77, 0x980043]),
	NamedPalette::new("Greens", &[0xedf8e9, 0xbae4b3, 0x74c476, 0x31a354, 0x006d2c]),
	NamedPalette::new("Blues", &[0xeff3ff, 0xbdd7e7, 0x6baed6, 0x3182bd, 0x08519c]),
	NamedPalette::new("Reds", &[0xfee5d9, 0xfcae91, 0xfb6a4a, 0xde2d26, 0xa50f15]),
	NamedPalette::new("Oranges", &[0xfeedde, 0xfdbe85, 0xfd8d3c, 0xe6550d, 0xa63603]),
	NamedPalette::new("Purples", &[0xf2f0f7, 0xcbc9e2, 0x9e9ac8, 0x756bb1, 0x54278f]),
	NamedPalette::new("Greys", &[0xf7f7f7, 0xcccccc, 0x969696, 0x636363, 0x252525]),
];

pub(super) static BUILTIN_DIVERGING: &[NamedPalette] = &[
	NamedPalette::new("PuOr", &[0xe66101, 0xfdb863, 0xf7f7f7, 0xb2abd2, 0x5e3c99]),
	NamedPalette::new("BrBG", &[0xa6611a, 0xdfc27d, 0xf5f5f5, 0x80cdc1, 0x018571]),
	NamedPalette::new("PRGn", &[0x7b3294, 0xc2a5cf, 0xf7f7f7, 0xa6dba0, 0x008837]),
	NamedPalette::new("PiYG", &[0xd01c8b, 0xf1b6da, 0xf7f7f7, 0xb8e186, 0x4dac26]),
	NamedPalette::new("RdYlBu", &[0xd7191c, 0xfdae61, 0xffffbf, 0xabd9e9, 0x2c7bb6]),
	NamedPalette::new("RdBu", &[0xca0020, 0xf4a582, 0xf7f7f7, 0x92c5de, 0x0571b0]),
	NamedPalette::new("RdGy", &[0xca0020, 0xf4a582, 0xffffff, 0xbababa, 0x404040]),
	NamedPalette::new("Spectral", &[0xd7191c, 0xfdae61, 0xffffbf, 0xabdda4, 0x2b83ba]),
	NamedPalette::new("RdYlGn", &[0xd7191c, 0xfdae61, 0xffffbf, 0xa6d96a, 0x1a9641]),
];

pub(super) static BUILTIN_QUALITATIVE: &[NamedPalette] = &[
	NamedPalette::new("Set1", SET1),
	NamedPalette::new("Paired", PAIRED),
	NamedPalette::new("Pastel1", PASTEL1),
	NamedPalette::new("Set3", SET3),
	NamedPalette::new("Set2", SET2),
	NamedPalette::new("Dark2", DARK2),
	NamedPalette::new("Accent", ACCENT),
	NamedPalette::new("Pastel2", PASTEL2),
	NamedPalette::new("Category10", CATEGORY10),
];

// Published ColorBrewer sets for 3 classes and up, smallest first.
pub(super) static BREWER_SEQUENTIAL: &[NamedPalette] = &[
	NamedPalette::classed(
		"Blues",
		&[
			&[0xdeebf7, 0x9ecae1, 0x3182bd],
			&[0xeff3ff, 0xbdd7e7, 0x6baed6, 0x2171b5],
			&[0xeff3ff, 0xbdd7e7, 0x6baed6, 0x3182bd, 0x08519c],
			&[0xeff3ff, 0xc6dbef, 0x9ecae1, 0x6baed6, 0x3182bd, 0x08519c],
			&[0xeff3ff, 0xc6dbef, 0x9ecae1, 0x6baed6, 0x4292c6, 0x2171b5, 0x084594],
			&[0xf7fbff, 0xdeebf7, 0xc6dbef, 0x9ecae1, 0x6baed6, 0x4292c6, 0x2171b5, 0x084594],
			&[
				0xf7fbff, 0xdeebf7, 0xc6dbef, 0x9ecae1, 0x6baed6, 0x4292c6, 0x2171b5, 0x08519c,
				0x08306b,
			],
		],
	),
	NamedPalette::classed(
		"BuGn",
		&[
			&[0xe5f5f9, 0x99d8c9, 0x2ca25f],
			&[0xedf8fb, 0xb2e2e2, 0x66c2a4, 0x238b45],
			&[0xedf8fb, 0xb2e2e2, 0x66c2a4, 0x2ca25f, 0x006d2c],
			&[0xedf8fb, 0xccece6, 0x99d8c9, 0x66c2a4, 0x2ca25f, 0x006d2c],
			&[0xedf8fb, 0xccece6, 0x99d8c9, 0x66c2a4, 0x41ae76, 0x238b45, 0x005824],
			&[0xf7fcfd, 0xe5f5f9, 0xccece6, 0x99d8c9, 0x66c2a4, 0x41ae76, 0x238b45, 0x005824],
			&[
				0xf7fcfd, 0xe5f5f9, 0xccece6, 0x99d8c9, 0x66c2a4, 0x41ae76, 0x238b45, 0x006d2c,
				0x00441b,
			],
		],
	),
	NamedPalette::classed(
		"BuPu",
		&[
			&[0xe0ecf4, 0x9ebcda, 0x8856a7],
			&[0xedf8fb, 0xb3cde3, 0x8c96c6, 0x88419d],
			&[0xedf8fb, 0xb3cde3, 0x8c96c6, 0x8856a7, 0x810f7c],
			&[0xedf8fb, 0xbfd3e6, 0x9ebcda, 0x8c96c6, 0x8856a7, 0x810f7c],
			&[0xedf8fb, 0xbfd3e6, 0x9ebcda, 0x8c96c6, 0x8c6bb1, 0x88419d, 0x6e016b],
			&[0xf7fcfd, 0xe0ecf4, 0xbfd3e6, 0x9ebcda, 0x8c96c6, 0x8c6bb1, 0x88419d, 0x6e016b],
			&[
				0xf7fcfd, 0xe0ecf4, 0xbfd3e6, 0x9ebcda, 0x8c96c6, 0x8c6bb1, 0x88419d, 0x810f7c,
				0x4d004b,
			],
		],
	),
	NamedPalette::classed(
		"GnBu",
		&[
			&[0xe0f3db, 0xa8ddb5, 0x43a2ca],
			&[0xf0f9e8, 0xbae4bc, 0x7bccc4, 0x2b8cbe],
			&[0xf0f9e8, 0xbae4bc, 0x7bccc4, 0x43a2ca, 0x0868ac],
			&[0xf0f9e8, 0xccebc5, 0xa8ddb5, 0x7bccc4, 0x43a2ca, 0x0868ac],
			&[0xf0f9e8, 0xccebc5, 0xa8ddb5, 0x7bccc4, 0x4eb3d3, 0x2b8cbe, 0x08589e],
			&[0xf7fcf0, 0xe0f3db, 0xccebc5, 0xa8ddb5, 0x7bccc4, 0x4eb3d3, 0x2b8cbe, 0x08589e],
			&[
				0xf7fcf0, 0xe0f3db, 0xccebc5, 0xa8ddb5, 0x7bccc4, 0x4eb3d3, 0x2b8cbe, 0x0868ac,
				0x084081,
			],
		],
	),
	NamedPalette::classed(
		"Greens",
		&[
			&[0xe5f5e0, 0xa1d99b, 0x31a354],
			&[0xedf8e9, 0xbae4b3, 0x74c476, 0x238b45],
			&[0xedf8e9, 0xbae4b3, 0x74c476, 0x31a354, 0x006d2c],
			&[0xedf8e9, 0xc7e9c0, 0xa1d99b, 0x74c476, 0x31a354, 0x006d2c],
			&[0xedf8e9, 0xc7e9c0, 0xa1d99b, 0x74c476, 0x41ab5d, 0x238b45, 0x005a32],
			&[0xf7fcf5, 0xe5f5e0, 0xc7e9c0, 0xa1d99b, 0x74c476, 0x41ab5d, 0x238b45, 0x005a32],
			&[
				0xf7fcf5, 0xe5f5e0, 0xc7e9c0, 0xa1d99b, 0x74c476, 0x41ab5d, 0x238b45, 0x006d2c,
				0x00441b,
			],
		],
	),
	NamedPalette::classed(
		"Greys",
		&[
			&[0xf0f0f0, 0xbdbdbd, 0x636363],
			&[0xf7f7f7, 0xcccccc, 0x969696, 0x525252],
			&[0xf7f7f7, 0xcccccc, 0x969696, 0x636363, 0x252525],
			&[0xf7f7f7, 0xd9d9d9, 0xbdbdbd, 0x969696, 0x636363, 0x252525],
			&[0xf7f7f7, 0xd9d9d9, 0xbdbdbd, 0x969696, 0x737373, 0x525252, 0x252525],
			&[0xffffff, 0xf0f0f0, 0xd9d9d9, 0xbdbdbd, 0x969696, 0x737373, 0x525252, 0x252525],
			&[
				0xffffff, 0xf0f0f0, 0xd9d9d9, 0xbdbdbd, 0x969696, 0x737373, 0x525252, 0x252525,
				0x000000,
			],
		],
	),
	NamedPalette::classed(
		"Oranges",
		&[
			&[0xfee6ce, 0xfdae6b, 0xe6550d],
			&[0xfeedde, 0xfdbe85, 0xfd8d3c, 0xd94701],
			&[0xfeedde, 0xfdbe85, 0xfd8d3c, 0xe6550d, 0xa63603],
			&[0xfeedde, 0xfdd0a2, 0xfdae6b, 0xfd8d3c, 0xe6550d, 0xa63603],
			&[0xfeedde, 0xfdd0a2, 0xfdae6b, 0xfd8d3c, 0xf16913, 0xd94801, 0x8c2d04],
			&[0xfff5eb, 0xfee6ce, 0xfdd0a2, 0xfdae6b, 0xfd8d3c, 0xf16913, 0xd94801, 0x8c2d04],
			&[
				0xfff5eb, 0xfee6ce, 0xfdd0a2, 0xfdae6b, 0xfd8d3c, 0xf16913, 0xd94801, 0xa63603,
				0x7f2704,
			],
		],
	),
	NamedPalette::classed(
		"OrRd",
		&[
			&[0xfee8c8, 0xfdbb84, 0xe34a33],
			&[0xfef0d9, 0xfdcc8a, 0xfc8d59, 0xd7301f],
			&[0xfef0d9, 0xfdcc8a, 0xfc8d59, 0xe34a33, 0xb30000],
			&[0xfef0d9, 0xfdd49e, 0xfdbb84, 0xfc8d59, 0xe34a33, 0xb30000],
			&[0xfef0d9, 0xfdd49e, 0xfdbb84, 0xfc8d59, 0xef6548, 0xd7301f, 0x990000],
			&[0xfff7ec, 0xfee8c8, 0xfdd49e, 0xfdbb84, 0xfc8d59, 0xef6548, 0xd7301f, 0x990000],
			&[
				0xfff7ec, 0xfee8c8, 0xfdd49e, 0xfdbb84, 0xfc8d59, 0xef6548, 0xd7301f, 0xb30000,
				0x7f0000,
			],
		],
	),
	NamedPalette::classed(
		"PuBu",
		&[
			&[0xece7f2, 0xa6bddb, 0x2b8cbe],
			&[0xf1eef6, 0xbdc9e1, 0x74a9cf, 0x0570b0],
			&[0xf1eef6, 0xbdc9e1, 0x74a9cf, 0x2b8cbe, 0x045a8d],
			&[0xf1eef6, 0xd0d1e6, 0xa6bddb, 0x74a9cf, 0x2b8cbe, 0x045a8d],
			&[0xf1eef6, 0xd0d1e6, 0xa6bddb, 0x74a9cf, 0x3690c0, 0x0570b0, 0x034e7b],
			&[0xfff7fb, 0xece7f2, 0xd0d1e6, 0xa6bddb, 0x74a9cf, 0x3690c0, 0x0570b0, 0x034e7b],
			&[
				0xfff7fb, 0xece7f2, 0xd0d1e6, 0xa6bddb, 0x74a9cf, 0x3690c0, 0x0570b0, 0x045a8d,
				0x023858,
			],
		],
	),
	NamedPalette::classed(
		"PuBuGn",
		&[
			&[0xece2f0, 0xa6bddb, 0x1c9099],
			&[0xf6eff7, 0xbdc9e1, 0x67a9cf, 0x02818a],
			&[0xf6eff7, 0xbdc9e1, 0x67a9cf, 0x1c9099, 0x016c59],
			&[0xf6eff7, 0xd0d1e6, 0xa6bddb, 0x67a9cf, 0x1c9099, 0x016c59],
			&[0xf6eff7, 0xd0d1e6, 0xa6bddb, 0x67a9cf, 0x3690c0, 0x02818a, 0x016450],
			&[0xfff7fb, 0xece2f0, 0xd0d1e6, 0xa6bddb, 0x67a9cf, 0x3690c0, 0x02818a, 0x016450],
			&[
				0xfff7fb, 0xece2f0, 0xd0d1e6, 0xa6bddb, 0x67a9cf, 0x3690c0, 0x02818a, 0x016c59,
				0x014636,
			],
		],
	),
	NamedPalette::classed(
		"PuRd",
		&[
			&[0xe7e1ef, 0xc994c7, 0xdd1c77],
			&[0xf1eef6, 0xd7b5d8, 0xdf65b0, 0xce1256],
			&[0xf1eef6, 0xd7b5d8, 0xdf65b0, 0xdd1c77, 0x980043],
			&[0xf1eef6, 0xd4b9da, 0xc994c7, 0xdf65b0, 0xdd1c77, 0x980043],
			&[0xf1eef6, 0xd4b9da, 0xc994c7, 0xdf65b0, 0xe7298a, 0xce1256, 0x91003f],
			&[0xf7f4f9, 0xe7e1ef, 0xd4b9da, 0xc994c7, 0xdf65b0, 0xe7298a, 0xce1256, 0x91003f],
			&[
				0xf7f4f9, 0xe7e1ef, 0xd4b9da, 0xc994c7, 0xdf65b0, 0xe7298a, 0xce1256, 0x980043,
				0x67001f,
			],
		],
	),
	NamedPalette::classed(
		"Purples",
		&[
			&[0xefedf5, 0xbcbddc, 0x756bb1],
			&[0xf2f0f7, 0xcbc9e2, 0x9e9ac8, 0x6a51a3],
			&[0xf2f0f7, 0xcbc9e2, 0x9e9ac8, 0x756bb1, 0x54278f],
			&[0xf2f0f7, 0xdadaeb, 0xbcbddc, 0x9e9ac8, 0x756bb1, 0x54278f],
			&[0xf2f0f7, 0xdadaeb, 0xbcbddc, 0x9e9ac8, 0x807dba, 0x6a51a3, 0x4a1486],
			&[0xfcfbfd, 0xefedf5, 0xdadaeb, 0xbcbddc, 0x9e9ac8, 0x807dba, 0x6a51a3, 0x4a1486],
			&[
				0xfcfbfd, 0xefedf5, 0xdadaeb, 0xbcbddc, 0x9e9ac8, 0x807dba, 0x6a51a3, 0x54278f,
				0x3f007d,
			],
		],
	),
	NamedPalette::classed(
		"RdPu",
		&[
			&[0xfde0dd, 0xfa9fb5, 0xc51b8a],
			&[0xfeebe2, 0xfbb4b9, 0xf768a1, 0xae017e],
			&[0xfeebe2, 0xfbb4b9, 0xf768a1, 0xc51b8a, 0x7a0177],
			&[0xfeebe2, 0xfcc5c0, 0xfa9fb5, 0xf768a1, 0xc51b8a, 0x7a0177],
			&[0xfeebe2, 0xfcc5c0, 0xfa9fb5, 0xf768a1, 0xdd3497, 0xae017e, 0x7a0177],
			&[0xfff7f3, 0xfde0dd, 0xfcc5c0, 0xfa9fb5, 0xf768a1, 0xdd3497, 0xae017e, 0x7a0177],
			&[
				0xfff7f3, 0xfde0dd, 0xfcc5c0, 0xfa9fb5, 0xf768a1, 0xdd3497, 0xae017e, 0x7a0177,
				0x49006a,
			],
		],
	),
	NamedPalette::classed(
		"Reds",
		&[
			&[0xfee0d2, 0xfc9272, 0xde2d26],
			&[0xfee5d9, 0xfcae91, 0xfb6a4a, 0xcb181d],
			&[0xfee5d9, 0xfcae91, 0xfb6a4a, 0xde2d26, 0xa50f15],
			&[0xfee5d9, 0xfcbba1, 0xfc9272, 0xfb6a4a, 0xde2d26, 0xa50f15],
			&[0xfee5d9, 0xfcbba1, 0xfc9272, 0xfb6a4a, 0xef3b2c, 0xcb181d, 0x99000d],
			&[0xfff5f0, 0xfee0d2, 0xfcbba1, 0xfc9272, 0xfb6a4a, 0xef3b2c, 0xcb181d, 0x99000d],
			&[
				0xfff5f0, 0xfee0d2, 0xfcbba1, 0xfc9272, 0xfb6a4a, 0xef3b2c, 0xcb181d, 0xa50f15,
				0x67000d,
			],
		],
	),
	NamedPalette::classed(
		"YlGn",
		&[
			&[0xf7fcb9, 0xaddd8e, 0x31a354],
			&[0xffffcc, 0xc2e699, 0x78c679, 0x238443],
			&[0xffffcc, 0xc2e699, 0x78c679, 0x31a354, 0x006837],
			&[0xffffcc, 0xd9f0a3, 0xaddd8e, 0x78c679, 0x31a354, 0x006837],
			&[0xffffcc, 0xd9f0a3, 0xaddd8e, 0x78c679, 0x41ab5d, 0x238443, 0x005a32],
			&[0xffffe5, 0xf7fcb9, 0xd9f0a3, 0xaddd8e, 0x78c679, 0x41ab5d, 0x238443, 0x005a32],
			&[
				0xffffe5, 0xf7fcb9, 0xd9f0a3, 0xaddd8e, 0x78c679, 0x41ab5d, 0x238443, 0x006837,
				0x004529,
			],
		],
	),
	NamedPalette::classed(
		"YlGnBu",
		&[
			&[0xedf8b1, 0x7fcdbb, 0x2c7fb8],
			&[0xffffcc, 0xa1dab4, 0x41b6c4, 0x225ea8],
			&[0xffffcc, 0xa1dab4, 0x41b6c4, 0x2c7fb8, 0x253494],
			&[0xffffcc, 0xc7e9b4, 0x7fcdbb, 0x41b6c4, 0x2c7fb8, 0x253494],
			&[0xffffcc, 0xc7e9b4, 0x7fcdbb, 0x41b6c4, 0x1d91c0, 0x225ea8, 0x0c2c84],
			&[0xffffd9, 0xedf8b1, 0xc7e9b4, 0x7fcdbb, 0x41b6c4, 0x1d91c0, 0x225ea8, 0x0c2c84],
			&[
				0xffffd9, 0xedf8b1, 0xc7e9b4, 0x7fcdbb, 0x41b6c4, 0x1d91c0, 0x225ea8, 0x253494,
				0x081d58,
			],
		],
	),
	NamedPalette::classed(
		"YlOrBr",
		&[
			&[0xfff7bc, 0xfec44f, 0xd95f0e],
			&[0xffffd4, 0xfed98e, 0xfe9929, 0xcc4c02],
			&[0xffffd4, 0xfed98e, 0xfe9929, 0xd95f0e, 0x993404],
			&[0xffffd4, 0xfee391, 0xfec44f, 0xfe9929, 0xd95f0e, 0x993404],
			&[0xffffd4, 0xfee391, 0xfec44f, 0xfe9929, 0xec7014, 0xcc4c02, 0x8c2d04],
			&[0xffffe5, 0xfff7bc, 0xfee391, 0xfec44f, 0xfe9929, 0xec7014, 0xcc4c02, 0x8c2d04],
			&[
				0xffffe5, 0xfff7bc, 0xfee391, 0xfec44f, 0xfe9929, 0xec7014, 0xcc4c02, 0x993404,
				0x662506,
			],
		],
	),
	NamedPalette::classed(
		"YlOrRd",
		&[
			&[0xffeda0, 0xfeb24c, 0xf03b20],
			&[0xffffb2, 0xfecc5c, 0xfd8d3c, 0xe31a1c],
			&[0xffffb2, 0xfecc5c, 0xfd8d3c, 0xf03b20, 0xbd0026],
			&[0xffffb2, 0xfed976, 0xfeb24c, 0xfd8d3c, 0xf03b20, 0xbd0026],
			&[0xffffb2, 0xfed976, 0xfeb24c, 0xfd8d3c, 0xfc4e2a, 0xe31a1c, 0xb10026],
			&[0xffffcc, 0xffeda0, 0xfed976, 0xfeb24c, 0xfd8d3c, 0xfc4e2a, 0xe31a1c, 0xb10026],
			&[
				0xffffcc, 0xffeda0, 0xfed976, 0xfeb24c, 0xfd8d3c, 0xfc4e2a, 0xe31a1c, 0xbd0026,
				0x800026,
			],
		],
	),
];

// The last two are plain three-stop ramps with no published class sets.
pub(super) static BREWER_DIVERGING: &[NamedPalette] = &[
	NamedPalette::classed(
		"BrBG",
		&[
			&[0xd8b365, 0xf5f5f5, 0x5ab4ac],
			&[0xa6611a, 0xdfc27d, 0x80cdc1, 0x018571],
			&[0xa6611a, 0xdfc27d, 0xf5f5f5, 0x80cdc1, 0x018571],
			&[0x8c510a, 0xd8b365, 0xf6e8c3, 0xc7eae5, 0x5ab4ac, 0x01665e],
			&[0x8c510a, 0xd8b365, 0xf6e8c3, 0xf5f5f5, 0xc7eae5, 0x5ab4ac, 0x01665e],
			&[0x8c510a, 0xbf812d, 0xdfc27d, 0xf6e8c3, 0xc7eae5, 0x80cdc1, 0x35978f, 0x01665e],
			&[
				0x8c510a, 0xbf812d, 0xdfc27d, 0xf6e8c3, 0xf5f5f5, 0xc7eae5, 0x80cdc1, 0x35978f,
				0x01665e,
			],
			&[
				0x543005, 0x8c510a, 0xbf812d, 0xdfc27d, 0xf6e8c3, 0xc7eae5, 0x80cdc1, 0x35978f,
				0x01665e, 0x003c30,
			],
			&[
				0x543005, 0x8c510a, 0xbf812d, 0xdfc27d, 0xf6e8c3, 0xf5f5f5, 0xc7eae5, 0x80cdc1,
				0x35978f, 0x01665e, 0x003c30,
			],
		],
	),
	NamedPalette::classed(
		"PiYG",
		&[
			&[0xe9a3c9, 0xf7f7f7, 0xa1d76a],
			&[0xd01c8b, 0xf1b6da, 0xb8e186, 0x4dac26],
			&[0xd01c8b, 0xf1b6da, 0xf7f7f7, 0xb8e186, 0x4dac26],
			&[0xc51b7d, 0xe9a3c9, 0xfde0ef, 0xe6f5d0, 0xa1d76a, 0x4d9221],
			&[0xc51b7d, 0xe9a3c9, 0xfde0ef, 0xf7f7f7, 0xe6f5d0, 0xa1d76a, 0x4d9221],
			&[0xc51b7d, 0xde77ae, 0xf1b6da, 0xfde0ef, 0xe6f5d0, 0xb8e186, 0x7fbc41, 0x4d9221],
			&[
				0xc51b7d, 0xde77ae, 0xf1b6da, 0xfde0ef, 0xf7f7f7, 0xe6f5d0, 0xb8e186, 0x7fbc41,
				0x4d9221,
			],
			&[
				0x8e0152, 0xc51b7d, 0xde77ae, 0xf1b6da, 0xfde0ef, 0xe6f5d0, 0xb8e186, 0x7fbc41,
				0x4d9221, 0x276419,
			],
			&[
				0x8e0152, 0xc51b7d, 0xde77ae, 0xf1b6da, 0xfde0ef, 0xf7f7f7, 0xe6f5d0, 0xb8e186,
				0x7fbc41, 0x4d9221, 0x276419,
			],
		],
	),
	NamedPalette::classed(
		"PRGn",
		&[
			&[0xaf8dc3, 0xf7f7f7, 0x7fbf7b],
			&[0x7b3294, 0xc2a5cf, 0xa6dba0, 0x008837],
			&[0x7b3294, 0xc2a5cf, 0xf7f7f7, 0xa6dba0, 0x008837],
			&[0x762a83, 0xaf8dc3, 0xe7d4e8, 0xd9f0d3, 0x7fbf7b, 0x1b7837],
			&[0x762a83, 0xaf8dc3, 0xe7d4e8, 0xf7f7f7, 0xd9f0d3, 0x7fbf7b, 0x1b7837],
			&[0x762a83, 0x9970ab, 0xc2a5cf, 0xe7d4e8, 0xd9f0d3, 0xa6dba0, 0x5aae61, 0x1b7837],
			&[
				0x762a83, 0x9970ab, 0xc2a5cf, 0xe7d4e8, 0xf7f7f7, 0xd9f0d3, 0xa6dba0, 0x5aae61,
				0x1b7837,
			],
			&[
				0x40004b, 0x762a83, 0x9970ab, 0xc2a5cf, 0xe7d4e8, 0xd9f0d3, 0xa6dba0, 0x5aae61,
				0x1b7837, 0x00441b,
			],
			&[
				0x40004b, 0x762a83, 0x9970ab, 0xc2a5cf, 0xe7d4e8, 0xf7f7f7, 0xd9f0d3, 0xa6dba0,
				0x5aae61, 0x1b7837, 0x00441b,
			],
		],
	),
	NamedPalette::classed(
		"PuOr",
		&[
			&[0xf1a340, 0xf7f7f7, 0x998ec3],
			&[0xe66101, 0xfdb863, 0xb2abd2, 0x5e3c99],
			&[0xe66101, 0xfdb863, 0xf7f7f7, 0xb2abd2, 0x5e3c99],
			&[0xb35806, 0xf1a340, 0xfee0b6, 0xd8daeb, 0x998ec3, 0x542788],
			&[0xb35806, 0xf1a340, 0xfee0b6, 0xf7f7f7, 0xd8daeb, 0x998ec3, 0x542788],
			&[0xb35806, 0xe08214, 0xfdb863, 0xfee0b6, 0xd8daeb, 0xb2abd2, 0x8073ac, 0x542788],
			&[
				0xb35806, 0xe08214, 0xfdb863, 0xfee0b6, 0xf7f7f7, 0xd8daeb, 0xb2abd2, 0x8073ac,
				0x542788,
			],
			&[
				0x7f3b08, 0xb35806, 0xe08214, 0xfdb863, 0xfee0b6, 0xd8daeb, 0xb2abd2, 0x8073ac,
				0x542788, 0x2d004b,
			],
			&[
				0x7f3b08, 0xb35806, 0xe08214, 0xfdb863, 0xfee0b6, 0xf7f7f7, 0xd8daeb, 0xb2abd2,
				0x8073ac, 0x542788, 0x2d004b,
			],
		],
	),
	NamedPalette::classed(
		"RdBu",
		&[
			&[0xef8a62, 0xf7f7f7, 0x67a9cf],
			&[0xca0020, 0xf4a582, 0x92c5de, 0x0571b0],
			&[0xca0020, 0xf4a582, 0xf7f7f7, 0x92c5de, 0x0571b0],
			&[0xb2182b, 0xef8a62, 0xfddbc7, 0xd1e5f0, 0x67a9cf, 0x2166ac],
			&[0xb2182b, 0xef8a62, 0xfddbc7, 0xf7f7f7, 0xd1e5f0, 0x67a9cf, 0x2166ac],
			&[0xb2182b, 0xd6604d, 0xf4a582, 0xfddbc7, 0xd1e5f0, 0x92c5de, 0x4393c3, 0x2166ac],
			&[
				0xb2182b, 0xd6604d, 0xf4a582, 0xfddbc7, 0xf7f7f7, 0xd1e5f0, 0x92c5de, 0x4393c3,
				0x2166ac,
			],
			&[
				0x67001f, 0xb2182b, 0xd6604d, 0xf4a582, 0xfddbc7, 0xd1e5f0, 0x92c5de, 0x4393c3,
				0x2166ac, 0x053061,
			],
			&[
				0x67001f, 0xb2182b, 0xd6604d, 0xf4a582, 0xfddbc7, 0xf7f7f7, 0xd1e5f0, 0x92c5de,
				0x4393c3, 0x2166ac, 0x053061,
			],
		],
	),
	NamedPalette::classed(
		"RdGy",
		&[
			&[0xef8a62, 0xffffff, 0x999999],
			&[0xca0020, 0xf4a582, 0xbababa, 0x404040],
			&[0xca0020, 0xf4a582, 0xffffff, 0xbababa, 0x404040],
			&[0xb2182b, 0xef8a62, 0xfddbc7, 0xe0e0e0, 0x999999, 0x4d4d4d],
			&[0xb2182b, 0xef8a62, 0xfddbc7, 0xffffff, 0xe0e0e0, 0x999999, 0x4d4d4d],
			&[0xb2182b, 0xd6604d, 0xf4a582, 0xfddbc7, 0xe0e0e0, 0xbababa, 0x878787, 0x4d4d4d],
			&[
				0xb2182b, 0xd6604d, 0xf4a582, 0xfddbc7, 0xffffff, 0xe0e0e0, 0xbababa, 0x878787,
				0x4d4d4d,
			],
			&[
				0x67001f, 0xb2182b, 0xd6604d, 0xf4a582, 0xfddbc7, 0xe0e0e0, 0xbababa, 0x878787,
				0x4d4d4d, 0x1a1a1a,
			],
			&[
				0x67001f, 0xb2182b, 0xd6604d, 0xf4a582, 0xfddbc7, 0xffffff, 0xe0e0e0, 0xbababa,
				0x878787, 0x4d4d4d, 0x1a1a1a,
			],
		],
	),
	NamedPalette::classed(
		"RdYlBu",
		&[
			&[0xfc8d59, 0xffffbf, 0x91bfdb],
			&[0xd7191c, 0xfdae61, 0xabd9e9, 0x2c7bb6],
			&[0xd7191c, 0xfdae61, 0xffffbf, 0xabd9e9, 0x2c7bb6],
			&[0xd73027, 0xfc8d59, 0xfee090, 0xe0f3f8, 0x91bfdb, 0x4575b4],
			&[0xd73027, 0xfc8d59, 0xfee090, 0xffffbf, 0xe0f3f8, 0x91bfdb, 0x4575b4],
			&[0xd73027, 0xf46d43, 0xfdae61, 0xfee090, 0xe0f3f8, 0xabd9e9, 0x74add1, 0x4575b4],
			&[
				0xd73027, 0xf46d43, 0xfdae61, 0xfee090, 0xffffbf, 0xe0f3f8, 0xabd9e9, 0x74add1,
				0x4575b4,
			],
			&[
				0xa50026, 0xd73027, 0xf46d43, 0xfdae61, 0xfee090, 0xe0f3f8, 0xabd9e9, 0x74add1,
				0x4575b4, 0x313695,
			],
			&[
				0xa50026, 0xd73027, 0xf46d43, 0xfdae61, 0xfee090, 0xffffbf, 0xe0f3f8, 0xabd9e9,
				0x74add1, 0x4575b4, 0x313695,
			],
		],
	),
	NamedPalette::classed(
		"RdYlGn",
		&[
			&[0xfc8d59, 0xffffbf, 0x91cf60],
			&[0xd7191c, 0xfdae61, 0xa6d96a, 0x1a9641],
			&[0xd7191c, 0xfdae61, 0xffffbf, 0xa6d96a, 0x1a9641],
			&[0xd73027, 0xfc8d59, 0xfee08b, 0xd9ef8b, 0x91cf60, 0x1a9850],
			&[0xd73027, 0xfc8d59, 0xfee08b, 0xffffbf, 0xd9ef8b, 0x91cf60, 0x1a9850],
			&[0xd73027, 0xf46d43, 0xfdae61, 0xfee08b, 0xd9ef8b, 0xa6d96a, 0x66bd63, 0x1a9850],
			&[
				0xd73027, 0xf46d43, 0xfdae61, 0xfee08b, 0xffffbf, 0xd9ef8b, 0xa6d96a, 0x66bd63,
				0x1a9850,
			],
			&[
				0xa50026, 0xd73027, 0xf46d43, 0xfdae61, 0xfee08b, 0xd9ef8b, 0xa6d96a, 0x66bd63,
				0x1a9850, 0x006837,
			],
			&[
				0xa50026, 0xd73027, 0xf46d43, 0xfdae61, 0xfee08b, 0xffffbf, 0xd9ef8b, 0xa6d96a,
				0x66bd63, 0x1a9850, 0x006837,
			],
		],
	),
	NamedPalette::classed(
		"Spectral",
		&[
			&[0xfc8d59, 0xffffbf, 0x99d594],
			&[0xd7191c, 0xfdae61, 0xabdda4, 0x2b83ba],
			&[0xd7191c, 0xfdae61, 0xffffbf, 0xabdda4, 0x2b83ba],
			&[0xd53e4f, 0xfc8d59, 0xfee08b, 0xe6f598, 0x99d594, 0x3288bd],
			&[0xd53e4f, 0xfc8d59, 0xfee08b, 0xffffbf, 0xe6f598, 0x99d594, 0x3288bd],
			&[0xd53e4f, 0xf46d43, 0xfdae61, 0xfee08b, 0xe6f598, 0xabdda4, 0x66c2a5, 0x3288bd],
			&[
				0xd53e4f, 0xf46d43, 0xfdae61, 0xfee08b, 0xffffbf, 0xe6f598, 0xabdda4, 0x66c2a5,
				0x3288bd,
			],
			&[
				0x9e0142, 0xd53e4f, 0xf46d43, 0xfdae61, 0xfee08b, 0xe6f598, 0xabdda4, 0x66c2a5,
				0x3288bd, 0x5e4fa2,
			],
			&[
				0x9e0142, 0xd53e4f, 0xf46d43, 0xfdae61, 0xfee08b, 0xffffbf, 0xe6f598, 0xabdda4,
				0x66c2a5, 0x3288bd, 0x5e4fa2,
			],
		],
	),
	NamedPalette::new("BuRd", &[0x0000ff, 0xffffff, 0xff0000]),
	NamedPalette::new("CyanMagenta", &[0x00ffff, 0xffffff, 0xff00ff]),
];

pub(super) static BREWER_QUALITATIVE: &[NamedPalette] = &[
	NamedPalette::new("Accent", ACCENT),
	NamedPalette::new("Dark2", DARK2),
	NamedPalette::new("Paired", PAIRED),
	NamedPalette::new("Pastel1", PASTEL1),
	NamedPalette::new("Pastel2", PASTEL2),
	NamedPalette::new("Set1", SET1),
	NamedPalette::new("Set2", SET2),
	NamedPalette::new("Set3", SET3),
];

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tables_are_well_formed() {
		for table in [
			BUILTIN_SEQUENTIAL,
			BUILTIN_DIVERGING,
			BUILTIN_QUALITATIVE,
			BREWER_SEQUENTIAL,
			BREWER_DIVERGING,
			BREWER_QUALITATIVE,
		] {
			for palette in table {
				assert!(palette.len() >= 3, "{} is too short", palette.name);
				assert!(palette.hex.iter().all(|&h| h <= 0xffffff), "{}", palette.name);
			}
		}
	}

	#[test]
	fn class_sets_cover_every_count() {
		for (table, largest) in [(BREWER_SEQUENTIAL, 9), (BREWER_DIVERGING, 11)] {
			for palette in table.iter().filter(|p| !p.classes.is_empty()) {
				for (i, set) in palette.classes.iter().enumerate() {
					assert_eq!(set.len(), i + 3, "{}", palette.name);
				}
				assert_eq!(palette.len(), largest, "{}", palette.name);
				assert!(palette.class(2).is_none());
				assert!(palette.class(largest + 1).is_none());
			}
		}
	}

	#[test]
	fn diverging_table_keeps_ramps_last() {
		assert_eq!(BREWER_DIVERGING.len(), 11);
		assert_eq!(BREWER_DIVERGING[10].name, "CyanMagenta");
		assert!(BREWER_DIVERGING[10].class(5).is_none());
		assert_eq!(BREWER_SEQUENTIAL[17].name, "YlOrRd");
	}
}

//! Glyph catalog
//!
//! Hand-drawn 10x8 pixel patterns. Each byte is one vertical column slice,
//! least significant bit at the top, matching the OLED's page layout.

/// Width of every glyph in columns
pub const GLYPH_WIDTH: usize = 10;

/// One glyph: `GLYPH_WIDTH` column slices
pub type Glyph = [u8; GLYPH_WIDTH];

/// Glyph identifiers
///
/// Discriminants index into the catalog table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum GlyphId {
    CornerTopLeft = 0,
    CornerBottomLeft = 1,
    CornerTopRight = 2,
    CornerBottomRight = 3,
    /// Outer frame of a port seen on the bus
    FrameSolid = 4,
    /// Outer frame of a port whose expander was not found
    FrameDashed = 5,
    LogoTopLeft = 6,
    LogoTopRight = 7,
    LogoBottomLeft = 8,
    LogoBottomRight = 9,
}

static CATALOG: [Glyph; 10] = [
    [0xff, 0x8f, 0x8f, 0x8f, 0x8f, 0x81, 0x81, 0x81, 0x81, 0xff],
    [0xff, 0xf1, 0xf1, 0xf1, 0xf1, 0x81, 0x81, 0x81, 0x81, 0xff],
    [0xff, 0x81, 0x81, 0x81, 0x81, 0x8f, 0x8f, 0x8f, 0x8f, 0xff],
    [0xff, 0x81, 0x81, 0x81, 0x81, 0xf1, 0xf1, 0xf1, 0xf1, 0xff],
    [0xff, 0x81, 0x81, 0x81, 0x81, 0x81, 0x81, 0x81, 0x81, 0xff],
    [0xdb, 0x81, 0x00, 0x00, 0x81, 0x81, 0x00, 0x00, 0x81, 0xdb],
    [0xc0, 0x70, 0x1c, 0x04, 0x46, 0xe2, 0x73, 0x79, 0x00, 0x00],
    [0x71, 0xe3, 0x52, 0x06, 0x04, 0x1c, 0xf0, 0x00, 0x00, 0x00],
    [0x03, 0x0e, 0x38, 0x20, 0x67, 0x45, 0xc4, 0x80, 0x00, 0x00],
    [0x87, 0xcd, 0x48, 0x6c, 0x24, 0x07, 0x01, 0x00, 0x00, 0x00],
];

/// Look up a glyph
pub fn glyph(id: GlyphId) -> &'static Glyph {
    &CATALOG[id as usize]
}

/// Pin positions within a port's 2x2 indicator
///
/// Bit order follows the expander nibble: bit 0 top-left, bit 1
/// bottom-left, bit 2 top-right, bit 3 bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Corner {
    TopLeft,
    BottomLeft,
    TopRight,
    BottomRight,
}

impl Corner {
    /// All corners in nibble bit order
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::BottomLeft,
        Corner::TopRight,
        Corner::BottomRight,
    ];

    /// Bit within the port nibble
    pub const fn mask(self) -> u8 {
        match self {
            Corner::TopLeft => 0x01,
            Corner::BottomLeft => 0x02,
            Corner::TopRight => 0x04,
            Corner::BottomRight => 0x08,
        }
    }

    /// Fill glyph for this corner
    pub const fn glyph_id(self) -> GlyphId {
        match self {
            Corner::TopLeft => GlyphId::CornerTopLeft,
            Corner::BottomLeft => GlyphId::CornerBottomLeft,
            Corner::TopRight => GlyphId::CornerTopRight,
            Corner::BottomRight => GlyphId::CornerBottomRight,
        }
    }
}

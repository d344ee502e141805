//! Bitmap compositing
//!
//! Port indicators are built by stacking corner-fill glyphs onto a frame
//! instead of storing every frame/corner combination.

use crate::glyph::{glyph, Glyph, GlyphId, GLYPH_WIDTH};
use crate::layout::Cell;
use crate::traits::{DisplayDriver, DisplayError};

/// Working buffer for one glyph-sized image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMap {
    columns: Glyph,
}

impl Default for BitMap {
    fn default() -> Self {
        Self::new()
    }
}

impl BitMap {
    /// Create a blank bitmap
    pub const fn new() -> Self {
        Self {
            columns: [0; GLYPH_WIDTH],
        }
    }

    /// Replace the buffer with a glyph
    pub fn load(&mut self, id: GlyphId) {
        self.columns = *glyph(id);
    }

    /// OR a glyph into the buffer
    pub fn overlay(&mut self, id: GlyphId) {
        for (dst, src) in self.columns.iter_mut().zip(glyph(id).iter()) {
            *dst |= *src;
        }
    }

    /// Current buffer contents
    pub fn columns(&self) -> &Glyph {
        &self.columns
    }

    /// Write the buffer to the display at `cell`
    pub fn blit<D: DisplayDriver>(&self, display: &mut D, cell: Cell) -> Result<(), DisplayError> {
        display.set_cursor(cell.col, cell.row)?;
        display.write_ram(&self.columns)
    }
}

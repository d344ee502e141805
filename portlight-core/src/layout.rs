//! Screen layout
//!
//! The 128x64 panel is organised as 8 pages of 8 pixels:
//!
//! ```text
//! page 0-1  logo | title, version
//! page 2         | IP address
//! page 3         | MAC address
//! page 4-5  port indicators (12 cells, gap after every 4th)
//! page 7    last event (inverse video)
//! ```
//!
//! Ports are drawn as a horizontal strip of pairs. Even and odd ports of a
//! pair share a column and stack vertically:
//!
//! ```text
//!   | 0 | 2 | 4 | 6 |  | 8 | 10| ...
//!   | 1 | 3 | 5 | 7 |  | 9 | 11| ...
//! ```

use crate::glyph::GLYPH_WIDTH;

/// Display width in pixel columns
pub const DISPLAY_WIDTH: u8 = 128;

/// Number of 8-pixel pages
pub const DISPLAY_PAGES: u8 = 8;

/// Extra columns between groups of 8 ports (two expander banks)
pub const GROUP_GAP: u8 = 4;

/// First page of the port strip
pub const PORT_ROW: u8 = 4;

/// Number of outline cells drawn for the port strip
pub const OUTLINE_CELLS: u8 = 12;

/// Page of the event line
pub const EVENT_ROW: u8 = 7;

/// Column where header text starts (right of the logo)
pub const HEADER_COL: u8 = 25;

/// Page of the IP address text
pub const IP_ROW: u8 = 2;

/// Page of the MAC address text
pub const MAC_ROW: u8 = 3;

/// A glyph-sized position on the display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cell {
    /// Pixel column of the glyph's left edge
    pub col: u8,
    /// Page
    pub row: u8,
}

/// Compute the cell for a port's animated indicator
///
/// Returns `None` when the indicator would not fit on the display.
pub fn port_cell(port: u8) -> Option<Cell> {
    let port = usize::from(port);
    let col = (port / 2) * GLYPH_WIDTH + (port / 8) * usize::from(GROUP_GAP);
    let row = usize::from(PORT_ROW) + (port & 0x01);
    cell_if_visible(col, row)
}

/// Compute the top cell of a static outline position
///
/// Each outline occupies `PORT_ROW` and the page below it.
pub fn outline_cell(index: u8) -> Option<Cell> {
    let index = usize::from(index);
    let col = index * GLYPH_WIDTH + (index / 4) * usize::from(GROUP_GAP);
    cell_if_visible(col, usize::from(PORT_ROW))
}

fn cell_if_visible(col: usize, row: usize) -> Option<Cell> {
    if col + GLYPH_WIDTH > usize::from(DISPLAY_WIDTH) || row >= usize::from(DISPLAY_PAGES) {
        return None;
    }
    Some(Cell {
        col: col as u8,
        row: row as u8,
    })
}

//! Display driver trait for character-mode monochrome OLEDs

/// Errors that can occur with display communication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Bus transfer failed (NACK, arbitration, timeout)
    Bus,
    /// Cursor outside the visible area
    InvalidCoordinates,
    /// Reset line could not be driven
    ResetPin,
}

/// Trait for OLED display access
///
/// Coordinates are pixel columns and 8-pixel pages. Writes happen at the
/// cursor and advance it; nothing is buffered on the host side, so every
/// call is visible on the glass once it returns.
pub trait DisplayDriver {
    /// Check whether the display answers on its bus address
    fn probe(&mut self) -> bool;

    /// Send the power-on initialization sequence
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Blank the whole display and home the cursor
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Move the cursor
    ///
    /// - `col`: Pixel column (0-127)
    /// - `row`: Page (0-7)
    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), DisplayError>;

    /// Print text at the cursor using the built-in 5x7 font
    ///
    /// `'\n'` moves the cursor to column 0 of the next page.
    fn print(&mut self, text: &str) -> Result<(), DisplayError>;

    /// Write raw column bytes at the cursor
    fn write_ram(&mut self, data: &[u8]) -> Result<(), DisplayError>;

    /// Set display contrast (0-255)
    fn set_contrast(&mut self, level: u8) -> Result<(), DisplayError>;

    /// Turn the panel on or off (RAM is retained)
    fn set_power(&mut self, on: bool) -> Result<(), DisplayError>;

    /// Invert subsequently written pixels
    fn set_invert(&mut self, inverted: bool) -> Result<(), DisplayError>;

    /// Blank from the cursor to the right edge of the current page
    fn clear_to_eol(&mut self) -> Result<(), DisplayError>;
}

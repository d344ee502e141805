//! Port status panel
//!
//! Ties change detection, compositing and the two timeouts to a display.
//!
//! The panel is driven entirely by its caller: feed samples with
//! [`Panel::observe`], post events with [`Panel::show_event`], and call
//! [`Panel::tick`] from the main loop so the timeouts are enforced.
//! Timestamps are a free-running millisecond counter.
//!
//! If the display is not found by [`Panel::begin`], every operation is a
//! no-op, so callers never have to guard on display presence.

use core::fmt::Write;

use heapless::String;

use crate::bitmap::BitMap;
use crate::config::{DimLevel, PanelConfig, Timeouts};
use crate::detector::ChangeDetector;
use crate::glyph::{Corner, GlyphId};
use crate::layout::{self, Cell, EVENT_ROW, HEADER_COL, IP_ROW, MAC_ROW, OUTLINE_CELLS};
use crate::timeout::Timeout;
use crate::traits::{DisplayDriver, DisplayError};

/// Logo quadrants and where they go
const LOGO: [(GlyphId, Cell); 4] = [
    (GlyphId::LogoTopLeft, Cell { col: 0, row: 0 }),
    (GlyphId::LogoTopRight, Cell { col: 8, row: 0 }),
    (GlyphId::LogoBottomLeft, Cell { col: 0, row: 1 }),
    (GlyphId::LogoBottomRight, Cell { col: 8, row: 1 }),
];

/// Port status panel
pub struct Panel<D> {
    display: D,
    /// Set by `begin` when the display answered
    present: bool,
    contrast_on: u8,
    dim: DimLevel,
    bitmap: BitMap,
    detector: ChangeDetector,
    /// Dims the panel after the last port change
    display_timeout: Timeout,
    /// Clears the event line
    event_timeout: Timeout,
}

impl<D: DisplayDriver> Panel<D> {
    /// Create a panel; nothing is sent to the display until `begin`
    pub fn new(display: D, config: &PanelConfig) -> Self {
        Self {
            display,
            present: false,
            contrast_on: config.contrast_on,
            dim: config.dim,
            bitmap: BitMap::new(),
            detector: ChangeDetector::new(),
            display_timeout: Timeout::disabled(),
            event_timeout: Timeout::disabled(),
        }
    }

    /// Probe and initialize the display
    ///
    /// Returns whether the display was found.
    pub fn begin(&mut self, timeouts: Timeouts) -> Result<bool, DisplayError> {
        self.present = self.display.probe();
        if !self.present {
            return Ok(false);
        }

        self.display_timeout.set_duration(timeouts.display_on_ms);
        self.event_timeout.set_duration(timeouts.event_on_ms);

        self.display.init()?;
        self.display.clear()?;
        self.display.print("Initialising...\n")?;
        Ok(true)
    }

    /// Check if the display was found
    pub fn is_present(&self) -> bool {
        self.present
    }

    /// Get access to the underlying display
    pub fn display(&self) -> &D {
        &self.display
    }

    /// Get mutable access to the underlying display
    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    /// Record a bank's current sample as baseline without drawing
    pub fn prime(&mut self, bank: usize, sample: u16) {
        if !self.present {
            return;
        }
        self.detector.observe(bank, sample);
    }

    /// Process a new sample for one bank
    ///
    /// Every changed port is redrawn, the panel is brought to full
    /// brightness and the display timeout restarts. Returns the mask of
    /// changed pins.
    ///
    /// A failed write does not stop the remaining ports from being drawn;
    /// the first error is returned once all of them were attempted.
    pub fn observe(&mut self, bank: usize, sample: u16, now_ms: u32) -> Result<u16, DisplayError> {
        if !self.present {
            return Ok(0);
        }

        let changes = self.detector.observe(bank, sample);
        let mut result = Ok(());
        for change in changes.ports() {
            self.display_timeout.start(now_ms);
            result = result
                .and(self.display.set_power(true))
                .and(self.display.set_contrast(self.contrast_on))
                .and(self.animate(change.port, change.lit));
        }

        result.map(|()| changes.mask())
    }

    /// Draw one port indicator
    ///
    /// `lit` is active-high: bit 0 top-left, bit 1 bottom-left,
    /// bit 2 top-right, bit 3 bottom-right.
    pub fn animate(&mut self, port: u8, lit: u8) -> Result<(), DisplayError> {
        if !self.present {
            return Ok(());
        }

        self.bitmap.load(GlyphId::FrameSolid);
        for corner in Corner::ALL {
            if lit & corner.mask() != 0 {
                self.bitmap.overlay(corner.glyph_id());
            }
        }

        match layout::port_cell(port) {
            Some(cell) => self.bitmap.blit(&mut self.display, cell),
            // Banks past the right edge are tracked but not drawn
            None => Ok(()),
        }
    }

    /// Show text on the event line and restart the event timeout
    pub fn show_event(&mut self, text: &str, now_ms: u32) -> Result<(), DisplayError> {
        if !self.present {
            return Ok(());
        }

        self.event_timeout.start(now_ms);
        self.display.set_cursor(0, EVENT_ROW)?;
        self.display.set_invert(true)?;
        let printed = self.display.print(text);
        self.display.set_invert(false)?;
        printed
    }

    /// Enforce the timeouts
    ///
    /// Should be called every loop iteration.
    pub fn tick(&mut self, now_ms: u32) -> Result<(), DisplayError> {
        if !self.present {
            return Ok(());
        }

        if self.event_timeout.poll_expired(now_ms) {
            self.display.set_cursor(0, EVENT_ROW)?;
            self.display.clear_to_eol()?;
        }

        if self.display_timeout.poll_expired(now_ms) {
            match self.dim {
                DimLevel::Off => self.display.set_power(false)?,
                DimLevel::Contrast(level) => self.display.set_contrast(level)?,
            }
        }

        Ok(())
    }

    /// Clear the screen and draw the logo with title and firmware version
    pub fn draw_logo(&mut self, title: &str, version: &str) -> Result<(), DisplayError> {
        if !self.present {
            return Ok(());
        }

        self.display.clear()?;
        for (id, cell) in LOGO {
            self.bitmap.load(id);
            self.bitmap.blit(&mut self.display, cell)?;
        }

        self.display.set_cursor(HEADER_COL, 0)?;
        self.display.print(title)?;
        self.display.set_cursor(HEADER_COL, 1)?;
        self.display.print("v")?;
        self.display.print(version)?;
        self.display.set_cursor(0, EVENT_ROW)
    }

    /// Draw the outline of every port cell
    ///
    /// Bit `n` of `banks_found` marks expander bank `n` as present; its
    /// cells get a solid frame, the others a dashed one.
    pub fn draw_ports(&mut self, banks_found: u8) -> Result<(), DisplayError> {
        if !self.present {
            return Ok(());
        }

        for index in 0..OUTLINE_CELLS {
            let Some(cell) = layout::outline_cell(index) else {
                continue;
            };
            let id = if banks_found & (1 << (index >> 1)) != 0 {
                GlyphId::FrameSolid
            } else {
                GlyphId::FrameDashed
            };

            self.bitmap.load(id);
            self.bitmap.blit(&mut self.display, cell)?;
            self.bitmap.blit(
                &mut self.display,
                Cell {
                    row: cell.row + 1,
                    ..cell
                },
            )?;
        }

        Ok(())
    }

    /// Show an IPv4 address in the header
    pub fn show_ip(&mut self, ip: [u8; 4]) -> Result<(), DisplayError> {
        if !self.present {
            return Ok(());
        }

        let mut text: String<16> = String::new();
        let _ = write!(text, "{}.{}.{}.{}", ip[0], ip[1], ip[2], ip[3]);

        self.display.set_cursor(HEADER_COL, IP_ROW)?;
        self.display.print(&text)
    }

    /// Show a MAC address in the header
    pub fn show_mac(&mut self, mac: [u8; 6]) -> Result<(), DisplayError> {
        if !self.present {
            return Ok(());
        }

        let mut text: String<18> = String::new();
        let _ = write!(
            text,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]
        );

        self.display.set_cursor(HEADER_COL, MAC_ROW)?;
        self.display.print(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::{glyph, GLYPH_WIDTH};
    use crate::mock::MockDisplay;

    const TIMEOUTS: Timeouts = Timeouts {
        display_on_ms: 1000,
        event_on_ms: 500,
    };

    fn started_panel() -> Panel<MockDisplay> {
        let mut panel = Panel::new(MockDisplay::new(), &PanelConfig::default());
        assert!(panel.begin(TIMEOUTS).unwrap());
        panel.display_mut().reset_log();
        panel
    }

    #[test]
    fn test_begin_initializes_display() {
        let mut panel = Panel::new(MockDisplay::new(), &PanelConfig::default());
        assert!(panel.begin(TIMEOUTS).unwrap());

        assert!(panel.is_present());
        assert!(panel.display().initialized);
        assert_eq!(panel.display().clear_count, 1);
        assert_eq!(panel.display().prints[0].text.as_str(), "Initialising...\n");
    }

    #[test]
    fn test_absent_display_makes_everything_noop() {
        let mut panel = Panel::new(MockDisplay::absent(), &PanelConfig::default());
        assert!(!panel.begin(TIMEOUTS).unwrap());

        assert_eq!(panel.observe(0, 0x1234, 0), Ok(0));
        panel.show_event("ignored", 0).unwrap();
        panel.tick(100_000).unwrap();
        panel.draw_logo("Title", "1.0").unwrap();
        panel.draw_ports(0xFF).unwrap();
        panel.show_ip([10, 0, 0, 1]).unwrap();

        let display = panel.display();
        assert!(!display.initialized);
        assert_eq!(display.ram_writes, 0);
        assert!(display.prints.is_empty());
        assert_eq!(display.powered, None);
    }

    #[test]
    fn test_observe_single_pin_goes_active() {
        let mut panel = started_panel();
        panel.prime(0, 0xFFFF);

        let mask = panel.observe(0, 0xFFFE, 10).unwrap();
        assert_eq!(mask, 0x0001);

        let mut expected = *glyph(GlyphId::FrameSolid);
        for (dst, src) in expected.iter_mut().zip(glyph(GlyphId::CornerTopLeft)) {
            *dst |= *src;
        }

        let display = panel.display();
        assert_eq!(display.read(0, 4, GLYPH_WIDTH), &expected[..]);
        assert_eq!(display.ram_writes, 1);
        assert_eq!(display.powered, Some(true));
        assert_eq!(display.contrast, Some(128));
    }

    #[test]
    fn test_observe_redraws_each_changed_port() {
        let mut panel = started_panel();
        panel.prime(1, 0xFFFF);

        // Ports 4 and 7 change, 5 and 6 stay put
        let mask = panel.observe(1, 0x0FF0, 10).unwrap();
        assert_eq!(mask, 0xF00F);

        let display = panel.display();
        assert_eq!(display.ram_writes, 2);
        assert_eq!(display.contrast_writes, 2);
        // Port 4 all lit at bank 1's first pair, top row
        assert_eq!(display.read(20, 4, GLYPH_WIDTH), &[0xff; GLYPH_WIDTH][..]);
        // Port 7 at the next pair, bottom row
        assert_eq!(display.column(30, 5), 0xff);
        // Port 5 untouched
        assert_eq!(display.column(20, 5), 0x00);
    }

    #[test]
    fn test_unchanged_sample_draws_nothing() {
        let mut panel = started_panel();
        panel.observe(0, 0xAAAA, 0).unwrap();
        panel.display_mut().reset_log();

        assert_eq!(panel.observe(0, 0xAAAA, 10), Ok(0));
        assert_eq!(panel.display().ram_writes, 0);
        assert_eq!(panel.display().contrast_writes, 0);
    }

    #[test]
    fn test_first_sample_animates_against_zero_history() {
        let mut panel = started_panel();

        let mask = panel.observe(0, 0xFFFF, 0).unwrap();
        assert_eq!(mask, 0xFFFF);
        assert_eq!(panel.display().ram_writes, 4);
        // Idle pins draw as an empty solid frame
        assert_eq!(panel.display().read(0, 4, GLYPH_WIDTH), &glyph(GlyphId::FrameSolid)[..]);
    }

    #[test]
    fn test_prime_suppresses_first_animation() {
        let mut panel = started_panel();
        panel.prime(0, 0xFFFF);

        assert_eq!(panel.observe(0, 0xFFFF, 0), Ok(0));
        assert_eq!(panel.display().ram_writes, 0);
    }

    #[test]
    fn test_ports_past_screen_edge_update_history_only() {
        let mut panel = started_panel();
        panel.prime(6, 0xFFFF);

        let mask = panel.observe(6, 0xFFFE, 0).unwrap();
        assert_eq!(mask, 0x0001);
        assert_eq!(panel.display().ram_writes, 0);
        // Still counts as activity
        assert_eq!(panel.display().contrast, Some(128));
        assert_eq!(panel.observe(6, 0xFFFE, 1), Ok(0));
    }

    #[test]
    fn test_bus_error_still_updates_history() {
        let mut panel = started_panel();
        panel.prime(0, 0xFFFF);
        panel.display_mut().fail = true;

        assert_eq!(panel.observe(0, 0xFFF0, 0), Err(DisplayError::Bus));

        panel.display_mut().fail = false;
        assert_eq!(panel.observe(0, 0xFFF0, 1), Ok(0));
    }

    #[test]
    fn test_failed_write_still_draws_other_ports() {
        let mut panel = started_panel();
        panel.prime(0, 0xFFFF);
        panel.display_mut().fail_ram_writes = 1;

        // All four ports go active; the first blit is lost
        assert_eq!(panel.observe(0, 0x0000, 0), Err(DisplayError::Bus));

        let display = panel.display();
        assert_eq!(display.ram_writes, 3);
        assert_eq!(display.read(0, 4, GLYPH_WIDTH), &[0; GLYPH_WIDTH][..]);
        assert_eq!(display.read(0, 5, GLYPH_WIDTH), &[0xff; GLYPH_WIDTH][..]);
        assert_eq!(display.read(10, 4, GLYPH_WIDTH), &[0xff; GLYPH_WIDTH][..]);
        assert_eq!(display.read(10, 5, GLYPH_WIDTH), &[0xff; GLYPH_WIDTH][..]);
        assert_eq!(display.contrast_writes, 4);

        // Failed write still restarted the display timeout
        panel.tick(1001).unwrap();
        assert_eq!(panel.display().contrast, Some(5));
    }

    #[test]
    fn test_display_dims_after_timeout() {
        let mut panel = started_panel();
        panel.prime(0, 0xFFFF);
        panel.observe(0, 0xFFFE, 1000).unwrap();

        panel.tick(1999).unwrap();
        assert_eq!(panel.display().contrast, Some(128));

        panel.tick(2001).unwrap();
        assert_eq!(panel.display().contrast, Some(5));
        assert_eq!(panel.display().contrast_writes, 2);

        panel.tick(5000).unwrap();
        assert_eq!(panel.display().contrast_writes, 2);
    }

    #[test]
    fn test_new_change_restarts_display_timeout() {
        let mut panel = started_panel();
        panel.prime(0, 0xFFFF);
        panel.observe(0, 0xFFFE, 0).unwrap();
        panel.observe(0, 0xFFFF, 900).unwrap();

        panel.tick(1500).unwrap();
        assert_eq!(panel.display().contrast, Some(128));

        panel.tick(1901).unwrap();
        assert_eq!(panel.display().contrast, Some(5));
    }

    #[test]
    fn test_dim_level_off_powers_down() {
        let config = PanelConfig {
            dim: DimLevel::Off,
            ..PanelConfig::default()
        };
        let mut panel = Panel::new(MockDisplay::new(), &config);
        panel.begin(TIMEOUTS).unwrap();
        panel.prime(0, 0xFFFF);
        panel.observe(0, 0x0000, 0).unwrap();

        panel.tick(1001).unwrap();
        assert_eq!(panel.display().powered, Some(false));
        assert_eq!(panel.display().power_off_count, 1);
        assert_eq!(panel.display().contrast, Some(128));

        // Activity wakes it up again
        panel.observe(0, 0xFFFF, 2000).unwrap();
        assert_eq!(panel.display().powered, Some(true));
    }

    #[test]
    fn test_zero_display_timeout_never_dims() {
        let mut panel = Panel::new(MockDisplay::new(), &PanelConfig::default());
        panel
            .begin(Timeouts {
                display_on_ms: 0,
                event_on_ms: 0,
            })
            .unwrap();
        panel.prime(0, 0xFFFF);
        panel.observe(0, 0xFFFE, 0).unwrap();
        panel.show_event("held", 0).unwrap();

        panel.tick(u32::MAX).unwrap();
        assert_eq!(panel.display().contrast, Some(128));
        assert!(panel.display().eol_clears.is_empty());
    }

    #[test]
    fn test_show_event_prints_inverted_on_bottom_line() {
        let mut panel = started_panel();
        panel.show_event("IN 3 ON", 0).unwrap();

        let display = panel.display();
        let print = display.last_print(EVENT_ROW).unwrap();
        assert_eq!(print.text.as_str(), "IN 3 ON");
        assert_eq!(print.col, 0);
        assert!(print.inverted);
        assert!(!display.inverted);
    }

    #[test]
    fn test_event_line_cleared_once_after_timeout() {
        let mut panel = started_panel();
        panel.show_event("IN 3 ON", 100).unwrap();

        panel.tick(600).unwrap();
        assert!(panel.display().eol_clears.is_empty());

        panel.tick(601).unwrap();
        assert_eq!(panel.display().eol_clears.as_slice(), &[(0, EVENT_ROW)]);

        panel.tick(10_000).unwrap();
        assert_eq!(panel.display().eol_clears.len(), 1);
    }

    #[test]
    fn test_event_timeout_independent_of_activity() {
        let mut panel = started_panel();
        panel.prime(0, 0xFFFF);
        panel.show_event("E", 0).unwrap();
        panel.observe(0, 0xFFFE, 400).unwrap();

        panel.tick(501).unwrap();
        assert_eq!(panel.display().eol_clears.len(), 1);
        assert_eq!(panel.display().contrast, Some(128));
    }

    #[test]
    fn test_timestamp_zero_arms_timeout() {
        let mut panel = started_panel();
        panel.show_event("boot", 0).unwrap();

        panel.tick(501).unwrap();
        assert_eq!(panel.display().eol_clears.len(), 1);
    }

    #[test]
    fn test_draw_logo() {
        let mut panel = started_panel();
        panel.draw_logo("Port Panel", "1.2.0").unwrap();

        let display = panel.display();
        assert_eq!(display.clear_count, 1);
        // Right quadrants overlap the left ones' blank tails
        assert_eq!(display.read(0, 0, 8), &glyph(GlyphId::LogoTopLeft)[..8]);
        assert_eq!(display.read(8, 1, GLYPH_WIDTH), &glyph(GlyphId::LogoBottomRight)[..]);
        assert_eq!(display.last_print(0).unwrap().text.as_str(), "Port Panel");
        assert_eq!(display.last_print(1).unwrap().text.as_str(), "1.2.0");
        assert_eq!(display.last_print(1).unwrap().col, HEADER_COL + 6);
        assert_eq!(display.cursor, (0, EVENT_ROW));
    }

    #[test]
    fn test_draw_ports_marks_found_banks() {
        let mut panel = started_panel();
        // Banks 0 and 2 found
        panel.draw_ports(0b0000_0101).unwrap();

        let display = panel.display();
        assert_eq!(display.ram_writes, usize::from(OUTLINE_CELLS) * 2);

        let solid = &glyph(GlyphId::FrameSolid)[..];
        let dashed = &glyph(GlyphId::FrameDashed)[..];
        // Cells 0-1 belong to bank 0
        assert_eq!(display.read(0, 4, GLYPH_WIDTH), solid);
        assert_eq!(display.read(10, 5, GLYPH_WIDTH), solid);
        // Cells 2-3 belong to bank 1
        assert_eq!(display.read(20, 4, GLYPH_WIDTH), dashed);
        // Cell 4 (bank 2) sits after the group gap
        assert_eq!(display.read(44, 5, GLYPH_WIDTH), solid);
        // Cell 11 (bank 5) is the last one
        assert_eq!(display.read(118, 4, GLYPH_WIDTH), dashed);
    }

    #[test]
    fn test_show_ip_and_mac() {
        let mut panel = started_panel();
        panel.show_ip([192, 168, 1, 40]).unwrap();
        panel.show_mac([0x02, 0xAB, 0x00, 0x1f, 0xc4, 0x09]).unwrap();

        let display = panel.display();
        let ip = display.last_print(IP_ROW).unwrap();
        assert_eq!(ip.text.as_str(), "192.168.1.40");
        assert_eq!(ip.col, HEADER_COL);

        let mac = display.last_print(MAC_ROW).unwrap();
        assert_eq!(mac.text.as_str(), "02:AB:00:1F:C4:09");
    }
}

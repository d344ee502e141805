//! SSD1306 / SH1106 OLED driver
//!
//! Driver for 128x64 page-addressed OLED modules over blocking I2C. There
//! is no host frame buffer: every write goes straight to the controller's
//! display RAM at the current cursor.
//!
//! The two controllers share nearly all commands. The SH1106 has a 132
//! column RAM with the glass centred on it (column offset 2) and uses a
//! DC-DC converter instead of the SSD1306 charge pump.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::I2c;

use portlight_core::layout::{DISPLAY_PAGES, DISPLAY_WIDTH};
use portlight_core::{Controller, DisplayDriver, DisplayError};

use super::font::{glyph_for, CHAR_ADVANCE, FONT_WIDTH};

/// Control byte preceding a command stream
const CONTROL_COMMAND: u8 = 0x00;
/// Control byte preceding display RAM data
const CONTROL_DATA: u8 = 0x40;

/// Data bytes per I2C write
const DATA_CHUNK: usize = 16;

/// SH1106 RAM column of visible column 0
const SH1106_COLUMN_OFFSET: u8 = 2;

/// OLED commands
#[allow(dead_code)]
mod cmd {
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const SET_ENTIRE_ON_RESUME: u8 = 0xA4;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_INVERSE: u8 = 0xA7;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_LOW_COLUMN: u8 = 0x00;
    pub const SET_HIGH_COLUMN: u8 = 0x10;
    pub const SET_PAGE_ADDR: u8 = 0xB0;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_SEG_REMAP: u8 = 0xA1;
    pub const SET_COM_SCAN_DEC: u8 = 0xC8;
    /// SSD1306 only
    pub const SET_MEMORY_MODE: u8 = 0x20;
    /// SSD1306 only
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
    /// SH1106 only
    pub const SET_DC_DC: u8 = 0xAD;
    /// SH1106 only, low two bits select 6.4V..9.0V
    pub const SET_PUMP_VOLTAGE: u8 = 0x30;
}

const SSD1306_INIT: &[u8] = &[
    cmd::DISPLAY_OFF,
    cmd::SET_CLOCK_DIV,
    0x80,
    cmd::SET_MUX_RATIO,
    0x3F, // 64 lines
    cmd::SET_DISPLAY_OFFSET,
    0x00,
    cmd::SET_START_LINE,
    cmd::SET_CHARGE_PUMP,
    0x14, // Enable charge pump
    cmd::SET_MEMORY_MODE,
    0x02, // Page addressing
    cmd::SET_SEG_REMAP,
    cmd::SET_COM_SCAN_DEC,
    cmd::SET_COM_PINS,
    0x12,
    cmd::SET_CONTRAST,
    0xCF,
    cmd::SET_PRECHARGE,
    0xF1,
    cmd::SET_VCOM_DETECT,
    0x40,
    cmd::SET_ENTIRE_ON_RESUME,
    cmd::SET_NORMAL,
    cmd::DISPLAY_ON,
];

const SH1106_INIT: &[u8] = &[
    cmd::DISPLAY_OFF,
    cmd::SET_CLOCK_DIV,
    0x80,
    cmd::SET_MUX_RATIO,
    0x3F,
    cmd::SET_DISPLAY_OFFSET,
    0x00,
    cmd::SET_START_LINE,
    cmd::SET_DC_DC,
    0x8B, // DC-DC on
    cmd::SET_PUMP_VOLTAGE | 0x02,
    cmd::SET_SEG_REMAP,
    cmd::SET_COM_SCAN_DEC,
    cmd::SET_COM_PINS,
    0x12,
    cmd::SET_CONTRAST,
    0xCF,
    cmd::SET_PRECHARGE,
    0x1F,
    cmd::SET_VCOM_DETECT,
    0x40,
    cmd::SET_ENTIRE_ON_RESUME,
    cmd::SET_NORMAL,
    cmd::DISPLAY_ON,
];

/// Page-addressed OLED on an I2C bus
pub struct Oled<I2C> {
    i2c: I2C,
    address: u8,
    controller: Controller,
    /// Visible column of the cursor
    col: u8,
    /// Page of the cursor
    row: u8,
    /// XORed into every data byte
    invert_mask: u8,
}

impl<I2C> Oled<I2C>
where
    I2C: I2c,
{
    /// Create a driver; nothing is sent until `init`
    pub fn new(i2c: I2C, address: u8, controller: Controller) -> Self {
        Self {
            i2c,
            address,
            controller,
            col: 0,
            row: 0,
            invert_mask: 0,
        }
    }

    /// Give the bus back
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Get the cursor as (column, page)
    pub fn cursor(&self) -> (u8, u8) {
        (self.col, self.row)
    }

    /// Pulse a dedicated reset line
    ///
    /// Only needed when the module's RST pin is wired to a GPIO rather
    /// than the MCU reset.
    pub fn hardware_reset<P, D>(&mut self, pin: &mut P, delay: &mut D) -> Result<(), DisplayError>
    where
        P: OutputPin,
        D: DelayNs,
    {
        pin.set_high().map_err(|_| DisplayError::ResetPin)?;
        delay.delay_ms(1);
        pin.set_low().map_err(|_| DisplayError::ResetPin)?;
        delay.delay_ms(10);
        pin.set_high().map_err(|_| DisplayError::ResetPin)?;
        delay.delay_ms(10);
        Ok(())
    }

    /// Send a command stream in one transaction
    fn commands(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        let mut frame = [0u8; 32];
        for chunk in bytes.chunks(frame.len() - 1) {
            frame[0] = CONTROL_COMMAND;
            frame[1..=chunk.len()].copy_from_slice(chunk);
            self.i2c
                .write(self.address, &frame[..=chunk.len()])
                .map_err(|_| DisplayError::Bus)?;
        }
        Ok(())
    }

    /// Point the controller's RAM pointer at the cursor
    fn sync_cursor(&mut self) -> Result<(), DisplayError> {
        let ram_col = match self.controller {
            Controller::Ssd1306 => self.col,
            Controller::Sh1106 => self.col + SH1106_COLUMN_OFFSET,
        };
        self.commands(&[
            cmd::SET_PAGE_ADDR | self.row,
            cmd::SET_HIGH_COLUMN | (ram_col >> 4),
            cmd::SET_LOW_COLUMN | (ram_col & 0x0F),
        ])
    }

    /// Write data bytes at the cursor, clipped to the right edge
    ///
    /// Every byte is XORed with the invert mask.
    fn data(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        let room = usize::from(DISPLAY_WIDTH - self.col);
        let bytes = &bytes[..bytes.len().min(room)];

        let mut frame = [0u8; DATA_CHUNK + 1];
        frame[0] = CONTROL_DATA;
        for chunk in bytes.chunks(DATA_CHUNK) {
            for (dst, src) in frame[1..].iter_mut().zip(chunk) {
                *dst = src ^ self.invert_mask;
            }
            self.i2c
                .write(self.address, &frame[..=chunk.len()])
                .map_err(|_| DisplayError::Bus)?;
        }
        self.col += bytes.len() as u8;
        Ok(())
    }

    /// Write `count` copies of `byte` at the cursor
    fn fill(&mut self, byte: u8, count: usize) -> Result<(), DisplayError> {
        let run = [byte; DATA_CHUNK];
        let mut remaining = count.min(usize::from(DISPLAY_WIDTH - self.col));
        while remaining > 0 {
            let n = remaining.min(DATA_CHUNK);
            self.data(&run[..n])?;
            remaining -= n;
        }
        Ok(())
    }

    fn newline(&mut self) -> Result<(), DisplayError> {
        self.col = 0;
        if self.row + 1 < DISPLAY_PAGES {
            self.row += 1;
        }
        self.sync_cursor()
    }
}

impl<I2C> DisplayDriver for Oled<I2C>
where
    I2C: I2c,
{
    fn probe(&mut self) -> bool {
        let mut status = [0u8; 1];
        self.i2c.read(self.address, &mut status).is_ok()
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        let sequence = match self.controller {
            Controller::Ssd1306 => SSD1306_INIT,
            Controller::Sh1106 => SH1106_INIT,
        };
        self.commands(sequence)?;
        self.invert_mask = 0;
        self.set_cursor(0, 0)
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        for row in 0..DISPLAY_PAGES {
            self.set_cursor(0, row)?;
            self.fill(0, usize::from(DISPLAY_WIDTH))?;
        }
        self.set_cursor(0, 0)
    }

    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), DisplayError> {
        if col >= DISPLAY_WIDTH || row >= DISPLAY_PAGES {
            return Err(DisplayError::InvalidCoordinates);
        }
        self.col = col;
        self.row = row;
        self.sync_cursor()
    }

    fn print(&mut self, text: &str) -> Result<(), DisplayError> {
        for ch in text.chars() {
            match ch {
                '\n' => self.newline()?,
                '\r' => {}
                _ => {
                    if self.col + CHAR_ADVANCE > DISPLAY_WIDTH {
                        continue;
                    }
                    let mut cell = [0u8; FONT_WIDTH + 1];
                    cell[..FONT_WIDTH].copy_from_slice(glyph_for(ch));
                    self.data(&cell)?;
                }
            }
        }
        Ok(())
    }

    fn write_ram(&mut self, data: &[u8]) -> Result<(), DisplayError> {
        self.data(data)
    }

    fn set_contrast(&mut self, level: u8) -> Result<(), DisplayError> {
        self.commands(&[cmd::SET_CONTRAST, level])
    }

    fn set_power(&mut self, on: bool) -> Result<(), DisplayError> {
        let command = if on { cmd::DISPLAY_ON } else { cmd::DISPLAY_OFF };
        self.commands(&[command])
    }

    fn set_invert(&mut self, inverted: bool) -> Result<(), DisplayError> {
        self.invert_mask = if inverted { 0xFF } else { 0x00 };
        Ok(())
    }

    fn clear_to_eol(&mut self) -> Result<(), DisplayError> {
        let (col, row) = (self.col, self.row);
        if col >= DISPLAY_WIDTH {
            return Ok(());
        }
        self.fill(0, usize::from(DISPLAY_WIDTH - col))?;
        self.set_cursor(col, row)
    }
}

//! Recording display used by unit tests

use heapless::{String, Vec};

use crate::layout::{DISPLAY_PAGES, DISPLAY_WIDTH};
use crate::traits::{DisplayDriver, DisplayError};

const WIDTH: usize = DISPLAY_WIDTH as usize;
const PAGES: usize = DISPLAY_PAGES as usize;

/// One `print` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Print {
    pub col: u8,
    pub row: u8,
    pub text: String<32>,
    pub inverted: bool,
}

/// Display double that models GDDRAM and records every command
#[derive(Debug)]
pub struct MockDisplay {
    /// Answer `probe` with this
    pub present: bool,
    /// Fail every call after `init`
    pub fail: bool,
    /// Fail this many upcoming `write_ram` calls
    pub fail_ram_writes: usize,
    pub ram: [[u8; WIDTH]; PAGES],
    pub cursor: (u8, u8),
    pub inverted: bool,
    pub initialized: bool,
    pub clear_count: usize,
    pub contrast: Option<u8>,
    pub contrast_writes: usize,
    pub powered: Option<bool>,
    pub power_off_count: usize,
    pub ram_writes: usize,
    pub prints: Vec<Print, 16>,
    pub eol_clears: Vec<(u8, u8), 8>,
}

impl MockDisplay {
    pub fn new() -> Self {
        Self {
            present: true,
            fail: false,
            fail_ram_writes: 0,
            ram: [[0; WIDTH]; PAGES],
            cursor: (0, 0),
            inverted: false,
            initialized: false,
            clear_count: 0,
            contrast: None,
            contrast_writes: 0,
            powered: None,
            power_off_count: 0,
            ram_writes: 0,
            prints: Vec::new(),
            eol_clears: Vec::new(),
        }
    }

    pub fn absent() -> Self {
        Self {
            present: false,
            ..Self::new()
        }
    }

    pub fn column(&self, col: usize, row: usize) -> u8 {
        self.ram[row][col]
    }

    pub fn read(&self, col: usize, row: usize, len: usize) -> &[u8] {
        &self.ram[row][col..col + len]
    }

    /// Text of the most recent print on `row`
    pub fn last_print(&self, row: u8) -> Option<&Print> {
        self.prints.iter().rev().find(|p| p.row == row)
    }

    /// Forget recorded calls, keeping RAM
    pub fn reset_log(&mut self) {
        self.clear_count = 0;
        self.contrast_writes = 0;
        self.power_off_count = 0;
        self.ram_writes = 0;
        self.prints.clear();
        self.eol_clears.clear();
    }

    fn check(&self) -> Result<(), DisplayError> {
        if self.fail {
            Err(DisplayError::Bus)
        } else {
            Ok(())
        }
    }
}

impl DisplayDriver for MockDisplay {
    fn probe(&mut self) -> bool {
        self.present
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        self.initialized = true;
        self.powered = Some(true);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.check()?;
        self.ram = [[0; WIDTH]; PAGES];
        self.cursor = (0, 0);
        self.clear_count += 1;
        Ok(())
    }

    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), DisplayError> {
        self.check()?;
        self.cursor = (col, row);
        Ok(())
    }

    fn print(&mut self, text: &str) -> Result<(), DisplayError> {
        self.check()?;
        let (col, row) = self.cursor;
        let mut recorded = String::new();
        let _ = recorded.push_str(text);
        let _ = self.prints.push(Print {
            col,
            row,
            text: recorded,
            inverted: self.inverted,
        });
        self.cursor.0 = col.saturating_add((text.len() * 6) as u8);
        Ok(())
    }

    fn write_ram(&mut self, data: &[u8]) -> Result<(), DisplayError> {
        self.check()?;
        if self.fail_ram_writes > 0 {
            self.fail_ram_writes -= 1;
            return Err(DisplayError::Bus);
        }
        let (col, row) = self.cursor;
        let mask = if self.inverted { 0xFF } else { 0x00 };
        for (i, byte) in data.iter().enumerate() {
            let x = usize::from(col) + i;
            if x < WIDTH {
                self.ram[usize::from(row)][x] = byte ^ mask;
            }
        }
        self.cursor.0 = col.saturating_add(data.len() as u8);
        self.ram_writes += 1;
        Ok(())
    }

    fn set_contrast(&mut self, level: u8) -> Result<(), DisplayError> {
        self.check()?;
        self.contrast = Some(level);
        self.contrast_writes += 1;
        Ok(())
    }

    fn set_power(&mut self, on: bool) -> Result<(), DisplayError> {
        self.check()?;
        self.powered = Some(on);
        if !on {
            self.power_off_count += 1;
        }
        Ok(())
    }

    fn set_invert(&mut self, inverted: bool) -> Result<(), DisplayError> {
        self.check()?;
        self.inverted = inverted;
        Ok(())
    }

    fn clear_to_eol(&mut self) -> Result<(), DisplayError> {
        self.check()?;
        let (col, row) = self.cursor;
        for x in usize::from(col)..WIDTH {
            self.ram[usize::from(row)][x] = 0;
        }
        let _ = self.eol_clears.push((col, row));
        Ok(())
    }
}

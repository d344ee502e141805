//! MCP23017 16-bit I/O expander
//!
//! Each expander is one bank of four ports, four pins per port. All 16
//! pins are used as inputs with the internal pull-ups enabled, so an idle
//! pin reads high and an active pin is pulled low.
//!
//! The chip is used in its power-on register layout (IOCON.BANK = 0), where
//! every A register is followed by its B twin and the address pointer
//! auto-increments. A 16-bit value is therefore one two-byte transfer,
//! port A in the low byte.

use embedded_hal::i2c::I2c;

/// Address of bank 0; A2..A0 select banks 0-7
pub const BASE_ADDRESS: u8 = 0x20;

/// Register addresses (IOCON.BANK = 0)
#[allow(dead_code)]
mod reg {
    pub const IODIRA: u8 = 0x00;
    pub const IPOLA: u8 = 0x02;
    pub const GPINTENA: u8 = 0x04;
    pub const GPPUA: u8 = 0x0C;
    pub const GPIOA: u8 = 0x12;
    pub const OLATA: u8 = 0x14;
}

/// Errors from the expander
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExpanderError {
    /// Bus transfer failed
    Bus,
}

/// One MCP23017 input bank
pub struct Mcp23017<I2C> {
    i2c: I2C,
    bank: u8,
}

impl<I2C> Mcp23017<I2C>
where
    I2C: I2c,
{
    /// Create a driver for bank 0-7
    pub fn new(i2c: I2C, bank: u8) -> Self {
        Self {
            i2c,
            bank: bank & 0x07,
        }
    }

    /// Bank index
    pub fn bank(&self) -> u8 {
        self.bank
    }

    /// 7-bit bus address
    pub fn address(&self) -> u8 {
        BASE_ADDRESS + self.bank
    }

    /// Check whether the chip answers
    pub fn probe(&mut self) -> bool {
        let mut value = [0u8; 1];
        self.i2c
            .write_read(self.address(), &[reg::IODIRA], &mut value)
            .is_ok()
    }

    /// Make every pin an input with pull-up and normal polarity
    pub fn configure_inputs(&mut self) -> Result<(), ExpanderError> {
        self.write_pair(reg::IODIRA, 0xFFFF)?;
        self.write_pair(reg::IPOLA, 0x0000)?;
        self.write_pair(reg::GPPUA, 0xFFFF)
    }

    /// Read all 16 pins; bit n is pin n, port A in the low byte
    pub fn sample(&mut self) -> Result<u16, ExpanderError> {
        self.read_pair(reg::GPIOA)
    }

    fn write_pair(&mut self, register: u8, value: u16) -> Result<(), ExpanderError> {
        let [lo, hi] = value.to_le_bytes();
        self.i2c
            .write(self.address(), &[register, lo, hi])
            .map_err(|_| ExpanderError::Bus)
    }

    fn read_pair(&mut self, register: u8) -> Result<u16, ExpanderError> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address(), &[register], &mut buf)
            .map_err(|_| ExpanderError::Bus)?;
        Ok(u16::from_le_bytes(buf))
    }
}

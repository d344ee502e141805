//! Hardware driver implementations
//!
//! This crate provides concrete implementations for the hardware around
//! the panel, all on blocking `embedded-hal` 1.0 I2C:
//!
//! - OLED display adapter for SSD1306 and SH1106 controllers
//! - MCP23017 16-pin input banks

#![no_std]
#![deny(unsafe_code)]

pub mod display;
pub mod expander;

pub use display::Oled;
pub use expander::{ExpanderError, Mcp23017};

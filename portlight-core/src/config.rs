//! Panel configuration types
//!
//! Defaults match the reference board: a 1.3" SH1106 at 0x3C sharing the
//! MCU reset line.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default I2C address of the OLED
pub const DEFAULT_ADDRESS: u8 = 0x3C;

/// Contrast while the panel is active
pub const DEFAULT_CONTRAST_ON: u8 = 128;

/// Contrast after the display timeout
pub const DEFAULT_CONTRAST_DIM: u8 = 5;

/// How long the panel stays bright after a port change
pub const DEFAULT_DISPLAY_ON_MS: u32 = 10_000;

/// How long an event stays on the bottom line
pub const DEFAULT_EVENT_ON_MS: u32 = 3_000;

/// OLED controller variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Controller {
    /// Mostly the 0.96" modules
    Ssd1306,
    /// Mostly the 1.3" modules
    #[default]
    Sh1106,
}

/// Brightness after the display timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DimLevel {
    /// Switch the panel off entirely
    Off,
    /// Keep the panel on at a reduced contrast
    Contrast(u8),
}

impl DimLevel {
    /// Interpret a raw contrast setting, where 0 means off
    pub const fn from_contrast(level: u8) -> Self {
        if level == 0 {
            DimLevel::Off
        } else {
            DimLevel::Contrast(level)
        }
    }
}

impl Default for DimLevel {
    fn default() -> Self {
        DimLevel::from_contrast(DEFAULT_CONTRAST_DIM)
    }
}

/// Timeout windows; 0 disables the respective timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Timeouts {
    /// Bright period after the last port change
    pub display_on_ms: u32,
    /// Event line lifetime
    pub event_on_ms: u32,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            display_on_ms: DEFAULT_DISPLAY_ON_MS,
            event_on_ms: DEFAULT_EVENT_ON_MS,
        }
    }
}

/// Complete panel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PanelConfig {
    /// 7-bit I2C address of the OLED
    pub address: u8,
    /// Controller chip on the module
    pub controller: Controller,
    /// Pulse a dedicated reset line before init
    pub hardware_reset: bool,
    /// Contrast while active
    pub contrast_on: u8,
    /// Brightness after the display timeout
    pub dim: DimLevel,
    /// Timeout windows
    pub timeouts: Timeouts,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            controller: Controller::default(),
            hardware_reset: false,
            contrast_on: DEFAULT_CONTRAST_ON,
            dim: DimLevel::default(),
            timeouts: Timeouts::default(),
        }
    }
}

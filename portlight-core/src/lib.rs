//! Board-agnostic core logic for the port status panel
//!
//! This crate contains all display logic that does not depend on
//! specific hardware implementations:
//!
//! - Glyph catalog and bitmap compositing
//! - Port-to-screen coordinate mapping
//! - Input bank change detection
//! - Display and event-line timeouts
//! - The [`Panel`] facade tying them to a [`DisplayDriver`]
//! - Configuration type definitions

#![no_std]
#![deny(unsafe_code)]

pub mod bitmap;
pub mod config;
pub mod detector;
pub mod glyph;
pub mod layout;
pub mod panel;
pub mod timeout;
pub mod traits;

#[cfg(test)]
mod mock;

pub use config::{Controller, DimLevel, PanelConfig, Timeouts};
pub use panel::Panel;
pub use traits::{DisplayDriver, DisplayError};

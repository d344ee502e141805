//! Board configuration
//!
//! Generated by build.rs from panel.toml; see there for the ranges each
//! value was checked against.

use portlight_core::{Controller, DimLevel, PanelConfig, Timeouts};

include!(concat!(env!("OUT_DIR"), "/panel_config.rs"));

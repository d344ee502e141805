//! I/O expander drivers

pub mod mcp23017;

pub use mcp23017::{ExpanderError, Mcp23017};

//! Display drivers

mod font;
pub mod oled;

pub use oled::Oled;

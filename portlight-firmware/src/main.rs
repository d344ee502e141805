//! Portlight - I/O Port Status Panel Firmware
//!
//! Samples up to eight MCP23017 input banks and mirrors every 4-pin port
//! onto a 128x64 OLED. The OLED and the expanders share one I2C bus.
//!
//! Wiring (RP2040):
//! - GPIO4: I2C0 SDA
//! - GPIO5: I2C0 SCL
//! - GPIO6: OLED RST (only used with `hardware_reset = true`)

#![no_std]
#![no_main]

mod config;

use core::cell::RefCell;
use core::fmt::Write;

use defmt::{debug, info, warn};
use embassy_executor::Spawner;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::i2c::{self, I2c};
use embassy_time::{Delay, Duration, Instant, Ticker};
use embedded_hal_bus::i2c::RefCellDevice;
use heapless::{String, Vec};
use {defmt_rtt as _, panic_probe as _};

use portlight_core::detector::{MAX_BANKS, PORTS_PER_BANK};
use portlight_core::{DisplayDriver, DisplayError, Panel};
use portlight_drivers::{Mcp23017, Oled};

use crate::config::{EXPANDER_BANKS, NETWORK_IP, NETWORK_MAC, PANEL_CONFIG, SAMPLE_INTERVAL_MS};

/// Splash screen title
const TITLE: &str = "Portlight";

/// I2C bus speed
const I2C_FREQUENCY_HZ: u32 = 400_000;

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Portlight firmware starting...");

    let p = embassy_rp::init(Default::default());

    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = I2C_FREQUENCY_HZ;
    let bus = RefCell::new(I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c_config));

    let mut oled = Oled::new(
        RefCellDevice::new(&bus),
        PANEL_CONFIG.address,
        PANEL_CONFIG.controller,
    );
    if PANEL_CONFIG.hardware_reset {
        let mut reset = Output::new(p.PIN_6, Level::High);
        if let Err(e) = oled.hardware_reset(&mut reset, &mut Delay) {
            warn!("OLED reset failed: {}", e);
        }
    }

    let mut panel = Panel::new(oled, &PANEL_CONFIG);

    info!("Scanning for OLED at {=u8:#x}...", PANEL_CONFIG.address);
    match panel.begin(PANEL_CONFIG.timeouts) {
        Ok(true) => info!("OLED ready ({})", PANEL_CONFIG.controller),
        Ok(false) => warn!("No OLED found, running headless"),
        Err(e) => warn!("OLED init failed: {}", e),
    }

    // Probe every configured bank
    let mut expanders: Vec<Mcp23017<_>, MAX_BANKS> = Vec::new();
    let mut banks_found: u8 = 0;
    for bank in EXPANDER_BANKS {
        let mut expander = Mcp23017::new(RefCellDevice::new(&bus), bank);
        if !expander.probe() {
            debug!("No expander at {=u8:#x}", expander.address());
            continue;
        }
        match expander.configure_inputs() {
            Ok(()) => {
                info!("Expander bank {} at {=u8:#x}", bank, expander.address());
                banks_found |= 1 << bank;
                if expanders.push(expander).is_err() {
                    warn!("Too many expanders, ignoring bank {}", bank);
                }
            }
            Err(e) => warn!("Expander bank {} setup failed: {}", bank, e),
        }
    }
    info!("{} expander(s) found", expanders.len());

    if let Err(e) = draw_splash(&mut panel, banks_found) {
        warn!("Splash screen failed: {}", e);
    }

    let mut ticker = Ticker::every(Duration::from_millis(SAMPLE_INTERVAL_MS));

    loop {
        let now_ms = Instant::now().as_millis() as u32;

        for expander in expanders.iter_mut() {
            let bank = expander.bank();
            let sample = match expander.sample() {
                Ok(sample) => sample,
                Err(e) => {
                    warn!("Bank {} read failed: {}", bank, e);
                    continue;
                }
            };

            match panel.observe(usize::from(bank), sample, now_ms) {
                Ok(0) => {}
                Ok(mask) => {
                    debug!("Bank {} changed: {=u16:#06x}", bank, mask);
                    if let Some(text) = describe_change(bank, sample, mask) {
                        panel.show_event(&text, now_ms).ok();
                    }
                }
                Err(e) => warn!("Display update failed: {}", e),
            }
        }

        if let Err(e) = panel.tick(now_ms) {
            warn!("Display tick failed: {}", e);
        }

        ticker.next().await;
    }
}

/// Logo, port outlines and the network labels
fn draw_splash<D: DisplayDriver>(panel: &mut Panel<D>, banks_found: u8) -> Result<(), DisplayError> {
    panel.draw_logo(TITLE, env!("CARGO_PKG_VERSION"))?;
    panel.draw_ports(banks_found)?;
    if let Some(ip) = NETWORK_IP {
        panel.show_ip(ip)?;
    }
    if let Some(mac) = NETWORK_MAC {
        panel.show_mac(mac)?;
    }
    Ok(())
}

/// Event line text naming the highest changed port of a bank
///
/// The pin pattern is shown active-high, first pin rightmost.
fn describe_change(bank: u8, sample: u16, mask: u16) -> Option<String<21>> {
    let nibble = (0..PORTS_PER_BANK)
        .rev()
        .find(|n| (mask >> (n * 4)) & 0xF != 0)?;
    let port = bank * PORTS_PER_BANK + nibble;
    let active = !(sample >> (nibble * 4)) & 0xF;

    let mut text = String::new();
    write!(text, "Port {:02} {:04b}", port, active).ok()?;
    Some(text)
}

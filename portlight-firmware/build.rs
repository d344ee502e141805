//! Build script for portlight-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates panel.toml at compile time
//! - Generates `panel_config.rs` with the board constants

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use portlight_core::{Controller, DimLevel, Timeouts};

/// Highest MCP23017 bank (A2..A0 all high)
const MAX_BANK: i64 = 7;

/// Board settings extracted from panel.toml
struct Settings {
    address: u8,
    controller: Controller,
    hardware_reset: bool,
    contrast_on: u8,
    dim: DimLevel,
    timeouts: Timeouts,
    first_bank: u8,
    last_bank: u8,
    sample_interval_ms: u64,
    ip: Option<[u8; 4]>,
    mac: Option<[u8; 6]>,
}

fn main() {
    setup_linker();
    let config = load_config();
    let settings = validate_config(&config);
    generate_config(&settings);

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Read and parse panel.toml
fn load_config() -> toml::Value {
    println!("cargo:rerun-if-changed=panel.toml");

    let config_path = Path::new("panel.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: panel.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a panel.toml configuration file.          ║\n\
            ║  Please create one in the portlight-firmware directory.          ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read panel.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in panel.toml                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    }
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Report every collected error in one box and stop the build
fn fail(title: &str, errors: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Read an integer field and check its range
fn int_field(
    table: &toml::value::Table,
    section: &str,
    key: &str,
    range: std::ops::RangeInclusive<i64>,
    errors: &mut Vec<String>,
) -> Option<i64> {
    match table.get(key) {
        Some(toml::Value::Integer(v)) if range.contains(v) => Some(*v),
        Some(toml::Value::Integer(_)) => {
            errors.push(format!(
                "[{}] {} must be {}-{}",
                section,
                key,
                range.start(),
                range.end()
            ));
            None
        }
        Some(_) => {
            errors.push(format!("[{}] {} must be an integer", section, key));
            None
        }
        None => {
            errors.push(format!("[{}] missing '{}'", section, key));
            None
        }
    }
}

fn section<'a>(
    config: &'a toml::Value,
    name: &str,
    errors: &mut Vec<String>,
) -> Option<&'a toml::value::Table> {
    match config.get(name) {
        Some(toml::Value::Table(t)) => Some(t),
        Some(_) => {
            errors.push(format!("[{}] must be a table", name));
            None
        }
        None => {
            errors.push(format!("Missing [{}] section", name));
            None
        }
    }
}

/// Validate panel.toml and extract the board settings
fn validate_config(config: &toml::Value) -> Settings {
    let mut errors = Vec::new();

    let display = section(config, "display", &mut errors);
    let timeouts = section(config, "timeouts", &mut errors);
    let expanders = section(config, "expanders", &mut errors);

    if !errors.is_empty() {
        fail("Incomplete panel configuration", &errors);
    }

    let (Some(display), Some(timeouts), Some(expanders)) = (display, timeouts, expanders) else {
        unreachable!()
    };

    let address = int_field(display, "display", "address", 0x08..=0x77, &mut errors);
    let contrast_on = int_field(display, "display", "contrast_on", 1..=255, &mut errors);
    let contrast_dim = int_field(display, "display", "contrast_dim", 0..=255, &mut errors);

    let controller = match display.get("controller") {
        Some(value) => match value.clone().try_into::<Controller>() {
            Ok(controller) => Some(controller),
            Err(_) => {
                errors.push("[display] controller must be \"ssd1306\" or \"sh1106\"".to_string());
                None
            }
        },
        None => {
            errors.push("[display] missing 'controller'".to_string());
            None
        }
    };

    let hardware_reset = match display.get("hardware_reset") {
        Some(toml::Value::Boolean(b)) => *b,
        Some(_) => {
            errors.push("[display] hardware_reset must be true or false".to_string());
            false
        }
        None => false,
    };

    let timeouts = match toml::Value::Table(timeouts.clone()).try_into::<Timeouts>() {
        Ok(t) => Some(t),
        Err(e) => {
            errors.push(format!("[timeouts] {}", e.message()));
            None
        }
    };

    let first_bank = int_field(expanders, "expanders", "first_bank", 0..=MAX_BANK, &mut errors);
    let last_bank = int_field(expanders, "expanders", "last_bank", 0..=MAX_BANK, &mut errors);
    let sample_interval_ms = int_field(
        expanders,
        "expanders",
        "sample_interval_ms",
        1..=1000,
        &mut errors,
    );
    if let (Some(first), Some(last)) = (first_bank, last_bank) {
        if first > last {
            errors.push("[expanders] first_bank must not exceed last_bank".to_string());
        }
    }

    let (ip, mac) = validate_network(config, &mut errors);

    if !errors.is_empty() {
        fail("Invalid panel configuration", &errors);
    }

    Settings {
        address: address.unwrap() as u8,
        controller: controller.unwrap(),
        hardware_reset,
        contrast_on: contrast_on.unwrap() as u8,
        dim: DimLevel::from_contrast(contrast_dim.unwrap() as u8),
        timeouts: timeouts.unwrap(),
        first_bank: first_bank.unwrap() as u8,
        last_bank: last_bank.unwrap() as u8,
        sample_interval_ms: sample_interval_ms.unwrap() as u64,
        ip,
        mac,
    }
}

/// Validate the optional [network] labels
fn validate_network(
    config: &toml::Value,
    errors: &mut Vec<String>,
) -> (Option<[u8; 4]>, Option<[u8; 6]>) {
    let network = match config.get("network") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push("[network] must be a table".to_string());
            return (None, None);
        }
        None => return (None, None),
    };

    let ip = match network.get("ip") {
        Some(toml::Value::String(s)) => {
            let octets: Vec<Option<u8>> = s.split('.').map(|p| p.parse().ok()).collect();
            match octets.as_slice() {
                [Some(a), Some(b), Some(c), Some(d)] => Some([*a, *b, *c, *d]),
                _ => {
                    errors.push(format!("[network] ip '{}' is not a dotted quad", s));
                    None
                }
            }
        }
        Some(_) => {
            errors.push("[network] ip must be a string".to_string());
            None
        }
        None => None,
    };

    let mac = match network.get("mac") {
        Some(toml::Value::String(s)) => {
            let bytes: Vec<Option<u8>> = s
                .split(':')
                .map(|p| {
                    if p.len() == 2 {
                        u8::from_str_radix(p, 16).ok()
                    } else {
                        None
                    }
                })
                .collect();
            match bytes.as_slice() {
                [Some(a), Some(b), Some(c), Some(d), Some(e), Some(f)] => {
                    Some([*a, *b, *c, *d, *e, *f])
                }
                _ => {
                    errors.push(format!("[network] mac '{}' is not XX:XX:XX:XX:XX:XX", s));
                    None
                }
            }
        }
        Some(_) => {
            errors.push("[network] mac must be a string".to_string());
            None
        }
        None => None,
    };

    (ip, mac)
}

/// Write the validated settings as Rust constants
fn generate_config(settings: &Settings) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let mut f = File::create(out_dir.join("panel_config.rs")).unwrap();

    let controller = match settings.controller {
        Controller::Ssd1306 => "Controller::Ssd1306",
        Controller::Sh1106 => "Controller::Sh1106",
    };
    let dim = match settings.dim {
        DimLevel::Off => "DimLevel::Off".to_string(),
        DimLevel::Contrast(level) => format!("DimLevel::Contrast({})", level),
    };

    writeln!(f, "// Generated from panel.toml").unwrap();
    writeln!(
        f,
        "pub const PANEL_CONFIG: PanelConfig = PanelConfig {{\n    \
            address: {:#04x},\n    \
            controller: {},\n    \
            hardware_reset: {},\n    \
            contrast_on: {},\n    \
            dim: {},\n    \
            timeouts: Timeouts {{ display_on_ms: {}, event_on_ms: {} }},\n\
        }};",
        settings.address,
        controller,
        settings.hardware_reset,
        settings.contrast_on,
        dim,
        settings.timeouts.display_on_ms,
        settings.timeouts.event_on_ms,
    )
    .unwrap();
    writeln!(
        f,
        "pub const EXPANDER_BANKS: core::ops::RangeInclusive<u8> = {}..={};",
        settings.first_bank, settings.last_bank
    )
    .unwrap();
    writeln!(
        f,
        "pub const SAMPLE_INTERVAL_MS: u64 = {};",
        settings.sample_interval_ms
    )
    .unwrap();
    writeln!(f, "pub const NETWORK_IP: Option<[u8; 4]> = {:?};", settings.ip).unwrap();
    writeln!(f, "pub const NETWORK_MAC: Option<[u8; 6]> = {:?};", settings.mac).unwrap();
}

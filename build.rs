//! This build script copies the `memory.x` file from the crate root into
//! a directory where the linker can always find it at build time.
//! Additionally, by requesting that Cargo re-run the build script whenever
//! `memory.x` is changed, updating `memory.x` ensures a rebuild of the
//! application with the new memory settings.
//!
//! It also turns `config/terminal_config.json` into `terminal_config.rs`, which
//! the library includes as its compile-time configuration.

#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::print_stdout)]

use std::{
    env, fs,
    fs::File,
    io,
    io::Write,
    path::{Path, PathBuf},
};

/// Defaults written to `config/terminal_config.json` when the file is missing.
const DEFAULT_TERMINAL_CONFIG: &str =
    r#"{"tries":3,"pulse_ms":500,"tick_ms":1000,"uart_baud":9600,"spi_freq_hz":62500}"#;

fn main() {
    println!("in build.rs");
    memory_x();
    terminal_config().unwrap();
}

/// Generate `terminal_config.rs` from `terminal_config.json`
fn terminal_config() -> io::Result<()> {
    println!("in terminal_config");

    // Create a new file in the output directory
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR environment variable not set");
    let dest_path = Path::new(&out_dir).join("terminal_config.rs");
    let mut f = File::create(dest_path).expect("Could not create terminal_config.rs file");

    // Read the terminal_config.json file, or create it with default values if it doesn't exist
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR environment variable not set");
    let config_dir = Path::new(&manifest_dir).join("config");
    let config_path = config_dir.join("terminal_config.json");
    println!("cargo:rerun-if-changed={}", config_path.display());
    let config_contents = if config_path.exists() {
        fs::read_to_string(&config_path).expect("Could not read terminal_config.json file")
    } else {
        println!("terminal_config.json not found, creating with default values");
        fs::create_dir_all(&config_dir).expect("Could not create config directory");
        fs::write(&config_path, DEFAULT_TERMINAL_CONFIG)
            .expect("Could not write default terminal_config.json file");
        DEFAULT_TERMINAL_CONFIG.to_string()
    };

    // Parse the JSON and extract the values, missing keys fall back to the defaults
    let config: serde_json::Value = serde_json::from_str(&config_contents)
        .expect("Could not parse terminal_config.json file");
    let defaults: serde_json::Value =
        serde_json::from_str(DEFAULT_TERMINAL_CONFIG).expect("default config is valid json");
    let value = |key: &str| -> u64 {
        config[key]
            .as_u64()
            .or_else(|| defaults[key].as_u64())
            .expect("config key has no default")
    };

    let tries = u8::try_from(value("tries")).expect("tries must fit in a u8");
    let pulse_ms = u32::try_from(value("pulse_ms")).expect("pulse_ms must fit in a u32");
    let tick_ms = value("tick_ms");
    let uart_baud = u32::try_from(value("uart_baud")).expect("uart_baud must fit in a u32");
    let spi_freq_hz = u32::try_from(value("spi_freq_hz")).expect("spi_freq_hz must fit in a u32");

    writeln!(f, "/// Login attempts before the terminal locks out.")?;
    writeln!(f, "pub const TRIES: u8 = {tries};")?;
    writeln!(f, "/// High time of the peer notification pin pulse in milliseconds.")?;
    writeln!(f, "pub const PULSE_MS: u32 = {pulse_ms};")?;
    writeln!(f, "/// Period of the alarm comparison tick in milliseconds.")?;
    writeln!(f, "pub const TICK_MS: u64 = {tick_ms};")?;
    writeln!(f, "/// Baud rate of the operator line.")?;
    writeln!(f, "pub const UART_BAUD: u32 = {uart_baud};")?;
    writeln!(f, "/// Clock frequency of the peer link.")?;
    writeln!(f, "pub const SPI_FREQ_HZ: u32 = {spi_freq_hz};")?;
    Ok(())
}

/// Handle the `memory.x` linker script
fn memory_x() {
    println!("in memory_x");
    // Put `memory.x` in our output directory and ensure it's
    // on the linker search path.
    let out = &PathBuf::from(env::var_os("OUT_DIR").unwrap());
    File::create(out.join("memory.x"))
        .unwrap()
        .write_all(include_bytes!("memory.x"))
        .unwrap();
    println!("cargo:rustc-link-search={}", out.display());

    // By default, Cargo will re-run a build script whenever
    // any file in the project changes. By specifying `memory.x`
    // here, we ensure the build script is only re-run when
    // `memory.x` is changed.
    println!("cargo:rerun-if-changed=memory.x");

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
}

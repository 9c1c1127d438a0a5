//! CLI argument parsing

use clap::{Parser, Subcommand};
use w5x00_core::bus::{BoardInfo, SpiMode, DEFAULT_MAX_SPEED_HZ};
use w5x00_core::params::{MacAddress, ProbeParams};

/// Parse a string as a hex or decimal u32
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

/// Generate dynamic help text for the backend argument
fn backend_help() -> String {
    format!(
        "Backend to use, with options as name:key=value,... [available: {}]",
        w5x00_host::backend_names_short()
    )
}

#[derive(Parser)]
#[command(name = "w5x00")]
#[command(author, version, about = "W5x00 SPI network chip attach/detach", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short, long, global = true, default_value = "dummy", help = backend_help())]
    pub backend: String,

    #[command(flatten)]
    pub probe: ProbeArgs,

    #[command(flatten)]
    pub bus: BusArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Probe parameters handed to the driver instance
#[derive(clap::Args, Debug, Clone)]
pub struct ProbeArgs {
    /// GPIO line of the chip's interrupt output
    #[arg(long, global = true, default_value_t = w5x00_core::params::DEFAULT_PIN_INTERRUPT)]
    pub pin_interrupt: u32,

    /// GPIO line of the chip's reset input
    #[arg(long, global = true, default_value_t = w5x00_core::params::DEFAULT_PIN_RESET)]
    pub pin_reset: u32,

    /// Chip-select the chip is wired to
    #[arg(long, global = true, default_value_t = w5x00_core::params::DEFAULT_SELECT)]
    pub select: u8,

    /// MAC address of the interface (aa:bb:cc:dd:ee:ff)
    #[arg(long, global = true, default_value_t = w5x00_core::params::DEFAULT_MAC)]
    pub mac: MacAddress,
}

impl From<&ProbeArgs> for ProbeParams {
    fn from(args: &ProbeArgs) -> Self {
        Self {
            interrupt_pin: args.pin_interrupt,
            reset_pin: args.pin_reset,
            chip_select: args.select,
            mac: args.mac,
        }
    }
}

/// SPI registration parameters
#[derive(clap::Args, Debug, Clone)]
pub struct BusArgs {
    /// SPI bus number
    #[arg(long, global = true, default_value_t = 0)]
    pub bus: u16,

    /// Maximum SPI clock in Hz (decimal or 0x-prefixed hex)
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_SPEED_HZ, value_parser = parse_hex_u32)]
    pub speed: u32,

    /// SPI mode (0-3)
    #[arg(long, global = true, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=3))]
    pub mode: u8,
}

impl From<&BusArgs> for BoardInfo {
    fn from(args: &BusArgs) -> Self {
        Self {
            max_speed_hz: args.speed,
            bus_num: args.bus,
            mode: SpiMode::from_number(args.mode).unwrap_or_default(),
            ..BoardInfo::default()
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load the driver, attach the chip, and unload on Enter
    Attach {
        /// Unload right after attaching instead of waiting
        #[arg(long)]
        no_wait: bool,
    },

    /// Make sure the SPI device is registered, without probing
    Register,

    /// List devices on the SPI bus
    List,

    /// List available backends
    ListBackends,
}

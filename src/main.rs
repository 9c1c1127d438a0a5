//! w5x00 - attach and detach a WIZnet W5x00 on an SPI bus
//!
//! Loads the W5x00 MACRAW driver module onto a backend, which registers
//! the chip's SPI device (replacing a stale one), binds the interrupt and
//! reset pins and creates the network interface; then unloads it again.
//!
//! # Backends
//!
//! - **dummy** - everything in memory; useful for dry runs and to see how
//!   the driver reacts to failures (`dummy:fail=bind`, `dummy:stale=0`)
//! - **linux** - sysfs SPI bus, gpiocdev pins and a TAP interface

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use w5x00_host::{open_module, ModuleHandle};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    match &cli.command {
        Commands::Attach { no_wait } => {
            let mut handle = open(&cli)?;
            commands::run_attach(&mut handle, *no_wait)
        }
        Commands::Register => {
            let mut handle = open(&cli)?;
            commands::run_register(&mut handle)
        }
        Commands::List => {
            let handle = open(&cli)?;
            commands::list_devices(&handle);
            Ok(())
        }
        Commands::ListBackends => {
            commands::list_backends();
            Ok(())
        }
    }
}

/// Open the selected backend with the probe and bus arguments
fn open(cli: &Cli) -> Result<ModuleHandle, Box<dyn std::error::Error>> {
    open_module(&cli.backend, (&cli.probe).into(), (&cli.bus).into())
}

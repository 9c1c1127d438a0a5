//! Register command implementation

use super::list::print_devices;
use w5x00_host::ModuleHandle;

/// Register the SPI child only, replacing any stale one
pub fn run_register(handle: &mut ModuleHandle) -> Result<(), Box<dyn std::error::Error>> {
    let device = handle.register()?;
    println!("Registered {} on {} backend", device.name(), handle.backend());
    println!();
    print_devices(&handle.devices());
    Ok(())
}

//! List commands implementation

use w5x00_core::bus::BusDevice;
use w5x00_host::{available_backends, ModuleHandle};

/// List all backends compiled in
pub fn list_backends() {
    println!("Supported backends:");
    println!();
    for backend in available_backends() {
        if backend.aliases.is_empty() {
            println!("  {:<8} - {}", backend.name, backend.description);
        } else {
            println!(
                "  {:<8} - {} (aliases: {})",
                backend.name,
                backend.description,
                backend.aliases.join(", ")
            );
        }
    }
}

/// List the devices on the handle's SPI bus
pub fn list_devices(handle: &ModuleHandle) {
    print_devices(&handle.devices());
}

pub(crate) fn print_devices(devices: &[BusDevice]) {
    if devices.is_empty() {
        println!("No SPI devices");
        return;
    }

    println!(
        "{:<10} {:<12} {:>10} {:>5} {:>6}",
        "Device", "Driver", "Speed", "Bits", "Mode"
    );
    println!("{}", "-".repeat(47));

    for dev in devices {
        println!(
            "{:<10} {:<12} {:>10} {:>5} {:>6}",
            dev.name,
            dev.modalias,
            format_speed(dev.max_speed_hz),
            dev.bits_per_word,
            format!("0x{:02X}", dev.mode.bits())
        );
    }
}

fn format_speed(hz: u32) -> String {
    if hz == 0 {
        "-".to_string()
    } else if hz >= 1_000_000 && hz % 1_000_000 == 0 {
        format!("{} MHz", hz / 1_000_000)
    } else {
        format!("{} kHz", hz / 1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_speed() {
        assert_eq!(format_speed(0), "-");
        assert_eq!(format_speed(26_000_000), "26 MHz");
        assert_eq!(format_speed(1_500_000), "1500 kHz");
    }
}

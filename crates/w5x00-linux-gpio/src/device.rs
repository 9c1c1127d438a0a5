//! gpiocdev-backed pin resolver
//!
//! Checks that the W5x00's interrupt and reset lines exist on the GPIO chip
//! and are free, and maps the interrupt line to an IRQ number.

use crate::error::{LinuxGpioError, Result};

use gpiocdev::chip::Chip;
use gpiocdev::line::Offset;

use w5x00_core::error::{Error as CoreError, Result as CoreResult};
use w5x00_core::resource::{IrqNumber, PinBinding, PinResolver};

/// Configuration for opening a GPIO chip
#[derive(Debug, Clone, Default)]
pub struct LinuxGpioConfig {
    /// Device path (e.g., "/dev/gpiochip0")
    pub device: String,
    /// IRQ number of line 0 in the chip's interrupt domain
    pub irq_base: u32,
}

impl LinuxGpioConfig {
    /// Create a new configuration with the given device path
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            ..Default::default()
        }
    }

    /// Set the IRQ base
    pub fn with_irq_base(mut self, irq_base: u32) -> Self {
        self.irq_base = irq_base;
        self
    }
}

/// IRQ number for line `offset` in a domain starting at `irq_base`
pub fn irq_number(irq_base: u32, offset: Offset) -> Result<IrqNumber> {
    irq_base
        .checked_add(offset)
        .map(IrqNumber)
        .ok_or(LinuxGpioError::IrqOverflow { offset, irq_base })
}

/// Pin resolver on one GPIO character device
pub struct GpioPins {
    chip: Chip,
    device: String,
    num_lines: u32,
    irq_base: u32,
}

impl GpioPins {
    /// Open the GPIO chip named in `config`
    pub fn open(config: &LinuxGpioConfig) -> Result<Self> {
        if config.device.is_empty() {
            return Err(LinuxGpioError::NoDevice);
        }

        log::debug!("linux_gpio: Opening device {}", config.device);

        let chip = Chip::from_path(&config.device).map_err(|e| LinuxGpioError::ChipOpenFailed {
            path: config.device.clone(),
            source: e,
        })?;
        let info = chip.info().map_err(|e| LinuxGpioError::ChipOpenFailed {
            path: config.device.clone(),
            source: e,
        })?;

        log::info!(
            "linux_gpio: Opened {} ({}, {} lines, irq base {})",
            config.device,
            info.label,
            info.num_lines,
            config.irq_base
        );

        Ok(Self {
            chip,
            device: config.device.clone(),
            num_lines: info.num_lines,
            irq_base: config.irq_base,
        })
    }

    /// Device path of the chip
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Number of lines on the chip
    pub fn num_lines(&self) -> u32 {
        self.num_lines
    }

    fn line_free(&self, offset: Offset) -> Result<()> {
        if offset >= self.num_lines {
            return Err(LinuxGpioError::LineOutOfRange {
                offset,
                num_lines: self.num_lines,
            });
        }

        let info = self
            .chip
            .line_info(offset)
            .map_err(|e| LinuxGpioError::LineInfoFailed { offset, source: e })?;
        if info.used {
            return Err(LinuxGpioError::LineBusy {
                offset,
                consumer: info.consumer,
            });
        }
        Ok(())
    }
}

impl PinResolver for GpioPins {
    fn check_line(&mut self, pin: u32) -> CoreResult<()> {
        self.line_free(pin).map_err(|e| {
            log::error!("linux_gpio: {}", e);
            CoreError::ResourceUnavailable { pin }
        })
    }

    fn irq_for_pin(&mut self, pin: u32) -> CoreResult<IrqNumber> {
        let irq = irq_number(self.irq_base, pin).map_err(|e| {
            log::error!("linux_gpio: {}", e);
            CoreError::ResourceUnavailable { pin }
        })?;
        log::debug!("linux_gpio: line {} -> irq {}", pin, irq);
        Ok(irq)
    }

    fn release(&mut self, binding: &PinBinding) -> CoreResult<()> {
        log::debug!(
            "linux_gpio: released lines {} and {} on {}",
            binding.interrupt_pin(),
            binding.reset_pin(),
            self.device
        );
        Ok(())
    }
}

/// Parse resolver options from a list of key-value pairs
///
/// # Supported Options
///
/// - `dev=/dev/gpiochip0` - GPIO chip device path
/// - `gpiochip=0` - GPIO chip number (alternative to dev, default 0)
/// - `irqbase=0` - IRQ number of line 0
pub fn parse_options(options: &[(&str, &str)]) -> std::result::Result<LinuxGpioConfig, String> {
    let mut config = LinuxGpioConfig::default();
    let mut gpiochip: Option<u32> = None;

    for (key, value) in options {
        match *key {
            "dev" => {
                config.device = value.to_string();
            }
            "gpiochip" => {
                gpiochip = Some(
                    value
                        .parse()
                        .map_err(|_| format!("Invalid gpiochip value: {}", value))?,
                );
            }
            "irqbase" => {
                config.irq_base = value
                    .parse()
                    .map_err(|_| format!("Invalid irqbase value: {}", value))?;
            }
            _ => {
                log::warn!("linux_gpio: Unknown option: {}={}", key, value);
            }
        }
    }

    if config.device.is_empty() {
        config.device = format!("/dev/gpiochip{}", gpiochip.unwrap_or(0));
    } else if gpiochip.is_some() {
        return Err("Specify either 'dev' or 'gpiochip', not both".to_string());
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options_defaults() {
        let config = parse_options(&[]).unwrap();
        assert_eq!(config.device, "/dev/gpiochip0");
        assert_eq!(config.irq_base, 0);
    }

    #[test]
    fn test_parse_options_gpiochip() {
        let config = parse_options(&[("gpiochip", "2"), ("irqbase", "160")]).unwrap();
        assert_eq!(config.device, "/dev/gpiochip2");
        assert_eq!(config.irq_base, 160);
    }

    #[test]
    fn test_parse_options_conflict() {
        assert!(parse_options(&[("dev", "/dev/gpiochip1"), ("gpiochip", "1")]).is_err());
        assert!(parse_options(&[("irqbase", "x")]).is_err());
    }

    #[test]
    fn test_irq_number() {
        assert_eq!(irq_number(160, 17).unwrap(), IrqNumber(177));
        assert!(matches!(
            irq_number(u32::MAX, 1),
            Err(LinuxGpioError::IrqOverflow { offset: 1, .. })
        ));
    }

    #[test]
    fn test_open_without_device() {
        assert!(matches!(
            GpioPins::open(&LinuxGpioConfig::default()),
            Err(LinuxGpioError::NoDevice)
        ));
    }
}

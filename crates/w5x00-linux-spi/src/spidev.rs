//! spidev character device access
//!
//! Used for two things: applying a registration template's mode, word size
//! and clock to a freshly bound device, and reading them back for bus
//! snapshots. [`SpidevChip`] also uses it to bring the chip's SPI link up.

use crate::error::{LinuxSpiError, Result};

use w5x00_core::bus::SpiMode;
use w5x00_core::chip::{ChipConfig, ChipDriver};
use w5x00_core::error::{Error as CoreError, Result as CoreResult};

use std::fs::{File, OpenOptions};
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

/// Linux spidev ioctl constants
mod ioctl {
    use nix::ioctl_read;
    use nix::ioctl_write_ptr;

    // SPI ioctl magic number
    const SPI_IOC_MAGIC: u8 = b'k';

    const SPI_IOC_TYPE_MODE: u8 = 1;
    const SPI_IOC_TYPE_BITS_PER_WORD: u8 = 3;
    const SPI_IOC_TYPE_MAX_SPEED_HZ: u8 = 4;

    ioctl_read!(spi_ioc_rd_mode, SPI_IOC_MAGIC, SPI_IOC_TYPE_MODE, u8);
    ioctl_write_ptr!(spi_ioc_wr_mode, SPI_IOC_MAGIC, SPI_IOC_TYPE_MODE, u8);
    ioctl_read!(
        spi_ioc_rd_bits_per_word,
        SPI_IOC_MAGIC,
        SPI_IOC_TYPE_BITS_PER_WORD,
        u8
    );
    ioctl_write_ptr!(
        spi_ioc_wr_bits_per_word,
        SPI_IOC_MAGIC,
        SPI_IOC_TYPE_BITS_PER_WORD,
        u8
    );
    ioctl_read!(
        spi_ioc_rd_max_speed_hz,
        SPI_IOC_MAGIC,
        SPI_IOC_TYPE_MAX_SPEED_HZ,
        u32
    );
    ioctl_write_ptr!(
        spi_ioc_wr_max_speed_hz,
        SPI_IOC_MAGIC,
        SPI_IOC_TYPE_MAX_SPEED_HZ,
        u32
    );
}

/// Link settings of a spidev node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpidevSettings {
    /// SPI mode
    pub mode: SpiMode,
    /// Word size in bits
    pub bits_per_word: u8,
    /// Maximum clock in Hz
    pub speed_hz: u32,
}

/// Path of the spidev node for `bus.cs` under `dev_root`
pub fn spidev_path(dev_root: &Path, bus_num: u16, chip_select: u8) -> PathBuf {
    dev_root.join(format!("spidev{}.{}", bus_num, chip_select))
}

fn open(path: &Path) -> Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(|e| LinuxSpiError::OpenFailed {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Apply `settings` to an open spidev file
fn write_settings(file: &File, settings: &SpidevSettings) -> Result<()> {
    let fd = file.as_raw_fd();

    // spidev's 8-bit mode ioctl covers CPHA..READY
    let mode = settings.mode.bits() as u8;
    unsafe {
        ioctl::spi_ioc_wr_mode(fd, &mode).map_err(|e| LinuxSpiError::SetModeFailed {
            mode,
            source: std::io::Error::from_raw_os_error(e as i32),
        })?;
    }

    let bits = settings.bits_per_word;
    unsafe {
        ioctl::spi_ioc_wr_bits_per_word(fd, &bits).map_err(|e| {
            LinuxSpiError::SetBitsPerWordFailed {
                bits,
                source: std::io::Error::from_raw_os_error(e as i32),
            }
        })?;
    }

    let speed = settings.speed_hz;
    unsafe {
        ioctl::spi_ioc_wr_max_speed_hz(fd, &speed).map_err(|e| {
            LinuxSpiError::SetSpeedFailed {
                speed,
                source: std::io::Error::from_raw_os_error(e as i32),
            }
        })?;
    }

    Ok(())
}

/// Open the node at `path` and apply `settings`
pub fn configure(path: &Path, settings: &SpidevSettings) -> Result<()> {
    let file = open(path)?;
    write_settings(&file, settings)?;
    log::debug!(
        "linux_spi: {} set to mode={}, {} bits, {} kHz",
        path.display(),
        settings.mode.number(),
        settings.bits_per_word,
        settings.speed_hz / 1000
    );
    Ok(())
}

/// Read the current settings of the node at `path`
pub fn read_settings(path: &Path) -> Result<SpidevSettings> {
    let file = open(path)?;
    let fd = file.as_raw_fd();

    let mut mode: u8 = 0;
    let mut bits: u8 = 0;
    let mut speed: u32 = 0;
    // Read failures leave the field at 0, which snapshots show as unknown
    unsafe {
        let _ = ioctl::spi_ioc_rd_mode(fd, &mut mode);
        let _ = ioctl::spi_ioc_rd_bits_per_word(fd, &mut bits);
        let _ = ioctl::spi_ioc_rd_max_speed_hz(fd, &mut speed);
    }

    Ok(SpidevSettings {
        mode: SpiMode::from_bits_truncate(mode as u16),
        bits_per_word: bits,
        speed_hz: speed,
    })
}

/// Chip backend that brings the W5x00's SPI link up through spidev
///
/// Register-level setup is left to whatever drives the chip afterwards;
/// this only holds the link open and configured while the driver is bound.
pub struct SpidevChip {
    dev_root: PathBuf,
    bus_num: u16,
    settings: SpidevSettings,
    file: Option<File>,
}

impl SpidevChip {
    /// Chip on bus `bus_num` whose nodes live under `dev_root`
    pub fn new(dev_root: impl Into<PathBuf>, bus_num: u16, settings: SpidevSettings) -> Self {
        Self {
            dev_root: dev_root.into(),
            bus_num,
            settings,
            file: None,
        }
    }

    /// Whether the link is open
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }
}

impl ChipDriver for SpidevChip {
    fn init(&mut self, config: &ChipConfig<'_>) -> CoreResult<()> {
        let path = spidev_path(&self.dev_root, self.bus_num, config.chip_select);
        let file = open(&path).map_err(|e| {
            log::error!("linux_spi: {}", e);
            CoreError::DeviceInitFailed
        })?;
        write_settings(&file, &self.settings).map_err(|e| {
            log::error!("linux_spi: {}", e);
            CoreError::DeviceInitFailed
        })?;

        log::info!(
            "linux_spi: Opened {} (mode={}, speed={} kHz, irq {})",
            path.display(),
            self.settings.mode.number(),
            self.settings.speed_hz / 1000,
            config.binding.irq()
        );
        self.file = Some(file);
        Ok(())
    }

    fn exit(&mut self) -> CoreResult<()> {
        if self.file.take().is_some() {
            log::debug!("linux_spi: closed spidev{}", self.bus_num);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spidev_path() {
        assert_eq!(
            spidev_path(Path::new("/dev"), 1, 0),
            PathBuf::from("/dev/spidev1.0")
        );
    }

    #[test]
    fn test_chip_init_fails_without_node() {
        use w5x00_core::params::MacAddress;

        let dir = std::env::temp_dir().join(format!("w5x00-spidev-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let binding = {
            let mut binder = w5x00_core::resource::ResourceBinder::new(NoPins);
            binder.bind(17, 27).unwrap().clone()
        };
        let mut chip = SpidevChip::new(
            &dir,
            0,
            SpidevSettings {
                mode: SpiMode::MODE_0,
                bits_per_word: 8,
                speed_hz: 26_000_000,
            },
        );
        let config = ChipConfig {
            chip_select: 0,
            binding: &binding,
            mac: MacAddress([0, 8, 0xdc, 1, 2, 3]),
        };

        assert_eq!(chip.init(&config), Err(CoreError::DeviceInitFailed));
        assert!(!chip.is_open());
        assert_eq!(chip.exit(), Ok(()));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    struct NoPins;

    impl w5x00_core::resource::PinResolver for NoPins {
        fn check_line(&mut self, _pin: u32) -> CoreResult<()> {
            Ok(())
        }

        fn irq_for_pin(&mut self, pin: u32) -> CoreResult<w5x00_core::resource::IrqNumber> {
            Ok(w5x00_core::resource::IrqNumber(pin))
        }
    }
}

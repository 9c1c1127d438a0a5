//! SPI bus data types

use alloc::format;
use alloc::string::{String, ToString};
use bitflags::bitflags;

/// Default maximum SPI clock for the chip (26 MHz)
pub const DEFAULT_MAX_SPEED_HZ: u32 = 26_000_000;

bitflags! {
    /// SPI mode bits, laid out like the kernel's `spi_device.mode`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SpiMode: u16 {
        /// Clock phase
        const CPHA      = 1 << 0;
        /// Clock polarity
        const CPOL      = 1 << 1;
        /// Chip-select active high
        const CS_HIGH   = 1 << 2;
        /// Least significant bit first
        const LSB_FIRST = 1 << 3;
        /// Shared SI/SO signal
        const THREE_WIRE = 1 << 4;
        /// Loopback mode
        const LOOP      = 1 << 5;
        /// No chip-select line
        const NO_CS     = 1 << 6;

        /// CPOL=0, CPHA=0
        const MODE_0 = 0;
        /// CPOL=0, CPHA=1
        const MODE_1 = Self::CPHA.bits();
        /// CPOL=1, CPHA=0
        const MODE_2 = Self::CPOL.bits();
        /// CPOL=1, CPHA=1
        const MODE_3 = Self::CPOL.bits() | Self::CPHA.bits();
    }
}

impl Default for SpiMode {
    fn default() -> Self {
        SpiMode::MODE_0
    }
}

impl SpiMode {
    /// Build a mode from the classic 0-3 mode number
    pub fn from_number(mode: u8) -> Option<Self> {
        match mode {
            0 => Some(Self::MODE_0),
            1 => Some(Self::MODE_1),
            2 => Some(Self::MODE_2),
            3 => Some(Self::MODE_3),
            _ => None,
        }
    }

    /// The 0-3 mode number (CPOL/CPHA bits only)
    pub fn number(&self) -> u8 {
        (self.bits() & Self::MODE_3.bits()) as u8
    }
}

/// Template for a bus child registration
///
/// Mirrors the board-info record a bus framework uses to instantiate a
/// device: which driver should bind, how fast the clock may run, where
/// the device sits and how it is clocked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardInfo {
    /// Driver tag the bus matches against
    pub modalias: String,
    /// Maximum SPI clock in Hz
    pub max_speed_hz: u32,
    /// Chip-select on the controller
    pub chip_select: u8,
    /// Bus (controller) number
    pub bus_num: u16,
    /// SPI mode
    pub mode: SpiMode,
    /// Word size in bits
    pub bits_per_word: u8,
}

impl Default for BoardInfo {
    fn default() -> Self {
        Self {
            modalias: crate::DRV_NAME.to_string(),
            max_speed_hz: DEFAULT_MAX_SPEED_HZ,
            chip_select: 0,
            bus_num: 0,
            mode: SpiMode::MODE_0,
            bits_per_word: 8,
        }
    }
}

/// Snapshot of one device on the bus, as shown in enumeration logs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusDevice {
    /// Device name (`<controller>.<chip-select>`)
    pub name: String,
    /// Driver tag of the device
    pub modalias: String,
    /// Maximum SPI clock in Hz (0 if unknown)
    pub max_speed_hz: u32,
    /// Word size in bits (0 if unknown)
    pub bits_per_word: u8,
    /// SPI mode
    pub mode: SpiMode,
}

impl BusDevice {
    /// Snapshot of a device created from `info` under `controller`
    pub fn from_board_info(controller: &str, info: &BoardInfo) -> Self {
        Self {
            name: device_name(controller, info.chip_select),
            modalias: info.modalias.clone(),
            max_speed_hz: info.max_speed_hz,
            bits_per_word: info.bits_per_word,
            mode: info.mode,
        }
    }
}

/// Non-owning reference to a registered bus child
///
/// Holding one says nothing about whether the device still exists; ask
/// the bus with [`super::SpiBus::find_device`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BusDeviceRef {
    name: String,
}

impl BusDeviceRef {
    /// Create a reference to the device called `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Device name
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The bus child a probe or remove call is about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpiChild {
    /// Which registered device this is
    pub device: BusDeviceRef,
    /// Chip-select as reported by the bus
    pub chip_select: u8,
}

/// Name of the device at `chip_select` on `controller`, e.g. `spi0.1`
pub fn device_name(controller: &str, chip_select: u8) -> String {
    format!("{}.{}", controller, chip_select)
}

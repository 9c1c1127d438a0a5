//! Error types for Linux SPI operations

use std::path::PathBuf;
use thiserror::Error;

/// Linux SPI specific errors
#[derive(Debug, Error)]
pub enum LinuxSpiError {
    /// Failed to read a sysfs attribute
    #[error("Failed to read {}: {source}", path.display())]
    SysfsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a sysfs attribute
    #[error("Failed to write {}: {source}", path.display())]
    SysfsWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The SPI slot does not exist (not declared in the device tree)
    #[error("SPI device {0} does not exist; declare it in the device tree")]
    NoSuchDevice(String),

    /// The kernel driver to bind to is not loaded
    #[error("Kernel SPI driver '{0}' is not loaded")]
    DriverMissing(String),

    /// Failed to open device
    #[error("Failed to open {}: {source}", path.display())]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to set SPI mode
    #[error("Failed to set SPI mode to {mode}: {source}")]
    SetModeFailed {
        mode: u8,
        #[source]
        source: std::io::Error,
    },

    /// Failed to set bits per word
    #[error("Failed to set bits per word to {bits}: {source}")]
    SetBitsPerWordFailed {
        bits: u8,
        #[source]
        source: std::io::Error,
    },

    /// Failed to set clock speed
    #[error("Failed to set clock speed to {speed} Hz: {source}")]
    SetSpeedFailed {
        speed: u32,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for Linux SPI operations
pub type Result<T> = std::result::Result<T, LinuxSpiError>;

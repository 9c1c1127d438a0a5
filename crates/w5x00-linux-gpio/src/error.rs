//! Error types for Linux GPIO operations

use thiserror::Error;

/// Linux GPIO specific errors
#[derive(Debug, Error)]
pub enum LinuxGpioError {
    /// Failed to open GPIO chip
    #[error("Failed to open GPIO chip '{path}': {source}")]
    ChipOpenFailed {
        path: String,
        #[source]
        source: gpiocdev::Error,
    },

    /// Failed to query a GPIO line
    #[error("Failed to query GPIO line {offset}: {source}")]
    LineInfoFailed {
        offset: u32,
        #[source]
        source: gpiocdev::Error,
    },

    /// Line offset beyond the chip
    #[error("GPIO line {offset} out of range (chip has {num_lines} lines)")]
    LineOutOfRange { offset: u32, num_lines: u32 },

    /// Line held by another consumer
    #[error("GPIO line {offset} is in use by '{consumer}'")]
    LineBusy { offset: u32, consumer: String },

    /// IRQ number does not fit
    #[error("IRQ for GPIO line {offset} overflows (base {irq_base})")]
    IrqOverflow { offset: u32, irq_base: u32 },

    /// GPIO chip or device not specified
    #[error("No GPIO chip specified. Use dev=/dev/gpiochipN or gpiochip=N")]
    NoDevice,
}

/// Result type for Linux GPIO operations
pub type Result<T> = std::result::Result<T, LinuxGpioError>;

//! Probe parameters
//!
//! The values the driver is configured with before attach: which pins the
//! chip's INT and RST lines are wired to, which chip-select it sits on and
//! the MAC address the network interface should use. They are validated
//! by whoever builds them (the CLI, or a test) and treated as fixed by the
//! lifecycle.

use core::fmt;
use core::str::FromStr;

/// Default GPIO offset of the chip's INTn line
pub const DEFAULT_PIN_INTERRUPT: u32 = 17;
/// Default GPIO offset of the chip's RSTn line
pub const DEFAULT_PIN_RESET: u32 = 27;
/// Default SPI chip-select
pub const DEFAULT_SELECT: u8 = 0;
/// Default MAC address (WIZnet OUI)
pub const DEFAULT_MAC: MacAddress = MacAddress([0x00, 0x08, 0xDC, 0x01, 0x02, 0x03]);

/// A 6-byte Ethernet hardware address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    /// Raw octets
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// True for group (multicast/broadcast) addresses, which a NIC must not own
    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            m[0], m[1], m[2], m[3], m[4], m[5]
        )
    }
}

/// Error returned when a MAC address string cannot be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacParseError {
    /// Not exactly six octets
    WrongLength,
    /// An octet is not one or two hex digits
    InvalidOctet,
}

impl fmt::Display for MacParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongLength => write!(f, "MAC address must have exactly 6 octets"),
            Self::InvalidOctet => write!(f, "MAC address octets must be hex bytes"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MacParseError {}

impl FromStr for MacAddress {
    type Err = MacParseError;

    /// Parse `aa:bb:cc:dd:ee:ff` (dashes are accepted as separators too)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let sep = if s.contains('-') { '-' } else { ':' };
        let mut mac = [0u8; 6];
        let mut count = 0;

        for part in s.split(sep) {
            if count == mac.len() {
                return Err(MacParseError::WrongLength);
            }
            if part.is_empty() || part.len() > 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(MacParseError::InvalidOctet);
            }
            mac[count] = u8::from_str_radix(part, 16).map_err(|_| MacParseError::InvalidOctet)?;
            count += 1;
        }

        if count != mac.len() {
            return Err(MacParseError::WrongLength);
        }
        Ok(MacAddress(mac))
    }
}

/// Configured parameters handed to probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeParams {
    /// GPIO offset of the interrupt line
    pub interrupt_pin: u32,
    /// GPIO offset of the reset line
    pub reset_pin: u32,
    /// Chip-select the driver binds to
    pub chip_select: u8,
    /// MAC address for the network interface
    pub mac: MacAddress,
}

impl Default for ProbeParams {
    fn default() -> Self {
        Self {
            interrupt_pin: DEFAULT_PIN_INTERRUPT,
            reset_pin: DEFAULT_PIN_RESET,
            chip_select: DEFAULT_SELECT,
            mac: DEFAULT_MAC,
        }
    }
}

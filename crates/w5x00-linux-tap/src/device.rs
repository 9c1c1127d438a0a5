//! TAP interface creation through `/dev/net/tun`

use crate::error::{Result, TapError};

use w5x00_core::error::{Error as CoreError, Result as CoreResult};
use w5x00_core::netif::{NetInterface, NetifProvider};
use w5x00_core::params::MacAddress;
use w5x00_core::resource::IrqNumber;

use std::fs::{File, OpenOptions};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::path::PathBuf;

/// Kernel interface name size, including the terminating NUL
const IFNAMSIZ: usize = 16;

/// Default interface name pattern; the kernel fills in `%d`
pub const DEFAULT_NAME_PATTERN: &str = "w5x%d";

/// Hardware type for Ethernet addresses
const ARPHRD_ETHER: u16 = 1;

/// Network interface ioctls
mod ioctl {
    use super::IfReq;
    use nix::{ioctl_read_bad, ioctl_readwrite_bad, ioctl_write_ptr_bad, request_code_write};

    // TUNSETIFF is declared as _IOW('T', 202, int) but takes a struct ifreq
    // and writes the allocated name back into it
    ioctl_readwrite_bad!(
        tunsetiff,
        request_code_write!(b'T', 202, std::mem::size_of::<libc::c_int>()),
        IfReq
    );
    ioctl_write_ptr_bad!(siocsifhwaddr, libc::SIOCSIFHWADDR, IfReq);
    ioctl_read_bad!(siocgifflags, libc::SIOCGIFFLAGS, IfReq);
    ioctl_write_ptr_bad!(siocsifflags, libc::SIOCSIFFLAGS, IfReq);
}

/// `struct ifreq`: interface name followed by a 24-byte request union
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IfReq {
    name: [u8; IFNAMSIZ],
    data: [u8; 24],
}

impl IfReq {
    /// Request for interface `name`
    pub fn with_name(name: &str) -> Result<Self> {
        let bytes = name.as_bytes();
        if bytes.len() >= IFNAMSIZ || bytes.contains(&0) {
            return Err(TapError::NameTooLong(name.to_string()));
        }
        let mut req = Self {
            name: [0; IFNAMSIZ],
            data: [0; 24],
        };
        req.name[..bytes.len()].copy_from_slice(bytes);
        Ok(req)
    }

    /// Interface name, up to the first NUL
    pub fn name(&self) -> String {
        let len = self.name.iter().position(|&b| b == 0).unwrap_or(IFNAMSIZ);
        String::from_utf8_lossy(&self.name[..len]).into_owned()
    }

    /// `ifr_flags`
    pub fn flags(&self) -> i16 {
        i16::from_ne_bytes([self.data[0], self.data[1]])
    }

    /// Set `ifr_flags`
    pub fn set_flags(&mut self, flags: i16) {
        self.data[..2].copy_from_slice(&flags.to_ne_bytes());
    }

    /// Set `ifr_hwaddr` to an Ethernet address
    pub fn set_hwaddr(&mut self, mac: MacAddress) {
        self.data[..2].copy_from_slice(&ARPHRD_ETHER.to_ne_bytes());
        self.data[2..8].copy_from_slice(&mac.octets());
    }

    /// Ethernet address held in `ifr_hwaddr`
    pub fn hwaddr(&self) -> MacAddress {
        let mut octets = [0u8; 6];
        octets.copy_from_slice(&self.data[2..8]);
        MacAddress(octets)
    }
}

/// Configuration for TAP interfaces
#[derive(Debug, Clone)]
pub struct TapConfig {
    /// tun clone device (default: `/dev/net/tun`)
    pub clone_device: PathBuf,
    /// Interface name or pattern (default: `w5x%d`)
    pub name_pattern: String,
    /// Bring the interface up after creating it
    pub bring_up: bool,
}

impl Default for TapConfig {
    fn default() -> Self {
        Self {
            clone_device: PathBuf::from("/dev/net/tun"),
            name_pattern: DEFAULT_NAME_PATTERN.to_string(),
            bring_up: true,
        }
    }
}

/// A live TAP interface; dropping it removes the interface
#[derive(Debug)]
pub struct TapInterface {
    file: File,
    name: String,
    mac: MacAddress,
    irq: IrqNumber,
}

impl TapInterface {
    /// MAC address the interface was created with
    pub fn mac(&self) -> MacAddress {
        self.mac
    }

    /// Interrupt number the interface is tied to
    pub fn irq(&self) -> IrqNumber {
        self.irq
    }

    /// Raw descriptor of the TAP device
    pub fn as_raw_fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }
}

impl NetInterface for TapInterface {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Network interface provider creating Linux TAP devices
pub struct TapProvider {
    config: TapConfig,
}

impl TapProvider {
    /// Create a provider
    pub fn new(config: TapConfig) -> Self {
        Self { config }
    }

    /// The configuration
    pub fn config(&self) -> &TapConfig {
        &self.config
    }

    fn open(&self, mac: MacAddress, irq: IrqNumber) -> Result<TapInterface> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.config.clone_device)
            .map_err(|e| TapError::OpenFailed {
                path: self.config.clone_device.clone(),
                source: e,
            })?;

        let mut req = IfReq::with_name(&self.config.name_pattern)?;
        req.set_flags((libc::IFF_TAP | libc::IFF_NO_PI) as i16);
        unsafe {
            ioctl::tunsetiff(file.as_raw_fd(), &mut req).map_err(|e| TapError::Ioctl {
                op: "TUNSETIFF",
                ifname: self.config.name_pattern.clone(),
                source: std::io::Error::from_raw_os_error(e as i32),
            })?;
        }
        // The kernel writes the final name back
        let name = req.name();

        let sock = control_socket()?;

        let mut hw = IfReq::with_name(&name)?;
        hw.set_hwaddr(mac);
        unsafe {
            ioctl::siocsifhwaddr(sock.as_raw_fd(), &hw).map_err(|e| TapError::Ioctl {
                op: "SIOCSIFHWADDR",
                ifname: name.clone(),
                source: std::io::Error::from_raw_os_error(e as i32),
            })?;
        }

        if self.config.bring_up {
            let mut flags = IfReq::with_name(&name)?;
            unsafe {
                ioctl::siocgifflags(sock.as_raw_fd(), &mut flags).map_err(|e| TapError::Ioctl {
                    op: "SIOCGIFFLAGS",
                    ifname: name.clone(),
                    source: std::io::Error::from_raw_os_error(e as i32),
                })?;
            }
            flags.set_flags(flags.flags() | libc::IFF_UP as i16);
            unsafe {
                ioctl::siocsifflags(sock.as_raw_fd(), &flags).map_err(|e| TapError::Ioctl {
                    op: "SIOCSIFFLAGS",
                    ifname: name.clone(),
                    source: std::io::Error::from_raw_os_error(e as i32),
                })?;
            }
        }

        Ok(TapInterface {
            file,
            name,
            mac,
            irq,
        })
    }
}

fn control_socket() -> Result<OwnedFd> {
    let fd = unsafe { libc::socket(libc::AF_INET, libc::SOCK_DGRAM | libc::SOCK_CLOEXEC, 0) };
    if fd < 0 {
        return Err(TapError::SocketFailed(std::io::Error::last_os_error()));
    }
    // SAFETY: fd was just returned by socket() and is owned by nobody else
    Ok(unsafe { OwnedFd::from_raw_fd(fd) })
}

impl NetifProvider for TapProvider {
    type Handle = TapInterface;

    fn create(&mut self, mac: MacAddress, irq: IrqNumber) -> CoreResult<TapInterface> {
        let iface = self.open(mac, irq).map_err(|e| {
            log::error!("linux_tap: {}", e);
            CoreError::InterfaceCreateFailed
        })?;
        log::info!(
            "linux_tap: Created {} (mac {}, irq {})",
            iface.name,
            iface.mac,
            iface.irq
        );
        Ok(iface)
    }

    fn destroy(&mut self, handle: TapInterface) -> CoreResult<()> {
        log::info!("linux_tap: Removing {}", handle.name);
        drop(handle);
        Ok(())
    }
}

/// Parse provider options from a list of key-value pairs
///
/// # Supported Options
///
/// - `tun=/dev/net/tun` - tun clone device
/// - `ifname=w5x%d` - interface name or pattern
/// - `up=1` - bring the interface up (0 to leave it down)
pub fn parse_options(options: &[(&str, &str)]) -> std::result::Result<TapConfig, String> {
    let mut config = TapConfig::default();

    for (key, value) in options {
        match *key {
            "tun" => config.clone_device = PathBuf::from(value),
            "ifname" => {
                IfReq::with_name(value).map_err(|e| e.to_string())?;
                config.name_pattern = value.to_string();
            }
            "up" => {
                config.bring_up = match *value {
                    "1" | "yes" | "true" => true,
                    "0" | "no" | "false" => false,
                    _ => return Err(format!("Invalid up value: {}", value)),
                };
            }
            _ => {
                log::warn!("linux_tap: Unknown option: {}={}", key, value);
            }
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ifreq_layout() {
        assert_eq!(std::mem::size_of::<IfReq>(), 40);
    }

    #[test]
    fn test_ifreq_name() {
        let req = IfReq::with_name("w5x%d").unwrap();
        assert_eq!(req.name(), "w5x%d");
        assert!(IfReq::with_name("a-very-long-ifname").is_err());
        assert!(IfReq::with_name("fifteen-chars-x").is_ok());
    }

    #[test]
    fn test_ifreq_name_written_back() {
        let mut req = IfReq::with_name("w5x%d").unwrap();
        req.set_flags((libc::IFF_TAP | libc::IFF_NO_PI) as i16);
        // What TUNSETIFF leaves behind after allocating the name
        req.name[..5].copy_from_slice(b"w5x0\0");
        assert_eq!(req.name(), "w5x0");
        assert_eq!(req.flags(), (libc::IFF_TAP | libc::IFF_NO_PI) as i16);
    }

    #[test]
    fn test_ifreq_hwaddr() {
        let mac: MacAddress = "de:ad:be:ef:00:01".parse().unwrap();
        let mut req = IfReq::with_name("w5x0").unwrap();
        req.set_hwaddr(mac);
        assert_eq!(req.hwaddr(), mac);
        assert_eq!(req.flags() as u16, ARPHRD_ETHER);
    }

    #[test]
    fn test_parse_options() {
        let config = parse_options(&[("ifname", "eth9"), ("up", "0")]).unwrap();
        assert_eq!(config.name_pattern, "eth9");
        assert!(!config.bring_up);
        assert_eq!(config.clone_device, PathBuf::from("/dev/net/tun"));
        assert!(parse_options(&[("up", "maybe")]).is_err());
        assert!(parse_options(&[("ifname", "much-too-long-name")]).is_err());
    }

    #[test]
    fn test_create_without_clone_device() {
        let mut provider = TapProvider::new(TapConfig {
            clone_device: PathBuf::from("/nonexistent/net/tun"),
            ..TapConfig::default()
        });
        let mac: MacAddress = "00:08:dc:01:02:03".parse().unwrap();
        assert!(matches!(
            provider.create(mac, IrqNumber(177)),
            Err(CoreError::InterfaceCreateFailed)
        ));
    }
}

//! SPI bus backed by `/sys/bus/spi`
//!
//! Userspace cannot instantiate SPI devices; the slots themselves come from
//! the device tree. What it can do is decide which kernel driver owns a
//! slot. This backend treats "a device is registered" as "the slot is
//! bound to a driver":
//!
//! - delete: unbind the slot and clear its `driver_override`
//! - create: point `driver_override` at the configured kernel driver,
//!   trigger `drivers_probe`, then apply the template's mode, word size
//!   and clock through spidev if a node appeared

use crate::error::{LinuxSpiError, Result};
use crate::spidev::{self, SpidevSettings};

use w5x00_core::bus::{device_name, BoardInfo, BusDevice, BusDeviceRef, SpiBus, SpiMode};
use w5x00_core::error::{Error as CoreError, Result as CoreResult};

use std::fs;
use std::path::{Path, PathBuf};

/// Default kernel driver the slot is bound to
const DEFAULT_BIND_DRIVER: &str = "spidev";

/// Configuration for the sysfs SPI bus
#[derive(Debug, Clone)]
pub struct LinuxSpiConfig {
    /// Root of sysfs (default: `/sys`)
    pub sysfs_root: PathBuf,
    /// Directory holding spidev nodes (default: `/dev`)
    pub dev_root: PathBuf,
    /// Kernel driver registered slots are bound to (default: `spidev`)
    pub bind_driver: String,
}

impl Default for LinuxSpiConfig {
    fn default() -> Self {
        Self {
            sysfs_root: PathBuf::from("/sys"),
            dev_root: PathBuf::from("/dev"),
            bind_driver: DEFAULT_BIND_DRIVER.to_string(),
        }
    }
}

impl LinuxSpiConfig {
    /// Set the sysfs root
    pub fn with_sysfs_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.sysfs_root = root.into();
        self
    }

    /// Set the spidev node directory
    pub fn with_dev_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.dev_root = root.into();
        self
    }

    /// Set the kernel driver to bind registered slots to
    pub fn with_bind_driver(mut self, driver: impl Into<String>) -> Self {
        self.bind_driver = driver.into();
        self
    }
}

/// SPI bus framework on top of Linux sysfs
pub struct SysfsSpiBus {
    config: LinuxSpiConfig,
    /// Slots this bus bound, released on driver unregistration
    owned: Vec<String>,
}

impl SysfsSpiBus {
    /// Create a bus over the given sysfs tree
    pub fn new(config: LinuxSpiConfig) -> Self {
        log::debug!(
            "linux_spi: using {} (bind driver {})",
            config.sysfs_root.display(),
            config.bind_driver
        );
        Self {
            config,
            owned: Vec::new(),
        }
    }

    /// The configuration
    pub fn config(&self) -> &LinuxSpiConfig {
        &self.config
    }

    fn devices_dir(&self) -> PathBuf {
        self.config.sysfs_root.join("bus/spi/devices")
    }

    fn driver_dir(&self) -> PathBuf {
        self.config
            .sysfs_root
            .join("bus/spi/drivers")
            .join(&self.config.bind_driver)
    }

    fn unbind(&self, name: &str) -> Result<()> {
        let dir = self.devices_dir().join(name);
        if !dir.is_dir() {
            return Err(LinuxSpiError::NoSuchDevice(name.to_string()));
        }

        let driver = dir.join("driver");
        if driver.exists() {
            write_attr(&driver.join("unbind"), name)?;
        }
        // An empty write clears the override
        write_attr(&dir.join("driver_override"), "\n")?;
        Ok(())
    }

    fn bind(&self, name: &str) -> Result<()> {
        let dir = self.devices_dir().join(name);
        if !dir.is_dir() {
            return Err(LinuxSpiError::NoSuchDevice(name.to_string()));
        }
        if !self.driver_dir().is_dir() {
            return Err(LinuxSpiError::DriverMissing(self.config.bind_driver.clone()));
        }

        write_attr(&dir.join("driver_override"), &self.config.bind_driver)?;
        write_attr(
            &self.config.sysfs_root.join("bus/spi/drivers_probe"),
            name,
        )?;
        Ok(())
    }

    fn snapshot(&self, name: &str) -> BusDevice {
        let dir = self.devices_dir().join(name);
        let modalias = read_attr(&dir.join("modalias"))
            .map(|m| m.trim_start_matches("spi:").to_string())
            .unwrap_or_default();

        let settings = parse_device_name(name)
            .map(|(bus, cs)| spidev::spidev_path(&self.config.dev_root, bus, cs))
            .filter(|path| path.exists())
            .and_then(|path| spidev::read_settings(&path).ok());

        BusDevice {
            name: name.to_string(),
            modalias,
            max_speed_hz: settings.map_or(0, |s| s.speed_hz),
            bits_per_word: settings.map_or(0, |s| s.bits_per_word),
            mode: settings.map_or(SpiMode::MODE_0, |s| s.mode),
        }
    }
}

impl SpiBus for SysfsSpiBus {
    fn controller(&self, bus_num: u16) -> Option<String> {
        let name = format!("spi{}", bus_num);
        self.config
            .sysfs_root
            .join("class/spi_master")
            .join(&name)
            .exists()
            .then_some(name)
    }

    fn find_device(&self, name: &str) -> Option<BusDeviceRef> {
        self.devices_dir()
            .join(name)
            .join("driver")
            .exists()
            .then(|| BusDeviceRef::new(name))
    }

    fn delete_device(&mut self, device: &BusDeviceRef) -> CoreResult<()> {
        self.unbind(device.name()).map_err(|e| {
            log::error!("linux_spi: {}", e);
            CoreError::BusError
        })?;
        self.owned.retain(|n| n != device.name());
        Ok(())
    }

    fn new_device(&mut self, controller: &str, info: &BoardInfo) -> CoreResult<BusDeviceRef> {
        let name = device_name(controller, info.chip_select);
        self.bind(&name).map_err(|e| {
            log::error!("linux_spi: {}", e);
            CoreError::BusError
        })?;
        self.owned.push(name.clone());

        let node = spidev::spidev_path(&self.config.dev_root, info.bus_num, info.chip_select);
        if node.exists() {
            let settings = SpidevSettings {
                mode: info.mode,
                bits_per_word: info.bits_per_word,
                speed_hz: info.max_speed_hz,
            };
            if let Err(e) = spidev::configure(&node, &settings) {
                log::warn!("linux_spi: {} bound but not configured: {}", name, e);
            }
        } else {
            log::debug!("linux_spi: no {} yet, settings not applied", node.display());
        }

        Ok(BusDeviceRef::new(name))
    }

    fn devices(&self) -> Vec<BusDevice> {
        let entries = match fs::read_dir(self.devices_dir()) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!(
                    "linux_spi: cannot list {}: {}",
                    self.devices_dir().display(),
                    e
                );
                return Vec::new();
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter_map(|e| e.file_name().into_string().ok())
            .collect();
        names.sort();

        names.iter().map(|name| self.snapshot(name)).collect()
    }

    fn register_driver(&mut self, driver: &str) -> CoreResult<()> {
        if !self.driver_dir().is_dir() {
            log::error!(
                "linux_spi: {}",
                LinuxSpiError::DriverMissing(self.config.bind_driver.clone())
            );
            return Err(CoreError::DriverRegisterFailed);
        }
        log::debug!(
            "linux_spi: {} served by kernel driver {}",
            driver,
            self.config.bind_driver
        );
        Ok(())
    }

    fn unregister_driver(&mut self, driver: &str) {
        for name in std::mem::take(&mut self.owned) {
            log::debug!("linux_spi: releasing {} from {}", name, driver);
            if let Err(e) = self.unbind(&name) {
                log::warn!("linux_spi: {}", e);
            }
        }
    }
}

fn read_attr(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map(|s| s.trim().to_string())
        .map_err(|e| LinuxSpiError::SysfsRead {
            path: path.to_path_buf(),
            source: e,
        })
}

fn write_attr(path: &Path, value: &str) -> Result<()> {
    fs::write(path, value).map_err(|e| LinuxSpiError::SysfsWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Split `spiB.C` into bus number and chip-select
pub fn parse_device_name(name: &str) -> Option<(u16, u8)> {
    let rest = name.strip_prefix("spi")?;
    let (bus, cs) = rest.split_once('.')?;
    Some((bus.parse().ok()?, cs.parse().ok()?))
}

/// Parse backend options from a list of key-value pairs
///
/// # Supported Options
///
/// - `sysfs=/sys` - sysfs root
/// - `spidev=/dev` - directory holding spidev nodes
/// - `driver=spidev` - kernel driver registered slots are bound to
pub fn parse_options(options: &[(&str, &str)]) -> std::result::Result<LinuxSpiConfig, String> {
    let mut config = LinuxSpiConfig::default();

    for (key, value) in options {
        match *key {
            "sysfs" => config.sysfs_root = PathBuf::from(value),
            "spidev" => config.dev_root = PathBuf::from(value),
            "driver" => {
                if value.is_empty() || value.contains('/') {
                    return Err(format!("Invalid driver value: {}", value));
                }
                config.bind_driver = value.to_string();
            }
            _ => {
                log::warn!("linux_spi: Unknown option: {}={}", key, value);
            }
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use w5x00_core::bus::BusRegistrar;

    /// Scratch sysfs tree with one master and the given slots
    struct FakeSysfs {
        root: PathBuf,
    }

    impl FakeSysfs {
        fn new(tag: &str, slots: &[&str]) -> Self {
            let root = std::env::temp_dir().join(format!(
                "w5x00-sysfs-{}-{}",
                tag,
                std::process::id()
            ));
            let _ = fs::remove_dir_all(&root);
            fs::create_dir_all(root.join("class/spi_master/spi0")).unwrap();
            fs::create_dir_all(root.join("bus/spi/drivers/spidev")).unwrap();
            fs::write(root.join("bus/spi/drivers_probe"), "").unwrap();
            for slot in slots {
                let dir = root.join("bus/spi/devices").join(slot);
                fs::create_dir_all(&dir).unwrap();
                fs::write(dir.join("modalias"), "spi:spidev\n").unwrap();
                fs::write(dir.join("driver_override"), "\n").unwrap();
            }
            Self { root }
        }

        /// Make `slot` look bound to a driver
        fn bind(&self, slot: &str) {
            let driver = self.root.join("bus/spi/devices").join(slot).join("driver");
            fs::create_dir_all(&driver).unwrap();
            fs::write(driver.join("unbind"), "").unwrap();
        }

        fn read(&self, rel: &str) -> String {
            fs::read_to_string(self.root.join(rel)).unwrap()
        }

        fn bus(&self) -> SysfsSpiBus {
            SysfsSpiBus::new(
                LinuxSpiConfig::default()
                    .with_sysfs_root(&self.root)
                    .with_dev_root(self.root.join("dev")),
            )
        }
    }

    impl Drop for FakeSysfs {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.root);
        }
    }

    #[test]
    fn test_parse_device_name() {
        assert_eq!(parse_device_name("spi0.1"), Some((0, 1)));
        assert_eq!(parse_device_name("spi10.0"), Some((10, 0)));
        assert_eq!(parse_device_name("i2c-1"), None);
        assert_eq!(parse_device_name("spi0"), None);
    }

    #[test]
    fn test_controller_lookup() {
        let sysfs = FakeSysfs::new("ctrl", &[]);
        let bus = sysfs.bus();
        assert_eq!(bus.controller(0), Some("spi0".to_string()));
        assert_eq!(bus.controller(1), None);
    }

    #[test]
    fn test_devices_snapshot() {
        let sysfs = FakeSysfs::new("snap", &["spi0.1", "spi0.0"]);
        let devices = sysfs.bus().devices();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].name, "spi0.0");
        assert_eq!(devices[0].modalias, "spidev");
        assert_eq!(devices[0].max_speed_hz, 0);
    }

    #[test]
    fn test_ensure_registered_unbinds_stale_then_binds() {
        let sysfs = FakeSysfs::new("reg", &["spi0.0"]);
        sysfs.bind("spi0.0");
        let mut bus = sysfs.bus();
        assert!(bus.find_device("spi0.0").is_some());

        let dev = BusRegistrar::new("w5x00")
            .ensure_registered(&mut bus, &BoardInfo::default())
            .unwrap();

        assert_eq!(dev.name(), "spi0.0");
        assert_eq!(sysfs.read("bus/spi/devices/spi0.0/driver/unbind"), "spi0.0");
        assert_eq!(
            sysfs.read("bus/spi/devices/spi0.0/driver_override"),
            "spidev"
        );
        assert_eq!(sysfs.read("bus/spi/drivers_probe"), "spi0.0");
    }

    #[test]
    fn test_new_device_on_missing_slot_fails() {
        let sysfs = FakeSysfs::new("missing", &["spi0.0"]);
        let mut bus = sysfs.bus();
        let info = BoardInfo {
            chip_select: 1,
            ..BoardInfo::default()
        };
        assert_eq!(bus.new_device("spi0", &info), Err(CoreError::BusError));
    }

    #[test]
    fn test_unregister_driver_releases_owned_slots() {
        let sysfs = FakeSysfs::new("unreg", &["spi0.0"]);
        let mut bus = sysfs.bus();
        bus.new_device("spi0", &BoardInfo::default()).unwrap();
        assert_eq!(
            sysfs.read("bus/spi/devices/spi0.0/driver_override"),
            "spidev"
        );

        bus.unregister_driver("w5x00");
        assert_eq!(sysfs.read("bus/spi/devices/spi0.0/driver_override"), "\n");
    }

    #[test]
    fn test_register_driver_requires_kernel_driver() {
        let sysfs = FakeSysfs::new("drv", &[]);
        let mut bus = SysfsSpiBus::new(
            LinuxSpiConfig::default()
                .with_sysfs_root(&sysfs.root)
                .with_bind_driver("w5100"),
        );
        assert_eq!(
            bus.register_driver("w5x00"),
            Err(CoreError::DriverRegisterFailed)
        );
    }

    #[test]
    fn test_parse_options() {
        let config = parse_options(&[("sysfs", "/tmp/sys"), ("driver", "w5100")]).unwrap();
        assert_eq!(config.sysfs_root, PathBuf::from("/tmp/sys"));
        assert_eq!(config.dev_root, PathBuf::from("/dev"));
        assert_eq!(config.bind_driver, "w5100");
        assert!(parse_options(&[("driver", "../x")]).is_err());
    }
}

//! w5x00-dummy - In-memory backends for testing
//!
//! This crate emulates everything the W5x00 lifecycle talks to: an SPI bus
//! with a device namespace, a GPIO chip, the W5x00 itself and a network
//! stack. Each piece counts the calls it receives and can be told to fail,
//! which makes it useful for tests and for dry runs without hardware.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use w5x00_core::bus::{BoardInfo, BusDevice, BusDeviceRef, SpiBus, SpiMode};
use w5x00_core::chip::{ChipConfig, ChipDriver};
use w5x00_core::error::{Error, Result};
use w5x00_core::netif::{NetInterface, NetifProvider};
use w5x00_core::params::MacAddress;
use w5x00_core::resource::{IrqNumber, PinBinding, PinResolver};

/// Which step of an attach should be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Bus refuses to create the child device
    Create,
    /// Bus refuses the driver registration
    Register,
    /// Interrupt pin cannot be mapped
    Bind,
    /// Chip initialization fails
    Init,
    /// Network interface creation fails
    Netif,
}

/// Configuration for the dummy backends
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Bus number of the single SPI master
    pub bus_num: u16,
    /// Number of GPIO lines on the emulated chip
    pub num_lines: u32,
    /// IRQ number of GPIO line 0
    pub irq_base: u32,
    /// Pre-seed a stale descriptor at this chip-select
    pub stale_select: Option<u8>,
    /// Inject a failure
    pub fail: Option<Failure>,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            bus_num: 0,
            num_lines: 54, // BCM2835 bank
            irq_base: 160,
            stale_select: None,
            fail: None,
        }
    }
}

/// Emulated SPI bus with one master
#[derive(Debug, Default)]
pub struct DummyBus {
    bus_num: u16,
    devices: Vec<BusDevice>,
    drivers: Vec<String>,
    fail_create: bool,
    fail_register: bool,
    /// Number of successful `delete_device` calls
    pub deletes: usize,
    /// Number of successful `new_device` calls
    pub creates: usize,
}

impl DummyBus {
    /// Bus with master `spi<bus_num>` and no devices
    pub fn new(bus_num: u16) -> Self {
        Self {
            bus_num,
            ..Default::default()
        }
    }

    /// Bus built from `config`, including any stale descriptor
    pub fn from_config(config: &DummyConfig) -> Self {
        let mut bus = Self::new(config.bus_num);
        if let Some(cs) = config.stale_select {
            bus.insert_stale(cs);
        }
        bus.fail_create = config.fail == Some(Failure::Create);
        bus.fail_register = config.fail == Some(Failure::Register);
        bus
    }

    /// Leave a descriptor behind at `chip_select`, as a crashed load would
    pub fn insert_stale(&mut self, chip_select: u8) {
        self.devices.push(BusDevice {
            name: format!("spi{}.{}", self.bus_num, chip_select),
            modalias: w5x00_core::DRV_NAME.to_string(),
            max_speed_hz: 1_000_000,
            bits_per_word: 8,
            mode: SpiMode::MODE_3,
        });
    }

    /// Number of devices named `name`
    pub fn count(&self, name: &str) -> usize {
        self.devices.iter().filter(|d| d.name == name).count()
    }

    /// Look up a device snapshot by name
    pub fn device(&self, name: &str) -> Option<&BusDevice> {
        self.devices.iter().find(|d| d.name == name)
    }

    /// Whether `driver` is currently registered
    pub fn has_driver(&self, driver: &str) -> bool {
        self.drivers.iter().any(|d| d == driver)
    }
}

impl SpiBus for DummyBus {
    fn controller(&self, bus_num: u16) -> Option<String> {
        (bus_num == self.bus_num).then(|| format!("spi{}", bus_num))
    }

    fn find_device(&self, name: &str) -> Option<BusDeviceRef> {
        self.device(name).map(|d| BusDeviceRef::new(d.name.clone()))
    }

    fn delete_device(&mut self, device: &BusDeviceRef) -> Result<()> {
        let before = self.devices.len();
        self.devices.retain(|d| d.name != device.name());
        if self.devices.len() == before {
            return Err(Error::BusError);
        }
        self.deletes += 1;
        Ok(())
    }

    fn new_device(&mut self, controller: &str, info: &BoardInfo) -> Result<BusDeviceRef> {
        if self.fail_create {
            return Err(Error::BusError);
        }
        let device = BusDevice::from_board_info(controller, info);
        if self.device(&device.name).is_some() {
            // Same as the kernel: the address is taken
            return Err(Error::BusError);
        }
        let dev_ref = BusDeviceRef::new(device.name.clone());
        self.devices.push(device);
        self.creates += 1;
        Ok(dev_ref)
    }

    fn devices(&self) -> Vec<BusDevice> {
        self.devices.clone()
    }

    fn register_driver(&mut self, driver: &str) -> Result<()> {
        if self.fail_register {
            return Err(Error::BusError);
        }
        if !self.has_driver(driver) {
            self.drivers.push(driver.to_string());
        }
        Ok(())
    }

    fn unregister_driver(&mut self, driver: &str) {
        self.drivers.retain(|d| d != driver);
    }
}

/// Emulated GPIO chip
#[derive(Debug, Default)]
pub struct DummyPins {
    num_lines: u32,
    irq_base: u32,
    claimed: Vec<u32>,
    fail_map: bool,
    /// Number of successful IRQ lookups
    pub lookups: usize,
    /// Number of `release` calls that reached the backend
    pub releases: usize,
}

impl DummyPins {
    /// GPIO chip with `num_lines` lines whose IRQs start at `irq_base`
    pub fn new(num_lines: u32, irq_base: u32) -> Self {
        Self {
            num_lines,
            irq_base,
            ..Default::default()
        }
    }

    /// Pins built from `config`
    pub fn from_config(config: &DummyConfig) -> Self {
        let mut pins = Self::new(config.num_lines, config.irq_base);
        pins.fail_map = config.fail == Some(Failure::Bind);
        pins
    }

    /// Mark `pin` as held by another consumer
    pub fn claim(&mut self, pin: u32) {
        self.claimed.push(pin);
    }
}

impl PinResolver for DummyPins {
    fn check_line(&mut self, pin: u32) -> Result<()> {
        if pin >= self.num_lines || self.claimed.contains(&pin) {
            return Err(Error::ResourceUnavailable { pin });
        }
        Ok(())
    }

    fn irq_for_pin(&mut self, pin: u32) -> Result<IrqNumber> {
        if self.fail_map {
            return Err(Error::ResourceUnavailable { pin });
        }
        let irq = self
            .irq_base
            .checked_add(pin)
            .map(IrqNumber)
            .ok_or(Error::ResourceUnavailable { pin })?;
        self.lookups += 1;
        Ok(irq)
    }

    fn release(&mut self, _binding: &PinBinding) -> Result<()> {
        self.releases += 1;
        Ok(())
    }
}

/// Emulated W5x00
#[derive(Debug, Default)]
pub struct DummyChip {
    fail_init: bool,
    up: bool,
    mac: Option<MacAddress>,
    /// Number of successful inits
    pub inits: usize,
    /// Number of exits
    pub exits: usize,
}

impl DummyChip {
    /// Chip that initializes successfully
    pub fn new() -> Self {
        Self::default()
    }

    /// Chip built from `config`
    pub fn from_config(config: &DummyConfig) -> Self {
        Self {
            fail_init: config.fail == Some(Failure::Init),
            ..Default::default()
        }
    }

    /// Whether the chip is initialized
    pub fn is_up(&self) -> bool {
        self.up
    }

    /// MAC address programmed at init
    pub fn mac(&self) -> Option<MacAddress> {
        self.mac
    }
}

impl ChipDriver for DummyChip {
    fn init(&mut self, config: &ChipConfig<'_>) -> Result<()> {
        if self.fail_init {
            return Err(Error::DeviceInitFailed);
        }
        log::debug!(
            "dummy: chip on cs {} up, irq {}",
            config.chip_select,
            config.binding.irq()
        );
        self.up = true;
        self.mac = Some(config.mac);
        self.inits += 1;
        Ok(())
    }

    fn exit(&mut self) -> Result<()> {
        self.up = false;
        self.exits += 1;
        Ok(())
    }
}

/// Interface handle from [`DummyNetif`]
#[derive(Debug, PartialEq, Eq)]
pub struct DummyInterface {
    name: String,
    mac: MacAddress,
    irq: IrqNumber,
}

impl DummyInterface {
    /// Hardware address
    pub fn mac(&self) -> MacAddress {
        self.mac
    }

    /// IRQ the interface was created with
    pub fn irq(&self) -> IrqNumber {
        self.irq
    }
}

impl NetInterface for DummyInterface {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Emulated network stack
#[derive(Debug, Default)]
pub struct DummyNetif {
    fail_create: bool,
    next_index: usize,
    live: Vec<String>,
    /// Number of successful creates
    pub created: usize,
    /// Number of destroys
    pub destroyed: usize,
}

impl DummyNetif {
    /// Network stack that accepts interfaces
    pub fn new() -> Self {
        Self::default()
    }

    /// Network stack built from `config`
    pub fn from_config(config: &DummyConfig) -> Self {
        Self {
            fail_create: config.fail == Some(Failure::Netif),
            ..Default::default()
        }
    }

    /// Names of registered interfaces
    pub fn live(&self) -> &[String] {
        &self.live
    }
}

impl NetifProvider for DummyNetif {
    type Handle = DummyInterface;

    fn create(&mut self, mac: MacAddress, irq: IrqNumber) -> Result<DummyInterface> {
        if self.fail_create {
            return Err(Error::InterfaceCreateFailed);
        }
        let name = format!("w5x{}", self.next_index);
        self.next_index += 1;
        self.live.push(name.clone());
        self.created += 1;
        Ok(DummyInterface { name, mac, irq })
    }

    fn destroy(&mut self, handle: DummyInterface) -> Result<()> {
        self.live.retain(|n| *n != handle.name);
        self.destroyed += 1;
        Ok(())
    }
}

/// Parse backend options from a list of key-value pairs
///
/// # Supported Options
///
/// - `bus=N` - SPI bus number of the emulated master (default 0)
/// - `lines=N` - number of GPIO lines (default 54)
/// - `irqbase=N` - IRQ number of line 0 (default 160)
/// - `stale=N` - leave a stale descriptor at chip-select N
/// - `fail=create|register|bind|init|netif` - inject a failure
pub fn parse_options(options: &[(&str, &str)]) -> core::result::Result<DummyConfig, String> {
    let mut config = DummyConfig::default();

    for (key, value) in options {
        match *key {
            "bus" => {
                config.bus_num = value
                    .parse()
                    .map_err(|_| format!("Invalid bus value: {}", value))?;
            }
            "lines" => {
                config.num_lines = value
                    .parse()
                    .map_err(|_| format!("Invalid lines value: {}", value))?;
            }
            "irqbase" => {
                config.irq_base = value
                    .parse()
                    .map_err(|_| format!("Invalid irqbase value: {}", value))?;
            }
            "stale" => {
                config.stale_select = Some(
                    value
                        .parse()
                        .map_err(|_| format!("Invalid stale value: {}", value))?,
                );
            }
            "fail" => {
                config.fail = Some(match *value {
                    "create" => Failure::Create,
                    "register" => Failure::Register,
                    "bind" => Failure::Bind,
                    "init" => Failure::Init,
                    "netif" => Failure::Netif,
                    _ => return Err(format!("Invalid fail value: {}", value)),
                });
            }
            _ => {
                log::warn!("dummy: Unknown option: {}={}", key, value);
            }
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use w5x00_core::bus::{BusRegistrar, SpiChild};
    use w5x00_core::lifecycle::{DeviceLifecycle, LifecycleState};
    use w5x00_core::module::DriverModule;
    use w5x00_core::params::ProbeParams;

    type Lifecycle = DeviceLifecycle<DummyPins, DummyChip, DummyNetif>;

    fn lifecycle(config: &DummyConfig) -> Lifecycle {
        DeviceLifecycle::new(
            DummyPins::from_config(config),
            DummyChip::from_config(config),
            DummyNetif::from_config(config),
        )
    }

    fn scenario_params() -> ProbeParams {
        ProbeParams {
            interrupt_pin: 17,
            reset_pin: 27,
            chip_select: 0,
            mac: "de:ad:be:ef:00:01".parse().unwrap(),
        }
    }

    fn child(cs: u8) -> SpiChild {
        SpiChild {
            device: BusDeviceRef::new(format!("spi0.{}", cs)),
            chip_select: cs,
        }
    }

    #[test]
    fn test_probe_then_remove_returns_to_unbound() {
        let mut lc = lifecycle(&DummyConfig::default());
        lc.probe(&child(0), &scenario_params()).unwrap();
        assert_eq!(lc.state(), LifecycleState::Attached);
        assert_eq!(lc.interface_name(), Some("w5x0"));
        assert!(lc.chip().is_up());

        lc.remove(&child(0));
        assert_eq!(lc.state(), LifecycleState::Unbound);
        assert!(lc.instance().network_handle().is_none());
        assert!(lc.instance().irq().is_none());
        assert!(!lc.binder().is_bound());
        assert!(!lc.chip().is_up());
        assert!(lc.netif().live().is_empty());
        assert_eq!(lc.binder().resolver().releases, 1);
    }

    #[test]
    fn test_remove_twice_is_noop() {
        let mut lc = lifecycle(&DummyConfig::default());
        lc.probe(&child(0), &scenario_params()).unwrap();

        lc.remove(&child(0));
        lc.remove(&child(0));

        assert_eq!(lc.state(), LifecycleState::Unbound);
        assert_eq!(lc.binder().resolver().releases, 1);
        assert_eq!(lc.chip().exits, 1);
        assert_eq!(lc.netif().destroyed, 1);
    }

    #[test]
    fn test_remove_on_unbound_touches_nothing() {
        let mut lc = lifecycle(&DummyConfig::default());
        lc.remove(&child(0));

        assert_eq!(lc.state(), LifecycleState::Unbound);
        assert_eq!(lc.binder().resolver().releases, 0);
        assert_eq!(lc.chip().exits, 0);
        assert_eq!(lc.netif().destroyed, 0);
    }

    #[test]
    fn test_bind_failure_leaves_unbound() {
        let config = DummyConfig {
            fail: Some(Failure::Bind),
            ..Default::default()
        };
        let mut lc = lifecycle(&config);

        assert_eq!(
            lc.probe(&child(0), &scenario_params()),
            Err(Error::DeviceInitFailed)
        );
        assert_eq!(lc.state(), LifecycleState::Unbound);
        assert!(lc.instance().network_handle().is_none());
        assert!(!lc.binder().is_bound());
        assert_eq!(lc.chip().inits, 0);
        assert_eq!(lc.netif().created, 0);
    }

    #[test]
    fn test_claimed_reset_pin_fails_probe() {
        let mut pins = DummyPins::new(54, 160);
        pins.claim(27);
        let mut lc = DeviceLifecycle::new(pins, DummyChip::new(), DummyNetif::new());

        assert_eq!(
            lc.probe(&child(0), &scenario_params()),
            Err(Error::DeviceInitFailed)
        );
        assert_eq!(lc.state(), LifecycleState::Unbound);
        assert_eq!(lc.binder().resolver().lookups, 0);
    }

    #[test]
    fn test_irq_overflow_is_init_failure() {
        let config = parse_options(&[("irqbase", "4294967295")]).unwrap();
        let mut lc = lifecycle(&config);

        assert_eq!(
            lc.probe(&child(0), &scenario_params()),
            Err(Error::DeviceInitFailed)
        );
        assert_eq!(lc.state(), LifecycleState::Unbound);
        assert!(!lc.binder().is_bound());
        assert_eq!(lc.binder().resolver().lookups, 0);
        assert_eq!(lc.chip().inits, 0);
    }

    #[test]
    fn test_chip_init_failure_rolls_back_binding() {
        let config = DummyConfig {
            fail: Some(Failure::Init),
            ..Default::default()
        };
        let mut lc = lifecycle(&config);

        assert_eq!(
            lc.probe(&child(0), &scenario_params()),
            Err(Error::DeviceInitFailed)
        );
        assert_eq!(lc.state(), LifecycleState::Unbound);
        assert!(!lc.binder().is_bound());
        assert_eq!(lc.binder().resolver().releases, 1);
        assert_eq!(lc.netif().created, 0);

        // Remove after the failed probe must not release again
        lc.remove(&child(0));
        assert_eq!(lc.binder().resolver().releases, 1);
        assert_eq!(lc.chip().exits, 0);
    }

    #[test]
    fn test_netif_failure_stays_bound() {
        let config = DummyConfig {
            fail: Some(Failure::Netif),
            ..Default::default()
        };
        let mut lc = lifecycle(&config);

        assert_eq!(lc.probe(&child(0), &scenario_params()), Ok(()));
        assert_eq!(lc.state(), LifecycleState::Bound);
        assert!(lc.instance().network_handle().is_none());
        assert!(lc.binder().is_bound());
        assert!(lc.chip().is_up());

        lc.remove(&child(0));
        assert_eq!(lc.state(), LifecycleState::Unbound);
        assert_eq!(lc.netif().destroyed, 0);
        assert_eq!(lc.chip().exits, 1);
        assert_eq!(lc.binder().resolver().releases, 1);
    }

    #[test]
    fn test_probe_overrides_bus_chip_select() {
        let mut lc = lifecycle(&DummyConfig::default());
        let params = ProbeParams {
            chip_select: 1,
            ..scenario_params()
        };
        lc.probe(&child(0), &params).unwrap();
        assert_eq!(lc.instance().chip_select(), 1);
    }

    #[test]
    #[should_panic(expected = "probe of spi0.0 while attached")]
    fn test_probe_twice_panics() {
        let mut lc = lifecycle(&DummyConfig::default());
        lc.probe(&child(0), &scenario_params()).unwrap();
        let _ = lc.probe(&child(0), &scenario_params());
    }

    #[test]
    #[should_panic(expected = "double bind")]
    fn test_double_bind_panics() {
        let mut binder = w5x00_core::resource::ResourceBinder::new(DummyPins::new(54, 0));
        binder.bind(17, 27).unwrap();
        let _ = binder.bind(17, 27);
    }

    #[test]
    fn test_bind_returns_binding() {
        let mut binder = w5x00_core::resource::ResourceBinder::new(DummyPins::new(54, 100));
        let binding = binder.bind(17, 27).unwrap().clone();
        assert_eq!(binding.interrupt_pin(), 17);
        assert_eq!(binding.reset_pin(), 27);
        assert_eq!(binding.irq(), IrqNumber(117));
        assert_eq!(binder.binding(), Some(&binding));
    }

    /// Pin backend that reports releases through a shared counter
    struct SharedPins {
        inner: DummyPins,
        releases: alloc::rc::Rc<core::cell::Cell<usize>>,
    }

    impl PinResolver for SharedPins {
        fn check_line(&mut self, pin: u32) -> Result<()> {
            self.inner.check_line(pin)
        }

        fn irq_for_pin(&mut self, pin: u32) -> Result<IrqNumber> {
            self.inner.irq_for_pin(pin)
        }

        fn release(&mut self, _binding: &PinBinding) -> Result<()> {
            self.releases.set(self.releases.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn test_drop_releases_binding() {
        let releases = alloc::rc::Rc::new(core::cell::Cell::new(0));
        let pins = SharedPins {
            inner: DummyPins::new(54, 0),
            releases: releases.clone(),
        };
        let mut lc = DeviceLifecycle::new(pins, DummyChip::new(), DummyNetif::new());
        lc.probe(&child(0), &scenario_params()).unwrap();
        assert_eq!(releases.get(), 0);

        drop(lc);
        assert_eq!(releases.get(), 1);
    }

    #[test]
    fn test_ensure_registered_twice_leaves_one_descriptor() {
        let mut bus = DummyBus::new(0);
        let registrar = BusRegistrar::new("w5x00");
        let info = BoardInfo::default();

        let first = registrar.ensure_registered(&mut bus, &info).unwrap();
        let second = registrar.ensure_registered(&mut bus, &info).unwrap();

        assert_eq!(first, second);
        assert_eq!(bus.count("spi0.0"), 1);
        assert_eq!(bus.creates, 2);
        assert_eq!(bus.deletes, 1);
    }

    #[test]
    fn test_ensure_registered_without_master_fails() {
        let mut bus = DummyBus::new(1);
        let registrar = BusRegistrar::new("w5x00");

        let err = registrar
            .ensure_registered(&mut bus, &BoardInfo::default())
            .unwrap_err();
        assert_eq!(
            err,
            Error::RegistrationFailed(w5x00_core::error::RegistrationFailure::ControllerNotFound {
                bus_num: 0
            })
        );
        assert_eq!(bus.creates, 0);
    }

    #[test]
    fn test_scenario_attach_on_clean_bus() {
        let config = DummyConfig::default();
        let mut bus = DummyBus::from_config(&config);
        let mut module = DriverModule::new(lifecycle(&config), scenario_params());

        module.load(&mut bus, BoardInfo::default()).unwrap();

        assert_eq!(bus.count("spi0.0"), 1);
        assert_eq!(bus.deletes, 0);
        assert!(bus.has_driver("w5x00"));
        assert!(module.is_attached(&bus));
        assert_eq!(module.state(), LifecycleState::Attached);
        assert_eq!(module.instance().irq(), Some(IrqNumber(177)));

        let netif = module.instance().network_handle().unwrap();
        assert_eq!(netif.mac().to_string(), "de:ad:be:ef:00:01");
        assert_eq!(netif.irq(), IrqNumber(177));

        let dev = bus.device("spi0.0").unwrap();
        assert_eq!(dev.modalias, "w5x00");
        assert_eq!(dev.max_speed_hz, 26_000_000);
        assert_eq!(dev.mode, SpiMode::MODE_0);

        module.unload(&mut bus);
        assert_eq!(module.state(), LifecycleState::Unbound);
        assert!(!bus.has_driver("w5x00"));
        assert!(module.lifecycle().netif().live().is_empty());
    }

    #[test]
    fn test_scenario_stale_descriptor_is_replaced() {
        let config = DummyConfig {
            stale_select: Some(0),
            ..Default::default()
        };
        let mut bus = DummyBus::from_config(&config);
        assert_eq!(bus.device("spi0.0").unwrap().max_speed_hz, 1_000_000);

        let mut module = DriverModule::new(lifecycle(&config), scenario_params());
        module.load(&mut bus, BoardInfo::default()).unwrap();

        assert_eq!(bus.deletes, 1);
        assert_eq!(bus.count("spi0.0"), 1);
        let dev = bus.device("spi0.0").unwrap();
        assert_eq!(dev.max_speed_hz, 26_000_000);
        assert_eq!(dev.mode, SpiMode::MODE_0);
        assert_eq!(module.state(), LifecycleState::Attached);
    }

    #[test]
    fn test_load_survives_probe_failure() {
        let config = DummyConfig {
            fail: Some(Failure::Init),
            ..Default::default()
        };
        let mut bus = DummyBus::from_config(&config);
        let mut module = DriverModule::new(lifecycle(&config), scenario_params());

        module.load(&mut bus, BoardInfo::default()).unwrap();
        assert!(module.is_loaded());
        assert_eq!(module.state(), LifecycleState::Unbound);
        assert_eq!(module.last_probe_error(), Some(Error::DeviceInitFailed));

        module.unload(&mut bus);
        assert!(!module.is_loaded());
    }

    #[test]
    fn test_load_fails_when_create_fails() {
        let config = DummyConfig {
            fail: Some(Failure::Create),
            ..Default::default()
        };
        let mut bus = DummyBus::from_config(&config);
        let mut module = DriverModule::new(lifecycle(&config), scenario_params());

        assert!(matches!(
            module.load(&mut bus, BoardInfo::default()),
            Err(Error::RegistrationFailed(_))
        ));
        assert!(!module.is_loaded());
        assert!(!bus.has_driver("w5x00"));
        assert_eq!(module.lifecycle().chip().inits, 0);
    }

    #[test]
    fn test_load_cleans_up_when_driver_register_fails() {
        let config = DummyConfig {
            fail: Some(Failure::Register),
            ..Default::default()
        };
        let mut bus = DummyBus::from_config(&config);
        let mut module = DriverModule::new(lifecycle(&config), scenario_params());

        assert_eq!(
            module.load(&mut bus, BoardInfo::default()),
            Err(Error::DriverRegisterFailed)
        );
        assert_eq!(bus.count("spi0.0"), 0);
        assert_eq!(module.state(), LifecycleState::Unbound);
    }

    #[test]
    fn test_reload_cycle_keeps_single_descriptor() {
        let config = DummyConfig::default();
        let mut bus = DummyBus::from_config(&config);
        let mut module = DriverModule::new(lifecycle(&config), scenario_params());

        module.load(&mut bus, BoardInfo::default()).unwrap();
        module.unload(&mut bus);
        module.load(&mut bus, BoardInfo::default()).unwrap();

        assert_eq!(bus.count("spi0.0"), 1);
        assert_eq!(module.state(), LifecycleState::Attached);
        assert_eq!(module.lifecycle().netif().live().len(), 1);
        assert_eq!(module.lifecycle().binder().resolver().releases, 1);
    }

    #[test]
    fn test_device_removed_keeps_driver_registered() {
        let config = DummyConfig::default();
        let mut bus = DummyBus::from_config(&config);
        let mut module = DriverModule::new(lifecycle(&config), scenario_params());

        module.load(&mut bus, BoardInfo::default()).unwrap();
        module.device_removed();

        assert_eq!(module.state(), LifecycleState::Unbound);
        assert!(bus.has_driver("w5x00"));
        assert!(module.is_loaded());
    }

    #[test]
    fn test_parse_options() {
        let config = parse_options(&[("stale", "1"), ("fail", "netif"), ("irqbase", "0")]).unwrap();
        assert_eq!(config.stale_select, Some(1));
        assert_eq!(config.fail, Some(Failure::Netif));
        assert_eq!(config.irq_base, 0);

        assert!(parse_options(&[("fail", "everything")]).is_err());
    }
}

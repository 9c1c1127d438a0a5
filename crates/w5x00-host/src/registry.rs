//! Backend registry
//!
//! Opens backends by name and wires them into a [`ModuleHandle`].

use crate::handle::ModuleHandle;
#[allow(unused_imports)] // Used in feature-gated code
use crate::handle::Backend;
use std::collections::HashMap;
use w5x00_core::bus::BoardInfo;
#[allow(unused_imports)] // Used in feature-gated code
use w5x00_core::lifecycle::DeviceLifecycle;
#[allow(unused_imports)] // Used in feature-gated code
use w5x00_core::module::DriverModule;
use w5x00_core::params::ProbeParams;

/// Parsed backend parameters
#[derive(Debug)]
pub struct BackendParams {
    /// Backend name
    pub name: String,
    /// Key-value parameters
    pub params: HashMap<String, String>,
}

impl BackendParams {
    /// Parameters as the `(key, value)` slice backend crates parse
    fn options(&self) -> Vec<(&str, &str)> {
        self.params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    /// Parameters whose key is in `keys`
    #[allow(dead_code)] // Used in feature-gated code
    fn options_for(&self, keys: &[&str]) -> Vec<(&str, &str)> {
        self.options()
            .into_iter()
            .filter(|(k, _)| keys.contains(k))
            .collect()
    }
}

/// Parse a backend string into name and parameters
///
/// Format: "name" or "name:key1=value1,key2=value2"
///
/// # Example
/// ```ignore
/// let params = parse_backend_params("dummy:stale=0")?;
/// assert_eq!(params.name, "dummy");
/// assert_eq!(params.params.get("stale"), Some(&"0".to_string()));
/// ```
pub fn parse_backend_params(s: &str) -> Result<BackendParams, Box<dyn std::error::Error>> {
    let (name, opts_str) = s.split_once(':').unwrap_or((s, ""));

    let mut params = HashMap::new();
    if !opts_str.is_empty() {
        for opt in opts_str.split(',') {
            if let Some((key, value)) = opt.split_once('=') {
                params.insert(key.to_string(), value.to_string());
            } else {
                return Err(
                    format!("Invalid parameter format: '{}' (expected key=value)", opt).into(),
                );
            }
        }
    }

    Ok(BackendParams {
        name: name.to_string(),
        params,
    })
}

/// Open a backend and create an unloaded module on it
///
/// # Arguments
/// * `backend` - Backend specification (e.g., "dummy" or "linux:gpiochip=0")
/// * `params` - Probe parameters handed to the driver instance
/// * `template` - SPI registration template (bus number, clock, mode)
///
/// # Example
/// ```ignore
/// let mut handle = open_module("linux", ProbeParams::default(), BoardInfo::default())?;
/// handle.load()?;
/// ```
#[allow(unused_variables)] // Used in feature-gated code
pub fn open_module(
    backend: &str,
    params: ProbeParams,
    template: BoardInfo,
) -> Result<ModuleHandle, Box<dyn std::error::Error>> {
    let backend_params = parse_backend_params(backend)?;

    match backend_params.name.as_str() {
        #[cfg(feature = "dummy")]
        "dummy" => open_dummy(&backend_params, params, template),

        #[cfg(feature = "linux")]
        "linux" | "linux_spi" | "sysfs" => open_linux(&backend_params, params, template),

        _ => Err(format!("Unknown backend: {}", backend_params.name).into()),
    }
}

#[cfg(feature = "dummy")]
fn open_dummy(
    backend: &BackendParams,
    params: ProbeParams,
    template: BoardInfo,
) -> Result<ModuleHandle, Box<dyn std::error::Error>> {
    use w5x00_dummy::{parse_options, DummyBus, DummyChip, DummyNetif, DummyPins};

    let mut config = parse_options(&backend.options())
        .map_err(|e| format!("Invalid dummy parameters: {}", e))?;
    // The emulated master follows --bus unless told otherwise
    if !backend.params.contains_key("bus") {
        config.bus_num = template.bus_num;
    }

    log::info!("Opening dummy backend (spi{})...", config.bus_num);

    let lifecycle = DeviceLifecycle::new(
        DummyPins::from_config(&config),
        DummyChip::from_config(&config),
        DummyNetif::from_config(&config),
    );
    let inner = Backend {
        bus: DummyBus::from_config(&config),
        module: DriverModule::new(lifecycle, params),
    };
    Ok(ModuleHandle::new("dummy", template, Box::new(inner)))
}

#[cfg(feature = "linux")]
const LINUX_GPIO_KEYS: &[&str] = &["dev", "gpiochip", "irqbase"];
#[cfg(feature = "linux")]
const LINUX_SPI_KEYS: &[&str] = &["sysfs", "spidev", "driver"];
#[cfg(feature = "linux")]
const LINUX_TAP_KEYS: &[&str] = &["tun", "ifname", "up"];

#[cfg(feature = "linux")]
fn open_linux(
    backend: &BackendParams,
    params: ProbeParams,
    template: BoardInfo,
) -> Result<ModuleHandle, Box<dyn std::error::Error>> {
    use w5x00_linux_gpio::GpioPins;
    use w5x00_linux_spi::{SpidevChip, SpidevSettings, SysfsSpiBus};
    use w5x00_linux_tap::TapProvider;

    if let Some(key) = backend.params.keys().find(|k| {
        !LINUX_GPIO_KEYS.contains(&k.as_str())
            && !LINUX_SPI_KEYS.contains(&k.as_str())
            && !LINUX_TAP_KEYS.contains(&k.as_str())
    }) {
        return Err(format!("Unknown linux parameter: {}", key).into());
    }

    let gpio_config = w5x00_linux_gpio::parse_options(&backend.options_for(LINUX_GPIO_KEYS))
        .map_err(|e| format!("Invalid linux gpio parameters: {}", e))?;
    let spi_config = w5x00_linux_spi::parse_options(&backend.options_for(LINUX_SPI_KEYS))
        .map_err(|e| format!("Invalid linux spi parameters: {}", e))?;
    let tap_config = w5x00_linux_tap::parse_options(&backend.options_for(LINUX_TAP_KEYS))
        .map_err(|e| format!("Invalid linux tap parameters: {}", e))?;

    log::info!("Opening linux backend...");

    let pins = GpioPins::open(&gpio_config).map_err(|e| {
        format!(
            "Failed to open GPIO chip: {}\n\
             Make sure the device exists and you have read/write permissions.",
            e
        )
    })?;
    let chip = SpidevChip::new(
        spi_config.dev_root.clone(),
        template.bus_num,
        SpidevSettings {
            mode: template.mode,
            bits_per_word: template.bits_per_word,
            speed_hz: template.max_speed_hz,
        },
    );
    let lifecycle = DeviceLifecycle::new(pins, chip, TapProvider::new(tap_config));

    let inner = Backend {
        bus: SysfsSpiBus::new(spi_config),
        module: DriverModule::new(lifecycle, params),
    };
    Ok(ModuleHandle::new("linux", template, Box::new(inner)))
}

/// Information about a backend
pub struct BackendInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Short description
    pub description: &'static str,
}

/// Get information about all available backends (enabled at compile time)
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_backends() -> Vec<BackendInfo> {
    let mut backends = Vec::new();

    #[cfg(feature = "dummy")]
    backends.push(BackendInfo {
        name: "dummy",
        aliases: &[],
        description: "In-memory bus, GPIO and network stack (stale=<cs>,fail=<step>)",
    });

    #[cfg(feature = "linux")]
    backends.push(BackendInfo {
        name: "linux",
        aliases: &["linux_spi", "sysfs"],
        description: "sysfs SPI bus, gpiocdev pins and TAP interface (gpiochip=<n>,driver=<name>)",
    });

    backends
}

/// Generate a short list of backend names for CLI help
pub fn backend_names_short() -> String {
    let backends = available_backends();
    if backends.is_empty() {
        return "none (recompile with features)".to_string();
    }
    let names: Vec<&str> = backends.iter().map(|b| b.name).collect();
    names.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backend_params() {
        let params = parse_backend_params("linux:gpiochip=1,driver=w5100").unwrap();
        assert_eq!(params.name, "linux");
        assert_eq!(params.params.get("gpiochip"), Some(&"1".to_string()));
        assert_eq!(params.params.get("driver"), Some(&"w5100".to_string()));

        let bare = parse_backend_params("dummy").unwrap();
        assert_eq!(bare.name, "dummy");
        assert!(bare.params.is_empty());
    }

    #[test]
    fn test_parse_backend_params_rejects_bare_key() {
        assert!(parse_backend_params("dummy:stale").is_err());
    }

    #[test]
    fn test_unknown_backend() {
        let err = open_module("nope", ProbeParams::default(), BoardInfo::default())
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "Unknown backend: nope");
    }

    #[cfg(feature = "dummy")]
    #[test]
    fn test_dummy_attach_and_unload() {
        use w5x00_core::lifecycle::LifecycleState;

        let mut handle =
            open_module("dummy:stale=0", ProbeParams::default(), BoardInfo::default()).unwrap();
        assert_eq!(handle.devices().len(), 1);

        handle.load().unwrap();
        assert!(handle.is_loaded());
        assert!(handle.is_attached());
        assert_eq!(handle.state(), LifecycleState::Attached);
        assert_eq!(handle.interface_name().as_deref(), Some("w5x0"));
        assert_eq!(handle.devices().len(), 1);
        assert_eq!(handle.devices()[0].modalias, "w5x00");

        handle.unload();
        assert!(!handle.is_loaded());
        assert_eq!(handle.state(), LifecycleState::Unbound);
        assert_eq!(handle.interface_name(), None);
    }

    #[cfg(feature = "dummy")]
    #[test]
    fn test_dummy_follows_bus_option() {
        let template = BoardInfo {
            bus_num: 1,
            ..BoardInfo::default()
        };
        let mut handle = open_module("dummy", ProbeParams::default(), template.clone()).unwrap();
        assert_eq!(handle.register().unwrap().name(), "spi1.0");

        let mut elsewhere = open_module("dummy:bus=0", ProbeParams::default(), template).unwrap();
        assert!(elsewhere.load().is_err());
    }

    #[cfg(feature = "dummy")]
    #[test]
    fn test_dummy_probe_failure_keeps_load() {
        use w5x00_core::error::Error;

        let mut handle =
            open_module("dummy:fail=bind", ProbeParams::default(), BoardInfo::default()).unwrap();
        handle.load().unwrap();
        assert_eq!(handle.last_probe_error(), Some(Error::DeviceInitFailed));
        assert_eq!(handle.irq(), None);
    }

    #[test]
    fn test_backend_names_short() {
        let names = backend_names_short();
        #[cfg(feature = "dummy")]
        assert!(names.contains("dummy"));
        assert!(!names.is_empty());
    }
}

use crate::prelude::*;

use crate::handler::Family;
use crate::listener::DeviceInventory;
use crate::output_index::OutputSetting;

use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    #[serde(default = "Config::default_mqtt")]
    pub mqtt: Mqtt,

    #[serde(default = "Vec::new")]
    pub devices: Vec<Device>,

    /// Registry rows on top of the built-in dataset table.
    #[serde(default = "Vec::new")]
    pub datasets: Vec<Dataset>,

    #[serde(default = "Config::default_loglevel")]
    pub loglevel: String,

    /// JSON-lines capture of transport messages to play back.
    pub replay_file: Option<String>,
}

// Ied {{{
/// Device template; decides which listener a device gets.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ied {
    ZownRtu,
    FlexOvl,
}

impl std::fmt::Display for Ied {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::ZownRtu => "zown_rtu",
            Self::FlexOvl => "flex_ovl",
        };
        write!(f, "{}", s)
    }
} // }}}

// Device {{{
#[derive(Clone, Debug, Deserialize)]
pub struct Device {
    pub device_identification: String,

    #[serde(default = "Config::default_enabled")]
    pub enabled: bool,

    pub ied: Ied,

    #[serde(default = "Vec::new")]
    pub output_settings: Vec<OutputSetting>,
}
impl Device {
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn device_identification(&self) -> &str {
        &self.device_identification
    }

    pub fn ied(&self) -> Ied {
        self.ied
    }

    pub fn output_settings(&self) -> &[OutputSetting] {
        &self.output_settings
    }
} // }}}

// Dataset {{{
#[derive(Clone, Debug, Deserialize)]
pub struct Dataset {
    pub key: String,
    pub family: Family,
    #[serde(default = "Config::default_system_id")]
    pub system_id: u32,
} // }}}

// Mqtt {{{
#[serde_as]
#[derive(Clone, Debug, Deserialize)]
pub struct Mqtt {
    #[serde(default = "Config::default_enabled")]
    pub enabled: bool,

    #[serde(default)]
    pub host: String,
    #[serde(default = "Config::default_mqtt_port")]
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,

    #[serde(default = "Config::default_mqtt_namespace")]
    pub namespace: String,

    #[serde(default = "Config::default_mqtt_client_id")]
    pub client_id: String,

    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(default = "Config::default_mqtt_keep_alive")]
    pub keep_alive: Duration,
}
impl Mqtt {
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn username(&self) -> &Option<String> {
        &self.username
    }

    pub fn password(&self) -> &Option<String> {
        &self.password
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn keep_alive(&self) -> Duration {
        self.keep_alive
    }
} // }}}

pub struct ConfigWrapper {
    config: Arc<Mutex<Config>>,
}

impl Clone for ConfigWrapper {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
        }
    }
}

impl ConfigWrapper {
    pub fn new(file: String) -> Result<Self> {
        let config = Config::new(file)?;
        Ok(Self::from_config(config))
    }

    pub fn from_config(config: Config) -> Self {
        Self {
            config: Arc::new(Mutex::new(config)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Config> {
        self.config.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn devices(&self) -> Vec<Device> {
        self.lock().devices.clone()
    }

    pub fn enabled_devices(&self) -> Vec<Device> {
        self.devices().into_iter().filter(|d| d.enabled()).collect()
    }

    pub fn enabled_device(&self, device_identification: &str) -> Option<Device> {
        self.enabled_devices()
            .into_iter()
            .find(|d| d.device_identification() == device_identification)
    }

    pub fn datasets(&self) -> Vec<Dataset> {
        self.lock().datasets.clone()
    }

    pub fn mqtt(&self) -> Mqtt {
        self.lock().mqtt.clone()
    }

    pub fn loglevel(&self) -> String {
        self.lock().loglevel.clone()
    }

    pub fn replay_file(&self) -> Option<String> {
        self.lock().replay_file.clone()
    }

    pub fn set_replay_file(&self, file: Option<String>) {
        self.lock().replay_file = file;
    }

    pub fn print_summary(&self) {
        self.lock().print_summary();
    }
}

impl DeviceInventory for ConfigWrapper {
    fn ied(&self, device_identification: &str) -> Option<Ied> {
        self.enabled_device(device_identification).map(|d| d.ied())
    }

    fn output_settings(&self, device_identification: &str) -> Vec<OutputSetting> {
        self.enabled_device(device_identification)
            .map(|d| d.output_settings().to_vec())
            .unwrap_or_default()
    }
}

impl Config {
    pub fn new(file: String) -> Result<Self> {
        let content = std::fs::read_to_string(&file)
            .map_err(|err| crate::file_error_with_source!(err, "error reading {}", file))?;

        Self::from_yaml(&content)
    }

    pub fn print_summary(&self) {
        info!("Configuration loaded successfully:");
        info!(
            "  Devices: {} configured, {} enabled",
            self.devices.len(),
            self.devices.iter().filter(|d| d.enabled).count()
        );
        for (i, device) in self.devices.iter().enumerate() {
            info!("    Device[{}]:", i);
            info!("      Identification: {}", device.device_identification);
            info!("      Enabled: {}", device.enabled);
            info!("      IED: {}", device.ied);
            info!("      Output Settings: {}", device.output_settings.len());
        }

        info!("  Extra Datasets: {}", self.datasets.len());
        for dataset in &self.datasets {
            info!("    {} ({:?}, system {})", dataset.key, dataset.family, dataset.system_id);
        }

        info!("  MQTT: {}", if self.mqtt.enabled { "enabled" } else { "disabled" });
        if self.mqtt.enabled {
            info!("    Host: {}", self.mqtt.host);
            info!("    Port: {}", self.mqtt.port);
            info!("    Namespace: {}", self.mqtt.namespace);
        }

        if let Some(replay_file) = &self.replay_file {
            info!("  Replay File: {}", replay_file);
        }
        info!("  Log Level: {}", self.loglevel);
    }

    /// Parses and validates a YAML document.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.mqtt.enabled {
            if self.mqtt.port == 0 {
                bail!("mqtt.port must be between 1 and 65535");
            }
            if self.mqtt.host.is_empty() {
                return Err(crate::file_error!("MQTT host cannot be empty"));
            }
        }

        if log::LevelFilter::from_str(&self.loglevel).is_err() {
            bail!("loglevel {:?} is not one of off, error, warn, info, debug, trace", self.loglevel);
        }

        let mut seen = HashSet::new();
        for (i, device) in self.devices.iter().enumerate() {
            if device.device_identification.is_empty() {
                bail!("devices[{}].device_identification cannot be empty", i);
            }
            if !seen.insert(device.device_identification.as_str()) {
                bail!("device {} is configured twice", device.device_identification);
            }

            let mut internal_ids = HashSet::new();
            for setting in &device.output_settings {
                if setting.internal_id == 0 {
                    bail!(
                        "device {}: internal_id 0 is reserved",
                        device.device_identification
                    );
                }
                if !internal_ids.insert(setting.internal_id) {
                    bail!(
                        "device {}: internal_id {} is mapped twice",
                        device.device_identification,
                        setting.internal_id
                    );
                }
            }
        }

        for (i, dataset) in self.datasets.iter().enumerate() {
            if dataset.key.is_empty() {
                bail!("datasets[{}].key cannot be empty", i);
            }
        }

        Ok(())
    }

    fn default_mqtt() -> Mqtt {
        Mqtt {
            enabled: false,
            host: String::new(),
            port: Self::default_mqtt_port(),
            username: None,
            password: None,
            namespace: Self::default_mqtt_namespace(),
            client_id: Self::default_mqtt_client_id(),
            keep_alive: Self::default_mqtt_keep_alive(),
        }
    }

    fn default_mqtt_port() -> u16 {
        1883
    }

    fn default_mqtt_namespace() -> String {
        "iec61850".to_string()
    }

    fn default_mqtt_client_id() -> String {
        "iec61850-bridge".to_string()
    }

    fn default_mqtt_keep_alive() -> Duration {
        Duration::from_secs(60)
    }

    fn default_system_id() -> u32 {
        1
    }

    fn default_enabled() -> bool {
        true
    }

    fn default_loglevel() -> String {
        "debug".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
mqtt:
  host: localhost
  keep_alive: 30
devices:
  - device_identification: RTU-1
    ied: zown_rtu
  - device_identification: SSLD-1
    ied: flex_ovl
    output_settings:
      - { internal_id: 1, external_id: 101 }
      - { internal_id: 2, external_id: 102 }
  - device_identification: SSLD-2
    ied: flex_ovl
    enabled: false
datasets:
  - key: ZOWN_POCPV2/LLN0$AllData
    family: pv
    system_id: 2
"#;

    #[test]
    fn parses_with_defaults() {
        let config = Config::from_yaml(YAML).unwrap();
        assert!(config.mqtt.enabled);
        assert_eq!(config.mqtt.port, 1883);
        assert_eq!(config.mqtt.namespace, "iec61850");
        assert_eq!(config.mqtt.keep_alive, Duration::from_secs(30));
        assert_eq!(config.loglevel, "debug");
        assert_eq!(config.datasets[0].family, Family::Pv);
    }

    #[test]
    fn inventory_only_knows_enabled_devices() {
        let config = ConfigWrapper::from_config(Config::from_yaml(YAML).unwrap());
        assert_eq!(config.ied("RTU-1"), Some(Ied::ZownRtu));
        assert_eq!(config.ied("SSLD-2"), None);
        assert_eq!(config.output_settings("SSLD-1").len(), 2);
        assert!(config.output_settings("NOPE").is_empty());
    }

    #[test]
    fn rejects_reserved_internal_id() {
        let yaml = r#"
devices:
  - device_identification: SSLD-1
    ied: flex_ovl
    output_settings:
      - { internal_id: 0, external_id: 5 }
"#;
        assert!(Config::from_yaml(yaml).is_err());
    }

    #[test]
    fn rejects_unknown_loglevel() {
        assert!(Config::from_yaml("loglevel: chatty\n").is_err());
        assert_eq!(Config::from_yaml("loglevel: TRACE\n").unwrap().loglevel, "TRACE");
    }

    #[test]
    fn rejects_duplicate_devices() {
        let yaml = r#"
devices:
  - { device_identification: RTU-1, ied: zown_rtu }
  - { device_identification: RTU-1, ied: flex_ovl }
"#;
        assert!(Config::from_yaml(yaml).is_err());
    }

    #[test]
    fn enabled_mqtt_needs_host() {
        assert!(Config::from_yaml("mqtt:\n  enabled: true\n").is_err());
    }
}

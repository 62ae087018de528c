//! Flowgate service configuration (`flowgate.toml`).
//!
//! Declares the driver, the policy file, the named peripherals and the
//! input-to-output links mirrored by the bridge service.
//!
//! ```toml
//! [shared]
//! service_name = "flowgate"
//!
//! [gpio]
//! driver = "simulation"
//! policy = "/etc/flowgate/policy.json"
//! poll_interval_ms = 10
//!
//! [[outputs]]
//! name = "relay"
//! pin = "GPIO17"
//!
//! [[inputs]]
//! name = "button"
//! pin = 13
//! pull_resistor = "up"
//!
//! [[links]]
//! input = "button"
//! output = "relay"
//! ```

use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{ConfigError, SharedConfig};
use crate::consts::{DEFAULT_POLICY_PATH, DEFAULT_POLL_INTERVAL_MS};
use crate::gpio::pin_config::{PinConfig, RawPull};
use crate::gpio::types::PinId;

/// Root of `flowgate.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlowgateConfig {
    /// Logging and instance name.
    pub shared: SharedConfig,
    /// Driver and policy selection.
    pub gpio: GpioConfig,
    /// Output peripherals.
    #[serde(default)]
    pub outputs: Vec<PeripheralEntry>,
    /// Input peripherals.
    #[serde(default)]
    pub inputs: Vec<PeripheralEntry>,
    /// Input-to-output mirrors.
    #[serde(default)]
    pub links: Vec<LinkEntry>,
}

/// `[gpio]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GpioConfig {
    /// Registered driver name.
    #[serde(default = "default_driver")]
    pub driver: String,
    /// JSON policy file loaded by every peripheral.
    #[serde(default = "default_policy")]
    pub policy: PathBuf,
    /// Optional board map; the built-in Raspberry Pi header is used otherwise.
    #[serde(default)]
    pub board: Option<PathBuf>,
    /// Interval between interrupt processing passes.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_driver() -> String {
    "simulation".to_string()
}

fn default_policy() -> PathBuf {
    PathBuf::from(DEFAULT_POLICY_PATH)
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

impl GpioConfig {
    /// Poll interval as a `Duration`.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// A named input or output.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PeripheralEntry {
    /// Unique name.
    pub name: String,
    /// Pin number or alias.
    pub pin: PinId,
    /// Optional pull resistor (code or name).
    #[serde(default)]
    pub pull_resistor: Option<RawPull>,
}

impl PeripheralEntry {
    /// Construction input for this entry.
    pub fn pin_config(&self) -> PinConfig {
        PinConfig::Detailed {
            pin: self.pin.clone(),
            pull_resistor: self.pull_resistor.clone(),
        }
    }
}

/// Mirror the named input onto the named output.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkEntry {
    /// Source input name.
    pub input: String,
    /// Destination output name.
    pub output: String,
}

impl FlowgateConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if:
    /// - the shared section is invalid
    /// - `driver` is empty or `poll_interval_ms` is zero
    /// - a peripheral name is empty or used twice
    /// - a link references an unknown input or output
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        if self.gpio.driver.is_empty() {
            return Err(ConfigError::ValidationError(
                "gpio.driver cannot be empty".to_string(),
            ));
        }
        if self.gpio.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "gpio.poll_interval_ms must be greater than zero".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for entry in self.outputs.iter().chain(&self.inputs) {
            if entry.name.is_empty() {
                return Err(ConfigError::ValidationError(
                    "peripheral name cannot be empty".to_string(),
                ));
            }
            if !names.insert(entry.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate peripheral name '{}'",
                    entry.name
                )));
            }
        }

        for link in &self.links {
            if !self.inputs.iter().any(|i| i.name == link.input) {
                return Err(ConfigError::ValidationError(format!(
                    "link references unknown input '{}'",
                    link.input
                )));
            }
            if !self.outputs.iter().any(|o| o.name == link.output) {
                return Err(ConfigError::ValidationError(format!(
                    "link references unknown output '{}'",
                    link.output
                )));
            }
        }

        Ok(())
    }
}

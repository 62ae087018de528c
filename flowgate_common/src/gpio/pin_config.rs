//! Pin configuration normalization.
//!
//! A peripheral accepts either a bare pin identifier or a detailed
//! `{ pin, pull_resistor }` configuration. [`normalize`] validates the input
//! and produces the canonical [`PinSpec`] the peripheral keeps for its
//! lifetime.
//!
//! Pull resistors may be given as a numeric code (`0`, `1`, `2`) or a name
//! (`"none"`, `"down"`, `"up"`), which is how they arrive from TOML or JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::gpio::types::{PinId, PullResistor};

/// Errors raised while validating a pin configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PinConfigError {
    /// Pull resistor value is not one of the recognized modes.
    #[error("Invalid pull resistor option {0}")]
    InvalidPullResistor(String),

    /// Input is neither a pin identifier nor a configuration object.
    #[error("Invalid pin or configuration: {0}")]
    InvalidPinOrConfiguration(String),

    /// Pin identifier is not known to the board.
    #[error("Invalid pin {0}")]
    UnknownPin(String),
}

/// Pull resistor as written by the user, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPull {
    /// Numeric code
    Code(i64),
    /// Mode name
    Name(String),
}

impl RawPull {
    fn resolve(&self) -> Option<PullResistor> {
        match self {
            RawPull::Code(code) => PullResistor::from_code(*code),
            RawPull::Name(name) => PullResistor::from_name(name),
        }
    }
}

impl From<PullResistor> for RawPull {
    fn from(pull: PullResistor) -> Self {
        RawPull::Code(pull.code() as i64)
    }
}

impl std::fmt::Display for RawPull {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawPull::Code(code) => write!(f, "{code}"),
            RawPull::Name(name) => f.write_str(name),
        }
    }
}

/// Construction input of a peripheral.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PinConfig {
    /// Bare pin identifier; pull resistor defaults to none.
    Bare(PinId),
    /// Pin with an optional pull resistor.
    Detailed {
        /// Pin identifier
        pin: PinId,
        /// Requested pull resistor
        #[serde(default, alias = "pullResistor")]
        pull_resistor: Option<RawPull>,
    },
}

impl PinConfig {
    /// Detailed configuration with a known pull resistor.
    pub fn with_pull(pin: impl Into<PinId>, pull: PullResistor) -> Self {
        PinConfig::Detailed {
            pin: pin.into(),
            pull_resistor: Some(pull.into()),
        }
    }

    /// Decode a configuration from an arbitrary JSON value.
    ///
    /// Accepts a non-negative integer, a string, or an object with a `pin`
    /// field and an optional `pullResistor` / `pull_resistor` field. Every
    /// other shape is rejected with
    /// [`PinConfigError::InvalidPinOrConfiguration`].
    pub fn from_json(value: &Value) -> Result<Self, PinConfigError> {
        match value {
            Value::Number(_) | Value::String(_) => Ok(PinConfig::Bare(pin_from_json(value)?)),
            Value::Object(map) => {
                let pin = map
                    .get("pin")
                    .ok_or_else(|| invalid_shape(value))
                    .and_then(pin_from_json)?;
                let pull = map.get("pullResistor").or_else(|| map.get("pull_resistor"));
                let pull_resistor = match pull {
                    None | Some(Value::Null) => None,
                    Some(Value::Number(n)) => match n.as_i64() {
                        Some(code) => Some(RawPull::Code(code)),
                        None => return Err(PinConfigError::InvalidPullResistor(n.to_string())),
                    },
                    Some(Value::String(name)) => Some(RawPull::Name(name.clone())),
                    Some(other) => {
                        return Err(PinConfigError::InvalidPullResistor(other.to_string()));
                    }
                };
                Ok(PinConfig::Detailed { pin, pull_resistor })
            }
            _ => Err(invalid_shape(value)),
        }
    }
}

fn pin_from_json(value: &Value) -> Result<PinId, PinConfigError> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(PinId::Number)
            .ok_or_else(|| invalid_shape(value)),
        Value::String(alias) => Ok(PinId::Alias(alias.clone())),
        _ => Err(invalid_shape(value)),
    }
}

fn invalid_shape(value: &Value) -> PinConfigError {
    PinConfigError::InvalidPinOrConfiguration(value.to_string())
}

impl From<PinId> for PinConfig {
    fn from(pin: PinId) -> Self {
        PinConfig::Bare(pin)
    }
}

impl From<u32> for PinConfig {
    fn from(pin: u32) -> Self {
        PinConfig::Bare(pin.into())
    }
}

impl From<&str> for PinConfig {
    fn from(alias: &str) -> Self {
        PinConfig::Bare(alias.into())
    }
}

impl From<String> for PinConfig {
    fn from(alias: String) -> Self {
        PinConfig::Bare(alias.into())
    }
}

impl From<PinSpec> for PinConfig {
    fn from(spec: PinSpec) -> Self {
        PinConfig::with_pull(spec.pin, spec.pull_resistor)
    }
}

/// Normalized pin configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PinSpec {
    /// Pin identifier as given
    pub pin: PinId,
    /// Validated pull resistor mode
    pub pull_resistor: PullResistor,
}

/// Validate and normalize a pin configuration.
///
/// # Errors
/// Returns `PinConfigError::InvalidPullResistor` if a pull resistor is given
/// and is not one of the three recognized modes.
pub fn normalize(config: impl Into<PinConfig>) -> Result<PinSpec, PinConfigError> {
    match config.into() {
        PinConfig::Bare(pin) => Ok(PinSpec {
            pin,
            pull_resistor: PullResistor::None,
        }),
        PinConfig::Detailed { pin, pull_resistor } => {
            let pull_resistor = match pull_resistor {
                None => PullResistor::None,
                Some(raw) => raw
                    .resolve()
                    .ok_or_else(|| PinConfigError::InvalidPullResistor(raw.to_string()))?,
            };
            Ok(PinSpec { pin, pull_resistor })
        }
    }
}

//! Prelude module for common re-exports.
//!
//! ```rust
//! use flowgate_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};
pub use crate::gpio::config::FlowgateConfig;

// ─── GPIO ───────────────────────────────────────────────────────────
pub use crate::gpio::consts::{HIGH, LOW, PULL_DOWN, PULL_NONE, PULL_UP};
pub use crate::gpio::driver::{DriverError, GpioDriver, InterruptHandler};
pub use crate::gpio::pin_config::{PinConfig, PinConfigError, PinSpec, normalize};
pub use crate::gpio::types::{Edge, Level, LineMode, PinId, PullResistor};

// ─── Information flow ───────────────────────────────────────────────
pub use crate::ifc::label::{Label, Labeled, WriteValue};
pub use crate::ifc::policy::{AllowListEngine, FlowEngine, Policy, PolicyError};

//! System-wide constants for the flowgate workspace.
//!
//! Single source of truth for default paths and service names.

/// Canonical service name (used for logging).
pub const SERVICE_NAME: &str = "flowgate";

/// Default service configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/flowgate/flowgate.toml";

/// Default flow policy file path.
pub const DEFAULT_POLICY_PATH: &str = "/etc/flowgate/policy.json";

/// Default interval between interrupt processing passes, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10;

/// Prefix of every pin label (`pin-<line>`).
pub const LABEL_PREFIX: &str = "pin-";

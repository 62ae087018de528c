//! Peripheral error type.
//!
//! Every failure a peripheral can report, from construction to teardown.
//! Nothing is retried internally; each error surfaces at the call site.

use flowgate_common::gpio::driver::DriverError;
use flowgate_common::gpio::pin_config::PinConfigError;
use flowgate_common::ifc::label::Label;
use flowgate_common::ifc::policy::PolicyError;
use thiserror::Error;

/// Errors raised by digital inputs and outputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeripheralError {
    /// Malformed construction input.
    #[error("Configuration error: {0}")]
    Config(#[from] PinConfigError),

    /// Policy file missing, unreadable or undecodable.
    #[error("Policy load error: {0}")]
    PolicyLoad(#[from] PolicyError),

    /// A validated pin could not be mapped to a hardware line.
    #[error("Internal error: {0}")]
    Internal(String),

    /// The policy forbids the value's source from reaching this sink.
    #[error("Invalid flow from {origin} to {destination}")]
    FlowViolation {
        /// Label carried by the value
        origin: Label,
        /// Label of the peripheral
        destination: Label,
    },

    /// Value is neither LOW nor HIGH.
    #[error("Invalid write value {0}")]
    InvalidValue(i64),

    /// Operation on a destroyed peripheral.
    #[error("Attempted to {operation} a destroyed peripheral")]
    Destroyed {
        /// `"read from"` or `"write to"`
        operation: &'static str,
    },

    /// Driver failure.
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),
}

impl PeripheralError {
    pub(crate) fn destroyed_read() -> Self {
        Self::Destroyed {
            operation: "read from",
        }
    }

    pub(crate) fn destroyed_write() -> Self {
        Self::Destroyed {
            operation: "write to",
        }
    }
}

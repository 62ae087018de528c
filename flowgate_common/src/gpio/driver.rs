//! GPIO driver trait and error types.
//!
//! This module defines:
//! - `GpioDriver` trait - Interface for pluggable line drivers
//! - `DriverError` enum - Error types for driver operations
//! - `InterruptHandler` / `DriverFactory` type aliases
//! - `DriverDiagnostics` struct - Optional driver counters

use crate::gpio::types::{Edge, Level, LineMode, PullResistor};
use std::sync::Arc;
use thiserror::Error;

/// Error types for driver operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// Line has not been configured yet
    #[error("Line {0} is not configured")]
    NotConfigured(u32),

    /// Operation does not match the configured direction
    #[error("Line {line} is configured as {mode:?}")]
    WrongMode {
        /// Hardware line
        line: u32,
        /// Current direction of the line
        mode: LineMode,
    },

    /// Hardware communication error
    #[error("Hardware communication error: {0}")]
    Communication(String),

    /// Driver not found
    #[error("Driver not found: {0}")]
    DriverNotFound(String),
}

/// Callback invoked by the driver with the new level on every triggering edge.
///
/// Drivers may call it from their own thread; it must not block.
pub type InterruptHandler = Box<dyn Fn(Level) + Send + Sync>;

/// Factory function type for creating driver instances.
pub type DriverFactory = fn() -> Arc<dyn GpioDriver>;

/// Optional driver diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverDiagnostics {
    /// Number of physical writes issued
    pub writes: u64,
    /// Number of physical reads issued
    pub reads: u64,
    /// Number of interrupt callbacks delivered
    pub interrupts_delivered: u64,
    /// Number of lines currently configured
    pub configured_lines: usize,
}

/// Trait defining the interface for GPIO line drivers.
///
/// Peripherals share one driver through an `Arc`, so every operation takes
/// `&self`; implementations use interior mutability.
///
/// # Lifecycle
///
/// 1. `configure()` - Called once per line when a peripheral is created
/// 2. `digital_read()` / `digital_write()` - Called on every transfer
/// 3. `enable_interrupt()` / `disable_interrupt()` - Input edge monitoring
pub trait GpioDriver: Send + Sync {
    /// Returns the driver's unique identifier (e.g., "simulation", "cdev").
    fn name(&self) -> &'static str;

    /// Returns the driver's semantic version.
    fn version(&self) -> &'static str;

    /// Configure a line for input or output with the given pull resistor.
    fn configure(&self, line: u32, mode: LineMode, pull: PullResistor) -> Result<(), DriverError>;

    /// Drive an output line.
    fn digital_write(&self, line: u32, level: Level) -> Result<(), DriverError>;

    /// Sample a line.
    fn digital_read(&self, line: u32) -> Result<Level, DriverError>;

    /// Start delivering edge notifications for a line.
    ///
    /// Replaces any handler previously installed on the line.
    fn enable_interrupt(
        &self,
        line: u32,
        edge: Edge,
        handler: InterruptHandler,
    ) -> Result<(), DriverError>;

    /// Stop delivering edge notifications and drop the handler.
    ///
    /// After this returns, the handler is never invoked again.
    fn disable_interrupt(&self, line: u32) -> Result<(), DriverError>;

    /// Get driver-specific diagnostics.
    /// Default: None
    fn diagnostics(&self) -> Option<DriverDiagnostics> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_error_display() {
        let err = DriverError::NotConfigured(17);
        assert!(err.to_string().contains("17"));

        let err = DriverError::WrongMode {
            line: 4,
            mode: LineMode::Input,
        };
        assert!(err.to_string().contains("Input"));

        let err = DriverError::DriverNotFound("cdev".to_string());
        assert!(err.to_string().contains("cdev"));
    }

    #[test]
    fn test_driver_diagnostics_default() {
        let diag = DriverDiagnostics::default();
        assert_eq!(diag.writes, 0);
        assert_eq!(diag.reads, 0);
        assert_eq!(diag.interrupts_delivered, 0);
        assert_eq!(diag.configured_lines, 0);
    }
}

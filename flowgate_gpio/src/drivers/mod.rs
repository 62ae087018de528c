//! GPIO driver implementations.
//!
//! This module contains all built-in driver implementations:
//!
//! - [`simulation`] - In-memory lines for development and testing
//!
//! # Adding New Drivers
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement the `GpioDriver` trait from `flowgate_common::gpio::driver`
//! 3. Register the driver in [`register_builtin_drivers`]

pub mod simulation;

use crate::driver_registry::DriverRegistry;

/// Register all built-in drivers in `registry`.
pub fn register_builtin_drivers(registry: &mut DriverRegistry) {
    registry.register("simulation", simulation::create_driver);
}

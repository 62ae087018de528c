//! Simulation driver module.
//!
//! This module provides an in-memory GPIO driver for development and testing
//! without physical hardware.

mod driver;
mod line;

pub use driver::SimulationDriver;

use flowgate_common::gpio::driver::GpioDriver;
use std::sync::Arc;

/// Factory function to create a simulation driver instance.
pub fn create_driver() -> Arc<dyn GpioDriver> {
    Arc::new(SimulationDriver::new())
}

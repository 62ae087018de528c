//! GPIO types, constants and the hardware driver contract.
//!
//! This module contains everything a peripheral needs to talk about a
//! physical digital line without depending on a concrete driver.

pub mod config;
pub mod consts;
pub mod driver;
pub mod pin_config;
pub mod types;

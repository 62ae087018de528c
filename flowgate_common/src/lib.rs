//! Flowgate Common Library
//!
//! This crate provides the shared vocabulary of the flowgate workspace:
//! digital levels and pull resistor modes, pin configuration normalization,
//! provenance labels, flow policies and the GPIO driver contract.
//!
//! # Module Structure
//!
//! - [`consts`] - Workspace-wide constants and default paths
//! - [`config`] - Configuration loading traits and types
//! - [`gpio`] - GPIO types, driver trait, pin configuration and service config
//! - [`ifc`] - Labels, labeled values and flow policies
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use flowgate_common::prelude::*;
//!
//! let spec = normalize("GPIO17").unwrap();
//! assert_eq!(spec.pull_resistor, PullResistor::None);
//! ```

pub mod config;
pub mod consts;
pub mod gpio;
pub mod ifc;
pub mod prelude;

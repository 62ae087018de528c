//! # Flowgate GPIO Library
//!
//! Label-checked digital GPIO peripherals with a pluggable driver
//! architecture.
//!
//! Every value written to a [`DigitalOutput`] may carry the label of its
//! source. Before the line is touched, the output asks its flow engine
//! whether that label may flow to the output's own label under the policy
//! loaded at construction. Every value read from a [`DigitalInput`] is tagged
//! with the input's label, so values forwarded from inputs to outputs are
//! always checked.
//!
//! # Module Structure
//!
//! - [`board`] - Pin aliasing and board mapping
//! - [`bridge`] - Input-to-output mirroring service
//! - [`context`] - Shared collaborators for peripheral construction
//! - [`driver_registry`] - Driver factory registration
//! - [`drivers`] - Driver implementations
//! - [`error`] - Peripheral error type
//! - [`input`] / [`output`] - The two peripherals
//! - [`notify`] - Change listeners
//! - [`peripheral`] - Lifecycle and aliveness
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       flowgate_gpio                              │
//! │  ┌─────────────┐    ┌──────────────┐    ┌─────────────────────┐  │
//! │  │ PinConfig   │───►│ GpioContext  │◄──►│  Driver Registry    │  │
//! │  │ (normalize) │    │ board+engine │    │                     │  │
//! │  └─────────────┘    └──────┬───────┘    └─────────────────────┘  │
//! │                            │                                     │
//! │               ┌────────────┴────────────┐                        │
//! │               ▼                         ▼                        │
//! │      ┌────────────────┐        ┌────────────────┐                │
//! │      │ DigitalOutput  │        │ DigitalInput   │                │
//! │      │ flow gate      │        │ label tagging  │                │
//! │      └───────┬────────┘        └───────┬────────┘                │
//! │              └──────────┬──────────────┘                         │
//! │                         ▼                                        │
//! │                ┌────────────────┐                                │
//! │                │  GpioDriver    │ (trait object)                 │
//! │                └────────────────┘                                │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]

pub mod board;
pub mod bridge;
pub mod context;
pub mod driver_registry;
pub mod drivers;
pub mod error;
pub mod input;
pub mod notify;
pub mod output;
pub mod peripheral;

// Re-export key types for convenience
pub use crate::board::{BoardMap, PinResolver};
pub use crate::bridge::Bridge;
pub use crate::context::GpioContext;
pub use crate::driver_registry::DriverRegistry;
pub use crate::error::PeripheralError;
pub use crate::input::DigitalInput;
pub use crate::output::DigitalOutput;

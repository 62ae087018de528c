//! Input-to-output bridge service.
//!
//! The `Bridge` owns the peripherals declared in `flowgate.toml` and mirrors
//! every linked input onto its outputs. Each forwarded value is the labeled
//! result of `DigitalInput::read`, so every transfer passes the output's
//! flow check. Rejected flows are logged and counted; the loop continues.

use flowgate_common::config::ConfigError;
use flowgate_common::gpio::config::{FlowgateConfig, GpioConfig};
use flowgate_common::gpio::driver::{DriverError, GpioDriver};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::board::BoardMap;
use crate::context::GpioContext;
use crate::driver_registry::DriverRegistry;
use crate::error::PeripheralError;
use crate::input::DigitalInput;
use crate::output::DigitalOutput;

/// Errors raised while setting up the bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Invalid configuration or board map.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Driver could not be created.
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// A declared peripheral could not be constructed.
    #[error("Peripheral '{name}': {source}")]
    Peripheral {
        /// Peripheral name from the configuration
        name: String,
        /// Construction failure
        source: PeripheralError,
    },
}

/// Counters for the bridge loop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BridgeStats {
    /// Completed cycles
    pub cycles: u64,
    /// Values written to outputs
    pub forwarded: u64,
    /// Writes rejected by the flow policy
    pub violations: u64,
    /// Reads or writes that failed for another reason
    pub failures: u64,
}

struct NamedInput {
    name: String,
    input: DigitalInput,
    /// Indices into `Bridge::outputs`
    targets: Vec<usize>,
}

struct NamedOutput {
    name: String,
    output: DigitalOutput,
}

/// Build the peripheral context described by the `[gpio]` section.
///
/// `driver_override` replaces the configured driver name.
pub fn build_context(
    gpio: &GpioConfig,
    registry: &DriverRegistry,
    driver_override: Option<&str>,
) -> Result<GpioContext, BridgeError> {
    let name = driver_override.unwrap_or(&gpio.driver);
    let driver = registry.create_driver(name)?;
    info!("Using driver '{}' v{}", driver.name(), driver.version());

    let ctx = GpioContext::new(driver);
    match &gpio.board {
        Some(path) => Ok(ctx.with_board(Arc::new(BoardMap::load(path)?))),
        None => Ok(ctx),
    }
}

/// Mirrors linked inputs onto outputs through the flow gate.
pub struct Bridge {
    inputs: Vec<NamedInput>,
    outputs: Vec<NamedOutput>,
    running: Arc<AtomicBool>,
    poll_interval: Duration,
    stats: BridgeStats,
}

impl Bridge {
    /// Construct every declared peripheral.
    ///
    /// # Errors
    /// Returns `BridgeError::Config` if the configuration is invalid and
    /// `BridgeError::Peripheral` for the first peripheral that fails.
    pub fn from_config(config: &FlowgateConfig, ctx: &GpioContext) -> Result<Self, BridgeError> {
        config.validate()?;
        let policy: &Path = &config.gpio.policy;

        let mut outputs = Vec::with_capacity(config.outputs.len());
        for entry in &config.outputs {
            let output = ctx
                .digital_output(entry.pin_config(), policy)
                .map_err(|source| BridgeError::Peripheral {
                    name: entry.name.clone(),
                    source,
                })?;
            outputs.push(NamedOutput {
                name: entry.name.clone(),
                output,
            });
        }

        let mut inputs = Vec::with_capacity(config.inputs.len());
        for entry in &config.inputs {
            let input = ctx
                .digital_input(entry.pin_config(), policy)
                .map_err(|source| BridgeError::Peripheral {
                    name: entry.name.clone(),
                    source,
                })?;
            let targets = config
                .links
                .iter()
                .filter(|link| link.input == entry.name)
                .filter_map(|link| outputs.iter().position(|o| o.name == link.output))
                .collect();
            inputs.push(NamedInput {
                name: entry.name.clone(),
                input,
                targets,
            });
        }

        info!(
            "Bridge created: {} inputs, {} outputs, {} links",
            inputs.len(),
            outputs.len(),
            config.links.len()
        );

        Ok(Self {
            inputs,
            outputs,
            running: Arc::new(AtomicBool::new(false)),
            poll_interval: config.gpio.poll_interval(),
            stats: BridgeStats::default(),
        })
    }

    /// Flag that keeps [`Bridge::run`] looping; clear it to stop.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Process pending edges on every input and forward changed inputs to
    /// their outputs. Returns the number of values written.
    pub fn cycle(&mut self) -> u64 {
        let before = self.stats.forwarded;
        for named in self.inputs.iter_mut() {
            if named.input.process_interrupts() == 0 || named.targets.is_empty() {
                continue;
            }
            let value = match named.input.read() {
                Ok(value) => value,
                Err(e) => {
                    error!("Failed to read input '{}': {}", named.name, e);
                    self.stats.failures += 1;
                    continue;
                }
            };
            for &idx in &named.targets {
                let target = &mut self.outputs[idx];
                match target.output.write(value.clone()) {
                    Ok(()) => {
                        debug!("'{}' -> '{}': {}", named.name, target.name, value.value());
                        self.stats.forwarded += 1;
                    }
                    Err(PeripheralError::FlowViolation { origin, destination }) => {
                        warn!(
                            "Flow from '{}' ({}) to '{}' ({}) denied by policy",
                            named.name, origin, target.name, destination
                        );
                        self.stats.violations += 1;
                    }
                    Err(e) => {
                        error!("Failed to write output '{}': {}", target.name, e);
                        self.stats.failures += 1;
                    }
                }
            }
        }
        self.stats.cycles += 1;
        self.stats.forwarded - before
    }

    /// Run [`Bridge::cycle`] every poll interval until the running flag is
    /// cleared.
    pub fn run(&mut self) {
        self.running.store(true, Ordering::SeqCst);
        info!("Bridge loop started (poll interval {:?})", self.poll_interval);
        while self.running.load(Ordering::SeqCst) {
            self.cycle();
            std::thread::sleep(self.poll_interval);
        }
        info!(
            "Bridge loop stopped after {} cycles ({} forwarded, {} denied)",
            self.stats.cycles, self.stats.forwarded, self.stats.violations
        );
    }

    /// Destroy every peripheral.
    pub fn shutdown(&mut self) {
        for named in self.inputs.iter_mut() {
            if let Err(e) = named.input.destroy() {
                warn!("Input '{}' teardown failed: {}", named.name, e);
            }
        }
        for named in self.outputs.iter_mut() {
            named.output.destroy();
        }
        info!("Bridge shut down");
    }

    /// Loop counters.
    pub fn stats(&self) -> BridgeStats {
        self.stats
    }

    /// Input by name.
    pub fn input(&self, name: &str) -> Option<&DigitalInput> {
        self.inputs.iter().find(|n| n.name == name).map(|n| &n.input)
    }

    /// Output by name.
    pub fn output(&self, name: &str) -> Option<&DigitalOutput> {
        self.outputs
            .iter()
            .find(|n| n.name == name)
            .map(|n| &n.output)
    }
}

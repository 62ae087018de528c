//! Shared collaborators for peripheral construction.
//!
//! A [`GpioContext`] bundles the driver, the board map and the flow engine.
//! It is cheap to clone; every peripheral keeps its own copy.

use flowgate_common::gpio::driver::GpioDriver;
use flowgate_common::gpio::pin_config::{PinConfig, PinSpec, normalize};
use flowgate_common::ifc::label::Label;
use flowgate_common::ifc::policy::{AllowListEngine, FlowEngine, Policy};
use std::path::Path;
use std::sync::Arc;

use crate::board::{BoardMap, PinResolver};
use crate::error::PeripheralError;
use crate::input::DigitalInput;
use crate::output::DigitalOutput;
use crate::peripheral::{Peripheral, resolve_line};

/// Driver, board and flow engine used by peripherals.
#[derive(Clone)]
pub struct GpioContext {
    driver: Arc<dyn GpioDriver>,
    board: Arc<dyn PinResolver>,
    engine: Arc<dyn FlowEngine>,
}

impl GpioContext {
    /// Context over `driver` with the Raspberry Pi header and the allow-list
    /// flow engine.
    pub fn new(driver: Arc<dyn GpioDriver>) -> Self {
        Self {
            driver,
            board: Arc::new(BoardMap::raspberry_pi()),
            engine: Arc::new(AllowListEngine),
        }
    }

    /// Replace the board map.
    pub fn with_board(mut self, board: Arc<dyn PinResolver>) -> Self {
        self.board = board;
        self
    }

    /// Replace the flow engine.
    pub fn with_engine(mut self, engine: Arc<dyn FlowEngine>) -> Self {
        self.engine = engine;
        self
    }

    /// Line driver.
    pub fn driver(&self) -> &dyn GpioDriver {
        self.driver.as_ref()
    }

    /// Board map.
    pub fn board(&self) -> &dyn PinResolver {
        self.board.as_ref()
    }

    /// Flow engine.
    pub fn engine(&self) -> &dyn FlowEngine {
        self.engine.as_ref()
    }

    /// Construct a digital output.
    pub fn digital_output(
        &self,
        config: impl Into<PinConfig>,
        policy: impl AsRef<Path>,
    ) -> Result<DigitalOutput, PeripheralError> {
        DigitalOutput::new(self, config, policy)
    }

    /// Construct a digital input.
    pub fn digital_input(
        &self,
        config: impl Into<PinConfig>,
        policy: impl AsRef<Path>,
    ) -> Result<DigitalInput, PeripheralError> {
        DigitalInput::new(self, config, policy)
    }

    /// Common construction steps: normalize, validate the pin, resolve the
    /// line and load the policy. No hardware is touched.
    pub(crate) fn bind(
        &self,
        config: PinConfig,
        policy: &Path,
    ) -> Result<Binding, PeripheralError> {
        let spec = normalize(config)?;
        let lifecycle = Peripheral::new(&spec.pin, self.board())?;
        let line = resolve_line(&spec.pin, lifecycle.pins()[0], self.board())?;
        let policy = Policy::load(policy)?;
        Ok(Binding {
            label: Label::for_line(line),
            spec,
            lifecycle,
            line,
            policy,
        })
    }
}

impl std::fmt::Debug for GpioContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpioContext")
            .field("driver", &self.driver.name())
            .finish_non_exhaustive()
    }
}

/// Result of [`GpioContext::bind`].
pub(crate) struct Binding {
    pub spec: PinSpec,
    pub lifecycle: Peripheral,
    pub line: u32,
    pub label: Label,
    pub policy: Policy,
}

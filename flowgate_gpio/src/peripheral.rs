//! Peripheral lifecycle.
//!
//! A [`Peripheral`] owns the logical pins of one input or output and its
//! aliveness flag. It is alive from construction until [`Peripheral::destroy`];
//! destruction is terminal.

use flowgate_common::gpio::pin_config::PinConfigError;
use flowgate_common::gpio::types::PinId;
use tracing::debug;

use crate::board::PinResolver;
use crate::error::PeripheralError;

/// Lifecycle state shared by every peripheral kind.
#[derive(Debug)]
pub struct Peripheral {
    pins: Vec<u32>,
    alive: bool,
}

impl Peripheral {
    /// Validate `pin` against the board and start a live peripheral on it.
    ///
    /// # Errors
    /// Returns `PinConfigError::UnknownPin` if the board does not know the pin.
    pub fn new(pin: &PinId, board: &dyn PinResolver) -> Result<Self, PeripheralError> {
        let logical = board
            .normalize(pin)
            .ok_or_else(|| PinConfigError::UnknownPin(pin.to_string()))?;
        Ok(Self {
            pins: vec![logical],
            alive: true,
        })
    }

    /// Logical pins held by this peripheral.
    pub fn pins(&self) -> &[u32] {
        &self.pins
    }

    /// Whether the peripheral is usable.
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Mark the peripheral destroyed.
    ///
    /// Returns `true` only for the call that actually tore it down.
    pub fn destroy(&mut self) -> bool {
        if !self.alive {
            return false;
        }
        self.alive = false;
        debug!("Peripheral on pins {:?} destroyed", self.pins);
        true
    }
}

/// Map a validated logical pin to its hardware line.
///
/// A missing mapping here means the board accepted the pin in
/// [`PinResolver::normalize`] but has no line for it.
pub(crate) fn resolve_line(
    alias: &PinId,
    logical: u32,
    board: &dyn PinResolver,
) -> Result<u32, PeripheralError> {
    board.resolve(logical).ok_or_else(|| {
        PeripheralError::Internal(format!(
            "{alias} was parsed as a valid pin, but couldn't be resolved to a GPIO line"
        ))
    })
}

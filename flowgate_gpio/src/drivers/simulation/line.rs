//! State of one simulated line.

use flowgate_common::gpio::driver::InterruptHandler;
use flowgate_common::gpio::types::{Edge, Level, LineMode, PullResistor};
use std::sync::Arc;

/// Interrupt subscription on a line.
pub(super) struct Subscription {
    pub edge: Edge,
    pub handler: Arc<InterruptHandler>,
}

/// One simulated GPIO line.
pub(super) struct SimLine {
    pub mode: LineMode,
    pub pull: PullResistor,
    pub level: Level,
    pub subscription: Option<Subscription>,
    pub writes: u64,
    pub disables: u64,
}

impl SimLine {
    /// New line; an input floats to the level its pull resistor biases it to.
    pub fn new(mode: LineMode, pull: PullResistor) -> Self {
        Self {
            mode,
            pull,
            level: bias(pull),
            subscription: None,
            writes: 0,
            disables: 0,
        }
    }

    /// Reconfigure an existing line, keeping its level and counters.
    pub fn reconfigure(&mut self, mode: LineMode, pull: PullResistor) {
        self.mode = mode;
        self.pull = pull;
    }

    /// Change the level; returns the handler to notify if the change triggers
    /// the subscribed edge.
    pub fn set_level(&mut self, level: Level) -> Option<Arc<InterruptHandler>> {
        let previous = self.level;
        self.level = level;
        self.subscription
            .as_ref()
            .filter(|s| s.edge.triggers(previous, level))
            .map(|s| Arc::clone(&s.handler))
    }
}

fn bias(pull: PullResistor) -> Level {
    match pull {
        PullResistor::Up => Level::High,
        PullResistor::None | PullResistor::Down => Level::Low,
    }
}

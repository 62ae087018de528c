//! Simulation GPIO driver.
//!
//! Keeps every line in memory. External stimulus is applied with
//! [`SimulationDriver::set_input`]; outputs can be wired to inputs with
//! [`SimulationDriver::connect`] so that writes propagate like a loopback
//! cable. Interrupt handlers are invoked outside the state lock, on the
//! caller's thread.

use flowgate_common::gpio::driver::{
    DriverDiagnostics, DriverError, GpioDriver, InterruptHandler,
};
use flowgate_common::gpio::types::{Edge, Level, LineMode, PullResistor};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace};

use super::line::{SimLine, Subscription};

#[derive(Default)]
struct SimState {
    lines: HashMap<u32, SimLine>,
    /// Output line -> input lines it drives
    links: HashMap<u32, Vec<u32>>,
    /// Lines whose reads and writes fail
    faults: HashSet<u32>,
    diagnostics: DriverDiagnostics,
}

impl SimState {
    fn line(&mut self, line: u32) -> Result<&mut SimLine, DriverError> {
        self.lines
            .get_mut(&line)
            .ok_or(DriverError::NotConfigured(line))
    }

    fn check_fault(&self, line: u32) -> Result<(), DriverError> {
        if self.faults.contains(&line) {
            return Err(DriverError::Communication(format!(
                "simulated fault on line {line}"
            )));
        }
        Ok(())
    }

    /// Drive `line` to `level`, collecting handlers to notify.
    fn drive(&mut self, line: u32, level: Level, notify: &mut Vec<Arc<InterruptHandler>>) {
        if let Some(sim) = self.lines.get_mut(&line) {
            if let Some(handler) = sim.set_level(level) {
                self.diagnostics.interrupts_delivered += 1;
                notify.push(handler);
            }
        }
    }
}

/// In-memory [`GpioDriver`].
#[derive(Default)]
pub struct SimulationDriver {
    state: Mutex<SimState>,
}

impl SimulationDriver {
    /// Create a driver with no configured lines.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply an external level to a line, firing its interrupt on a matching
    /// edge. Returns `false` if the line is not configured.
    pub fn set_input(&self, line: u32, level: Level) -> bool {
        let mut notify = Vec::new();
        {
            let mut state = self.state();
            if !state.lines.contains_key(&line) {
                return false;
            }
            state.drive(line, level, &mut notify);
        }
        trace!("sim line {} externally set to {}", line, level);
        for handler in notify {
            handler(level);
        }
        true
    }

    /// Wire `output` to `input`: every write to `output` also drives `input`.
    pub fn connect(&self, output: u32, input: u32) {
        debug!("sim line {} wired to line {}", output, input);
        self.state().links.entry(output).or_default().push(input);
    }

    /// Make reads and writes on `line` fail (or succeed again).
    pub fn set_fault(&self, line: u32, fault: bool) {
        let mut state = self.state();
        if fault {
            state.faults.insert(line);
        } else {
            state.faults.remove(&line);
        }
    }

    /// Current level of a line.
    pub fn level(&self, line: u32) -> Option<Level> {
        self.state().lines.get(&line).map(|l| l.level)
    }

    /// Configured direction of a line.
    pub fn mode(&self, line: u32) -> Option<LineMode> {
        self.state().lines.get(&line).map(|l| l.mode)
    }

    /// Configured pull resistor of a line.
    pub fn pull(&self, line: u32) -> Option<PullResistor> {
        self.state().lines.get(&line).map(|l| l.pull)
    }

    /// Number of successful writes to a line.
    pub fn write_count(&self, line: u32) -> u64 {
        self.state().lines.get(&line).map_or(0, |l| l.writes)
    }

    /// Number of `disable_interrupt` calls on a line.
    pub fn disable_count(&self, line: u32) -> u64 {
        self.state().lines.get(&line).map_or(0, |l| l.disables)
    }

    /// Whether a line currently has an interrupt handler.
    pub fn interrupt_enabled(&self, line: u32) -> bool {
        self.state()
            .lines
            .get(&line)
            .is_some_and(|l| l.subscription.is_some())
    }
}

impl GpioDriver for SimulationDriver {
    fn name(&self) -> &'static str {
        "simulation"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn configure(&self, line: u32, mode: LineMode, pull: PullResistor) -> Result<(), DriverError> {
        let mut state = self.state();
        match state.lines.get_mut(&line) {
            Some(existing) => existing.reconfigure(mode, pull),
            None => {
                state.lines.insert(line, SimLine::new(mode, pull));
            }
        }
        state.diagnostics.configured_lines = state.lines.len();
        debug!("sim line {} configured as {:?} (pull {:?})", line, mode, pull);
        Ok(())
    }

    fn digital_write(&self, line: u32, level: Level) -> Result<(), DriverError> {
        let mut notify = Vec::new();
        {
            let mut state = self.state();
            state.check_fault(line)?;
            let sim = state.line(line)?;
            if sim.mode != LineMode::Output {
                return Err(DriverError::WrongMode {
                    line,
                    mode: sim.mode,
                });
            }
            sim.writes += 1;
            state.drive(line, level, &mut notify);
            state.diagnostics.writes += 1;

            let targets = state.links.get(&line).cloned().unwrap_or_default();
            for target in targets {
                state.drive(target, level, &mut notify);
            }
        }
        for handler in notify {
            handler(level);
        }
        Ok(())
    }

    fn digital_read(&self, line: u32) -> Result<Level, DriverError> {
        let mut state = self.state();
        state.check_fault(line)?;
        let level = state.line(line)?.level;
        state.diagnostics.reads += 1;
        Ok(level)
    }

    fn enable_interrupt(
        &self,
        line: u32,
        edge: Edge,
        handler: InterruptHandler,
    ) -> Result<(), DriverError> {
        let mut state = self.state();
        state.line(line)?.subscription = Some(Subscription {
            edge,
            handler: Arc::new(handler),
        });
        debug!("sim line {} interrupt enabled on {:?} edge", line, edge);
        Ok(())
    }

    fn disable_interrupt(&self, line: u32) -> Result<(), DriverError> {
        let mut state = self.state();
        let sim = state.line(line)?;
        sim.subscription = None;
        sim.disables += 1;
        debug!("sim line {} interrupt disabled", line);
        Ok(())
    }

    fn diagnostics(&self) -> Option<DriverDiagnostics> {
        Some(self.state().diagnostics.clone())
    }
}

//! Digital input monitor.
//!
//! An input samples its line on demand with [`DigitalInput::read`] and also
//! tracks it through an either-edge interrupt. The driver's interrupt handler
//! only enqueues the new level; [`DigitalInput::process_interrupts`] applies
//! queued levels on the owner thread and emits `change`, so observer code
//! never runs in interrupt context. Queued edges are applied in arrival order.
//!
//! Every value leaving an input is tagged with the input's own label.

use flowgate_common::gpio::driver::GpioDriver;
use flowgate_common::gpio::pin_config::{PinConfig, PinSpec};
use flowgate_common::gpio::types::{Edge, Level, LineMode};
use flowgate_common::ifc::label::{Label, Labeled};
use flowgate_common::ifc::policy::Policy;
use std::path::Path;
use std::sync::mpsc::{self, Receiver};
use tracing::{debug, info, warn};

use crate::context::GpioContext;
use crate::error::PeripheralError;
use crate::notify::{ChangeNotifier, ListenerId};
use crate::peripheral::Peripheral;

/// Label-tagging digital input.
#[derive(Debug)]
pub struct DigitalInput {
    ctx: GpioContext,
    lifecycle: Peripheral,
    spec: PinSpec,
    line: u32,
    label: Label,
    policy: Policy,
    current: Level,
    notifier: ChangeNotifier<Level>,
    edges: Receiver<Level>,
}

impl DigitalInput {
    /// Create an input on `config`, loading its policy from `policy`.
    ///
    /// Configures the line, enables the edge interrupt and seeds the current
    /// value with one synchronous read.
    pub fn new(
        ctx: &GpioContext,
        config: impl Into<PinConfig>,
        policy: impl AsRef<Path>,
    ) -> Result<Self, PeripheralError> {
        let binding = ctx.bind(config.into(), policy.as_ref())?;
        let driver = ctx.driver();
        let line = binding.line;

        driver.configure(line, LineMode::Input, binding.spec.pull_resistor)?;

        let (tx, edges) = mpsc::channel();
        driver.enable_interrupt(
            line,
            Edge::Either,
            Box::new(move |level| {
                // Receiver gone means the input was dropped.
                let _ = tx.send(level);
            }),
        )?;

        let current = match driver.digital_read(line) {
            Ok(level) => level,
            Err(e) => {
                let _ = driver.disable_interrupt(line);
                return Err(e.into());
            }
        };

        info!(
            "Digital input {} ready on line {} (pin {}, pull {:?}, level {})",
            binding.label, line, binding.spec.pin, binding.spec.pull_resistor, current
        );

        Ok(Self {
            ctx: ctx.clone(),
            lifecycle: binding.lifecycle,
            spec: binding.spec,
            line,
            label: binding.label,
            policy: binding.policy,
            current,
            notifier: ChangeNotifier::new(),
            edges,
        })
    }

    /// Sample the line and return the level tagged with this input's label.
    pub fn read(&mut self) -> Result<Labeled<Level>, PeripheralError> {
        if !self.lifecycle.is_alive() {
            return Err(PeripheralError::destroyed_read());
        }
        let level = self.ctx.driver().digital_read(self.line)?;
        self.current = level;
        Ok(Labeled::new(self.label.clone(), level))
    }

    /// Apply queued edge levels in order, emitting `change` for each.
    ///
    /// Returns the number of edges applied.
    pub fn process_interrupts(&mut self) -> usize {
        if !self.lifecycle.is_alive() {
            return 0;
        }
        let mut applied = 0;
        while let Ok(level) = self.edges.try_recv() {
            self.current = level;
            debug!("{} edge -> {}", self.label, level);
            self.notifier.emit(level);
            applied += 1;
        }
        applied
    }

    /// Last observed level.
    pub fn value(&self) -> Level {
        self.current
    }

    /// Label attached to every value read from this input.
    pub fn label(&self) -> &Label {
        &self.label
    }

    /// Policy snapshot loaded at construction.
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Hardware line.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Normalized configuration.
    pub fn spec(&self) -> &PinSpec {
        &self.spec
    }

    /// Logical pins.
    pub fn pins(&self) -> &[u32] {
        self.lifecycle.pins()
    }

    /// Whether the input is usable.
    pub fn is_alive(&self) -> bool {
        self.lifecycle.is_alive()
    }

    /// Register a `change` listener.
    pub fn on_change(&mut self, listener: impl FnMut(Level) + 'static) -> ListenerId {
        self.notifier.add(listener)
    }

    /// Remove a `change` listener.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.notifier.remove(id)
    }

    /// Destroy the input.
    ///
    /// The interrupt is disabled before the lifecycle is torn down, and edges
    /// still queued are discarded. Repeated calls do nothing. The input is
    /// destroyed even if the driver fails to disable the interrupt; that
    /// failure is returned.
    pub fn destroy(&mut self) -> Result<(), PeripheralError> {
        if !self.lifecycle.is_alive() {
            return Ok(());
        }
        let disabled = self.ctx.driver().disable_interrupt(self.line);
        self.lifecycle.destroy();
        let discarded = self.edges.try_iter().count();
        info!(
            "Digital input {} destroyed ({} pending edges discarded)",
            self.label, discarded
        );
        disabled.map_err(PeripheralError::from)
    }
}

impl Drop for DigitalInput {
    fn drop(&mut self) {
        if let Err(e) = self.destroy() {
            warn!("Failed to release input {}: {}", self.label, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::simulation::SimulationDriver;
    use flowgate_common::gpio::types::PullResistor;
    use std::cell::RefCell;
    use std::io::Write;
    use std::rc::Rc;
    use std::sync::Arc;
    use tempfile::NamedTempFile;

    fn setup() -> (Arc<SimulationDriver>, GpioContext, NamedTempFile) {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{}}").unwrap();
        file.flush().unwrap();
        let sim = Arc::new(SimulationDriver::new());
        let ctx = GpioContext::new(sim.clone());
        (sim, ctx, file)
    }

    #[test]
    fn construction_configures_and_seeds() {
        let (sim, ctx, policy) = setup();
        let input = DigitalInput::new(
            &ctx,
            PinConfig::with_pull("GPIO27", PullResistor::Up),
            policy.path(),
        )
        .unwrap();
        assert_eq!(sim.mode(27), Some(LineMode::Input));
        assert!(sim.interrupt_enabled(27));
        // Pull-up biases an undriven simulated line high.
        assert_eq!(input.value(), Level::High);
        assert_eq!(input.label().as_str(), "pin-27");
    }

    #[test]
    fn read_is_labeled_with_own_label() {
        let (sim, ctx, policy) = setup();
        let mut input = DigitalInput::new(&ctx, "GPIO27", policy.path()).unwrap();

        let v = input.read().unwrap();
        assert_eq!(v.label(), input.label());
        assert_eq!(*v.value(), Level::Low);

        sim.set_input(27, Level::High);
        let v = input.read().unwrap();
        assert_eq!(v.label().as_str(), "pin-27");
        assert_eq!(*v.value(), Level::High);
        assert_eq!(input.value(), Level::High);
    }

    #[test]
    fn edges_are_deferred_until_processed() {
        let (sim, ctx, policy) = setup();
        let mut input = DigitalInput::new(&ctx, "GPIO27", policy.path()).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        input.on_change(move |level| s.borrow_mut().push(level));

        sim.set_input(27, Level::High);
        sim.set_input(27, Level::Low);
        sim.set_input(27, Level::High);
        assert!(seen.borrow().is_empty());
        assert_eq!(input.value(), Level::Low);

        assert_eq!(input.process_interrupts(), 3);
        assert_eq!(*seen.borrow(), vec![Level::High, Level::Low, Level::High]);
        assert_eq!(input.value(), Level::High);
        assert_eq!(input.process_interrupts(), 0);
    }

    #[test]
    fn destroy_disables_interrupt_once() {
        let (sim, ctx, policy) = setup();
        let mut input = DigitalInput::new(&ctx, "GPIO27", policy.path()).unwrap();

        sim.set_input(27, Level::High);
        input.destroy().unwrap();
        input.destroy().unwrap();
        assert_eq!(sim.disable_count(27), 1);
        assert!(!sim.interrupt_enabled(27));

        assert_eq!(input.process_interrupts(), 0);
        assert_eq!(input.value(), Level::Low);
        assert_eq!(input.read(), Err(PeripheralError::destroyed_read()));
    }

    #[test]
    fn drop_releases_interrupt() {
        let (sim, ctx, policy) = setup();
        {
            let _input = DigitalInput::new(&ctx, "GPIO27", policy.path()).unwrap();
            assert!(sim.interrupt_enabled(27));
        }
        assert!(!sim.interrupt_enabled(27));
        assert_eq!(sim.disable_count(27), 1);
    }

    #[test]
    fn failed_initial_read_releases_interrupt() {
        let (sim, ctx, policy) = setup();
        sim.set_fault(27, true);
        let err = DigitalInput::new(&ctx, "GPIO27", policy.path()).unwrap_err();
        assert!(matches!(err, PeripheralError::Driver(_)));
        assert!(!sim.interrupt_enabled(27));
    }
}

//! Digital output gate.
//!
//! Every write passes the same chain, in this order:
//!
//! 1. A labeled value is unwrapped and its label checked against the policy
//!    (`can_flow_to(source, self.label)`). Raw values skip the check.
//! 2. The peripheral must be alive.
//! 3. The payload must be exactly LOW or HIGH.
//! 4. The driver write must succeed.
//!
//! Only then is the current value committed and `change` emitted. A failure
//! at any step leaves both the line and the current value untouched.

use flowgate_common::gpio::driver::GpioDriver;
use flowgate_common::gpio::pin_config::{PinConfig, PinSpec};
use flowgate_common::gpio::types::{Level, LineMode};
use flowgate_common::ifc::label::{Label, WriteValue};
use flowgate_common::ifc::policy::{FlowEngine, Policy};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::context::GpioContext;
use crate::error::PeripheralError;
use crate::notify::{ChangeNotifier, ListenerId};
use crate::peripheral::Peripheral;

/// Label-checked digital output.
#[derive(Debug)]
pub struct DigitalOutput {
    ctx: GpioContext,
    lifecycle: Peripheral,
    spec: PinSpec,
    line: u32,
    label: Label,
    policy: Policy,
    current: Option<Level>,
    notifier: ChangeNotifier<Level>,
}

impl DigitalOutput {
    /// Create an output on `config`, loading its policy from `policy`.
    ///
    /// # Errors
    /// - `Config` for malformed input or an unknown pin
    /// - `Internal` if the board cannot map a validated pin
    /// - `PolicyLoad` if the policy file cannot be loaded
    /// - `Driver` if the line cannot be configured
    pub fn new(
        ctx: &GpioContext,
        config: impl Into<PinConfig>,
        policy: impl AsRef<Path>,
    ) -> Result<Self, PeripheralError> {
        let binding = ctx.bind(config.into(), policy.as_ref())?;
        ctx.driver()
            .configure(binding.line, LineMode::Output, binding.spec.pull_resistor)?;

        info!(
            "Digital output {} ready on line {} (pin {})",
            binding.label, binding.line, binding.spec.pin
        );

        Ok(Self {
            ctx: ctx.clone(),
            lifecycle: binding.lifecycle,
            spec: binding.spec,
            line: binding.line,
            label: binding.label,
            policy: binding.policy,
            current: None,
            notifier: ChangeNotifier::new(),
        })
    }

    /// Write a raw or labeled value to the line.
    pub fn write(&mut self, value: impl Into<WriteValue>) -> Result<(), PeripheralError> {
        let raw = match value.into() {
            WriteValue::Labeled(labeled) => {
                let (origin, raw) = labeled.into_parts();
                if !self
                    .ctx
                    .engine()
                    .can_flow_to(&origin, &self.label, &self.policy)
                {
                    warn!("Rejected flow from {} to {}", origin, self.label);
                    return Err(PeripheralError::FlowViolation {
                        origin,
                        destination: self.label.clone(),
                    });
                }
                raw
            }
            WriteValue::Raw(raw) => raw,
        };

        if !self.lifecycle.is_alive() {
            return Err(PeripheralError::destroyed_write());
        }

        let level = Level::try_from(raw).map_err(PeripheralError::InvalidValue)?;

        self.ctx.driver().digital_write(self.line, level)?;
        self.current = Some(level);
        debug!("{} <- {}", self.label, level);
        self.notifier.emit(level);
        Ok(())
    }

    /// Last committed level; `None` before the first write.
    pub fn value(&self) -> Option<Level> {
        self.current
    }

    /// Label of this sink.
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

    /// Whether the output is usable.
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

    /// Destroy the output. Further writes fail; repeated calls are no-ops.
    pub fn destroy(&mut self) {
        if self.lifecycle.destroy() {
            info!("Digital output {} destroyed", self.label);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::simulation::SimulationDriver;
    use flowgate_common::ifc::label::Labeled;
    use std::cell::RefCell;
    use std::io::Write;
    use std::rc::Rc;
    use std::sync::Arc;
    use tempfile::NamedTempFile;

    fn policy_file(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{json}").unwrap();
        file.flush().unwrap();
        file
    }

    fn setup(json: &str) -> (Arc<SimulationDriver>, GpioContext, NamedTempFile) {
        let sim = Arc::new(SimulationDriver::new());
        let ctx = GpioContext::new(sim.clone());
        (sim, ctx, policy_file(json))
    }

    #[test]
    fn label_and_line_follow_resolution() {
        let (sim, ctx, policy) = setup("{}");
        let out = DigitalOutput::new(&ctx, "GPIO17", policy.path()).unwrap();
        assert_eq!(out.label().as_str(), "pin-17");
        assert_eq!(out.line(), 17);
        assert_eq!(out.pins(), &[11]);
        assert_eq!(out.value(), None);
        assert_eq!(sim.mode(17), Some(LineMode::Output));
    }

    #[test]
    fn raw_writes_commit_and_reach_the_line() {
        let (sim, ctx, policy) = setup("{}");
        let mut out = DigitalOutput::new(&ctx, "GPIO17", policy.path()).unwrap();

        out.write(Level::High).unwrap();
        assert_eq!(out.value(), Some(Level::High));
        assert_eq!(sim.level(17), Some(Level::High));

        out.write(0i64).unwrap();
        assert_eq!(out.value(), Some(Level::Low));
        assert_eq!(sim.level(17), Some(Level::Low));
        assert_eq!(sim.write_count(17), 2);
    }

    #[test]
    fn out_of_domain_value_is_rejected() {
        let (sim, ctx, policy) = setup("{}");
        let mut out = DigitalOutput::new(&ctx, "GPIO17", policy.path()).unwrap();
        out.write(Level::High).unwrap();

        assert_eq!(out.write(2i64), Err(PeripheralError::InvalidValue(2)));
        assert_eq!(out.value(), Some(Level::High));
        assert_eq!(sim.write_count(17), 1);
    }

    #[test]
    fn flow_violation_blocks_write() {
        let (sim, ctx, policy) = setup(r#"{"flows": {"pin-17": ["pin-17"]}}"#);
        let mut out = DigitalOutput::new(&ctx, "GPIO17", policy.path()).unwrap();

        out.write(Labeled::new("pin-17", Level::High)).unwrap();
        assert_eq!(out.value(), Some(Level::High));

        let err = out.write(Labeled::new("pin-99", Level::Low)).unwrap_err();
        assert_eq!(
            err,
            PeripheralError::FlowViolation {
                origin: "pin-99".into(),
                destination: "pin-17".into(),
            }
        );
        assert_eq!(out.value(), Some(Level::High));
        assert_eq!(sim.write_count(17), 1);
    }

    #[test]
    fn flow_check_precedes_liveness_check() {
        let (_sim, ctx, policy) = setup(r#"{"flows": {}}"#);
        let mut out = DigitalOutput::new(&ctx, "GPIO17", policy.path()).unwrap();
        out.destroy();

        assert!(matches!(
            out.write(Labeled::new("pin-3", 1i64)),
            Err(PeripheralError::FlowViolation { .. })
        ));
        assert!(matches!(
            out.write(1i64),
            Err(PeripheralError::Destroyed { .. })
        ));
        assert!(matches!(
            out.write(5i64),
            Err(PeripheralError::Destroyed { .. })
        ));
    }

    #[test]
    fn change_listeners_receive_committed_levels() {
        let (_sim, ctx, policy) = setup("{}");
        let mut out = DigitalOutput::new(&ctx, "GPIO17", policy.path()).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let id = out.on_change(move |level| s.borrow_mut().push(level));

        out.write(Level::High).unwrap();
        let _ = out.write(9i64);
        out.write(Level::Low).unwrap();
        assert!(out.remove_listener(id));
        out.write(Level::High).unwrap();

        assert_eq!(*seen.borrow(), vec![Level::High, Level::Low]);
    }

    #[test]
    fn driver_failure_leaves_state_unchanged() {
        let (sim, ctx, policy) = setup("{}");
        let mut out = DigitalOutput::new(&ctx, "GPIO17", policy.path()).unwrap();
        out.write(Level::Low).unwrap();

        sim.set_fault(17, true);
        assert!(matches!(
            out.write(Level::High),
            Err(PeripheralError::Driver(_))
        ));
        assert_eq!(out.value(), Some(Level::Low));
        assert_eq!(sim.level(17), Some(Level::Low));
    }
}

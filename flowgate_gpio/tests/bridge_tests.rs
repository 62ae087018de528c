//! Bridge service tests.
//!
//! Builds the bridge from a `flowgate.toml` written to a temp directory and
//! drives its inputs through the simulation driver.

use flowgate_common::config::{ConfigError, ConfigLoader};
use flowgate_common::gpio::config::FlowgateConfig;
use flowgate_common::gpio::driver::GpioDriver;
use flowgate_common::gpio::types::Level;
use flowgate_gpio::bridge::{Bridge, BridgeError, build_context};
use flowgate_gpio::drivers::simulation::SimulationDriver;
use flowgate_gpio::{DriverRegistry, GpioContext, PeripheralError, PinResolver};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn write_config(dir: &Path, policy: &str) -> FlowgateConfig {
    let policy_path = dir.join("policy.json");
    fs::write(&policy_path, policy).unwrap();
    let text = format!(
        r#"
[shared]
service_name = "bridge-test"

[gpio]
policy = "{}"

[[outputs]]
name = "relay"
pin = "GPIO17"

[[outputs]]
name = "lamp"
pin = "GPIO22"

[[inputs]]
name = "button"
pin = 13
pull_resistor = "down"

[[links]]
input = "button"
output = "relay"

[[links]]
input = "button"
output = "lamp"
"#,
        policy_path.display()
    );
    let config_path = dir.join("flowgate.toml");
    fs::write(&config_path, text).unwrap();
    FlowgateConfig::load(&config_path).unwrap()
}

#[test]
fn forwards_permitted_flows_and_counts_denials() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), r#"{"flows": {"pin-27": ["pin-17"]}}"#);
    let sim = Arc::new(SimulationDriver::new());
    let ctx = GpioContext::new(sim.clone());
    let mut bridge = Bridge::from_config(&config, &ctx).unwrap();

    assert_eq!(bridge.cycle(), 0);

    sim.set_input(27, Level::High);
    assert_eq!(bridge.cycle(), 1);
    assert_eq!(sim.level(17), Some(Level::High));
    assert_eq!(sim.level(22), Some(Level::Low));
    assert_eq!(
        bridge.output("relay").and_then(|o| o.value()),
        Some(Level::High)
    );
    assert_eq!(bridge.output("lamp").and_then(|o| o.value()), None);

    let stats = bridge.stats();
    assert_eq!(stats.cycles, 2);
    assert_eq!(stats.forwarded, 1);
    assert_eq!(stats.violations, 1);
    assert_eq!(stats.failures, 0);
}

#[test]
fn shutdown_destroys_everything() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), r#"{"flows": {"*": ["*"]}}"#);
    let sim = Arc::new(SimulationDriver::new());
    let ctx = GpioContext::new(sim.clone());
    let mut bridge = Bridge::from_config(&config, &ctx).unwrap();

    bridge.shutdown();
    assert!(!bridge.input("button").unwrap().is_alive());
    assert!(!bridge.output("relay").unwrap().is_alive());
    assert!(!sim.interrupt_enabled(27));

    sim.set_input(27, Level::High);
    assert_eq!(bridge.cycle(), 0);
}

#[test]
fn run_stops_when_flag_cleared() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "{}");
    let sim = Arc::new(SimulationDriver::new());
    let mut bridge = Bridge::from_config(&config, &GpioContext::new(sim)).unwrap();

    let running = bridge.running_flag();
    let stopper = std::thread::spawn(move || {
        std::thread::sleep(std::time::Duration::from_millis(50));
        running.store(false, std::sync::atomic::Ordering::SeqCst);
    });
    bridge.run();
    stopper.join().unwrap();
    assert!(bridge.stats().cycles > 0);
}

#[test]
fn peripheral_failures_name_the_entry() {
    let dir = TempDir::new().unwrap();
    let mut config = write_config(dir.path(), "{}");
    config.outputs[1].pin = "GPIO99".into();
    let ctx = GpioContext::new(Arc::new(SimulationDriver::new()));

    match Bridge::from_config(&config, &ctx) {
        Err(BridgeError::Peripheral { name, source }) => {
            assert_eq!(name, "lamp");
            assert!(matches!(source, PeripheralError::Config(_)));
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("bridge accepted an unknown pin"),
    }
}

#[test]
fn invalid_config_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mut config = write_config(dir.path(), "{}");
    config.links[0].output = "siren".into();
    let ctx = GpioContext::new(Arc::new(SimulationDriver::new()));
    assert!(matches!(
        Bridge::from_config(&config, &ctx),
        Err(BridgeError::Config(ConfigError::ValidationError(_)))
    ));
}

#[test]
fn context_from_config() {
    let dir = TempDir::new().unwrap();
    let mut config = write_config(dir.path(), "{}");
    let registry = DriverRegistry::with_builtin_drivers();

    let ctx = build_context(&config.gpio, &registry, None).unwrap();
    assert_eq!(ctx.driver().name(), "simulation");

    assert!(matches!(
        build_context(&config.gpio, &registry, Some("cdev")),
        Err(BridgeError::Driver(_))
    ));

    let board = dir.path().join("board.toml");
    fs::write(
        &board,
        "[[pins]]\nheader = 1\ngpio = 4\naliases = [\"LED\"]\n",
    )
    .unwrap();
    config.gpio.board = Some(board);
    let ctx = build_context(&config.gpio, &registry, None).unwrap();
    assert_eq!(ctx.board().normalize(&"LED".into()), Some(1));
    assert_eq!(ctx.board().resolve(1), Some(4));
}

//! Public GPIO constants.
//!
//! Stable named values for the two digital levels and the three pull
//! resistor modes.

use crate::gpio::types::{Level, PullResistor};

/// Logic low (0).
pub const LOW: Level = Level::Low;

/// Logic high (1).
pub const HIGH: Level = Level::High;

/// No pull resistor.
pub const PULL_NONE: PullResistor = PullResistor::None;

/// Pull-down resistor.
pub const PULL_DOWN: PullResistor = PullResistor::Down;

/// Pull-up resistor.
pub const PULL_UP: PullResistor = PullResistor::Up;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_codes() {
        assert_eq!(i64::from(LOW), 0);
        assert_eq!(i64::from(HIGH), 1);
        assert_eq!(PULL_NONE.code(), 0);
        assert_eq!(PULL_DOWN.code(), 1);
        assert_eq!(PULL_UP.code(), 2);
    }
}

//! GPIO data types.
//!
//! This module defines the value types shared between peripherals and drivers:
//! - `Level` - The two legal digital values
//! - `PullResistor` - Input bias configuration
//! - `LineMode` / `Edge` - Line direction and interrupt trigger
//! - `PinId` - Logical pin identifier (number or alias)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Digital line level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Level {
    /// Logic low (0)
    #[default]
    Low = 0,
    /// Logic high (1)
    High = 1,
}

impl Level {
    /// Returns `true` for `High`.
    #[inline]
    pub fn is_high(self) -> bool {
        self == Level::High
    }

    /// Opposite level.
    #[inline]
    pub fn toggled(self) -> Self {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

/// Conversion from a raw value; the rejected value is returned as the error.
impl TryFrom<i64> for Level {
    type Error = i64;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Level::Low),
            1 => Ok(Level::High),
            other => Err(other),
        }
    }
}

impl From<Level> for i64 {
    fn from(level: Level) -> Self {
        level as i64
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high { Level::High } else { Level::Low }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

/// Pull resistor configuration for a line.
///
/// Numeric codes follow the common `PUD_OFF / PUD_DOWN / PUD_UP` convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullResistor {
    /// Floating input
    #[default]
    None = 0,
    /// Pull-down to ground
    Down = 1,
    /// Pull-up to supply
    Up = 2,
}

impl PullResistor {
    /// Numeric code of this mode.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Mode for a numeric code, if recognized.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::None),
            1 => Some(Self::Down),
            2 => Some(Self::Up),
            _ => None,
        }
    }

    /// Mode for a case-insensitive name (`none`/`off`, `down`, `up`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "none" | "off" => Some(Self::None),
            "down" => Some(Self::Down),
            "up" => Some(Self::Up),
            _ => None,
        }
    }
}

/// Direction a line is configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineMode {
    /// Line is read
    Input,
    /// Line is driven
    Output,
}

/// Interrupt trigger edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    /// Low to high transitions
    Rising,
    /// High to low transitions
    Falling,
    /// Any transition
    Either,
}

impl Edge {
    /// Whether a transition from `from` to `to` triggers this edge.
    pub fn triggers(self, from: Level, to: Level) -> bool {
        if from == to {
            return false;
        }
        match self {
            Edge::Rising => to == Level::High,
            Edge::Falling => to == Level::Low,
            Edge::Either => true,
        }
    }
}

/// Logical pin identifier as supplied by the user.
///
/// Numbers are board header pin numbers; aliases are board-specific names
/// such as `"GPIO17"` or `"P1-11"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PinId {
    /// Header pin number
    Number(u32),
    /// Named alias
    Alias(String),
}

impl From<u32> for PinId {
    fn from(n: u32) -> Self {
        PinId::Number(n)
    }
}

impl From<&str> for PinId {
    fn from(alias: &str) -> Self {
        PinId::Alias(alias.to_string())
    }
}

impl From<String> for PinId {
    fn from(alias: String) -> Self {
        PinId::Alias(alias)
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinId::Number(n) => write!(f, "{n}"),
            PinId::Alias(a) => f.write_str(a),
        }
    }
}

//! Board pin mapping.
//!
//! Translates user-facing pin identifiers into hardware GPIO lines in two
//! steps:
//!
//! 1. [`PinResolver::normalize`] - validates a number or alias and returns the
//!    logical (header) pin. Used by the peripheral lifecycle.
//! 2. [`PinResolver::resolve`] - maps a logical pin to its hardware line.
//!
//! A pin that passes step 1 but fails step 2 means the board table is
//! inconsistent; peripherals report it as an internal error.
//!
//! # Board file
//!
//! ```toml
//! [[pins]]
//! header = 11
//! gpio = 17
//! aliases = ["GPIO17", "P1-11"]
//! ```

use flowgate_common::config::{ConfigError, ConfigLoader};
use flowgate_common::gpio::types::PinId;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Pin aliasing and board-mapping collaborator.
pub trait PinResolver: Send + Sync {
    /// Logical pin for a number or alias, if the board knows it.
    fn normalize(&self, pin: &PinId) -> Option<u32>;

    /// Hardware GPIO line of a logical pin.
    fn resolve(&self, logical: u32) -> Option<u32>;
}

/// One header pin.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoardPin {
    /// Header pin number (logical pin)
    pub header: u32,
    /// Hardware GPIO line, if the pin is wired to one
    #[serde(default)]
    pub gpio: Option<u32>,
    /// Names accepted in place of the header number
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BoardFile {
    pins: Vec<BoardPin>,
}

/// Raspberry Pi 40-pin header: (header pin, BCM line).
const RASPBERRY_PI_HEADER: [(u32, u32); 28] = [
    (3, 2),
    (5, 3),
    (7, 4),
    (8, 14),
    (10, 15),
    (11, 17),
    (12, 18),
    (13, 27),
    (15, 22),
    (16, 23),
    (18, 24),
    (19, 10),
    (21, 9),
    (22, 25),
    (23, 11),
    (24, 8),
    (26, 7),
    (27, 0),
    (28, 1),
    (29, 5),
    (31, 6),
    (32, 12),
    (33, 13),
    (35, 19),
    (36, 16),
    (37, 26),
    (38, 20),
    (40, 21),
];

/// Table-driven [`PinResolver`].
#[derive(Debug, Clone, Default)]
pub struct BoardMap {
    lines: HashMap<u32, Option<u32>>,
    aliases: HashMap<String, u32>,
}

impl BoardMap {
    /// Built-in Raspberry Pi 40-pin header.
    ///
    /// Header numbers are accepted directly; aliases are `GPIO<line>` and
    /// `P1-<header>`. Power and ground pins are not part of the map.
    pub fn raspberry_pi() -> Self {
        let mut map = Self::default();
        for (header, line) in RASPBERRY_PI_HEADER {
            map.lines.insert(header, Some(line));
            map.aliases.insert(format!("GPIO{line}"), header);
            map.aliases.insert(format!("P1-{header}"), header);
        }
        map
    }

    /// Build a map from explicit pins.
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` on a duplicate header number or
    /// alias.
    pub fn from_pins(pins: Vec<BoardPin>) -> Result<Self, ConfigError> {
        let mut map = Self::default();
        for pin in pins {
            if map.lines.insert(pin.header, pin.gpio).is_some() {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate header pin {}",
                    pin.header
                )));
            }
            for alias in pin.aliases {
                if map.aliases.insert(alias.clone(), pin.header).is_some() {
                    return Err(ConfigError::ValidationError(format!(
                        "duplicate pin alias '{alias}'"
                    )));
                }
            }
        }
        Ok(map)
    }

    /// Load a board map from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        info!("Loading board map from {:?}", path);
        let file = BoardFile::load(path)?;
        Self::from_pins(file.pins)
    }

    /// Number of known header pins.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl PinResolver for BoardMap {
    fn normalize(&self, pin: &PinId) -> Option<u32> {
        match pin {
            PinId::Number(n) => self.lines.contains_key(n).then_some(*n),
            PinId::Alias(alias) => self.aliases.get(alias).copied(),
        }
    }

    fn resolve(&self, logical: u32) -> Option<u32> {
        self.lines.get(&logical).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn raspberry_pi_aliases() {
        let board = BoardMap::raspberry_pi();
        assert_eq!(board.len(), 28);
        assert_eq!(board.normalize(&"GPIO17".into()), Some(11));
        assert_eq!(board.normalize(&"P1-11".into()), Some(11));
        assert_eq!(board.normalize(&PinId::Number(11)), Some(11));
        assert_eq!(board.resolve(11), Some(17));
        assert_eq!(board.resolve(27), Some(0));
    }

    #[test]
    fn raspberry_pi_rejects_power_pins() {
        let board = BoardMap::raspberry_pi();
        assert_eq!(board.normalize(&PinId::Number(1)), None);
        assert_eq!(board.normalize(&PinId::Number(6)), None);
        assert_eq!(board.normalize(&"GPIO99".into()), None);
    }

    #[test]
    fn unwired_pin_normalizes_but_does_not_resolve() {
        let board = BoardMap::from_pins(vec![BoardPin {
            header: 1,
            gpio: None,
            aliases: vec!["VCC".into()],
        }])
        .unwrap();
        assert_eq!(board.normalize(&"VCC".into()), Some(1));
        assert_eq!(board.resolve(1), None);
    }

    #[test]
    fn duplicates_rejected() {
        let pins = vec![
            BoardPin {
                header: 3,
                gpio: Some(2),
                aliases: vec!["A".into()],
            },
            BoardPin {
                header: 5,
                gpio: Some(3),
                aliases: vec!["A".into()],
            },
        ];
        assert!(matches!(
            BoardMap::from_pins(pins),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[[pins]]
header = 1
gpio = 4
aliases = ["LED"]

[[pins]]
header = 2
"#
        )
        .unwrap();
        file.flush().unwrap();

        let board = BoardMap::load(file.path()).unwrap();
        assert_eq!(board.normalize(&"LED".into()), Some(1));
        assert_eq!(board.resolve(1), Some(4));
        assert_eq!(board.resolve(2), None);
    }
}

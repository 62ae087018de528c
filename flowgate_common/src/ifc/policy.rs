//! Flow policies.
//!
//! A [`Policy`] is a JSON object loaded once per peripheral. Its shape is
//! opaque to the peripherals: only a [`FlowEngine`] interprets it.
//!
//! The shipped [`AllowListEngine`] reads an allow-list:
//!
//! ```json
//! { "flows": { "pin-17": ["pin-17", "pin-22"], "*": ["pin-5"] } }
//! ```
//!
//! A `"*"` destination permits every destination; a `"*"` source entry
//! applies to every source. Everything else is denied.

use serde_json::{Map, Value};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::ifc::label::Label;

/// Wildcard accepted by [`AllowListEngine`] on either side of a flow.
pub const WILDCARD: &str = "*";

/// Error raised while loading a policy file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// Policy file does not exist.
    #[error("Policy file not found: {0}")]
    NotFound(String),

    /// Policy file exists but could not be read.
    #[error("Failed to read policy file {path}: {reason}")]
    Unreadable {
        /// File path
        path: String,
        /// I/O error text
        reason: String,
    },

    /// Contents are not valid JSON.
    #[error("Failed to decode policy file {path}: {reason}")]
    Decode {
        /// File path
        path: String,
        /// Parser error text
        reason: String,
    },

    /// Valid JSON, but not an object.
    #[error("Policy file {0} must contain a JSON object")]
    NotAnObject(String),
}

/// Immutable policy snapshot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Policy {
    document: Map<String, Value>,
}

impl Policy {
    /// Load and decode a policy file.
    ///
    /// # Errors
    /// Returns `PolicyError` if the file is missing, unreadable, not JSON,
    /// or not a JSON object.
    pub fn load(path: &Path) -> Result<Self, PolicyError> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PolicyError::NotFound(display.clone())
            } else {
                PolicyError::Unreadable {
                    path: display.clone(),
                    reason: e.to_string(),
                }
            }
        })?;

        let value: Value = serde_json::from_str(&content).map_err(|e| PolicyError::Decode {
            path: display.clone(),
            reason: e.to_string(),
        })?;

        let policy = Self::from_value(value).ok_or(PolicyError::NotAnObject(display))?;
        debug!(
            "Loaded policy from {:?} ({} top-level keys)",
            path,
            policy.document.len()
        );
        Ok(policy)
    }

    /// Wrap an already decoded document; `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(document) => Some(Self { document }),
            _ => None,
        }
    }

    /// Raw document.
    pub fn document(&self) -> &Map<String, Value> {
        &self.document
    }

    /// Top-level entry.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.document.get(key)
    }
}

/// Flow-permission predicate over a policy.
///
/// Implementations must be pure: same inputs, same answer, no side effects.
pub trait FlowEngine: Send + Sync {
    /// Whether a value labeled `source` may be written to a sink labeled
    /// `destination`.
    fn can_flow_to(&self, source: &Label, destination: &Label, policy: &Policy) -> bool;
}

/// Allow-list interpretation of the `flows` table.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowListEngine;

impl AllowListEngine {
    fn allows(entry: Option<&Value>, destination: &Label) -> bool {
        entry
            .and_then(Value::as_array)
            .map(|targets| {
                targets
                    .iter()
                    .filter_map(Value::as_str)
                    .any(|t| t == WILDCARD || t == destination.as_str())
            })
            .unwrap_or(false)
    }
}

impl FlowEngine for AllowListEngine {
    fn can_flow_to(&self, source: &Label, destination: &Label, policy: &Policy) -> bool {
        let Some(flows) = policy.get("flows").and_then(Value::as_object) else {
            return false;
        };
        Self::allows(flows.get(source.as_str()), destination)
            || Self::allows(flows.get(WILDCARD), destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn policy(value: Value) -> Policy {
        Policy::from_value(value).unwrap()
    }

    #[test]
    fn load_valid_object() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"flows": {{"pin-17": ["pin-17"]}}}}"#).unwrap();
        file.flush().unwrap();

        let p = Policy::load(file.path()).unwrap();
        assert!(p.get("flows").is_some());
        assert_eq!(p.document().len(), 1);
    }

    #[test]
    fn load_missing_file() {
        let result = Policy::load(Path::new("/nonexistent/policy.json"));
        assert!(matches!(result, Err(PolicyError::NotFound(_))));
    }

    #[test]
    fn load_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ flows: ").unwrap();
        file.flush().unwrap();
        assert!(matches!(
            Policy::load(file.path()),
            Err(PolicyError::Decode { .. })
        ));
    }

    #[test]
    fn load_non_object() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[1, 2, 3]").unwrap();
        file.flush().unwrap();
        assert!(matches!(
            Policy::load(file.path()),
            Err(PolicyError::NotAnObject(_))
        ));
    }

    #[test]
    fn allow_list_exact_match() {
        let p = policy(json!({"flows": {"pin-17": ["pin-17"]}}));
        let engine = AllowListEngine;
        assert!(engine.can_flow_to(&"pin-17".into(), &"pin-17".into(), &p));
        assert!(!engine.can_flow_to(&"pin-99".into(), &"pin-17".into(), &p));
        assert!(!engine.can_flow_to(&"pin-17".into(), &"pin-5".into(), &p));
    }

    #[test]
    fn allow_list_wildcards() {
        let p = policy(json!({"flows": {"pin-3": ["*"], "*": ["pin-5"]}}));
        let engine = AllowListEngine;
        assert!(engine.can_flow_to(&"pin-3".into(), &"pin-40".into(), &p));
        assert!(engine.can_flow_to(&"pin-8".into(), &"pin-5".into(), &p));
        assert!(!engine.can_flow_to(&"pin-8".into(), &"pin-6".into(), &p));
    }

    #[test]
    fn malformed_entries_deny() {
        let engine = AllowListEngine;
        let src = Label::from("pin-3");
        let dst = Label::from("pin-5");
        for doc in [
            json!({}),
            json!({"flows": ["pin-3"]}),
            json!({"flows": {"pin-3": "pin-5"}}),
            json!({"flows": {"pin-3": [5]}}),
        ] {
            assert!(!engine.can_flow_to(&src, &dst, &policy(doc)));
        }
    }
}

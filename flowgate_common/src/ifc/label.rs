//! Labels and labeled values.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::consts::LABEL_PREFIX;
use crate::gpio::types::Level;

/// Opaque provenance / destination identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    /// Create a label from any string.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Label of a resolved hardware line: `pin-<line>`.
    pub fn for_line(line: u32) -> Self {
        Self(format!("{LABEL_PREFIX}{line}"))
    }

    /// Label text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Label {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Label {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A value tagged with the label of its source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Labeled<T> {
    label: Label,
    value: T,
}

impl<T> Labeled<T> {
    /// Tag `value` with `label`.
    pub fn new(label: impl Into<Label>, value: T) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }

    /// Source label.
    pub fn label(&self) -> &Label {
        &self.label
    }

    /// Tagged value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Split into label and value.
    pub fn into_parts(self) -> (Label, T) {
        (self.label, self.value)
    }

    /// Transform the value, keeping the label.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Labeled<U> {
        Labeled {
            label: self.label,
            value: f(self.value),
        }
    }
}

/// Input of an output write: a raw value, or one carrying its provenance.
///
/// Only labeled values are subject to the flow check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteValue {
    /// Untagged value, implicitly trusted
    Raw(i64),
    /// Tagged value, checked against the policy
    Labeled(Labeled<i64>),
}

impl WriteValue {
    /// Whether the value carries a label.
    pub fn is_labeled(&self) -> bool {
        matches!(self, WriteValue::Labeled(_))
    }

    /// Source label, if any.
    pub fn label(&self) -> Option<&Label> {
        match self {
            WriteValue::Raw(_) => None,
            WriteValue::Labeled(l) => Some(l.label()),
        }
    }

    /// Payload regardless of tagging.
    pub fn raw(&self) -> i64 {
        match self {
            WriteValue::Raw(v) => *v,
            WriteValue::Labeled(l) => *l.value(),
        }
    }
}

impl From<i64> for WriteValue {
    fn from(raw: i64) -> Self {
        WriteValue::Raw(raw)
    }
}

impl From<Level> for WriteValue {
    fn from(level: Level) -> Self {
        WriteValue::Raw(level.into())
    }
}

impl From<Labeled<i64>> for WriteValue {
    fn from(labeled: Labeled<i64>) -> Self {
        WriteValue::Labeled(labeled)
    }
}

impl From<Labeled<Level>> for WriteValue {
    fn from(labeled: Labeled<Level>) -> Self {
        WriteValue::Labeled(labeled.map(i64::from))
    }
}

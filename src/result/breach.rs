//! Breach shapes recorded on a check result.
//!
//! A breach is one violation of an expected configuration value. It comes in
//! exactly one of three shapes, fixed at creation:
//! - `ValueBreach` - a label and a bare value, no addressable key
//! - `KeyValueBreach` - a key and a single value (scalar mismatches)
//! - `KeyValuesBreach` - a key and a list of values (disallowed lists)
//!
//! The check type, check name and severity are shared by all shapes and can
//! only be set through [`Breach::set_common_values`].

use std::fmt;

use serde::Serialize;

use crate::types::{CheckType, Severity};

/// Discriminant of a breach shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BreachType {
    Value,
    KeyValue,
    KeyValues,
}

impl BreachType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Value => "value",
            Self::KeyValue => "key-value",
            Self::KeyValues => "key-values",
        }
    }
}

impl fmt::Display for BreachType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fields stamped on every breach by the check that records it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BreachCommon {
    check_type: CheckType,
    check_name: String,
    severity: Severity,
}

/// Breach with no key.
///
/// `"file not found: foo.ext"`: `file not found` is the value label,
/// `foo.ext` is the value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ValueBreach {
    #[serde(flatten)]
    common: BreachCommon,
    pub value_label: String,
    pub value: String,
    pub expected_value: String,
}

/// Breach with a key and a value.
///
/// `"[data] 'check.interval_days' equals '7', expected '8'"`: `data` is the
/// key label, `check.interval_days` the key, `equals` the value label, `7`
/// the value and `8` the expected value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct KeyValueBreach {
    #[serde(flatten)]
    common: BreachCommon,
    pub key_label: String,
    pub key: String,
    pub value_label: String,
    pub value: String,
    /// Set for mismatches, even when the expected value is empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_value: Option<String>,
}

/// Breach with a key and a list of values.
///
/// `"[user.role.editor] disallowed permissions: [administer site, import configuration]"`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct KeyValuesBreach {
    #[serde(flatten)]
    common: BreachCommon,
    pub key_label: String,
    pub key: String,
    pub value_label: String,
    pub values: Vec<String>,
}

/// A single recorded violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "breach-type", rename_all = "kebab-case")]
pub enum Breach {
    Value(ValueBreach),
    KeyValue(KeyValueBreach),
    KeyValues(KeyValuesBreach),
}

impl Breach {
    /// Create a value breach.
    pub fn value(value_label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Value(ValueBreach {
            value_label: value_label.into(),
            value: value.into(),
            ..Default::default()
        })
    }

    /// Create a key/value breach.
    pub fn key_value(
        key_label: impl Into<String>,
        key: impl Into<String>,
        value_label: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::KeyValue(KeyValueBreach {
            key_label: key_label.into(),
            key: key.into(),
            value_label: value_label.into(),
            value: value.into(),
            ..Default::default()
        })
    }

    /// Create a key/values breach.
    pub fn key_values(
        key_label: impl Into<String>,
        key: impl Into<String>,
        value_label: impl Into<String>,
        values: Vec<String>,
    ) -> Self {
        Self::KeyValues(KeyValuesBreach {
            key_label: key_label.into(),
            key: key.into(),
            value_label: value_label.into(),
            values,
            ..Default::default()
        })
    }

    /// Set the expected value. No-op for shapes without one.
    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        match &mut self {
            Self::Value(b) => b.expected_value = expected.into(),
            Self::KeyValue(b) => b.expected_value = Some(expected.into()),
            Self::KeyValues(_) => {}
        }
        self
    }

    /// Stamp the fields shared by every shape.
    pub fn set_common_values(&mut self, check_type: &CheckType, check_name: &str, severity: Severity) {
        let common = self.common_mut();
        common.check_type = check_type.clone();
        common.check_name = check_name.to_string();
        common.severity = severity;
    }

    fn common(&self) -> &BreachCommon {
        match self {
            Self::Value(b) => &b.common,
            Self::KeyValue(b) => &b.common,
            Self::KeyValues(b) => &b.common,
        }
    }

    fn common_mut(&mut self) -> &mut BreachCommon {
        match self {
            Self::Value(b) => &mut b.common,
            Self::KeyValue(b) => &mut b.common,
            Self::KeyValues(b) => &mut b.common,
        }
    }

    pub fn breach_type(&self) -> BreachType {
        match self {
            Self::Value(_) => BreachType::Value,
            Self::KeyValue(_) => BreachType::KeyValue,
            Self::KeyValues(_) => BreachType::KeyValues,
        }
    }

    pub fn check_type(&self) -> &CheckType {
        &self.common().check_type
    }

    pub fn check_name(&self) -> &str {
        &self.common().check_name
    }

    pub fn severity(&self) -> Severity {
        self.common().severity
    }

    /// Key label, empty for value breaches.
    pub fn key_label(&self) -> &str {
        match self {
            Self::Value(_) => "",
            Self::KeyValue(b) => &b.key_label,
            Self::KeyValues(b) => &b.key_label,
        }
    }

    /// Key, empty for value breaches.
    pub fn key(&self) -> &str {
        match self {
            Self::Value(_) => "",
            Self::KeyValue(b) => &b.key,
            Self::KeyValues(b) => &b.key,
        }
    }

    pub fn value_label(&self) -> &str {
        match self {
            Self::Value(b) => &b.value_label,
            Self::KeyValue(b) => &b.value_label,
            Self::KeyValues(b) => &b.value_label,
        }
    }

    /// Single value, empty for key/values breaches.
    pub fn single_value(&self) -> &str {
        match self {
            Self::Value(b) => &b.value,
            Self::KeyValue(b) => &b.value,
            Self::KeyValues(_) => "",
        }
    }

    /// List of values, empty unless this is a key/values breach.
    pub fn values(&self) -> &[String] {
        match self {
            Self::KeyValues(b) => &b.values,
            _ => &[],
        }
    }

    /// Expected value, empty for key/values breaches.
    pub fn expected_value(&self) -> &str {
        match self {
            Self::Value(b) => &b.expected_value,
            Self::KeyValue(b) => b.expected_value.as_deref().unwrap_or(""),
            Self::KeyValues(_) => "",
        }
    }
}

impl fmt::Display for Breach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(b) => {
                if b.value_label.is_empty() {
                    write!(f, "{}", b.value)?;
                } else {
                    write!(f, "{}: {}", b.value_label, b.value)?;
                }
                if !b.expected_value.is_empty() {
                    write!(f, ", expected {}", b.expected_value)?;
                }
                Ok(())
            }
            Self::KeyValue(b) => {
                write!(f, "[{}] '{}' {}", b.key_label, b.key, b.value_label)?;
                if !b.value.is_empty() || b.expected_value.is_some() {
                    write!(f, " '{}'", b.value)?;
                }
                if let Some(expected) = &b.expected_value {
                    write!(f, ", expected '{}'", expected)?;
                }
                Ok(())
            }
            Self::KeyValues(b) => write!(
                f,
                "[{}] {} {}: [{}]",
                b.key_label,
                b.value_label,
                b.key,
                b.values.join(", ")
            ),
        }
    }
}

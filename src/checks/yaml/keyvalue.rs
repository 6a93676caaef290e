//! Key/value rules and their evaluation against a YAML document.

use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;

use crate::checks::yaml::path::{PathError, YamlPath};
use crate::merge::dedup;

/// Error type for rule evaluation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyValueError {
    #[error("list of allowed or disallowed values not provided")]
    ListValuesMissing,
    #[error(transparent)]
    Path(#[from] PathError),
    /// One path error per top-level key of the document.
    #[error("{}", join_errors(.0))]
    PerKey(Vec<PathError>),
}

fn join_errors(errors: &[PathError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Outcome of evaluating one rule against one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyValueResult {
    Equal,
    NotEqual,
    NotFound,
    DisallowedFound,
}

/// An expected value, or allowed/disallowed values, at a path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct KeyValue {
    /// Path expression of the node to check.
    pub key: String,
    /// Expected scalar value; ignored for list rules.
    #[serde(default, deserialize_with = "scalar_string")]
    pub value: String,
    /// A missing node satisfies the rule.
    #[serde(default)]
    pub optional: bool,
    /// Compare the node's items against `allowed` or `disallowed`.
    #[serde(default)]
    pub is_list: bool,
    #[serde(default, deserialize_with = "scalar_strings")]
    pub allowed: Vec<String>,
    #[serde(default, deserialize_with = "scalar_strings")]
    pub disallowed: Vec<String>,
}

impl KeyValue {
    /// A scalar equality rule.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            ..Default::default()
        }
    }

    /// A list rule rejecting the given values.
    pub fn disallowed(key: impl Into<String>, values: &[&str]) -> Self {
        Self {
            key: key.into(),
            is_list: true,
            disallowed: values.iter().map(|v| v.to_string()).collect(),
            ..Default::default()
        }
    }

    /// A list rule accepting only the given values.
    pub fn allowed(key: impl Into<String>, values: &[&str]) -> Self {
        Self {
            key: key.into(),
            is_list: true,
            allowed: values.iter().map(|v| v.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// Evaluate the rule against a document.
    ///
    /// Returns the outcome and the offending values: the value found for
    /// `NotEqual`, the rejected items in document order for `DisallowedFound`,
    /// nothing otherwise.
    pub fn evaluate(&self, document: &Value) -> Result<(KeyValueResult, Vec<String>), KeyValueError> {
        if self.is_list && self.allowed.is_empty() == self.disallowed.is_empty() {
            return Err(KeyValueError::ListValuesMissing);
        }

        let path = match YamlPath::parse(&self.key) {
            Ok(path) => path,
            Err(err) => return Err(self.path_error(document, err)),
        };
        let found = path.find(document);

        if found.is_empty() {
            return Ok(if self.optional {
                (KeyValueResult::Equal, Vec::new())
            } else {
                (KeyValueResult::NotFound, Vec::new())
            });
        }

        if self.is_list {
            let items: Vec<&Value> = found.iter().flat_map(|node| list_items(node)).collect();
            let offending: Vec<String> = items
                .into_iter()
                .filter(|item| {
                    if self.disallowed.is_empty() {
                        !self.allowed.iter().any(|a| scalar_matches(item, a))
                    } else {
                        self.disallowed.iter().any(|d| scalar_matches(item, d))
                    }
                })
                .map(value_to_text)
                .collect();
            let offending = dedup(&offending);

            return Ok(if offending.is_empty() {
                (KeyValueResult::Equal, Vec::new())
            } else {
                (KeyValueResult::DisallowedFound, offending)
            });
        }

        if scalar_matches(found[0], &self.value) {
            Ok((KeyValueResult::Equal, Vec::new()))
        } else {
            Ok((KeyValueResult::NotEqual, vec![value_to_text(found[0])]))
        }
    }

    /// A wildcard list rule reports a bad path once per top-level key, with
    /// that key in place of the `*`.
    fn path_error(&self, document: &Value, err: PathError) -> KeyValueError {
        let rest = match self.key.strip_prefix("*.") {
            Some(rest) if self.is_list => rest,
            _ => return err.into(),
        };
        let keys = match document.as_mapping() {
            Some(mapping) if !mapping.is_empty() => mapping.keys(),
            _ => return err.into(),
        };
        let errors = keys
            .map(|key| {
                YamlPath::parse(&format!("{}.{}", value_to_text(key), rest))
                    .err()
                    .unwrap_or_else(|| err.clone())
            })
            .collect();
        KeyValueError::PerKey(errors)
    }
}

/// Items of a node for list comparison: sequence items, mapping keys, or the
/// scalar itself.
fn list_items(node: &Value) -> Vec<&Value> {
    match node {
        Value::Sequence(seq) => seq.iter().collect(),
        Value::Mapping(map) => map.keys().collect(),
        Value::Tagged(tagged) => list_items(&tagged.value),
        scalar => vec![scalar],
    }
}

/// Whether a node holds the expected scalar.
///
/// Strings compare as text. Other scalars compare as YAML values, so `7.10`
/// matches `"7.10"`, `0x1F` matches `"31"` and `~` matches `"null"`.
fn scalar_matches(node: &Value, expected: &str) -> bool {
    if value_to_text(node) == expected {
        return true;
    }
    match node {
        Value::Tagged(tagged) => scalar_matches(&tagged.value, expected),
        Value::Null | Value::Bool(_) | Value::Number(_) if !expected.is_empty() => {
            serde_yaml::from_str::<Value>(expected).is_ok_and(|parsed| parsed == *node)
        }
        _ => false,
    }
}

/// Display text of a node. Numbers are shown in their canonical form.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Tagged(tagged) => value_to_text(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => serde_yaml::to_string(value)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_text(&value))
}

fn scalar_strings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let values = Vec::<Value>::deserialize(deserializer)?;
    Ok(values.iter().map(value_to_text).collect())
}

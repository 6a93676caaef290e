//! Rule evaluation over parsed YAML documents.

use std::any::Any;
use std::collections::BTreeMap;

use log::{debug, trace};
use serde::Deserialize;
use serde_yaml::Value;

use crate::checks::yaml::keyvalue::{KeyValue, KeyValueError, KeyValueResult};
use crate::checks::yaml::path::{PathError, YamlPath};
use crate::checks::{Check, CheckBase, CheckError, downcast_same};
use crate::merge::{Merge, merge_slice};
use crate::result::Breach;
use crate::types::CheckType;

/// A check evaluating key/value rules against every document in its data map.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct YamlBase {
    #[serde(flatten)]
    pub base: CheckBase,
    #[serde(default)]
    pub values: Vec<KeyValue>,
    /// Parsed documents, keyed like the data map.
    #[serde(skip)]
    pub node_map: BTreeMap<String, Value>,
}

impl YamlBase {
    /// Start a new run without the documents of the previous one.
    pub fn init(&mut self, check_type: &CheckType) {
        self.base.init(check_type);
        self.node_map.clear();
    }

    /// Parse every raw document. A document that fails to parse is recorded
    /// as a breach and left out of the node map.
    pub fn unmarshal_data_map(&mut self) {
        let mut errors = Vec::new();
        for (key, data) in &self.base.data_map {
            match serde_yaml::from_slice::<Value>(data) {
                Ok(node) => {
                    trace!("Parsed document '{}'", key);
                    self.node_map.insert(key.clone(), node);
                }
                Err(err) => {
                    debug!("Failed to parse document '{}': {}", key, err);
                    errors.push(err.to_string());
                }
            }
        }
        for err in errors {
            self.base.add_breach(Breach::value("", err));
        }
    }

    /// Resolve a path in one document.
    pub fn lookup(&self, data_key: &str, path: &str) -> Result<Vec<&Value>, PathError> {
        let path = YamlPath::parse(path)?;
        Ok(self
            .node_map
            .get(data_key)
            .map(|node| path.find(node))
            .unwrap_or_default())
    }

    /// Evaluate one rule against one document.
    pub fn check_key_value(
        &self,
        kv: &KeyValue,
        data_key: &str,
    ) -> Result<(KeyValueResult, Vec<String>), KeyValueError> {
        match self.node_map.get(data_key) {
            Some(node) => kv.evaluate(node),
            None => kv.evaluate(&Value::Null),
        }
    }

    /// Evaluate a rule and record the outcome on the result.
    fn process_data(&mut self, kv: &KeyValue, data_key: &str) {
        let (kvr, values) = match self.check_key_value(kv, data_key) {
            Ok(outcome) => outcome,
            Err(KeyValueError::PerKey(errors)) => {
                for err in errors {
                    self.base.add_breach(Breach::value("", err.to_string()));
                }
                return;
            }
            Err(err) => {
                self.base.add_breach(Breach::value("", err.to_string()));
                return;
            }
        };
        trace!("[{}] '{}' evaluated to {:?}", data_key, kv.key, kvr);

        match kvr {
            KeyValueResult::Equal if kv.is_list => {
                self.base
                    .add_pass(format!("[{}] no disallowed '{}'", data_key, kv.key));
            }
            KeyValueResult::Equal => {
                self.base
                    .add_pass(format!("[{}] '{}' equals '{}'", data_key, kv.key, kv.value));
            }
            KeyValueResult::NotFound => {
                self.base
                    .add_breach(Breach::key_value(data_key, &kv.key, "not found", ""));
            }
            KeyValueResult::NotEqual => {
                let actual = values.into_iter().next().unwrap_or_default();
                self.base.add_breach(
                    Breach::key_value(data_key, &kv.key, "equals", actual).with_expected(&kv.value),
                );
            }
            KeyValueResult::DisallowedFound => {
                self.base
                    .add_breach(Breach::key_values(data_key, &kv.key, "disallowed", values));
            }
        }
    }

    /// Evaluate every rule against every document, documents in key order.
    pub fn run_check(&mut self) {
        let data_keys: Vec<String> = self.base.data_map.keys().cloned().collect();
        let values = self.values.clone();
        for data_key in &data_keys {
            for kv in &values {
                self.process_data(kv, data_key);
            }
        }
        debug!(
            "Check '{}': {} passes, {} failures",
            self.base.name,
            self.base.result.passes.len(),
            self.base.result.failures.len()
        );
    }
}

impl Merge for YamlBase {
    type Error = CheckError;

    fn merge(&mut self, other: &Self) -> Result<(), CheckError> {
        Merge::merge(&mut self.base, &other.base)?;
        merge_slice(&mut self.values, &other.values);
        Ok(())
    }
}

impl Check for YamlBase {
    fn base(&self) -> &CheckBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CheckBase {
        &mut self.base
    }

    fn init(&mut self, check_type: &CheckType) {
        YamlBase::init(self, check_type);
    }

    fn unmarshal_data_map(&mut self) {
        YamlBase::unmarshal_data_map(self);
    }

    fn run_check(&mut self) {
        YamlBase::run_check(self);
    }

    fn merge(&mut self, other: &dyn Check) -> Result<(), CheckError> {
        let other = downcast_same(self, other)?;
        Merge::merge(self, other)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::Status;

    fn check_with(data: &str, values: Vec<KeyValue>) -> YamlBase {
        YamlBase {
            base: CheckBase::new("test").with_data("data", data),
            values,
            ..Default::default()
        }
    }

    const MOCK: &str = r#"
check:
  interval_days: 7
notification:
  emails:
    - admin@example.com
"#;

    #[test]
    fn test_merge_replaces_values() {
        let mut c = YamlBase {
            values: vec![KeyValue::new("foo", "bar")],
            ..Default::default()
        };
        Merge::merge(
            &mut c,
            &YamlBase {
                values: vec![KeyValue::new("baz", "zoom")],
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(c.values, vec![KeyValue::new("baz", "zoom")]);

        let over = YamlBase {
            values: vec![KeyValue::new("baz", "zap"), KeyValue::new("baz", "zap")],
            ..Default::default()
        };
        Merge::merge(&mut c, &over).unwrap();
        assert_eq!(c.values, vec![KeyValue::new("baz", "zap")]);

        // Applying the same override again changes nothing.
        let snapshot = c.values.clone();
        Merge::merge(&mut c, &over).unwrap();
        assert_eq!(c.values, snapshot);

        // Empty override leaves values untouched.
        Merge::merge(&mut c, &YamlBase::default()).unwrap();
        assert_eq!(c.values, snapshot);
    }

    #[test]
    fn test_unmarshal_invalid_document() {
        let mut c = check_with("\nfoo:\n  bar:\n\tbaz\n", vec![]);
        c.unmarshal_data_map();
        assert_eq!(c.base.result.status, Status::Fail);
        assert!(c.base.result.passes.is_empty());
        assert_eq!(c.base.result.failures.len(), 1);
        assert!(
            c.base.result.failures[0].contains("cannot start any token"),
            "unexpected failure: {}",
            c.base.result.failures[0]
        );
        assert!(c.node_map.is_empty());
    }

    #[test]
    fn test_unmarshal_valid_document() {
        let mut c = check_with("\nfoo:\n  bar:\n    - name: baz\n      value: zoom\n", vec![]);
        c.unmarshal_data_map();
        assert!(c.base.result.failures.is_empty());
        assert_eq!(c.lookup("data", "foo.bar[0].value").unwrap()[0].as_str(), Some("zoom"));
        assert!(c.lookup("missing", "foo").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_key_character() {
        let mut c = check_with(
            "\nfoo:\n  bar:\n    baz&*zoom: zap\n",
            vec![KeyValue::new("baz&*zoom", "zap")],
        );
        c.unmarshal_data_map();
        c.run_check();
        assert_eq!(c.base.result.status, Status::Fail);
        assert_eq!(
            c.base.result.failures,
            vec!["invalid character '&' at position 3, following \"baz\""]
        );
    }

    #[test]
    fn test_init_drops_parsed_documents() {
        let mut c = check_with("foo: bar\n", vec![KeyValue::new("foo", "bar")]);
        c.unmarshal_data_map();
        assert!(!c.node_map.is_empty());

        c.init(&CheckType::new("yaml"));
        assert!(c.node_map.is_empty());
        assert!(c.base.data_map.is_empty());
        assert!(c.lookup("data", "foo").unwrap().is_empty());
    }

    #[test]
    fn test_check_key_value_missing_document() {
        let c = YamlBase::default();
        let (kvr, _) = c.check_key_value(&KeyValue::new("a", "b"), "nope").unwrap();
        assert_eq!(kvr, KeyValueResult::NotFound);
    }

    #[test]
    fn test_run_check_pass() {
        let mut c = check_with(MOCK, vec![KeyValue::new("check.interval_days", "7")]);
        c.unmarshal_data_map();
        c.run_check();
        assert_eq!(c.base.result.status, Status::Pass);
        assert!(c.base.result.failures.is_empty());
        assert_eq!(c.base.result.passes, vec!["[data] 'check.interval_days' equals '7'"]);
    }

    #[test]
    fn test_run_check_wrong_key() {
        let mut c = check_with(MOCK, vec![KeyValue::new("check.interval", "7")]);
        c.run_check();
        assert_eq!(c.base.result.status, Status::Fail);
        assert!(c.base.result.passes.is_empty());
        assert_eq!(c.base.result.failures, vec!["[data] 'check.interval' not found"]);
    }

    #[test]
    fn test_run_check_wrong_value() {
        let mut c = check_with(MOCK, vec![KeyValue::new("check.interval_days", "8")]);
        c.unmarshal_data_map();
        c.run_check();
        assert_eq!(c.base.result.status, Status::Fail);
        assert!(c.base.result.passes.is_empty());
        assert_eq!(
            c.base.result.failures,
            vec!["[data] 'check.interval_days' equals '7', expected '8'"]
        );
        let breach = &c.base.result.breaches[0];
        assert_eq!(breach.key(), "check.interval_days");
        assert_eq!(breach.single_value(), "7");
        assert_eq!(breach.expected_value(), "8");
    }

    #[test]
    fn test_run_check_multiple_values() {
        let mut c = check_with(
            MOCK,
            vec![
                KeyValue::new("check.interval_days", "7"),
                KeyValue::new("notification.emails[0]", "admin@example.com"),
            ],
        );
        c.unmarshal_data_map();
        c.run_check();
        assert_eq!(c.base.result.status, Status::Pass);
        assert_eq!(
            c.base.result.passes,
            vec![
                "[data] 'check.interval_days' equals '7'",
                "[data] 'notification.emails[0]' equals 'admin@example.com'",
            ]
        );
    }

    #[test]
    fn test_run_check_wildcard() {
        let data = r#"
abcd:
  some:
    - thing 1
    - thing 2
    - thing 3
efgh:
  some:
    - thing 1
    - thing 2
    - thing 3
"#;
        let mut c = check_with(data, vec![KeyValue::disallowed("*.some", &["thing 2", "thing 4"])]);
        c.unmarshal_data_map();
        c.run_check();
        assert_eq!(c.base.result.status, Status::Fail);
        assert!(c.base.result.passes.is_empty());
        assert_eq!(c.base.result.failures, vec!["[data] disallowed *.some: [thing 2]"]);
    }

    #[test]
    fn test_run_check_list_values() {
        let data = "\nfoo:\n  - a\n  - b\n  - c\n  - d\n";
        let mut c = check_with(data, vec![KeyValue::disallowed("foo", &["b", "c"])]);
        c.unmarshal_data_map();
        c.run_check();
        assert_eq!(c.base.result.status, Status::Fail);
        assert!(c.base.result.passes.is_empty());
        assert_eq!(c.base.result.failures, vec!["[data] disallowed foo: [b, c]"]);
        assert_eq!(c.base.result.breaches[0].values(), &["b".to_string(), "c".to_string()]);

        let mut c = check_with(data, vec![KeyValue::disallowed("foo", &["e"])]);
        c.unmarshal_data_map();
        c.run_check();
        assert_eq!(c.base.result.status, Status::Pass);
        assert_eq!(c.base.result.passes, vec!["[data] no disallowed 'foo'"]);
    }

    #[test]
    fn test_run_check_list_config_error_is_local() {
        let mut c = check_with(
            MOCK,
            vec![
                KeyValue {
                    key: "notification.emails".into(),
                    is_list: true,
                    ..Default::default()
                },
                KeyValue::new("check.interval_days", "7"),
            ],
        );
        c.unmarshal_data_map();
        c.run_check();
        assert_eq!(c.base.result.status, Status::Fail);
        assert_eq!(
            c.base.result.failures,
            vec!["list of allowed or disallowed values not provided"]
        );
        assert_eq!(c.base.result.passes, vec!["[data] 'check.interval_days' equals '7'"]);
    }

    #[test]
    fn test_run_check_optional_missing() {
        let mut c = check_with(MOCK, vec![KeyValue::new("check.missing", "x").with_optional(true)]);
        c.unmarshal_data_map();
        c.run_check();
        assert_eq!(c.base.result.status, Status::Pass);
        assert!(c.base.result.failures.is_empty());
    }

    #[test]
    fn test_run_check_documents_in_key_order() {
        let mut c = YamlBase {
            base: CheckBase::new("multi")
                .with_data("b.yml", "a: 1\n")
                .with_data("a.yml", "a: 2\n"),
            values: vec![KeyValue::new("a", "1")],
            ..Default::default()
        };
        c.unmarshal_data_map();
        c.run_check();
        assert_eq!(c.base.result.failures, vec!["[a.yml] 'a' equals '2', expected '1'"]);
        assert_eq!(c.base.result.passes, vec!["[b.yml] 'a' equals '1'"]);
    }

    #[test]
    fn test_run_check_wildcard_path_error_per_key() {
        let data = "abcd:\n  some: [a]\nefgh:\n  some: [b]\n";
        let mut c = check_with(data, vec![KeyValue::disallowed("*.a&b", &["a"])]);
        c.unmarshal_data_map();
        c.run_check();
        assert_eq!(c.base.result.status, Status::Fail);
        assert_eq!(
            c.base.result.failures,
            vec![
                "invalid character '&' at position 6, following \"abcd.a\"",
                "invalid character '&' at position 6, following \"efgh.a\"",
            ]
        );
    }

    #[test]
    fn test_run_check_empty_expected_value() {
        let mut c = check_with("foo: bar\n", vec![KeyValue::new("foo", "")]);
        c.unmarshal_data_map();
        c.run_check();
        assert_eq!(c.base.result.status, Status::Fail);
        assert!(c.base.result.passes.is_empty());
        assert_eq!(c.base.result.failures, vec!["[data] 'foo' equals 'bar', expected ''"]);
    }

    #[test]
    fn test_run_check_scalar_written_forms() {
        let data = "version: 7.10\nempty: ~\nmask: 0x1F\nlimit: 1e3\n";
        let mut c = check_with(
            data,
            vec![
                KeyValue::new("version", "7.10"),
                KeyValue::new("empty", "~"),
                KeyValue::new("mask", "0x1F"),
                KeyValue::new("limit", "1e3"),
            ],
        );
        c.unmarshal_data_map();
        c.run_check();
        assert!(c.base.result.failures.is_empty(), "{:?}", c.base.result.failures);
        assert_eq!(
            c.base.result.passes,
            vec![
                "[data] 'version' equals '7.10'",
                "[data] 'empty' equals '~'",
                "[data] 'mask' equals '0x1F'",
                "[data] 'limit' equals '1e3'",
            ]
        );
    }
}

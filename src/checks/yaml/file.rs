//! The `yaml` check type: rules evaluated against YAML files in the project.

use std::any::Any;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use regex::Regex;
use serde::Deserialize;
use serde_yaml::Value;

use crate::checks::yaml::{YAML, YamlBase};
use crate::checks::{Check, CheckBase, CheckError, downcast_same};
use crate::merge::{Merge, merge_option, merge_slice, merge_string};
use crate::result::Breach;
use crate::types::CheckType;

/// Error type for file discovery.
#[derive(Debug, thiserror::Error)]
pub enum FindFilesError {
    #[error("directory not provided")]
    DirectoryMissing,
    #[error("pattern not provided")]
    PatternMissing,
    #[error("invalid pattern: {0}")]
    Regex(#[from] regex::Error),
    #[error("{0}")]
    Walk(#[from] walkdir::Error),
}

/// Recursively find files under `root` whose name matches `pattern`, skipping
/// any path matching `exclude_pattern`. Results are in walk order, siblings
/// sorted by name.
pub fn find_files(
    root: &Path,
    pattern: &str,
    exclude_pattern: &str,
) -> Result<Vec<PathBuf>, FindFilesError> {
    if root.as_os_str().is_empty() {
        return Err(FindFilesError::DirectoryMissing);
    }
    if pattern.is_empty() {
        return Err(FindFilesError::PatternMissing);
    }

    let include = Regex::new(pattern)?;
    let exclude = if exclude_pattern.is_empty() {
        None
    } else {
        Some(Regex::new(exclude_pattern)?)
    };

    let mut matches = Vec::new();
    for entry in walkdir::WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let full_path = entry.path().to_string_lossy();
        if let Some(exclude) = &exclude
            && exclude.is_match(&full_path)
        {
            continue;
        }
        if include.is_match(&entry.file_name().to_string_lossy()) {
            matches.push(entry.path().to_path_buf());
        }
    }
    Ok(matches)
}

/// Evaluates key/value rules against one or more YAML files.
///
/// Files are located relative to `path` under the project directory, either
/// by name (`file`, `files`) or by a regular expression on the file name
/// (`pattern`, optionally `exclude-pattern` on the full path).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct YamlCheck {
    #[serde(flatten)]
    pub yaml: YamlBase,
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub pattern: String,
    #[serde(default)]
    pub exclude_pattern: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub ignore_missing: Option<bool>,
}

impl YamlCheck {
    /// Build a `yaml` check from its definition.
    pub fn factory(definition: Value) -> Result<Box<dyn Check>, CheckError> {
        let check: YamlCheck =
            serde_yaml::from_value(definition).map_err(|source| CheckError::InvalidDefinition {
                check_type: YAML.to_string(),
                source,
            })?;
        Ok(Box::new(check))
    }

    pub fn ignore_missing(&self) -> bool {
        self.ignore_missing.unwrap_or(false)
    }

    /// Read one file into the data map under `data_key`.
    fn read_file(&mut self, full_path: &Path, data_key: String) {
        match std::fs::read(full_path) {
            Ok(data) => {
                debug!("Read {} bytes from {}", data.len(), full_path.display());
                self.yaml.base.data_map.insert(data_key, data);
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound && self.ignore_missing() => {
                self.yaml
                    .base
                    .add_pass(format!("File {} does not exist", full_path.display()));
            }
            Err(err) => {
                warn!("Failed to read {}: {}", full_path.display(), err);
                self.yaml.base.add_breach(Breach::value(
                    "",
                    format!("failed to read {}: {}", full_path.display(), err),
                ));
            }
        }
    }

    fn fetch_pattern(&mut self, dir: &Path) {
        let found = match find_files(dir, &self.pattern, &self.exclude_pattern) {
            Ok(found) => found,
            Err(FindFilesError::Walk(err))
                if self.ignore_missing()
                    && err.io_error().map(io::Error::kind) == Some(io::ErrorKind::NotFound) =>
            {
                Vec::new()
            }
            Err(err) => {
                self.yaml.base.add_breach(Breach::value("", err.to_string()));
                return;
            }
        };

        if found.is_empty() {
            if self.ignore_missing() {
                self.yaml.base.add_pass("no matching config files found");
            } else {
                self.yaml
                    .base
                    .add_breach(Breach::value("", "no matching config files found"));
            }
            return;
        }

        for full_path in found {
            let data_key = full_path
                .strip_prefix(dir)
                .unwrap_or(&full_path)
                .to_string_lossy()
                .into_owned();
            self.read_file(&full_path, data_key);
        }
    }
}

impl Merge for YamlCheck {
    type Error = CheckError;

    fn merge(&mut self, other: &Self) -> Result<(), CheckError> {
        merge_string(&mut self.file, &other.file);
        merge_slice(&mut self.files, &other.files);
        merge_string(&mut self.pattern, &other.pattern);
        merge_string(&mut self.exclude_pattern, &other.exclude_pattern);
        merge_string(&mut self.path, &other.path);
        merge_option(&mut self.ignore_missing, &other.ignore_missing);
        Merge::merge(&mut self.yaml, &other.yaml)
    }
}

impl Check for YamlCheck {
    fn base(&self) -> &CheckBase {
        &self.yaml.base
    }

    fn base_mut(&mut self) -> &mut CheckBase {
        &mut self.yaml.base
    }

    fn init(&mut self, check_type: &CheckType) {
        self.yaml.init(check_type);
    }

    fn fetch_data(&mut self, project_dir: &Path) {
        let dir = project_dir.join(&self.path);
        if !self.file.is_empty() {
            let file = self.file.clone();
            self.read_file(&dir.join(&file), file);
        } else if !self.files.is_empty() {
            for file in self.files.clone() {
                self.read_file(&dir.join(&file), file);
            }
        } else if !self.pattern.is_empty() {
            self.fetch_pattern(&dir);
        } else {
            self.yaml
                .base
                .add_breach(Breach::value("", "no config file name provided"));
        }
    }

    fn has_data(&mut self, fail_check: bool) -> bool {
        let fail_check = fail_check && !self.ignore_missing();
        self.yaml.base.has_data(fail_check)
    }

    fn unmarshal_data_map(&mut self) {
        self.yaml.unmarshal_data_map();
    }

    fn run_check(&mut self) {
        self.yaml.run_check();
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
    use crate::checks::yaml::KeyValue;
    use crate::result::Status;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("shipshape.yml"), "check:\n  interval_days: 7\n").unwrap();
        fs::create_dir_all(dir.path().join("config/sync")).unwrap();
        fs::write(dir.path().join("config/sync/core.extension.yml"), "module:\n  node: 0\n").unwrap();
        fs::write(dir.path().join("config/sync/system.site.yml"), "name: site\n").unwrap();
        fs::create_dir_all(dir.path().join("config/dev")).unwrap();
        fs::write(dir.path().join("config/dev/core.extension.yml"), "module:\n  devel: 0\n").unwrap();
        dir
    }

    fn yaml_check(def: &str) -> YamlCheck {
        let mut check: YamlCheck = serde_yaml::from_str(def).unwrap();
        Check::init(&mut check, &CheckType::new(YAML));
        check
    }

    #[test]
    fn test_deserialize_definition() {
        let check = yaml_check(
            r#"
name: interval
severity: high
file: shipshape.yml
ignore-missing: true
values:
  - key: check.interval_days
    value: 7
"#,
        );
        assert_eq!(check.name(), "interval");
        assert_eq!(check.severity(), crate::types::Severity::High);
        assert_eq!(check.file, "shipshape.yml");
        assert!(check.ignore_missing());
        assert_eq!(check.yaml.values, vec![KeyValue::new("check.interval_days", "7")]);
    }

    #[test]
    fn test_fetch_single_file() {
        let dir = project();
        let mut check = yaml_check("name: a\nfile: shipshape.yml\n");
        check.fetch_data(dir.path());
        assert!(check.has_data(true));
        assert!(check.yaml.base.data_map.contains_key("shipshape.yml"));
        assert!(check.result().failures.is_empty());
    }

    #[test]
    fn test_fetch_missing_file() {
        let dir = project();
        let mut check = yaml_check("name: a\nfile: missing.yml\n");
        check.fetch_data(dir.path());
        assert!(!check.has_data(true));
        assert_eq!(check.result().status, Status::Fail);
        assert_eq!(check.result().failures.len(), 1);
        assert!(check.result().failures[0].starts_with("failed to read"));
    }

    #[test]
    fn test_fetch_missing_file_ignored() {
        let dir = project();
        let mut check = yaml_check("name: a\nfile: missing.yml\nignore-missing: true\n");
        check.fetch_data(dir.path());
        assert!(!check.has_data(true));
        assert_eq!(check.result().status, Status::Pass);
        assert_eq!(check.result().passes.len(), 1);
        assert!(check.result().passes[0].starts_with("File "));
        assert!(check.result().passes[0].ends_with("missing.yml does not exist"));
    }

    #[test]
    fn test_fetch_files_under_path() {
        let dir = project();
        let mut check = yaml_check(
            "name: a\npath: config/sync\nfiles: [core.extension.yml, system.site.yml]\n",
        );
        check.fetch_data(dir.path());
        let keys: Vec<&String> = check.yaml.base.data_map.keys().collect();
        assert_eq!(keys, vec!["core.extension.yml", "system.site.yml"]);
    }

    #[test]
    fn test_fetch_pattern() {
        let dir = project();
        let mut check = yaml_check(r#"name: a
path: config
pattern: "core\\.extension\\.yml"
exclude-pattern: "/dev/"
"#);
        check.fetch_data(dir.path());
        let keys: Vec<&String> = check.yaml.base.data_map.keys().collect();
        assert_eq!(keys.len(), 1);
        assert!(keys[0].starts_with("sync"));
        assert!(keys[0].ends_with("core.extension.yml"));
    }

    #[test]
    fn test_fetch_pattern_no_match() {
        let dir = project();
        let mut check = yaml_check("name: a\npattern: \"nothing\\\\.yml\"\n");
        check.fetch_data(dir.path());
        assert_eq!(check.result().failures, vec!["no matching config files found"]);

        let mut check = yaml_check("name: a\npattern: \"nothing\\\\.yml\"\nignore-missing: true\n");
        check.fetch_data(dir.path());
        assert_eq!(check.result().status, Status::Pass);
        assert_eq!(check.result().passes, vec!["no matching config files found"]);
    }

    #[test]
    fn test_fetch_without_source() {
        let dir = project();
        let mut check = yaml_check("name: a\n");
        check.fetch_data(dir.path());
        assert_eq!(check.result().failures, vec!["no config file name provided"]);
    }

    #[test]
    fn test_find_files() {
        let dir = project();
        let found = find_files(dir.path(), r"core\.extension\.yml", "").unwrap();
        assert_eq!(found.len(), 2);
        assert!(found[0].ends_with("config/dev/core.extension.yml"));
        assert!(found[1].ends_with("config/sync/core.extension.yml"));

        assert!(matches!(
            find_files(Path::new(""), "x", ""),
            Err(FindFilesError::DirectoryMissing)
        ));
        assert!(matches!(
            find_files(dir.path(), "", ""),
            Err(FindFilesError::PatternMissing)
        ));
        assert!(matches!(
            find_files(dir.path(), "(", ""),
            Err(FindFilesError::Regex(_))
        ));
    }

    #[test]
    fn test_run_against_file() {
        let dir = project();
        let mut check = yaml_check(
            "name: a\nfile: shipshape.yml\nvalues:\n  - key: check.interval_days\n    value: 8\n",
        );
        check.fetch_data(dir.path());
        assert!(check.has_data(true));
        check.unmarshal_data_map();
        check.run_check();
        assert_eq!(
            check.result().failures,
            vec!["[shipshape.yml] 'check.interval_days' equals '7', expected '8'"]
        );
    }

    #[test]
    fn test_merge() {
        let mut check = yaml_check("name: a\nfile: a.yml\nvalues:\n  - key: foo\n    value: bar\n");
        let over = yaml_check("name: a\npath: config\nignore-missing: true\nseverity: critical\n");
        Check::merge(&mut check, &over).unwrap();
        assert_eq!(check.file, "a.yml");
        assert_eq!(check.path, "config");
        assert!(check.ignore_missing());
        assert_eq!(check.severity(), crate::types::Severity::Critical);
        assert_eq!(check.yaml.values, vec![KeyValue::new("foo", "bar")]);

        let over = yaml_check("name: a\nfile: b.yml\nignore-missing: false\n");
        Check::merge(&mut check, &over).unwrap();
        assert_eq!(check.file, "b.yml");
        assert!(!check.ignore_missing());
    }

    #[test]
    fn test_merge_type_mismatch() {
        let mut check = yaml_check("name: a\nfile: a.yml\n");
        let other = YamlBase::default();
        let err = Check::merge(&mut check, &other).unwrap_err();
        assert!(matches!(err, CheckError::MergeMismatch { .. }));
    }

    #[test]
    fn test_factory() {
        let def: Value = serde_yaml::from_str("name: a\nfile: a.yml\n").unwrap();
        let check = YamlCheck::factory(def).unwrap();
        assert_eq!(check.name(), "a");
        assert!(check.as_any().downcast_ref::<YamlCheck>().is_some());
    }
}

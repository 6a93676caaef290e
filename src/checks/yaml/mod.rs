//! YAML key/value checks.
//!
//! - `path` - path expressions addressing nodes in a document
//! - `keyvalue` - rules and their evaluation
//! - `base` - `YamlBase`, evaluating rules over in-memory documents
//! - `file` - `YamlCheck`, the `yaml` check type reading documents from disk
//!
//! # Example
//!
//! ```rust
//! use shipshape::checks::Check;
//! use shipshape::checks::yaml::{KeyValue, YamlBase};
//! use shipshape::checks::CheckBase;
//!
//! let mut check = YamlBase {
//!     base: CheckBase::new("interval").with_data("data", "check:\n  interval_days: 7\n"),
//!     values: vec![KeyValue::new("check.interval_days", "7")],
//!     ..Default::default()
//! };
//! check.unmarshal_data_map();
//! check.run_check();
//! assert_eq!(check.result().passes, vec!["[data] 'check.interval_days' equals '7'"]);
//! ```

pub mod base;
pub mod file;
pub mod keyvalue;
pub mod path;

pub use base::YamlBase;
pub use file::{YamlCheck, find_files};
pub use keyvalue::{KeyValue, KeyValueError, KeyValueResult, value_to_text};
pub use path::{PathError, Segment, YamlPath, lookup};

/// Identifier of the `yaml` check type.
pub const YAML: &str = "yaml";

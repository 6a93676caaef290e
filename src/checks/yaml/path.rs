//! Path expressions addressing nodes inside a YAML document.
//!
//! Grammar:
//!
//! ```text
//! path     := first ("." segment)*
//! first    := "*" | segment
//! segment  := ident ("[" digits "]")*
//! ident    := (alphanumeric | "_" | "-")+
//! ```
//!
//! A leading `*` matches every top-level key; the rest of the path is then
//! resolved under each of them and the matches are returned in document order.
//! Positions in errors are 0-based character offsets into the full path.

use std::fmt;

use serde_yaml::Value;

/// Error type for path parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("child name missing at position {position}, following \"{following}\"")]
    ChildNameMissing { position: usize, following: String },
    #[error("invalid character '{character}' at position {position}, following \"{following}\"")]
    InvalidCharacter {
        character: char,
        position: usize,
        following: String,
    },
    #[error("invalid index at position {position}, following \"{following}\"")]
    InvalidIndex { position: usize, following: String },
    #[error("wildcard '*' is only allowed as the first segment, found at position {position}")]
    MisplacedWildcard { position: usize },
}

/// One step of a parsed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Every value of the top-level mapping.
    Wildcard,
    /// A mapping key.
    Key(String),
    /// A sequence index.
    Index(usize),
}

/// A parsed path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YamlPath {
    raw: String,
    segments: Vec<Segment>,
}

fn is_ident(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

impl YamlPath {
    /// Parse a path expression.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let chars: Vec<char> = raw.chars().collect();
        let following = |pos: usize| chars[..pos].iter().collect::<String>();

        let mut segments = Vec::new();
        let mut pos = 0;

        loop {
            match chars.get(pos) {
                Some('*') if segments.is_empty() => {
                    segments.push(Segment::Wildcard);
                    pos += 1;
                }
                Some('*') => return Err(PathError::MisplacedWildcard { position: pos }),
                Some(&c) if is_ident(c) => {
                    let start = pos;
                    while pos < chars.len() && is_ident(chars[pos]) {
                        pos += 1;
                    }
                    segments.push(Segment::Key(chars[start..pos].iter().collect()));

                    while chars.get(pos) == Some(&'[') {
                        let open = pos;
                        pos += 1;
                        let digits_start = pos;
                        while pos < chars.len() && chars[pos].is_ascii_digit() {
                            pos += 1;
                        }
                        let index = chars[digits_start..pos]
                            .iter()
                            .collect::<String>()
                            .parse::<usize>()
                            .ok();
                        match (index, chars.get(pos)) {
                            (Some(index), Some(']')) => {
                                segments.push(Segment::Index(index));
                                pos += 1;
                            }
                            _ => {
                                return Err(PathError::InvalidIndex {
                                    position: open,
                                    following: following(open),
                                });
                            }
                        }
                    }
                }
                _ => {
                    return Err(PathError::ChildNameMissing {
                        position: pos,
                        following: following(pos),
                    });
                }
            }

            match chars.get(pos) {
                None => break,
                Some('.') => pos += 1,
                Some(&c) => {
                    return Err(PathError::InvalidCharacter {
                        character: c,
                        position: pos,
                        following: following(pos),
                    });
                }
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the path starts with the top-level wildcard.
    pub fn is_wildcard(&self) -> bool {
        matches!(self.segments.first(), Some(Segment::Wildcard))
    }

    /// Resolve the path against a document, returning every matching node.
    ///
    /// Missing keys, out-of-range indices and type mismatches simply produce
    /// no match.
    pub fn find<'a>(&self, root: &'a Value) -> Vec<&'a Value> {
        let mut current = vec![root];

        for segment in &self.segments {
            let mut next = Vec::new();
            for node in current {
                match segment {
                    Segment::Wildcard => match node {
                        Value::Mapping(map) => next.extend(map.values()),
                        Value::Sequence(seq) => next.extend(seq.iter()),
                        _ => {}
                    },
                    Segment::Key(key) => {
                        if let Some(child) = node.as_mapping().and_then(|m| m.get(key.as_str())) {
                            next.push(child);
                        }
                    }
                    Segment::Index(index) => {
                        if let Some(child) = node.as_sequence().and_then(|s| s.get(*index)) {
                            next.push(child);
                        }
                    }
                }
            }
            if next.is_empty() {
                return next;
            }
            current = next;
        }

        current
    }
}

impl fmt::Display for YamlPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Parse `path` and resolve it against `root`.
pub fn lookup<'a>(root: &'a Value, path: &str) -> Result<Vec<&'a Value>, PathError> {
    Ok(YamlPath::parse(path)?.find(root))
}

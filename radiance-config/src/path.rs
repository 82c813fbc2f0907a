//! Dot-separated field paths into a method config tree.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// A path such as `pipeline.model.num_coarse_samples`.
///
/// Segments written in camelCase are normalised to the snake_case field names
/// used by the config types, so `pipeline.model.numCoarseSamples` names the same
/// field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a dot-separated path. Empty paths and empty segments are rejected.
    pub fn parse(path: &str) -> Result<Self, ConfigError> {
        let path = path.trim();
        if path.is_empty() {
            return Err(ConfigError::InvalidOverride(path.to_string()));
        }

        let segments = path
            .split('.')
            .map(|segment| {
                let valid = !segment.is_empty()
                    && segment
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '_');
                if valid {
                    Ok(to_snake_case(segment))
                } else {
                    Err(ConfigError::InvalidOverride(path.to_string()))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { segments })
    }

    /// The normalised path segments, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The dotted prefix made of the first `len` segments.
    pub fn prefix(&self, len: usize) -> String {
        self.segments[..len.min(self.segments.len())].join(".")
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl FromStr for FieldPath {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn to_snake_case(segment: &str) -> String {
    if !segment.chars().any(|c| c.is_ascii_uppercase()) {
        return segment.to_string();
    }

    let mut out = String::with_capacity(segment.len() + 4);
    let mut prev: Option<char> = None;
    for c in segment.chars() {
        if c.is_ascii_uppercase() {
            if matches!(prev, Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit()) {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
        prev = Some(c);
    }
    out
}

//! Label value extraction from serialized label sets.
//!
//! A label set arrives as the string form of a stream selector:
//!
//! ```text
//! {agent="curl", filename="/var/tmp/dummy", host="host1.example.com", job="logtest00000999"}
//! ```
//!
//! One pattern is compiled per label key and kept for the life of the process.

use std::sync::Arc;

use dashmap::DashMap;
use regex::Regex;

use super::DomainError;

/// Extracts label values, caching one compiled pattern per key.
#[derive(Debug, Default)]
pub struct LabelExtractor {
    patterns: DashMap<String, Arc<Regex>>,
}

impl LabelExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `label_key` in `label_string`, or an empty string if absent.
    ///
    /// Only non-empty quoted values match, so `job=""` is reported as absent.
    ///
    /// # Errors
    ///
    /// `PatternCompilation` if no pattern can be built for `label_key`.
    pub fn extract(&self, label_key: &str, label_string: &str) -> Result<String, DomainError> {
        let pattern = self.pattern(label_key)?;
        Ok(pattern
            .captures(label_string)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_owned())
            .unwrap_or_default())
    }

    /// Number of compiled patterns, one per distinct key seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    fn pattern(&self, label_key: &str) -> Result<Arc<Regex>, DomainError> {
        if let Some(pattern) = self.patterns.get(label_key) {
            return Ok(Arc::clone(pattern.value()));
        }

        // Compiled outside the shard lock; a racing first use compiles twice
        // and the first insert wins.
        let compiled = Arc::new(compile(label_key)?);
        let entry = self
            .patterns
            .entry(label_key.to_owned())
            .or_insert(compiled);
        Ok(Arc::clone(entry.value()))
    }
}

fn compile(label_key: &str) -> Result<Regex, DomainError> {
    let source = format!(r#"\b{}="([^"]+)""#, regex::escape(label_key));
    Regex::new(&source).map_err(|e| DomainError::PatternCompilation {
        label_key: label_key.to_owned(),
        reason: e.to_string(),
    })
}

/// Check that `label_key` is a label name: `[A-Za-z_][A-Za-z0-9_]*`.
///
/// # Errors
///
/// `PatternCompilation` describing the offending key.
pub fn validate_label_key(label_key: &str) -> Result<(), DomainError> {
    let mut chars = label_key.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(DomainError::PatternCompilation {
            label_key: label_key.to_owned(),
            reason: "label keys must match [A-Za-z_][A-Za-z0-9_]*".to_owned(),
        })
    }
}

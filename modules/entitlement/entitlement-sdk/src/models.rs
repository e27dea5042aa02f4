//! Domain models for the entitlement module.

use serde::{Deserialize, Serialize};

/// Action class a decision is made for.
///
/// Oracles treat `write` (case-insensitive) as a write and every other action
/// name as a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Read,
    Write,
}

impl Action {
    /// Classify a wire action name.
    #[must_use]
    pub fn classify(name: &str) -> Self {
        if name.eq_ignore_ascii_case("write") {
            Self::Write
        } else {
            Self::Read
        }
    }
}

/// A single question put to the decision oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementQuery {
    /// Action name as requested by the caller (e.g. "read", "write").
    pub action: String,
    /// Client user ID the decision is for.
    pub user_id: String,
    /// Value of the configured label, extracted from the resource's label set.
    /// Empty when the label is absent.
    pub label_value: String,
}

impl EntitlementQuery {
    #[must_use]
    pub fn new(
        action: impl Into<String>,
        user_id: impl Into<String>,
        label_value: impl Into<String>,
    ) -> Self {
        Self {
            action: action.into(),
            user_id: user_id.into(),
            label_value: label_value.into(),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn action_classification_is_case_insensitive() {
        assert_eq!(Action::classify("write"), Action::Write);
        assert_eq!(Action::classify("WRITE"), Action::Write);
        assert_eq!(Action::classify("read"), Action::Read);
        assert_eq!(Action::classify("delete"), Action::Read);
        assert_eq!(Action::classify(""), Action::Read);
    }
}

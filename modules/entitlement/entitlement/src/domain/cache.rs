//! Process-local store of recent decisions.
//!
//! The cache never expires entries on its own: it hands back the stored
//! timestamp and the caller judges freshness with [`Decision::is_fresh`].
//! Entries are only removed in bulk by [`DecisionCache::clear`].

use std::borrow::Borrow;
use std::hash::{Hash, Hasher};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use dashmap::DashMap;

/// How long a decision may be served from the cache.
pub const DECISION_TTL: Duration = Duration::from_secs(60);

/// Cache key. The label part is the full raw label-set string, not the
/// extracted value, so two resources sharing a label value are cached apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionKey {
    pub action: String,
    pub user_id: String,
    pub label_string: String,
}

impl DecisionKey {
    #[must_use]
    pub fn new(action: &str, user_id: &str, label_string: &str) -> Self {
        Self {
            action: action.to_owned(),
            user_id: user_id.to_owned(),
            label_string: label_string.to_owned(),
        }
    }
}

impl Hash for DecisionKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.parts().hash(state);
    }
}

/// Borrowed form of a [`DecisionKey`]; lookups hash and compare the parts in
/// place instead of building an owned key.
pub trait KeyParts {
    fn parts(&self) -> (&str, &str, &str);
}

impl KeyParts for DecisionKey {
    fn parts(&self) -> (&str, &str, &str) {
        (&self.action, &self.user_id, &self.label_string)
    }
}

impl KeyParts for (&str, &str, &str) {
    fn parts(&self) -> (&str, &str, &str) {
        *self
    }
}

impl<'a> Borrow<dyn KeyParts + 'a> for DecisionKey {
    fn borrow(&self) -> &(dyn KeyParts + 'a) {
        self
    }
}

impl Hash for dyn KeyParts + '_ {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.parts().hash(state);
    }
}

impl PartialEq for dyn KeyParts + '_ {
    fn eq(&self, other: &Self) -> bool {
        self.parts() == other.parts()
    }
}

impl Eq for dyn KeyParts + '_ {}

/// A remembered oracle answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub entitled: bool,
    /// Unix seconds at which the oracle answered.
    pub timestamp: i64,
}

impl Decision {
    #[must_use]
    pub fn new(entitled: bool, timestamp: i64) -> Self {
        Self {
            entitled,
            timestamp,
        }
    }

    /// `now - timestamp <= ttl`, in whole seconds.
    #[must_use]
    pub fn is_fresh(&self, now: i64, ttl: Duration) -> bool {
        let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        now.saturating_sub(self.timestamp) <= ttl
    }
}

/// Decisions keyed by `(action, user, raw label string)`.
#[derive(Debug, Default)]
pub struct DecisionCache {
    entries: DashMap<DecisionKey, Decision>,
}

impl DecisionCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, action: &str, user_id: &str, label_string: &str) -> Option<Decision> {
        let key: &dyn KeyParts = &(action, user_id, label_string);
        self.entries.get(key).map(|entry| *entry.value())
    }

    /// Store a decision, replacing any previous one for the same key.
    pub fn put(&self, action: &str, user_id: &str, label_string: &str, decision: Decision) {
        self.entries
            .insert(DecisionKey::new(action, user_id, label_string), decision);
    }

    /// Drop every entry. Entries written concurrently may survive.
    pub fn clear(&self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Current time in Unix seconds.
#[must_use]
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
}

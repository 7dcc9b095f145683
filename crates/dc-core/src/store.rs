//! Per-Domain Rule Store
//!
//! The in-memory rule set for one domain key. It is the presentation source
//! of truth; storage is the durability source of truth. Every mutation hands
//! back a [`Flush`] holding the full rule list, so storage converges on the
//! in-memory state once the flushes are committed in issue order.

use serde_json::Value;

use crate::storage::{Storage, StorageError};
use crate::types::{is_forbidden_selector, Description, Rule};

/// Reasons a rule is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("Empty selector")]
    Empty,
    #[error("Selector {0:?} targets a protected element")]
    Forbidden(String),
    #[error("Selector {0:?} is already stored")]
    Duplicate(String),
}

/// A pending write of one domain's rule list.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "a flush does nothing until it is committed"]
pub struct Flush {
    key: String,
    rules: Vec<Rule>,
}

impl Flush {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Write the snapshot to `storage`.
    pub async fn commit<S: Storage>(self, storage: &S) -> Result<(), StorageError> {
        let value = serde_json::to_value(&self.rules)?;
        storage.set(&self.key, value).await
    }
}

/// Result of loading a domain's rules.
#[derive(Debug)]
pub struct Loaded {
    pub store: RuleStore,
    /// Set when the stored entry had to be upgraded or cleaned.
    pub repair: Option<Flush>,
}

/// Ordered, duplicate-free rules for one domain key.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleStore {
    key: String,
    rules: Vec<Rule>,
}

impl RuleStore {
    /// An empty store for `key`.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            rules: Vec::new(),
        }
    }

    /// Fetch the rules stored under `key`.
    ///
    /// Entries in the legacy bare-string layout are upgraded, and entries that
    /// are malformed, empty or forbidden are dropped. Either repair produces a
    /// flush of the corrected list.
    pub async fn load<S: Storage>(storage: &S, key: &str) -> Result<Loaded, StorageError> {
        let stored = storage.get(key).await?;
        Ok(Self::from_stored(key, stored))
    }

    /// Build a store from the raw stored value for `key`.
    pub fn from_stored(key: &str, stored: Option<Value>) -> Loaded {
        let mut store = Self::new(key);
        let Some(value) = stored else {
            return Loaded { store, repair: None };
        };

        let (rules, repaired) = decode_entries(key, value);
        store.rules = rules;
        let repair = repaired.then(|| store.flush());
        Loaded { store, repair }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn contains(&self, selector: &str) -> bool {
        self.rules.iter().any(|rule| rule.selector == selector)
    }

    /// Append a rule.
    pub fn add(&mut self, selector: &str, description: Description) -> Result<Flush, RuleError> {
        if selector.trim().is_empty() {
            return Err(RuleError::Empty);
        }
        if is_forbidden_selector(selector) {
            return Err(RuleError::Forbidden(selector.to_string()));
        }
        if self.contains(selector) {
            return Err(RuleError::Duplicate(selector.to_string()));
        }

        self.rules.push(Rule::new(selector, description));
        Ok(self.flush())
    }

    /// Delete the rule for `selector`, if any. Always flushes.
    pub fn remove(&mut self, selector: &str) -> Flush {
        self.rules.retain(|rule| rule.selector != selector);
        self.flush()
    }

    pub fn clear(&mut self) -> Flush {
        self.rules.clear();
        self.flush()
    }

    /// Snapshot of the current rules for writing.
    pub fn flush(&self) -> Flush {
        Flush {
            key: self.key.clone(),
            rules: self.rules.clone(),
        }
    }
}

/// Decode a stored entry. Returns the rules and whether anything was changed.
fn decode_entries(key: &str, value: Value) -> (Vec<Rule>, bool) {
    let Value::Array(entries) = value else {
        log::warn!("Discarding non-list rule entry for {}", key);
        return (Vec::new(), true);
    };

    let total = entries.len();
    let mut upgraded = 0usize;
    let mut rules: Vec<Rule> = Vec::with_capacity(total);

    for entry in entries {
        let rule = match entry {
            Value::String(selector) => {
                upgraded += 1;
                let description = Description::legacy(&selector);
                Rule::new(selector, description)
            }
            other => match serde_json::from_value::<Rule>(other) {
                Ok(rule) => rule,
                Err(err) => {
                    log::debug!("Dropping malformed rule for {}: {}", key, err);
                    continue;
                }
            },
        };
        if rule.is_valid() && !rules.iter().any(|r| r.selector == rule.selector) {
            rules.push(rule);
        }
    }

    if upgraded > 0 {
        log::info!("Upgrading {} legacy rule(s) for {}", upgraded, key);
    }
    let filtered = total - rules.len();
    if filtered > 0 {
        log::warn!("Filtered {} invalid or forbidden rule(s) for {}", filtered, key);
    }

    (rules, upgraded > 0 || filtered > 0)
}

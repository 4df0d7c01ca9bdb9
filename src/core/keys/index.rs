use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::TranslationKey;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct KeyEntry {
    pub key: TranslationKey,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<TranslationKey>,
    /// Canonical text the key translates.
    #[serde(default)]
    pub value: String,
}

/// Map from exact matched text (markers included) to its key.
///
/// Created by the host, optionally loaded from a previous run, read and
/// extended while files are processed. Entries are only removed when the
/// file that added them fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ValueKeyIndex {
    entries: BTreeMap<String, KeyEntry>,
}

impl ValueKeyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, raw: &str) -> Option<&KeyEntry> {
        self.entries.get(raw)
    }

    /// Record a key for `raw`. An existing entry is kept and the key becomes
    /// one of its aliases if it differs.
    pub fn insert(&mut self, raw: &str, key: TranslationKey, value: &str) {
        match self.entries.get_mut(raw) {
            Some(entry) => {
                if entry.key != key && !entry.aliases.contains(&key) {
                    entry.aliases.push(key);
                }
            }
            None => {
                self.entries.insert(
                    raw.to_string(),
                    KeyEntry {
                        key,
                        aliases: Vec::new(),
                        value: value.to_string(),
                    },
                );
            }
        }
    }

    /// Drop an entry added during a file that was then given up on.
    pub(crate) fn remove(&mut self, raw: &str) -> Option<KeyEntry> {
        self.entries.remove(raw)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &KeyEntry)> {
        self.entries.iter().map(|(raw, entry)| (raw.as_str(), entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_never_replaces_primary_key() {
        let mut index = ValueKeyIndex::new();
        index.insert("___Hi___", TranslationKey::Text("hi".into()), "Hi");
        index.insert("___Hi___", TranslationKey::Text("greeting".into()), "Hi");
        index.insert("___Hi___", TranslationKey::Text("hi".into()), "Hi");

        let entry = index.get("___Hi___").unwrap();
        assert_eq!(entry.key, TranslationKey::Text("hi".into()));
        assert_eq!(entry.aliases, vec![TranslationKey::Text("greeting".into())]);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_exact_text_equality() {
        let mut index = ValueKeyIndex::new();
        index.insert("___Hello___", TranslationKey::Number(1), "Hello");

        assert!(index.get("___hello___").is_none());
        assert!(index.get("___Hello ___").is_none());
        assert!(index.get("___Hello___").is_some());
    }
}

use std::collections::HashMap;

use super::{
    ExtractedStringRecord, KeyGenerator, KeyStrategy, TranslationKey, UsedExistingKeyRecord,
    ValueKeyIndex,
};
use crate::core::source::SourceLocation;

/// Cross-file key state, owned by the host.
///
/// One registry is shared by every file of a run. Files may be parsed in
/// parallel, but the registry must have a single writer: the host hands it to
/// one [`KeyResolver`] at a time.
#[derive(Debug)]
pub struct KeyRegistry {
    index: ValueKeyIndex,
    strategy: KeyStrategy,
    /// Every key in use, mapped to the text it translates.
    taken: HashMap<TranslationKey, String>,
    extracted: Vec<ExtractedStringRecord>,
    reused: Vec<UsedExistingKeyRecord>,
}

impl KeyRegistry {
    pub fn new(index: ValueKeyIndex, strategy: KeyStrategy) -> Self {
        let mut taken = HashMap::new();
        for (_, entry) in index.iter() {
            taken.insert(entry.key.clone(), entry.value.clone());
            for alias in &entry.aliases {
                taken.entry(alias.clone()).or_insert_with(|| entry.value.clone());
            }
        }
        Self {
            index,
            strategy,
            taken,
            extracted: Vec::new(),
            reused: Vec::new(),
        }
    }

    pub fn index(&self) -> &ValueKeyIndex {
        &self.index
    }

    pub fn extracted(&self) -> &[ExtractedStringRecord] {
        &self.extracted
    }

    pub fn reused(&self) -> &[UsedExistingKeyRecord] {
        &self.reused
    }

    pub fn into_parts(
        self,
    ) -> (
        ValueKeyIndex,
        Vec<ExtractedStringRecord>,
        Vec<UsedExistingKeyRecord>,
    ) {
        (self.index, self.extracted, self.reused)
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            extracted: self.extracted.len(),
            reused: self.reused.len(),
            strategy: self.strategy.clone(),
            inserted: Vec::new(),
            claimed: Vec::new(),
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.extracted.truncate(checkpoint.extracted);
        self.reused.truncate(checkpoint.reused);
        self.strategy = checkpoint.strategy;
        for raw in &checkpoint.inserted {
            self.index.remove(raw);
        }
        for key in &checkpoint.claimed {
            self.taken.remove(key);
        }
    }

    /// Make a generated key unique. A key that already means `value` is
    /// shared, which the bool in the result reports.
    fn claim(&mut self, key: TranslationKey, value: &str) -> (TranslationKey, bool) {
        let mut candidate = key.clone();
        let mut n = 2;
        loop {
            match self.taken.get(&candidate) {
                None => break,
                Some(existing) if existing == value => return (candidate, true),
                Some(_) => {
                    candidate = match &key {
                        TranslationKey::Number(base) => TranslationKey::Number(base + n - 1),
                        TranslationKey::Text(base) => TranslationKey::Text(format!("{base}_{n}")),
                    };
                    n += 1;
                }
            }
        }
        self.taken.insert(candidate.clone(), value.to_string());
        (candidate, false)
    }
}

/// How a key was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOrigin {
    /// Produced by the strategy in this call.
    Generated,
    /// Found in the value/key index.
    Reused,
    /// Seen earlier in the same file.
    Cached,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedKey {
    pub key: TranslationKey,
    pub origin: KeyOrigin,
}

/// Registry state before a file, plus what the file added since.
#[derive(Debug)]
struct Checkpoint {
    extracted: usize,
    reused: usize,
    strategy: KeyStrategy,
    /// Raw texts added to the index.
    inserted: Vec<String>,
    /// Keys added to `taken`.
    claimed: Vec<TranslationKey>,
}

/// Per-file key resolution.
///
/// Lookup order: the per-run cache, then the value/key index, then the
/// generation strategy. Equality is exact text equality.
///
/// Everything a resolver writes stays in the registry unless the host calls
/// [`KeyResolver::rollback`] for a file it had to give up on.
pub struct KeyResolver<'r> {
    registry: &'r mut KeyRegistry,
    /// `None` caches a veto so the strategy is asked only once per text.
    cache: HashMap<String, Option<TranslationKey>>,
    checkpoint: Checkpoint,
}

impl<'r> KeyResolver<'r> {
    pub fn new(registry: &'r mut KeyRegistry) -> Self {
        let checkpoint = registry.checkpoint();
        Self {
            registry,
            cache: HashMap::new(),
            checkpoint,
        }
    }

    /// Undo every record, index entry and key this resolver added.
    pub fn rollback(self) {
        self.registry.restore(self.checkpoint);
    }

    /// Resolve the key for `raw` (the matched text, markers included).
    ///
    /// `value` is the canonical captured text handed to the strategy.
    /// Returns `None` when the strategy vetoes the text.
    pub fn resolve(
        &mut self,
        raw: &str,
        value: &str,
        location: &SourceLocation,
    ) -> Option<ResolvedKey> {
        if let Some(cached) = self.cache.get(raw) {
            let key = cached.clone()?;
            self.registry.reused.push(UsedExistingKeyRecord {
                key: key.clone(),
                location: location.clone(),
            });
            return Some(ResolvedKey {
                key,
                origin: KeyOrigin::Cached,
            });
        }

        if let Some(entry) = self.registry.index.get(raw) {
            let key = entry.key.clone();
            self.registry.reused.push(UsedExistingKeyRecord {
                key: key.clone(),
                location: location.clone(),
            });
            self.cache.insert(raw.to_string(), Some(key.clone()));
            return Some(ResolvedKey {
                key,
                origin: KeyOrigin::Reused,
            });
        }

        let Some(generated) = self.registry.strategy.generate(value) else {
            tracing::debug!(raw, %location, "key generation vetoed, leaving text in place");
            self.cache.insert(raw.to_string(), None);
            return None;
        };

        let (key, already_meant) = self.registry.claim(generated, value);
        if !already_meant {
            self.checkpoint.claimed.push(key.clone());
        }
        self.registry.index.insert(raw, key.clone(), value);
        self.checkpoint.inserted.push(raw.to_string());
        self.cache.insert(raw.to_string(), Some(key.clone()));

        if already_meant {
            self.registry.reused.push(UsedExistingKeyRecord {
                key: key.clone(),
                location: location.clone(),
            });
            return Some(ResolvedKey {
                key,
                origin: KeyOrigin::Reused,
            });
        }

        self.registry.extracted.push(ExtractedStringRecord {
            key: key.clone(),
            value: value.to_string(),
            location: location.clone(),
        });
        Some(ResolvedKey {
            key,
            origin: KeyOrigin::Generated,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::core::keys::{HashKeys, SequenceKeys};

    fn loc(line: usize) -> SourceLocation {
        SourceLocation {
            file_path: "a.tsx".into(),
            line,
            col: 1,
        }
    }

    #[test]
    fn test_repeat_in_same_file_is_cached() {
        let mut registry = KeyRegistry::new(ValueKeyIndex::new(), KeyStrategy::default());
        let mut resolver = KeyResolver::new(&mut registry);

        let first = resolver.resolve("___Hi___", "Hi", &loc(1)).unwrap();
        let second = resolver.resolve("___Hi___", "Hi", &loc(2)).unwrap();

        assert_eq!(first.origin, KeyOrigin::Generated);
        assert_eq!(second.origin, KeyOrigin::Cached);
        assert_eq!(first.key, second.key);
        assert_eq!(registry.extracted().len(), 1);
        assert_eq!(registry.reused().len(), 1);
        assert_eq!(registry.reused()[0].location.line, 2);
    }

    #[test]
    fn test_index_hit_across_files() {
        let mut registry = KeyRegistry::new(ValueKeyIndex::new(), KeyStrategy::default());
        KeyResolver::new(&mut registry).resolve("___Hi___", "Hi", &loc(1));

        let second_file = KeyResolver::new(&mut registry)
            .resolve("___Hi___", "Hi", &loc(9))
            .unwrap();
        assert_eq!(second_file.origin, KeyOrigin::Reused);
        assert_eq!(registry.extracted().len(), 1);
        assert_eq!(registry.index().len(), 1);
    }

    #[test]
    fn test_preloaded_index_is_reused() {
        let mut index = ValueKeyIndex::new();
        index.insert("___Hi___", TranslationKey::Text("greeting".into()), "Hi");
        let mut registry = KeyRegistry::new(index, KeyStrategy::default());

        let resolved = KeyResolver::new(&mut registry)
            .resolve("___Hi___", "Hi", &loc(1))
            .unwrap();
        assert_eq!(resolved.key, TranslationKey::Text("greeting".into()));
        assert!(registry.extracted().is_empty());
    }

    #[test]
    fn test_veto_is_cached() {
        let mut registry = KeyRegistry::new(
            ValueKeyIndex::new(),
            KeyStrategy::Sequence(SequenceKeys {
                prefix: String::new(),
                next: 1,
            }),
        );
        let mut resolver = KeyResolver::new(&mut registry);
        assert!(resolver.resolve("___ ___", " ", &loc(1)).is_none());
        assert!(resolver.resolve("___ ___", " ", &loc(2)).is_none());

        let resolved = resolver.resolve("___a___", "a", &loc(3)).unwrap();
        assert_eq!(resolved.key, TranslationKey::Number(1));
        assert!(registry.reused().is_empty());
    }

    #[test]
    fn test_rollback_forgets_the_file() {
        let mut registry = KeyRegistry::new(
            ValueKeyIndex::new(),
            KeyStrategy::Sequence(SequenceKeys {
                prefix: String::new(),
                next: 1,
            }),
        );
        KeyResolver::new(&mut registry).resolve("___Keep___", "Keep", &loc(1));

        let mut failed = KeyResolver::new(&mut registry);
        failed.resolve("___Keep___", "Keep", &loc(2));
        failed.resolve("___Drop___", "Drop", &loc(3));
        failed.rollback();

        assert_eq!(registry.extracted().len(), 1);
        assert!(registry.reused().is_empty());
        assert_eq!(registry.index().len(), 1);
        assert!(registry.index().get("___Drop___").is_none());

        let next = KeyResolver::new(&mut registry)
            .resolve("___Other___", "Other", &loc(4))
            .unwrap();
        assert_eq!(next.key, TranslationKey::Number(2));
    }

    #[test]
    fn test_colliding_keys_get_suffix() {
        let mut index = ValueKeyIndex::new();
        index.insert("**Save**", TranslationKey::Text("Save".into()), "Save!");
        let mut registry = KeyRegistry::new(index, KeyStrategy::default());

        let resolved = KeyResolver::new(&mut registry)
            .resolve("___Save___", "Save", &loc(1))
            .unwrap();
        assert_eq!(resolved.key, TranslationKey::Text("Save_2".into()));
        assert_eq!(resolved.origin, KeyOrigin::Generated);
    }

    #[test]
    fn test_same_value_shares_key() {
        let mut registry = KeyRegistry::new(
            ValueKeyIndex::new(),
            KeyStrategy::Hash(HashKeys {
                length: 8,
                prefix: String::new(),
            }),
        );
        let mut resolver = KeyResolver::new(&mut registry);
        let a = resolver.resolve("___Hi___", "Hi", &loc(1)).unwrap();
        let b = resolver.resolve("**Hi**", "Hi", &loc(2)).unwrap();

        assert_eq!(a.key, b.key);
        assert_eq!(b.origin, KeyOrigin::Reused);
        assert_eq!(registry.extracted().len(), 1);
        assert_eq!(registry.index().len(), 2);
    }
}

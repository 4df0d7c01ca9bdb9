use enum_dispatch::enum_dispatch;
use sha2::{Digest, Sha256};

use super::TranslationKey;

/// Generates keys for newly seen text.
///
/// Invoked only on a cache and index miss. Returning `None` vetoes the
/// rewrite: the match stays literal text.
#[enum_dispatch]
pub trait KeyGenerator {
    fn generate(&mut self, text: &str) -> Option<TranslationKey>;
}

#[enum_dispatch(KeyGenerator)]
#[derive(Debug, Clone)]
pub enum KeyStrategy {
    Text(TextKeys),
    Hash(HashKeys),
    Sequence(SequenceKeys),
}

impl Default for KeyStrategy {
    fn default() -> Self {
        KeyStrategy::Text(TextKeys)
    }
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// The canonical text is the key.
#[derive(Debug, Clone, Default)]
pub struct TextKeys;

impl KeyGenerator for TextKeys {
    fn generate(&mut self, text: &str) -> Option<TranslationKey> {
        if is_blank(text) {
            return None;
        }
        Some(TranslationKey::Text(text.to_string()))
    }
}

/// Prefix plus the first `length` hex characters of the SHA-256 of the text.
#[derive(Debug, Clone)]
pub struct HashKeys {
    pub length: usize,
    pub prefix: String,
}

impl KeyGenerator for HashKeys {
    fn generate(&mut self, text: &str) -> Option<TranslationKey> {
        if is_blank(text) {
            return None;
        }
        let digest = Sha256::digest(text.as_bytes());
        let hex: String = digest.iter().map(|byte| format!("{byte:02x}")).collect();
        let length = self.length.clamp(1, hex.len());
        Some(TranslationKey::Text(format!("{}{}", self.prefix, &hex[..length])))
    }
}

/// Prefix plus a counter. An empty prefix yields numeric keys.
#[derive(Debug, Clone)]
pub struct SequenceKeys {
    pub prefix: String,
    pub next: u64,
}

impl KeyGenerator for SequenceKeys {
    fn generate(&mut self, text: &str) -> Option<TranslationKey> {
        if is_blank(text) {
            return None;
        }
        let n = self.next;
        self.next += 1;
        if self.prefix.is_empty() {
            Some(TranslationKey::Number(n))
        } else {
            Some(TranslationKey::Text(format!("{}{}", self.prefix, n)))
        }
    }
}

//! Translation keys.
//!
//! - `index`: cross-run map from matched text to key ([`ValueKeyIndex`])
//! - `strategy`: key generation strategies (text, hash, sequence)
//! - `resolver`: host-owned [`KeyRegistry`] and the per-run [`KeyResolver`]
//! - `store`: JSON persistence of the index

mod index;
mod resolver;
mod store;
mod strategy;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use index::{KeyEntry, ValueKeyIndex};
pub use resolver::{KeyOrigin, KeyRegistry, KeyResolver, ResolvedKey};
pub use store::KeyIndexStore;
pub use strategy::{HashKeys, KeyGenerator, KeyStrategy, SequenceKeys, TextKeys};

use crate::core::source::SourceLocation;
use crate::utils::quote_js_string;

/// Opaque translation key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub enum TranslationKey {
    Number(u64),
    Text(String),
}

impl TranslationKey {
    /// Render the key as a JavaScript expression.
    pub fn to_js(&self) -> String {
        match self {
            TranslationKey::Number(n) => n.to_string(),
            TranslationKey::Text(text) => quote_js_string(text),
        }
    }
}

impl fmt::Display for TranslationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslationKey::Number(n) => write!(f, "{n}"),
            TranslationKey::Text(text) => write!(f, "{text}"),
        }
    }
}

/// A key generated during this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedStringRecord {
    pub key: TranslationKey,
    /// Canonical captured text, with `{argN}` for interpolations.
    pub value: String,
    pub location: SourceLocation,
}

/// A call site that reused a key instead of generating one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsedExistingKeyRecord {
    pub key: TranslationKey,
    pub location: SourceLocation,
}

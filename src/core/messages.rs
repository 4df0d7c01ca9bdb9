//! Messages file output.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};

use crate::core::keys::ExtractedStringRecord;

/// What happened to a key when it was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Added,
    /// The key already had a value, which was kept.
    Kept,
}

/// Flat `key → text` JSON file, e.g. `messages/en.json`.
///
/// Keys are never split on dots: generated keys are often the text itself.
/// Existing entries and their order are preserved.
pub struct MessagesWriter {
    file_path: PathBuf,
    data: Map<String, Value>,
}

impl MessagesWriter {
    pub fn open_or_create(path: &Path) -> Result<Self> {
        let data = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read file: {}", path.display()))?;
            let value: Value = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON: {}", path.display()))?;
            match value {
                Value::Object(map) => map,
                _ => bail!("Root of messages file must be an object: {}", path.display()),
            }
        } else {
            Map::new()
        };

        Ok(Self {
            file_path: path.to_path_buf(),
            data,
        })
    }

    pub fn add(&mut self, key: &str, text: &str) -> KeyAction {
        if self.data.contains_key(key) {
            return KeyAction::Kept;
        }
        self.data.insert(key.to_string(), Value::String(text.to_string()));
        KeyAction::Added
    }

    /// Add every record, returning how many keys were new.
    pub fn add_records(&mut self, records: &[ExtractedStringRecord]) -> usize {
        records
            .iter()
            .filter(|record| self.add(&record.key.to_string(), &record.value) == KeyAction::Added)
            .count()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Save with 2-space indentation and a trailing newline.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(&self.data).context("Failed to serialize JSON")?;
        fs::write(&self.file_path, format!("{}\n", content))
            .with_context(|| format!("Failed to write file: {}", self.file_path.display()))?;
        Ok(())
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::ValueKeyIndex;

/// JSON persistence for the [`ValueKeyIndex`], so keys survive across runs.
///
/// The file maps each matched text to its entry:
/// `{ "___Hello___": { "key": "Hello", "value": "Hello" } }`.
pub struct KeyIndexStore {
    file_path: PathBuf,
}

impl KeyIndexStore {
    pub fn new(path: &Path) -> Self {
        Self {
            file_path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Load the index, or an empty one if the file does not exist yet.
    pub fn load(&self) -> Result<ValueKeyIndex> {
        if !self.file_path.exists() {
            return Ok(ValueKeyIndex::new());
        }
        let content = fs::read_to_string(&self.file_path)
            .with_context(|| format!("Failed to read key index: {}", self.file_path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse key index: {}", self.file_path.display()))
    }

    /// Save with 2-space indentation and a trailing newline.
    pub fn save(&self, index: &ValueKeyIndex) -> Result<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(index).context("Failed to serialize key index")?;
        fs::write(&self.file_path, format!("{}\n", content))
            .with_context(|| format!("Failed to write file: {}", self.file_path.display()))?;
        Ok(())
    }
}

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Ok, Result};
use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::core::keys::{HashKeys, KeyStrategy, SequenceKeys, TextKeys};
use crate::core::merge::ImportConflict;
use crate::core::policy::{Framework, FrameworkPolicy};
use crate::core::replace::MarkerPattern;

pub const CONFIG_FILE_NAME: &str = ".transmarkrc.json";

pub const TEST_FILE_PATTERNS: &[&str] = &[
    "**/*.test.tsx",
    "**/*.test.ts",
    "**/*.test.jsx",
    "**/*.test.js",
    "**/*.spec.tsx",
    "**/*.spec.ts",
    "**/*.spec.jsx",
    "**/*.spec.js",
    "**/__tests__/**",
];

/// How keys are generated for new text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum KeyStrategyConfig {
    #[default]
    Text,
    Hash {
        #[serde(default = "default_hash_length")]
        length: usize,
        #[serde(default)]
        prefix: String,
    },
    Sequence {
        #[serde(default)]
        prefix: String,
        #[serde(default = "default_sequence_start")]
        start: u64,
    },
}

impl KeyStrategyConfig {
    /// A sequence strategy continues after `taken` keys already handed out.
    pub fn build(&self, taken: usize) -> KeyStrategy {
        match self {
            KeyStrategyConfig::Text => KeyStrategy::Text(TextKeys),
            KeyStrategyConfig::Hash { length, prefix } => KeyStrategy::Hash(HashKeys {
                length: *length,
                prefix: prefix.clone(),
            }),
            KeyStrategyConfig::Sequence { prefix, start } => KeyStrategy::Sequence(SequenceKeys {
                prefix: prefix.clone(),
                next: start + taken as u64,
            }),
        }
    }
}

fn default_hash_length() -> usize {
    8
}

fn default_sequence_start() -> u64 {
    1
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub ignores: Vec<String>,
    #[serde(default = "default_includes")]
    pub includes: Vec<String>,
    #[serde(default = "default_ignore_test_files")]
    pub ignore_test_files: bool,
    #[serde(default = "default_source_root")]
    pub source_root: String,
    /// Marker regex; capture group 1 is the translatable text.
    #[serde(default = "default_pattern")]
    pub pattern: String,
    #[serde(default)]
    pub framework: Framework,
    #[serde(default = "default_global_function")]
    pub global_function: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_import_source: Option<String>,
    #[serde(default)]
    pub key_strategy: KeyStrategyConfig,
    #[serde(default)]
    pub annotate: bool,
    #[serde(default = "default_merge_imports")]
    pub merge_imports: bool,
    #[serde(default)]
    pub import_conflict: ImportConflict,
    #[serde(default = "default_key_index_file")]
    pub key_index_file: String,
    #[serde(default = "default_messages_file")]
    pub messages_file: String,
}

fn default_includes() -> Vec<String> {
    vec!["src".to_string()]
}

fn default_ignore_test_files() -> bool {
    true
}

fn default_source_root() -> String {
    "./".to_string()
}

fn default_pattern() -> String {
    "___(.+?)___".to_string()
}

fn default_global_function() -> String {
    "t".to_string()
}

fn default_merge_imports() -> bool {
    true
}

fn default_key_index_file() -> String {
    ".transmark/keys.json".to_string()
}

fn default_messages_file() -> String {
    "messages/en.json".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ignores: Vec::new(),
            includes: default_includes(),
            ignore_test_files: default_ignore_test_files(),
            source_root: default_source_root(),
            pattern: default_pattern(),
            framework: Framework::default(),
            global_function: default_global_function(),
            module_import_source: None,
            key_strategy: KeyStrategyConfig::default(),
            annotate: false,
            merge_imports: default_merge_imports(),
            import_conflict: ImportConflict::default(),
            key_index_file: default_key_index_file(),
            messages_file: default_messages_file(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error if any glob pattern in `ignores` or `includes` is
    /// invalid, or if `pattern` does not compile.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }

        // Patterns without wildcards are literal directory paths, so
        // `app/[locale]` is valid without escaping.
        for pattern in &self.includes {
            if pattern.contains('*') || pattern.contains('?') {
                Pattern::new(pattern).with_context(|| {
                    format!("Invalid glob pattern in 'includes': \"{}\"", pattern)
                })?;
            }
        }

        self.marker_pattern()?;
        Ok(())
    }

    pub fn marker_pattern(&self) -> Result<MarkerPattern> {
        MarkerPattern::new(&self.pattern).context("Invalid 'pattern'")
    }

    pub fn framework_policy(&self) -> FrameworkPolicy {
        FrameworkPolicy {
            framework: self.framework,
            global_function: self.global_function.clone(),
            module_import_source: self.module_import_source.clone(),
        }
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        }),
    }
}

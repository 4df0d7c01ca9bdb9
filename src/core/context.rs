use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context as _, Result, anyhow};
use rayon::prelude::*;
use swc_common::SourceMap;

use crate::{
    cli::args::CommonArgs,
    config::{Config, load_config},
    core::{
        file_scanner::scan_files,
        keys::{KeyIndexStore, KeyRegistry, KeyResolver},
        parsers::{ParsedSource, parse_source},
        pipeline::{FileOutcome, ReplaceOutcome, TransformOptions, finish_file, replace_source},
    },
    error::{ErrorReport, TransformError},
};

/// One rewritten file.
#[derive(Debug)]
pub struct FileChanges {
    pub file_path: String,
    pub outcome: FileOutcome,
}

/// Result of running the pipeline over every scanned file.
#[derive(Debug, Default)]
pub struct ExtractRun {
    /// Files with at least one change, in path order.
    pub changed: Vec<FileChanges>,
    pub errors: Vec<ErrorReport>,
    pub files_checked: usize,
}

impl ExtractRun {
    pub fn change_count(&self) -> usize {
        self.changed.iter().map(|file| file.outcome.changes.len()).sum()
    }
}

/// Configuration and file set for one `extract` invocation.
///
/// # Configuration Priority
///
/// 1. CLI arguments (e.g. `--framework vue`)
/// 2. `.transmarkrc.json`
/// 3. Built-in defaults
pub struct ExtractContext {
    pub config: Config,
    /// Project root; scanned paths and state files are relative to it.
    pub root_dir: PathBuf,
    /// Sorted, so keys are handed out in a stable order.
    pub files: BTreeSet<String>,
    pub options: TransformOptions,
    pub verbose: bool,
}

impl ExtractContext {
    pub fn new(common_args: &CommonArgs) -> Result<Self> {
        let verbose = common_args.verbose;

        let start_dir = common_args
            .source_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        let config_result = load_config(&start_dir)?;
        if verbose && !config_result.from_file {
            eprintln!("Note: No .transmarkrc.json found, using default configuration");
        }

        let mut config = config_result.config;
        if let Some(framework) = common_args.framework {
            config.framework = framework;
        }
        if let Some(ref pattern) = common_args.pattern {
            config.pattern = pattern.clone();
        }

        let root_dir = common_args
            .source_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.source_root));
        let path = root_dir
            .to_str()
            .with_context(|| anyhow!("Invalid path: {:?}", root_dir))?;

        let options = TransformOptions {
            pattern: config.marker_pattern()?,
            framework: config.framework_policy(),
            annotate: config.annotate,
            merge_imports: config.merge_imports,
            import_conflict: config.import_conflict,
        };

        let scan_result = scan_files(
            path,
            &config.includes,
            &config.ignores,
            config.ignore_test_files,
        );
        if scan_result.skipped_count > 0 {
            eprintln!(
                "Warning: {} path(s) skipped due to access errors{}",
                scan_result.skipped_count,
                if verbose { "" } else { " (use -v for details)" }
            );
        }

        Ok(Self {
            config,
            root_dir,
            files: scan_result.files,
            options,
            verbose,
        })
    }

    pub fn key_index_store(&self) -> KeyIndexStore {
        KeyIndexStore::new(&self.resolve(&self.config.key_index_file))
    }

    pub fn messages_path(&self) -> PathBuf {
        self.resolve(&self.config.messages_file)
    }

    fn resolve(&self, relative: &str) -> PathBuf {
        let p = Path::new(relative);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.root_dir.join(p)
        }
    }

    /// Load the persisted key index and build the registry for this run.
    pub fn registry(&self) -> Result<KeyRegistry> {
        let index = self.key_index_store().load()?;
        let strategy = self.config.key_strategy.build(index.len());
        Ok(KeyRegistry::new(index, strategy))
    }

    /// Transform every scanned file.
    ///
    /// Reading and parsing run in parallel. The literal stage runs file by
    /// file in path order since it is the only writer of `registry`. The
    /// merge stage runs in parallel again.
    pub fn run(&self, registry: &mut KeyRegistry) -> ExtractRun {
        let parsed: Vec<(String, Result<(String, ParsedSource), TransformError>)> = self
            .files
            .par_iter()
            .map(|file_path| (file_path.clone(), read_and_parse(file_path)))
            .collect();

        let mut errors = Vec::new();
        let mut replaced: Vec<(String, ReplaceOutcome)> = Vec::new();
        for (file_path, result) in parsed {
            let (source, parsed) = match result {
                Ok(ok) => ok,
                Err(err) => {
                    errors.push(ErrorReport::from(&err).in_file(&file_path));
                    continue;
                }
            };

            let mut resolver = KeyResolver::new(registry);
            match replace_source(&parsed, &source, &file_path, &self.options, &mut resolver) {
                Ok(outcome) if outcome.changed => replaced.push((file_path, outcome)),
                Ok(_) => {}
                Err(err) => {
                    resolver.rollback();
                    errors.push(ErrorReport::from(&err).in_file(&file_path));
                }
            }
        }

        let changed = replaced
            .into_par_iter()
            .map(|(file_path, outcome)| {
                let outcome = finish_file(outcome, &file_path, &self.options);
                FileChanges { file_path, outcome }
            })
            .collect();

        ExtractRun {
            changed,
            errors,
            files_checked: self.files.len(),
        }
    }
}

fn read_and_parse(file_path: &str) -> Result<(String, ParsedSource), TransformError> {
    let source = fs::read_to_string(file_path).map_err(|source| TransformError::Io {
        path: PathBuf::from(file_path),
        source,
    })?;
    let parsed = parse_source(source.clone(), file_path, Arc::new(SourceMap::default()))?;
    Ok((source, parsed))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;
    use crate::config::CONFIG_FILE_NAME;
    use crate::core::policy::Framework;

    fn args(root: &Path) -> CommonArgs {
        CommonArgs {
            source_root: Some(root.to_path_buf()),
            framework: None,
            pattern: None,
            verbose: false,
        }
    }

    #[test]
    fn test_cli_overrides_config() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "framework": "vue", "pattern": "<<(.+?)>>" }"#,
        )
        .unwrap();

        let mut common = args(dir.path());
        common.framework = Some(Framework::Global);
        let ctx = ExtractContext::new(&common).unwrap();

        assert_eq!(ctx.config.framework, Framework::Global);
        assert_eq!(ctx.options.pattern.as_str(), "<<(.+?)>>");
        assert_eq!(ctx.messages_path(), dir.path().join("messages/en.json"));
    }

    #[test]
    fn test_invalid_cli_pattern_fails() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let mut common = args(dir.path());
        common.pattern = Some("(".to_string());
        assert!(ExtractContext::new(&common).is_err());
    }

    #[test]
    fn test_run_collects_changes_and_parse_errors() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let src = dir.path().join("src");
        fs::create_dir(&src).unwrap();
        fs::write(src.join("a.js"), "export const a = \"___Hello___\";\n").unwrap();
        fs::write(src.join("b.js"), "export const b = \"___Hello___\";\n").unwrap();
        fs::write(src.join("broken.js"), "const = ;\n").unwrap();
        fs::write(src.join("plain.js"), "export const c = \"plain\";\n").unwrap();

        let ctx = ExtractContext::new(&args(dir.path())).unwrap();
        let mut registry = ctx.registry().unwrap();
        let run = ctx.run(&mut registry);

        assert_eq!(run.files_checked, 4);
        assert_eq!(run.changed.len(), 2);
        assert_eq!(run.change_count(), 2);
        assert!(run.changed[0].file_path.ends_with("a.js"));
        assert_eq!(
            run.changed[0].outcome.code,
            "import i18n from \"i18next\";\nexport const a = i18n.t(\"Hello\");\n"
        );
        assert_eq!(run.errors.len(), 1);
        assert!(run.errors[0].file.as_deref().is_some_and(|f| f.ends_with("broken.js")));
        assert_eq!(registry.extracted().len(), 1);
        assert_eq!(registry.reused().len(), 1);
    }
}

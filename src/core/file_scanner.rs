//! Source file discovery.
//!
//! Include entries are directories or directory globs relative to the base
//! directory. Ignore entries without `*` or `?` are path prefixes, the rest
//! are globs matched against the whole path.

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use glob::{Pattern, glob};
use walkdir::WalkDir;

use crate::config::TEST_FILE_PATTERNS;
use crate::core::parsers::Dialect;

fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Result of scanning files.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Sorted, so files are always transformed in the same order.
    pub files: BTreeSet<String>,
    /// Entries that could not be read.
    pub skipped_count: usize,
}

/// Paths a scan never descends into or returns.
struct IgnoreSet {
    prefixes: Vec<PathBuf>,
    globs: Vec<Pattern>,
}

impl IgnoreSet {
    fn new(base: &Path, ignores: &[String], ignore_test_files: bool) -> Self {
        let mut set = Self {
            prefixes: Vec::new(),
            globs: Vec::new(),
        };
        for entry in ignores {
            if !is_glob_pattern(entry) {
                set.prefixes.push(base.join(entry));
                continue;
            }
            match Pattern::new(entry) {
                Ok(pattern) => set.globs.push(pattern),
                Err(err) => tracing::warn!(pattern = %entry, error = %err, "invalid ignore pattern"),
            }
        }
        if ignore_test_files {
            set.globs
                .extend(TEST_FILE_PATTERNS.iter().filter_map(|p| Pattern::new(p).ok()));
        }
        set
    }

    fn contains(&self, path: &Path) -> bool {
        self.prefixes.iter().any(|prefix| path.starts_with(prefix))
            || self.globs.iter().any(|glob| glob.matches_path(path))
    }
}

/// Directories to walk. No includes means the whole base directory.
fn include_roots(base: &Path, includes: &[String]) -> Vec<PathBuf> {
    if includes.is_empty() {
        return vec![base.to_path_buf()];
    }

    let mut roots = Vec::new();
    for include in includes {
        let path = base.join(include);
        if !is_glob_pattern(include) {
            if path.exists() {
                roots.push(path);
            } else {
                tracing::warn!(path = %path.display(), "include path does not exist");
            }
            continue;
        }
        match glob(&path.to_string_lossy()) {
            Ok(entries) => roots.extend(entries.flatten().filter(|entry| entry.is_dir())),
            Err(err) => tracing::warn!(pattern = %include, error = %err, "invalid include pattern"),
        }
    }
    roots
}

pub fn scan_files(
    base_dir: &str,
    includes: &[String],
    ignores: &[String],
    ignore_test_files: bool,
) -> ScanResult {
    let base = Path::new(base_dir);
    let ignored = IgnoreSet::new(base, ignores, ignore_test_files);
    let mut result = ScanResult::default();

    for root in include_roots(base, includes) {
        let walker = WalkDir::new(root)
            .into_iter()
            .filter_entry(|entry| !ignored.contains(entry.path()));
        for entry in walker {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && Dialect::for_source(path).is_some() {
                        result.files.insert(path.to_string_lossy().into_owned());
                    }
                }
                Err(err) => {
                    result.skipped_count += 1;
                    tracing::warn!(error = %err, "cannot access path");
                }
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use std::fs::{self, File};

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;

    fn touch(root: &Path, files: &[&str]) {
        for file in files {
            let path = root.join(file);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            File::create(path).unwrap();
        }
    }

    fn names(result: &ScanResult, root: &Path) -> Vec<String> {
        result
            .files
            .iter()
            .map(|file| {
                Path::new(file)
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_every_module_extension_is_scanned() {
        let dir = tempdir().unwrap();
        touch(
            dir.path(),
            &[
                "a.js", "b.jsx", "c.mjs", "d.cjs", "e.ts", "f.tsx", "g.mts", "h.cts",
                "types.d.ts", "types.d.cts", "style.css", "data.json",
            ],
        );

        let result = scan_files(dir.path().to_str().unwrap(), &[], &[], false);

        assert_eq!(
            names(&result, dir.path()),
            vec!["a.js", "b.jsx", "c.mjs", "d.cjs", "e.ts", "f.tsx", "g.mts", "h.cts"]
        );
        assert_eq!(result.skipped_count, 0);
    }

    #[test]
    fn test_files_come_out_in_path_order() {
        let dir = tempdir().unwrap();
        touch(dir.path(), &["src/z.ts", "src/pages/b.tsx", "src/a.ts", "src/pages/a.tsx"]);

        let result = scan_files(dir.path().to_str().unwrap(), &["src".to_owned()], &[], false);

        assert_eq!(
            names(&result, dir.path()),
            vec!["src/a.ts", "src/pages/a.tsx", "src/pages/b.tsx", "src/z.ts"]
        );
    }

    #[test]
    fn test_overlapping_includes_yield_each_file_once() {
        let dir = tempdir().unwrap();
        touch(dir.path(), &["src/components/Button.tsx"]);

        let result = scan_files(
            dir.path().to_str().unwrap(),
            &["src".to_owned(), "src/components".to_owned(), "src/*".to_owned()],
            &[],
            false,
        );

        assert_eq!(names(&result, dir.path()), vec!["src/components/Button.tsx"]);
    }

    #[test]
    fn test_ignored_prefix_and_test_files_are_left_out() {
        let dir = tempdir().unwrap();
        touch(
            dir.path(),
            &["src/App.tsx", "src/App.test.tsx", "src/locales/en.js", "src/__tests__/util.ts"],
        );

        let result = scan_files(
            dir.path().to_str().unwrap(),
            &["src".to_owned()],
            &["src/locales".to_owned()],
            true,
        );

        assert_eq!(names(&result, dir.path()), vec!["src/App.tsx"]);
    }

    #[test]
    fn test_missing_include_scans_nothing() {
        let dir = tempdir().unwrap();
        touch(dir.path(), &["lib/a.ts"]);

        let result = scan_files(dir.path().to_str().unwrap(), &["src".to_owned()], &[], false);

        assert!(result.files.is_empty());
        assert_eq!(result.skipped_count, 0);
    }
}

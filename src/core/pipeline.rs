//! Per-file transformation pipeline.
//!
//! ```text
//! parse ─► build_tree ─► synthesize ─► resolve_conflicts ─► materialize ─► apply_edits
//!                                                                              │
//!                                                   merge_requirements ◄───────┘
//! ```
//!
//! [`replace_source`] is the literal stage and needs the key resolver, so a
//! host runs it for one file at a time. [`finish_file`] only needs the patched
//! text and may run in parallel.

use std::sync::Arc;

use swc_common::SourceMap;

use crate::core::keys::{KeyRegistry, KeyResolver};
use crate::core::merge::{ImportConflict, merge_requirements};
use crate::core::parsers::{ParsedSource, parse_source};
use crate::core::patch::{TextEdit, apply_edits};
use crate::core::policy::{FrameworkPolicy, Requirements};
use crate::core::replace::{
    ChangeDetail, MarkerPattern, SynthesisOptions, Synthesizer, materialize, resolve_conflicts,
};
use crate::core::tree::build_tree;
use crate::error::TransformResult;

#[derive(Debug, Clone)]
pub struct TransformOptions {
    pub pattern: MarkerPattern,
    pub framework: FrameworkPolicy,
    /// Attach the canonical text as a comment on every call.
    pub annotate: bool,
    pub merge_imports: bool,
    pub import_conflict: ImportConflict,
}

/// Result of the literal stage for one file.
#[derive(Debug, Clone)]
pub struct ReplaceOutcome {
    pub changed: bool,
    pub code: String,
    /// Span-disjoint, sorted by offset.
    pub changes: Vec<ChangeDetail>,
    pub requirements: Requirements,
}

/// Final result for one file.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub code: String,
    pub changes: Vec<ChangeDetail>,
    pub imports_added: usize,
    pub setups_added: usize,
}

impl FileOutcome {
    pub fn changed(&self) -> bool {
        !self.changes.is_empty()
    }
}

/// Rewrite every marker match of `source` into a translation call.
pub fn replace_source(
    parsed: &ParsedSource,
    source: &str,
    file_path: &str,
    options: &TransformOptions,
    resolver: &mut KeyResolver<'_>,
) -> TransformResult<ReplaceOutcome> {
    let tree = build_tree(parsed, source);
    let synthesis = SynthesisOptions {
        file_path,
        pattern: &options.pattern,
        framework: &options.framework,
        annotate: options.annotate,
    };
    let (mut staged, requirements) = Synthesizer::new(&tree, source, synthesis, resolver).run();
    resolve_conflicts(&tree, &mut staged);

    let changes = materialize(source, &staged);
    let edits: Vec<TextEdit> = changes.iter().map(ChangeDetail::edit).collect();
    let code = apply_edits(source, &edits)?;
    tracing::debug!(file = file_path, changes = changes.len(), "literal stage done");

    Ok(ReplaceOutcome {
        changed: !changes.is_empty(),
        code,
        changes,
        requirements,
    })
}

/// Run the merge stage when the literal stage changed anything.
pub fn finish_file(outcome: ReplaceOutcome, file_path: &str, options: &TransformOptions) -> FileOutcome {
    let ReplaceOutcome {
        changed,
        code,
        changes,
        requirements,
    } = outcome;

    if !changed || !options.merge_imports {
        return FileOutcome {
            code,
            changes,
            imports_added: 0,
            setups_added: 0,
        };
    }

    let merged = merge_requirements(code, file_path, &requirements, options.import_conflict);
    FileOutcome {
        code: merged.code,
        changes,
        imports_added: merged.imports_added,
        setups_added: merged.setups_added,
    }
}

/// Parse, rewrite and merge a single file.
pub fn transform_source(
    source: &str,
    file_path: &str,
    options: &TransformOptions,
    registry: &mut KeyRegistry,
) -> TransformResult<FileOutcome> {
    let parsed = parse_source(source.to_string(), file_path, Arc::new(SourceMap::default()))?;
    let mut resolver = KeyResolver::new(registry);
    match replace_source(&parsed, source, file_path, options, &mut resolver) {
        Ok(outcome) => Ok(finish_file(outcome, file_path, options)),
        Err(err) => {
            resolver.rollback();
            Err(err)
        }
    }
}

//! Import and setup-call merging.
//!
//! Runs once per file after the literal edits are applied. The patched text
//! is parsed again, existing imports are inventoried, and the edits for
//! missing imports and setup calls are applied in a second pass. Every
//! failure here is logged and leaves the patched code as it is.

mod imports;
mod inventory;
mod setup;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use swc_common::SourceMap;

pub use imports::ImportMerge;
pub use inventory::{ExistingImport, ExistingSpecifier, ImportInventory, collect_imports};
pub use setup::setup_edits;

use crate::core::parsers::parse_source;
use crate::core::patch::{TextEdit, apply_edits};
use crate::core::policy::{ImportRequirement, Requirements, SetupCallRequirement};
use crate::core::tree::build_tree;

/// What to do when a required import name is already bound from another module.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ImportConflict {
    /// Warn and keep the existing import.
    #[default]
    Skip,
    /// Remove the colliding specifier and add the required one.
    Override,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub code: String,
    pub imports_added: usize,
    pub setups_added: usize,
}

impl MergeOutcome {
    fn unchanged(code: String) -> Self {
        Self {
            code,
            imports_added: 0,
            setups_added: 0,
        }
    }
}

pub fn merge_requirements(
    code: String,
    file_path: &str,
    requirements: &Requirements,
    conflict: ImportConflict,
) -> MergeOutcome {
    if requirements.is_empty() {
        return MergeOutcome::unchanged(code);
    }

    let parsed = match parse_source(code.clone(), file_path, Arc::new(SourceMap::default())) {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::warn!(file = file_path, error = %err, "skipping import merge");
            return MergeOutcome::unchanged(code);
        }
    };

    let tree = build_tree(&parsed, &code);
    let setups = setup_edits(&tree, &code, &requirements.setups);
    let imports: Vec<ImportRequirement> = requirements
        .imports
        .iter()
        .filter(|import| !is_unused_hook(import, &requirements.setups, &code, &setups))
        .cloned()
        .collect();

    let inventory = collect_imports(&parsed, &code);
    let (mut edits, imports_added) =
        ImportMerge::new(&code, file_path, &inventory, conflict).merge(&imports);
    let setups_added = setups.len();
    edits.extend(setups);

    if edits.is_empty() {
        return MergeOutcome::unchanged(code);
    }
    match apply_edits(&code, &edits) {
        Ok(merged) => MergeOutcome {
            code: merged,
            imports_added,
            setups_added,
        },
        Err(err) => {
            tracing::warn!(file = file_path, error = %err, "skipping import merge");
            MergeOutcome::unchanged(code)
        }
    }
}

/// A hook import is dropped when nothing calls the hook, neither the
/// existing code nor one of the setup edits.
fn is_unused_hook(
    import: &ImportRequirement,
    setups: &[SetupCallRequirement],
    code: &str,
    edits: &[TextEdit],
) -> bool {
    if import.is_default_import {
        return false;
    }
    let Some(hook) = import
        .specifiers
        .iter()
        .find(|spec| setups.iter().any(|setup| setup.callee_name == spec.name))
    else {
        return false;
    };
    let call = format!("{}(", hook.local());
    !code.contains(&call) && !edits.iter().any(|edit| edit.text.contains(&call))
}

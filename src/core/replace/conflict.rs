use super::synthesizer::StagedReplacement;
use crate::core::tree::SyntaxTree;

/// Clear `is_top_level` on every entry that has a staged strict ancestor.
///
/// `staged` must be sorted by node id. Pre-order ids mean a sweep that
/// remembers the last top-level entry sees every ancestor before its
/// descendants.
pub fn resolve_conflicts(tree: &SyntaxTree, staged: &mut [StagedReplacement]) {
    let mut active = None;
    for entry in staged.iter_mut() {
        match active {
            Some(ancestor) if tree.is_ancestor(ancestor, entry.node) => {
                entry.is_top_level = false;
            }
            _ => {
                entry.is_top_level = true;
                active = Some(entry.node);
            }
        }
    }
}

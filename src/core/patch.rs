//! Single-pass application of non-overlapping text edits.

use crate::core::source::TextRange;
use crate::error::{TransformError, TransformResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl TextEdit {
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self {
            start: at,
            end: at,
            text: text.into(),
        }
    }

    pub fn replace(range: TextRange, text: impl Into<String>) -> Self {
        Self {
            start: range.start,
            end: range.end,
            text: text.into(),
        }
    }

    pub fn delete(range: TextRange) -> Self {
        Self::replace(range, "")
    }
}

/// Copy `text`, substituting each edit's span.
///
/// Edits may come in any order. Overlapping spans are an error; several
/// insertions at the same offset are applied in the order given.
pub fn apply_edits(text: &str, edits: &[TextEdit]) -> TransformResult<String> {
    let mut sorted: Vec<&TextEdit> = edits.iter().collect();
    sorted.sort_by_key(|edit| (edit.start, edit.end));

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for edit in sorted {
        if edit.start < cursor || edit.end > text.len() || edit.start > edit.end {
            return Err(TransformError::OverlappingChanges {
                first: cursor,
                second: edit.start,
            });
        }
        out.push_str(&text[cursor..edit.start]);
        out.push_str(&edit.text);
        cursor = edit.end;
    }
    out.push_str(&text[cursor..]);
    Ok(out)
}

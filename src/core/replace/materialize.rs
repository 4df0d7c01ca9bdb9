use serde::Serialize;

use super::synthesizer::StagedReplacement;
use crate::core::patch::TextEdit;
use crate::core::source::{LineCol, LineIndex};

/// One exact-span textual change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeDetail {
    pub original: String,
    pub replacement: String,
    pub start: usize,
    pub end: usize,
    #[serde(skip)]
    pub start_pos: LineCol,
    #[serde(skip)]
    pub end_pos: LineCol,
    /// Trimmed source line the change starts on.
    pub context: String,
}

impl ChangeDetail {
    pub fn edit(&self) -> TextEdit {
        TextEdit {
            start: self.start,
            end: self.end,
            text: self.replacement.clone(),
        }
    }
}

/// Turn the top-level staged entries into change details sorted by offset.
pub fn materialize(source: &str, staged: &[StagedReplacement]) -> Vec<ChangeDetail> {
    let lines = LineIndex::new(source);
    let mut changes: Vec<ChangeDetail> = staged
        .iter()
        .filter(|entry| entry.is_top_level)
        .map(|entry| {
            let start_pos = lines.line_col(source, entry.range.start);
            let end_pos = lines.line_col(source, entry.range.end);
            ChangeDetail {
                original: lines.slice(source, start_pos, end_pos),
                replacement: entry.fragment.render(),
                start: lines.offset(source, start_pos),
                end: lines.offset(source, end_pos),
                start_pos,
                end_pos,
                context: lines.line_text(source, start_pos.line).trim().to_string(),
            }
        })
        .collect();
    changes.sort_by_key(|change| (change.start, change.end));
    changes
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::core::replace::fragment::{CallFragment, Fragment};
    use crate::core::source::TextRange;
    use crate::core::tree::NodeId;

    fn entry(node: usize, range: TextRange, key: &str, top: bool) -> StagedReplacement {
        StagedReplacement {
            node: NodeId(node),
            range,
            fragment: Fragment::Call(CallFragment {
                callee: "t".into(),
                key: format!("\"{key}\""),
                args: Vec::new(),
                comment: None,
            }),
            original: None,
            is_top_level: top,
        }
    }

    #[test]
    fn test_multiline_span() {
        let source = "const a = `___x\ny___`;\nconst b = 1;\n";
        let start = source.find('`').unwrap();
        let end = source.rfind('`').unwrap() + 1;
        let changes = materialize(source, &[entry(1, TextRange::new(start, end), "xy", true)]);

        assert_eq!(changes.len(), 1);
        let change = &changes[0];
        assert_eq!(change.original, "`___x\ny___`");
        assert_eq!((change.start, change.end), (start, end));
        assert_eq!(change.start_pos, LineCol { line: 1, column: 10 });
        assert_eq!(change.end_pos, LineCol { line: 2, column: 5 });
        assert_eq!(change.context, "const a = `___x");
        assert_eq!(change.replacement, "t(\"xy\")");
    }

    #[test]
    fn test_non_top_level_entries_are_skipped_and_output_sorted() {
        let source = "f('___a___', '___b___');";
        let a = TextRange::new(2, 11);
        let b = TextRange::new(13, 22);
        let changes = materialize(
            source,
            &[
                entry(3, b, "b", true),
                entry(1, a, "a", true),
                entry(2, TextRange::new(3, 6), "x", false),
            ],
        );
        let starts: Vec<usize> = changes.iter().map(|change| change.start).collect();
        assert_eq!(starts, vec![2, 13]);
        assert_eq!(changes[0].original, "'___a___'");
    }
}

//! Setup-call injection into component and custom-hook bodies.

use regex::Regex;

use crate::core::patch::TextEdit;
use crate::core::policy::{ContextKind, SetupCallRequirement};
use crate::core::replace::classify_function;
use crate::core::source::{LineIndex, TextRange};
use crate::core::tree::{FunctionBody, NodeId, SyntaxTree};

/// Text patterns for one setup requirement.
struct SetupMatcher<'r> {
    requirement: &'r SetupCallRequirement,
    uses: Regex,
    destructured: Regex,
    assigned: Regex,
    mentioned: Regex,
}

impl<'r> SetupMatcher<'r> {
    fn new(requirement: &'r SetupCallRequirement) -> Option<Self> {
        let bound = regex::escape(&requirement.bound_variable);
        Some(Self {
            requirement,
            uses: Regex::new(&format!(r"(?:^|[^.\w$]){bound}\s*\(")).ok()?,
            destructured: Regex::new(&format!(r"\{{[^}}]*\b{bound}\b[^}}]*\}}\s*=")).ok()?,
            assigned: Regex::new(&format!(r"\b(?:const|let|var)\s+{bound}\s*=")).ok()?,
            mentioned: Regex::new(&format!(r"\b{bound}\b")).ok()?,
        })
    }

    fn is_used(&self, body: &str) -> bool {
        self.uses.is_match(body)
    }

    fn is_present(&self, body: &str, params: &str) -> bool {
        body.contains(&self.requirement.statement)
            || self.destructured.is_match(body)
            || self.assigned.is_match(body)
            || self.mentioned.is_match(params)
    }
}

fn indentation(line: &str) -> &str {
    let trimmed = line.trim_start_matches([' ', '\t']);
    &line[..line.len() - trimmed.len()]
}

/// Edits inserting each setup statement as the first line of every
/// component or custom hook that calls the bound name without binding it.
pub fn setup_edits(
    tree: &SyntaxTree,
    source: &str,
    requirements: &[SetupCallRequirement],
) -> Vec<TextEdit> {
    let matchers: Vec<SetupMatcher> = requirements.iter().filter_map(SetupMatcher::new).collect();
    if matchers.is_empty() {
        return Vec::new();
    }

    let lines = LineIndex::new(source);
    let mut selected: Vec<NodeId> = Vec::new();
    let mut edits = Vec::new();

    for (id, _) in tree.iter() {
        let Some(function) = tree.function(id) else {
            continue;
        };
        if function.class_member
            || !matches!(
                classify_function(function),
                ContextKind::Component | ContextKind::CustomHook
            )
        {
            continue;
        }
        if selected.iter().any(|&outer| tree.is_ancestor(outer, id)) {
            continue;
        }

        let body_range = match function.body {
            FunctionBody::Block(range) | FunctionBody::Concise(range) => range,
            FunctionBody::None => continue,
        };
        let body = &source[body_range.start..body_range.end];
        let params = function
            .params
            .map(|range| &source[range.start..range.end])
            .unwrap_or_default();

        let statements: Vec<&str> = matchers
            .iter()
            .filter(|matcher| matcher.is_used(body) && !matcher.is_present(body, params))
            .map(|matcher| matcher.requirement.statement.as_str())
            .collect();
        if statements.is_empty() {
            continue;
        }
        selected.push(id);

        let line = lines.line_col(source, tree.node(id).range.start).line;
        let outer = indentation(lines.line_text(source, line));
        let edit = match function.body {
            FunctionBody::Block(range) => block_insertion(source, range, outer, &statements),
            _ => concise_rewrite(source, body_range, outer, &statements),
        };
        edits.push(edit);
    }
    edits
}

fn block_insertion(source: &str, body: TextRange, outer: &str, statements: &[&str]) -> TextEdit {
    let at = body.start + 1;
    let inner = &source[at..body.end.saturating_sub(1).max(at)];

    if !inner.contains('\n') {
        let text: String = statements.iter().map(|stmt| format!(" {stmt}")).collect();
        return TextEdit::insert(at, text);
    }

    let indent = inner
        .lines()
        .skip(1)
        .find(|line| !line.trim().is_empty())
        .map(indentation)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{outer}  "));
    let text: String = statements
        .iter()
        .map(|stmt| format!("\n{indent}{stmt}"))
        .collect();
    TextEdit::insert(at, text)
}

fn concise_rewrite(source: &str, body: TextRange, outer: &str, statements: &[&str]) -> TextEdit {
    let indent = format!("{outer}  ");
    let mut text = String::from("{");
    for stmt in statements {
        text.push_str(&format!("\n{indent}{stmt}"));
    }
    text.push_str(&format!(
        "\n{indent}return {};\n{outer}}}",
        &source[body.start..body.end]
    ));
    TextEdit::replace(body, text)
}

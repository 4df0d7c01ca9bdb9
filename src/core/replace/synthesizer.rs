//! Staging of replacement fragments for literal candidates.

use std::collections::HashMap;

use super::classifier::ContextClassifier;
use super::fragment::{CallFragment, Fragment, Piece};
use super::matcher::{CanonicalPiece, CanonicalText, Match, MarkerPattern};
use crate::core::keys::KeyResolver;
use crate::core::policy::{FrameworkPolicy, Requirements};
use crate::core::source::{LineIndex, SourceLocation, TextRange};
use crate::core::tree::{LiteralKind, LiteralNode, LiteralPart, NodeId, NodeKind, SyntaxTree};
use crate::utils::escape_template_text;

/// A rewrite waiting for conflict resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedReplacement {
    pub node: NodeId,
    /// Source range the fragment replaces. For element text this can be
    /// narrower than the node when the leftover text around the matches
    /// stays untouched.
    pub range: TextRange,
    pub fragment: Fragment,
    pub original: Option<String>,
    pub is_top_level: bool,
}

pub struct SynthesisOptions<'a> {
    pub file_path: &'a str,
    pub pattern: &'a MarkerPattern,
    pub framework: &'a FrameworkPolicy,
    pub annotate: bool,
}

/// Walks literal candidates in document order and stages a fragment for
/// every literal with at least one resolved match.
///
/// Embedded expressions of a match are rewritten eagerly: literals nested in
/// them are staged first and their rendered text is folded into the
/// argument. The nested entries stay in the staged set and are dropped later
/// by the conflict resolver.
pub struct Synthesizer<'a, 'r> {
    tree: &'a SyntaxTree,
    source: &'a str,
    lines: LineIndex,
    options: SynthesisOptions<'a>,
    classifier: ContextClassifier<'a>,
    resolver: &'a mut KeyResolver<'r>,
    staged: HashMap<NodeId, Option<StagedReplacement>>,
}

impl<'a, 'r> Synthesizer<'a, 'r> {
    pub fn new(
        tree: &'a SyntaxTree,
        source: &'a str,
        options: SynthesisOptions<'a>,
        resolver: &'a mut KeyResolver<'r>,
    ) -> Self {
        Self {
            tree,
            source,
            lines: LineIndex::new(source),
            classifier: ContextClassifier::new(tree, options.framework),
            options,
            resolver,
            staged: HashMap::new(),
        }
    }

    /// Stage every candidate. Returns the staged set in document order and
    /// the imports and setup calls the synthesized calls rely on.
    pub fn run(mut self) -> (Vec<StagedReplacement>, Requirements) {
        let tree = self.tree;
        for (id, node) in tree.iter() {
            if matches!(node.kind, NodeKind::Literal(_)) {
                self.ensure_staged(id);
            }
        }

        let mut staged: Vec<StagedReplacement> = self.staged.into_values().flatten().collect();
        staged.sort_by_key(|entry| entry.node);
        (staged, self.classifier.into_requirements())
    }

    fn ensure_staged(&mut self, id: NodeId) {
        if self.staged.contains_key(&id) {
            return;
        }
        let staged = self.synthesize(id);
        self.staged.insert(id, staged);
    }

    /// Full text of the literal `id` once its staged fragment is applied.
    ///
    /// Element text may stage a range narrower than the node; the source
    /// around that range is kept.
    fn rendered(&mut self, id: NodeId) -> Option<String> {
        self.ensure_staged(id);
        let entry = self.staged.get(&id).and_then(Option::as_ref)?;
        let node = self.tree.node(id).range;
        let mut out = String::with_capacity(node.len());
        out.push_str(&self.source[node.start..entry.range.start]);
        out.push_str(&entry.fragment.render());
        out.push_str(&self.source[entry.range.end..node.end]);
        Some(out)
    }

    fn inside_module_reference(&self, id: NodeId) -> bool {
        self.tree
            .ancestors(id)
            .any(|ancestor| matches!(self.tree.node(ancestor).kind, NodeKind::ModuleReference))
    }

    /// `t("___Hi___")` is left alone when `t` is the active call name.
    fn is_translation_argument(&self, id: NodeId, callee: &str) -> bool {
        let Some(parent) = self.tree.parent(id) else {
            return false;
        };
        match &self.tree.node(parent).kind {
            NodeKind::Call(call) => {
                call.callee.as_deref() == Some(callee)
                    && call.sole_argument == Some(self.tree.node(id).range)
            }
            _ => false,
        }
    }

    fn synthesize(&mut self, id: NodeId) -> Option<StagedReplacement> {
        let tree = self.tree;
        let literal = tree.literal(id)?;
        if self.inside_module_reference(id) {
            return None;
        }

        let context = self.classifier.classify(id);
        let callee = self
            .classifier
            .policy(context.kind)
            .call
            .callee()
            .to_string();
        if self.is_translation_argument(id, &callee) {
            return None;
        }

        let canonical = CanonicalText::build(literal, self.source);
        let mut accepted = Vec::new();
        for m in self.options.pattern.find_matches(&canonical) {
            if let Some(call) = self.synthesize_call(literal, &canonical, &m, &callee) {
                accepted.push((m, call));
            }
        }
        if accepted.is_empty() {
            return None;
        }
        self.classifier.require(context.kind);

        let node_range = tree.node(id).range;
        let (range, fragment) = match literal.kind {
            LiteralKind::ElementText => self.element_children(literal, &canonical, accepted),
            LiteralKind::Attribute => {
                let inner = self.string_fragment(literal, &canonical, accepted);
                (node_range, Fragment::AttributeValue(Box::new(inner)))
            }
            LiteralKind::String { .. } | LiteralKind::Template => {
                (node_range, self.string_fragment(literal, &canonical, accepted))
            }
        };

        Some(StagedReplacement {
            node: id,
            range,
            fragment,
            original: Some(self.source[range.start..range.end].to_string()),
            is_top_level: true,
        })
    }

    fn synthesize_call(
        &mut self,
        literal: &LiteralNode,
        canonical: &CanonicalText,
        m: &Match,
        callee: &str,
    ) -> Option<CallFragment> {
        let start = canonical.source_offset(m.full.start, literal);
        let location = SourceLocation::new(
            self.options.file_path,
            self.lines.line_col(self.source, start),
        );
        let raw = canonical.display_text(m.full, literal.kind, self.source);
        let value = canonical.display_text(m.capture, literal.kind, self.source);
        let resolved = self.resolver.resolve(&raw, &value, &location)?;

        let mut args = Vec::with_capacity(m.slots.len());
        for (n, &part) in m.slots.iter().enumerate() {
            if let LiteralPart::Slot { node, inner, .. } = literal.parts[part] {
                args.push((format!("arg{}", n + 1), self.rewrite(node, inner)));
            }
        }

        Some(CallFragment {
            callee: callee.to_string(),
            key: resolved.key.to_js(),
            args,
            comment: self.options.annotate.then_some(value),
        })
    }

    /// Source text of `range` inside `container` with every nested literal
    /// replaced by its rendering.
    fn rewrite(&mut self, container: NodeId, range: TextRange) -> String {
        let tree = self.tree;
        let mut out = String::with_capacity(range.len());
        let mut cursor = range.start;
        for id in tree.outermost_literals(container) {
            let literal_range = tree.node(id).range;
            if literal_range.start < cursor || literal_range.end > range.end {
                continue;
            }
            let text = match self.rendered(id) {
                Some(text) => text,
                None => self.render_unstaged(id),
            };
            out.push_str(&self.source[cursor..literal_range.start]);
            out.push_str(&text);
            cursor = literal_range.end;
        }
        out.push_str(&self.source[cursor..range.end]);
        out
    }

    /// A literal without matches of its own, with its slots rewritten.
    fn render_unstaged(&mut self, id: NodeId) -> String {
        let tree = self.tree;
        let range = tree.node(id).range;
        let Some(literal) = tree.literal(id) else {
            return self.source[range.start..range.end].to_string();
        };

        let mut out = String::with_capacity(range.len());
        let mut cursor = range.start;
        for part in &literal.parts {
            if let LiteralPart::Slot { node, inner, .. } = *part {
                out.push_str(&self.source[cursor..inner.start]);
                out.push_str(&self.rewrite(node, inner));
                cursor = inner.end;
            }
        }
        out.push_str(&self.source[cursor..range.end]);
        out
    }

    /// Text of a canonical range that no match covers, escaped for the
    /// context it ends up in.
    fn leftover(&mut self, literal: &LiteralNode, canonical: &CanonicalText, range: TextRange) -> String {
        let mut out = String::new();
        for piece in canonical.pieces(range) {
            match piece {
                CanonicalPiece::Text(text) => {
                    let raw = &self.source[text.start..text.end];
                    match literal.kind {
                        LiteralKind::String { .. } => out.push_str(&escape_template_text(raw, false)),
                        LiteralKind::Attribute => out.push_str(&escape_template_text(raw, true)),
                        LiteralKind::Template | LiteralKind::ElementText => out.push_str(raw),
                    }
                }
                CanonicalPiece::Slot(part) => {
                    if let LiteralPart::Slot { node, outer, inner } = literal.parts[part] {
                        out.push_str(&self.source[outer.start..inner.start]);
                        out.push_str(&self.rewrite(node, inner));
                        out.push_str(&self.source[inner.end..outer.end]);
                    }
                }
            }
        }
        out
    }

    fn interleave(
        &mut self,
        literal: &LiteralNode,
        canonical: &CanonicalText,
        accepted: Vec<(Match, CallFragment)>,
        span: TextRange,
    ) -> Vec<Piece> {
        let mut pieces = Vec::with_capacity(accepted.len() * 2 + 1);
        let mut cursor = span.start;
        for (m, call) in accepted {
            let text = self.leftover(literal, canonical, TextRange::new(cursor, m.full.start));
            if !text.is_empty() {
                pieces.push(Piece::Verbatim(text));
            }
            pieces.push(Piece::Call(call));
            cursor = m.full.end;
        }
        let text = self.leftover(literal, canonical, TextRange::new(cursor, span.end));
        if !text.is_empty() {
            pieces.push(Piece::Verbatim(text));
        }
        pieces
    }

    fn string_fragment(
        &mut self,
        literal: &LiteralNode,
        canonical: &CanonicalText,
        mut accepted: Vec<(Match, CallFragment)>,
    ) -> Fragment {
        let whole = TextRange::new(0, canonical.len());
        if accepted.len() == 1 && accepted[0].0.full == whole {
            let (_, call) = accepted.remove(0);
            return Fragment::Call(call);
        }
        Fragment::Template(self.interleave(literal, canonical, accepted, whole))
    }

    /// Element text keeps leading and trailing leftovers outside the edited
    /// range when they hold no embedded expressions, so a lone match
    /// collapses to `{call}`.
    fn element_children(
        &mut self,
        literal: &LiteralNode,
        canonical: &CanonicalText,
        accepted: Vec<(Match, CallFragment)>,
    ) -> (TextRange, Fragment) {
        let has_slot = |range: TextRange| {
            canonical
                .pieces(range)
                .iter()
                .any(|piece| matches!(piece, CanonicalPiece::Slot(_)))
        };

        let first = accepted.first().map(|(m, _)| m.full.start).unwrap_or_default();
        let last = accepted.last().map(|(m, _)| m.full.end).unwrap_or_default();
        let start = if has_slot(TextRange::new(0, first)) { 0 } else { first };
        let end = if has_slot(TextRange::new(last, canonical.len())) {
            canonical.len()
        } else {
            last
        };

        let range = TextRange::new(
            canonical.source_offset(start, literal),
            canonical.source_offset(end, literal),
        );
        let pieces = self.interleave(literal, canonical, accepted, TextRange::new(start, end));
        (range, Fragment::Children(pieces))
    }
}

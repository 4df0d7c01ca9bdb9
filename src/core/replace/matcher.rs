//! Marker pattern matching over canonical literal text.

use regex::Regex;

use crate::core::source::TextRange;
use crate::core::tree::{LiteralKind, LiteralNode, LiteralPart};
use crate::error::{TransformError, TransformResult};
use crate::utils::unescape_js;

/// Stands in for each embedded expression in the canonical form of a literal.
///
/// Private-use code points, so no literal text can contain it by accident.
pub const SLOT_TOKEN: &str = "\u{E000}expr\u{E001}";

#[derive(Debug, Clone)]
pub struct MarkerPattern {
    regex: Regex,
}

impl MarkerPattern {
    pub fn new(pattern: &str) -> TransformResult<Self> {
        let regex = Regex::new(pattern).map_err(|e| TransformError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self { regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Every non-overlapping, accepted match in left-to-right order.
    ///
    /// A match is rejected when one of its boundaries (or its capture's) cuts
    /// through a slot token, or when a slot token sits outside the capture,
    /// i.e. inside the markers themselves.
    pub fn find_matches(&self, canonical: &CanonicalText) -> Vec<Match> {
        let mut matches = Vec::new();
        for caps in self.regex.captures_iter(&canonical.text) {
            let Some(full) = caps.get(0) else {
                continue;
            };
            if full.is_empty() {
                continue;
            }
            let capture = caps.get(1).unwrap_or(full);
            let full = TextRange::new(full.start(), full.end());
            let capture = TextRange::new(capture.start(), capture.end());

            let cuts_token = [full.start, full.end, capture.start, capture.end]
                .into_iter()
                .any(|offset| canonical.inside_slot(offset));
            if cuts_token {
                continue;
            }

            let slots: Vec<&Segment> = canonical.slots_within(full).collect();
            if slots.iter().any(|slot| !capture.contains_range(slot.canonical)) {
                continue;
            }

            matches.push(Match {
                full,
                capture,
                slots: slots.iter().filter_map(|slot| slot.part).collect(),
            });
        }
        matches
    }
}

/// One marker occurrence in canonical text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Canonical range of the whole match, markers included.
    pub full: TextRange,
    /// Canonical range of the captured text.
    pub capture: TextRange,
    /// Indices into the literal's parts of the slots inside the capture.
    pub slots: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Segment {
    /// Range in canonical text.
    canonical: TextRange,
    /// Start of the segment in the source.
    source_start: usize,
    /// Index of the literal part, `None` for text.
    part: Option<usize>,
}

/// A piece of a canonical range, mapped back to the literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalPiece {
    /// Raw source text.
    Text(TextRange),
    /// The literal part index of an embedded expression.
    Slot(usize),
}

/// Literal text with each embedded expression replaced by [`SLOT_TOKEN`].
#[derive(Debug, Clone)]
pub struct CanonicalText {
    pub text: String,
    segments: Vec<Segment>,
}

impl CanonicalText {
    pub fn build(literal: &LiteralNode, source: &str) -> Self {
        let mut text = String::new();
        let mut segments = Vec::with_capacity(literal.parts.len());
        for (idx, part) in literal.parts.iter().enumerate() {
            let start = text.len();
            match part {
                LiteralPart::Text(range) => {
                    text.push_str(&source[range.start..range.end]);
                    segments.push(Segment {
                        canonical: TextRange::new(start, text.len()),
                        source_start: range.start,
                        part: None,
                    });
                }
                LiteralPart::Slot { outer, .. } => {
                    text.push_str(SLOT_TOKEN);
                    segments.push(Segment {
                        canonical: TextRange::new(start, text.len()),
                        source_start: outer.start,
                        part: Some(idx),
                    });
                }
            }
        }
        Self { text, segments }
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn inside_slot(&self, offset: usize) -> bool {
        self.segments.iter().any(|segment| {
            segment.part.is_some()
                && segment.canonical.start < offset
                && offset < segment.canonical.end
        })
    }

    fn slots_within(&self, range: TextRange) -> impl Iterator<Item = &Segment> {
        self.segments
            .iter()
            .filter(move |segment| segment.part.is_some() && segment.canonical.overlaps(range))
    }

    /// Map a canonical offset outside any slot token to a source offset.
    ///
    /// Offsets on token edges map to the edges of the slot's delimiters.
    pub fn source_offset(&self, offset: usize, literal: &LiteralNode) -> usize {
        for segment in &self.segments {
            if offset < segment.canonical.start || offset > segment.canonical.end {
                continue;
            }
            return match segment.part.map(|idx| &literal.parts[idx]) {
                Some(LiteralPart::Slot { outer, .. }) => {
                    if offset == segment.canonical.start {
                        outer.start
                    } else {
                        outer.end
                    }
                }
                _ => segment.source_start + (offset - segment.canonical.start),
            };
        }
        self.segments
            .last()
            .map(|segment| match segment.part.map(|idx| &literal.parts[idx]) {
                Some(LiteralPart::Slot { outer, .. }) => outer.end,
                _ => segment.source_start + segment.canonical.len(),
            })
            .unwrap_or_default()
    }

    /// Split a canonical range into source text pieces and slots.
    pub fn pieces(&self, range: TextRange) -> Vec<CanonicalPiece> {
        let mut pieces = Vec::new();
        for segment in &self.segments {
            let from = segment.canonical.start.max(range.start);
            let to = segment.canonical.end.min(range.end);
            if from >= to {
                continue;
            }
            match segment.part {
                Some(idx) => pieces.push(CanonicalPiece::Slot(idx)),
                None => {
                    let start = segment.source_start + (from - segment.canonical.start);
                    let end = segment.source_start + (to - segment.canonical.start);
                    pieces.push(CanonicalPiece::Text(TextRange::new(start, end)));
                }
            }
        }
        pieces
    }

    /// Text of a canonical range with escapes decoded and slots numbered
    /// `{arg1}`, `{arg2}`, ... in order.
    pub fn display_text(&self, range: TextRange, kind: LiteralKind, source: &str) -> String {
        let mut out = String::new();
        let mut arg = 0;
        for piece in self.pieces(range) {
            match piece {
                CanonicalPiece::Text(text) => {
                    let raw = &source[text.start..text.end];
                    if kind.has_escapes() {
                        out.push_str(&unescape_js(raw));
                    } else {
                        out.push_str(raw);
                    }
                }
                CanonicalPiece::Slot(_) => {
                    arg += 1;
                    out.push_str(&format!("{{arg{arg}}}"));
                }
            }
        }
        out
    }
}

//! Source text positions.
//!
//! Every node in the syntax tree carries a byte range into the original text.
//! Change details additionally report (line, column) pairs, and the original
//! text of a change is recovered from those pairs the same way an editor would:
//! the first line is cut from its column to the end of the line, interior lines
//! are copied verbatim and the last line is cut up to its end column.

use std::fmt;

/// Half-open byte range `[start, end)` into a source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "range start {start} after end {end}");
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True if `other` lies completely inside this range.
    pub fn contains_range(&self, other: TextRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn overlaps(&self, other: TextRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A position as `(line, column)`.
///
/// `line` is 1-based, `column` is a 0-based character offset within the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineCol {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column + 1)
    }
}

/// Location of a match in a source file, as shown to users.
///
/// `line` and `col` are both 1-based.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceLocation {
    pub file_path: String,
    pub line: usize,
    pub col: usize,
}

impl SourceLocation {
    pub fn new(file_path: impl Into<String>, pos: LineCol) -> Self {
        Self {
            file_path: file_path.into(),
            line: pos.line,
            col: pos.column + 1,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file_path, self.line, self.col)
    }
}

/// Precomputed line starts for one source text.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(idx, _)| idx + 1));
        Self { line_starts }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Convert a byte offset into a line and character column.
    pub fn line_col(&self, text: &str, offset: usize) -> LineCol {
        let offset = offset.min(text.len());
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        let line_start = self.line_starts[line_idx];
        let column = text[line_start..offset].chars().count();
        LineCol {
            line: line_idx + 1,
            column,
        }
    }

    /// Convert a line and character column back into a byte offset.
    ///
    /// Columns past the end of the line clamp to the line end.
    pub fn offset(&self, text: &str, pos: LineCol) -> usize {
        let Some(&line_start) = self.line_starts.get(pos.line.saturating_sub(1)) else {
            return text.len();
        };
        let line = &text[line_start..self.line_end(text, pos.line)];
        let within = line
            .char_indices()
            .nth(pos.column)
            .map(|(idx, _)| idx)
            .unwrap_or(line.len());
        line_start + within
    }

    /// Byte offset of the end of `line`, excluding its line terminator.
    fn line_end(&self, text: &str, line: usize) -> usize {
        self.line_starts
            .get(line)
            .map(|next| next - 1)
            .unwrap_or(text.len())
    }

    /// Full text of a 1-based line excluding its `\n`.
    pub fn line_text<'t>(&self, text: &'t str, line: usize) -> &'t str {
        match self.line_starts.get(line.saturating_sub(1)) {
            Some(&start) => &text[start..self.line_end(text, line)],
            None => "",
        }
    }

    /// Recover the text between two positions, line by line.
    pub fn slice(&self, text: &str, start: LineCol, end: LineCol) -> String {
        if start.line == end.line {
            let from = self.offset(text, start);
            let to = self.offset(text, end).max(from);
            return text[from..to].to_string();
        }

        let mut out = String::new();
        let first_end = self.line_end(text, start.line);
        out.push_str(&text[self.offset(text, start)..first_end]);
        out.push('\n');
        for line in start.line + 1..end.line {
            out.push_str(self.line_text(text, line));
            out.push('\n');
        }
        let last_start = self.offset(
            text,
            LineCol {
                line: end.line,
                column: 0,
            },
        );
        out.push_str(&text[last_start..self.offset(text, end)]);
        out
    }
}

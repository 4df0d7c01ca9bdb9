use std::path::Path;
use std::sync::Arc;

use swc_common::{BytePos, FileName, Globals, SourceMap, Span};
use swc_ecma_ast::Module;
use swc_ecma_parser::{EsSyntax, Parser, StringInput, Syntax, TsSyntax};

use crate::core::source::TextRange;
use crate::error::{TransformError, TransformResult};

/// Source dialect, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `.js`, `.jsx`, `.mjs`, `.cjs`: ECMAScript with JSX enabled.
    JavaScript,
    /// `.ts`, `.mts`, `.cts`: TypeScript without JSX (`<T>x` is a cast).
    TypeScript,
    /// `.tsx`
    Tsx,
}

impl Dialect {
    pub fn from_path(path: &str) -> Self {
        match Path::new(path).extension().and_then(|e| e.to_str()) {
            Some("ts" | "mts" | "cts") => Dialect::TypeScript,
            Some("tsx") => Dialect::Tsx,
            _ => Dialect::JavaScript,
        }
    }

    /// Dialect of a file transmark rewrites, `None` for anything else.
    /// Declaration files (`.d.ts`, `.d.mts`, `.d.cts`) are not sources.
    pub fn for_source(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        if [".d.ts", ".d.mts", ".d.cts"].iter().any(|suffix| name.ends_with(suffix)) {
            return None;
        }
        match path.extension()?.to_str()? {
            "js" | "jsx" | "mjs" | "cjs" | "ts" | "tsx" | "mts" | "cts" => {
                Some(Self::from_path(name))
            }
            _ => None,
        }
    }

    fn syntax(self) -> Syntax {
        match self {
            Dialect::JavaScript => Syntax::Es(EsSyntax {
                jsx: true,
                decorators: true,
                ..Default::default()
            }),
            Dialect::TypeScript => Syntax::Typescript(TsSyntax {
                tsx: false,
                decorators: true,
                ..Default::default()
            }),
            Dialect::Tsx => Syntax::Typescript(TsSyntax {
                tsx: true,
                decorators: true,
                ..Default::default()
            }),
        }
    }
}

/// A parsed module together with the position of its file in the source map.
pub struct ParsedSource {
    pub module: Module,
    /// Position of the first byte of the file in the shared source map.
    pub start_pos: BytePos,
}

impl ParsedSource {
    /// Convert an swc span into a byte range relative to the file start.
    pub fn range(&self, span: Span) -> TextRange {
        span_to_range(self.start_pos, span)
    }
}

pub fn span_to_range(start_pos: BytePos, span: Span) -> TextRange {
    TextRange::new(
        (span.lo.0 - start_pos.0) as usize,
        (span.hi.0 - start_pos.0) as usize,
    )
}

/// Parse JS/JSX/TS/TSX source code into an AST.
///
/// The dialect is picked from `file_path`. Accepts a shared SourceMap for
/// thread-safe parallel parsing. Errors the parser recovered from are still
/// reported as failures, since rewriting a partially understood file could
/// corrupt it.
pub fn parse_source(
    code: String,
    file_path: &str,
    source_map: Arc<SourceMap>,
) -> TransformResult<ParsedSource> {
    use swc_common::GLOBALS;

    // Wrap in GLOBALS.set() for thread safety
    GLOBALS.set(&Globals::new(), || {
        let source_file = source_map.new_source_file(FileName::Real(file_path.into()).into(), code);
        let syntax = Dialect::from_path(file_path).syntax();

        let mut parser = Parser::new(syntax, StringInput::from(&*source_file), None);

        let parse_error = |message: String| TransformError::Parse {
            file: file_path.to_string(),
            message,
        };

        let module = parser
            .parse_module()
            .map_err(|e| parse_error(e.kind().msg().to_string()))?;

        if let Some(error) = parser.take_errors().into_iter().next() {
            return Err(parse_error(error.kind().msg().to_string()));
        }

        Ok(ParsedSource {
            module,
            start_pos: source_file.start_pos,
        })
    })
}

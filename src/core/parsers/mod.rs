//! Source file parsing.
//!
//! - `jsx`: JS/JSX/TS/TSX source parser (uses swc for AST generation)

pub mod jsx;

pub use jsx::{Dialect, ParsedSource, parse_source};

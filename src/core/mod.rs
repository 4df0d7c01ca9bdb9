//! Replacement engine.
//!
//! - `parsers`, `tree`: swc parsing and the flat syntax tree arena
//! - `keys`: key resolution, strategies and the cross-run index
//! - `policy`: framework call and import policies
//! - `replace`: matching, synthesis, conflict resolution and materialization
//! - `patch`: single-pass application of span-disjoint edits
//! - `merge`: import and setup-call merging on the patched text
//! - `pipeline`: the per-file pipeline tying the stages together
//! - `context`, `file_scanner`, `messages`: host-side orchestration and output

pub mod context;
pub mod file_scanner;
pub mod keys;
pub mod merge;
pub mod messages;
pub mod parsers;
pub mod patch;
pub mod pipeline;
pub mod policy;
pub mod replace;
pub mod source;
pub mod tree;

pub use context::{ExtractContext, ExtractRun, FileChanges};
pub use pipeline::{FileOutcome, ReplaceOutcome, TransformOptions, replace_source, transform_source};

//! Literal replacement engine.
//!
//! Candidates are matched, keyed and synthesized into staged fragments in
//! one pass over the tree. Staged entries nested inside another staged entry
//! are then dropped, and the survivors become exact-span change details.

mod classifier;
mod conflict;
mod fragment;
mod materialize;
mod matcher;
mod synthesizer;


pub use classifier::{Classification, ContextClassifier, classify_function};
pub use conflict::resolve_conflicts;
pub use fragment::{CallFragment, Fragment, Piece};
pub use materialize::{ChangeDetail, materialize};
pub use matcher::{CanonicalPiece, CanonicalText, MarkerPattern, Match, SLOT_TOKEN};
pub use synthesizer::{StagedReplacement, SynthesisOptions, Synthesizer};

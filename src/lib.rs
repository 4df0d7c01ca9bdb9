//! Transmark - rewrite marker-delimited text into translation calls
//!
//! Transmark is a CLI tool and library that finds marker-delimited text (for
//! example `"___Hello___"`) inside string literals, template literals, JSX text
//! and JSX attributes, and rewrites every occurrence into a call to a translation
//! function (`t("Hello")`). Every byte outside the rewritten spans is preserved,
//! and the imports and setup calls the target framework needs are merged in
//! afterwards.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (user-facing commands and reporting)
//! - `config`: Configuration file loading and parsing
//! - `core`: Replacement engine (tree arena, key resolution, synthesis, merge)
//! - `error`: Error taxonomy and host-facing error reports
//! - `utils`: Shared utility functions

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod utils;

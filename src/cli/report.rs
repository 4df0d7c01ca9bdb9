//! Output formatting for the CLI.
//!
//! Separate from core logic to allow transmark to be used as a library.

use std::io::{self, Write};

use colored::Colorize;
use unicode_width::UnicodeWidthStr;

use crate::core::FileChanges;
use crate::core::replace::ChangeDetail;
use crate::error::{ErrorReport, Severity};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Paths are printed without the leading `./` of a relative source root.
pub fn display_path(path: &str) -> &str {
    path.strip_prefix("./").unwrap_or(path)
}

/// Print every change of every file, grouped by file.
pub fn print_preview(files: &[FileChanges]) {
    print_preview_to(files, &mut io::stdout().lock());
}

pub fn print_preview_to<W: Write>(files: &[FileChanges], writer: &mut W) {
    for file in files {
        let path = display_path(&file.file_path);
        let locations: Vec<String> = file
            .outcome
            .changes
            .iter()
            .map(|change| location(path, change))
            .collect();
        let originals: Vec<String> = file
            .outcome
            .changes
            .iter()
            .map(|change| single_line(&change.original))
            .collect();

        let location_width = locations.iter().map(|l| l.width()).max().unwrap_or(0);
        let original_width = originals.iter().map(|o| o.width()).max().unwrap_or(0);

        for ((loc, original), change) in locations.iter().zip(&originals).zip(&file.outcome.changes) {
            let _ = writeln!(
                writer,
                "{}{:lpad$}  {}{:opad$} {} {}",
                loc.blue(),
                "",
                original.red(),
                "",
                "→".dimmed(),
                single_line(&change.replacement).green(),
                lpad = location_width - loc.width(),
                opad = original_width - original.width(),
            );
        }
        if file.outcome.imports_added > 0 || file.outcome.setups_added > 0 {
            let _ = writeln!(
                writer,
                "  {} {} import(s), {} setup call(s)",
                "+".green(),
                file.outcome.imports_added,
                file.outcome.setups_added
            );
        }
        let _ = writeln!(writer);
    }
}

fn location(path: &str, change: &ChangeDetail) -> String {
    format!(
        "{}:{}:{}",
        path,
        change.start_pos.line,
        change.start_pos.column + 1
    )
}

fn single_line(text: &str) -> String {
    text.replace('\n', "\\n")
}

/// Print a success message when there is nothing to rewrite.
pub fn print_no_changes(source_files: usize) {
    println!(
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Checked {} source {} - nothing to extract",
            source_files,
            if source_files == 1 { "file" } else { "files" }
        )
        .green()
    );
}

/// Print failure reports, or only their count unless verbose.
pub fn print_errors(errors: &[ErrorReport], verbose: bool) {
    print_errors_to(errors, verbose, &mut io::stderr().lock());
}

pub fn print_errors_to<W: Write>(errors: &[ErrorReport], verbose: bool, writer: &mut W) {
    if errors.is_empty() {
        return;
    }
    if !verbose {
        let _ = writeln!(
            writer,
            "{} {} file(s) could not be processed and were left unchanged (use {} for details)",
            FAILURE_MARK.red(),
            errors.len(),
            "-v".cyan()
        );
        return;
    }

    for report in errors {
        let severity = match report.severity {
            Severity::Error => "error".bold().red(),
            Severity::Warning => "warning".bold().yellow(),
        };
        let _ = writeln!(
            writer,
            "{}: {}  {}",
            severity,
            report.message,
            format!("[{}]", report.category).dimmed().cyan()
        );
        if let Some(file) = &report.file {
            let _ = writeln!(writer, "  {} {}", "-->".blue(), display_path(file));
        }
        let _ = writeln!(writer, "  {} {} {}", "=".blue(), "hint:".bold().cyan(), report.suggestion);
        let _ = writeln!(writer);
    }
}

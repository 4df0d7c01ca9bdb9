//! Extract command - Replace marker text with translation calls.
//!
//! Markers such as `___Hello___` are rewritten into the call that fits their
//! position (`t("Hello")` in a component, `i18n.t("Hello")` elsewhere), and the
//! imports and setup calls the new code relies on are added.
//!
//! Use `--apply` to write the rewritten files, the key index and the messages
//! file (default is dry-run mode).

use std::fs;

use anyhow::{Context, Result};
use colored::Colorize;

use super::super::{
    args::ExtractCommand,
    exit_status::ExitStatus,
    report::{self, SUCCESS_MARK},
};
use crate::core::{ExtractContext, ExtractRun, messages::MessagesWriter};

pub fn extract(cmd: ExtractCommand) -> Result<ExitStatus> {
    let ctx = ExtractContext::new(&cmd.common)?;
    let mut registry = ctx.registry()?;
    let run = ctx.run(&mut registry);

    report::print_errors(&run.errors, ctx.verbose);
    let has_errors = !run.errors.is_empty();

    if run.changed.is_empty() {
        report::print_no_changes(run.files_checked);
        return Ok(if has_errors {
            ExitStatus::Error
        } else {
            ExitStatus::Success
        });
    }

    if !cmd.apply {
        report::print_preview(&run.changed);
        println!(
            "{} {} marker(s) in {} file(s).",
            "Would rewrite".yellow().bold(),
            run.change_count(),
            run.changed.len()
        );
        println!("Run with {} to write these changes.", "--apply".cyan());
        return Ok(if has_errors {
            ExitStatus::Error
        } else {
            ExitStatus::Failure
        });
    }

    write_files(&run)?;

    let (index, extracted, reused) = registry.into_parts();
    ctx.key_index_store().save(&index)?;

    let mut messages = MessagesWriter::open_or_create(&ctx.messages_path())?;
    let added = messages.add_records(&extracted);
    messages.save()?;

    println!(
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Rewrote {} marker(s) in {} file(s)",
            run.change_count(),
            run.changed.len()
        )
        .green()
    );
    println!(
        "  - {} new key(s) written to {}",
        added,
        report::display_path(&ctx.messages_path().display().to_string())
    );
    if !reused.is_empty() {
        println!("  - {} existing key(s) reused", reused.len());
    }

    Ok(if has_errors {
        ExitStatus::Error
    } else {
        ExitStatus::Success
    })
}

fn write_files(run: &ExtractRun) -> Result<()> {
    for file in &run.changed {
        fs::write(&file.file_path, &file.outcome.code)
            .with_context(|| format!("Failed to write file: {}", file.file_path))?;
    }
    Ok(())
}

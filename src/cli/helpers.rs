//! Shared helper functions for CLI commands

use console::style;
use miette::Result;

use crate::cli::GlobalOpts;
use crate::core::identity::{RiskId, RISK_PREFIX};
use crate::core::{Config, RiskStore, Workbook};

/// Open the workbook named by `--workbook`, the config, or discovery
pub fn open_workbook(global: &GlobalOpts, config: &Config) -> Result<Workbook> {
    Ok(Workbook::load(global.workbook.as_deref(), config)?)
}

/// Short reference for the record at a zero-based collection index
pub fn short_ref(index: usize) -> String {
    format!("@{}", index + 1)
}

/// Resolve a command-line risk reference to an id
///
/// Accepts a full id, `@N` (N-th record in the register), or a unique
/// prefix of the id, with or without the `RISK-` prefix.
pub fn resolve_id(store: &RiskStore, reference: &str) -> Result<RiskId> {
    let reference = reference.trim();

    if let Some(n) = reference.strip_prefix('@') {
        let index: usize = n
            .parse()
            .map_err(|_| miette::miette!("Invalid short reference: '{}'", reference))?;
        return store
            .records()
            .get(index.wrapping_sub(1))
            .map(|r| r.id)
            .ok_or_else(|| {
                miette::miette!(
                    "No risk at {} (register has {} risk(s))",
                    reference,
                    store.len()
                )
            });
    }

    if let Ok(id) = RiskId::parse(reference) {
        if store.get(&id).is_some() {
            return Ok(id);
        }
        return Err(miette::miette!("Risk not found: {}", id));
    }

    let needle = reference.to_uppercase();
    let full_prefix = format!("{}-", RISK_PREFIX);
    let needle = if needle.starts_with(&full_prefix) {
        needle
    } else {
        format!("{}{}", full_prefix, needle)
    };

    let matches: Vec<RiskId> = store
        .records()
        .iter()
        .filter(|r| r.id.to_string().starts_with(&needle))
        .map(|r| r.id)
        .collect();

    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(miette::miette!("No risk matches '{}'", reference)),
        many => Err(miette::miette!(
            "'{}' is ambiguous ({} risks match); use more characters or @N",
            reference,
            many.len()
        )),
    }
}

/// Print a success line unless `--quiet`
pub fn report_success(global: &GlobalOpts, message: impl std::fmt::Display) {
    if !global.quiet {
        println!("{} {}", style("✓").green(), message);
    }
}

/// Print a warning line to stderr
pub fn report_warning(message: impl std::fmt::Display) {
    eprintln!("{} {}", style("!").yellow(), message);
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

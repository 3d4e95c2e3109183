//! `riskreg import` command - Append risks from a CSV file

use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::path::PathBuf;

use crate::cli::exchange::read_risks;
use crate::cli::helpers::{open_workbook, report_warning};
use crate::cli::GlobalOpts;
use crate::core::Config;

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// CSV file with a header row (date, description, reason, nature, category, area, owner)
    pub file: PathBuf,

    /// Read and check the file without changing the workbook
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let mut workbook = open_workbook(global, &config)?;

    let file = File::open(&args.file)
        .into_diagnostic()
        .map_err(|e| e.wrap_err(format!("Cannot open {}", args.file.display())))?;
    let batch = read_risks(file)?;

    for warning in &batch.warnings {
        report_warning(warning);
    }

    let rows = batch.risks.len();
    let before = workbook.store().len();
    if !args.dry_run {
        workbook.store_mut().import_records(batch.risks);
        workbook.save()?;
    }

    if !global.quiet {
        println!();
        println!("{}", style("Import Summary").bold());
        println!("{}", style("─".repeat(50)).dim());
        println!("  Rows read:      {}", style(rows).cyan());
        if !args.dry_run {
            println!("  Risks added:    {}", style(rows).green());
            if rows > 0 {
                println!("  References:     @{}..@{}", before + 1, before + rows);
            }
        }
        if !batch.warnings.is_empty() {
            println!("  Warnings:       {}", style(batch.warnings.len()).yellow());
        }
        if args.dry_run {
            println!();
            println!("{}", style("Dry run complete. The workbook was not changed.").yellow());
        }
    }

    Ok(())
}

//! `riskreg export` command - Write the register's identification columns to CSV

use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use crate::cli::exchange::{default_export_name, write_risks};
use crate::cli::helpers::{open_workbook, report_success};
use crate::cli::GlobalOpts;
use crate::core::Config;

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Output file; `-` writes to stdout (default: risk_register_<date>.csv)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let workbook = open_workbook(global, &config)?;
    let records = workbook.store().records();

    let path = args
        .output
        .unwrap_or_else(|| PathBuf::from(default_export_name(chrono::Local::now().date_naive())));

    if path.as_os_str() == "-" {
        write_risks(io::stdout().lock(), records)?;
        return Ok(());
    }

    let file = File::create(&path)
        .into_diagnostic()
        .map_err(|e| e.wrap_err(format!("Cannot create {}", path.display())))?;
    write_risks(BufWriter::new(file), records)?;

    report_success(
        global,
        format!(
            "Exported {} risk(s) to {}",
            records.len(),
            style(path.display()).cyan()
        ),
    );
    Ok(())
}

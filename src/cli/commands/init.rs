//! `riskreg init` command - Create a new workbook

use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::commands::sensitivity::check_range;
use crate::cli::GlobalOpts;
use crate::core::{Config, Workbook, WorkbookError, DEFAULT_WORKBOOK};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Workbook file or directory to create it in (default: ./risk-register.yaml)
    pub path: Option<PathBuf>,

    /// Initial sensitivity in percent (default: config or 100)
    #[arg(long, short = 's')]
    pub sensitivity: Option<f64>,

    /// Overwrite an existing workbook
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();

    let path = match args.path.or_else(|| global.workbook.clone()) {
        Some(p) if p.is_dir() => p.join(DEFAULT_WORKBOOK),
        Some(p) => p,
        None => PathBuf::from(DEFAULT_WORKBOOK),
    };

    let sensitivity = args.sensitivity.unwrap_or_else(|| config.sensitivity());
    check_range(sensitivity)?;

    match Workbook::create(&path, sensitivity, args.force) {
        Ok(workbook) => {
            if !global.quiet {
                println!(
                    "{} Initialized risk register at {}",
                    style("✓").green(),
                    style(workbook.path().display()).cyan()
                );
                println!("  Sensitivity: {}%", workbook.store().sensitivity());
                println!();
                println!("Next steps:");
                println!("  {} Add your first risk", style("riskreg add").yellow());
                println!("  {} Import risks from a spreadsheet", style("riskreg import").yellow());
            }
            Ok(())
        }
        Err(WorkbookError::AlreadyExists(path)) => {
            println!(
                "{} Workbook already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!("Use {} to reinitialize", style("riskreg init --force").yellow());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

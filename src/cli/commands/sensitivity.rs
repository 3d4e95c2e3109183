//! `riskreg sensitivity` command - Show or change the global sensitivity

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::helpers::{open_workbook, report_success};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::quantity::format_number;
use crate::core::Config;

/// Range accepted on the command line, in percent
pub const MIN_SENSITIVITY: f64 = 0.0;
pub const MAX_SENSITIVITY: f64 = 200.0;

/// Machine-readable form of the current sensitivity
#[derive(Debug, Serialize)]
struct SensitivityReport {
    sensitivity: f64,
}

#[derive(clap::Args, Debug)]
pub struct SensitivityArgs {
    /// New sensitivity in percent (0-200); omit to show the current value
    pub value: Option<f64>,
}

/// Reject sensitivities outside the supported range
pub fn check_range(value: f64) -> Result<()> {
    if !(MIN_SENSITIVITY..=MAX_SENSITIVITY).contains(&value) {
        return Err(miette::miette!(
            "Sensitivity must be between {} and {} (got {})",
            MIN_SENSITIVITY,
            MAX_SENSITIVITY,
            value
        ));
    }
    Ok(())
}

pub fn run(args: SensitivityArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let mut workbook = open_workbook(global, &config)?;

    let Some(value) = args.value else {
        let current = workbook.store().sensitivity();
        match global.resolved_format(config.default_format.as_deref()) {
            OutputFormat::Json => {
                let report = SensitivityReport { sensitivity: current };
                println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
            }
            OutputFormat::Yaml => {
                let report = SensitivityReport { sensitivity: current };
                print!("{}", serde_yml::to_string(&report).into_diagnostic()?);
            }
            _ => println!("{}%", format_number(current)),
        }
        return Ok(());
    };

    check_range(value)?;
    let previous = workbook.store().sensitivity();
    workbook.store_mut().set_sensitivity(value);
    workbook.save()?;

    report_success(
        global,
        format!(
            "Sensitivity {}% -> {}%, {} risk(s) rescaled",
            format_number(previous),
            style(format_number(value)).cyan(),
            workbook.store().len()
        ),
    );
    Ok(())
}

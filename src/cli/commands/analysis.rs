//! `riskreg qualitative` and `riskreg quantitative` commands - Save an analysis form

use chrono::NaiveDate;
use console::style;
use miette::Result;

use crate::cli::helpers::{open_workbook, report_success, resolve_id};
use crate::cli::GlobalOpts;
use crate::core::quantity::{format_amount, format_rank, Percent};
use crate::core::{Config, EditOutcome, QualitativeInput, QuantitativeInput};
use crate::entities::risk::Strategy;

#[derive(clap::Args, Debug)]
pub struct QualitativeArgs {
    /// Risk ID, unique ID prefix, or @N
    pub id: String,

    /// Probability of occurrence in percent (0-100)
    #[arg(long, short = 'p', value_parser = clap::value_parser!(u8).range(0..=100))]
    pub probability: u8,

    #[arg(long, default_value = "")]
    pub exposure: String,

    /// Response strategy (avoid, reduce, share, transfer, accept, enhance, exploit)
    #[arg(long)]
    pub strategy: Option<Strategy>,

    /// Planned responses
    #[arg(long, default_value = "")]
    pub response: String,

    /// Planned response date (YYYY-MM-DD)
    #[arg(long)]
    pub planned_date: Option<NaiveDate>,

    #[arg(long, default_value = "")]
    pub note: String,
}

#[derive(clap::Args, Debug)]
pub struct QuantitativeArgs {
    /// Risk ID, unique ID prefix, or @N
    pub id: String,

    /// Root cause of the risk
    #[arg(long)]
    pub root_cause: String,

    /// Financial impact; negative values are allowed, zero is not
    #[arg(long, short = 'i', allow_hyphen_values = true)]
    pub impact: f64,
}

impl QuantitativeArgs {
    fn validate(&self) -> Result<()> {
        if self.root_cause.trim().is_empty() {
            return Err(miette::miette!("Root cause must not be empty"));
        }
        if self.impact == 0.0 || !self.impact.is_finite() {
            return Err(miette::miette!(
                help = "Enter the financial impact of the risk, e.g. --impact 25000",
                "Financial impact must be a non-zero amount"
            ));
        }
        Ok(())
    }
}

pub fn run_qualitative(args: QualitativeArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let mut workbook = open_workbook(global, &config)?;
    let id = resolve_id(workbook.store(), &args.id)?;

    let input = QualitativeInput {
        probability: Some(Percent::new(f64::from(args.probability))),
        exposure: args.exposure,
        strategy: args.strategy,
        response: args.response,
        planned_date: args.planned_date,
        note: args.note,
    };

    if workbook.store_mut().apply_qualitative_analysis(&id, input) == EditOutcome::NotFound {
        return Err(miette::miette!("Risk not found: {}", id));
    }
    workbook.save()?;

    if let Some(risk) = workbook.store().get(&id) {
        report_success(
            global,
            format!(
                "Saved qualitative analysis for {} (expected value {}, priority {})",
                style(id).cyan(),
                format_amount(risk.quantitative.expected_value),
                format_rank(risk.quantitative.priority)
            ),
        );
    }
    Ok(())
}

pub fn run_quantitative(args: QuantitativeArgs, global: &GlobalOpts) -> Result<()> {
    args.validate()?;

    let config = Config::load();
    let mut workbook = open_workbook(global, &config)?;
    let id = resolve_id(workbook.store(), &args.id)?;

    let input = QuantitativeInput {
        root_cause: args.root_cause.trim().to_string(),
        financial_impact: args.impact,
    };

    if workbook.store_mut().apply_quantitative_analysis(&id, input) == EditOutcome::NotFound {
        return Err(miette::miette!("Risk not found: {}", id));
    }
    workbook.save()?;

    if let Some(risk) = workbook.store().get(&id) {
        report_success(
            global,
            format!(
                "Saved quantitative analysis for {} (adjusted impact {}, expected value {}, priority {})",
                style(id).cyan(),
                format_amount(risk.quantitative.adjusted_impact),
                format_amount(risk.quantitative.expected_value),
                format_rank(risk.quantitative.priority)
            ),
        );
    }
    Ok(())
}

//! `riskreg set` and `riskreg delete` commands

use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::add::warn_outside_catalog;
use crate::cli::helpers::{open_workbook, report_success, resolve_id};
use crate::cli::GlobalOpts;
use crate::core::quantity::{format_amount, format_rank};
use crate::core::{Config, EditOutcome};
use crate::entities::field::{FieldParseError, RiskField};

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Risk ID, unique ID prefix, or @N
    pub id: String,

    /// Field name (e.g. impact, probability, owner, new_probability)
    pub field: String,

    /// New value; an empty string clears the field
    #[arg(allow_hyphen_values = true)]
    pub value: String,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Risk ID, unique ID prefix, or @N
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

fn parse_field(name: &str) -> Result<RiskField> {
    name.parse::<RiskField>().map_err(|e| match e {
        FieldParseError::Derived(_) => miette::miette!(
            help = "Edit the inputs instead: impact, probability, new_probability, new_impact",
            "{}",
            e
        ),
        FieldParseError::Unknown(_) => miette::miette!(
            help = "Run `riskreg show <ID>` to see field names",
            "{}",
            e
        ),
    })
}

pub fn run_set(args: SetArgs, global: &GlobalOpts) -> Result<()> {
    let field = parse_field(&args.field)?;

    let config = Config::load();
    let mut workbook = open_workbook(global, &config)?;
    let id = resolve_id(workbook.store(), &args.id)?;

    let outcome = workbook.store_mut().update_field(&id, field, &args.value);
    if outcome == EditOutcome::NotFound {
        return Err(miette::miette!("Risk not found: {}", id));
    }
    workbook.save()?;

    let Some(risk) = workbook.store().get(&id) else {
        return Err(miette::miette!("Risk not found: {}", id));
    };

    if matches!(field, RiskField::Category | RiskField::Area) {
        warn_outside_catalog(workbook.catalog(), &risk.identification);
    }

    let shown = risk.display_value(field);
    match outcome {
        EditOutcome::Recomputed => report_success(
            global,
            format!(
                "{} {} = {} (expected value {}, priority {})",
                style(id).cyan(),
                field,
                style(&shown).yellow(),
                format_amount(risk.quantitative.expected_value),
                format_rank(risk.quantitative.priority)
            ),
        ),
        _ => report_success(
            global,
            format!("{} {} = {}", style(id).cyan(), field, style(&shown).yellow()),
        ),
    }

    Ok(())
}

pub fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let mut workbook = open_workbook(global, &config)?;
    let id = resolve_id(workbook.store(), &args.id)?;

    let description = workbook
        .store()
        .get(&id)
        .map(|r| r.description().to_string())
        .unwrap_or_default();

    if !args.yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Delete {} \"{}\"?", id, description))
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !confirmed {
            println!("Cancelled");
            return Ok(());
        }
    }

    if !workbook.store_mut().delete_record(&id) {
        return Err(miette::miette!("Risk not found: {}", id));
    }
    workbook.save()?;

    report_success(global, format!("Deleted {} \"{}\"", style(id).cyan(), description));
    Ok(())
}

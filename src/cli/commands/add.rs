//! `riskreg add` command - Add a risk to the register

use chrono::NaiveDate;
use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{open_workbook, report_success, report_warning, short_ref};
use crate::cli::GlobalOpts;
use crate::core::{Catalog, CatalogKind, Config};
use crate::entities::risk::{Identification, Nature, NewRisk};

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// What the risk is
    #[arg(long, short = 'd', required_unless_present = "interactive")]
    pub description: Option<String>,

    /// Threat or opportunity
    #[arg(long, short = 'n')]
    pub nature: Option<Nature>,

    /// Identification date (YYYY-MM-DD, default: today)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Why it may happen
    #[arg(long)]
    pub reason: Option<String>,

    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Responsible area
    #[arg(long, short = 'a')]
    pub area: Option<String>,

    #[arg(long, short = 'o')]
    pub owner: Option<String>,

    /// Prompt for every field
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

pub fn run(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let mut workbook = open_workbook(global, &config)?;

    let input = if args.interactive {
        prompt_for_risk(workbook.catalog())?
    } else {
        NewRisk {
            identification: Identification {
                date: Some(args.date.unwrap_or_else(|| chrono::Local::now().date_naive())),
                description: args.description.unwrap_or_default(),
                reason: args.reason.unwrap_or_default(),
                nature: args.nature,
                category: args.category.unwrap_or_default(),
                area: args.area.unwrap_or_default(),
                owner: args.owner.unwrap_or_default(),
            },
        }
    };

    warn_outside_catalog(workbook.catalog(), &input.identification);

    let id = workbook.store_mut().add_record(input);
    workbook.save()?;

    report_success(
        global,
        format!(
            "Added {} {}",
            style(id).cyan(),
            style(format!("({})", short_ref(workbook.store().len() - 1))).dim()
        ),
    );
    if global.quiet {
        println!("{}", id);
    }
    Ok(())
}

/// Warn about category/area values the catalog does not know
pub fn warn_outside_catalog(catalog: &Catalog, ident: &Identification) {
    for (kind, value) in [
        (CatalogKind::Category, &ident.category),
        (CatalogKind::Area, &ident.area),
    ] {
        if !catalog.contains(kind, value) {
            report_warning(format!(
                "'{}' is not a known {}; add it with {}",
                value,
                kind,
                style(format!("riskreg catalog add {} \"{}\"", kind, value)).yellow()
            ));
        }
    }
}

fn prompt_for_risk(catalog: &Catalog) -> Result<NewRisk> {
    let theme = ColorfulTheme::default();

    let description: String = Input::with_theme(&theme)
        .with_prompt("Risk description")
        .interact_text()
        .into_diagnostic()?;

    let date_text: String = Input::with_theme(&theme)
        .with_prompt("Identification date (YYYY-MM-DD)")
        .default(chrono::Local::now().date_naive().to_string())
        .validate_with(|s: &String| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map(|_| ())
                .map_err(|_| "use YYYY-MM-DD")
        })
        .interact_text()
        .into_diagnostic()?;
    let date = NaiveDate::parse_from_str(&date_text, "%Y-%m-%d").ok();

    let reason: String = Input::with_theme(&theme)
        .with_prompt("Reason")
        .allow_empty(true)
        .interact_text()
        .into_diagnostic()?;

    let natures = ["threat", "opportunity", "(unset)"];
    let nature = match Select::with_theme(&theme)
        .with_prompt("Nature")
        .items(&natures)
        .default(0)
        .interact()
        .into_diagnostic()?
    {
        0 => Some(Nature::Threat),
        1 => Some(Nature::Opportunity),
        _ => None,
    };

    let category = select_from_catalog(&theme, "Category", catalog.values(CatalogKind::Category))?;
    let area = select_from_catalog(&theme, "Responsible area", catalog.values(CatalogKind::Area))?;

    let owner: String = Input::with_theme(&theme)
        .with_prompt("Owner")
        .allow_empty(true)
        .interact_text()
        .into_diagnostic()?;

    Ok(NewRisk {
        identification: Identification {
            date,
            description,
            reason,
            nature,
            category,
            area,
            owner,
        },
    })
}

/// Pick a catalog value; the last entry leaves the field empty
pub(crate) fn select_from_catalog(
    theme: &ColorfulTheme,
    prompt: &str,
    values: &[String],
) -> Result<String> {
    let mut items: Vec<&str> = values.iter().map(String::as_str).collect();
    items.push("(none)");

    let selection = Select::with_theme(theme)
        .with_prompt(prompt)
        .items(&items)
        .default(items.len() - 1)
        .interact()
        .into_diagnostic()?;

    Ok(values.get(selection).cloned().unwrap_or_default())
}

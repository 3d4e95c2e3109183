//! `riskreg catalog` command - Manage the category, exposure and area lists

use clap::{Subcommand, ValueEnum};
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{open_workbook, report_success};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{CatalogKind, Config};

#[derive(Subcommand, Debug)]
pub enum CatalogCommands {
    /// Show catalog values
    List(ListArgs),

    /// Add a value to a list
    Add(ValueArgs),

    /// Remove a value from a list
    Remove(ValueArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum KindArg {
    Category,
    Exposure,
    Area,
}

impl From<KindArg> for CatalogKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Category => CatalogKind::Category,
            KindArg::Exposure => CatalogKind::Exposure,
            KindArg::Area => CatalogKind::Area,
        }
    }
}

const ALL_KINDS: [CatalogKind; 3] = [CatalogKind::Category, CatalogKind::Exposure, CatalogKind::Area];

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Show only this list
    pub kind: Option<KindArg>,
}

#[derive(clap::Args, Debug)]
pub struct ValueArgs {
    pub kind: KindArg,

    /// Value text (exact match for remove)
    pub value: String,
}

pub fn run(cmd: CatalogCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CatalogCommands::List(args) => run_list(args, global),
        CatalogCommands::Add(args) => run_add(args, global),
        CatalogCommands::Remove(args) => run_remove(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let workbook = open_workbook(global, &config)?;
    let catalog = workbook.catalog();

    let kinds: Vec<CatalogKind> = match args.kind {
        Some(kind) => vec![kind.into()],
        None => ALL_KINDS.to_vec(),
    };

    match global.resolved_format(config.default_format.as_deref()) {
        OutputFormat::Json if args.kind.is_none() => {
            println!("{}", serde_json::to_string_pretty(catalog).into_diagnostic()?);
        }
        OutputFormat::Yaml if args.kind.is_none() => {
            print!("{}", serde_yml::to_string(catalog).into_diagnostic()?);
        }
        OutputFormat::Json => {
            let values = catalog.values(kinds[0]);
            println!("{}", serde_json::to_string_pretty(values).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            let values = catalog.values(kinds[0]);
            print!("{}", serde_yml::to_string(&values).into_diagnostic()?);
        }
        _ => {
            for (i, kind) in kinds.iter().enumerate() {
                if kinds.len() > 1 {
                    if i > 0 {
                        println!();
                    }
                    println!("{}", style(format!("{}:", kind)).bold());
                }
                for value in catalog.values(*kind) {
                    println!("  {}", value);
                }
            }
        }
    }
    Ok(())
}

fn run_add(args: ValueArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let mut workbook = open_workbook(global, &config)?;
    let kind: CatalogKind = args.kind.into();

    if args.value.trim().is_empty() {
        return Err(miette::miette!("Catalog values must not be empty"));
    }
    if !workbook.catalog_mut().add(kind, &args.value) {
        println!(
            "{} '{}' is already a known {}",
            style("!").yellow(),
            args.value.trim(),
            kind
        );
        return Ok(());
    }
    workbook.save()?;

    report_success(
        global,
        format!("Added {} '{}'", kind, style(args.value.trim()).cyan()),
    );
    Ok(())
}

fn run_remove(args: ValueArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let mut workbook = open_workbook(global, &config)?;
    let kind: CatalogKind = args.kind.into();

    if !workbook.catalog_mut().remove(kind, &args.value) {
        return Err(miette::miette!(
            help = format!("Run `riskreg catalog list {}` to see the values", kind),
            "'{}' is not a known {}",
            args.value,
            kind
        ));
    }
    workbook.save()?;

    report_success(
        global,
        format!("Removed {} '{}'", kind, style(&args.value).cyan()),
    );
    Ok(())
}

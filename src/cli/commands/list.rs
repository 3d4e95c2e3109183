//! `riskreg list` and `riskreg show` commands

use clap::ValueEnum;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::cli::helpers::{open_workbook, resolve_id, short_ref};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::RiskId;
use crate::core::quantity::{format_amount, format_rank, Rank};
use crate::core::{Config, NatureFilter};
use crate::entities::field::RiskField;
use crate::entities::risk::Risk;

/// Nature filter on the command line
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum NatureArg {
    All,
    Threat,
    Opportunity,
}

impl From<NatureArg> for NatureFilter {
    fn from(arg: NatureArg) -> Self {
        match arg {
            NatureArg::All => NatureFilter::All,
            NatureArg::Threat => NatureFilter::Threat,
            NatureArg::Opportunity => NatureFilter::Opportunity,
        }
    }
}

/// Sort keys for list output
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum SortKey {
    /// Register order
    Order,
    /// Priority (1 first, unranked last)
    Priority,
    /// Priority after the prevention plan
    NewPriority,
    /// Expected value, largest magnitude first
    ExpectedValue,
    Description,
    Date,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Show only threats or only opportunities
    #[arg(long, short = 'n', default_value = "all")]
    pub nature: NatureArg,

    /// Sort by field
    #[arg(long, short = 's', default_value = "order")]
    pub sort: SortKey,

    /// Reverse sort order
    #[arg(long, short = 'r')]
    pub reverse: bool,

    /// Limit output to N items
    #[arg(long, short = 'l')]
    pub limit: Option<usize>,

    /// Show count only, not the items
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Risk ID, unique ID prefix, or @N
    pub id: String,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 17),
    ColumnDef::new("description", "DESCRIPTION", 34),
    ColumnDef::new("nature", "NATURE", 12),
    ColumnDef::new("probability", "PROB", 6),
    ColumnDef::new("adjusted_impact", "ADJ. IMPACT", 16),
    ColumnDef::new("expected_value", "EXPECTED VALUE", 16),
    ColumnDef::new("priority", "PRI", 4),
    ColumnDef::new("new_expected_value", "NEW EV", 16),
    ColumnDef::new("new_priority", "NEW PRI", 8),
];

/// Sort position of a rank: positions ascending, then `-`, then never ranked
fn rank_order(rank: Option<Rank>) -> (u8, u32) {
    match rank {
        Some(Rank::Position(n)) => (0, n),
        Some(Rank::Unranked) => (1, 0),
        None => (2, 0),
    }
}

fn compare(key: SortKey, a: &Risk, b: &Risk) -> Ordering {
    match key {
        SortKey::Order => Ordering::Equal,
        SortKey::Priority => rank_order(a.quantitative.priority).cmp(&rank_order(b.quantitative.priority)),
        SortKey::NewPriority => {
            rank_order(a.prevention.new_priority).cmp(&rank_order(b.prevention.new_priority))
        }
        SortKey::ExpectedValue => b
            .quantitative
            .expected_value
            .abs()
            .total_cmp(&a.quantitative.expected_value.abs()),
        SortKey::Description => a.description().to_lowercase().cmp(&b.description().to_lowercase()),
        SortKey::Date => a.identification.date.cmp(&b.identification.date),
    }
}

pub fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let mut workbook = open_workbook(global, &config)?;
    workbook.store_mut().set_filter(args.nature.into());

    let store = workbook.store();
    let positions: HashMap<RiskId, usize> = store
        .records()
        .iter()
        .enumerate()
        .map(|(i, r)| (r.id, i))
        .collect();

    let mut risks: Vec<&Risk> = store.visible();
    risks.sort_by(|a, b| compare(args.sort, a, b));
    if args.reverse {
        risks.reverse();
    }
    if let Some(limit) = args.limit {
        risks.truncate(limit);
    }

    if args.count {
        println!("{}", risks.len());
        return Ok(());
    }

    let format = match global.resolved_format(config.default_format.as_deref()) {
        OutputFormat::Auto => OutputFormat::Tsv,
        f => f,
    };

    if risks.is_empty() {
        match format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Yaml => println!("[]"),
            OutputFormat::Csv | OutputFormat::Id => {}
            _ => {
                println!("No risks found.");
                println!();
                println!("Add one with: {}", style("riskreg add").yellow());
            }
        }
        return Ok(());
    }

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&risks).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&risks).into_diagnostic()?;
            print!("{}", yaml);
        }
        _ => {
            let rows: Vec<TableRow> = risks
                .iter()
                .map(|r| {
                    let index = positions.get(&r.id).copied().unwrap_or_default();
                    TableRow::new(short_ref(index), r.id.to_string())
                        .cell("id", CellValue::Id(r.id.to_string()))
                        .cell("description", CellValue::Text(r.description().to_string()))
                        .cell("nature", CellValue::Nature(r.nature()))
                        .cell("probability", CellValue::Percent(r.qualitative.probability))
                        .cell("adjusted_impact", CellValue::Amount(r.quantitative.adjusted_impact))
                        .cell("expected_value", CellValue::Amount(r.quantitative.expected_value))
                        .cell("priority", CellValue::Rank(r.quantitative.priority))
                        .cell(
                            "new_expected_value",
                            CellValue::Amount(r.prevention.new_expected_value),
                        )
                        .cell("new_priority", CellValue::Rank(r.prevention.new_priority))
                })
                .collect();

            let mut formatter = TableFormatter::new(COLUMNS);
            if global.quiet {
                formatter = formatter.without_summary();
            }
            formatter.output(&rows, format);
        }
    }

    Ok(())
}

/// A group of fields in `show`, followed by the values derived from them
struct Section {
    title: &'static str,
    fields: &'static [RiskField],
    derived: fn(&Risk) -> Vec<(&'static str, String)>,
}

/// Field groups in the order the register is filled in
const SECTIONS: &[Section] = &[
    Section {
        title: "Identification",
        fields: &[
            RiskField::Date,
            RiskField::Reason,
            RiskField::Nature,
            RiskField::Category,
            RiskField::Area,
            RiskField::Owner,
        ],
        derived: no_derived,
    },
    Section {
        title: "Qualitative analysis",
        fields: &[
            RiskField::Probability,
            RiskField::Exposure,
            RiskField::Strategy,
            RiskField::Response,
            RiskField::PlannedDate,
            RiskField::Note,
        ],
        derived: no_derived,
    },
    Section {
        title: "Quantitative analysis",
        fields: &[RiskField::RootCause, RiskField::FinancialImpact],
        derived: quantitative_derived,
    },
    Section {
        title: "Prevention plan",
        fields: &[
            RiskField::PreventiveAction,
            RiskField::ResponseCost,
            RiskField::NewProbability,
            RiskField::NewImpact,
        ],
        derived: prevention_derived,
    },
    Section {
        title: "Mitigation plan",
        fields: &[
            RiskField::MitigationAction,
            RiskField::MitigationCost,
            RiskField::FollowUp,
            RiskField::FollowUpOwner,
            RiskField::ActionOwner,
            RiskField::Trigger,
        ],
        derived: mitigation_derived,
    },
    Section {
        title: "Monitoring",
        fields: &[
            RiskField::ActualPreventionCost,
            RiskField::ActualImpact,
            RiskField::UnrealizedRiskExpectedValue,
            RiskField::ActualMitigationCost,
            RiskField::UnrealizedMitigationExpectedValue,
            RiskField::TriggerFired,
            RiskField::MitigationStatus,
            RiskField::SolutionEfficiency,
            RiskField::FinalPriority,
        ],
        derived: no_derived,
    },
];

fn no_derived(_: &Risk) -> Vec<(&'static str, String)> {
    Vec::new()
}

fn quantitative_derived(risk: &Risk) -> Vec<(&'static str, String)> {
    vec![
        ("adjusted_impact", format_amount(risk.quantitative.adjusted_impact)),
        ("expected_value", format_amount(risk.quantitative.expected_value)),
        ("priority", format_rank(risk.quantitative.priority)),
    ]
}

fn prevention_derived(risk: &Risk) -> Vec<(&'static str, String)> {
    vec![
        ("new_expected_value", format_amount(risk.prevention.new_expected_value)),
        ("new_priority", format_rank(risk.prevention.new_priority)),
    ]
}

fn mitigation_derived(risk: &Risk) -> Vec<(&'static str, String)> {
    vec![(
        "cost_expected_value",
        format_amount(risk.mitigation.cost_expected_value),
    )]
}

pub fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let workbook = open_workbook(global, &config)?;
    let store = workbook.store();
    let id = resolve_id(store, &args.id)?;
    let Some(risk) = store.get(&id) else {
        return Err(miette::miette!("Risk not found: {}", id));
    };

    let format = match global.resolved_format(config.default_format.as_deref()) {
        OutputFormat::Auto => OutputFormat::Yaml,
        f => f,
    };

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(risk).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(risk).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Id => println!("{}", risk.id),
        _ => print_human(risk),
    }

    Ok(())
}

fn print_human(risk: &Risk) {
    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("ID").bold(), style(risk.id).cyan());
    println!("{}: {}", style("Risk").bold(), style(risk.description()).yellow());
    println!("{}", style("─".repeat(60)).dim());

    for section in SECTIONS {
        let mut lines: Vec<(&str, String)> = section
            .fields
            .iter()
            .map(|f| (f.name(), risk.display_value(*f)))
            .filter(|(_, v)| !v.is_empty())
            .collect();
        lines.extend((section.derived)(risk));
        if lines.is_empty() {
            continue;
        }

        println!();
        println!("{}", style(format!("{}:", section.title)).bold());
        for (name, value) in lines {
            println!("  {}: {}", style(name).dim(), value);
        }
    }
}

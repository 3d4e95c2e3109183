//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    add::AddArgs,
    analysis::{QualitativeArgs, QuantitativeArgs},
    catalog::CatalogCommands,
    completions::CompletionsArgs,
    edit::{DeleteArgs, SetArgs},
    export::ExportArgs,
    import::ImportArgs,
    indicators::IndicatorsArgs,
    init::InitArgs,
    list::{ListArgs, ShowArgs},
    plan::{MitigationArgs, PreventionArgs},
    sensitivity::SensitivityArgs,
};

#[derive(Parser)]
#[command(name = "riskreg")]
#[command(author, version, about = "Risk register with automatic recalculation")]
#[command(long_about = "Keeps a register of threats and opportunities, derives adjusted impact and expected value from a global sensitivity, and re-ranks priorities after every edit.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Workbook file (default: auto-detect risk-register.yaml)
    #[arg(long, short = 'w', global = true)]
    pub workbook: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new, empty workbook
    Init(InitArgs),

    /// Add a risk to the register
    Add(AddArgs),

    /// List risks
    List(ListArgs),

    /// Show a risk's details
    Show(ShowArgs),

    /// Edit a single field of a risk
    Set(SetArgs),

    /// Delete a risk
    Delete(DeleteArgs),

    /// Show or change the global sensitivity
    Sensitivity(SensitivityArgs),

    /// Record the qualitative analysis of a risk
    Qualitative(QualitativeArgs),

    /// Record the quantitative analysis of a risk
    Quantitative(QuantitativeArgs),

    /// Record the prevention plan of a risk
    Prevention(PreventionArgs),

    /// Record the mitigation plan of a risk
    Mitigation(MitigationArgs),

    /// Import risks from a CSV file
    Import(ImportArgs),

    /// Export risk identification data to CSV
    Export(ExportArgs),

    /// Show financial roll-up indicators
    Indicators(IndicatorsArgs),

    /// Manage suggested categories, exposures and areas
    #[command(subcommand)]
    Catalog(CatalogCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (yaml for show, tsv for list)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true)
    }
}

impl GlobalOpts {
    /// The requested format, falling back to the configured default
    pub fn resolved_format(&self, configured: Option<&str>) -> OutputFormat {
        match self.format {
            OutputFormat::Auto => configured
                .and_then(|f| f.parse().ok())
                .unwrap_or(OutputFormat::Auto),
            f => f,
        }
    }
}

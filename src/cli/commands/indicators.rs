//! `riskreg indicators` command - Monitoring totals by nature

use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::open_workbook;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::quantity::format_amount;
use crate::core::{Config, Indicators};
use crate::entities::risk::Nature;

#[derive(clap::Args, Debug)]
pub struct IndicatorsArgs {
    /// Write the report to a file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Markdown report with one row per measure
pub fn render_markdown(indicators: &Indicators) -> String {
    let mut output = String::new();
    output.push_str("# Risk Indicators\n\n");

    let mut builder = Builder::default();
    builder.push_record(["Measure", "Threats", "Opportunities"]);
    let threats = indicators.for_nature(Nature::Threat).rows();
    let opportunities = indicators.for_nature(Nature::Opportunity).rows();
    for ((label, threat), (_, opportunity)) in threats.iter().zip(opportunities.iter()) {
        builder.push_record([
            label.to_string(),
            format_amount(*threat),
            format_amount(*opportunity),
        ]);
    }
    output.push_str(&builder.build().with(Style::markdown()).to_string());
    output.push('\n');
    output
}

pub fn run(args: IndicatorsArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let workbook = open_workbook(global, &config)?;
    let indicators = workbook.store().indicators();

    let content = match global.resolved_format(config.default_format.as_deref()) {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&indicators).into_diagnostic()?;
            json.push('\n');
            json
        }
        OutputFormat::Yaml => serde_yml::to_string(&indicators).into_diagnostic()?,
        _ => render_markdown(&indicators),
    };

    match args.output {
        Some(path) => {
            std::fs::write(&path, content).into_diagnostic()?;
            if !global.quiet {
                println!("Report written to: {}", path.display());
            }
        }
        None => print!("{}", content),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NatureTotals;

    #[test]
    fn test_markdown_lists_every_measure() {
        let indicators = Indicators {
            threats: NatureTotals {
                actual_impact: 1500.0,
                ..Default::default()
            },
            opportunities: NatureTotals {
                unrealized_risk_expected_value: 250.0,
                ..Default::default()
            },
        };
        let report = render_markdown(&indicators);
        assert!(report.starts_with("# Risk Indicators"));
        assert!(report.contains("| Actual impact"));
        assert!(report.contains("Unrealized mitigation expected value"));
        assert!(report.contains(&format_amount(1500.0)));
        assert!(report.contains(&format_amount(250.0)));
    }
}

//! Table formatting for `riskreg list`
//!
//! Rows carry typed cells; each output format decides how a cell is drawn.

use chrono::NaiveDate;
use console::style;

use crate::cli::helpers::{escape_csv, truncate_str};
use crate::cli::OutputFormat;
use crate::core::quantity::{format_amount, format_rank, Percent, Rank};
use crate::entities::risk::Nature;

/// A typed cell value with semantic meaning for formatting
#[derive(Debug, Clone)]
pub enum CellValue {
    /// Full risk id (truncated in TSV)
    Id(String),
    /// Plain text
    Text(String),
    /// Nature with color coding (threat=red, opportunity=green)
    Nature(Option<Nature>),
    /// Priority rank; highlighted when it is the top position
    Rank(Option<Rank>),
    /// Probability
    Percent(Option<Percent>),
    /// Monetary amount
    Amount(f64),
    Date(Option<NaiveDate>),
}

impl CellValue {
    /// Format for TSV output (with colors if terminal)
    pub fn format_tsv(&self, width: usize) -> String {
        match self {
            CellValue::Id(id) => {
                let display = truncate_str(id, 16);
                format!("{:<width$}", style(display).cyan(), width = width)
            }
            CellValue::Text(s) => {
                format!("{:<width$}", truncate_str(s, width.saturating_sub(2)), width = width)
            }
            CellValue::Nature(nature) => {
                let styled = match nature {
                    Some(Nature::Threat) => style("threat".to_string()).red(),
                    Some(Nature::Opportunity) => style("opportunity".to_string()).green(),
                    None => style("-".to_string()).dim(),
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Rank(rank) => {
                let s = self.raw_or_dash();
                let styled = match rank {
                    Some(Rank::Position(1)) => style(s).bold().yellow(),
                    Some(Rank::Position(_)) => style(s).white(),
                    _ => style(s).dim(),
                };
                format!("{:>width$}", styled, width = width)
            }
            CellValue::Amount(v) => {
                let s = format_amount(*v);
                let styled = if *v < 0.0 { style(s).red() } else { style(s).white() };
                format!("{:>width$}", styled, width = width)
            }
            CellValue::Percent(_) | CellValue::Date(_) => {
                format!("{:<width$}", self.raw_or_dash(), width = width)
            }
        }
    }

    /// Format for CSV output (RFC 4180, no colors)
    pub fn format_csv(&self) -> String {
        match self {
            CellValue::Amount(v) => v.to_string(),
            other => escape_csv(&other.raw()),
        }
    }

    /// Format for Markdown output (no colors, escaped pipes)
    pub fn format_md(&self) -> String {
        let raw = match self {
            CellValue::Amount(v) => format_amount(*v),
            CellValue::Text(s) => s.clone(),
            other => other.raw_or_dash(),
        };
        raw.replace('|', "\\|")
    }

    /// Get raw string value (no formatting)
    pub fn raw(&self) -> String {
        match self {
            CellValue::Id(id) => id.clone(),
            CellValue::Text(s) => s.clone(),
            CellValue::Nature(n) => n.map(|n| n.to_string()).unwrap_or_default(),
            CellValue::Rank(r) => format_rank(*r),
            CellValue::Percent(p) => p.map(|p| p.to_string()).unwrap_or_default(),
            CellValue::Amount(v) => v.to_string(),
            CellValue::Date(d) => d.map(|d| d.to_string()).unwrap_or_default(),
        }
    }

    fn raw_or_dash(&self) -> String {
        let raw = self.raw();
        if raw.is_empty() {
            "-".to_string()
        } else {
            raw
        }
    }

    /// Display width of this cell's content (for dynamic column sizing)
    pub fn display_width(&self) -> usize {
        match self {
            CellValue::Id(id) => id.chars().count().min(16),
            CellValue::Amount(v) => format_amount(*v).len(),
            other => other.raw_or_dash().chars().count(),
        }
    }
}

/// Column definition with header label and maximum width
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, width: usize) -> Self {
        Self { key, header, width }
    }
}

/// A row of cell values for table output
pub struct TableRow {
    pub short_ref: String,
    pub full_id: String,
    pub cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn new(short_ref: String, full_id: String) -> Self {
        Self {
            short_ref,
            full_id,
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, key: &'static str, value: CellValue) -> Self {
        self.cells.push((key, value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

/// Table formatter that outputs rows in various formats
pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    show_summary: bool,
}

impl<'a> TableFormatter<'a> {
    pub fn new(columns: &'a [ColumnDef]) -> Self {
        Self {
            columns,
            show_summary: true,
        }
    }

    /// Drop the trailing "N risk(s) found" line
    pub fn without_summary(mut self) -> Self {
        self.show_summary = false;
        self
    }

    /// Output rows in the specified format
    pub fn output(&self, rows: &[TableRow], format: OutputFormat) {
        match format {
            OutputFormat::Csv => self.output_csv(rows),
            OutputFormat::Md => self.output_md(rows),
            OutputFormat::Id => self.output_ids(rows),
            _ => self.output_tsv(rows),
        }
    }

    /// Calculate column widths from content, capped at each column's width
    fn calculate_widths(&self, rows: &[TableRow]) -> Vec<usize> {
        let short_width = rows
            .iter()
            .map(|r| r.short_ref.len())
            .max()
            .unwrap_or(0)
            .max("REF".len());

        let mut widths = vec![short_width];
        for col in self.columns {
            let max_content = rows
                .iter()
                .filter_map(|r| r.get(col.key))
                .map(CellValue::display_width)
                .max()
                .unwrap_or(0);
            let natural = col.header.len().max(max_content.saturating_add(2));
            widths.push(natural.min(col.width.max(col.header.len())));
        }
        widths
    }

    fn output_tsv(&self, rows: &[TableRow]) {
        let widths = self.calculate_widths(rows);

        let mut header = vec![format!("{:<width$}", style("REF").bold().dim(), width = widths[0])];
        for (col, width) in self.columns.iter().zip(&widths[1..]) {
            header.push(format!("{:<width$}", style(col.header).bold(), width = *width));
        }
        println!("{}", header.join(" "));

        let total_width: usize = widths.iter().sum::<usize>() + widths.len() - 1;
        println!("{}", "-".repeat(total_width));

        for row in rows {
            let mut parts = vec![format!("{:<width$}", style(&row.short_ref).cyan(), width = widths[0])];
            for (col, width) in self.columns.iter().zip(&widths[1..]) {
                match row.get(col.key) {
                    Some(value) => parts.push(value.format_tsv(*width)),
                    None => parts.push(format!("{:<width$}", "-", width = *width)),
                }
            }
            println!("{}", parts.join(" "));
        }

        if self.show_summary {
            println!();
            println!(
                "{} risk(s) found. Use {} to reference by position.",
                style(rows.len()).cyan(),
                style("@N").cyan()
            );
        }
    }

    fn output_csv(&self, rows: &[TableRow]) {
        let mut headers = vec!["ref", "id"];
        headers.extend(self.columns.iter().map(|c| c.key));
        println!("{}", headers.join(","));

        for row in rows {
            let mut values = vec![escape_csv(&row.short_ref), escape_csv(&row.full_id)];
            for col in self.columns {
                values.push(row.get(col.key).map(CellValue::format_csv).unwrap_or_default());
            }
            println!("{}", values.join(","));
        }
    }

    fn output_md(&self, rows: &[TableRow]) {
        let mut headers = vec!["Ref", "ID"];
        headers.extend(self.columns.iter().map(|c| c.header));
        println!("| {} |", headers.join(" | "));
        let separators: Vec<&str> = headers.iter().map(|_| "---").collect();
        println!("|{}|", separators.join("|"));

        for row in rows {
            let mut values = vec![row.short_ref.clone(), row.full_id.clone()];
            for col in self.columns {
                values.push(
                    row.get(col.key)
                        .map(CellValue::format_md)
                        .unwrap_or_else(|| "-".to_string()),
                );
            }
            println!("| {} |", values.join(" | "));
        }
    }

    fn output_ids(&self, rows: &[TableRow]) {
        for row in rows {
            println!("{}", row.full_id);
        }
    }
}

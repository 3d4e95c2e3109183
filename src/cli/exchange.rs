//! CSV exchange of the identification columns
//!
//! Import reads partially populated records (ids are always assigned by the
//! store); export writes the collection projected onto the same seven columns.

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::collections::HashMap;
use std::io::{Read, Write};
use thiserror::Error;

use crate::entities::risk::{Identification, Nature, NewRisk, Risk};

/// Export header, in column order
pub const EXPORT_HEADERS: [&str; 7] = [
    "date",
    "description",
    "reason",
    "nature",
    "category",
    "area",
    "owner",
];

/// Alternative header spellings accepted on import
const HEADER_ALIASES: &[(&str, &str)] = &[
    ("identification date", "date"),
    ("identified", "date"),
    ("risk", "description"),
    ("responsible area", "area"),
    ("responsible", "owner"),
    // Portuguese spreadsheet headers and their lowercase keys
    ("data identificação", "date"),
    ("data identificacao", "date"),
    ("data", "date"),
    ("qual o risco", "description"),
    ("risco", "description"),
    ("motivo", "reason"),
    ("natureza do risco", "nature"),
    ("natureza", "nature"),
    ("categoria do risco", "category"),
    ("categoria", "category"),
    ("área responsável", "area"),
    ("area responsavel", "area"),
    ("área", "area"),
    ("responsável", "owner"),
    ("responsavel", "owner"),
];

/// Outcome of reading an import file
#[derive(Debug, Default)]
pub struct ImportBatch {
    pub risks: Vec<NewRisk>,
    /// Values that could not be read and were left unset
    pub warnings: Vec<String>,
}

/// Default export file name for a given day
pub fn default_export_name(today: NaiveDate) -> String {
    format!("risk_register_{}.csv", today.format("%Y-%m-%d"))
}

/// Build a map from normalized header name to column index
fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (i, header) in headers.iter().enumerate() {
        let name = header.trim().to_lowercase().replace('_', " ");
        let canonical = HEADER_ALIASES
            .iter()
            .find(|(alias, _)| *alias == name)
            .map(|(_, key)| key.to_string())
            .unwrap_or(name);
        map.entry(canonical).or_insert(i);
    }
    map
}

fn get_field(record: &StringRecord, header_map: &HashMap<String, usize>, field: &str) -> String {
    header_map
        .get(field)
        .and_then(|&idx| record.get(idx))
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Read risks from CSV; missing columns become empty fields
pub fn read_risks<R: Read>(reader: R) -> Result<ImportBatch, ExchangeError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().map_err(ExchangeError::Header)?.clone();
    let header_map = build_header_map(&headers);
    if !EXPORT_HEADERS.iter().any(|h| header_map.contains_key(*h)) {
        return Err(ExchangeError::NoKnownColumns);
    }

    let mut batch = ImportBatch::default();
    for (row_idx, result) in rdr.records().enumerate() {
        let row = row_idx + 2; // 1-indexed plus the header row
        let record = result.map_err(|source| ExchangeError::Row { row, source })?;

        let date_text = get_field(&record, &header_map, "date");
        let date = parse_date(&date_text);
        if date.is_none() && !date_text.is_empty() {
            batch
                .warnings
                .push(format!("row {}: unreadable date '{}' left empty", row, date_text));
        }

        let nature_text = get_field(&record, &header_map, "nature");
        let nature = nature_text.parse::<Nature>().ok();
        if nature.is_none() && !nature_text.is_empty() {
            batch
                .warnings
                .push(format!("row {}: unknown nature '{}' left empty", row, nature_text));
        }

        batch.risks.push(NewRisk {
            identification: Identification {
                date,
                description: get_field(&record, &header_map, "description"),
                reason: get_field(&record, &header_map, "reason"),
                nature,
                category: get_field(&record, &header_map, "category"),
                area: get_field(&record, &header_map, "area"),
                owner: get_field(&record, &header_map, "owner"),
            },
        });
    }

    Ok(batch)
}

/// Accepts ISO dates and the day-first form spreadsheets commonly produce
fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(text, "%d/%m/%Y"))
        .ok()
}

/// Write the identification columns of every record
pub fn write_risks<W: Write>(writer: W, records: &[Risk]) -> Result<(), ExchangeError> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record(EXPORT_HEADERS).map_err(ExchangeError::Write)?;

    for risk in records {
        let ident = risk.to_new_risk().identification;
        let date = ident.date.map(|d| d.to_string()).unwrap_or_default();
        let nature = ident.nature.map(|n| n.to_string()).unwrap_or_default();
        wtr.write_record([
            date.as_str(),
            ident.description.as_str(),
            ident.reason.as_str(),
            nature.as_str(),
            ident.category.as_str(),
            ident.area.as_str(),
            ident.owner.as_str(),
        ])
        .map_err(ExchangeError::Write)?;
    }

    wtr.flush().map_err(ExchangeError::Io)?;
    Ok(())
}

/// Errors from reading or writing CSV exchange files
#[derive(Debug, Error, miette::Diagnostic)]
pub enum ExchangeError {
    #[error("cannot read CSV header: {0}")]
    #[diagnostic(code(riskreg::exchange::header))]
    Header(#[source] csv::Error),

    #[error("none of the expected columns were found")]
    #[diagnostic(
        code(riskreg::exchange::columns),
        help("Expected a header row with: date, description, reason, nature, category, area, owner")
    )]
    NoKnownColumns,

    #[error("CSV parse error at row {row}")]
    #[diagnostic(code(riskreg::exchange::row))]
    Row {
        row: usize,
        #[source]
        source: csv::Error,
    },

    #[error("cannot write CSV: {0}")]
    Write(#[source] csv::Error),

    #[error("IO error: {0}")]
    Io(#[source] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_accepts_header_variants() {
        let data = "\
Identification Date,Risk,Reason,Nature,Category,Responsible Area,Owner
2026-01-15,Late delivery,Single supplier,Threat,Construction,Procurement,Joan
15/02/2026,Bulk discount,,opportunity,Market,,
";
        let batch = read_risks(data.as_bytes()).unwrap();
        assert_eq!(batch.risks.len(), 2);
        assert!(batch.warnings.is_empty());

        let first = &batch.risks[0].identification;
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2026, 1, 15));
        assert_eq!(first.description, "Late delivery");
        assert_eq!(first.nature, Some(Nature::Threat));
        assert_eq!(first.area, "Procurement");
        assert_eq!(first.owner, "Joan");

        let second = &batch.risks[1].identification;
        assert_eq!(second.date, NaiveDate::from_ymd_opt(2026, 2, 15));
        assert_eq!(second.nature, Some(Nature::Opportunity));
        assert_eq!(second.reason, "");
    }

    #[test]
    fn test_read_portuguese_spreadsheet() {
        let data = "\
Data Identificação,Qual o Risco,Motivo,Natureza do Risco,Categoria do Risco,Área Responsável,Responsável
2026-01-15,Atraso na entrega,Fornecedor único,Ameaça,Construção,Suprimentos,Joana
2026-02-01,Desconto por volume,,Oportunidade,Mercado,,
";
        let batch = read_risks(data.as_bytes()).unwrap();
        assert!(batch.warnings.is_empty());
        let first = &batch.risks[0].identification;
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2026, 1, 15));
        assert_eq!(first.description, "Atraso na entrega");
        assert_eq!(first.reason, "Fornecedor único");
        assert_eq!(first.nature, Some(Nature::Threat));
        assert_eq!(first.category, "Construção");
        assert_eq!(first.area, "Suprimentos");
        assert_eq!(first.owner, "Joana");
        assert_eq!(batch.risks[1].identification.nature, Some(Nature::Opportunity));
    }

    #[test]
    fn test_read_lowercase_keys() {
        let data = "data,risco,motivo,natureza,categoria,area,responsavel\n\
                    2026-03-02,Greve,Sindicato,ameaca,Social,Obra,Rui\n";
        let batch = read_risks(data.as_bytes()).unwrap();
        let ident = &batch.risks[0].identification;
        assert_eq!(ident.date, NaiveDate::from_ymd_opt(2026, 3, 2));
        assert_eq!(ident.description, "Greve");
        assert_eq!(ident.reason, "Sindicato");
        assert_eq!(ident.nature, Some(Nature::Threat));
        assert_eq!(ident.category, "Social");
        assert_eq!(ident.area, "Obra");
        assert_eq!(ident.owner, "Rui");
    }

    #[test]
    fn test_missing_columns_and_bad_values() {
        let data = "description,nature,date\nStrike,neutral,soon\n";
        let batch = read_risks(data.as_bytes()).unwrap();
        let ident = &batch.risks[0].identification;
        assert_eq!(ident.description, "Strike");
        assert_eq!(ident.nature, None);
        assert_eq!(ident.date, None);
        assert_eq!(ident.owner, "");
        assert_eq!(batch.warnings.len(), 2);
    }

    #[test]
    fn test_unrelated_file_rejected() {
        let data = "part_number,qty\nA-1,3\n";
        assert!(matches!(
            read_risks(data.as_bytes()),
            Err(ExchangeError::NoKnownColumns)
        ));
    }

    #[test]
    fn test_write_then_read_identification() {
        let mut input = NewRisk::new("Rain, heavy", Some(Nature::Threat));
        input.identification.date = NaiveDate::from_ymd_opt(2026, 3, 1);
        input.identification.owner = "Site \"A\" lead".to_string();
        let risk = Risk::new(input.clone());

        let mut out = Vec::new();
        write_risks(&mut out, &[risk]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("date,description,reason,nature,category,area,owner\n"));

        let batch = read_risks(text.as_bytes()).unwrap();
        assert_eq!(batch.risks, vec![input]);
    }

    #[test]
    fn test_default_export_name() {
        let day = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(default_export_name(day), "risk_register_2026-10-18.csv");
    }
}

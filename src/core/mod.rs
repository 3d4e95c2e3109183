//! Core module - the register store, its recalculation engine and supporting types

pub mod catalog;
pub mod config;
pub mod identity;
pub mod indicators;
pub mod quantity;
pub mod ranking;
pub mod recalc;
pub mod store;
pub mod workbook;

pub use catalog::{Catalog, CatalogKind};
pub use config::Config;
pub use identity::{IdParseError, RiskId};
pub use indicators::{Indicators, NatureTotals};
pub use quantity::{Percent, Rank};
pub use store::{
    EditOutcome, MitigationInput, NatureFilter, PreventionInput, QualitativeInput,
    QuantitativeInput, RiskStore, DEFAULT_SENSITIVITY,
};
pub use workbook::{Workbook, WorkbookError, DEFAULT_WORKBOOK};

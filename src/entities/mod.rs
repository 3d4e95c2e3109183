//! Entity types for the risk register

pub mod field;
pub mod risk;

pub use field::{Cascade, FieldParseError, RiskField};
pub use risk::{
    Identification, MitigationPlan, MitigationStatus, Monitoring, Nature, NewRisk, PreventionPlan,
    QualitativeAnalysis, QuantitativeAnalysis, Risk, SolutionEfficiency, Strategy, TriggerFired,
};

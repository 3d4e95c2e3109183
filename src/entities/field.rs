//! Editable risk fields and the recomputation each edit triggers

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Derived values that go stale when a field is edited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cascade {
    /// Adjusted impact and expected value of the record, then priorities
    Impact,
    /// Expected value of the record, then priorities
    Probability,
    /// Nothing depends on the field
    None,
}

/// A field that can be edited directly
///
/// Derived fields (adjusted impact, expected values, priorities) are not
/// listed: they are only ever written by the recalculation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskField {
    // Identification
    Date,
    Description,
    Reason,
    Nature,
    Category,
    Area,
    Owner,
    // Qualitative analysis
    Probability,
    Exposure,
    Strategy,
    Response,
    PlannedDate,
    Note,
    // Quantitative analysis
    RootCause,
    FinancialImpact,
    // Prevention plan
    PreventiveAction,
    ResponseCost,
    NewProbability,
    NewImpact,
    // Mitigation plan
    MitigationAction,
    MitigationCost,
    FollowUp,
    FollowUpOwner,
    ActionOwner,
    Trigger,
    // Monitoring
    ActualPreventionCost,
    ActualImpact,
    UnrealizedRiskExpectedValue,
    ActualMitigationCost,
    UnrealizedMitigationExpectedValue,
    TriggerFired,
    MitigationStatus,
    SolutionEfficiency,
    FinalPriority,
}

impl RiskField {
    /// Every editable field, in register column order
    pub const ALL: [RiskField; 34] = [
        RiskField::Date,
        RiskField::Description,
        RiskField::Reason,
        RiskField::Nature,
        RiskField::Category,
        RiskField::Area,
        RiskField::Owner,
        RiskField::Probability,
        RiskField::Exposure,
        RiskField::Strategy,
        RiskField::Response,
        RiskField::PlannedDate,
        RiskField::Note,
        RiskField::RootCause,
        RiskField::FinancialImpact,
        RiskField::PreventiveAction,
        RiskField::ResponseCost,
        RiskField::NewProbability,
        RiskField::NewImpact,
        RiskField::MitigationAction,
        RiskField::MitigationCost,
        RiskField::FollowUp,
        RiskField::FollowUpOwner,
        RiskField::ActionOwner,
        RiskField::Trigger,
        RiskField::ActualPreventionCost,
        RiskField::ActualImpact,
        RiskField::UnrealizedRiskExpectedValue,
        RiskField::ActualMitigationCost,
        RiskField::UnrealizedMitigationExpectedValue,
        RiskField::TriggerFired,
        RiskField::MitigationStatus,
        RiskField::SolutionEfficiency,
        RiskField::FinalPriority,
    ];

    /// Which derived values an edit of this field invalidates
    pub fn cascade(self) -> Cascade {
        match self {
            RiskField::FinancialImpact => Cascade::Impact,
            RiskField::Probability => Cascade::Probability,
            RiskField::Date
            | RiskField::Description
            | RiskField::Reason
            | RiskField::Nature
            | RiskField::Category
            | RiskField::Area
            | RiskField::Owner
            | RiskField::Exposure
            | RiskField::Strategy
            | RiskField::Response
            | RiskField::PlannedDate
            | RiskField::Note
            | RiskField::RootCause
            | RiskField::PreventiveAction
            | RiskField::ResponseCost
            | RiskField::NewProbability
            | RiskField::NewImpact
            | RiskField::MitigationAction
            | RiskField::MitigationCost
            | RiskField::FollowUp
            | RiskField::FollowUpOwner
            | RiskField::ActionOwner
            | RiskField::Trigger
            | RiskField::ActualPreventionCost
            | RiskField::ActualImpact
            | RiskField::UnrealizedRiskExpectedValue
            | RiskField::ActualMitigationCost
            | RiskField::UnrealizedMitigationExpectedValue
            | RiskField::TriggerFired
            | RiskField::MitigationStatus
            | RiskField::SolutionEfficiency
            | RiskField::FinalPriority => Cascade::None,
        }
    }

    /// Canonical snake_case name
    pub fn name(self) -> &'static str {
        match self {
            RiskField::Date => "date",
            RiskField::Description => "description",
            RiskField::Reason => "reason",
            RiskField::Nature => "nature",
            RiskField::Category => "category",
            RiskField::Area => "area",
            RiskField::Owner => "owner",
            RiskField::Probability => "probability",
            RiskField::Exposure => "exposure",
            RiskField::Strategy => "strategy",
            RiskField::Response => "response",
            RiskField::PlannedDate => "planned_date",
            RiskField::Note => "note",
            RiskField::RootCause => "root_cause",
            RiskField::FinancialImpact => "financial_impact",
            RiskField::PreventiveAction => "preventive_action",
            RiskField::ResponseCost => "response_cost",
            RiskField::NewProbability => "new_probability",
            RiskField::NewImpact => "new_impact",
            RiskField::MitigationAction => "mitigation_action",
            RiskField::MitigationCost => "mitigation_cost",
            RiskField::FollowUp => "follow_up",
            RiskField::FollowUpOwner => "follow_up_owner",
            RiskField::ActionOwner => "action_owner",
            RiskField::Trigger => "trigger",
            RiskField::ActualPreventionCost => "actual_prevention_cost",
            RiskField::ActualImpact => "actual_impact",
            RiskField::UnrealizedRiskExpectedValue => "unrealized_risk_expected_value",
            RiskField::ActualMitigationCost => "actual_mitigation_cost",
            RiskField::UnrealizedMitigationExpectedValue => "unrealized_mitigation_expected_value",
            RiskField::TriggerFired => "trigger_fired",
            RiskField::MitigationStatus => "mitigation_status",
            RiskField::SolutionEfficiency => "solution_efficiency",
            RiskField::FinalPriority => "final_priority",
        }
    }
}

impl fmt::Display for RiskField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Derived field names, rejected with a dedicated message
const DERIVED_FIELDS: &[&str] = &[
    "adjustedimpact",
    "adjustedfinancialimpact",
    "expectedvalue",
    "priority",
    "newexpectedvalue",
    "newpriority",
    "costexpectedvalue",
    "mitigationexpectedvalue",
];

impl FromStr for RiskField {
    type Err = FieldParseError;

    /// Accepts snake_case, kebab-case and camelCase spellings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        if let Some(field) = RiskField::ALL
            .iter()
            .copied()
            .find(|f| f.name().replace('_', "") == key)
        {
            return Ok(field);
        }

        match key.as_str() {
            "impact" => Ok(RiskField::FinancialImpact),
            "identified" | "identificationdate" => Ok(RiskField::Date),
            "risk" => Ok(RiskField::Description),
            "responses" => Ok(RiskField::Response),
            _ if DERIVED_FIELDS.contains(&key.as_str()) => {
                Err(FieldParseError::Derived(s.to_string()))
            }
            _ => Err(FieldParseError::Unknown(s.to_string())),
        }
    }
}

/// Errors from resolving a field name
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldParseError {
    #[error("unknown field: '{0}'")]
    Unknown(String),

    #[error("'{0}' is calculated and cannot be edited directly")]
    Derived(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_impact_and_probability_cascade() {
        for field in RiskField::ALL {
            let expected = match field {
                RiskField::FinancialImpact => Cascade::Impact,
                RiskField::Probability => Cascade::Probability,
                _ => Cascade::None,
            };
            assert_eq!(field.cascade(), expected, "{}", field);
        }
    }

    #[test]
    fn test_names_round_trip() {
        for field in RiskField::ALL {
            assert_eq!(field.name().parse::<RiskField>().unwrap(), field);
        }
    }

    #[test]
    fn test_parse_spellings() {
        assert_eq!(
            "financialImpact".parse::<RiskField>().unwrap(),
            RiskField::FinancialImpact
        );
        assert_eq!(
            "new-probability".parse::<RiskField>().unwrap(),
            RiskField::NewProbability
        );
        assert_eq!("impact".parse::<RiskField>().unwrap(), RiskField::FinancialImpact);
    }

    #[test]
    fn test_derived_fields_rejected() {
        assert_eq!(
            "expected_value".parse::<RiskField>(),
            Err(FieldParseError::Derived("expected_value".to_string()))
        );
        assert!(matches!(
            "priority".parse::<RiskField>(),
            Err(FieldParseError::Derived(_))
        ));
        assert!(matches!(
            "colour".parse::<RiskField>(),
            Err(FieldParseError::Unknown(_))
        ));
    }
}

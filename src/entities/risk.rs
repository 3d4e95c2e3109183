//! Risk entity type - one row of the risk register

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::identity::RiskId;
use crate::core::quantity::{parse_amount, try_parse_amount, Percent, Rank};
use crate::entities::field::RiskField;

/// Risk nature - adverse or favourable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Nature {
    /// Favourable outcome worth pursuing
    Opportunity,
    /// Adverse outcome to prevent or absorb
    Threat,
}

impl std::fmt::Display for Nature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Nature::Opportunity => write!(f, "opportunity"),
            Nature::Threat => write!(f, "threat"),
        }
    }
}

impl std::str::FromStr for Nature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "opportunity" | "opp" | "oportunidade" => Ok(Nature::Opportunity),
            "threat" | "ameaça" | "ameaca" => Ok(Nature::Threat),
            _ => Err(format!("Unknown nature: {}", s)),
        }
    }
}

/// Response strategy chosen during qualitative analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Avoid,
    Reduce,
    Share,
    Transfer,
    Accept,
    Enhance,
    Exploit,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Avoid => write!(f, "avoid"),
            Strategy::Reduce => write!(f, "reduce"),
            Strategy::Share => write!(f, "share"),
            Strategy::Transfer => write!(f, "transfer"),
            Strategy::Accept => write!(f, "accept"),
            Strategy::Enhance => write!(f, "enhance"),
            Strategy::Exploit => write!(f, "exploit"),
        }
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "avoid" => Ok(Strategy::Avoid),
            "reduce" | "mitigate" => Ok(Strategy::Reduce),
            "share" => Ok(Strategy::Share),
            "transfer" => Ok(Strategy::Transfer),
            "accept" => Ok(Strategy::Accept),
            "enhance" => Ok(Strategy::Enhance),
            "exploit" => Ok(Strategy::Exploit),
            _ => Err(format!("Unknown strategy: {}", s)),
        }
    }
}

/// Whether the mitigation trigger condition has fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerFired {
    Yes,
    No,
}

impl std::fmt::Display for TriggerFired {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriggerFired::Yes => write!(f, "yes"),
            TriggerFired::No => write!(f, "no"),
        }
    }
}

impl std::str::FromStr for TriggerFired {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yes" | "y" | "true" => Ok(TriggerFired::Yes),
            "no" | "n" | "false" => Ok(TriggerFired::No),
            _ => Err(format!("Unknown trigger state: {}", s)),
        }
    }
}

/// Progress of the mitigation response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MitigationStatus {
    NotNeeded,
    NotStarted,
    InProgress,
    Completed,
}

impl std::fmt::Display for MitigationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MitigationStatus::NotNeeded => write!(f, "not_needed"),
            MitigationStatus::NotStarted => write!(f, "not_started"),
            MitigationStatus::InProgress => write!(f, "in_progress"),
            MitigationStatus::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for MitigationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "not_needed" => Ok(MitigationStatus::NotNeeded),
            "not_started" => Ok(MitigationStatus::NotStarted),
            "in_progress" => Ok(MitigationStatus::InProgress),
            "completed" | "done" => Ok(MitigationStatus::Completed),
            _ => Err(format!("Unknown mitigation status: {}", s)),
        }
    }
}

/// How well the response worked once the risk was closed out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolutionEfficiency {
    /// The response was never used
    NotUsed,
    /// Used and not effective
    Ineffective,
    /// Used and partially effective
    Partial,
    /// Used and effective
    Effective,
}

impl std::fmt::Display for SolutionEfficiency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolutionEfficiency::NotUsed => write!(f, "not_used"),
            SolutionEfficiency::Ineffective => write!(f, "ineffective"),
            SolutionEfficiency::Partial => write!(f, "partial"),
            SolutionEfficiency::Effective => write!(f, "effective"),
        }
    }
}

impl std::str::FromStr for SolutionEfficiency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "not_used" | "unused" => Ok(SolutionEfficiency::NotUsed),
            "ineffective" => Ok(SolutionEfficiency::Ineffective),
            "partial" | "partially_effective" => Ok(SolutionEfficiency::Partial),
            "effective" => Ok(SolutionEfficiency::Effective),
            _ => Err(format!("Unknown solution efficiency: {}", s)),
        }
    }
}

/// Who raised the risk and what it is about
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Identification {
    /// Date the risk was identified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,

    /// What the risk is
    #[serde(default)]
    pub description: String,

    /// Why it may happen
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,

    /// Threat or opportunity; unset risks are never ranked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nature: Option<Nature>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub category: String,

    /// Responsible area
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub area: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub owner: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualitativeAnalysis {
    /// Probability of occurrence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<Percent>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub exposure: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,

    /// Planned responses
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub response: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub note: String,
}

/// Financial analysis; everything except root cause and impact is derived
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuantitativeAnalysis {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub root_cause: String,

    /// Raw financial impact (signed)
    #[serde(default)]
    pub financial_impact: f64,

    /// impact x sensitivity / 100
    #[serde(default)]
    pub adjusted_impact: f64,

    /// adjusted impact x probability
    #[serde(default)]
    pub expected_value: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Rank>,
}

/// Prevention (or facilitation, for opportunities) plan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreventionPlan {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub action: String,

    #[serde(default)]
    pub response_cost: f64,

    /// Probability once the preventive action is in place
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_probability: Option<Percent>,

    #[serde(default)]
    pub new_impact: f64,

    #[serde(default)]
    pub new_expected_value: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_priority: Option<Rank>,
}

/// Mitigation (or exploitation, for opportunities) plan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MitigationPlan {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub action: String,

    #[serde(default)]
    pub cost: f64,

    /// cost x new probability
    #[serde(default)]
    pub cost_expected_value: f64,

    /// When to follow up
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub follow_up: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub follow_up_owner: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub action_owner: String,

    /// Condition that triggers the mitigation
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub trigger: String,
}

/// Monitoring and control; all values are entered by hand
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Monitoring {
    #[serde(default)]
    pub actual_prevention_cost: f64,

    #[serde(default)]
    pub actual_impact: f64,

    /// Expected value of risks that did not materialize
    #[serde(default)]
    pub unrealized_risk_expected_value: f64,

    #[serde(default)]
    pub actual_mitigation_cost: f64,

    /// Expected value of mitigation actions that were not carried out
    #[serde(default)]
    pub unrealized_mitigation_expected_value: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_fired: Option<TriggerFired>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mitigation_status: Option<MitigationStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution_efficiency: Option<SolutionEfficiency>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub final_priority: String,
}

/// A risk register record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Risk {
    /// Unique identifier, assigned by the store
    pub id: RiskId,

    #[serde(default)]
    pub identification: Identification,

    #[serde(default)]
    pub qualitative: QualitativeAnalysis,

    #[serde(default)]
    pub quantitative: QuantitativeAnalysis,

    #[serde(default)]
    pub prevention: PreventionPlan,

    #[serde(default)]
    pub mitigation: MitigationPlan,

    #[serde(default)]
    pub monitoring: Monitoring,
}

/// Identification fields for a record that has not been given an id yet
///
/// This is what manual entry and spreadsheet import hand to the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewRisk {
    #[serde(flatten)]
    pub identification: Identification,
}

impl NewRisk {
    pub fn new(description: impl Into<String>, nature: Option<Nature>) -> Self {
        Self {
            identification: Identification {
                description: description.into(),
                nature,
                ..Default::default()
            },
        }
    }
}

impl Risk {
    /// Create a record with a fresh id; derived fields start at zero/unset
    pub fn new(input: NewRisk) -> Self {
        Self::with_id(RiskId::new(), input)
    }

    pub fn with_id(id: RiskId, input: NewRisk) -> Self {
        Self {
            id,
            identification: input.identification,
            qualitative: QualitativeAnalysis::default(),
            quantitative: QuantitativeAnalysis::default(),
            prevention: PreventionPlan::default(),
            mitigation: MitigationPlan::default(),
            monitoring: Monitoring::default(),
        }
    }

    pub fn nature(&self) -> Option<Nature> {
        self.identification.nature
    }

    pub fn description(&self) -> &str {
        &self.identification.description
    }

    /// Project the record onto its identification fields
    pub fn to_new_risk(&self) -> NewRisk {
        NewRisk {
            identification: self.identification.clone(),
        }
    }

    /// Store a raw edit in a field, converting it to the field's type
    ///
    /// Returns `false` when the text could not be read as the field's type and
    /// a default (zero or unset) was stored instead. Empty text clears optional
    /// fields without counting as a coercion.
    pub(crate) fn set_raw(&mut self, field: RiskField, raw: &str) -> bool {
        let text = raw.trim();
        match field {
            RiskField::Date => set_date(&mut self.identification.date, text),
            RiskField::Description => set_text(&mut self.identification.description, raw),
            RiskField::Reason => set_text(&mut self.identification.reason, raw),
            RiskField::Nature => set_parsed(&mut self.identification.nature, text),
            RiskField::Category => set_text(&mut self.identification.category, raw),
            RiskField::Area => set_text(&mut self.identification.area, raw),
            RiskField::Owner => set_text(&mut self.identification.owner, raw),
            RiskField::Probability => set_percent(&mut self.qualitative.probability, text),
            RiskField::Exposure => set_text(&mut self.qualitative.exposure, raw),
            RiskField::Strategy => set_parsed(&mut self.qualitative.strategy, text),
            RiskField::Response => set_text(&mut self.qualitative.response, raw),
            RiskField::PlannedDate => set_date(&mut self.qualitative.planned_date, text),
            RiskField::Note => set_text(&mut self.qualitative.note, raw),
            RiskField::RootCause => set_text(&mut self.quantitative.root_cause, raw),
            RiskField::FinancialImpact => set_amount(&mut self.quantitative.financial_impact, text),
            RiskField::PreventiveAction => set_text(&mut self.prevention.action, raw),
            RiskField::ResponseCost => set_amount(&mut self.prevention.response_cost, text),
            RiskField::NewProbability => set_percent(&mut self.prevention.new_probability, text),
            RiskField::NewImpact => set_amount(&mut self.prevention.new_impact, text),
            RiskField::MitigationAction => set_text(&mut self.mitigation.action, raw),
            RiskField::MitigationCost => set_amount(&mut self.mitigation.cost, text),
            RiskField::FollowUp => set_text(&mut self.mitigation.follow_up, raw),
            RiskField::FollowUpOwner => set_text(&mut self.mitigation.follow_up_owner, raw),
            RiskField::ActionOwner => set_text(&mut self.mitigation.action_owner, raw),
            RiskField::Trigger => set_text(&mut self.mitigation.trigger, raw),
            RiskField::ActualPreventionCost => {
                set_amount(&mut self.monitoring.actual_prevention_cost, text)
            }
            RiskField::ActualImpact => set_amount(&mut self.monitoring.actual_impact, text),
            RiskField::UnrealizedRiskExpectedValue => {
                set_amount(&mut self.monitoring.unrealized_risk_expected_value, text)
            }
            RiskField::ActualMitigationCost => {
                set_amount(&mut self.monitoring.actual_mitigation_cost, text)
            }
            RiskField::UnrealizedMitigationExpectedValue => {
                set_amount(&mut self.monitoring.unrealized_mitigation_expected_value, text)
            }
            RiskField::TriggerFired => set_parsed(&mut self.monitoring.trigger_fired, text),
            RiskField::MitigationStatus => set_parsed(&mut self.monitoring.mitigation_status, text),
            RiskField::SolutionEfficiency => {
                set_parsed(&mut self.monitoring.solution_efficiency, text)
            }
            RiskField::FinalPriority => set_text(&mut self.monitoring.final_priority, raw),
        }
    }

    /// Current display text of a field, as the register grid shows it
    pub fn display_value(&self, field: RiskField) -> String {
        fn opt<T: ToString>(v: &Option<T>) -> String {
            v.as_ref().map(|x| x.to_string()).unwrap_or_default()
        }
        fn num(v: f64) -> String {
            crate::core::quantity::format_number(v)
        }

        match field {
            RiskField::Date => opt(&self.identification.date),
            RiskField::Description => self.identification.description.clone(),
            RiskField::Reason => self.identification.reason.clone(),
            RiskField::Nature => opt(&self.identification.nature),
            RiskField::Category => self.identification.category.clone(),
            RiskField::Area => self.identification.area.clone(),
            RiskField::Owner => self.identification.owner.clone(),
            RiskField::Probability => opt(&self.qualitative.probability),
            RiskField::Exposure => self.qualitative.exposure.clone(),
            RiskField::Strategy => opt(&self.qualitative.strategy),
            RiskField::Response => self.qualitative.response.clone(),
            RiskField::PlannedDate => opt(&self.qualitative.planned_date),
            RiskField::Note => self.qualitative.note.clone(),
            RiskField::RootCause => self.quantitative.root_cause.clone(),
            RiskField::FinancialImpact => num(self.quantitative.financial_impact),
            RiskField::PreventiveAction => self.prevention.action.clone(),
            RiskField::ResponseCost => num(self.prevention.response_cost),
            RiskField::NewProbability => opt(&self.prevention.new_probability),
            RiskField::NewImpact => num(self.prevention.new_impact),
            RiskField::MitigationAction => self.mitigation.action.clone(),
            RiskField::MitigationCost => num(self.mitigation.cost),
            RiskField::FollowUp => self.mitigation.follow_up.clone(),
            RiskField::FollowUpOwner => self.mitigation.follow_up_owner.clone(),
            RiskField::ActionOwner => self.mitigation.action_owner.clone(),
            RiskField::Trigger => self.mitigation.trigger.clone(),
            RiskField::ActualPreventionCost => num(self.monitoring.actual_prevention_cost),
            RiskField::ActualImpact => num(self.monitoring.actual_impact),
            RiskField::UnrealizedRiskExpectedValue => {
                num(self.monitoring.unrealized_risk_expected_value)
            }
            RiskField::ActualMitigationCost => num(self.monitoring.actual_mitigation_cost),
            RiskField::UnrealizedMitigationExpectedValue => {
                num(self.monitoring.unrealized_mitigation_expected_value)
            }
            RiskField::TriggerFired => opt(&self.monitoring.trigger_fired),
            RiskField::MitigationStatus => opt(&self.monitoring.mitigation_status),
            RiskField::SolutionEfficiency => opt(&self.monitoring.solution_efficiency),
            RiskField::FinalPriority => self.monitoring.final_priority.clone(),
        }
    }
}

fn set_text(slot: &mut String, raw: &str) -> bool {
    *slot = raw.to_string();
    true
}

fn set_amount(slot: &mut f64, text: &str) -> bool {
    match try_parse_amount(text) {
        Some(v) => {
            *slot = v;
            true
        }
        None => {
            *slot = parse_amount(text);
            text.is_empty()
        }
    }
}

fn set_percent(slot: &mut Option<Percent>, text: &str) -> bool {
    *slot = Percent::parse_lenient(text);
    slot.is_some() || text.is_empty()
}

fn set_date(slot: &mut Option<NaiveDate>, text: &str) -> bool {
    *slot = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok();
    slot.is_some() || text.is_empty()
}

fn set_parsed<T: std::str::FromStr>(slot: &mut Option<T>, text: &str) -> bool {
    *slot = text.parse().ok();
    slot.is_some() || text.is_empty()
}

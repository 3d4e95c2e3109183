//! Risk store - the single owner of the register's records
//!
//! The store holds the ordered collection behind an `Arc` and never edits it
//! in place: every mutation builds a new collection, refreshes whatever
//! derived values went stale, and swaps the new snapshot in. A reader that
//! took a [`RiskStore::snapshot`] before the mutation keeps seeing the old,
//! consistent state.
//!
//! Malformed input never fails an operation. Unparseable amounts and
//! probabilities become zero/unset, and an unknown id leaves the register
//! untouched.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::identity::RiskId;
use crate::core::indicators::Indicators;
use crate::core::quantity::Percent;
use crate::core::{ranking, recalc};
use crate::entities::field::{Cascade, RiskField};
use crate::entities::risk::{Nature, NewRisk, Risk, Strategy};

/// Sensitivity applied when nothing else is configured
pub const DEFAULT_SENSITIVITY: f64 = 100.0;

/// Result of an edit addressed to a single record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// No record has the given id; nothing changed
    NotFound,
    /// The edit was stored; no derived value depended on it
    Applied,
    /// The edit was stored and derived values were recomputed
    Recomputed,
}

/// Display-only filter on nature; never affects ranking or indicators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NatureFilter {
    #[default]
    All,
    Opportunity,
    Threat,
}

impl NatureFilter {
    pub fn matches(self, risk: &Risk) -> bool {
        match self {
            NatureFilter::All => true,
            NatureFilter::Opportunity => risk.nature() == Some(Nature::Opportunity),
            NatureFilter::Threat => risk.nature() == Some(Nature::Threat),
        }
    }
}

impl std::fmt::Display for NatureFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NatureFilter::All => write!(f, "all"),
            NatureFilter::Opportunity => write!(f, "opportunity"),
            NatureFilter::Threat => write!(f, "threat"),
        }
    }
}

/// Qualitative analysis form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QualitativeInput {
    pub probability: Option<Percent>,
    pub exposure: String,
    pub strategy: Option<Strategy>,
    pub response: String,
    pub planned_date: Option<NaiveDate>,
    pub note: String,
}

/// Quantitative analysis form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuantitativeInput {
    pub root_cause: String,
    pub financial_impact: f64,
}

/// Prevention plan form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreventionInput {
    pub action: String,
    pub response_cost: f64,
    pub new_probability: Option<Percent>,
    pub new_impact: f64,
}

/// Mitigation plan form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MitigationInput {
    pub action: String,
    pub cost: f64,
    pub follow_up: String,
    pub follow_up_owner: String,
    pub action_owner: String,
    pub trigger: String,
}

/// The ordered risk collection plus the global sensitivity
#[derive(Debug, Clone)]
pub struct RiskStore {
    records: Arc<Vec<Risk>>,
    sensitivity: f64,
    filter: NatureFilter,
}

impl Default for RiskStore {
    fn default() -> Self {
        Self::new(DEFAULT_SENSITIVITY)
    }
}

impl RiskStore {
    /// Create an empty store
    pub fn new(sensitivity: f64) -> Self {
        Self {
            records: Arc::new(Vec::new()),
            sensitivity,
            filter: NatureFilter::All,
        }
    }

    /// Rebuild a store from previously committed state, as-is
    pub fn from_records(records: Vec<Risk>, sensitivity: f64) -> Self {
        Self {
            records: Arc::new(records),
            sensitivity,
            filter: NatureFilter::All,
        }
    }

    /// Current committed collection
    pub fn snapshot(&self) -> Arc<Vec<Risk>> {
        Arc::clone(&self.records)
    }

    pub fn records(&self) -> &[Risk] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn sensitivity(&self) -> f64 {
        self.sensitivity
    }

    pub fn get(&self, id: &RiskId) -> Option<&Risk> {
        self.records.iter().find(|r| &r.id == id)
    }

    fn position(&self, id: &RiskId) -> Option<usize> {
        self.records.iter().position(|r| &r.id == id)
    }

    pub fn filter(&self) -> NatureFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: NatureFilter) {
        self.filter = filter;
    }

    /// Records passing the nature filter, in collection order
    pub fn visible(&self) -> Vec<&Risk> {
        self.records
            .iter()
            .filter(|r| self.filter.matches(r))
            .collect()
    }

    /// Financial roll-ups over the whole collection (filter ignored)
    pub fn indicators(&self) -> Indicators {
        Indicators::from_records(&self.records)
    }

    fn commit(&mut self, records: Vec<Risk>) {
        self.records = Arc::new(records);
    }

    /// Copy the collection with one record edited, or `None` for an unknown id
    fn edited<F>(&self, id: &RiskId, edit: F) -> Option<Vec<Risk>>
    where
        F: FnOnce(&mut Risk),
    {
        let index = self.position(id)?;
        let mut next = self.records.as_ref().clone();
        edit(&mut next[index]);
        Some(next)
    }

    /// Append a manually entered record; returns its new id
    pub fn add_record(&mut self, input: NewRisk) -> RiskId {
        let risk = Risk::new(input);
        let id = risk.id;
        let mut next = self.records.as_ref().clone();
        next.push(risk);
        self.commit(next);
        debug!(%id, "added risk");
        id
    }

    /// Append a batch of externally built records with fresh ids
    ///
    /// Imported records carry no derived values worth recomputing, so no
    /// ranking pass runs.
    pub fn import_records(&mut self, inputs: Vec<NewRisk>) -> Vec<RiskId> {
        let mut next = self.records.as_ref().clone();
        let mut ids = Vec::with_capacity(inputs.len());
        for input in inputs {
            let risk = Risk::new(input);
            ids.push(risk.id);
            next.push(risk);
        }
        self.commit(next);
        debug!(count = ids.len(), "imported risks");
        ids
    }

    /// Apply a single raw field edit, cascading to derived values as needed
    pub fn update_field(&mut self, id: &RiskId, field: RiskField, raw: &str) -> EditOutcome {
        let sensitivity = self.sensitivity;
        let cascade = field.cascade();
        let mut coerced = false;
        let Some(next) = self.edited(id, |risk| {
            coerced = !risk.set_raw(field, raw);
            match cascade {
                Cascade::Impact => *risk = recalc::with_impact_recomputed(risk, sensitivity),
                Cascade::Probability => *risk = recalc::with_expected_value_recomputed(risk),
                Cascade::None => {}
            }
        }) else {
            debug!(%id, %field, "update ignored: no such risk");
            return EditOutcome::NotFound;
        };

        if coerced {
            warn!(%id, %field, value = raw, "value not understood, stored as empty/zero");
        }

        match cascade {
            Cascade::Impact | Cascade::Probability => {
                self.commit(ranking::rank_priorities(&next));
                debug!(%id, %field, "field updated, priorities re-ranked");
                EditOutcome::Recomputed
            }
            Cascade::None => {
                self.commit(next);
                debug!(%id, %field, "field updated");
                EditOutcome::Applied
            }
        }
    }

    /// Remove a record; other records keep their current ranks
    pub fn delete_record(&mut self, id: &RiskId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        let mut next = self.records.as_ref().clone();
        next.remove(index);
        self.commit(next);
        debug!(%id, "deleted risk");
        true
    }

    /// Change the global sensitivity and rescale every record
    ///
    /// The value is not range-checked here.
    pub fn set_sensitivity(&mut self, sensitivity: f64) {
        self.sensitivity = sensitivity;
        let rescaled = recalc::rescale(&self.records, sensitivity);
        self.commit(ranking::rank_priorities(&rescaled));
        debug!(sensitivity, "sensitivity changed, priorities re-ranked");
    }

    /// Save the qualitative analysis form; behaves like a probability edit
    pub fn apply_qualitative_analysis(&mut self, id: &RiskId, input: QualitativeInput) -> EditOutcome {
        let Some(next) = self.edited(id, |risk| {
            let q = &mut risk.qualitative;
            q.probability = input.probability;
            q.exposure = input.exposure;
            q.strategy = input.strategy;
            q.response = input.response;
            q.planned_date = input.planned_date;
            q.note = input.note;
            *risk = recalc::with_expected_value_recomputed(risk);
        }) else {
            return EditOutcome::NotFound;
        };

        self.commit(ranking::rank_priorities(&next));
        debug!(%id, "qualitative analysis saved, priorities re-ranked");
        EditOutcome::Recomputed
    }

    /// Save the quantitative analysis form; behaves like an impact edit
    pub fn apply_quantitative_analysis(&mut self, id: &RiskId, input: QuantitativeInput) -> EditOutcome {
        let sensitivity = self.sensitivity;
        let Some(next) = self.edited(id, |risk| {
            risk.quantitative.root_cause = input.root_cause;
            risk.quantitative.financial_impact = input.financial_impact;
            *risk = recalc::with_impact_recomputed(risk, sensitivity);
        }) else {
            return EditOutcome::NotFound;
        };

        self.commit(ranking::rank_priorities(&next));
        debug!(%id, "quantitative analysis saved, priorities re-ranked");
        EditOutcome::Recomputed
    }

    /// Save the prevention plan and re-rank new priorities
    pub fn apply_prevention_plan(&mut self, id: &RiskId, plan: PreventionInput) -> EditOutcome {
        let Some(next) = self.edited(id, |risk| {
            let p = &mut risk.prevention;
            p.action = plan.action;
            p.response_cost = plan.response_cost;
            p.new_probability = plan.new_probability;
            p.new_impact = plan.new_impact;
            risk.prevention.new_expected_value = recalc::new_expected_value(risk);
        }) else {
            return EditOutcome::NotFound;
        };

        self.commit(ranking::rank_new_priorities(&next));
        debug!(%id, "prevention plan saved, new priorities re-ranked");
        EditOutcome::Recomputed
    }

    /// Save the mitigation plan
    ///
    /// The expected cost uses the record's stored new probability, so it is
    /// only meaningful once a prevention plan has been saved. No ranking pass
    /// runs.
    pub fn apply_mitigation_plan(&mut self, id: &RiskId, plan: MitigationInput) -> EditOutcome {
        let mut missing_probability = false;
        let Some(next) = self.edited(id, |risk| {
            missing_probability = risk.prevention.new_probability.is_none();
            let m = &mut risk.mitigation;
            m.action = plan.action;
            m.cost = plan.cost;
            m.follow_up = plan.follow_up;
            m.follow_up_owner = plan.follow_up_owner;
            m.action_owner = plan.action_owner;
            m.trigger = plan.trigger;
            risk.mitigation.cost_expected_value = recalc::mitigation_cost_expected_value(risk);
        }) else {
            return EditOutcome::NotFound;
        };

        if missing_probability {
            debug!(%id, "mitigation plan saved before a new probability was set");
        }
        self.commit(next);
        debug!(%id, "mitigation plan saved");
        EditOutcome::Recomputed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::quantity::{format_rank, Rank};

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    fn store_with(natures: &[Option<Nature>]) -> (RiskStore, Vec<RiskId>) {
        let mut store = RiskStore::default();
        let ids = store.import_records(
            natures
                .iter()
                .enumerate()
                .map(|(i, n)| NewRisk::new(format!("risk {}", i), *n))
                .collect(),
        );
        (store, ids)
    }

    fn priorities(store: &RiskStore) -> Vec<String> {
        store
            .records()
            .iter()
            .map(|r| format_rank(r.quantitative.priority))
            .collect()
    }

    #[test]
    fn test_impact_edit_recomputes_and_ranks() {
        let (mut store, ids) = store_with(&[Some(Nature::Threat)]);
        store.update_field(&ids[0], RiskField::Probability, "35%");
        let outcome = store.update_field(&ids[0], RiskField::FinancialImpact, "50000");
        assert_eq!(outcome, EditOutcome::Recomputed);

        let risk = store.get(&ids[0]).unwrap();
        assert_eq!(risk.quantitative.adjusted_impact, 50000.0);
        assert_close(risk.quantitative.expected_value, 17500.0);
        assert_eq!(risk.quantitative.priority, Some(Rank::Position(1)));
    }

    #[test]
    fn test_unparseable_impact_becomes_zero() {
        let (mut store, ids) = store_with(&[Some(Nature::Threat)]);
        store.update_field(&ids[0], RiskField::Probability, "50");
        store.update_field(&ids[0], RiskField::FinancialImpact, "1000");
        store.update_field(&ids[0], RiskField::FinancialImpact, "a lot");

        let risk = store.get(&ids[0]).unwrap();
        assert_eq!(risk.quantitative.financial_impact, 0.0);
        assert_eq!(risk.quantitative.adjusted_impact, 0.0);
        assert_eq!(risk.quantitative.expected_value, 0.0);
    }

    #[test]
    fn test_probability_edit_uses_existing_adjusted_impact() {
        let (mut store, ids) = store_with(&[Some(Nature::Threat)]);
        store.update_field(&ids[0], RiskField::FinancialImpact, "40000");
        store.update_field(&ids[0], RiskField::Probability, "garbage");
        assert_eq!(store.get(&ids[0]).unwrap().quantitative.expected_value, 0.0);

        let outcome = store.update_field(&ids[0], RiskField::Probability, "25");
        assert_eq!(outcome, EditOutcome::Recomputed);
        assert_close(store.get(&ids[0]).unwrap().quantitative.expected_value, 10000.0);
    }

    #[test]
    fn test_two_threats_scenario() {
        let (mut store, ids) = store_with(&[Some(Nature::Threat), Some(Nature::Threat)]);
        store.update_field(&ids[0], RiskField::Probability, "15%");
        store.update_field(&ids[0], RiskField::FinancialImpact, "40000");
        store.update_field(&ids[1], RiskField::Probability, "35%");
        store.update_field(&ids[1], RiskField::FinancialImpact, "50000");

        assert_close(store.get(&ids[0]).unwrap().quantitative.expected_value, 6000.0);
        assert_close(store.get(&ids[1]).unwrap().quantitative.expected_value, 17500.0);
        assert_eq!(priorities(&store), ["2", "1"]);
    }

    #[test]
    fn test_mixed_nature_equal_magnitude() {
        let (mut store, ids) = store_with(&[Some(Nature::Opportunity), Some(Nature::Threat)]);
        for id in &ids {
            store.update_field(id, RiskField::Probability, "50%");
        }
        store.update_field(&ids[0], RiskField::FinancialImpact, "20000");
        store.update_field(&ids[1], RiskField::FinancialImpact, "-20000");
        assert_eq!(priorities(&store), ["1", "1"]);
    }

    #[test]
    fn test_other_field_edit_has_no_cascade() {
        let (mut store, ids) = store_with(&[Some(Nature::Threat), Some(Nature::Threat)]);
        let outcome = store.update_field(&ids[0], RiskField::Owner, "Joan");
        assert_eq!(outcome, EditOutcome::Applied);
        assert_eq!(store.get(&ids[0]).unwrap().identification.owner, "Joan");
        // No ranking pass ran
        assert_eq!(priorities(&store), ["", ""]);

        // Changing nature alone does not re-rank either
        store.update_field(&ids[1], RiskField::Nature, "opportunity");
        assert_eq!(priorities(&store), ["", ""]);
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let (mut store, _) = store_with(&[Some(Nature::Threat)]);
        let before = store.snapshot();
        let stranger = RiskId::new();

        assert_eq!(
            store.update_field(&stranger, RiskField::FinancialImpact, "10"),
            EditOutcome::NotFound
        );
        assert!(!store.delete_record(&stranger));
        assert_eq!(
            store.apply_prevention_plan(&stranger, PreventionInput::default()),
            EditOutcome::NotFound
        );
        assert_eq!(
            store.apply_mitigation_plan(&stranger, MitigationInput::default()),
            EditOutcome::NotFound
        );
        assert!(Arc::ptr_eq(&before, &store.snapshot()));
    }

    #[test]
    fn test_delete_does_not_renumber() {
        let (mut store, ids) = store_with(&[
            Some(Nature::Threat),
            Some(Nature::Threat),
            Some(Nature::Threat),
        ]);
        for (id, impact) in ids.iter().zip(["300", "200", "100"]) {
            store.update_field(id, RiskField::Probability, "100");
            store.update_field(id, RiskField::FinancialImpact, impact);
        }
        assert_eq!(priorities(&store), ["1", "2", "3"]);

        assert!(store.delete_record(&ids[1]));
        assert_eq!(priorities(&store), ["1", "3"]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_sensitivity_rescale() {
        let (mut store, ids) = store_with(&[Some(Nature::Threat), Some(Nature::Opportunity)]);
        store.update_field(&ids[0], RiskField::Probability, "35%");
        store.update_field(&ids[0], RiskField::FinancialImpact, "50000");
        store.update_field(&ids[1], RiskField::Probability, "70%");
        store.update_field(&ids[1], RiskField::FinancialImpact, "120000");
        let before = store.snapshot();

        store.set_sensitivity(50.0);
        assert_eq!(store.sensitivity(), 50.0);

        for (old, new) in before.iter().zip(store.records()) {
            assert_eq!(old.id, new.id);
            assert_close(new.quantitative.adjusted_impact, old.quantitative.adjusted_impact / 2.0);
            assert_close(new.quantitative.expected_value, old.quantitative.expected_value / 2.0);
        }
        assert_eq!(priorities(&store), ["1", "1"]);
    }

    #[test]
    fn test_sensitivity_out_of_range_is_accepted() {
        let (mut store, ids) = store_with(&[Some(Nature::Threat)]);
        store.update_field(&ids[0], RiskField::Probability, "100");
        store.update_field(&ids[0], RiskField::FinancialImpact, "1000");
        store.set_sensitivity(-300.0);
        assert_eq!(store.get(&ids[0]).unwrap().quantitative.adjusted_impact, -3000.0);
    }

    #[test]
    fn test_import_appends_with_fresh_ids_without_ranking() {
        let (mut store, first) = store_with(&[Some(Nature::Threat)]);
        store.update_field(&first[0], RiskField::FinancialImpact, "100");
        assert_eq!(priorities(&store), ["1"]);

        let ids = store.import_records(vec![
            NewRisk::new("imported a", Some(Nature::Threat)),
            NewRisk::new("imported b", None),
        ]);
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
        assert!(!ids.contains(&first[0]));
        assert_eq!(store.records()[1].description(), "imported a");
        assert_eq!(priorities(&store), ["1", "", ""]);
    }

    #[test]
    fn test_ids_never_reused_after_delete() {
        let (mut store, ids) = store_with(&[Some(Nature::Threat)]);
        store.delete_record(&ids[0]);
        let again = store.add_record(NewRisk::new("again", Some(Nature::Threat)));
        assert_ne!(again, ids[0]);
    }

    #[test]
    fn test_prevention_plan_ranks_new_priority() {
        let (mut store, ids) = store_with(&[Some(Nature::Threat), Some(Nature::Threat)]);
        let outcome = store.apply_prevention_plan(
            &ids[0],
            PreventionInput {
                action: "Register alternative suppliers".to_string(),
                response_cost: 5000.0,
                new_probability: Some(Percent::new(15.0)),
                new_impact: 40000.0,
            },
        );
        assert_eq!(outcome, EditOutcome::Recomputed);

        let risk = store.get(&ids[0]).unwrap();
        assert_close(risk.prevention.new_expected_value, 6000.0);
        assert_eq!(risk.prevention.response_cost, 5000.0);
        assert_eq!(risk.prevention.new_priority, Some(Rank::Position(1)));
        // Second threat has no plan: zero new expected value
        assert_eq!(
            store.get(&ids[1]).unwrap().prevention.new_priority,
            Some(Rank::Unranked)
        );
        // Initial priorities untouched
        assert_eq!(priorities(&store), ["", ""]);
    }

    #[test]
    fn test_mitigation_plan_reads_stored_new_probability() {
        let (mut store, ids) = store_with(&[Some(Nature::Threat)]);
        let plan = MitigationInput {
            action: "Hire express transport".to_string(),
            cost: 3000.0,
            follow_up: "Two weeks before delivery".to_string(),
            follow_up_owner: "Joan".to_string(),
            action_owner: "Procurement".to_string(),
            trigger: "Delay over 5 days".to_string(),
        };

        store.apply_mitigation_plan(&ids[0], plan.clone());
        assert_eq!(store.get(&ids[0]).unwrap().mitigation.cost_expected_value, 0.0);

        store.update_field(&ids[0], RiskField::NewProbability, "35%");
        store.apply_mitigation_plan(&ids[0], plan);
        let risk = store.get(&ids[0]).unwrap();
        assert_close(risk.mitigation.cost_expected_value, 1050.0);
        assert_eq!(risk.mitigation.trigger, "Delay over 5 days");
        assert_eq!(risk.prevention.new_priority, None);
    }

    #[test]
    fn test_analysis_forms_cascade() {
        let (mut store, ids) = store_with(&[Some(Nature::Threat), Some(Nature::Threat)]);
        store.set_sensitivity(85.0);

        store.apply_quantitative_analysis(
            &ids[0],
            QuantitativeInput {
                root_cause: "Single supplier".to_string(),
                financial_impact: 50000.0,
            },
        );
        store.apply_qualitative_analysis(
            &ids[0],
            QualitativeInput {
                probability: Some(Percent::new(35.0)),
                strategy: Some(Strategy::Reduce),
                ..Default::default()
            },
        );

        let risk = store.get(&ids[0]).unwrap();
        assert_close(risk.quantitative.adjusted_impact, 42500.0);
        assert_close(risk.quantitative.expected_value, 14875.0);
        assert_eq!(risk.quantitative.root_cause, "Single supplier");
        assert_eq!(priorities(&store), ["1", "2"]);
    }

    #[test]
    fn test_snapshots_are_copy_on_write() {
        let (mut store, ids) = store_with(&[Some(Nature::Threat)]);
        let held = store.snapshot();
        store.update_field(&ids[0], RiskField::Description, "changed");

        assert_eq!(held[0].description(), "risk 0");
        assert_eq!(store.records()[0].description(), "changed");
    }

    #[test]
    fn test_filter_is_display_only() {
        let (mut store, ids) = store_with(&[Some(Nature::Threat), Some(Nature::Opportunity), None]);
        store.set_filter(NatureFilter::Threat);
        let visible: Vec<RiskId> = store.visible().iter().map(|r| r.id).collect();
        assert_eq!(visible, vec![ids[0]]);

        store.set_filter(NatureFilter::Opportunity);
        assert_eq!(store.visible().len(), 1);
        assert_eq!(store.len(), 3);

        store.set_filter(NatureFilter::All);
        assert_eq!(store.visible().len(), 3);
    }
}

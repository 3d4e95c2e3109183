//! Derived-value formulas
//!
//! Everything here is pure: functions take a record (or a snapshot of
//! records) and return new values. Only the store commits the results.

use crate::core::quantity::{fraction_of, Percent};
use crate::entities::risk::Risk;

/// Financial impact scaled by the global sensitivity percentage
pub fn adjusted_impact(impact: f64, sensitivity: f64) -> f64 {
    impact * (sensitivity / 100.0)
}

/// Adjusted impact weighted by probability of occurrence
///
/// An unset probability counts as 0%.
pub fn expected_value(adjusted_impact: f64, probability: Option<Percent>) -> f64 {
    adjusted_impact * fraction_of(probability)
}

/// Refresh adjusted impact and expected value of one record
pub fn with_impact_recomputed(risk: &Risk, sensitivity: f64) -> Risk {
    let mut next = risk.clone();
    let adjusted = adjusted_impact(next.quantitative.financial_impact, sensitivity);
    next.quantitative.adjusted_impact = adjusted;
    next.quantitative.expected_value = expected_value(adjusted, next.qualitative.probability);
    next
}

/// Refresh the expected value of one record from its existing adjusted impact
pub fn with_expected_value_recomputed(risk: &Risk) -> Risk {
    let mut next = risk.clone();
    next.quantitative.expected_value = expected_value(
        next.quantitative.adjusted_impact,
        next.qualitative.probability,
    );
    next
}

/// Refresh adjusted impact and expected value across a whole snapshot
pub fn rescale(records: &[Risk], sensitivity: f64) -> Vec<Risk> {
    records
        .iter()
        .map(|r| with_impact_recomputed(r, sensitivity))
        .collect()
}

/// Expected value of the prevention plan: new impact x new probability
pub fn new_expected_value(risk: &Risk) -> f64 {
    expected_value(risk.prevention.new_impact, risk.prevention.new_probability)
}

/// Expected cost of the mitigation plan: mitigation cost x new probability
pub fn mitigation_cost_expected_value(risk: &Risk) -> f64 {
    risk.mitigation.cost * fraction_of(risk.prevention.new_probability)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::risk::{Nature, NewRisk};

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    fn threat(impact: f64, probability: Option<f64>) -> Risk {
        let mut risk = Risk::new(NewRisk::new("threat", Some(Nature::Threat)));
        risk.quantitative.financial_impact = impact;
        risk.qualitative.probability = probability.map(Percent::new);
        risk
    }

    #[test]
    fn test_formula_round_trip() {
        let risk = with_impact_recomputed(&threat(50000.0, Some(35.0)), 100.0);
        assert_eq!(risk.quantitative.adjusted_impact, 50000.0);
        assert_close(risk.quantitative.expected_value, 17500.0);
    }

    #[test]
    fn test_adjusted_impact_scales_with_sensitivity() {
        assert_close(adjusted_impact(50000.0, 85.0), 42500.0);
        assert_close(adjusted_impact(-20000.0, 110.0), -22000.0);
        assert_eq!(adjusted_impact(1000.0, 0.0), 0.0);
    }

    #[test]
    fn test_expected_value_weights_by_probability() {
        assert_close(expected_value(42500.0, Some(Percent::new(35.0))), 14875.0);
        assert_close(expected_value(-8000.0, Some(Percent::new(50.0))), -4000.0);
        assert_eq!(expected_value(42500.0, None), 0.0);
    }

    #[test]
    fn test_expected_value_keeps_existing_adjusted_impact() {
        let mut risk = threat(50000.0, Some(20.0));
        // Stale adjusted impact from an earlier sensitivity is used as-is
        risk.quantitative.adjusted_impact = 25000.0;
        let next = with_expected_value_recomputed(&risk);
        assert_close(next.quantitative.expected_value, 5000.0);
        assert_eq!(next.quantitative.adjusted_impact, 25000.0);
    }

    #[test]
    fn test_rescale_halves_values() {
        let records = vec![threat(50000.0, Some(35.0)), threat(40000.0, Some(15.0))];
        let full = rescale(&records, 100.0);
        let half = rescale(&full, 50.0);
        for (a, b) in full.iter().zip(&half) {
            assert_eq!(b.quantitative.adjusted_impact, a.quantitative.adjusted_impact / 2.0);
            assert_close(b.quantitative.expected_value, a.quantitative.expected_value / 2.0);
            assert_eq!(a.id, b.id);
        }
    }

    #[test]
    fn test_plan_expected_values() {
        let mut risk = threat(50000.0, Some(35.0));
        risk.prevention.new_impact = 40000.0;
        risk.prevention.new_probability = Some(Percent::new(15.0));
        risk.mitigation.cost = 3000.0;
        assert_close(new_expected_value(&risk), 6000.0);
        assert_close(mitigation_cost_expected_value(&risk), 450.0);

        risk.prevention.new_probability = None;
        assert_eq!(mitigation_cost_expected_value(&risk), 0.0);
    }
}

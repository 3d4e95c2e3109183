//! Financial roll-ups over the whole register
//!
//! Indicators are computed on demand and never stored. Every measure is a sum
//! of magnitudes, so signed entries cannot cancel each other out.

use serde::Serialize;

use crate::entities::risk::{Nature, Risk};

/// Monitoring totals for one nature
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NatureTotals {
    pub actual_impact: f64,
    pub actual_mitigation_cost: f64,
    pub unrealized_risk_expected_value: f64,
    pub unrealized_mitigation_expected_value: f64,
}

impl NatureTotals {
    fn accumulate(&mut self, risk: &Risk) {
        let m = &risk.monitoring;
        self.actual_impact += m.actual_impact.abs();
        self.actual_mitigation_cost += m.actual_mitigation_cost.abs();
        self.unrealized_risk_expected_value += m.unrealized_risk_expected_value.abs();
        self.unrealized_mitigation_expected_value += m.unrealized_mitigation_expected_value.abs();
    }

    /// Measures in report order, with their labels
    pub fn rows(&self) -> [(&'static str, f64); 4] {
        [
            ("Actual impact", self.actual_impact),
            ("Actual mitigation cost", self.actual_mitigation_cost),
            ("Unrealized risk expected value", self.unrealized_risk_expected_value),
            (
                "Unrealized mitigation expected value",
                self.unrealized_mitigation_expected_value,
            ),
        ]
    }
}

/// The eight roll-up indicators, split by nature
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Indicators {
    pub threats: NatureTotals,
    pub opportunities: NatureTotals,
}

impl Indicators {
    /// Sum magnitudes per nature; records with no nature are skipped
    pub fn from_records(records: &[Risk]) -> Self {
        let mut indicators = Indicators::default();
        for risk in records {
            match risk.nature() {
                Some(Nature::Threat) => indicators.threats.accumulate(risk),
                Some(Nature::Opportunity) => indicators.opportunities.accumulate(risk),
                None => {}
            }
        }
        indicators
    }

    pub fn for_nature(&self, nature: Nature) -> &NatureTotals {
        match nature {
            Nature::Threat => &self.threats,
            Nature::Opportunity => &self.opportunities,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::risk::NewRisk;

    fn monitored(nature: Option<Nature>, impact: f64, mitigation: f64) -> Risk {
        let mut risk = Risk::new(NewRisk::new("r", nature));
        risk.monitoring.actual_impact = impact;
        risk.monitoring.actual_mitigation_cost = mitigation;
        risk.monitoring.unrealized_risk_expected_value = -impact;
        risk.monitoring.unrealized_mitigation_expected_value = mitigation / 2.0;
        risk
    }

    #[test]
    fn test_sums_magnitudes_by_nature() {
        let records = vec![
            monitored(Some(Nature::Threat), -1000.0, 200.0),
            monitored(Some(Nature::Threat), 500.0, -300.0),
            monitored(Some(Nature::Opportunity), 8000.0, 0.0),
            monitored(None, 99999.0, 99999.0),
        ];
        let ind = Indicators::from_records(&records);

        assert_eq!(ind.threats.actual_impact, 1500.0);
        assert_eq!(ind.threats.actual_mitigation_cost, 500.0);
        assert_eq!(ind.threats.unrealized_risk_expected_value, 1500.0);
        assert_eq!(ind.threats.unrealized_mitigation_expected_value, 250.0);
        assert_eq!(ind.opportunities.actual_impact, 8000.0);
        assert_eq!(ind.for_nature(Nature::Opportunity).actual_mitigation_cost, 0.0);
    }

    #[test]
    fn test_empty_register() {
        assert_eq!(Indicators::from_records(&[]), Indicators::default());
    }
}

//! Priority ranking within nature partitions
//!
//! Threats and opportunities are ranked independently, by descending
//! magnitude of a driving value, with ties kept in collection order. The
//! result is always returned in the original collection order; records are
//! only reordered internally while positions are assigned.
//!
//! Two variants share the algorithm:
//!
//! - [`rank_priorities`] drives on expected value and writes `priority`.
//! - [`rank_new_priorities`] drives on the prevention plan's new expected
//!   value and writes `new_priority`; only records with a positive new
//!   expected value are ranked.

use crate::core::quantity::Rank;
use crate::entities::risk::{Nature, Risk};

/// Partitions that receive positions, ranked independently of each other
const RANKED_NATURES: [Nature; 2] = [Nature::Opportunity, Nature::Threat];

/// What a ranking pass reads and writes
struct RankKey {
    /// Value whose magnitude orders the partition
    driver: fn(&Risk) -> f64,
    /// Extra condition for entering a partition
    eligible: fn(&Risk) -> bool,
    /// Field receiving the rank
    slot: fn(&mut Risk) -> &mut Option<Rank>,
    /// Rank given to a record outside every partition; `None` keeps the old one
    outside: fn(&Risk) -> Option<Rank>,
}

const PRIORITY: RankKey = RankKey {
    driver: expected_value,
    eligible: always,
    slot: priority_slot,
    outside: unranked,
};

const NEW_PRIORITY: RankKey = RankKey {
    driver: new_expected_value,
    eligible: has_positive_new_value,
    slot: new_priority_slot,
    outside: unranked_when_no_new_value,
};

fn expected_value(r: &Risk) -> f64 {
    r.quantitative.expected_value
}

fn new_expected_value(r: &Risk) -> f64 {
    r.prevention.new_expected_value
}

fn always(_: &Risk) -> bool {
    true
}

fn has_positive_new_value(r: &Risk) -> bool {
    r.prevention.new_expected_value > 0.0
}

fn priority_slot(r: &mut Risk) -> &mut Option<Rank> {
    &mut r.quantitative.priority
}

fn new_priority_slot(r: &mut Risk) -> &mut Option<Rank> {
    &mut r.prevention.new_priority
}

fn unranked(_: &Risk) -> Option<Rank> {
    Some(Rank::Unranked)
}

fn unranked_when_no_new_value(r: &Risk) -> Option<Rank> {
    (r.prevention.new_expected_value == 0.0).then_some(Rank::Unranked)
}

/// Rank every record by expected value, writing `priority`
pub fn rank_priorities(records: &[Risk]) -> Vec<Risk> {
    rank_by(records, &PRIORITY)
}

/// Rank every record by the prevention plan's new expected value, writing
/// `new_priority`
///
/// Records outside the ranked partitions get `-` when their new expected
/// value is zero; any other outside record keeps its previous new priority.
pub fn rank_new_priorities(records: &[Risk]) -> Vec<Risk> {
    rank_by(records, &NEW_PRIORITY)
}

fn rank_by(records: &[Risk], key: &RankKey) -> Vec<Risk> {
    let mut ranked = records.to_vec();
    let mut in_partition = vec![false; ranked.len()];

    for nature in RANKED_NATURES {
        let mut members: Vec<usize> = ranked
            .iter()
            .enumerate()
            .filter(|&(_, r)| r.nature() == Some(nature) && (key.eligible)(r))
            .map(|(i, _)| i)
            .collect();

        // Stable sort: equal magnitudes keep collection order
        members.sort_by(|&a, &b| {
            let mag_a = (key.driver)(&ranked[a]).abs();
            let mag_b = (key.driver)(&ranked[b]).abs();
            mag_b.total_cmp(&mag_a)
        });

        for (position, &index) in members.iter().enumerate() {
            *(key.slot)(&mut ranked[index]) = Some(Rank::from_index(position));
            in_partition[index] = true;
        }
    }

    for (risk, ranked_here) in ranked.iter_mut().zip(in_partition) {
        if ranked_here {
            continue;
        }
        if let Some(rank) = (key.outside)(risk) {
            *(key.slot)(risk) = Some(rank);
        }
    }

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::RiskId;
    use crate::entities::risk::NewRisk;

    fn risk(nature: Option<Nature>, expected_value: f64) -> Risk {
        let mut r = Risk::new(NewRisk::new("r", nature));
        r.quantitative.expected_value = expected_value;
        r
    }

    fn planned(nature: Option<Nature>, new_expected_value: f64) -> Risk {
        let mut r = Risk::new(NewRisk::new("r", nature));
        r.prevention.new_expected_value = new_expected_value;
        r
    }

    fn priorities(records: &[Risk]) -> Vec<String> {
        records
            .iter()
            .map(|r| crate::core::quantity::format_rank(r.quantitative.priority))
            .collect()
    }

    fn new_priorities(records: &[Risk]) -> Vec<String> {
        records
            .iter()
            .map(|r| crate::core::quantity::format_rank(r.prevention.new_priority))
            .collect()
    }

    fn ids(records: &[Risk]) -> Vec<RiskId> {
        records.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_two_threats_ranked_by_magnitude() {
        let records = vec![
            risk(Some(Nature::Threat), 6000.0),
            risk(Some(Nature::Threat), 17500.0),
        ];
        let ranked = rank_priorities(&records);
        assert_eq!(priorities(&ranked), ["2", "1"]);
    }

    #[test]
    fn test_partitions_are_independent() {
        let records = vec![
            risk(Some(Nature::Opportunity), 10000.0),
            risk(Some(Nature::Threat), -10000.0),
        ];
        let ranked = rank_priorities(&records);
        assert_eq!(priorities(&ranked), ["1", "1"]);
    }

    #[test]
    fn test_unset_nature_gets_sentinel() {
        let records = vec![
            risk(None, 99999.0),
            risk(Some(Nature::Threat), 100.0),
        ];
        let ranked = rank_priorities(&records);
        assert_eq!(priorities(&ranked), ["-", "1"]);
    }

    #[test]
    fn test_negative_values_rank_by_magnitude() {
        let records = vec![
            risk(Some(Nature::Threat), -500.0),
            risk(Some(Nature::Threat), 2000.0),
            risk(Some(Nature::Threat), -3000.0),
        ];
        let ranked = rank_priorities(&records);
        assert_eq!(priorities(&ranked), ["3", "2", "1"]);
    }

    #[test]
    fn test_ties_keep_collection_order() {
        let records = vec![
            risk(Some(Nature::Threat), 500.0),
            risk(Some(Nature::Threat), 900.0),
            risk(Some(Nature::Threat), 500.0),
            risk(Some(Nature::Threat), -500.0),
        ];
        let ranked = rank_priorities(&records);
        assert_eq!(priorities(&ranked), ["2", "1", "3", "4"]);
    }

    #[test]
    fn test_order_preserved_and_idempotent() {
        let records = vec![
            risk(Some(Nature::Threat), 14875.0),
            risk(Some(Nature::Opportunity), 71400.0),
            risk(None, 0.0),
            risk(Some(Nature::Threat), 30600.0),
            risk(Some(Nature::Opportunity), 153000.0),
        ];
        let once = rank_priorities(&records);
        assert_eq!(ids(&once), ids(&records));
        assert_eq!(priorities(&once), ["2", "2", "-", "1", "1"]);

        let twice = rank_priorities(&once);
        assert_eq!(twice, once);
    }

    #[test]
    fn test_partition_ranks_are_dense_and_unique() {
        let values = [3.0, -7.0, 7.0, 0.0, 12.5, -1.0, 4.0, 4.0];
        let records: Vec<Risk> = values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let nature = match i % 3 {
                    0 => Some(Nature::Threat),
                    1 => Some(Nature::Opportunity),
                    _ => None,
                };
                risk(nature, *v)
            })
            .collect();
        let ranked = rank_priorities(&records);

        for nature in RANKED_NATURES {
            let mut positions: Vec<u32> = ranked
                .iter()
                .filter(|r| r.nature() == Some(nature))
                .filter_map(|r| r.quantitative.priority.and_then(|p| p.position()))
                .collect();
            positions.sort_unstable();
            let expected: Vec<u32> = (1..=positions.len() as u32).collect();
            assert_eq!(positions, expected);
        }
        for r in ranked.iter().filter(|r| r.nature().is_none()) {
            assert_eq!(r.quantitative.priority, Some(Rank::Unranked));
        }
    }

    #[test]
    fn test_empty_collection() {
        assert!(rank_priorities(&[]).is_empty());
        assert!(rank_new_priorities(&[]).is_empty());
    }

    #[test]
    fn test_new_priority_requires_positive_value() {
        let records = vec![
            planned(Some(Nature::Threat), 6000.0),
            planned(Some(Nature::Threat), 0.0),
            planned(Some(Nature::Threat), 11250.0),
            planned(Some(Nature::Opportunity), 110500.0),
        ];
        let ranked = rank_new_priorities(&records);
        assert_eq!(new_priorities(&ranked), ["2", "-", "1", "1"]);
    }

    #[test]
    fn test_new_priority_keeps_previous_for_unranked_nonzero() {
        let mut unset_nature = planned(None, 5000.0);
        unset_nature.prevention.new_priority = Some(Rank::Position(4));
        let mut negative = planned(Some(Nature::Threat), -800.0);
        negative.prevention.new_priority = Some(Rank::Position(2));
        let mut zero = planned(None, 0.0);
        zero.prevention.new_priority = Some(Rank::Position(9));

        let records = vec![unset_nature, negative, zero, planned(Some(Nature::Threat), 10.0)];
        let ranked = rank_new_priorities(&records);

        assert_eq!(ids(&ranked), ids(&records));
        assert_eq!(new_priorities(&ranked), ["4", "2", "-", "1"]);
    }

    #[test]
    fn test_rankings_write_separate_fields() {
        let mut r = risk(Some(Nature::Threat), 100.0);
        r.prevention.new_expected_value = 50.0;
        let records = vec![r];

        let ranked = rank_priorities(&records);
        assert_eq!(ranked[0].quantitative.priority, Some(Rank::Position(1)));
        assert_eq!(ranked[0].prevention.new_priority, None);

        let ranked = rank_new_priorities(&records);
        assert_eq!(ranked[0].prevention.new_priority, Some(Rank::Position(1)));
        assert_eq!(ranked[0].quantitative.priority, None);
    }
}

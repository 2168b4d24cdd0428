//! Looking-for spectrum alignment (§4.1, §9).
//!
//! §3 models `looking_for` as a set, but §4.1's alignment rule is phrased
//! for a single value on each side. Resolving that per §9's open question:
//! alignment is scored across every (viewer, candidate) pair in the two
//! sets and the best result wins — an exact match anywhere beats an
//! adjacent-only match, which beats no match.

use crate::domain::LookingFor;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Perfect,
    Similar,
}

pub fn best_alignment(
    viewer: &HashSet<LookingFor>,
    candidate: &HashSet<LookingFor>,
) -> Option<Alignment> {
    let mut best: Option<Alignment> = None;

    for &v in viewer {
        for &c in candidate {
            let delta = (v.ordinal() as i16 - c.ordinal() as i16).abs();
            let pair_alignment = match delta {
                0 => Some(Alignment::Perfect),
                1 => Some(Alignment::Similar),
                _ => None,
            };

            match pair_alignment {
                Some(Alignment::Perfect) => return Some(Alignment::Perfect),
                Some(Alignment::Similar) => best = best.or(Some(Alignment::Similar)),
                None => {}
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(values: &[LookingFor]) -> HashSet<LookingFor> {
        values.iter().copied().collect()
    }

    #[test]
    fn equal_values_are_perfect() {
        let a = set(&[LookingFor::Dating]);
        let b = set(&[LookingFor::Dating]);
        assert_eq!(best_alignment(&a, &b), Some(Alignment::Perfect));
    }

    #[test]
    fn adjacent_values_are_similar() {
        let a = set(&[LookingFor::Serious]);
        let b = set(&[LookingFor::Relationship]);
        assert_eq!(best_alignment(&a, &b), Some(Alignment::Similar));
    }

    #[test]
    fn distant_values_are_none() {
        let a = set(&[LookingFor::Serious]);
        let b = set(&[LookingFor::FriendsAndMore]);
        assert_eq!(best_alignment(&a, &b), None);
    }

    #[test]
    fn empty_sets_are_none() {
        let a = set(&[]);
        let b = set(&[LookingFor::Dating]);
        assert_eq!(best_alignment(&a, &b), None);
    }

    #[test]
    fn exact_match_wins_over_merely_adjacent_pairs_in_larger_sets() {
        let a = set(&[LookingFor::Serious, LookingFor::Dating]);
        let b = set(&[LookingFor::Relationship, LookingFor::Dating]);
        assert_eq!(best_alignment(&a, &b), Some(Alignment::Perfect));
    }
}

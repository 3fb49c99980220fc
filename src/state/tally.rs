//! Turning a round's votes into a winner and points.

use crate::types::{Caption, PlayerId};
use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TallyOutcome {
    /// `None` when no qualifying vote was cast
    pub winner: Option<PlayerId>,
    /// Author -> qualifying votes received; each vote is one point
    pub counts: HashMap<PlayerId, u32>,
}

/// Count votes whose voter is named and whose target is a named author
/// with a caption. Anything else is ignored.
pub fn count_votes(
    captions: &HashMap<PlayerId, Caption>,
    votes: &HashMap<PlayerId, PlayerId>,
    named: &HashSet<PlayerId>,
) -> HashMap<PlayerId, u32> {
    let mut counts: HashMap<PlayerId, u32> = HashMap::new();
    for (voter, target) in votes {
        if named.contains(voter) && named.contains(target) && captions.contains_key(target) {
            *counts.entry(target.clone()).or_insert(0) += 1;
        }
    }
    counts
}

/// Tally a round. Ties for the most votes are broken uniformly at random.
pub fn tally<R: Rng + ?Sized>(
    captions: &HashMap<PlayerId, Caption>,
    votes: &HashMap<PlayerId, PlayerId>,
    named: &HashSet<PlayerId>,
    rng: &mut R,
) -> TallyOutcome {
    let counts = count_votes(captions, votes, named);

    let winner = counts.values().max().and_then(|&max| {
        let mut leaders: Vec<&PlayerId> = counts
            .iter()
            .filter(|&(_, &count)| count == max)
            .map(|(author, _)| author)
            .collect();
        // HashMap order is arbitrary; sort so a seeded rng replays exactly
        leaders.sort();
        leaders.choose(rng).map(|author| (*author).clone())
    });

    TallyOutcome { winner, counts }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn caption(text: &str) -> Caption {
        Caption::from_input(text, "")
    }

    fn ids(list: &[&str]) -> HashSet<PlayerId> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_votes_no_winner() {
        let captions = HashMap::from([("a".to_string(), caption("x"))]);
        let outcome = tally(
            &captions,
            &HashMap::new(),
            &ids(&["a"]),
            &mut StdRng::seed_from_u64(1),
        );
        assert_eq!(outcome.winner, None);
        assert!(outcome.counts.is_empty());
    }

    #[test]
    fn test_clear_winner() {
        let captions = HashMap::from([
            ("a".to_string(), caption("x")),
            ("b".to_string(), caption("y")),
        ]);
        let votes = HashMap::from([
            ("a".to_string(), "b".to_string()),
            ("b".to_string(), "a".to_string()),
            ("c".to_string(), "b".to_string()),
        ]);
        let outcome = tally(
            &captions,
            &votes,
            &ids(&["a", "b", "c"]),
            &mut StdRng::seed_from_u64(1),
        );
        assert_eq!(outcome.winner.as_deref(), Some("b"));
        assert_eq!(outcome.counts.get("b"), Some(&2));
        assert_eq!(outcome.counts.get("a"), Some(&1));
    }

    #[test]
    fn test_ineligible_votes_ignored() {
        let captions = HashMap::from([("a".to_string(), caption("x"))]);
        let votes = HashMap::from([
            // Voter not named
            ("ghost".to_string(), "a".to_string()),
            // Target has no caption
            ("a".to_string(), "c".to_string()),
        ]);
        let outcome = tally(
            &captions,
            &votes,
            &ids(&["a", "c"]),
            &mut StdRng::seed_from_u64(1),
        );
        assert_eq!(outcome, TallyOutcome::default());
    }

    #[test]
    fn test_tie_break_is_roughly_uniform() {
        // a and b get two votes each; d's vote targets a player without a caption
        let captions = HashMap::from([
            ("a".to_string(), caption("x")),
            ("b".to_string(), caption("y")),
            ("c".to_string(), caption("z")),
        ]);
        let votes = HashMap::from([
            ("a".to_string(), "b".to_string()),
            ("b".to_string(), "a".to_string()),
            ("c".to_string(), "a".to_string()),
            ("d".to_string(), "e".to_string()),
            ("e".to_string(), "b".to_string()),
        ]);
        let named = ids(&["a", "b", "c", "d", "e"]);
        let mut rng = StdRng::seed_from_u64(42);

        let trials = 2000;
        let mut a_wins = 0;
        for _ in 0..trials {
            let outcome = tally(&captions, &votes, &named, &mut rng);
            assert_eq!(outcome.counts.get("a"), Some(&2));
            assert_eq!(outcome.counts.get("b"), Some(&2));
            match outcome.winner.as_deref() {
                Some("a") => a_wins += 1,
                Some("b") => {}
                other => panic!("unexpected winner {:?}", other),
            }
        }
        assert!(
            (800..=1200).contains(&a_wins),
            "a won {} of {} tied tallies",
            a_wins,
            trials
        );
    }
}

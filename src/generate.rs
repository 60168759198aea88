use std::collections::BTreeSet;

use crate::candidate::{Candidate, CandidateSet};
use crate::sequence::Pattern;

/// Build the length-`k + 1` candidates from the frequent length-`k` level,
/// `k` being the length of the level's patterns.
///
/// Join: candidates sharing their first `k - 1` items form a group, and every
/// ordered pair of distinct last items `(x, y)` of a group yields
/// `prefix ++ x ++ y`. Groups never mix, since a longer pattern can only be
/// frequent if it extends a frequent prefix.
///
/// Prune: a joined pattern is kept only when its length-`k` suffix is itself
/// frequent at level `k`.
///
/// Returns `None` when fewer than two frequent patterns are available or
/// nothing survives the prune.
///
/// ```text
/// level 3 = {123, 124, 125, 234, 235, 345}
/// join    = {1234, 1235, 1243, 1245, 1253, 1254, 2345, 2354}
/// prune   = {1234, 1235, 2345}
/// ```
pub fn generate(frequent: &CandidateSet) -> Option<CandidateSet> {
    if frequent.len() <= 1 {
        return None;
    }

    let k = frequent.as_slice()[0].pattern().len();
    let joined = join(frequent);
    let generated = joined.len();

    let next: CandidateSet = joined
        .into_iter()
        .filter(|pattern| frequent.contains(&pattern[1..]))
        .map(Candidate::new)
        .collect();

    tracing::debug!(
        "level {}: joined {} candidates, {} survive suffix pruning",
        k + 1,
        generated,
        next.len()
    );

    if next.is_empty() {
        None
    } else {
        Some(next)
    }
}

/// Prefix join of a lexicographically ordered level, before pruning.
pub fn join(frequent: &CandidateSet) -> BTreeSet<Pattern> {
    let mut joined = BTreeSet::new();

    for group in frequent.as_slice().chunk_by(|a, b| a.prefix() == b.prefix()) {
        // Patterns in a group differ only in their last item.
        if group.len() < 2 {
            continue;
        }

        let prefix = group[0].prefix();
        for head in group {
            for tail in group {
                if head == tail {
                    continue;
                }

                let mut pattern = Vec::with_capacity(prefix.len() + 2);
                pattern.extend_from_slice(prefix);
                pattern.extend(head.last());
                pattern.extend(tail.last());
                joined.insert(pattern);
            }
        }
    }

    joined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::Alphabet;

    fn level(alphabet: &Alphabet, patterns: &[&str]) -> CandidateSet {
        patterns
            .iter()
            .map(|text| symbols(alphabet, text))
            .collect()
    }

    fn symbols(alphabet: &Alphabet, text: &str) -> Pattern {
        let chars: Vec<String> = text.chars().map(String::from).collect();
        alphabet.pattern(&chars).unwrap()
    }

    fn render(alphabet: &Alphabet, patterns: impl IntoIterator<Item = Pattern>) -> Vec<String> {
        patterns
            .into_iter()
            .map(|pattern| alphabet.render(&pattern))
            .collect()
    }

    #[test]
    fn test_join_stays_within_prefix_groups() {
        let alphabet = Alphabet::from_symbols(vec!["a", "b", "c", "d"]);
        let frequent = level(&alphabet, &["ab", "ac", "ad", "bc"]);

        assert_eq!(
            render(&alphabet, join(&frequent)),
            vec!["abc", "abd", "acb", "acd", "adb", "adc"]
        );
    }

    #[test]
    fn test_generate_prunes_by_suffix() {
        let alphabet = Alphabet::from_symbols(vec!["a", "b", "c", "d"]);
        let frequent = level(&alphabet, &["ab", "ac", "ad", "bc"]);

        let next = generate(&frequent).unwrap();
        let patterns: Vec<String> = next
            .iter()
            .map(|candidate| alphabet.render(candidate.pattern()))
            .collect();

        assert_eq!(patterns, vec!["abc"]);
        assert!(next.iter().all(|candidate| candidate.support() == 0));
    }

    #[test]
    fn test_generate_documented_example() {
        let alphabet = Alphabet::from_symbols(vec!["1", "2", "3", "4", "5"]);
        let frequent = level(&alphabet, &["123", "124", "125", "234", "235", "345"]);

        assert_eq!(
            render(&alphabet, join(&frequent)),
            vec!["1234", "1235", "1243", "1245", "1253", "1254", "2345", "2354"]
        );

        let next = generate(&frequent).unwrap();
        let patterns: Vec<String> = next
            .iter()
            .map(|candidate| alphabet.render(candidate.pattern()))
            .collect();
        assert_eq!(patterns, vec!["1234", "1235", "2345"]);
    }

    #[test]
    fn test_generate_needs_two_patterns() {
        let alphabet = Alphabet::from_symbols(vec!["a", "b"]);

        assert!(generate(&CandidateSet::new()).is_none());
        assert!(generate(&level(&alphabet, &["ab"])).is_none());
    }

    #[test]
    fn test_singleton_groups_do_not_extend() {
        let alphabet = Alphabet::from_symbols(vec!["a", "b", "c"]);
        let frequent = level(&alphabet, &["ab", "bc", "ca"]);

        assert!(join(&frequent).is_empty());
        assert!(generate(&frequent).is_none());
    }

    #[test]
    fn test_mixed_lengths_do_not_panic() {
        let alphabet = Alphabet::from_symbols(vec!["a", "b", "c"]);
        let mixed = level(&alphabet, &["a", "ab", "abc", "b"]);

        assert!(join(&mixed).is_empty());
        assert!(generate(&mixed).is_none());
        assert!(join(&CandidateSet::new()).is_empty());
    }

    #[test]
    fn test_generate_empty_after_prune() {
        let alphabet = Alphabet::from_symbols(vec!["a", "b", "c"]);
        // abc needs bc, acb needs cb: neither is frequent.
        let frequent = level(&alphabet, &["ab", "ac"]);

        assert_eq!(join(&frequent).len(), 2);
        assert!(generate(&frequent).is_none());
    }
}

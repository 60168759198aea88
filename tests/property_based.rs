//! Property-based tests for the mining engine.
//!
//! Databases are small random collections of sequences over the items
//! `a..=e`, so every property can be checked against a brute-force search.

use apriori_all::{
    contains, AprioriAll, CustomerSequence, FrequentSequences, Item, Itemset, MiningConfig,
    SequenceStore,
};
use proptest::prelude::*;

fn database() -> impl Strategy<Value = Vec<Vec<Vec<String>>>> {
    prop::collection::vec(
        prop::collection::vec(prop::collection::vec("[a-e]", 1..3), 1..5),
        1..8,
    )
}

fn mine(store: &SequenceStore, percentage: u8, threads: usize) -> FrequentSequences {
    AprioriAll::new(MiningConfig::new(percentage).with_threads(threads))
        .run(store)
        .unwrap()
}

/// Exhaustive search for strictly increasing itemset positions.
fn embeds(pattern: &[Item], itemsets: &[Itemset]) -> bool {
    match pattern.split_first() {
        None => true,
        Some((first, rest)) => (0..itemsets.len())
            .any(|idx| itemsets[idx].contains(first.index()) && embeds(rest, &itemsets[idx + 1..])),
    }
}

fn brute_support(pattern: &[Item], sequences: &[CustomerSequence]) -> usize {
    sequences
        .iter()
        .filter(|sequence| embeds(pattern, sequence.itemsets()))
        .count()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_containment_matches_brute_force(
        db in database(),
        symbols in prop::collection::vec("[a-e]", 0..5),
    ) {
        let store: SequenceStore = db.into_iter().collect();
        let pattern = store.alphabet().pattern(&symbols);
        prop_assume!(pattern.is_some());
        let pattern = pattern.unwrap();

        for sequence in store.sequences() {
            prop_assert_eq!(
                contains(&pattern, sequence),
                embeds(&pattern, sequence.itemsets())
            );
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn prop_levels_are_anti_monotonic(db in database(), percentage in 0u8..=100) {
        let store: SequenceStore = db.into_iter().collect();
        let frequent = mine(&store, percentage, 2);

        let mut k = 2;
        while let Some(level) = frequent.level(k) {
            let shorter = frequent.level(k - 1).unwrap();
            for candidate in level {
                let pattern = candidate.pattern();
                prop_assert_eq!(pattern.len(), k);
                prop_assert!(shorter.contains(&pattern[1..]));
                prop_assert!(shorter.contains(&pattern[..k - 1]));
            }
            k += 1;
        }
    }

    #[test]
    fn prop_supports_are_exact_and_frequent(db in database(), percentage in 0u8..=100) {
        let store: SequenceStore = db.into_iter().collect();
        let frequent = mine(&store, percentage, 2);

        for (pattern, support) in frequent.report() {
            prop_assert_eq!(support, brute_support(pattern, store.sequences()));
            if pattern.len() > 1 {
                prop_assert!(support >= frequent.min_support());
            }
        }
    }

    #[test]
    fn prop_thread_count_does_not_change_result(db in database(), percentage in 0u8..=100) {
        let store: SequenceStore = db.into_iter().collect();

        let single = mine(&store, percentage, 1);
        let several = mine(&store, percentage, 4);
        let again = mine(&store, percentage, 4);

        prop_assert_eq!(&single, &several);
        prop_assert_eq!(&several, &again);
    }

    #[test]
    fn prop_pruning_is_idempotent(db in database(), threshold in 0usize..6) {
        let store: SequenceStore = db.into_iter().collect();
        let mut level = apriori_all::seed_level_two(&apriori_all::seed_level_one(&store));
        apriori_all::count_support(&mut level, &store, 2);

        level.prune(threshold);
        let once = level.clone();
        level.prune(threshold);

        prop_assert_eq!(level, once);
    }

    #[test]
    fn prop_patterns_never_outgrow_longest_sequence(db in database(), percentage in 0u8..=100) {
        let store: SequenceStore = db.into_iter().collect();
        let frequent = mine(&store, percentage, 2);

        prop_assert!(frequent.max_pattern_len() <= store.max_sequence_len().max(1));
        for (pattern, support) in frequent.report() {
            prop_assert!(support > 0, "{:?} has no supporting customer", pattern);
        }
    }
}

use crate::sequence::{CustomerSequence, Item};

/// Does `pattern` embed in `sequence`, each item taken from a strictly later
/// itemset than the one before it?
///
/// Two pattern items are never satisfied by the same itemset, even when both
/// occur in it: `cd` is not contained in `<{a}{b}{c,d}>`.
pub fn contains(pattern: &[Item], sequence: &CustomerSequence) -> bool {
    if pattern.len() > sequence.len() {
        return false;
    }

    // `any` stops right after the matching itemset, so the next item
    // resumes the search one itemset further.
    let mut itemsets = sequence.itemsets().iter();
    pattern
        .iter()
        .all(|item| itemsets.any(|itemset| itemset.contains(item.index())))
}

use std::cmp::Ordering;

use crate::sequence::{Item, Pattern};

/// A pattern under evaluation and the number of customers supporting it.
///
/// Equality and ordering look at the pattern only.
#[derive(Clone, Debug)]
pub struct Candidate {
    pattern: Pattern,
    support: usize,
}

impl Candidate {
    /// A fresh candidate, support not counted yet.
    pub fn new(pattern: Pattern) -> Self {
        Self {
            pattern,
            support: 0,
        }
    }

    /// A single item seen in one customer sequence.
    pub fn observed(item: Item) -> Self {
        Self {
            pattern: vec![item],
            support: 1,
        }
    }

    pub fn pattern(&self) -> &[Item] {
        &self.pattern
    }

    pub fn support(&self) -> usize {
        self.support
    }

    pub fn increase_support(&mut self) {
        self.support += 1;
    }

    /// Everything but the last item.
    pub fn prefix(&self) -> &[Item] {
        &self.pattern[..self.pattern.len().saturating_sub(1)]
    }

    pub fn last(&self) -> Option<Item> {
        self.pattern.last().copied()
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.pattern.cmp(&other.pattern)
    }
}

/// The candidates of one pattern length, kept sorted by pattern and free of
/// duplicates. Position `i` of [`CandidateSet::iter`] is stable until the set
/// is modified, which lets counting workers tally supports by index.
#[derive(Clone, Debug, Default)]
pub struct CandidateSet {
    candidates: Vec<Candidate>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self {
            candidates: Vec::new(),
        }
    }

    fn position(&self, pattern: &[Item]) -> std::result::Result<usize, usize> {
        self.candidates
            .binary_search_by(|candidate| candidate.pattern[..].cmp(pattern))
    }

    /// Bump the support of `pattern`, inserting it with support 1 if absent.
    pub fn insert_or_bump(&mut self, pattern: &[Item]) {
        match self.position(pattern) {
            Ok(idx) => self.candidates[idx].increase_support(),
            Err(idx) => {
                let mut candidate = Candidate::new(pattern.to_vec());
                candidate.increase_support();
                self.candidates.insert(idx, candidate);
            }
        }
    }

    /// Insert a candidate unless its pattern is already present.
    pub fn insert(&mut self, candidate: Candidate) -> bool {
        match self.position(&candidate.pattern) {
            Ok(_) => false,
            Err(idx) => {
                self.candidates.insert(idx, candidate);
                true
            }
        }
    }

    pub fn contains(&self, pattern: &[Item]) -> bool {
        self.position(pattern).is_ok()
    }

    pub fn get(&self, pattern: &[Item]) -> Option<&Candidate> {
        self.position(pattern).ok().map(|idx| &self.candidates[idx])
    }

    /// Drop every candidate below `min_support`; true if any survive.
    pub fn prune(&mut self, min_support: usize) -> bool {
        self.candidates
            .retain(|candidate| candidate.support >= min_support);
        !self.candidates.is_empty()
    }

    /// Add per-candidate counts gathered against this set's iteration order.
    pub fn add_support(&mut self, tally: &[usize]) {
        debug_assert_eq!(tally.len(), self.candidates.len());
        for (candidate, count) in self.candidates.iter_mut().zip(tally) {
            candidate.support += count;
        }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.candidates.iter()
    }

    pub fn as_slice(&self) -> &[Candidate] {
        &self.candidates
    }
}

/// Two sets are equal when they hold the same patterns with the same supports.
impl PartialEq for CandidateSet {
    fn eq(&self, other: &Self) -> bool {
        self.candidates.len() == other.candidates.len()
            && self
                .candidates
                .iter()
                .zip(&other.candidates)
                .all(|(a, b)| a.pattern == b.pattern && a.support == b.support)
    }
}

impl Eq for CandidateSet {}

impl FromIterator<Candidate> for CandidateSet {
    fn from_iter<I: IntoIterator<Item = Candidate>>(iter: I) -> Self {
        let mut candidates: Vec<Candidate> = iter.into_iter().collect();
        candidates.sort();
        candidates.dedup();
        Self { candidates }
    }
}

impl FromIterator<Pattern> for CandidateSet {
    fn from_iter<I: IntoIterator<Item = Pattern>>(iter: I) -> Self {
        iter.into_iter().map(Candidate::new).collect()
    }
}

impl<'a> IntoIterator for &'a CandidateSet {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}

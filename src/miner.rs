use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::mem;
use std::path::Path;
use std::time::Instant;

use crate::candidate::CandidateSet;
use crate::containment::contains;
use crate::error::{MiningError, Result};
use crate::generate::generate;
use crate::sequence::{CustomerSequence, Item, Pattern, SequenceStore};

/// Knobs of a mining run.
///
/// # Example
/// ```
/// use apriori_all::MiningConfig;
///
/// let config = MiningConfig::new(40).with_threads(2);
/// assert_eq!(config.min_support(10), 4);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiningConfig {
    /// Minimum support as a percentage (0 to 100) of the customer sequences.
    pub min_support_percentage: u8,

    /// Size of a dedicated counting pool. `None` uses rayon's global pool.
    /// Supports never depend on this value.
    pub threads: Option<usize>,

    /// Drop infrequent single items before seeding level 2. Off by default:
    /// level 1 then lists every observed item, frequent or not.
    pub prune_level_one: bool,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            min_support_percentage: 50,
            threads: None,
            prune_level_one: false,
        }
    }
}

impl MiningConfig {
    pub fn new(min_support_percentage: u8) -> Self {
        Self {
            min_support_percentage,
            ..Self::default()
        }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn with_level_one_pruning(mut self, prune_level_one: bool) -> Self {
        self.prune_level_one = prune_level_one;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_support_percentage > 100 {
            return Err(MiningError::InvalidConfig(format!(
                "minimum support must be within 0..=100, got {}",
                self.min_support_percentage
            )));
        }
        if self.threads == Some(0) {
            return Err(MiningError::InvalidConfig(
                "counting needs at least one thread".to_string(),
            ));
        }
        Ok(())
    }

    /// Absolute threshold, `floor(percentage / 100 * sequence_count)`.
    pub fn min_support(&self, sequence_count: usize) -> usize {
        usize::from(self.min_support_percentage) * sequence_count / 100
    }
}

/// Frequent patterns of every length, each level already pruned.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrequentSequences {
    levels: Vec<CandidateSet>,
    min_support: usize,
    min_support_percentage: u8,
}

impl FrequentSequences {
    /// Level of patterns of length `k`, counted from 1.
    pub fn level(&self, k: usize) -> Option<&CandidateSet> {
        k.checked_sub(1).and_then(|idx| self.levels.get(idx))
    }

    /// Non-empty levels in ascending pattern length.
    pub fn levels(&self) -> impl Iterator<Item = (usize, &CandidateSet)> {
        self.levels
            .iter()
            .enumerate()
            .filter(|(_, level)| !level.is_empty())
            .map(|(idx, level)| (idx + 1, level))
    }

    /// Length of the longest frequent pattern, 0 if there is none.
    pub fn max_pattern_len(&self) -> usize {
        self.levels().map(|(k, _)| k).last().unwrap_or(0)
    }

    pub fn pattern_count(&self) -> usize {
        self.levels.iter().map(CandidateSet::len).sum()
    }

    pub fn min_support(&self) -> usize {
        self.min_support
    }

    pub fn min_support_percentage(&self) -> u8 {
        self.min_support_percentage
    }

    /// Every pattern with its support, shortest first, lexicographic within
    /// a length.
    pub fn report(&self) -> impl Iterator<Item = (&[Item], usize)> {
        self.levels
            .iter()
            .flat_map(|level| level.iter())
            .map(|candidate| (candidate.pattern(), candidate.support()))
    }
}

/// The AprioriAll driver: level 1 from item frequencies, level 2 from all
/// ordered item pairs, then count, prune and generate until a generated
/// level comes out empty or patterns reach the longest sequence's length.
///
/// # Example
/// ```
/// use apriori_all::{AprioriAll, MiningConfig, SequenceStore};
///
/// let store = SequenceStore::load("3 3 3\n<{a}{b}{c}>\n<{a}{c}>\n<{b}{c}>\n").unwrap();
/// let frequent = AprioriAll::new(MiningConfig::new(60)).run(&store).unwrap();
///
/// let ac = store.alphabet().pattern(&["a", "c"]).unwrap();
/// assert_eq!(frequent.min_support(), 1);
/// assert_eq!(frequent.level(2).unwrap().get(&ac).unwrap().support(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct AprioriAll {
    config: MiningConfig,
}

impl AprioriAll {
    pub fn new(config: MiningConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MiningConfig {
        &self.config
    }

    pub fn run(&self, store: &SequenceStore) -> Result<FrequentSequences> {
        self.config.validate()?;

        match self.config.threads {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()?;
                Ok(pool.install(|| self.mine(store)))
            }
            None => Ok(self.mine(store)),
        }
    }

    fn mine(&self, store: &SequenceStore) -> FrequentSequences {
        let start = Instant::now();
        let min_support = self.config.min_support(store.len());
        tracing::info!(
            "mining {} customer sequences, minimum support {} ({}%)",
            store.len(),
            min_support,
            self.config.min_support_percentage
        );

        let mut context = MiningContext::new(store, min_support, self.config.prune_level_one);
        let mut stage = Stage::SeedLevelOne;
        while stage != Stage::Done {
            stage = context.step(stage);
        }

        let frequent = FrequentSequences {
            levels: context.levels,
            min_support,
            min_support_percentage: self.config.min_support_percentage,
        };
        tracing::info!(
            "found {} frequent patterns up to length {} in {:?}",
            frequent.pattern_count(),
            frequent.max_pattern_len(),
            start.elapsed()
        );
        frequent
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Stage {
    SeedLevelOne,
    SeedLevelTwo,
    Count(usize),
    Prune(usize),
    Generate(usize),
    Done,
}

/// State of one run: the store being mined, the finished levels and the
/// level currently being counted.
struct MiningContext<'a> {
    store: &'a SequenceStore,
    min_support: usize,
    prune_level_one: bool,
    levels: Vec<CandidateSet>,
    pending: CandidateSet,
}

impl<'a> MiningContext<'a> {
    fn new(store: &'a SequenceStore, min_support: usize, prune_level_one: bool) -> Self {
        Self {
            store,
            min_support,
            prune_level_one,
            levels: Vec::new(),
            pending: CandidateSet::new(),
        }
    }

    /// Threshold of counted levels. A pattern no customer contains is never
    /// kept, even when the percentage floors to 0.
    fn counted_threshold(&self) -> usize {
        self.min_support.max(1)
    }

    fn step(&mut self, stage: Stage) -> Stage {
        match stage {
            Stage::SeedLevelOne => {
                let mut level = seed_level_one(self.store);
                if self.prune_level_one {
                    level.prune(self.min_support);
                }
                tracing::debug!("level 1: {} items", level.len());
                self.levels.push(level);
                Stage::SeedLevelTwo
            }
            Stage::SeedLevelTwo => {
                self.pending = seed_level_two(&self.levels[0]);
                Stage::Count(2)
            }
            Stage::Count(k) => {
                count_support(&mut self.pending, self.store, k);
                Stage::Prune(k)
            }
            Stage::Prune(k) => {
                let counted = self.pending.len();
                self.pending.prune(self.counted_threshold());
                tracing::debug!(
                    "level {}: {} of {} candidates are frequent",
                    k,
                    self.pending.len(),
                    counted
                );
                self.levels.push(mem::take(&mut self.pending));
                Stage::Generate(k)
            }
            // No sequence has room for a pattern longer than its itemset count.
            Stage::Generate(k) if k >= self.store.max_sequence_len() => Stage::Done,
            Stage::Generate(k) => match generate(&self.levels[k - 1]) {
                Some(next) => {
                    self.pending = next;
                    Stage::Count(k + 1)
                }
                None => Stage::Done,
            },
            Stage::Done => Stage::Done,
        }
    }
}

/// Every observed item, its support being the number of customers who
/// bought it at least once.
pub fn seed_level_one(store: &SequenceStore) -> CandidateSet {
    let mut level = CandidateSet::new();
    for sequence in store.sequences() {
        for item in sequence.distinct_items() {
            level.insert_or_bump(&[item]);
        }
    }
    level
}

/// Every ordered pair of distinct level-1 items, support not counted yet.
pub fn seed_level_two(level_one: &CandidateSet) -> CandidateSet {
    let mut pairs: Vec<Pattern> = Vec::with_capacity(level_one.len() * level_one.len());
    for head in level_one {
        for tail in level_one {
            if head != tail {
                pairs.push(head.pattern().iter().chain(tail.pattern()).copied().collect());
            }
        }
    }
    pairs.into_iter().collect()
}

/// Add to each candidate of `level` the number of sequences containing it.
///
/// Only sequences with at least `k` itemsets are scanned. Workers keep a
/// private tally per candidate position; tallies are summed at the end so
/// the result is the same for any number of workers.
pub fn count_support(level: &mut CandidateSet, store: &SequenceStore, k: usize) {
    let sequences: Vec<&CustomerSequence> = store.sequences_of_size_at_least(k).collect();

    let tally = {
        let candidates = level.as_slice();
        sequences
            .par_iter()
            .fold(
                || vec![0usize; candidates.len()],
                |mut tally, sequence| {
                    for (count, candidate) in tally.iter_mut().zip(candidates) {
                        if contains(candidate.pattern(), sequence) {
                            *count += 1;
                        }
                    }
                    tally
                },
            )
            .reduce(
                || vec![0usize; candidates.len()],
                |mut total, partial| {
                    for (count, add) in total.iter_mut().zip(partial) {
                        *count += add;
                    }
                    total
                },
            )
    };

    level.add_support(&tally);
}

/// Mine a database file with default settings and the given minimum support.
pub fn mine<P: AsRef<Path>>(database: P, min_support_percentage: u8) -> Result<FrequentSequences> {
    mine_with_config(database, &MiningConfig::new(min_support_percentage))
}

pub fn mine_with_config<P: AsRef<Path>>(
    database: P,
    config: &MiningConfig,
) -> Result<FrequentSequences> {
    config.validate()?;
    let store = SequenceStore::read(database)?;
    AprioriAll::new(config.clone()).run(&store)
}

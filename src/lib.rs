//! AprioriAll: level-wise mining of frequent sequential patterns over a
//! database of customer sequences.
//!
//! Ref: Agrawal R., Srikant R. "Mining Sequential Patterns", ICDE 1995.
//!
//! # Example:
//! ```rust
//! use apriori_all::{AprioriAll, MiningConfig, Report, SequenceStore};
//!
//! const DATA: &str = "5 4 5
//! <{1,5}{2}{3}{4}>
//! <{1}{3}{4}{3,5}>
//! <{1}{2}{3}{4}>
//! <{1}{3}{5}>
//! <{4}{5}>
//! ";
//!
//! let store = SequenceStore::load(DATA).unwrap();
//! let frequent = AprioriAll::new(MiningConfig::new(50)).run(&store).unwrap();
//!
//! assert_eq!(frequent.max_pattern_len(), 4);
//! assert!(Report::new(&store, &frequent).to_string().ends_with("[4] 1234(2)\n"));
//! ```

mod candidate;
mod containment;
mod error;
mod generate;
mod miner;
mod report;
mod sequence;

pub use candidate::{Candidate, CandidateSet};
pub use containment::contains;
pub use error::{MiningError, Result};
pub use generate::{generate, join};
pub use miner::{
    count_support, mine, mine_with_config, seed_level_one, seed_level_two, AprioriAll,
    FrequentSequences, MiningConfig,
};
pub use report::Report;
pub use sequence::{Alphabet, CustomerSequence, Header, Item, Itemset, Pattern, SequenceStore};

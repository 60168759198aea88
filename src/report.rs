use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{MiningError, Result};
use crate::miner::FrequentSequences;
use crate::sequence::SequenceStore;

/// Plain-text summary of a run:
///
/// ```text
/// Maximum size of a large sequence : 4
/// Number of customer sequence : 5
/// Number of different item : 5
/// Minimum support : 2 (50%)
/// [1] 1(4) 2(2) 3(4) 4(4) 5(4)
/// [2] 12(2) 13(4) ...
/// ```
///
/// The first three counts are the ones declared by the database header.
pub struct Report<'a> {
    store: &'a SequenceStore,
    frequent: &'a FrequentSequences,
}

impl<'a> Report<'a> {
    pub fn new(store: &'a SequenceStore, frequent: &'a FrequentSequences) -> Self {
        Self { store, frequent }
    }

    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_string()).map_err(|source| MiningError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl<'a> fmt::Display for Report<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let header = self.store.header();
        writeln!(f, "Maximum size of a large sequence : {}", header.max_itemsets)?;
        writeln!(f, "Number of customer sequence : {}", self.store.len())?;
        writeln!(f, "Number of different item : {}", header.distinct_items)?;
        writeln!(
            f,
            "Minimum support : {} ({}%)",
            self.frequent.min_support(),
            self.frequent.min_support_percentage()
        )?;

        let alphabet = self.store.alphabet();
        for (k, level) in self.frequent.levels() {
            write!(f, "[{}]", k)?;
            for candidate in level {
                write!(
                    f,
                    " {}({})",
                    alphabet.render(candidate.pattern()),
                    candidate.support()
                )?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Report;
    use crate::miner::{AprioriAll, MiningConfig};
    use crate::sequence::SequenceStore;

    #[test]
    fn test_report_layout() {
        let store = SequenceStore::load("3 3 3\n<{a}{b}{c}>\n<{a}{c}>\n<{b}{c}>\n").unwrap();
        let frequent = AprioriAll::new(MiningConfig::new(100)).run(&store).unwrap();

        assert_eq!(
            Report::new(&store, &frequent).to_string(),
            "Maximum size of a large sequence : 3\n\
             Number of customer sequence : 3\n\
             Number of different item : 3\n\
             Minimum support : 3 (100%)\n\
             [1] a(2) b(2) c(3)\n"
        );
    }

    #[test]
    fn test_report_multichar_items() {
        let store =
            SequenceStore::load("2 2 2\n<{bread}{milk}>\n<{bread,milk}{milk}>\n").unwrap();
        let frequent = AprioriAll::new(MiningConfig::new(100)).run(&store).unwrap();
        let report = Report::new(&store, &frequent).to_string();

        assert!(report.ends_with("[1] bread(2) milk(2)\n[2] bread,milk(2)\n"));
    }

    #[test]
    fn test_write_to_file() {
        let store = SequenceStore::load("1 1 1\n<{a}>\n").unwrap();
        let frequent = AprioriAll::new(MiningConfig::new(100)).run(&store).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");

        Report::new(&store, &frequent).write_to(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.ends_with("Minimum support : 1 (100%)\n[1] a(1)\n"));
    }
}

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MiningError>;

/// Everything that can stop a mining run. Mining itself is total once the
/// database has been validated, so every variant surfaces before the first
/// level is counted.
#[derive(Error, Debug)]
pub enum MiningError {
    #[error("cannot read database '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("line {line_number}: {reason}: {line:?}")]
    Parse {
        line_number: usize,
        line: String,
        reason: String,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("cannot build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl MiningError {
    pub(crate) fn parse(line_number: usize, line: &str, reason: impl Into<String>) -> Self {
        MiningError::Parse {
            line_number,
            line: line.to_string(),
            reason: reason.into(),
        }
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, MiningError::Parse { .. })
    }
}

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by loading and aggregation. Unmatched lines are not
/// errors and never show up here.
#[derive(Debug, Error)]
pub enum ActivityError {
    #[error("failed to read log file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("log file '{}' is not valid UTF-8 text (first bad byte at offset {offset})", .path.display())]
    Encoding { path: PathBuf, offset: usize },
    #[error("no records: the log contains no message lines")]
    NoRecords,
    #[error("no messages were counted, refusing to normalize by a zero maximum")]
    ZeroMaximum,
    #[error("invalid time range {start}..={end}")]
    InvalidRange { start: i64, end: i64 },
}

pub type Result<T> = std::result::Result<T, ActivityError>;

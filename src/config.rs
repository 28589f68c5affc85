use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::error::{ActivityError, Result};
use crate::histogram::Histogram;

/// Structure exported when `--output` is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Emit {
    Histogram,
    Arrays,
    Matrix,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Turn irssi chat logs into activity histograms and matrices", long_about = None)]
pub struct RunConfig {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// `stdout` or a .json/.jsonl/.csv/.tsv path. Nothing is exported when absent.
    #[arg(short, long)]
    pub output: Option<String>,

    #[arg(long, value_enum, default_value = "matrix")]
    pub emit: Emit,

    /// First timestamp of the user-id arrays (defaults to the earliest message).
    #[arg(long, allow_negative_numbers = true)]
    pub from: Option<i64>,

    /// Last timestamp of the user-id arrays (defaults to the latest message).
    #[arg(long, allow_negative_numbers = true)]
    pub to: Option<i64>,

    #[arg(long)]
    pub benchmark: bool,

    #[arg(long)]
    pub log_json: bool,
}

impl RunConfig {
    /// Inclusive range for the user-id arrays, falling back to the
    /// histogram's own bounds.
    pub fn array_range(&self, histogram: &Histogram) -> Result<(i64, i64)> {
        let bounds = histogram.time_range();
        let start = self
            .from
            .or(bounds.map(|(lo, _)| lo))
            .ok_or(ActivityError::NoRecords)?;
        let end = self
            .to
            .or(bounds.map(|(_, hi)| hi))
            .ok_or(ActivityError::NoRecords)?;
        if start > end {
            return Err(ActivityError::InvalidRange { start, end });
        }
        Ok((start, end))
    }
}

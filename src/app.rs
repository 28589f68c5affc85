use anyhow::{Context, Result};
use std::io::Write;

use crate::activity::{activity_matrix, user_arrays_with};
use crate::config::{Emit, RunConfig};
use crate::histogram::Histogram;
use crate::ids::assign_from_sequence;
use crate::loader::load_with_stats;
use crate::output::{self, Sheet};

/// Counters from one run, reported by `--benchmark`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub bytes: u64,
    pub total_lines: usize,
    pub records: usize,
    pub timestamps: usize,
    pub users: usize,
}

/// Loads the log named by `config`, prints the diagnostics to `out` and
/// exports the selected structure when an output target is set.
pub fn run(config: &RunConfig, out: &mut dyn Write) -> Result<RunStats> {
    let loaded = load_with_stats(&config.file)
        .with_context(|| format!("loading {}", config.file.display()))?;

    let histogram = Histogram::build(&loaded.records);
    writeln!(out, "loaded {} entries", histogram.len())?;

    let mut users = assign_from_sequence(&loaded.records);

    if let Some(target) = &config.output {
        let sheet = match config.emit {
            Emit::Histogram => Sheet::from_histogram(&histogram),
            Emit::Arrays => {
                let (from, to) = config.array_range(&histogram)?;
                Sheet::from_arrays(&user_arrays_with(&histogram, from, to, &mut users)?)
            }
            Emit::Matrix => {
                let matrix = activity_matrix(&loaded.records, Some(&mut users))
                    .context("building activity matrix")?;
                writeln!(out, "max_msgs {}", matrix.max_count())?;
                Sheet::from_matrix(&matrix, &users)
            }
        };
        output::write(target, out, &sheet).with_context(|| format!("writing {target}"))?;
    }

    Ok(RunStats {
        bytes: loaded.bytes,
        total_lines: loaded.total_lines,
        records: loaded.records.len(),
        timestamps: histogram.len(),
        users: users.size(),
    })
}

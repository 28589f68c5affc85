use serde::Serialize;
use tracing::info;

use crate::error::{ActivityError, Result};
use crate::histogram::Histogram;
use crate::ids::{IdMapper, assign_from_sequence};
use crate::normalizer::normalize;
use crate::record::Record;

/// Per-timestamp user ids. Rows vary in length and are never padded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserArrays {
    t_min: i64,
    rows: Vec<Vec<usize>>,
}

impl UserArrays {
    pub fn t_min(&self) -> i64 {
        self.t_min
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<usize>] {
        &self.rows
    }

    /// User ids at `time`, or `None` outside the built range.
    pub fn row(&self, time: i64) -> Option<&[usize]> {
        let idx = usize::try_from(time.checked_sub(self.t_min)?).ok()?;
        self.rows.get(idx).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, &[usize])> {
        (self.t_min..).zip(self.rows.iter().map(Vec::as_slice))
    }
}

/// Builds one row per timestamp in `t_min..=t_max` with ids from a mapper
/// created for this call.
///
/// Ids follow bucket iteration order across the range and do not match ids
/// from [`assign_from_sequence`]; use [`user_arrays_with`] when they must.
pub fn user_arrays(histogram: &Histogram, t_min: i64, t_max: i64) -> Result<UserArrays> {
    let mut mapper = IdMapper::new();
    user_arrays_with(histogram, t_min, t_max, &mut mapper)
}

pub fn user_arrays_with(
    histogram: &Histogram,
    t_min: i64,
    t_max: i64,
    mapper: &mut IdMapper<String>,
) -> Result<UserArrays> {
    let mut rows: Vec<Vec<usize>> = Vec::new();
    rows.try_reserve_exact(span(t_min, t_max)?)
        .map_err(|_| ActivityError::InvalidRange {
            start: t_min,
            end: t_max,
        })?;
    for t in t_min..=t_max {
        let row: Vec<usize> = histogram
            .bucket(t)
            .iter()
            .map(|r| mapper.lookup_or_assign(&r.user))
            .collect();
        rows.push(row);
    }

    Ok(UserArrays { t_min, rows })
}

/// Dense time x user matrix of message counts scaled into `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityMatrix {
    t_min: i64,
    rows: usize,
    cols: usize,
    max_count: u32,
    cells: Vec<f64>,
}

impl ActivityMatrix {
    /// `(rows, cols)`: one row per timestamp, one column per user id.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn t_min(&self) -> i64 {
        self.t_min
    }

    pub fn t_max(&self) -> i64 {
        self.t_min + self.rows as i64 - 1
    }

    /// Largest raw count before normalization.
    pub fn max_count(&self) -> u32 {
        self.max_count
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells.get(row * self.cols + col).copied()
    }

    /// Raw message count recovered from the normalized cell.
    pub fn raw_count(&self, row: usize, col: usize) -> Option<u32> {
        self.get(row, col)
            .map(|v| (v * f64::from(self.max_count)).round() as u32)
    }

    pub fn row(&self, row: usize) -> Option<&[f64]> {
        if row >= self.rows {
            return None;
        }
        let start = row * self.cols;
        Some(&self.cells[start..start + self.cols])
    }

    pub fn cells(&self) -> &[f64] {
        &self.cells
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = (i64, &[f64])> {
        let cols = self.cols.max(1);
        (self.t_min..).zip(self.cells.chunks(cols))
    }
}

/// Counts messages per (time, user) and normalizes by the densest cell.
///
/// Users missing from `mapper` are assigned before the column count is fixed.
/// Without a mapper one is built from `records` in order.
pub fn activity_matrix(
    records: &[Record],
    mapper: Option<&mut IdMapper<String>>,
) -> Result<ActivityMatrix> {
    let (t_min, t_max) = time_bounds(records)?;

    let mut owned;
    let mapper = match mapper {
        Some(m) => {
            for r in records {
                m.lookup_or_assign(&r.user);
            }
            m
        }
        None => {
            owned = assign_from_sequence(records);
            &mut owned
        }
    };

    let rows = span(t_min, t_max)?;
    let cols = mapper.size();
    let too_large = || ActivityError::InvalidRange {
        start: t_min,
        end: t_max,
    };
    // the normalized f64 cells are the larger of the two buffers
    let len = rows
        .checked_mul(cols)
        .filter(|len| {
            len.checked_mul(size_of::<f64>())
                .is_some_and(|b| b <= isize::MAX as usize)
        })
        .ok_or_else(too_large)?;

    let mut counts: Vec<u32> = Vec::new();
    counts.try_reserve_exact(len).map_err(|_| too_large())?;
    counts.resize(len, 0);
    let mut max_count = 0u32;
    for r in records {
        let row = (r.time - t_min) as usize;
        let col = mapper.lookup_or_assign(&r.user);
        let cell = &mut counts[row * cols + col];
        *cell += 1;
        max_count = max_count.max(*cell);
    }

    let cells = normalize(&counts, max_count)?;
    info!(rows, cols, max_msgs = max_count, "built activity matrix");

    Ok(ActivityMatrix {
        t_min,
        rows,
        cols,
        max_count,
        cells,
    })
}

fn time_bounds(records: &[Record]) -> Result<(i64, i64)> {
    let first = records.first().ok_or(ActivityError::NoRecords)?.time;
    Ok(records
        .iter()
        .fold((first, first), |(lo, hi), r| (lo.min(r.time), hi.max(r.time))))
}

/// Number of integer timestamps in `start..=end`.
fn span(start: i64, end: i64) -> Result<usize> {
    end.checked_sub(start)
        .filter(|d| *d >= 0)
        .and_then(|d| usize::try_from(d).ok())
        .and_then(|d| d.checked_add(1))
        .ok_or(ActivityError::InvalidRange { start, end })
}

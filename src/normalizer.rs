use crate::error::{ActivityError, Result};

/// Scales raw counts by their observed maximum so the densest cell is 1.0.
///
/// Tied maxima all map to 1.0. A zero maximum means nothing was counted and
/// is rejected instead of producing NaN cells.
pub fn normalize(counts: &[u32], max_count: u32) -> Result<Vec<f64>> {
    if max_count == 0 {
        return Err(ActivityError::ZeroMaximum);
    }
    let max = f64::from(max_count);
    Ok(counts.iter().map(|&c| f64::from(c) / max).collect())
}

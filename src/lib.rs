//! Converts irssi-style chat logs into time-indexed activity data: a histogram
//! of messages per timestamp, ragged per-timestamp user-id arrays and a dense
//! normalized time x user matrix.

pub mod activity;
pub mod app;
pub mod config;
pub mod error;
pub mod histogram;
pub mod ids;
pub mod loader;
pub mod logging;
pub mod normalizer;
pub mod output;
pub mod parsers;
pub mod record;

pub use activity::{ActivityMatrix, UserArrays, activity_matrix, user_arrays, user_arrays_with};
pub use error::ActivityError;
pub use histogram::{Histogram, histogram};
pub use ids::{IdMapper, assign_from_sequence};
pub use loader::{LoadedLog, load, load_with_stats};
pub use record::Record;

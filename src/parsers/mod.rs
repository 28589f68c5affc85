pub mod irssi;

pub use irssi::{parse_line, parse_log};

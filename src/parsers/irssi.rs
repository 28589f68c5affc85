use memchr::memchr_iter;
use regex::Regex;
use std::sync::LazyLock;

use crate::record::Record;

// "<digits>"<<marker><nick>> <text>, anchored on both ends. Nicks are ASCII
// word characters only, not Unicode `\w`.
static MESSAGE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^"([0-9]+)"<.([A-Za-z0-9_]+)> (.*)$"#).expect("message line pattern is valid")
});

const MIN_LINE_LEN: usize = 8; // `"0"<@a> `

/// Parses a single log line (without its newline).
///
/// Returns `None` for anything that is not a message line: blank lines,
/// join/part notices, topic changes, timestamps that overflow `i64`.
pub fn parse_line(line: &str) -> Option<Record> {
    if line.len() < MIN_LINE_LEN {
        return None;
    }
    let caps = MESSAGE_LINE.captures(line)?;
    let time = caps[1].parse::<i64>().ok()?;

    Some(Record {
        time,
        user: caps[2].to_string(),
        text: caps[3].to_string(),
    })
}

/// Applies [`parse_line`] to every newline-delimited line of `input`, keeping
/// matches in input order. A `\r` before the newline is dropped.
///
/// A final line without a trailing newline is still parsed, unlike irssi
/// loaders that require the `\n` and so drop a log cut off mid-write.
pub fn parse_log(input: &str) -> Vec<Record> {
    let mut out = Vec::with_capacity(input.len() / 60);
    for_each_line(input, |line| {
        if let Some(record) = parse_line(line) {
            out.push(record);
        }
    });
    out
}

/// Calls `f` for every line of `input`, including a final unterminated one.
pub(crate) fn for_each_line<'a>(input: &'a str, mut f: impl FnMut(&'a str)) -> usize {
    let mut start = 0;
    let mut lines = 0;
    for nl in memchr_iter(b'\n', input.as_bytes()) {
        f(strip_cr(&input[start..nl]));
        lines += 1;
        start = nl + 1;
    }
    if start < input.len() {
        f(strip_cr(&input[start..]));
        lines += 1;
    }
    lines
}

fn strip_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

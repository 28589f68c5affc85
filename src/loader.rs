use memmap2::Mmap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::error::{ActivityError, Result};
use crate::parsers::irssi::{for_each_line, parse_line};
use crate::record::Record;

/// Records from one log file plus the counters `--benchmark` reports.
#[derive(Debug, Default)]
pub struct LoadedLog {
    pub records: Vec<Record>,
    pub total_lines: usize,
    pub bytes: u64,
}

/// Reads `path` and returns its message records in file order.
pub fn load(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    load_with_stats(path).map(|loaded| loaded.records)
}

pub fn load_with_stats(path: impl AsRef<Path>) -> Result<LoadedLog> {
    let path = path.as_ref();
    let read_err = |source: std::io::Error| ActivityError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(read_err)?;
    let metadata = file.metadata().map_err(read_err)?;

    // pipes, process substitution and /proc files report a zero length
    if !metadata.is_file() {
        let mut buf = Vec::new();
        file.read_to_end(&mut buf).map_err(read_err)?;
        let bytes = buf.len() as u64;
        return parse_bytes(path, &buf, bytes);
    }

    let bytes = metadata.len();
    if bytes == 0 {
        debug!(path = %path.display(), "empty log file");
        return Ok(LoadedLog::default());
    }

    // mmap the file; the mapping and the handle are dropped on every return
    let mmap = unsafe { Mmap::map(&file) }.map_err(read_err)?;
    parse_bytes(path, &mmap, bytes)
}

fn parse_bytes(path: &Path, raw: &[u8], bytes: u64) -> Result<LoadedLog> {
    let text = std::str::from_utf8(raw).map_err(|e| ActivityError::Encoding {
        path: path.to_path_buf(),
        offset: e.valid_up_to(),
    })?;

    let mut records = Vec::with_capacity(text.len() / 60);
    let total_lines = for_each_line(text, |line| {
        if let Some(record) = parse_line(line) {
            records.push(record);
        }
    });

    debug!(
        path = %path.display(),
        total_lines,
        records = records.len(),
        skipped = total_lines - records.len(),
        "loaded log"
    );

    Ok(LoadedLog {
        records,
        total_lines,
        bytes,
    })
}

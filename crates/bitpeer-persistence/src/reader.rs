//! JSON Lines reader.

use crate::error::PersistenceResult;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::warn;

/// Read every decodable record from a `.jsonl` file.
///
/// Blank lines are ignored; lines that fail to decode are logged and
/// skipped so one corrupt write never hides the rest of the file.
pub fn read_jsonl<R: DeserializeOwned>(path: impl AsRef<Path>) -> PersistenceResult<Vec<R>> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str(line) {
            Ok(record) => records.push(record),
            Err(e) => warn!(
                path = %path.display(),
                line = index + 1,
                error = %e,
                "Skipping unreadable JSON line"
            ),
        }
    }

    Ok(records)
}

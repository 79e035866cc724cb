//! Raw fetch record store: `{data_dir}/raw/{day}/{market}.jsonl`.

use crate::error::PersistenceResult;
use crate::reader::read_jsonl;
use crate::writer::Timestamped;
use bitpeer_feed::RawFetchRecord;
use chrono::{DateTime, Utc};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

impl Timestamped for RawFetchRecord {
    fn timestamp(&self) -> DateTime<Utc> {
        self.ts_utc
    }
}

#[derive(Debug, Clone)]
pub struct RawStore {
    data_dir: PathBuf,
}

impl RawStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    pub fn day_dir(&self, day: &str) -> PathBuf {
        self.data_dir.join("raw").join(day)
    }

    /// Append one record to its market's file for the record's day.
    pub fn append(&self, record: &RawFetchRecord) -> PersistenceResult<PathBuf> {
        let dir = self.day_dir(&record.day());
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{}.jsonl", record.market));

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(file, "{}", serde_json::to_string(record)?)?;

        Ok(path)
    }

    /// All records of `day`, market files in name order, lines in file order.
    ///
    /// A missing day directory yields no records. Unreadable files and lines
    /// are logged and skipped.
    pub fn read_day(&self, day: &str) -> PersistenceResult<Vec<RawFetchRecord>> {
        let dir = self.day_dir(day);
        if !dir.exists() {
            debug!(dir = %dir.display(), "No raw data for day");
            return Ok(Vec::new());
        }

        let mut files: Vec<PathBuf> = std::fs::read_dir(&dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "jsonl"))
            .collect();
        files.sort();

        let mut records = Vec::new();
        for path in files {
            match read_jsonl::<RawFetchRecord>(&path) {
                Ok(mut batch) => records.append(&mut batch),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable raw file"),
            }
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitpeer_core::OfferSide;
    use tempfile::TempDir;

    fn record(market: &str, ts: &str) -> RawFetchRecord {
        serde_json::from_value(serde_json::json!({
            "ts_utc": ts,
            "market": market,
            "fiat": "RUB",
            "side": "SELL",
            "page": 1,
            "http_status": 200,
            "response_text": "{}"
        }))
        .unwrap()
    }

    #[test]
    fn test_append_and_read_day() {
        let temp_dir = TempDir::new().unwrap();
        let store = RawStore::new(temp_dir.path());

        let path = store.append(&record("rub_sell", "2024-05-01T10:00:00Z")).unwrap();
        store.append(&record("rub_sell", "2024-05-01T10:00:30Z")).unwrap();
        store.append(&record("a_market", "2024-05-01T10:00:00Z")).unwrap();
        store.append(&record("rub_sell", "2024-05-02T00:00:01Z")).unwrap();

        assert!(path.ends_with("raw/2024-05-01/rub_sell.jsonl"));

        let day = store.read_day("2024-05-01").unwrap();
        assert_eq!(day.len(), 3);
        assert_eq!(day[0].market, "a_market");
        assert_eq!(day[1].side, OfferSide::Sell);
    }

    #[test]
    fn test_missing_day_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = RawStore::new(temp_dir.path());
        assert!(store.read_day("2030-01-01").unwrap().is_empty());
    }
}

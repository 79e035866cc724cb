//! JSON Lines file writer for any timestamped record.
//!
//! Uses JSON Lines format (.jsonl) for robustness:
//! - Each line is a complete JSON object
//! - Partial file corruption only affects individual lines
//! - Can be read even if write was interrupted

use crate::error::PersistenceResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Records that know which day file they belong to.
pub trait Timestamped {
    fn timestamp(&self) -> DateTime<Utc>;

    /// UTC day key, `YYYY-MM-DD`.
    fn day(&self) -> String {
        self.timestamp().format("%Y-%m-%d").to_string()
    }
}

/// Active writer state for one day file.
struct ActiveWriter {
    writer: BufWriter<File>,
    date: String,
    records_written: usize,
}

/// Buffered append-only writer producing `{dir}/{prefix}_{day}.jsonl`.
///
/// Files rotate on the record's own timestamp, not the wall clock.
pub struct JsonLinesWriter<R: Serialize + Timestamped> {
    base_dir: PathBuf,
    prefix: String,
    buffer: Vec<R>,
    max_buffer_size: usize,
    active_writer: Option<ActiveWriter>,
}

impl<R: Serialize + Timestamped> JsonLinesWriter<R> {
    pub fn new(
        base_dir: impl AsRef<Path>,
        prefix: &str,
        max_buffer_size: usize,
    ) -> PersistenceResult<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_dir)?;

        Ok(Self {
            base_dir,
            prefix: prefix.to_string(),
            buffer: Vec::with_capacity(max_buffer_size),
            max_buffer_size: max_buffer_size.max(1),
            active_writer: None,
        })
    }

    /// File a record of `day` is written to.
    pub fn path_for(&self, day: &str) -> PathBuf {
        self.base_dir.join(format!("{}_{}.jsonl", self.prefix, day))
    }

    /// Add a record to the buffer, flushing when full.
    pub fn add_record(&mut self, record: R) -> PersistenceResult<()> {
        self.buffer.push(record);

        if self.buffer.len() >= self.max_buffer_size {
            self.flush()?;
        }

        Ok(())
    }

    fn close_active_writer(&mut self) -> PersistenceResult<()> {
        if let Some(mut active) = self.active_writer.take() {
            active.writer.flush()?;
            info!(
                prefix = %self.prefix,
                date = %active.date,
                records = active.records_written,
                "Closed JSON Lines writer"
            );
        }
        Ok(())
    }

    fn open_writer(&mut self, date: &str) -> PersistenceResult<()> {
        let path = self.path_for(date);

        debug!(path = %path.display(), "Opening JSON Lines writer (append mode)");

        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        self.active_writer = Some(ActiveWriter {
            writer: BufWriter::new(file),
            date: date.to_string(),
            records_written: 0,
        });

        Ok(())
    }

    /// Flush buffered records to their day files.
    pub fn flush(&mut self) -> PersistenceResult<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let records = std::mem::take(&mut self.buffer);
        let record_count = records.len();

        for record in &records {
            let date = record.day();

            let needs_rotation = self
                .active_writer
                .as_ref()
                .map_or(true, |w| w.date != date);
            if needs_rotation {
                self.close_active_writer()?;
                self.open_writer(&date)?;
            }

            let line = serde_json::to_string(record)?;
            if let Some(active) = self.active_writer.as_mut() {
                writeln!(active.writer, "{}", line)?;
                active.records_written += 1;
            }
        }

        if let Some(active) = self.active_writer.as_mut() {
            active.writer.flush()?;
        }

        debug!(prefix = %self.prefix, records = record_count, "Flushed records to JSON Lines");

        self.buffer = records;
        self.buffer.clear();

        Ok(())
    }

    /// Close the writer, flushing any pending data.
    pub fn close(&mut self) -> PersistenceResult<()> {
        self.flush()?;
        self.close_active_writer()
    }
}

impl<R: Serialize + Timestamped> Drop for JsonLinesWriter<R> {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!(?e, "Failed to flush buffer on drop");
        }
        if let Err(e) = self.close_active_writer() {
            warn!(?e, "Failed to close writer on drop");
        }
    }
}

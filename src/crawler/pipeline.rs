//! Chunked object ingestion
//!
//! Reads object ids line by line, groups them into batches of `chunk_size`
//! and runs one `exists -> extract -> store` pipeline per id concurrently.
//! A batch must settle completely before the next one starts, which bounds
//! concurrent fan-out to `chunk_size` while the input may be arbitrarily long.
//!
//! ```text
//!  ids file ──▶ [batch 1: id id id] ──▶ [batch 2: id id id] ──▶ [batch 3: id]
//!                    │  │  │
//!                    ▼  ▼  ▼   concurrently
//!              exists? ─ yes ─▶ skip
//!                 │ no
//!                 ▼
//!              extract ─ no phone numbers ─▶ skip
//!                 │
//!                 ▼
//!              store (one transaction)
//! ```
//!
//! The first failing pipeline aborts its batch and the whole run.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::crawler::object::ObjectExtractor;
use crate::error::{Error, Result};
use crate::models::{ObjectId, ObjectRecord};
use crate::storage::ObjectRepository;
use crate::utils::object_url;

// ============================================================================
// Source
// ============================================================================

/// Producer of object records for the scheduler
#[async_trait]
pub trait ObjectSource: Send + Sync {
    /// Fetch and extract one object; `None` means "no record"
    async fn extract(&self, id: &ObjectId, url: &str) -> Result<Option<ObjectRecord>>;
}

#[async_trait]
impl ObjectSource for ObjectExtractor {
    async fn extract(&self, id: &ObjectId, url: &str) -> Result<Option<ObjectRecord>> {
        ObjectExtractor::extract(self, id, url).await
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Result of one object pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectOutcome {
    /// Extracted and written to the store
    Stored,
    /// Present in the store already; not fetched
    AlreadyStored,
    /// Fetched but without phone numbers; not written
    NoPhoneNumbers,
}

/// Summary of one ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestionStats {
    /// Size of every processed batch, in input order
    pub batch_sizes: Vec<usize>,

    /// Objects written to the store
    pub stored: usize,

    /// Objects skipped because they were stored already
    pub skipped_existing: usize,

    /// Objects skipped because they had no phone numbers
    pub skipped_without_phone_numbers: usize,
}

impl IngestionStats {
    /// Number of processed batches
    pub fn batches(&self) -> usize {
        self.batch_sizes.len()
    }

    /// Number of processed object ids
    pub fn processed(&self) -> usize {
        self.batch_sizes.iter().sum()
    }

    fn record(&mut self, outcome: ObjectOutcome) {
        match outcome {
            ObjectOutcome::Stored => self.stored += 1,
            ObjectOutcome::AlreadyStored => self.skipped_existing += 1,
            ObjectOutcome::NoPhoneNumbers => self.skipped_without_phone_numbers += 1,
        }
    }
}

// ============================================================================
// Scheduler
// ============================================================================

/// Batch-wise, bounded-concurrency ingestion of object ids
pub struct IngestionScheduler {
    source: Arc<dyn ObjectSource>,
    repository: Arc<dyn ObjectRepository>,
    base_url: String,
    chunk_size: usize,
}

impl IngestionScheduler {
    /// Create a scheduler
    ///
    /// # Arguments
    ///
    /// * `source` - Extractor producing records for ids missing from the store
    /// * `repository` - Store used for dedup checks and writes
    /// * `base_url` - Detail pages live at `<base_url>/<id>/`
    /// * `chunk_size` - Number of ids processed concurrently per batch
    ///
    /// # Errors
    ///
    /// Returns a config error when `chunk_size` is zero.
    pub fn new(
        source: Arc<dyn ObjectSource>,
        repository: Arc<dyn ObjectRepository>,
        base_url: impl Into<String>,
        chunk_size: usize,
    ) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::config("chunk_size must be greater than 0"));
        }

        Ok(Self {
            source,
            repository,
            base_url: base_url.into(),
            chunk_size,
        })
    }

    /// Ingest the ids listed in a file
    pub async fn run_file(&self, path: impl AsRef<Path>) -> Result<IngestionStats> {
        let path = path.as_ref();
        let file = File::open(path).await.map_err(|e| {
            Error::with_source(format!("Failed to open input file {}", path.display()), e)
        })?;

        self.run(BufReader::new(file)).await
    }

    /// Ingest ids read line by line from `reader`
    ///
    /// Blank lines are skipped. The final batch may be shorter than
    /// `chunk_size`.
    pub async fn run<R>(&self, reader: R) -> Result<IngestionStats>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        let mut batch = Vec::with_capacity(self.chunk_size);
        let mut stats = IngestionStats::default();

        while let Some(line) = lines.next_line().await? {
            let id = line.trim();
            if id.is_empty() {
                continue;
            }

            batch.push(ObjectId::new(id));
            if batch.len() == self.chunk_size {
                let full = std::mem::replace(&mut batch, Vec::with_capacity(self.chunk_size));
                self.process_batch(full, &mut stats).await?;
            }
        }

        if !batch.is_empty() {
            self.process_batch(batch, &mut stats).await?;
        }

        tracing::debug!(
            batches = stats.batches(),
            processed = stats.processed(),
            stored = stats.stored,
            skipped_existing = stats.skipped_existing,
            skipped_without_phone_numbers = stats.skipped_without_phone_numbers,
            "Ingestion finished"
        );

        Ok(stats)
    }

    async fn process_batch(&self, batch: Vec<ObjectId>, stats: &mut IngestionStats) -> Result<()> {
        tracing::debug!(
            batch = stats.batches() + 1,
            size = batch.len(),
            "Processing batch"
        );

        let outcomes = try_join_all(batch.iter().map(|id| self.process_object(id))).await?;

        stats.batch_sizes.push(batch.len());
        for outcome in outcomes {
            stats.record(outcome);
        }

        Ok(())
    }

    async fn process_object(&self, id: &ObjectId) -> Result<ObjectOutcome> {
        if self.repository.exists(id).await? {
            tracing::debug!(object_id = %id, "Object already stored; skipping");
            return Ok(ObjectOutcome::AlreadyStored);
        }

        let url = object_url(&self.base_url, id.as_str());
        let Some(record) = self.source.extract(id, &url).await? else {
            return Ok(ObjectOutcome::NoPhoneNumbers);
        };

        if self.repository.store(&record).await? {
            tracing::debug!(
                object_id = %id,
                phone_numbers = record.phone_numbers.len(),
                "Stored object"
            );
            Ok(ObjectOutcome::Stored)
        } else {
            Ok(ObjectOutcome::AlreadyStored)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteObjectRepository;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Source that records call order and concurrency
    #[derive(Default)]
    struct RecordingSource {
        calls: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    #[async_trait]
    impl ObjectSource for RecordingSource {
        async fn extract(&self, id: &ObjectId, url: &str) -> Result<Option<ObjectRecord>> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            self.calls.lock().unwrap().push(id.to_string());

            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if id.as_str().ends_with('0') {
                return Ok(None);
            }

            Ok(Some(ObjectRecord {
                id: id.clone(),
                url: url.to_string(),
                name: format!("Object {id}"),
                region: String::new(),
                coordinates: None,
                contact_name: String::new(),
                phone_numbers: vec!["+43 1".to_string()],
            }))
        }
    }

    fn scheduler(source: Arc<RecordingSource>, chunk_size: usize) -> IngestionScheduler {
        let repository = Arc::new(SqliteObjectRepository::in_memory().unwrap());
        IngestionScheduler::new(source, repository, "https://example.com/o", chunk_size).unwrap()
    }

    #[tokio::test]
    async fn test_batches_partition_input() {
        let source = Arc::new(RecordingSource::default());
        let scheduler = scheduler(source.clone(), 2);

        let stats = scheduler.run("1\n2\n3\n4\n5\n".as_bytes()).await.unwrap();

        assert_eq!(stats.batch_sizes, vec![2, 2, 1]);
        assert_eq!(stats.processed(), 5);
        assert_eq!(stats.stored, 5);
        assert!(source.max_in_flight.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_blank_lines_and_crlf_are_tolerated() {
        let source = Arc::new(RecordingSource::default());
        let scheduler = scheduler(source.clone(), 10);

        let stats = scheduler.run("7\r\n\n8\r\n\n".as_bytes()).await.unwrap();

        assert_eq!(stats.batch_sizes, vec![2]);
        let mut calls = source.calls.lock().unwrap().clone();
        calls.sort();
        assert_eq!(calls, vec!["7", "8"]);
    }

    #[tokio::test]
    async fn test_records_without_phone_numbers_are_skipped() {
        let source = Arc::new(RecordingSource::default());
        let scheduler = scheduler(source, 3);

        let stats = scheduler.run("10\n11\n20\n".as_bytes()).await.unwrap();

        assert_eq!(stats.stored, 1);
        assert_eq!(stats.skipped_without_phone_numbers, 2);
    }

    #[tokio::test]
    async fn test_batches_run_in_input_order() {
        let source = Arc::new(RecordingSource::default());
        let scheduler = scheduler(source.clone(), 2);

        scheduler.run("1\n2\n3\n4\n5\n".as_bytes()).await.unwrap();

        let calls = source.calls.lock().unwrap().clone();
        let batch_of = |id: &str| calls.iter().position(|c| c == id).unwrap() / 2;
        assert_eq!(batch_of("1"), 0);
        assert_eq!(batch_of("2"), 0);
        assert_eq!(batch_of("3"), 1);
        assert_eq!(batch_of("4"), 1);
        assert_eq!(batch_of("5"), 2);
    }

    #[test]
    fn test_zero_chunk_size_is_rejected() {
        let source = Arc::new(RecordingSource::default());
        let repository = Arc::new(SqliteObjectRepository::in_memory().unwrap());
        assert!(IngestionScheduler::new(source, repository, "https://example.com", 0).is_err());
    }
}

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use ccdc::config::Config;
use ccdc::crawler::{Fetcher, IngestionScheduler, ObjectExtractor};
use ccdc::storage::{ObjectRepository, SqliteObjectRepository};

/// Ingest every object listed in `input` that is not stored yet
pub async fn objects(config: &Config, base_url: &str, input: &Path) -> Result<()> {
    let repository = Arc::new(SqliteObjectRepository::open(&config.db.path).with_context(
        || format!("Failed to open database {}", config.db.path.display()),
    )?);

    let fetcher = Arc::new(Fetcher::from_config(config).context("Failed to create fetcher")?);
    let extractor = ObjectExtractor::new(fetcher);

    let scheduler = IngestionScheduler::new(
        Arc::new(extractor),
        repository.clone(),
        base_url,
        config.objects.chunk_size,
    )?;

    let stats = scheduler
        .run_file(input)
        .await
        .context("Failed to scrape objects")?;

    let total = repository
        .count()
        .await
        .context("Failed to count stored objects")?;

    tracing::info!(
        batches = stats.batches(),
        processed = stats.processed(),
        stored = stats.stored,
        skipped_existing = stats.skipped_existing,
        skipped_without_phone_numbers = stats.skipped_without_phone_numbers,
        total_stored = total,
        database = %config.db.path.display(),
        "Object ingestion completed"
    );

    Ok(())
}

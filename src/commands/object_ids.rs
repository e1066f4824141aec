use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use ccdc::config::Config;
use ccdc::crawler::{Fetcher, ListingPaginator};
use ccdc::storage::IdentifierSink;

/// Discover object ids from a listing and write them to `output`
pub async fn object_ids(config: &Config, url: &str, output: &Path) -> Result<()> {
    let fetcher = Arc::new(Fetcher::from_config(config).context("Failed to create fetcher")?);
    let paginator = ListingPaginator::new(fetcher);

    // Create the file if it does not exist or fail otherwise
    let mut sink = IdentifierSink::create(output)
        .await
        .context("Failed to create object id file")?;

    let result = paginator.run(url, &mut sink).await;

    // Keep whatever was discovered before a failure
    let written = sink
        .finish()
        .await
        .context("Failed to flush object id file")?;

    let stats = result.context("Failed to scrape object ids")?;

    tracing::info!(
        pages = stats.pages,
        object_ids = written,
        output = %output.display(),
        "Object id discovery completed"
    );

    Ok(())
}

//! ccdc - rate-limited listing crawler
//!
//! Discovers object ids from a paginated listing API and ingests the detail
//! pages of those objects into a SQLite database, skipping objects that are
//! stored already.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration loading and validation
//! - [`crawler`] - Rate limiting, fetching, pagination and batch ingestion
//! - [`parser`] - HTML parsing and field extraction
//! - [`models`] - Core data structures and types
//! - [`storage`] - Identifier file and SQLite persistence
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use ccdc::config::Config;
//! use ccdc::crawler::{Fetcher, ListingPaginator};
//! use ccdc::storage::IdentifierSink;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load(None)?;
//!     let fetcher = Arc::new(Fetcher::from_config(&config)?);
//!
//!     let mut sink = IdentifierSink::create("object-ids.txt").await?;
//!     ListingPaginator::new(fetcher)
//!         .run("https://example.com/listing", &mut sink)
//!         .await?;
//!     sink.finish().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crawler;
pub mod error;
pub mod models;
pub mod parser;
pub mod storage;
pub mod utils;

// Direct re-exports for convenience
pub use models::{GeoCoordinates, ObjectId, ObjectRecord};

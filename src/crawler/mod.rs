//! Web crawling functionality with rate limiting
//!
//! This module implements the two crawling workflows:
//!
//! - discovery: [`list::ListingPaginator`] walks the listing API and writes
//!   object ids to an identifier file,
//! - ingestion: [`pipeline::IngestionScheduler`] reads that file in batches and
//!   stores every object not yet present in the database.
//!
//! Every outbound request of both workflows goes through one shared
//! [`fetcher::Fetcher`] and its [`limiter::RateLimiter`].

pub mod fetcher;
pub mod limiter;
pub mod list;
pub mod object;
pub mod pipeline;

pub use fetcher::Fetcher;
pub use limiter::RateLimiter;
pub use list::{ListingPaginator, PaginationStats};
pub use object::ObjectExtractor;
pub use pipeline::{IngestionScheduler, IngestionStats, ObjectOutcome, ObjectSource};

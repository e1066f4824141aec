//! HTML parsing and data extraction
//!
//! This module handles parsing the listing seed page and object detail pages
//! and extracting structured data from them.

pub mod listing;
pub mod object;
pub mod selectors;

// Re-export main parsers and public types
pub use listing::{extract_api_url, extract_object_id};
pub use object::{FieldStrategy, ObjectParser};

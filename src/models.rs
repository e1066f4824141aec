// Core data structures for the ccdc crawler

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Opaque identifier of one listing object (observed as decimal digits)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Create an id, trimming surrounding whitespace
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(id.as_ref().trim().to_string())
    }

    /// Get string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// One page of the listing discovery API
///
/// Both fields are optional on the wire; `null` is treated as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingPage {
    /// Markup fragments, one per listed item
    #[serde(default)]
    pub objects: Option<Vec<String>>,

    /// Cursor (URL) of the next page
    #[serde(default)]
    pub next_page: Option<Value>,
}

impl ListingPage {
    /// Item fragments of this page
    pub fn fragments(&self) -> &[String] {
        self.objects.as_deref().unwrap_or_default()
    }

    /// Next page cursor, if it is truthy
    ///
    /// `null`, `false`, `0` and `""` all mean "no further page".
    pub fn next_cursor(&self) -> Option<String> {
        match self.next_page.as_ref()? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) if n.as_f64().is_some_and(|v| v != 0.0) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Whether traversal stops at this page
    pub fn is_last(&self) -> bool {
        self.fragments().is_empty() || self.next_cursor().is_none()
    }
}

/// Geographic position of an object
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Structured record extracted from one object detail page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub id: ObjectId,
    pub url: String,
    pub name: String,
    pub region: String, // breadcrumb labels joined with " / "
    pub coordinates: Option<GeoCoordinates>,
    pub contact_name: String,
    pub phone_numbers: Vec<String>,
}

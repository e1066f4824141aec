//! Object detail page parsing
//!
//! Each record field is derived by its own [`FieldStrategy`] over the parsed
//! document, so a change in page structure stays local to one strategy and
//! every strategy can be tested against fixture documents on its own.

use scraper::{Html, Selector};
use serde::Deserialize;

use crate::models::{GeoCoordinates, ObjectId, ObjectRecord};
use crate::parser::selectors::ObjectSelectors;
use crate::utils::normalize_whitespace;

/// Derive one field value from a parsed document
pub trait FieldStrategy {
    type Output;

    fn extract(&self, document: &Html) -> Self::Output;
}

/// Concatenated, whitespace-normalized text of every element matching a selector
pub struct TextField {
    selector: &'static Selector,
}

impl TextField {
    pub fn new(selector: &'static Selector) -> Self {
        Self { selector }
    }
}

impl FieldStrategy for TextField {
    type Output = String;

    fn extract(&self, document: &Html) -> String {
        let text: String = document
            .select(self.selector)
            .flat_map(|element| element.text())
            .collect();

        normalize_whitespace(&text)
    }
}

/// Trimmed text of every matching element, in document order
pub struct TextListField {
    selector: &'static Selector,
}

impl TextListField {
    pub fn new(selector: &'static Selector) -> Self {
        Self { selector }
    }
}

impl FieldStrategy for TextListField {
    type Output = Vec<String>;

    fn extract(&self, document: &Html) -> Vec<String> {
        document
            .select(self.selector)
            .map(|element| element.text().collect::<String>().trim().to_string())
            .collect()
    }
}

/// Breadcrumb labels joined with `" / "`
pub struct BreadcrumbField {
    labels: TextListField,
}

impl BreadcrumbField {
    pub fn new(selector: &'static Selector) -> Self {
        Self {
            labels: TextListField::new(selector),
        }
    }
}

impl FieldStrategy for BreadcrumbField {
    type Output = String;

    fn extract(&self, document: &Html) -> String {
        self.labels.extract(document).join(" / ")
    }
}

/// Why an object carries no coordinates
#[derive(Debug)]
pub enum CoordinatesUnavailable {
    /// The page has no location module
    Missing,
    /// The location payload is not valid JSON
    Malformed(serde_json::Error),
    /// The payload lacks latitude or longitude
    Incomplete,
}

#[derive(Debug, Deserialize)]
struct LocationPayload {
    #[serde(default, alias = "lat")]
    latitude: Option<f64>,
    #[serde(default, alias = "lng")]
    longitude: Option<f64>,
}

/// JSON position payload of the location module
pub struct CoordinatesField {
    selector: &'static Selector,
}

impl CoordinatesField {
    pub fn new(selector: &'static Selector) -> Self {
        Self { selector }
    }
}

impl FieldStrategy for CoordinatesField {
    type Output = Result<GeoCoordinates, CoordinatesUnavailable>;

    fn extract(&self, document: &Html) -> Self::Output {
        let payload = document
            .select(self.selector)
            .next()
            .map(|element| element.text().collect::<String>())
            .ok_or(CoordinatesUnavailable::Missing)?;

        let location: LocationPayload = serde_json::from_str(payload.trim())
            .map_err(CoordinatesUnavailable::Malformed)?;

        match (location.latitude, location.longitude) {
            (Some(latitude), Some(longitude)) => Ok(GeoCoordinates {
                latitude,
                longitude,
            }),
            _ => Err(CoordinatesUnavailable::Incomplete),
        }
    }
}

/// Object detail page parser
pub struct ObjectParser {
    name: TextField,
    region: BreadcrumbField,
    coordinates: CoordinatesField,
    contact_name: TextField,
    phone_numbers: TextListField,
}

impl ObjectParser {
    #[must_use]
    pub fn new() -> Self {
        let selectors = ObjectSelectors::new();

        Self {
            name: TextField::new(selectors.headline),
            region: BreadcrumbField::new(selectors.breadcrumb),
            coordinates: CoordinatesField::new(selectors.location),
            contact_name: TextField::new(selectors.contact_name),
            phone_numbers: TextListField::new(selectors.phone_number),
        }
    }

    /// Build a record from a detail page
    ///
    /// Returns `None` when the page lists no phone number; such objects are
    /// not persisted. A missing or malformed location payload only drops the
    /// coordinates.
    pub fn parse(&self, html: &str, id: &ObjectId, url: &str) -> Option<ObjectRecord> {
        let document = Html::parse_document(html);

        let phone_numbers = self.phone_numbers.extract(&document);
        if phone_numbers.is_empty() {
            tracing::info!(
                object_id = %id,
                url = %url,
                "Skip storing object; couldn't detect any phone numbers"
            );
            return None;
        }

        let coordinates = match self.coordinates.extract(&document) {
            Ok(coordinates) => Some(coordinates),
            Err(CoordinatesUnavailable::Missing) => {
                tracing::warn!(object_id = %id, "No location module found");
                None
            }
            Err(CoordinatesUnavailable::Malformed(e)) => {
                tracing::warn!(object_id = %id, error = %e, "Malformed location payload");
                None
            }
            Err(CoordinatesUnavailable::Incomplete) => {
                tracing::warn!(object_id = %id, "Location payload lacks latitude or longitude");
                None
            }
        };

        Some(ObjectRecord {
            id: id.clone(),
            url: url.to_string(),
            name: self.name.extract(&document),
            region: self.region.extract(&document),
            coordinates,
            contact_name: self.contact_name.extract(&document),
            phone_numbers,
        })
    }
}

impl Default for ObjectParser {
    fn default() -> Self {
        Self::new()
    }
}

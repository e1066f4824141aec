//! Listing page parsing
//!
//! The seed listing page embeds its discovery API entry point in an inline
//! `text/x-config` JSON block whose only property is `apiUrl`. Each API page
//! then returns markup fragments that carry the object id in a `data-id`
//! attribute.

use regex::Regex;
use scraper::Html;
use serde_json::Value;
use std::sync::OnceLock;

use crate::models::ObjectId;
use crate::parser::selectors::ListingSelectors;

/// Find the discovery API URL embedded in a listing page
///
/// Every `text/x-config` block is parsed as JSON; blocks that are not valid
/// JSON are ignored. The first JSON object whose property set is exactly
/// `{"apiUrl"}` with a string value wins.
pub fn extract_api_url(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selectors = ListingSelectors::new();

    document
        .select(selectors.config_script)
        .map(|script| script.text().collect::<String>())
        .filter_map(|text| serde_json::from_str::<Value>(text.trim()).ok())
        .find_map(|value| match value {
            Value::Object(map) if map.len() == 1 => match map.get("apiUrl") {
                Some(Value::String(url)) => Some(url.clone()),
                _ => None,
            },
            _ => None,
        })
}

/// Extract the object id from one listing fragment
///
/// Fragments without a `data-id="<digits>"` attribute are not objects and
/// yield `None`.
pub fn extract_object_id(fragment: &str) -> Option<ObjectId> {
    static OBJECT_ID_RE: OnceLock<Regex> = OnceLock::new();

    let re = OBJECT_ID_RE
        .get_or_init(|| Regex::new(r#"data-id\s*=\s*"(\d+)""#).expect("Invalid regex pattern"));

    re.captures(fragment)
        .and_then(|caps| caps.get(1))
        .map(|m| ObjectId::new(m.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_api_url() {
        let html = r#"<html><head>
            <script type="text/x-config">not json at all</script>
            <script type="text/x-config">{"locale": "de", "apiUrl": "https://x/ignored"}</script>
            <script type="text/x-config">
                {"apiUrl": "https://example.com/api/search?page=1"}
            </script>
        </head><body></body></html>"#;

        assert_eq!(
            extract_api_url(html).as_deref(),
            Some("https://example.com/api/search?page=1")
        );
    }

    #[test]
    fn test_extract_api_url_missing() {
        let html = r#"<html><head>
            <script>{"apiUrl": "https://x/plain-script"}</script>
            <script type="text/x-config">{"other": 1}</script>
        </head></html>"#;

        assert!(extract_api_url(html).is_none());
    }

    #[test]
    fn test_extract_object_id() {
        let fragment = r#"<article class="teaser" data-id="4711"><a href="/x/4711/">X</a></article>"#;
        assert_eq!(extract_object_id(fragment), Some(ObjectId::new("4711")));

        let spaced = r#"<div data-id = "123">"#;
        assert_eq!(extract_object_id(spaced), Some(ObjectId::new("123")));
    }

    #[test]
    fn test_non_object_fragment() {
        assert!(extract_object_id(r#"<div class="ad-slot"></div>"#).is_none());
        assert!(extract_object_id(r#"<div data-id="abc"></div>"#).is_none());
    }
}

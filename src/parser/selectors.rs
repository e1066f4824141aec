//! CSS selectors for the listing seed page and object detail pages

use lazy_static::lazy_static;
use scraper::Selector;

// Helper macro to parse selectors safely at compile time
macro_rules! parse_selector {
    ($s:expr) => {
        Selector::parse($s).expect(concat!("Invalid CSS selector: ", $s))
    };
}

lazy_static! {
    // Listing seed page
    static ref CONFIG_SCRIPT: Selector = parse_selector!(r#"script[type="text/x-config"]"#);

    // Object detail page
    static ref HEADLINE: Selector = parse_selector!("div.expose__headline");
    static ref BREADCRUMB: Selector = parse_selector!(".expose-breadcrumbs li > a > span");
    static ref LOCATION: Selector =
        parse_selector!(r#".expose-location script[type="application/json"]"#);
    static ref CONTACT_NAME: Selector = parse_selector!("div.expose-section__content p.h3");
    static ref PHONE_NUMBER: Selector = parse_selector!("div.phone-numbers li");
}

/// Selectors of the listing seed page
pub struct ListingSelectors {
    /// Inline JSON config blocks, one of which carries the API entry point
    pub config_script: &'static Selector,
}

impl ListingSelectors {
    pub fn new() -> Self {
        Self {
            config_script: &CONFIG_SCRIPT,
        }
    }
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self::new()
    }
}

/// Selectors of an object detail ("expose") page
pub struct ObjectSelectors {
    pub headline: &'static Selector,
    pub breadcrumb: &'static Selector,
    pub location: &'static Selector,
    pub contact_name: &'static Selector,
    pub phone_number: &'static Selector,
}

impl ObjectSelectors {
    pub fn new() -> Self {
        Self {
            headline: &HEADLINE,
            breadcrumb: &BREADCRUMB,
            location: &LOCATION,
            contact_name: &CONTACT_NAME,
            phone_number: &PHONE_NUMBER,
        }
    }
}

impl Default for ObjectSelectors {
    fn default() -> Self {
        Self::new()
    }
}

//! Common test utilities

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use ccdc::crawler::{Fetcher, RateLimiter};

/// Create a fetcher with a generous limit for mock servers
#[allow(dead_code)]
pub fn test_fetcher() -> Arc<Fetcher> {
    test_fetcher_with_timeout(Duration::from_secs(5))
}

/// Create a fetcher with a custom request timeout
#[allow(dead_code)]
pub fn test_fetcher_with_timeout(timeout: Duration) -> Arc<Fetcher> {
    let limiter = Arc::new(RateLimiter::per_minute(NonZeroU32::new(10_000).unwrap()));
    Arc::new(Fetcher::new("ccdc-test/1.0", timeout, limiter).unwrap())
}

/// Listing seed page embedding the API entry point
#[allow(dead_code)]
pub fn listing_page(api_url: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<script type="text/x-config">{{"locale": "de-AT"}}</script>
<script type="text/x-config">{{"apiUrl": "{api_url}"}}</script>
</head>
<body><div id="results"></div></body>
</html>"#
    )
}

/// Listing API fragment for one object
#[allow(dead_code)]
pub fn object_fragment(id: &str) -> String {
    format!(r#"<article class="teaser" data-id="{id}"><a href="/objects/{id}/">Object {id}</a></article>"#)
}

/// Object detail page
#[allow(dead_code)]
pub fn object_page(name: &str, phone_numbers: &[&str], location_json: Option<&str>) -> String {
    let phones: String = phone_numbers
        .iter()
        .map(|number| format!("<li>{number}</li>"))
        .collect();

    let location = location_json
        .map(|json| {
            format!(
                r#"<div class="expose-location"><script type="application/json">{json}</script></div>"#
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html>
<body>
<ul class="expose-breadcrumbs">
    <li><a href="/at"><span>Austria</span></a></li>
    <li><a href="/at/tirol"><span> Tyrol </span></a></li>
    <li><a href="/at/tirol/innsbruck"><span>Innsbruck</span></a></li>
</ul>
<div class="expose__headline">{name}</div>
{location}
<div class="expose-section__content">
    <p class="h3">Anna Berger</p>
    <div class="phone-numbers"><ul>{phones}</ul></div>
</div>
</body>
</html>"#
    )
}

//! Review platforms.
//!
//! Each platform knows three things: how to search for a company, how to
//! address page N of a product's reviews, and which selectors find review
//! fields in its markup. Everything else (paging, date filtering) is shared
//! and lives in [`crate::platform_scraper`].

pub mod capterra;
pub mod g2;
pub mod trustradius;

use regex::Regex;
use url::Url;

use crate::models::Source;
use crate::parser::{self, ParsedPage, ReviewSelectors, SelectorError};

pub use capterra::Capterra;
pub use g2::G2;
pub use trustradius::TrustRadius;

pub trait Platform: Send + Sync {
    fn source(&self) -> Source;

    /// Origin all URLs are built from, without a trailing slash
    fn base_url(&self) -> &str;

    /// Search results page for `company`
    fn search_url(&self, company: &str) -> Result<Url, url::ParseError>;

    /// Pattern for product links on the search page; group 1 is the product slug
    fn product_pattern(&self) -> &Regex;

    /// Page `page` (1-based) of a product's reviews
    fn reviews_url(&self, product_slug: &str, page: u32) -> String;

    fn selectors(&self) -> &ReviewSelectors;

    /// Slug of the first product on a search results page
    fn find_product(&self, search_html: &str) -> Option<String> {
        parser::find_product_link(search_html, self.product_pattern()).map(|(_, slug)| slug)
    }

    fn parse_page(&self, html: &str) -> Result<ParsedPage, SelectorError> {
        parser::parse_review_page(html, self.selectors())
    }
}

/// Build the platform for `source`, optionally pointed at another origin.
pub fn for_source(source: Source, base_url: Option<&str>) -> Box<dyn Platform> {
    match (source, base_url) {
        (Source::G2, None) => Box::new(G2::new()),
        (Source::G2, Some(base)) => Box::new(G2::with_base_url(base)),
        (Source::Capterra, None) => Box::new(Capterra::new()),
        (Source::Capterra, Some(base)) => Box::new(Capterra::with_base_url(base)),
        (Source::TrustRadius, None) => Box::new(TrustRadius::new()),
        (Source::TrustRadius, Some(base)) => Box::new(TrustRadius::with_base_url(base)),
    }
}

pub(crate) fn trim_base(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

pub(crate) fn search_url(base_url: &str, path: &str, param: &str, company: &str) -> Result<Url, url::ParseError> {
    Url::parse_with_params(&format!("{}{}", base_url, path), &[(param, company)])
}

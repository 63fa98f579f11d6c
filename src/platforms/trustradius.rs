use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use super::Platform;
use crate::models::Source;
use crate::parser::ReviewSelectors;

pub const BASE_URL: &str = "https://www.trustradius.com";

lazy_static! {
    static ref PRODUCT_PATH: Regex =
        Regex::new(r"/products/([^/?#]+)").expect("Invalid TrustRadius product regex");
}

const SELECTORS: ReviewSelectors = ReviewSelectors {
    container: r#"article.review, [itemprop="review"], div.review-card"#,
    title: r#".review-title, [itemprop="name"], header h3"#,
    body: r#"[itemprop="reviewBody"], .review-content, .review-body"#,
    date: r#"time, [itemprop="datePublished"], .review-date"#,
    author: r#"[itemprop="author"], .reviewer-name, .reviewer .name"#,
    rating: r#"[itemprop="ratingValue"], .trust-score, .review-rating"#,
    next_page: r#"a[rel="next"], link[rel="next"], .pagination .next a"#,
    page_size: 25,
};

pub struct TrustRadius {
    base_url: String,
}

impl TrustRadius {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: super::trim_base(base_url),
        }
    }
}

impl Default for TrustRadius {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for TrustRadius {
    fn source(&self) -> Source {
        Source::TrustRadius
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn search_url(&self, company: &str) -> Result<Url, url::ParseError> {
        super::search_url(&self.base_url, "/search", "q", company)
    }

    fn product_pattern(&self) -> &Regex {
        &PRODUCT_PATH
    }

    fn reviews_url(&self, product_slug: &str, page: u32) -> String {
        format!("{}/products/{}/reviews?page={}", self.base_url, product_slug, page)
    }

    fn selectors(&self) -> &ReviewSelectors {
        &SELECTORS
    }
}

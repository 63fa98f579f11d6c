use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use super::Platform;
use crate::models::Source;
use crate::parser::ReviewSelectors;

pub const BASE_URL: &str = "https://www.capterra.com";

lazy_static! {
    // Product pages live under /p/<id>/<name>/, older links under /reviews/<id>/<name>
    static ref PRODUCT_PATH: Regex =
        Regex::new(r"/(?:p|reviews)/(\d+/[^/?#]+)").expect("Invalid Capterra product regex");
}

const SELECTORS: ReviewSelectors = ReviewSelectors {
    container: r#"[data-test-id="review-card"], [itemprop="review"], div.review-card"#,
    title: r#"[data-test-id="review-title"], [itemprop="name"], .review-title"#,
    body: r#"[data-test-id="review-body"], [itemprop="reviewBody"], .review-body"#,
    date: r#"time, [data-test-id="review-date"], [itemprop="datePublished"], .review-date"#,
    author: r#"[data-test-id="reviewer-name"], [itemprop="author"], .reviewer-name"#,
    rating: r#"[data-test-id="review-rating"], [itemprop="ratingValue"], .review-rating"#,
    next_page: r#"a[rel="next"], link[rel="next"], a[aria-label="Next page"]"#,
    page_size: 25,
};

pub struct Capterra {
    base_url: String,
}

impl Capterra {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: super::trim_base(base_url),
        }
    }
}

impl Default for Capterra {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for Capterra {
    fn source(&self) -> Source {
        Source::Capterra
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn search_url(&self, company: &str) -> Result<Url, url::ParseError> {
        super::search_url(&self.base_url, "/search/", "query", company)
    }

    fn product_pattern(&self) -> &Regex {
        &PRODUCT_PATH
    }

    fn reviews_url(&self, product_slug: &str, page: u32) -> String {
        format!("{}/p/{}/reviews/?page={}", self.base_url, product_slug, page)
    }

    fn selectors(&self) -> &ReviewSelectors {
        &SELECTORS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let capterra = Capterra::new();
        assert_eq!(
            capterra.search_url("monday.com").unwrap().as_str(),
            "https://www.capterra.com/search/?query=monday.com"
        );
        assert_eq!(
            capterra.reviews_url("135003/Slack", 1),
            "https://www.capterra.com/p/135003/Slack/reviews/?page=1"
        );
    }

    #[test]
    fn test_find_product_accepts_both_link_shapes() {
        let capterra = Capterra::new();
        let current = r#"<a href="/p/135003/Slack/">Slack</a>"#;
        let legacy = r#"<a href="https://www.capterra.com/reviews/135003/Slack">Slack</a>"#;
        assert_eq!(capterra.find_product(current).as_deref(), Some("135003/Slack"));
        assert_eq!(capterra.find_product(legacy).as_deref(), Some("135003/Slack"));
        assert_eq!(capterra.find_product(r#"<a href="/categories/">x</a>"#), None);
    }

    #[test]
    fn test_parse_page() {
        let html = r#"
            <div data-test-id="review-card">
              <h3 data-test-id="review-title">Affordable and simple</h3>
              <span data-test-id="reviewer-name">Marco R.</span>
              <span data-test-id="review-date">Reviewed on March 5, 2023</span>
              <div data-test-id="review-rating" data-rating="5.0">★★★★★</div>
              <p data-test-id="review-body">We moved our whole support desk over in a week.</p>
            </div>
        "#;

        let page = Capterra::new().parse_page(html).unwrap();
        assert_eq!(page.reviews.len(), 1);
        assert!(!page.has_next_page);

        let review = &page.reviews[0];
        assert_eq!(review.title, "Affordable and simple");
        assert_eq!(review.description, "We moved our whole support desk over in a week.");
        assert_eq!(review.date_text, "Reviewed on March 5, 2023");
        assert_eq!(review.reviewer_name.as_deref(), Some("Marco R."));
        assert_eq!(review.rating.as_deref(), Some("5.0"));
    }
}

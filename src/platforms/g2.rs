use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use super::Platform;
use crate::models::Source;
use crate::parser::ReviewSelectors;

pub const BASE_URL: &str = "https://www.g2.com";

lazy_static! {
    static ref PRODUCT_PATH: Regex =
        Regex::new(r"/products/([^/?#]+)").expect("Invalid G2 product regex");
}

const SELECTORS: ReviewSelectors = ReviewSelectors {
    container: r#"[itemprop="review"], div.review-card, article.review"#,
    title: r#"h3[itemprop="name"], .review-card__title, .review-title"#,
    body: r#"[itemprop="reviewBody"], .review-card__body, .review-body"#,
    date: r#"time, [itemprop="datePublished"], .review-card__date, .review-date"#,
    author: r#"[itemprop="author"], .review-card__author, .reviewer-name"#,
    rating: r#"[itemprop="ratingValue"], .review-card__rating, .stars"#,
    next_page: r#"a[rel="next"], link[rel="next"], .pagination a.next, .pagination .next a"#,
    page_size: 10,
};

pub struct G2 {
    base_url: String,
}

impl G2 {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: super::trim_base(base_url),
        }
    }
}

impl Default for G2 {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for G2 {
    fn source(&self) -> Source {
        Source::G2
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn search_url(&self, company: &str) -> Result<Url, url::ParseError> {
        super::search_url(&self.base_url, "/search", "query", company)
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

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><head><link rel="next" href="/products/slack/reviews?page=2"></head>
        <body>
          <div itemprop="review" class="paper">
            <div itemprop="author"><span>Priya S.</span></div>
            <h3 itemprop="name">"Keeps the team in sync"</h3>
            <time datetime="2023-06-01">Jun 1, 2023</time>
            <meta itemprop="ratingValue" content="4.5">
            <div itemprop="reviewBody">Channels and huddles replaced most of our meetings.</div>
          </div>
          <div itemprop="review" class="paper">
            <h3 itemprop="name">Too many notifications</h3>
            <time>December 31, 2023</time>
            <div itemprop="reviewBody">Hard to tune.</div>
          </div>
        </body></html>
    "#;

    #[test]
    fn test_urls() {
        let g2 = G2::new();
        assert_eq!(
            g2.search_url("Hub Spot").unwrap().as_str(),
            "https://www.g2.com/search?query=Hub+Spot"
        );
        assert_eq!(
            g2.reviews_url("slack", 3),
            "https://www.g2.com/products/slack/reviews?page=3"
        );
    }

    #[test]
    fn test_find_product() {
        let html = r#"<a href="https://www.g2.com/products/slack/reviews">Slack</a>"#;
        assert_eq!(G2::new().find_product(html).as_deref(), Some("slack"));
    }

    #[test]
    fn test_parse_page() {
        let page = G2::new().parse_page(PAGE).unwrap();
        assert_eq!(page.reviews.len(), 2);
        assert!(page.has_next_page);

        let first = &page.reviews[0];
        assert_eq!(first.title, "\"Keeps the team in sync\"");
        assert_eq!(first.description, "Channels and huddles replaced most of our meetings.");
        assert_eq!(first.date_text, "2023-06-01");
        assert_eq!(first.reviewer_name.as_deref(), Some("Priya S."));
        assert_eq!(first.rating.as_deref(), Some("4.5"));

        let second = &page.reviews[1];
        assert_eq!(second.date_text, "December 31, 2023");
        assert_eq!(second.reviewer_name, None);
        assert_eq!(second.rating, None);
    }

    #[test]
    fn test_parse_page_keeps_unlabelled_review_text() {
        let html = r#"
            <div itemprop="review">
              <time datetime="2023-06-01"></time>
              <p>Loved it, saves hours every week.</p>
            </div>
        "#;

        let page = G2::new().parse_page(html).unwrap();
        assert_eq!(page.skipped, 0);
        assert_eq!(page.reviews.len(), 1);
        assert_eq!(page.reviews[0].description, "Loved it, saves hours every week.");
        assert_eq!(page.reviews[0].date_text, "2023-06-01");
    }
}

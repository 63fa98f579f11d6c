use chrono::NaiveDate;

use crate::config::ScrapeConfig;
use crate::date_filter::{check_date, DateRange, DateVerdict};
use crate::models::{Review, Source};
use crate::network::{FetchError, PageFetcher};
use crate::pager::{PageControl, Pager, StopReason};
use crate::platforms::Platform;

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("could not build {platform} search URL: {error}")]
    SearchUrl {
        platform: Source,
        #[source]
        error: url::ParseError,
    },

    #[error("{platform} company search failed: {error}")]
    Search {
        platform: Source,
        #[source]
        error: FetchError,
    },
}

/// Whether the company was found at all
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeStatus {
    Completed,
    CompanyNotFound,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeOutcome {
    pub reviews: Vec<Review>,
    pub status: ScrapeStatus,
    pub pages_fetched: u32,
    pub stop_reason: Option<StopReason>,
    /// Reviews whose date matched no known format
    pub undated: usize,
    pub out_of_range: usize,
}

impl ScrapeOutcome {
    fn not_found() -> Self {
        Self {
            reviews: Vec::new(),
            status: ScrapeStatus::CompanyNotFound,
            pages_fetched: 0,
            stop_reason: None,
            undated: 0,
            out_of_range: 0,
        }
    }
}

/// Search, paginate, parse and filter for one platform.
pub struct PlatformScraper<'a> {
    platform: &'a dyn Platform,
    fetcher: &'a dyn PageFetcher,
    config: &'a ScrapeConfig,
}

impl<'a> PlatformScraper<'a> {
    pub fn new(platform: &'a dyn Platform, fetcher: &'a dyn PageFetcher, config: &'a ScrapeConfig) -> Self {
        Self {
            platform,
            fetcher,
            config,
        }
    }

    /// Reviews of `company_name` dated within `[start_date, end_date]`, in
    /// the order the platform lists them.
    ///
    /// A company with no search hit is not an error: the outcome is empty and
    /// marked [`ScrapeStatus::CompanyNotFound`]. Only a failed search request
    /// is fatal; failures on review pages keep what was already collected.
    #[tracing::instrument(skip(self), fields(source = %self.platform.source()))]
    pub async fn scrape(
        &self,
        company_name: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<ScrapeOutcome, ScrapeError> {
        let source = self.platform.source();

        let Some(product) = self.find_product(company_name).await? else {
            tracing::warn!("Company '{}' not found on {}", company_name, source);
            return Ok(ScrapeOutcome::not_found());
        };
        tracing::info!(%product, "Found product page");

        let range = DateRange::new(start_date, end_date);
        let today = self.config.today;
        let stop_at_older = self.config.stop_at_older;
        let mut reviews = Vec::new();
        let mut undated = 0;
        let mut out_of_range = 0;

        let report = Pager::new(self.fetcher, self.config.max_pages)
            .run(
                |page| self.platform.reviews_url(&product, page),
                |html| self.platform.parse_page(html),
                |page, raw_reviews| {
                    let before = reviews.len();
                    let mut control = PageControl::Continue;

                    for raw in raw_reviews {
                        match check_date(&raw.date_text, &range, today) {
                            DateVerdict::InRange(date) => reviews.push(raw.into_review(source, date)),
                            DateVerdict::BeforeRange(_) => {
                                out_of_range += 1;
                                if stop_at_older {
                                    control = PageControl::Stop;
                                }
                            }
                            DateVerdict::AfterRange(_) => out_of_range += 1,
                            DateVerdict::Unrecognized => {
                                undated += 1;
                                tracing::warn!(
                                    page,
                                    date = %raw.date_text,
                                    title = %raw.title,
                                    "Dropping review with unrecognized date"
                                );
                            }
                        }
                    }

                    tracing::info!(
                        page,
                        kept = reviews.len() - before,
                        total = reviews.len(),
                        "Scraped {} page {}",
                        source,
                        page
                    );
                    if control == PageControl::Stop {
                        tracing::info!("Reached reviews older than {}, stopping pagination", start_date);
                    }
                    control
                },
            )
            .await;

        Ok(ScrapeOutcome {
            reviews,
            status: ScrapeStatus::Completed,
            pages_fetched: report.pages_fetched,
            stop_reason: Some(report.stop_reason),
            undated,
            out_of_range,
        })
    }

    async fn find_product(&self, company_name: &str) -> Result<Option<String>, ScrapeError> {
        let source = self.platform.source();
        let search_url = self
            .platform
            .search_url(company_name)
            .map_err(|error| ScrapeError::SearchUrl { platform: source, error })?;

        tracing::info!(url = %search_url, "Searching {} for '{}'", source, company_name);
        let result = self
            .fetcher
            .fetch(search_url.as_str())
            .await
            .map_err(|error| ScrapeError::Search { platform: source, error })?;

        Ok(self.platform.find_product(&result.content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pager::test_support::FixtureFetcher;
    use crate::platforms::G2;

    const BASE: &str = "https://g2.test";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn config() -> ScrapeConfig {
        ScrapeConfig::new(date(2024, 1, 15))
    }

    fn review(title: &str, date: &str) -> String {
        format!(
            r#"<div itemprop="review">
                 <h3 itemprop="name">{title}</h3>
                 <time datetime="{date}"></time>
                 <div itemprop="reviewBody">Body of {title}</div>
               </div>"#
        )
    }

    fn search_hit() -> &'static str {
        r#"<a href="/products/acme/reviews">Acme</a>"#
    }

    fn review_page(page: u32) -> String {
        format!("{BASE}/products/acme/reviews?page={page}")
    }

    #[tokio::test]
    async fn test_keeps_only_reviews_in_range() {
        let body = [
            review("early", "2023-01-01"),
            review("middle", "2023-06-01"),
            review("late", "2023-12-31"),
        ]
        .concat();
        let fetcher = FixtureFetcher::new()
            .page(format!("{BASE}/search?query=Acme"), search_hit())
            .page(review_page(1), body);
        let platform = G2::with_base_url(BASE);
        let config = config();

        let outcome = PlatformScraper::new(&platform, &fetcher, &config)
            .scrape("Acme", date(2023, 2, 1), date(2023, 11, 1))
            .await
            .unwrap();

        assert_eq!(outcome.status, ScrapeStatus::Completed);
        assert_eq!(outcome.reviews.len(), 1);
        let kept = &outcome.reviews[0];
        assert_eq!(kept.title, "middle");
        assert_eq!(kept.source, Source::G2);
        assert_eq!(kept.review_date, date(2023, 6, 1));
        assert_eq!(outcome.out_of_range, 2);
        assert_eq!(outcome.stop_reason, Some(StopReason::NoNextPage));
    }

    #[tokio::test]
    async fn test_company_not_found_is_empty_not_error() {
        let fetcher = FixtureFetcher::new().page(
            format!("{BASE}/search?query=Nobody"),
            "<p>No products match your search</p>",
        );
        let platform = G2::with_base_url(BASE);
        let config = config();

        let outcome = PlatformScraper::new(&platform, &fetcher, &config)
            .scrape("Nobody", date(2023, 1, 1), date(2023, 12, 31))
            .await
            .unwrap();

        assert_eq!(outcome.status, ScrapeStatus::CompanyNotFound);
        assert!(outcome.reviews.is_empty());
        assert_eq!(fetcher.request_count(), 1);
    }

    #[tokio::test]
    async fn test_search_failure_is_fatal() {
        let fetcher = FixtureFetcher::new().failing(format!("{BASE}/search?query=Acme"), 500);
        let platform = G2::with_base_url(BASE);
        let config = config();

        let err = PlatformScraper::new(&platform, &fetcher, &config)
            .scrape("Acme", date(2023, 1, 1), date(2023, 12, 31))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ScrapeError::Search {
                platform: Source::G2,
                error: FetchError::HttpStatus(500)
            }
        ));
    }

    #[tokio::test]
    async fn test_unrecognized_dates_are_dropped() {
        let body = [review("dated", "2023-03-03"), review("undated", "sometime")].concat();
        let fetcher = FixtureFetcher::new()
            .page(format!("{BASE}/search?query=Acme"), search_hit())
            .page(review_page(1), body);
        let platform = G2::with_base_url(BASE);
        let config = config();

        let outcome = PlatformScraper::new(&platform, &fetcher, &config)
            .scrape("Acme", date(2023, 1, 1), date(2023, 12, 31))
            .await
            .unwrap();

        assert_eq!(outcome.reviews.len(), 1);
        assert_eq!(outcome.reviews[0].title, "dated");
        assert_eq!(outcome.undated, 1);
    }

    #[tokio::test]
    async fn test_mid_pagination_failure_returns_partial_results() {
        let next = r#"<a rel="next" href="?page=2">Next</a>"#;
        let fetcher = FixtureFetcher::new()
            .page(format!("{BASE}/search?query=Acme"), search_hit())
            .page(review_page(1), format!("{}{}", review("first", "2023-05-05"), next))
            .failing(review_page(2), 502);
        let platform = G2::with_base_url(BASE);
        let config = config();

        let outcome = PlatformScraper::new(&platform, &fetcher, &config)
            .scrape("Acme", date(2023, 1, 1), date(2023, 12, 31))
            .await
            .unwrap();

        assert_eq!(outcome.reviews.len(), 1);
        assert_eq!(outcome.pages_fetched, 1);
        assert_eq!(outcome.stop_reason, Some(StopReason::FetchFailed));
    }

    #[tokio::test]
    async fn test_stop_at_older_ends_pagination() {
        let next = r#"<a rel="next" href="?page=2">Next</a>"#;
        let fetcher = FixtureFetcher::new()
            .page(format!("{BASE}/search?query=Acme"), search_hit())
            .page(
                review_page(1),
                format!("{}{}{}", review("new", "2023-08-01"), review("old", "2022-12-01"), next),
            )
            .page(review_page(2), review("older", "2022-11-01"));
        let platform = G2::with_base_url(BASE);
        let mut config = config();
        config.stop_at_older = true;

        let outcome = PlatformScraper::new(&platform, &fetcher, &config)
            .scrape("Acme", date(2023, 1, 1), date(2023, 12, 31))
            .await
            .unwrap();

        assert_eq!(outcome.reviews.len(), 1);
        assert_eq!(outcome.stop_reason, Some(StopReason::Requested));
        assert_eq!(fetcher.request_count(), 2);
    }

    #[tokio::test]
    async fn test_page_limit_applies_to_review_pages() {
        let endless = format!("{}<a rel=\"next\" href=\"#\">Next</a>", review("again", "2023-05-05"));
        let fetcher = FixtureFetcher::new()
            .page(format!("{BASE}/search?query=Acme"), search_hit())
            .fallback(endless);
        let platform = G2::with_base_url(BASE);
        let mut config = config();
        config.max_pages = 4;

        let outcome = PlatformScraper::new(&platform, &fetcher, &config)
            .scrape("Acme", date(2023, 1, 1), date(2023, 12, 31))
            .await
            .unwrap();

        assert_eq!(outcome.pages_fetched, 4);
        assert_eq!(outcome.reviews.len(), 4);
        assert_eq!(outcome.stop_reason, Some(StopReason::MaxPagesReached));
    }
}

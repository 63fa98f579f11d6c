//! Sequential page walker.
//!
//! ```text
//! FETCHING(n) ──> PARSING(n) ──> CONTINUE(n) ──> FETCHING(n+1)
//!                     │
//!                     └──> STOP(reason)
//! ```
//!
//! The page limit is checked before every fetch, so a site that advertises a
//! next page forever still ends after `max_pages` requests.

use std::fmt;

use crate::models::RawReview;
use crate::network::{FetchError, FetchResult, PageFetcher};
use crate::parser::{ParsedPage, SelectorError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The page had no next-page control and was not full
    NoNextPage,
    /// The page held no reviews
    EmptyPage,
    MaxPagesReached,
    /// The fetch failed after retries
    FetchFailed,
    /// The page markup could not be parsed at all
    ParseFailed,
    /// The page consumer asked to stop
    Requested,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StopReason::NoNextPage => "no next page",
            StopReason::EmptyPage => "empty page",
            StopReason::MaxPagesReached => "page limit reached",
            StopReason::FetchFailed => "fetch failed",
            StopReason::ParseFailed => "parse failed",
            StopReason::Requested => "stopped by caller",
        };
        f.write_str(text)
    }
}

/// What the page consumer wants after seeing a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageControl {
    Continue,
    Stop,
}

#[derive(Debug)]
enum PagerState {
    Fetching(u32),
    Parsing {
        page: u32,
        fetched: Result<FetchResult, FetchError>,
    },
    Continue(u32),
    Stop(StopReason),
}

/// Summary of one pagination run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagerReport {
    pub pages_fetched: u32,
    pub raw_reviews: usize,
    pub stop_reason: StopReason,
}

pub struct Pager<'a> {
    fetcher: &'a dyn PageFetcher,
    max_pages: u32,
}

impl<'a> Pager<'a> {
    pub fn new(fetcher: &'a dyn PageFetcher, max_pages: u32) -> Self {
        Self { fetcher, max_pages }
    }

    /// Walk pages 1, 2, ... until a stop condition holds.
    ///
    /// `url_for` addresses page N, `parse` turns a body into reviews, and
    /// `consume` receives each non-empty page's reviews in order.
    pub async fn run<U, P, C>(&self, url_for: U, parse: P, mut consume: C) -> PagerReport
    where
        U: Fn(u32) -> String,
        P: Fn(&str) -> Result<ParsedPage, SelectorError>,
        C: FnMut(u32, Vec<RawReview>) -> PageControl,
    {
        let mut pages_fetched = 0;
        let mut raw_reviews = 0;
        let mut state = PagerState::Fetching(1);

        loop {
            state = match state {
                PagerState::Fetching(page) if page > self.max_pages => {
                    tracing::info!(max_pages = self.max_pages, "Reached page limit");
                    PagerState::Stop(StopReason::MaxPagesReached)
                }
                PagerState::Fetching(page) => {
                    let url = url_for(page);
                    tracing::info!(page, %url, "Fetching page");
                    let fetched = self.fetcher.fetch(&url).await;
                    PagerState::Parsing { page, fetched }
                }
                PagerState::Parsing { page, fetched: Err(e) } => {
                    tracing::warn!(page, error = %e, "Fetch failed, keeping reviews collected so far");
                    PagerState::Stop(StopReason::FetchFailed)
                }
                PagerState::Parsing { page, fetched: Ok(result) } => {
                    pages_fetched += 1;
                    match parse(&result.content) {
                        Err(e) => {
                            tracing::warn!(page, error = %e, "Could not parse page");
                            PagerState::Stop(StopReason::ParseFailed)
                        }
                        Ok(parsed) if parsed.reviews.is_empty() => {
                            tracing::info!(page, skipped = parsed.skipped, "No reviews on page");
                            PagerState::Stop(StopReason::EmptyPage)
                        }
                        Ok(parsed) => {
                            if parsed.skipped > 0 {
                                tracing::debug!(page, skipped = parsed.skipped, "Skipped review blocks without text");
                            }
                            raw_reviews += parsed.reviews.len();
                            let has_next_page = parsed.has_next_page;
                            match consume(page, parsed.reviews) {
                                PageControl::Stop => PagerState::Stop(StopReason::Requested),
                                PageControl::Continue if !has_next_page => {
                                    PagerState::Stop(StopReason::NoNextPage)
                                }
                                PageControl::Continue => PagerState::Continue(page),
                            }
                        }
                    }
                }
                PagerState::Continue(page) => match next_page(page, self.max_pages) {
                    Some(next) => PagerState::Fetching(next),
                    None => {
                        tracing::info!(max_pages = self.max_pages, "Reached page limit");
                        PagerState::Stop(StopReason::MaxPagesReached)
                    }
                },
                PagerState::Stop(stop_reason) => {
                    tracing::debug!(pages_fetched, raw_reviews, %stop_reason, "Pagination finished");
                    return PagerReport {
                        pages_fetched,
                        raw_reviews,
                        stop_reason,
                    };
                }
            };
        }
    }
}

/// Page after `page`, or `None` once `max_pages` is reached.
fn next_page(page: u32, max_pages: u32) -> Option<u32> {
    if page >= max_pages {
        None
    } else {
        page.checked_add(1)
    }
}

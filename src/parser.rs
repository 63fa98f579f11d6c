use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::models::RawReview;

lazy_static! {
    static ref RATING_NUMBER: Regex = Regex::new(r"\d+(?:\.\d+)?").expect("Invalid rating regex");
}

/// CSS selector lists locating each review field on one platform's pages.
///
/// Every entry is a comma-separated selector list, so a platform can name
/// several candidates for the same field.
#[derive(Debug, Clone, Copy)]
pub struct ReviewSelectors {
    pub container: &'static str,
    pub title: &'static str,
    pub body: &'static str,
    pub date: &'static str,
    pub author: &'static str,
    pub rating: &'static str,
    pub next_page: &'static str,
    /// Review blocks on a full page
    pub page_size: usize,
}

/// Reviews extracted from one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    pub reviews: Vec<RawReview>,
    /// Review blocks dropped because they carried no text
    pub skipped: usize,
    pub has_next_page: bool,
}

#[derive(Debug, thiserror::Error)]
#[error("invalid {field} selector '{selector}'")]
pub struct SelectorError {
    pub field: &'static str,
    pub selector: &'static str,
}

struct CompiledSelectors {
    container: Selector,
    title: Selector,
    body: Selector,
    date: Selector,
    author: Selector,
    rating: Selector,
    next_page: Selector,
}

impl ReviewSelectors {
    fn compile(&self) -> Result<CompiledSelectors, SelectorError> {
        let parse = |field: &'static str, selector: &'static str| {
            Selector::parse(selector).map_err(|_| SelectorError { field, selector })
        };
        Ok(CompiledSelectors {
            container: parse("container", self.container)?,
            title: parse("title", self.title)?,
            body: parse("body", self.body)?,
            date: parse("date", self.date)?,
            author: parse("author", self.author)?,
            rating: parse("rating", self.rating)?,
            next_page: parse("next_page", self.next_page)?,
        })
    }
}

/// Extract every review block from a page of HTML.
///
/// Missing fields become empty values. A block whose title and body selectors
/// miss keeps its remaining text as the body; a block with no text at all is
/// skipped and counted. An `Err` means the page could not be parsed at all.
pub fn parse_review_page(html: &str, selectors: &ReviewSelectors) -> Result<ParsedPage, SelectorError> {
    let compiled = selectors.compile()?;
    let document = Html::parse_document(html);

    let containers = outermost_matches(&document, &compiled.container);
    let block_count = containers.len();

    let mut page = ParsedPage::default();
    for container in containers {
        let review = extract_review(container, &compiled);
        if review.has_text() {
            page.reviews.push(review);
        } else {
            page.skipped += 1;
        }
    }

    let has_next_control = document.select(&compiled.next_page).next().is_some();
    let full_page = selectors.page_size > 0 && block_count >= selectors.page_size;
    page.has_next_page = block_count > 0 && (has_next_control || full_page);

    Ok(page)
}

/// Matches of `selector` that are not nested inside another match.
fn outermost_matches<'a>(document: &'a Html, selector: &Selector) -> Vec<ElementRef<'a>> {
    let all: Vec<ElementRef<'a>> = document.select(selector).collect();
    let ids: Vec<_> = all.iter().map(|el| el.id()).collect();
    all.into_iter()
        .filter(|el| !el.ancestors().any(|ancestor| ids.contains(&ancestor.id())))
        .collect()
}

fn extract_review(container: ElementRef<'_>, selectors: &CompiledSelectors) -> RawReview {
    let date_text = container
        .select(&selectors.date)
        .next()
        .and_then(|el| {
            attr_text(el, &["datetime", "content"]).or_else(|| non_empty(element_text(el)))
        })
        .unwrap_or_default();

    // First source holding a number wins
    let rating = container.select(&selectors.rating).next().and_then(|el| {
        ["content", "data-rating", "aria-label"]
            .iter()
            .filter_map(|name| el.value().attr(name))
            .map(str::to_string)
            .chain(std::iter::once(element_text(el)))
            .find_map(|raw| RATING_NUMBER.find(&raw).map(|m| m.as_str().to_string()))
    });

    let title = first_text(container, &selectors.title);
    let mut description = first_text(container, &selectors.body);
    if title.is_empty() && description.is_empty() {
        description = leftover_text(container, selectors);
    }

    RawReview {
        title,
        description,
        date_text,
        reviewer_name: non_empty(first_text(container, &selectors.author)),
        rating,
    }
}

/// Container text outside the date, author and rating elements. Used as the
/// body when a platform's title and body selectors both miss.
fn leftover_text(container: ElementRef<'_>, selectors: &CompiledSelectors) -> String {
    let excluded: Vec<_> = [&selectors.date, &selectors.author, &selectors.rating]
        .into_iter()
        .flat_map(|selector| container.select(selector))
        .map(|el| el.id())
        .collect();

    let words: Vec<&str> = container
        .descendants()
        .filter(|node| !node.ancestors().any(|ancestor| excluded.contains(&ancestor.id())))
        .filter_map(|node| node.value().as_text())
        .flat_map(|text| text.split_whitespace())
        .collect();
    words.join(" ")
}

fn first_text(container: ElementRef<'_>, selector: &Selector) -> String {
    container
        .select(selector)
        .map(element_text)
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

/// Visible text of an element with whitespace runs collapsed
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

fn attr_text(element: ElementRef<'_>, names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| element.value().attr(name))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// First `href` in a search results page matching `pattern`, with the
/// pattern's first capture group returned alongside it.
pub fn find_product_link(html: &str, pattern: &Regex) -> Option<(String, String)> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").expect("Invalid CSS selector");

    document
        .select(&selector)
        .filter_map(|el| el.value().attr("href"))
        .map(str::trim)
        .find_map(|href| {
            let caps = pattern.captures(href)?;
            let slug = caps.get(1)?.as_str().to_string();
            Some((href.to_string(), slug))
        })
}

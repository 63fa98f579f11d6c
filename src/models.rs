use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Review platform a record was collected from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    G2,
    Capterra,
    TrustRadius,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::G2, Source::Capterra, Source::TrustRadius];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::G2 => "G2",
            Source::Capterra => "Capterra",
            Source::TrustRadius => "TrustRadius",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = ValidationError;

    /// Case-insensitive, so `g2` and `trustradius` are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Source::ALL
            .into_iter()
            .find(|source| source.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::UnknownSource(s.to_string()))
    }
}

/// Fields pulled out of one review block before any date handling
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawReview {
    pub title: String,
    pub description: String,
    /// Date exactly as the page printed it
    pub date_text: String,
    pub reviewer_name: Option<String>,
    pub rating: Option<String>,
}

impl RawReview {
    /// A block without any title or body text is not a review.
    pub fn has_text(&self) -> bool {
        !self.title.is_empty() || !self.description.is_empty()
    }

    pub fn into_review(self, source: Source, review_date: NaiveDate) -> Review {
        Review {
            source,
            title: self.title,
            description: self.description,
            review_date,
            reviewer_name: self.reviewer_name,
            rating: self.rating,
        }
    }
}

/// A normalized review as written to the output file.
///
/// Unknown `reviewer_name` and `rating` serialize as empty strings, and an
/// empty string reads back as unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub source: Source,
    pub title: String,
    pub description: String,
    pub review_date: NaiveDate,
    #[serde(with = "empty_as_none", default)]
    pub reviewer_name: Option<String>,
    #[serde(with = "empty_as_none", default)]
    pub rating: Option<String>,
}

mod empty_as_none {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.filter(|s| !s.is_empty()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("company name must not be empty")]
    EmptyCompany,

    #[error("invalid {field} '{value}': expected YYYY-MM-DD")]
    InvalidDate { field: &'static str, value: String },

    #[error("start_date {start} is after end_date {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },

    #[error("unsupported source '{0}' (supported: G2, Capterra, TrustRadius)")]
    UnknownSource(String),
}

/// A validated scrape request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub company_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub source: Source,
    pub output_path: PathBuf,
}

impl Query {
    /// Validate raw user input. Nothing touches the network until this succeeds.
    pub fn parse(
        company_name: &str,
        start_date: &str,
        end_date: &str,
        source: &str,
        output_path: impl Into<PathBuf>,
    ) -> Result<Self, ValidationError> {
        let company_name = company_name.trim();
        if company_name.is_empty() {
            return Err(ValidationError::EmptyCompany);
        }

        let start_date = parse_query_date("start_date", start_date)?;
        let end_date = parse_query_date("end_date", end_date)?;
        if start_date > end_date {
            return Err(ValidationError::InvertedRange {
                start: start_date,
                end: end_date,
            });
        }

        Ok(Self {
            company_name: company_name.to_string(),
            start_date,
            end_date,
            source: source.parse()?,
            output_path: output_path.into(),
        })
    }
}

fn parse_query_date(field: &'static str, value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| ValidationError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

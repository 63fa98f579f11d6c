use std::fs;
use std::io::Write;
use std::path::Path;

use crate::models::Review;

/// Output file layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// One pretty-printed JSON array
    #[default]
    Json,
    /// One review per line
    Jsonl,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to serialize reviews: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Export reviews as a single JSON array, in the order given
pub fn export_to_json<W: Write>(reviews: &[Review], writer: &mut W) -> Result<(), serde_json::Error> {
    serde_json::to_writer_pretty(&mut *writer, reviews)?;
    writer.write_all(b"\n").map_err(serde_json::Error::io)
}

/// Export reviews to JSONL format: one JSON object per line
pub fn export_to_jsonl<'a, W: Write, I: IntoIterator<Item = &'a Review>>(
    reviews: I,
    writer: &mut W,
) -> Result<(), serde_json::Error> {
    for review in reviews {
        serde_json::to_writer(&mut *writer, review)?;
        writer.write_all(b"\n").map_err(serde_json::Error::io)?;
    }
    Ok(())
}

/// Serialize fully in memory, then write the file in one go, so a
/// serialization failure never leaves a half-written file behind.
pub fn write_reviews_file(path: &Path, reviews: &[Review], format: OutputFormat) -> Result<(), ExportError> {
    let mut buffer = Vec::new();
    match format {
        OutputFormat::Json => export_to_json(reviews, &mut buffer)?,
        OutputFormat::Jsonl => export_to_jsonl(reviews, &mut buffer)?,
    }

    let io_error = |source| ExportError::Io {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    fs::write(path, buffer).map_err(io_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Source;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn sample() -> Vec<Review> {
        vec![
            Review {
                source: Source::Capterra,
                title: "Second".to_string(),
                description: "Listed first by the site".to_string(),
                review_date: NaiveDate::from_ymd_opt(2023, 9, 1).unwrap(),
                reviewer_name: Some("Ana".to_string()),
                rating: Some("4".to_string()),
            },
            Review {
                source: Source::Capterra,
                title: "First".to_string(),
                description: String::new(),
                review_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
                reviewer_name: None,
                rating: None,
            },
        ]
    }

    #[test]
    fn test_json_array_keeps_order_and_keys() {
        let mut buffer = Vec::new();
        export_to_json(&sample(), &mut buffer).unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        let items = parsed.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["title"], "Second");
        assert_eq!(items[1]["title"], "First");

        let mut keys: Vec<&str> = items[1].as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec!["description", "rating", "review_date", "reviewer_name", "source", "title"]
        );
        assert_eq!(items[1]["rating"], "");
        assert_eq!(items[1]["reviewer_name"], "");
    }

    #[test]
    fn test_empty_export_is_empty_array() {
        let mut buffer = Vec::new();
        export_to_json(&[], &mut buffer).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(parsed, serde_json::json!([]));
    }

    #[test]
    fn test_jsonl_one_review_per_line() {
        let reviews = sample();
        let mut buffer = Vec::new();
        export_to_jsonl(&reviews, &mut buffer).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(output.ends_with('\n'));
        let first: Review = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first, reviews[0]);
    }

    #[test]
    fn test_write_reviews_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("reviews.json");
        let reviews = sample();

        write_reviews_file(&path, &reviews, OutputFormat::Json).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<Review> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, reviews);
    }
}

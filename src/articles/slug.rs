//! Human-readable article keys: `<lowercased-title>-<created_at>`.
//!
//! Lookups only ever use the trailing timestamp, so two articles created in the
//! same second share a key.

use crate::error::AppError;

/// Title part of a slug: outer spaces trimmed, inner spaces become dashes.
pub fn slugify_title(title: &str) -> String {
    title
        .trim_matches(' ')
        .split(' ')
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

pub fn make_slug(title: &str, created_at: i64) -> String {
    format!("{}-{}", slugify_title(title), created_at)
}

/// Creation timestamp carried by the last dash-separated segment.
pub fn extract_timestamp(slug: &str) -> Result<i64, AppError> {
    slug.rsplit('-')
        .next()
        .and_then(|last| last.parse::<i64>().ok())
        .ok_or_else(|| AppError::NotFound("article not found".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_from_title_and_timestamp() {
        assert_eq!(make_slug("Hello World", 1700000000), "hello-world-1700000000");
        assert_eq!(make_slug("  Rust  ", 5), "rust-5");
        assert_eq!(make_slug("a  b", 1), "a--b-1");
    }

    #[test]
    fn timestamp_comes_from_last_segment() {
        assert_eq!(extract_timestamp("hello-world-1700000000").unwrap(), 1700000000);
        assert_eq!(extract_timestamp("42").unwrap(), 42);
    }

    #[test]
    fn malformed_slug_is_not_found() {
        for bad in ["malformed", "", "hello-world-", "hello-12x"] {
            assert!(
                matches!(extract_timestamp(bad), Err(AppError::NotFound(_))),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn make_then_extract_recovers_timestamp() {
        for (title, ts) in [("Hello World", 1700000000), ("x", 0), ("Many words in a title", 99)] {
            assert_eq!(extract_timestamp(&make_slug(title, ts)).unwrap(), ts);
        }
    }
}

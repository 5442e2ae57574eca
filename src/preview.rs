//! Short text preview of the reading list

use crate::extraction::ExtractedRecord;
use std::fmt::Write;

/// Records shown before the overflow line
pub const PREVIEW_LIMIT: usize = 5;

const TITLE_WIDTH: usize = 45;
const URL_WIDTH: usize = 50;

/// Text shown when the list is empty
pub const EMPTY_STATE: &str =
    "No URLs found yet.\nOpen an X (Twitter) timeline and run `feedmark extract`.";

/// Render the preview shown after extraction and by `feedmark preview`
pub fn render(records: &[ExtractedRecord]) -> String {
    if records.is_empty() {
        return format!("URLs: 0\n\n{}\n", EMPTY_STATE);
    }

    let mut out = String::new();
    let _ = writeln!(out, "URLs: {}", records.len());
    for record in records.iter().take(PREVIEW_LIMIT) {
        let _ = writeln!(out);
        let _ = writeln!(out, "  {}", truncate(&record.title, TITLE_WIDTH));
        let _ = writeln!(out, "  {}", truncate(&record.url, URL_WIDTH));
        let _ = writeln!(out, "  by {}", record.author);
    }
    if records.len() > PREVIEW_LIMIT {
        let _ = writeln!(out);
        let _ = writeln!(out, "... and {} more URLs", records.len() - PREVIEW_LIMIT);
    }
    out
}

/// Whether exporting makes sense for this list
pub fn export_enabled(records: &[ExtractedRecord]) -> bool {
    !records.is_empty()
}

/// Cut `text` to `max` characters, marking the cut with `...`
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn records(n: usize) -> Vec<ExtractedRecord> {
        (0..n)
            .map(|i| ExtractedRecord {
                url: format!("https://example.com/{}", i),
                title: format!("Title {}", i),
                post_text: String::new(),
                author: "@a".to_string(),
                timestamp: Utc::now(),
            })
            .collect()
    }

    #[test]
    fn test_empty_state() {
        let out = render(&[]);
        assert!(out.contains("No URLs found yet."));
        assert!(!export_enabled(&[]));
    }

    #[test]
    fn test_small_list_has_no_overflow() {
        let out = render(&records(2));
        assert_eq!(
            out,
            "URLs: 2\n\n  Title 0\n  https://example.com/0\n  by @a\n\n  Title 1\n  https://example.com/1\n  by @a\n"
        );
        assert!(export_enabled(&records(2)));
    }

    #[test]
    fn test_overflow_counter() {
        let out = render(&records(8));
        assert!(out.contains("Title 4"));
        assert!(!out.contains("Title 5"));
        assert!(out.ends_with("... and 3 more URLs\n"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("ééééé", 2), "éé...");
    }
}

//! Markdown export
//!
//! One section per record: title, link, author, save time and a quoted
//! excerpt of the post the link came from.

use crate::extraction::ExtractedRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write;
use std::path::{Path, PathBuf};

/// Characters of post text quoted under each entry
pub const EXCERPT_CHARS: usize = 280;

/// Naming for exported documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// File name prefix; the export date is appended
    pub filename_prefix: String,
    /// Top-level heading
    pub heading: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            filename_prefix: "x-reading-list".to_string(),
            heading: "X Reading List".to_string(),
        }
    }
}

/// A rendered export
#[derive(Debug, Clone, Serialize)]
pub struct ExportDocument {
    /// Suggested file name
    pub filename: String,
    /// Markdown body
    pub body: String,
    /// Number of records in the document
    pub count: usize,
}

impl ExportDocument {
    /// Write the document into `dir`, returning the file path
    pub fn write_to(&self, dir: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.body)?;
        Ok(path)
    }
}

/// Render records as Markdown
pub fn render(
    records: &[ExtractedRecord],
    options: &ExportOptions,
    exported_at: DateTime<Utc>,
) -> ExportDocument {
    let mut body = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(body, "# {}", options.heading);
    let _ = writeln!(body);
    let _ = writeln!(
        body,
        "*Exported {} · {} {}*",
        exported_at.format("%Y-%m-%d %H:%M UTC"),
        records.len(),
        if records.len() == 1 { "link" } else { "links" }
    );

    for record in records {
        let _ = writeln!(body);
        let _ = writeln!(body, "---");
        let _ = writeln!(body);
        let _ = writeln!(body, "## {}", single_line(&record.title));
        let _ = writeln!(body);
        let _ = writeln!(body, "- **Link:** <{}>", record.url);
        let _ = writeln!(body, "- **Author:** {}", record.author);
        let _ = writeln!(
            body,
            "- **Saved:** {}",
            record.timestamp.format("%Y-%m-%d %H:%M UTC")
        );

        let excerpt = excerpt(&record.post_text);
        if !excerpt.is_empty() {
            let _ = writeln!(body);
            for line in excerpt.lines() {
                let _ = writeln!(body, "> {}", line.trim_end());
            }
        }
    }

    ExportDocument {
        filename: format!(
            "{}-{}.md",
            options.filename_prefix,
            exported_at.format("%Y-%m-%d")
        ),
        body,
        count: records.len(),
    }
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn excerpt(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() <= EXCERPT_CHARS {
        return text.to_string();
    }
    let head: String = text.chars().take(EXCERPT_CHARS).collect();
    format!("{}...", head.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 15, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_render_document() {
        let records = vec![ExtractedRecord {
            url: "https://example.com/a".to_string(),
            title: "A good\nread".to_string(),
            post_text: "First line\nSecond line".to_string(),
            author: "@jane".to_string(),
            timestamp: at(),
        }];

        let doc = render(&records, &ExportOptions::default(), at());

        assert_eq!(doc.filename, "x-reading-list-2026-10-15.md");
        assert_eq!(
            doc.body,
            "# X Reading List\n\
             \n\
             *Exported 2026-10-15 09:30 UTC · 1 link*\n\
             \n\
             ---\n\
             \n\
             ## A good read\n\
             \n\
             - **Link:** <https://example.com/a>\n\
             - **Author:** @jane\n\
             - **Saved:** 2026-10-15 09:30 UTC\n\
             \n\
             > First line\n\
             > Second line\n"
        );
    }

    #[test]
    fn test_render_skips_empty_excerpt() {
        let records = vec![ExtractedRecord {
            url: "https://example.com/".to_string(),
            title: "example.com".to_string(),
            post_text: String::new(),
            author: "Unknown".to_string(),
            timestamp: at(),
        }];

        let doc = render(&records, &ExportOptions::default(), at());
        assert!(!doc.body.contains("> "));
    }

    #[test]
    fn test_excerpt_truncates() {
        let long = "word ".repeat(100);
        let cut = excerpt(&long);
        assert!(cut.ends_with("..."));
        assert!(cut.chars().count() <= EXCERPT_CHARS + 3);
    }
}

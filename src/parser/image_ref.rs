//! Standard markdown image parsing: `![alt](path)`.

use crate::types::{basename, ImageRef, RefKind};
use regex::Regex;
use std::sync::LazyLock;

// Markdown image pattern: ![alt](path) or ![alt](path "title")
// !\[([^\]]*)\]      - Alt text (group 1)
// \(                 - Opening paren
// \s*([^)\s]+)       - Path, up to whitespace or ) (group 2)
// (?:\s+"[^"]*")?    - Optional title, ignored
// \s*\)              - Closing paren
static MARKDOWN_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"!\[([^\]]*)\]\(\s*([^)\s]+)(?:\s+"[^"]*")?\s*\)"#).unwrap()
});

/// True when a reference target points outside the local filesystem.
fn is_remote(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("data:")
}

/// Parse all standard markdown image references from content.
pub fn parse_markdown_images(content: &str) -> Vec<ImageRef> {
    let mut refs = Vec::new();

    for cap in MARKDOWN_IMAGE.captures_iter(content) {
        let full_match = cap.get(0).unwrap();
        let path = cap.get(2).map(|m| m.as_str()).unwrap_or("");

        if is_remote(path) {
            continue;
        }

        let filename = basename(path);
        if filename.is_empty() {
            continue;
        }

        let start = full_match.start();
        let line = content[..start].matches('\n').count() + 1;

        refs.push(ImageRef {
            path: path.to_string(),
            filename: filename.to_string(),
            kind: RefKind::Markdown,
            line,
            start,
            end: full_match.end(),
        });
    }

    refs
}

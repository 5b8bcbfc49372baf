//! Wiki-style embed parsing: `![[file]]`, `[[file|alias]]`.

use crate::types::{basename, has_image_extension, ImageRef, RefKind};
use regex::Regex;
use std::sync::LazyLock;

// Wiki embed pattern: ![[target]] or [[target]] with an optional |alias.
// (!)?             - Optional ! for embeds (group 1)
// \[\[             - Opening [[
// ([^\]\|]+)       - Target path (group 2)
// (?:\|([^\]]+))?  - Alias (group 3)
// \]\]             - Closing ]]
static WIKI_EMBED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(!?)\[\[([^\]\|]+)(?:\|([^\]]+))?\]\]").unwrap());

/// Parse wiki-style references whose target is an image file.
///
/// Plain note links like `[[Some Note]]` carry no image extension and are
/// ignored; both `![[img.png]]` and `[[img.png]]` count, since the rewrite
/// stage updates both forms.
pub fn parse_wiki_embeds(content: &str) -> Vec<ImageRef> {
    let mut refs = Vec::new();

    for cap in WIKI_EMBED.captures_iter(content) {
        let full_match = cap.get(0).unwrap();
        let target = cap.get(2).map(|m| m.as_str().trim()).unwrap_or("");

        let filename = basename(target);
        if !has_image_extension(filename) {
            continue;
        }

        let start = full_match.start();
        let line = content[..start].matches('\n').count() + 1;

        refs.push(ImageRef {
            path: target.to_string(),
            filename: filename.to_string(),
            kind: RefKind::Wiki,
            line,
            start,
            end: full_match.end(),
        });
    }

    refs
}

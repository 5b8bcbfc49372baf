//! Parsers for image reference syntax in markdown notes.

pub mod embed;
pub mod image_ref;

pub use embed::parse_wiki_embeds;
pub use image_ref::parse_markdown_images;

use crate::types::ImageRef;

/// Parse all image references in a note, in document order.
///
/// Recognizes standard markdown images and wiki-style embeds/links.
pub fn parse_image_refs(content: &str) -> Vec<ImageRef> {
    let mut refs = parse_markdown_images(content);
    refs.extend(parse_wiki_embeds(content));
    refs.sort_by_key(|r| r.start);
    refs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RefKind;

    #[test]
    fn test_mixed_forms_in_document_order() {
        let content = "![[pic.png]]\n\n![alt](uploads/photo.jpg)\n";
        let refs = parse_image_refs(content);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].filename, "pic.png");
        assert_eq!(refs[0].kind, RefKind::Wiki);
        assert_eq!(refs[1].filename, "photo.jpg");
        assert_eq!(refs[1].kind, RefKind::Markdown);
    }
}

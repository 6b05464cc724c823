//! Embed extractor: `![[Image.png]]`, `![[Image.png|300]]`, `![[Note]]`

use regex::Regex;
use std::sync::LazyLock;
use vaultpost_core::{Reference, SourcePosition};

/// Matches ![[...]] lazily up to the first closing `]]` on the same line
static EMBED_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[\[(.+?)\]\]").unwrap());

/// Extract every embed reference in left-to-right order.
///
/// Duplicates are kept: each marker occurrence is its own reference, so that
/// results can be paired with markers by index.
///
/// # Examples
///
/// ```
/// use vaultpost_parser::extract_references;
///
/// let refs = extract_references("![[a.png]] text ![[b.png|200]] ![[a.png]]");
/// let targets: Vec<_> = refs.iter().map(|r| r.target.as_str()).collect();
/// assert_eq!(targets, ["a.png", "b.png|200", "a.png"]);
/// ```
pub fn extract_references(content: &str) -> Vec<Reference> {
    if !content.contains("![[") {
        return Vec::new();
    }

    let references: Vec<Reference> = EMBED_PATTERN
        .captures_iter(content)
        .filter_map(|caps| {
            let full_match = caps.get(0)?;
            let target = caps.get(1)?.as_str();
            Some(Reference::at(
                target,
                SourcePosition::from_offset(content, full_match.start(), full_match.len()),
            ))
        })
        .collect();

    log::debug!("Extracted {} embed references", references.len());
    references
}

/// Extract only the identifiers of every embed, in order.
pub fn extract_reference_targets(content: &str) -> Vec<String> {
    extract_references(content)
        .into_iter()
        .map(|r| r.target)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_embed() {
        let refs = extract_references("See ![[Image.png]]");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].target, "Image.png");
    }

    #[test]
    fn test_empty_and_plain_text() {
        assert!(extract_references("").is_empty());
        assert!(extract_references("no refs here").is_empty());
        assert!(extract_references("[[wikilink]] and ![alt](x.png)").is_empty());
    }

    #[test]
    fn test_embed_with_folder_and_size() {
        let refs = extract_reference_targets("![[attachments/image.jpg|300]]");
        assert_eq!(refs, vec!["attachments/image.jpg|300"]);
    }

    #[test]
    fn test_order_and_duplicates() {
        let content = "![[b.png]] then ![[a.png]]\n![[b.png]]";
        let refs = extract_references(content);
        let targets: Vec<_> = refs.iter().map(|r| r.target.as_str()).collect();
        assert_eq!(targets, ["b.png", "a.png", "b.png"]);

        let offsets: Vec<_> = refs.iter().map(|r| r.position.unwrap().offset).collect();
        assert!(offsets.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_non_greedy_match() {
        let refs = extract_reference_targets("![[one.png]] and ]] ![[two.png]]");
        assert_eq!(refs, vec!["one.png", "two.png"]);
    }

    #[test]
    fn test_empty_target_ignored() {
        assert!(extract_references("![[]]").is_empty());
    }

    #[test]
    fn test_embed_does_not_span_lines() {
        assert!(extract_references("![[broken\nmarker]]").is_empty());
    }

    #[test]
    fn test_embed_position_multiline() {
        let content = "Line 1\nLine 2 ![[image.png]] here\nLine 3";
        let refs = extract_references(content);
        let pos = refs[0].position.unwrap();
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 8);
        assert_eq!(&content[pos.range()], "![[image.png]]");
    }

    #[test]
    fn test_unicode_target() {
        let content = "Voilà ![[café é.png]]";
        let refs = extract_references(content);
        assert_eq!(refs[0].target, "café é.png");
        assert_eq!(&content[refs[0].position.unwrap().range()], "![[café é.png]]");
    }
}

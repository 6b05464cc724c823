//! Markup rewriter: turns uploaded `![[target]]` embeds into `![target](url)`.

use std::collections::HashSet;
use std::ops::Range;
use vaultpost_core::{Error, Reference, Result, UploadResult};

/// Standard markdown image marker for an uploaded embed
pub fn markdown_image(target: &str, url: &str) -> String {
    format!("![{}]({})", target, url)
}

/// Rewrite every successfully uploaded embed into a markdown image link.
///
/// `references` and `results` must be index-aligned. Each reference owns one
/// marker occurrence: the one at its recorded position, or for hand-built
/// references the first literal occurrence not owned by another reference.
/// Markers whose upload failed are left byte-identical so the published post
/// shows which embeds did not make it.
///
/// Matching is literal, so targets containing regex metacharacters are safe.
///
/// # Examples
///
/// ```
/// use vaultpost_core::UploadResult;
/// use vaultpost_parser::{extract_references, rewrite_embeds};
///
/// let text = "![[cat.png]] and ![[dog.png]]";
/// let refs = extract_references(text);
/// let results = vec![
///     UploadResult::uploaded("https://f.example/cat.png"),
///     UploadResult::failed(vaultpost_core::UploadFailure::Cancelled),
/// ];
/// let out = rewrite_embeds(text, &refs, &results).unwrap();
/// assert_eq!(out, "![cat.png](https://f.example/cat.png) and ![[dog.png]]");
/// ```
pub fn rewrite_embeds(
    content: &str,
    references: &[Reference],
    results: &[UploadResult],
) -> Result<String> {
    if references.len() != results.len() {
        return Err(Error::validation_error(format!(
            "{} references but {} upload results",
            references.len(),
            results.len()
        )));
    }

    let mut claimed: HashSet<usize> = HashSet::new();
    let mut spans: Vec<(Range<usize>, Option<String>)> = Vec::with_capacity(references.len());

    // Positioned references claim their own markers first
    for (reference, result) in references.iter().zip(results) {
        let Some(position) = reference.position else {
            continue;
        };
        let marker = reference.marker();
        let range = position.range();
        if content.get(range.clone()) != Some(marker.as_str()) {
            return Err(Error::validation_error(format!(
                "Reference '{}' does not match the text at line {}, column {}",
                reference.target, position.line, position.column
            )));
        }
        if !claimed.insert(range.start) {
            return Err(Error::validation_error(format!(
                "Two references claim the marker at line {}, column {}",
                position.line, position.column
            )));
        }
        spans.push((range, replacement(reference, result)));
    }

    // Hand-built references take the first unclaimed literal occurrence
    for (reference, result) in references.iter().zip(results) {
        if reference.position.is_some() {
            continue;
        }
        let marker = reference.marker();
        let start = content
            .match_indices(marker.as_str())
            .map(|(idx, _)| idx)
            .find(|idx| !claimed.contains(idx));

        match start {
            Some(start) => {
                claimed.insert(start);
                spans.push((start..start + marker.len(), replacement(reference, result)));
            }
            None => log::warn!("No unclaimed occurrence of {} left to rewrite", marker),
        }
    }

    spans.sort_by_key(|(range, _)| range.start);

    let mut output = String::with_capacity(content.len());
    let mut cursor = 0;
    for (range, replacement) in spans {
        if range.start < cursor {
            return Err(Error::validation_error(format!(
                "Overlapping embed markers at byte {}",
                range.start
            )));
        }
        output.push_str(&content[cursor..range.start]);
        match replacement {
            Some(link) => output.push_str(&link),
            None => output.push_str(&content[range.clone()]),
        }
        cursor = range.end;
    }
    output.push_str(&content[cursor..]);

    Ok(output)
}

fn replacement(reference: &Reference, result: &UploadResult) -> Option<String> {
    result
        .url()
        .map(|url| markdown_image(&reference.target, url))
}

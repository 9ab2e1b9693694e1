//! Citation trailer formatting.
//!
//! Perplexity reports source URLs out-of-band from content. Once content
//! delivery finishes, the collected URLs are rendered as one markdown
//! trailer: a `Sources:` header and a numbered link per citation. Long URLs
//! keep the full link target but get a shortened display label so the
//! trailer stays readable.

use std::borrow::Cow;

/// Header preceding the numbered citation list.
const CITATION_HEADER: &str = "\n\nSources:\n";

/// Display labels longer than this are truncated with an ellipsis.
const MAX_DISPLAY_LENGTH: usize = 50;

/// Shorten a URL for display.
///
/// URLs of up to [`MAX_DISPLAY_LENGTH`] characters pass through unchanged;
/// longer ones are cut to exactly that length, ellipsis included.
pub(crate) fn shorten_url(url: &str) -> Cow<'_, str> {
    if url.chars().count() <= MAX_DISPLAY_LENGTH {
        return Cow::Borrowed(url);
    }

    let mut shortened: String = url.chars().take(MAX_DISPLAY_LENGTH - 3).collect();
    shortened.push_str("...");
    Cow::Owned(shortened)
}

/// Render the one-shot citation trailer.
///
/// One 1-indexed entry per citation, `[n](url) - label`, where the link
/// target is the full URL and the label is its shortened form.
pub(crate) fn format_citation_trailer(citations: &[String]) -> String {
    let entries = citations
        .iter()
        .enumerate()
        .map(|(i, citation)| format!("[{}]({}) - {}", i + 1, citation, shorten_url(citation)))
        .collect::<Vec<_>>()
        .join("\n");

    format!("{}{}", CITATION_HEADER, entries)
}

//! The textual contract between the chapter generator and the renderers.
//!
//! A generated chapter begins with a `Chapter N: <title>` header line and may
//! end with a `SUMMARY: <text>` trailer line. The generator writes both via
//! the prompt format; every renderer recovers titles and bodies through the
//! functions here rather than its own pattern matching.

pub const SUMMARY_PREFIX: &str = "SUMMARY:";
const HEADER_PREFIX: &str = "Chapter ";

/// Formats the header line the generation prompt instructs the service to
/// emit, e.g. `Chapter 2: The Long Road`.
pub fn chapter_header(index: usize, title: &str) -> String {
    format!("{}{}: {}", HEADER_PREFIX, index, title)
}

/// Parses the header line at the start of a chapter body. Returns the chapter
/// index and title, or `None` if the body does not open with a header.
pub fn parse_header(body: &str) -> Option<(usize, &str)> {
    let first_line = body.lines().next()?;
    let rest = first_line.strip_prefix(HEADER_PREFIX)?;
    let (digits, title) = rest.split_once(':')?;
    let index: usize = digits.trim().parse().ok()?;
    Some((index, title.trim()))
}

/// The chapter title carried by the header, or the empty string when the
/// header is missing or malformed.
pub fn chapter_title(body: &str) -> &str {
    parse_header(body).map(|(_, title)| title).unwrap_or("")
}

/// The body with its header line removed. Bodies without a header are
/// returned unchanged.
pub fn strip_header(body: &str) -> &str {
    if parse_header(body).is_none() {
        return body;
    }
    match body.split_once('\n') {
        Some((_, rest)) => rest.trim_start_matches('\n'),
        None => "",
    }
}

/// Splits the `SUMMARY:` trailer off a raw service response. Returns the body
/// (trailer removed, trailing whitespace trimmed) and the summary text when
/// the trailer is present.
pub fn split_summary(raw: &str) -> (String, Option<String>) {
    let last_line = raw.lines().rev().find(|l| !l.trim().is_empty());
    if let Some(line) = last_line {
        if let Some(text) = line.trim_start().strip_prefix(SUMMARY_PREFIX) {
            let cut = raw.rfind(line).unwrap_or(raw.len());
            let body = raw[..cut].trim_end().to_string();
            return (body, Some(text.trim().to_string()));
        }
    }
    (raw.trim_end().to_string(), None)
}

/// Deterministic summary used when the service omits the trailer. Stable for
/// identical inputs so reruns stay reproducible.
pub fn fallback_summary(index: usize, character: &str) -> String {
    format!("Chapter {} of the story about {}", index, character)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_round_trip() {
        let header = chapter_header(2, "The Long Road");
        assert_eq!(header, "Chapter 2: The Long Road");
        let body = format!("{}\nSome text.", header);
        assert_eq!(parse_header(&body), Some((2, "The Long Road")));
    }

    #[test]
    fn test_parse_header_missing() {
        assert_eq!(parse_header("Once upon a time"), None);
        assert_eq!(chapter_title("Once upon a time"), "");
        assert_eq!(parse_header("Chapter two: no digits"), None);
    }

    #[test]
    fn test_strip_header() {
        let body = "Chapter 1: Dawn\nIt was early.\nVery early.";
        assert_eq!(strip_header(body), "It was early.\nVery early.");
        assert_eq!(strip_header("no header here"), "no header here");
        assert_eq!(strip_header("Chapter 3: Lone Header"), "");
    }

    #[test]
    fn test_split_summary_present() {
        let raw = "Chapter 1: Dawn\nIt was early.\n\nSUMMARY: The day began.";
        let (body, summary) = split_summary(raw);
        assert_eq!(body, "Chapter 1: Dawn\nIt was early.");
        assert_eq!(summary.as_deref(), Some("The day began."));
    }

    #[test]
    fn test_split_summary_absent() {
        let raw = "Chapter 1: Dawn\nIt was early.\n";
        let (body, summary) = split_summary(raw);
        assert_eq!(body, "Chapter 1: Dawn\nIt was early.");
        assert!(summary.is_none());
    }

    #[test]
    fn test_fallback_summary_is_stable() {
        assert_eq!(
            fallback_summary(2, "Maya"),
            fallback_summary(2, "Maya"),
        );
        assert_eq!(
            fallback_summary(2, "Maya"),
            "Chapter 2 of the story about Maya"
        );
    }
}

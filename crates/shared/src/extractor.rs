/// Maximum characters sent to the summarization backend
pub const MAX_SUMMARY_INPUT_CHARS: usize = 4000;

/// Maximum characters kept when a summarizer response has no recognised shape
pub const MAX_RAW_FALLBACK_CHARS: usize = 800;

// Wide enough that html2text does not wrap ordinary paragraphs
const RENDER_WIDTH: usize = 10_000;

/// Render an HTML fragment to plain text with collapsed whitespace.
pub fn snippet_from_html(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    let text = html2text::from_read(html.as_bytes(), RENDER_WIDTH);
    collapse_whitespace(&text)
}

/// Truncate to at most `max_chars` characters, respecting UTF-8 boundaries.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Build the bounded summarizer input from an item's title and body.
pub fn summary_input(title: &str, body: &str) -> String {
    let title = title.trim();
    let body = body.trim();

    let joined = match (title.is_empty(), body.is_empty()) {
        (false, false) => format!("{title}\n\n{body}"),
        (false, true) => title.to_string(),
        (true, _) => body.to_string(),
    };

    truncate_chars(&joined, MAX_SUMMARY_INPUT_CHARS).to_string()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_strips_markup() {
        let snippet = snippet_from_html("<p>Hello <b>world</b></p>\n<p>again</p>");
        assert!(!snippet.contains('<'));
        assert!(snippet.contains("Hello"));
        assert!(snippet.contains("world"));
        assert!(snippet.contains("again"));
    }

    #[test]
    fn snippet_of_blank_html_is_empty() {
        assert_eq!(snippet_from_html("   "), "");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("short", 100), "short");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn summary_input_joins_and_bounds() {
        assert_eq!(summary_input("Title", "Body"), "Title\n\nBody");
        assert_eq!(summary_input("Title", ""), "Title");
        assert_eq!(summary_input("", "Body"), "Body");

        let long_body = "x".repeat(MAX_SUMMARY_INPUT_CHARS * 2);
        let input = summary_input("Title", &long_body);
        assert_eq!(input.chars().count(), MAX_SUMMARY_INPUT_CHARS);
        assert!(input.starts_with("Title\n\n"));
    }
}

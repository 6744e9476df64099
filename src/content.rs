//! HTML to readable text — strips boilerplate, keeps the main content.
//!
//! Non-content elements (scripts, styles, navigation, ads) are removed
//! before parsing, then the first matching content region is flattened to
//! plain text, whitespace-normalised, and capped in length. The result
//! feeds answer synthesis, so clean text matters more than completeness.

use scraper::{Html, Selector};

/// Default cap on extracted text length in characters.
pub const MAX_CONTENT_CHARS: usize = 100_000;

/// Elements removed wholesale, content included, before parsing.
const CHROME_TAGS: &[&str] = &[
    "script", "style", "nav", "footer", "header", "aside", "noscript", "svg", "iframe",
];

/// Content regions tried in priority order; `body` is the last resort.
const CONTENT_SELECTORS: &[&str] = &["article", "main", "[role=\"main\"]", "body"];

/// Extract readable text from raw HTML, capped at [`MAX_CONTENT_CHARS`].
///
/// Returns `None` when the document yields no extractable text; callers
/// treat that as a normal terminal outcome, not an error.
pub fn readable_text(html: &str) -> Option<String> {
    readable_text_with_limit(html, MAX_CONTENT_CHARS)
}

/// Same as [`readable_text`] with a custom character cap.
pub fn readable_text_with_limit(html: &str, max_chars: usize) -> Option<String> {
    if html.trim().is_empty() {
        return None;
    }

    let mut stripped = html.to_owned();
    for tag in CHROME_TAGS {
        stripped = remove_element(&stripped, tag);
    }

    let document = Html::parse_document(&stripped);
    let text = collapse_whitespace(&main_content(&document));
    if text.is_empty() {
        return None;
    }
    Some(clip(&text, max_chars))
}

/// Flatten the first non-empty content region to text.
fn main_content(document: &Html) -> String {
    for selector_str in CONTENT_SELECTORS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        if let Some(element) = document.select(&selector).next() {
            let text = element.text().collect::<Vec<_>>().join(" ");
            if !text.trim().is_empty() {
                return text;
            }
        }
    }
    String::new()
}

/// Case-insensitive ASCII search starting at `from`, returning a byte offset.
fn find_ascii_ci(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from > haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
        .map(|pos| pos + from)
}

/// Remove every `<tag>…</tag>` span, content included.
///
/// An opening tag without a matching close is dropped up to the end of its
/// own `>`. A prefix match like `<navigate>` for `<nav>` is left alone.
fn remove_element(html: &str, tag: &str) -> String {
    let bytes = html.as_bytes();
    let open = format!("<{tag}").into_bytes();
    let close = format!("</{tag}>").into_bytes();

    let mut out = String::with_capacity(html.len());
    let mut cursor = 0usize;

    while let Some(start) = find_ascii_ci(bytes, &open, cursor) {
        let after_open = start + open.len();
        let delimited = matches!(
            bytes.get(after_open),
            None | Some(b' ' | b'>' | b'/' | b'\t' | b'\n' | b'\r')
        );
        if !delimited {
            out.push_str(&html[cursor..after_open]);
            cursor = after_open;
            continue;
        }

        out.push_str(&html[cursor..start]);
        cursor = if let Some(end) = find_ascii_ci(bytes, &close, start) {
            end + close.len()
        } else if let Some(gt) = bytes[start..].iter().position(|&b| b == b'>') {
            start + gt + 1
        } else {
            bytes.len()
        };
    }

    out.push_str(&html[cursor..]);
    out
}

/// Collapse runs of spaces and cap blank lines at one.
fn collapse_whitespace(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    for raw_line in text.lines() {
        let line = raw_line.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() {
            if lines.is_empty() || lines.last().is_some_and(|l| l.is_empty()) {
                continue;
            }
            lines.push(String::new());
        } else {
            lines.push(line);
        }
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

/// Truncate to `max_chars`, backing off to a char boundary.
fn clip(text: &str, max_chars: usize) -> String {
    if text.len() <= max_chars {
        return text.to_owned();
    }
    let mut end = max_chars;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}\n\n[content truncated]", &text[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_preferred_over_surrounding_chrome() {
        let html = r#"<html><body>
            <nav>Navigation stuff</nav>
            <article>Article content here</article>
            <footer>Footer stuff</footer>
        </body></html>"#;
        let text = readable_text(html).expect("should extract");
        assert!(text.contains("Article content"));
        assert!(!text.contains("Navigation"));
        assert!(!text.contains("Footer"));
    }

    #[test]
    fn falls_back_to_body() {
        let html = "<html><body>Body content only</body></html>";
        let text = readable_text(html).expect("should extract");
        assert!(text.contains("Body content"));
    }

    #[test]
    fn scripts_and_styles_removed() {
        let html = r#"<html><body>
            <p>Real content</p>
            <script>var x = 1; alert('hi');</script>
            <style>.foo { color: red; }</style>
        </body></html>"#;
        let text = readable_text(html).expect("should extract");
        assert!(text.contains("Real content"));
        assert!(!text.contains("alert"));
        assert!(!text.contains("color: red"));
    }

    #[test]
    fn all_chrome_tags_removed() {
        let html = r#"<html><body>
            <header>Header content</header>
            <nav>Nav links</nav>
            <main>Main content</main>
            <aside>Sidebar stuff</aside>
            <footer>Footer info</footer>
            <noscript>Enable JS please</noscript>
            <iframe src="ad.html">Ad frame</iframe>
        </body></html>"#;
        let text = readable_text(html).expect("should extract");
        assert!(text.contains("Main content"));
        for leaked in [
            "Header content",
            "Nav links",
            "Sidebar stuff",
            "Footer info",
            "Enable JS",
            "Ad frame",
        ] {
            assert!(!text.contains(leaked), "leaked: {leaked}");
        }
    }

    #[test]
    fn tag_prefix_not_confused_with_longer_tag() {
        let html = "<html><body><nav>Skip this</nav><p>Keep this navigate text</p></body></html>";
        let text = readable_text(html).expect("should extract");
        assert!(!text.contains("Skip this"));
        assert!(text.contains("navigate text"));
    }

    #[test]
    fn uppercase_tags_also_removed() {
        let html = "<html><body><SCRIPT>alert(1)</SCRIPT><p>Visible</p></body></html>";
        let text = readable_text(html).expect("should extract");
        assert!(text.contains("Visible"));
        assert!(!text.contains("alert"));
    }

    #[test]
    fn unclosed_chrome_tag_drops_only_opening() {
        let html = "<html><body><p>Before</p><script src=\"x.js\"><p>After</p></body></html>";
        // No closing </script>: only the opening tag itself is dropped.
        let text = readable_text(html).expect("should extract");
        assert!(text.contains("Before"));
        assert!(text.contains("After"));
    }

    #[test]
    fn empty_html_yields_none() {
        assert!(readable_text("").is_none());
        assert!(readable_text("   \n  ").is_none());
    }

    #[test]
    fn whitespace_only_body_yields_none() {
        let html = "<html><body>   \n\n\n   </body></html>";
        assert!(readable_text(html).is_none());
    }

    #[test]
    fn only_scripts_and_styles_yields_none() {
        let html = r#"<html>
            <head><style>body{color:red}</style></head>
            <body>
                <script>console.log('hello');</script>
            </body>
        </html>"#;
        assert!(readable_text(html).is_none());
    }

    #[test]
    fn whitespace_collapsed() {
        let html = "<html><body>Word1    Word2\n\n\n\n\nWord3</body></html>";
        let text = readable_text(html).expect("should extract");
        assert!(!text.contains("  "));
        assert!(!text.contains("\n\n\n"));
    }

    #[test]
    fn truncation_at_limit() {
        let long_text = "word ".repeat(1000);
        let html = format!("<html><body>{long_text}</body></html>");
        let text = readable_text_with_limit(&html, 100).expect("should extract");
        assert!(text.len() <= 125);
        assert!(text.contains("[content truncated]"));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let body = "Hello ".to_owned() + &"é".repeat(200);
        let html = format!("<html><body>{body}</body></html>");
        // Must not panic on a multi-byte boundary.
        let text = readable_text_with_limit(&html, 51).expect("should extract");
        assert!(text.contains("[content truncated]"));
    }

    #[test]
    fn short_text_not_truncated() {
        let html = "<html><body>Short body</body></html>";
        let text = readable_text(html).expect("should extract");
        assert!(!text.contains("[content truncated]"));
    }

    #[test]
    fn deeply_nested_content_extracted() {
        let html = r#"<html><body>
            <div><div><div><div><div>
                <p>Deeply nested paragraph content here.</p>
            </div></div></div></div></div>
        </body></html>"#;
        let text = readable_text(html).expect("should extract");
        assert!(text.contains("Deeply nested paragraph"));
    }

    #[test]
    fn main_preferred_over_plain_divs() {
        let html = r#"<html><body>
            <div>Outer div</div>
            <main>Main content area</main>
        </body></html>"#;
        let text = readable_text(html).expect("should extract");
        assert!(text.contains("Main content area"));
    }

    #[test]
    fn find_ascii_ci_past_end_is_none() {
        assert!(find_ascii_ci(b"abc", b"abc", 4).is_none());
        assert_eq!(find_ascii_ci(b"xxABCxx", b"abc", 0), Some(2));
    }
}

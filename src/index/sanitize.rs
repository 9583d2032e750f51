//! Plain-text extraction from raw HTML bodies.

use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;

/// Tag-shaped text only: `<` directly followed by a letter, `/`, `!` or `?`.
/// A `<` followed by whitespace or a digit is ordinary text.
static TAG: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?s)<!--.*?-->|</?[A-Za-z][^<>]*>|<[!?][^<>]*>"));
static LINE_BREAKS: LazyLock<Regex> = LazyLock::new(|| pattern(r"[\r\n]+"));
static BLANKS: LazyLock<Regex> = LazyLock::new(|| pattern(r"[\t ]+"));
static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"[^a-zA-Z0-9!@#$%^\&*()_+=.,?\- ]"));

#[allow(clippy::expect_used)]
fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("static pattern compiles")
}

/// Reduce a raw HTML body to searchable plain text.
///
/// Entities are decoded and markup removed, then anything outside
/// `[a-zA-Z0-9-!@#$%^&*()_+=.,?]` becomes a space. Whitespace is collapsed
/// so the result never holds two consecutive whitespace characters and has
/// no leading or trailing whitespace. Non-Latin text and emoji are dropped.
#[must_use]
pub fn sanitize(raw: &str) -> String {
    let text = raw.replace("&nbsp;", " ");
    let text = decode_and_strip(&text);
    // Entity-encoded markup only becomes a tag after decoding.
    let text = TAG.replace_all(&text, "");
    let text = LINE_BREAKS.replace_all(&text, " ");
    let text = BLANKS.replace_all(&text, " ");
    let text = DISALLOWED.replace_all(&text, " ");
    BLANKS.replace_all(&text, " ").trim().to_string()
}

/// Parse `html` as a fragment and concatenate its text nodes.
fn decode_and_strip(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    fragment.root_element().text().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_paragraph_with_nbsp_and_spacing() {
        assert_eq!(
            sanitize("<p>Hello&nbsp;World!</p>\n\n  Extra   space"),
            "Hello World! Extra space"
        );
    }

    #[test]
    fn decodes_entities() {
        assert_eq!(sanitize("Fish &amp; Chips"), "Fish & Chips");
        assert_eq!(sanitize("50&#37; off"), "50% off");
    }

    #[test]
    fn strips_entity_encoded_tags() {
        assert_eq!(sanitize("&lt;b&gt;bold&lt;/b&gt; move"), "bold move");
    }

    #[test]
    fn drops_accented_and_non_latin_characters() {
        assert_eq!(sanitize("caf&eacute; menu"), "caf menu");
        assert_eq!(sanitize("Tokyo 東京 trip"), "Tokyo trip");
    }

    #[test]
    fn drops_emoji_and_stray_punctuation() {
        assert_eq!(sanitize("great 🏠 house; \"really\""), "great house really");
    }

    #[test]
    fn keeps_allowed_punctuation() {
        assert_eq!(
            sanitize("a-b !@#$%^&*()_+=., why?"),
            "a-b !@#$%^&*()_+=., why?"
        );
    }

    #[test]
    fn collapses_crlf_and_tabs() {
        assert_eq!(sanitize("one\r\n\r\ntwo\t\tthree"), "one two three");
    }

    #[test]
    fn keeps_text_around_comparison_signs() {
        assert_eq!(
            sanitize("<p>Price &lt; 5 and size &gt; 3 rooms</p>"),
            "Price 5 and size 3 rooms"
        );
        assert_eq!(sanitize("<p>if a < b and c > d</p>"), "if a b and c d");
    }

    #[test]
    fn strips_entity_encoded_comments_and_doctypes() {
        assert_eq!(
            sanitize("&lt;!-- note --&gt;kept &lt;!DOCTYPE html&gt;text"),
            "kept text"
        );
    }

    #[test]
    fn ignores_comments_and_attributes() {
        assert_eq!(
            sanitize(r#"<!-- hidden --><a href="/x" title="t">Link</a> text"#),
            "Link text"
        );
    }

    #[test]
    fn empty_and_markup_only_bodies_become_empty() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("<div><br/></div>"), "");
        assert_eq!(sanitize("&nbsp;&nbsp;"), "");
    }

    #[test]
    fn output_never_has_tags_nbsp_or_double_whitespace() {
        let inputs = [
            "<h1>Title</h1><p>Body&nbsp;&nbsp;text</p>",
            "<ul>\n<li>one</li>\n<li>two</li>\n</ul>",
            "x &lt;script&gt;alert(1)&lt;/script&gt; y",
            "tabs\t\t\tand\n\n\nlines \u{a0} nbsp",
            "&amp;nbsp; literal",
            "emoji 🎉🎉 between 🎉 words",
        ];

        for input in inputs {
            let out = sanitize(input);
            assert!(!out.contains('<') && !out.contains('>'), "{out:?}");
            assert!(!out.contains("&nbsp;"), "{out:?}");
            assert!(!out.contains("  "), "{out:?}");
            assert_eq!(out, out.trim(), "{out:?}");
            assert!(
                out.chars().all(|c| c == ' ' || !c.is_whitespace()),
                "{out:?}"
            );
        }
    }
}

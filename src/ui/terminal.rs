//! Line-oriented view for terminals.

use std::borrow::Cow;
use std::io::Write;

use regex::{Regex, RegexBuilder};

use crate::search::Suggestion;
use crate::ui::SuggestionView;

/// Writes suggestions as numbered `title  link` lines.
///
/// With highlighting on, the parts of each title matching a query token are
/// wrapped in brackets. Write errors are ignored; a closed terminal just
/// stops showing output.
pub struct TerminalView<W: Write> {
    out: W,
    highlight: bool,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            highlight: false,
        }
    }

    #[must_use]
    pub fn with_highlight(mut self, highlight: bool) -> Self {
        self.highlight = highlight;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> SuggestionView for TerminalView<W> {
    fn render(&mut self, suggestions: &[Suggestion], query_tokens: &[String]) {
        if suggestions.is_empty() {
            let _ = writeln!(self.out, "  (no suggestions)");
        }

        let matcher = if self.highlight {
            match_pattern(query_tokens)
        } else {
            None
        };

        for (position, suggestion) in suggestions.iter().enumerate() {
            let title = match &matcher {
                Some(re) => re.replace_all(&suggestion.title, "[$0]"),
                None => Cow::Borrowed(suggestion.title.as_str()),
            };
            let _ = writeln!(
                self.out,
                "  {}. {title}  {}",
                position + 1,
                suggestion.link
            );
        }
        let _ = self.out.flush();
    }

    fn clear(&mut self) {
        let _ = self.out.flush();
    }

    fn set_overlay(&mut self, open: bool) {
        let state = if open { "opened" } else { "closed" };
        let _ = writeln!(self.out, "[search {state}]");
    }

    fn navigate(&mut self, link: &str) {
        let _ = writeln!(self.out, "-> {link}");
        let _ = self.out.flush();
    }
}

/// Case-insensitive alternation of `tokens`, longest first so the widest
/// match wins at each position.
fn match_pattern(tokens: &[String]) -> Option<Regex> {
    let mut tokens: Vec<&str> = tokens
        .iter()
        .map(String::as_str)
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.is_empty() {
        return None;
    }
    tokens.sort_unstable();
    tokens.dedup();
    tokens.sort_by_key(|t| std::cmp::Reverse(t.len()));

    let alternation = tokens
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");

    match RegexBuilder::new(&alternation).case_insensitive(true).build() {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::debug!(error = %e, "highlight disabled for this query");
            None
        }
    }
}

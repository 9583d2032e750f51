//! Suggestion engine over a loaded index snapshot.
//!
//! Matching is substring-based: a document matches when every query token
//! appears inside one of its tokens. Results keep snapshot order.

pub mod engine;
pub mod index;
pub mod source;

use std::sync::Arc;

use serde::Serialize;

use crate::snapshot::Document;

pub use engine::{EngineStatus, RetryPolicy, SharedIndex, SuggestionEngine};
pub use index::TokenIndex;
pub use source::{FetchError, PrefetchCache, SnapshotLoader, SnapshotSource};

/// A matched document as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub title: String,
    pub link: String,
}

impl From<&Document> for Suggestion {
    fn from(doc: &Document) -> Self {
        Self {
            title: doc.title.clone(),
            link: doc.link.clone(),
        }
    }
}

/// Anything that can answer a partial query with suggestions.
pub trait Suggester {
    /// Suggestions for `query`, never more than the configured limit.
    fn suggest(&self, query: &str) -> Vec<Suggestion>;
}

impl<T: Suggester + ?Sized> Suggester for &T {
    fn suggest(&self, query: &str) -> Vec<Suggestion> {
        (**self).suggest(query)
    }
}

impl<T: Suggester + ?Sized> Suggester for Arc<T> {
    fn suggest(&self, query: &str) -> Vec<Suggestion> {
        (**self).suggest(query)
    }
}

/// Split on whitespace and lowercase each token.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace().map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_lowercases_and_splits_on_any_whitespace() {
        let tokens: Vec<String> = tokenize("  Modern\tHOUSE\nplan ").collect();
        assert_eq!(tokens, vec!["modern", "house", "plan"]);
    }

    #[test]
    fn tokenize_empty_yields_nothing() {
        assert_eq!(tokenize("   ").count(), 0);
    }
}

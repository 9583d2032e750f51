//! In-memory token index over snapshot documents.

use std::collections::{BTreeMap, BTreeSet};

use crate::search::{Suggestion, tokenize};
use crate::snapshot::Document;

/// Documents plus a vocabulary mapping each distinct token to the
/// ascending positions of the documents containing it.
///
/// Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct TokenIndex {
    documents: Vec<Document>,
    vocabulary: BTreeMap<String, Vec<usize>>,
}

impl TokenIndex {
    /// Index the content and title tokens of `documents`.
    #[must_use]
    pub fn new(documents: Vec<Document>) -> Self {
        let mut vocabulary: BTreeMap<String, Vec<usize>> = BTreeMap::new();

        for (position, doc) in documents.iter().enumerate() {
            for token in tokenize(&doc.content).chain(tokenize(&doc.title)) {
                let postings = vocabulary.entry(token).or_default();
                // Positions arrive in ascending order, so only the tail can repeat.
                if postings.last() != Some(&position) {
                    postings.push(position);
                }
            }
        }

        Self {
            documents,
            vocabulary,
        }
    }

    #[must_use]
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Number of distinct tokens.
    #[must_use]
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Documents matching every token of `query`, in snapshot order,
    /// truncated to `limit`. Empty queries match nothing.
    #[must_use]
    pub fn search(&self, query: &str, limit: usize) -> Vec<Suggestion> {
        let mut tokens: Vec<String> = tokenize(query).collect();
        if tokens.is_empty() || limit == 0 {
            return vec![];
        }

        tokens.sort();
        tokens.dedup();
        // Longer tokens are more selective and prune the candidate set sooner.
        tokens.sort_by_key(|t| std::cmp::Reverse(t.len()));

        let mut candidates: Option<BTreeSet<usize>> = None;
        for token in &tokens {
            let hits = self.positions_containing(token);
            let narrowed: BTreeSet<usize> = match candidates {
                None => hits,
                Some(current) => current.intersection(&hits).copied().collect(),
            };
            if narrowed.is_empty() {
                return vec![];
            }
            candidates = Some(narrowed);
        }

        candidates
            .into_iter()
            .flatten()
            .take(limit)
            .map(|position| Suggestion::from(&self.documents[position]))
            .collect()
    }

    fn positions_containing(&self, needle: &str) -> BTreeSet<usize> {
        self.vocabulary
            .iter()
            .filter(|(token, _)| token.contains(needle))
            .flat_map(|(_, postings)| postings.iter().copied())
            .collect()
    }
}

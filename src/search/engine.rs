//! Suggestion engine lifecycle: load once, then answer queries in memory.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::search::{SnapshotLoader, Suggester, Suggestion, TokenIndex};
use crate::snapshot::Document;

/// Exponential backoff between failed load attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub base: Duration,
    pub max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(1),
            max: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Delay before the next attempt after `failures` consecutive failures.
    #[must_use]
    pub fn delay(&self, failures: u32) -> Duration {
        let exponent = failures.saturating_sub(1).min(16);
        self.base.saturating_mul(1 << exponent).min(self.max)
    }
}

/// Coarse engine state, for callers that want to report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    Pending,
    Ready,
    Unavailable,
}

#[derive(Debug)]
enum State {
    Pending,
    Ready(Arc<TokenIndex>),
    Unavailable { failures: u32, retry_at: Instant },
}

/// Read-only handle to a loaded index, cheap to clone and share between
/// several search inputs.
#[derive(Debug, Clone)]
pub struct SharedIndex {
    index: Arc<TokenIndex>,
    limit: usize,
}

impl SharedIndex {
    #[must_use]
    pub fn index(&self) -> &TokenIndex {
        &self.index
    }
}

impl Suggester for SharedIndex {
    fn suggest(&self, query: &str) -> Vec<Suggestion> {
        self.index.search(query, self.limit)
    }
}

/// Answers partial queries from a snapshot loaded once per session.
///
/// Until [`initialize`](Self::initialize) succeeds every query yields no
/// suggestions. A failed load is retried only after the backoff delay.
#[derive(Debug)]
pub struct SuggestionEngine {
    loader: Option<SnapshotLoader>,
    limit: usize,
    retry: RetryPolicy,
    state: State,
}

impl SuggestionEngine {
    #[must_use]
    pub fn new(loader: SnapshotLoader, limit: usize) -> Self {
        Self {
            loader: Some(loader),
            limit,
            retry: RetryPolicy::default(),
            state: State::Pending,
        }
    }

    /// An engine that is ready immediately, without a loader.
    #[must_use]
    pub fn from_documents(documents: Vec<Document>, limit: usize) -> Self {
        Self {
            loader: None,
            limit,
            retry: RetryPolicy::default(),
            state: State::Ready(Arc::new(TokenIndex::new(documents))),
        }
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn status(&self) -> EngineStatus {
        match self.state {
            State::Pending => EngineStatus::Pending,
            State::Ready(_) => EngineStatus::Ready,
            State::Unavailable { .. } => EngineStatus::Unavailable,
        }
    }

    /// Load the snapshot if that has not happened yet.
    ///
    /// Returns whether the engine is ready. Never fails: a load error is
    /// logged and leaves the engine unavailable until the next attempt is
    /// due.
    pub fn initialize(&mut self) -> bool {
        let failures = match self.state {
            State::Ready(_) => return true,
            State::Pending => 0,
            State::Unavailable { failures, retry_at } => {
                if Instant::now() < retry_at {
                    tracing::debug!(failures, "snapshot load backing off");
                    return false;
                }
                failures
            }
        };

        let Some(loader) = &self.loader else {
            return false;
        };

        match loader.load() {
            Ok(decoded) => {
                tracing::info!(
                    source = %loader.source(),
                    documents = decoded.documents.len(),
                    skipped = decoded.skipped,
                    "snapshot loaded"
                );
                self.state = State::Ready(Arc::new(TokenIndex::new(decoded.documents)));
                true
            }
            Err(e) => {
                let failures = failures.saturating_add(1);
                let delay = self.retry.delay(failures);
                tracing::warn!(
                    error = %e,
                    failures,
                    retry_in_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "snapshot unavailable"
                );
                let now = Instant::now();
                self.state = State::Unavailable {
                    failures,
                    retry_at: now.checked_add(delay).unwrap_or(now),
                };
                false
            }
        }
    }

    /// Shared handle to the loaded index, once ready.
    #[must_use]
    pub fn handle(&self) -> Option<SharedIndex> {
        match &self.state {
            State::Ready(index) => Some(SharedIndex {
                index: Arc::clone(index),
                limit: self.limit,
            }),
            _ => None,
        }
    }

    /// Loaded documents in snapshot order, empty unless ready.
    #[must_use]
    pub fn documents(&self) -> &[Document] {
        match &self.state {
            State::Ready(index) => index.documents(),
            _ => &[],
        }
    }
}

impl Suggester for SuggestionEngine {
    fn suggest(&self, query: &str) -> Vec<Suggestion> {
        match &self.state {
            State::Ready(index) => index.search(query, self.limit),
            _ => vec![],
        }
    }
}

//! Command implementations behind the CLI.

use std::io::{BufRead, Write};

use crate::config::{Config, SearchConfig, expand_tilde};
use crate::corpus::Corpus;
use crate::index::{self, IndexReport};
use crate::search::{
    PrefetchCache, RetryPolicy, SnapshotLoader, SnapshotSource, Suggester, Suggestion,
    SuggestionEngine,
};
use crate::snapshot::Document;
use crate::storage::SnapshotStore;
use crate::storage::local::LocalSnapshotStore;
use crate::ui::{SearchBox, TerminalView};

/// Maximum accepted query length.
const MAX_QUERY_LENGTH: usize = 1000;

/// Parse a comma-separated list into a vector.
///
/// Splits the input on commas, trims whitespace, and filters out empty strings.
#[must_use]
pub fn parse_list(values: Option<String>) -> Vec<String> {
    values
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Rebuild the snapshot from the content export.
///
/// # Arguments
///
/// * `source` - Export directory, defaults to `index.source` from config
/// * `output` - Snapshot file, defaults to `index.output` from config
/// * `types` - Comma-separated post types, defaults to `index.post_types`
///
/// # Errors
///
/// Returns an error if the content export cannot be loaded or the snapshot
/// cannot be written. The existing snapshot is untouched in both cases.
pub fn index(
    source: Option<&str>,
    output: Option<&str>,
    types: Option<String>,
) -> anyhow::Result<IndexReport> {
    let config = Config::load()?;

    let root = expand_tilde(source.unwrap_or(&config.index.source));
    let corpus = Corpus::load(&root)
        .map_err(|e| anyhow::anyhow!("Content source unavailable at {}: {e}", root.display()))?;

    let mut post_types = parse_list(types);
    if post_types.is_empty() {
        post_types = config.index.post_types.clone();
    }

    let store = LocalSnapshotStore::new(expand_tilde(output.unwrap_or(&config.index.output)));

    Ok(index::rebuild(&corpus, &store, &post_types)?)
}

/// Build a snapshot loader from search settings.
fn loader(search: &SearchConfig, snapshot: Option<&str>) -> SnapshotLoader {
    let source = SnapshotSource::parse(snapshot.unwrap_or(&search.snapshot));
    let mut loader = SnapshotLoader::new(source).with_timeout(search.fetch_timeout());

    if let Some(dir) = search.cache_dir() {
        loader = loader.with_cache(PrefetchCache::new(dir, search.prefetch_ttl()));
    }

    loader
}

/// Build an engine from search settings. The engine is not yet loaded.
fn engine(search: &SearchConfig, snapshot: Option<&str>, limit: Option<usize>) -> SuggestionEngine {
    SuggestionEngine::new(loader(search, snapshot), limit.unwrap_or(search.limit)).with_retry(
        RetryPolicy {
            base: std::time::Duration::from_secs(search.retry_base_secs),
            max: std::time::Duration::from_secs(search.retry_max_secs),
        },
    )
}

/// Suggest documents for a partial query.
///
/// An unavailable snapshot yields no suggestions rather than an error.
///
/// # Errors
///
/// Returns an error if the query is too long or config loading fails.
pub fn search(
    query: &str,
    limit: Option<usize>,
    snapshot: Option<&str>,
) -> anyhow::Result<Vec<Suggestion>> {
    let chars = query.chars().count();
    if chars > MAX_QUERY_LENGTH {
        anyhow::bail!("Query too long: {chars} chars (max {MAX_QUERY_LENGTH})");
    }

    let config = Config::load()?;
    let mut engine = engine(&config.search, snapshot, limit);
    engine.initialize();

    Ok(engine.suggest(query))
}

/// Load every document of the snapshot.
///
/// Local snapshots are read through the snapshot store the indexer writes
/// with; URLs go through the loader and its prefetch cache.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be fetched or is not a JSON array.
pub fn list(snapshot: Option<&str>) -> anyhow::Result<Vec<Document>> {
    let config = Config::load()?;
    let loader = loader(&config.search, snapshot);

    let decoded = match loader.source() {
        SnapshotSource::File(path) => {
            let store = LocalSnapshotStore::new(path.clone());
            if !store.exists() {
                anyhow::bail!("Snapshot unavailable: nothing at {}", store.location());
            }
            store
                .read_snapshot()
                .map_err(|e| anyhow::anyhow!("Snapshot unavailable: {e}"))?
        }
        SnapshotSource::Http(_) => loader
            .load()
            .map_err(|e| anyhow::anyhow!("Snapshot unavailable: {e}"))?,
    };

    if decoded.skipped > 0 {
        tracing::warn!(skipped = decoded.skipped, "snapshot has malformed entries");
    }

    Ok(decoded.documents)
}

/// Run an interactive search box over `input`, drawing to `output`.
///
/// Plain lines replace the input value, opening the overlay if it is closed.
/// Lines starting with `:` are commands: `:open`, `:close`, `:toggle`,
/// `:quit` and `:N` to select the N-th suggestion.
///
/// # Errors
///
/// Returns an error if config loading fails or `input` cannot be read.
pub fn shell<R, W>(
    input: R,
    output: W,
    limit: Option<usize>,
    snapshot: Option<&str>,
) -> anyhow::Result<()>
where
    R: BufRead,
    W: Write,
{
    let config = Config::load()?;
    let mut engine = engine(&config.search, snapshot, limit);

    if !engine.initialize() {
        tracing::warn!("snapshot unavailable, suggestions disabled until it loads");
    }

    let view = TerminalView::new(output).with_highlight(config.search.highlight);
    let mut search = SearchBox::new(engine, view);

    for line in input.lines() {
        let line = line?;
        let line = line.trim_end_matches(['\r', '\n']);

        match line.strip_prefix(':') {
            Some("quit" | "q") => break,
            Some("open") => {
                if !search.is_open() {
                    search.toggle();
                }
            }
            Some("close") => search.close(),
            Some("toggle") => search.toggle(),
            Some(command) => match command.trim().parse::<usize>() {
                Ok(n) if n >= 1 => {
                    if search.select(n - 1).is_none() {
                        tracing::warn!(n, "no suggestion at that position");
                    }
                }
                _ => tracing::warn!(command, "unknown shell command"),
            },
            None => {
                // Picks up a snapshot that failed to load earlier, once the
                // backoff allows another attempt.
                search.suggester_mut().initialize();
                search.input(line);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    mod parse_list_tests {
        use super::*;

        #[test]
        fn parse_single_value() {
            assert_eq!(parse_list(Some("page".to_string())), vec!["page"]);
        }

        #[test]
        fn parse_multiple_values() {
            assert_eq!(
                parse_list(Some("post, page, ce_projects".to_string())),
                vec!["post", "page", "ce_projects"]
            );
        }

        #[test]
        fn parse_empty_values() {
            let empty: Vec<String> = vec![];
            assert_eq!(parse_list(None), empty);
            assert_eq!(parse_list(Some(String::new())), empty);
        }

        #[test]
        fn parse_filters_empty() {
            assert_eq!(
                parse_list(Some("post,,page,".to_string())),
                vec!["post", "page"]
            );
        }
    }

    mod search_tests {
        use super::*;

        #[test]
        fn query_too_long() {
            let long_query = "a".repeat(MAX_QUERY_LENGTH + 1);
            let result = search(&long_query, None, Some("/nonexistent.json"));
            assert!(result.is_err());
            assert!(result.unwrap_err().to_string().contains("too long"));
        }

        #[test]
        fn query_length_counts_characters() {
            let query = "東京".repeat(MAX_QUERY_LENGTH / 2);
            assert!(query.len() > MAX_QUERY_LENGTH);

            let result = search(&query, None, Some("/nonexistent.json"));
            assert!(result.unwrap().is_empty());
        }
    }
}

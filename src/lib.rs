//! supersearch - site search index builder and suggestion engine.
//!
//! The indexer turns a content export into a snapshot of plain-text
//! `{title, content, link}` records. The suggestion engine loads that
//! snapshot once and answers partial queries in memory, and the UI adapter
//! binds a search box to it.
//!
//! # Modules
//!
//! - [`commands`] - High-level operations (index, search, list, shell)
//! - [`corpus`] - Content export loading
//! - [`index`] - HTML sanitizing and snapshot rebuilds
//! - [`snapshot`] - Snapshot records and JSON encoding
//! - [`storage`] - Snapshot storage trait and implementations
//! - [`search`] - Token index, snapshot fetching and the suggestion engine
//! - [`ui`] - Search box adapter and terminal view
//! - [`config`] - Configuration loading
//! - [`cli`] - Command-line interface definitions

pub mod cli;
pub mod commands;
pub mod config;
pub mod corpus;
pub mod index;
pub mod search;
pub mod snapshot;
pub mod storage;
pub mod ui;

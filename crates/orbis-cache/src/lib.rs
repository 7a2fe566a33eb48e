#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/orbis-astro/orbis/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Chart document stores.
//!
//! This crate provides implementations of the [`ChartStore`] trait from `orbis-core`:
//!
//! - [`SqliteCache`] - Persistent SQLite-backed store (default, requires `sqlite` feature)
//! - [`InMemoryCache`] - In-memory store for tests and short-lived processes
//! - [`NoopCache`] - Store that keeps nothing

/// In-memory store.
pub mod memory;
/// No-op store.
pub mod noop;

/// SQLite-backed store.
#[cfg(feature = "sqlite")]
pub mod sqlite;

// Re-export the trait for convenience
pub use orbis_core::ChartStore;

// Re-export implementations
pub use memory::InMemoryCache;
pub use noop::NoopCache;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteCache;

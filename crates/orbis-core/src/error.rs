//! Error types for chart operations.
//!
//! This module defines [`ChartError`] which covers every failure that can
//! surface while parsing input, querying an ephemeris, searching for events,
//! or talking to the chart cache.

use thiserror::Error;

/// Errors that can occur during chart operations.
#[derive(Error, Debug)]
pub enum ChartError {
    /// Malformed date, time, coordinates or other caller input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The ephemeris provider failed for a body, house system or event query.
    #[error("Provider error: {0}")]
    Provider(String),

    /// The requested body, system or feature is not supported by the provider.
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// An iterative search exhausted its iteration budget.
    #[error("Search did not converge after {iterations} iterations")]
    NonConvergence {
        /// Number of iterations performed.
        iterations: u32,
    },

    /// An iterative search stalled because the body's speed was too small.
    #[error("Search stalled at JD {jd:.5} (speed {speed:.5} deg/day)")]
    Stalled {
        /// Julian day at which the stall was detected.
        jd: f64,
        /// Longitudinal speed observed at that instant.
        speed: f64,
    },

    /// Error interacting with the chart cache.
    #[error("Cache error: {0}")]
    Cache(String),

    /// Network-related errors while fetching ephemeris files.
    #[error("Network error: {0}")]
    Network(String),

    /// Filesystem errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization errors.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

/// Result type alias using [`ChartError`].
pub type Result<T> = std::result::Result<T, ChartError>;

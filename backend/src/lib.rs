//! # M7Box Statistics Backend
//!
//! Analysis engine behind the M7Box/DR range-box trading dashboard.
//!
//! Uploaded trade-session records become an immutable [`models::Dataset`].
//! Every dashboard interaction runs the same pure pass over it:
//!
//! 1. **Bin**: continuous retracement/extension columns are discretized into
//!    labelled, half-open intervals computed on the full dataset
//! 2. **Filter**: categorical, numeric and time-of-day predicates select rows
//! 3. **Aggregate**: bin counts, percentages, threshold probabilities and
//!    medians over the filtered subset
//!
//! ## Architecture
//!
//! - [`api`]: Data Transfer Objects (DTOs) for API responses
//! - [`models`]: Column-oriented dataset and record ingestion
//! - [`services`]: Binning, filtering, aggregation and dashboard assembly
//! - [`db`]: Per-session dataset store behind a repository trait
//! - [`config`]: TOML configuration
//! - [`http`]: Axum-based HTTP server and request handlers
//! - [`routes`]: Route-specific data types

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod routes;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;

pub mod dataset;
pub mod ingest;
pub mod time;

#[cfg(test)]
#[path = "dataset_tests.rs"]
mod dataset_tests;

pub use dataset::*;
pub use ingest::{dataset_from_records, IngestOptions};
pub use time::{format_clock, parse_date, parse_time_of_day};

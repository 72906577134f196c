//! Core types and computations for the gradebook dashboard.
//!
//! This crate holds the records, the statistics pipeline, the calendar
//! indexer and the chart geometry engine. It performs no I/O of its own;
//! persistence is injected through [`store::Persistence`].

pub mod calendar;
pub mod chart;
pub mod date;
pub mod error;
pub mod format;
pub mod grade;
pub mod order;
pub mod record;
pub mod report;
pub mod sanitize;
pub mod stats;
pub mod store;

pub use error::{Error, Result};

//! fieldmetrics: dashboard metrics over field installation records
//!
//! The core is [`services::MetricsAggregator`], a pure function from a record
//! set to a [`types::MetricSummary`]. Around it sit record sources with
//! snapshot/placeholder fallback, the dashboard filter, a validation pass and
//! role-gated view construction.

pub mod cli;
pub mod config;
pub mod services;
pub mod sources;
pub mod types;

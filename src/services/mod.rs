//! Services for record loading, filtering and metric aggregation

pub mod aggregator;
pub mod cache;
pub mod dashboard;
pub mod data_loader;
pub mod filter;
pub mod normalizer;
pub mod placeholder;
pub mod validation;

pub use aggregator::{AggregateOptions, MetricsAggregator};
pub use cache::SnapshotCacheService;
pub use dashboard::{CurrentUser, DashboardView, Settings};
pub use data_loader::{DataLoaderService, LoadResult, Provenance};
pub use filter::RecordFilter;
pub use validation::{validate, RecordIssue};

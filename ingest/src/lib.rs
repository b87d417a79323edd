//! Consolidation of raw user/item interaction logs into parquet tables keyed by
//! dense integer user ids.

pub mod consolidate;
pub mod error;
pub mod files;
pub mod loader;
pub mod mapper;
pub mod pipeline;
pub mod schema;
pub mod writer;

pub use error::{IngestError, Result};
pub use pipeline::{LoadObserver, NoopObserver, PipelinePaths, PipelineSummary, run};

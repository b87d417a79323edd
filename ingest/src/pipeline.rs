//! End-to-end run: enumerate, load, consolidate, map ids, write.
//!
//! The run is a single synchronous pass. Every batch is held in memory until
//! consolidation, so peak memory grows with the total input size. The two outputs are
//! written one after the other with no transactional coupling: if the second write
//! fails, the first file stays on disk.

use std::path::{Path, PathBuf};
use std::time::Instant;

use arrow::record_batch::RecordBatch;
use tracing::info;

use crate::consolidate::consolidate;
use crate::error::Result;
use crate::files::list_input_files;
use crate::loader::load_batch;
use crate::mapper::assign_user_ids;
use crate::writer::write_parquet;

// ============================================================================
// Configuration
// ============================================================================

/// The only configuration the pipeline needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelinePaths {
    /// Directory of raw tab-separated interaction files.
    pub interactions_raw: PathBuf,
    /// Destination of the id-rewritten interaction table.
    pub interactions_out: PathBuf,
    /// Destination of the `user_name -> user_id` mapping table.
    pub user_name_id_out: PathBuf,
}

// ============================================================================
// Observer
// ============================================================================

/// Receives load progress. Implementations must not influence the result.
pub trait LoadObserver {
    fn on_start(&mut self, _total_files: usize) {}

    /// Called after the `index`-th file (0-based) has been parsed.
    fn on_batch_loaded(&mut self, _index: usize, _path: &Path, _rows: usize) {}

    fn on_finish(&mut self) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl LoadObserver for NoopObserver {}

// ============================================================================
// Run
// ============================================================================

/// Counts reported after a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSummary {
    pub files: usize,
    pub rows: usize,
    pub users: usize,
}

/// Load every file in `dir` in enumeration order.
pub fn load_all(dir: &Path, observer: &mut dyn LoadObserver) -> Result<Vec<RecordBatch>> {
    let files = list_input_files(dir)?;
    info!("  Found {} files in {}", files.len(), dir.display());

    observer.on_start(files.len());
    let mut batches = Vec::with_capacity(files.len());
    for (index, path) in files.paths().enumerate() {
        let batch = load_batch(&path)?;
        observer.on_batch_loaded(index, &path, batch.num_rows());
        batches.push(batch);
    }
    observer.on_finish();
    Ok(batches)
}

/// Run the whole pipeline.
///
/// Any error aborts the run. Errors before the first write leave no output behind.
pub fn run(paths: &PipelinePaths, observer: &mut dyn LoadObserver) -> Result<PipelineSummary> {
    let start = Instant::now();

    info!("Step 1: Loading raw interactions...");
    let batches = load_all(&paths.interactions_raw, observer)?;
    let files = batches.len();
    let input_rows: usize = batches.iter().map(|b| b.num_rows()).sum();

    info!("Step 2: Consolidating {} batches ({} rows)...", files, input_rows);
    let consolidated = consolidate(&batches)?;
    drop(batches);

    info!("Step 3: Assigning user ids...");
    let mapped = assign_user_ids(&consolidated)?;
    drop(consolidated);
    info!("  {} distinct users", mapped.mapping.len());
    let mapping = mapped.mapping.to_record_batch()?;

    info!("Step 4: Writing outputs...");
    write_parquet(&mapped.interactions, &paths.interactions_out)?;
    write_parquet(&mapping, &paths.user_name_id_out)?;

    let summary = PipelineSummary {
        files,
        rows: mapped.interactions.num_rows(),
        users: mapped.mapping.len(),
    };
    info!(
        "Preprocessing complete in {:.2?}: {} files, {} rows, {} users",
        start.elapsed(),
        summary.files,
        summary.rows,
        summary.users
    );
    Ok(summary)
}

//! Parquet persistence for the output tables.

use std::fs::{self, File};
use std::path::Path;

use arrow::compute::concat_batches;
use arrow::record_batch::{RecordBatch, RecordBatchReader};
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use tracing::info;

use crate::error::{IngestError, Result};

/// Write `batch` to a parquet file at `path`, creating parent directories as needed.
///
/// Column names, types, nullability and row order are preserved; no index column is
/// added. Any failure is reported as [`IngestError::Write`] naming `path`.
pub fn write_parquet(batch: &RecordBatch, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| IngestError::write(path, e))?;
    }

    let file = File::create(path).map_err(|e| IngestError::write(path, e))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))
        .map_err(|e| IngestError::write(path, e))?;
    writer.write(batch).map_err(|e| IngestError::write(path, e))?;
    writer.close().map_err(|e| IngestError::write(path, e))?;

    info!("  Wrote {} ({} rows)", path.display(), batch.num_rows());
    Ok(())
}

/// Read a parquet file written by [`write_parquet`] back into a single batch.
pub fn read_parquet(path: &Path) -> Result<RecordBatch> {
    let file = File::open(path).map_err(|e| IngestError::read(path, e))?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| IngestError::read(path, e))?
        .with_batch_size(1_000_000)
        .build()
        .map_err(|e| IngestError::read(path, e))?;

    let schema = reader.schema().clone();
    let batches: Vec<RecordBatch> = reader
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| IngestError::read(path, e))?;
    Ok(concat_batches(&schema, &batches)?)
}

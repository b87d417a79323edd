//! Parsing of a single raw interaction file into an Arrow batch.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::compute::concat_batches;
use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::schema::{RAW_COLUMNS, raw_batch_schema};

/// Field delimiter of raw interaction files.
pub const DELIMITER: u8 = b'\t';

/// Rows per Arrow batch while reading; batches are concatenated per file afterwards.
const READ_BATCH_ROWS: usize = 1_000_000;

/// Read the header row of a raw file.
fn read_header(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|e| IngestError::read(path, e))?;
    let (schema, _) = Format::default()
        .with_header(true)
        .with_delimiter(DELIMITER)
        .infer_schema(file, Some(0))
        .map_err(|e| IngestError::malformed(path, e))?;
    Ok(schema.fields().iter().map(|f| f.name().clone()).collect())
}

/// Parse one raw interaction file.
///
/// The returned batch has exactly the columns of [`raw_batch_schema`], in that order,
/// with rows in on-disk order. Columns not declared in [`RAW_COLUMNS`] are ignored and
/// empty cells become nulls, as do trailing cells of a row shorter than the header.
/// A missing required column or a cell that does not parse
/// as its declared type is a [`IngestError::MalformedFile`].
pub fn load_batch(path: &Path) -> Result<RecordBatch> {
    let header = read_header(path)?;

    let mut projection = Vec::with_capacity(RAW_COLUMNS.len());
    for spec in RAW_COLUMNS.iter() {
        let idx = header
            .iter()
            .position(|h| h == spec.source)
            .ok_or_else(|| {
                IngestError::malformed(path, format!("missing required column '{}'", spec.source))
            })?;
        projection.push(idx);
    }

    // Undeclared columns are read as text and then projected away.
    let fields: Vec<Field> = header
        .iter()
        .map(|name| {
            let data_type = RAW_COLUMNS
                .iter()
                .find(|c| c.source == name)
                .map(|c| c.data_type.clone())
                .unwrap_or(DataType::Utf8);
            Field::new(name, data_type, true)
        })
        .collect();

    // Rows shorter than the header read their missing trailing cells as nulls.
    let file = File::open(path).map_err(|e| IngestError::read(path, e))?;
    let reader = ReaderBuilder::new(Arc::new(Schema::new(fields)))
        .with_header(true)
        .with_delimiter(DELIMITER)
        .with_truncated_rows(true)
        .with_projection(projection)
        .with_batch_size(READ_BATCH_ROWS)
        .build(file)
        .map_err(|e| IngestError::malformed(path, e))?;

    let batches: Vec<RecordBatch> = reader
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| IngestError::malformed(path, e))?;
    // The projection is in declaration order, so the batches already match the raw schema.
    let batch = concat_batches(&raw_batch_schema(), &batches)?;

    debug!("  {} rows from {}", batch.num_rows(), path.display());
    Ok(batch)
}

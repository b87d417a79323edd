//! Concatenation of per-file batches into the canonical interaction table.

use arrow::array::ArrayRef;
use arrow::compute::concat_batches;
use arrow::record_batch::RecordBatch;

use crate::error::Result;
use crate::schema::{RAW_COLUMNS, apply_missing_policy, consolidated_schema, raw_batch_schema};

/// Concatenate `batches` in order and normalize the result.
///
/// Row order is batch order, then on-disk order within each batch. Columns are renamed
/// to their canonical names (`user_id` -> `user_name`, `anime_id` -> `item_id`) and each
/// column's missing policy is applied, which zero-fills `score` and `progress`.
/// `favorite` and `status` keep their nulls. No rows are dropped or added.
pub fn consolidate(batches: &[RecordBatch]) -> Result<RecordBatch> {
    let concatenated = concat_batches(&raw_batch_schema(), batches)?;

    let columns: Vec<ArrayRef> = RAW_COLUMNS
        .iter()
        .zip(concatenated.columns())
        .map(|(spec, array)| apply_missing_policy(spec, array))
        .collect::<std::result::Result<_, _>>()?;

    Ok(RecordBatch::try_new(consolidated_schema(), columns)?)
}

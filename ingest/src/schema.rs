//! Column vocabulary and schemas for raw interaction files and the persisted tables.
//!
//! Every column of a raw interaction file is declared once in [`RAW_COLUMNS`]. The
//! loader's projection, the consolidator's rename map and the default-on-missing
//! rule are all derived from that declaration.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Int32Array};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::error::ArrowError;

// ============================================================================
// Column names
// ============================================================================

/// Column names used across raw files and outputs.
pub struct ColNames;

impl ColNames {
    pub const USER_ID: &'static str = "user_id";
    pub const USER_NAME: &'static str = "user_name";
    pub const ITEM_ID: &'static str = "item_id";
    pub const ANIME_ID: &'static str = "anime_id";
    pub const SCORE: &'static str = "score";
    pub const FAVORITE: &'static str = "favorite";
    pub const STATUS: &'static str = "status";
    pub const PROGRESS: &'static str = "progress";
}

// ============================================================================
// Raw column declaration
// ============================================================================

/// What to do with a null cell once all batches have been consolidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingPolicy {
    /// Leave nulls in place.
    Keep,
    /// Replace nulls with the given value. Only valid for `Int32` columns.
    Fill(i32),
}

/// Declaration of one column of a raw interaction file.
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    /// Header name in the raw tab-separated file.
    pub source: &'static str,
    /// Name after consolidation.
    pub canonical: &'static str,
    pub data_type: DataType,
    pub missing: MissingPolicy,
}

impl ColumnSpec {
    const fn new(
        source: &'static str,
        canonical: &'static str,
        data_type: DataType,
        missing: MissingPolicy,
    ) -> Self {
        Self {
            source,
            canonical,
            data_type,
            missing,
        }
    }

    /// Whether the column can still hold nulls after the missing policy is applied.
    pub fn nullable_after_fill(&self) -> bool {
        self.missing == MissingPolicy::Keep
    }
}

/// The projected raw columns, in output order.
///
/// The raw `user_id` column holds a user *name*; it becomes `user_name` after
/// consolidation and is later replaced by the integer `user_id` assigned by the mapper.
pub static RAW_COLUMNS: [ColumnSpec; 6] = [
    ColumnSpec::new(ColNames::USER_ID, ColNames::USER_NAME, DataType::Utf8, MissingPolicy::Keep),
    ColumnSpec::new(ColNames::ANIME_ID, ColNames::ITEM_ID, DataType::Int32, MissingPolicy::Keep),
    ColumnSpec::new(ColNames::SCORE, ColNames::SCORE, DataType::Int32, MissingPolicy::Fill(0)),
    ColumnSpec::new(ColNames::FAVORITE, ColNames::FAVORITE, DataType::Int32, MissingPolicy::Keep),
    ColumnSpec::new(ColNames::STATUS, ColNames::STATUS, DataType::Utf8, MissingPolicy::Keep),
    ColumnSpec::new(ColNames::PROGRESS, ColNames::PROGRESS, DataType::Int32, MissingPolicy::Fill(0)),
];

/// Schema of a freshly loaded batch: source names, every column nullable.
pub fn raw_batch_schema() -> SchemaRef {
    let fields: Vec<Field> = RAW_COLUMNS
        .iter()
        .map(|c| Field::new(c.source, c.data_type.clone(), true))
        .collect();
    Arc::new(Schema::new(fields))
}

/// Schema of the consolidated table: canonical names, filled columns non-nullable.
pub fn consolidated_schema() -> SchemaRef {
    let fields: Vec<Field> = RAW_COLUMNS
        .iter()
        .map(|c| Field::new(c.canonical, c.data_type.clone(), c.nullable_after_fill()))
        .collect();
    Arc::new(Schema::new(fields))
}

// ============================================================================
// Output schemas
// ============================================================================

/// Schema of the persisted interaction table.
///
/// `user_id` stays nullable: a row whose `user_name` was null gets no id.
pub fn interactions_schema() -> SchemaRef {
    let mut fields: Vec<Field> = RAW_COLUMNS
        .iter()
        .filter(|c| c.canonical != ColNames::USER_NAME)
        .map(|c| Field::new(c.canonical, c.data_type.clone(), c.nullable_after_fill()))
        .collect();
    fields.push(Field::new(ColNames::USER_ID, DataType::Int64, true));
    Arc::new(Schema::new(fields))
}

/// Schema of the persisted `user_name -> user_id` mapping table.
pub fn mapping_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new(ColNames::USER_NAME, DataType::Utf8, false),
        Field::new(ColNames::USER_ID, DataType::Int64, false),
    ]))
}

// ============================================================================
// Missing-value policy
// ============================================================================

/// Apply a column's [`MissingPolicy`] to an array.
pub fn apply_missing_policy(spec: &ColumnSpec, array: &ArrayRef) -> Result<ArrayRef, ArrowError> {
    let fill = match spec.missing {
        MissingPolicy::Keep => return Ok(array.clone()),
        MissingPolicy::Fill(v) => v,
    };
    if array.null_count() == 0 {
        return Ok(array.clone());
    }
    let ints = array
        .as_any()
        .downcast_ref::<Int32Array>()
        .ok_or_else(|| {
            ArrowError::InvalidArgumentError(format!(
                "fill policy on column '{}' requires Int32, found {}",
                spec.canonical,
                array.data_type()
            ))
        })?;
    let filled: Int32Array = ints.iter().map(|v| Some(v.unwrap_or(fill))).collect();
    Ok(Arc::new(filled))
}

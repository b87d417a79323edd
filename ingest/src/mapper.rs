//! Dense user identifiers.
//!
//! Ids are recomputed from scratch on every run: distinct user names are numbered
//! `1..=N` in order of first appearance in the consolidated table. Because that order
//! follows file load order, the same user can get a different id when the input file
//! set changes. Nothing is persisted between runs except the mapping table written
//! alongside the interactions.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Int64Array, StringArray};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use indexmap::IndexMap;

use crate::error::Result;
use crate::schema::{ColNames, interactions_schema, mapping_schema};

/// Bijection between the distinct user names of one run and `1..=N`.
#[derive(Debug, Clone, Default)]
pub struct IdentifierMapping {
    ids: IndexMap<String, i64>,
}

impl IdentifierMapping {
    /// Number names in first-appearance order, skipping nulls.
    pub fn from_names<'a>(names: impl IntoIterator<Item = Option<&'a str>>) -> Self {
        let mut ids: IndexMap<String, i64> = IndexMap::new();
        for name in names.into_iter().flatten() {
            if !ids.contains_key(name) {
                let next = ids.len() as i64 + 1;
                ids.insert(name.to_string(), next);
            }
        }
        Self { ids }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.ids.get(name).copied()
    }

    /// `(user_name, user_id)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.ids.iter().map(|(name, &id)| (name.as_str(), id))
    }

    /// The mapping as a `user_name, user_id` table, one row per user in id order.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let names: StringArray = self.ids.keys().map(|k| Some(k.as_str())).collect();
        let ids = Int64Array::from_iter_values(self.ids.values().copied());
        Ok(RecordBatch::try_new(
            mapping_schema(),
            vec![Arc::new(names), Arc::new(ids)],
        )?)
    }
}

/// The consolidated table rewritten to reference user ids, plus the mapping used.
#[derive(Debug, Clone)]
pub struct MappedInteractions {
    pub interactions: RecordBatch,
    pub mapping: IdentifierMapping,
}

/// Replace the `user_name` column of a consolidated table with a dense `user_id`.
///
/// The new `user_id` column is appended last and `user_name` is dropped; every other
/// column keeps its position and data. A row with a null `user_name` gets a null
/// `user_id`.
pub fn assign_user_ids(table: &RecordBatch) -> Result<MappedInteractions> {
    let schema = table.schema();
    let name_idx = schema.index_of(ColNames::USER_NAME)?;
    let names = table
        .column(name_idx)
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| {
            ArrowError::SchemaError(format!(
                "column '{}' must be Utf8, found {}",
                ColNames::USER_NAME,
                table.column(name_idx).data_type()
            ))
        })?;

    let mapping = IdentifierMapping::from_names(names.iter());
    let user_ids: Int64Array = names
        .iter()
        .map(|name| name.and_then(|n| mapping.get(n)))
        .collect();

    let mut columns: Vec<ArrayRef> = table
        .columns()
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != name_idx)
        .map(|(_, c)| c.clone())
        .collect();
    columns.push(Arc::new(user_ids));

    let interactions = RecordBatch::try_new(interactions_schema(), columns)?;
    Ok(MappedInteractions {
        interactions,
        mapping,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use arrow::array::Int32Array;

    use crate::schema::consolidated_schema;

    fn consolidated(users: Vec<Option<&str>>) -> RecordBatch {
        let n = users.len();
        RecordBatch::try_new(
            consolidated_schema(),
            vec![
                Arc::new(StringArray::from(users)),
                Arc::new(Int32Array::from_iter_values(0..n as i32)),
                Arc::new(Int32Array::from(vec![0; n])),
                Arc::new(Int32Array::from(vec![None; n])),
                Arc::new(StringArray::from(vec![Some("watching"); n])),
                Arc::new(Int32Array::from(vec![0; n])),
            ],
        )
        .unwrap()
    }

    fn user_ids(batch: &RecordBatch) -> Vec<Option<i64>> {
        batch
            .column_by_name("user_id")
            .unwrap()
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap()
            .iter()
            .collect()
    }

    #[test]
    fn test_first_appearance_order() {
        let table = consolidated(vec![Some("bob"), Some("alice"), Some("bob"), Some("carol")]);
        let mapped = assign_user_ids(&table).unwrap();

        let pairs: Vec<(&str, i64)> = mapped.mapping.iter().collect();
        assert_eq!(pairs, vec![("bob", 1), ("alice", 2), ("carol", 3)]);
        assert_eq!(
            user_ids(&mapped.interactions),
            vec![Some(1), Some(2), Some(1), Some(3)]
        );
    }

    #[test]
    fn test_user_name_dropped_and_other_columns_kept() {
        let table = consolidated(vec![Some("a"), Some("b")]);
        let mapped = assign_user_ids(&table).unwrap();
        let out = &mapped.interactions;

        assert_eq!(out.schema(), interactions_schema());
        assert!(out.column_by_name("user_name").is_none());
        assert_eq!(out.num_rows(), table.num_rows());
        let items = out
            .column_by_name("item_id")
            .unwrap()
            .as_any()
            .downcast_ref::<Int32Array>()
            .unwrap();
        assert_eq!(items.values().to_vec(), vec![0, 1]);
    }

    #[test]
    fn test_ids_are_dense_and_unique() {
        let names: Vec<String> = (0..50).map(|i| format!("user{}", i % 17)).collect();
        let table = consolidated(names.iter().map(|s| Some(s.as_str())).collect());
        let mapped = assign_user_ids(&table).unwrap();

        assert_eq!(mapped.mapping.len(), 17);
        let ids: HashSet<i64> = mapped.mapping.iter().map(|(_, id)| id).collect();
        assert_eq!(ids, (1..=17).collect::<HashSet<i64>>());
    }

    #[test]
    fn test_null_user_name_gets_null_id() {
        let table = consolidated(vec![Some("alice"), None, Some("bob")]);
        let mapped = assign_user_ids(&table).unwrap();

        assert_eq!(mapped.mapping.len(), 2);
        assert_eq!(mapped.mapping.get("bob"), Some(2));
        assert_eq!(user_ids(&mapped.interactions), vec![Some(1), None, Some(2)]);
    }

    #[test]
    fn test_mapping_table() {
        let mapping = IdentifierMapping::from_names([Some("x"), Some("y"), Some("x")]);
        let batch = mapping.to_record_batch().unwrap();
        assert_eq!(batch.schema(), mapping_schema());
        assert_eq!(batch.num_rows(), 2);
        let names = batch.column(0).as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(names.value(0), "x");
        assert_eq!(names.value(1), "y");
        assert_eq!(user_ids(&batch), vec![Some(1), Some(2)]);
    }
}

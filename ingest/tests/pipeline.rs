use std::fs;
use std::path::{Path, PathBuf};

use anirec_ingest::schema::{interactions_schema, mapping_schema};
use anirec_ingest::writer::read_parquet;
use anirec_ingest::{IngestError, NoopObserver, PipelinePaths, run};
use arrow::array::{Array, Int32Array, Int64Array, StringArray};
use arrow::record_batch::RecordBatch;
use tempfile::{TempDir, tempdir};

const HEADER: &str = "user_id\tanime_id\tscore\tfavorite\tstatus\tprogress\n";

fn layout(dir: &TempDir) -> PipelinePaths {
    let raw = dir.path().join("interactions_raw");
    fs::create_dir_all(&raw).unwrap();
    PipelinePaths {
        interactions_raw: raw,
        interactions_out: dir.path().join("out").join("interactions_score_favorite.parquet"),
        user_name_id_out: dir.path().join("out").join("user_name_id.parquet"),
    }
}

fn write_raw(paths: &PipelinePaths, name: &str, body: &str) -> PathBuf {
    let path = paths.interactions_raw.join(name);
    fs::write(&path, format!("{HEADER}{body}")).unwrap();
    path
}

fn ints(batch: &RecordBatch, name: &str) -> Vec<Option<i32>> {
    batch
        .column_by_name(name)
        .unwrap()
        .as_any()
        .downcast_ref::<Int32Array>()
        .unwrap()
        .iter()
        .collect()
}

fn longs(batch: &RecordBatch, name: &str) -> Vec<Option<i64>> {
    batch
        .column_by_name(name)
        .unwrap()
        .as_any()
        .downcast_ref::<Int64Array>()
        .unwrap()
        .iter()
        .collect()
}

fn strings(batch: &RecordBatch, name: &str) -> Vec<Option<String>> {
    batch
        .column_by_name(name)
        .unwrap()
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap()
        .iter()
        .map(|s| s.map(str::to_string))
        .collect()
}

fn field_names(batch: &RecordBatch) -> Vec<String> {
    batch.schema().fields().iter().map(|f| f.name().clone()).collect()
}

#[test]
fn two_files_alice_and_bob() {
    let dir = tempdir().unwrap();
    let paths = layout(&dir);
    write_raw(&paths, "a.tsv", "alice\t1\t8\t1\twatching\t5\n");
    write_raw(&paths, "b.tsv", "bob\t2\t\t0\tcompleted\t\n");

    let summary = run(&paths, &mut NoopObserver).unwrap();
    assert_eq!(summary.files, 2);
    assert_eq!(summary.rows, 2);
    assert_eq!(summary.users, 2);

    let interactions = read_parquet(&paths.interactions_out).unwrap();
    assert_eq!(
        field_names(&interactions),
        ["item_id", "score", "favorite", "status", "progress", "user_id"]
    );
    assert_eq!(interactions.schema().fields().len(), interactions_schema().fields().len());
    assert_eq!(ints(&interactions, "item_id"), vec![Some(1), Some(2)]);
    assert_eq!(ints(&interactions, "score"), vec![Some(8), Some(0)]);
    assert_eq!(ints(&interactions, "favorite"), vec![Some(1), Some(0)]);
    assert_eq!(ints(&interactions, "progress"), vec![Some(5), Some(0)]);
    assert_eq!(
        strings(&interactions, "status"),
        vec![Some("watching".to_string()), Some("completed".to_string())]
    );
    assert_eq!(longs(&interactions, "user_id"), vec![Some(1), Some(2)]);

    let mapping = read_parquet(&paths.user_name_id_out).unwrap();
    assert_eq!(field_names(&mapping), ["user_name", "user_id"]);
    assert_eq!(mapping.schema().fields().len(), mapping_schema().fields().len());
    assert_eq!(
        strings(&mapping, "user_name"),
        vec![Some("alice".to_string()), Some("bob".to_string())]
    );
    assert_eq!(longs(&mapping, "user_id"), vec![Some(1), Some(2)]);
}

#[test]
fn row_count_is_preserved_across_files() {
    let dir = tempdir().unwrap();
    let paths = layout(&dir);
    write_raw(&paths, "01.tsv", "u1\t1\t1\t0\tw\t1\nu2\t2\t\t\t\t\nu1\t1\t1\t0\tw\t1\n");
    write_raw(&paths, "02.tsv", "");
    write_raw(&paths, "03.tsv", "u3\t3\t3\t1\tc\t3\nu2\t4\t\t1\tc\t\n");

    let summary = run(&paths, &mut NoopObserver).unwrap();
    assert_eq!(summary.rows, 5);
    assert_eq!(summary.users, 3);

    let interactions = read_parquet(&paths.interactions_out).unwrap();
    assert_eq!(interactions.num_rows(), 5);
    // repeated interactions are kept
    assert_eq!(
        longs(&interactions, "user_id"),
        vec![Some(1), Some(2), Some(1), Some(3), Some(2)]
    );
    assert_eq!(interactions.column_by_name("score").unwrap().null_count(), 0);
    assert_eq!(interactions.column_by_name("progress").unwrap().null_count(), 0);
    assert_eq!(interactions.column_by_name("favorite").unwrap().null_count(), 1);
}

#[test]
fn missing_status_column_writes_nothing() {
    let dir = tempdir().unwrap();
    let paths = layout(&dir);
    write_raw(&paths, "a.tsv", "alice\t1\t8\t1\twatching\t5\n");
    let bad = paths.interactions_raw.join("b.tsv");
    fs::write(&bad, "user_id\tanime_id\tscore\tfavorite\tprogress\nbob\t2\t3\t0\t1\n").unwrap();

    match run(&paths, &mut NoopObserver).unwrap_err() {
        IngestError::MalformedFile { path, reason } => {
            assert_eq!(path, bad);
            assert!(reason.contains("status"));
        }
        other => panic!("expected MalformedFile, got {other:?}"),
    }
    assert!(!paths.interactions_out.exists());
    assert!(!paths.user_name_id_out.exists());
}

#[test]
fn missing_input_directory_is_fatal() {
    let dir = tempdir().unwrap();
    let mut paths = layout(&dir);
    paths.interactions_raw = dir.path().join("absent");

    let err = run(&paths, &mut NoopObserver).unwrap_err();
    assert!(matches!(err, IngestError::MissingInput { .. }));
    assert!(!paths.interactions_out.exists());
}

fn blocked(dir: &Path) -> PathBuf {
    let blocker = dir.join("blocker");
    fs::write(&blocker, "regular file").unwrap();
    blocker
}

#[test]
fn unwritable_output_is_reported_with_its_path() {
    let dir = tempdir().unwrap();
    let mut paths = layout(&dir);
    write_raw(&paths, "a.tsv", "alice\t1\t8\t1\twatching\t5\n");
    paths.interactions_out = blocked(dir.path()).join("interactions.parquet");

    match run(&paths, &mut NoopObserver).unwrap_err() {
        IngestError::Write { path, .. } => assert_eq!(path, paths.interactions_out),
        other => panic!("expected Write, got {other:?}"),
    }
    assert!(!paths.user_name_id_out.exists());
}

#[test]
fn failed_mapping_write_leaves_interactions_in_place() {
    let dir = tempdir().unwrap();
    let mut paths = layout(&dir);
    write_raw(&paths, "a.tsv", "alice\t1\t8\t1\twatching\t5\n");
    paths.user_name_id_out = blocked(dir.path()).join("user_name_id.parquet");

    match run(&paths, &mut NoopObserver).unwrap_err() {
        IngestError::Write { path, .. } => assert_eq!(path, paths.user_name_id_out),
        other => panic!("expected Write, got {other:?}"),
    }
    // No rollback of the first artifact.
    assert!(paths.interactions_out.exists());
}

//! Inspect the preprocessed tables: dump schema, row counts, user id coverage and
//! sample rows in a human-readable format.
//!
//! ## Usage
//!
//! ```sh
//! cargo run --release --bin inspect
//! cargo run --release --bin inspect -- --sample-rows 10
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anirec::settings::Settings;
use anirec_ingest::schema::ColNames;
use anirec_ingest::writer::read_parquet;
use arrow::array::{Array, Int64Array};
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(about = "Inspect the preprocessed interaction and user id tables")]
struct Args {
    /// Interaction table. Defaults to the configured output path.
    #[arg(long)]
    interactions: Option<PathBuf>,

    /// User name to id table. Defaults to the configured output path.
    #[arg(long)]
    mapping: Option<PathBuf>,

    /// Number of sample rows to dump per table (0 to skip).
    #[arg(long, default_value_t = 5)]
    sample_rows: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let settings = Settings::from_env()?;

    let interactions_path = args
        .interactions
        .unwrap_or(settings.paths.interactions_score_favorite);
    let mapping_path = args.mapping.unwrap_or(settings.paths.user_name_id);

    let interactions = read_parquet(&interactions_path)?;
    let mapping = read_parquet(&mapping_path)?;

    let interaction_users = distinct_user_ids(&interactions)?;
    let mapped_users = distinct_user_ids(&mapping)?;
    let unmapped = interaction_users.difference(&mapped_users).count();

    // ── Overview ──────────────────────────────────────────────────────────
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║  Interactions: {}", interactions_path.display());
    println!("║  User ids:     {}", mapping_path.display());
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!("║  Interactions:  {:>10}", interactions.num_rows());
    println!("║  Users:         {:>10}", mapping.num_rows());
    println!("║  Active users:  {:>10}", interaction_users.len());
    println!("║  Unmapped ids:  {:>10}", unmapped);
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    print_table("interactions", &interactions_path, &interactions, args.sample_rows)?;
    print_table("user_name_id", &mapping_path, &mapping, args.sample_rows)?;
    Ok(())
}

fn distinct_user_ids(batch: &RecordBatch) -> Result<HashSet<i64>, Box<dyn std::error::Error>> {
    let ids = batch
        .column_by_name(ColNames::USER_ID)
        .and_then(|c| c.as_any().downcast_ref::<Int64Array>())
        .ok_or("table has no int64 user_id column")?;
    Ok(ids.iter().flatten().collect())
}

fn print_table(
    name: &str,
    path: &Path,
    batch: &RecordBatch,
    sample_rows: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let schema = batch.schema();
    println!("┌─ Table \"{name}\" ({})", path.display());
    println!("│  Rows: {}  Columns: {}", batch.num_rows(), batch.num_columns());
    println!("│");
    for (ci, field) in schema.fields().iter().enumerate() {
        let nulls = batch.column(ci).null_count();
        let nullable = if field.is_nullable() { "nullable" } else { "required" };
        println!(
            "│  [{ci}] {} : {} ({nullable}, {nulls} nulls)",
            field.name(),
            field.data_type()
        );
    }

    if sample_rows > 0 {
        let n = batch.num_rows();
        let show = n.min(sample_rows);
        let options = FormatOptions::default().with_null("null");
        let formatters = batch
            .columns()
            .iter()
            .map(|c| ArrayFormatter::try_new(c.as_ref(), &options))
            .collect::<Result<Vec<_>, _>>()?;

        println!("│");
        println!("│  Sample rows (first {show} of {n}):");

        print!("│  {:>6}", "row");
        for field in schema.fields() {
            let truncated: String = field.name().chars().take(18).collect();
            print!(" │ {truncated:>18}");
        }
        println!();

        print!("│  {:─>6}", "");
        for _ in schema.fields() {
            print!("─┼─{:─>18}", "");
        }
        println!();

        for row in 0..show {
            print!("│  {row:>6}");
            for formatter in &formatters {
                let cell = formatter.value(row).to_string();
                let truncated: String = cell.chars().take(18).collect();
                print!(" │ {truncated:>18}");
            }
            println!();
        }
        if n > show {
            println!("│  ... ({} more rows)", n - show);
        }
    }

    println!("└──────────────────────────────────────────────────────────────");
    println!();
    Ok(())
}

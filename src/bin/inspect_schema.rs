//! Utility to inspect the live `leads` table and print its columns and indexes.
//!
//! The schema is owned by external migration tooling; this is how operators check that
//! the deployed database matches what the service expects.

use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::env;

/// Columns the service reads and writes.
const EXPECTED_COLUMNS: [&str; 8] = [
    "id",
    "name",
    "email",
    "status",
    "source",
    "assigned_to",
    "created_at",
    "updated_at",
];

/// Main entry point for the schema inspection utility.
///
/// Connects to `DATABASE_URL`, lists the `leads` columns and indexes, and fails if any
/// expected column is missing.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let database_url = env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await?;

    let columns: Vec<(String, String, String)> = sqlx::query_as(
        "SELECT column_name, data_type, is_nullable FROM information_schema.columns \
         WHERE table_name = 'leads' ORDER BY ordinal_position",
    )
    .fetch_all(&pool)
    .await?;

    if columns.is_empty() {
        anyhow::bail!("Table 'leads' not found; apply the migrations first");
    }

    println!("leads columns:");
    for (col, type_, nullable) in &columns {
        println!("  - {}: {} (nullable: {})", col, type_, nullable);
    }

    let indexes: Vec<(String, String)> = sqlx::query_as(
        "SELECT indexname, indexdef FROM pg_indexes WHERE tablename = 'leads' ORDER BY indexname",
    )
    .fetch_all(&pool)
    .await?;

    println!();
    println!("leads indexes:");
    for (name, def) in &indexes {
        println!("  - {}: {}", name, def);
    }

    let missing: Vec<&str> = EXPECTED_COLUMNS
        .iter()
        .copied()
        .filter(|expected| !columns.iter().any(|(col, _, _)| col == expected))
        .collect();
    if !missing.is_empty() {
        anyhow::bail!("Missing columns in 'leads': {}", missing.join(", "));
    }

    println!();
    println!("Schema OK");
    Ok(())
}

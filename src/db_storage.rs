use async_trait::async_trait;
use sqlx::PgPool;

use crate::errors::{AppError, ResultExt};
use crate::models::{Lead, LeadChanges, NewLead};

const LEAD_COLUMNS: &str = "id, name, email, status, source, assigned_to, created_at, updated_at";

/// Persistence boundary for leads.
///
/// Implementations return `Ok(None)` / `Ok(false)` for a missing row; turning that into
/// a not-found outcome is the service's job.
#[async_trait]
pub trait LeadStorage: Send + Sync {
    /// Insert a lead and return the stored row with its generated id and timestamps.
    async fn insert(&self, lead: NewLead) -> Result<Lead, AppError>;

    async fn find(&self, id: i64) -> Result<Option<Lead>, AppError>;

    /// A window of leads ordered by id ascending.
    async fn list(&self, skip: u32, limit: u32) -> Result<Vec<Lead>, AppError>;

    /// Number of stored leads.
    async fn count(&self) -> Result<i64, AppError>;

    /// Merge `changes` onto the row and bump `updated_at`. `None` if the row is absent.
    async fn update(&self, id: i64, changes: LeadChanges) -> Result<Option<Lead>, AppError>;

    /// Remove the row. `false` if it did not exist.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

/// PostgreSQL-backed lead storage.
///
/// Each call checks a connection out of the pool for the duration of one statement;
/// the connection goes back to the pool when the call returns, on every path.
pub struct PgLeadStorage {
    pool: PgPool,
}

impl PgLeadStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeadStorage for PgLeadStorage {
    async fn insert(&self, lead: NewLead) -> Result<Lead, AppError> {
        // Both timestamps come from the same NOW(), so created_at == updated_at
        let sql = format!(
            "INSERT INTO leads (name, email, status, source, assigned_to, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, NOW(), NOW()) \
             RETURNING {}",
            LEAD_COLUMNS
        );

        sqlx::query_as::<_, Lead>(&sql)
            .bind(&lead.name)
            .bind(&lead.email)
            .bind(&lead.status)
            .bind(&lead.source)
            .bind(&lead.assigned_to)
            .fetch_one(&self.pool)
            .await
            .context("inserting lead")
    }

    async fn find(&self, id: i64) -> Result<Option<Lead>, AppError> {
        let sql = format!("SELECT {} FROM leads WHERE id = $1", LEAD_COLUMNS);

        sqlx::query_as::<_, Lead>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("fetching lead {}", id))
    }

    async fn list(&self, skip: u32, limit: u32) -> Result<Vec<Lead>, AppError> {
        let sql = format!(
            "SELECT {} FROM leads ORDER BY id ASC LIMIT $1 OFFSET $2",
            LEAD_COLUMNS
        );

        sqlx::query_as::<_, Lead>(&sql)
            .bind(i64::from(limit))
            .bind(i64::from(skip))
            .fetch_all(&self.pool)
            .await
            .context("listing leads")
    }

    async fn count(&self) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM leads")
            .fetch_one(&self.pool)
            .await
            .context("counting leads")
    }

    async fn update(&self, id: i64, changes: LeadChanges) -> Result<Option<Lead>, AppError> {
        // Nullable columns need an explicit "present" flag since NULL is a valid new value.
        // updated_at is pushed past its previous value even when NOW() has not advanced.
        let sql = format!(
            "UPDATE leads SET \
                name = COALESCE($2, name), \
                email = COALESCE($3, email), \
                status = COALESCE($4, status), \
                source = CASE WHEN $5 THEN $6 ELSE source END, \
                assigned_to = CASE WHEN $7 THEN $8 ELSE assigned_to END, \
                updated_at = GREATEST(NOW(), updated_at + INTERVAL '1 microsecond') \
             WHERE id = $1 \
             RETURNING {}",
            LEAD_COLUMNS
        );

        let (source_set, source) = split_nullable(changes.source);
        let (assigned_set, assigned_to) = split_nullable(changes.assigned_to);

        sqlx::query_as::<_, Lead>(&sql)
            .bind(id)
            .bind(changes.name)
            .bind(changes.email)
            .bind(changes.status)
            .bind(source_set)
            .bind(source)
            .bind(assigned_set)
            .bind(assigned_to)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("updating lead {}", id))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM leads WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("deleting lead {}", id))?;

        Ok(result.rows_affected() > 0)
    }
}

fn split_nullable(value: Option<Option<String>>) -> (bool, Option<String>) {
    match value {
        Some(inner) => (true, inner),
        None => (false, None),
    }
}

//! In-process lead storage.
//!
//! Selected with `DATABASE_URL=memory://` for local runs without PostgreSQL, and used by the
//! test suites. Mirrors the PostgreSQL store: sequential ids starting at 1, id ordering for
//! listings, and `updated_at` that always moves forward.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::db_storage::LeadStorage;
use crate::errors::AppError;
use crate::models::{Lead, LeadChanges, NewLead};

#[derive(Debug, Default)]
pub struct MemoryLeadStorage {
    inner: RwLock<Table>,
}

#[derive(Debug, Default)]
struct Table {
    last_id: i64,
    rows: BTreeMap<i64, Lead>,
}

impl MemoryLeadStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LeadStorage for MemoryLeadStorage {
    async fn insert(&self, lead: NewLead) -> Result<Lead, AppError> {
        let mut table = self.inner.write().await;
        table.last_id += 1;

        let now = Utc::now();
        let row = Lead {
            id: table.last_id,
            name: lead.name,
            email: lead.email,
            status: lead.status,
            source: lead.source,
            assigned_to: lead.assigned_to,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(row.id, row.clone());

        Ok(row)
    }

    async fn find(&self, id: i64) -> Result<Option<Lead>, AppError> {
        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn list(&self, skip: u32, limit: u32) -> Result<Vec<Lead>, AppError> {
        let table = self.inner.read().await;
        Ok(table
            .rows
            .values()
            .skip(skip as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.inner.read().await.rows.len() as i64)
    }

    async fn update(&self, id: i64, changes: LeadChanges) -> Result<Option<Lead>, AppError> {
        let mut table = self.inner.write().await;
        let Some(row) = table.rows.get_mut(&id) else {
            return Ok(None);
        };

        changes.apply_to(row);
        row.updated_at = next_timestamp(row.updated_at, Utc::now());

        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.inner.write().await.rows.remove(&id).is_some())
    }
}

/// `now`, or one microsecond past `previous` if the clock has not moved beyond it.
fn next_timestamp(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    now.max(previous + Duration::microseconds(1))
}

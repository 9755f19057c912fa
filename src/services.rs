use std::sync::Arc;

use crate::db_storage::LeadStorage;
use crate::errors::AppError;
use crate::lead_models::{LeadListResponse, LeadResponse};
use crate::models::{LeadChanges, NewLead};

/// Lead CRUD operations over a [`LeadStorage`].
///
/// Inputs are already validated; every lookup by id that misses yields
/// [`AppError::NotFound`].
#[derive(Clone)]
pub struct LeadService {
    storage: Arc<dyn LeadStorage>,
}

impl LeadService {
    pub fn new(storage: Arc<dyn LeadStorage>) -> Self {
        Self { storage }
    }

    /// Creates a lead. Duplicate emails are allowed.
    pub async fn create(&self, new_lead: NewLead) -> Result<LeadResponse, AppError> {
        let lead = self.storage.insert(new_lead).await?;
        tracing::info!("Created lead {}", lead.id);
        Ok(lead.into())
    }

    pub async fn get(&self, id: i64) -> Result<LeadResponse, AppError> {
        self.storage
            .find(id)
            .await?
            .map(LeadResponse::from)
            .ok_or_else(|| AppError::lead_not_found(id))
    }

    /// Returns leads in id order after skipping `skip`, at most `limit` of them.
    ///
    /// `total` counts every stored lead, not just the returned window.
    pub async fn list(&self, skip: u32, limit: u32) -> Result<LeadListResponse, AppError> {
        let leads = self.storage.list(skip, limit).await?;
        let total = self.storage.count().await?;

        tracing::debug!(
            "Listed {} of {} leads (skip={}, limit={})",
            leads.len(),
            total,
            skip,
            limit
        );

        Ok(LeadListResponse {
            leads: leads.into_iter().map(LeadResponse::from).collect(),
            total,
        })
    }

    /// Applies only the supplied fields. An empty change set is a plain read.
    pub async fn update(&self, id: i64, changes: LeadChanges) -> Result<LeadResponse, AppError> {
        if changes.is_empty() {
            tracing::debug!("Empty update for lead {}, skipping write", id);
            return self.get(id).await;
        }

        let lead = self
            .storage
            .update(id, changes)
            .await?
            .ok_or_else(|| AppError::lead_not_found(id))?;

        tracing::info!("Updated lead {}", id);
        Ok(lead.into())
    }

    /// Permanently removes a lead.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if !self.storage.delete(id).await? {
            return Err(AppError::lead_not_found(id));
        }

        tracing::info!("Deleted lead {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_storage::MemoryLeadStorage;
    use crate::models::DEFAULT_STATUS;

    fn service() -> LeadService {
        LeadService::new(Arc::new(MemoryLeadStorage::new()))
    }

    fn jane() -> NewLead {
        NewLead {
            name: "Jane Doe".to_string(),
            email: "jane@x.com".to_string(),
            status: DEFAULT_STATUS.to_string(),
            source: Some("website".to_string()),
            assigned_to: Some("Ivan".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let svc = service();
        let created = svc.create(jane()).await.unwrap();

        assert_eq!(created.id, 1);
        assert_eq!(created.created_at, created.updated_at);

        let fetched = svc.get(created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.name, "Jane Doe");
        assert_eq!(fetched.email, "jane@x.com");
        assert_eq!(fetched.status, "new");
    }

    #[tokio::test]
    async fn test_partial_update_touches_only_status() {
        let svc = service();
        let created = svc.create(jane()).await.unwrap();

        let updated = svc
            .update(
                created.id,
                LeadChanges {
                    status: Some("won".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.status, "won");
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.email, created.email);
        assert_eq!(updated.source, created.source);
        assert_eq!(updated.assigned_to, created.assigned_to);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn test_empty_update_returns_current_record() {
        let svc = service();
        let created = svc.create(jane()).await.unwrap();

        let same = svc.update(created.id, LeadChanges::default()).await.unwrap();
        assert_eq!(same, created);
    }

    #[tokio::test]
    async fn test_missing_id_is_not_found_everywhere() {
        let svc = service();

        assert!(svc.get(99).await.unwrap_err().is_not_found());
        assert!(svc
            .update(99, LeadChanges::default())
            .await
            .unwrap_err()
            .is_not_found());
        assert!(svc
            .update(
                99,
                LeadChanges {
                    name: Some("X".to_string()),
                    ..Default::default()
                }
            )
            .await
            .unwrap_err()
            .is_not_found());
        assert!(svc.delete(99).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_pagination_total_is_independent_of_window() {
        let svc = service();
        let n = 5;
        for _ in 0..n {
            svc.create(jane()).await.unwrap();
        }

        let all = svc.list(0, n).await.unwrap();
        assert_eq!(all.leads.len(), n as usize);
        assert_eq!(all.total, i64::from(n));

        let past_end = svc.list(n, 10).await.unwrap();
        assert!(past_end.leads.is_empty());
        assert_eq!(past_end.total, i64::from(n));

        let page = svc.list(2, 2).await.unwrap();
        let ids: Vec<i64> = page.leads.iter().map(|l| l.id).collect();
        assert_eq!(ids, [3, 4]);
    }

    #[tokio::test]
    async fn test_delete_is_final() {
        let svc = service();
        let created = svc.create(jane()).await.unwrap();

        svc.delete(created.id).await.unwrap();

        assert!(svc.get(created.id).await.unwrap_err().is_not_found());
        assert!(svc.delete(created.id).await.unwrap_err().is_not_found());
        assert_eq!(svc.list(0, 10).await.unwrap().total, 0);
    }
}

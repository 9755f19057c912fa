use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Default status assigned to a lead when the caller does not supply one.
pub const DEFAULT_STATUS: &str = "new";

// ============ Database Models ============

/// A row of the `leads` table.
///
/// This is the storage representation; the API never serializes it directly
/// (see [`crate::lead_models::LeadResponse`]).
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Lead {
    /// Sequential identifier assigned by the store.
    pub id: i64,
    /// Name of the prospective customer.
    pub name: String,
    /// Contact email. Free text, never format-checked.
    pub email: String,
    /// Pipeline status (e.g., "new", "in_progress", "won", "lost").
    pub status: String,
    /// Where the lead came from (e.g., "website", "referral").
    pub source: Option<String>,
    /// Name of the manager who owns the lead.
    pub assigned_to: Option<String>,
    /// Timestamp of creation.
    pub created_at: DateTime<Utc>,
    /// Timestamp of last update.
    pub updated_at: DateTime<Utc>,
}

// ============ Write Models ============

/// A validated lead ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLead {
    pub name: String,
    pub email: String,
    pub status: String,
    pub source: Option<String>,
    pub assigned_to: Option<String>,
}

/// A validated partial update.
///
/// `None` leaves the column untouched. For the nullable columns the inner
/// `Option` is the new value, so `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: Option<String>,
    pub source: Option<Option<String>>,
    pub assigned_to: Option<Option<String>>,
}

impl LeadChanges {
    /// True when no field was supplied.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.status.is_none()
            && self.source.is_none()
            && self.assigned_to.is_none()
    }

    /// Merges the supplied fields onto `lead` in place. Timestamps are left to the store.
    pub fn apply_to(&self, lead: &mut Lead) {
        if let Some(name) = &self.name {
            lead.name = name.clone();
        }
        if let Some(email) = &self.email {
            lead.email = email.clone();
        }
        if let Some(status) = &self.status {
            lead.status = status.clone();
        }
        if let Some(source) = &self.source {
            lead.source = source.clone();
        }
        if let Some(assigned_to) = &self.assigned_to {
            lead.assigned_to = assigned_to.clone();
        }
    }
}

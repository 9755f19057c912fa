//! API-facing shapes for leads and the validation that turns them into write models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::errors::{AppError, FieldError};
use crate::models::{Lead, LeadChanges, NewLead, DEFAULT_STATUS};

pub const NAME_MAX_LEN: usize = 200;
pub const EMAIL_MAX_LEN: usize = 255;
pub const STATUS_MAX_LEN: usize = 50;
pub const SOURCE_MAX_LEN: usize = 100;
pub const ASSIGNED_TO_MAX_LEN: usize = 100;

pub const DEFAULT_PAGE_LIMIT: u32 = 100;

// ============ Requests ============

/// Body of `POST /api/v1/leads`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateLeadRequest {
    /// Lead name, 1-200 characters
    #[schema(example = "Jane Doe")]
    pub name: String,
    /// Contact email, up to 255 characters
    #[schema(example = "jane@x.com")]
    pub email: String,
    /// Pipeline status, defaults to "new"
    #[serde(default)]
    pub status: Option<String>,
    /// Lead provenance (website, referral, ...)
    #[serde(default)]
    pub source: Option<String>,
    /// Owning manager's name
    #[serde(default)]
    pub assigned_to: Option<String>,
}

impl CreateLeadRequest {
    /// Checks every bound and reports all violations at once.
    pub fn validate(self) -> Result<NewLead, AppError> {
        let mut errors = Vec::new();

        check_length(&mut errors, "name", &self.name, 1, NAME_MAX_LEN);
        check_length(&mut errors, "email", &self.email, 1, EMAIL_MAX_LEN);
        if let Some(status) = &self.status {
            check_length(&mut errors, "status", status, 0, STATUS_MAX_LEN);
        }
        if let Some(source) = &self.source {
            check_length(&mut errors, "source", source, 0, SOURCE_MAX_LEN);
        }
        if let Some(assigned_to) = &self.assigned_to {
            check_length(&mut errors, "assigned_to", assigned_to, 0, ASSIGNED_TO_MAX_LEN);
        }

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        Ok(NewLead {
            name: self.name,
            email: self.email,
            status: self.status.unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            source: self.source,
            assigned_to: self.assigned_to,
        })
    }
}

/// Body of `PUT`/`PATCH /api/v1/leads/{id}`.
///
/// Every field is optional. An omitted field is left unchanged; an explicit `null`
/// clears `source`/`assigned_to` and is rejected for the non-nullable fields.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateLeadRequest {
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub status: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub source: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub assigned_to: Option<Option<String>>,
}

/// Marks a field as present, keeping a JSON `null` distinguishable from omission.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl UpdateLeadRequest {
    pub fn validate(self) -> Result<LeadChanges, AppError> {
        let mut errors = Vec::new();

        let name = required_if_present(&mut errors, "name", self.name, 1, NAME_MAX_LEN);
        let email = required_if_present(&mut errors, "email", self.email, 1, EMAIL_MAX_LEN);
        let status = required_if_present(&mut errors, "status", self.status, 0, STATUS_MAX_LEN);

        if let Some(Some(source)) = &self.source {
            check_length(&mut errors, "source", source, 0, SOURCE_MAX_LEN);
        }
        if let Some(Some(assigned_to)) = &self.assigned_to {
            check_length(&mut errors, "assigned_to", assigned_to, 0, ASSIGNED_TO_MAX_LEN);
        }

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        Ok(LeadChanges {
            name,
            email,
            status,
            source: self.source,
            assigned_to: self.assigned_to,
        })
    }
}

/// Query string of `GET /api/v1/leads`.
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListLeadsParams {
    /// Number of leads to skip
    #[serde(default)]
    pub skip: u32,
    /// Maximum number of leads to return
    #[serde(default = "default_limit")]
    #[param(default = 100)]
    pub limit: u32,
}

fn default_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

impl Default for ListLeadsParams {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

// ============ Responses ============

/// A lead as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LeadResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub status: String,
    pub source: Option<String>,
    pub assigned_to: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Lead> for LeadResponse {
    fn from(lead: Lead) -> Self {
        Self {
            id: lead.id,
            name: lead.name,
            email: lead.email,
            status: lead.status,
            source: lead.source,
            assigned_to: lead.assigned_to,
            created_at: lead.created_at,
            updated_at: lead.updated_at,
        }
    }
}

/// One page of leads plus the total number of stored leads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LeadListResponse {
    pub leads: Vec<LeadResponse>,
    /// Count of all leads, independent of `skip`/`limit`
    pub total: i64,
}

// ============ Validation helpers ============

fn check_length(errors: &mut Vec<FieldError>, field: &str, value: &str, min: usize, max: usize) {
    let len = value.chars().count();
    if len < min {
        errors.push(FieldError::new(field, "must not be empty"));
    } else if len > max {
        errors.push(FieldError::new(
            field,
            format!("must be at most {} characters", max),
        ));
    }
}

fn required_if_present(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: Option<Option<String>>,
    min: usize,
    max: usize,
) -> Option<String> {
    match value {
        None => None,
        Some(None) => {
            errors.push(FieldError::new(field, "must not be null"));
            None
        }
        Some(Some(v)) => {
            check_length(errors, field, &v, min, max);
            Some(v)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(name: &str, email: &str) -> CreateLeadRequest {
        CreateLeadRequest {
            name: name.to_string(),
            email: email.to_string(),
            status: None,
            source: None,
            assigned_to: None,
        }
    }

    fn fields(err: AppError) -> Vec<String> {
        match err {
            AppError::Validation(errors) => errors.into_iter().map(|e| e.field).collect(),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_create_defaults_status_to_new() {
        let new_lead = create("Jane Doe", "jane@x.com").validate().unwrap();
        assert_eq!(new_lead.status, "new");
        assert_eq!(new_lead.source, None);
        assert_eq!(new_lead.assigned_to, None);
    }

    #[test]
    fn test_create_keeps_supplied_status() {
        let mut req = create("Jane Doe", "jane@x.com");
        req.status = Some("in_progress".to_string());
        req.source = Some("referral".to_string());
        let new_lead = req.validate().unwrap();
        assert_eq!(new_lead.status, "in_progress");
        assert_eq!(new_lead.source.as_deref(), Some("referral"));
    }

    #[test]
    fn test_create_name_bounds() {
        assert_eq!(fields(create("", "jane@x.com").validate().unwrap_err()), ["name"]);

        let long = "a".repeat(NAME_MAX_LEN + 1);
        assert_eq!(fields(create(&long, "jane@x.com").validate().unwrap_err()), ["name"]);

        let exact = "a".repeat(NAME_MAX_LEN);
        assert!(create(&exact, "jane@x.com").validate().is_ok());
    }

    #[test]
    fn test_lengths_count_characters_not_bytes() {
        // 200 two-byte characters
        let name = "ж".repeat(NAME_MAX_LEN);
        assert!(create(&name, "jane@x.com").validate().is_ok());
    }

    #[test]
    fn test_create_reports_every_violation() {
        let mut req = create("", "");
        req.status = Some("s".repeat(STATUS_MAX_LEN + 1));
        req.source = Some("s".repeat(SOURCE_MAX_LEN + 1));
        req.assigned_to = Some("s".repeat(ASSIGNED_TO_MAX_LEN + 1));

        assert_eq!(
            fields(req.validate().unwrap_err()),
            ["name", "email", "status", "source", "assigned_to"]
        );
    }

    #[test]
    fn test_create_rejects_missing_email_on_decode() {
        let result = serde_json::from_str::<CreateLeadRequest>(r#"{"name": "Jane"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_update_distinguishes_null_from_omitted() {
        let req: UpdateLeadRequest =
            serde_json::from_str(r#"{"status": "won", "source": null}"#).unwrap();
        assert_eq!(req.status, Some(Some("won".to_string())));
        assert_eq!(req.source, Some(None));
        assert_eq!(req.assigned_to, None);
        assert_eq!(req.name, None);

        let changes = req.validate().unwrap();
        assert_eq!(changes.status.as_deref(), Some("won"));
        assert_eq!(changes.source, Some(None));
        assert_eq!(changes.assigned_to, None);
    }

    #[test]
    fn test_update_rejects_null_name() {
        let req: UpdateLeadRequest = serde_json::from_str(r#"{"name": null}"#).unwrap();
        assert_eq!(fields(req.validate().unwrap_err()), ["name"]);
    }

    #[test]
    fn test_update_empty_body_is_empty_changes() {
        let req: UpdateLeadRequest = serde_json::from_str("{}").unwrap();
        assert!(req.validate().unwrap().is_empty());
    }

    #[test]
    fn test_update_bounds() {
        let req = UpdateLeadRequest {
            email: Some(Some("e".repeat(EMAIL_MAX_LEN + 1))),
            assigned_to: Some(Some("m".repeat(ASSIGNED_TO_MAX_LEN + 1))),
            ..Default::default()
        };
        assert_eq!(fields(req.validate().unwrap_err()), ["email", "assigned_to"]);
    }

    #[test]
    fn test_list_params_defaults() {
        let params: ListLeadsParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.skip, 0);
        assert_eq!(params.limit, DEFAULT_PAGE_LIMIT);
    }
}

/// Property-based tests using proptest
/// Tests invariants of lead input validation that should hold for all inputs
use leadlab_api::lead_models::{
    CreateLeadRequest, UpdateLeadRequest, EMAIL_MAX_LEN, NAME_MAX_LEN, SOURCE_MAX_LEN,
};
use proptest::prelude::*;

fn request(name: String, email: String) -> CreateLeadRequest {
    CreateLeadRequest {
        name,
        email,
        status: None,
        source: None,
        assigned_to: None,
    }
}

// Property: names within bounds are accepted verbatim, status defaults to "new"
proptest! {
    #[test]
    fn names_within_bounds_are_accepted(name in "\\PC{1,200}", email in "[a-z]{1,20}@[a-z]{1,10}\\.com") {
        let new_lead = request(name.clone(), email.clone()).validate();
        prop_assert!(new_lead.is_ok());
        let new_lead = new_lead.unwrap();
        prop_assert_eq!(new_lead.name, name);
        prop_assert_eq!(new_lead.email, email);
        prop_assert_eq!(new_lead.status, "new");
    }

    #[test]
    fn names_over_limit_are_rejected(extra in 1usize..100) {
        let name = "n".repeat(NAME_MAX_LEN + extra);
        let result = request(name, "a@b.c".to_string()).validate();
        prop_assert!(result.is_err());
        prop_assert!(result.unwrap_err().is_validation());
    }

    #[test]
    fn emails_are_not_format_checked(email in "\\PC{1,255}") {
        prop_assert!(request("Jane".to_string(), email).validate().is_ok());
    }

    #[test]
    fn email_length_bound(len in 1usize..400) {
        let result = request("Jane".to_string(), "e".repeat(len)).validate();
        prop_assert_eq!(result.is_ok(), len <= EMAIL_MAX_LEN);
    }
}

// Property: update validation never panics and omitted fields stay omitted
proptest! {
    #[test]
    fn update_validation_never_panics(body in "\\PC*") {
        if let Ok(req) = serde_json::from_str::<UpdateLeadRequest>(&body) {
            let _ = req.validate();
        }
    }

    #[test]
    fn source_only_update_leaves_other_fields_unset(source in "\\PC{0,100}") {
        let body = serde_json::json!({ "source": source }).to_string();
        let req: UpdateLeadRequest = serde_json::from_str(&body).unwrap();
        let changes = req.validate().unwrap();

        prop_assert!(changes.name.is_none());
        prop_assert!(changes.email.is_none());
        prop_assert!(changes.status.is_none());
        prop_assert!(changes.assigned_to.is_none());
        prop_assert_eq!(changes.source, Some(Some(source)));
    }

    #[test]
    fn source_length_bound(len in 0usize..200) {
        let req = UpdateLeadRequest {
            source: Some(Some("s".repeat(len))),
            ..Default::default()
        };
        prop_assert_eq!(req.validate().is_ok(), len <= SOURCE_MAX_LEN);
    }
}

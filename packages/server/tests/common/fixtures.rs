//! Field fixtures for driving the wizard in tests.

use signup_core::domains::onboarding::{ContactFieldsPatch, JobFieldsPatch};

pub const TEST_PHONE: &str = "+15550001111";
pub const TEST_CREDENTIAL: &str = "hunter22";

/// Every required job field filled in
pub fn job_patch() -> JobFieldsPatch {
    JobFieldsPatch {
        service: Some("Plumbing".to_string()),
        postal_code: Some("0150".to_string()),
        city: Some("Oslo".to_string()),
        description: Some("Leaking kitchen tap".to_string()),
        start_time: Some("asap".to_string()),
        budget: Some("1000-5000".to_string()),
    }
}

/// Valid contact details for `phone`
pub fn contact_patch(phone: &str) -> ContactFieldsPatch {
    ContactFieldsPatch {
        full_name: Some("Kari Nordmann".to_string()),
        email: Some("kari@example.com".to_string()),
        phone: Some(phone.to_string()),
    }
}

pub fn job_json() -> serde_json::Value {
    serde_json::json!({
        "service": "Plumbing",
        "postalCode": "0150",
        "city": "Oslo",
        "description": "Leaking kitchen tap",
        "startTime": "asap",
        "budget": "1000-5000"
    })
}

pub fn contact_json(phone: &str) -> serde_json::Value {
    serde_json::json!({
        "fullName": "Kari Nordmann",
        "email": "kari@example.com",
        "phone": phone
    })
}

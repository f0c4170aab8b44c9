//! Hard-coded payloads exercised by the smoke-test route.

use chrono::Local;
use serde_json::{json, Value};

use super::DocumentKind;

/// Sample request body for a document kind.
pub fn sample_payload(kind: DocumentKind) -> Value {
    let today = Local::now().date_naive().format("%Y-%m-%d").to_string();

    match kind {
        DocumentKind::Visa => json!({
            "name": "HelloLUEHUIG",
            "passport": "A3485G45",
            "purpose": "visiting",
            "guest_country": "Nepal"
        }),
        DocumentKind::Itinerary => json!({
            "guests": [
                {"name": "Al-imam", "passport": 43534},
                {"name": "Al-imam", "passport": 43534}
            ],
            "itenary": [
                {"date": today, "from": "AirPost", "to": "Hotel valentilo"},
                {"date": today, "from": "AirPost", "to": "Hotel valentilo"}
            ]
        }),
        DocumentKind::UndertakingSingle => json!({ "name": "Nirob" }),
        DocumentKind::UndertakingFamily => json!({
            "name": "Nirob",
            "array": [{"sl": "1", "name": "Imam", "number": "23847", "remarks": "self"}]
        }),
        DocumentKind::Authorize => json!({
            "client": "Nirob",
            "client_passport_number": "D2786G#4",
            "authorizer": "Imam",
            "relationship": "Self",
            "authorizer_passport_number": "1924AD343",
            "contact": "email@mail.com",
            "name_ava": "USA_MILITARY",
            "address_ava": "SOME_WHERE_CLOSE"
        }),
    }
}

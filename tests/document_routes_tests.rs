//! End-to-end tests of the document generation routes.

mod common;

use actix_web::{test, web, App};
use serde_json::{json, Value};
use std::sync::Arc;

use common::{
    pdf_page_count, pdf_text, test_state, test_state_with, FailingConverter, PanickingConverter,
};
use travel_docs_server::document::samples::sample_payload;
use travel_docs_server::document::DocumentKind;
use travel_docs_server::routes;
use travel_docs_server::ErrorResponse;

#[actix_web::test]
async fn test_undertaking_single_contains_name() {
    let app = test::init_service(App::new().app_data(test_state()).configure(routes::config)).await;

    let req = test::TestRequest::post()
        .uri("/generate/undertaking/single/")
        .set_json(json!({"name": "Nirob"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers().get("content-type").unwrap(), "application/pdf");
    let disposition = resp.headers().get("content-disposition").unwrap().to_str().unwrap();
    assert!(disposition.starts_with("inline"));
    assert!(disposition.contains("undertaking-nirob.pdf"));

    let body = test::read_body(resp).await;
    assert!(body.starts_with(b"%PDF-"));
    assert!(pdf_text(&body).contains("Nirob"));
}

#[actix_web::test]
async fn test_accented_name_is_kept_in_pdf() {
    let app = test::init_service(App::new().app_data(test_state()).configure(routes::config)).await;

    let req = test::TestRequest::post()
        .uri("/generate/undertaking/single/")
        .set_json(json!({"name": "Jos\u{e9} M\u{fc}ller"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body = test::read_body(resp).await;
    let text = pdf_text(&body);
    assert!(text.contains("Jos\u{e9} M\u{fc}ller"), "extracted text: {}", text);
    assert!(!text.contains("Jos? M?ller"));
}

#[actix_web::test]
async fn test_family_example_generates_pdf() {
    let app = test::init_service(App::new().app_data(test_state()).configure(routes::config)).await;

    let req = test::TestRequest::post()
        .uri("/generate/undertaking/family/")
        .set_json(json!({
            "name": "Nirob",
            "array": [{"sl": "1", "name": "Imam", "number": "23847", "remarks": "self"}]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers().get("content-type").unwrap(), "application/pdf");
    let body = test::read_body(resp).await;
    assert!(body.starts_with(b"%PDF-"));
    let text = pdf_text(&body);
    assert!(text.contains("Imam"));
    assert!(text.contains("23847"));
}

#[actix_web::test]
async fn test_every_sample_generates_pdf() {
    let app = test::init_service(App::new().app_data(test_state()).configure(routes::config)).await;

    for kind in DocumentKind::ALL {
        let req = test::TestRequest::post()
            .uri(kind.route())
            .set_json(sample_payload(kind))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200, "{} sample was rejected", kind);

        let body = test::read_body(resp).await;
        assert!(body.starts_with(b"%PDF-"), "{} did not return a PDF", kind);
        assert!(pdf_page_count(&body) >= 1);
    }
}

#[actix_web::test]
async fn test_whole_float_passport_prints_without_fraction() {
    let app = test::init_service(App::new().app_data(test_state()).configure(routes::config)).await;

    let req = test::TestRequest::post()
        .uri("/generate/itenary/")
        .set_json(json!({
            "guests": [{"name": "Al-imam", "passport": 43534.0}],
            "itenary": [{"date": "2024-05-01", "from": "Airport", "to": "Hotel Valentilo"}]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let text = pdf_text(&test::read_body(resp).await);
    assert!(text.contains("43534"));
    assert!(!text.contains("43534.0"), "extracted text: {}", text);
}

#[actix_web::test]
async fn test_visa_without_guest_country_is_invalid_request() {
    let app = test::init_service(App::new().app_data(test_state()).configure(routes::config)).await;

    let req = test::TestRequest::post()
        .uri("/generate/visa/")
        .set_json(json!({"name": "HelloLUEHUIG", "passport": "A3485G45", "purpose": "visiting"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.code, "invalid-request");
    assert_eq!(body.message, "Request doesn't contain valid data!");
    assert!(body.error.unwrap_or_default().contains("guest_country"));
}

#[actix_web::test]
async fn test_missing_required_field_is_rejected_for_every_kind() {
    let app = test::init_service(App::new().app_data(test_state()).configure(routes::config)).await;

    for kind in DocumentKind::ALL {
        let sample = sample_payload(kind);
        let fields: Vec<String> = sample.as_object().unwrap().keys().cloned().collect();

        for field in fields {
            let mut payload = sample.clone();
            payload.as_object_mut().unwrap().remove(&field);

            let req = test::TestRequest::post()
                .uri(kind.route())
                .set_json(&payload)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), 400, "{} accepted a payload without '{}'", kind, field);

            let body: ErrorResponse = test::read_body_json(resp).await;
            assert_eq!(body.code, "invalid-request");
        }
    }
}

#[actix_web::test]
async fn test_wrong_field_type_is_rejected() {
    let app = test::init_service(App::new().app_data(test_state()).configure(routes::config)).await;

    let req = test::TestRequest::post()
        .uri("/generate/undertaking/family/")
        .set_json(json!({"name": "Nirob", "array": "Imam"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.code, "invalid-request");
}

#[actix_web::test]
async fn test_empty_or_malformed_body_is_invalid_json() {
    let app = test::init_service(App::new().app_data(test_state()).configure(routes::config)).await;

    for kind in DocumentKind::ALL {
        for payload in ["", "{\"name\": ", "name=Nirob"] {
            let req = test::TestRequest::post()
                .uri(kind.route())
                .insert_header(("content-type", "application/json"))
                .set_payload(payload)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), 400, "{} accepted body {:?}", kind, payload);

            let body: ErrorResponse = test::read_body_json(resp).await;
            assert_eq!(body.code, "invalid-json", "{} with body {:?}", kind, payload);
            assert_eq!(body.message, "Request body is not valid JSON!");
        }
    }
}

#[actix_web::test]
async fn test_same_payload_twice_gives_equivalent_pdfs() {
    let app = test::init_service(App::new().app_data(test_state()).configure(routes::config)).await;
    let payload = sample_payload(DocumentKind::Itinerary);

    let mut documents = Vec::new();
    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/generate/itenary/")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        documents.push(test::read_body(resp).await);
    }

    assert_eq!(pdf_page_count(&documents[0]), pdf_page_count(&documents[1]));
    assert_eq!(pdf_text(&documents[0]), pdf_text(&documents[1]));
}

#[actix_web::test]
async fn test_converter_failure_is_pdf_gen_error() {
    let state = test_state_with(Arc::new(FailingConverter));
    let app = test::init_service(App::new().app_data(state).configure(routes::config)).await;

    let req = test::TestRequest::post()
        .uri("/generate/undertaking/single/")
        .set_json(json!({"name": "Nirob"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 500);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.code, "pdf-gen-error");
    assert_eq!(body.message, "PDF generation error");
    assert!(body.error.unwrap_or_default().contains("renderer crashed"));
}

#[actix_web::test]
async fn test_validation_runs_before_conversion() {
    let state = test_state_with(Arc::new(FailingConverter));
    let app = test::init_service(App::new().app_data(state).configure(routes::config)).await;

    let req = test::TestRequest::post()
        .uri("/generate/authorize/")
        .set_json(json!({"client": "Nirob"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.code, "invalid-request");
}

#[actix_web::test]
async fn test_panicking_converter_is_server_break() {
    let state = test_state_with(Arc::new(PanickingConverter));
    let app = test::init_service(App::new().app_data(state).configure(routes::config)).await;

    let req = test::TestRequest::post()
        .uri("/generate/undertaking/single/")
        .set_json(json!({"name": "Nirob"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 500);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.code, "server-break");
    assert_eq!(body.message, "Internal Server Error");
}

#[actix_web::test]
async fn test_templates_without_content_are_pdf_gen_error() {
    let dir = tempfile::tempdir().unwrap();
    for kind in DocumentKind::ALL {
        let path = dir.path().join(format!("{}.hbs", kind.template_name()));
        std::fs::write(path, "<html><body><div></div></body></html>").unwrap();
    }
    let state = travel_docs_server::AppState::with_converter(
        dir.path(),
        Arc::new(travel_docs_server::pdf::HtmlPdfConverter::default()),
    )
    .unwrap();
    let app = test::init_service(
        App::new()
            .app_data(actix_web::web::Data::new(state))
            .configure(routes::config),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/generate/undertaking/single/")
        .set_json(json!({"name": "Nirob"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 500);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.code, "pdf-gen-error");
    assert_eq!(body.error.as_deref(), Some("document has no renderable content"));
}

#[actix_web::test]
async fn test_smoke_test_route() {
    let app = test::init_service(App::new().app_data(test_state()).configure(routes::config)).await;

    let req = test::TestRequest::get().uri("/generate/test/").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 201);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"success": true}));
}

#[actix_web::test]
async fn test_smoke_test_reports_each_failing_kind() {
    let state = test_state_with(Arc::new(FailingConverter));
    let app = test::init_service(App::new().app_data(state).configure(routes::config)).await;

    let req = test::TestRequest::get().uri("/generate/test/").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 500);
    let report: routes::SmokeTestReport = test::read_body_json(resp).await;
    assert!(!report.success);
    assert_eq!(report.failures.len(), DocumentKind::ALL.len());
    assert!(report.failures.iter().all(|f| f.code == "pdf-gen-error"));
    assert_eq!(report.failures[0].kind, "visa");
}

#[actix_web::test]
async fn test_schema_routes() {
    let app = test::init_service(App::new().app_data(test_state()).configure(routes::config)).await;

    let req = test::TestRequest::get().uri("/schemas/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let all: Value = test::read_body_json(resp).await;
    for kind in DocumentKind::ALL {
        assert!(all.get(kind.slug()).is_some(), "missing schema for {}", kind);
    }

    let req = test::TestRequest::get().uri("/schemas/visa").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let visa: Value = test::read_body_json(resp).await;
    let required = visa["required"].as_array().unwrap();
    assert!(required.contains(&json!("guest_country")));
}

#[actix_web::test]
async fn test_wrong_method_is_not_routed() {
    let app = test::init_service(App::new().app_data(test_state()).configure(routes::config)).await;

    let req = test::TestRequest::get().uri("/generate/visa/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 405);
}

#[actix_web::test]
async fn test_concurrent_requests_are_independent() {
    let app = test::init_service(App::new().app_data(test_state()).configure(routes::config)).await;

    let valid = test::TestRequest::post()
        .uri("/generate/undertaking/single/")
        .set_json(json!({"name": "Nirob"}))
        .to_request();
    let invalid = test::TestRequest::post()
        .uri("/generate/visa/")
        .set_json(json!({"name": "Nirob"}))
        .to_request();

    let (ok, rejected) = tokio::join!(
        test::call_service(&app, valid),
        test::call_service(&app, invalid)
    );

    assert_eq!(ok.status(), 200);
    assert_eq!(rejected.status(), 400);
    let body = test::read_body(ok).await;
    assert!(pdf_text(&body).contains("Nirob"));
}

#[actix_web::test]
async fn test_validate_route_lists_every_violation() {
    let app = test::init_service(App::new().app_data(test_state()).configure(routes::config)).await;

    let req = test::TestRequest::post()
        .uri("/schemas/undertaking-family/validate")
        .set_json(json!({"name": "Nirob", "array": [{"sl": 1, "name": "Imam"}]}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let report: routes::ValidationReport = test::read_body_json(resp).await;
    assert!(!report.valid);
    assert_eq!(report.errors.len(), 2);
    assert!(report.errors.iter().all(|e| e.pointer == "/array/0"));
    assert!(report.errors.iter().all(|e| e.keyword == "required"));

    let req = test::TestRequest::post()
        .uri("/schemas/visa/validate")
        .set_json(sample_payload(DocumentKind::Visa))
        .to_request();
    let report: routes::ValidationReport = test::call_and_read_body_json(&app, req).await;
    assert!(report.valid);
    assert!(report.errors.is_empty());

    let req = test::TestRequest::post()
        .uri("/schemas/passport/validate")
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn test_oversized_body_is_json_error() {
    let app = test::init_service(
        App::new()
            .app_data(test_state())
            .app_data(web::PayloadConfig::new(1024))
            .configure(routes::config),
    )
    .await;

    let members: Vec<Value> = (1..=40)
        .map(|i| json!({"sl": i.to_string(), "name": "Imam", "number": "23847", "remarks": "self"}))
        .collect();
    let payload = json!({"name": "Nirob", "array": members});

    for uri in ["/generate/undertaking/family/", "/schemas/undertaking-family/validate"] {
        let req = test::TestRequest::post().uri(uri).set_json(&payload).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 413, "{} accepted an oversized body", uri);
        assert_eq!(resp.headers().get("content-type").unwrap(), "application/json");

        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.code, "invalid-request");
        assert_eq!(body.message, "Request body is too large!");
    }

    let req = test::TestRequest::post()
        .uri("/generate/undertaking/single/")
        .set_json(json!({"name": "Nirob"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);
}

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::document::models::{
    AuthorizeRequest, ItineraryRequest, UndertakingFamilyRequest, UndertakingSingleRequest,
    VisaRequest,
};
use crate::document::samples::sample_payload;
use crate::document::DocumentKind;
use crate::error::{ApiError, ErrorCode};
use crate::pdf::PdfArtifact;
use crate::pipeline::parse_body;
use crate::schema::ValidationError;
use crate::{AppState, ErrorResponse};

/// Outcome of the smoke test; `failures` is omitted when every kind succeeded.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SmokeTestReport {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<SmokeTestFailure>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SmokeTestFailure {
    /// Document kind slug, e.g. `undertaking-family`.
    pub kind: String,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Every schema violation found in a payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ValidationIssue {
    /// JSON pointer to the offending value; empty for the document root.
    pub pointer: String,
    pub keyword: String,
    pub message: String,
}

impl From<ValidationError> for ValidationIssue {
    fn from(err: ValidationError) -> Self {
        Self {
            pointer: err.pointer,
            keyword: err.keyword.to_string(),
            message: err.message,
        }
    }
}

/// Raw request body, or the extractor error when it could not be read
/// (e.g. it exceeded the `PayloadConfig` limit).
type RawBody = Result<web::Bytes, actix_web::Error>;

fn read_body(body: RawBody) -> Result<web::Bytes, ApiError> {
    body.map_err(|e| {
        if e.as_response_error().status_code() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(e.to_string())
        } else {
            ApiError::InvalidJson {
                detail: Some(e.to_string()),
            }
        }
    })
}

async fn generate_document(
    state: web::Data<AppState>,
    kind: DocumentKind,
    body: RawBody,
) -> Result<HttpResponse, ApiError> {
    let outcome = match read_body(body) {
        Ok(body) => {
            let documents = state.documents.clone();
            web::block(move || documents.handle(kind, &body))
                .await
                .map_err(|e| ApiError::ServerBreak(e.to_string()))
                .and_then(|result| result)
        }
        Err(err) => Err(err),
    };

    match outcome {
        Ok(artifact) => {
            log::info!(
                "Generated {} ({} bytes) for {}",
                artifact.filename,
                artifact.pdf.len(),
                kind
            );
            Ok(pdf_response(artifact))
        }
        Err(err) => {
            log_failure(kind, &err);
            Err(err)
        }
    }
}

fn pdf_response(artifact: PdfArtifact) -> HttpResponse {
    let disposition = ContentDisposition {
        disposition: DispositionType::Inline,
        parameters: vec![DispositionParam::Filename(artifact.filename)],
    };

    HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header(disposition)
        .body(artifact.pdf)
}

fn log_failure(kind: DocumentKind, err: &ApiError) {
    let detail = err.detail().unwrap_or_default();
    match err.code() {
        ErrorCode::InvalidJson | ErrorCode::InvalidRequest => {
            log::warn!("Rejected {} request ({}): {}", kind, err.code().as_str(), detail)
        }
        ErrorCode::PdfGenError | ErrorCode::ServerBreak => {
            log::error!("Failed to generate {} ({}): {}", kind, err.code().as_str(), detail)
        }
    }
}

#[utoipa::path(
    post,
    path = "/generate/visa/",
    tag = "Documents",
    request_body = VisaRequest,
    responses(
        (status = 200, description = "Visa invitation letter", body = Vec<u8>, content_type = "application/pdf"),
        (status = 400, description = "Invalid JSON or missing fields", body = ErrorResponse),
        (status = 413, description = "Body exceeds the size limit", body = ErrorResponse),
        (status = 500, description = "PDF generation failed", body = ErrorResponse)
    )
)]
pub async fn generate_visa(
    state: web::Data<AppState>,
    body: RawBody,
) -> Result<HttpResponse, ApiError> {
    generate_document(state, DocumentKind::Visa, body).await
}

#[utoipa::path(
    post,
    path = "/generate/itenary/",
    tag = "Documents",
    request_body = ItineraryRequest,
    responses(
        (status = 200, description = "Travel itinerary", body = Vec<u8>, content_type = "application/pdf"),
        (status = 400, description = "Invalid JSON or missing fields", body = ErrorResponse),
        (status = 413, description = "Body exceeds the size limit", body = ErrorResponse),
        (status = 500, description = "PDF generation failed", body = ErrorResponse)
    )
)]
pub async fn generate_itinerary(
    state: web::Data<AppState>,
    body: RawBody,
) -> Result<HttpResponse, ApiError> {
    generate_document(state, DocumentKind::Itinerary, body).await
}

#[utoipa::path(
    post,
    path = "/generate/undertaking/single/",
    tag = "Documents",
    request_body = UndertakingSingleRequest,
    responses(
        (status = 200, description = "Letter of undertaking", body = Vec<u8>, content_type = "application/pdf"),
        (status = 400, description = "Invalid JSON or missing fields", body = ErrorResponse),
        (status = 413, description = "Body exceeds the size limit", body = ErrorResponse),
        (status = 500, description = "PDF generation failed", body = ErrorResponse)
    )
)]
pub async fn generate_undertaking_single(
    state: web::Data<AppState>,
    body: RawBody,
) -> Result<HttpResponse, ApiError> {
    generate_document(state, DocumentKind::UndertakingSingle, body).await
}

#[utoipa::path(
    post,
    path = "/generate/undertaking/family/",
    tag = "Documents",
    request_body = UndertakingFamilyRequest,
    responses(
        (status = 200, description = "Family letter of undertaking", body = Vec<u8>, content_type = "application/pdf"),
        (status = 400, description = "Invalid JSON or missing fields", body = ErrorResponse),
        (status = 413, description = "Body exceeds the size limit", body = ErrorResponse),
        (status = 500, description = "PDF generation failed", body = ErrorResponse)
    )
)]
pub async fn generate_undertaking_family(
    state: web::Data<AppState>,
    body: RawBody,
) -> Result<HttpResponse, ApiError> {
    generate_document(state, DocumentKind::UndertakingFamily, body).await
}

#[utoipa::path(
    post,
    path = "/generate/authorize/",
    tag = "Documents",
    request_body = AuthorizeRequest,
    responses(
        (status = 200, description = "Letter of authorization", body = Vec<u8>, content_type = "application/pdf"),
        (status = 400, description = "Invalid JSON or missing fields", body = ErrorResponse),
        (status = 413, description = "Body exceeds the size limit", body = ErrorResponse),
        (status = 500, description = "PDF generation failed", body = ErrorResponse)
    )
)]
pub async fn generate_authorize(
    state: web::Data<AppState>,
    body: RawBody,
) -> Result<HttpResponse, ApiError> {
    generate_document(state, DocumentKind::Authorize, body).await
}

/// Runs every document kind through the pipeline with built-in sample data.
#[utoipa::path(
    get,
    path = "/generate/test/",
    tag = "Documents",
    responses(
        (status = 201, description = "All document kinds generated", body = SmokeTestReport),
        (status = 500, description = "At least one document kind failed", body = SmokeTestReport)
    )
)]
pub async fn smoke_test(state: web::Data<AppState>) -> impl Responder {
    let mut failures = Vec::new();

    for kind in DocumentKind::ALL {
        let documents = state.documents.clone();
        let payload = sample_payload(kind);
        let outcome = web::block(move || documents.generate(kind, &payload))
            .await
            .map_err(|e| ApiError::ServerBreak(e.to_string()))
            .and_then(|result| result);

        if let Err(err) = outcome {
            log_failure(kind, &err);
            failures.push(SmokeTestFailure {
                kind: kind.slug().to_string(),
                code: err.code().as_str().to_string(),
                message: err.to_string(),
                error: err.detail(),
            });
        }
    }

    if failures.is_empty() {
        log::info!("Smoke test passed for {} document kinds", DocumentKind::ALL.len());
        HttpResponse::Created().json(SmokeTestReport {
            success: true,
            failures,
        })
    } else {
        log::error!("Smoke test failed for {} document kind(s)", failures.len());
        HttpResponse::InternalServerError().json(SmokeTestReport {
            success: false,
            failures,
        })
    }
}

#[utoipa::path(
    get,
    path = "/schemas/",
    tag = "Schemas",
    responses(
        (status = 200, description = "Request schema of every document kind, keyed by kind", body = Object)
    )
)]
pub async fn list_schemas(state: web::Data<AppState>) -> impl Responder {
    let schemas: Map<String, Value> = state
        .documents
        .schemas()
        .list()
        .into_iter()
        .map(|schema| (schema.kind().slug().to_string(), schema.as_json().clone()))
        .collect();
    HttpResponse::Ok().json(schemas)
}

#[utoipa::path(
    get,
    path = "/schemas/{kind}",
    tag = "Schemas",
    params(
        ("kind" = String, Path, description = "Document kind, e.g. visa or undertaking-family")
    ),
    responses(
        (status = 200, description = "Request schema of one document kind", body = Object),
        (status = 404, description = "Unknown document kind", body = ErrorResponse)
    )
)]
pub async fn get_schema(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    match path.parse::<DocumentKind>() {
        Ok(kind) => HttpResponse::Ok().json(state.documents.schemas().lookup(kind).as_json()),
        Err(e) => HttpResponse::NotFound().json(ErrorResponse::not_found(&e.to_string())),
    }
}

/// Lists every violation of a payload without rendering anything.
#[utoipa::path(
    post,
    path = "/schemas/{kind}/validate",
    tag = "Schemas",
    params(
        ("kind" = String, Path, description = "Document kind, e.g. visa or undertaking-family")
    ),
    request_body(content = Object, description = "Candidate request body", content_type = "application/json"),
    responses(
        (status = 200, description = "Validation outcome", body = ValidationReport),
        (status = 400, description = "Body is not valid JSON", body = ErrorResponse),
        (status = 404, description = "Unknown document kind", body = ErrorResponse)
    )
)]
pub async fn validate_payload(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: RawBody,
) -> Result<HttpResponse, ApiError> {
    let kind = match path.parse::<DocumentKind>() {
        Ok(kind) => kind,
        Err(e) => {
            return Ok(HttpResponse::NotFound().json(ErrorResponse::not_found(&e.to_string())));
        }
    };

    let body = read_body(body)?;
    let payload = parse_body(&body)?;
    let errors = state.documents.schemas().lookup(kind).iter_errors(&payload);
    if !errors.is_empty() {
        log::debug!(
            "{} payload has {} violation(s):\n{}",
            kind,
            errors.len(),
            errors.to_message()
        );
    }

    Ok(HttpResponse::Ok().json(ValidationReport {
        valid: errors.is_empty(),
        errors: errors.into_iter().map(ValidationIssue::from).collect(),
    }))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource(DocumentKind::Visa.route()).route(web::post().to(generate_visa)))
        .service(
            web::resource(DocumentKind::Itinerary.route()).route(web::post().to(generate_itinerary)),
        )
        .service(
            web::resource(DocumentKind::UndertakingSingle.route())
                .route(web::post().to(generate_undertaking_single)),
        )
        .service(
            web::resource(DocumentKind::UndertakingFamily.route())
                .route(web::post().to(generate_undertaking_family)),
        )
        .service(
            web::resource(DocumentKind::Authorize.route()).route(web::post().to(generate_authorize)),
        )
        .service(web::resource("/generate/test/").route(web::get().to(smoke_test)))
        .service(web::resource("/schemas/").route(web::get().to(list_schemas)))
        .service(web::resource("/schemas/{kind}").route(web::get().to(get_schema)))
        .service(
            web::resource("/schemas/{kind}/validate").route(web::post().to(validate_payload)),
        );
}

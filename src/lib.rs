use actix_cors::Cors;
use actix_web::middleware::{Compress, Logger};
use actix_web::{http::header, web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod document;
pub mod error;
pub mod pdf;
pub mod pipeline;
pub mod render;
pub mod routes;
pub mod schema;
pub mod state;

pub use crate::config::ServerConfig;
pub use crate::state::AppState;

/// JSON body of every error response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
    /// `invalid-json`, `invalid-request`, `pdf-gen-error`, `server-break`, or
    /// `not-found` for unknown document kinds.
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorResponse {
    pub fn new(code: &str, message: &str, error: Option<String>) -> Self {
        Self {
            message: message.to_string(),
            code: code.to_string(),
            error,
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("not-found", message, None)
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::generate_visa,
        crate::routes::generate_itinerary,
        crate::routes::generate_undertaking_single,
        crate::routes::generate_undertaking_family,
        crate::routes::generate_authorize,
        crate::routes::smoke_test,
        crate::routes::list_schemas,
        crate::routes::get_schema,
        crate::routes::validate_payload
    ),
    components(
        schemas(
            document::models::VisaRequest,
            document::models::Guest,
            document::models::ItineraryLeg,
            document::models::ItineraryRequest,
            document::models::UndertakingSingleRequest,
            document::models::FamilyMember,
            document::models::UndertakingFamilyRequest,
            document::models::AuthorizeRequest,
            routes::SmokeTestReport,
            routes::SmokeTestFailure,
            routes::ValidationReport,
            routes::ValidationIssue,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Documents", description = "Travel document PDF generation."),
        (name = "Schemas", description = "Request schemas of each document kind.")
    ),
    servers(
        (url = "http://127.0.0.1:8080", description = "Local server")
    )
)]
pub struct ApiDoc;

pub async fn run() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env().map_err(|e| {
        log::error!("Invalid server configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let app_state = match AppState::new(&config) {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            log::error!(
                "Failed to load templates from {}. Check TEMPLATE_DIR. Error: {}",
                config.template_dir.display(),
                e
            );
            return Err(std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string()));
        }
    };

    let prometheus = PrometheusMetricsBuilder::new("travel_docs_server")
        .endpoint("/metrics")
        .build()
        .map_err(|e| {
            log::error!("Failed to create Prometheus metrics middleware: {}", e);
            std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
        })?;

    let bind_addr = (config.host.clone(), config.port);
    let allowed_origins = config.allowed_origins.clone();
    let max_body_bytes = config.max_body_bytes;

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    HttpServer::new(move || {
        let app_state = app_state.clone();
        let prometheus = prometheus.clone();
        let cors = allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .expose_headers(vec![header::CONTENT_DISPOSITION])
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(prometheus)
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(app_state)
            .app_data(web::PayloadConfig::new(max_body_bytes))
            .configure(routes::config)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .keep_alive(actix_web::http::KeepAlive::Os)
    .bind(bind_addr)?
    .run()
    .await
}

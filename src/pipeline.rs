//! Request pipeline: parse → validate → render → convert.
//!
//! Each stage returns its own typed error; `?` lifts it into the matching
//! [`ApiError`] so the route layer only has to turn the outcome into a
//! response.

use serde_json::Value;
use std::sync::Arc;

use crate::document::DocumentKind;
use crate::error::ApiError;
use crate::pdf::{ConversionError, PdfArtifact, PdfConverter};
use crate::render::common::sanitize_filename;
use crate::render::TemplateRenderer;
use crate::schema::SchemaRegistry;

const PDF_SIGNATURE: &[u8] = b"%PDF-";

/// Schema registry, templates and converter shared by every request.
pub struct DocumentService {
    schemas: SchemaRegistry,
    renderer: TemplateRenderer,
    converter: Arc<dyn PdfConverter>,
}

impl DocumentService {
    pub fn new(
        schemas: SchemaRegistry,
        renderer: TemplateRenderer,
        converter: Arc<dyn PdfConverter>,
    ) -> Self {
        Self {
            schemas,
            renderer,
            converter,
        }
    }

    pub fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }

    /// Run the whole pipeline on a raw request body.
    pub fn handle(&self, kind: DocumentKind, raw_body: &[u8]) -> Result<PdfArtifact, ApiError> {
        let payload = parse_body(raw_body)?;
        self.generate(kind, &payload)
    }

    /// Validate, render and convert an already parsed payload.
    pub fn generate(&self, kind: DocumentKind, payload: &Value) -> Result<PdfArtifact, ApiError> {
        self.schemas.lookup(kind).validate(payload)?;

        let document = self.renderer.render(kind, payload)?;
        let pdf = self.converter.convert(&document.html)?;
        if !pdf.starts_with(PDF_SIGNATURE) {
            let reason = "converter output is not a PDF document".to_string();
            return Err(ConversionError::Engine(reason).into());
        }

        let filename = format!(
            "{}-{}.pdf",
            kind.filename_stem(),
            sanitize_filename(&document.subject, "document")
        );
        Ok(PdfArtifact { filename, pdf })
    }
}

/// Parse a request body, treating blank input as invalid JSON.
pub fn parse_body(raw_body: &[u8]) -> Result<Value, ApiError> {
    if raw_body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::InvalidJson {
            detail: Some("request body is empty".to_string()),
        });
    }

    serde_json::from_slice(raw_body).map_err(|e| ApiError::InvalidJson {
        detail: Some(e.to_string()),
    })
}

use std::path::Path;
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::pdf::{HtmlPdfConverter, PdfConverter};
use crate::pipeline::DocumentService;
use crate::render::{RenderError, TemplateRenderer};
use crate::schema::SchemaRegistry;

/// Read-only state shared by every worker.
#[derive(Clone)]
pub struct AppState {
    pub documents: Arc<DocumentService>,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Result<Self, RenderError> {
        let converter = HtmlPdfConverter::new(config.pdf_title.clone());
        Self::with_converter(&config.template_dir, Arc::new(converter))
    }

    /// Build state around a custom converter (used to inject failures in tests).
    pub fn with_converter(
        template_dir: &Path,
        converter: Arc<dyn PdfConverter>,
    ) -> Result<Self, RenderError> {
        let renderer = TemplateRenderer::new(template_dir)?;
        let documents = DocumentService::new(SchemaRegistry::new(), renderer, converter);
        log::info!("Loaded document templates from {}", template_dir.display());

        Ok(Self {
            documents: Arc::new(documents),
        })
    }
}

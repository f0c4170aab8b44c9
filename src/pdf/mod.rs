//! HTML → PDF conversion.
//!
//! The pipeline only sees the [`PdfConverter`] trait. [`HtmlPdfConverter`]
//! is the in-process engine used in production:
//!
//! 1. **Parse** – HTML string → block flow ([`flow`])
//! 2. **Layout** – line breaking and A4 pagination ([`layout`])
//! 3. **Render** – emit PDF bytes via printpdf ([`render`])

pub mod flow;
pub mod layout;
pub mod render;

use thiserror::Error;

use layout::{LayoutError, PageGeometry};

/// Errors raised while converting HTML to PDF.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("document is empty")]
    EmptyInput,
    #[error("document has no renderable content")]
    NoContent,
    #[error("layout failed: {0}")]
    Layout(#[from] LayoutError),
    #[error("PDF engine failed: {0}")]
    Engine(String),
}

/// Converts a rendered HTML document into PDF bytes.
pub trait PdfConverter: Send + Sync {
    fn convert(&self, html: &str) -> Result<Vec<u8>, ConversionError>;
}

/// Result of a successful document generation.
#[derive(Debug, Clone)]
pub struct PdfArtifact {
    pub filename: String,
    pub pdf: Vec<u8>,
}

/// In-process converter for the markup the letter templates produce.
#[derive(Debug, Clone)]
pub struct HtmlPdfConverter {
    geometry: PageGeometry,
    default_title: String,
}

impl HtmlPdfConverter {
    pub fn new(default_title: impl Into<String>) -> Self {
        Self {
            geometry: PageGeometry::default(),
            default_title: default_title.into(),
        }
    }

    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }
}

impl Default for HtmlPdfConverter {
    fn default() -> Self {
        Self::new("Travel Documents")
    }
}

impl PdfConverter for HtmlPdfConverter {
    fn convert(&self, html: &str) -> Result<Vec<u8>, ConversionError> {
        if html.trim().is_empty() {
            return Err(ConversionError::EmptyInput);
        }

        let flow = flow::parse(html);
        if flow.blocks.is_empty() {
            return Err(ConversionError::NoContent);
        }

        let pages = layout::layout(&flow, self.geometry)?;
        let title = flow.title.as_deref().unwrap_or(&self.default_title);
        log::debug!("Converted '{}' into {} page(s)", title, pages.len());

        Ok(render::render_pdf(title, &pages, self.geometry))
    }
}

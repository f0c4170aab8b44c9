//! Shared helpers for the HTTP integration tests.
#![allow(dead_code)]

use actix_web::web;
use std::sync::Arc;

use travel_docs_server::pdf::{ConversionError, HtmlPdfConverter, PdfConverter};
use travel_docs_server::render::common::default_template_dir;
use travel_docs_server::AppState;

/// Converter that always reports an engine failure.
pub struct FailingConverter;

impl PdfConverter for FailingConverter {
    fn convert(&self, _html: &str) -> Result<Vec<u8>, ConversionError> {
        Err(ConversionError::Engine("renderer crashed".to_string()))
    }
}

/// Converter that panics, standing in for a collaborator that breaks unexpectedly.
pub struct PanickingConverter;

impl PdfConverter for PanickingConverter {
    fn convert(&self, _html: &str) -> Result<Vec<u8>, ConversionError> {
        panic!("converter exploded")
    }
}

pub fn test_state() -> web::Data<AppState> {
    test_state_with(Arc::new(HtmlPdfConverter::default()))
}

pub fn test_state_with(converter: Arc<dyn PdfConverter>) -> web::Data<AppState> {
    let state = AppState::with_converter(&default_template_dir(), converter)
        .expect("bundled templates should load");
    web::Data::new(state)
}

/// Number of pages in a PDF document.
pub fn pdf_page_count(bytes: &[u8]) -> usize {
    let doc = lopdf::Document::load_mem(bytes).expect("valid PDF");
    doc.get_pages().len()
}

/// Text of every page, concatenated.
pub fn pdf_text(bytes: &[u8]) -> String {
    let doc = lopdf::Document::load_mem(bytes).expect("valid PDF");
    let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
    doc.extract_text(&pages).expect("extractable text")
}

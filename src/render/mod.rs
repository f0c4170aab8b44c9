//! Template renderer: fills a document kind's HTML template with the fields
//! of a validated request.
//!
//! Templates are Handlebars files (`<template_name>.hbs`) loaded once at
//! startup. Strict mode is on, so a template referencing a field the payload
//! lacks fails instead of printing an empty string.

pub mod common;

use chrono::{Local, NaiveDate};
use handlebars::{handlebars_helper, Handlebars};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::document::models::{
    AuthorizeRequest, ItineraryRequest, Letter, UndertakingFamilyRequest,
    UndertakingSingleRequest, VisaRequest,
};
use crate::document::DocumentKind;
use common::format_letter_date;

/// Errors raised while loading or filling templates.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to load template {path}: {source}")]
    TemplateIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid template '{name}': {source}")]
    TemplateSyntax {
        name: &'static str,
        #[source]
        source: Box<handlebars::TemplateError>,
    },
    #[error("payload does not match the {kind} template: {source}")]
    Payload {
        kind: DocumentKind,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to render {kind} template: {source}")]
    Template {
        kind: DocumentKind,
        #[source]
        source: Box<handlebars::RenderError>,
    },
}

/// HTML produced for one request.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub kind: DocumentKind,
    pub html: String,
    /// Person the document is about.
    pub subject: String,
}

#[derive(Serialize)]
struct LetterContext<'a, L: Serialize> {
    title: &'static str,
    issued_on: String,
    #[serde(flatten)]
    letter: &'a L,
}

handlebars_helper!(ordinal: |index: u64| index + 1);

pub struct TemplateRenderer {
    registry: Handlebars<'static>,
}

impl TemplateRenderer {
    /// Load every document template from `template_dir`.
    pub fn new(template_dir: &Path) -> Result<Self, RenderError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_helper("ordinal", Box::new(ordinal));

        for kind in DocumentKind::ALL {
            let name = kind.template_name();
            let path = template_dir.join(format!("{}.hbs", name));
            let source = fs::read_to_string(&path)
                .map_err(|source| RenderError::TemplateIo { path: path.clone(), source })?;
            registry
                .register_template_string(name, source)
                .map_err(|source| RenderError::TemplateSyntax {
                    name,
                    source: Box::new(source),
                })?;
            log::debug!("Registered template '{}' from {}", name, path.display());
        }

        Ok(Self { registry })
    }

    /// Render with today's date as the issue date.
    pub fn render(&self, kind: DocumentKind, payload: &Value) -> Result<RenderedDocument, RenderError> {
        self.render_dated(kind, payload, Local::now().date_naive())
    }

    pub fn render_dated(
        &self,
        kind: DocumentKind,
        payload: &Value,
        issued_on: NaiveDate,
    ) -> Result<RenderedDocument, RenderError> {
        match kind {
            DocumentKind::Visa => self.render_letter::<VisaRequest>(payload, issued_on),
            DocumentKind::Itinerary => self.render_letter::<ItineraryRequest>(payload, issued_on),
            DocumentKind::UndertakingSingle => {
                self.render_letter::<UndertakingSingleRequest>(payload, issued_on)
            }
            DocumentKind::UndertakingFamily => {
                self.render_letter::<UndertakingFamilyRequest>(payload, issued_on)
            }
            DocumentKind::Authorize => self.render_letter::<AuthorizeRequest>(payload, issued_on),
        }
    }

    fn render_letter<L: Letter>(
        &self,
        payload: &Value,
        issued_on: NaiveDate,
    ) -> Result<RenderedDocument, RenderError> {
        let kind = L::KIND;
        let letter = L::deserialize(payload).map_err(|source| RenderError::Payload { kind, source })?;

        let context = LetterContext {
            title: kind.title(),
            issued_on: format_letter_date(issued_on),
            letter: &letter,
        };
        let html = self
            .registry
            .render(kind.template_name(), &context)
            .map_err(|source| RenderError::Template {
                kind,
                source: Box::new(source),
            })?;

        Ok(RenderedDocument {
            kind,
            html,
            subject: letter.subject().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::samples::sample_payload;
    use serde_json::json;

    fn renderer() -> TemplateRenderer {
        TemplateRenderer::new(&common::default_template_dir()).unwrap()
    }

    fn fixed_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    #[test]
    fn test_every_sample_renders() {
        let renderer = renderer();
        for kind in DocumentKind::ALL {
            let doc = renderer
                .render_dated(kind, &sample_payload(kind), fixed_date())
                .unwrap();
            assert_eq!(doc.kind, kind);
            assert!(doc.html.contains(kind.title()), "{kind} is missing its title");
            assert!(doc.html.contains("18 October 2026"));
        }
    }

    #[test]
    fn test_values_are_html_escaped() {
        let doc = renderer()
            .render_dated(
                DocumentKind::UndertakingSingle,
                &json!({"name": "<b>Nirob</b> & co"}),
                fixed_date(),
            )
            .unwrap();
        assert!(doc.html.contains("&lt;b&gt;Nirob&lt;/b&gt; &amp; co"));
        assert_eq!(doc.subject, "<b>Nirob</b> & co");
    }

    #[test]
    fn test_family_rows_are_listed() {
        let payload = json!({
            "name": "Nirob",
            "array": [
                {"sl": 1, "name": "Imam", "number": "23847", "remarks": "self"},
                {"sl": 2, "name": "Rahima", "number": 99812, "remarks": "spouse"}
            ]
        });
        let doc = renderer()
            .render_dated(DocumentKind::UndertakingFamily, &payload, fixed_date())
            .unwrap();
        assert!(doc.html.contains("Rahima"));
        assert!(doc.html.contains("99812"));
    }

    #[test]
    fn test_payload_mismatch_is_a_render_error() {
        let err = renderer()
            .render(DocumentKind::Visa, &json!({"name": "Nirob"}))
            .unwrap_err();
        assert!(matches!(err, RenderError::Payload { kind: DocumentKind::Visa, .. }));
        assert!(err.to_string().contains("guest_country") || err.to_string().contains("missing field"));
    }

    #[test]
    fn test_missing_template_dir() {
        let err = TemplateRenderer::new(Path::new("/nonexistent/templates")).err().unwrap();
        assert!(matches!(err, RenderError::TemplateIo { .. }));
    }
}

//! Schema registry: one request schema per document kind.
//!
//! Schemas are plain JSON Schema documents built once at startup and shared
//! read-only between requests.

pub mod validation;

use serde_json::{json, Value};
use std::collections::HashMap;

use crate::document::DocumentKind;
pub use validation::{ValidationError, ValidationErrors};

/// Declarative description of a payload's required fields and their types.
#[derive(Debug, Clone)]
pub struct DocumentSchema {
    kind: DocumentKind,
    document: Value,
}

impl DocumentSchema {
    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// The raw schema document.
    pub fn as_json(&self) -> &Value {
        &self.document
    }

    pub fn validate(&self, instance: &Value) -> Result<(), ValidationError> {
        validation::validate(instance, &self.document)
    }

    pub fn iter_errors(&self, instance: &Value) -> ValidationErrors {
        validation::iter_errors(instance, &self.document)
    }
}

pub struct SchemaRegistry {
    schemas: HashMap<DocumentKind, DocumentSchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        let schemas = DocumentKind::ALL
            .into_iter()
            .map(|kind| {
                let schema = DocumentSchema {
                    kind,
                    document: schema_document(kind),
                };
                (kind, schema)
            })
            .collect();

        Self { schemas }
    }

    pub fn lookup(&self, kind: DocumentKind) -> &DocumentSchema {
        // Every kind is inserted in `new`.
        &self.schemas[&kind]
    }

    /// All schemas in route order.
    pub fn list(&self) -> Vec<&DocumentSchema> {
        DocumentKind::ALL
            .into_iter()
            .map(|kind| self.lookup(kind))
            .collect()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn string_or_integer() -> Value {
    json!({ "anyOf": [{ "type": "integer" }, { "type": "string" }] })
}

fn schema_document(kind: DocumentKind) -> Value {
    match kind {
        DocumentKind::Visa => json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "passport": { "type": "string" },
                "purpose": { "type": "string" },
                "guest_country": { "type": "string" }
            },
            "required": ["name", "passport", "purpose", "guest_country"]
        }),
        DocumentKind::Itinerary => json!({
            "type": "object",
            "properties": {
                "guests": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "passport": string_or_integer()
                        },
                        "required": ["name", "passport"]
                    }
                },
                "itenary": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "date": { "type": "string", "format": "date" },
                            "from": { "type": "string" },
                            "to": { "type": "string" }
                        },
                        "required": ["date", "from", "to"]
                    }
                }
            },
            "required": ["guests", "itenary"]
        }),
        DocumentKind::UndertakingSingle => json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" }
            },
            "required": ["name"]
        }),
        DocumentKind::UndertakingFamily => json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "array": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "sl": string_or_integer(),
                            "name": { "type": "string" },
                            "number": string_or_integer(),
                            "remarks": { "type": "string" }
                        },
                        "required": ["sl", "name", "number", "remarks"]
                    }
                }
            },
            "required": ["name", "array"]
        }),
        DocumentKind::Authorize => json!({
            "type": "object",
            "properties": {
                "client": { "type": "string" },
                "client_passport_number": { "type": "string" },
                "authorizer": { "type": "string" },
                "relationship": { "type": "string" },
                "authorizer_passport_number": { "type": "string" },
                "contact": { "type": "string" },
                "name_ava": { "type": "string" },
                "address_ava": { "type": "string" }
            },
            "required": [
                "client",
                "client_passport_number",
                "authorizer",
                "relationship",
                "authorizer_passport_number",
                "contact",
                "name_ava",
                "address_ava"
            ]
        }),
    }
}

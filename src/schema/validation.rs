//! Structural validation of JSON payloads against schema documents.
//!
//! Supports the JSON Schema keywords the document schemas use: `type`,
//! `properties`, `required`, `items` and `anyOf`. `format` is treated as an
//! annotation and never rejects a value.

use serde_json::Value;
use std::fmt;

/// A single schema violation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// JSON pointer to the offending value; empty for the document root.
    pub pointer: String,
    /// Schema keyword that rejected the value.
    pub keyword: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(pointer: &str, keyword: &'static str, message: impl Into<String>) -> Self {
        Self {
            pointer: pointer.to_string(),
            keyword,
            message: message.into(),
        }
    }

    pub fn missing_property(pointer: &str, property: &str) -> Self {
        Self::new(
            pointer,
            "required",
            format!("'{}' is a required property", property),
        )
    }

    pub fn wrong_type(pointer: &str, instance: &Value, expected: &str) -> Self {
        Self::new(
            pointer,
            "type",
            format!("{} is not of type {}", describe(instance), expected),
        )
    }

    pub fn no_match(pointer: &str, instance: &Value) -> Self {
        Self::new(
            pointer,
            "anyOf",
            format!(
                "{} is not valid under any of the given schemas",
                describe(instance)
            ),
        )
    }

    /// Location for display; `$` stands for the document root.
    pub fn location(&self) -> &str {
        if self.pointer.is_empty() {
            "$"
        } else {
            &self.pointer
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at {})", self.message, self.location())
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors with formatted output.
#[derive(Debug, Default)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }

    /// One violation per line, numbered.
    pub fn to_message(&self) -> String {
        self.errors
            .iter()
            .enumerate()
            .map(|(i, error)| format!("{}. {}", i + 1, error))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Ok if no errors were collected, otherwise the first one.
    pub fn into_result(self) -> Result<(), ValidationError> {
        match self.errors.into_iter().next() {
            None => Ok(()),
            Some(first) => Err(first),
        }
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

/// Validate `instance` against `schema`, stopping at the first violation.
pub fn validate(instance: &Value, schema: &Value) -> Result<(), ValidationError> {
    iter_errors(instance, schema).into_result()
}

/// Collect every violation of `schema` found in `instance`.
pub fn iter_errors(instance: &Value, schema: &Value) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    check(instance, schema, "", &mut errors);
    errors
}

fn check(instance: &Value, schema: &Value, pointer: &str, errors: &mut ValidationErrors) {
    if let Some(expected) = schema.get("type") {
        if !matches_type(instance, expected) {
            errors.add(ValidationError::wrong_type(
                pointer,
                instance,
                &expected_names(expected),
            ));
            // Nested keywords are meaningless once the type is wrong.
            return;
        }
    }

    if let Some(variants) = schema.get("anyOf").and_then(Value::as_array) {
        let any_valid = variants
            .iter()
            .any(|variant| iter_errors(instance, variant).is_empty());
        if !any_valid {
            errors.add(ValidationError::no_match(pointer, instance));
        }
    }

    if let Value::Object(map) = instance {
        if let Some(required) = schema.get("required").and_then(Value::as_array) {
            for property in required.iter().filter_map(Value::as_str) {
                if !map.contains_key(property) {
                    errors.add(ValidationError::missing_property(pointer, property));
                }
            }
        }

        if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
            for (name, subschema) in properties {
                if let Some(child) = map.get(name) {
                    let child_pointer = format!("{}/{}", pointer, escape_pointer(name));
                    check(child, subschema, &child_pointer, errors);
                }
            }
        }
    }

    if let (Value::Array(items), Some(item_schema)) = (instance, schema.get("items")) {
        for (index, item) in items.iter().enumerate() {
            let child_pointer = format!("{}/{}", pointer, index);
            check(item, item_schema, &child_pointer, errors);
        }
    }
}

fn matches_type(instance: &Value, expected: &Value) -> bool {
    match expected {
        Value::String(name) => is_type(instance, name),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .any(|name| is_type(instance, name)),
        _ => true,
    }
}

fn is_type(instance: &Value, name: &str) -> bool {
    match name {
        "object" => instance.is_object(),
        "array" => instance.is_array(),
        "string" => instance.is_string(),
        "boolean" => instance.is_boolean(),
        "null" => instance.is_null(),
        "number" => instance.is_number(),
        "integer" => match instance {
            Value::Number(n) => {
                n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
            }
            _ => false,
        },
        _ => false,
    }
}

fn expected_names(expected: &Value) -> String {
    match expected {
        Value::String(name) => format!("'{}'", name),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .map(|name| format!("'{}'", name))
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// Short rendering of an instance for messages.
fn describe(instance: &Value) -> String {
    const MAX: usize = 60;

    let text = match instance {
        Value::String(s) => format!("'{}'", s),
        other => other.to_string(),
    };
    if text.chars().count() > MAX {
        let truncated: String = text.chars().take(MAX).collect();
        format!("{}...", truncated)
    } else {
        text
    }
}

fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn person_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": {"type": "string"},
                "passport": {"anyOf": [{"type": "integer"}, {"type": "string"}]},
                "trips": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {"to": {"type": "string"}},
                        "required": ["to"]
                    }
                }
            },
            "required": ["name", "passport"]
        })
    }

    #[test]
    fn test_valid_instance() {
        let instance = json!({"name": "Imam", "passport": 43534, "trips": [{"to": "Dhaka"}]});
        assert!(validate(&instance, &person_schema()).is_ok());
    }

    #[test]
    fn test_missing_required_property() {
        let err = validate(&json!({"name": "Imam"}), &person_schema()).unwrap_err();
        assert_eq!(err.keyword, "required");
        assert_eq!(err.message, "'passport' is a required property");
        assert_eq!(err.to_string(), "'passport' is a required property (at $)");
    }

    #[test]
    fn test_wrong_root_type() {
        let err = validate(&Value::Null, &person_schema()).unwrap_err();
        assert_eq!(err.keyword, "type");
        assert_eq!(err.message, "null is not of type 'object'");
    }

    #[test]
    fn test_nested_item_pointer() {
        let instance = json!({"name": "Imam", "passport": "X1", "trips": [{"to": "Dhaka"}, {"to": 7}]});
        let err = validate(&instance, &person_schema()).unwrap_err();
        assert_eq!(err.pointer, "/trips/1/to");
        assert_eq!(err.message, "7 is not of type 'string'");
    }

    #[test]
    fn test_any_of_rejects_other_types() {
        let instance = json!({"name": "Imam", "passport": true});
        let err = validate(&instance, &person_schema()).unwrap_err();
        assert_eq!(err.keyword, "anyOf");
        assert_eq!(err.pointer, "/passport");
    }

    #[test]
    fn test_integer_accepts_whole_floats() {
        assert!(is_type(&json!(3.0), "integer"));
        assert!(!is_type(&json!(3.5), "integer"));
    }

    #[test]
    fn test_collects_every_violation() {
        let errors = iter_errors(&json!({"passport": [], "trips": [{}]}), &person_schema());
        assert_eq!(errors.len(), 3);
        let message = errors.to_message();
        assert!(message.starts_with("1. 'name' is a required property"));
        assert!(message.contains("'to' is a required property (at /trips/0)"));
    }

    #[test]
    fn test_pointer_escaping() {
        assert_eq!(escape_pointer("a/b~c"), "a~1b~0c");
    }
}

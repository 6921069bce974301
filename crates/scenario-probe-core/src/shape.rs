// crates/scenario-probe-core/src/shape.rs
// ============================================================================
// Module: Response Shape Validation
// Description: Structural conformance checks for system-under-test payloads.
// Purpose: Reject malformed responses before any value-level assertion runs.
// Dependencies: jsonschema, serde_json, time
// ============================================================================

//! ## Overview
//! A [`Shape`] declares the fields a response must carry: required or
//! optional, nullable or not, with a primitive kind that may include a string
//! format (UUID, RFC 3339 date-time, email). Validation is comparison only
//! and fails closed; a structural mismatch is fatal for the enclosing
//! scenario. Shapes also compile to Draft 2020-12 schemas so suites can
//! cross-check conformance with the `jsonschema` validator.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use jsonschema::Draft;
use jsonschema::Validator;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Structural validation error.
///
/// # Invariants
/// - Variants are stable for mismatch classification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShapeError {
    /// Response root is not a JSON object.
    #[error("response is not a JSON object")]
    NotAnObject,
    /// A required field is absent.
    #[error("required field `{0}` is missing")]
    MissingField(String),
    /// A non-nullable field carried a JSON null.
    #[error("field `{0}` is null but the shape does not allow null")]
    UnexpectedNull(String),
    /// A field carried the wrong primitive kind.
    #[error("field `{field}` expected {expected} but found {found}")]
    KindMismatch {
        /// Field name that failed the check.
        field: String,
        /// Declared kind from the shape.
        expected: FieldKind,
        /// JSON kind actually observed.
        found: String,
    },
    /// A formatted string field failed its format check.
    #[error("field `{field}` is not a valid {expected}: `{value}`")]
    FormatMismatch {
        /// Field name that failed the check.
        field: String,
        /// Declared format kind from the shape.
        expected: FieldKind,
        /// Offending string value.
        value: String,
    },
    /// The derived JSON schema failed to compile.
    #[error("shape schema failed to compile: {0}")]
    SchemaCompile(String),
}

// ============================================================================
// SECTION: Field Kinds
// ============================================================================

/// Primitive kind (optionally format-constrained) for a shape field.
///
/// # Invariants
/// - Format kinds apply only to JSON strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Any JSON string.
    String,
    /// Any JSON number.
    Number,
    /// JSON number with no fractional part.
    Integer,
    /// JSON boolean.
    Boolean,
    /// String in canonical 8-4-4-4-12 UUID form.
    Uuid,
    /// String in RFC 3339 date-time form.
    DateTime,
    /// String shaped like an email address.
    Email,
    /// Any JSON object.
    Object,
    /// Any JSON array.
    Array,
}

impl FieldKind {
    /// Returns the JSON Schema type name for this kind.
    #[must_use]
    pub const fn schema_type(self) -> &'static str {
        match self {
            Self::String | Self::Uuid | Self::DateTime | Self::Email => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
        }
    }

    /// Returns the JSON Schema format annotation, when one applies.
    #[must_use]
    pub const fn schema_format(self) -> Option<&'static str> {
        match self {
            Self::Uuid => Some("uuid"),
            Self::DateTime => Some("date-time"),
            Self::Email => Some("email"),
            _ => None,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Uuid => "uuid string",
            Self::DateTime => "date-time string",
            Self::Email => "email string",
            Self::Object => "object",
            Self::Array => "array",
        };
        f.write_str(label)
    }
}

// ============================================================================
// SECTION: Shape Model
// ============================================================================

/// Declaration for one field of a response shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Primitive kind the field must carry.
    pub kind: FieldKind,
    /// Whether the field must be present.
    pub required: bool,
    /// Whether a JSON null satisfies the field.
    pub nullable: bool,
}

/// Ordered structural description of a response payload.
///
/// # Invariants
/// - Fields are keyed deterministically; unknown extra fields are permitted
///   because servers assign fields the harness does not declare.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Shape {
    /// Field declarations keyed by field name.
    fields: BTreeMap<String, FieldSpec>,
}

impl Shape {
    /// Creates an empty shape.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a required, non-nullable field.
    #[must_use]
    pub fn field(mut self, name: &str, kind: FieldKind) -> Self {
        self.fields.insert(name.to_string(), FieldSpec {
            kind,
            required: true,
            nullable: false,
        });
        self
    }

    /// Adds an optional, non-nullable field.
    #[must_use]
    pub fn optional(mut self, name: &str, kind: FieldKind) -> Self {
        self.fields.insert(name.to_string(), FieldSpec {
            kind,
            required: false,
            nullable: false,
        });
        self
    }

    /// Adds a required field that may carry a JSON null.
    #[must_use]
    pub fn nullable(mut self, name: &str, kind: FieldKind) -> Self {
        self.fields.insert(name.to_string(), FieldSpec {
            kind,
            required: true,
            nullable: true,
        });
        self
    }

    /// Returns the declared field specs keyed by name.
    #[must_use]
    pub const fn fields(&self) -> &BTreeMap<String, FieldSpec> {
        &self.fields
    }

    /// Validates a response value against this shape.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError`] on the first structural mismatch.
    pub fn validate(&self, value: &Value) -> Result<(), ShapeError> {
        let Value::Object(object) = value else {
            return Err(ShapeError::NotAnObject);
        };
        for (name, spec) in &self.fields {
            match object.get(name) {
                None => {
                    if spec.required {
                        return Err(ShapeError::MissingField(name.clone()));
                    }
                }
                Some(Value::Null) => {
                    if !spec.nullable {
                        return Err(ShapeError::UnexpectedNull(name.clone()));
                    }
                }
                Some(field_value) => {
                    validate_kind(name, spec.kind, field_value)?;
                }
            }
        }
        Ok(())
    }

    /// Renders this shape as a Draft 2020-12 JSON Schema document.
    #[must_use]
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for (name, spec) in &self.fields {
            let mut property = Map::new();
            if spec.nullable {
                property
                    .insert("type".to_string(), json!([spec.kind.schema_type(), "null"]));
            } else {
                property.insert("type".to_string(), json!(spec.kind.schema_type()));
            }
            if let Some(format) = spec.kind.schema_format() {
                property.insert("format".to_string(), json!(format));
            }
            properties.insert(name.clone(), Value::Object(property));
            if spec.required {
                required.push(json!(name));
            }
        }
        json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Compiles this shape into a `jsonschema` validator.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError::SchemaCompile`] when the derived schema is rejected.
    pub fn compile(&self) -> Result<Validator, ShapeError> {
        let schema = self.to_json_schema();
        jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(&schema)
            .map_err(|err| ShapeError::SchemaCompile(err.to_string()))
    }
}

// ============================================================================
// SECTION: Kind Checks
// ============================================================================

/// Validates one field value against its declared kind.
fn validate_kind(name: &str, kind: FieldKind, value: &Value) -> Result<(), ShapeError> {
    let mismatch = |found: &str| ShapeError::KindMismatch {
        field: name.to_string(),
        expected: kind,
        found: found.to_string(),
    };
    match kind {
        FieldKind::String => value.as_str().map(|_| ()).ok_or_else(|| mismatch(json_kind(value))),
        FieldKind::Number => {
            if value.is_number() {
                Ok(())
            } else {
                Err(mismatch(json_kind(value)))
            }
        }
        FieldKind::Integer => {
            if value.as_i64().is_some() || value.as_u64().is_some() {
                Ok(())
            } else {
                Err(mismatch(json_kind(value)))
            }
        }
        FieldKind::Boolean => {
            if value.is_boolean() {
                Ok(())
            } else {
                Err(mismatch(json_kind(value)))
            }
        }
        FieldKind::Object => {
            if value.is_object() {
                Ok(())
            } else {
                Err(mismatch(json_kind(value)))
            }
        }
        FieldKind::Array => {
            if value.is_array() {
                Ok(())
            } else {
                Err(mismatch(json_kind(value)))
            }
        }
        FieldKind::Uuid | FieldKind::DateTime | FieldKind::Email => {
            let Some(text) = value.as_str() else {
                return Err(mismatch(json_kind(value)));
            };
            let ok = match kind {
                FieldKind::Uuid => is_uuid(text),
                FieldKind::DateTime => OffsetDateTime::parse(text, &Rfc3339).is_ok(),
                _ => is_email(text),
            };
            if ok {
                Ok(())
            } else {
                Err(ShapeError::FormatMismatch {
                    field: name.to_string(),
                    expected: kind,
                    value: text.to_string(),
                })
            }
        }
    }
}

/// Returns a stable label for a JSON value's kind.
fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Checks canonical 8-4-4-4-12 lowercase-or-uppercase hex UUID form.
fn is_uuid(text: &str) -> bool {
    let groups: Vec<&str> = text.split('-').collect();
    let lengths = [8_usize, 4, 4, 4, 12];
    groups.len() == lengths.len()
        && groups
            .iter()
            .zip(lengths)
            .all(|(group, length)| {
                group.len() == length && group.chars().all(|ch| ch.is_ascii_hexdigit())
            })
}

/// Checks the minimal email shape: non-empty local part and dotted domain.
fn is_email(text: &str) -> bool {
    text.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================

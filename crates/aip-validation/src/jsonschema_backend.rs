//! Real JSON Schema validation, grounded in
//! `original_source/app/validation/validator.py::SchemaRegistry`.
//! Loads every `*.json` file in a directory into a compiled
//! `jsonschema::JSONSchema`, keyed by file stem, and injects the vendor
//! extension `patternProperties` block under any `ext`/`extensions`
//! property before compiling.

use std::collections::HashMap;
use std::path::Path;

use aip_types::AipError;
use jsonschema::JSONSchema;
use serde_json::Value;

use crate::{SchemaValidator, EXTENSION_VENDOR_PATTERN};

pub struct JsonSchemaValidator {
    schemas: HashMap<String, JSONSchema<'static>>,
}

impl JsonSchemaValidator {
    pub fn load_dir(schema_dir: impl AsRef<Path>) -> Result<Self, AipError> {
        let schema_dir = schema_dir.as_ref();
        let mut schemas = HashMap::new();
        let entries = std::fs::read_dir(schema_dir)
            .map_err(|e| AipError::Internal(format!("reading schema dir: {e}")))?;

        let mut paths: Vec<_> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("json"))
            .collect();
        paths.sort();

        for path in paths {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| AipError::Internal(format!("reading {}: {e}", path.display())))?;
            let mut document: Value = serde_json::from_str(&text)
                .map_err(|e| AipError::Internal(format!("parsing {}: {e}", path.display())))?;
            inject_extension_namespace(&mut document);
            // Schemas are loaded once per process and compiled validators
            // borrow from their source document (`jsonschema`'s API), so
            // each document is leaked for the process's lifetime rather
            // than cloned on every lookup.
            let document: &'static Value = Box::leak(Box::new(document));
            let compiled = JSONSchema::compile(document)
                .map_err(|e| AipError::Internal(format!("compiling {}: {e}", path.display())))?;
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| AipError::Internal(format!("non-utf8 schema filename {}", path.display())))?
                .to_string();
            schemas.insert(stem, compiled);
        }
        Ok(Self { schemas })
    }
}

impl SchemaValidator for JsonSchemaValidator {
    fn validate(&self, schema_name: &str, payload: &Value) -> Result<(), AipError> {
        let schema = self
            .schemas
            .get(schema_name)
            .ok_or_else(|| AipError::SchemaInvalid(format!("unknown schema {schema_name}")))?;
        schema.validate(payload).map_err(|errors| {
            let detail = errors.map(|e| e.to_string()).collect::<Vec<_>>().join("; ");
            AipError::SchemaInvalid(detail)
        })
    }
}

/// Ensures any `ext`/`extensions` property admits vendor-namespaced
/// keys without touching core fields, recursing into nested schemas
/// (`$defs`, array items, etc.) the way the source's `_inject_extension_namespace` does.
fn inject_extension_namespace(schema: &mut Value) {
    if let Value::Object(map) = schema {
        if let Some(Value::Object(properties)) = map.get_mut("properties") {
            for key in ["ext", "extensions"] {
                if let Some(Value::Object(ext_map)) = properties.get_mut(key) {
                    if !ext_map.contains_key("$ref") {
                        ext_map
                            .entry("description")
                            .or_insert_with(|| Value::String("Vendor-namespaced extension container.".to_string()));
                        ext_map.entry("type").or_insert_with(|| Value::String("object".to_string()));
                        ext_map.entry("patternProperties").or_insert_with(|| {
                            serde_json::json!({
                                EXTENSION_VENDOR_PATTERN: {
                                    "type": "object",
                                    "description": "Operator-owned extension payload.",
                                    "additionalProperties": true,
                                }
                            })
                        });
                        ext_map.entry("additionalProperties").or_insert_with(|| Value::Bool(false));
                    }
                }
            }
        }
        for value in map.values_mut() {
            inject_extension_namespace(value);
        }
    } else if let Value::Array(items) = schema {
        for item in items.iter_mut() {
            inject_extension_namespace(item);
        }
    }
}

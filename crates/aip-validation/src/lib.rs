//! Schema/Validation Adapter (§1, §6): treated as an opaque
//! `validate(name, payload)` capability. JSON Schema body itself is out
//! of scope for the core pipeline, so the default implementation is
//! permissive; a real `jsonschema`-backed implementation sits behind a
//! feature flag, grounded in `original_source/app/validation/validator.py`.

#[cfg(feature = "jsonschema-backend")]
pub mod jsonschema_backend;

use aip_types::AipError;

/// Vendor extension key pattern injected into schemas at the `ext`/
/// `extensions` position (§6).
pub const EXTENSION_VENDOR_PATTERN: &str = "^[a-z0-9][a-z0-9_-]{1,63}$";

#[auto_impl::auto_impl(Arc)]
pub trait SchemaValidator: Send + Sync {
    fn validate(&self, schema_name: &str, payload: &serde_json::Value) -> Result<(), AipError>;
}

/// Always succeeds. The schema body itself is explicitly out of scope
/// (§1); this is the default wired into the server when no schema
/// directory is configured.
#[derive(Debug, Default)]
pub struct PermissiveValidator;

impl SchemaValidator for PermissiveValidator {
    fn validate(&self, _schema_name: &str, _payload: &serde_json::Value) -> Result<(), AipError> {
        Ok(())
    }
}

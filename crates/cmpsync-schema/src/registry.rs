use std::collections::HashMap;
use std::fmt;

use jsonschema::Validator;
use serde_json::{Map, Value};

use crate::config::RegistryConfig;
use crate::error::{Result, SchemaError};
use crate::schemas;
use crate::validator::validate_value;

/// Kinds of JSON document the proxy accepts from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocumentKind {
    VendorList,
    Config,
    CmpCall,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 3] = [Self::VendorList, Self::Config, Self::CmpCall];

    pub fn name(self) -> &'static str {
        match self {
            Self::VendorList => "vendor-list",
            Self::Config => "config",
            Self::CmpCall => "cmp-call",
        }
    }

    /// Embedded schema for this kind.
    pub fn builtin_schema(self) -> &'static str {
        match self {
            Self::VendorList => schemas::VENDOR_LIST,
            Self::Config => schemas::CONFIG,
            Self::CmpCall => schemas::CMP_CALL,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind-keyed registry of compiled JSON Schema validators.
pub struct SchemaRegistry {
    validators: HashMap<DocumentKind, Validator>,
    config: RegistryConfig,
}

impl SchemaRegistry {
    /// Create an empty registry with default config.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with explicit config.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            validators: HashMap::new(),
            config,
        }
    }

    /// Registry with every embedded schema compiled.
    pub fn builtin() -> Result<Self> {
        Self::builtin_with_config(RegistryConfig::default())
    }

    /// Registry with every embedded schema compiled, explicit config.
    pub fn builtin_with_config(config: RegistryConfig) -> Result<Self> {
        let mut registry = Self::with_config(config);
        for kind in DocumentKind::ALL {
            registry.register(kind, kind.builtin_schema())?;
        }
        Ok(registry)
    }

    /// Register a schema for a kind from a JSON string.
    pub fn register(&mut self, kind: DocumentKind, schema_json: &str) -> Result<()> {
        let schema: Value = serde_json::from_str(schema_json)?;
        self.register_value(kind, &schema)
    }

    /// Register a schema for a kind from a JSON value.
    pub fn register_value(&mut self, kind: DocumentKind, schema: &Value) -> Result<()> {
        let mut schema_to_compile = schema.clone();
        if self.config.strict_mode {
            close_object_schemas(&mut schema_to_compile);
        }

        let compiled = jsonschema::validator_for(&schema_to_compile)
            .map_err(|err| SchemaError::CompileFailed(err.to_string()))?;

        tracing::debug!(kind = kind.name(), "registered schema");
        self.validators.insert(kind, compiled);
        Ok(())
    }

    /// Validate a raw JSON document.
    pub fn validate(&self, kind: DocumentKind, payload: &[u8]) -> Result<()> {
        if payload.len() > self.config.max_document_size {
            return Err(SchemaError::TooLarge {
                size: payload.len(),
                max: self.config.max_document_size,
            });
        }
        let value: Value = serde_json::from_slice(payload)?;
        self.validate_value(kind, &value)
    }

    /// Validate an already parsed JSON document.
    pub fn validate_value(&self, kind: DocumentKind, value: &Value) -> Result<()> {
        match self.validators.get(&kind) {
            Some(validator) => validate_value(kind.name(), value, validator),
            None if self.config.fail_on_missing_schema => Err(SchemaError::NoSchema(kind.name())),
            None => Ok(()),
        }
    }

    /// Check if a kind has a registered schema.
    pub fn has_schema(&self, kind: DocumentKind) -> bool {
        self.validators.contains_key(&kind)
    }

    /// Kinds that have registered schemas.
    pub fn kinds(&self) -> Vec<DocumentKind> {
        let mut kinds: Vec<DocumentKind> = self.validators.keys().copied().collect();
        kinds.sort_unstable();
        kinds
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn close_object_schemas(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if declares_properties(map) && !map.contains_key("additionalProperties") {
                map.insert("additionalProperties".to_string(), Value::Bool(false));
            }
            for key in ["properties", "$defs"] {
                if let Some(Value::Object(children)) = map.get_mut(key) {
                    children.values_mut().for_each(close_object_schemas);
                }
            }
            for key in ["items", "additionalProperties"] {
                if let Some(child) = map.get_mut(key) {
                    close_object_schemas(child);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(close_object_schemas),
        _ => {}
    }
}

fn declares_properties(map: &Map<String, Value>) -> bool {
    map.contains_key("properties")
}

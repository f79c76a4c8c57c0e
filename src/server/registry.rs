//! The immutable tool catalog.
//!
//! Tools are registered once during startup composition, before serving
//! begins; the registry is read-only afterwards, so lookups during serving
//! take no lock.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use jsonschema::Validator;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::ToolInfo;

use super::{ToolHandler, CATALOG_TOOL};

/// A named, schema-described callable operation.
///
/// A tool is a data record: name, schemas, and a handler capability.
/// Supplying a handler closure or trait object replaces the
/// subclass-and-override pattern of generated base classes.
pub struct ToolDefinition {
    name: String,
    description: Option<String>,
    input_schema: Value,
    output_schema: Option<Value>,
    input_validator: Option<Validator>,
    output_validator: Option<Validator>,
    handler: Arc<dyn ToolHandler>,
}

impl fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("input_schema", &self.input_schema)
            .field("output_schema", &self.output_schema)
            .finish()
    }
}

impl ToolDefinition {
    /// Create a definition with a name and handler.
    ///
    /// Without an explicit input schema the tool accepts any arguments, and
    /// the catalog advertises the permissive empty schema to match; set a
    /// real one with [`ToolDefinition::with_input_schema`].
    pub fn new(name: impl Into<String>, handler: impl ToolHandler + 'static) -> Self {
        Self::from_arc(name, Arc::new(handler))
    }

    /// Create a definition from an already shared handler.
    pub fn from_arc(name: impl Into<String>, handler: Arc<dyn ToolHandler>) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_schema: serde_json::json!({}),
            output_schema: None,
            input_validator: None,
            output_validator: None,
            handler,
        }
    }

    /// Set the description for this tool.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set and compile the input schema.
    ///
    /// Fails if the schema itself is invalid; this is a startup-composition
    /// error, not a per-call one.
    pub fn with_input_schema(mut self, schema: Value) -> Result<Self> {
        let validator = compile_schema(&self.name, "input", &schema)?;
        self.input_schema = schema;
        self.input_validator = Some(validator);
        Ok(self)
    }

    /// Set and compile the output schema.
    pub fn with_output_schema(mut self, schema: Value) -> Result<Self> {
        let validator = compile_schema(&self.name, "output", &schema)?;
        self.output_schema = Some(schema);
        self.output_validator = Some(validator);
        Ok(self)
    }

    /// The tool's unique name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Catalog entry for this tool.
    pub fn info(&self) -> ToolInfo {
        ToolInfo {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: self.input_schema.clone(),
            output_schema: self.output_schema.clone(),
        }
    }

    /// Validate raw arguments against the input schema.
    pub fn validate_input(&self, args: &Value) -> Result<()> {
        if let Some(validator) = &self.input_validator {
            if let Err(err) = validator.validate(args) {
                return Err(Error::invalid_arguments(err.to_string()));
            }
        }
        Ok(())
    }

    /// Validate a handler result against the output schema.
    ///
    /// A violation here is the server's fault, never the caller's.
    pub fn validate_output(&self, result: &Value) -> Result<()> {
        if let Some(validator) = &self.output_validator {
            if let Err(err) = validator.validate(result) {
                return Err(Error::internal(format!(
                    "tool '{}' produced output violating its schema: {err}",
                    self.name
                )));
            }
        }
        Ok(())
    }

    /// The handler capability bound to this tool.
    pub fn handler(&self) -> &Arc<dyn ToolHandler> {
        &self.handler
    }
}

fn compile_schema(tool: &str, which: &str, schema: &Value) -> Result<Validator> {
    jsonschema::validator_for(schema)
        .map_err(|e| Error::validation(format!("invalid {which} schema for tool '{tool}': {e}")))
}

/// Mapping from tool name to definition, keys unique, insertion-ordered.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, Arc<ToolDefinition>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool definition.
    ///
    /// Fails on a duplicate name without overwriting the original, and on
    /// the reserved catalog name. Fatal at startup: callers should fail
    /// fast before serving begins.
    pub fn register(&mut self, def: ToolDefinition) -> Result<()> {
        if def.name() == CATALOG_TOOL {
            return Err(Error::validation(format!(
                "tool name '{CATALOG_TOOL}' is reserved for catalog requests"
            )));
        }
        if self.tools.contains_key(def.name()) {
            return Err(Error::DuplicateRegistration(def.name().to_string()));
        }
        self.tools.insert(def.name().to_string(), Arc::new(def));
        Ok(())
    }

    /// Look up a tool by name.
    pub fn lookup(&self, name: &str) -> Option<Arc<ToolDefinition>> {
        self.tools.get(name).cloned()
    }

    /// Catalog entries in registration order.
    pub fn list(&self) -> Vec<ToolInfo> {
        self.tools.values().map(|def| def.info()).collect()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::SyncTool;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn noop(name: &str) -> ToolDefinition {
        ToolDefinition::new(name, SyncTool::new(|_| Ok(json!(null))))
    }

    #[test]
    fn test_register_then_lookup() {
        let mut registry = ToolRegistry::new();
        registry
            .register(noop("echo").with_description("echoes"))
            .unwrap();

        let def = registry.lookup("echo").expect("registered tool");
        assert_eq!(def.name(), "echo");
        assert_eq!(def.info().description.as_deref(), Some("echoes"));
        assert!(registry.lookup("doesNotExist").is_none());
    }

    #[test]
    fn test_duplicate_registration_keeps_original() {
        let mut registry = ToolRegistry::new();
        registry
            .register(noop("echo").with_description("first"))
            .unwrap();

        let err = registry
            .register(noop("echo").with_description("second"))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateRegistration(_)));

        let def = registry.lookup("echo").unwrap();
        assert_eq!(def.info().description.as_deref(), Some("first"));
    }

    #[test]
    fn test_reserved_name_rejected() {
        let mut registry = ToolRegistry::new();
        let err = registry.register(noop(CATALOG_TOOL)).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let mut registry = ToolRegistry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry.register(noop(name)).unwrap();
        }
        let names: Vec<_> = registry.list().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_default_schema_matches_enforcement() {
        let def = noop("free");
        // Schema-less tools accept anything; the advertised catalog schema
        // must say so rather than claiming objects only.
        assert_eq!(def.info().input_schema, json!({}));
        assert!(def.validate_input(&json!(null)).is_ok());
        assert!(def.validate_input(&json!(42)).is_ok());
        assert!(def.validate_input(&json!({"any": "thing"})).is_ok());
    }

    #[test]
    fn test_input_schema_validation() {
        let def = noop("echo")
            .with_input_schema(json!({
                "type": "object",
                "properties": {"text": {"type": "string"}},
                "required": ["text"],
                "additionalProperties": false
            }))
            .unwrap();

        assert!(def.validate_input(&json!({"text": "hi"})).is_ok());
        let err = def.validate_input(&json!({"text": 42})).unwrap_err();
        assert!(matches!(err, Error::InvalidArguments(_)));
        let err = def.validate_input(&json!({})).unwrap_err();
        assert!(matches!(err, Error::InvalidArguments(_)));
    }

    #[test]
    fn test_output_schema_violation_is_internal() {
        let def = noop("count")
            .with_output_schema(json!({"type": "integer"}))
            .unwrap();
        assert!(def.validate_output(&json!(3)).is_ok());
        let err = def.validate_output(&json!("three")).unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
    }

    #[test]
    fn test_invalid_schema_fails_at_definition_time() {
        let result = noop("broken").with_input_schema(json!({"type": "nonsense"}));
        assert!(matches!(result, Err(Error::Validation(_))));
    }
}

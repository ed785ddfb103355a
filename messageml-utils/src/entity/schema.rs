//! Schema validation contract for extension entities.
//!
//! Extension entities carry arbitrary JSON. When the caller registers a schema
//! for an entity type, every entity of that type is checked through
//! [`SchemaValidator`] before the message is accepted. The validator reports
//! the first violation it finds; a schema it cannot interpret is a processing
//! failure, not a content failure.

use crate::error::{MessageMLError, Result};
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// First violation found in an instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// JSON pointer to the offending value, `""` for the root
    pub path: String,
    pub message: String,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("{0}")]
    Violation(SchemaViolation),
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
}

/// Validate a JSON instance against a schema document
pub trait SchemaValidator: Send + Sync {
    fn validate(&self, instance: &Value, schema: &Value) -> std::result::Result<(), SchemaError>;
}

/// Schemas registered per entity type
pub struct EntitySchemas {
    schemas: HashMap<String, Value>,
    validator: Box<dyn SchemaValidator>,
}

impl EntitySchemas {
    pub fn new() -> Self {
        Self::with_validator(BasicSchemaValidator)
    }

    pub fn with_validator<V: SchemaValidator + 'static>(validator: V) -> Self {
        EntitySchemas {
            schemas: HashMap::new(),
            validator: Box::new(validator),
        }
    }

    pub fn register(&mut self, entity_type: impl Into<String>, schema: Value) {
        self.schemas.insert(entity_type.into(), schema);
    }

    pub fn has(&self, entity_type: &str) -> bool {
        self.schemas.contains_key(entity_type)
    }

    /// Check an entity against the schema for its type; types without a schema pass
    pub fn check(&self, entity_id: &str, entity_type: &str, instance: &Value) -> Result<()> {
        let Some(schema) = self.schemas.get(entity_type) else {
            return Ok(());
        };
        self.validator
            .validate(instance, schema)
            .map_err(|err| match err {
                SchemaError::Violation(violation) => MessageMLError::entity(format!(
                    "Entity \"{entity_id}\" of type \"{entity_type}\" does not match its schema: {violation}"
                )),
                SchemaError::InvalidSchema(reason) => MessageMLError::Processing(format!(
                    "Schema for entity type \"{entity_type}\" is invalid: {reason}"
                )),
            })
    }
}

impl Default for EntitySchemas {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EntitySchemas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<_> = self.schemas.keys().collect();
        types.sort();
        f.debug_struct("EntitySchemas").field("types", &types).finish()
    }
}

/// Validator for the commonly used subset of JSON Schema: `type`, `enum`,
/// `const`, `required`, `properties`, `additionalProperties`, `items`,
/// `minItems`, `maxItems`, `minLength`, `maxLength`, `minimum`, `maximum`
/// and `pattern`. Other keywords are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicSchemaValidator;

impl SchemaValidator for BasicSchemaValidator {
    fn validate(&self, instance: &Value, schema: &Value) -> std::result::Result<(), SchemaError> {
        check(instance, schema, "")
    }
}

fn violation(path: &str, message: impl Into<String>) -> SchemaError {
    SchemaError::Violation(SchemaViolation {
        path: path.to_string(),
        message: message.into(),
    })
}

fn check(instance: &Value, schema: &Value, path: &str) -> std::result::Result<(), SchemaError> {
    let schema = match schema {
        Value::Bool(true) => return Ok(()),
        Value::Bool(false) => return Err(violation(path, "no value is allowed here")),
        Value::Object(map) => map,
        other => {
            return Err(SchemaError::InvalidSchema(format!(
                "expected an object or boolean at \"{path}\", found {other}"
            )))
        }
    };

    if let Some(expected) = schema.get("type") {
        check_type(instance, expected, path)?;
    }
    if let Some(allowed) = schema.get("enum") {
        let allowed = allowed
            .as_array()
            .ok_or_else(|| SchemaError::InvalidSchema("\"enum\" must be an array".into()))?;
        if !allowed.contains(instance) {
            return Err(violation(path, format!("{instance} is not one of {}", Value::from(allowed.clone()))));
        }
    }
    if let Some(expected) = schema.get("const") {
        if expected != instance {
            return Err(violation(path, format!("expected {expected}, found {instance}")));
        }
    }

    match instance {
        Value::Object(object) => check_object(object, schema, path)?,
        Value::Array(items) => check_array(items, schema, path)?,
        Value::String(text) => check_string(text, schema, path)?,
        Value::Number(number) => {
            let value = number.as_f64().unwrap_or(0.0);
            if let Some(min) = number_keyword(schema, "minimum")? {
                if value < min {
                    return Err(violation(path, format!("{value} is less than the minimum of {min}")));
                }
            }
            if let Some(max) = number_keyword(schema, "maximum")? {
                if value > max {
                    return Err(violation(path, format!("{value} is greater than the maximum of {max}")));
                }
            }
        }
        _ => {}
    }
    Ok(())
}

fn check_type(instance: &Value, expected: &Value, path: &str) -> std::result::Result<(), SchemaError> {
    let names: Vec<&str> = match expected {
        Value::String(name) => vec![name.as_str()],
        Value::Array(names) => names.iter().filter_map(Value::as_str).collect(),
        _ => {
            return Err(SchemaError::InvalidSchema(
                "\"type\" must be a string or an array of strings".into(),
            ))
        }
    };
    let mut matched = false;
    for name in &names {
        matched |= match *name {
            "object" => instance.is_object(),
            "array" => instance.is_array(),
            "string" => instance.is_string(),
            "number" => instance.is_number(),
            "integer" => instance.is_i64() || instance.is_u64(),
            "boolean" => instance.is_boolean(),
            "null" => instance.is_null(),
            other => return Err(SchemaError::InvalidSchema(format!("unknown type \"{other}\""))),
        };
    }
    if matched {
        Ok(())
    } else {
        Err(violation(path, format!("{instance} is not of type {}", names.join(" or "))))
    }
}

fn check_object(
    object: &Map<String, Value>,
    schema: &Map<String, Value>,
    path: &str,
) -> std::result::Result<(), SchemaError> {
    if let Some(required) = schema.get("required") {
        let required = required
            .as_array()
            .ok_or_else(|| SchemaError::InvalidSchema("\"required\" must be an array".into()))?;
        for key in required.iter().filter_map(Value::as_str) {
            if !object.contains_key(key) {
                return Err(violation(path, format!("\"{key}\" is a required property")));
            }
        }
    }
    let properties = schema.get("properties").and_then(Value::as_object);
    for (key, value) in object {
        let child_path = format!("{path}/{key}");
        match properties.and_then(|p| p.get(key)) {
            Some(property_schema) => check(value, property_schema, &child_path)?,
            None => {
                if let Some(additional) = schema.get("additionalProperties") {
                    check(value, additional, &child_path)?;
                }
            }
        }
    }
    Ok(())
}

fn check_array(
    items: &[Value],
    schema: &Map<String, Value>,
    path: &str,
) -> std::result::Result<(), SchemaError> {
    if let Some(min) = count_keyword(schema, "minItems")? {
        if items.len() < min {
            return Err(violation(path, format!("expected at least {min} items")));
        }
    }
    if let Some(max) = count_keyword(schema, "maxItems")? {
        if items.len() > max {
            return Err(violation(path, format!("expected at most {max} items")));
        }
    }
    if let Some(item_schema) = schema.get("items") {
        for (index, item) in items.iter().enumerate() {
            check(item, item_schema, &format!("{path}/{index}"))?;
        }
    }
    Ok(())
}

fn check_string(
    text: &str,
    schema: &Map<String, Value>,
    path: &str,
) -> std::result::Result<(), SchemaError> {
    let length = text.chars().count();
    if let Some(min) = count_keyword(schema, "minLength")? {
        if length < min {
            return Err(violation(path, format!("\"{text}\" is shorter than {min} characters")));
        }
    }
    if let Some(max) = count_keyword(schema, "maxLength")? {
        if length > max {
            return Err(violation(path, format!("\"{text}\" is longer than {max} characters")));
        }
    }
    if let Some(pattern) = schema.get("pattern") {
        let pattern = pattern
            .as_str()
            .ok_or_else(|| SchemaError::InvalidSchema("\"pattern\" must be a string".into()))?;
        let regex = Regex::new(pattern)
            .map_err(|e| SchemaError::InvalidSchema(format!("bad pattern \"{pattern}\": {e}")))?;
        if !regex.is_match(text) {
            return Err(violation(path, format!("\"{text}\" does not match \"{pattern}\"")));
        }
    }
    Ok(())
}

fn count_keyword(schema: &Map<String, Value>, keyword: &str) -> std::result::Result<Option<usize>, SchemaError> {
    match schema.get(keyword) {
        None => Ok(None),
        Some(value) => value
            .as_u64()
            .map(|n| Some(n as usize))
            .ok_or_else(|| SchemaError::InvalidSchema(format!("\"{keyword}\" must be a non-negative integer"))),
    }
}

fn number_keyword(schema: &Map<String, Value>, keyword: &str) -> std::result::Result<Option<f64>, SchemaError> {
    match schema.get(keyword) {
        None => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or_else(|| SchemaError::InvalidSchema(format!("\"{keyword}\" must be a number"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn widget_schema() -> Value {
        json!({
            "type": "object",
            "required": ["type", "version", "name"],
            "properties": {
                "type": {"const": "com.acme.widget"},
                "version": {"type": "string", "enum": ["1.0", "1.1"]},
                "name": {"type": "string", "minLength": 1, "maxLength": 8},
                "size": {"type": "integer", "minimum": 1, "maximum": 10},
                "tags": {"type": "array", "items": {"type": "string", "pattern": "^[a-z]+$"}}
            }
        })
    }

    #[test]
    fn test_valid_instance_passes() {
        let instance = json!({"type": "com.acme.widget", "version": "1.0", "name": "gear", "size": 3, "tags": ["a", "b"]});
        assert_eq!(BasicSchemaValidator.validate(&instance, &widget_schema()), Ok(()));
    }

    #[test]
    fn test_reports_first_violation_with_path() {
        let instance = json!({"type": "com.acme.widget", "version": "1.0", "name": "gear", "tags": ["ok", "NO"]});
        let err = BasicSchemaValidator.validate(&instance, &widget_schema()).unwrap_err();
        match err {
            SchemaError::Violation(v) => assert_eq!(v.path, "/tags/1"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_missing_required_property() {
        let instance = json!({"type": "com.acme.widget", "version": "1.0"});
        let err = BasicSchemaValidator.validate(&instance, &widget_schema()).unwrap_err();
        assert_eq!(err.to_string(), "\"name\" is a required property");
    }

    #[test]
    fn test_invalid_schema_is_reported_separately() {
        let err = BasicSchemaValidator
            .validate(&json!(1), &json!({"type": "widget"}))
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidSchema(_)));
    }

    #[test]
    fn test_registry_maps_errors() {
        let mut schemas = EntitySchemas::new();
        schemas.register("com.acme.widget", widget_schema());
        let bad = json!({"type": "com.acme.widget", "version": "2.0", "name": "gear"});
        let err = schemas.check("obj1", "com.acme.widget", &bad).unwrap_err();
        assert_eq!(err.violation(), Some(crate::error::Violation::Entity));
        assert!(schemas.check("obj2", "com.other", &bad).is_ok());

        schemas.register("com.broken", json!("nope"));
        let err = schemas.check("obj3", "com.broken", &bad).unwrap_err();
        assert!(matches!(err, MessageMLError::Processing(_)));
    }
}

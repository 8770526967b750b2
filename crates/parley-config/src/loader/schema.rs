//! Schema validation for parley JSON5 configuration.
//!
//! serde ignores unknown keys and reports type errors without a path, so
//! each layer is checked here first to give errors like
//! `cwd(/repo/parley.json5):memory.capacity: expected integer`.

use crate::ConfigError;
use serde_json::{Map, Value};

/// Validate a single config layer against the schema.
pub(super) fn validate_layer_schema(value: &Value, layer: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, "")?;
    ensure_allowed_keys(map, &["$schema", "memory", "logging", "chat"], layer, "")?;

    if let Some(value) = map.get("$schema") {
        expect_string(value, layer, "$schema")?;
    }
    if let Some(value) = map.get("memory") {
        validate_memory(value, layer, "memory")?;
    }
    if let Some(value) = map.get("logging") {
        validate_logging(value, layer, "logging")?;
    }
    if let Some(value) = map.get("chat") {
        validate_chat(value, layer, "chat")?;
    }
    Ok(())
}

/// Validate the "memory" block.
fn validate_memory(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["backend", "capacity", "path"], layer, path)?;

    if let Some(value) = map.get("backend") {
        let backend_path = join_path(path, "backend");
        let Some(backend) = value.as_str() else {
            return Err(invalid_field(layer, &backend_path, "expected string"));
        };
        if !matches!(backend, "transient" | "file") {
            return Err(invalid_field(
                layer,
                &backend_path,
                "expected \"transient\" or \"file\"",
            ));
        }
    }
    if let Some(value) = map.get("capacity") {
        expect_u64(value, layer, &join_path(path, "capacity"))?;
    }
    if let Some(value) = map.get("path") {
        expect_string(value, layer, &join_path(path, "path"))?;
    }
    Ok(())
}

/// Validate the "logging" block.
fn validate_logging(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(
        map,
        &["max_response_chars", "truncation_marker"],
        layer,
        path,
    )?;

    if let Some(value) = map.get("max_response_chars") {
        expect_u64(value, layer, &join_path(path, "max_response_chars"))?;
    }
    if let Some(value) = map.get("truncation_marker") {
        expect_string(value, layer, &join_path(path, "truncation_marker"))?;
    }
    Ok(())
}

/// Validate the "chat" block.
fn validate_chat(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(
        map,
        &["default_system", "default_conversation_id"],
        layer,
        path,
    )?;

    if let Some(value) = map.get("default_system") {
        if !value.is_null() {
            expect_string(value, layer, &join_path(path, "default_system"))?;
        }
    }
    if let Some(value) = map.get("default_conversation_id") {
        expect_string(value, layer, &join_path(path, "default_conversation_id"))?;
    }
    Ok(())
}

fn expect_object<'a>(
    value: &'a Value,
    layer: &str,
    path: &str,
) -> Result<&'a Map<String, Value>, ConfigError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(invalid_field(layer, path, "expected object")),
    }
}

fn expect_string(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_string() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected string"))
    }
}

/// Non-negative integers only; capacities and lengths cannot be negative.
fn expect_u64(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_u64() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected non-negative integer"))
    }
}

fn ensure_allowed_keys(
    map: &Map<String, Value>,
    allowed: &[&str],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    for key in map.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(invalid_field(layer, &join_path(path, key), "unknown key"));
        }
    }
    Ok(())
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn invalid_field(layer: &str, path: &str, message: &str) -> ConfigError {
    let normalized_path = if path.is_empty() { "root" } else { path };
    ConfigError::InvalidField {
        path: format!("{layer}:{normalized_path}"),
        message: message.to_string(),
    }
}

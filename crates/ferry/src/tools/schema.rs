use serde_json::{Map, Value};

use crate::errors::{AgentError, AgentResult};

/// Check tool arguments against the subset of JSON Schema that tool specs use:
/// an object with `properties`, optional `required`, and primitive `type`s
/// (arrays may declare `items.type`).
pub fn validate_arguments(schema: &Value, arguments: &Value) -> AgentResult<()> {
    let arguments = arguments.as_object().ok_or_else(|| {
        AgentError::InvalidArguments(format!(
            "expected a JSON object, got {}",
            type_name(arguments)
        ))
    })?;

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for field in required.iter().filter_map(Value::as_str) {
            if !arguments.contains_key(field) {
                return Err(AgentError::InvalidArguments(format!(
                    "missing required field '{}'",
                    field
                )));
            }
        }
    }

    let empty = Map::new();
    let properties = schema
        .get("properties")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    for (field, value) in arguments {
        let Some(property) = properties.get(field) else {
            continue;
        };
        check_type(field, property, value)?;
    }

    Ok(())
}

fn check_type(field: &str, property: &Value, value: &Value) -> AgentResult<()> {
    let Some(expected) = property.get("type").and_then(Value::as_str) else {
        return Ok(());
    };

    if !matches_type(expected, value) {
        return Err(AgentError::InvalidArguments(format!(
            "field '{}' must be of type {}, got {}",
            field,
            expected,
            type_name(value)
        )));
    }

    if let (Some(items), Some(elements)) = (property.get("items"), value.as_array()) {
        for (index, element) in elements.iter().enumerate() {
            check_type(&format!("{}[{}]", field, index), items, element)?;
        }
    }

    Ok(())
}

fn matches_type(expected: &str, value: &Value) -> bool {
    match expected {
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        "null" => value.is_null(),
        // Unknown keywords are not ours to enforce
        _ => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

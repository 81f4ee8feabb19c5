//! Structural argument validation with elicitation semantics.
//!
//! Instead of failing a `tools/call` whose arguments miss required fields or
//! carry the wrong types, the server reports exactly which fields need fixing
//! so a conversational caller can re-issue a corrected call. Validation is
//! stateless: the same arguments always produce the same findings.

use serde_json::Value;

/// Validate `arguments` against a tool's declared input schema.
///
/// Returns the offending field names, deduplicated, in schema declaration
/// order: the `required` list first, then `properties`. An empty result means
/// the handler may run. Fields not declared in the schema are ignored — the
/// schema is a floor, not a ceiling.
pub fn validate_arguments(schema: &Value, arguments: &Value) -> Vec<String> {
    let mut findings = Vec::new();

    let Some(args) = arguments.as_object() else {
        // Non-object arguments: every required field is absent.
        for name in required_fields(schema) {
            push_unique(&mut findings, name);
        }
        return findings;
    };

    for name in required_fields(schema) {
        match args.get(name) {
            None | Some(Value::Null) => push_unique(&mut findings, name),
            Some(_) => {}
        }
    }

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for (name, property) in properties {
            let Some(value) = args.get(name) else {
                continue;
            };
            if value.is_null() {
                // Absence semantics; already recorded above if required.
                continue;
            }
            if !type_matches(property, value) {
                push_unique(&mut findings, name);
                continue;
            }
            if let (Some(items), Some(elements)) = (property.get("items"), value.as_array()) {
                if items.get("type").and_then(Value::as_str) == Some("object") {
                    for element in elements {
                        validate_item(items, element, &mut findings);
                    }
                }
            }
        }
    }

    findings
}

/// Validate one element of an array-of-objects property against the item
/// schema. Offending nested field names surface in the same findings list.
fn validate_item(item_schema: &Value, element: &Value, findings: &mut Vec<String>) {
    let Some(obj) = element.as_object() else {
        for name in required_fields(item_schema) {
            push_unique(findings, name);
        }
        return;
    };

    for name in required_fields(item_schema) {
        match obj.get(name) {
            None | Some(Value::Null) => push_unique(findings, name),
            Some(_) => {}
        }
    }

    if let Some(properties) = item_schema.get("properties").and_then(Value::as_object) {
        for (name, property) in properties {
            if let Some(value) = obj.get(name) {
                if !value.is_null() && !type_matches(property, value) {
                    push_unique(findings, name);
                }
            }
        }
    }
}

fn required_fields(schema: &Value) -> impl Iterator<Item = &str> {
    schema
        .get("required")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
}

fn type_matches(property: &Value, value: &Value) -> bool {
    let Some(declared) = property.get("type").and_then(Value::as_str) else {
        return true;
    };
    match declared {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        _ => true,
    }
}

fn push_unique(findings: &mut Vec<String>, name: &str) {
    if !findings.iter().any(|f| f == name) {
        findings.push(name.to_string());
    }
}

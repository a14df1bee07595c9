//! Intrinsic values and their rendering inside stringified JSON
//!
//! CloudFormation cannot resolve intrinsics that appear inside a plain string, so any
//! JSON document that is stored as a string property (dashboard bodies, event rule
//! inputs) is rendered as an `Fn::Join` of literal pieces and intrinsic values.

use crate::error::Result;
use serde_json::{json, Map, Value};

const TOKEN_PREFIX: &str = "${Token[TOKEN.";
const TOKEN_SUFFIX: &str = "]}";

/// `{"Ref": logical_id}`
pub fn reference(logical_id: &str) -> Value {
    json!({ "Ref": logical_id })
}

/// `{"Fn::GetAtt": [logical_id, attribute]}`
pub fn get_att(logical_id: &str, attribute: &str) -> Value {
    json!({ "Fn::GetAtt": [logical_id, attribute] })
}

/// The region of the deploying stack
pub fn region() -> Value {
    reference("AWS::Region")
}

/// Returns true if the value is a single-key intrinsic object (`Ref` or `Fn::*`)
pub fn is_intrinsic(value: &Value) -> bool {
    match value {
        Value::Object(map) if map.len() == 1 => map
            .keys()
            .next()
            .map(|k| k == "Ref" || k.starts_with("Fn::"))
            .unwrap_or(false),
        _ => false,
    }
}

/// Serializes a JSON document to a string property.
///
/// Returns a plain string when the document contains no intrinsics, otherwise an
/// `Fn::Join` whose pieces splice the intrinsics back into the serialized text.
pub fn stringify(value: &Value) -> Result<Value> {
    let mut tokens = Vec::new();
    let replaced = replace_intrinsics(value, &mut tokens);
    let text = serde_json::to_string(&replaced)?;

    if tokens.is_empty() {
        return Ok(Value::String(text));
    }

    let mut parts: Vec<Value> = Vec::new();
    let mut literal = String::new();
    let mut rest = text.as_str();

    while let Some(start) = rest.find(TOKEN_PREFIX) {
        let after = &rest[start + TOKEN_PREFIX.len()..];
        let parsed = after.find(TOKEN_SUFFIX).and_then(|end| {
            after[..end]
                .parse::<usize>()
                .ok()
                .and_then(|idx| tokens.get(idx))
                .map(|token| (end, token))
        });

        match parsed {
            Some((end, token)) => {
                literal.push_str(&rest[..start]);
                if !literal.is_empty() {
                    parts.push(Value::String(std::mem::take(&mut literal)));
                }
                parts.push(token.clone());
                rest = &after[end + TOKEN_SUFFIX.len()..];
            }
            None => {
                literal.push_str(&rest[..start + TOKEN_PREFIX.len()]);
                rest = after;
            }
        }
    }
    literal.push_str(rest);
    if !literal.is_empty() {
        parts.push(Value::String(literal));
    }

    Ok(json!({ "Fn::Join": ["", parts] }))
}

fn replace_intrinsics(value: &Value, tokens: &mut Vec<Value>) -> Value {
    if is_intrinsic(value) {
        let placeholder = format!("{}{}{}", TOKEN_PREFIX, tokens.len(), TOKEN_SUFFIX);
        tokens.push(value.clone());
        return Value::String(placeholder);
    }

    match value {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| replace_intrinsics(item, tokens))
                .collect(),
        ),
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, item) in map {
                out.insert(key.clone(), replace_intrinsics(item, tokens));
            }
            Value::Object(out)
        }
        other => other.clone(),
    }
}

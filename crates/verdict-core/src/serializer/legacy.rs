//! Reader for rule trees written by the first-generation rule service.
//!
//! That format stored every node as `{"type", "value", "left", "right"}`:
//!
//! ```text
//! {"type": "operator", "value": "AND", "left": {..}, "right": {..}}
//! {"type": "operand",  "value": "age > 30"}
//! {"type": "function_call", "func_name": "f", "args": [..]}
//! ```
//!
//! Operands are `"<attribute> <op> <literal>"` split on whitespace; the literal
//! is an integer when it parses as one and a string otherwise. Function-call
//! records keep their name and arguments only if the writer included them.

use super::{as_object, check_level, field, str_field};
use crate::ast::{is_identifier, ComparisonOp, LogicalOp, Node};
use crate::error::{CoreError, Result};
use crate::types::Scalar;
use serde_json::Value as Json;

/// Decode a legacy rule tree
pub fn from_legacy(json: &Json) -> Result<Node> {
    decode(json, "$", 1)
}

fn decode(json: &Json, path: &str, level: usize) -> Result<Node> {
    check_level(level, path)?;
    let object = as_object(json, path)?;

    match str_field(object, "type", path)? {
        "operator" => {
            let name = str_field(object, "value", path)?;
            let op = LogicalOp::from_name(name).ok_or_else(|| {
                CoreError::persist(path, format!("unknown boolean operator '{}'", name))
            })?;
            let left = decode(field(object, "left", path)?, &format!("{}.left", path), level + 1)?;
            let right = decode(
                field(object, "right", path)?,
                &format!("{}.right", path),
                level + 1,
            )?;
            Ok(Node::operator(op, left, right))
        }
        "operand" => decode_operand(str_field(object, "value", path)?, path),
        "function_call" => {
            let name = match object.get("func_name") {
                Some(Json::String(name)) if !name.is_empty() => name,
                _ => {
                    return Err(CoreError::LostFunctionData {
                        path: path.to_string(),
                    })
                }
            };
            let args = match object.get("args") {
                Some(Json::Array(args)) => args,
                _ => {
                    return Err(CoreError::LostFunctionData {
                        path: path.to_string(),
                    })
                }
            };
            if !is_identifier(name) {
                return Err(CoreError::persist(
                    path,
                    format!("'{}' is not a valid function name", name),
                ));
            }
            let args = args
                .iter()
                .enumerate()
                .map(|(i, arg)| decode(arg, &format!("{}.args[{}]", path, i), level + 1))
                .collect::<Result<Vec<_>>>()?;
            log::debug!("Recovered legacy function call '{}' at {}", name, path);
            Ok(Node::function_call(name.as_str(), args))
        }
        other => Err(CoreError::persist(
            path,
            format!("unknown legacy node type '{}'", other),
        )),
    }
}

fn decode_operand(text: &str, path: &str) -> Result<Node> {
    let parts: Vec<&str> = text.split_whitespace().collect();
    let [attribute, symbol, literal] = parts.as_slice() else {
        return Err(CoreError::persist(
            path,
            format!("operand '{}' is not '<attribute> <op> <literal>'", text),
        ));
    };

    if !is_identifier(attribute) {
        return Err(CoreError::persist(
            path,
            format!("'{}' is not a valid attribute", attribute),
        ));
    }
    let operator = ComparisonOp::from_symbol(symbol).ok_or_else(|| {
        CoreError::persist(path, format!("unknown comparison operator '{}'", symbol))
    })?;
    let literal = match literal.parse::<i64>() {
        Ok(n) => Scalar::Int(n),
        Err(_) => Scalar::String(literal.to_string()),
    };

    Ok(Node::comparison(*attribute, operator, literal))
}

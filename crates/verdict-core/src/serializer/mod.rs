//! Persisted rule trees
//!
//! Converts a [`Node`] to and from a nested, order-preserving JSON mapping that
//! storage backends keep as text. Every field of every variant is written, so
//! `from_persisted(&to_persisted(n)) == n` for any tree:
//!
//! ```text
//! {"type": "operator",      "op": "AND", "left": {..}, "right": {..}}
//! {"type": "comparison",    "attribute": "age", "operator": ">", "literal": 30}
//! {"type": "function_call", "name": "is_senior", "args": [{..}, ..]}
//! ```
//!
//! Decoding rejects trees deeper than [`MAX_TREE_DEPTH`] and names that are
//! not identifiers, so a decoded tree can always be rendered, re-encoded and
//! evaluated.

mod legacy;

pub use legacy::from_legacy;

use crate::ast::{is_identifier, ComparisonOp, LogicalOp, Node, MAX_TREE_DEPTH};
use crate::error::{CoreError, Result};
use crate::types::Scalar;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as Json};

const TYPE_OPERATOR: &str = "operator";
const TYPE_COMPARISON: &str = "comparison";
const TYPE_FUNCTION_CALL: &str = "function_call";

/// Deepest JSON nesting [`read_json`] accepts: two levels per call node
/// (object and `args` array) plus room for an enclosing document.
pub const MAX_JSON_NESTING: usize = 2 * MAX_TREE_DEPTH + 8;

/// Storage-ready encoding of a rule tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersistedTree(Json);

impl PersistedTree {
    /// Wrap an already decoded JSON document
    pub fn from_json(json: Json) -> Self {
        PersistedTree(json)
    }

    pub fn as_json(&self) -> &Json {
        &self.0
    }

    pub fn into_json(self) -> Json {
        self.0
    }

    /// Compact JSON text of the tree
    pub fn to_json_string(&self) -> String {
        self.0.to_string()
    }

    /// Read a tree from JSON text without validating its shape
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(PersistedTree(read_json(text)?))
    }
}

/// Deserialize JSON text that may hold a persisted tree.
///
/// serde_json stops at 128 nested levels by default, which is shallower
/// than a long `or` chain. The text is scanned first and rejected above
/// [`MAX_JSON_NESTING`], then read with the recursion limit lifted.
pub fn read_json<T: DeserializeOwned>(text: &str) -> serde_json::Result<T> {
    let nesting = json_nesting(text);
    if nesting > MAX_JSON_NESTING {
        return Err(serde_json::Error::custom(format!(
            "document nests {} levels deep, limit is {}",
            nesting, MAX_JSON_NESTING
        )));
    }

    let mut deserializer = serde_json::Deserializer::from_str(text);
    deserializer.disable_recursion_limit();
    let value = T::deserialize(&mut deserializer)?;
    deserializer.end()?;
    Ok(value)
}

/// Deepest bracket nesting in `text`, ignoring brackets inside strings
fn json_nesting(text: &str) -> usize {
    let mut depth = 0usize;
    let mut deepest = 0;
    let mut in_string = false;
    let mut escaped = false;

    for byte in text.bytes() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    deepest
}

/// Encode a rule tree
pub fn to_persisted(node: &Node) -> PersistedTree {
    PersistedTree(encode(node))
}

/// Decode a rule tree, failing on the first missing or malformed field
pub fn from_persisted(tree: &PersistedTree) -> Result<Node> {
    decode(&tree.0, "$", 1)
}

/// Encode a rule tree straight to JSON text
pub fn to_json_string(node: &Node) -> String {
    to_persisted(node).to_json_string()
}

/// Decode a rule tree straight from JSON text
pub fn from_json_str(text: &str) -> Result<Node> {
    from_persisted(&PersistedTree::from_json_str(text)?)
}

fn encode(node: &Node) -> Json {
    match node {
        Node::Operator { op, left, right } => json!({
            "type": TYPE_OPERATOR,
            "op": op.as_str(),
            "left": encode(left),
            "right": encode(right),
        }),
        Node::Comparison {
            attribute,
            operator,
            literal,
        } => json!({
            "type": TYPE_COMPARISON,
            "attribute": attribute,
            "operator": operator.symbol(),
            "literal": encode_scalar(literal),
        }),
        Node::FunctionCall { name, args } => json!({
            "type": TYPE_FUNCTION_CALL,
            "name": name,
            "args": args.iter().map(encode).collect::<Vec<_>>(),
        }),
    }
}

fn encode_scalar(scalar: &Scalar) -> Json {
    match scalar {
        Scalar::Int(n) => Json::from(*n),
        Scalar::String(s) => Json::from(s.as_str()),
    }
}

fn decode(json: &Json, path: &str, level: usize) -> Result<Node> {
    check_level(level, path)?;
    let object = as_object(json, path)?;

    match str_field(object, "type", path)? {
        TYPE_OPERATOR => {
            let op_name = str_field(object, "op", path)?;
            let op = LogicalOp::from_name(op_name).ok_or_else(|| {
                CoreError::persist(path, format!("unknown boolean operator '{}'", op_name))
            })?;
            let left = decode(field(object, "left", path)?, &format!("{}.left", path), level + 1)?;
            let right = decode(
                field(object, "right", path)?,
                &format!("{}.right", path),
                level + 1,
            )?;
            Ok(Node::operator(op, left, right))
        }
        TYPE_COMPARISON => {
            let attribute = name_field(object, "attribute", path)?;
            let symbol = str_field(object, "operator", path)?;
            let operator = ComparisonOp::from_symbol(symbol).ok_or_else(|| {
                CoreError::persist(path, format!("unknown comparison operator '{}'", symbol))
            })?;
            let literal = decode_scalar(field(object, "literal", path)?, path)?;
            Ok(Node::comparison(attribute, operator, literal))
        }
        TYPE_FUNCTION_CALL => {
            let name = name_field(object, "name", path)?;
            let args = field(object, "args", path)?
                .as_array()
                .ok_or_else(|| CoreError::persist(path, "'args' must be an array"))?
                .iter()
                .enumerate()
                .map(|(i, arg)| decode(arg, &format!("{}.args[{}]", path, i), level + 1))
                .collect::<Result<Vec<_>>>()?;
            Ok(Node::function_call(name, args))
        }
        other => Err(CoreError::persist(
            path,
            format!("unknown node type '{}'", other),
        )),
    }
}

fn decode_scalar(json: &Json, path: &str) -> Result<Scalar> {
    match json {
        Json::String(s) => Ok(Scalar::String(s.clone())),
        Json::Number(n) => n
            .as_i64()
            .map(Scalar::Int)
            .ok_or_else(|| CoreError::persist(path, format!("literal {} is not an integer", n))),
        other => Err(CoreError::persist(
            path,
            format!("literal must be an integer or string, got {}", other),
        )),
    }
}

pub(crate) fn check_level(level: usize, path: &str) -> Result<()> {
    if level > MAX_TREE_DEPTH {
        return Err(CoreError::persist(
            path,
            format!("tree is nested deeper than {} levels", MAX_TREE_DEPTH),
        ));
    }
    Ok(())
}

/// A string field that must be usable as a name in rule text
pub(crate) fn name_field<'a>(
    object: &'a Map<String, Json>,
    name: &str,
    path: &str,
) -> Result<&'a str> {
    let value = str_field(object, name, path)?;
    if !is_identifier(value) {
        return Err(CoreError::persist(
            path,
            format!("'{}' is not a valid {}", value, name),
        ));
    }
    Ok(value)
}

pub(crate) fn as_object<'a>(json: &'a Json, path: &str) -> Result<&'a Map<String, Json>> {
    json.as_object()
        .ok_or_else(|| CoreError::persist(path, "expected an object"))
}

pub(crate) fn field<'a>(object: &'a Map<String, Json>, name: &str, path: &str) -> Result<&'a Json> {
    match object.get(name) {
        Some(Json::Null) | None => Err(CoreError::persist(
            path,
            format!("missing field '{}'", name),
        )),
        Some(value) => Ok(value),
    }
}

pub(crate) fn str_field<'a>(
    object: &'a Map<String, Json>,
    name: &str,
    path: &str,
) -> Result<&'a str> {
    field(object, name, path)?
        .as_str()
        .ok_or_else(|| CoreError::persist(path, format!("field '{}' must be a string", name)))
}

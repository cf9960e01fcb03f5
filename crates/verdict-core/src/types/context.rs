//! Attribute context: the record a rule is evaluated against

use super::value::Scalar;
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Named attribute values of a single record.
///
/// Supplied fresh per evaluation and read-only while a rule is evaluated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeContext {
    attributes: HashMap<String, Scalar>,
}

impl AttributeContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self {
            attributes: HashMap::new(),
        }
    }

    /// Builder method to add an attribute
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace an attribute, returning the previous value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Scalar>) -> Option<Scalar> {
        self.attributes.insert(name.into(), value.into())
    }

    /// Look up an attribute
    pub fn get(&self, name: &str) -> Option<&Scalar> {
        self.attributes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Iterate over attribute names and values (unordered)
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Build a context from a JSON object.
    ///
    /// Only integer and string members are accepted; anything else is rejected
    /// with the offending attribute name.
    pub fn from_json(json: &serde_json::Value) -> Result<Self> {
        let object = json.as_object().ok_or_else(|| CoreError::InvalidAttribute {
            name: String::new(),
            message: "attribute context must be a JSON object".to_string(),
        })?;

        let mut context = Self::new();
        for (name, value) in object {
            let scalar = match value {
                serde_json::Value::String(s) => Scalar::String(s.clone()),
                serde_json::Value::Number(n) => match n.as_i64() {
                    Some(i) => Scalar::Int(i),
                    None => {
                        return Err(CoreError::InvalidAttribute {
                            name: name.clone(),
                            message: format!("{} is not a 64-bit integer", n),
                        })
                    }
                },
                other => {
                    return Err(CoreError::InvalidAttribute {
                        name: name.clone(),
                        message: format!("unsupported value {}", other),
                    })
                }
            };
            context.insert(name.clone(), scalar);
        }
        Ok(context)
    }

    /// Convert the context into a JSON object
    pub fn to_json(&self) -> serde_json::Value {
        let mut names: Vec<&String> = self.attributes.keys().collect();
        names.sort();

        let mut object = serde_json::Map::new();
        for name in names {
            let value = match &self.attributes[name] {
                Scalar::Int(n) => serde_json::Value::from(*n),
                Scalar::String(s) => serde_json::Value::from(s.as_str()),
            };
            object.insert(name.clone(), value);
        }
        serde_json::Value::Object(object)
    }
}

impl<K: Into<String>, V: Into<Scalar>> FromIterator<(K, V)> for AttributeContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut context = Self::new();
        for (name, value) in iter {
            context.insert(name, value);
        }
        context
    }
}

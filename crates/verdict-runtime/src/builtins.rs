//! Builtin functions
//!
//! A fixed catalog of host-approved functions. Configuration binds them to
//! registry names; rule authors never supply function bodies.

use crate::registry::{FunctionResult, RuleFunction};
use serde::{Deserialize, Serialize};
use std::fmt;
use verdict_core::Value;

/// Catalog of builtin functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Builtin {
    /// True when every argument is truthy
    All,
    /// True when some argument is truthy
    Any,
    /// True when no argument is truthy
    #[serde(rename = "none")]
    NoneOf,
    /// Number of truthy arguments
    Count,
    /// Negation of its single argument
    Not,
}

impl Builtin {
    /// Every builtin, in catalog order
    pub const ALL: [Builtin; 5] = [
        Builtin::All,
        Builtin::Any,
        Builtin::NoneOf,
        Builtin::Count,
        Builtin::Not,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::All => "all",
            Builtin::Any => "any",
            Builtin::NoneOf => "none",
            Builtin::Count => "count",
            Builtin::Not => "not",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl RuleFunction for Builtin {
    fn call(&self, args: &[Value]) -> FunctionResult {
        let truthy = args.iter().filter(|v| v.is_truthy()).count();
        match self {
            Builtin::All => Ok(Value::Bool(truthy == args.len())),
            Builtin::Any => Ok(Value::Bool(truthy > 0)),
            Builtin::NoneOf => Ok(Value::Bool(truthy == 0)),
            Builtin::Count => Ok(Value::Int(i64::try_from(truthy)?)),
            Builtin::Not => match args {
                [value] => Ok(Value::Bool(!value.is_truthy())),
                _ => Err(format!("expects exactly 1 argument, got {}", args.len()).into()),
            },
        }
    }
}

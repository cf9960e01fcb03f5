//! Function registry
//!
//! Maps function names to host-supplied executables. The map itself is
//! immutable once published: readers take an `Arc` snapshot, writers build a
//! new map and swap it in. A concurrent evaluation therefore sees the registry
//! either entirely before or entirely after any `define`.

use crate::error::{EvaluationError, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use verdict_core::Value;

/// Error returned by a registered function
pub type FunctionError = Box<dyn std::error::Error + Send + Sync>;

/// Result returned by a registered function
pub type FunctionResult = std::result::Result<Value, FunctionError>;

/// An executable callable from a rule
pub trait RuleFunction: Send + Sync {
    /// Invoke the function with already evaluated arguments, in call order
    fn call(&self, args: &[Value]) -> FunctionResult;
}

impl<F> RuleFunction for F
where
    F: Fn(&[Value]) -> FunctionResult + Send + Sync,
{
    fn call(&self, args: &[Value]) -> FunctionResult {
        self(args)
    }
}

type FunctionMap = HashMap<String, Arc<dyn RuleFunction>>;

/// Registry of functions that rules may call
pub struct FunctionRegistry {
    functions: RwLock<Arc<FunctionMap>>,
}

impl FunctionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            functions: RwLock::new(Arc::new(HashMap::new())),
        }
    }

    /// Register or replace a closure under `name`
    pub fn define<F>(&self, name: impl Into<String>, function: F) -> Result<()>
    where
        F: Fn(&[Value]) -> FunctionResult + Send + Sync + 'static,
    {
        self.register(name, Arc::new(function))
    }

    /// Register or replace an executable under `name`
    pub fn register(&self, name: impl Into<String>, function: Arc<dyn RuleFunction>) -> Result<()> {
        let name = name.into();
        if !is_valid_function_name(&name) {
            return Err(EvaluationError::InvalidFunctionName(name));
        }

        let mut guard = self.functions.write().unwrap_or_else(PoisonError::into_inner);
        let mut next: FunctionMap = (**guard).clone();
        let replaced = next.insert(name.clone(), function).is_some();
        *guard = Arc::new(next);

        if replaced {
            tracing::debug!("Redefined function '{}'", name);
        } else {
            tracing::debug!("Defined function '{}'", name);
        }
        Ok(())
    }

    /// Look up a function by name
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn RuleFunction>> {
        self.snapshot().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.snapshot().contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.snapshot().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    fn snapshot(&self) -> Arc<FunctionMap> {
        self.functions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.names())
            .finish()
    }
}

/// A name rules can call: an identifier that is not a keyword
pub fn is_valid_function_name(name: &str) -> bool {
    verdict_core::is_identifier(name)
}

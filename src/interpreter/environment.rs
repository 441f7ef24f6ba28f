// File: src/interpreter/environment.rs
//
// Binding store for the tinypy interpreter. One Environment holds the global
// tier; each active call owns another one on the interpreter's frame stack.
// There is no chaining between environments: lookups fall back from the top
// frame to the globals in the interpreter, never frame to frame.

use super::value::Value;
use crate::ast::FunctionDecl;
use std::collections::HashMap;
use std::rc::Rc;

/// Variable and function bindings for a single tier.
///
/// Defining a name that is already bound simply replaces the old binding.
///
/// # Examples
///
/// ```ignore
/// let mut env = Environment::new();
/// env.define("x".to_string(), Value::Int(10));
/// env.define("x".to_string(), Value::Int(20));
/// assert_eq!(env.get("x"), Some(&Value::Int(20)));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    functions: HashMap<String, Rc<FunctionDecl>>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Bind a variable, overwriting any previous binding of the same name
    pub fn define(&mut self, name: String, value: Value) {
        self.values.insert(name, value);
    }

    pub fn get_function(&self, name: &str) -> Option<&Rc<FunctionDecl>> {
        self.functions.get(name)
    }

    /// Bind a function, overwriting any previous function of the same name
    pub fn define_function(&mut self, decl: Rc<FunctionDecl>) {
        self.functions.insert(decl.name().to_string(), decl);
    }

    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }
}

// File: src/interpreter/control_flow.rs
//
// Outcome of executing a statement. A `return` does not unwind the Rust
// stack; it is threaded back through statement execution as
// `ControlFlow::Return` until the nearest enclosing call consumes it.

use super::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ControlFlow {
    /// Statement finished, continue with the next one
    Normal,
    /// A `return` ran; stop executing statements up to the enclosing call
    Return(Value),
}

// File: src/lib.rs
//
// Library interface for the tinypy interpreter.
// Exposes the pipeline stages for integration testing and embedding.

pub mod ast;
pub mod errors;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod stack;

use errors::ScriptError;
use interpreter::Interpreter;

/// Tokenizes, parses and runs `source` on the given interpreter.
///
/// Nothing executes unless the whole source lexes and parses.
pub fn run_source(source: &str, interpreter: &mut Interpreter) -> Result<(), ScriptError> {
    let tokens = lexer::tokenize(source)?;
    let program = parser::Parser::new(tokens).parse()?;
    interpreter.run(&program)
}

// File: src/interpreter/mod.rs
//
// Tree-walking interpreter for tinypy.
// Executes programs by traversing the Abstract Syntax Tree (AST).
//
// The interpreter owns all runtime state for one run: the global environment
// (variables and the function table) and a stack of call frames holding
// function-local variables. Lookups check the top frame first and then the
// globals; there is no chaining between frames. It supports:
// - Variable binding (frame-local inside calls, global otherwise)
// - Function declaration and calls with strict arity checking
// - if/else on boolean conditions
// - Integer arithmetic, comparisons, and eager boolean logic
// - print to stdout or to a captured buffer
//
// Operands of binary and logical operators are evaluated right first, then
// left, and `and` / `or` never short-circuit.
//
// Recursion in scripts recurses natively here, so `exec` and `evaluate` grow
// the stack on demand and calls nest at most MAX_CALL_DEPTH deep.

mod control_flow;
mod environment;
mod value;

pub use environment::Environment;
pub use value::Value;

use control_flow::ControlFlow;

use crate::ast::{Expr, FunctionDecl, Stmt};
use crate::errors::{find_closest_match, ScriptError};
use crate::lexer::{Token, TokenKind};
use crate::stack::ensure_sufficient_stack;
use std::io::{self, Write};
use std::rc::Rc;
use std::sync::{Arc, Mutex, PoisonError};

/// Deepest allowed nesting of active function calls.
pub const MAX_CALL_DEPTH: usize = 10_000;

/// Main interpreter that executes tinypy programs
#[derive(Default)]
pub struct Interpreter {
    globals: Environment,
    frames: Vec<Environment>,
    output: Option<Arc<Mutex<Vec<u8>>>>,
}

impl Interpreter {
    /// Creates a new interpreter with an empty global environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output sink for print statements (used for testing)
    pub fn set_output(&mut self, output: Arc<Mutex<Vec<u8>>>) {
        self.output = Some(output);
    }

    pub fn globals(&self) -> &Environment {
        &self.globals
    }

    /// Number of calls currently in progress.
    pub fn frame_depth(&self) -> usize {
        self.frames.len()
    }

    /// Looks a variable up the same way an identifier expression does: the
    /// active frame first, then the globals.
    pub fn get_variable(&self, name: &str) -> Option<&Value> {
        self.frames
            .last()
            .and_then(|frame| frame.get(name))
            .or_else(|| self.globals.get(name))
    }

    /// Executes a program's top-level statements in order.
    pub fn run(&mut self, stmts: &[Stmt]) -> Result<(), ScriptError> {
        if let ControlFlow::Return(value) = self.exec_block(stmts)? {
            // The parser rejects `return` outside a `def`, so only a hand-built
            // tree gets here. Stop the program without reporting an error.
            tracing::warn!(%value, "return signal reached the top level; halting");
        }
        Ok(())
    }

    fn exec_block(&mut self, stmts: &[Stmt]) -> Result<ControlFlow, ScriptError> {
        for stmt in stmts {
            if let ControlFlow::Return(value) = self.exec(stmt)? {
                return Ok(ControlFlow::Return(value));
            }
        }
        Ok(ControlFlow::Normal)
    }

    fn exec(&mut self, stmt: &Stmt) -> Result<ControlFlow, ScriptError> {
        ensure_sufficient_stack(|| self.exec_stmt(stmt))
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<ControlFlow, ScriptError> {
        match stmt {
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::None,
                };
                let scope = self.frames.last_mut().unwrap_or(&mut self.globals);
                scope.define(name.lexeme.clone(), value);
            }
            Stmt::Block(stmts) => return self.exec_block(stmts),
            Stmt::ExprStmt(expr) => {
                self.evaluate(expr)?;
            }
            Stmt::FuncDef(decl) => self.globals.define_function(Rc::clone(decl)),
            Stmt::If { condition, then_branch, else_branch } => {
                match self.evaluate(condition)? {
                    Value::Bool(true) => return self.exec(then_branch),
                    Value::Bool(false) => {
                        if let Some(else_branch) = else_branch {
                            return self.exec(else_branch);
                        }
                    }
                    other => {
                        return Err(ScriptError::type_error(
                            format!("if condition must be bool, not '{}'", other.type_name()),
                            condition.location(),
                        ));
                    }
                }
            }
            Stmt::Print(args) => {
                let mut parts = Vec::with_capacity(args.len());
                for arg in args {
                    parts.push(self.evaluate(arg)?.to_string());
                }
                self.write_output(&parts.join(" "));
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::None,
                };
                return Ok(ControlFlow::Return(value));
            }
        }
        Ok(ControlFlow::Normal)
    }

    /// Evaluates a single expression to a value
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value, ScriptError> {
        ensure_sufficient_stack(|| self.eval_expr(expr))
    }

    fn eval_expr(&mut self, expr: &Expr) -> Result<Value, ScriptError> {
        match expr {
            Expr::Literal { token, value } => self.literal(token, value),
            Expr::Grouping(inner) => self.evaluate(inner),
            Expr::Unary { op, right } => {
                let operand = self.evaluate(right)?;
                unary_op(op, operand)
            }
            Expr::Binary { left, op, right } => {
                let rhs = self.evaluate(right)?;
                let lhs = self.evaluate(left)?;
                binary_op(op, &lhs, &rhs)
            }
            Expr::Logical { left, op, right } => {
                let rhs = self.evaluate(right)?;
                let lhs = self.evaluate(left)?;
                logical_op(op, &lhs, &rhs)
            }
            Expr::Call { callee, args, .. } => self.call(callee, args),
        }
    }

    fn literal(&self, token: &Token, text: &str) -> Result<Value, ScriptError> {
        match token.kind {
            TokenKind::True => Ok(Value::Bool(true)),
            TokenKind::False => Ok(Value::Bool(false)),
            TokenKind::None => Ok(Value::None),
            TokenKind::Identifier => self.lookup_variable(token),
            TokenKind::Number => text.parse::<i32>().map(Value::Int).map_err(|_| {
                ScriptError::arithmetic_error(
                    format!("integer literal {} does not fit in 32 bits", text),
                    token.location(),
                )
            }),
            TokenKind::String => Ok(Value::str(text)),
            other => Err(ScriptError::type_error(
                format!("{} is not a literal", other),
                token.location(),
            )),
        }
    }

    fn lookup_variable(&self, token: &Token) -> Result<Value, ScriptError> {
        let name = token.lexeme.as_str();
        if let Some(value) = self.get_variable(name) {
            return Ok(value.clone());
        }

        let mut err = ScriptError::undefined_variable(name, token.location());
        if self.globals.get_function(name).is_some() {
            return Err(err.with_help(format!("'{0}' is a function; call it as {0}(...)", name)));
        }
        let frame_names = self.frames.last().into_iter().flat_map(Environment::variable_names);
        if let Some(close) = find_closest_match(name, frame_names.chain(self.globals.variable_names()))
        {
            err = err.with_suggestion(close.to_string());
        }
        Err(err)
    }

    fn call(&mut self, callee: &Token, args: &[Expr]) -> Result<Value, ScriptError> {
        let name = callee.lexeme.as_str();
        let decl = match self.globals.get_function(name) {
            Some(decl) => Rc::clone(decl),
            None => {
                let mut err = ScriptError::undefined_function(name, callee.location());
                if let Some(close) = find_closest_match(name, self.globals.function_names()) {
                    err = err.with_suggestion(close.to_string());
                }
                return Err(err);
            }
        };

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.evaluate(arg)?);
        }

        if values.len() != decl.arity() {
            return Err(ScriptError::arity_mismatch(
                name,
                decl.arity(),
                values.len(),
                callee.location(),
            )
            .with_note(format!("'{}' is declared on line {}", name, decl.name.line)));
        }

        if self.frames.len() >= MAX_CALL_DEPTH {
            return Err(ScriptError::recursion_limit_exceeded(MAX_CALL_DEPTH, callee.location())
                .with_help(format!("check that every path through '{}' reaches a base case", name)));
        }

        self.invoke(&decl, values)
    }

    /// Runs a function body in a fresh frame. The frame is popped on every
    /// exit path, including errors raised inside the body.
    fn invoke(&mut self, decl: &FunctionDecl, args: Vec<Value>) -> Result<Value, ScriptError> {
        let mut frame = Environment::new();
        for (param, arg) in decl.params.iter().zip(args) {
            frame.define(param.lexeme.clone(), arg);
        }

        self.frames.push(frame);
        tracing::debug!(function = decl.name(), depth = self.frames.len(), "call");
        let outcome = self.exec_block(&decl.body);
        self.frames.pop();
        tracing::debug!(function = decl.name(), depth = self.frames.len(), "frame popped");

        match outcome? {
            ControlFlow::Return(value) => Ok(value),
            ControlFlow::Normal => Ok(Value::None),
        }
    }

    /// Helper to write output to either the output buffer or stdout.
    /// A closed stdout (e.g. piped into `head`) drops the line instead of
    /// aborting the run.
    fn write_output(&self, line: &str) {
        let written = if let Some(out) = &self.output {
            let mut buffer = out.lock().unwrap_or_else(PoisonError::into_inner);
            writeln!(buffer, "{}", line)
        } else {
            writeln!(io::stdout().lock(), "{}", line)
        };
        if let Err(err) = written {
            tracing::debug!(%err, "print output dropped");
        }
    }
}

fn operator_symbol(op: &Token) -> &'static str {
    op.kind.symbol().unwrap_or_else(|| op.kind.name())
}

fn unary_op(op: &Token, operand: Value) -> Result<Value, ScriptError> {
    match (op.kind, operand) {
        (TokenKind::Minus, Value::Int(n)) => n
            .checked_neg()
            .map(Value::Int)
            .ok_or_else(|| ScriptError::arithmetic_error("integer overflow", op.location())),
        (TokenKind::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (_, other) => Err(ScriptError::type_error(
            format!("bad operand type for unary {}: '{}'", operator_symbol(op), other.type_name()),
            op.location(),
        )),
    }
}

/// Each operator is one arm with its own operand check; a failed check lands
/// in the final arm and never in a neighbouring operator.
fn binary_op(op: &Token, lhs: &Value, rhs: &Value) -> Result<Value, ScriptError> {
    use TokenKind as T;
    use Value::{Bool, Int};

    let overflow = || ScriptError::arithmetic_error("integer overflow", op.location());

    match (op.kind, lhs, rhs) {
        (T::EqualEqual, Int(a), Int(b)) => Ok(Bool(a == b)),
        (T::EqualEqual, Bool(a), Bool(b)) => Ok(Bool(a == b)),
        (T::BangEqual, Int(a), Int(b)) => Ok(Bool(a != b)),
        (T::BangEqual, Bool(a), Bool(b)) => Ok(Bool(a != b)),
        (T::Greater, Int(a), Int(b)) => Ok(Bool(a > b)),
        (T::Less, Int(a), Int(b)) => Ok(Bool(a < b)),
        (T::GreaterEqual, Int(a), Int(b)) => Ok(Bool(a >= b)),
        (T::LessEqual, Int(a), Int(b)) => Ok(Bool(a <= b)),
        (T::Plus, Int(a), Int(b)) => a.checked_add(*b).map(Int).ok_or_else(overflow),
        (T::Minus, Int(a), Int(b)) => a.checked_sub(*b).map(Int).ok_or_else(overflow),
        (T::Star, Int(a), Int(b)) => a.checked_mul(*b).map(Int).ok_or_else(overflow),
        (T::Slash, Int(_), Int(0)) => {
            Err(ScriptError::arithmetic_error("integer division by zero", op.location()))
        }
        // Rust integer division truncates toward zero
        (T::Slash, Int(a), Int(b)) => a.checked_div(*b).map(Int).ok_or_else(overflow),
        _ => Err(operand_type_error(op, lhs, rhs)),
    }
}

fn logical_op(op: &Token, lhs: &Value, rhs: &Value) -> Result<Value, ScriptError> {
    match (op.kind, lhs, rhs) {
        (TokenKind::And, Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(*a && *b)),
        (TokenKind::Or, Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(*a || *b)),
        _ => Err(operand_type_error(op, lhs, rhs)),
    }
}

fn operand_type_error(op: &Token, lhs: &Value, rhs: &Value) -> ScriptError {
    ScriptError::type_error(
        format!(
            "unsupported operand types for {}: '{}' and '{}'",
            operator_symbol(op),
            lhs.type_name(),
            rhs.type_name()
        ),
        op.location(),
    )
}

// File: src/ast.rs
//
// Abstract Syntax Tree (AST) definitions for tinypy.
// Defines the structure of parsed tinypy programs.
//
// Expressions (Expr) evaluate to a single runtime value, while statements
// (Stmt) perform bindings, printing and control flow. Every node owns its
// children; nodes are built once by the parser and only read afterwards.

use crate::errors::SourceLocation;
use crate::lexer::Token;
use std::rc::Rc;

/// Represents an expression - something that evaluates to a value
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Arithmetic and comparison operators: `+ - * / == != < > <= >=`
    Binary {
        left: Box<Expr>,
        op: Token,
        right: Box<Expr>,
    },
    /// Call of a globally declared function by name
    Call {
        callee: Token,
        paren: Token,
        args: Vec<Expr>,
    },
    Grouping(Box<Expr>),
    /// `True`, `False`, `None`, numbers, strings, and identifier references.
    /// `value` holds the token's lexeme.
    Literal {
        token: Token,
        value: String,
    },
    /// `and` / `or`
    Logical {
        left: Box<Expr>,
        op: Token,
        right: Box<Expr>,
    },
    /// `-` / `not`
    Unary {
        op: Token,
        right: Box<Expr>,
    },
}

impl Expr {
    /// Location of the token that best identifies this expression in
    /// diagnostics: the operator for operator nodes, the callee for calls.
    pub fn location(&self) -> SourceLocation {
        match self {
            Expr::Binary { op, .. } | Expr::Logical { op, .. } | Expr::Unary { op, .. } => {
                op.location()
            }
            Expr::Call { callee, .. } => callee.location(),
            Expr::Grouping(inner) => inner.location(),
            Expr::Literal { token, .. } => token.location(),
        }
    }
}

/// A `def` declaration. Shared by reference between the tree and the
/// interpreter's function table.
#[derive(Debug, PartialEq)]
pub struct FunctionDecl {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
}

impl FunctionDecl {
    pub fn name(&self) -> &str {
        &self.name.lexeme
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// Represents a statement - an action or declaration
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::enum_variant_names)]
pub enum Stmt {
    /// Statements run in sequence; a block never opens a new scope
    Block(Vec<Stmt>),
    ExprStmt(Expr),
    FuncDef(Rc<FunctionDecl>),
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    Print(Vec<Expr>),
    Return {
        keyword: Token,
        value: Option<Expr>,
    },
    /// `name = initializer`
    Var {
        name: Token,
        initializer: Option<Expr>,
    },
}

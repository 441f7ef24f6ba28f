// File: src/parser.rs
//
// Recursive descent parser for tinypy.
// Transforms a sequence of tokens into an Abstract Syntax Tree (AST).
//
// Each grammar rule is one method; operator precedence is encoded by the
// order in which the expression methods call each other, lowest first:
//
//   expression := or_
//   or_        := and_ ("or" and_)*
//   and_       := comparison ("and" comparison)*
//   comparison := term (("==" | "!=" | ">" | "<" | ">=" | "<=") term)*
//   term       := factor (("+" | "-") factor)*
//   factor     := unary (("*" | "/") unary)*
//   unary      := ("-" | "not") unary | call
//   call       := IDENTIFIER "(" arguments ")" | primary
//   primary    := "True" | "False" | "None" | "(" expression ")"
//               | IDENTIFIER | NUMBER | STRING
//
// Blocks are delimited by the INDENT / DEDENT tokens produced by the lexer.
// Any grammar violation aborts the whole parse with a ParseError.
//
// Tree depth is capped at MAX_NESTING: every nested expression, operand of a
// left-folded operator chain, unary operator and block adds one level.

use crate::ast::{Expr, FunctionDecl, Stmt};
use crate::errors::ScriptError;
use crate::lexer::{Token, TokenKind};
use crate::stack::ensure_sufficient_stack;
use std::rc::Rc;

/// Deepest syntax tree the parser will build.
pub const MAX_NESTING: usize = 1000;

const COMPARISON_OPS: &[TokenKind] = &[
    TokenKind::EqualEqual,
    TokenKind::BangEqual,
    TokenKind::Greater,
    TokenKind::Less,
    TokenKind::GreaterEqual,
    TokenKind::LessEqual,
];

/// Parser maintains position in token stream and provides methods to parse statements and expressions
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Number of `def` bodies currently being parsed.
    function_depth: usize,
    /// Current nesting level, see MAX_NESTING.
    depth: usize,
}

impl Parser {
    /// Creates a new parser from a vector of tokens
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::End) {
            let (line, column) = tokens.last().map(|t| (t.line, t.column)).unwrap_or((1, 1));
            tokens.push(Token::new(TokenKind::End, "", line, column));
        }
        Parser { tokens, pos: 0, function_depth: 0, depth: 0 }
    }

    /// Parse the entire token stream into the list of top-level statements
    pub fn parse(&mut self) -> Result<Vec<Stmt>, ScriptError> {
        let mut stmts = Vec::new();
        loop {
            self.skip_newlines();
            if self.check(TokenKind::End) {
                break;
            }
            stmts.push(self.declaration()?);
        }
        tracing::trace!(count = stmts.len(), "parsed top-level statements");
        Ok(stmts)
    }

    fn declaration(&mut self) -> Result<Stmt, ScriptError> {
        if self.match_kind(TokenKind::Def) {
            return self.function_declaration();
        }
        if self.check(TokenKind::Identifier) && self.peek_next().kind == TokenKind::Equal {
            return self.var_declaration();
        }
        self.statement()
    }

    fn function_declaration(&mut self) -> Result<Stmt, ScriptError> {
        let name = self.consume(TokenKind::Identifier, "expected function name after 'def'")?;
        self.consume(TokenKind::LParen, "expected '(' after function name")?;

        let mut params = Vec::new();
        if !self.match_kind(TokenKind::RParen) {
            loop {
                params.push(self.consume(TokenKind::Identifier, "expected parameter name")?);
                if !self.match_kind(TokenKind::Comma) {
                    break;
                }
            }
            self.consume(TokenKind::RParen, "expected ')' after parameters")?;
        }

        self.block_header("function signature")?;
        self.function_depth += 1;
        let body = self.block_body();
        self.function_depth -= 1;

        Ok(Stmt::FuncDef(Rc::new(FunctionDecl { name, params, body: body? })))
    }

    fn var_declaration(&mut self) -> Result<Stmt, ScriptError> {
        let name = self.advance();
        let initializer = if self.match_kind(TokenKind::Equal) {
            Some(self.expression()?)
        } else {
            None
        };
        self.end_of_statement()?;
        Ok(Stmt::Var { name, initializer })
    }

    fn statement(&mut self) -> Result<Stmt, ScriptError> {
        if self.match_kind(TokenKind::If) {
            return self.if_statement();
        }
        if self.match_kind(TokenKind::Print) {
            return self.print_statement();
        }
        if self.match_kind(TokenKind::Return) {
            return self.return_statement();
        }
        self.expression_statement()
    }

    fn if_statement(&mut self) -> Result<Stmt, ScriptError> {
        let condition = self.expression()?;
        self.block_header("if condition")?;
        let then_branch = Box::new(Stmt::Block(self.block_body()?));

        let else_branch = if self.match_kind(TokenKind::Else) {
            self.block_header("'else'")?;
            Some(Box::new(Stmt::Block(self.block_body()?)))
        } else {
            None
        };

        Ok(Stmt::If { condition, then_branch, else_branch })
    }

    fn print_statement(&mut self) -> Result<Stmt, ScriptError> {
        let args = self.arguments()?;
        self.end_of_statement()?;
        Ok(Stmt::Print(args))
    }

    fn return_statement(&mut self) -> Result<Stmt, ScriptError> {
        let keyword = self.previous().clone();
        if self.function_depth == 0 {
            return Err(ScriptError::parse_error("'return' outside function", keyword.location())
                .with_note(self.surroundings()));
        }

        let value = if self.at_statement_end() { None } else { Some(self.expression()?) };
        self.end_of_statement()?;
        Ok(Stmt::Return { keyword, value })
    }

    fn expression_statement(&mut self) -> Result<Stmt, ScriptError> {
        let expr = self.expression()?;
        self.end_of_statement()?;
        Ok(Stmt::ExprStmt(expr))
    }

    /// `":" NEWLINE INDENT`, the opening of every indented block. Blank
    /// lines may sit between the header and the first statement.
    fn block_header(&mut self, after: &str) -> Result<(), ScriptError> {
        self.consume(TokenKind::Colon, &format!("expected ':' after {}", after))?;
        self.consume(TokenKind::Newline, "expected a newline after ':'")?;
        self.skip_newlines();
        self.consume(TokenKind::Indent, "expected an indented block")?;
        Ok(())
    }

    /// Statements up to and including the closing DEDENT, skipping blank
    /// lines around each one. At least one statement is required.
    fn block_body(&mut self) -> Result<Vec<Stmt>, ScriptError> {
        self.nest()?;
        let mut stmts = Vec::new();
        self.skip_newlines();
        while !self.match_kind(TokenKind::Dedent) {
            if self.check(TokenKind::End) {
                return Err(self.error("unexpected end of input inside a block"));
            }
            stmts.push(ensure_sufficient_stack(|| self.declaration())?);
            self.skip_newlines();
        }
        if stmts.is_empty() {
            return Err(self.error("expected at least one statement in block"));
        }
        self.depth -= 1;
        Ok(stmts)
    }

    fn expression(&mut self) -> Result<Expr, ScriptError> {
        self.nest()?;
        let expr = ensure_sufficient_stack(|| self.or_())?;
        self.depth -= 1;
        Ok(expr)
    }

    fn or_(&mut self) -> Result<Expr, ScriptError> {
        let mut expr = self.and_()?;
        let base = self.depth;
        while self.match_kind(TokenKind::Or) {
            self.nest()?;
            let op = self.previous().clone();
            let right = self.and_()?;
            expr = Expr::Logical { left: Box::new(expr), op, right: Box::new(right) };
        }
        self.depth = base;
        Ok(expr)
    }

    fn and_(&mut self) -> Result<Expr, ScriptError> {
        let mut expr = self.comparison()?;
        let base = self.depth;
        while self.match_kind(TokenKind::And) {
            self.nest()?;
            let op = self.previous().clone();
            let right = self.comparison()?;
            expr = Expr::Logical { left: Box::new(expr), op, right: Box::new(right) };
        }
        self.depth = base;
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr, ScriptError> {
        let mut expr = self.term()?;
        let base = self.depth;
        while self.match_any(COMPARISON_OPS) {
            self.nest()?;
            let op = self.previous().clone();
            let right = self.term()?;
            expr = Expr::Binary { left: Box::new(expr), op, right: Box::new(right) };
        }
        self.depth = base;
        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr, ScriptError> {
        let mut expr = self.factor()?;
        let base = self.depth;
        while self.match_any(&[TokenKind::Plus, TokenKind::Minus]) {
            self.nest()?;
            let op = self.previous().clone();
            let right = self.factor()?;
            expr = Expr::Binary { left: Box::new(expr), op, right: Box::new(right) };
        }
        self.depth = base;
        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr, ScriptError> {
        let mut expr = self.unary()?;
        let base = self.depth;
        while self.match_any(&[TokenKind::Star, TokenKind::Slash]) {
            self.nest()?;
            let op = self.previous().clone();
            let right = self.unary()?;
            expr = Expr::Binary { left: Box::new(expr), op, right: Box::new(right) };
        }
        self.depth = base;
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, ScriptError> {
        if self.match_any(&[TokenKind::Minus, TokenKind::Not]) {
            let op = self.previous().clone();
            self.nest()?;
            let right = self.unary()?;
            self.depth -= 1;
            return Ok(Expr::Unary { op, right: Box::new(right) });
        }
        self.call()
    }

    fn call(&mut self) -> Result<Expr, ScriptError> {
        if self.check(TokenKind::Identifier) && self.peek_next().kind == TokenKind::LParen {
            let callee = self.advance();
            let args = self.arguments()?;
            let paren = self.previous().clone();
            return Ok(Expr::Call { callee, paren, args });
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, ScriptError> {
        if self.match_any(&[TokenKind::True, TokenKind::False, TokenKind::None]) {
            let token = self.previous().clone();
            return Ok(Expr::Literal { token, value: String::new() });
        }
        if self.match_kind(TokenKind::LParen) {
            let inner = self.expression()?;
            self.consume(TokenKind::RParen, "expected ')' after expression")?;
            return Ok(Expr::Grouping(Box::new(inner)));
        }
        if self.match_any(&[TokenKind::Identifier, TokenKind::Number, TokenKind::String]) {
            let token = self.previous().clone();
            let value = token.lexeme.clone();
            return Ok(Expr::Literal { token, value });
        }
        Err(self.error(&format!("expected expression, found {}", self.peek().describe())))
    }

    /// `"(" [expression ("," expression)*] ")"`, shared by calls and `print`.
    fn arguments(&mut self) -> Result<Vec<Expr>, ScriptError> {
        self.consume(TokenKind::LParen, "expected '('")?;
        let mut args = Vec::new();
        while !self.match_kind(TokenKind::RParen) {
            if !args.is_empty() {
                self.consume(TokenKind::Comma, "expected ',' or ')' in argument list")?;
            }
            args.push(self.expression()?);
        }
        Ok(args)
    }

    fn at_statement_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Newline | TokenKind::Dedent | TokenKind::End)
    }

    fn end_of_statement(&mut self) -> Result<(), ScriptError> {
        if self.match_kind(TokenKind::Newline) || self.at_statement_end() {
            return Ok(());
        }
        Err(self.error(&format!("expected end of line, found {}", self.peek().describe())))
    }

    /// Enters one nesting level. The caller leaves it by decrementing
    /// `depth`; an error abandons the whole parse so no unwinding is needed.
    fn nest(&mut self) -> Result<(), ScriptError> {
        if self.depth >= MAX_NESTING {
            return Err(self.error(&format!(
                "too many nested expressions or blocks (limit {})",
                MAX_NESTING
            )));
        }
        self.depth += 1;
        Ok(())
    }

    fn skip_newlines(&mut self) {
        while self.match_kind(TokenKind::Newline) {}
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> Result<Token, ScriptError> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        Err(self.error(&format!("{}, found {}", message, self.peek().describe())))
    }

    fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn match_any(&mut self, kinds: &[TokenKind]) -> bool {
        kinds.iter().any(|&kind| self.match_kind(kind))
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    /// Peek at the current token without consuming it
    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_next(&self) -> &Token {
        &self.tokens[(self.pos + 1).min(self.tokens.len() - 1)]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.pos.saturating_sub(1).min(self.tokens.len() - 1)]
    }

    /// Consume and return the current token, then advance to the next
    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if tok.kind != TokenKind::End {
            self.pos += 1;
        }
        tok
    }

    fn error(&self, message: &str) -> ScriptError {
        ScriptError::parse_error(message, self.peek().location()).with_note(self.surroundings())
    }

    /// The previous, offending and following tokens, for error notes.
    fn surroundings(&self) -> String {
        format!(
            "near {} {} {}",
            self.previous().describe(),
            self.peek().describe(),
            self.peek_next().describe()
        )
    }
}

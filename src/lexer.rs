// File: src/lexer.rs
//
// Lexical analyzer (tokenizer) for tinypy.
// Converts source text into a flat stream of tokens for parsing.
//
// Supports:
// - Keywords: if, else, def, return, not, and, or, True, False, None, print
// - Identifiers and integer literals
// - String literals delimited by double quotes (no escape processing)
// - Operators: + - * / = == != < > <= >=
// - Punctuation: ( ) , :
// - Comments starting with #
// - Offside-rule blocks: leading spaces are turned into INDENT / DEDENT tokens

use crate::errors::{ScriptError, SourceLocation};
use std::fmt;

/// Number of spaces that make up one indentation level.
pub const INDENT_WIDTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,

    // keywords
    If,
    Else,
    Def,
    Return,
    Not,
    And,
    Or,
    True,
    False,
    None,
    Print,

    // operators
    Plus,
    Minus,
    Slash,
    Star,
    Equal,
    EqualEqual,
    Greater,
    Less,
    BangEqual,
    GreaterEqual,
    LessEqual,

    // values
    Number,
    String,
    LParen,
    RParen,

    // layout and punctuation
    Newline,
    Indent,
    Dedent,
    Colon,
    Comma,
    End,
}

impl TokenKind {
    /// Upper-case name used by the token dump and the AST printer.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::If => "IF",
            TokenKind::Else => "ELSE",
            TokenKind::Def => "DEF",
            TokenKind::Return => "RETURN",
            TokenKind::Not => "NOT",
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::True => "TRUE",
            TokenKind::False => "FALSE",
            TokenKind::None => "NONE",
            TokenKind::Print => "PRINT",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Slash => "DIVIDE",
            TokenKind::Star => "MULTIPLY",
            TokenKind::Equal => "EQUAL",
            TokenKind::EqualEqual => "EQUAL_TO",
            TokenKind::Greater => "GREATER_THAN",
            TokenKind::Less => "LESS_THAN",
            TokenKind::BangEqual => "NOT_EQUAL_TO",
            TokenKind::GreaterEqual => "GREATER_THAN_EQUAL_TO",
            TokenKind::LessEqual => "LESS_THAN_EQUAL_TO",
            TokenKind::Number => "NUMBER",
            TokenKind::String => "STRING",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::Newline => "NEWLINE",
            TokenKind::Indent => "INDENT",
            TokenKind::Dedent => "DEDENT",
            TokenKind::Colon => "COLON",
            TokenKind::Comma => "COMMA",
            TokenKind::End => "END",
        }
    }

    /// Source spelling for operators and punctuation, used in error messages.
    pub fn symbol(self) -> Option<&'static str> {
        let s = match self {
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Slash => "/",
            TokenKind::Star => "*",
            TokenKind::Equal => "=",
            TokenKind::EqualEqual => "==",
            TokenKind::Greater => ">",
            TokenKind::Less => "<",
            TokenKind::BangEqual => "!=",
            TokenKind::GreaterEqual => ">=",
            TokenKind::LessEqual => "<=",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Colon => ":",
            TokenKind::Comma => ",",
            TokenKind::Not => "not",
            TokenKind::And => "and",
            TokenKind::Or => "or",
            _ => return None,
        };
        Some(s)
    }

    fn keyword(ident: &str) -> Option<TokenKind> {
        let kind = match ident {
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "def" => TokenKind::Def,
            "return" => TokenKind::Return,
            "not" => TokenKind::Not,
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "True" => TokenKind::True,
            "False" => TokenKind::False,
            "None" => TokenKind::None,
            "print" => TokenKind::Print,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single lexeme. `lexeme` is only populated for identifiers, numbers and
/// strings (strings without their quotes); it is empty for everything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize, column: usize) -> Self {
        Token { kind, lexeme: lexeme.into(), line, column }
    }

    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }

    /// Human readable description for diagnostics: the lexeme if there is
    /// one, the operator spelling, or the kind name.
    pub fn describe(&self) -> String {
        if !self.lexeme.is_empty() {
            return match self.kind {
                TokenKind::String => format!("\"{}\"", self.lexeme),
                _ => format!("'{}'", self.lexeme),
            };
        }
        match self.kind.symbol() {
            Some(sym) => format!("'{}'", sym),
            None => self.kind.name().to_string(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Token: {} Value: {}", self.kind.name(), self.lexeme)
    }
}

/// Tokenizes tinypy source code into a vector of tokens.
///
/// The stream always ends with an `END` token. Before it, an unterminated
/// final line gets a closing `NEWLINE` and every indentation level still open
/// is closed with a `DEDENT`, so INDENT and DEDENT counts always balance.
///
/// # Errors
/// Returns a `LexError` on an unrecognized character, an unterminated string
/// literal, or a line whose indentation is not a multiple of [`INDENT_WIDTH`].
pub fn tokenize(source: &str) -> Result<Vec<Token>, ScriptError> {
    let tokens = Lexer::new(source).run()?;
    tracing::trace!(count = tokens.len(), "tokenized source");
    Ok(tokens)
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
    tokens: Vec<Token>,
    /// Spaces of indentation currently open.
    indent: usize,
    at_line_start: bool,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Lexer {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
            tokens: Vec::new(),
            indent: 0,
            at_line_start: true,
        }
    }

    fn run(mut self) -> Result<Vec<Token>, ScriptError> {
        loop {
            if self.at_line_start {
                self.at_line_start = false;
                self.indentation()?;
            }

            let Some(c) = self.peek() else { break };
            let (line, col) = (self.line, self.col);

            match c {
                '\n' => {
                    self.advance();
                    self.push(TokenKind::Newline, line, col);
                    self.at_line_start = true;
                }
                ' ' | '\t' | '\r' => {
                    self.advance();
                }
                '#' => self.skip_comment(),
                '(' => self.single(TokenKind::LParen),
                ')' => self.single(TokenKind::RParen),
                '+' => self.single(TokenKind::Plus),
                '-' => self.single(TokenKind::Minus),
                '*' => self.single(TokenKind::Star),
                '/' => self.single(TokenKind::Slash),
                ',' => self.single(TokenKind::Comma),
                ':' => self.single(TokenKind::Colon),
                '=' => self.one_or_two(TokenKind::Equal, TokenKind::EqualEqual),
                '<' => self.one_or_two(TokenKind::Less, TokenKind::LessEqual),
                '>' => self.one_or_two(TokenKind::Greater, TokenKind::GreaterEqual),
                '!' => {
                    self.advance();
                    if self.peek() == Some('=') {
                        self.advance();
                        self.push(TokenKind::BangEqual, line, col);
                    } else {
                        return Err(ScriptError::lex_error(
                            "unexpected character '!'",
                            SourceLocation::new(line, col),
                        )
                        .with_help("use 'not' for negation or '!=' for inequality"));
                    }
                }
                '"' => self.string()?,
                c if c.is_ascii_digit() => self.number(),
                c if c.is_alphabetic() => self.identifier(),
                other => {
                    return Err(ScriptError::lex_error(
                        format!("unexpected character '{}'", other),
                        SourceLocation::new(line, col),
                    ));
                }
            }
        }

        if !matches!(self.tokens.last().map(|t| t.kind), None | Some(TokenKind::Newline)) {
            self.push(TokenKind::Newline, self.line, self.col);
        }
        while self.indent > 0 {
            self.push(TokenKind::Dedent, self.line, self.col);
            self.indent -= INDENT_WIDTH;
        }
        self.push(TokenKind::End, self.line, self.col);

        Ok(self.tokens)
    }

    /// Measures the leading spaces of a fresh physical line and emits the
    /// INDENT/DEDENT tokens that move the current level to it. Blank and
    /// comment-only lines leave the level untouched.
    fn indentation(&mut self) -> Result<(), ScriptError> {
        let mut spaces = 0;
        while let Some(c) = self.peek() {
            match c {
                ' ' => spaces += 1,
                '\t' | '\r' => {}
                _ => break,
            }
            self.advance();
        }

        if matches!(self.peek(), None | Some('\n') | Some('#')) {
            return Ok(());
        }

        if spaces % INDENT_WIDTH != 0 {
            return Err(ScriptError::lex_error(
                format!(
                    "indentation of {} spaces is not a multiple of {}",
                    spaces, INDENT_WIDTH
                ),
                SourceLocation::new(self.line, self.col),
            ));
        }

        let (line, col) = (self.line, self.col);
        while self.indent > spaces {
            self.push(TokenKind::Dedent, line, col);
            self.indent -= INDENT_WIDTH;
        }
        while self.indent < spaces {
            self.push(TokenKind::Indent, line, col);
            self.indent += INDENT_WIDTH;
        }
        Ok(())
    }

    fn skip_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn string(&mut self) -> Result<(), ScriptError> {
        let (line, col) = (self.line, self.col);
        self.advance(); // opening quote
        let mut text = String::new();
        loop {
            match self.advance() {
                Some('"') => break,
                Some(c) => text.push(c),
                None => {
                    return Err(ScriptError::lex_error(
                        "unterminated string literal",
                        SourceLocation::new(line, col),
                    ));
                }
            }
        }
        self.tokens.push(Token::new(TokenKind::String, text, line, col));
        Ok(())
    }

    fn number(&mut self) {
        let (line, col) = (self.line, self.col);
        let mut digits = String::new();
        while let Some(c) = self.peek().filter(char::is_ascii_digit) {
            digits.push(c);
            self.advance();
        }
        self.tokens.push(Token::new(TokenKind::Number, digits, line, col));
    }

    fn identifier(&mut self) {
        let (line, col) = (self.line, self.col);
        let mut ident = String::new();
        while let Some(c) = self.peek().filter(|c| c.is_alphanumeric() || *c == '_') {
            ident.push(c);
            self.advance();
        }
        match TokenKind::keyword(&ident) {
            Some(kind) => self.push(kind, line, col),
            None => self.tokens.push(Token::new(TokenKind::Identifier, ident, line, col)),
        }
    }

    fn single(&mut self, kind: TokenKind) {
        let (line, col) = (self.line, self.col);
        self.advance();
        self.push(kind, line, col);
    }

    /// Greedy match for `x` versus `x=`.
    fn one_or_two(&mut self, one: TokenKind, two: TokenKind) {
        let (line, col) = (self.line, self.col);
        self.advance();
        if self.peek() == Some('=') {
            self.advance();
            self.push(two, line, col);
        } else {
            self.push(one, line, col);
        }
    }

    fn push(&mut self, kind: TokenKind, line: usize, column: usize) {
        self.tokens.push(Token::new(kind, String::new(), line, column));
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }
}

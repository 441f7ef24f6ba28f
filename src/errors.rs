// File: src/errors.rs
//
// Error handling and reporting for tinypy.
// Every stage of the pipeline (lexer, parser, interpreter) reports failures
// through the single structured ScriptError type defined here, which carries
// its source location and renders as a colored, rustc-style report.

use colored::Colorize;
use std::fmt;

/// Source location information for tracking where code appears in a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
    pub file: Option<String>,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column, file: None }
    }

    pub fn is_known(&self) -> bool {
        self.line > 0
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(ref file) = self.file {
            write!(f, "{}:{}:{}", file, self.line, self.column)
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

/// The kinds of failure a tinypy run can end with.
///
/// None of them are recoverable from inside the language; every one aborts
/// the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    LexError,
    ParseError,
    NameError,
    TypeError,
    ArityError,
    ArithmeticError,
    RecursionError,
}

impl ErrorKind {
    /// Process exit status the CLI uses for this kind of failure.
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::LexError | ErrorKind::ParseError => 65,
            ErrorKind::NameError
            | ErrorKind::TypeError
            | ErrorKind::ArityError
            | ErrorKind::ArithmeticError
            | ErrorKind::RecursionError => 70,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::LexError => write!(f, "LexError"),
            ErrorKind::ParseError => write!(f, "ParseError"),
            ErrorKind::NameError => write!(f, "NameError"),
            ErrorKind::TypeError => write!(f, "TypeError"),
            ErrorKind::ArityError => write!(f, "ArityError"),
            ErrorKind::ArithmeticError => write!(f, "ArithmeticError"),
            ErrorKind::RecursionError => write!(f, "RecursionError"),
        }
    }
}

/// A structured error with location information
#[derive(Debug, Clone)]
pub struct ScriptError {
    pub kind: ErrorKind,
    pub message: String,
    pub location: SourceLocation,
    pub source_line: Option<String>,
    pub suggestion: Option<String>,
    pub help: Option<String>,
    pub note: Option<String>,
}

impl ScriptError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            message: message.into(),
            location,
            source_line: None,
            suggestion: None,
            help: None,
            note: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestion = Some(suggestion);
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Attaches the file name and the offending line of `source`, when the
    /// error has a known location.
    pub fn in_file(mut self, file: &str, source: &str) -> Self {
        if self.location.is_known() {
            if let Some(line) = source.lines().nth(self.location.line - 1) {
                self.source_line = Some(line.to_string());
            }
            self.location.file = Some(file.to_string());
        }
        self
    }

    pub fn lex_error(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::new(ErrorKind::LexError, message, location)
    }

    pub fn parse_error(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::new(ErrorKind::ParseError, message, location)
    }

    pub fn type_error(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::new(ErrorKind::TypeError, message, location)
    }

    pub fn arithmetic_error(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::new(ErrorKind::ArithmeticError, message, location)
    }

    pub fn recursion_limit_exceeded(limit: usize, location: SourceLocation) -> Self {
        Self::new(
            ErrorKind::RecursionError,
            format!("maximum call depth of {} exceeded", limit),
            location,
        )
    }

    /// Create an undefined variable error
    pub fn undefined_variable(name: &str, location: SourceLocation) -> Self {
        Self::new(ErrorKind::NameError, format!("name '{}' is not defined", name), location)
    }

    /// Create an undefined function error
    pub fn undefined_function(name: &str, location: SourceLocation) -> Self {
        Self::new(ErrorKind::NameError, format!("function '{}' is not defined", name), location)
    }

    pub fn arity_mismatch(
        name: &str,
        expected: usize,
        got: usize,
        location: SourceLocation,
    ) -> Self {
        let plural = if expected == 1 { "" } else { "s" };
        Self::new(
            ErrorKind::ArityError,
            format!("{}() takes {} argument{} but {} were given", name, expected, plural, got),
            location,
        )
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind_str = format!("{}", self.kind);
        writeln!(f, "{}: {}", kind_str.red().bold(), self.message.bold())?;

        if self.location.is_known() {
            let location_str = format!("  --> {}", self.location);
            writeln!(f, "{}", location_str.bright_blue())?;
        }

        if let Some(ref source) = self.source_line {
            let line_num = self.location.line;
            let col_num = self.location.column;

            writeln!(f, "   {}", "|".bright_blue())?;
            writeln!(
                f,
                "{} {} {}",
                format!("{:3}", line_num).bright_blue(),
                "|".bright_blue(),
                source
            )?;
            writeln!(
                f,
                "   {} {}{}",
                "|".bright_blue(),
                " ".repeat(col_num.saturating_sub(1)),
                "^".red().bold()
            )?;
            writeln!(f, "   {}", "|".bright_blue())?;
        }

        if let Some(ref help) = self.help {
            writeln!(
                f,
                "   {} {}",
                "=".bright_yellow(),
                format!("help: {}", help).bright_yellow()
            )?;
        }

        if let Some(ref suggestion) = self.suggestion {
            writeln!(
                f,
                "   {} {}",
                "=".bright_green(),
                format!("Did you mean '{}'?", suggestion).bright_green()
            )?;
        }

        if let Some(ref note) = self.note {
            writeln!(f, "   {} {}", "=".bright_cyan(), format!("note: {}", note).bright_cyan())?;
        }

        Ok(())
    }
}

impl std::error::Error for ScriptError {}

/// Computes the Levenshtein distance between two strings
/// Used for "Did you mean?" suggestions
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();
    let (len1, len2) = (s1_chars.len(), s2_chars.len());

    if len1 == 0 {
        return len2;
    }
    if len2 == 0 {
        return len1;
    }

    // Two rolling rows instead of the full matrix
    let mut prev: Vec<usize> = (0..=len2).collect();
    let mut curr = vec![0; len2 + 1];

    for i in 1..=len1 {
        curr[0] = i;
        for j in 1..=len2 {
            let cost = if s1_chars[i - 1] == s2_chars[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[len2]
}

/// Find the closest match from a list of candidates using Levenshtein distance
/// Returns None if no good match is found (distance > 3)
pub fn find_closest_match<'a, I>(target: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best_match = None;
    let mut best_distance = usize::MAX;

    for candidate in candidates {
        if candidate == target {
            continue;
        }
        let distance = levenshtein_distance(target, candidate);
        if distance <= 3 && distance < best_distance {
            best_distance = distance;
            best_match = Some(candidate);
        }
    }

    best_match
}

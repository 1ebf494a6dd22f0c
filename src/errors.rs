//! Lux error reporting.
//!
//! Recoverable failures travel as [`LuxError`] values and are printed by the
//! driver as `Error: <message>` lines on stderr; the REPL then resumes.
//! CLI misuse and engine failures go through [`fatal`] and exit the process.

use std::fmt;

use inkwell::builder::BuilderError;

pub type Result<T> = std::result::Result<T, LuxError>;

/// The phase of the pipeline where an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Lexer,
    Parser,
    Codegen,
    Driver,
    Engine,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Lexer => write!(f, "lex"),
            Phase::Parser => write!(f, "parse"),
            Phase::Codegen => write!(f, "codegen"),
            Phase::Driver => write!(f, "drive"),
            Phase::Engine => write!(f, "engine"),
        }
    }
}

/// A structured front-end error.
#[derive(Debug, Clone)]
pub struct LuxError {
    pub phase: Phase,
    pub message: String,
}

impl LuxError {
    /// Shorthand for a syntax error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self { phase: Phase::Parser, message: message.into() }
    }

    /// Shorthand for a semantic error raised during lowering.
    pub fn codegen(message: impl Into<String>) -> Self {
        Self { phase: Phase::Codegen, message: message.into() }
    }
}

impl fmt::Display for LuxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for LuxError {}

impl From<BuilderError> for LuxError {
    fn from(err: BuilderError) -> Self {
        LuxError::codegen(err.to_string())
    }
}

/// Print a diagnostic line to stderr.
pub fn report(err: &LuxError) {
    eprintln!("Error: {err}");
}

/// Print an error and exit.
pub fn fatal(phase: Phase, message: impl Into<String>) -> ! {
    fatal_with_hint(phase, message, None)
}

/// Print an error with an optional `hint:` line and exit.
pub fn fatal_with_hint(phase: Phase, message: impl Into<String>, hint: Option<String>) -> ! {
    let err = LuxError { phase, message: message.into() };
    report(&err);
    if let Some(hint) = hint {
        eprintln!("  hint: {hint}");
    }
    std::process::exit(1);
}

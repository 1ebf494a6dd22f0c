/// A lexical token.
///
/// Anything that is not a keyword, identifier or number passes through as
/// `Char`, so the parser decides what `(`, `,`, `;` and operator characters
/// mean in context.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Eof,

    // ── keywords ────────────────────────────────────────────────
    Def,
    Extern,
    If,
    Then,
    Else,
    For,
    Do,
    Binary,
    Unary,

    // ── payload-carrying tokens ─────────────────────────────────
    /// Identifier: `[A-Za-z][A-Za-z0-9]*`
    Identifier(String),

    /// Numeric literal: `[0-9.]+`
    Number(f64),

    /// Any other single character.
    Char(char),
}

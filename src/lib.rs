//! Lux — a tiny expression language whose only value type is `f64`.
//!
//! Pipeline:  source → Lexer → Parser → AST → LLVM IR → AOT dump | JIT eval
//!
//! Two executables are built on this library:
//!
//! - `luxc` lowers the whole input into a single module and prints its IR
//!   to stderr on exit.
//! - `luxi` is a REPL that JIT-compiles and evaluates each top-level
//!   expression as soon as it is parsed.

pub mod ast;
pub mod cli;
pub mod compiler;
pub mod driver;
pub mod errors;
pub mod lexer;
pub mod parser;
pub mod source;

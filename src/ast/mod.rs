pub mod ast;

pub use ast::{Expr, Function, Prototype, PrototypeKind, ANONYMOUS_FUNCTION};

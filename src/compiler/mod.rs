//! LLVM-backed compilation — AST lowering plus the AOT and JIT backends.

pub mod aot;
pub mod codegen;
pub mod env;
pub mod jit;

pub use aot::AotBackend;
pub use env::CodegenEnv;
pub use jit::JitBackend;

use crate::ast::{Function, Prototype};
use crate::errors::Result;

/// One handler per top-level REPL construct.
///
/// The two implementations differ in function-redefinition policy, in
/// whether name resolution consults the prototype registry, and in module
/// lifecycle: the AOT backend keeps a single persistent module, the JIT
/// backend retires the current module after each construct.
pub trait CodegenBackend {
    /// Lower a `def`.
    fn define(&mut self, fun: Function) -> Result<()>;

    /// Declare an `extern` prototype.
    fn declare_extern(&mut self, proto: Prototype) -> Result<()>;

    /// Lower a top-level expression; in JIT mode, execute it and return the
    /// value.
    fn eval_top_level(&mut self, fun: Function) -> Result<Option<f64>>;

    /// End of input.
    fn finish(&mut self);
}

//! The codegen environment shared by both backends.

use std::collections::HashMap;
use std::sync::Once;

use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::module::Module;
use inkwell::passes::PassBuilderOptions;
use inkwell::targets::{CodeModel, InitializationConfig, RelocMode, Target, TargetMachine};
use inkwell::values::FloatValue;
use inkwell::OptimizationLevel;

use crate::errors::{self, LuxError, Phase, Result};

/// Pass pipeline run over each finished function when optimization is on.
const OPT_PASSES: &str = "instcombine,reassociate,gvn,simplifycfg";

/// Initialize the native LLVM target once per process.
pub fn initialize_native_target() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        Target::initialize_native(&InitializationConfig::default()).unwrap_or_else(|e| {
            errors::fatal(Phase::Engine, format!("failed to initialize native target: {e}"))
        });
    });
}

/// Owns the IR handles codegen works against: the context reference, the
/// current module, the instruction builder and the value scope.
pub struct CodegenEnv<'ctx> {
    pub context: &'ctx Context,
    pub module: Module<'ctx>,
    pub builder: Builder<'ctx>,
    pub named_values: Scopes<'ctx>,
    module_name: String,
    optimizer: Option<Optimizer>,
}

impl<'ctx> CodegenEnv<'ctx> {
    pub fn new(context: &'ctx Context, module_name: &str, optimize: bool) -> Self {
        Self {
            context,
            module: context.create_module(module_name),
            builder: context.create_builder(),
            named_values: Scopes::default(),
            module_name: module_name.to_string(),
            optimizer: optimize.then(Optimizer::new),
        }
    }

    /// Retire the current module: open a fresh module and builder, returning
    /// the finished one.
    pub fn fresh_module(&mut self) -> Module<'ctx> {
        let next = self.context.create_module(&self.module_name);
        self.builder = self.context.create_builder();
        std::mem::replace(&mut self.module, next)
    }

    /// Run the optimization pipeline over the current module, if enabled.
    pub fn optimize(&self) -> Result<()> {
        match &self.optimizer {
            Some(optimizer) => optimizer.run(&self.module),
            None => Ok(()),
        }
    }
}

/// The optimization pass pipeline, anchored to a native target machine.
struct Optimizer {
    machine: TargetMachine,
}

impl Optimizer {
    fn new() -> Self {
        initialize_native_target();
        let triple = TargetMachine::get_default_triple();
        let target = Target::from_triple(&triple).unwrap_or_else(|e| {
            errors::fatal(Phase::Engine, format!("unsupported target triple: {e}"))
        });
        let machine = target
            .create_target_machine(
                &triple,
                "generic",
                "",
                OptimizationLevel::Default,
                RelocMode::Default,
                CodeModel::Default,
            )
            .unwrap_or_else(|| errors::fatal(Phase::Engine, "failed to create target machine"));
        Self { machine }
    }

    fn run(&self, module: &Module<'_>) -> Result<()> {
        module
            .run_passes(OPT_PASSES, &self.machine, PassBuilderOptions::create())
            .map_err(|e| LuxError::codegen(format!("optimization pipeline failed: {e}")))
    }
}

/// Stack of name → value frames.
///
/// Function entry resets to a single frame holding the parameters; a `for`
/// loop pushes a frame for its induction variable and pops it on exit, so
/// shadowing needs no save/restore bookkeeping.
pub struct Scopes<'ctx> {
    frames: Vec<HashMap<String, FloatValue<'ctx>>>,
}

impl Default for Scopes<'_> {
    fn default() -> Self {
        Self { frames: vec![HashMap::new()] }
    }
}

impl<'ctx> Scopes<'ctx> {
    /// Drop every binding, leaving one empty frame.
    pub fn reset(&mut self) {
        self.frames.clear();
        self.frames.push(HashMap::new());
    }

    pub fn push(&mut self) {
        self.frames.push(HashMap::new());
    }

    pub fn pop(&mut self) {
        self.frames.pop();
    }

    /// Bind `name` in the innermost frame.
    pub fn define(&mut self, name: String, value: FloatValue<'ctx>) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name, value);
        }
    }

    /// Innermost binding of `name`.
    pub fn get(&self, name: &str) -> Option<FloatValue<'ctx>> {
        self.frames.iter().rev().find_map(|frame| frame.get(name).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkwell::context::Context;

    #[test]
    fn inner_frames_shadow_outer_ones() {
        let context = Context::create();
        let one = context.f64_type().const_float(1.0);
        let two = context.f64_type().const_float(2.0);

        let mut scopes = Scopes::default();
        scopes.define("i".to_string(), one);
        scopes.push();
        scopes.define("i".to_string(), two);
        assert_eq!(scopes.get("i"), Some(two));
        scopes.pop();
        assert_eq!(scopes.get("i"), Some(one));
    }

    #[test]
    fn reset_clears_all_frames() {
        let context = Context::create();
        let one = context.f64_type().const_float(1.0);

        let mut scopes = Scopes::default();
        scopes.define("x".to_string(), one);
        scopes.push();
        scopes.reset();
        assert_eq!(scopes.get("x"), None);
    }
}

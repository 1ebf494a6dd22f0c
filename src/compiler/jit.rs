//! JIT backend — per-construct modules executed through the MCJIT engine.
//!
//! Each top-level expression is lowered into a fresh module together with
//! the current body of every retained definition, handed to an execution
//! engine, invoked and then discarded. Dropping the engine with its module
//! reclaims the code and data memory of that expression, and keeping the
//! definition registry keyed by name is what makes redefinition take effect
//! on the next call.

use std::collections::HashMap;
use std::io::Write;

use inkwell::context::Context;
use inkwell::OptimizationLevel;

use crate::ast::{Function, Prototype};
use crate::errors::{self, Phase, Result};

use super::codegen::{lower_function, lower_prototype};
use super::env::initialize_native_target;
use super::{CodegenBackend, CodegenEnv};

/// putchard - writes the low byte of `x` to stderr; returns 0.
#[no_mangle]
pub extern "C" fn putchard(x: f64) -> f64 {
    let mut stderr = std::io::stderr();
    let _ = stderr.write_all(&[(x as i64) as u8]);
    let _ = stderr.flush();
    0.0
}

/// printd - prints `x` as `%f\n` to stderr; returns 0.
#[no_mangle]
pub extern "C" fn printd(x: f64) -> f64 {
    eprintln!("{x:.6}");
    0.0
}

/// Host functions callable from compiled code.
fn host_extern(name: &str) -> Option<usize> {
    match name {
        "putchard" => Some(putchard as usize),
        "printd" => Some(printd as usize),
        _ => None,
    }
}

pub struct JitBackend<'ctx> {
    env: CodegenEnv<'ctx>,
    /// Every prototype seen so far, keyed by name; backs cross-module
    /// references.
    function_protos: HashMap<String, Prototype>,
    /// The current body of every successful definition, in first-seen order.
    definitions: Vec<Function>,
}

impl<'ctx> JitBackend<'ctx> {
    pub fn new(context: &'ctx Context, optimize: bool) -> Self {
        initialize_native_target();
        Self {
            env: CodegenEnv::new(context, "lux_jit", optimize),
            function_protos: HashMap::new(),
            definitions: Vec::new(),
        }
    }

    /// Keep the most recent body for each name.
    fn remember(&mut self, fun: Function) {
        let slot = self
            .definitions
            .iter_mut()
            .find(|def| def.prototype.name == fun.prototype.name);
        match slot {
            Some(slot) => *slot = fun,
            None => self.definitions.push(fun),
        }
    }

    /// Re-lower every retained definition plus `fun` into the current
    /// module.
    fn build_module(&mut self, fun: &Function) -> Result<()> {
        for i in 0..self.definitions.len() {
            let def = self.definitions[i].clone();
            let function = lower_prototype(&self.env, &def.prototype);
            lower_function(&mut self.env, Some(&self.function_protos), function, &def)?;
        }
        let function = lower_prototype(&self.env, &fun.prototype);
        lower_function(&mut self.env, Some(&self.function_protos), function, fun)?;
        Ok(())
    }

    /// Hand the current module to a fresh execution engine, bind the host
    /// externs and invoke `name` as a zero-argument double function.
    ///
    /// Engine failures are fatal; nothing meaningful can continue without
    /// the JIT.
    fn execute(&mut self, name: &str) -> f64 {
        let engine = self
            .env
            .module
            .create_jit_execution_engine(OptimizationLevel::None)
            .unwrap_or_else(|e| {
                errors::fatal(Phase::Engine, format!("failed to create execution engine: {e}"))
            });

        // bind host functions behind any bodyless declaration
        for function in self.env.module.get_functions() {
            if function.count_basic_blocks() > 0 {
                continue;
            }
            if let Ok(fn_name) = function.get_name().to_str() {
                if let Some(addr) = host_extern(fn_name) {
                    engine.add_global_mapping(&function, addr);
                }
            }
        }

        let compiled = unsafe { engine.get_function::<unsafe extern "C" fn() -> f64>(name) }
            .unwrap_or_else(|e| {
                errors::fatal(Phase::Engine, format!("symbol lookup failed for '{name}': {e}"))
            });
        unsafe { compiled.call() }
    }
}

impl CodegenBackend for JitBackend<'_> {
    fn define(&mut self, fun: Function) -> Result<()> {
        // the registry owns every definition's prototype, overwriting any
        // earlier definition of the same name
        self.function_protos
            .insert(fun.prototype.name.clone(), fun.prototype.clone());

        let function = lower_prototype(&self.env, &fun.prototype);
        let lowered = lower_function(&mut self.env, Some(&self.function_protos), function, &fun);
        self.env.fresh_module();

        lowered?;
        self.remember(fun);
        Ok(())
    }

    fn declare_extern(&mut self, proto: Prototype) -> Result<()> {
        lower_prototype(&self.env, &proto);
        self.function_protos.insert(proto.name.clone(), proto);
        Ok(())
    }

    fn eval_top_level(&mut self, fun: Function) -> Result<Option<f64>> {
        if let Err(e) = self.build_module(&fun) {
            self.env.fresh_module();
            return Err(e);
        }
        let value = self.execute(&fun.prototype.name);
        // retiring the module releases this expression's code and data
        self.env.fresh_module();
        Ok(Some(value))
    }

    fn finish(&mut self) {}
}

//! AOT backend — one persistent module, printed at end of input.

use inkwell::context::Context;

use crate::ast::{Function, Prototype};
use crate::errors::{LuxError, Result};

use super::codegen::{declare_prototype, lower_function, lower_prototype};
use super::{CodegenBackend, CodegenEnv};

pub struct AotBackend<'ctx> {
    env: CodegenEnv<'ctx>,
}

impl<'ctx> AotBackend<'ctx> {
    pub fn new(context: &'ctx Context, optimize: bool) -> Self {
        Self { env: CodegenEnv::new(context, "lux", optimize) }
    }

    /// The module IR as text.
    pub fn module_ir(&self) -> String {
        self.env.module.print_to_string().to_string()
    }
}

impl CodegenBackend for AotBackend<'_> {
    fn define(&mut self, fun: Function) -> Result<()> {
        let proto = &fun.prototype;

        // A previous `extern` (or the prototype of a failed definition) may
        // have declared this name already. The body attaches to it only when
        // arity and parameter names agree; otherwise the prototype is
        // re-emitted.
        let function = match self.env.module.get_function(&proto.name) {
            Some(existing) if signature_matches(existing, proto) => existing,
            _ => declare_prototype(&self.env, proto),
        };

        if function.count_basic_blocks() > 0 {
            return Err(LuxError::codegen(format!(
                "function '{}' cannot be redefined",
                proto.name
            )));
        }

        lower_function(&mut self.env, None, function, &fun)?;
        Ok(())
    }

    fn declare_extern(&mut self, proto: Prototype) -> Result<()> {
        // re-declarations with a matching signature return the existing
        // function
        lower_prototype(&self.env, &proto);
        Ok(())
    }

    fn eval_top_level(&mut self, fun: Function) -> Result<Option<f64>> {
        let function = lower_prototype(&self.env, &fun.prototype);
        let function = lower_function(&mut self.env, None, function, &fun)?;
        // the persistent module keeps named definitions only
        unsafe { function.delete() };
        Ok(None)
    }

    fn finish(&mut self) {
        self.env.module.print_to_stderr();
    }
}

fn signature_matches(function: inkwell::values::FunctionValue<'_>, proto: &Prototype) -> bool {
    if function.count_params() as usize != proto.params.len() {
        return false;
    }
    function
        .get_param_iter()
        .zip(&proto.params)
        .all(|(param, name)| param.into_float_value().get_name().to_str() == Ok(name.as_str()))
}

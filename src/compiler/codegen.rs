//! Code generation — lowers AST nodes into LLVM IR.
//!
//! Every value is a `double`; every function takes and returns `double`s.
//! The lowering is shared by both backends: the `protos` registry is the one
//! policy hook, consulted for cross-module references in JIT mode and absent
//! in AOT mode.

use std::collections::HashMap;

use inkwell::types::BasicMetadataTypeEnum;
use inkwell::values::{BasicMetadataValueEnum, FloatValue, FunctionValue};
use inkwell::FloatPredicate;

use crate::ast::{Expr, Function, Prototype};
use crate::errors::{LuxError, Result};

use super::env::CodegenEnv;

/// Prototype registry consulted for cross-module references (JIT only).
pub type FnProtos<'a> = Option<&'a HashMap<String, Prototype>>;

/// Emit an external-linkage declaration for `proto` into the current module.
pub fn declare_prototype<'ctx>(env: &CodegenEnv<'ctx>, proto: &Prototype) -> FunctionValue<'ctx> {
    let f64_ty = env.context.f64_type();
    let param_types: Vec<BasicMetadataTypeEnum> = vec![f64_ty.into(); proto.params.len()];
    let fn_type = f64_ty.fn_type(&param_types, false);

    let function = env.module.add_function(&proto.name, fn_type, None);
    for (param, name) in function.get_param_iter().zip(&proto.params) {
        param.into_float_value().set_name(name);
    }
    function
}

/// Like [`declare_prototype`], but re-declarations return the existing
/// function instead of emitting a second one.
pub fn lower_prototype<'ctx>(env: &CodegenEnv<'ctx>, proto: &Prototype) -> FunctionValue<'ctx> {
    match env.module.get_function(&proto.name) {
        Some(existing) => existing,
        None => declare_prototype(env, proto),
    }
}

/// Resolve a callee by name.
///
/// The current module is checked first; with a registry present, a known
/// prototype is re-declared into the current module so the execution engine
/// can link the call to the installed body.
pub fn resolve_function<'ctx>(
    env: &CodegenEnv<'ctx>,
    protos: FnProtos<'_>,
    name: &str,
) -> Option<FunctionValue<'ctx>> {
    if let Some(function) = env.module.get_function(name) {
        return Some(function);
    }
    let proto = protos?.get(name)?;
    Some(declare_prototype(env, proto))
}

/// Lower a function body into `function`, which must not have one yet.
///
/// On failure the half-built function is deleted so the name does not
/// linger in the symbol table with a broken body.
pub fn lower_function<'ctx>(
    env: &mut CodegenEnv<'ctx>,
    protos: FnProtos<'_>,
    function: FunctionValue<'ctx>,
    fun: &Function,
) -> Result<FunctionValue<'ctx>> {
    let entry = env.context.append_basic_block(function, "entry");
    env.builder.position_at_end(entry);

    env.named_values.reset();
    for (param, name) in function.get_param_iter().zip(&fun.prototype.params) {
        env.named_values.define(name.clone(), param.into_float_value());
    }

    let ret = match lower_expr(env, protos, &fun.body) {
        Ok(ret) => ret,
        Err(e) => {
            unsafe { function.delete() };
            return Err(e);
        }
    };
    env.builder.build_return(Some(&ret))?;

    if !function.verify(true) {
        unsafe { function.delete() };
        return Err(LuxError::codegen(format!(
            "generated invalid IR for function '{}'",
            fun.prototype.name
        )));
    }

    env.optimize()?;
    Ok(function)
}

/// Lower one expression, leaving the builder positioned after it.
pub fn lower_expr<'ctx>(
    env: &mut CodegenEnv<'ctx>,
    protos: FnProtos<'_>,
    expr: &Expr,
) -> Result<FloatValue<'ctx>> {
    match expr {
        Expr::Number(value) => Ok(env.context.f64_type().const_float(*value)),

        Expr::Variable(name) => env
            .named_values
            .get(name)
            .ok_or_else(|| LuxError::codegen(format!("unknown variable name '{name}'"))),

        Expr::Unary { op, operand } => {
            let operand = lower_expr(env, protos, operand)?;
            let callee = resolve_function(env, protos, &format!("unary{op}"))
                .ok_or_else(|| LuxError::codegen(format!("unknown unary operator '{op}'")))?;
            build_call(env, callee, &[operand], "unop")
        }

        Expr::Binary { op, lhs, rhs } => {
            let lhs = lower_expr(env, protos, lhs)?;
            let rhs = lower_expr(env, protos, rhs)?;
            match *op {
                '+' => Ok(env.builder.build_float_add(lhs, rhs, "addtmp")?),
                '-' => Ok(env.builder.build_float_sub(lhs, rhs, "subtmp")?),
                '*' => Ok(env.builder.build_float_mul(lhs, rhs, "multmp")?),
                '<' => {
                    let cmp = env
                        .builder
                        .build_float_compare(FloatPredicate::ULT, lhs, rhs, "cmptmp")?;
                    // convert the i1 back into 0.0 / 1.0
                    Ok(env.builder.build_unsigned_int_to_float(
                        cmp,
                        env.context.f64_type(),
                        "booltmp",
                    )?)
                }
                op => {
                    let callee = resolve_function(env, protos, &format!("binary{op}"))
                        .ok_or_else(|| {
                            LuxError::codegen(format!("invalid binary operator '{op}'"))
                        })?;
                    build_call(env, callee, &[lhs, rhs], "binop")
                }
            }
        }

        Expr::Call { callee, args } => {
            let function = resolve_function(env, protos, callee)
                .ok_or_else(|| LuxError::codegen(format!("unknown function referenced: '{callee}'")))?;
            if function.count_params() as usize != args.len() {
                return Err(LuxError::codegen(format!(
                    "incorrect number of arguments passed to '{callee}'"
                )));
            }
            let mut lowered = Vec::with_capacity(args.len());
            for arg in args {
                lowered.push(lower_expr(env, protos, arg)?);
            }
            build_call(env, function, &lowered, "calltmp")
        }

        Expr::If { cond, then, otherwise } => {
            let f64_ty = env.context.f64_type();
            let zero = f64_ty.const_float(0.0);

            let cond = lower_expr(env, protos, cond)?;
            let cond = env
                .builder
                .build_float_compare(FloatPredicate::ONE, cond, zero, "ifcond")?;

            let parent = env.builder.get_insert_block().unwrap().get_parent().unwrap();
            let then_bb = env.context.append_basic_block(parent, "then");
            let else_bb = env.context.append_basic_block(parent, "else");
            let merge_bb = env.context.append_basic_block(parent, "ifcont");
            env.builder.build_conditional_branch(cond, then_bb, else_bb)?;

            env.builder.position_at_end(then_bb);
            let then_val = lower_expr(env, protos, then)?;
            env.builder.build_unconditional_branch(merge_bb)?;
            // nested constructs may have moved the insertion point
            let then_end = env.builder.get_insert_block().unwrap();

            env.builder.position_at_end(else_bb);
            let else_val = match otherwise {
                Some(otherwise) => lower_expr(env, protos, otherwise)?,
                None => zero,
            };
            env.builder.build_unconditional_branch(merge_bb)?;
            let else_end = env.builder.get_insert_block().unwrap();

            env.builder.position_at_end(merge_bb);
            let phi = env.builder.build_phi(f64_ty, "iftmp")?;
            phi.add_incoming(&[(&then_val, then_end), (&else_val, else_end)]);
            Ok(phi.as_basic_value().into_float_value())
        }

        Expr::For { var, start, end, step, body } => {
            let f64_ty = env.context.f64_type();
            let start_val = lower_expr(env, protos, start)?;

            let preheader = env.builder.get_insert_block().unwrap();
            let parent = preheader.get_parent().unwrap();
            let loop_bb = env.context.append_basic_block(parent, "loop");
            let body_bb = env.context.append_basic_block(parent, "loopbody");
            let after_bb = env.context.append_basic_block(parent, "afterloop");
            env.builder.build_unconditional_branch(loop_bb)?;

            // loop header: the induction phi and the end-condition test.
            // Testing before the body means `for i = 0, 0 do x` runs it
            // zero times.
            env.builder.position_at_end(loop_bb);
            let phi = env.builder.build_phi(f64_ty, var)?;
            phi.add_incoming(&[(&start_val, preheader)]);
            let induction = phi.as_basic_value().into_float_value();

            env.named_values.push();
            env.named_values.define(var.clone(), induction);

            let end_val = lower_expr(env, protos, end)?;
            let cond = env.builder.build_float_compare(
                FloatPredicate::ONE,
                end_val,
                f64_ty.const_float(0.0),
                "loopcond",
            )?;
            env.builder.build_conditional_branch(cond, body_bb, after_bb)?;

            // body, step and the back edge
            env.builder.position_at_end(body_bb);
            lower_expr(env, protos, body)?;
            let step_val = match step {
                Some(step) => lower_expr(env, protos, step)?,
                None => f64_ty.const_float(1.0),
            };
            let next = env.builder.build_float_add(induction, step_val, "nextvar")?;
            env.builder.build_unconditional_branch(loop_bb)?;
            let body_end = env.builder.get_insert_block().unwrap();
            phi.add_incoming(&[(&next, body_end)]);

            env.named_values.pop();
            env.builder.position_at_end(after_bb);

            // the for expression itself always yields 0.0
            Ok(f64_ty.const_float(0.0))
        }
    }
}

fn build_call<'ctx>(
    env: &CodegenEnv<'ctx>,
    callee: FunctionValue<'ctx>,
    args: &[FloatValue<'ctx>],
    name: &str,
) -> Result<FloatValue<'ctx>> {
    let args: Vec<BasicMetadataValueEnum> = args.iter().map(|&arg| arg.into()).collect();
    let call = env.builder.build_call(callee, &args, name)?;
    call.try_as_basic_value()
        .left()
        .map(|value| value.into_float_value())
        .ok_or_else(|| LuxError::codegen("call does not produce a value"))
}

use crate::ast::{Lambda, Value};
use crate::memory::Memory;
use crate::primitives::{call_primitive, is_primitive_name};
use crate::substitution::{Application, apply, apply_values};
use crate::{Error, MAX_EVAL_DEPTH};
use std::io::Write;

/// Per-evaluation state threaded through every recursive call
pub struct EvalContext<'a> {
    /// Channel written by the `print` primitive
    pub out: &'a mut dyn Write,
    /// Nesting level at which evaluation gives up with [`Error::StackExhausted`]
    pub max_depth: usize,
}

impl<'a> EvalContext<'a> {
    pub fn new(out: &'a mut dyn Write) -> Self {
        EvalContext {
            out,
            max_depth: MAX_EVAL_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Evaluate an element against `memory` (public API)
pub fn eval(expr: &Value, memory: &mut Memory, ctx: &mut EvalContext<'_>) -> Result<Value, Error> {
    eval_with_depth_tracking(expr, memory, ctx, 0).map_err(|err| add_context(err, expr))
}

/// Helper function to add the top-level expression to errors that carry no context
fn add_context(error: Error, expr: &Value) -> Error {
    let context = format!("while evaluating: {expr}");
    match error {
        Error::EvalError(msg) => Error::EvalError(format!("{msg}\n  Context: {context}")),
        Error::TypeError(msg) => Error::TypeError(format!("{msg}\n  Context: {context}")),
        other => other,
    }
}

/// Evaluate an element with depth tracking to prevent stack overflow
pub fn eval_with_depth_tracking(
    expr: &Value,
    memory: &mut Memory,
    ctx: &mut EvalContext<'_>,
    depth: usize,
) -> Result<Value, Error> {
    if depth >= ctx.max_depth {
        return Err(Error::StackExhausted {
            limit: ctx.max_depth,
        });
    }
    log::trace!(target: "eval", "[{depth}] {expr}");

    match expr {
        // Bound names resolve through chains of bindings; unbound names evaluate to themselves
        Value::Symbol(name) => Ok(memory.resolve(name)),
        Value::List(elements) => eval_list(expr, elements, memory, ctx, depth),
        Value::Number(_) | Value::Text(_) | Value::Bool(_) | Value::Void => Ok(expr.clone()),
    }
}

/// Dispatch a list: special forms first, then the different kinds of application.
fn eval_list(
    expr: &Value,
    elements: &[Value],
    memory: &mut Memory,
    ctx: &mut EvalContext<'_>,
    depth: usize,
) -> Result<Value, Error> {
    let [head, args @ ..] = elements else {
        return Err(Error::EvalError("Cannot evaluate empty list".to_owned()));
    };

    // A function value in operator position
    if let Some(lambda) = head.as_lambda() {
        return apply_lambda(lambda, args, memory, ctx, depth);
    }

    // A function value on its own is already a value
    if expr.is_lambda() {
        return Ok(expr.clone());
    }

    match (head, args) {
        (Value::Symbol(keyword), [target, value]) if keyword == "define" => {
            eval_define(target, value, memory, ctx, depth)
        }
        (Value::Symbol(keyword), [bindings, body]) if keyword == "let" => {
            eval_let(bindings, body, memory, ctx, depth)
        }
        (Value::Symbol(keyword), [condition, then_expr, else_expr]) if keyword == "if" => {
            eval_if(condition, then_expr, else_expr, memory, ctx, depth)
        }
        (Value::Symbol(keyword), [_, _, ..]) if keyword == "do" => {
            eval_do(args, memory, ctx, depth)
        }

        (Value::Symbol(name), _) if is_primitive_name(name) => {
            let evaluated = eval_arguments(args, memory, ctx, depth)?;
            call_primitive(name, &evaluated, ctx.out)
        }

        (Value::Symbol(name), _) => match memory.resolve(name) {
            resolved if resolved.is_lambda() => {
                retry_with_operator(resolved, args, memory, ctx, depth)
            }
            // An alias of another name, e.g. a primitive symbol stored under a user name
            Value::Symbol(alias) if alias != *name => {
                retry_with_operator(Value::Symbol(alias), args, memory, ctx, depth)
            }
            _ => Err(Error::UndefinedOperator(name.clone())),
        },

        (Value::List(_), _) => {
            let operator = eval_with_depth_tracking(head, memory, ctx, depth + 1)?;
            if operator.is_lambda() || matches!(operator, Value::Symbol(_)) {
                retry_with_operator(operator, args, memory, ctx, depth)
            } else {
                Err(Error::UndefinedOperator(operator.to_string()))
            }
        }

        _ => Err(Error::UndefinedOperator(head.to_string())),
    }
}

/// Evaluate call arguments left to right in `memory`
fn eval_arguments(
    args: &[Value],
    memory: &mut Memory,
    ctx: &mut EvalContext<'_>,
    depth: usize,
) -> Result<Vec<Value>, Error> {
    args.iter()
        .map(|arg| eval_with_depth_tracking(arg, memory, ctx, depth + 1))
        .collect()
}

/// Put `operator` in place of the original head and dispatch the call again.
///
/// A function operator reached through a name or a compound expression gets its
/// arguments evaluated first, so each argument runs once.
fn retry_with_operator(
    operator: Value,
    args: &[Value],
    memory: &mut Memory,
    ctx: &mut EvalContext<'_>,
    depth: usize,
) -> Result<Value, Error> {
    if let Some(lambda) = operator.as_lambda() {
        let values = eval_arguments(args, memory, ctx, depth)?;
        let application = apply_values(lambda, &values)?;
        return run_application(application, memory, ctx, depth);
    }
    let mut call = Vec::with_capacity(args.len() + 1);
    call.push(operator);
    call.extend_from_slice(args);
    let call = Value::List(call);
    eval_with_depth_tracking(&call, memory, ctx, depth + 1)
}

/// Apply a function literal to its arguments as written
fn apply_lambda(
    lambda: Lambda<'_>,
    args: &[Value],
    memory: &mut Memory,
    ctx: &mut EvalContext<'_>,
    depth: usize,
) -> Result<Value, Error> {
    let application = apply(lambda, args, memory)?;
    run_application(application, memory, ctx, depth)
}

/// A complete application is evaluated in a fresh local scope; a partial one is a value.
fn run_application(
    application: Application,
    memory: &mut Memory,
    ctx: &mut EvalContext<'_>,
    depth: usize,
) -> Result<Value, Error> {
    match application {
        Application::Complete(body) => {
            let mut local = memory.snapshot();
            eval_with_depth_tracking(&body, &mut local, ctx, depth + 1)
        }
        Application::Partial(curried) => Ok(curried),
    }
}

/// Evaluate define special form
fn eval_define(
    target: &Value,
    value_expr: &Value,
    memory: &mut Memory,
    ctx: &mut EvalContext<'_>,
    depth: usize,
) -> Result<Value, Error> {
    match target {
        Value::Symbol(name) => {
            let value = eval_with_depth_tracking(value_expr, memory, ctx, depth + 1)?;
            log::debug!(target: "eval", "define {name} = {value}");
            memory.define(name, value)?;
        }
        // (define (name params...) body) binds name to a lambda without evaluating body
        Value::List(signature) => match signature.as_slice() {
            [Value::Symbol(name), params @ ..] => {
                let function = Value::lambda(params.to_vec(), value_expr.clone());
                log::debug!(target: "eval", "define {name} = {function}");
                memory.define(name, function)?;
            }
            _ => {
                return Err(Error::TypeError(format!(
                    "define requires a (name params...) signature, got {target}"
                )));
            }
        },
        _ => {
            return Err(Error::TypeError(format!(
                "define requires a symbol, got {} {target}",
                target.type_name()
            )));
        }
    }
    Ok(Value::Void)
}

/// Evaluate let special form
///
/// Bindings are made one after another in a local copy of `memory`, so each binding
/// sees the ones before it and may rebind an earlier name.
fn eval_let(
    bindings: &Value,
    body: &Value,
    memory: &mut Memory,
    ctx: &mut EvalContext<'_>,
    depth: usize,
) -> Result<Value, Error> {
    let Value::List(clauses) = bindings else {
        return Err(Error::TypeError(format!(
            "let requires a list of bindings, got {bindings}"
        )));
    };

    let mut local = memory.snapshot();
    for clause in clauses {
        match clause {
            Value::List(pair) => match pair.as_slice() {
                [Value::Symbol(name), expr] => {
                    let value = eval_with_depth_tracking(expr, &mut local, ctx, depth + 1)?;
                    local.define(name, value)?;
                }
                _ => {
                    return Err(Error::TypeError(format!(
                        "let binding must be (name expression), got {clause}"
                    )));
                }
            },
            _ => {
                return Err(Error::TypeError(format!(
                    "let binding must be (name expression), got {clause}"
                )));
            }
        }
    }

    eval_with_depth_tracking(body, &mut local, ctx, depth + 1)
}

/// Evaluate if special form
fn eval_if(
    condition_expr: &Value,
    then_expr: &Value,
    else_expr: &Value,
    memory: &mut Memory,
    ctx: &mut EvalContext<'_>,
    depth: usize,
) -> Result<Value, Error> {
    match eval_with_depth_tracking(condition_expr, memory, ctx, depth + 1)? {
        Value::Bool(true) => eval_with_depth_tracking(then_expr, memory, ctx, depth + 1),
        Value::Bool(false) => eval_with_depth_tracking(else_expr, memory, ctx, depth + 1),
        other => Err(Error::TypeError(format!(
            "if condition must be a boolean, got {} {other}",
            other.type_name()
        ))),
    }
}

/// Evaluate do special form: effects only, the form itself is void
fn eval_do(
    exprs: &[Value],
    memory: &mut Memory,
    ctx: &mut EvalContext<'_>,
    depth: usize,
) -> Result<Value, Error> {
    for expr in exprs {
        eval_with_depth_tracking(expr, memory, ctx, depth + 1)?;
    }
    Ok(Value::Void)
}

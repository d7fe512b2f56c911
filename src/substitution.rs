//! Lambda application by rewriting.
//!
//! Applying `(lambda (p1 ... pn) body)` to arguments `a1 ... ak` pairs each supplied
//! argument with its parameter and rewrites the body, replacing every free occurrence
//! of a parameter with its argument. When all parameters are supplied the rewritten
//! body is handed back for evaluation; with fewer arguments the result is a new lambda
//! over the remaining parameters (automatic currying).
//!
//! Rewriting respects the binding forms it walks through:
//!
//! - a nested `(lambda (params...) body)` shields its own parameters
//! - a nested `(let ((name expr) ...) body)` shields each name from the following
//!   bindings and from the body, mirroring sequential binding at run time
//! - a nested `(define (name params...) body)` shields its name and parameters
//!
//! Nothing is renamed. An argument that mentions a free name which a nested binding
//! form also binds will be captured by that binding form.

use crate::Error;
use crate::ast::{LAMBDA, Lambda, Value};
use crate::memory::Memory;
use std::collections::HashMap;

/// Parameter name to argument map used while rewriting a body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    values: HashMap<String, Value>,
}

impl Bindings {
    pub fn new() -> Self {
        Bindings::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn remove(&mut self, name: &str) {
        self.values.remove(name);
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Copy of these bindings with every symbol in `names` removed
    pub fn without(&self, names: &[Value]) -> Bindings {
        let mut scoped = self.clone();
        for name in names.iter().filter_map(Value::as_symbol) {
            scoped.remove(name);
        }
        scoped
    }
}

/// Result of applying a lambda to its arguments
#[derive(Debug, Clone, PartialEq)]
pub enum Application {
    /// Every parameter was supplied: the rewritten body, still to be evaluated
    Complete(Value),
    /// Some parameters remain: a new lambda awaiting them
    Partial(Value),
}

/// Replace free occurrences of bound names in `body`, producing a new element.
pub fn substitute(body: &Value, bindings: &Bindings) -> Value {
    if bindings.is_empty() {
        return body.clone();
    }
    match body {
        Value::Symbol(name) => bindings.get(name).cloned().unwrap_or_else(|| body.clone()),
        Value::List(elements) => substitute_list(body, elements, bindings),
        _ => body.clone(),
    }
}

fn substitute_list(list: &Value, elements: &[Value], bindings: &Bindings) -> Value {
    if let Some(lambda) = list.as_lambda() {
        let inner = bindings.without(lambda.params);
        return Value::lambda(lambda.params.to_vec(), substitute(lambda.body, &inner));
    }

    match elements {
        [head @ Value::Symbol(keyword), Value::List(clauses), body] if keyword == "let" => {
            substitute_let(head, clauses, body, bindings)
        }
        [head @ Value::Symbol(keyword), signature @ Value::List(names), body]
            if keyword == "define" =>
        {
            let inner = bindings.without(names);
            Value::List(vec![
                head.clone(),
                signature.clone(),
                substitute(body, &inner),
            ])
        }
        [head @ Value::Symbol(keyword), target @ Value::Symbol(_), expr] if keyword == "define" => {
            Value::List(vec![
                head.clone(),
                target.clone(),
                substitute(expr, bindings),
            ])
        }
        _ => Value::List(
            elements
                .iter()
                .map(|element| substitute(element, bindings))
                .collect(),
        ),
    }
}

/// Rewrite a `let` form binding by binding, dropping each bound name from scope
/// before the bindings that follow it and before the body.
fn substitute_let(head: &Value, clauses: &[Value], body: &Value, bindings: &Bindings) -> Value {
    let mut scope = bindings.clone();
    let mut rewritten = Vec::with_capacity(clauses.len());

    for clause in clauses {
        match clause {
            Value::List(pair) => match pair.as_slice() {
                [name @ Value::Symbol(bound), expr] => {
                    rewritten.push(Value::List(vec![name.clone(), substitute(expr, &scope)]));
                    scope.remove(bound);
                }
                _ => rewritten.push(substitute(clause, &scope)),
            },
            _ => rewritten.push(substitute(clause, &scope)),
        }
    }

    Value::List(vec![
        head.clone(),
        Value::List(rewritten),
        substitute(body, &scope),
    ])
}

/// Value stored for an argument: a symbol bound in `memory` is resolved one step,
/// anything else is kept as written.
fn bind_argument(arg: &Value, memory: &Memory) -> Value {
    match arg {
        Value::Symbol(name) => memory.get(name).cloned().unwrap_or_else(|| arg.clone()),
        other => other.clone(),
    }
}

/// Apply a lambda to (possibly fewer) arguments as written at the call site.
///
/// A bare symbol bound in `memory` is resolved one step. Every other argument is
/// substituted unevaluated.
pub fn apply(lambda: Lambda<'_>, args: &[Value], memory: &Memory) -> Result<Application, Error> {
    let bound: Vec<Value> = args.iter().map(|arg| bind_argument(arg, memory)).collect();
    apply_values(lambda, &bound)
}

/// Apply a lambda to (possibly fewer) arguments that are already values.
///
/// Supplying more arguments than parameters is an arity error, as is a parameter
/// list containing anything other than symbols.
pub fn apply_values(lambda: Lambda<'_>, args: &[Value]) -> Result<Application, Error> {
    let params = lambda.params;
    if args.len() > params.len() {
        return Err(Error::arity_error_with_expr(
            params.len(),
            args.len(),
            lambda.to_value().to_string(),
        ));
    }
    if let Some(param) = params.iter().find(|param| param.as_symbol().is_none()) {
        return Err(Error::TypeError(format!(
            "{LAMBDA} parameters must be symbols, got {param}"
        )));
    }

    let mut bindings = Bindings::new();
    for (param, arg) in params.iter().filter_map(Value::as_symbol).zip(args) {
        bindings.insert(param, arg.clone());
    }

    let body = substitute(lambda.body, &bindings);
    log::trace!(
        target: "subst",
        "applied {} of {} argument(s): {body}",
        args.len(),
        params.len()
    );

    if args.len() == params.len() {
        Ok(Application::Complete(body))
    } else {
        let remaining = params[args.len()..].to_vec();
        Ok(Application::Partial(Value::lambda(remaining, body)))
    }
}

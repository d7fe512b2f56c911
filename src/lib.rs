//! Sublisp - a minimal substitution-model interpreter for S-expressions
//!
//! This crate implements a small, dynamically typed, parenthesized expression language
//! with first-class functions, conditionals, sequencing, local scoping and automatic
//! currying. Lambda application is modelled by rewriting: the parameters of a lambda
//! are textually replaced by their arguments inside the body, and the rewritten body is
//! evaluated again. No environment chains are involved.
//!
//! ```text
//! (define (add a b) (+ a b))
//! (add 1 2)                 ; 3.0
//! (add 1)                   ; (lambda (b) (+ 1.0 b))
//! ((add 1) 2)               ; 3.0
//! (let ((x 10) (x (increment x))) x)  ; 11.0
//! ```
//!
//! ## Semantics in brief
//!
//! - Every number is a double precision float and prints as such (`10` prints `10.0`)
//! - Strings are delimited by `"` and carry no escape processing
//! - `if` requires a boolean condition (no truthiness)
//! - Calling an n-ary function with fewer arguments yields a new function awaiting the rest
//! - Primitives are symbols carrying the `%` marker; the prelude wraps them in ordinary
//!   definitions such as `(define (+ a b) (%+ a b))`
//!
//! ## Modules
//!
//! - `reader`: streaming character-level reader producing nested lists
//! - `evaluator`: special forms and the dispatch rules for applications
//! - `substitution`: parameter substitution and automatic currying
//! - `memory`: the symbol table and its value-semantic snapshots
//! - `primitives`: the fixed table of `%`-marked operations
//! - `prelude`: the bootstrap definitions every new interpreter starts with
//! - `interpreter`: the `evaluate(source)` entry point tying everything together

use std::fmt;

/// Maximum list nesting accepted by the reader
/// Nested values are cloned, printed and dropped recursively, so input deeper than this
/// is rejected before it can exhaust the host stack
pub const MAX_PARSE_DEPTH: usize = 256;

/// Maximum evaluation depth before evaluation is aborted with [`Error::StackExhausted`]
/// There is no tail-call elimination, so deep recursion in user programs ends here
/// instead of exhausting the host stack
pub const MAX_EVAL_DEPTH: usize = 512;

/// Categorizes the different kinds of reading errors.
#[derive(Debug, PartialEq, Clone)]
pub enum ParseErrorKind {
    /// A token that starts like a number but is not a valid double
    InvalidNumber,
    /// Input ended while a list or string was still open
    Incomplete,
    /// List nesting exceeded the maximum parse depth
    TooDeeplyNested,
    /// Extra input found after a complete form where exactly one was expected
    TrailingContent,
}

/// A structured error providing detailed information about a reading failure.
#[derive(Debug, PartialEq, Clone)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    /// The problematic token, if identifiable
    pub found: Option<String>,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, message: impl Into<String>, found: Option<String>) -> Self {
        ParseError {
            kind,
            message: message.into(),
            found,
        }
    }

    /// Create a simple ParseError with a kind and message but no token
    pub fn from_message(kind: ParseErrorKind, message: impl Into<String>) -> Self {
        Self::new(kind, message, None)
    }
}

/// Error types for the interpreter
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    ParseError(ParseError),
    EvalError(String),
    TypeError(String),
    /// The operator position holds something that cannot be applied
    UndefinedOperator(String),
    /// A `%`-marked symbol that is not in the primitive table
    UnknownPrimitive(String),
    /// An attempt to bind a `%`-marked name
    PrimitiveRedefinition(String),
    ArityError {
        expected: usize,
        got: usize,
        expression: Option<String>, // Optional expression context
    },
    StackExhausted {
        limit: usize,
    },
    /// Writing to the output channel failed
    Io(String),
}

impl Error {
    /// Create an ArityError without expression context
    pub fn arity_error(expected: usize, got: usize) -> Self {
        Error::ArityError {
            expected,
            got,
            expression: None,
        }
    }

    /// Create an ArityError with expression context
    pub fn arity_error_with_expr(expected: usize, got: usize, expression: String) -> Self {
        Error::ArityError {
            expected,
            got,
            expression: Some(expression),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ParseError(e) => {
                write!(f, "ParseError: {}", e.message)?;
                if let Some(found) = &e.found {
                    write!(f, "\nFound: {found}")?;
                }
                Ok(())
            }
            Error::EvalError(msg) => write!(f, "EvaluationError: {msg}"),
            Error::TypeError(msg) => write!(f, "Type error: {msg}"),
            Error::UndefinedOperator(op) => write!(f, "Undefined operator: {op}"),
            Error::UnknownPrimitive(name) => write!(f, "Primitive does not exist: {name}"),
            Error::PrimitiveRedefinition(name) => {
                write!(f, "Cannot redefine primitive: {name}")
            }
            Error::ArityError {
                expected,
                got,
                expression,
            } => match expression {
                Some(expr) => write!(
                    f,
                    "ArityError: expression {expr}: expected {expected} arguments, got {got}"
                ),
                None => write!(
                    f,
                    "ArityError: function expected {expected} arguments but got {got}"
                ),
            },
            Error::StackExhausted { limit } => {
                write!(f, "Stack exhausted: evaluation depth exceeded {limit}")
            }
            Error::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

pub mod ast;
pub mod evaluator;
pub mod interpreter;
pub mod memory;
pub mod prelude;
pub mod primitives;
pub mod reader;
pub mod substitution;

pub use interpreter::{Config, Interpreter};

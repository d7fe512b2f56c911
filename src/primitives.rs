//! Fixed table of primitive operations.
//!
//! Primitives are symbols carrying the reserved marker [`PRIMITIVE_MARKER`], such as
//! `%+` or `%print`. They are never bound in memory and cannot be redefined; the
//! evaluator recognizes the marker, evaluates every argument left to right and
//! dispatches here. User-facing names like `+` are ordinary definitions in the prelude:
//!
//! ```text
//! (define (+ a b) (%+ a b))
//! (define (print x) (%print x))
//! ```
//!
//! ## Strictness
//!
//! - Arithmetic and ordering require numbers; `not`, `and` and `or` require booleans
//! - `=` is structural equality and accepts operands of any type
//! - Every primitive has a fixed arity that is checked before it runs
//!
//! ## Adding New Primitives
//!
//! 1. **Implement the function** as `fn(&[Value]) -> Result<Value, Error>`, or take the
//!    output channel as well if it has a visible effect
//! 2. **Add it to PRIMITIVES** with its unmarked name and arity
//! 3. **Wrap it in the prelude** if it should be callable by a plain name

use crate::Error;
use crate::ast::{NumberType, Value};
use std::collections::HashMap;
use std::io::Write;
use std::sync::LazyLock;

/// Prefix reserved for primitive symbols
pub const PRIMITIVE_MARKER: char = '%';

/// Check whether a symbol name carries the primitive marker
pub fn is_primitive_name(name: &str) -> bool {
    name.starts_with(PRIMITIVE_MARKER)
}

/// Implementation of a primitive
#[derive(Clone, Copy)]
pub enum PrimitiveKind {
    /// Computes a value from its arguments alone
    Pure(fn(&[Value]) -> Result<Value, Error>),
    /// Writes to the output channel
    Effect(fn(&[Value], &mut dyn Write) -> Result<Value, Error>),
}

impl std::fmt::Debug for PrimitiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrimitiveKind::Pure(_) => write!(f, "Pure(<fn>)"),
            PrimitiveKind::Effect(_) => write!(f, "Effect(<fn>)"),
        }
    }
}

/// Definition of a primitive operation
#[derive(Debug, Clone)]
pub struct Primitive {
    /// Name without the marker
    pub name: &'static str,
    pub kind: PrimitiveKind,
    /// Exact number of arguments
    pub arity: usize,
}

impl PartialEq for Primitive {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Primitive {
    /// Check arity, then run the primitive on already evaluated arguments
    pub fn call(&self, args: &[Value], out: &mut dyn Write) -> Result<Value, Error> {
        if args.len() != self.arity {
            return Err(Error::arity_error_with_expr(
                self.arity,
                args.len(),
                format!("{PRIMITIVE_MARKER}{}", self.name),
            ));
        }
        match self.kind {
            PrimitiveKind::Pure(func) => func(args),
            PrimitiveKind::Effect(func) => func(args, out),
        }
    }
}

//
// Primitive Implementations
//

fn numeric_operands(args: &[Value]) -> Result<(NumberType, NumberType), Error> {
    match args {
        [a, b] => Ok((a.try_into()?, b.try_into()?)),
        _ => Err(Error::arity_error(2, args.len())),
    }
}

fn boolean_operands(args: &[Value]) -> Result<(bool, bool), Error> {
    match args {
        [a, b] => Ok((a.try_into()?, b.try_into()?)),
        _ => Err(Error::arity_error(2, args.len())),
    }
}

// Macro to generate binary numeric operations
macro_rules! arithmetic {
    ($name:ident, $op:tt) => {
        fn $name(args: &[Value]) -> Result<Value, Error> {
            let (a, b) = numeric_operands(args)?;
            Ok(Value::Number(a $op b))
        }
    };
}

arithmetic!(primitive_add, +);
arithmetic!(primitive_sub, -);
arithmetic!(primitive_mul, *);
arithmetic!(primitive_div, /);

macro_rules! numeric_comparison {
    ($name:ident, $op:tt) => {
        fn $name(args: &[Value]) -> Result<Value, Error> {
            let (a, b) = numeric_operands(args)?;
            Ok(Value::Bool(a $op b))
        }
    };
}

numeric_comparison!(primitive_gt, >);
numeric_comparison!(primitive_ge, >=);
numeric_comparison!(primitive_lt, <);
numeric_comparison!(primitive_le, <=);

fn primitive_equal(args: &[Value]) -> Result<Value, Error> {
    match args {
        [a, b] => Ok(Value::Bool(a == b)),
        _ => Err(Error::arity_error(2, args.len())),
    }
}

fn primitive_not(args: &[Value]) -> Result<Value, Error> {
    match args {
        [a] => Ok(Value::Bool(!bool::try_from(a)?)),
        _ => Err(Error::arity_error(1, args.len())),
    }
}

fn primitive_and(args: &[Value]) -> Result<Value, Error> {
    let (a, b) = boolean_operands(args)?;
    Ok(Value::Bool(a && b))
}

fn primitive_or(args: &[Value]) -> Result<Value, Error> {
    let (a, b) = boolean_operands(args)?;
    Ok(Value::Bool(a || b))
}

fn primitive_print(args: &[Value], out: &mut dyn Write) -> Result<Value, Error> {
    match args {
        [value] => {
            write!(out, "{}", value.printed())?;
            out.flush()?;
            Ok(value.clone())
        }
        _ => Err(Error::arity_error(1, args.len())),
    }
}

/// Global table of all primitives.
static PRIMITIVES: LazyLock<Vec<Primitive>> = LazyLock::new(|| {
    vec![
        // Arithmetic
        Primitive {
            name: "+",
            kind: PrimitiveKind::Pure(primitive_add),
            arity: 2,
        },
        Primitive {
            name: "-",
            kind: PrimitiveKind::Pure(primitive_sub),
            arity: 2,
        },
        Primitive {
            name: "*",
            kind: PrimitiveKind::Pure(primitive_mul),
            arity: 2,
        },
        Primitive {
            name: "/",
            kind: PrimitiveKind::Pure(primitive_div),
            arity: 2,
        },
        // Equality and ordering
        Primitive {
            name: "=",
            kind: PrimitiveKind::Pure(primitive_equal),
            arity: 2,
        },
        Primitive {
            name: ">",
            kind: PrimitiveKind::Pure(primitive_gt),
            arity: 2,
        },
        Primitive {
            name: ">=",
            kind: PrimitiveKind::Pure(primitive_ge),
            arity: 2,
        },
        Primitive {
            name: "<",
            kind: PrimitiveKind::Pure(primitive_lt),
            arity: 2,
        },
        Primitive {
            name: "<=",
            kind: PrimitiveKind::Pure(primitive_le),
            arity: 2,
        },
        // Logic
        Primitive {
            name: "not",
            kind: PrimitiveKind::Pure(primitive_not),
            arity: 1,
        },
        Primitive {
            name: "and",
            kind: PrimitiveKind::Pure(primitive_and),
            arity: 2,
        },
        Primitive {
            name: "or",
            kind: PrimitiveKind::Pure(primitive_or),
            arity: 2,
        },
        // Output
        Primitive {
            name: "print",
            kind: PrimitiveKind::Effect(primitive_print),
            arity: 1,
        },
    ]
});

/// Lazy static map from unmarked name to Primitive (private - use find_primitive)
static PRIMITIVE_NAMES: LazyLock<HashMap<&'static str, &'static Primitive>> =
    LazyLock::new(|| {
        let primitives: &'static [Primitive] = PRIMITIVES.as_slice();
        primitives.iter().map(|p| (p.name, p)).collect()
    });

/// Get all primitives
pub fn get_primitives() -> &'static [Primitive] {
    PRIMITIVES.as_slice()
}

/// Find a primitive by its marked symbol name, e.g. `%+`
pub fn find_primitive(symbol: &str) -> Option<&'static Primitive> {
    symbol
        .strip_prefix(PRIMITIVE_MARKER)
        .and_then(|name| PRIMITIVE_NAMES.get(name).copied())
}

/// Run the primitive named by a marked symbol on evaluated arguments
pub fn call_primitive(symbol: &str, args: &[Value], out: &mut dyn Write) -> Result<Value, Error> {
    match find_primitive(symbol) {
        Some(primitive) => primitive.call(args, out),
        None => Err(Error::UnknownPrimitive(symbol.to_owned())),
    }
}

//! This module defines the element type shared by the reader and the evaluator.
//! The main enum, [`Value`], covers numbers, text, symbols, booleans, lists and the
//! void result of effect-only forms. A list of the shape `(lambda (params...) body)`
//! is the language's function value; [`Value::as_lambda`] recognizes it.
//! Ergonomic helper functions such as [`val`], [`sym`] and [`nil`] are provided for
//! convenient construction in code and tests, and conversion traits cover common Rust
//! literals. Printing comes in two flavors: the canonical `Display` form, which is
//! re-readable, and the [`Printed`] form used by the `print` primitive, which shows
//! top-level text without quotes.

use crate::Error;
use std::fmt;

/// Type alias for number values in interpreter
pub type NumberType = f64;

/// Head symbol of a function value
pub const LAMBDA: &str = "lambda";

/// Core element type in interpreter
///
/// To build an element, use the ergonomic helper functions:
/// - `val(42)` for numbers, `val("text")` for text, `sym("name")` for symbols, `nil()` for empty lists
/// - `val([1, 2, 3])` for homogeneous lists
/// - `val(vec![sym("op"), val(42)])` for mixed lists
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Numbers (always double precision)
    Number(NumberType),
    /// String literals
    Text(String),
    /// Symbols (identifiers)
    Symbol(String),
    /// Boolean values, produced by comparisons
    Bool(bool),
    /// Lists, including function values
    List(Vec<Value>),
    /// Result of `define` and `do`
    Void,
}

/// Borrowed view of a function value `(lambda (params...) body)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lambda<'a> {
    pub params: &'a [Value],
    pub body: &'a Value,
}

impl Lambda<'_> {
    /// Owned function value with the same parameters and body
    pub fn to_value(&self) -> Value {
        Value::lambda(self.params.to_vec(), self.body.clone())
    }
}

impl Value {
    /// Build a function value from a parameter list and a body
    pub fn lambda(params: Vec<Value>, body: Value) -> Value {
        Value::List(vec![sym(LAMBDA), Value::List(params), body])
    }

    /// View this element as a function value, if it has the exact lambda shape
    pub fn as_lambda(&self) -> Option<Lambda<'_>> {
        match self {
            Value::List(elements) => match elements.as_slice() {
                [Value::Symbol(head), Value::List(params), body] if head == LAMBDA => {
                    Some(Lambda { params, body })
                }
                _ => None,
            },
            _ => None,
        }
    }

    pub fn is_lambda(&self) -> bool {
        self.as_lambda().is_some()
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Value::Symbol(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Value::Void)
    }

    /// Wrap this element for output through the `print` primitive
    pub fn printed(&self) -> Printed<'_> {
        Printed(self)
    }

    /// Short name of the variant, used in type error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Text(_) => "text",
            Value::Symbol(_) => "symbol",
            Value::Bool(_) => "boolean",
            Value::List(_) if self.is_lambda() => "function",
            Value::List(_) => "list",
            Value::Void => "void",
        }
    }
}

// From trait implementations for Value - enables .into() conversion
impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! impl_from_number {
    ($num_type:ty) => {
        impl From<$num_type> for Value {
            fn from(n: $num_type) -> Self {
                Value::Number(NumberType::from(n))
            }
        }
    };
}

impl_from_number!(i8);
impl_from_number!(i16);
impl_from_number!(i32);
impl_from_number!(u8);
impl_from_number!(u16);
impl_from_number!(u32);
impl_from_number!(f32);
impl_from_number!(NumberType);

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(|x| x.into()).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(arr: [T; N]) -> Self {
        Value::List(arr.into_iter().map(|x| x.into()).collect())
    }
}

// Fallible conversions from `Value` back into primitive Rust types.

impl TryFrom<&Value> for NumberType {
    type Error = Error;

    fn try_from(value: &Value) -> Result<NumberType, Error> {
        match value {
            Value::Number(n) => Ok(*n),
            other => Err(Error::TypeError(format!(
                "expected number, got {} {other}",
                other.type_name()
            ))),
        }
    }
}

impl TryFrom<&Value> for bool {
    type Error = Error;

    fn try_from(value: &Value) -> Result<bool, Error> {
        match value {
            Value::Bool(b) => Ok(*b),
            other => Err(Error::TypeError(format!(
                "expected boolean, got {} {other}",
                other.type_name()
            ))),
        }
    }
}

/// Helper function for creating symbols - works great in mixed lists!
pub fn sym<S: AsRef<str>>(name: S) -> Value {
    Value::Symbol(name.as_ref().to_owned())
}

/// Helper function for creating Values - works great in mixed lists!
/// Accepts any type that can be converted to Value
pub fn val<T: Into<Value>>(value: T) -> Value {
    value.into()
}

/// Helper function for creating empty lists
pub fn nil() -> Value {
    Value::List(vec![])
}

/// Render a number in double precision decimal form: `10.0`, `1.5`, `-0.25`, `1.0E7`
///
/// Magnitudes outside `[1e-3, 1e7)` switch to scientific notation with an upper-case
/// exponent marker and at least one fractional digit in the mantissa.
pub fn format_number(n: NumberType) -> String {
    if n.is_nan() {
        return "NaN".to_owned();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }

    let magnitude = n.abs();
    if n == 0.0 || (1e-3..1e7).contains(&magnitude) {
        let mut text = format!("{n}");
        if !text.contains('.') {
            text.push_str(".0");
        }
        return text;
    }

    let scientific = format!("{n:e}");
    match scientific.split_once('e') {
        Some((mantissa, exponent)) if mantissa.contains('.') => format!("{mantissa}E{exponent}"),
        Some((mantissa, exponent)) => format!("{mantissa}.0E{exponent}"),
        None => scientific,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Text(s) => write!(f, "\"{s}\""),
            Value::Symbol(s) => write!(f, "{s}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::List(elements) => {
                write!(f, "(")?;
                for (i, elem) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{elem}")?;
                }
                write!(f, ")")
            }
            Value::Void => write!(f, "null"),
        }
    }
}

/// Display adapter for the `print` primitive
///
/// Text at the top level is written verbatim; everything else, including text nested
/// inside lists, uses the canonical form.
#[derive(Debug, Clone, Copy)]
pub struct Printed<'a>(&'a Value);

impl fmt::Display for Printed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Value::Text(s) => write!(f, "{s}"),
            other => write!(f, "{other}"),
        }
    }
}

#[cfg(test)]
mod helper_function_tests {
    use super::*;

    #[test]
    fn test_helper_functions_data_driven() {
        // Test cases as (Value, Value) tuples: (helper_result, expected_value)
        let test_cases = vec![
            (val(42), Value::Number(42.0)),
            (val(-17), Value::Number(-17.0)),
            (val(2.5), Value::Number(2.5)),
            (val(255u8), Value::Number(255.0)),
            (val(true), Value::Bool(true)),
            (val("hello"), Value::Text("hello".to_owned())),
            (val(""), Value::Text(String::new())),
            (sym("print-list"), Value::Symbol("print-list".to_owned())),
            (sym(String::from("-")), Value::Symbol("-".to_owned())),
            (nil(), Value::List(vec![])),
            (
                val([1, 2, 3]),
                Value::List(vec![
                    Value::Number(1.0),
                    Value::Number(2.0),
                    Value::Number(3.0),
                ]),
            ),
            (
                val(vec![sym("define"), sym("nil"), val("null")]),
                Value::List(vec![
                    Value::Symbol("define".to_owned()),
                    Value::Symbol("nil".to_owned()),
                    Value::Text("null".to_owned()),
                ]),
            ),
        ];

        for (i, (actual, expected)) in test_cases.iter().enumerate() {
            assert_eq!(actual, expected, "Test case {} failed", i + 1);
        }
    }

    #[test]
    fn test_number_formatting() {
        let test_cases = [
            (10.0, "10.0"),
            (0.0, "0.0"),
            (-0.0, "-0.0"),
            (1.5, "1.5"),
            (-3.0, "-3.0"),
            (120.0, "120.0"),
            (0.001, "0.001"),
            (1e7, "1.0E7"),
            (1.5e-4, "1.5E-4"),
            (f64::INFINITY, "Infinity"),
            (f64::NAN, "NaN"),
        ];

        for (n, expected) in test_cases {
            assert_eq!(format_number(n), expected, "formatting {n}");
        }
    }

    #[test]
    fn test_lambda_recognition() {
        let identity = Value::lambda(vec![sym("x")], sym("x"));
        let lambda = identity.as_lambda().expect("lambda shape");
        assert_eq!(lambda.params, &[sym("x")]);
        assert_eq!(lambda.body, &sym("x"));
        assert_eq!(identity.type_name(), "function");

        // Wrong length or a non-list parameter position is not a function value
        assert!(!val(vec![sym("lambda"), nil()]).is_lambda());
        assert!(!val(vec![sym("lambda"), sym("x"), sym("x")]).is_lambda());
        assert!(!val(vec![sym("define"), nil(), sym("x")]).is_lambda());
        assert!(!sym("lambda").is_lambda());
    }

    #[test]
    fn test_canonical_and_printed_forms() {
        let curried = Value::lambda(
            vec![sym("b")],
            val(vec![sym("+"), val(1), sym("b")]),
        );
        assert_eq!(curried.to_string(), "(lambda (b) (+ 1.0 b))");

        let text = val("hello world");
        assert_eq!(text.to_string(), "\"hello world\"");
        assert_eq!(text.printed().to_string(), "hello world");

        let nested = val(vec![val("a"), val(false)]);
        assert_eq!(nested.printed().to_string(), "(\"a\" false)");
        assert_eq!(Value::Void.printed().to_string(), "null");
    }

    #[test]
    fn test_numeric_conversions() {
        assert_eq!(NumberType::try_from(&val(4)), Ok(4.0));
        assert_eq!(bool::try_from(&val(true)), Ok(true));
        assert!(matches!(
            NumberType::try_from(&val("4")),
            Err(Error::TypeError(_))
        ));
        assert!(matches!(bool::try_from(&val(1)), Err(Error::TypeError(_))));
    }
}

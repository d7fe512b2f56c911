//! End-to-end scenarios driven through `Interpreter::evaluate`, asserting on the exact
//! text written to the output channel.

#![expect(clippy::unwrap_used)] // test code OK

use sublisp::ast::Value;
use sublisp::{Config, Error, Interpreter, MAX_PARSE_DEPTH, ParseError, ParseErrorKind};
use test_log::test;

/// Evaluate `source` in a fresh interpreter and return everything it printed
fn output_of(source: &str) -> String {
    let mut interpreter = Interpreter::with_output(Vec::new()).unwrap();
    interpreter.evaluate(source).unwrap();
    interpreter.take_output()
}

const LIST_PRINTER: &str = "
(define print-list (lambda (list)
  (if (= (left list) nil)
    (print \"end\")
    (do
      (print (left list))
      (print \", \")
      (print-list (right list))))))
";

#[test]
fn variable() {
    assert_eq!(output_of("(define a 10)\na"), "10.0");
}

#[test]
fn print_string() {
    assert_eq!(output_of("(print \"hello world\")"), "hello world");
}

#[test]
fn print_variable() {
    assert_eq!(
        output_of("(define a \"hello world\")\n(print a)"),
        "hello world"
    );
}

#[test]
fn print_lambda() {
    assert_eq!(
        output_of("((lambda (x) (print x)) \"hello from lambda\")"),
        "hello from lambda"
    );
}

#[test]
fn print_sum() {
    assert_eq!(output_of("((lambda (x y) (print (+ x y))) 10 11)"), "21.0");
}

#[test]
fn print_identity() {
    assert_eq!(output_of("(print ((lambda (x) x) \"identity\"))"), "identity");
}

#[test]
fn print_function() {
    assert_eq!(
        output_of("(define add-5 (lambda (x) (+ x 5)))\n(print (add-5 10))"),
        "15.0"
    );
}

#[test]
fn print_high_order_function() {
    assert_eq!(
        output_of(
            "(define make-adder (lambda (x) (lambda (y) (+ x y))))\n\
             (print ((make-adder 5) 10))"
        ),
        "15.0"
    );
}

#[test]
fn print_input_function() {
    assert_eq!(
        output_of(
            "(define print-f (lambda (f) (print (f))))\n\
             (print-f (lambda () \"hello from input function\"))"
        ),
        "hello from input function"
    );
}

#[test]
fn print_pair() {
    let source = "
(define print-pair (lambda (pair)
  (do
    (print (left pair))
    (print \", \")
    (print (right pair)))))
(define one-two (pair 1 2))
(print-pair one-two)";
    assert_eq!(output_of(source), "1.0, 2.0");
}

#[test]
fn print_complete_list() {
    let source = format!(
        "{LIST_PRINTER}
(define list (pair 1 (pair 2 (pair 3 (pair 4 nil)))))
(print-list list)"
    );
    assert_eq!(output_of(&source), "1.0, 2.0, 3.0, 4.0, end");
}

#[test]
fn print_reverse_list() {
    let source = format!(
        "{LIST_PRINTER}
(define (count-down n)
  (if (= n 0)
    nil
    (pair n (count-down (decrement n)))))
(print-list (count-down 3))"
    );
    assert_eq!(output_of(&source), "3.0, 2.0, 1.0, end");
}

#[test]
fn print_conditional() {
    assert_eq!(
        output_of(
            "(define foo (lambda (x) (if (= x 0) (print \"true\") (print \"false\"))))\n\
             (foo 0)\n\
             (print \", \")\n\
             (foo 1)"
        ),
        "true, false"
    );
}

#[test]
fn sequential_let() {
    assert_eq!(
        output_of("(print (let ((x 10) (x (increment x))) x))"),
        "11.0"
    );
}

#[test]
fn recursive_factorial() {
    assert_eq!(
        output_of(
            "(define (f n) (if (= n 0) 1 (* n (f (decrement n)))))\n\
             (print (f 5))"
        ),
        "120.0"
    );
}

#[test]
fn outer_definition_does_not_reach_parameter() {
    assert_eq!(
        output_of("(define x 10)(define f (lambda (x) x))(print (f 5))"),
        "5.0"
    );
}

#[test]
fn same_variable_names() {
    let source = "
(define (add-one x) (+ x 1))
(define (double x) (* x 2))
(define (both x) (add-one (double x)))
(print (both 5))
(print \" \")
(print ((lambda (x) (both x)) 1))";
    assert_eq!(output_of(source), "11.0 3.0");
}

#[test]
fn partial_application_prints_remaining_lambda() {
    let mut interpreter = Interpreter::with_output(Vec::new()).unwrap();
    let values = interpreter
        .evaluate("(define (add a b) (+ a b)) (add 1) ((add 1) 2)")
        .unwrap();
    let printed: Vec<String> = values.iter().map(ToString::to_string).collect();
    assert_eq!(printed, ["null", "(lambda (b) (+ 1.0 b))", "3.0"]);

    interpreter.evaluate("(print (add 1))").unwrap();
    assert_eq!(interpreter.take_output(), "(lambda (b) (+ 1.0 b))");
}

#[test]
fn curried_let_body_prints_and_evaluates() {
    let mut interpreter = Interpreter::with_output(Vec::new()).unwrap();
    let values = interpreter
        .evaluate(
            "(define (scale k v) (let ((k (* k 2)) (w k)) (+ w v)))
             (scale 3)
             ((scale 3) 1)",
        )
        .unwrap();
    assert_eq!(
        values[1].to_string(),
        "(lambda (v) (let ((k (* 3.0 2.0)) (w k)) (+ w v)))"
    );
    assert_eq!(values[2], Value::Number(7.0));
}

#[test]
fn named_call_evaluates_each_argument_once() {
    assert_eq!(
        output_of("(define (twice x) (do x x)) (twice (print \"a\"))"),
        "a"
    );
    assert_eq!(
        output_of(
            "(define (both a b) (do b a))\n\
             (both (print \"1\") (print \"2\"))"
        ),
        "12"
    );
}

#[test]
fn curried_result_outlives_the_let_it_was_made_in() {
    let mut interpreter = Interpreter::with_output(Vec::new()).unwrap();
    let values = interpreter
        .evaluate(
            "(define (add a b) (+ a b))
             (define g (let ((x 10)) (add (+ x 1))))
             (g 1)",
        )
        .unwrap();
    assert_eq!(values[2], Value::Number(12.0));

    interpreter.evaluate("(print g)").unwrap();
    assert_eq!(interpreter.take_output(), "(lambda (b) (+ 11.0 b))");
}

#[test]
fn errors_abort_only_the_current_call() {
    let mut interpreter = Interpreter::with_output(Vec::new()).unwrap();

    let err = interpreter.evaluate("(print \"before\") (oops 1) (print \"after\")");
    assert_eq!(err, Err(Error::UndefinedOperator("oops".to_owned())));
    assert_eq!(interpreter.take_output(), "before");

    assert!(matches!(
        interpreter.evaluate("(define %print 1)"),
        Err(Error::PrimitiveRedefinition(_))
    ));
    assert!(matches!(
        interpreter.evaluate("(%missing 1)"),
        Err(Error::UnknownPrimitive(_))
    ));

    interpreter.evaluate("(print \"still running\")").unwrap();
    assert_eq!(interpreter.take_output(), "still running");
}

#[test]
fn unbounded_recursion_is_reported() {
    let config = Config {
        max_eval_depth: 128,
        ..Config::default()
    };
    let mut interpreter = Interpreter::with_config(config, Vec::new()).unwrap();
    interpreter.evaluate("(define (forever n) (forever n))").unwrap();
    assert_eq!(
        interpreter.evaluate("(forever 1)"),
        Err(Error::StackExhausted { limit: 128 })
    );
}

#[test]
fn overly_nested_input_is_rejected() {
    let mut interpreter = Interpreter::with_output(Vec::new()).unwrap();
    let depth = MAX_PARSE_DEPTH + 1;
    let source = format!("{}1{}", "(+ 1 ".repeat(depth), ")".repeat(depth));

    assert!(matches!(
        interpreter.evaluate(&source),
        Err(Error::ParseError(ParseError {
            kind: ParseErrorKind::TooDeeplyNested,
            ..
        }))
    ));
    assert!(interpreter.is_idle());

    interpreter.evaluate("(print \"ok\")").unwrap();
    assert_eq!(interpreter.take_output(), "ok");
}

#[test]
fn unbalanced_input_stays_pending() {
    let mut interpreter = Interpreter::with_output(Vec::new()).unwrap();
    assert_eq!(interpreter.evaluate("(print (+ 1 2)").unwrap(), vec![]);
    assert!(!interpreter.is_idle());
    assert_eq!(interpreter.take_output(), "");

    interpreter.evaluate(")").unwrap();
    assert!(interpreter.is_idle());
    assert_eq!(interpreter.take_output(), "3.0");
}

#[test]
fn into_output_returns_the_channel() {
    let mut interpreter = Interpreter::with_output(Vec::new()).unwrap();
    interpreter.evaluate("(print 1) (print \"two\")").unwrap();
    interpreter.output_mut().extend_from_slice(b"!");
    assert_eq!(interpreter.output().len(), 7);
    assert_eq!(interpreter.into_output(), b"1.0two!".to_vec());
}

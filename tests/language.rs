//! End-to-end programs run through the public pipeline

use pretty_assertions::assert_eq;

use uniform_lang::error::RuntimeErrorKind;
use uniform_lang::{parse, BufferHost, Session, UniformError, Value};

fn num(n: f64) -> Value {
    Value::Number(n)
}

fn list(values: Vec<Value>) -> Value {
    Value::List(values)
}

fn session() -> Session<BufferHost> {
    Session::with_host(BufferHost::new())
}

/// Value of the last top-level statement
fn eval(source: &str) -> Result<Value, UniformError> {
    match session().run("<test>", source)? {
        Some(Value::List(mut values)) => Ok(values.pop().unwrap_or(Value::NULL)),
        other => panic!("unexpected program result {:?}", other),
    }
}

#[test]
fn test_number_arithmetic_matches_host_floats() {
    let cases = [
        ("0.1 + 0.2", 0.1 + 0.2),
        ("7 - 10.5", 7.0 - 10.5),
        ("1.5 * 4", 6.0),
        ("2 ^ 0.5", 2f64.powf(0.5)),
        ("1 / 3", 1.0 / 3.0),
        ("-2 ^ 2", -4.0),
    ];

    for (source, expected) in cases {
        assert_eq!(eval(source).unwrap(), num(expected), "{}", source);
    }
}

#[test]
fn test_division_by_zero_is_an_error() {
    for source in ["1 / 0", "0 / 0", "5 / (2 - 2)", "push z => 0\n3 / z"] {
        let err = eval(source).unwrap_err();
        assert_eq!(err.runtime_kind(), Some(RuntimeErrorKind::DivisionByZero), "{}", source);
    }
}

#[test]
fn test_push_binds_and_returns() {
    let mut session = session();
    assert_eq!(session.run("<test>", "push x => 5").unwrap(), Some(list(vec![num(5.0)])));
    assert_eq!(session.get("x"), Some(&num(5.0)));
}

#[test]
fn test_reassignment_mutates_existing_binding() {
    let mut session = session();
    session.run("<test>", "push x => 5").unwrap();
    session.run("<test>", "x => 6").unwrap();
    assert_eq!(session.get("x"), Some(&num(6.0)));
}

#[test]
fn test_reassignment_reaches_enclosing_scope_of_call() {
    let source = "push count => 0\ndefine bump() => count => count + 1\nbump()\nbump()\ncount";
    assert_eq!(eval(source).unwrap(), num(2.0));
}

#[test]
fn test_reassigning_undeclared_name_is_a_silent_noop() {
    let mut session = session();
    assert_eq!(
        session.run("<test>", "ghost => 9").unwrap(),
        Some(list(vec![num(9.0)]))
    );
    assert_eq!(session.get("ghost"), None);

    let err = session.run("<test>", "ghost").unwrap_err();
    assert_eq!(err.runtime_kind(), Some(RuntimeErrorKind::UndefinedVariable));
}

#[test]
fn test_reassignment_does_not_reach_past_one_parent() {
    let source = "\
push total => 1
define outer()
  define inner() => total => 50
  inner()
fin
outer()
total";
    assert_eq!(eval(source).unwrap(), num(1.0));
}

#[test]
fn test_if_expressions() {
    assert_eq!(eval("if 0 do 1 else 2").unwrap(), num(2.0));
    assert_eq!(eval("if 1 do 1 else 2").unwrap(), num(1.0));
    assert_eq!(eval("if 0 do 1").unwrap(), Value::NULL);
}

#[test]
fn test_block_if_chain() {
    let source = "\
push grade => 72
push label => \"\"
if grade >= 90 do
  label => \"A\"
elif grade >= 70 do
  label => \"B\"
else
  label => \"C\"
fin
label";
    assert_eq!(eval(source).unwrap(), Value::String("B".to_string()));
}

#[test]
fn test_for_loop_forms() {
    assert_eq!(
        eval("for i => 0 until 3 do i").unwrap(),
        list(vec![num(0.0), num(1.0), num(2.0)])
    );

    let block = "push y => 0\nfor i => 0 until 3 inc 1 do\n  push y => y\n  y => y + i\nfin";
    assert_eq!(eval(block).unwrap(), Value::NULL);
}

#[test]
fn test_for_loop_direction_follows_start_sign() {
    assert_eq!(
        eval("for i => -1 until -3 inc -1 do i").unwrap(),
        list(vec![num(-1.0), num(-2.0)])
    );
    // start is non-negative, so the loop counts up and never runs
    assert_eq!(eval("for i => 3 until 0 inc -1 do i").unwrap(), list(vec![]));
}

#[test]
fn test_while_accumulates_values() {
    let source = "push n => 1\nwhile n < 20 do n => n * 3";
    assert_eq!(eval(source).unwrap(), list(vec![num(3.0), num(9.0), num(27.0)]));
}

#[test]
fn test_functions_and_arity() {
    assert_eq!(eval("define add(a, b) => a + b\nadd(2, 3)").unwrap(), num(5.0));

    let err = eval("define add(a, b) => a + b\nadd(2)").unwrap_err();
    assert_eq!(err.runtime_kind(), Some(RuntimeErrorKind::ArityMismatch));
    assert_eq!(err.details(), "1 too few args passed into 'add'");

    let err = eval("define add(a, b) => a + b\nadd(1, 2, 3, 4)").unwrap_err();
    assert_eq!(err.details(), "2 too many args passed into 'add'");
}

#[test]
fn test_functions_are_values() {
    let source = "\
define twice(f, x) => f(f(x))
twice(define (n) => n * 10, 3)";
    assert_eq!(eval(source).unwrap(), num(300.0));
    assert_eq!(eval("define named() => 1").unwrap().to_string(), "<function named>");
    assert_eq!(eval("define () => 1").unwrap().to_string(), "<function <anonymous>>");
}

#[test]
fn test_parameters_shadow_globals() {
    let source = "push a => 1\ndefine f(a) => a * 100\nf(5) + a";
    assert_eq!(eval(source).unwrap(), num(501.0));
}

#[test]
fn test_lists_and_strings() {
    assert_eq!(
        eval("[1, \"two\", [3]]").unwrap().to_string(),
        "[1, \"two\", [3]]"
    );
    assert_eq!(eval("\"ab\" + \"cd\"").unwrap(), Value::String("abcd".to_string()));
    assert_eq!(eval("\"a\" == \"a\"").unwrap(), Value::TRUE);
}

#[test]
fn test_logical_operators_on_strings_accept_any_operand() {
    assert_eq!(eval("\"a\" & 1").unwrap(), Value::TRUE);
    assert_eq!(eval("\"a\" | []").unwrap(), Value::TRUE);
    assert_eq!(eval("\"\" & [1]").unwrap(), Value::FALSE);

    let err = eval("1 & \"a\"").unwrap_err();
    assert_eq!(err.details(), "Illegal operation: Number & String");
}

#[test]
fn test_illegal_operations_are_reported() {
    for source in [
        "\"a\" + 1",
        "1 + \"a\"",
        "[1] * 2",
        "\"a\" < \"b\"",
        "1 == \"a\"",
        ":\"a\"",
        "print - 1",
    ] {
        let err = eval(source).unwrap_err();
        assert_eq!(
            err.runtime_kind(),
            Some(RuntimeErrorKind::IllegalOperation),
            "{}",
            source
        );
    }
}

#[test]
fn test_builtins_through_host() {
    let mut session = Session::with_host(
        BufferHost::new()
            .with_input(["7"])
            .with_randoms([0.42]),
    );

    let source = "\
push answer => capture(\"guess: \")
print(\"you said \" + answer)
print(round(random() * 10))
print(round(2.5))";
    session.run("<test>", source).unwrap();

    let host = session.into_host();
    assert_eq!(host.prompts, vec!["guess: "]);
    assert_eq!(host.output, vec!["you said 7", "4", "3"]);
}

#[test]
fn test_runtime_report_has_traceback() {
    let err = eval("define half(n) => n / 0\n\nhalf(4)").unwrap_err();
    let carets = format!("{}^", " ".repeat(22));
    let expected = [
        "Traceback (most recent call last):",
        "  File <test>, line 3, in <program>",
        "  File <test>, line 1, in half",
        "Runtime Error: Division by zero",
        "",
        "define half(n) => n / 0",
        carets.as_str(),
    ]
    .join("\n");
    assert_eq!(err.report(), expected);
}

#[test]
fn test_syntax_error_report() {
    let err = eval("push x 5").unwrap_err();
    assert_eq!(err.name(), "Invalid Syntax");
    assert_eq!(err.details(), "Expected '=>'");
    assert!(err.traceback().is_empty());
}

#[test]
fn test_errors_stop_evaluation() {
    let mut session = session();
    let err = session.run("<test>", "print(1)\nmissing\nprint(2)").unwrap_err();
    assert_eq!(err.details(), "'missing' is not defined");
    assert_eq!(session.host().output, vec!["1"]);
}

#[test]
fn test_canonical_form_round_trips() {
    let programs = [
        "1 + 2 * 3 - 4 / 2",
        "-(2 ^ 3) ^ 2",
        "push x => [1, 2, 3]\nx",
        "if 0 do 1 elif 1 do 2 else 3",
        "for i => 0 until 10 inc 2 do i * i",
        "push n => 0\nwhile n < 4 do n => n + 1",
        "define add(a, b) => a + b\nadd(2, 3)",
        "push s => 0\nfor i => 0 until 5 do\n  s => s + i\nfin\ns",
        ":(1 & 0) | 0",
    ];

    for source in programs {
        let canonical = parse("<test>", source).unwrap().to_string();
        assert_eq!(eval(&canonical).unwrap(), eval(source).unwrap(), "{}", canonical);
    }
}

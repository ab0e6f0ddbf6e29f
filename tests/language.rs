//! End-to-end behaviour of the language through the session API

use aurora::{run, ErrorKind, Session, Value};

fn eval(session: &mut Session, source: &str) -> Option<Value> {
    session.evaluate("<stdin>", source).expect("evaluation failed")
}

fn show(source: &str) -> String {
    match run(source) {
        Ok(Some(value)) => value.to_string(),
        Ok(None) => "<none>".to_string(),
        Err(e) => e.details(),
    }
}

#[test]
fn test_arithmetic_precedence() {
    assert_eq!(show("2+3*4"), "14");
    assert_eq!(show("2^3^2"), "512");
    assert_eq!(show("(2+3)*4"), "20");
    assert_eq!(show("8 / 2 / 2"), "2.0");
    assert_eq!(show("2 * -3"), "-6");
    assert_eq!(show("--4"), "4");
}

#[test]
fn test_division_by_zero_regardless_of_dividend() {
    for source in ["1 / 0", "0 / 0", "2.5 / 0", "-7 / 0.0"] {
        let err = run(source).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DivisionByZero, "{}", source);
        assert_eq!(err.details(), "Division by zero");
        assert_eq!(err.kind.name(), "RuntimeErr");
    }
}

#[test]
fn test_set_then_read() {
    let mut session = Session::new();
    eval(&mut session, "set x = 5");
    assert_eq!(eval(&mut session, "x+1").unwrap().to_string(), "6");
}

#[test]
fn test_undefined_name() {
    let err = run("y").unwrap_err();
    assert_eq!(err.details(), "'y' is not defined");
}

#[test]
fn test_if_truthiness() {
    assert_eq!(show("if 1 then 10 else 20"), "10");
    assert_eq!(show("if 0 then 10 else 20"), "20");
    assert_eq!(show("if -1 then 10 else 20"), "20");
    assert_eq!(show("if null then 10 else 20"), "20");
    assert_eq!(show("if true then 10 else 20"), "10");
    assert_eq!(show("if 0 then 1 eli 0 then 2 eli 7 then 3 else 4"), "3");
    assert_eq!(show("if \"\" then 1 else 2"), "2");
}

#[test]
fn test_comparisons_and_logic() {
    assert_eq!(show("1 < 2"), "1");
    assert_eq!(show("1 == 2"), "0");
    assert_eq!(show("3 != 2 and 2 >= 2"), "1");
    assert_eq!(show("0 or 0"), "0");
    assert_eq!(show("not 1 == 1"), "0");
}

#[test]
fn test_strings() {
    assert_eq!(show("\"ab\" + \"cd\""), "\"abcd\"");
    assert_eq!(show("\"-\" * 3"), "\"---\"");
    assert_eq!(show("\"a\" + 1"), "Illegal operation");
}

#[test]
fn test_huge_string_repetition_is_an_error() {
    assert_eq!(show("\"abc\" * 9223372036854775807"), "Illegal operation");

    // The session stays usable afterwards
    let mut session = Session::new();
    assert!(session.evaluate("<stdin>", "\"abc\" * 9223372036854775807").is_err());
    assert_eq!(eval(&mut session, "\"ab\" * 2").unwrap().to_string(), "\"abab\"");
}

#[test]
fn test_non_ascii_letters_are_illegal() {
    let err = run("set \u{e9} = 1").unwrap_err();
    assert_eq!(err.kind, ErrorKind::IllegalCharacter('\u{e9}'));
    assert_eq!(err.span.start.column, 4);
    assert_eq!(show("set caf\u{e9} = 1"), "'\u{e9}'");
}

#[test]
fn test_large_floats_display_in_scientific_form() {
    assert_eq!(show("2 ^ 70"), "1.1805916207174113e+21");
    assert_eq!(show("1 / 3"), "0.3333333333333333");
}

#[test]
fn test_function_definition_and_call() {
    let mut session = Session::new();
    let def = eval(&mut session, "fun add(a,b) -> a+b").unwrap();
    assert_eq!(def.to_string(), "<function add>");
    assert_eq!(eval(&mut session, "add(2,3)").unwrap().to_string(), "5");

    let err = session.evaluate("<stdin>", "add(1)").unwrap_err();
    assert_eq!(err.details(), "Too few args (1/2 needed) passed into 'add'");
    assert!(err.details().contains("add") && err.details().contains("1/2"));
}

#[test]
fn test_for_loop_end_is_exclusive() {
    let mut session = Session::new();
    assert!(eval(&mut session, "for i = 0 to 3 then set x = i").is_none());
    assert_eq!(session.get("x").unwrap().to_string(), "2");

    eval(&mut session, "for i = 0 to 3 step -1 then set y = i");
    assert!(session.get("y").is_none());
}

#[test]
fn test_while_loop() {
    let mut session = Session::new();
    eval(&mut session, "set n = 1");
    eval(&mut session, "while n < 100 then set n = n * 2");
    assert_eq!(session.get("n").unwrap().to_string(), "128");
}

#[test]
fn test_bindings_before_runtime_error_persist() {
    let mut session = Session::new();
    let err = session
        .evaluate("<stdin>", "set a = 1 + (set b = 2) + c")
        .unwrap_err();
    assert_eq!(err.details(), "'c' is not defined");
    assert!(session.get("a").is_none());
    assert_eq!(session.get("b").unwrap().to_string(), "2");
}

#[test]
fn test_lexical_error_stops_before_evaluation() {
    let mut session = Session::new();
    let err = session.evaluate("<stdin>", "set x = 1 @").unwrap_err();
    assert_eq!(err.kind, ErrorKind::IllegalCharacter('@'));
    assert_eq!(err.span.end.index - err.span.start.index, 1);
    assert!(session.get("x").is_none());
}

#[test]
fn test_syntax_error_stops_before_evaluation() {
    let mut session = Session::new();
    let err = session.evaluate("<stdin>", "set x = 1 )").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidSyntax(_)));
    assert!(session.get("x").is_none());
}

#[test]
fn test_multiline_source() {
    let mut session = Session::new();
    let value = eval(&mut session, "set total = 0\n+ 5\n* 2");
    assert_eq!(value.unwrap().to_string(), "10");
}

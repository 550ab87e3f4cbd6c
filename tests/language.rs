use std::fs;

use pretty_assertions::assert_eq;
use quill::{
    Environment, Error, Interpreter, Outcome, Value,
    error::RuntimeError,
    interpreter::host::{MemoryLoader, Output},
    run_source,
};
use walkdir::WalkDir;

#[test]
fn sample_scripts_work() {
    let mut count = 0;

    for entry in WalkDir::new("tests/scripts").into_iter()
                                              .filter_map(Result::ok)
                                              .filter(|e| e.path().extension().is_some_and(|ext| ext == "ql"))
    {
        let path = entry.path();
        let source = fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"));
        count += 1;

        let mut interpreter = Interpreter::new().with_output(Output::buffer());
        match interpreter.run(&source, &Environment::new()) {
            Ok(Outcome::Completed(_) | Outcome::Exited(0)) => {},
            Ok(Outcome::Exited(code)) => panic!("Script {path:?} exited with status {code}"),
            Err(e) => panic!("Script {path:?} failed:\n{e}"),
        }
    }

    assert!(count > 0, "No scripts found in tests/scripts");
}

fn assert_success(src: &str) {
    if let Err(e) = run(src) {
        panic!("Script failed: {e}");
    }
}

fn assert_failure(src: &str) {
    assert!(run(src).is_err(), "Script succeeded but was expected to fail");
}

fn run(src: &str) -> Result<Outcome, Error> {
    Interpreter::new().with_output(Output::buffer())
                      .run(src, &Environment::new())
}

fn value(src: &str) -> Value {
    match run(src) {
        Ok(Outcome::Completed(value)) => value,
        other => panic!("expected a value, got {other:?}"),
    }
}

#[test]
fn precedence() {
    assert_eq!(value("1 + 2 * 3"), Value::Integer(7));
    assert_eq!(value("(1 + 2) * 3"), Value::Integer(9));
    assert_success("assert 2 * 3 - 4 / 2 == 4");
    assert_success("assert -2 * -2 == 4");
    assert_success("assert !false && 1 < 2 == true");
}

#[test]
fn closure_capture_survives_scope_exit() {
    assert_success("function make_adder(n) { return function(x) { return x + n } }
                    add5 = make_adder(5);
                    assert add5(10) == 15;");
    assert_success("function pair() {
                        count = 0;
                        inc = function() { extern count = count + 1; return count };
                        get = function() { return count };
                        return [inc, get]
                    }
                    p = pair();
                    p[0](); p[0]();
                    assert p[1]() == 2;");
}

#[test]
fn extern_rebinding() {
    assert_success("x = 1;
                    function f() { extern x = 5 }
                    f();
                    assert x == 5;");
    assert_success("x = 1;
                    function f() { x = 2; return x }
                    assert f() == 2;
                    assert x == 1;");
    assert_failure("function f() { extern x = 5 } f()");
}

#[test]
fn structural_copy_on_concatenation() {
    assert_success("a = [1, 2]; b = [3, 4]; c = a + b;
                    assert c == [1, 2, 3, 4];
                    a[0] = 100; b[1] = 100;
                    assert c == [1, 2, 3, 4];
                    assert a == [100, 2];");
    assert_success(r#"o = {"a": [1]}; m = o + {"b": 2};
                      o.a[0] = 5;
                      assert m.a[0] == 1;
                      assert m == {"b": 2, "a": [1]};"#);
}

#[test]
fn division_and_modulo_by_zero() {
    assert!(matches!(run("5 / 0"), Err(Error::Runtime(RuntimeError::DivisionByZero { .. }))));
    assert!(matches!(run("5 % 0"), Err(Error::Runtime(RuntimeError::ModuloByZero { .. }))));
    assert_eq!(value("5.0 / 2"), Value::Real(2.5));
}

#[test]
fn bounds_and_missing_keys() {
    assert!(matches!(run("a = [1, 2, 3]; a[3]"),
                     Err(Error::Runtime(RuntimeError::IndexOutOfBounds { .. }))));
    assert!(matches!(run("a = [1, 2, 3]; a[-1]"),
                     Err(Error::Runtime(RuntimeError::IndexOutOfBounds { .. }))));
    assert!(matches!(run(r#"o = {"a": 1}; o["b"]"#),
                     Err(Error::Runtime(RuntimeError::MissingKey { .. }))));
}

#[test]
fn control_flow() {
    assert_eq!(value("while (true) { break }"), Value::Null);
    assert_eq!(value("function f(){ return 1; return 2 } f()"), Value::Integer(1));
    assert_eq!(run("function f() { while (true) { if (true) { exit 7 } } }
                    i = 0;
                    while (i < 3) { f(); i = i + 1 }")
               .unwrap(),
               Outcome::Exited(7));
    assert_failure("return 1");
    assert_failure("break");
}

#[test]
fn break_and_continue_inside_called_functions_reach_the_callers_loop() {
    assert_eq!(value("function stop() { break }
                      i = 0;
                      while (true) { i = i + 1; if (i == 3) { stop() } }
                      i"),
               Value::Integer(3));
    assert_failure("function stop() { break } stop()");
}

#[test]
fn builtins() {
    assert_success(r#"assert len("héllo") == 5;
                      assert len([1, 2]) == 2;
                      assert len({"a": 1}) == 1;
                      assert str(1.5) == "1.5";
                      assert str([1, "a"]) == "[1, \"a\"]";
                      assert int("  42 ") == 42;
                      assert int(3.9) == 3;
                      assert int(true) == 1;
                      assert float("2.5") == 2.5;
                      assert float(2) == 2.0;
                      assert print("x") == null;"#);
    assert_failure(r#"int("forty-two")"#);
    assert_failure("len(5)");
}

#[test]
fn print_output() {
    let output = Output::buffer();
    Interpreter::new().with_output(output.clone())
                      .run(r#"print 1 + 1; print "hi"; print 2.0; print {"k": [null, true]}; print"#,
                           &Environment::new())
                      .unwrap();
    assert_eq!(output.contents(), "2\nhi\n2.0\n{\"k\": [null, true]}\n\n");
}

#[test]
fn imports_share_the_importers_scope() {
    let loader = MemoryLoader::new().with_file("math.ql", "function square(x) { return x * x }\nbase = 3;");
    let mut interpreter = Interpreter::new().with_output(Output::buffer())
                                            .with_loader(Box::new(loader));
    let outcome = interpreter.run("import \"ma\" + \"th.ql\"; square(base)", &Environment::new())
                             .unwrap();
    assert_eq!(outcome, Outcome::Completed(Value::Integer(9)));
}

#[test]
fn syntax_errors() {
    assert!(matches!(run("x = 1 y = 2"), Err(Error::Parse(_))));
    assert!(matches!(run("if x { }"), Err(Error::Parse(_))));
    assert!(matches!(run("1 + 2 }"), Err(Error::Parse(_))));
    assert!(matches!(run("x = @"), Err(Error::Lex(_))));
}

#[test]
fn run_source_reports_exit() {
    assert_eq!(run_source("exit 3").unwrap(), Outcome::Exited(3));
}

#[test]
fn error_messages_name_the_line() {
    let message = run("x = 1;\ny = x + \"a\"").unwrap_err().to_string();
    assert!(message.contains("line 2"), "{message}");
}

#[test]
fn cyclic_containers_compare_without_recursing_forever() {
    assert_success("a = [1]; a[0] = a; b = [1]; b[0] = b;
                    assert a == b;
                    c = [1, 2]; c[0] = c;
                    assert a != c;");
    assert_success(r#"o = {"k": 1}; o.me = o; p = {"k": 1}; p.me = p;
                      assert o == p;
                      p.k = 2;
                      assert o != p;"#);
}

#[test]
fn deeply_nested_values_print_and_drop() {
    assert_success("a = []; i = 0;
                    while (i < 100000) { a = [a]; i = i + 1 }
                    s = str(a);
                    assert len(s) == 200002;
                    b = a + [];
                    assert b[0] == a;
                    a = null; b = null; s = null;");
}

#[test]
fn oversized_string_repetition_fails() {
    assert!(matches!(run(r#"s = "ab" * 1000000000000000000; len(s)"#),
                     Err(Error::Runtime(RuntimeError::Overflow { line: 1 }))));
    assert_success(r#"assert "ab" * 3 == "ababab";"#);
}

#[test]
fn recursive_imports_hit_the_depth_limit() {
    let loader = MemoryLoader::new().with_file("self.ql", "import \"self.ql\"")
                                    .with_file("a.ql", "import \"b.ql\"")
                                    .with_file("b.ql", "import \"a.ql\"");
    let mut interpreter = Interpreter::new().with_output(Output::buffer())
                                            .with_loader(Box::new(loader));
    for source in ["import \"self.ql\"", "import \"a.ql\""] {
        assert!(matches!(interpreter.run(source, &Environment::new()),
                         Err(Error::Runtime(RuntimeError::StackOverflow { .. }))));
    }
    assert_eq!(interpreter.run("1", &Environment::new()).unwrap(),
               Outcome::Completed(Value::Integer(1)));
}

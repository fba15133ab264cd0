use testmynb_core::errors::ExceptionKind;

use super::*;

fn run(source: &str) -> Result<Namespace, RaisedException> {
    let mut namespace = Namespace::default();
    Interpreter::with_output(SharedBuffer::default()).execute(source, &mut namespace)?;
    Ok(namespace)
}

fn eval_repr(source: &str, name: &str) -> String {
    match run(source) {
        Ok(namespace) => namespace.get(name).map(|v| v.repr()).unwrap_or_default(),
        Err(err) => panic!("cell raised:\n{}", err.traceback),
    }
}

fn raise(source: &str) -> RaisedException {
    match run(source) {
        Ok(_) => panic!("cell did not raise"),
        Err(err) => err,
    }
}

fn output(source: &str) -> String {
    let buffer = SharedBuffer::default();
    let mut interpreter = Interpreter::with_output(buffer.clone());
    if let Err(err) = interpreter.execute(source, &mut Namespace::default()) {
        panic!("cell raised:\n{}", err.traceback);
    }
    buffer.contents()
}

// ============================================================================
// Expressions
// ============================================================================

#[test]
fn test_arithmetic_follows_python_semantics() {
    assert_eq!(eval_repr("x = 7 // -2\n", "x"), "-4");
    assert_eq!(eval_repr("x = -7 % 3\n", "x"), "2");
    assert_eq!(eval_repr("x = 1 / 4\n", "x"), "0.25");
    assert_eq!(eval_repr("x = 2 ** 10\n", "x"), "1024");
    assert_eq!(eval_repr("x = 2 ** -1\n", "x"), "0.5");
    assert_eq!(eval_repr("x = 0.1 + 0.2\n", "x"), "0.30000000000000004");
    assert_eq!(eval_repr("x = True + True\n", "x"), "2");
}

#[test]
fn test_chained_comparisons_and_boolean_operands() {
    assert_eq!(eval_repr("x = 1 < 2 <= 2 != 3\n", "x"), "True");
    assert_eq!(eval_repr("x = 0 or 'fallback'\n", "x"), "'fallback'");
    assert_eq!(eval_repr("x = [] and 1\n", "x"), "[]");
    assert_eq!(eval_repr("x = 3 in [1, 2, 3] and 'a' not in 'xyz'\n", "x"), "True");
}

#[test]
fn test_containers_share_identity() {
    let source = "a = [1, 2]\nb = a\nb.append(3)\nsame = a is b\n";
    assert_eq!(eval_repr(source, "a"), "[1, 2, 3]");
    assert_eq!(eval_repr(source, "same"), "True");
}

#[test]
fn test_slices_and_negative_indices() {
    let source = "xs = list(range(10))\na = xs[-1]\nb = xs[2:8:3]\nc = 'hello'[::-1]\nxs[1:3] = ['x']\n";
    assert_eq!(eval_repr(source, "a"), "9");
    assert_eq!(eval_repr(source, "b"), "[2, 5]");
    assert_eq!(eval_repr(source, "c"), "'olleh'");
    assert_eq!(eval_repr(source, "xs"), "[0, 'x', 3, 4, 5, 6, 7, 8, 9]");
}

#[test]
fn test_comprehensions_do_not_leak_loop_variables() {
    let source = "i = 'outer'\nsquares = [i * i for i in range(4) if i % 2 == 0]\nd = {k: v for k, v in [('a', 1)]}\n";
    assert_eq!(eval_repr(source, "squares"), "[0, 4]");
    assert_eq!(eval_repr(source, "i"), "'outer'");
    assert_eq!(eval_repr(source, "d"), "{'a': 1}");
}

#[test]
fn test_fstrings_and_format() {
    let source = "name = 'nb'\nn = 3.14159\ns = f'{name!r}: {n:.2f} {n:>8.1f}|{len(name)}'\nt = '{}-{x}'.format(1, x=2)\n";
    assert_eq!(eval_repr(source, "s"), "\"'nb': 3.14      3.1|2\"");
    assert_eq!(eval_repr(source, "t"), "'1-2'");
    assert_eq!(eval_repr("s = '%s has %d' % ('nb', 2)\n", "s"), "'nb has 2'");
}

#[test]
fn test_builtins_cover_common_calls() {
    let source = "\
a = sorted([3, 1, 2], reverse=True)
b = max(['aa', 'b', 'ccc'], key=len)
c = sum([0.5, 0.25])
d = list(zip('ab', [1, 2, 3]))
e = dict(enumerate('xy', start=1))
f = round(2.5), round(3.14159, 2)
g = isinstance(True, int), isinstance('s', (int, float))
";
    assert_eq!(eval_repr(source, "a"), "[3, 2, 1]");
    assert_eq!(eval_repr(source, "b"), "'ccc'");
    assert_eq!(eval_repr(source, "c"), "0.75");
    assert_eq!(eval_repr(source, "d"), "[('a', 1), ('b', 2)]");
    assert_eq!(eval_repr(source, "e"), "{1: 'x', 2: 'y'}");
    assert_eq!(eval_repr(source, "f"), "(2, 3.14)");
    assert_eq!(eval_repr(source, "g"), "(True, False)");
}

#[test]
fn test_integers_have_arbitrary_precision() {
    run("assert 2**100 > 0\nassert 10**400 > 0\nassert float('inf') > 10**300\n").unwrap();
    assert_eq!(eval_repr("x = 9223372036854775807 + 1\n", "x"), "9223372036854775808");
    assert_eq!(eval_repr("x = 2**100\n", "x"), "1267650600228229401496703205376");
    assert_eq!(eval_repr("x = 123456789012345678901234567890 // 10**20\n", "x"), "1234567890");
    assert_eq!(eval_repr("x = -9223372036854775808\n", "x"), "-9223372036854775808");
    assert_eq!(eval_repr("x = 0xFFFFFFFFFFFFFFFF\n", "x"), "18446744073709551615");
    assert_eq!(eval_repr("x = {2**64: 'a'}[18446744073709551616]\n", "x"), "'a'");
    assert_eq!(eval_repr("x = int('1' * 30) // 10**28\n", "x"), "11");
    assert_eq!(eval_repr("x = abs(-2**70) == 2**70 and isinstance(2**70, int)\n", "x"), "True");
    assert_eq!(eval_repr("x = str(2**64) + f' {2**64:,}'\n", "x"), "'18446744073709551616 18,446,744,073,709,551,616'");
    assert_eq!(eval_repr("x = sum([2**62, 2**62, 2**62])\n", "x"), "13835058055282163712");
}

#[test]
fn test_huge_repetition_is_a_memory_error() {
    let err = raise("assert [0] * 10**12\n");
    assert_eq!(err.kind, ExceptionKind::MemoryError);
    let err = raise("s = 'ab' * 10**12\n");
    assert_eq!(err.kind, ExceptionKind::MemoryError);
    let err = raise("xs = [1]\nxs *= 10**12\n");
    assert_eq!(err.kind, ExceptionKind::MemoryError);
}

#[test]
fn test_round_and_format_edge_cases() {
    assert_eq!(eval_repr("x = round(1e308, -400)\n", "x"), "0.0");
    assert_eq!(eval_repr("x = round(2.675, 400)\n", "x"), "2.675");
    let err = raise("'{:99999999999999999999}'.format(1)\n");
    assert_eq!(err.kind, ExceptionKind::ValueError);
    assert_eq!(err.message, "Too many decimal digits in format string");
}

#[test]
fn test_module_attributes_cannot_be_rebound() {
    let err = raise("import math\nmath.pi = 3\n");
    assert_eq!(err.kind, ExceptionKind::AttributeError);
    assert_eq!(err.message, "module 'math' attribute 'pi' is read-only");
    let err = raise("xs = []\nxs.append = 1\n");
    assert_eq!(err.message, "'list' object attribute 'append' is read-only");
    let err = raise("n = 1\nn.missing = 2\n");
    assert_eq!(err.message, "'int' object has no attribute 'missing'");
}

#[test]
fn test_math_module_imports() {
    let source = "import math\nfrom math import sqrt as root\nx = root(16) + math.floor(2.7)\n";
    assert_eq!(eval_repr(source, "x"), "6.0");
    let err = raise("import numpy\n");
    assert_eq!(err.kind, ExceptionKind::ModuleNotFoundError);
    assert_eq!(err.message, "No module named 'numpy'");
}

// ============================================================================
// Functions and scopes
// ============================================================================

#[test]
fn test_functions_with_defaults_varargs_and_keywords() {
    let source = "\
def f(a, b=2, *rest, **extra):
    return (a, b, rest, extra)

x = f(1)
y = f(1, 3, 4, 5, flag=True)
z = f(b=5, a=0)
";
    assert_eq!(eval_repr(source, "x"), "(1, 2, (), {})");
    assert_eq!(eval_repr(source, "y"), "(1, 3, (4, 5), {'flag': True})");
    assert_eq!(eval_repr(source, "z"), "(0, 5, (), {})");
}

#[test]
fn test_argument_errors_use_python_wording() {
    let err = raise("def f(a, b):\n    pass\nf(1)\n");
    assert_eq!(err.kind, ExceptionKind::TypeError);
    assert_eq!(err.message, "f() missing 1 required positional argument: 'b'");
    let err = raise("def f(a):\n    pass\nf(1, 2)\n");
    assert_eq!(err.message, "f() takes 1 positional argument but 2 were given");
}

#[test]
fn test_closures_capture_enclosing_frames() {
    let source = "\
n_default = 2

def make_adder(n):
    def add(x):
        return x + n
    return add

add3 = make_adder(3)
x = add3(4)
y = (lambda v, k=n_default: v * k)(5)
";
    assert_eq!(eval_repr(source, "x"), "7");
    assert_eq!(eval_repr(source, "y"), "10");
}

#[test]
fn test_global_declaration_rebinds_module_name() {
    let source = "count = 0\ndef bump():\n    global count\n    count += 1\nbump()\nbump()\n";
    assert_eq!(eval_repr(source, "count"), "2");
}

#[test]
fn test_local_read_before_assignment_is_unbound() {
    let err = raise("x = 1\ndef f():\n    y = x\n    x = 2\nf()\n");
    assert_eq!(err.kind, ExceptionKind::UnboundLocalError);
    assert_eq!(
        err.message,
        "cannot access local variable 'x' where it is not associated with a value"
    );
}

#[test]
fn test_unknown_name_is_name_error() {
    let err = raise("print(undefined_thing)\n");
    assert_eq!(err.kind, ExceptionKind::NameError);
    assert_eq!(err.message, "name 'undefined_thing' is not defined");
}

#[test]
fn test_runaway_recursion_raises_recursion_error() {
    let mut namespace = Namespace::default();
    let err = Interpreter::with_output(SharedBuffer::default())
        .with_recursion_limit(50)
        .execute("def f(n):\n    return f(n + 1)\nf(0)\n", &mut namespace)
        .unwrap_err();
    assert_eq!(err.kind, ExceptionKind::RecursionError);
}

/// Run a cell on a thread with a small native stack, as a library caller or test harness thread would.
fn run_on_small_stack(source: &'static str) -> Result<Option<String>, (ExceptionKind, String)> {
    std::thread::Builder::new()
        .stack_size(1024 * 1024)
        .spawn(move || {
            let mut namespace = Namespace::default();
            Interpreter::with_output(SharedBuffer::default())
                .execute(source, &mut namespace)
                .map(|()| namespace.get("result").map(|v| v.repr()))
                .map_err(|err| (err.kind, err.message))
        })
        .unwrap()
        .join()
        .unwrap()
}

#[test]
fn test_default_limit_recursion_stays_off_the_native_stack() {
    let (kind, message) = run_on_small_stack("def f(n):\n    return f(n + 1)\nf(0)\n").unwrap_err();
    assert_eq!(kind, ExceptionKind::RecursionError);
    assert_eq!(message, "maximum recursion depth exceeded");
}

#[test]
fn test_recursion_within_the_default_limit_completes() {
    let source = "def depth(n):\n    return 0 if n == 0 else 1 + depth(n - 1)\nresult = depth(900)\n";
    assert_eq!(run_on_small_stack(source).unwrap(), Some("900".to_string()));
    assert_eq!(DEFAULT_RECURSION_LIMIT, 1000);
}

// ============================================================================
// Exceptions and tracebacks
// ============================================================================

#[test]
fn test_try_except_else_finally_order() {
    let source = "\
log = []
try:
    log.append('try')
    {}['missing']
except KeyError as e:
    log.append('except ' + str(e))
else:
    log.append('else')
finally:
    log.append('finally')
";
    assert_eq!(eval_repr(source, "log"), "['try', \"except 'missing'\", 'finally']");
}

#[test]
fn test_except_matches_parent_classes_and_tuples() {
    let source = "\
caught = []
for exc in [IndexError, KeyError, ZeroDivisionError]:
    try:
        raise exc('boom')
    except LookupError:
        caught.append('lookup')
    except (ArithmeticError, TypeError):
        caught.append('arith')
";
    assert_eq!(eval_repr(source, "caught"), "['lookup', 'lookup', 'arith']");
}

#[test]
fn test_bare_raise_reraises_current_exception() {
    let err = raise("try:\n    1 / 0\nexcept ZeroDivisionError:\n    raise\n");
    assert_eq!(err.kind, ExceptionKind::ZeroDivisionError);
    assert_eq!(err.message, "division by zero");
}

#[test]
fn test_traceback_points_at_failing_lines() {
    let source = "\
def check(total):
    assert total == 4, f'expected 4, got {total}'

values = [1, 2]
check(sum(values))
";
    let err = raise(source);
    assert!(err.is_assertion());
    assert_eq!(
        err.traceback,
        "Traceback (most recent call last):\n  File \"<string>\", line 5, in <module>\n  File \"<string>\", line 2, in check\nAssertionError: expected 4, got 3\n"
    );
}

#[test]
fn test_error_inside_loop_body_reports_inner_line() {
    let err = raise("xs = [1, 2]\nfor x in xs:\n    y = x\n    z = xs[x]\n");
    assert_eq!(err.kind, ExceptionKind::IndexError);
    assert!(err.traceback.contains("line 4, in <module>"), "{}", err.traceback);
}

#[test]
fn test_syntax_errors_raise_before_any_statement_runs() {
    let buffer = SharedBuffer::default();
    let mut interpreter = Interpreter::with_output(buffer.clone());
    let err = interpreter
        .execute("print('ran')\nx = = 1\n", &mut Namespace::default())
        .unwrap_err();
    assert_eq!(err.kind, ExceptionKind::SyntaxError);
    assert!(err.traceback.contains("  File \"<string>\", line 2\n"), "{}", err.traceback);
    assert_eq!(buffer.contents(), "");
}

#[test]
fn test_misplaced_control_flow_is_a_syntax_error() {
    assert_eq!(raise("return 1\n").message, "'return' outside function");
    assert_eq!(raise("break\n").message, "'break' outside loop");
}

#[test]
fn test_assert_without_message_has_empty_message() {
    let err = raise("assert 1 == 2\n");
    assert!(err.is_assertion());
    assert_eq!(err.message, "");
    assert!(err.traceback.ends_with("\nAssertionError\n"));
}

// ============================================================================
// Namespaces and output
// ============================================================================

#[test]
fn test_namespace_accumulates_across_cells() {
    let mut interpreter = Interpreter::with_output(SharedBuffer::default());
    let mut namespace = Namespace::default();
    interpreter.execute("def double(x):\n    return 2 * x\n", &mut namespace).unwrap();
    interpreter.execute("y = double(21)\n", &mut namespace).unwrap();
    assert_eq!(namespace.get("y").map(|v| v.repr()), Some("42".to_string()));
    assert_eq!(namespace.names(), vec!["double".to_string(), "y".to_string()]);
}

#[test]
fn test_bindings_before_an_exception_are_kept() {
    let mut interpreter = Interpreter::with_output(SharedBuffer::default());
    let mut namespace = Namespace::default();
    assert!(interpreter.execute("a = 1\nb = 1 / 0\n", &mut namespace).is_err());
    assert!(namespace.contains("a"));
    assert!(!namespace.contains("b"));
}

#[test]
fn test_functions_from_earlier_cells_keep_their_line_numbers() {
    let mut interpreter = Interpreter::with_output(SharedBuffer::default());
    let mut namespace = Namespace::default();
    interpreter
        .execute("x = 0\n\ndef boom():\n    raise ValueError('bad')\n", &mut namespace)
        .unwrap();
    let err = interpreter.execute("boom()\n", &mut namespace).unwrap_err();
    assert!(err.traceback.contains("line 1, in <module>"), "{}", err.traceback);
    assert!(err.traceback.contains("line 4, in boom"), "{}", err.traceback);
}

#[test]
fn test_print_honours_sep_and_end() {
    assert_eq!(output("print('a', 1, None, sep='-', end='!')\nprint()\n"), "a-1-None!\n");
    assert_eq!(output("print([1, 'x'], {'k': 2.0})\n"), "[1, 'x'] {'k': 2.0}\n");
}

#[test]
fn test_dialect_names_the_interpreter() {
    assert!(Interpreter::new().dialect().starts_with("Python subset"));
}

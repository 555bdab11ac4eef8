use std::{cell::RefCell, fs, rc::Rc};

use matra::{
    interpreter::{evaluator::Interpreter, value::core::Value},
    stdlib,
};
use walkdir::WalkDir;

fn interpreter_with_capture() -> (Interpreter, Rc<RefCell<String>>) {
    let mut interp = Interpreter::new();
    stdlib::install(&mut interp);
    let captured = Rc::new(RefCell::new(String::new()));
    let sink = Rc::clone(&captured);
    interp.set_output(move |s| sink.borrow_mut().push_str(s));
    (interp, captured)
}

fn eval_value(src: &str) -> Value {
    let (mut interp, _) = interpreter_with_capture();
    match interp.eval(src) {
        Ok(v) => v,
        Err(e) => panic!("script failed: {e}\nscript: {src}"),
    }
}

fn eval_scalar(src: &str) -> f64 {
    eval_value(src).to_scalar().expect("result is not a scalar")
}

fn eval_bool(src: &str) -> bool {
    eval_value(src).to_bool().expect("result has no truth value")
}

fn eval_string(src: &str) -> String {
    eval_value(src).to_string_value().expect("result is not a string")
}

fn eval_output(src: &str) -> String {
    let (mut interp, out) = interpreter_with_capture();
    if let Err(e) = interp.eval(src) {
        panic!("script failed: {e}\nscript: {src}");
    }
    let text = out.borrow().clone();
    text
}

fn assert_failure(src: &str) {
    let (mut interp, _) = interpreter_with_capture();
    assert!(interp.eval(src).is_err(), "script succeeded but was expected to fail: {src}");
}

// ─── literals and arithmetic ────────────────────────────────────────────

#[test]
fn scalar_literals() {
    assert_eq!(eval_scalar("42;"), 42.0);
    assert_eq!(eval_scalar("3.14;"), 3.14);
    assert_eq!(eval_scalar(".5;"), 0.5);
    assert_eq!(eval_scalar("2.5e2;"), 250.0);
    assert_eq!(eval_scalar("1e-3;"), 0.001);
}

#[test]
fn hex_binary_and_grouped_literals() {
    assert_eq!(eval_scalar("0xff;"), 255.0);
    assert_eq!(eval_scalar("0XFF;"), 255.0);
    assert_eq!(eval_scalar("0b101;"), 5.0);
    assert_eq!(eval_scalar("1_000_000;"), 1_000_000.0);
    assert_eq!(eval_scalar("0xDE_AD;"), 57005.0);
}

#[test]
fn malformed_underscore_groups_are_lex_errors() {
    assert_failure("1__0;");
    assert_failure("1_;");
    assert_failure("0x_1;");
}

#[test]
fn imaginary_literals() {
    let v = eval_value("2i;");
    assert!(v.is_complex());
    assert_eq!(eval_scalar("real(2 + 3i);"), 2.0);
    assert_eq!(eval_scalar("imag(2 + 3i);"), 3.0);
    assert_eq!(eval_scalar("real(2i * 2i);"), -4.0);
    assert_eq!(eval_scalar("imag(0x2i);"), 2.0);
}

#[test]
fn arithmetic_and_precedence() {
    assert_eq!(eval_scalar("2 + 3 * 4;"), 14.0);
    assert_eq!(eval_scalar("(2 + 3) * 4;"), 20.0);
    assert_eq!(eval_scalar("2 ^ 10;"), 1024.0);
    assert_eq!(eval_scalar("10 - 7;"), 3.0);
    assert_eq!(eval_scalar("15 / 3;"), 5.0);
    assert_eq!(eval_scalar("2 \\ 10;"), 5.0);
    assert_eq!(eval_scalar("+5;"), 5.0);
}

#[test]
fn unary_minus_binds_looser_than_power() {
    assert_eq!(eval_scalar("-2^2;"), -4.0);
}

#[test]
fn power_is_right_associative() {
    assert_eq!(eval_scalar("2^3^2;"), 512.0);
}

#[test]
fn constants_are_bound() {
    assert!((eval_scalar("pi;") - std::f64::consts::PI).abs() < 1e-15);
    assert!(eval_scalar("inf;").is_infinite());
    assert!(eval_scalar("NaN;").is_nan());
    assert_eq!(eval_scalar("imag(i);"), 1.0);
    assert_eq!(eval_scalar("imag(j);"), 1.0);
}

// ─── strings ────────────────────────────────────────────────────────────

#[test]
fn string_literals_and_escapes() {
    assert_eq!(eval_string("'hello';"), "hello");
    assert_eq!(eval_string("'it''s';"), "it's");
    assert_eq!(eval_string("\"a\"\"b\";"), "a\"b");
    assert_eq!(eval_string("\"tab\\there\";"), "tab\there");
    assert_eq!(eval_string("\"keep \\q\";"), "keep \\q");
}

#[test]
fn char_concatenation() {
    assert_eq!(eval_string("['ab' 'cd'];"), "abcd");
    assert_eq!(eval_string("'ab' + 'cd';"), "abcd");
}

#[test]
fn unterminated_string_is_an_error() {
    assert_failure("x = 'abc");
    assert_failure("x = \"abc");
}

// ─── display and suppression ────────────────────────────────────────────

#[test]
fn semicolon_suppresses_display() {
    assert_eq!(eval_output("5;"), "");
    assert_eq!(eval_output("x = 5;"), "");
}

#[test]
fn unsuppressed_expression_displays_and_binds_ans() {
    let out = eval_output("5");
    assert_eq!(out, "    5\n");
    assert_eq!(eval_scalar("2 + 3\nans * 2;"), 10.0);
}

#[test]
fn named_assignment_displays_with_header() {
    let out = eval_output("x = 7");
    assert_eq!(out, "x =\n    7\n");
}

#[test]
fn comma_separates_statements_without_suppression() {
    assert_eq!(eval_scalar("a = 1, b = 2; a + b;"), 3.0);
}

// ─── the concrete scenarios ─────────────────────────────────────────────

#[test]
fn scenario_display_of_arithmetic() {
    assert_eq!(eval_output("disp(2 + 3 * 4 - 1)"), "13\n");
}

#[test]
fn scenario_matrix_element_read() {
    assert_eq!(
        eval_output("A = [1 2 3; 4 5 6; 7 8 9]; disp(A(2,3))"),
        "6\n"
    );
}

#[test]
fn scenario_minmax_multi_assignment() {
    let src = "function [lo, hi] = minmax(v); lo = min(v); hi = max(v); end\n\
               [lo, hi] = minmax([5 3 9 1 7]);\nlo + hi * 100;";
    assert_eq!(eval_scalar(src), 901.0);
}

#[test]
fn scenario_recursive_factorial() {
    let src = "function y = f(n); if n<=1; y=1; else; y=n*f(n-1); end; end; disp(f(10))";
    assert_eq!(eval_output(src), "3628800\n");
}

#[test]
fn scenario_element_deletion() {
    let out = eval_output("v = [1 2 3 4 5]; v(3) = []; disp(v)");
    assert!(out.contains("1"));
    assert!(!out.contains("3"));
    assert_eq!(eval_scalar("v = [1 2 3 4 5]; v(3) = []; numel(v);"), 4.0);
    assert_eq!(eval_scalar("v = [1 2 3 4 5]; v(3) = []; v(3);"), 4.0);
}

#[test]
fn scenario_auto_grow_on_write() {
    let src = "A = zeros(2,2); A(5,5) = 99;";
    assert_eq!(eval_scalar(&format!("{src} A(5,5);")), 99.0);
    assert_eq!(eval_scalar(&format!("{src} A(1,1);")), 0.0);
    assert_eq!(eval_scalar(&format!("{src} sum(sum(A));")), 99.0);
    let size = eval_value(&format!("{src} size(A);"));
    let Value::Double(a) = &size else { panic!("size is not numeric") };
    assert_eq!(a.data(), &[5.0, 5.0]);
}

// ─── boundaries ─────────────────────────────────────────────────────────

#[test]
fn empty_source_is_fine() {
    assert_eq!(eval_output(""), "");
    assert!(eval_value("").is_empty());
}

#[test]
fn bad_indices_raise() {
    assert_failure("x = [1 2 3]; x(0);");
    assert_failure("x = [1 2 3]; x(-1);");
    assert_failure("x = [1 2 3]; x(1.5);");
    assert_failure("x = [1 2 3]; x(4);");
}

#[test]
fn transpose_of_empty_is_empty() {
    assert!(eval_value("[]';").is_empty());
}

#[test]
fn logical_not_of_vector() {
    let v = eval_value("~[1 0 1];");
    let Value::Logical(a) = &v else { panic!("result is not logical") };
    assert_eq!(a.data(), &[0, 1, 0]);
}

#[test]
fn short_circuit_skips_right_hand_side() {
    assert!(eval_bool("1 || error('x');"));
    assert!(!eval_bool("0 && error('x');"));
    assert_failure("0 || error('x');");
}

// ─── matrix literals ────────────────────────────────────────────────────

#[test]
fn matrix_whitespace_rules() {
    assert_eq!(eval_scalar("numel([1 + 2]);"), 1.0);
    assert_eq!(eval_scalar("numel([1 +2]);"), 1.0);
    assert_eq!(eval_scalar("numel([1, 2]);"), 2.0);
    assert_eq!(eval_scalar("numel([1 2]);"), 2.0);
    assert_eq!(eval_scalar("[1 2](2);"), 2.0);
}

#[test]
fn newline_separates_matrix_rows() {
    let v = eval_value("[1 2\n3 4];");
    assert_eq!(v.dims().rows, 2);
    assert_eq!(v.dims().cols, 2);
}

#[test]
fn empty_elements_vanish_in_literals() {
    assert_eq!(eval_scalar("numel([1, [], 2]);"), 2.0);
    assert!(eval_value("[[], []];").is_empty());
}

#[test]
fn block_concatenation_shapes() {
    assert_eq!(eval_scalar("A = [1 2; 3 4]; B = [A A](2, 4);"), 4.0);
    let v = eval_value("A = [1 2; 3 4]; [A; A];");
    assert_eq!(v.dims().rows, 4);
    assert_eq!(v.dims().cols, 2);
}

#[test]
fn inconsistent_literal_shapes_raise() {
    assert_failure("[1 2; 3];");
    assert_failure("A = [1 2; 3 4]; [A [1; 2; 3]];");
}

#[test]
fn horizontal_concatenation_invariant() {
    // size([a, b]) = [rows(a), cols(a)+cols(b)]
    let v = eval_value("a = [1 2; 3 4]; b = [5; 6]; [a b];");
    assert_eq!(v.dims().rows, 2);
    assert_eq!(v.dims().cols, 3);
}

#[test]
fn complex_elements_in_literals() {
    let v = eval_value("[1+2i, 3];");
    assert!(v.is_complex());
    assert_eq!(eval_scalar("imag([1+2i, 3](1));"), 2.0);
}

// ─── colon ranges ───────────────────────────────────────────────────────

#[test]
fn colon_counts() {
    assert_eq!(eval_scalar("numel(1:10);"), 10.0);
    assert_eq!(eval_scalar("numel(1:2:7);"), 4.0);
    assert_eq!(eval_scalar("numel(0:0.1:1);"), 11.0);
    assert_eq!(eval_scalar("numel(5:1);"), 0.0);
    assert_eq!(eval_scalar("numel(10:-2:1);"), 5.0);
    assert_eq!(eval_scalar("numel(3:3);"), 1.0);
}

#[test]
fn colon_values() {
    let v = eval_value("1:2:7;");
    let Value::Double(a) = &v else { panic!("range is not double") };
    assert_eq!(a.data(), &[1.0, 3.0, 5.0, 7.0]);
}

#[test]
fn zero_colon_step_raises() {
    assert_failure("1:0:5;");
}

// ─── indexing ───────────────────────────────────────────────────────────

#[test]
fn linear_indexing_is_column_major() {
    let src = "A = [1 2 3; 4 5 6; 7 8 9];";
    assert_eq!(eval_scalar(&format!("{src} A(1);")), 1.0);
    assert_eq!(eval_scalar(&format!("{src} A(2);")), 4.0);
    assert_eq!(eval_scalar(&format!("{src} A(4);")), 2.0);
    assert_eq!(eval_scalar(&format!("{src} A(9);")), 9.0);
}

#[test]
fn subscript_reads() {
    let src = "A = [1 2 3; 4 5 6; 7 8 9];";
    assert_eq!(eval_scalar(&format!("{src} A(2,3);")), 6.0);
    let row = eval_value(&format!("{src} A(2,:);"));
    let Value::Double(a) = &row else { panic!() };
    assert_eq!(a.data(), &[4.0, 5.0, 6.0]);
    let col = eval_value(&format!("{src} A(:,2);"));
    assert_eq!(col.dims().rows, 3);
    assert_eq!(col.dims().cols, 1);
}

#[test]
fn end_in_indexing() {
    let src = "A = [1 2 3; 4 5 6; 7 8 9];";
    assert_eq!(eval_scalar(&format!("{src} A(end);")), 9.0);
    assert_eq!(eval_scalar(&format!("{src} A(end, end);")), 9.0);
    assert_eq!(eval_scalar(&format!("{src} A(end-1, end);")), 6.0);
    assert_eq!(eval_scalar(&format!("{src} v = [10 20 30]; v(end);")), 30.0);
}

#[test]
fn nested_end_contexts() {
    let src = "A = [1 2 3; 4 5 6; 7 8 9]; B = [3 1];";
    assert_eq!(eval_scalar(&format!("{src} A(end-1, B(end));")), 4.0);
}

#[test]
fn end_outside_indexing_raises() {
    assert_failure("x = end;");
}

#[test]
fn logical_mask_indexing() {
    let v = eval_value("v = [5 3 9 1 7]; v(v > 4);");
    let Value::Double(a) = &v else { panic!() };
    assert_eq!(a.data(), &[5.0, 9.0, 7.0]);
    assert_eq!(eval_scalar("v = [1 2 3]; numel(v(logical([0 0 0])));"), 0.0);
}

#[test]
fn char_indexing() {
    assert_eq!(eval_string("s = 'hello'; s(1);"), "h");
    assert_eq!(eval_string("s = 'hello'; s(end);"), "o");
    assert_eq!(eval_string("s = 'hello'; s(2:3);"), "el");
}

#[test]
fn index_error_names_the_position() {
    let (mut interp, _) = interpreter_with_capture();
    let err = interp
        .eval("A = [1 2 3; 4 5 6]; A(5, 1);")
        .expect_err("out-of-range read succeeded");
    assert!(err.to_string().contains("row index: 5 > 2"), "got: {err}");
}

// ─── control flow ───────────────────────────────────────────────────────

#[test]
fn if_elseif_else() {
    let src = "x = 7;\nif x > 10\n  y = 1;\nelseif x > 5\n  y = 2;\nelse\n  y = 3;\nend\ny;";
    assert_eq!(eval_scalar(src), 2.0);
}

#[test]
fn while_with_break_and_continue() {
    let src = "total = 0; k = 0;\nwhile true\n  k = k + 1;\n  if k > 10\n    break\n  end\n  \
               if mod(k, 2) == 0\n    continue\n  end\n  total = total + k;\nend\ntotal;";
    assert_eq!(eval_scalar(src), 25.0);
}

#[test]
fn for_over_range_and_matrix() {
    assert_eq!(eval_scalar("s = 0; for k = 1:5\n s = s + k;\nend\ns;"), 15.0);
    // matrix targets yield columns
    let src = "A = [1 2; 3 4]; s = 0;\nfor col = A\n  s = s + col(1) * 10 + col(2);\nend\ns;";
    assert_eq!(eval_scalar(src), 37.0);
}

#[test]
fn for_over_char_and_logical() {
    assert_eq!(
        eval_string("out = ''; for ch = 'abc'\n out = [out ch];\nend\nout;"),
        "abc"
    );
    assert_eq!(
        eval_scalar("s = 0; for b = logical([1 0 1])\n s = s + b;\nend\ns;"),
        2.0
    );
}

#[test]
fn for_loop_break() {
    let src = "s = 0;\nfor k = 1:100\n  if k == 4\n    break\n  end\n  s = s + k;\nend\ns;";
    assert_eq!(eval_scalar(src), 6.0);
}

#[test]
fn switch_matching() {
    let src = "x = 2;\nswitch x\ncase 1\n  y = 'one';\ncase {2, 3}\n  y = 'few';\notherwise\n  \
               y = 'many';\nend\ny;";
    assert_eq!(eval_string(src), "few");

    let src = "s = 'red';\nswitch s\ncase 'blue'\n  y = 1;\ncase 'red'\n  y = 2;\nend\ny;";
    assert_eq!(eval_scalar(src), 2.0);

    let src = "x = 9;\nswitch x\ncase 1\n  y = 1;\notherwise\n  y = 0;\nend\ny;";
    assert_eq!(eval_scalar(src), 0.0);
}

#[test]
fn try_catch_binds_error_struct() {
    let src = "try\n  error('boom');\ncatch err\n  msg = err.message;\nend\nmsg;";
    assert_eq!(eval_string(src), "boom");
    assert_eq!(
        eval_string("try\n error('x');\ncatch e\n id = e.identifier;\nend\nid;"),
        "matra:error"
    );
}

#[test]
fn try_without_catch_swallows_errors() {
    assert_eq!(eval_scalar("x = 1;\ntry\n  error('gone');\nend\nx;"), 1.0);
}

#[test]
fn signals_pass_through_try() {
    let src = "s = 0;\nfor k = 1:10\n  try\n    if k == 3\n      break\n    end\n  catch e\n    \
               s = 1000;\n  end\n  s = s + k;\nend\ns;";
    assert_eq!(eval_scalar(src), 3.0);
}

#[test]
fn break_outside_loop_raises() {
    assert_failure("break");
    assert_failure("continue");
}

// ─── functions ──────────────────────────────────────────────────────────

#[test]
fn function_definition_and_call() {
    let src = "function y = square(x)\n  y = x * x;\nend\nsquare(7);";
    assert_eq!(eval_scalar(src), 49.0);
}

#[test]
fn function_without_trailing_end() {
    let src = "function y = five()\n  y = 5;";
    let (mut interp, _) = interpreter_with_capture();
    interp.eval(src).expect("definition failed");
    let v = interp.eval("five();").expect("call failed");
    assert_eq!(v.to_scalar().unwrap(), 5.0);
}

#[test]
fn nargin_and_nargout() {
    let src = "function [a, b] = probe(x, y, z)\n  a = nargin;\n  b = nargout;\nend\n\
               [p, q] = probe(1, 2);\np * 10 + q;";
    assert_eq!(eval_scalar(src), 22.0);
}

#[test]
fn missing_returns_are_empty() {
    let src = "function [a, b] = one()\n  a = 1;\nend\n[x, y] = one();\nisempty(y);";
    assert!(eval_bool(src));
}

#[test]
fn tilde_discards_outputs() {
    let src = "function [lo, hi] = minmax(v); lo = min(v); hi = max(v); end\n\
               [~, hi] = minmax([5 3 9 1 7]);\nhi;";
    assert_eq!(eval_scalar(src), 9.0);
    // a ~ placeholder must not create a variable
    let src = "function [lo, hi] = minmax(v); lo = min(v); hi = max(v); end\n\
               [~, hi] = minmax([5 3 9 1 7]);\nexist('~');";
    assert_eq!(eval_scalar(src), 0.0);
}

#[test]
fn multi_assign_requires_a_call() {
    assert_failure("[a, b] = 5;");
}

#[test]
fn return_leaves_the_function() {
    let src = "function y = early(x)\n  y = 1;\n  if x > 0\n    return\n  end\n  y = 2;\nend\n\
               early(5);";
    assert_eq!(eval_scalar(src), 1.0);
}

#[test]
fn too_many_arguments_raise() {
    assert_failure("function y = f(x)\n  y = x;\nend\nf(1, 2);");
}

#[test]
fn recursion_depth_is_bounded_and_recovers() {
    let (mut interp, _) = interpreter_with_capture();
    interp
        .eval("function y = r(n)\n  y = r(n + 1);\nend")
        .expect("definition failed");
    let err = interp.eval("r(1);").expect_err("runaway recursion succeeded");
    assert!(err.to_string().contains("recursion depth"), "got: {err}");
    // the depth counter unwound to zero: a normal call works afterwards
    interp
        .eval("function y = g(n)\n  y = n + 1;\nend")
        .expect("definition failed");
    let v = interp.eval("g(1);").expect("call after unwind failed");
    assert_eq!(v.to_scalar().unwrap(), 2.0);
}

#[test]
fn configurable_recursion_depth() {
    let mut interp = Interpreter::new();
    stdlib::install(&mut interp);
    interp.set_output(|_| {});
    interp.set_max_recursion_depth(10);
    interp
        .eval("function y = f(n)\n  if n <= 0\n    y = 0;\n  else\n    y = f(n - 1);\n  end\nend")
        .expect("definition failed");
    assert!(interp.eval("f(5);").is_ok());
    assert!(interp.eval("f(50);").is_err());
}

// ─── anonymous functions and handles ────────────────────────────────────

#[test]
fn anonymous_functions_capture_by_value() {
    let src = "a = 5;\nf = @(x) x + a;\na = 100;\nf(1);";
    assert_eq!(eval_scalar(src), 6.0);
}

#[test]
fn anonymous_function_of_two_arguments() {
    assert_eq!(eval_scalar("add = @(x, y) x + y;\nadd(2, 5);"), 7.0);
}

#[test]
fn named_function_handles() {
    let src = "function y = double_it(x)\n  y = 2 * x;\nend\nh = @double_it;\nh(21);";
    assert_eq!(eval_scalar(src), 42.0);
    assert_eq!(eval_scalar("h = @sqrt; h(16);"), 4.0);
}

#[test]
fn handle_display() {
    assert_eq!(eval_output("h = @sqrt"), "h =\n    @sqrt\n");
}

// ─── environments, globals, workspace builtins ──────────────────────────

#[test]
fn globals_are_shared_with_functions() {
    let src = "global counter\ncounter = 0;\n\
               function bump()\n  global counter\n  counter = counter + 1;\nend\n\
               bump();\nbump();\nbump();\nglobal counter\ncounter;";
    assert_eq!(eval_scalar(src), 3.0);
}

#[test]
fn function_locals_do_not_leak() {
    let src = "function y = f()\n  hidden = 42;\n  y = 1;\nend\nf();\nexist('hidden');";
    assert_eq!(eval_scalar(src), 0.0);
}

#[test]
fn clear_removes_variables() {
    assert_eq!(eval_scalar("x = 5; clear('x'); exist('x');"), 0.0);
    assert_failure("x = 5; clear('x'); x;");
}

#[test]
fn exist_and_class() {
    assert_eq!(eval_scalar("x = 1; exist('x');"), 1.0);
    assert_eq!(eval_scalar("exist('sqrt');"), 5.0);
    assert_eq!(eval_string("class(5);"), "double");
    assert_eq!(eval_string("class('s');"), "char");
    assert_eq!(eval_string("class(true);"), "logical");
    assert_eq!(eval_string("class({1});"), "cell");
    assert_eq!(eval_string("class(1i);"), "complex");
}

#[test]
fn who_lists_variables() {
    let out = eval_output("alpha = 1; beta = 2; who");
    assert!(out.contains("alpha"));
    assert!(out.contains("beta"));
}

// ─── cells and structs ──────────────────────────────────────────────────

#[test]
fn cell_literals_and_content_indexing() {
    assert_eq!(eval_string("c = {1, 'two'; 3, 'four'}; c{1, 2};"), "two");
    assert_eq!(eval_scalar("c = {1, 'two'; 3, 'four'}; c{2};"), 3.0);
    assert_eq!(eval_scalar("c = {10, 20, 30}; c(2);"), 20.0);
    assert_eq!(eval_scalar("c = {1, 2}; numel(c);"), 2.0);
}

#[test]
fn cell_assignment_requires_existing_cell() {
    assert_eq!(eval_scalar("c = {1, 2, 3}; c{2} = 99; c{2};"), 99.0);
    assert_failure("q{1} = 5;");
    assert_failure("x = 3; x{1} = 5;");
}

#[test]
fn for_over_cell_columns() {
    let src = "c = {1, 2, 3}; s = 0;\nfor item = c\n  s = s + item;\nend\ns;";
    assert_eq!(eval_scalar(src), 6.0);
}

#[test]
fn struct_field_chains() {
    assert_eq!(eval_scalar("s.a.b = 5; s.a.b;"), 5.0);
    assert_eq!(eval_scalar("s.x = 1; s.y = 2; s.x + s.y;"), 3.0);
    assert!(eval_bool("s.a = 1; isfield(s, 'a');"));
    assert!(!eval_bool("s.a = 1; isfield(s, 'b');"));
}

#[test]
fn struct_builder_and_fieldnames() {
    assert_eq!(eval_scalar("s = struct('w', 4, 'h', 3); s.w * s.h;"), 12.0);
    assert_eq!(eval_string("s.a = 1; s.b = 2; n = fieldnames(s); n{1};"), "a");
    assert!(!eval_bool("s.a = 1; s.b = 2; t = rmfield(s, 'a'); isfield(t, 'a');"));
}

#[test]
fn missing_field_raises() {
    assert_failure("s.a = 1; s.b;");
    assert_failure("x = 5; x.field;");
}

// ─── copy-on-write ──────────────────────────────────────────────────────

#[test]
fn aliases_are_isolated_on_write() {
    assert_eq!(eval_scalar("v = [1 2 3]; w = v; w(1) = 99; v(1);"), 1.0);
    assert_eq!(eval_scalar("v = [1 2 3]; w = v; w(1) = 99; w(1);"), 99.0);
    assert_eq!(eval_scalar("s.a = 1; t = s; t.a = 2; s.a;"), 1.0);
    assert_eq!(eval_scalar("c = {1}; d = c; d{1} = 2; c{1};"), 1.0);
}

// ─── deletion forms ─────────────────────────────────────────────────────

#[test]
fn row_and_column_deletion() {
    let src = "A = [1 2 3; 4 5 6; 7 8 9];";
    let v = eval_value(&format!("{src} A(2,:) = []; A;"));
    assert_eq!(v.dims().rows, 2);
    assert_eq!(eval_scalar(&format!("{src} A(2,:) = []; A(2,1);")), 7.0);
    let v = eval_value(&format!("{src} A(:,1) = []; A;"));
    assert_eq!(v.dims().cols, 2);
}

#[test]
fn empty_row_deletion_is_a_noop() {
    let src = "A = [1 2; 3 4]; A([], :) = [];";
    assert_eq!(eval_scalar(&format!("{src} numel(A);")), 4.0);
    assert_eq!(eval_scalar(&format!("{src} A(2,2);")), 4.0);
}

#[test]
fn partial_2d_deletion_raises() {
    assert_failure("A = [1 2; 3 4]; A(1, 1) = [];");
}

#[test]
fn column_source_deletes_to_column() {
    let v = eval_value("v = [1; 2; 3; 4]; v(2) = []; v;");
    assert_eq!(v.dims().rows, 3);
    assert_eq!(v.dims().cols, 1);
}

#[test]
fn bare_empty_assignment_is_ordinary() {
    assert!(eval_bool("x = []; isempty(x);"));
}

// ─── operators over arrays ──────────────────────────────────────────────

#[test]
fn elementwise_and_matrix_operators_differ() {
    let v = eval_value("[1 2; 3 4] .* [5 6; 7 8];");
    let Value::Double(a) = &v else { panic!() };
    assert_eq!(a.data(), &[5.0, 21.0, 12.0, 32.0]);

    let v = eval_value("[1 2; 3 4] * [5 6; 7 8];");
    let Value::Double(a) = &v else { panic!() };
    assert_eq!(a.data(), &[19.0, 43.0, 22.0, 50.0]);
}

#[test]
fn scalar_broadcasting() {
    let v = eval_value("[1 2 3] * 2;");
    let Value::Double(a) = &v else { panic!() };
    assert_eq!(a.data(), &[2.0, 4.0, 6.0]);
    assert_eq!(eval_scalar("sum(10 - [1 2 3]);"), 24.0);
}

#[test]
fn comparisons_produce_logical_arrays() {
    let v = eval_value("[1 5 2] > 2;");
    let Value::Logical(a) = &v else { panic!("comparison did not produce a logical") };
    assert_eq!(a.data(), &[0, 1, 0]);
    assert!(eval_bool("'abc' == 'abc';"));
    assert!(eval_bool("'abc' ~= 'abd';"));
}

#[test]
fn elementwise_logical_operators() {
    let v = eval_value("[1 0 1] & [1 1 0];");
    let Value::Logical(a) = &v else { panic!() };
    assert_eq!(a.data(), &[1, 0, 0]);
    let v = eval_value("[1 0 0] | [0 0 1];");
    let Value::Logical(a) = &v else { panic!() };
    assert_eq!(a.data(), &[1, 0, 1]);
}

#[test]
fn shape_mismatch_raises() {
    assert_failure("[1 2 3] + [1 2];");
    assert_failure("[1 2; 3 4] * [1 2; 3 4; 5 6];");
}

#[test]
fn transpose_invariants() {
    assert!(eval_bool("A = [1 2; 3 4]; all_eq = (A')' == A; all_eq(1) & all_eq(2);"));
    assert_eq!(eval_scalar("v = [1 2 3]; size(v', 1);"), 3.0);
    // conjugate vs plain transpose on complex values
    assert_eq!(eval_scalar("imag((2+3i)');"), -3.0);
    assert_eq!(eval_scalar("imag((2+3i).');"), 3.0);
    assert_eq!(eval_scalar("imag(((2+3i)')');"), 3.0);
}

// ─── standard library ───────────────────────────────────────────────────

#[test]
fn math_functions() {
    assert_eq!(eval_scalar("sqrt(16);"), 4.0);
    assert_eq!(eval_scalar("abs(-5);"), 5.0);
    assert_eq!(eval_scalar("abs(3 + 4i);"), 5.0);
    assert!((eval_scalar("exp(log(7));") - 7.0).abs() < 1e-12);
    assert_eq!(eval_scalar("floor(3.7);"), 3.0);
    assert_eq!(eval_scalar("ceil(3.2);"), 4.0);
    assert_eq!(eval_scalar("round(3.5);"), 4.0);
    assert_eq!(eval_scalar("fix(-3.7);"), -3.0);
    assert_eq!(eval_scalar("mod(7, 3);"), 1.0);
    assert_eq!(eval_scalar("mod(-1, 3);"), 2.0);
    assert_eq!(eval_scalar("rem(-1, 3);"), -1.0);
    assert_eq!(eval_scalar("sign(-42);"), -1.0);
    assert_eq!(eval_scalar("sign(0);"), 0.0);
}

#[test]
fn sqrt_of_negative_goes_complex() {
    assert_eq!(eval_scalar("imag(sqrt(-4));"), 2.0);
    assert_eq!(eval_scalar("real(sqrt(-4));"), 0.0);
}

#[test]
fn sqrt_square_magnitude_invariant() {
    for x in [-3.5f64, -1.0, 0.0, 2.0, 17.25] {
        let got = eval_scalar(&format!("sqrt(({x})^2);"));
        assert!((got - x.abs()).abs() < 1e-12, "sqrt({x}^2) = {got}");
    }
}

#[test]
fn reductions() {
    assert_eq!(eval_scalar("sum([1 2 3 4]);"), 10.0);
    assert_eq!(eval_scalar("prod([1 2 3 4]);"), 24.0);
    assert_eq!(eval_scalar("mean([2 4 6]);"), 4.0);
    assert_eq!(eval_scalar("min([5 3 9]);"), 3.0);
    assert_eq!(eval_scalar("max([5 3 9]);"), 9.0);
    assert_eq!(eval_scalar("min(3, 7);"), 3.0);
    // column-wise over matrices
    let v = eval_value("sum([1 2; 3 4]);");
    let Value::Double(a) = &v else { panic!() };
    assert_eq!(a.data(), &[4.0, 6.0]);
}

#[test]
fn min_reports_position() {
    assert_eq!(eval_scalar("[~, at] = min([5 3 9 1 7]); at;"), 4.0);
}

#[test]
fn sorting() {
    let v = eval_value("sort([3 1 2]);");
    let Value::Double(a) = &v else { panic!() };
    assert_eq!(a.data(), &[1.0, 2.0, 3.0]);
    assert_eq!(eval_scalar("[~, order] = sort([30 10 20]); order(1);"), 2.0);
    let v = eval_value("sort([3 1 2], 'descend');");
    let Value::Double(a) = &v else { panic!() };
    assert_eq!(a.data(), &[3.0, 2.0, 1.0]);
}

#[test]
fn find_nonzeros() {
    let v = eval_value("find([0 5 0 7]);");
    let Value::Double(a) = &v else { panic!() };
    assert_eq!(a.data(), &[2.0, 4.0]);
}

#[test]
fn construction_functions() {
    assert_eq!(eval_scalar("sum(sum(zeros(3)));"), 0.0);
    assert_eq!(eval_scalar("sum(sum(ones(2, 3)));"), 6.0);
    assert_eq!(eval_scalar("sum(sum(eye(3)));"), 3.0);
    assert_eq!(eval_scalar("numel(linspace(0, 1, 5));"), 5.0);
    assert_eq!(eval_scalar("v = linspace(0, 1, 5); v(2);"), 0.25);
}

#[test]
fn reshape_round_trip() {
    let src = "A = [1 2 3; 4 5 6]; B = reshape(reshape(A, 3, 2), 2, 3);";
    assert!(eval_bool(&format!("{src} q = B == A; q(1) & q(2) & q(3) & q(4) & q(5) & q(6);")));
    assert_failure("reshape([1 2 3], 2, 2);");
}

#[test]
fn introspection_functions() {
    assert_eq!(eval_scalar("length([1 2 3; 4 5 6]);"), 3.0);
    assert_eq!(eval_scalar("numel([1 2 3; 4 5 6]);"), 6.0);
    assert_eq!(eval_scalar("ndims([1 2]);"), 2.0);
    assert!(eval_bool("isempty([]);"));
    assert!(!eval_bool("isempty(0);"));
    assert!(eval_bool("isscalar(5);"));
    assert!(eval_bool("isvector([1 2 3]);"));
    assert!(eval_bool("isnumeric(5);"));
    assert!(eval_bool("ischar('s');"));
    assert!(eval_bool("islogical(true);"));
    assert!(eval_bool("iscell({});"));
}

#[test]
fn conversion_functions() {
    assert_eq!(eval_scalar("double('A');"), 65.0);
    assert_eq!(eval_string("char(72);"), "H");
    assert!(eval_bool("logical(5);"));
    assert_eq!(eval_string("num2str(3.5);"), "3.5");
    assert_eq!(eval_string("num2str(42);"), "42");
    assert_eq!(eval_scalar("str2double('2.5');"), 2.5);
    assert!(eval_scalar("str2double('nope');").is_nan());
}

#[test]
fn string_functions() {
    assert_eq!(eval_string("upper('abc');"), "ABC");
    assert_eq!(eval_string("lower('ABC');"), "abc");
    assert_eq!(eval_string("strcat('ab', 'cd', 'ef');"), "abcdef");
    assert!(eval_bool("strcmp('one', 'one');"));
    assert!(!eval_bool("strcmp('one', 'two');"));
    assert!(eval_bool("strcmpi('MiXeD', 'mixed');"));
    assert!(!eval_bool("strcmpi('one', 'two');"));
}

#[test]
fn str2num_yields_empty_on_failure() {
    assert_eq!(eval_scalar("str2num('2.5');"), 2.5);
    assert!(eval_bool("isempty(str2num('not a number'));"));
}

#[test]
fn strsplit_into_cells() {
    assert_eq!(eval_scalar("parts = strsplit('a b c'); numel(parts);"), 3.0);
    assert_eq!(eval_string("parts = strsplit('a b c'); parts{2};"), "b");
    assert_eq!(
        eval_string("parts = strsplit('one,two', ','); parts{2};"),
        "two"
    );
    // empty pieces between consecutive delimiters are dropped
    assert_eq!(eval_scalar("numel(strsplit('a,,b', ','));"), 2.0);
}

#[test]
fn transpose_function_form() {
    let v = eval_value("transpose([1 2 3]);");
    assert_eq!(v.dims().rows, 3);
    assert_eq!(v.dims().cols, 1);
    // unlike the quote operator, no conjugation happens
    assert_eq!(eval_scalar("imag(transpose(2 + 3i));"), 3.0);
    assert_failure("transpose({1, 2});");
}

#[test]
fn warning_prints_and_continues() {
    let out = eval_output("warning('look out'); x = 5;");
    assert_eq!(out, "Warning: look out\n");
    assert_eq!(eval_scalar("warning('look out'); x = 5; x;"), 5.0);
}

#[test]
fn printf_family() {
    assert_eq!(eval_output("fprintf('n = %d\\n', 42)"), "n = 42\n");
    assert_eq!(eval_output("fprintf('%s scored %d\\n', 'ada', 3)"), "ada scored 3\n");
    assert_eq!(eval_string("sprintf('%d-%d', 1, 2);"), "1-2");
    assert_eq!(eval_string("sprintf('%.2f', 1.5);"), "1.50");
    // the format recycles across remaining arguments
    assert_eq!(eval_string("sprintf('%d,', [1 2 3]);"), "1,2,3,");
}

#[test]
fn complex_display_format() {
    assert_eq!(eval_output("z = 2 + 3i"), "z =\n    2+3i\n");
    assert_eq!(eval_output("z = 2 - 3i"), "z =\n    2-3i\n");
}

#[test]
fn whos_reports_sizes() {
    let out = eval_output("x = zeros(2, 3); whos");
    assert!(out.contains("2x3"));
    assert!(out.contains("double"));
}

// ─── comments and continuations ─────────────────────────────────────────

#[test]
fn comments_are_ignored() {
    assert_eq!(eval_scalar("x = 5; % trailing comment\nx;"), 5.0);
    assert_eq!(eval_scalar("%{\nall of this\nis skipped\n%}\n7;"), 7.0);
    assert_eq!(
        eval_scalar("%{\nouter\n%{\nnested\n%}\nstill out\n%}\n9;"),
        9.0
    );
}

#[test]
fn unterminated_block_comment_raises() {
    assert_failure("%{\nnever closed\n1 + 1");
}

#[test]
fn line_continuation() {
    assert_eq!(eval_scalar("x = 1 + ...\n    2;\nx;"), 3.0);
    assert_eq!(eval_scalar("x = 1 + ... ignored text\n    2;\nx;"), 3.0);
}

// ─── host surface ───────────────────────────────────────────────────────

#[test]
fn set_and_get_variables() {
    let mut interp = Interpreter::new();
    stdlib::install(&mut interp);
    interp.set_output(|_| {});
    interp.set_variable("seed", Value::scalar(21.0));
    let v = interp.eval("seed * 2;").expect("evaluation failed");
    assert_eq!(v.to_scalar().unwrap(), 42.0);
    assert_eq!(interp.variable("seed").unwrap().to_scalar().unwrap(), 21.0);
}

#[test]
fn custom_registered_function() {
    let mut interp = Interpreter::new();
    stdlib::install(&mut interp);
    interp.set_output(|_| {});
    interp.register_function("triple", |args| {
        let v = args[0].to_scalar()?;
        Ok(vec![Value::scalar(v * 3.0)])
    });
    let v = interp.eval("triple(14);").expect("evaluation failed");
    assert_eq!(v.to_scalar().unwrap(), 42.0);
}

#[test]
fn state_persists_across_eval_calls() {
    let (mut interp, _) = interpreter_with_capture();
    interp.eval("x = 10;").expect("first eval failed");
    let v = interp.eval("x + 5;").expect("second eval failed");
    assert_eq!(v.to_scalar().unwrap(), 15.0);
}

// ─── demo scripts ───────────────────────────────────────────────────────

#[test]
fn demo_scripts_run() {
    let mut count = 0;
    for entry in WalkDir::new("demos")
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "m"))
    {
        let path = entry.path();
        let source =
            fs::read_to_string(path).unwrap_or_else(|e| panic!("failed to read {path:?}: {e}"));
        count += 1;
        let (mut interp, _) = interpreter_with_capture();
        if let Err(e) = interp.eval(&source) {
            panic!("demo {path:?} failed: {e}");
        }
    }
    assert!(count > 0, "no demo scripts found in demos/");
}

//! Focused tests for the indexing and assignment engine: resolution of
//! index kinds, bounds, growth, and the write/delete semantics.

use std::{cell::RefCell, rc::Rc};

use matra::{
    interpreter::{evaluator::Interpreter, value::core::Value},
    stdlib,
};

fn interpreter() -> Interpreter {
    let mut interp = Interpreter::new();
    stdlib::install(&mut interp);
    let sink = Rc::new(RefCell::new(String::new()));
    let captured = Rc::clone(&sink);
    interp.set_output(move |s| captured.borrow_mut().push_str(s));
    interp
}

fn eval_value(src: &str) -> Value {
    let mut interp = interpreter();
    match interp.eval(src) {
        Ok(v) => v,
        Err(e) => panic!("script failed: {e}\nscript: {src}"),
    }
}

fn eval_scalar(src: &str) -> f64 {
    eval_value(src).to_scalar().expect("result is not a scalar")
}

fn assert_failure(src: &str) {
    let mut interp = interpreter();
    assert!(interp.eval(src).is_err(), "expected failure: {src}");
}

// ─── index kinds ────────────────────────────────────────────────────────

#[test]
fn colon_selects_a_whole_dimension() {
    assert_eq!(eval_scalar("A = [1 2; 3 4]; numel(A(:, 1));"), 2.0);
    assert_eq!(eval_scalar("A = [1 2; 3 4]; numel(A(1, :));"), 2.0);
    // the single-colon form flattens column-major
    let v = eval_value("A = [1 2; 3 4]; A(:);");
    let Value::Double(a) = &v else { panic!() };
    assert_eq!(a.data(), &[1.0, 3.0, 2.0, 4.0]);
}

#[test]
fn colon_stored_in_a_variable_still_selects() {
    assert_eq!(eval_scalar("A = [1 2 3]; k = ':'; numel(A(k));"), 3.0);
}

#[test]
fn vector_position_lists() {
    let v = eval_value("v = [10 20 30 40]; v([4 1 2]);");
    let Value::Double(a) = &v else { panic!() };
    assert_eq!(a.data(), &[40.0, 10.0, 20.0]);
    // positions may repeat
    let v = eval_value("v = [10 20]; v([1 1 1]);");
    let Value::Double(a) = &v else { panic!() };
    assert_eq!(a.data(), &[10.0, 10.0, 10.0]);
}

#[test]
fn cross_product_subscripts() {
    let v = eval_value("A = [1 2 3; 4 5 6; 7 8 9]; A([1 3], [1 3]);");
    let Value::Double(a) = &v else { panic!() };
    assert_eq!(v.dims().rows, 2);
    assert_eq!(v.dims().cols, 2);
    assert_eq!(a.data(), &[1.0, 7.0, 3.0, 9.0]);
}

#[test]
fn logical_masks_follow_positions() {
    let v = eval_value("v = [10 20 30]; v(logical([1 0 1]));");
    let Value::Double(a) = &v else { panic!() };
    assert_eq!(a.data(), &[10.0, 30.0]);
    // a mask longer than the array selects out of range
    assert_failure("v = [10 20]; v(logical([1 0 1 1]));");
}

#[test]
fn logical_indexing_preserves_kind() {
    let v = eval_value("m = logical([1 0 1]); m(1);");
    assert!(v.is_logical());
    let v = eval_value("z = [1i 2i]; z(2);");
    assert!(v.is_complex());
}

// ─── reads ──────────────────────────────────────────────────────────────

#[test]
fn read_bounds_are_checked_per_dimension() {
    assert_failure("A = [1 2; 3 4]; A(3, 1);");
    assert_failure("A = [1 2; 3 4]; A(1, 3);");
    assert_failure("A = [1 2; 3 4]; A(5);");
}

#[test]
fn three_subscript_reads() {
    // build a 2x2x2 value by pages through indexed writes
    let src = "A = zeros(2, 2); A(1, 1, 2) = 8;";
    assert_eq!(eval_scalar(&format!("{src} A(1, 1, 2);")), 8.0);
    assert_eq!(eval_scalar(&format!("{src} A(1, 1, 1);")), 0.0);
    assert_eq!(eval_scalar(&format!("{src} ndims(A);")), 3.0);
}

// ─── writes ─────────────────────────────────────────────────────────────

#[test]
fn scalar_broadcast_write() {
    let v = eval_value("v = [1 2 3 4]; v([1 3]) = 0; v;");
    let Value::Double(a) = &v else { panic!() };
    assert_eq!(a.data(), &[0.0, 2.0, 0.0, 4.0]);
    let v = eval_value("A = zeros(2); A(:, 2) = 7; A;");
    let Value::Double(a) = &v else { panic!() };
    assert_eq!(a.data(), &[0.0, 0.0, 7.0, 7.0]);
}

#[test]
fn array_write_fills_column_major() {
    let v = eval_value("A = zeros(2); A([1 2], [1 2]) = [1 2; 3 4]; A;");
    let Value::Double(a) = &v else { panic!() };
    assert_eq!(a.data(), &[1.0, 3.0, 2.0, 4.0]);
}

#[test]
fn mismatched_write_counts_raise() {
    assert_failure("v = [1 2 3]; v([1 2]) = [1 2 3];");
    assert_failure("A = zeros(2); A(:, 1) = [1 2 3];");
}

#[test]
fn writes_create_variables() {
    assert_eq!(eval_scalar("q(3) = 5; q(3);"), 5.0);
    assert_eq!(eval_scalar("q(3) = 5; numel(q);"), 3.0);
    assert_eq!(eval_scalar("q(3) = 5; q(1);"), 0.0);
}

#[test]
fn linear_write_growth_keeps_orientation() {
    let v = eval_value("v = [1 2 3]; v(5) = 9; v;");
    assert_eq!(v.dims().rows, 1);
    assert_eq!(v.dims().cols, 5);
    let v = eval_value("v = [1; 2; 3]; v(5) = 9; v;");
    assert_eq!(v.dims().rows, 5);
    assert_eq!(v.dims().cols, 1);
    assert_eq!(eval_scalar("v = [1 2 3]; v(5) = 9; v(4);"), 0.0);
}

#[test]
fn subscript_growth_preserves_content() {
    let src = "A = [1 2; 3 4]; A(3, 3) = 9;";
    assert_eq!(eval_scalar(&format!("{src} A(1, 1);")), 1.0);
    assert_eq!(eval_scalar(&format!("{src} A(2, 2);")), 4.0);
    assert_eq!(eval_scalar(&format!("{src} A(3, 3);")), 9.0);
    assert_eq!(eval_scalar(&format!("{src} A(3, 1);")), 0.0);
}

#[test]
fn complex_write_promotes_target() {
    let v = eval_value("v = [1 2 3]; v(2) = 1i; v;");
    assert!(v.is_complex());
    assert_eq!(eval_scalar("v = [1 2 3]; v(2) = 1i; real(v(1));"), 1.0);
    assert_eq!(eval_scalar("v = [1 2 3]; v(2) = 1i; imag(v(2));"), 1.0);
}

#[test]
fn logical_target_widens_for_numeric_write() {
    let v = eval_value("m = logical([1 0 1]); m(2) = 5; m;");
    assert!(matches!(v, Value::Double(_)));
    assert_eq!(eval_scalar("m = logical([1 0 1]); m(2) = 5; m(2);"), 5.0);
}

#[test]
fn char_write_stores_code_units() {
    assert_eq!(
        eval_value("s = 'hello'; s(1) = 'J'; s;")
            .to_string_value()
            .unwrap(),
        "Jello"
    );
    assert_eq!(
        eval_value("s = 'abc'; s([1 3]) = 'xy'; s;")
            .to_string_value()
            .unwrap(),
        "xby"
    );
}

#[test]
fn end_in_write_position() {
    let v = eval_value("v = [1 2 3]; v(end) = 9; v;");
    let Value::Double(a) = &v else { panic!() };
    assert_eq!(a.data(), &[1.0, 2.0, 9.0]);
    assert_eq!(eval_scalar("v = [1 2 3]; v(end + 1) = 4; numel(v);"), 4.0);
}

// ─── field and cell writes ──────────────────────────────────────────────

#[test]
fn field_chain_writes_create_structs() {
    assert_eq!(eval_scalar("a.b.c.d = 4; a.b.c.d;"), 4.0);
    // overwriting a non-struct with a field write replaces it
    assert_eq!(eval_scalar("x = 5; x.f = 1; x.f;"), 1.0);
}

#[test]
fn cell_slot_writes() {
    assert_eq!(eval_scalar("c = cell(1, 3); c{2} = 7; c{2};"), 7.0);
    assert_eq!(
        eval_value("c = {1, 'a'; 2, 'b'}; c{1, 2} = 'z'; c{1, 2};")
            .to_string_value()
            .unwrap(),
        "z"
    );
    assert_failure("c = {1, 2}; c{5} = 0;");
}

// ─── deletion ───────────────────────────────────────────────────────────

#[test]
fn linear_deletion_flattens() {
    let v = eval_value("A = [1 2; 3 4]; A(2) = []; A;");
    assert_eq!(v.dims().rows, 1);
    assert_eq!(v.dims().cols, 3);
    let Value::Double(a) = &v else { panic!() };
    assert_eq!(a.data(), &[1.0, 2.0, 4.0]);
}

#[test]
fn deletion_with_masks_and_ranges() {
    assert_eq!(eval_scalar("v = 1:10; v(v > 5) = []; numel(v);"), 5.0);
    assert_eq!(eval_scalar("v = 1:10; v(2:2:end) = []; numel(v);"), 5.0);
}

#[test]
fn char_deletion() {
    assert_eq!(
        eval_value("s = 'hello'; s(1) = []; s;").to_string_value().unwrap(),
        "ello"
    );
}

#[test]
fn deleting_everything_leaves_an_empty() {
    assert_eq!(eval_scalar("v = [1 2 3]; v(:) = []; numel(v);"), 0.0);
}

// ─── copy-on-write at the buffer level ──────────────────────────────────

#[test]
fn growth_through_one_alias_leaves_the_other() {
    let src = "v = [1 2 3]; w = v; w(10) = 1;";
    assert_eq!(eval_scalar(&format!("{src} numel(v);")), 3.0);
    assert_eq!(eval_scalar(&format!("{src} numel(w);")), 10.0);
}

#[test]
fn deletion_through_one_alias_leaves_the_other() {
    let src = "v = [1 2 3]; w = v; w(1) = [];";
    assert_eq!(eval_scalar(&format!("{src} numel(v);")), 3.0);
    assert_eq!(eval_scalar(&format!("{src} numel(w);")), 2.0);
}

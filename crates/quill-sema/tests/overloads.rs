//! Overload resolution: exact matches, literal defaulting during
//! ranking, widening preferences, ambiguity, and failures.

use quill_parser::ast::{Expr, Stmt};
use quill_parser::parse_source;
use quill_parser::ParseResult;
use quill_sema::{check, Analysis, FileId, SemaError, SourceUnit};

fn analyze(source: &str) -> (ParseResult, Analysis) {
    let parsed = parse_source(source);
    assert!(parsed.errors.is_empty(), "parse errors: {:?}", parsed.errors);
    let units = [SourceUnit { file: FileId(0), ast: &parsed.ast, unit: &parsed.unit }];
    let analysis = check(&units);
    (parsed, analysis)
}

/// The function symbol a call statement inside `main` bound to, described
/// by its first parameter's type.
fn bound_param_type(parsed: &ParseResult, analysis: &Analysis, call_index: usize) -> String {
    let main = parsed
        .unit
        .statements
        .iter()
        .find_map(|&s| match parsed.ast.stmt(s) {
            Stmt::FunctionDecl { name, body, .. } if name == "main" => Some(body.unwrap()),
            _ => None,
        })
        .expect("fn main");
    let Stmt::Block { statements } = parsed.ast.stmt(main) else { panic!("expected block") };
    let Stmt::Expr { expr } = parsed.ast.stmt(statements[call_index]) else {
        panic!("expected call statement");
    };
    let Expr::Call { callee, .. } = parsed.ast.expr(*expr) else { panic!("expected call") };
    let func = analysis
        .type_map
        .symbol_of(FileId(0), *callee)
        .expect("call should bind to a function symbol");
    let data = analysis.table.symbol(func).as_function().expect("function symbol");
    let param = data.parameters[0];
    let ty = analysis.table.symbol(param).value_type().unwrap();
    analysis.table.display_type(&analysis.types, ty)
}

#[test]
fn distinct_signatures_bind_by_argument_type() {
    let source = "fn f(x: i32) {} fn f(x: f64) {} fn main() { f(1); f(1.0); }";
    let (parsed, analysis) = analyze(source);
    assert!(analysis.errors.is_empty(), "no ambiguity expected: {:?}", analysis.errors);

    // Two symbols share the name with distinct signatures.
    assert_eq!(analysis.table.members_named(analysis.table.root(), "f").len(), 2);

    assert_eq!(bound_param_type(&parsed, &analysis, 0), "i32");
    assert_eq!(bound_param_type(&parsed, &analysis, 1), "f64");
}

#[test]
fn exact_match_beats_widening() {
    let source = "fn g(x: i64) {} fn g(x: i32) {} fn main() { g(7); }";
    let (parsed, analysis) = analyze(source);
    assert!(analysis.errors.is_empty(), "{:?}", analysis.errors);
    assert_eq!(bound_param_type(&parsed, &analysis, 0), "i32");
}

#[test]
fn widening_applies_when_no_exact_match() {
    let source = "fn h(x: i64) {} fn h(x: bool) {} fn main() { h(7); }";
    let (parsed, analysis) = analyze(source);
    assert!(analysis.errors.is_empty(), "{:?}", analysis.errors);
    assert_eq!(bound_param_type(&parsed, &analysis, 0), "i64");
}

#[test]
fn unbreakable_tie_is_ambiguous() {
    let source =
        "fn t(x: i32, y: f64) {} fn t(x: f64, y: i32) {} fn main() { t(1, 2); }";
    let (_, analysis) = analyze(source);
    assert!(
        analysis
            .errors
            .iter()
            .any(|e| matches!(e, SemaError::AmbiguousOverload { name, .. } if name == "t")),
        "expected ambiguity: {:?}",
        analysis.errors
    );
}

#[test]
fn no_candidate_matches() {
    let source = "fn k(x: bool) {} fn k(x: *char) {} fn main() { k(1); }";
    let (_, analysis) = analyze(source);
    assert!(
        analysis
            .errors
            .iter()
            .any(|e| matches!(e, SemaError::NoMatchingOverload { name, .. } if name == "k")),
        "expected no-match: {:?}",
        analysis.errors
    );
}

#[test]
fn arity_filters_candidates() {
    let source = "fn m(x: i32) {} fn m(x: i32, y: i32) {} fn main() { m(1, 2); }";
    let (parsed, analysis) = analyze(source);
    assert!(analysis.errors.is_empty(), "{:?}", analysis.errors);
    // Bound to the two-parameter overload.
    let main = parsed
        .unit
        .statements
        .iter()
        .find_map(|&s| match parsed.ast.stmt(s) {
            Stmt::FunctionDecl { name, body, .. } if name == "main" => Some(body.unwrap()),
            _ => None,
        })
        .unwrap();
    let Stmt::Block { statements } = parsed.ast.stmt(main) else { panic!() };
    let Stmt::Expr { expr } = parsed.ast.stmt(statements[0]) else { panic!() };
    let Expr::Call { callee, .. } = parsed.ast.expr(*expr) else { panic!() };
    let func = analysis.type_map.symbol_of(FileId(0), *callee).unwrap();
    assert_eq!(
        analysis.table.symbol(func).as_function().unwrap().parameters.len(),
        2
    );
}

#[test]
fn wrong_arity_single_candidate_reports() {
    let source = "fn solo(x: i32) {} fn main() { solo(); }";
    let (_, analysis) = analyze(source);
    assert!(
        analysis
            .errors
            .iter()
            .any(|e| matches!(e, SemaError::ArityMismatch { expected: 1, found: 0, .. })),
        "{:?}",
        analysis.errors
    );
}

#[test]
fn method_overloads_resolve_on_receiver() {
    let source = "type Calc {\
                    fn eval(x: i32): i32 { return x; }\
                    fn eval(x: f64): i32 { return 0; }\
                  }\
                  fn main() { var c = new Calc(); var r = c.eval(3); }";
    let (parsed, analysis) = analyze(source);
    assert!(analysis.errors.is_empty(), "{:?}", analysis.errors);

    // Find the call `c.eval(3)` and check its binding.
    let mut bound = None;
    for (&(_, expr), &sym) in &analysis.type_map.expr_symbols {
        if let Expr::MemberAccess { member, .. } = parsed.ast.expr(expr) {
            if member == "eval" {
                bound = Some(sym);
            }
        }
    }
    let func = bound.expect("eval call bound");
    let param = analysis.table.symbol(func).as_function().unwrap().parameters[0];
    let ty = analysis.table.symbol(param).value_type().unwrap();
    assert_eq!(analysis.table.display_type(&analysis.types, ty), "i32");
}

#[test]
fn constructor_overloads() {
    let source = "type Vec {\
                    var x: f64;\
                    new() { }\
                    new(x0: f64) { x = x0; }\
                  }\
                  fn main() { var a = new Vec(); var b = new Vec(1.0); }";
    let (_, analysis) = analyze(source);
    assert!(analysis.errors.is_empty(), "{:?}", analysis.errors);
}

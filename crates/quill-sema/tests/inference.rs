//! Type inference end-to-end: literal defaulting, inference chains, and
//! expression typing through whole programs.

use quill_parser::ast::Stmt;
use quill_parser::parse_source;
use quill_parser::ParseResult;
use quill_sema::{check, Analysis, FileId, SourceUnit};

fn analyze(source: &str) -> (ParseResult, Analysis) {
    let parsed = parse_source(source);
    assert!(parsed.errors.is_empty(), "parse errors: {:?}", parsed.errors);
    let units = [SourceUnit { file: FileId(0), ast: &parsed.ast, unit: &parsed.unit }];
    let analysis = check(&units);
    (parsed, analysis)
}

fn analyze_ok(source: &str) -> (ParseResult, Analysis) {
    let (parsed, analysis) = analyze(source);
    assert!(analysis.errors.is_empty(), "sema errors: {:?}", analysis.errors);
    (parsed, analysis)
}

/// Display the resolved type of a symbol found by dotted path from the
/// global namespace.
fn type_at_path(analysis: &Analysis, path: &[&str]) -> String {
    let mut sym = analysis.table.root();
    for segment in path {
        sym = *analysis
            .table
            .members_named(sym, segment)
            .first()
            .unwrap_or_else(|| panic!("no symbol '{segment}' under '{}'", analysis.table.qualified_name(sym)));
    }
    let ty = analysis
        .table
        .symbol(sym)
        .value_type()
        .unwrap_or_else(|| panic!("symbol '{}' has no type", path.join(".")));
    analysis.table.display_type(&analysis.types, ty)
}

#[test]
fn minimal_function_types_resolve_to_i32() {
    let (parsed, analysis) = analyze_ok("fn add(a: i32, b: i32): i32 { return a + b; }");

    assert_eq!(type_at_path(&analysis, &["add", "a"]), "i32");
    assert_eq!(type_at_path(&analysis, &["add", "b"]), "i32");

    let add = analysis.table.members_named(analysis.table.root(), "add")[0];
    let ret = analysis.table.symbol(add).as_function().unwrap().return_type.unwrap();
    assert_eq!(analysis.table.display_type(&analysis.types, ret), "i32");

    // Every annotated expression in the body resolves to i32.
    let Stmt::FunctionDecl { body, .. } = parsed.ast.stmt(parsed.unit.statements[0]) else {
        panic!("expected function");
    };
    let Stmt::Block { statements } = parsed.ast.stmt(body.unwrap()) else {
        panic!("expected block");
    };
    let Stmt::Return { value: Some(value) } = parsed.ast.stmt(statements[0]) else {
        panic!("expected return");
    };
    let value_ty = analysis.type_map.type_of(FileId(0), *value).expect("return value typed");
    assert_eq!(analysis.table.display_type(&analysis.types, value_ty), "i32");
}

#[test]
fn inference_chain_defaults_to_i32() {
    let (_, analysis) = analyze_ok("fn test() { var a = 42; var b = a; var c = b + 1; }");
    assert_eq!(type_at_path(&analysis, &["test", "a"]), "i32");
    assert_eq!(type_at_path(&analysis, &["test", "b"]), "i32");
    assert_eq!(type_at_path(&analysis, &["test", "c"]), "i32");
}

#[test]
fn literal_kinds_and_defaults() {
    let (_, analysis) = analyze_ok(
        "fn lits() { var a = 42; var b = 42L; var c = 1.5; var d = 1.5F; var s = \"hi\"; var ch = 'x'; var f = true; }",
    );
    assert_eq!(type_at_path(&analysis, &["lits", "a"]), "i32");
    assert_eq!(type_at_path(&analysis, &["lits", "b"]), "i64");
    assert_eq!(type_at_path(&analysis, &["lits", "c"]), "f64");
    assert_eq!(type_at_path(&analysis, &["lits", "d"]), "f32");
    assert_eq!(type_at_path(&analysis, &["lits", "s"]), "*char");
    assert_eq!(type_at_path(&analysis, &["lits", "ch"]), "char");
    assert_eq!(type_at_path(&analysis, &["lits", "f"]), "bool");
}

#[test]
fn annotation_constrains_literal() {
    let (_, analysis) = analyze_ok("fn f() { var x: i64 = 42; var y: f32 = 1.5F; }");
    assert_eq!(type_at_path(&analysis, &["f", "x"]), "i64");
    assert_eq!(type_at_path(&analysis, &["f", "y"]), "f32");
}

#[test]
fn usage_constrains_unannotated_variable() {
    // `v` has no initializer; the later assignment pins it.
    let (_, analysis) = analyze_ok("fn f(p: i64) { var v; v = p; }");
    assert_eq!(type_at_path(&analysis, &["f", "v"]), "i64");
}

#[test]
fn arithmetic_mixes_default_to_f64() {
    let (_, analysis) = analyze_ok("fn f() { var x = 1 + 1.5; }");
    assert_eq!(type_at_path(&analysis, &["f", "x"]), "f64");
}

#[test]
fn comparisons_produce_bool() {
    let (_, analysis) = analyze_ok("fn f() { var c = 1 < 2; var e = 1 == 2; }");
    assert_eq!(type_at_path(&analysis, &["f", "c"]), "bool");
    assert_eq!(type_at_path(&analysis, &["f", "e"]), "bool");
}

#[test]
fn array_literal_and_indexing() {
    let (_, analysis) = analyze_ok("fn f() { var xs = [1, 2, 3]; var x = xs[0]; }");
    assert_eq!(type_at_path(&analysis, &["f", "xs"]), "i32[3]");
    assert_eq!(type_at_path(&analysis, &["f", "x"]), "i32");
}

#[test]
fn pointer_operations() {
    let (_, analysis) = analyze_ok("fn f() { var x = 5; var p = &x; var y = *p; }");
    assert_eq!(type_at_path(&analysis, &["f", "p"]), "*i32");
    assert_eq!(type_at_path(&analysis, &["f", "y"]), "i32");
}

#[test]
fn range_of_integers() {
    let (_, analysis) = analyze_ok("fn f() { var r = 0..10; }");
    assert_eq!(type_at_path(&analysis, &["f", "r"]), "Range<i32>");
}

#[test]
fn function_return_flows_into_variables() {
    let (_, analysis) =
        analyze_ok("fn make(): i64 { return 7L; } fn f() { var v = make(); }");
    assert_eq!(type_at_path(&analysis, &["f", "v"]), "i64");
}

#[test]
fn conditional_branches_unify() {
    let (_, analysis) = analyze_ok("fn f(flag: bool) { var v = flag ? 1 : 2; }");
    assert_eq!(type_at_path(&analysis, &["f", "v"]), "i32");
}

#[test]
fn lambda_types_as_function_value() {
    let (_, analysis) = analyze_ok("fn f() { var g = (a: i32) => a + 1; var r = g(2); }");
    assert_eq!(type_at_path(&analysis, &["f", "g"]), "fn(i32) -> i32");
    assert_eq!(type_at_path(&analysis, &["f", "r"]), "i32");
}

#[test]
fn property_type_flows_to_accessors() {
    let (_, analysis) = analyze_ok(
        "type Counter { var total: i32; i32 count { get => total; set { total = value; } } }",
    );
    assert_eq!(type_at_path(&analysis, &["Counter", "count"]), "i32");
    // The setter's implicit `value` parameter carries the property type.
    let counter = analysis.table.members_named(analysis.table.root(), "Counter")[0];
    let count = analysis.table.members_named(counter, "count")[0];
    let set = analysis.table.members_named(count, "set")[0];
    let value = analysis.table.members_named(set, "value")[0];
    let value_ty = analysis.table.symbol(value).value_type().unwrap();
    assert_eq!(analysis.table.display_type(&analysis.types, value_ty), "i32");
}

#[test]
fn fields_resolve_and_lay_out() {
    let (_, analysis) = analyze_ok("type Point { var x: i32; var y: i32; }");
    let point = analysis.table.members_named(analysis.table.root(), "Point")[0];
    let data = analysis.table.symbol(point).as_type().unwrap();
    assert_eq!(data.size, 8);
    assert_eq!(data.alignment, 4);

    let y = analysis.table.members_named(point, "y")[0];
    if let quill_sema::SymbolData::Field(field) = &analysis.table.symbol(y).data {
        assert_eq!(field.offset, 4);
        assert_eq!(field.alignment, 4);
    } else {
        panic!("expected field");
    }
}

#[test]
fn enum_member_shorthand_infers_from_context() {
    let (_, analysis) = analyze_ok(
        "enum Color { Red, Green, } fn f() { var c: Color = .Green; var d = Color.Red; }",
    );
    assert_eq!(type_at_path(&analysis, &["f", "c"]), "Color");
    assert_eq!(type_at_path(&analysis, &["f", "d"]), "Color");
}

#[test]
fn this_has_the_enclosing_type() {
    let (_, analysis) = analyze_ok("type P { var x: i32; fn grab(): i32 { return this.x; } }");
    let p = analysis.table.members_named(analysis.table.root(), "P")[0];
    let grab = analysis.table.members_named(p, "grab")[0];
    let ret = analysis.table.symbol(grab).as_function().unwrap().return_type.unwrap();
    assert_eq!(analysis.table.display_type(&analysis.types, ret), "i32");
}

#[test]
fn missing_nodes_produce_no_sema_errors() {
    // One parse error (`expected ';'`), recovered declarations still type.
    let parsed = parse_source("var x = 1 var y = 2;");
    assert_eq!(parsed.errors.len(), 1);
    let units = [SourceUnit { file: FileId(0), ast: &parsed.ast, unit: &parsed.unit }];
    let analysis = check(&units);
    assert!(analysis.errors.is_empty(), "sema must not cascade: {:?}", analysis.errors);
    assert_eq!(type_at_path(&analysis, &["x"]), "i32");
    assert_eq!(type_at_path(&analysis, &["y"]), "i32");
}

//! Multi-file analysis: symbol table merging, cross-file resolution, and
//! conflict reporting.

use quill_parser::parse_source;
use quill_parser::ParseResult;
use quill_sema::{check, Analysis, FileId, SemaError, SourceUnit};

fn analyze_files(sources: &[&str]) -> (Vec<ParseResult>, Analysis) {
    let parsed: Vec<ParseResult> = sources
        .iter()
        .map(|s| {
            let r = parse_source(s);
            assert!(r.errors.is_empty(), "parse errors: {:?}", r.errors);
            r
        })
        .collect();
    let units: Vec<SourceUnit> = parsed
        .iter()
        .enumerate()
        .map(|(i, r)| SourceUnit { file: FileId(i as u32), ast: &r.ast, unit: &r.unit })
        .collect();
    let analysis = check(&units);
    (parsed, analysis)
}

#[test]
fn function_vs_variable_conflict() {
    let (_, analysis) = analyze_files(&["fn foo() {}", "var foo: i32;"]);
    let conflict = analysis
        .errors
        .iter()
        .find_map(|e| match e {
            SemaError::MergeConflict { message } => Some(message.clone()),
            _ => None,
        })
        .expect("expected a merge conflict");
    assert_eq!(conflict, "Symbol conflict: 'foo' already exists in namespace ''");
}

#[test]
fn cross_file_function_call_resolves() {
    let (_, analysis) = analyze_files(&[
        "fn helper(x: i32): i32 { return x + 1; }",
        "fn main() { var r = helper(5); }",
    ]);
    assert!(analysis.errors.is_empty(), "{:?}", analysis.errors);
    let main = analysis.table.members_named(analysis.table.root(), "main")[0];
    let r = analysis.table.members_named(main, "r")[0];
    let ty = analysis.table.symbol(r).value_type().unwrap();
    assert_eq!(analysis.table.display_type(&analysis.types, ty), "i32");
}

#[test]
fn cross_file_overloads_combine() {
    let (_, analysis) = analyze_files(&[
        "fn f(x: i32): i32 { return x; }",
        "fn f(x: f64): f64 { return x; }\nfn main() { var a = f(1); var b = f(2.0); }",
    ]);
    assert!(analysis.errors.is_empty(), "{:?}", analysis.errors);
    assert_eq!(analysis.table.members_named(analysis.table.root(), "f").len(), 2);

    let main = analysis.table.members_named(analysis.table.root(), "main")[0];
    let a = analysis.table.members_named(main, "a")[0];
    let b = analysis.table.members_named(main, "b")[0];
    let show = |sym| {
        let ty = analysis.table.symbol(sym).value_type().unwrap();
        analysis.table.display_type(&analysis.types, ty)
    };
    assert_eq!(show(a), "i32");
    assert_eq!(show(b), "f64");
}

#[test]
fn identical_cross_file_signatures_conflict() {
    let (_, analysis) =
        analyze_files(&["fn dup(x: i32) {}", "fn dup(y: i32) {}"]);
    assert!(
        analysis
            .errors
            .iter()
            .any(|e| matches!(e, SemaError::MergeConflict { message } if message.contains("'dup'"))),
        "{:?}",
        analysis.errors
    );
}

#[test]
fn same_namespace_across_files_merges() {
    let (_, analysis) = analyze_files(&[
        "namespace app { fn one(): i32 { return 1; } }",
        "namespace app { fn two(): i32 { return one() + 1; } }",
    ]);
    assert!(analysis.errors.is_empty(), "{:?}", analysis.errors);
    assert_eq!(analysis.table.members_named(analysis.table.root(), "app").len(), 1);
    let app = analysis.table.members_named(analysis.table.root(), "app")[0];
    assert!(!analysis.table.members_named(app, "one").is_empty());
    assert!(!analysis.table.members_named(app, "two").is_empty());
}

#[test]
fn merge_is_commutative_for_disjoint_files() {
    let file_a = "namespace alpha { fn a() {} }";
    let file_b = "namespace beta { fn b() {} }";

    let collect = |analysis: &Analysis| {
        let mut names: Vec<String> = analysis
            .table
            .iter_ids()
            .filter(|&id| {
                matches!(
                    analysis.table.symbol(id).data,
                    quill_sema::SymbolData::Function(_) | quill_sema::SymbolData::Namespace(_)
                )
            })
            .map(|id| analysis.table.qualified_name(id))
            .collect();
        names.sort();
        names
    };

    let (_, ab) = analyze_files(&[file_a, file_b]);
    let (_, ba) = analyze_files(&[file_b, file_a]);
    assert!(ab.errors.is_empty() && ba.errors.is_empty());
    assert_eq!(collect(&ab), collect(&ba));
}

#[test]
fn cross_file_type_usage() {
    let (_, analysis) = analyze_files(&[
        "ref type Logger { fn log(level: i32) { } }",
        "fn main() { var l = new Logger(); l.log(3); }",
    ]);
    assert!(analysis.errors.is_empty(), "{:?}", analysis.errors);
    let main = analysis.table.members_named(analysis.table.root(), "main")[0];
    let l = analysis.table.members_named(main, "l")[0];
    let ty = analysis.table.symbol(l).value_type().unwrap();
    // Reference types construct to a pointer to the type.
    assert_eq!(analysis.table.display_type(&analysis.types, ty), "*Logger");
}

#[test]
fn using_directive_imports_namespace() {
    let (_, analysis) = analyze_files(&[
        "namespace math { fn square(x: i32): i32 { return x * x; } }",
        "using math;\nfn main() { var n = square(4); }",
    ]);
    assert!(analysis.errors.is_empty(), "{:?}", analysis.errors);
    let main = analysis.table.members_named(analysis.table.root(), "main")[0];
    let n = analysis.table.members_named(main, "n")[0];
    let ty = analysis.table.symbol(n).value_type().unwrap();
    assert_eq!(analysis.table.display_type(&analysis.types, ty), "i32");
}

#[test]
fn qualified_access_without_using() {
    let (_, analysis) = analyze_files(&[
        "namespace math { fn square(x: i32): i32 { return x * x; } }",
        "fn main() { var n = math.square(4); }",
    ]);
    assert!(analysis.errors.is_empty(), "{:?}", analysis.errors);
}

#[test]
fn unknown_using_target_is_reported() {
    let (_, analysis) = analyze_files(&["using nowhere;\nfn main() { }"]);
    assert!(
        analysis
            .errors
            .iter()
            .any(|e| matches!(e, SemaError::UnknownNamespace { path, .. } if path == "nowhere")),
        "{:?}",
        analysis.errors
    );
}

#[test]
fn type_alias_resolves_in_type_position() {
    let (_, analysis) = analyze_files(&["using Id = i64;\nfn f() { var x: Id = 3L; }"]);
    assert!(analysis.errors.is_empty(), "{:?}", analysis.errors);
    let f = analysis.table.members_named(analysis.table.root(), "f")[0];
    let x = analysis.table.members_named(f, "x")[0];
    let ty = analysis.table.symbol(x).value_type().unwrap();
    assert_eq!(analysis.table.display_type(&analysis.types, ty), "i64");
}

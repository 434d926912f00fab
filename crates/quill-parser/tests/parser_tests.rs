//! Integration tests for the Quill parser: grammar shape, precedence and
//! associativity, declaration forms, error recovery, and round-trip
//! printing.

use quill_parser::ast::{
    AccessorBody, AssignOp, BinaryOp, Expr, LiteralKind, Stmt, TypeDeclKind, UnaryOp, UsingKind,
};
use quill_parser::code_printer::CodePrinter;
use quill_parser::compare::units_eq;
use quill_parser::visit::{walk_expr, walk_stmt, Visitor};
use quill_parser::{parse_source, Ast, ExprId, ParseResult, StmtId};

fn parse_ok(source: &str) -> ParseResult {
    let result = parse_source(source);
    assert!(
        result.errors.is_empty(),
        "unexpected parse errors for {source:?}: {:?}",
        result.errors
    );
    result
}

/// Unwrap the initializer expression of `var NAME = <expr>;` at the given
/// top-level statement index.
fn initializer(result: &ParseResult, index: usize) -> ExprId {
    match result.ast.stmt(result.unit.statements[index]) {
        Stmt::VarDecl { initializer: Some(init), .. } => *init,
        other => panic!("expected var decl with initializer, got {other:?}"),
    }
}

// ── Expression grammar ─────────────────────────────────────────────────

#[test]
fn minimal_function_shape() {
    let result = parse_ok("fn add(a: i32, b: i32): i32 { return a + b; }");
    assert_eq!(result.unit.statements.len(), 1);

    let Stmt::FunctionDecl { name, params, return_ty, body, .. } =
        result.ast.stmt(result.unit.statements[0])
    else {
        panic!("expected function declaration");
    };
    assert_eq!(name, "add");
    assert_eq!(params.len(), 2);
    for &param in params {
        let Stmt::ParamDecl { param: typed, .. } = result.ast.stmt(param) else {
            panic!("expected parameter");
        };
        assert!(typed.ty.is_some(), "parameters should carry declared types");
    }
    let ret = return_ty.expect("return type");
    assert!(matches!(result.ast.expr(ret), Expr::Name { ident } if ident == "i32"));

    let Stmt::Block { statements } = result.ast.stmt(body.expect("body")) else {
        panic!("expected block body");
    };
    assert_eq!(statements.len(), 1);
    let Stmt::Return { value: Some(value) } = result.ast.stmt(statements[0]) else {
        panic!("expected return statement");
    };
    let Expr::Binary { left, op, right } = result.ast.expr(*value) else {
        panic!("expected binary return value");
    };
    assert_eq!(*op, BinaryOp::Add);
    assert!(matches!(result.ast.expr(*left), Expr::Name { ident } if ident == "a"));
    assert!(matches!(result.ast.expr(*right), Expr::Name { ident } if ident == "b"));
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let result = parse_ok("var r = a + b * c;");
    let Expr::Binary { op, right, .. } = result.ast.expr(initializer(&result, 0)) else {
        panic!("expected binary root");
    };
    assert_eq!(*op, BinaryOp::Add, "lower-precedence operator must be the root");
    assert!(matches!(
        result.ast.expr(*right),
        Expr::Binary { op: BinaryOp::Multiply, .. }
    ));
}

#[test]
fn precedence_ladder_pairs() {
    // For `a op1 b op2 c` with prec(op1) < prec(op2), op1 is the root.
    let cases = [
        ("var r = a || b && c;", BinaryOp::LogicalOr),
        ("var r = a == b < c;", BinaryOp::Equals),
        ("var r = a | b ^ c;", BinaryOp::BitwiseOr),
        ("var r = a ^ b & c;", BinaryOp::BitwiseXor),
        ("var r = a << b + c;", BinaryOp::LeftShift),
        ("var r = a < b >> c;", BinaryOp::Less),
    ];
    for (source, root) in cases {
        let result = parse_ok(source);
        let Expr::Binary { op, .. } = result.ast.expr(initializer(&result, 0)) else {
            panic!("expected binary root for {source}");
        };
        assert_eq!(*op, root, "wrong root operator for {source}");
    }
}

#[test]
fn subtraction_is_left_associative() {
    let result = parse_ok("var r = a - b - c;");
    let Expr::Binary { left, op, .. } = result.ast.expr(initializer(&result, 0)) else {
        panic!("expected binary root");
    };
    assert_eq!(*op, BinaryOp::Subtract);
    assert!(
        matches!(result.ast.expr(*left), Expr::Binary { op: BinaryOp::Subtract, .. }),
        "a - b - c must parse as (a - b) - c"
    );
}

#[test]
fn assignment_is_right_associative() {
    let result = parse_ok("a = b = c;");
    let Stmt::Expr { expr } = result.ast.stmt(result.unit.statements[0]) else {
        panic!("expected expression statement");
    };
    let Expr::Assign { target, op, value } = result.ast.expr(*expr) else {
        panic!("expected assignment root");
    };
    assert_eq!(*op, AssignOp::Assign);
    assert!(matches!(result.ast.expr(*target), Expr::Name { ident } if ident == "a"));
    assert!(
        matches!(result.ast.expr(*value), Expr::Assign { .. }),
        "a = b = c must parse as a = (b = c)"
    );
}

#[test]
fn compound_assignment_operators() {
    let result = parse_ok("x += 1; y <<= 2; z ??= w;");
    let expected = [AssignOp::Add, AssignOp::LeftShift, AssignOp::Coalesce];
    for (i, want) in expected.iter().enumerate() {
        let Stmt::Expr { expr } = result.ast.stmt(result.unit.statements[i]) else {
            panic!("expected expression statement");
        };
        let Expr::Assign { op, .. } = result.ast.expr(*expr) else {
            panic!("expected assignment");
        };
        assert_eq!(op, want);
    }
}

#[test]
fn ternary_conditional() {
    let result = parse_ok("var r = ok ? 1 : 2;");
    assert!(matches!(
        result.ast.expr(initializer(&result, 0)),
        Expr::Conditional { .. }
    ));
}

#[test]
fn prefix_and_postfix_unary() {
    let result = parse_ok("var r = -a++;");
    let Expr::Unary { op, operand, postfix } = result.ast.expr(initializer(&result, 0)) else {
        panic!("expected unary root");
    };
    assert_eq!(*op, UnaryOp::Minus);
    assert!(!postfix);
    let Expr::Unary { op: inner_op, postfix: inner_postfix, .. } = result.ast.expr(*operand)
    else {
        panic!("expected postfix increment operand");
    };
    assert_eq!(*inner_op, UnaryOp::Increment);
    assert!(*inner_postfix);
}

#[test]
fn address_of_and_dereference() {
    let result = parse_ok("var p = &x; var v = *p;");
    assert!(matches!(
        result.ast.expr(initializer(&result, 0)),
        Expr::Unary { op: UnaryOp::AddressOf, postfix: false, .. }
    ));
    assert!(matches!(
        result.ast.expr(initializer(&result, 1)),
        Expr::Unary { op: UnaryOp::Dereference, postfix: false, .. }
    ));
}

#[test]
fn postfix_chain_call_index_member() {
    let result = parse_ok("var r = a.b[0].c(1, 2);");
    let Expr::Call { callee, args } = result.ast.expr(initializer(&result, 0)) else {
        panic!("expected call root");
    };
    assert_eq!(args.len(), 2);
    let Expr::MemberAccess { object, member, .. } = result.ast.expr(*callee) else {
        panic!("expected member access callee");
    };
    assert_eq!(member, "c");
    assert!(matches!(result.ast.expr(*object), Expr::Index { .. }));
}

#[test]
fn generic_call_commits_with_disambiguator() {
    let result = parse_ok("var v = b.get<i32>();");
    let Expr::Call { callee, .. } = result.ast.expr(initializer(&result, 0)) else {
        panic!("expected call");
    };
    let Expr::GenericName { base, type_args } = result.ast.expr(*callee) else {
        panic!("expected generic name callee");
    };
    assert_eq!(type_args.len(), 1);
    assert!(matches!(result.ast.expr(*base), Expr::MemberAccess { member, .. } if member == "get"));
}

#[test]
fn less_than_stays_a_comparison() {
    let result = parse_ok("var c = a < b;");
    assert!(matches!(
        result.ast.expr(initializer(&result, 0)),
        Expr::Binary { op: BinaryOp::Less, .. }
    ));
}

#[test]
fn nested_generic_arguments_split_right_shift() {
    let result = parse_ok("List<List<i32>> xs = new List<List<i32>>();");
    let Stmt::VarDecl { variable, initializer, .. } =
        result.ast.stmt(result.unit.statements[0])
    else {
        panic!("expected typed local declaration");
    };
    let ty = variable.ty.expect("declared type");
    let Expr::GenericName { type_args, .. } = result.ast.expr(ty) else {
        panic!("expected generic declared type");
    };
    assert!(matches!(
        result.ast.expr(type_args[0]),
        Expr::GenericName { .. }
    ));
    assert!(matches!(
        result.ast.expr(initializer.expect("initializer")),
        Expr::New { .. }
    ));
}

#[test]
fn range_expressions() {
    let result = parse_ok("var r = 0..10; var s = 0..=n;");
    assert!(matches!(
        result.ast.expr(initializer(&result, 0)),
        Expr::Range { inclusive: false, .. }
    ));
    assert!(matches!(
        result.ast.expr(initializer(&result, 1)),
        Expr::Range { inclusive: true, .. }
    ));
}

#[test]
fn cast_expression() {
    let result = parse_ok("var x = (i32) y;");
    let Expr::Cast { target_ty, value } = result.ast.expr(initializer(&result, 0)) else {
        panic!("expected cast");
    };
    assert!(matches!(result.ast.expr(*target_ty), Expr::Name { ident } if ident == "i32"));
    assert!(matches!(result.ast.expr(*value), Expr::Name { ident } if ident == "y"));
}

#[test]
fn parenthesized_expression_is_not_a_cast() {
    let result = parse_ok("var x = (y) + 1;");
    let Expr::Binary { left, op, .. } = result.ast.expr(initializer(&result, 0)) else {
        panic!("expected binary");
    };
    assert_eq!(*op, BinaryOp::Add);
    assert!(matches!(result.ast.expr(*left), Expr::Paren { .. }));
}

#[test]
fn lambda_forms() {
    let result = parse_ok("var f = x => x + 1; var g = (a: i32, b: i32) => { return a + b; };");
    let Expr::Lambda { params, .. } = result.ast.expr(initializer(&result, 0)) else {
        panic!("expected lambda");
    };
    assert_eq!(params.len(), 1);

    let Expr::Lambda { params, body } = result.ast.expr(initializer(&result, 1)) else {
        panic!("expected lambda");
    };
    assert_eq!(params.len(), 2);
    assert!(matches!(body, quill_parser::ast::LambdaBody::Block(_)));
}

#[test]
fn array_literal_and_index() {
    let result = parse_ok("var a = [1, 2, 3]; var b = a[0];");
    let Expr::ArrayLiteral { elements } = result.ast.expr(initializer(&result, 0)) else {
        panic!("expected array literal");
    };
    assert_eq!(elements.len(), 3);
    assert!(matches!(result.ast.expr(initializer(&result, 1)), Expr::Index { .. }));
}

#[test]
fn implicit_enum_member() {
    let result = parse_ok("var c = .Red;");
    assert!(matches!(
        result.ast.expr(initializer(&result, 0)),
        Expr::ImplicitMember { member } if member == "Red"
    ));
}

#[test]
fn typeof_sizeof_new() {
    let result = parse_ok("var t = typeof(i32); var s = sizeof(f64); var b = new Box<i32>();");
    assert!(matches!(result.ast.expr(initializer(&result, 0)), Expr::TypeOf { .. }));
    assert!(matches!(result.ast.expr(initializer(&result, 1)), Expr::SizeOf { .. }));
    let Expr::New { ty, args } = result.ast.expr(initializer(&result, 2)) else {
        panic!("expected new expression");
    };
    assert!(matches!(result.ast.expr(*ty), Expr::GenericName { .. }));
    assert!(args.is_empty());
}

#[test]
fn literal_kinds_preserve_raw_text() {
    let result = parse_ok(r#"var a = 42L; var b = 1.5F; var c = "hi"; var d = 'x'; var e = null;"#);
    let expected = [
        (LiteralKind::Long, "42L"),
        (LiteralKind::Float, "1.5F"),
        (LiteralKind::String, "\"hi\""),
        (LiteralKind::Char, "'x'"),
        (LiteralKind::Null, "null"),
    ];
    for (i, (kind, text)) in expected.iter().enumerate() {
        let Expr::Literal { kind: k, text: t } = result.ast.expr(initializer(&result, i)) else {
            panic!("expected literal");
        };
        assert_eq!((k, t.as_str()), (kind, *text));
    }
}

// ── Declarations ───────────────────────────────────────────────────────

#[test]
fn type_declaration_member_forms() {
    let source = "type Point {\
                    var x: i32;\
                    var y: i32;\
                    fn dist(): f64 { return 0.0; }\
                    new(x0: i32) { }\
                    i32 z;\
                    f64 len { get => 0.0; set { } }\
                  }";
    let result = parse_ok(source);
    let Stmt::TypeDecl { name, kind, members, .. } = result.ast.stmt(result.unit.statements[0])
    else {
        panic!("expected type declaration");
    };
    assert_eq!(name, "Point");
    assert_eq!(*kind, TypeDeclKind::Value);
    assert_eq!(members.len(), 6);
    assert!(matches!(result.ast.stmt(members[0]), Stmt::VarDecl { .. }));
    assert!(matches!(result.ast.stmt(members[2]), Stmt::FunctionDecl { .. }));
    assert!(matches!(result.ast.stmt(members[3]), Stmt::ConstructorDecl { .. }));
    assert!(matches!(result.ast.stmt(members[4]), Stmt::VarDecl { .. }));

    let Stmt::PropertyDecl { getter, setter, .. } = result.ast.stmt(members[5]) else {
        panic!("expected property");
    };
    assert!(matches!(getter.as_ref().unwrap().body, AccessorBody::Expression(_)));
    assert!(matches!(setter.as_ref().unwrap().body, AccessorBody::Block(_)));
}

#[test]
fn ref_and_static_type_kinds() {
    let result = parse_ok("ref type Node { } static type Math { } enum Color { Red, Green, }");
    let kinds: Vec<_> = result
        .unit
        .statements
        .iter()
        .map(|&s| match result.ast.stmt(s) {
            Stmt::TypeDecl { kind, .. } => *kind,
            other => panic!("expected type declaration, got {other:?}"),
        })
        .collect();
    assert_eq!(kinds, vec![TypeDeclKind::Ref, TypeDeclKind::Static, TypeDeclKind::Enum]);
}

#[test]
fn enum_cases_with_payloads() {
    let result = parse_ok("enum Shape { Circle(radius: f64), Square(side: f64), Point, }");
    let Stmt::TypeDecl { kind, members, .. } = result.ast.stmt(result.unit.statements[0]) else {
        panic!("expected enum declaration");
    };
    assert_eq!(*kind, TypeDeclKind::Enum);
    assert_eq!(members.len(), 3);
    let Stmt::EnumCaseDecl { name, payload, .. } = result.ast.stmt(members[0]) else {
        panic!("expected enum case");
    };
    assert_eq!(name, "Circle");
    assert_eq!(payload.len(), 1);
    let Stmt::EnumCaseDecl { payload, .. } = result.ast.stmt(members[2]) else {
        panic!("expected enum case");
    };
    assert!(payload.is_empty());
}

#[test]
fn generic_type_and_function_parameters() {
    let result = parse_ok("type Box<T> { var value: T; fn get(): T { return value; } }");
    let Stmt::TypeDecl { type_params, .. } = result.ast.stmt(result.unit.statements[0]) else {
        panic!("expected type declaration");
    };
    assert_eq!(type_params.len(), 1);
    assert!(matches!(
        result.ast.stmt(type_params[0]),
        Stmt::TypeParamDecl { name } if name == "T"
    ));
}

#[test]
fn abstract_function_has_no_body() {
    let result = parse_ok("abstract type Shape { abstract fn area(): f64; }");
    let Stmt::TypeDecl { members, .. } = result.ast.stmt(result.unit.statements[0]) else {
        panic!("expected type declaration");
    };
    let Stmt::FunctionDecl { body, .. } = result.ast.stmt(members[0]) else {
        panic!("expected function");
    };
    assert!(body.is_none());
}

#[test]
fn base_type_list() {
    let result = parse_ok("ref type Square : Shape, Printable { }");
    let Stmt::TypeDecl { base_types, .. } = result.ast.stmt(result.unit.statements[0]) else {
        panic!("expected type declaration");
    };
    assert_eq!(base_types.len(), 2);
}

#[test]
fn namespaces_and_usings() {
    let source = "namespace app.core;\nusing sys.io;\nusing Ints = i32;\nnamespace util { fn noop() { } }";
    let result = parse_ok(source);

    let Stmt::NamespaceDecl { path, file_scoped, .. } =
        result.ast.stmt(result.unit.statements[0])
    else {
        panic!("expected namespace");
    };
    assert_eq!(path, &["app", "core"]);
    assert!(file_scoped);

    let Stmt::Using { kind, path, .. } = result.ast.stmt(result.unit.statements[1]) else {
        panic!("expected using");
    };
    assert_eq!(*kind, UsingKind::Namespace);
    assert_eq!(path, &["sys", "io"]);

    let Stmt::Using { kind, alias, aliased_type, .. } =
        result.ast.stmt(result.unit.statements[2])
    else {
        panic!("expected using alias");
    };
    assert_eq!(*kind, UsingKind::Alias);
    assert_eq!(alias.as_deref(), Some("Ints"));
    assert!(aliased_type.is_some());

    let Stmt::NamespaceDecl { file_scoped, body, .. } =
        result.ast.stmt(result.unit.statements[3])
    else {
        panic!("expected namespace");
    };
    assert!(!file_scoped);
    assert_eq!(body.as_ref().unwrap().len(), 1);
}

#[test]
fn modifiers_collect_into_flags() {
    use quill_common::modifiers::ModifierFlags;
    let result = parse_ok("type Holder { public static var count: i32; }");
    let Stmt::TypeDecl { members, .. } = result.ast.stmt(result.unit.statements[0]) else {
        panic!("expected type declaration");
    };
    let Stmt::VarDecl { modifiers, .. } = result.ast.stmt(members[0]) else {
        panic!("expected field");
    };
    assert!(modifiers.contains(ModifierFlags::PUBLIC | ModifierFlags::STATIC));
}

#[test]
fn control_flow_statements() {
    let source = "fn m() { if (a) { } else { } while (b) { break; } for (var i: i32 = 0; i < 10; i = i + 1) { continue; } }";
    let result = parse_ok(source);
    let Stmt::FunctionDecl { body, .. } = result.ast.stmt(result.unit.statements[0]) else {
        panic!("expected function");
    };
    let Stmt::Block { statements } = result.ast.stmt(body.unwrap()) else {
        panic!("expected block");
    };
    assert!(matches!(result.ast.stmt(statements[0]), Stmt::If { else_branch: Some(_), .. }));
    assert!(matches!(result.ast.stmt(statements[1]), Stmt::While { .. }));
    let Stmt::For { init, condition, updates, .. } = result.ast.stmt(statements[2]) else {
        panic!("expected for");
    };
    assert!(init.is_some());
    assert!(condition.is_some());
    assert_eq!(updates.len(), 1);
}

// ── Error recovery ─────────────────────────────────────────────────────

#[test]
fn missing_semicolon_recovers_without_cascade() {
    let result = parse_source("var x = 1 var y = 2;");
    let messages: Vec<_> = result.errors.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, vec!["expected ';'"]);
    assert_eq!(result.unit.statements.len(), 2);
    for &stmt in &result.unit.statements {
        assert!(matches!(result.ast.stmt(stmt), Stmt::VarDecl { .. }));
    }
}

#[test]
fn break_outside_loop_is_reported_but_parsed() {
    let result = parse_source("fn main() { break; }");
    assert!(result.errors.iter().any(|e| e.message == "break outside of loop"));
    let Stmt::FunctionDecl { body, .. } = result.ast.stmt(result.unit.statements[0]) else {
        panic!("expected function");
    };
    let Stmt::Block { statements } = result.ast.stmt(body.unwrap()) else {
        panic!("expected block");
    };
    assert!(matches!(result.ast.stmt(statements[0]), Stmt::Break));
}

#[test]
fn missing_expression_produces_placeholder() {
    let result = parse_source("var x = ;");
    assert!(!result.errors.is_empty());
    let Stmt::VarDecl { initializer: Some(init), .. } =
        result.ast.stmt(result.unit.statements[0])
    else {
        panic!("expected var decl");
    };
    assert!(matches!(result.ast.expr(*init), Expr::Missing { .. }));
}

#[test]
fn unbalanced_brace_recovers_at_closing_delimiter() {
    let result = parse_source("fn f() { if (x } fn g() {}");
    assert!(!result.errors.is_empty());
    let names: Vec<_> = result
        .unit
        .statements
        .iter()
        .filter_map(|&s| match result.ast.stmt(s) {
            Stmt::FunctionDecl { name, .. } => Some(name.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(names, vec!["f".to_string(), "g".to_string()]);
}

#[test]
fn stray_token_synchronizes_to_next_declaration() {
    let result = parse_source("fn f() {} @ fn g() {}");
    assert!(!result.errors.is_empty());
    let function_count = result
        .unit
        .statements
        .iter()
        .filter(|&&s| matches!(result.ast.stmt(s), Stmt::FunctionDecl { .. }))
        .count();
    assert_eq!(function_count, 2);
    assert!(result
        .unit
        .statements
        .iter()
        .any(|&s| matches!(result.ast.stmt(s), Stmt::Missing { .. })));
}

#[test]
fn every_missing_node_has_a_diagnostic() {
    for source in ["var x = ;", "fn () {}", "type { }", "var y = (1 + ;"] {
        let result = parse_source(source);
        let mut missing = 0usize;
        for id in 0..result.ast.expr_count() {
            if matches!(result.ast.expr(ExprId(id as u32)), Expr::Missing { .. }) {
                missing += 1;
            }
        }
        for id in 0..result.ast.stmt_count() {
            if matches!(result.ast.stmt(StmtId(id as u32)), Stmt::Missing { .. }) {
                missing += 1;
            }
        }
        assert!(
            result.errors.len() >= missing,
            "{source:?}: {} missing nodes but only {} diagnostics",
            missing,
            result.errors.len()
        );
    }
}

// ── Arena soundness ────────────────────────────────────────────────────

struct SoundnessCheck<'a> {
    ast: &'a Ast,
    visited_exprs: usize,
    visited_stmts: usize,
}

impl<'a> Visitor for SoundnessCheck<'a> {
    fn visit_expr(&mut self, ast: &Ast, id: ExprId) {
        assert!(self.ast.contains_expr(id), "dangling expression handle {id:?}");
        self.visited_exprs += 1;
        walk_expr(self, ast, id);
    }

    fn visit_stmt(&mut self, ast: &Ast, id: StmtId) {
        assert!(self.ast.contains_stmt(id), "dangling statement handle {id:?}");
        self.visited_stmts += 1;
        walk_stmt(self, ast, id);
    }
}

#[test]
fn every_reachable_handle_is_inside_the_arena() {
    let source = "namespace demo { type Box<T> { var value: T; fn get(): T { return value; } } \
                  fn main() { var b = new Box<i32>(); var v = b.get(); if (v < 10) { v = v + 1; } } }";
    let result = parse_ok(source);
    let mut check = SoundnessCheck { ast: &result.ast, visited_exprs: 0, visited_stmts: 0 };
    check.visit_unit(&result.ast, &result.unit);
    assert!(check.visited_exprs > 0);
    assert!(check.visited_stmts > 0);
}

// ── Round-trip printing ────────────────────────────────────────────────

#[test]
fn printed_source_reparses_to_identical_tree() {
    let sources = [
        "fn add(a: i32, b: i32): i32 { return a + b; }",
        "type Point { var x: i32; var y: i32; fn norm(): f64 { return 0.0; } }",
        "ref type Node : Base { i32 depth { get => 1; set { d = value; } } new(v: i32) { } }",
        "enum Color { Red, Green, Blue, }",
        "namespace app { using sys.io; fn main() { var xs = [1, 2, 3]; var n = xs[0] + 2 * 3; } }",
        "fn m() { for (var i: i32 = 0; i < 10; i++) { continue; } while (true) { break; } }",
        "fn c() { var r = ok ? a + 1 : b - 2; var p: *i32; var arr: i32[4]; var cb: fn(i32) -> i32; }",
        "fn l() { var f = x => x + 1; var g = (a: i32) => { return a; }; }",
        "fn r() { var span = 0..10; var upto = 0..=limit; var casted = (i64) value; }",
    ];
    for source in sources {
        let first = parse_ok(source);
        let printed = CodePrinter::new(&first.ast).print_unit(&first.unit);
        let second = parse_source(&printed);
        assert!(
            second.errors.is_empty(),
            "printed source failed to reparse for {source:?}:\n{printed}\nerrors: {:?}",
            second.errors
        );
        assert!(
            units_eq(&first.ast, &first.unit, &second.ast, &second.unit),
            "round-trip mismatch for {source:?}:\n{printed}"
        );
    }
}

#[test]
fn code_printer_reemits_comments_with_trivia() {
    let source = "// entry point\nfn main() { }\n";
    let result = parse_ok(source);
    let printed = CodePrinter::new(&result.ast)
        .with_trivia(&result.tokens, source)
        .print_unit(&result.unit);
    assert!(printed.contains("// entry point"), "comment lost:\n{printed}");
    assert!(printed.contains("fn main()"));
}

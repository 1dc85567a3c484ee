//! Cursor traversal and cursor queries.

use crate::helpers::*;
use cxindex::hir::EvalResult;
use cxindex::index::ChildVisit;
use cxindex::parser::TokenKind;
use cxindex::syntax::{CursorKind, PrintingPolicyProperty, StorageClass};
use rstest::rstest;

#[test]
fn test_visit_children_is_preorder() {
    let ws = Workspace::new();
    ws.write("main.c", "struct P { int x; int y; };\nint f(void) { return 1; }\n");
    let unit = ws.parse("main.c", &[]);

    let mut seen = Vec::new();
    let stopped = unit.cursor().visit_children(|cursor, parent| {
        seen.push((cursor.kind(), parent.kind()));
        ChildVisit::Recurse
    });
    assert!(!stopped);
    assert_eq!(
        seen,
        [
            (CursorKind::StructDecl, CursorKind::TranslationUnit),
            (CursorKind::FieldDecl, CursorKind::StructDecl),
            (CursorKind::FieldDecl, CursorKind::StructDecl),
            (CursorKind::FunctionDecl, CursorKind::TranslationUnit),
            (CursorKind::CompoundStmt, CursorKind::FunctionDecl),
            (CursorKind::ReturnStmt, CursorKind::CompoundStmt),
            (CursorKind::IntegerLiteral, CursorKind::ReturnStmt),
        ]
    );
}

#[test]
fn test_continue_skips_children_and_break_stops() {
    let ws = Workspace::new();
    ws.write("main.c", "struct P { int x; };\nint a;\nint b;\n");
    let unit = ws.parse("main.c", &[]);

    let mut top_level = Vec::new();
    unit.cursor().visit_children(|cursor, _| {
        top_level.push(cursor.spelling().to_string());
        ChildVisit::Continue
    });
    assert_eq!(top_level, ["P", "a", "b"]);

    let mut visited = 0;
    let stopped = unit.cursor().visit_children(|cursor, _| {
        visited += 1;
        if cursor.spelling() == "a" {
            ChildVisit::Break
        } else {
            ChildVisit::Recurse
        }
    });
    assert!(stopped);
    assert_eq!(visited, 3);
}

#[test]
fn test_nested_traversal_does_not_disturb_outer_one() {
    let ws = Workspace::new();
    ws.write(
        "main.c",
        "void f(void) { int a; int b; }\nvoid g(void) { int c; }\n",
    );
    let unit = ws.parse("main.c", &[]);

    let mut functions = Vec::new();
    unit.cursor().visit_children(|cursor, _| {
        if cursor.kind() == CursorKind::FunctionDecl {
            let mut locals = Vec::new();
            cursor.visit_children(|inner, _| {
                if inner.kind() == CursorKind::VarDecl {
                    locals.push(inner.spelling().to_string());
                }
                ChildVisit::Recurse
            });
            functions.push((cursor.spelling().to_string(), locals));
        }
        ChildVisit::Continue
    });
    assert_eq!(
        functions,
        [
            ("f".to_string(), vec!["a".to_string(), "b".to_string()]),
            ("g".to_string(), vec!["c".to_string()]),
        ]
    );
}

#[test]
fn test_evaluate_child_expression() {
    let ws = Workspace::new();
    ws.write(
        "main.m",
        "#define kFOO @\"foo\"\nvoid foobar(void) {\n {kFOO;}\n}\n",
    );
    let unit = ws.parse("main.m", &[]);

    let function = find_cursor(&unit, CursorKind::FunctionDecl).unwrap();
    let mut compound_statements = 0;
    let mut result = None;
    function.visit_children(|cursor, _| {
        if cursor.kind() == CursorKind::CompoundStmt {
            if compound_statements > 0 {
                result = cursor.evaluate();
                return ChildVisit::Break;
            }
            compound_statements += 1;
        }
        ChildVisit::Recurse
    });
    assert_eq!(compound_statements, 1);
    assert_eq!(result, Some(EvalResult::ObjCStrLiteral("foo".to_string())));
}

#[test]
fn test_evaluate_constant_initializers() {
    let ws = Workspace::new();
    ws.write(
        "main.c",
        "enum { K = 4 };\nconst int a = 2 * 3 + K;\nconst double d = 1.5;\nint f(void);\nint b = f();\n",
    );
    let unit = ws.parse("main.c", &[]);

    let vars = find_all(&unit, CursorKind::VarDecl);
    assert_eq!(
        vars[0].evaluate(),
        Some(EvalResult::Int {
            value: 10,
            unsigned: false
        })
    );
    assert_eq!(vars[1].evaluate().and_then(|r| r.as_f64()), Some(1.5));
    assert_eq!(vars[2].evaluate(), None);
}

#[test]
fn test_var_decl_initializer() {
    let ws = Workspace::new();
    ws.write("main.cpp", "int foo() { return 5; }; const int a = foo();");
    let unit = ws.parse("main.cpp", &[]);

    let var = find_cursor(&unit, CursorKind::VarDecl).unwrap();
    let initializer = var.var_decl_initializer().unwrap();
    assert!(!initializer.is_null());
    assert_eq!(initializer.spelling(), "foo");
    assert_eq!(initializer.kind(), CursorKind::CallExpr);
}

#[test]
fn test_var_without_initializer_has_none() {
    let ws = Workspace::new();
    ws.write("main.c", "int a;");
    let unit = ws.parse("main.c", &[]);
    let var = find_cursor(&unit, CursorKind::VarDecl).unwrap();
    assert!(var.var_decl_initializer().is_none());
}

#[rstest]
#[case("void foo() { int a; }", false)]
#[case("void foo() { static int a; }", true)]
#[case("int a;", true)]
#[case("namespace n { int a; }", true)]
fn test_var_decl_global_storage(#[case] source: &str, #[case] expected: bool) {
    let ws = Workspace::new();
    ws.write("main.cpp", source);
    let unit = ws.parse("main.cpp", &[]);
    let var = find_cursor(&unit, CursorKind::VarDecl).unwrap();
    assert_eq!(var.has_var_decl_global_storage(), expected);
}

#[rstest]
#[case("int a;", false)]
#[case("extern int a;", true)]
fn test_var_decl_external_storage(#[case] source: &str, #[case] expected: bool) {
    let ws = Workspace::new();
    ws.write("main.cpp", source);
    let unit = ws.parse("main.cpp", &[]);
    let var = find_cursor(&unit, CursorKind::VarDecl).unwrap();
    assert_eq!(var.has_var_decl_external_storage(), expected);
    let storage = if expected {
        StorageClass::Extern
    } else {
        StorageClass::None
    };
    assert_eq!(var.storage_class(), Some(storage));
}

#[test]
fn test_type_ref_through_using_declaration() {
    let source = r#"
namespace ns1 {
class Class1
{
    void fun();
};
}

using ns1::Class1;

void Class1::fun() {}
"#;
    let ws = Workspace::new();
    ws.write("main.cpp", source);
    let unit = ws.parse("main.cpp", &["-xc++"]);

    let type_refs = find_all(&unit, CursorKind::TypeRef);
    let last = type_refs.last().unwrap();
    assert_eq!(last.spelling(), "class ns1::Class1");
    assert_eq!(last.referenced().unwrap().kind(), CursorKind::ClassDecl);
}

#[test]
fn test_out_of_line_method_semantic_parent() {
    let ws = Workspace::new();
    ws.write(
        "main.cpp",
        "namespace ns1 { class Class1 { void fun(); }; }\nvoid ns1::Class1::fun() {}\n",
    );
    let unit = ws.parse("main.cpp", &[]);

    let method = find_all(&unit, CursorKind::CXXMethod)
        .into_iter()
        .find(|cursor| cursor.is_definition())
        .unwrap();
    assert_eq!(method.semantic_parent().unwrap().kind(), CursorKind::ClassDecl);
    assert_eq!(method.lexical_parent().unwrap().kind(), CursorKind::TranslationUnit);
    assert_eq!(method.qualified_name(), "ns1::Class1::fun");

    let declaration = find_cursor(&unit, CursorKind::CXXMethod).unwrap();
    assert!(!declaration.is_definition());
    assert_eq!(declaration.definition(), Some(method));
}

#[test]
fn test_function_arguments_and_display_name() {
    let ws = Workspace::new();
    ws.write("main.c", "int add(int a, char *b);\nint x = add(1, 0);\n");
    let unit = ws.parse("main.c", &[]);

    let function = find_cursor(&unit, CursorKind::FunctionDecl).unwrap();
    assert_eq!(function.num_arguments(), Some(2));
    assert_eq!(function.argument(1).unwrap().spelling(), "b");
    assert_eq!(function.display_name(), "add(int, char *)");

    let call = find_cursor(&unit, CursorKind::CallExpr).unwrap();
    assert_eq!(call.num_arguments(), Some(2));
    let callee = call.children()[0];
    assert_eq!(callee.kind(), CursorKind::DeclRefExpr);
    assert_eq!(callee.referenced(), Some(function));
}

#[test]
fn test_printing_policy_set_and_get() {
    let ws = Workspace::new();
    ws.write("file.cpp", "int i;\n");
    let unit = ws.parse("file.cpp", &[]);

    let mut policy = unit.cursor().printing_policy();
    for value in 0..2 {
        for property in PrintingPolicyProperty::ALL {
            policy.set(property, value);
            assert_eq!(policy.get(property), value, "{property:?}");
        }
    }
}

#[test]
fn test_tag_keyword_follows_printing_policy() {
    let ws = Workspace::new();
    ws.write("main.c", "struct Foo { int a; };\nstruct Foo foo;\n");
    let unit = ws.parse("main.c", &[]);

    let var = find_all(&unit, CursorKind::VarDecl).pop().unwrap();
    let mut policy = var.printing_policy();
    assert_eq!(var.type_spelling(&policy), "struct Foo");
    policy.set(PrintingPolicyProperty::SuppressTagKeyword, 1);
    assert_eq!(var.type_spelling(&policy), "Foo");
}

#[test]
fn test_tokenize_and_annotate() {
    let ws = Workspace::new();
    ws.write("main.c", "int a = 1;");
    let unit = ws.parse("main.c", &[]);

    let file = unit.main_file().unwrap();
    let start = unit.location(&file, 1, 1).unwrap();
    let end = unit.location(&file, 1, 11).unwrap();
    let tokens = unit.tokenize(unit.range(start, end).unwrap());
    let kinds: Vec<TokenKind> = tokens.iter().map(|token| token.kind).collect();
    assert_eq!(
        kinds,
        [
            TokenKind::Keyword,
            TokenKind::Identifier,
            TokenKind::Punctuation,
            TokenKind::Literal,
            TokenKind::Punctuation,
        ]
    );

    let cursors = unit.annotate_tokens(&tokens);
    assert_eq!(cursors.len(), tokens.len());
    assert_eq!(cursors[1].kind(), CursorKind::VarDecl);
    assert_eq!(cursors[3].kind(), CursorKind::IntegerLiteral);
}

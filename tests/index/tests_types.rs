//! Types and qualifiers as seen through cursors.

use crate::helpers::*;
use cxindex::syntax::{CursorKind, Qualifiers, TypeKind};

const QUALIFIED_PARAMS: &str = "\
void foo1(const int);
void foo2(volatile int);
void foo3(const volatile int);
void foo4(int* const);
void foo5(int* volatile);
void foo6(int* restrict);
void foo7(int* const volatile);
void foo8(int* volatile restrict);
void foo9(int* const restrict);
void foo10(int* const volatile restrict);
";

fn qualifiers(ty: &cxindex::syntax::Type) -> Qualifiers {
    let mut quals = Qualifiers::empty();
    quals.set(Qualifiers::CONST, ty.is_const_qualified());
    quals.set(Qualifiers::VOLATILE, ty.is_volatile_qualified());
    quals.set(Qualifiers::RESTRICT, ty.is_restrict_qualified());
    quals
}

#[test]
fn test_unqualified_type_drops_every_qualifier() {
    let ws = Workspace::new();
    ws.write("header.h", QUALIFIED_PARAMS);
    let unit = ws.parse("header.h", &[]);
    assert!(unit.diagnostics().is_empty(), "{:?}", diagnostic_messages(&unit));

    let params = find_all(&unit, CursorKind::ParmDecl);
    assert_eq!(params.len(), 10);
    for param in params {
        let ty = param.ty();
        assert!(!qualifiers(&ty).is_empty(), "{}", param.semantic_parent().unwrap().spelling());

        let unqualified = ty.unqualified();
        assert!(qualifiers(&unqualified).is_empty());
        assert_eq!(unqualified.kind(), ty.kind());
        // Idempotent.
        assert_eq!(unqualified.unqualified(), unqualified);
    }
}

#[test]
fn test_function_type_lists_parameter_types() {
    let ws = Workspace::new();
    ws.write("header.h", QUALIFIED_PARAMS);
    let unit = ws.parse("header.h", &[]);

    let foo4 = find_all(&unit, CursorKind::FunctionDecl)
        .into_iter()
        .find(|cursor| cursor.spelling() == "foo4")
        .unwrap();
    let ty = foo4.ty();
    assert_eq!(ty.num_arg_types(), Some(1));
    let arg = ty.arg_type(0).unwrap();
    assert!(arg.is_pointer());
    assert_eq!(foo4.result_type().map(|result| result.kind().clone()), Some(TypeKind::Void));
}

#[test]
fn test_non_reference_type() {
    let ws = Workspace::new();
    ws.write("file.cpp", "void foo1(int&);\nvoid foo2(int&&);\nvoid foo3(int);\n");
    let unit = ws.parse("file.cpp", &["-xc++"]);
    assert!(unit.diagnostics().is_empty(), "{:?}", diagnostic_messages(&unit));

    let params = find_all(&unit, CursorKind::ParmDecl);
    assert_eq!(params.len(), 3);
    assert!(matches!(params[0].ty().kind(), TypeKind::LValueReference(_)));
    assert!(matches!(params[1].ty().kind(), TypeKind::RValueReference(_)));
    for param in &params {
        let non_reference = param.ty().non_reference();
        assert_eq!(non_reference.kind(), &TypeKind::Int);
        assert_eq!(non_reference.non_reference(), non_reference);
    }
}

#[test]
fn test_typedef_canonical_type() {
    let ws = Workspace::new();
    ws.write("main.c", "typedef const int cint;\ncint value = 1;\n");
    let unit = ws.parse("main.c", &[]);

    let var = find_cursor(&unit, CursorKind::VarDecl).unwrap();
    let ty = var.ty();
    assert!(matches!(ty.kind(), TypeKind::Typedef { .. }));
    let canonical = ty.canonical();
    assert_eq!(canonical.kind(), &TypeKind::Int);
    assert!(canonical.is_const_qualified());
    assert_eq!(var.type_spelling(&var.printing_policy()), "cint");
}

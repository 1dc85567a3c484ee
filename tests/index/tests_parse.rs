//! Creating translation units.

use crate::helpers::*;
use cxindex::error::{LoadError, ParseError};
use cxindex::index::{Index, IndexOptions, TranslationUnitFlags};
use cxindex::syntax::CursorKind;

const NO_ARGS: [&str; 0] = [];

#[test]
fn test_parse_without_source_file_is_invalid() {
    let index = Index::new(IndexOptions::default());
    let result = index.parse("", &NO_ARGS, &[], TranslationUnitFlags::empty());
    assert!(matches!(result, Err(ParseError::InvalidArguments(_))));
}

#[test]
fn test_parse_full_argv_requires_driver() {
    let index = Index::new(IndexOptions::default());
    let result = index.parse_full_argv("main.c", &NO_ARGS, &[], TranslationUnitFlags::empty());
    assert!(matches!(result, Err(ParseError::InvalidArguments(_))));
}

#[test]
fn test_unknown_language_is_invalid() {
    let ws = Workspace::new();
    ws.write("main.c", "int a;");
    let result = ws
        .index
        .parse(ws.path("main.c"), &["-x", "cobol"], &[], TranslationUnitFlags::empty());
    assert!(matches!(result, Err(ParseError::InvalidArguments(_))));
}

#[test]
fn test_missing_main_file_is_a_failure() {
    let ws = Workspace::new();
    let result = ws
        .index
        .parse(ws.path("absent.c"), &NO_ARGS, &[], TranslationUnitFlags::empty());
    assert!(matches!(result, Err(ParseError::Failure { .. })));
}

#[test]
fn test_load_with_empty_path_is_invalid() {
    let index = Index::new(IndexOptions::default());
    assert!(matches!(index.load(""), Err(LoadError::InvalidArguments(_))));
}

#[test]
fn test_source_file_taken_from_arguments() {
    let ws = Workspace::new();
    let main = ws.write("main.c", "int a;");
    let main = main.to_string_lossy().into_owned();
    let unit = ws
        .index
        .parse("", &["-std=c99", main.as_str()], &[], TranslationUnitFlags::empty())
        .unwrap();
    assert_eq!(unit.spelling().to_string_lossy(), main);
    assert!(find_cursor(&unit, CursorKind::VarDecl).is_some());
}

#[test]
fn test_compiler_errors_are_diagnostics_not_failures() {
    let ws = Workspace::new();
    ws.write("main.c", "int main(void) { return y; }\n");
    let unit = ws.parse("main.c", &[]);
    assert_eq!(diagnostic_messages(&unit), ["use of undeclared identifier 'y'"]);
    assert!(find_cursor(&unit, CursorKind::FunctionDecl).is_some());
}

#[test]
fn test_full_argv_finds_gcc_toolchain_headers() {
    let ws = Workspace::new();
    // A fake GCC 99.9.9 installation next to the driver.
    for name in [
        "lib/gcc/arm-linux-gnueabi/99.9.9/crtbegin.o",
        "include/arm-linux-gnueabi/.keep",
        "include/c++/99.9.9/vector",
    ] {
        ws.write(name, "\n");
    }
    ws.write("test.cc", "#include <vector>\n");
    let driver = ws.write("bin/clang", "");
    let driver = driver.to_string_lossy().into_owned();

    let argv = [
        driver.as_str(),
        "-target",
        "arm-linux-gnueabi",
        "-stdlib=libstdc++",
        "--gcc-toolchain=",
    ];
    let unit = ws
        .index
        .parse_full_argv(ws.path("test.cc"), &argv, &[], TranslationUnitFlags::editing())
        .unwrap();
    assert_eq!(unit.num_diagnostics(), 0, "{:?}", diagnostic_messages(&unit));
    assert_eq!(unit.inclusions().len(), 1);
}

#[test]
fn test_include_without_toolchain_is_reported() {
    let ws = Workspace::new();
    ws.write("test.cc", "#include <vector>\n");
    let unit = ws.parse("test.cc", &[]);
    assert_eq!(diagnostic_messages(&unit), ["'vector' file not found"]);
}

#[test]
fn test_arguments_are_remembered() {
    let ws = Workspace::new();
    ws.write("main.cpp", "int a;");
    let unit = ws.parse("main.cpp", &["-std=c++17", "-DFOO=1", "-Wall"]);
    assert_eq!(unit.arguments(), ["-std=c++17", "-DFOO=1", "-Wall"]);
    assert!(unit.lang_options().cplusplus());
}

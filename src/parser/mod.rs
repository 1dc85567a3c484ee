//! Front end for C, C++ and Objective-C
//!
//! ## Architecture
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (logos) → RawTokens, words are always IDENT
//!     ↓
//! Preprocessor → expanded PpTokens, keywords classified per language,
//!                skipped ranges, inclusions
//!     ↓
//! Parser → AST arena with unresolved names
//!     ↓
//! hir::sema → names, types and semantic diagnostics
//! ```
//!
//! Raw lexing is per file and memoized by the salsa database in
//! [`crate::hir`]; everything after it runs once per (re)parse.

mod grammar;
pub mod keywords;
pub mod lang;
mod lexer;
pub mod literal;
#[allow(clippy::module_inception)]
mod parser;
pub mod preprocess;
mod syntax_kind;

pub use lang::{LangOptions, LangStandard, Language};
pub use lexer::{RawToken, TokenList, lex};
pub use parser::{MainFile, Parse, ParseOptions, parse};
pub use preprocess::{
    HeaderSearch, Inclusion, MacroArg, PpToken, PreprocessConfig, PreprocessOutput,
    SourceProvider, preprocess,
};
pub use syntax_kind::{SyntaxKind, TokenKind};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{FileId, SourceLocation};
    use crate::syntax::{Ast, CursorKind, Literal, NodeFlags, NodeId, StorageClass, TypeKind};
    use text_size::TextSize;

    fn tokens(text: &str, lang: &LangOptions) -> Vec<PpToken> {
        let file = FileId::new(0);
        lex(text)
            .iter()
            .filter(|t| !t.kind.is_trivia())
            .map(|t| {
                let raw = t.text(text);
                let kind = if t.kind == SyntaxKind::IDENT {
                    keywords::classify(raw, lang)
                } else {
                    t.kind
                };
                PpToken {
                    kind,
                    text: raw.into(),
                    start: SourceLocation::new(file, t.range.start()),
                    end: SourceLocation::new(file, t.range.end()),
                    flags: Default::default(),
                }
            })
            .collect()
    }

    fn parse_as(text: &str, language: Language) -> Parse {
        let lang = LangOptions::new(language);
        let tokens = tokens(text, &lang);
        let main = MainFile {
            id: FileId::new(0),
            name: "test",
            len: TextSize::of(text),
        };
        parse(&tokens, &lang, main, ParseOptions::default())
    }

    fn kinds(ast: &Ast, id: NodeId) -> Vec<CursorKind> {
        ast[id].children.iter().map(|&c| ast[c].kind).collect()
    }

    fn find(ast: &Ast, kind: CursorKind, name: &str) -> NodeId {
        ast.ids()
            .find(|&id| ast[id].kind == kind && ast[id].name == name)
            .unwrap_or_else(|| panic!("no {kind:?} named {name}"))
    }

    #[test]
    fn top_level_declarations() {
        let parse = parse_as(
            "struct Foo { int bar; };\nstatic int x = 1;\nextern int y;\nint main(void) { return 0; }\n",
            Language::C,
        );
        assert!(parse.ok(), "{:?}", parse.diagnostics);
        let ast = &parse.ast;
        assert_eq!(
            kinds(ast, ast.root()),
            [
                CursorKind::StructDecl,
                CursorKind::VarDecl,
                CursorKind::VarDecl,
                CursorKind::FunctionDecl
            ]
        );
        let x = find(ast, CursorKind::VarDecl, "x");
        assert_eq!(ast[x].storage, StorageClass::Static);
        assert!(ast[x].flags.contains(NodeFlags::HAS_INIT));
        let y = find(ast, CursorKind::VarDecl, "y");
        assert!(!ast[y].is_definition());
        let main = find(ast, CursorKind::FunctionDecl, "main");
        assert!(ast[main].is_definition());
        assert_eq!(kinds(ast, main), [CursorKind::CompoundStmt]);
    }

    #[test]
    fn statements_and_expressions() {
        let parse = parse_as(
            "int f(int n) {\n  int s = 0;\n  for (int i = 0; i < n; i++) s += i;\n  if (s > 10) return s; else return -s;\n}\n",
            Language::C,
        );
        assert!(parse.ok(), "{:?}", parse.diagnostics);
        let ast = &parse.ast;
        let body = find(ast, CursorKind::FunctionDecl, "f");
        let body = *ast[body].children.last().unwrap();
        assert_eq!(
            kinds(ast, body),
            [CursorKind::DeclStmt, CursorKind::ForStmt, CursorKind::IfStmt]
        );
        let compound = ast
            .ids()
            .find(|&id| ast[id].kind == CursorKind::CompoundAssignOperator)
            .unwrap();
        assert_eq!(ast[compound].name, "+=");
    }

    #[test]
    fn call_and_member_expressions() {
        let parse = parse_as(
            "struct P { int x; };\nint g(struct P *p) { return h(p->x, 2); }\n",
            Language::C,
        );
        let ast = &parse.ast;
        let call = find(ast, CursorKind::CallExpr, "h");
        assert_eq!(
            kinds(ast, call),
            [
                CursorKind::DeclRefExpr,
                CursorKind::MemberRefExpr,
                CursorKind::IntegerLiteral
            ]
        );
        let member = find(ast, CursorKind::MemberRefExpr, "x");
        assert!(ast[member].flags.contains(NodeFlags::ARROW));
    }

    #[test]
    fn literal_types() {
        let parse = parse_as(
            "long a = 10; unsigned b = 0xFFFFFFFF; double c = 1.5; const char *d = \"ab\" \"c\";",
            Language::C,
        );
        let ast = &parse.ast;
        let ten = find(ast, CursorKind::IntegerLiteral, "10");
        assert_eq!(ast[ten].ty.kind, TypeKind::Int);
        let hex = find(ast, CursorKind::IntegerLiteral, "0xFFFFFFFF");
        assert_eq!(ast[hex].ty.kind, TypeKind::UInt);
        let string = ast
            .ids()
            .find(|&id| ast[id].kind == CursorKind::StringLiteral)
            .unwrap();
        assert_eq!(ast[string].literal, Some(Literal::Str("abc".into())));
        assert_eq!(ast[string].ty.array_size(), Some(4));
    }

    #[test]
    fn namespaces_and_out_of_line_methods() {
        let parse = parse_as(
            "namespace ns1 { class Class1 { void fun(); }; }\nvoid ns1::Class1::fun() {}\n",
            Language::Cxx,
        );
        assert!(parse.ok(), "{:?}", parse.diagnostics);
        let ast = &parse.ast;
        let ns = find(ast, CursorKind::Namespace, "ns1");
        assert_eq!(kinds(ast, ns), [CursorKind::ClassDecl]);
        let definition = ast
            .ids()
            .filter(|&id| ast[id].name == "fun")
            .find(|&id| ast[id].is_definition())
            .unwrap();
        let refs: Vec<_> = ast[definition]
            .children
            .iter()
            .filter(|&&c| ast[c].kind == CursorKind::TypeRef)
            .map(|&c| ast[c].written.clone())
            .collect();
        assert_eq!(refs, ["ns1", "ns1::Class1"]);
    }

    #[test]
    fn enum_class_and_typedef() {
        let parse = parse_as(
            "enum class Something { A, B = 3 };\ntypedef unsigned int uint;\nuint u;\n",
            Language::Cxx,
        );
        assert!(parse.ok(), "{:?}", parse.diagnostics);
        let ast = &parse.ast;
        let e = find(ast, CursorKind::EnumDecl, "Something");
        assert!(ast[e].flags.contains(NodeFlags::SCOPED_ENUM));
        assert_eq!(
            kinds(ast, e),
            [CursorKind::EnumConstantDecl, CursorKind::EnumConstantDecl]
        );
        find(ast, CursorKind::VarDecl, "u");
    }

    #[test]
    fn missing_semicolon_is_reported() {
        let parse = parse_as("int a\nint b;\n", Language::C);
        assert!(!parse.ok());
        assert_eq!(
            parse.diagnostics[0].message,
            "expected ';' after top level declarator"
        );
        find(&parse.ast, CursorKind::VarDecl, "b");
    }

    #[test]
    fn objc_string_literal() {
        let parse = parse_as("void f(void) { @\"foo\"; }\n", Language::ObjC);
        let ast = &parse.ast;
        let lit = ast
            .ids()
            .find(|&id| ast[id].kind == CursorKind::ObjCStringLiteral)
            .unwrap();
        assert_eq!(ast[lit].literal, Some(Literal::ObjCStr("foo".into())));
    }

    #[test]
    fn skip_function_bodies() {
        let lang = LangOptions::new(Language::C);
        let text = "int main(void) { return 0; }\n";
        let tokens = tokens(text, &lang);
        let main = MainFile {
            id: FileId::new(0),
            name: "test",
            len: TextSize::of(text),
        };
        let options = ParseOptions {
            skip_function_bodies: true,
        };
        let parse = parse(&tokens, &lang, main, options);
        let f = find(&parse.ast, CursorKind::FunctionDecl, "main");
        assert!(parse.ast[f].children.is_empty());
        assert!(parse.ast[f].is_definition());
    }
}

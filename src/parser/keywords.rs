//! Keyword classification.
//!
//! Which words are keywords depends on the dialect: `class` only in C++,
//! `restrict` only in C99 and later C, `nullptr` from C++11.

use bitflags::bitflags;

use super::lang::LangOptions;
use super::syntax_kind::SyntaxKind;

bitflags! {
    /// Dialects in which a keyword is reserved.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct KeywordAvailability: u8 {
        const ALL = 1 << 0;
        const C99 = 1 << 1;
        const CXX = 1 << 2;
        const CXX11 = 1 << 3;
        const BOOLEAN = 1 << 4;
        const NOCXX = 1 << 5;
        const C23 = 1 << 6;
    }
}

impl KeywordAvailability {
    pub fn is_available(self, lang: &LangOptions) -> bool {
        self.contains(Self::ALL)
            || (self.contains(Self::C99) && lang.c99())
            || (self.contains(Self::CXX) && lang.cplusplus())
            || (self.contains(Self::CXX11) && lang.cplusplus11())
            || (self.contains(Self::BOOLEAN) && lang.bool_keywords())
            || (self.contains(Self::NOCXX) && !lang.cplusplus())
            || (self.contains(Self::C23) && lang.c23())
    }
}

/// Keyword kind and availability of a word, if it is a keyword anywhere.
pub fn lookup(text: &str) -> Option<(SyntaxKind, KeywordAvailability)> {
    use KeywordAvailability as A;
    use SyntaxKind::*;

    let entry = match text {
        "auto" => (AUTO_KW, A::ALL),
        "break" => (BREAK_KW, A::ALL),
        "case" => (CASE_KW, A::ALL),
        "char" => (CHAR_KW, A::ALL),
        "const" | "__const" | "__const__" => (CONST_KW, A::ALL),
        "continue" => (CONTINUE_KW, A::ALL),
        "default" => (DEFAULT_KW, A::ALL),
        "do" => (DO_KW, A::ALL),
        "double" => (DOUBLE_KW, A::ALL),
        "else" => (ELSE_KW, A::ALL),
        "enum" => (ENUM_KW, A::ALL),
        "extern" => (EXTERN_KW, A::ALL),
        "float" => (FLOAT_KW, A::ALL),
        "for" => (FOR_KW, A::ALL),
        "goto" => (GOTO_KW, A::ALL),
        "if" => (IF_KW, A::ALL),
        "inline" => (INLINE_KW, A::C99 | A::CXX),
        "__inline" | "__inline__" => (INLINE_KW, A::ALL),
        "int" => (INT_KW, A::ALL),
        "long" => (LONG_KW, A::ALL),
        "register" => (REGISTER_KW, A::ALL),
        "restrict" => (RESTRICT_KW, A::C99),
        "__restrict" | "__restrict__" => (RESTRICT_KW, A::ALL),
        "return" => (RETURN_KW, A::ALL),
        "short" => (SHORT_KW, A::ALL),
        "signed" | "__signed" | "__signed__" => (SIGNED_KW, A::ALL),
        "sizeof" => (SIZEOF_KW, A::ALL),
        "static" => (STATIC_KW, A::ALL),
        "struct" => (STRUCT_KW, A::ALL),
        "switch" => (SWITCH_KW, A::ALL),
        "typedef" => (TYPEDEF_KW, A::ALL),
        "union" => (UNION_KW, A::ALL),
        "unsigned" => (UNSIGNED_KW, A::ALL),
        "void" => (VOID_KW, A::ALL),
        "volatile" | "__volatile" | "__volatile__" => (VOLATILE_KW, A::ALL),
        "while" => (WHILE_KW, A::ALL),
        "_Bool" => (BOOL_KW, A::NOCXX),
        "_Static_assert" => (STATIC_ASSERT_KW, A::ALL),
        "_Thread_local" => (THREAD_LOCAL_KW, A::NOCXX),
        "bool" => (BOOL_KW, A::BOOLEAN),
        "true" => (TRUE_KW, A::BOOLEAN),
        "false" => (FALSE_KW, A::BOOLEAN),
        "class" => (CLASS_KW, A::CXX),
        "constexpr" => (CONSTEXPR_KW, A::CXX11 | A::C23),
        "delete" => (DELETE_KW, A::CXX),
        "explicit" => (EXPLICIT_KW, A::CXX),
        "friend" => (FRIEND_KW, A::CXX),
        "mutable" => (MUTABLE_KW, A::CXX),
        "namespace" => (NAMESPACE_KW, A::CXX),
        "new" => (NEW_KW, A::CXX),
        "noexcept" => (NOEXCEPT_KW, A::CXX11),
        "nullptr" => (NULLPTR_KW, A::CXX11 | A::C23),
        "operator" => (OPERATOR_KW, A::CXX),
        "private" => (PRIVATE_KW, A::CXX),
        "protected" => (PROTECTED_KW, A::CXX),
        "public" => (PUBLIC_KW, A::CXX),
        "static_assert" => (STATIC_ASSERT_KW, A::CXX11 | A::C23),
        "template" => (TEMPLATE_KW, A::CXX),
        "this" => (THIS_KW, A::CXX),
        "thread_local" => (THREAD_LOCAL_KW, A::CXX11 | A::C23),
        "typename" => (TYPENAME_KW, A::CXX),
        "using" => (USING_KW, A::CXX),
        "virtual" => (VIRTUAL_KW, A::CXX),
        _ => return None,
    };
    Some(entry)
}

/// Kind of a word under the given language options.
pub fn classify(text: &str, lang: &LangOptions) -> SyntaxKind {
    match lookup(text) {
        Some((kind, avail)) if avail.is_available(lang) => kind,
        _ => SyntaxKind::IDENT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lang::{LangStandard, Language};
    use rstest::rstest;

    fn opts(language: Language, standard: LangStandard) -> LangOptions {
        LangOptions {
            standard,
            ..LangOptions::new(language)
        }
    }

    #[rstest]
    #[case("class", Language::C, LangStandard::C17, SyntaxKind::IDENT)]
    #[case("class", Language::Cxx, LangStandard::Cxx11, SyntaxKind::CLASS_KW)]
    #[case("restrict", Language::C, LangStandard::C99, SyntaxKind::RESTRICT_KW)]
    #[case("restrict", Language::C, LangStandard::C89, SyntaxKind::IDENT)]
    #[case("restrict", Language::Cxx, LangStandard::Cxx17, SyntaxKind::IDENT)]
    #[case("__restrict", Language::Cxx, LangStandard::Cxx17, SyntaxKind::RESTRICT_KW)]
    #[case("nullptr", Language::Cxx, LangStandard::Cxx98, SyntaxKind::IDENT)]
    #[case("nullptr", Language::Cxx, LangStandard::Cxx11, SyntaxKind::NULLPTR_KW)]
    #[case("bool", Language::C, LangStandard::C17, SyntaxKind::IDENT)]
    #[case("_Bool", Language::ObjC, LangStandard::C17, SyntaxKind::BOOL_KW)]
    #[case("enum", Language::C, LangStandard::C89, SyntaxKind::ENUM_KW)]
    #[case("Something", Language::Cxx, LangStandard::Cxx11, SyntaxKind::IDENT)]
    fn keyword_depends_on_dialect(
        #[case] word: &str,
        #[case] language: Language,
        #[case] standard: LangStandard,
        #[case] expected: SyntaxKind,
    ) {
        assert_eq!(classify(word, &opts(language, standard)), expected);
    }
}

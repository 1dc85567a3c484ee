//! Token kinds for the C-family lexer.
//!
//! The raw lexer only knows identifiers; keyword kinds are assigned later by
//! [`crate::parser::keywords::classify`] once the language options are known.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
#[repr(u16)]
pub enum SyntaxKind {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    WHITESPACE = 0,
    NEWLINE,
    LINE_COMMENT,
    BLOCK_COMMENT,

    // =========================================================================
    // LITERALS
    // =========================================================================
    IDENT,
    INT_NUMBER,
    FLOAT_NUMBER,
    STRING,
    CHAR,

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    L_BRACE,
    R_BRACE,
    L_BRACKET,
    R_BRACKET,
    L_PAREN,
    R_PAREN,
    SEMICOLON,
    COLON,
    COLON_COLON,
    DOT,
    ELLIPSIS,
    COMMA,
    QUESTION,
    ARROW,
    PLUS,
    PLUS_PLUS,
    PLUS_EQ,
    MINUS,
    MINUS_MINUS,
    MINUS_EQ,
    STAR,
    STAR_EQ,
    SLASH,
    SLASH_EQ,
    PERCENT,
    PERCENT_EQ,
    AMP,
    AMP_AMP,
    AMP_EQ,
    PIPE,
    PIPE_PIPE,
    PIPE_EQ,
    CARET,
    CARET_EQ,
    TILDE,
    BANG,
    BANG_EQ,
    EQ,
    EQ_EQ,
    LT,
    LT_EQ,
    LT_LT,
    LT_LT_EQ,
    GT,
    GT_EQ,
    GT_GT,
    GT_GT_EQ,
    HASH,
    HASH_HASH,
    AT,
    BACKSLASH,

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    AUTO_KW,
    BOOL_KW,
    BREAK_KW,
    CASE_KW,
    CHAR_KW,
    CLASS_KW,
    CONST_KW,
    CONSTEXPR_KW,
    CONTINUE_KW,
    DEFAULT_KW,
    DELETE_KW,
    DO_KW,
    DOUBLE_KW,
    ELSE_KW,
    ENUM_KW,
    EXPLICIT_KW,
    EXTERN_KW,
    FALSE_KW,
    FLOAT_KW,
    FOR_KW,
    FRIEND_KW,
    GOTO_KW,
    IF_KW,
    INLINE_KW,
    INT_KW,
    LONG_KW,
    MUTABLE_KW,
    NAMESPACE_KW,
    NEW_KW,
    NOEXCEPT_KW,
    NULLPTR_KW,
    OPERATOR_KW,
    PRIVATE_KW,
    PROTECTED_KW,
    PUBLIC_KW,
    REGISTER_KW,
    RESTRICT_KW,
    RETURN_KW,
    SHORT_KW,
    SIGNED_KW,
    SIZEOF_KW,
    STATIC_KW,
    STATIC_ASSERT_KW,
    STRUCT_KW,
    SWITCH_KW,
    TEMPLATE_KW,
    THIS_KW,
    THREAD_LOCAL_KW,
    TRUE_KW,
    TYPEDEF_KW,
    TYPENAME_KW,
    UNION_KW,
    UNSIGNED_KW,
    USING_KW,
    VIRTUAL_KW,
    VOID_KW,
    VOLATILE_KW,
    WHILE_KW,

    // =========================================================================
    // SPECIAL
    // =========================================================================
    ERROR,
    EOF,
}

/// Client-facing token classes, as reported by tokenization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Punctuation,
    Keyword,
    Identifier,
    Literal,
    Comment,
}

impl SyntaxKind {
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::WHITESPACE | Self::NEWLINE | Self::LINE_COMMENT | Self::BLOCK_COMMENT
        )
    }

    pub fn is_comment(self) -> bool {
        matches!(self, Self::LINE_COMMENT | Self::BLOCK_COMMENT)
    }

    pub fn is_keyword(self) -> bool {
        (self as u16) >= (Self::AUTO_KW as u16) && (self as u16) <= (Self::WHILE_KW as u16)
    }

    pub fn is_punct(self) -> bool {
        (self as u16) >= (Self::L_BRACE as u16) && (self as u16) <= (Self::BACKSLASH as u16)
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            Self::INT_NUMBER | Self::FLOAT_NUMBER | Self::STRING | Self::CHAR
        )
    }

    /// Class of the token for tokenization clients. `None` for whitespace.
    pub fn token_kind(self) -> Option<TokenKind> {
        if self.is_comment() {
            Some(TokenKind::Comment)
        } else if self.is_trivia() || self == Self::EOF {
            None
        } else if self == Self::IDENT {
            Some(TokenKind::Identifier)
        } else if self.is_keyword() {
            Some(TokenKind::Keyword)
        } else if self.is_literal() {
            Some(TokenKind::Literal)
        } else {
            Some(TokenKind::Punctuation)
        }
    }

    /// Spelling of punctuation, used in "expected 'x'" diagnostics.
    pub fn display(self) -> &'static str {
        match self {
            Self::L_BRACE => "{",
            Self::R_BRACE => "}",
            Self::L_BRACKET => "[",
            Self::R_BRACKET => "]",
            Self::L_PAREN => "(",
            Self::R_PAREN => ")",
            Self::SEMICOLON => ";",
            Self::COLON => ":",
            Self::COLON_COLON => "::",
            Self::COMMA => ",",
            Self::EQ => "=",
            Self::GT => ">",
            Self::IDENT => "identifier",
            Self::EOF => "end of file",
            _ => "token",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes() {
        assert_eq!(SyntaxKind::ENUM_KW.token_kind(), Some(TokenKind::Keyword));
        assert_eq!(SyntaxKind::IDENT.token_kind(), Some(TokenKind::Identifier));
        assert_eq!(SyntaxKind::L_BRACE.token_kind(), Some(TokenKind::Punctuation));
        assert_eq!(SyntaxKind::BACKSLASH.token_kind(), Some(TokenKind::Punctuation));
        assert_eq!(SyntaxKind::STRING.token_kind(), Some(TokenKind::Literal));
        assert_eq!(SyntaxKind::LINE_COMMENT.token_kind(), Some(TokenKind::Comment));
        assert_eq!(SyntaxKind::NEWLINE.token_kind(), None);
        assert!(SyntaxKind::AUTO_KW.is_keyword() && SyntaxKind::WHILE_KW.is_keyword());
        assert!(!SyntaxKind::ERROR.is_keyword());
    }
}

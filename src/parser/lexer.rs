//! Logos-based raw lexer for C-family sources.
//!
//! Produces every token, trivia included, with its byte range. Words are
//! always [`SyntaxKind::IDENT`] here: whether `class` is a keyword depends on
//! the language, so keyword classification happens after preprocessing.

use std::ops::Deref;
use std::sync::Arc;

use logos::Logos;
use text_size::{TextRange, TextSize};

use super::syntax_kind::SyntaxKind;

/// A token with its kind and byte range in the lexed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawToken {
    pub kind: SyntaxKind,
    pub range: TextRange,
}

impl RawToken {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        source
            .get(std::ops::Range::<usize>::from(self.range))
            .unwrap_or("")
    }
}

/// The tokens of a whole file. Cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenList(Arc<[RawToken]>);

impl Deref for TokenList {
    type Target = [RawToken];

    fn deref(&self) -> &[RawToken] {
        &self.0
    }
}

/// Tokenize an entire text, trivia included.
pub fn lex(text: &str) -> TokenList {
    let mut lexer = LogosToken::lexer(text);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next() {
        let span = lexer.span();
        let range = TextRange::new(TextSize::new(span.start as u32), TextSize::new(span.end as u32));
        let kind = match token {
            Ok(LogosToken::Number) => classify_number(text.get(span).unwrap_or("")),
            Ok(token) => token.into(),
            Err(()) => SyntaxKind::ERROR,
        };
        tokens.push(RawToken { kind, range });
    }
    TokenList(tokens.into())
}

/// Decide whether a preprocessing number is an integer or a floating literal.
pub fn classify_number(text: &str) -> SyntaxKind {
    let lower = text.to_ascii_lowercase();
    let is_float = if lower.starts_with("0x") {
        lower.contains('.') || lower.contains('p')
    } else {
        lower.contains('.') || lower.contains('e')
    };
    if is_float {
        SyntaxKind::FLOAT_NUMBER
    } else {
        SyntaxKind::INT_NUMBER
    }
}

/// Logos token enum - maps to SyntaxKind
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub enum LogosToken {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\x0B\x0C]+")]
    Whitespace,

    #[regex(r"\\[ \t]*\r?\n")]
    LineContinuation,

    #[token("\n")]
    Newline,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    BlockComment,

    // =========================================================================
    // LITERALS
    // =========================================================================
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*")]
    Ident,

    #[regex(r"\.?[0-9]([0-9a-zA-Z_.]|[eEpP][+-])*")]
    Number,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    String,

    #[regex(r"'([^'\\\n]|\\.)+'")]
    Char,

    // =========================================================================
    // MULTI-CHARACTER PUNCTUATION
    // =========================================================================
    #[token("...")]
    Ellipsis,
    #[token("::")]
    ColonColon,
    #[token("->")]
    Arrow,
    #[token("++")]
    PlusPlus,
    #[token("+=")]
    PlusEq,
    #[token("--")]
    MinusMinus,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("&&")]
    AmpAmp,
    #[token("&=")]
    AmpEq,
    #[token("||")]
    PipePipe,
    #[token("|=")]
    PipeEq,
    #[token("^=")]
    CaretEq,
    #[token("!=")]
    BangEq,
    #[token("==")]
    EqEq,
    #[token("<=")]
    LtEq,
    #[token("<<")]
    LtLt,
    #[token("<<=")]
    LtLtEq,
    #[token(">=")]
    GtEq,
    #[token(">>")]
    GtGt,
    #[token(">>=")]
    GtGtEq,
    #[token("##")]
    HashHash,

    // =========================================================================
    // SINGLE-CHARACTER PUNCTUATION
    // =========================================================================
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token("?")]
    Question,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("!")]
    Bang,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("#")]
    Hash,
    #[token("@")]
    At,
    #[token("\\")]
    Backslash,
}

impl From<LogosToken> for SyntaxKind {
    fn from(token: LogosToken) -> Self {
        match token {
            LogosToken::Whitespace | LogosToken::LineContinuation => SyntaxKind::WHITESPACE,
            LogosToken::Newline => SyntaxKind::NEWLINE,
            LogosToken::LineComment => SyntaxKind::LINE_COMMENT,
            LogosToken::BlockComment => SyntaxKind::BLOCK_COMMENT,
            LogosToken::Ident => SyntaxKind::IDENT,
            LogosToken::Number => SyntaxKind::INT_NUMBER,
            LogosToken::String => SyntaxKind::STRING,
            LogosToken::Char => SyntaxKind::CHAR,
            LogosToken::Ellipsis => SyntaxKind::ELLIPSIS,
            LogosToken::ColonColon => SyntaxKind::COLON_COLON,
            LogosToken::Arrow => SyntaxKind::ARROW,
            LogosToken::PlusPlus => SyntaxKind::PLUS_PLUS,
            LogosToken::PlusEq => SyntaxKind::PLUS_EQ,
            LogosToken::MinusMinus => SyntaxKind::MINUS_MINUS,
            LogosToken::MinusEq => SyntaxKind::MINUS_EQ,
            LogosToken::StarEq => SyntaxKind::STAR_EQ,
            LogosToken::SlashEq => SyntaxKind::SLASH_EQ,
            LogosToken::PercentEq => SyntaxKind::PERCENT_EQ,
            LogosToken::AmpAmp => SyntaxKind::AMP_AMP,
            LogosToken::AmpEq => SyntaxKind::AMP_EQ,
            LogosToken::PipePipe => SyntaxKind::PIPE_PIPE,
            LogosToken::PipeEq => SyntaxKind::PIPE_EQ,
            LogosToken::CaretEq => SyntaxKind::CARET_EQ,
            LogosToken::BangEq => SyntaxKind::BANG_EQ,
            LogosToken::EqEq => SyntaxKind::EQ_EQ,
            LogosToken::LtEq => SyntaxKind::LT_EQ,
            LogosToken::LtLt => SyntaxKind::LT_LT,
            LogosToken::LtLtEq => SyntaxKind::LT_LT_EQ,
            LogosToken::GtEq => SyntaxKind::GT_EQ,
            LogosToken::GtGt => SyntaxKind::GT_GT,
            LogosToken::GtGtEq => SyntaxKind::GT_GT_EQ,
            LogosToken::HashHash => SyntaxKind::HASH_HASH,
            LogosToken::LBrace => SyntaxKind::L_BRACE,
            LogosToken::RBrace => SyntaxKind::R_BRACE,
            LogosToken::LBracket => SyntaxKind::L_BRACKET,
            LogosToken::RBracket => SyntaxKind::R_BRACKET,
            LogosToken::LParen => SyntaxKind::L_PAREN,
            LogosToken::RParen => SyntaxKind::R_PAREN,
            LogosToken::Semicolon => SyntaxKind::SEMICOLON,
            LogosToken::Colon => SyntaxKind::COLON,
            LogosToken::Dot => SyntaxKind::DOT,
            LogosToken::Comma => SyntaxKind::COMMA,
            LogosToken::Question => SyntaxKind::QUESTION,
            LogosToken::Plus => SyntaxKind::PLUS,
            LogosToken::Minus => SyntaxKind::MINUS,
            LogosToken::Star => SyntaxKind::STAR,
            LogosToken::Slash => SyntaxKind::SLASH,
            LogosToken::Percent => SyntaxKind::PERCENT,
            LogosToken::Amp => SyntaxKind::AMP,
            LogosToken::Pipe => SyntaxKind::PIPE,
            LogosToken::Caret => SyntaxKind::CARET,
            LogosToken::Tilde => SyntaxKind::TILDE,
            LogosToken::Bang => SyntaxKind::BANG,
            LogosToken::Eq => SyntaxKind::EQ,
            LogosToken::Lt => SyntaxKind::LT,
            LogosToken::Gt => SyntaxKind::GT,
            LogosToken::Hash => SyntaxKind::HASH,
            LogosToken::At => SyntaxKind::AT,
            LogosToken::Backslash => SyntaxKind::BACKSLASH,
        }
    }
}

//! Tokenization of source ranges.
//!
//! Tokens are re-lexed from the buffer text, not taken from the
//! preprocessed stream, so directives, disabled blocks and comments are
//! reported as written. Keywords depend on the unit's language options.

use smol_str::SmolStr;

use super::cursor::Cursor;
use super::unit::TranslationUnit;
use crate::base::{SourceLocation, SourceRange};
use crate::parser::{SyntaxKind, TokenKind, keywords, lex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub spelling: SmolStr,
    pub extent: SourceRange,
}

impl TranslationUnit {
    /// Every token that starts inside `range`.
    pub fn tokenize(&self, range: SourceRange) -> Vec<Token> {
        let file = range.file();
        let Some(buffer) = self.files.get(file) else {
            return Vec::new();
        };
        let bounds = range.text_range();
        let text = buffer.text();
        let lang = &self.config.lang;

        let tokens: Vec<Token> = lex(text)
            .iter()
            .filter(|raw| raw.range.start() >= bounds.start() && raw.range.start() < bounds.end())
            .filter_map(|raw| {
                let spelling = raw.text(text);
                let syntax = if raw.kind == SyntaxKind::IDENT {
                    keywords::classify(spelling, lang)
                } else {
                    raw.kind
                };
                Some(Token {
                    kind: syntax.token_kind()?,
                    spelling: spelling.into(),
                    extent: SourceRange::new(
                        SourceLocation::new(file, raw.range.start()),
                        SourceLocation::new(file, raw.range.end()),
                    ),
                })
            })
            .collect();
        tracing::trace!(count = tokens.len(), "tokenized range");
        tokens
    }

    /// The innermost cursor covering each token.
    pub fn annotate_tokens(&self, tokens: &[Token]) -> Vec<Cursor<'_>> {
        tokens
            .iter()
            .map(|token| self.cursor_at(token.extent.start()))
            .collect()
    }
}

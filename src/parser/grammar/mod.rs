//! Grammar modules for the C family
//!
//! The parsing logic is organized by construct:
//! - `declarations` - declaration specifiers, declarations, records, enums,
//!   namespaces and Objective-C containers
//! - `declarators` - pointer/reference/array/function declarators and the
//!   types they build
//! - `statements` - statements and function bodies
//! - `expressions` - the expression precedence chain
//!
//! Every function takes the parser as `p` and appends the nodes it builds
//! to an explicit parent, so the arena order matches source order.

pub(crate) mod declarations;
pub(crate) mod declarators;
pub(crate) mod expressions;
pub(crate) mod statements;

use smol_str::SmolStr;

use super::parser::Parser;
use super::syntax_kind::SyntaxKind;
use crate::base::{SourceLocation, SourceRange};
use crate::syntax::{CursorKind, Node, NodeId, TagKind, Type, TypeKind};

/// Where a declaration appears; decides which cursor kind it becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeclContext {
    File,
    Record,
    Block,
    Param,
}

/// One `::`-separated component of a name.
#[derive(Debug, Clone)]
pub(crate) struct NameSegment {
    pub(crate) text: SmolStr,
    pub(crate) start: SourceLocation,
    pub(crate) end: SourceLocation,
}

/// A possibly qualified name: `x`, `ns::x`, `::x`, `Class::~Class`.
#[derive(Debug, Clone)]
pub(crate) struct QualifiedName {
    pub(crate) global: bool,
    pub(crate) segments: Vec<NameSegment>,
}

impl QualifiedName {
    pub(crate) fn last(&self) -> &NameSegment {
        // Never empty: `parse_qualified_name` returns `None` instead.
        &self.segments[self.segments.len() - 1]
    }

    pub(crate) fn qualifiers(&self) -> &[NameSegment] {
        &self.segments[..self.segments.len() - 1]
    }

    pub(crate) fn is_qualified(&self) -> bool {
        self.segments.len() > 1 || self.global
    }

    /// The first `count` segments joined with `::`.
    pub(crate) fn prefix(&self, count: usize) -> SmolStr {
        let mut out = String::new();
        if self.global {
            out.push_str("::");
        }
        for (idx, segment) in self.segments.iter().take(count).enumerate() {
            if idx > 0 {
                out.push_str("::");
            }
            out.push_str(&segment.text);
        }
        SmolStr::new(out)
    }

    pub(crate) fn written(&self) -> SmolStr {
        self.prefix(self.segments.len())
    }

    /// Reference nodes for the qualifier segments.
    pub(crate) fn qualifier_refs(&self) -> Vec<PendingRef> {
        self.qualifiers()
            .iter()
            .enumerate()
            .map(|(idx, segment)| PendingRef {
                name: segment.text.clone(),
                written: self.prefix(idx + 1),
                start: segment.start,
                end: segment.end,
                tag: None,
            })
            .collect()
    }
}

/// A type or namespace reference seen while parsing a specifier, turned
/// into a `TypeRef` node under each declaration it applies to.
#[derive(Debug, Clone)]
pub(crate) struct PendingRef {
    pub(crate) name: SmolStr,
    pub(crate) written: SmolStr,
    pub(crate) start: SourceLocation,
    pub(crate) end: SourceLocation,
    pub(crate) tag: Option<TagKind>,
}

/// Parse `[::] name (:: name)*`. Destructor (`~X`) and operator names are
/// accepted as the last segment. Consumes nothing on failure.
pub(crate) fn parse_qualified_name(p: &mut Parser<'_>) -> Option<QualifiedName> {
    let start = p.position();
    let global = p.at(SyntaxKind::COLON_COLON) && p.cplusplus();
    if global {
        p.bump();
    }
    let mut segments = Vec::new();
    loop {
        let segment_start = p.loc();
        let text = match p.current_kind() {
            SyntaxKind::IDENT => {
                let text = SmolStr::new(p.current_text());
                p.bump();
                text
            }
            SyntaxKind::TILDE if p.nth(1) == SyntaxKind::IDENT && p.cplusplus() => {
                p.bump();
                let text = SmolStr::new(format!("~{}", p.current_text()));
                p.bump();
                text
            }
            SyntaxKind::OPERATOR_KW => parse_operator_name(p),
            _ => break,
        };
        segments.push(NameSegment {
            text,
            start: segment_start,
            end: p.prev_end(),
        });
        let continues = p.at(SyntaxKind::COLON_COLON)
            && matches!(
                p.nth(1),
                SyntaxKind::IDENT | SyntaxKind::TILDE | SyntaxKind::OPERATOR_KW
            );
        if !continues {
            break;
        }
        p.bump();
    }
    if segments.is_empty() {
        p.rewind(start);
        return None;
    }
    Some(QualifiedName { global, segments })
}

/// `operator+`, `operator()`, `operator[]`, `operator new`.
fn parse_operator_name(p: &mut Parser<'_>) -> SmolStr {
    p.bump();
    let mut text = String::from("operator");
    match p.current_kind() {
        SyntaxKind::L_PAREN | SyntaxKind::L_BRACKET => {
            text.push_str(p.current_text());
            p.bump();
            text.push_str(p.current_text());
            p.bump();
        }
        SyntaxKind::NEW_KW | SyntaxKind::DELETE_KW => {
            text.push(' ');
            text.push_str(p.current_text());
            p.bump();
        }
        SyntaxKind::EOF => {}
        _ => {
            text.push_str(p.current_text());
            p.bump();
        }
    }
    SmolStr::new(text)
}

/// Allocate `TypeRef` nodes for `refs` under `parent`.
pub(crate) fn emit_refs(p: &mut Parser<'_>, parent: NodeId, refs: &[PendingRef]) {
    for pending in refs {
        let mut node = Node::new(
            CursorKind::TypeRef,
            pending.name.clone(),
            pending.start,
            SourceRange::new(pending.start, pending.end),
        );
        node.written = pending.written.clone();
        node.ty = Type::new(TypeKind::Unresolved {
            name: pending.written.clone(),
            tag: pending.tag,
        });
        let id = p.ast.alloc(node);
        p.attach(parent, id);
    }
}

/// Whether the token at `n` begins a type name, for casts, `sizeof` and
/// parameter lists.
pub(crate) fn is_type_start(p: &Parser<'_>, n: usize) -> bool {
    match p.nth(n) {
        SyntaxKind::VOID_KW
        | SyntaxKind::BOOL_KW
        | SyntaxKind::CHAR_KW
        | SyntaxKind::SHORT_KW
        | SyntaxKind::INT_KW
        | SyntaxKind::LONG_KW
        | SyntaxKind::FLOAT_KW
        | SyntaxKind::DOUBLE_KW
        | SyntaxKind::SIGNED_KW
        | SyntaxKind::UNSIGNED_KW
        | SyntaxKind::CONST_KW
        | SyntaxKind::VOLATILE_KW
        | SyntaxKind::RESTRICT_KW
        | SyntaxKind::STRUCT_KW
        | SyntaxKind::CLASS_KW
        | SyntaxKind::UNION_KW
        | SyntaxKind::ENUM_KW
        | SyntaxKind::TYPENAME_KW => true,
        SyntaxKind::AUTO_KW => p.lang.cplusplus11(),
        SyntaxKind::IDENT => p.is_type_name(p.nth_text(n)),
        _ => false,
    }
}

impl Parser<'_> {
    pub(crate) fn cplusplus(&self) -> bool {
        self.lang.cplusplus()
    }

    pub(crate) fn is_type_name(&self, name: &str) -> bool {
        self.type_names.contains(name) || (name == "id" && self.lang.objc())
    }
}

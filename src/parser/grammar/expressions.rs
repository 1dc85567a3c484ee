//! Expression parsing
//!
//! The precedence chain follows the C grammar:
//!
//! ```text
//! expression → assignment → conditional → binary (precedence climbing)
//!     → cast → unary → postfix → primary
//! ```
//!
//! Every function returns the root of the subtree it built, or `None` after
//! reporting `expected expression`. Nodes are returned unattached.

use smol_str::SmolStr;

use super::declarators::parse_type_name;
use super::{emit_refs, is_type_start, parse_qualified_name};
use crate::parser::literal::{IntLiteral, parse_char, parse_float, parse_integer, parse_string};
use crate::parser::parser::Parser;
use crate::parser::syntax_kind::SyntaxKind;
use crate::syntax::{
    BinaryOp, CursorKind, Literal, NodeFlags, NodeId, Operator, Qualifiers, Type, TypeKind,
    UnaryOp,
};

/// Expression with the comma operator.
pub(crate) fn parse_expression(p: &mut Parser<'_>) -> Option<NodeId> {
    let mut lhs = parse_assignment_expression(p)?;
    while p.at(SyntaxKind::COMMA) {
        let op_loc = p.loc();
        p.bump();
        let rhs = parse_assignment_expression(p);
        lhs = make_binary(p, lhs, BinaryOp::Comma, rhs, op_loc);
    }
    Some(lhs)
}

fn assignment_op(kind: SyntaxKind) -> Option<BinaryOp> {
    let op = match kind {
        SyntaxKind::EQ => BinaryOp::Assign,
        SyntaxKind::STAR_EQ => BinaryOp::MulAssign,
        SyntaxKind::SLASH_EQ => BinaryOp::DivAssign,
        SyntaxKind::PERCENT_EQ => BinaryOp::RemAssign,
        SyntaxKind::PLUS_EQ => BinaryOp::AddAssign,
        SyntaxKind::MINUS_EQ => BinaryOp::SubAssign,
        SyntaxKind::LT_LT_EQ => BinaryOp::ShlAssign,
        SyntaxKind::GT_GT_EQ => BinaryOp::ShrAssign,
        SyntaxKind::AMP_EQ => BinaryOp::AndAssign,
        SyntaxKind::CARET_EQ => BinaryOp::XorAssign,
        SyntaxKind::PIPE_EQ => BinaryOp::OrAssign,
        _ => return None,
    };
    Some(op)
}

pub(crate) fn parse_assignment_expression(p: &mut Parser<'_>) -> Option<NodeId> {
    let lhs = parse_conditional_expression(p)?;
    let Some(op) = assignment_op(p.current_kind()) else {
        return Some(lhs);
    };
    let op_loc = p.loc();
    p.bump();
    let rhs = parse_assignment_expression(p);
    Some(make_binary(p, lhs, op, rhs, op_loc))
}

pub(crate) fn parse_conditional_expression(p: &mut Parser<'_>) -> Option<NodeId> {
    let cond = parse_binary_expression(p, 0)?;
    if !p.at(SyntaxKind::QUESTION) {
        return Some(cond);
    }
    let location = p.loc();
    p.bump();
    let then = parse_expression(p);
    p.expect(SyntaxKind::COLON);
    let otherwise = parse_assignment_expression(p);
    let start = p.start_of(cond);
    let id = p.node(CursorKind::ConditionalOperator, "", location, start);
    p.attach(id, cond);
    p.attach_opt(id, then);
    p.attach_opt(id, otherwise);
    Some(id)
}

fn binary_op(kind: SyntaxKind) -> Option<(BinaryOp, u8)> {
    let entry = match kind {
        SyntaxKind::PIPE_PIPE => (BinaryOp::LOr, 1),
        SyntaxKind::AMP_AMP => (BinaryOp::LAnd, 2),
        SyntaxKind::PIPE => (BinaryOp::BitOr, 3),
        SyntaxKind::CARET => (BinaryOp::BitXor, 4),
        SyntaxKind::AMP => (BinaryOp::BitAnd, 5),
        SyntaxKind::EQ_EQ => (BinaryOp::Eq, 6),
        SyntaxKind::BANG_EQ => (BinaryOp::Ne, 6),
        SyntaxKind::LT => (BinaryOp::Lt, 7),
        SyntaxKind::GT => (BinaryOp::Gt, 7),
        SyntaxKind::LT_EQ => (BinaryOp::Le, 7),
        SyntaxKind::GT_EQ => (BinaryOp::Ge, 7),
        SyntaxKind::LT_LT => (BinaryOp::Shl, 8),
        SyntaxKind::GT_GT => (BinaryOp::Shr, 8),
        SyntaxKind::PLUS => (BinaryOp::Add, 9),
        SyntaxKind::MINUS => (BinaryOp::Sub, 9),
        SyntaxKind::STAR => (BinaryOp::Mul, 10),
        SyntaxKind::SLASH => (BinaryOp::Div, 10),
        SyntaxKind::PERCENT => (BinaryOp::Rem, 10),
        _ => return None,
    };
    Some(entry)
}

fn parse_binary_expression(p: &mut Parser<'_>, min_prec: u8) -> Option<NodeId> {
    let mut lhs = parse_cast_expression(p)?;
    while let Some((op, prec)) = binary_op(p.current_kind()) {
        if prec < min_prec {
            break;
        }
        let op_loc = p.loc();
        p.bump();
        let rhs = parse_binary_expression(p, prec + 1);
        lhs = make_binary(p, lhs, op, rhs, op_loc);
    }
    Some(lhs)
}

fn make_binary(
    p: &mut Parser<'_>,
    lhs: NodeId,
    op: BinaryOp,
    rhs: Option<NodeId>,
    op_loc: crate::base::SourceLocation,
) -> NodeId {
    let kind = if op.is_compound_assignment() {
        CursorKind::CompoundAssignOperator
    } else {
        CursorKind::BinaryOperator
    };
    let start = p.start_of(lhs);
    let id = p.node(kind, op.spelling(), op_loc, start);
    p.ast[id].op = Some(Operator::Binary(op));
    p.attach(id, lhs);
    p.attach_opt(id, rhs);
    id
}

/// `(type) operand` or a unary expression.
fn parse_cast_expression(p: &mut Parser<'_>) -> Option<NodeId> {
    if !(p.at(SyntaxKind::L_PAREN) && is_type_start(p, 1)) {
        return parse_unary_expression(p);
    }
    let start = p.loc();
    p.bump();
    let (ty, refs) = parse_type_name(p);
    p.expect(SyntaxKind::R_PAREN);

    if p.at(SyntaxKind::L_BRACE) {
        // Compound literal.
        let init = parse_init_list(p);
        let id = p.node(CursorKind::UnexposedExpr, "", start, start);
        p.ast[id].ty = ty;
        emit_refs(p, id, &refs);
        p.attach(id, init);
        return parse_postfix_suffixes(p, id);
    }

    let operand = parse_cast_expression(p);
    let id = p.node(CursorKind::CStyleCastExpr, "", start, start);
    p.ast[id].ty = ty;
    emit_refs(p, id, &refs);
    p.attach_opt(id, operand);
    Some(id)
}

fn prefix_op(kind: SyntaxKind) -> Option<UnaryOp> {
    let op = match kind {
        SyntaxKind::PLUS_PLUS => UnaryOp::PreInc,
        SyntaxKind::MINUS_MINUS => UnaryOp::PreDec,
        SyntaxKind::AMP => UnaryOp::AddrOf,
        SyntaxKind::STAR => UnaryOp::Deref,
        SyntaxKind::PLUS => UnaryOp::Plus,
        SyntaxKind::MINUS => UnaryOp::Minus,
        SyntaxKind::TILDE => UnaryOp::Not,
        SyntaxKind::BANG => UnaryOp::LNot,
        _ => return None,
    };
    Some(op)
}

fn parse_unary_expression(p: &mut Parser<'_>) -> Option<NodeId> {
    let start = p.loc();
    if let Some(op) = prefix_op(p.current_kind()) {
        p.bump();
        let operand = parse_cast_expression(p);
        let id = p.node(CursorKind::UnaryOperator, op.spelling(), start, start);
        p.ast[id].op = Some(Operator::Unary(op));
        p.attach_opt(id, operand);
        return Some(id);
    }
    if p.at(SyntaxKind::SIZEOF_KW) {
        p.bump();
        if p.at(SyntaxKind::L_PAREN) && is_type_start(p, 1) {
            p.bump();
            let (ty, refs) = parse_type_name(p);
            p.expect(SyntaxKind::R_PAREN);
            let id = p.node(CursorKind::UnaryExpr, "", start, start);
            p.ast[id].op = Some(Operator::Unary(UnaryOp::SizeOf));
            p.ast[id].type_operand = Some(ty);
            emit_refs(p, id, &refs);
            return Some(id);
        }
        let operand = parse_unary_expression(p);
        let id = p.node(CursorKind::UnaryExpr, "", start, start);
        p.ast[id].op = Some(Operator::Unary(UnaryOp::SizeOf));
        p.attach_opt(id, operand);
        return Some(id);
    }
    parse_postfix_expression(p)
}

fn parse_postfix_expression(p: &mut Parser<'_>) -> Option<NodeId> {
    let primary = parse_primary_expression(p)?;
    parse_postfix_suffixes(p, primary)
}

/// Calls, subscripts, member access and postfix `++`/`--`.
fn parse_postfix_suffixes(p: &mut Parser<'_>, mut expr: NodeId) -> Option<NodeId> {
    loop {
        let start = p.start_of(expr);
        match p.current_kind() {
            SyntaxKind::L_PAREN => {
                p.bump();
                let mut args = Vec::new();
                if !p.at(SyntaxKind::R_PAREN) {
                    loop {
                        match parse_assignment_expression(p) {
                            Some(arg) => args.push(arg),
                            None => break,
                        }
                        if !p.eat(SyntaxKind::COMMA) {
                            break;
                        }
                    }
                }
                p.expect(SyntaxKind::R_PAREN);
                let callee = &p.ast[expr];
                let name = match callee.kind {
                    CursorKind::DeclRefExpr | CursorKind::MemberRefExpr => callee.name.clone(),
                    _ => SmolStr::default(),
                };
                let location = callee.location;
                let id = p.node(CursorKind::CallExpr, name, location, start);
                p.attach(id, expr);
                for arg in args {
                    p.attach(id, arg);
                }
                expr = id;
            }
            SyntaxKind::L_BRACKET => {
                p.bump();
                let index = parse_expression(p);
                p.expect(SyntaxKind::R_BRACKET);
                let location = p.ast[expr].location;
                let id = p.node(CursorKind::ArraySubscriptExpr, "", location, start);
                p.attach(id, expr);
                p.attach_opt(id, index);
                expr = id;
            }
            SyntaxKind::DOT | SyntaxKind::ARROW => {
                let arrow = p.at(SyntaxKind::ARROW);
                p.bump();
                let Some(member) = parse_qualified_name(p) else {
                    p.error("expected unqualified-id", p.loc());
                    return Some(expr);
                };
                let last = member.last().clone();
                let id = p.node(CursorKind::MemberRefExpr, last.text.clone(), last.start, start);
                p.ast[id].written = member.written();
                if arrow {
                    p.ast[id].flags |= NodeFlags::ARROW;
                }
                p.attach(id, expr);
                expr = id;
            }
            SyntaxKind::PLUS_PLUS | SyntaxKind::MINUS_MINUS => {
                let op = if p.at(SyntaxKind::PLUS_PLUS) {
                    UnaryOp::PostInc
                } else {
                    UnaryOp::PostDec
                };
                let location = p.loc();
                p.bump();
                let id = p.node(CursorKind::UnaryOperator, op.spelling(), location, start);
                p.ast[id].op = Some(Operator::Unary(op));
                p.attach(id, expr);
                expr = id;
            }
            _ => return Some(expr),
        }
    }
}

fn parse_primary_expression(p: &mut Parser<'_>) -> Option<NodeId> {
    let start = p.loc();
    let text = p.current_text();
    let id = match p.current_kind() {
        SyntaxKind::INT_NUMBER => {
            p.bump();
            let id = p.node(CursorKind::IntegerLiteral, text, start, start);
            match parse_integer(text) {
                Some(lit) => {
                    p.ast[id].ty = Type::new(integer_literal_type(lit, is_decimal(text)));
                    p.ast[id].literal = Some(Literal::Int {
                        value: lit.value,
                        unsigned: lit.unsigned,
                    });
                }
                None => {
                    p.error("invalid integer literal", start);
                    p.ast[id].ty = Type::new(TypeKind::Int);
                }
            }
            id
        }
        SyntaxKind::FLOAT_NUMBER => {
            p.bump();
            let id = p.node(CursorKind::FloatingLiteral, text, start, start);
            let (value, single) = parse_float(text).unwrap_or((0.0, false));
            let kind = if single {
                TypeKind::Float
            } else if text.ends_with(['l', 'L']) {
                TypeKind::LongDouble
            } else {
                TypeKind::Double
            };
            p.ast[id].ty = Type::new(kind);
            p.ast[id].literal = Some(Literal::Float(value));
            id
        }
        SyntaxKind::CHAR => {
            p.bump();
            let id = p.node(CursorKind::CharacterLiteral, text, start, start);
            let plain = text.starts_with('\'');
            let kind = if p.cplusplus() && plain {
                TypeKind::CharS
            } else {
                TypeKind::Int
            };
            p.ast[id].ty = Type::new(kind);
            p.ast[id].literal = Some(Literal::Char(parse_char(text).unwrap_or(0)));
            id
        }
        SyntaxKind::STRING => {
            let value = parse_string_tokens(p);
            let id = p.node(CursorKind::StringLiteral, text, start, start);
            p.ast[id].ty = string_type(p, &value);
            p.ast[id].literal = Some(Literal::Str(value));
            id
        }
        SyntaxKind::AT if p.lang.objc() && p.nth(1) == SyntaxKind::STRING => {
            p.bump();
            let spelling = format!("@{}", p.current_text());
            let value = parse_string_tokens(p);
            let id = p.node(CursorKind::ObjCStringLiteral, spelling, start, start);
            p.ast[id].ty = Type::new(TypeKind::ObjCObjectPointer {
                class: SmolStr::new_static("NSString"),
            });
            p.ast[id].literal = Some(Literal::ObjCStr(value));
            id
        }
        SyntaxKind::AT if p.lang.objc() => {
            // @selector(...), @[...], @{...}, @42 and friends.
            p.bump();
            if p.at(SyntaxKind::IDENT) {
                p.bump();
            }
            if p.at_any(&[SyntaxKind::L_PAREN, SyntaxKind::L_BRACKET, SyntaxKind::L_BRACE]) {
                p.skip_balanced();
            } else {
                p.bump();
            }
            p.node(CursorKind::UnexposedExpr, "", start, start)
        }
        SyntaxKind::L_BRACKET if p.lang.objc() => {
            // Message send.
            p.skip_balanced();
            p.node(CursorKind::UnexposedExpr, "", start, start)
        }
        SyntaxKind::TRUE_KW | SyntaxKind::FALSE_KW => {
            let value = p.at(SyntaxKind::TRUE_KW);
            p.bump();
            let id = p.node(CursorKind::CXXBoolLiteralExpr, text, start, start);
            p.ast[id].ty = Type::new(TypeKind::Bool);
            p.ast[id].literal = Some(Literal::Bool(value));
            id
        }
        SyntaxKind::NULLPTR_KW => {
            p.bump();
            let id = p.node(CursorKind::CXXNullPtrLiteralExpr, "", start, start);
            p.ast[id].ty = Type::new(TypeKind::NullPtr);
            p.ast[id].literal = Some(Literal::NullPtr);
            id
        }
        SyntaxKind::THIS_KW => {
            p.bump();
            p.node(CursorKind::CXXThisExpr, "", start, start)
        }
        SyntaxKind::IDENT | SyntaxKind::COLON_COLON | SyntaxKind::OPERATOR_KW => {
            let Some(name) = parse_qualified_name(p) else {
                p.error("expected expression", start);
                return None;
            };
            let last = name.last().clone();
            let id = p.node(CursorKind::DeclRefExpr, last.text.clone(), last.start, start);
            p.ast[id].written = name.written();
            if name.global {
                p.ast[id].flags |= NodeFlags::GLOBAL_QUALIFIER;
            }
            emit_refs(p, id, &name.qualifier_refs());
            id
        }
        SyntaxKind::L_PAREN => {
            p.bump();
            let inner = parse_expression(p);
            p.expect(SyntaxKind::R_PAREN);
            let id = p.node(CursorKind::ParenExpr, "", start, start);
            p.attach_opt(id, inner);
            id
        }
        SyntaxKind::L_BRACE if p.cplusplus() => parse_init_list(p),
        _ => {
            p.error("expected expression", start);
            return None;
        }
    };
    Some(id)
}

/// Adjacent string literals concatenate.
fn parse_string_tokens(p: &mut Parser<'_>) -> String {
    let mut value = String::new();
    while p.at(SyntaxKind::STRING) {
        value.push_str(&parse_string(p.current_text()));
        p.bump();
    }
    value
}

fn string_type(p: &Parser<'_>, value: &str) -> Type {
    let mut element = Type::new(TypeKind::CharS);
    if p.cplusplus() {
        element = element.with_quals(Qualifiers::CONST);
    }
    Type::new(TypeKind::ConstantArray {
        element: Box::new(element),
        size: value.len() as u64 + 1,
    })
}

fn is_decimal(text: &str) -> bool {
    !(text.starts_with('0') && text.len() > 1)
}

/// The first type in the literal's candidate list that can hold its value.
fn integer_literal_type(lit: IntLiteral, decimal: bool) -> TypeKind {
    const CANDIDATES: [(TypeKind, u64, bool); 6] = [
        (TypeKind::Int, i32::MAX as u64, false),
        (TypeKind::UInt, u32::MAX as u64, true),
        (TypeKind::Long, i64::MAX as u64, false),
        (TypeKind::ULong, u64::MAX, true),
        (TypeKind::LongLong, i64::MAX as u64, false),
        (TypeKind::ULongLong, u64::MAX, true),
    ];
    let min_rank = match lit.longs {
        0 => 0,
        1 => 2,
        _ => 4,
    };
    CANDIDATES
        .iter()
        .skip(min_rank)
        .filter(|(_, _, unsigned)| {
            if lit.unsigned {
                *unsigned
            } else {
                decimal && !*unsigned || !decimal
            }
        })
        .find(|(_, max, _)| lit.value <= *max)
        .map_or(TypeKind::ULongLong, |(kind, _, _)| kind.clone())
}

/// `= value` or `= { ... }`.
pub(crate) fn parse_initializer(p: &mut Parser<'_>) -> Option<NodeId> {
    if p.at(SyntaxKind::L_BRACE) {
        Some(parse_init_list(p))
    } else {
        parse_assignment_expression(p)
    }
}

fn parse_init_list(p: &mut Parser<'_>) -> NodeId {
    let start = p.loc();
    p.bump();
    let mut elements = Vec::new();
    while !p.at(SyntaxKind::R_BRACE) && !p.at_eof() {
        skip_designators(p);
        match parse_initializer(p) {
            Some(element) => elements.push(element),
            None => {
                while !p.at_eof() && !p.at_any(&[SyntaxKind::COMMA, SyntaxKind::R_BRACE]) {
                    p.bump();
                }
            }
        }
        if !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }
    p.expect(SyntaxKind::R_BRACE);
    let id = p.node(CursorKind::InitListExpr, "", start, start);
    for element in elements {
        p.attach(id, element);
    }
    id
}

/// `.field =` and `[index] =` designators.
fn skip_designators(p: &mut Parser<'_>) {
    let mut any = false;
    loop {
        if p.at(SyntaxKind::DOT) && p.nth(1) == SyntaxKind::IDENT {
            p.bump();
            p.bump();
            any = true;
        } else if p.at(SyntaxKind::L_BRACKET) && !p.lang.objc() {
            p.skip_balanced();
            any = true;
        } else {
            break;
        }
    }
    if any {
        p.eat(SyntaxKind::EQ);
    }
}

//! Constant evaluation of expressions.
//!
//! Folds literal arithmetic, enumerators and const-qualified variables with
//! constant initializers. Anything that needs run-time state yields `None`.

use crate::syntax::{Ast, BinaryOp, CursorKind, Literal, NodeFlags, NodeId, Operator, TypeKind, UnaryOp};

/// Result of evaluating a cursor.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalResult {
    /// Integer value; `unsigned` tells how to read the bits.
    Int { value: i64, unsigned: bool },
    Float(f64),
    StrLiteral(String),
    ObjCStrLiteral(String),
    /// `CFSTR("...")`.
    CFStr(String),
    Other,
}

impl EvalResult {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            EvalResult::Int { value, .. } => Some(*value),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            EvalResult::Int { value, .. } => Some(*value as u64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            EvalResult::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            EvalResult::StrLiteral(s) | EvalResult::ObjCStrLiteral(s) | EvalResult::CFStr(s) => {
                Some(s)
            }
            _ => None,
        }
    }

    /// Whether the integer fits in a signed 64-bit value as written.
    pub fn is_unsigned_int(&self) -> bool {
        matches!(self, EvalResult::Int { unsigned: true, .. })
    }

    fn truthy(&self) -> Option<bool> {
        match self {
            EvalResult::Int { value, .. } => Some(*value != 0),
            EvalResult::Float(value) => Some(*value != 0.0),
            EvalResult::StrLiteral(_) | EvalResult::ObjCStrLiteral(_) | EvalResult::CFStr(_) => {
                Some(true)
            }
            EvalResult::Other => None,
        }
    }
}

/// Integer binary operation with C semantics on 64-bit values. `None` for
/// division by zero, out-of-range shifts and assignments.
pub(crate) fn fold_binary(op: BinaryOp, lhs: i64, rhs: i64) -> Option<i64> {
    let value = match op {
        BinaryOp::Mul => lhs.wrapping_mul(rhs),
        BinaryOp::Div => lhs.checked_div(rhs)?,
        BinaryOp::Rem => lhs.checked_rem(rhs)?,
        BinaryOp::Add => lhs.wrapping_add(rhs),
        BinaryOp::Sub => lhs.wrapping_sub(rhs),
        BinaryOp::Shl => lhs.checked_shl(u32::try_from(rhs).ok()?)?,
        BinaryOp::Shr => lhs.checked_shr(u32::try_from(rhs).ok()?)?,
        BinaryOp::Lt => i64::from(lhs < rhs),
        BinaryOp::Gt => i64::from(lhs > rhs),
        BinaryOp::Le => i64::from(lhs <= rhs),
        BinaryOp::Ge => i64::from(lhs >= rhs),
        BinaryOp::Eq => i64::from(lhs == rhs),
        BinaryOp::Ne => i64::from(lhs != rhs),
        BinaryOp::BitAnd => lhs & rhs,
        BinaryOp::BitXor => lhs ^ rhs,
        BinaryOp::BitOr => lhs | rhs,
        BinaryOp::LAnd => i64::from(lhs != 0 && rhs != 0),
        BinaryOp::LOr => i64::from(lhs != 0 || rhs != 0),
        BinaryOp::Comma => rhs,
        _ => return None,
    };
    Some(value)
}

fn fold_unsigned(op: BinaryOp, lhs: u64, rhs: u64) -> Option<u64> {
    let value = match op {
        BinaryOp::Mul => lhs.wrapping_mul(rhs),
        BinaryOp::Div => lhs.checked_div(rhs)?,
        BinaryOp::Rem => lhs.checked_rem(rhs)?,
        BinaryOp::Add => lhs.wrapping_add(rhs),
        BinaryOp::Sub => lhs.wrapping_sub(rhs),
        BinaryOp::Shl => lhs.checked_shl(u32::try_from(rhs).ok()?)?,
        BinaryOp::Shr => lhs.checked_shr(u32::try_from(rhs).ok()?)?,
        BinaryOp::Lt => u64::from(lhs < rhs),
        BinaryOp::Gt => u64::from(lhs > rhs),
        BinaryOp::Le => u64::from(lhs <= rhs),
        BinaryOp::Ge => u64::from(lhs >= rhs),
        BinaryOp::Eq => u64::from(lhs == rhs),
        BinaryOp::Ne => u64::from(lhs != rhs),
        BinaryOp::BitAnd => lhs & rhs,
        BinaryOp::BitXor => lhs ^ rhs,
        BinaryOp::BitOr => lhs | rhs,
        BinaryOp::LAnd => u64::from(lhs != 0 && rhs != 0),
        BinaryOp::LOr => u64::from(lhs != 0 || rhs != 0),
        BinaryOp::Comma => rhs,
        _ => return None,
    };
    Some(value)
}

fn fold_float(op: BinaryOp, lhs: f64, rhs: f64) -> Option<EvalResult> {
    let int = |b: bool| EvalResult::Int {
        value: i64::from(b),
        unsigned: false,
    };
    let value = match op {
        BinaryOp::Mul => EvalResult::Float(lhs * rhs),
        BinaryOp::Div => EvalResult::Float(lhs / rhs),
        BinaryOp::Add => EvalResult::Float(lhs + rhs),
        BinaryOp::Sub => EvalResult::Float(lhs - rhs),
        BinaryOp::Lt => int(lhs < rhs),
        BinaryOp::Gt => int(lhs > rhs),
        BinaryOp::Le => int(lhs <= rhs),
        BinaryOp::Ge => int(lhs >= rhs),
        BinaryOp::Eq => int(lhs == rhs),
        BinaryOp::Ne => int(lhs != rhs),
        BinaryOp::LAnd => int(lhs != 0.0 && rhs != 0.0),
        BinaryOp::LOr => int(lhs != 0.0 || rhs != 0.0),
        BinaryOp::Comma => EvalResult::Float(rhs),
        _ => return None,
    };
    Some(value)
}

/// Evaluate the cursor `id`.
///
/// A `VarDecl` evaluates its initializer and a `CompoundStmt` its first
/// expression statement.
pub fn evaluate(ast: &Ast, id: NodeId) -> Option<EvalResult> {
    Evaluator { ast, depth: 0 }.eval_cursor(id)
}

/// Value of an enumerator: its initializer, or one more than the previous
/// enumerator.
pub fn enumerator_value(ast: &Ast, id: NodeId) -> Option<i64> {
    Evaluator { ast, depth: 0 }.enumerator(id)
}

const MAX_DEPTH: u32 = 256;

struct Evaluator<'a> {
    ast: &'a Ast,
    depth: u32,
}

impl Evaluator<'_> {
    fn eval_cursor(&mut self, id: NodeId) -> Option<EvalResult> {
        let ast = self.ast;
        let node = &ast[id];
        match node.kind {
            CursorKind::VarDecl => {
                if !node.flags.contains(NodeFlags::HAS_INIT) {
                    return None;
                }
                self.eval(*node.children.last()?)
            }
            CursorKind::CompoundStmt => {
                let first = node
                    .children
                    .iter()
                    .copied()
                    .find(|&child| ast[child].kind.is_expression())?;
                self.eval(first)
            }
            kind if kind.is_expression() => self.eval(id),
            _ => None,
        }
    }

    fn eval(&mut self, id: NodeId) -> Option<EvalResult> {
        if self.depth > MAX_DEPTH {
            return None;
        }
        self.depth += 1;
        let result = self.eval_inner(id);
        self.depth -= 1;
        result
    }

    fn eval_inner(&mut self, id: NodeId) -> Option<EvalResult> {
        let ast = self.ast;
        let node = &ast[id];
        let unsigned = node.ty.is_unsigned_integer();
        match node.kind {
            CursorKind::IntegerLiteral => match node.literal {
                Some(Literal::Int { value, unsigned }) => Some(EvalResult::Int {
                    value: value as i64,
                    unsigned,
                }),
                _ => None,
            },
            CursorKind::CharacterLiteral => match node.literal {
                Some(Literal::Char(value)) => Some(EvalResult::Int {
                    value,
                    unsigned: false,
                }),
                _ => None,
            },
            CursorKind::FloatingLiteral => match node.literal {
                Some(Literal::Float(value)) => Some(EvalResult::Float(value)),
                _ => None,
            },
            CursorKind::CXXBoolLiteralExpr => match node.literal {
                Some(Literal::Bool(value)) => Some(EvalResult::Int {
                    value: i64::from(value),
                    unsigned: false,
                }),
                _ => None,
            },
            CursorKind::CXXNullPtrLiteralExpr => Some(EvalResult::Int {
                value: 0,
                unsigned: false,
            }),
            CursorKind::StringLiteral => match &node.literal {
                Some(Literal::Str(s)) => Some(EvalResult::StrLiteral(s.clone())),
                _ => None,
            },
            CursorKind::ObjCStringLiteral => match &node.literal {
                Some(Literal::ObjCStr(s)) => Some(EvalResult::ObjCStrLiteral(s.clone())),
                _ => None,
            },
            CursorKind::ParenExpr | CursorKind::UnexposedExpr => {
                self.eval(*node.children.last()?)
            }
            CursorKind::CStyleCastExpr => {
                let inner = self.eval(*node.children.last()?)?;
                Some(convert(inner, &node.ty.canonical().kind))
            }
            CursorKind::UnaryOperator => {
                let operand = self.eval(*node.children.last()?)?;
                let Some(Operator::Unary(op)) = node.op else {
                    return None;
                };
                unary(op, operand, unsigned)
            }
            CursorKind::UnaryExpr => {
                let size = match &node.type_operand {
                    Some(ty) => ty.size_of()?,
                    None => ast[*node.children.last()?].ty.size_of()?,
                };
                Some(EvalResult::Int {
                    value: size as i64,
                    unsigned: true,
                })
            }
            CursorKind::BinaryOperator => {
                let Some(Operator::Binary(op)) = node.op else {
                    return None;
                };
                let lhs_id = *node.children.first()?;
                let rhs_id = *node.children.get(1)?;
                let lhs = self.eval(lhs_id)?;
                if op == BinaryOp::LAnd && lhs.truthy() == Some(false) {
                    return Some(EvalResult::Int { value: 0, unsigned: false });
                }
                if op == BinaryOp::LOr && lhs.truthy() == Some(true) {
                    return Some(EvalResult::Int { value: 1, unsigned: false });
                }
                let rhs = self.eval(rhs_id)?;
                binary(op, lhs, rhs, unsigned)
            }
            CursorKind::ConditionalOperator => {
                let cond = self.eval(*node.children.first()?)?;
                let pick = if cond.truthy()? { 1 } else { 2 };
                self.eval(*node.children.get(pick)?)
            }
            CursorKind::DeclRefExpr => self.eval_decl_ref(node.referenced?),
            CursorKind::CallExpr => {
                // CFSTR("...") expands to this builtin.
                if node.name != "__builtin___CFStringMakeConstantString" {
                    return None;
                }
                match self.eval(*node.children.get(1)?)? {
                    EvalResult::StrLiteral(s) => Some(EvalResult::CFStr(s)),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    fn eval_decl_ref(&mut self, decl: NodeId) -> Option<EvalResult> {
        let ast = self.ast;
        let node = &ast[decl];
        match node.kind {
            CursorKind::EnumConstantDecl => Some(EvalResult::Int {
                value: self.enumerator(decl)?,
                unsigned: false,
            }),
            CursorKind::VarDecl => {
                let constant = node.ty.is_const_qualified()
                    || node.flags.contains(NodeFlags::CONSTEXPR);
                if !constant || !node.flags.contains(NodeFlags::HAS_INIT) {
                    return None;
                }
                self.eval(*node.children.last()?)
            }
            _ => None,
        }
    }

    fn enumerator(&mut self, id: NodeId) -> Option<i64> {
        let ast = self.ast;
        let parent = ast[id].parent?;
        let mut next = 0i64;
        for &sibling in &ast[parent].children {
            let node = &ast[sibling];
            if node.kind != CursorKind::EnumConstantDecl {
                continue;
            }
            let value = if node.flags.contains(NodeFlags::HAS_INIT) {
                self.eval(*node.children.last()?)?.as_i64()?
            } else {
                next
            };
            if sibling == id {
                return Some(value);
            }
            next = value.wrapping_add(1);
        }
        None
    }
}

fn convert(value: EvalResult, target: &TypeKind) -> EvalResult {
    let to_float = matches!(target, TypeKind::Float | TypeKind::Double | TypeKind::LongDouble);
    let unsigned = matches!(
        target,
        TypeKind::Bool
            | TypeKind::UChar
            | TypeKind::UShort
            | TypeKind::UInt
            | TypeKind::ULong
            | TypeKind::ULongLong
    );
    let to_int = unsigned
        || matches!(
            target,
            TypeKind::CharS
                | TypeKind::SChar
                | TypeKind::Short
                | TypeKind::Int
                | TypeKind::Long
                | TypeKind::LongLong
                | TypeKind::Enum { .. }
        );
    match value {
        EvalResult::Int { value, unsigned: from_unsigned } if to_float => {
            if from_unsigned {
                EvalResult::Float(value as u64 as f64)
            } else {
                EvalResult::Float(value as f64)
            }
        }
        EvalResult::Int { value, .. } if to_int => EvalResult::Int {
            value: truncate(value, target),
            unsigned,
        },
        EvalResult::Float(value) if to_int => EvalResult::Int {
            value: truncate(value as i64, target),
            unsigned,
        },
        other => other,
    }
}

/// Wrap `value` to the width of an integer type.
fn truncate(value: i64, target: &TypeKind) -> i64 {
    match target {
        TypeKind::Bool => i64::from(value != 0),
        TypeKind::CharS | TypeKind::SChar => value as i8 as i64,
        TypeKind::UChar => value as u8 as i64,
        TypeKind::Short => value as i16 as i64,
        TypeKind::UShort => value as u16 as i64,
        TypeKind::Int | TypeKind::Enum { .. } => value as i32 as i64,
        TypeKind::UInt => value as u32 as i64,
        _ => value,
    }
}

fn unary(op: UnaryOp, operand: EvalResult, unsigned: bool) -> Option<EvalResult> {
    match operand {
        EvalResult::Int { value, .. } => {
            let value = match op {
                UnaryOp::Plus => value,
                UnaryOp::Minus => value.wrapping_neg(),
                UnaryOp::Not => !value,
                UnaryOp::LNot => {
                    return Some(EvalResult::Int {
                        value: i64::from(value == 0),
                        unsigned: false,
                    });
                }
                _ => return None,
            };
            Some(EvalResult::Int { value, unsigned })
        }
        EvalResult::Float(value) => match op {
            UnaryOp::Plus => Some(EvalResult::Float(value)),
            UnaryOp::Minus => Some(EvalResult::Float(-value)),
            UnaryOp::LNot => Some(EvalResult::Int {
                value: i64::from(value == 0.0),
                unsigned: false,
            }),
            _ => None,
        },
        _ => None,
    }
}

fn binary(op: BinaryOp, lhs: EvalResult, rhs: EvalResult, unsigned: bool) -> Option<EvalResult> {
    match (lhs, rhs) {
        (
            EvalResult::Int { value: l, unsigned: lu },
            EvalResult::Int { value: r, unsigned: ru },
        ) => {
            let as_unsigned = unsigned || lu || ru;
            let value = if as_unsigned {
                fold_unsigned(op, l as u64, r as u64)? as i64
            } else {
                fold_binary(op, l, r)?
            };
            let unsigned = as_unsigned && !op.is_comparison() && !op.is_logical();
            Some(EvalResult::Int { value, unsigned })
        }
        (EvalResult::Float(l), EvalResult::Float(r)) => fold_float(op, l, r),
        (EvalResult::Float(l), EvalResult::Int { value: r, .. }) => fold_float(op, l, r as f64),
        (EvalResult::Int { value: l, .. }, EvalResult::Float(r)) => fold_float(op, l as f64, r),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_folding() {
        assert_eq!(fold_binary(BinaryOp::Add, 2, 3), Some(5));
        assert_eq!(fold_binary(BinaryOp::Shl, 1, 4), Some(16));
        assert_eq!(fold_binary(BinaryOp::Div, 1, 0), None);
        assert_eq!(fold_binary(BinaryOp::Lt, 1, 2), Some(1));
        assert_eq!(fold_binary(BinaryOp::Assign, 1, 2), None);
        assert_eq!(fold_binary(BinaryOp::Div, i64::MIN, -1), None);
    }

    #[test]
    fn unsigned_arithmetic_wraps() {
        let l = EvalResult::Int { value: 0, unsigned: true };
        let r = EvalResult::Int { value: 1, unsigned: false };
        let result = binary(BinaryOp::Sub, l, r, true).unwrap();
        assert_eq!(result.as_u64(), Some(u64::MAX));
        assert!(result.is_unsigned_int());
    }

    #[test]
    fn casts_convert() {
        let value = convert(EvalResult::Float(3.9), &TypeKind::Int);
        assert_eq!(value, EvalResult::Int { value: 3, unsigned: false });
        let value = convert(EvalResult::Int { value: 300, unsigned: false }, &TypeKind::UChar);
        assert_eq!(value, EvalResult::Int { value: 44, unsigned: true });
        let value = convert(EvalResult::Int { value: 2, unsigned: false }, &TypeKind::Double);
        assert_eq!(value, EvalResult::Float(2.0));
    }
}

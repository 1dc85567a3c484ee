//! Declarators and the types they build.
//!
//! A declarator is parsed into a list of type operations ordered from the
//! innermost layer (next to the specifier type) to the outermost (next to
//! the name):
//!
//! ```text
//! int *a[3]         [Pointer, Array(3)]            array of pointers
//! int (*fp)(int)    [Function, Pointer]            pointer to function
//! char *const *p    [Pointer(const), Pointer]
//! ```
//!
//! Folding the list over the specifier type yields the declared type.

use super::declarations::{DeclSpec, parse_decl_specifiers};
use super::expressions::{parse_assignment_expression, parse_initializer};
use super::{DeclContext, PendingRef, QualifiedName, emit_refs, parse_qualified_name};
use crate::parser::parser::Parser;
use crate::parser::syntax_kind::SyntaxKind;
use crate::syntax::{
    Ast, CursorKind, Literal, NodeFlags, NodeId, Operator, Qualifiers, StorageClass, Type,
    TypeKind, UnaryOp,
};

#[derive(Debug, Clone)]
pub(crate) enum DeclOp {
    Pointer(Qualifiers),
    LValueRef,
    RValueRef,
    /// Element count when it folds to a constant.
    Array(Option<u64>),
    Function {
        params: Vec<NodeId>,
        variadic: bool,
        prototyped: bool,
    },
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Declarator {
    pub(crate) name: Option<QualifiedName>,
    pub(crate) ops: Vec<DeclOp>,
    /// Array bound expressions in source order.
    pub(crate) size_exprs: Vec<NodeId>,
}

impl Declarator {
    /// Whether the declared entity itself is a function.
    pub(crate) fn is_function(&self) -> bool {
        matches!(self.ops.last(), Some(DeclOp::Function { .. }))
    }

    /// Parameters of the function layer closest to the name.
    pub(crate) fn params(&self) -> &[NodeId] {
        self.ops
            .iter()
            .rev()
            .find_map(|op| match op {
                DeclOp::Function { params, .. } => Some(params.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }
}

/// Fold declarator operations over the specifier type.
pub(crate) fn build_type(base: Type, ops: &[DeclOp], ast: &Ast) -> Type {
    ops.iter().fold(base, |ty, op| match op {
        DeclOp::Pointer(quals) => ty.pointer_to().with_quals(*quals),
        DeclOp::LValueRef => Type::new(TypeKind::LValueReference(Box::new(ty))),
        DeclOp::RValueRef => Type::new(TypeKind::RValueReference(Box::new(ty))),
        DeclOp::Array(Some(size)) => Type::new(TypeKind::ConstantArray {
            element: Box::new(ty),
            size: *size,
        }),
        DeclOp::Array(None) => Type::new(TypeKind::IncompleteArray(Box::new(ty))),
        DeclOp::Function {
            params,
            variadic,
            prototyped,
        } => {
            if *prototyped {
                Type::new(TypeKind::FunctionProto {
                    result: Box::new(ty),
                    params: params.iter().map(|id| ast[*id].ty.clone()).collect(),
                    variadic: *variadic,
                })
            } else {
                Type::new(TypeKind::FunctionNoProto {
                    result: Box::new(ty),
                })
            }
        }
    })
}

/// Arrays and functions decay to pointers in parameter position.
fn adjust_parameter_type(ty: Type) -> Type {
    match ty.kind {
        TypeKind::ConstantArray { element, .. } | TypeKind::IncompleteArray(element) => {
            (*element).pointer_to().with_quals(ty.quals)
        }
        TypeKind::FunctionProto { .. } | TypeKind::FunctionNoProto { .. } => ty.pointer_to(),
        _ => ty,
    }
}

pub(crate) fn parse_cv_qualifiers(p: &mut Parser<'_>) -> Qualifiers {
    let mut quals = Qualifiers::empty();
    loop {
        match p.current_kind() {
            SyntaxKind::CONST_KW => quals |= Qualifiers::CONST,
            SyntaxKind::VOLATILE_KW => quals |= Qualifiers::VOLATILE,
            SyntaxKind::RESTRICT_KW => quals |= Qualifiers::RESTRICT,
            _ => return quals,
        }
        p.bump();
    }
}

/// Parse a declarator. With `abstract_ok` the name may be omitted, as in
/// parameter lists and type names.
pub(crate) fn parse_declarator(p: &mut Parser<'_>, abstract_ok: bool) -> Declarator {
    let mut prefix = Vec::new();
    loop {
        p.skip_attributes();
        let op = match p.current_kind() {
            SyntaxKind::STAR | SyntaxKind::CARET => {
                p.bump();
                DeclOp::Pointer(parse_cv_qualifiers(p))
            }
            SyntaxKind::AMP if p.cplusplus() => {
                p.bump();
                DeclOp::LValueRef
            }
            SyntaxKind::AMP_AMP if p.cplusplus() => {
                p.bump();
                DeclOp::RValueRef
            }
            _ => break,
        };
        prefix.push(op);
    }

    let mut declarator = Declarator::default();
    let mut inner = None;
    match p.current_kind() {
        SyntaxKind::IDENT | SyntaxKind::COLON_COLON | SyntaxKind::TILDE | SyntaxKind::OPERATOR_KW => {
            declarator.name = parse_qualified_name(p);
        }
        SyntaxKind::L_PAREN if starts_nested_declarator(p, abstract_ok) => {
            p.bump();
            inner = Some(parse_declarator(p, abstract_ok));
            p.expect(SyntaxKind::R_PAREN);
        }
        _ => {}
    }
    if let Some(inner) = &inner {
        declarator.name = inner.name.clone();
    }

    let mut suffixes = Vec::new();
    loop {
        match p.current_kind() {
            SyntaxKind::L_BRACKET => {
                p.bump();
                let mut size = None;
                if !p.at(SyntaxKind::R_BRACKET) {
                    if let Some(expr) = parse_assignment_expression(p) {
                        declarator.size_exprs.push(expr);
                        size = fold_constant(&p.ast, expr).and_then(|v| u64::try_from(v).ok());
                    }
                }
                p.expect(SyntaxKind::R_BRACKET);
                suffixes.push(DeclOp::Array(size));
            }
            SyntaxKind::L_PAREN
                if declarator.name.is_some() || inner.is_some() || abstract_ok =>
            {
                suffixes.push(parse_parameter_list(p));
                parse_function_qualifiers(p);
            }
            _ => break,
        }
    }
    p.skip_attributes();

    declarator.ops = prefix;
    declarator.ops.extend(suffixes.into_iter().rev());
    if let Some(inner) = inner {
        declarator.ops.extend(inner.ops);
        declarator.size_exprs.extend(inner.size_exprs);
    }
    declarator
}

fn starts_nested_declarator(p: &Parser<'_>, abstract_ok: bool) -> bool {
    match p.nth(1) {
        SyntaxKind::STAR | SyntaxKind::CARET | SyntaxKind::L_PAREN | SyntaxKind::COLON_COLON => true,
        SyntaxKind::AMP | SyntaxKind::AMP_AMP => p.cplusplus(),
        SyntaxKind::IDENT => !abstract_ok || !p.is_type_name(p.nth_text(1)),
        _ => false,
    }
}

/// Trailing `const`, ref-qualifiers, `noexcept`, `override`, `final` and
/// trailing return types after a parameter list.
fn parse_function_qualifiers(p: &mut Parser<'_>) {
    loop {
        match p.current_kind() {
            SyntaxKind::CONST_KW | SyntaxKind::VOLATILE_KW => {
                p.bump();
            }
            SyntaxKind::AMP | SyntaxKind::AMP_AMP
                if p.cplusplus() && matches!(p.nth(1), SyntaxKind::SEMICOLON | SyntaxKind::L_BRACE) =>
            {
                p.bump();
            }
            SyntaxKind::NOEXCEPT_KW => {
                p.bump();
                if p.at(SyntaxKind::L_PAREN) {
                    p.skip_balanced();
                }
            }
            SyntaxKind::IDENT if matches!(p.current_text(), "override" | "final") => {
                p.bump();
            }
            SyntaxKind::ARROW if p.cplusplus() => {
                p.bump();
                parse_type_name(p);
            }
            _ => return,
        }
    }
}

/// `( parameter-list )`, starting at the opening paren.
fn parse_parameter_list(p: &mut Parser<'_>) -> DeclOp {
    p.bump();
    let mut params = Vec::new();
    let mut variadic = false;
    if p.eat(SyntaxKind::R_PAREN) {
        return DeclOp::Function {
            params,
            variadic,
            prototyped: p.cplusplus() || p.lang.c23(),
        };
    }
    if p.at(SyntaxKind::VOID_KW) && p.nth(1) == SyntaxKind::R_PAREN {
        p.bump();
        p.bump();
        return DeclOp::Function {
            params,
            variadic,
            prototyped: true,
        };
    }
    // K&R identifier list: `int f(a, b) int a; int b; {...}`
    let identifier_list = !p.cplusplus()
        && p.at(SyntaxKind::IDENT)
        && !p.is_type_name(p.current_text())
        && matches!(p.nth(1), SyntaxKind::COMMA | SyntaxKind::R_PAREN);
    if identifier_list {
        while !p.at_eof() && !p.eat(SyntaxKind::R_PAREN) {
            p.bump();
        }
        return DeclOp::Function {
            params,
            variadic,
            prototyped: false,
        };
    }

    loop {
        if p.eat(SyntaxKind::ELLIPSIS) {
            variadic = true;
            break;
        }
        match parse_parameter(p) {
            Some(param) => params.push(param),
            None => {
                while !p.at_eof() && !p.at_any(&[SyntaxKind::R_PAREN, SyntaxKind::SEMICOLON, SyntaxKind::L_BRACE]) {
                    if p.at(SyntaxKind::L_PAREN) {
                        p.skip_balanced();
                    } else {
                        p.bump();
                    }
                }
                break;
            }
        }
        if !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }
    p.expect(SyntaxKind::R_PAREN);
    DeclOp::Function {
        params,
        variadic,
        prototyped: true,
    }
}

/// One parameter declaration. The node is allocated but not attached; the
/// declaration owning the parameter list adopts it.
fn parse_parameter(p: &mut Parser<'_>) -> Option<NodeId> {
    let start = p.loc();
    let root = p.ast.root();
    let spec = parse_decl_specifiers(p, root, DeclContext::Param);
    if !spec.consumed {
        p.error("expected parameter declarator", p.loc());
        return None;
    }
    let declarator = parse_declarator(p, true);
    let ty = adjust_parameter_type(build_type(spec.base_type(), &declarator.ops, &p.ast));
    let (name, location) = match &declarator.name {
        Some(name) => (name.last().text.clone(), name.last().start),
        None => (Default::default(), start),
    };
    let id = p.node(CursorKind::ParmDecl, name, location, start);
    p.ast[id].ty = ty;
    p.ast[id].storage = match spec.storage {
        StorageClass::Register => StorageClass::Register,
        _ => StorageClass::None,
    };
    emit_refs(p, id, &spec.refs);
    for expr in declarator.size_exprs.clone() {
        p.attach(id, expr);
    }
    for param in declarator.params().to_vec() {
        p.attach(id, param);
    }
    if p.eat(SyntaxKind::EQ) {
        let default = parse_initializer(p);
        p.attach_opt(id, default);
        p.ast[id].flags |= NodeFlags::HAS_INIT;
    }
    p.finish_node(id);
    Some(id)
}

/// A type name as in casts and `sizeof(type)`.
pub(crate) fn parse_type_name(p: &mut Parser<'_>) -> (Type, Vec<PendingRef>) {
    let root = p.ast.root();
    let spec: DeclSpec = parse_decl_specifiers(p, root, DeclContext::Param);
    let declarator = parse_declarator(p, true);
    let ty = build_type(spec.base_type(), &declarator.ops, &p.ast);
    (ty, spec.refs)
}

/// Fold an integer constant expression built only from literals.
pub(crate) fn fold_constant(ast: &Ast, id: NodeId) -> Option<i64> {
    let node = &ast[id];
    match node.kind {
        CursorKind::IntegerLiteral => match node.literal {
            Some(Literal::Int { value, .. }) => Some(value as i64),
            _ => None,
        },
        CursorKind::CharacterLiteral => match node.literal {
            Some(Literal::Char(value)) => Some(value),
            _ => None,
        },
        CursorKind::ParenExpr => fold_constant(ast, *node.children.first()?),
        CursorKind::UnaryExpr => node.type_operand.as_ref()?.size_of().map(|s| s as i64),
        CursorKind::UnaryOperator => {
            let operand = fold_constant(ast, *node.children.last()?)?;
            match node.op? {
                Operator::Unary(UnaryOp::Minus) => Some(operand.wrapping_neg()),
                Operator::Unary(UnaryOp::Plus) => Some(operand),
                Operator::Unary(UnaryOp::Not) => Some(!operand),
                Operator::Unary(UnaryOp::LNot) => Some(i64::from(operand == 0)),
                _ => None,
            }
        }
        CursorKind::BinaryOperator => {
            let lhs = fold_constant(ast, *node.children.first()?)?;
            let rhs = fold_constant(ast, *node.children.get(1)?)?;
            let Some(Operator::Binary(op)) = node.op else {
                return None;
            };
            crate::hir::eval::fold_binary(op, lhs, rhs)
        }
        _ => None,
    }
}

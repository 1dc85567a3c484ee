//! Declarations: specifiers, init-declarator lists, records, enums,
//! namespaces, linkage specifications and Objective-C containers.

use smol_str::SmolStr;

use super::declarators::{Declarator, build_type, parse_declarator, parse_type_name};
use super::expressions::{
    parse_assignment_expression, parse_conditional_expression, parse_initializer,
};
use super::statements::parse_compound_statement;
use super::{DeclContext, PendingRef, QualifiedName, emit_refs, parse_qualified_name};
use crate::base::SourceLocation;
use crate::parser::parser::Parser;
use crate::parser::syntax_kind::SyntaxKind;
use crate::syntax::{
    CursorKind, NodeFlags, NodeId, Qualifiers, StorageClass, TagKind, Type, TypeKind,
};

// ============================================================================
// Declaration specifiers
// ============================================================================

/// Builtin type keywords seen in one specifier sequence.
#[derive(Debug, Clone, Copy, Default)]
struct BuiltinSpec {
    void: bool,
    bool_: bool,
    char_: bool,
    short: bool,
    int: bool,
    float: bool,
    double: bool,
    signed: bool,
    unsigned: bool,
    long: u8,
}

impl BuiltinSpec {
    fn any(&self) -> bool {
        self.void
            || self.bool_
            || self.char_
            || self.short
            || self.int
            || self.float
            || self.double
            || self.signed
            || self.unsigned
            || self.long > 0
    }

    fn kind(&self) -> Option<TypeKind> {
        if !self.any() {
            return None;
        }
        let kind = if self.void {
            TypeKind::Void
        } else if self.bool_ {
            TypeKind::Bool
        } else if self.char_ {
            if self.unsigned {
                TypeKind::UChar
            } else if self.signed {
                TypeKind::SChar
            } else {
                TypeKind::CharS
            }
        } else if self.float {
            TypeKind::Float
        } else if self.double {
            if self.long > 0 {
                TypeKind::LongDouble
            } else {
                TypeKind::Double
            }
        } else if self.short {
            if self.unsigned { TypeKind::UShort } else { TypeKind::Short }
        } else {
            match (self.long, self.unsigned) {
                (0, false) => TypeKind::Int,
                (0, true) => TypeKind::UInt,
                (1, false) => TypeKind::Long,
                (1, true) => TypeKind::ULong,
                (_, false) => TypeKind::LongLong,
                (_, true) => TypeKind::ULongLong,
            }
        };
        Some(kind)
    }
}

/// The specifier part of a declaration: storage, qualifiers, base type.
#[derive(Debug, Clone)]
pub(crate) struct DeclSpec {
    pub(crate) start: SourceLocation,
    pub(crate) storage: StorageClass,
    pub(crate) flags: NodeFlags,
    pub(crate) quals: Qualifiers,
    base: Option<TypeKind>,
    builtin: BuiltinSpec,
    pub(crate) refs: Vec<PendingRef>,
    /// Record or enum declared by the specifier itself.
    pub(crate) tag_decl: Option<NodeId>,
    pub(crate) consumed: bool,
}

impl DeclSpec {
    fn new(start: SourceLocation) -> Self {
        Self {
            start,
            storage: StorageClass::None,
            flags: NodeFlags::empty(),
            quals: Qualifiers::empty(),
            base: None,
            builtin: BuiltinSpec::default(),
            refs: Vec::new(),
            tag_decl: None,
            consumed: false,
        }
    }

    pub(crate) fn has_type(&self) -> bool {
        self.base.is_some() || self.builtin.any()
    }

    /// The specified type; implicit `int` when no type was written.
    pub(crate) fn base_type(&self) -> Type {
        let kind = self
            .base
            .clone()
            .or_else(|| self.builtin.kind())
            .unwrap_or(TypeKind::Int);
        Type::new(kind).with_quals(self.quals)
    }
}

pub(crate) fn parse_decl_specifiers(p: &mut Parser<'_>, parent: NodeId, ctx: DeclContext) -> DeclSpec {
    let mut spec = DeclSpec::new(p.loc());
    loop {
        p.skip_attributes();
        let kind = p.current_kind();
        match kind {
            SyntaxKind::TYPEDEF_KW => spec.flags |= NodeFlags::TYPEDEF_SPEC,
            SyntaxKind::EXTERN_KW => spec.storage = StorageClass::Extern,
            SyntaxKind::STATIC_KW => spec.storage = StorageClass::Static,
            SyntaxKind::REGISTER_KW => spec.storage = StorageClass::Register,
            SyntaxKind::AUTO_KW if p.lang.cplusplus11() => {
                if spec.has_type() {
                    break;
                }
                spec.base = Some(TypeKind::Auto);
            }
            SyntaxKind::AUTO_KW => spec.storage = StorageClass::Auto,
            SyntaxKind::INLINE_KW => spec.flags |= NodeFlags::INLINE,
            SyntaxKind::CONSTEXPR_KW => {
                spec.flags |= NodeFlags::CONSTEXPR;
                spec.quals |= Qualifiers::CONST;
            }
            SyntaxKind::THREAD_LOCAL_KW
            | SyntaxKind::MUTABLE_KW
            | SyntaxKind::EXPLICIT_KW
            | SyntaxKind::VIRTUAL_KW
            | SyntaxKind::FRIEND_KW => {}
            SyntaxKind::CONST_KW => spec.quals |= Qualifiers::CONST,
            SyntaxKind::VOLATILE_KW => spec.quals |= Qualifiers::VOLATILE,
            SyntaxKind::RESTRICT_KW => spec.quals |= Qualifiers::RESTRICT,
            SyntaxKind::VOID_KW => spec.builtin.void = true,
            SyntaxKind::BOOL_KW => spec.builtin.bool_ = true,
            SyntaxKind::CHAR_KW => spec.builtin.char_ = true,
            SyntaxKind::SHORT_KW => spec.builtin.short = true,
            SyntaxKind::INT_KW => spec.builtin.int = true,
            SyntaxKind::LONG_KW => spec.builtin.long = spec.builtin.long.saturating_add(1),
            SyntaxKind::FLOAT_KW => spec.builtin.float = true,
            SyntaxKind::DOUBLE_KW => spec.builtin.double = true,
            SyntaxKind::SIGNED_KW => spec.builtin.signed = true,
            SyntaxKind::UNSIGNED_KW => spec.builtin.unsigned = true,
            SyntaxKind::STRUCT_KW | SyntaxKind::CLASS_KW | SyntaxKind::UNION_KW | SyntaxKind::ENUM_KW
                if !spec.has_type() =>
            {
                parse_tag_specifier(p, parent, ctx, &mut spec);
                continue;
            }
            SyntaxKind::TYPENAME_KW => {}
            SyntaxKind::IDENT | SyntaxKind::COLON_COLON
                if !spec.has_type() && ident_is_type_specifier(p, ctx) =>
            {
                parse_named_type(p, &mut spec);
                continue;
            }
            _ => break,
        }
        p.bump();
        spec.consumed = true;
    }
    spec
}

/// Length in tokens of the qualified name at `n`, or 0.
fn qualified_name_len(p: &Parser<'_>, n: usize) -> usize {
    let mut idx = n;
    if p.nth(idx) == SyntaxKind::COLON_COLON {
        idx += 1;
    }
    loop {
        if p.nth(idx) != SyntaxKind::IDENT {
            return 0;
        }
        idx += 1;
        if p.nth(idx) == SyntaxKind::COLON_COLON && p.nth(idx + 1) == SyntaxKind::IDENT {
            idx += 1;
            continue;
        }
        return idx - n;
    }
}

/// In a position where a declaration is expected and no type has been
/// seen yet: does the identifier name the type?
fn ident_is_type_specifier(p: &Parser<'_>, ctx: DeclContext) -> bool {
    let len = qualified_name_len(p, 0);
    if len == 0 {
        return false;
    }
    let last = p.nth_text(len - 1);
    let next = p.nth(len);
    let qualified = len > 1;

    if next == SyntaxKind::L_PAREN {
        // Constructors: `Foo(` inside `Foo`, `Foo::Foo(` out of line.
        let in_own_record = ctx == DeclContext::Record
            && p.records.last().is_some_and(|record| record == last);
        let out_of_line = qualified && len >= 3 && p.nth_text(len - 3) == last;
        if in_own_record || out_of_line {
            return false;
        }
    }
    if p.is_type_name(last) || ctx == DeclContext::Param {
        return true;
    }
    match next {
        SyntaxKind::IDENT | SyntaxKind::TILDE | SyntaxKind::OPERATOR_KW => true,
        SyntaxKind::COLON_COLON => true,
        SyntaxKind::STAR | SyntaxKind::AMP | SyntaxKind::AMP_AMP => ctx != DeclContext::Block,
        SyntaxKind::LT => p.cplusplus(),
        _ => false,
    }
}

/// `name`, `ns::name`, `::name`, optionally followed by template arguments.
fn parse_named_type(p: &mut Parser<'_>, spec: &mut DeclSpec) {
    let Some(name) = parse_qualified_name(p) else {
        return;
    };
    spec.consumed = true;
    if !name.is_qualified() && name.last().text == "id" && p.lang.objc() {
        spec.base = Some(TypeKind::ObjCId);
        skip_protocol_qualifiers(p);
        return;
    }
    spec.refs.extend(name.qualifier_refs());
    let last = name.last();
    spec.refs.push(PendingRef {
        name: last.text.clone(),
        written: name.written(),
        start: last.start,
        end: last.end,
        tag: None,
    });
    spec.base = Some(TypeKind::Unresolved {
        name: name.written(),
        tag: None,
    });
    if p.at(SyntaxKind::LT) && p.cplusplus() {
        skip_angle_brackets(p);
    } else if p.lang.objc() {
        skip_protocol_qualifiers(p);
    }
}

/// `id<Protocol>` and `NSArray<NSString *>`.
fn skip_protocol_qualifiers(p: &mut Parser<'_>) {
    if p.at(SyntaxKind::LT) {
        skip_angle_brackets(p);
    }
}

/// Skip `<...>`, counting `>>` as two closers.
pub(crate) fn skip_angle_brackets(p: &mut Parser<'_>) {
    let mut depth = 0i32;
    while let Some(token) = p.bump() {
        match token.kind {
            SyntaxKind::LT => depth += 1,
            SyntaxKind::GT => depth -= 1,
            SyntaxKind::GT_GT => depth -= 2,
            SyntaxKind::SEMICOLON | SyntaxKind::L_BRACE => {
                // Not a template argument list after all.
                return;
            }
            _ => {}
        }
        if depth <= 0 {
            return;
        }
    }
}

fn tag_cursor_kind(tag: TagKind) -> CursorKind {
    match tag {
        TagKind::Struct => CursorKind::StructDecl,
        TagKind::Class => CursorKind::ClassDecl,
        TagKind::Union => CursorKind::UnionDecl,
        TagKind::Enum => CursorKind::EnumDecl,
    }
}

/// `struct S`, `struct S { ... }`, `enum class E : int { ... }`.
fn parse_tag_specifier(p: &mut Parser<'_>, parent: NodeId, ctx: DeclContext, spec: &mut DeclSpec) {
    let keyword_loc = p.loc();
    let tag = match p.current_kind() {
        SyntaxKind::STRUCT_KW => TagKind::Struct,
        SyntaxKind::CLASS_KW => TagKind::Class,
        SyntaxKind::UNION_KW => TagKind::Union,
        _ => TagKind::Enum,
    };
    p.bump();
    spec.consumed = true;
    let mut scoped = false;
    if tag == TagKind::Enum
        && p.cplusplus()
        && p.at_any(&[SyntaxKind::CLASS_KW, SyntaxKind::STRUCT_KW])
    {
        p.bump();
        scoped = true;
    }
    p.skip_attributes();
    let name = if p.at_any(&[SyntaxKind::IDENT, SyntaxKind::COLON_COLON]) {
        parse_qualified_name(p)
    } else {
        None
    };
    if tag == TagKind::Enum && p.at(SyntaxKind::COLON) && (p.cplusplus() || p.lang.c23()) {
        p.bump();
        let root = p.ast.root();
        parse_decl_specifiers(p, root, DeclContext::Param);
    }

    let is_definition =
        p.at(SyntaxKind::L_BRACE) || (tag != TagKind::Enum && p.at(SyntaxKind::COLON) && p.cplusplus());
    let is_forward = name.is_some()
        && p.at(SyntaxKind::SEMICOLON)
        && ctx != DeclContext::Param
        && !spec.flags.contains(NodeFlags::TYPEDEF_SPEC);

    if !is_definition && !is_forward {
        match name {
            Some(name) => {
                spec.refs.extend(name.qualifier_refs());
                let last = name.last();
                spec.refs.push(PendingRef {
                    name: last.text.clone(),
                    written: name.written(),
                    start: last.start,
                    end: last.end,
                    tag: Some(tag),
                });
                spec.base = Some(TypeKind::Unresolved {
                    name: name.written(),
                    tag: Some(tag),
                });
            }
            None => {
                p.error(
                    format!("declaration of anonymous {} must be a definition", tag.keyword()),
                    keyword_loc,
                );
                spec.base = Some(TypeKind::Invalid);
            }
        }
        return;
    }

    let (text, location) = match &name {
        Some(name) => (name.last().text.clone(), name.last().start),
        None => (SmolStr::default(), keyword_loc),
    };
    let id = p.node(tag_cursor_kind(tag), text.clone(), location, keyword_loc);
    if let Some(name) = &name {
        p.ast[id].written = name.written();
    }
    p.ast[id].ty = Type::new(match tag {
        TagKind::Enum => TypeKind::Enum {
            name: text.clone(),
            qualified: text.clone(),
            decl: Some(id),
        },
        _ => TypeKind::Record {
            tag,
            name: text.clone(),
            qualified: text.clone(),
            decl: Some(id),
        },
    });
    if scoped {
        p.ast[id].flags |= NodeFlags::SCOPED_ENUM;
    }
    if p.cplusplus() && !text.is_empty() {
        p.type_names.insert(text.clone());
    }
    if let Some(name) = &name {
        emit_refs(p, id, &name.qualifier_refs());
    }
    p.attach(parent, id);

    if is_definition {
        p.ast[id].flags |= NodeFlags::DEFINITION;
        if tag == TagKind::Enum {
            parse_enum_body(p, id);
        } else {
            if p.eat(SyntaxKind::COLON) {
                parse_base_clause(p, id);
            }
            p.records.push(text);
            parse_record_body(p, id);
            p.records.pop();
        }
        p.finish_node(id);
    }
    spec.tag_decl = Some(id);
    spec.base = Some(p.ast[id].ty.kind.clone());
}

/// `: public Base, virtual Other` as type references on the record.
fn parse_base_clause(p: &mut Parser<'_>, record: NodeId) {
    loop {
        while p.at_any(&[
            SyntaxKind::PUBLIC_KW,
            SyntaxKind::PRIVATE_KW,
            SyntaxKind::PROTECTED_KW,
            SyntaxKind::VIRTUAL_KW,
        ]) {
            p.bump();
        }
        let Some(name) = parse_qualified_name(p) else {
            p.error_expected("class name");
            break;
        };
        let mut refs = name.qualifier_refs();
        refs.push(type_ref(&name, None));
        emit_refs(p, record, &refs);
        if p.at(SyntaxKind::LT) {
            skip_angle_brackets(p);
        }
        if !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }
}

fn type_ref(name: &QualifiedName, tag: Option<TagKind>) -> PendingRef {
    let last = name.last();
    PendingRef {
        name: last.text.clone(),
        written: name.written(),
        start: last.start,
        end: last.end,
        tag,
    }
}

fn parse_record_body(p: &mut Parser<'_>, record: NodeId) {
    if !p.expect(SyntaxKind::L_BRACE) {
        return;
    }
    while !p.at(SyntaxKind::R_BRACE) && !p.at_eof() {
        let before = p.position();
        match p.current_kind() {
            SyntaxKind::PUBLIC_KW | SyntaxKind::PRIVATE_KW | SyntaxKind::PROTECTED_KW
                if p.nth(1) == SyntaxKind::COLON =>
            {
                let start = p.loc();
                p.bump();
                p.bump();
                let id = p.node(CursorKind::CXXAccessSpecifier, "", start, start);
                p.attach(record, id);
            }
            SyntaxKind::SEMICOLON => {
                p.bump();
            }
            SyntaxKind::USING_KW => parse_using(p, record),
            SyntaxKind::STATIC_ASSERT_KW => parse_static_assert(p, record),
            SyntaxKind::TEMPLATE_KW => {
                parse_template_header(p);
            }
            _ => parse_declaration(p, record, DeclContext::Record),
        }
        if p.position() == before {
            p.bump();
        }
    }
    p.expect(SyntaxKind::R_BRACE);
}

fn parse_enum_body(p: &mut Parser<'_>, decl: NodeId) {
    if !p.expect(SyntaxKind::L_BRACE) {
        return;
    }
    while !p.at(SyntaxKind::R_BRACE) && !p.at_eof() {
        if !p.at(SyntaxKind::IDENT) {
            p.error_expected("identifier");
            while !p.at_eof() && !p.at_any(&[SyntaxKind::COMMA, SyntaxKind::R_BRACE]) {
                p.bump();
            }
            if p.eat(SyntaxKind::COMMA) {
                continue;
            }
            break;
        }
        let location = p.loc();
        let name = SmolStr::new(p.current_text());
        p.bump();
        p.skip_attributes();
        let id = p.node(CursorKind::EnumConstantDecl, name, location, location);
        p.attach(decl, id);
        if p.eat(SyntaxKind::EQ) {
            let value = parse_assignment_expression(p);
            p.attach_opt(id, value);
            p.ast[id].flags |= NodeFlags::HAS_INIT;
        }
        p.finish_node(id);
        if !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }
    p.expect(SyntaxKind::R_BRACE);
}

// ============================================================================
// Declarations
// ============================================================================

impl Parser<'_> {
    pub(crate) fn parse_translation_unit(&mut self) {
        let root = self.ast.root();
        while !self.at_eof() {
            let before = self.position();
            parse_external_declaration(self, root);
            if self.position() == before {
                self.bump();
            }
        }
    }
}

/// A declaration at file or namespace scope.
pub(crate) fn parse_external_declaration(p: &mut Parser<'_>, parent: NodeId) {
    match p.current_kind() {
        SyntaxKind::SEMICOLON => {
            p.bump();
        }
        SyntaxKind::R_BRACE => {
            p.error("extraneous closing brace ('}')", p.loc());
            p.bump();
        }
        SyntaxKind::NAMESPACE_KW => parse_namespace(p, parent),
        SyntaxKind::INLINE_KW if p.nth(1) == SyntaxKind::NAMESPACE_KW => {
            p.bump();
            parse_namespace(p, parent);
        }
        SyntaxKind::USING_KW => parse_using(p, parent),
        SyntaxKind::EXTERN_KW if p.nth(1) == SyntaxKind::STRING => parse_linkage_spec(p, parent),
        SyntaxKind::TEMPLATE_KW => {
            parse_template_header(p);
            parse_external_declaration(p, parent);
        }
        SyntaxKind::STATIC_ASSERT_KW => parse_static_assert(p, parent),
        SyntaxKind::AT if p.lang.objc() => parse_objc_container(p, parent),
        _ => parse_declaration(p, parent, DeclContext::File),
    }
}

/// A simple declaration ending in `;`, or a function definition.
pub(crate) fn parse_declaration(p: &mut Parser<'_>, parent: NodeId, ctx: DeclContext) {
    if parse_init_declarators(p, parent, ctx) == Terminator::Semicolon && !p.eat(SyntaxKind::SEMICOLON) {
        let what = match ctx {
            DeclContext::File => "';' after top level declarator",
            DeclContext::Record => "';' at end of declaration list",
            _ => "';' at end of declaration",
        };
        p.error_expected(what);
        if !starts_declaration(p) {
            p.recover();
        }
    }
}

/// What must follow a parsed declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Terminator {
    Semicolon,
    /// A function body or error recovery already ended it.
    None,
}

/// Specifiers followed by a comma-separated declarator list, without the
/// terminating `;`.
pub(crate) fn parse_init_declarators(p: &mut Parser<'_>, parent: NodeId, ctx: DeclContext) -> Terminator {
    let spec = parse_decl_specifiers(p, parent, ctx);
    if p.at(SyntaxKind::SEMICOLON) && spec.consumed {
        if spec.tag_decl.is_none() && !matches!(spec.base, Some(TypeKind::Unresolved { tag: Some(_), .. })) {
            p.warning("declaration does not declare anything", spec.start);
        }
        return Terminator::Semicolon;
    }

    let mut first = true;
    loop {
        let declarator = parse_declarator(p, false);
        let Some(name) = declarator.name.clone() else {
            if spec.consumed {
                p.error_expected("identifier or '('");
            } else {
                p.error("expected unqualified-id", p.loc());
            }
            p.recover();
            return Terminator::None;
        };
        let id = make_declaration(p, parent, &spec, name, &declarator, ctx);
        let kind = p.ast[id].kind;

        if kind.is_function() && first && at_function_body(p) {
            parse_function_body(p, id);
            return Terminator::None;
        }
        parse_declarator_tail(p, id, ctx);
        p.finish_node(id);
        first = false;
        if !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }
    Terminator::Semicolon
}

fn at_function_body(p: &Parser<'_>) -> bool {
    p.at(SyntaxKind::L_BRACE) || (p.cplusplus() && p.at(SyntaxKind::COLON))
}

/// Initializer, bit-field width or `= 0` / `= default` after a declarator.
fn parse_declarator_tail(p: &mut Parser<'_>, id: NodeId, ctx: DeclContext) {
    let kind = p.ast[id].kind;
    if kind.is_function() {
        if p.at(SyntaxKind::EQ)
            && matches!(
                p.nth(1),
                SyntaxKind::INT_NUMBER | SyntaxKind::DEFAULT_KW | SyntaxKind::DELETE_KW
            )
        {
            p.bump();
            p.bump();
        }
        return;
    }
    if ctx == DeclContext::Record && p.at(SyntaxKind::COLON) {
        p.bump();
        let width = parse_conditional_expression(p);
        p.attach_opt(id, width);
    }
    let init = if p.eat(SyntaxKind::EQ) {
        parse_initializer(p)
    } else if p.cplusplus() && p.at(SyntaxKind::L_BRACE) {
        parse_initializer(p)
    } else {
        None
    };
    if let Some(init) = init {
        p.attach(id, init);
        p.ast[id].flags |= NodeFlags::HAS_INIT;
        if kind == CursorKind::VarDecl {
            p.ast[id].flags |= NodeFlags::DEFINITION;
        }
    }
}

/// Turn a parsed declarator into a declaration node under `parent`.
fn make_declaration(
    p: &mut Parser<'_>,
    parent: NodeId,
    spec: &DeclSpec,
    name: QualifiedName,
    declarator: &Declarator,
    ctx: DeclContext,
) -> NodeId {
    let last = name.last().clone();
    let ty = build_type(spec.base_type(), &declarator.ops, &p.ast);
    let typedef = spec.flags.contains(NodeFlags::TYPEDEF_SPEC);

    let kind = if typedef {
        CursorKind::TypedefDecl
    } else if declarator.is_function() {
        let owner = if name.is_qualified() {
            name.qualifiers().last().map(|q| q.text.clone())
        } else if ctx == DeclContext::Record {
            p.records.last().cloned()
        } else {
            None
        };
        if last.text.starts_with('~') && owner.is_some() {
            CursorKind::Destructor
        } else if owner.as_ref() == Some(&last.text) {
            CursorKind::Constructor
        } else if ctx == DeclContext::Record {
            CursorKind::CXXMethod
        } else {
            CursorKind::FunctionDecl
        }
    } else if ctx == DeclContext::Record && spec.storage != StorageClass::Static {
        CursorKind::FieldDecl
    } else {
        CursorKind::VarDecl
    };

    if !spec.has_type() && !matches!(kind, CursorKind::Constructor | CursorKind::Destructor) {
        if p.cplusplus() {
            p.error("a type specifier is required for all declarations", spec.start);
        } else {
            p.warning("type specifier missing, defaults to 'int'", spec.start);
        }
    }

    let ty = match kind {
        CursorKind::Constructor | CursorKind::Destructor => {
            build_type(Type::new(TypeKind::Void), &declarator.ops, &p.ast)
        }
        _ => ty,
    };
    let start = if spec.consumed { spec.start } else { name.segments[0].start };
    let id = p.node(kind, last.text.clone(), last.start, start);
    {
        let node = &mut p.ast[id];
        node.written = name.written();
        node.ty = ty;
        node.storage = spec.storage;
        node.flags = spec.flags & !NodeFlags::TYPEDEF_SPEC;
        if name.global {
            node.flags |= NodeFlags::GLOBAL_QUALIFIER;
        }
    }
    if kind == CursorKind::VarDecl
        && spec.storage != StorageClass::Extern
        && ctx != DeclContext::File
    {
        p.ast[id].flags |= NodeFlags::DEFINITION;
    }
    if typedef {
        p.type_names.insert(last.text.clone());
    }

    emit_refs(p, id, &spec.refs);
    emit_refs(p, id, &name.qualifier_refs());
    for expr in &declarator.size_exprs {
        p.attach(id, *expr);
    }
    for param in declarator.params().to_vec() {
        p.attach(id, param);
    }
    p.attach(parent, id);
    id
}

fn parse_function_body(p: &mut Parser<'_>, id: NodeId) {
    if p.eat(SyntaxKind::COLON) {
        parse_member_initializers(p, id);
    }
    if !p.at(SyntaxKind::L_BRACE) {
        p.error_expected("function body");
        p.recover();
        return;
    }
    p.ast[id].flags |= NodeFlags::DEFINITION;
    if p.options.skip_function_bodies {
        p.skip_balanced();
    } else {
        parse_compound_statement(p, id);
    }
    p.finish_node(id);
}

/// `: member(args), Base{args}` of a constructor definition.
fn parse_member_initializers(p: &mut Parser<'_>, ctor: NodeId) {
    loop {
        let Some(name) = parse_qualified_name(p) else {
            p.error_expected("class member or base class name");
            return;
        };
        let last = name.last().clone();
        let member = p.node(CursorKind::MemberRef, last.text.clone(), last.start, last.start);
        p.ast[member].written = name.written();
        p.attach(ctor, member);
        match p.current_kind() {
            SyntaxKind::L_PAREN => {
                p.bump();
                while !p.at(SyntaxKind::R_PAREN) && !p.at_eof() {
                    let arg = parse_assignment_expression(p);
                    if arg.is_none() {
                        p.recover();
                        return;
                    }
                    p.attach_opt(ctor, arg);
                    if !p.eat(SyntaxKind::COMMA) {
                        break;
                    }
                }
                p.expect(SyntaxKind::R_PAREN);
            }
            SyntaxKind::L_BRACE => {
                let init = parse_initializer(p);
                p.attach_opt(ctor, init);
            }
            _ => {
                p.error_expected("'(' or '{'");
                return;
            }
        }
        if !p.eat(SyntaxKind::COMMA) {
            return;
        }
    }
}

// ============================================================================
// Namespaces, using, linkage, templates
// ============================================================================

fn parse_namespace(p: &mut Parser<'_>, parent: NodeId) {
    let start = p.loc();
    p.bump();
    p.skip_attributes();
    let name = if p.at(SyntaxKind::IDENT) { parse_qualified_name(p) } else { None };

    if p.eat(SyntaxKind::EQ) {
        // Namespace alias; no cursor.
        parse_qualified_name(p);
        p.expect(SyntaxKind::SEMICOLON);
        return;
    }

    let mut opened = Vec::new();
    let mut current = parent;
    match &name {
        Some(name) => {
            for segment in &name.segments {
                let id = p.node(CursorKind::Namespace, segment.text.clone(), segment.start, start);
                p.ast[id].flags |= NodeFlags::DEFINITION;
                p.attach(current, id);
                opened.push(id);
                current = id;
            }
        }
        None => {
            let id = p.node(CursorKind::Namespace, "", start, start);
            p.ast[id].flags |= NodeFlags::DEFINITION;
            p.attach(current, id);
            opened.push(id);
            current = id;
        }
    }
    if !p.expect(SyntaxKind::L_BRACE) {
        p.recover();
        return;
    }
    while !p.at(SyntaxKind::R_BRACE) && !p.at_eof() {
        let before = p.position();
        parse_external_declaration(p, current);
        if p.position() == before {
            p.bump();
        }
    }
    p.expect(SyntaxKind::R_BRACE);
    for id in opened.into_iter().rev() {
        p.finish_node(id);
    }
}

/// `using namespace X;`, `using ns::name;` and `using T = type;`.
pub(crate) fn parse_using(p: &mut Parser<'_>, parent: NodeId) {
    let start = p.loc();
    p.bump();
    if p.eat(SyntaxKind::NAMESPACE_KW) {
        let Some(name) = parse_qualified_name(p) else {
            p.error_expected("namespace name");
            p.recover();
            return;
        };
        let last = name.last().clone();
        let id = p.node(CursorKind::UsingDirective, last.text.clone(), last.start, start);
        p.ast[id].written = name.written();
        let mut refs = name.qualifier_refs();
        refs.push(type_ref(&name, None));
        emit_refs(p, id, &refs);
        p.attach(parent, id);
        p.expect(SyntaxKind::SEMICOLON);
        p.finish_node(id);
        return;
    }

    if p.at(SyntaxKind::IDENT) && p.nth(1) == SyntaxKind::EQ {
        let location = p.loc();
        let name = SmolStr::new(p.current_text());
        p.bump();
        p.bump();
        let (ty, refs) = parse_type_name(p);
        let id = p.node(CursorKind::TypedefDecl, name.clone(), location, start);
        p.ast[id].ty = ty;
        emit_refs(p, id, &refs);
        p.attach(parent, id);
        p.type_names.insert(name);
        p.expect(SyntaxKind::SEMICOLON);
        p.finish_node(id);
        return;
    }

    p.eat(SyntaxKind::TYPENAME_KW);
    let Some(name) = parse_qualified_name(p) else {
        p.error_expected("unqualified-id");
        p.recover();
        return;
    };
    let last = name.last().clone();
    let id = p.node(CursorKind::UsingDeclaration, last.text.clone(), last.start, start);
    p.ast[id].written = name.written();
    emit_refs(p, id, &name.qualifier_refs());
    let target = p.node(CursorKind::OverloadedDeclRef, last.text.clone(), last.start, last.start);
    p.ast[target].written = name.written();
    p.attach(id, target);
    p.attach(parent, id);
    p.expect(SyntaxKind::SEMICOLON);
    p.finish_node(id);
}

/// `extern "C" { ... }` and `extern "C" declaration`.
fn parse_linkage_spec(p: &mut Parser<'_>, parent: NodeId) {
    let start = p.loc();
    p.bump();
    p.bump();
    let id = p.node(CursorKind::LinkageSpec, "", start, start);
    p.attach(parent, id);
    if p.eat(SyntaxKind::L_BRACE) {
        while !p.at(SyntaxKind::R_BRACE) && !p.at_eof() {
            let before = p.position();
            parse_external_declaration(p, id);
            if p.position() == before {
                p.bump();
            }
        }
        p.expect(SyntaxKind::R_BRACE);
    } else {
        parse_external_declaration(p, id);
    }
    p.finish_node(id);
}

/// `template <typename T, int N>`; parameter names become type names.
pub(crate) fn parse_template_header(p: &mut Parser<'_>) {
    p.bump();
    if !p.at(SyntaxKind::LT) {
        return;
    }
    let mut depth = 0i32;
    while let Some(token) = p.bump() {
        match token.kind {
            SyntaxKind::LT => depth += 1,
            SyntaxKind::GT => depth -= 1,
            SyntaxKind::GT_GT => depth -= 2,
            SyntaxKind::TYPENAME_KW | SyntaxKind::CLASS_KW if p.at(SyntaxKind::IDENT) => {
                p.type_names.insert(SmolStr::new(p.current_text()));
            }
            _ => {}
        }
        if depth <= 0 {
            return;
        }
    }
}

pub(crate) fn parse_static_assert(p: &mut Parser<'_>, parent: NodeId) {
    let start = p.loc();
    p.bump();
    let id = p.node(CursorKind::StaticAssert, "", start, start);
    p.attach(parent, id);
    if p.expect(SyntaxKind::L_PAREN) {
        let cond = parse_assignment_expression(p);
        p.attach_opt(id, cond);
        if p.eat(SyntaxKind::COMMA) {
            let message = parse_assignment_expression(p);
            p.attach_opt(id, message);
        }
        p.expect(SyntaxKind::R_PAREN);
    }
    p.expect(SyntaxKind::SEMICOLON);
    p.finish_node(id);
}

// ============================================================================
// Objective-C
// ============================================================================

/// `@class`, `@interface ... @end`, `@implementation ... @end`,
/// `@protocol ... @end` and `@import`. Container bodies are not modelled.
fn parse_objc_container(p: &mut Parser<'_>, parent: NodeId) {
    let start = p.loc();
    p.bump();
    let directive = p.current_text();
    match directive {
        "class" => {
            p.bump();
            while p.at(SyntaxKind::IDENT) {
                let location = p.loc();
                let name = SmolStr::new(p.current_text());
                p.bump();
                let id = p.node(CursorKind::ObjCInterfaceDecl, name.clone(), location, start);
                p.ast[id].flags |= NodeFlags::FORWARD;
                p.attach(parent, id);
                p.type_names.insert(name);
                if p.at(SyntaxKind::LT) {
                    skip_angle_brackets(p);
                }
                if !p.eat(SyntaxKind::COMMA) {
                    break;
                }
            }
            p.expect(SyntaxKind::SEMICOLON);
        }
        "interface" | "implementation" | "protocol" => {
            p.bump();
            let (name, location) = if p.at(SyntaxKind::IDENT) {
                let name = SmolStr::new(p.current_text());
                let location = p.loc();
                p.bump();
                (name, location)
            } else {
                p.error_expected("identifier");
                (SmolStr::default(), start)
            };
            if directive == "protocol" && p.at_any(&[SyntaxKind::SEMICOLON, SyntaxKind::COMMA]) {
                p.recover();
                return;
            }
            skip_to_objc_end(p);
            if directive == "protocol" {
                return;
            }
            let kind = if directive == "interface" {
                CursorKind::ObjCInterfaceDecl
            } else {
                CursorKind::ObjCImplementationDecl
            };
            let id = p.node(kind, name.clone(), location, start);
            p.ast[id].flags |= NodeFlags::DEFINITION;
            p.attach(parent, id);
            p.type_names.insert(name);
        }
        "import" => {
            while !p.at_eof() && !p.eat(SyntaxKind::SEMICOLON) {
                p.bump();
            }
        }
        _ => {
            p.error("expected an Objective-C directive after '@'", start);
            p.recover();
        }
    }
}

fn skip_to_objc_end(p: &mut Parser<'_>) {
    while !p.at_eof() {
        if p.at(SyntaxKind::AT) && p.nth(1) == SyntaxKind::IDENT && p.nth_text(1) == "end" {
            p.bump();
            p.bump();
            return;
        }
        p.bump();
    }
    p.error_expected("'@end'");
}

// ============================================================================
// Statement-level disambiguation
// ============================================================================

/// Whether a statement starting at the current token is a declaration.
pub(crate) fn starts_declaration(p: &Parser<'_>) -> bool {
    match p.current_kind() {
        SyntaxKind::TYPEDEF_KW
        | SyntaxKind::EXTERN_KW
        | SyntaxKind::STATIC_KW
        | SyntaxKind::REGISTER_KW
        | SyntaxKind::AUTO_KW
        | SyntaxKind::INLINE_KW
        | SyntaxKind::CONSTEXPR_KW
        | SyntaxKind::THREAD_LOCAL_KW
        | SyntaxKind::CONST_KW
        | SyntaxKind::VOLATILE_KW
        | SyntaxKind::RESTRICT_KW
        | SyntaxKind::VOID_KW
        | SyntaxKind::BOOL_KW
        | SyntaxKind::CHAR_KW
        | SyntaxKind::SHORT_KW
        | SyntaxKind::INT_KW
        | SyntaxKind::LONG_KW
        | SyntaxKind::FLOAT_KW
        | SyntaxKind::DOUBLE_KW
        | SyntaxKind::SIGNED_KW
        | SyntaxKind::UNSIGNED_KW
        | SyntaxKind::STRUCT_KW
        | SyntaxKind::CLASS_KW
        | SyntaxKind::UNION_KW
        | SyntaxKind::ENUM_KW
        | SyntaxKind::TYPENAME_KW => true,
        SyntaxKind::IDENT | SyntaxKind::COLON_COLON => {
            let len = qualified_name_len(p, 0);
            if len == 0 {
                return false;
            }
            let next = p.nth(len);
            if next == SyntaxKind::IDENT {
                return true;
            }
            if !p.is_type_name(p.nth_text(len - 1)) {
                return false;
            }
            match next {
                SyntaxKind::STAR | SyntaxKind::AMP | SyntaxKind::AMP_AMP => true,
                SyntaxKind::LT => p.cplusplus(),
                SyntaxKind::L_PAREN => p.nth(len + 1) == SyntaxKind::STAR,
                _ => false,
            }
        }
        _ => false,
    }
}

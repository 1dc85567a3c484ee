//! Types of declarations and expressions.
//!
//! ```text
//! Type { kind, quals }
//!   kind: builtin | Pointer(T) | LValueReference(T) | RValueReference(T)
//!       | ConstantArray | IncompleteArray | FunctionProto | FunctionNoProto
//!       | Record | Enum | Typedef | ObjCObjectPointer
//!       | Unresolved (parser output, replaced during semantic analysis)
//! ```

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::ast::NodeId;
use super::printing::{PrintingPolicy, PrintingPolicyProperty};

bitflags! {
    /// cv-qualifiers plus `restrict`, applied to one type layer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Qualifiers: u8 {
        const CONST = 1 << 0;
        const VOLATILE = 1 << 1;
        const RESTRICT = 1 << 2;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagKind {
    Struct,
    Class,
    Union,
    Enum,
}

impl TagKind {
    pub fn keyword(self) -> &'static str {
        match self {
            TagKind::Struct => "struct",
            TagKind::Class => "class",
            TagKind::Union => "union",
            TagKind::Enum => "enum",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    Invalid,
    Void,
    Bool,
    CharS,
    SChar,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    LongLong,
    ULongLong,
    Float,
    Double,
    LongDouble,
    NullPtr,
    ObjCId,
    Auto,
    Pointer(Box<Type>),
    LValueReference(Box<Type>),
    RValueReference(Box<Type>),
    ConstantArray {
        element: Box<Type>,
        size: u64,
    },
    IncompleteArray(Box<Type>),
    FunctionProto {
        result: Box<Type>,
        params: Vec<Type>,
        variadic: bool,
    },
    FunctionNoProto {
        result: Box<Type>,
    },
    Record {
        tag: TagKind,
        name: SmolStr,
        qualified: SmolStr,
        decl: Option<NodeId>,
    },
    Enum {
        name: SmolStr,
        qualified: SmolStr,
        decl: Option<NodeId>,
    },
    Typedef {
        name: SmolStr,
        decl: Option<NodeId>,
        underlying: Box<Type>,
    },
    ObjCObjectPointer {
        class: SmolStr,
    },
    /// A name written in a declaration, not yet looked up.
    Unresolved {
        name: SmolStr,
        tag: Option<TagKind>,
    },
}

impl TypeKind {
    pub fn spelling(&self) -> &'static str {
        match self {
            TypeKind::Invalid => "Invalid",
            TypeKind::Void => "Void",
            TypeKind::Bool => "Bool",
            TypeKind::CharS => "Char_S",
            TypeKind::SChar => "SChar",
            TypeKind::UChar => "UChar",
            TypeKind::Short => "Short",
            TypeKind::UShort => "UShort",
            TypeKind::Int => "Int",
            TypeKind::UInt => "UInt",
            TypeKind::Long => "Long",
            TypeKind::ULong => "ULong",
            TypeKind::LongLong => "LongLong",
            TypeKind::ULongLong => "ULongLong",
            TypeKind::Float => "Float",
            TypeKind::Double => "Double",
            TypeKind::LongDouble => "LongDouble",
            TypeKind::NullPtr => "NullPtr",
            TypeKind::ObjCId => "ObjCId",
            TypeKind::Auto => "Auto",
            TypeKind::Pointer(_) => "Pointer",
            TypeKind::LValueReference(_) => "LValueReference",
            TypeKind::RValueReference(_) => "RValueReference",
            TypeKind::ConstantArray { .. } => "ConstantArray",
            TypeKind::IncompleteArray(_) => "IncompleteArray",
            TypeKind::FunctionProto { .. } => "FunctionProto",
            TypeKind::FunctionNoProto { .. } => "FunctionNoProto",
            TypeKind::Record { .. } => "Record",
            TypeKind::Enum { .. } => "Enum",
            TypeKind::Typedef { .. } => "Typedef",
            TypeKind::ObjCObjectPointer { .. } => "ObjCObjectPointer",
            TypeKind::Unresolved { .. } => "Unexposed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Type {
    pub kind: TypeKind,
    pub quals: Qualifiers,
}

impl Default for Type {
    fn default() -> Self {
        Self::invalid()
    }
}

impl From<TypeKind> for Type {
    fn from(kind: TypeKind) -> Self {
        Type::new(kind)
    }
}

impl Type {
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            quals: Qualifiers::empty(),
        }
    }

    pub fn invalid() -> Self {
        Self::new(TypeKind::Invalid)
    }

    pub fn with_quals(mut self, quals: Qualifiers) -> Self {
        self.quals |= quals;
        self
    }

    pub fn pointer_to(self) -> Self {
        Type::new(TypeKind::Pointer(Box::new(self)))
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self.kind, TypeKind::Invalid)
    }

    pub fn is_const_qualified(&self) -> bool {
        self.quals.contains(Qualifiers::CONST)
    }

    pub fn is_volatile_qualified(&self) -> bool {
        self.quals.contains(Qualifiers::VOLATILE)
    }

    pub fn is_restrict_qualified(&self) -> bool {
        self.quals.contains(Qualifiers::RESTRICT)
    }

    /// The same type without qualifiers on its outermost layer.
    pub fn unqualified(&self) -> Type {
        Type::new(self.kind.clone())
    }

    /// The referenced type for references, the type itself otherwise.
    pub fn non_reference(&self) -> Type {
        match &self.kind {
            TypeKind::LValueReference(inner) | TypeKind::RValueReference(inner) => {
                (**inner).clone()
            }
            _ => self.clone(),
        }
    }

    /// The type with every typedef layer looked through.
    pub fn canonical(&self) -> Type {
        let kind = match &self.kind {
            TypeKind::Typedef { underlying, .. } => {
                return underlying.canonical().with_quals(self.quals);
            }
            TypeKind::Pointer(inner) => TypeKind::Pointer(Box::new(inner.canonical())),
            TypeKind::LValueReference(inner) => {
                TypeKind::LValueReference(Box::new(inner.canonical()))
            }
            TypeKind::RValueReference(inner) => {
                TypeKind::RValueReference(Box::new(inner.canonical()))
            }
            TypeKind::ConstantArray { element, size } => TypeKind::ConstantArray {
                element: Box::new(element.canonical()),
                size: *size,
            },
            TypeKind::IncompleteArray(element) => {
                TypeKind::IncompleteArray(Box::new(element.canonical()))
            }
            TypeKind::FunctionProto {
                result,
                params,
                variadic,
            } => TypeKind::FunctionProto {
                result: Box::new(result.canonical()),
                params: params.iter().map(Type::canonical).collect(),
                variadic: *variadic,
            },
            TypeKind::FunctionNoProto { result } => TypeKind::FunctionNoProto {
                result: Box::new(result.canonical()),
            },
            other => other.clone(),
        };
        Type {
            kind,
            quals: self.quals,
        }
    }

    pub fn pointee(&self) -> Option<&Type> {
        match &self.kind {
            TypeKind::Pointer(inner)
            | TypeKind::LValueReference(inner)
            | TypeKind::RValueReference(inner) => Some(inner),
            TypeKind::Typedef { underlying, .. } => underlying.pointee(),
            _ => None,
        }
    }

    pub fn element_type(&self) -> Option<&Type> {
        match &self.kind {
            TypeKind::ConstantArray { element, .. } | TypeKind::IncompleteArray(element) => {
                Some(element)
            }
            TypeKind::Typedef { underlying, .. } => underlying.element_type(),
            _ => None,
        }
    }

    pub fn array_size(&self) -> Option<u64> {
        match &self.kind {
            TypeKind::ConstantArray { size, .. } => Some(*size),
            _ => None,
        }
    }

    pub fn result_type(&self) -> Option<&Type> {
        match &self.kind {
            TypeKind::FunctionProto { result, .. } | TypeKind::FunctionNoProto { result } => {
                Some(result)
            }
            _ => None,
        }
    }

    pub fn num_arg_types(&self) -> Option<usize> {
        match &self.kind {
            TypeKind::FunctionProto { params, .. } => Some(params.len()),
            TypeKind::FunctionNoProto { .. } => Some(0),
            _ => None,
        }
    }

    pub fn arg_type(&self, index: usize) -> Option<&Type> {
        match &self.kind {
            TypeKind::FunctionProto { params, .. } => params.get(index),
            _ => None,
        }
    }

    pub fn is_variadic(&self) -> bool {
        matches!(self.kind, TypeKind::FunctionProto { variadic: true, .. })
    }

    pub fn is_function(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::FunctionProto { .. } | TypeKind::FunctionNoProto { .. }
        )
    }

    /// Declaration node of a record, enum or typedef type.
    pub fn declaration(&self) -> Option<NodeId> {
        match &self.kind {
            TypeKind::Record { decl, .. }
            | TypeKind::Enum { decl, .. }
            | TypeKind::Typedef { decl, .. } => *decl,
            _ => None,
        }
    }

    pub fn is_integer(&self) -> bool {
        match &self.canonical().kind {
            TypeKind::Bool
            | TypeKind::CharS
            | TypeKind::SChar
            | TypeKind::UChar
            | TypeKind::Short
            | TypeKind::UShort
            | TypeKind::Int
            | TypeKind::UInt
            | TypeKind::Long
            | TypeKind::ULong
            | TypeKind::LongLong
            | TypeKind::ULongLong
            | TypeKind::Enum { .. } => true,
            _ => false,
        }
    }

    pub fn is_unsigned_integer(&self) -> bool {
        matches!(
            self.canonical().kind,
            TypeKind::Bool
                | TypeKind::UChar
                | TypeKind::UShort
                | TypeKind::UInt
                | TypeKind::ULong
                | TypeKind::ULongLong
        )
    }

    pub fn is_floating(&self) -> bool {
        matches!(
            self.canonical().kind,
            TypeKind::Float | TypeKind::Double | TypeKind::LongDouble
        )
    }

    pub fn is_arithmetic(&self) -> bool {
        self.is_integer() || self.is_floating()
    }

    pub fn is_pointer(&self) -> bool {
        matches!(
            self.canonical().kind,
            TypeKind::Pointer(_) | TypeKind::ObjCObjectPointer { .. } | TypeKind::ObjCId
        )
    }

    /// Size in bytes for an LP64 target. `None` for incomplete or record types.
    pub fn size_of(&self) -> Option<u64> {
        let size = match &self.kind {
            TypeKind::Bool | TypeKind::CharS | TypeKind::SChar | TypeKind::UChar => 1,
            TypeKind::Short | TypeKind::UShort => 2,
            TypeKind::Int | TypeKind::UInt | TypeKind::Float | TypeKind::Enum { .. } => 4,
            TypeKind::Long
            | TypeKind::ULong
            | TypeKind::LongLong
            | TypeKind::ULongLong
            | TypeKind::Double
            | TypeKind::NullPtr
            | TypeKind::ObjCId
            | TypeKind::Pointer(_)
            | TypeKind::ObjCObjectPointer { .. } => 8,
            TypeKind::LongDouble => 16,
            TypeKind::ConstantArray { element, size } => return Some(element.size_of()? * size),
            TypeKind::Typedef { underlying, .. } => return underlying.size_of(),
            _ => return None,
        };
        Some(size)
    }

    /// Spelling of the type under `policy`, e.g. `int *const` or
    /// `struct Foo`.
    pub fn spelling(&self, policy: &PrintingPolicy) -> String {
        self.print(policy, String::new())
    }

    fn print(&self, policy: &PrintingPolicy, inner: String) -> String {
        let quals = qualifier_words(self.quals, policy);
        match &self.kind {
            TypeKind::Pointer(pointee) => {
                let mut decl = String::from("*");
                push_quals(&mut decl, &quals, &inner);
                decl.push_str(&inner);
                pointee.print(policy, parenthesize(pointee, decl))
            }
            TypeKind::LValueReference(referee) => {
                let decl = format!("&{inner}");
                referee.print(policy, parenthesize(referee, decl))
            }
            TypeKind::RValueReference(referee) => {
                let decl = format!("&&{inner}");
                referee.print(policy, parenthesize(referee, decl))
            }
            TypeKind::ConstantArray { element, size } => {
                element.print(policy, format!("{inner}[{size}]"))
            }
            TypeKind::IncompleteArray(element) => element.print(policy, format!("{inner}[]")),
            TypeKind::FunctionProto {
                result,
                params,
                variadic,
            } => {
                let mut args: Vec<String> = params.iter().map(|p| p.spelling(policy)).collect();
                if *variadic {
                    args.push("...".to_string());
                }
                let list = if args.is_empty()
                    && policy.flag(PrintingPolicyProperty::UseVoidForZeroParams)
                {
                    "void".to_string()
                } else {
                    args.join(", ")
                };
                result.print(policy, format!("{inner}({list})"))
            }
            TypeKind::FunctionNoProto { result } => result.print(policy, format!("{inner}()")),
            _ => {
                let base = self.base_name(policy);
                let mut out = String::new();
                if !quals.is_empty() {
                    out.push_str(&quals);
                    out.push(' ');
                }
                out.push_str(&base);
                if !inner.is_empty() {
                    if !inner.starts_with('[') {
                        out.push(' ');
                    }
                    out.push_str(&inner);
                }
                out
            }
        }
    }

    fn base_name(&self, policy: &PrintingPolicy) -> String {
        let scoped = |name: &SmolStr, qualified: &SmolStr| {
            if policy.flag(PrintingPolicyProperty::SuppressScope) {
                name.to_string()
            } else {
                qualified.to_string()
            }
        };
        match &self.kind {
            TypeKind::Invalid => "int".to_string(),
            TypeKind::Void => "void".to_string(),
            TypeKind::Bool => {
                if policy.flag(PrintingPolicyProperty::Bool) {
                    "bool".to_string()
                } else {
                    "_Bool".to_string()
                }
            }
            TypeKind::CharS => "char".to_string(),
            TypeKind::SChar => "signed char".to_string(),
            TypeKind::UChar => "unsigned char".to_string(),
            TypeKind::Short => "short".to_string(),
            TypeKind::UShort => "unsigned short".to_string(),
            TypeKind::Int => "int".to_string(),
            TypeKind::UInt => "unsigned int".to_string(),
            TypeKind::Long => "long".to_string(),
            TypeKind::ULong => "unsigned long".to_string(),
            TypeKind::LongLong => "long long".to_string(),
            TypeKind::ULongLong => "unsigned long long".to_string(),
            TypeKind::Float => "float".to_string(),
            TypeKind::Double => "double".to_string(),
            TypeKind::LongDouble => "long double".to_string(),
            TypeKind::NullPtr => "std::nullptr_t".to_string(),
            TypeKind::ObjCId => "id".to_string(),
            TypeKind::Auto => "auto".to_string(),
            TypeKind::Record {
                tag,
                name,
                qualified,
                ..
            } => {
                let name = scoped(name, qualified);
                if policy.flag(PrintingPolicyProperty::SuppressTagKeyword) {
                    name
                } else {
                    format!("{} {name}", tag.keyword())
                }
            }
            TypeKind::Enum {
                name, qualified, ..
            } => {
                let name = scoped(name, qualified);
                if policy.flag(PrintingPolicyProperty::SuppressTagKeyword) {
                    name
                } else {
                    format!("enum {name}")
                }
            }
            TypeKind::Typedef { name, .. } => name.to_string(),
            TypeKind::ObjCObjectPointer { class } => format!("{class} *"),
            TypeKind::Unresolved { name, tag } => match tag {
                Some(tag) if !policy.flag(PrintingPolicyProperty::SuppressTagKeyword) => {
                    format!("{} {name}", tag.keyword())
                }
                _ => name.to_string(),
            },
            // Compound kinds are handled by `print`.
            _ => String::new(),
        }
    }
}

fn qualifier_words(quals: Qualifiers, policy: &PrintingPolicy) -> String {
    let mut words = Vec::new();
    if quals.contains(Qualifiers::CONST) {
        words.push("const");
    }
    if quals.contains(Qualifiers::VOLATILE) {
        words.push("volatile");
    }
    if quals.contains(Qualifiers::RESTRICT) {
        words.push(if policy.flag(PrintingPolicyProperty::Restrict) {
            "restrict"
        } else {
            "__restrict"
        });
    }
    words.join(" ")
}

fn push_quals(decl: &mut String, quals: &str, inner: &str) {
    if quals.is_empty() {
        return;
    }
    decl.push_str(quals);
    if !inner.is_empty() {
        decl.push(' ');
    }
}

fn parenthesize(target: &Type, decl: String) -> String {
    match target.kind {
        TypeKind::ConstantArray { .. }
        | TypeKind::IncompleteArray(_)
        | TypeKind::FunctionProto { .. }
        | TypeKind::FunctionNoProto { .. } => format!("({decl})"),
        _ => decl,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{LangOptions, Language};

    fn cxx() -> PrintingPolicy {
        PrintingPolicy::for_language(&LangOptions::new(Language::Cxx))
    }

    fn c() -> PrintingPolicy {
        PrintingPolicy::for_language(&LangOptions::new(Language::C))
    }

    fn int() -> Type {
        Type::new(TypeKind::Int)
    }

    #[test]
    fn qualified_pointer_spelling() {
        let ty = int()
            .pointer_to()
            .with_quals(Qualifiers::CONST | Qualifiers::VOLATILE | Qualifiers::RESTRICT);
        assert_eq!(ty.spelling(&c()), "int *const volatile restrict");
        assert_eq!(ty.unqualified().spelling(&c()), "int *");
        assert_eq!(int().with_quals(Qualifiers::CONST).spelling(&c()), "const int");
    }

    #[test]
    fn references_and_arrays() {
        let lref = Type::new(TypeKind::LValueReference(Box::new(int())));
        let rref = Type::new(TypeKind::RValueReference(Box::new(int())));
        assert_eq!(lref.spelling(&cxx()), "int &");
        assert_eq!(rref.spelling(&cxx()), "int &&");
        assert_eq!(lref.non_reference(), int());
        assert_eq!(lref.non_reference().non_reference(), int());

        let array = Type::new(TypeKind::ConstantArray {
            element: Box::new(int()),
            size: 4,
        });
        assert_eq!(array.spelling(&c()), "int[4]");
        assert_eq!(array.clone().pointer_to().spelling(&c()), "int (*)[4]");
        assert_eq!(array.size_of(), Some(16));
    }

    #[test]
    fn function_spelling() {
        let f = Type::new(TypeKind::FunctionProto {
            result: Box::new(Type::new(TypeKind::Void)),
            params: vec![int().with_quals(Qualifiers::CONST)],
            variadic: false,
        });
        assert_eq!(f.spelling(&c()), "void (const int)");
        let g = Type::new(TypeKind::FunctionProto {
            result: Box::new(int()),
            params: vec![],
            variadic: false,
        });
        assert_eq!(g.spelling(&c()), "int (void)");
        assert_eq!(g.spelling(&cxx()), "int ()");
    }

    #[test]
    fn record_spelling_depends_on_tag_keyword() {
        let record = Type::new(TypeKind::Record {
            tag: TagKind::Struct,
            name: "Foo".into(),
            qualified: "Foo".into(),
            decl: None,
        });
        assert_eq!(record.spelling(&c()), "struct Foo");
        assert_eq!(record.spelling(&cxx()), "Foo");
    }

    #[test]
    fn typedef_canonical() {
        let td = Type::new(TypeKind::Typedef {
            name: "myint".into(),
            decl: None,
            underlying: Box::new(int()),
        })
        .with_quals(Qualifiers::CONST);
        assert_eq!(td.spelling(&c()), "const myint");
        assert_eq!(td.canonical().spelling(&c()), "const int");
        assert!(td.is_integer());
    }
}

//! Printing policy: knobs that control how types and declarations are
//! spelled.

use crate::parser::LangOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrintingPolicyProperty {
    Indentation,
    SuppressSpecifiers,
    SuppressTagKeyword,
    IncludeTagDefinition,
    SuppressScope,
    SuppressUnwrittenScope,
    SuppressInitializers,
    ConstantArraySizeAsWritten,
    AnonymousTagLocations,
    SuppressStrongLifetime,
    SuppressLifetimeQualifiers,
    SuppressTemplateArgsInCXXConstructors,
    Bool,
    Restrict,
    Alignof,
    UnderscoreAlignof,
    UseVoidForZeroParams,
    TerseOutput,
    PolishForDeclaration,
    Half,
    MSWChar,
    IncludeNewlines,
    MSVCFormatting,
    ConstantsAsWritten,
    SuppressImplicitBase,
    FullyQualifiedName,
}

const PROPERTY_COUNT: usize = PrintingPolicyProperty::FullyQualifiedName as usize + 1;

impl PrintingPolicyProperty {
    pub const ALL: [PrintingPolicyProperty; PROPERTY_COUNT] = {
        use PrintingPolicyProperty::*;
        [
            Indentation,
            SuppressSpecifiers,
            SuppressTagKeyword,
            IncludeTagDefinition,
            SuppressScope,
            SuppressUnwrittenScope,
            SuppressInitializers,
            ConstantArraySizeAsWritten,
            AnonymousTagLocations,
            SuppressStrongLifetime,
            SuppressLifetimeQualifiers,
            SuppressTemplateArgsInCXXConstructors,
            Bool,
            Restrict,
            Alignof,
            UnderscoreAlignof,
            UseVoidForZeroParams,
            TerseOutput,
            PolishForDeclaration,
            Half,
            MSWChar,
            IncludeNewlines,
            MSVCFormatting,
            ConstantsAsWritten,
            SuppressImplicitBase,
            FullyQualifiedName,
        ]
    };
}

/// A set of printing properties. Every property holds an unsigned value;
/// all but `Indentation` are used as booleans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintingPolicy {
    values: [u32; PROPERTY_COUNT],
}

impl Default for PrintingPolicy {
    fn default() -> Self {
        Self::for_language(&LangOptions::default())
    }
}

impl PrintingPolicy {
    pub fn for_language(lang: &LangOptions) -> Self {
        use PrintingPolicyProperty::*;

        let mut policy = Self {
            values: [0; PROPERTY_COUNT],
        };
        policy.set(Indentation, 2);
        policy.set(SuppressTagKeyword, u32::from(lang.cplusplus()));
        policy.set(AnonymousTagLocations, 1);
        policy.set(Bool, u32::from(lang.bool_keywords()));
        policy.set(Restrict, u32::from(lang.c99()));
        policy.set(Alignof, u32::from(lang.cplusplus11()));
        policy.set(UnderscoreAlignof, u32::from(!lang.cplusplus()));
        policy.set(UseVoidForZeroParams, u32::from(!lang.cplusplus()));
        policy.set(IncludeNewlines, 1);
        policy
    }

    pub fn get(&self, property: PrintingPolicyProperty) -> u32 {
        self.values[property as usize]
    }

    pub fn set(&mut self, property: PrintingPolicyProperty, value: u32) {
        self.values[property as usize] = value;
    }

    pub fn flag(&self, property: PrintingPolicyProperty) -> bool {
        self.get(property) != 0
    }
}

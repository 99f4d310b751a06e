//! The production layer: one recursive-descent matcher per WebIDL grammar rule.
//!
//! Rather than one Rust type per grammar production (the "~40 classes" the original
//! system organizes as), every production is one variant of a single tagged
//! [ProductionKind] enum, per the redesign called for in the design notes: a sum type
//! with a small shared interface (`span`, `text`, `children`) beats a parallel class
//! hierarchy for a fixed, closed grammar like this one.
mod parse;

pub use parse::{
    parse_argument_list, parse_const_value, parse_default, parse_enum_value_list,
    parse_extended_attribute_list, parse_inheritance, parse_type, peek_default,
    peek_extended_attribute_list, peek_inheritance, peek_type,
};

/// A contiguous byte range in the [Parser](crate::Parser)'s shared source buffer.
/// `text(source)` always returns the exact original bytes: spans are never
/// re-serialized, only sliced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.start..self.end]
    }

    pub fn join(a: Span, b: Span) -> Span {
        Span::new(a.start.min(b.start), a.end.max(b.end))
    }
}

/// One grammar production: its source span plus its kind-specific children.
#[derive(Debug, Clone)]
pub struct Production {
    pub span: Span,
    pub kind: ProductionKind,
}

impl Production {
    pub fn new(span: Span, kind: ProductionKind) -> Self {
        Self { span, kind }
    }

    /// Re-emit this production's exact original source text — a direct byte-slice of
    /// its span, so it is correct by construction rather than reconstructed piecewise.
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        self.span.text(source)
    }

    /// Immediate child productions, in source order, for the markup driver's structural
    /// recursion (types nest inside types; argument lists nest arguments; extended
    /// attribute lists nest attributes).
    pub fn children(&self) -> Vec<&Production> {
        match &self.kind {
            ProductionKind::Sequence(inner)
            | ProductionKind::FrozenArray(inner)
            | ProductionKind::Default(inner) => vec![inner.as_ref()],
            ProductionKind::Promise(Some(inner)) => vec![inner.as_ref()],
            ProductionKind::Record(key, value) => vec![key.as_ref(), value.as_ref()],
            ProductionKind::Union(members) => members.iter().collect(),
            ProductionKind::Type { inner, .. } => vec![inner.as_ref()],
            ProductionKind::ArgumentList(args) => args.iter().collect(),
            ProductionKind::Argument {
                extended_attributes,
                type_,
                default,
                ..
            } => {
                let mut out = Vec::new();
                if let Some(ea) = extended_attributes {
                    out.push(ea.as_ref());
                }
                out.push(type_.as_ref());
                if let Some(d) = default {
                    out.push(d.as_ref());
                }
                out
            }
            ProductionKind::ExtendedAttributeList(attrs) => attrs.iter().collect(),
            ProductionKind::ExtendedAttribute(kind) => kind.children(),
            _ => Vec::new(),
        }
    }

    /// `Some` for the handful of kinds the markup driver wraps with a dedicated marker
    /// method rather than treating as a structural container only.
    pub fn markup_kind(&self) -> Option<MarkupKind> {
        match &self.kind {
            ProductionKind::Type { .. } => Some(MarkupKind::Type),
            ProductionKind::PrimitiveType => Some(MarkupKind::PrimitiveType),
            ProductionKind::StringType => Some(MarkupKind::StringType),
            ProductionKind::BufferType => Some(MarkupKind::BufferType),
            ProductionKind::ObjectType => Some(MarkupKind::ObjectType),
            ProductionKind::TypeIdentifier => Some(MarkupKind::TypeName),
            _ => None,
        }
    }
}

/// The named syntactic element categories the markup driver dispatches on (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupKind {
    Type,
    PrimitiveType,
    StringType,
    BufferType,
    ObjectType,
    TypeName,
    Keyword,
    Name,
    EnumValue,
}

#[derive(Debug, Clone)]
pub enum ProductionKind {
    PrimitiveType,
    StringType,
    BufferType,
    ObjectType,
    TypeIdentifier,
    Sequence(Box<Production>),
    FrozenArray(Box<Production>),
    /// `None` means `Promise<void>`.
    Promise(Option<Box<Production>>),
    Record(Box<Production>, Box<Production>),
    Union(Vec<Production>),
    /// The outer `Type` wrapper: every type reference is one of these, whether or not
    /// it ends up nullable, so markup always has a uniform outer element to wrap.
    Type {
        inner: Box<Production>,
        nullable: bool,
    },
    ArgumentList(Vec<Production>),
    Argument {
        extended_attributes: Option<Box<Production>>,
        optional: bool,
        type_: Box<Production>,
        variadic: bool,
        name: Span,
        default: Option<Box<Production>>,
        /// A legacy `in`/`out` direction keyword was accepted and folded into this
        /// argument's span, but dropped from its semantic fields (§4.3 Legacy tolerations).
        had_legacy_direction: bool,
    },
    /// `=` followed by the value production it wraps.
    Default(Box<Production>),
    ConstValue,
    EmptySequence,
    EmptyDictionary,
    NullLiteral,
    EnumValueList(Vec<Span>),
    /// `: Identifier` — the span covers the identifier only, the colon is consumed but
    /// not retained since it carries no markup-relevant identity of its own.
    Inheritance(Span),
    ExtendedAttributeList(Vec<Production>),
    ExtendedAttribute(ExtendedAttributeKind),
    /// A legacy `in`/`out` argument-direction keyword, accepted and retained in the
    /// span but dropped from semantic argument fields (§4.3 Legacy tolerations).
    IgnoreInOut,
}

/// The five canonical extended-attribute forms (§4.3), classified by speculative
/// matching in the order they're listed here — most specific first.
#[derive(Debug, Clone)]
pub enum ExtendedAttributeKind {
    NamedArgList {
        name: Span,
        rhs_name: Span,
        arguments: Box<Production>,
    },
    ArgList {
        name: Span,
        arguments: Box<Production>,
    },
    Ident {
        name: Span,
        rhs: Span,
    },
    TypePair {
        name: Span,
        first: Box<Production>,
        second: Box<Production>,
    },
    NoArgs {
        name: Span,
    },
    Unknown,
}

impl ExtendedAttributeKind {
    pub fn name(&self) -> Option<Span> {
        match self {
            ExtendedAttributeKind::NamedArgList { name, .. }
            | ExtendedAttributeKind::ArgList { name, .. }
            | ExtendedAttributeKind::Ident { name, .. }
            | ExtendedAttributeKind::TypePair { name, .. }
            | ExtendedAttributeKind::NoArgs { name } => Some(*name),
            ExtendedAttributeKind::Unknown => None,
        }
    }

    fn children(&self) -> Vec<&Production> {
        match self {
            ExtendedAttributeKind::NamedArgList { arguments, .. }
            | ExtendedAttributeKind::ArgList { arguments, .. } => vec![arguments.as_ref()],
            ExtendedAttributeKind::TypePair { first, second, .. } => {
                vec![first.as_ref(), second.as_ref()]
            }
            _ => Vec::new(),
        }
    }
}

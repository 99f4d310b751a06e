//! The construct layer: named top-level and member entities assembled from productions.
//!
//! Constructs are stored in one flat arena owned by [Parser](crate::Parser); a construct
//! refers to its parent (and, where relevant, named members) by [ConstructId] rather than
//! by borrowed reference or `Rc`, so the tree never needs a lifetime parameter and never
//! forms a reference cycle.
mod members;
mod syntax_error;
mod top_level;

pub(crate) use top_level::parse_top_level_construct;

use crate::production::{ExtendedAttributeKind, Production, Span};
use crate::token::TokenKind;
use crate::tokenizer::TokenStream;
use crate::ParserDelegate;

/// Shared parsing state threaded through the construct layer: the source buffer, the
/// construct arena being appended to, and the caller's diagnostic delegate.
pub(crate) struct ParseContext<'a> {
    pub source: &'a str,
    pub arena: &'a mut Vec<Construct>,
    pub delegate: Option<&'a dyn ParserDelegate>,
}

impl<'a> ParseContext<'a> {
    pub fn push(&mut self, construct: Construct) -> ConstructId {
        let id = ConstructId(self.arena.len());
        self.arena.push(construct);
        id
    }

    pub fn warn(&self, message: &str) {
        if let Some(d) = self.delegate {
            d.warn(message);
        }
    }

    pub fn note(&self, message: &str) {
        if let Some(d) = self.delegate {
            d.note(message);
        }
    }

    /// Lower a parsed `ExtendedAttributeList` production into constructs, one per
    /// attribute, in source order.
    pub fn lower_extended_attributes(
        &mut self,
        list: &Option<Production>,
    ) -> Vec<ConstructId> {
        let Some(list) = list else { return Vec::new() };
        match &list.kind {
            crate::production::ProductionKind::ExtendedAttributeList(attrs) => attrs
                .iter()
                .map(|a| self.lower_extended_attribute(a))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn lower_extended_attribute(&mut self, prod: &Production) -> ConstructId {
        let kind = match &prod.kind {
            crate::production::ProductionKind::ExtendedAttribute(k) => k.clone(),
            _ => ExtendedAttributeKind::Unknown,
        };
        let name = kind.name();
        self.push(Construct {
            idl_type: IdlType::ExtendedAttribute,
            name,
            parent: None,
            extended_attributes: Vec::new(),
            span: prod.span,
            kind: ConstructKind::ExtendedAttribute(kind),
            markup_spans: vec![MarkupSpan::Production(prod.clone())],
        })
    }
}

/// Does the next real token equal the identifier `word`?
pub(crate) fn is_kw(stream: &TokenStream, source: &str, word: &str) -> bool {
    let t = stream.peek(1);
    t.kind == TokenKind::Identifier && t.text(source) == word
}

pub(crate) fn is_kw_at(stream: &TokenStream, source: &str, k: usize, word: &str) -> bool {
    let t = stream.peek(k);
    t.kind == TokenKind::Identifier && t.text(source) == word
}

pub(crate) fn is_sym(stream: &TokenStream, source: &str, sym: &str) -> bool {
    let t = stream.peek(1);
    t.kind == TokenKind::Symbol && t.text(source) == sym
}

pub(crate) fn expect_sym(
    stream: &mut TokenStream,
    source: &str,
    sym: &str,
) -> Result<Span, crate::error::Unparsed> {
    if is_sym(stream, source, sym) {
        let t = stream.consume();
        Ok(Span::new(t.start, t.end))
    } else {
        Err(crate::error::Unparsed)
    }
}

pub(crate) fn expect_identifier(stream: &mut TokenStream) -> Result<Span, crate::error::Unparsed> {
    let t = stream.peek(1);
    if t.kind == TokenKind::Identifier {
        stream.consume();
        Ok(Span::new(t.start, t.end))
    } else {
        Err(crate::error::Unparsed)
    }
}

/// An index into the owning [Parser](crate::Parser)'s construct arena. Never dereferenced
/// without going through the arena, so it carries no lifetime of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstructId(pub(crate) usize);

/// The closed set of construct kinds (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdlType {
    Const,
    Enum,
    Typedef,
    Interface,
    Constructor,
    Attribute,
    Iterable,
    Maplike,
    Setlike,
    Stringifier,
    Serializer,
    Method,
    Argument,
    Dictionary,
    DictMember,
    Callback,
    Implements,
    Includes,
    ExtendedAttribute,
    SyntaxError,
    Unknown,
}

impl IdlType {
    /// The lowercase, hyphenated tag name used by path-segment matching (§4.4).
    pub fn tag(&self) -> &'static str {
        match self {
            IdlType::Const => "const",
            IdlType::Enum => "enum",
            IdlType::Typedef => "typedef",
            IdlType::Interface => "interface",
            IdlType::Constructor => "constructor",
            IdlType::Attribute => "attribute",
            IdlType::Iterable => "iterable",
            IdlType::Maplike => "maplike",
            IdlType::Setlike => "setlike",
            IdlType::Stringifier => "stringifier",
            IdlType::Serializer => "serializer",
            IdlType::Method => "method",
            IdlType::Argument => "argument",
            IdlType::Dictionary => "dictionary",
            IdlType::DictMember => "dict-member",
            IdlType::Callback => "callback",
            IdlType::Implements => "implements",
            IdlType::Includes => "includes",
            IdlType::ExtendedAttribute => "extended-attribute",
            IdlType::SyntaxError => "syntax-error",
            IdlType::Unknown => "unknown",
        }
    }
}

/// One named syntactic element in a construct's precomputed markup plan (§4.5).
#[derive(Debug, Clone)]
pub(crate) enum MarkupSpan {
    Keyword(Span),
    Name(Span),
    EnumValue(Span),
    Production(Production),
    /// A nested member construct, marked up by recursing into `markup_for` rather than by
    /// an inline span.
    Member(ConstructId),
}

/// A named, top-level or member entity. Every variant-specific payload lives in `kind`;
/// the fields here are the ones every construct shares (§3).
#[derive(Debug, Clone)]
pub struct Construct {
    pub idl_type: IdlType,
    /// The declared identifier span, or `None` for anonymous constructs (stringifiers,
    /// syntax-error captures, unknown extended attributes).
    pub name: Option<Span>,
    pub parent: Option<ConstructId>,
    pub extended_attributes: Vec<ConstructId>,
    pub span: Span,
    pub kind: ConstructKind,
    pub(crate) markup_spans: Vec<MarkupSpan>,
}

impl Construct {
    pub fn name_text<'s>(&self, source: &'s str) -> Option<&'s str> {
        self.name.map(|s| s.text(source))
    }

    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        self.span.text(source)
    }

    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    /// Direct member constructs, in source order — the set that `find_member` and name
    /// search walk one level at a time.
    pub fn members(&self) -> &[ConstructId] {
        match &self.kind {
            ConstructKind::Interface(i) => &i.members,
            ConstructKind::Dictionary(d) => &d.members,
            ConstructKind::CallbackInterface(i) => &i.members,
            _ => &[],
        }
    }

    /// A method construct's canonical name variants, full form first (§4.4). Empty for
    /// non-method constructs.
    pub fn method_names(&self, source: &str) -> Vec<String> {
        match &self.kind {
            ConstructKind::Method(m) => crate::method_name::normalized_method_names(
                self.name_text(source).unwrap_or(""),
                &m.arguments,
                source,
            ),
            ConstructKind::Constructor(arguments) => crate::method_name::normalized_method_names(
                "constructor",
                arguments,
                source,
            ),
            _ => Vec::new(),
        }
    }

    pub fn method_name(&self, source: &str) -> Option<String> {
        self.method_names(source).into_iter().next()
    }

    /// This construct's own intrinsic weight plus the complexity of everything it owns
    /// (§3 invariant 4). Intrinsic weight is 1 per construct, keeping the metric a simple
    /// node count — deep nesting costs more than a flat list of the same size.
    pub fn complexity_factor(&self, arena: &[Construct]) -> u64 {
        let mut total = 1u64;
        for &id in &self.extended_attributes {
            total += arena[id.0].complexity_factor(arena);
        }
        for &id in self.members() {
            total += arena[id.0].complexity_factor(arena);
        }
        total
    }
}

#[derive(Debug, Clone)]
pub struct InterfaceBody {
    pub inheritance: Option<Production>,
    pub constructors: Vec<ConstructId>,
    pub members: Vec<ConstructId>,
    pub partial: bool,
}

#[derive(Debug, Clone)]
pub struct DictionaryBody {
    pub inheritance: Option<Production>,
    pub members: Vec<ConstructId>,
    pub partial: bool,
}

#[derive(Debug, Clone)]
pub struct CallbackFunction {
    pub return_type: Production,
    pub arguments: Vec<Production>,
}

#[derive(Debug, Clone)]
pub struct MethodLike {
    pub return_type: Production,
    pub arguments: Vec<Production>,
}

#[derive(Debug, Clone)]
pub struct AttributeBody {
    pub readonly: bool,
    pub type_: Production,
}

#[derive(Debug, Clone)]
pub struct DictMemberBody {
    pub required: bool,
    pub type_: Production,
    pub default: Option<Production>,
}

#[derive(Debug, Clone)]
pub struct ConstBody {
    pub type_: Production,
    pub value: Production,
}

#[derive(Debug, Clone)]
pub struct TypedefBody {
    pub type_: Production,
}

#[derive(Debug, Clone)]
pub struct ImplementsBody {
    pub target: Span,
}

/// The construct-kind payload, a second sum type alongside [ProductionKind](crate::production::ProductionKind)
/// per the design notes — composition (a Const *has a* Type) rather than inheritance.
#[derive(Debug, Clone)]
pub enum ConstructKind {
    Interface(InterfaceBody),
    CallbackInterface(InterfaceBody),
    Dictionary(DictionaryBody),
    Callback(CallbackFunction),
    Enum { values: Production },
    Typedef(TypedefBody),
    Const(ConstBody),
    Attribute(AttributeBody),
    Constructor(Vec<Production>),
    Method(MethodLike),
    Argument(Production),
    Iterable { key_type: Production, value_type: Option<Production> },
    Maplike { key_type: Production, value_type: Production },
    Setlike { value_type: Production },
    Stringifier,
    Serializer,
    DictMember(DictMemberBody),
    Implements(ImplementsBody),
    Includes(ImplementsBody),
    ExtendedAttribute(ExtendedAttributeKind),
    SyntaxError { diagnostic: crate::error::SyntaxDiagnostic },
}

use super::{ExtendedAttributeKind, Production, ProductionKind, Span};
use crate::error::Unparsed;
use crate::token::TokenKind;
use crate::tokenizer::TokenStream;

const STRING_TYPES: &[&str] = &["ByteString", "DOMString", "USVString"];
const BUFFER_TYPES: &[&str] = &[
    "ArrayBuffer",
    "DataView",
    "Int8Array",
    "Int16Array",
    "Int32Array",
    "Uint8Array",
    "Uint16Array",
    "Uint32Array",
    "Uint8ClampedArray",
    "Float32Array",
    "Float64Array",
];
const PRIMITIVE_WORDS: &[&str] = &[
    "any",
    "void",
    "boolean",
    "byte",
    "octet",
    "short",
    "long",
    "float",
    "double",
    "unrestricted",
    "unsigned",
];

fn is_ident(stream: &TokenStream, source: &str, word: &str) -> bool {
    let t = stream.peek(1);
    t.kind == TokenKind::Identifier && t.text(source) == word
}

fn is_symbol(stream: &TokenStream, source: &str, sym: &str) -> bool {
    let t = stream.peek(1);
    t.kind == TokenKind::Symbol && t.text(source) == sym
}

fn is_symbol_at(stream: &TokenStream, source: &str, k: usize, sym: &str) -> bool {
    let t = stream.peek(k);
    t.kind == TokenKind::Symbol && t.text(source) == sym
}

fn expect_symbol(stream: &mut TokenStream, source: &str, sym: &str) -> Result<Span, Unparsed> {
    if is_symbol(stream, source, sym) {
        let t = stream.consume();
        Ok(Span::new(t.start, t.end))
    } else {
        Err(Unparsed)
    }
}

fn expect_identifier(stream: &mut TokenStream) -> Result<Span, Unparsed> {
    let t = stream.peek(1);
    if t.kind == TokenKind::Identifier {
        stream.consume();
        Ok(Span::new(t.start, t.end))
    } else {
        Err(Unparsed)
    }
}

// ---------------------------------------------------------------------------
// Type
// ---------------------------------------------------------------------------

/// Non-destructive lookahead: does a Type production start here?
pub fn peek_type(stream: &TokenStream, source: &str) -> bool {
    let t = stream.peek(1);
    if t.kind == TokenKind::Symbol && t.text(source) == "(" {
        return true;
    }
    if t.kind != TokenKind::Identifier {
        return false;
    }
    true
}

pub fn parse_type(stream: &mut TokenStream, source: &str) -> Result<Production, Unparsed> {
    let start = stream.leading_trivia_start();
    let inner = parse_inner_type(stream, source)?;
    let mut end = inner.span.end;
    let nullable = if is_symbol(stream, source, "?") {
        let t = stream.consume();
        end = t.end;
        true
    } else {
        false
    };
    Ok(Production::new(
        Span::new(start, end),
        ProductionKind::Type {
            inner: Box::new(inner),
            nullable,
        },
    ))
}

fn parse_inner_type(stream: &mut TokenStream, source: &str) -> Result<Production, Unparsed> {
    if is_symbol(stream, source, "(") {
        return parse_union(stream, source);
    }

    let t = stream.peek(1);
    if t.kind != TokenKind::Identifier {
        return Err(Unparsed);
    }
    let word = t.text(source);

    if word == "sequence" && is_symbol_at(stream, source, 2, "<") {
        return parse_sequence(stream, source);
    }
    if word == "FrozenArray" && is_symbol_at(stream, source, 2, "<") {
        return parse_frozen_array(stream, source);
    }
    if word == "Promise" && is_symbol_at(stream, source, 2, "<") {
        return parse_promise(stream, source);
    }
    if word == "record" && is_symbol_at(stream, source, 2, "<") {
        return parse_record(stream, source);
    }
    if STRING_TYPES.contains(&word) {
        let span = expect_identifier(stream)?;
        return Ok(Production::new(span, ProductionKind::StringType));
    }
    if BUFFER_TYPES.contains(&word) {
        let span = expect_identifier(stream)?;
        return Ok(Production::new(span, ProductionKind::BufferType));
    }
    if word == "object" {
        let span = expect_identifier(stream)?;
        return Ok(Production::new(span, ProductionKind::ObjectType));
    }
    if PRIMITIVE_WORDS.contains(&word) {
        let mut span = expect_identifier(stream)?;
        // "unsigned short", "unsigned long", "long long", "unrestricted double", etc.
        if (word == "unsigned" || word == "unrestricted" || word == "long")
            && stream.peek(1).kind == TokenKind::Identifier
        {
            let next = stream.peek(1).text(source);
            let continues = matches!(
                (word, next),
                ("unsigned", "short")
                    | ("unsigned", "long")
                    | ("unrestricted", "float")
                    | ("unrestricted", "double")
                    | ("long", "long")
            );
            if continues {
                let more = expect_identifier(stream)?;
                span = Span::join(span, more);
                if next == "long" && stream.peek(1).kind == TokenKind::Identifier {
                    // "unsigned long long"
                    if stream.peek(1).text(source) == "long" {
                        let more2 = expect_identifier(stream)?;
                        span = Span::join(span, more2);
                    }
                }
            }
        }
        return Ok(Production::new(span, ProductionKind::PrimitiveType));
    }

    // Anything else recognizable as an identifier is a reference to a named type
    // (interface, dictionary, enum, typedef or callback).
    let span = expect_identifier(stream)?;
    Ok(Production::new(span, ProductionKind::TypeIdentifier))
}

fn parse_union(stream: &mut TokenStream, source: &str) -> Result<Production, Unparsed> {
    let mark = stream.mark();
    let open = expect_symbol(stream, source, "(").map_err(|e| {
        stream.restore(mark);
        e
    })?;
    let mut members = Vec::new();
    members.push(parse_type(stream, source).map_err(|e| {
        stream.restore(mark);
        e
    })?);
    loop {
        if !is_ident(stream, source, "or") {
            break;
        }
        stream.consume();
        members.push(parse_type(stream, source).map_err(|e| {
            stream.restore(mark);
            e
        })?);
    }
    if members.len() < 2 {
        stream.restore(mark);
        return Err(Unparsed);
    }
    let close = expect_symbol(stream, source, ")").map_err(|e| {
        stream.restore(mark);
        e
    })?;
    Ok(Production::new(
        Span::join(open, close),
        ProductionKind::Union(members),
    ))
}

fn parse_sequence(stream: &mut TokenStream, source: &str) -> Result<Production, Unparsed> {
    let name = expect_identifier(stream)?;
    expect_symbol(stream, source, "<")?;
    let inner = parse_type(stream, source)?;
    let close = expect_symbol(stream, source, ">")?;
    Ok(Production::new(
        Span::join(name, close),
        ProductionKind::Sequence(Box::new(inner)),
    ))
}

fn parse_frozen_array(stream: &mut TokenStream, source: &str) -> Result<Production, Unparsed> {
    let name = expect_identifier(stream)?;
    expect_symbol(stream, source, "<")?;
    let inner = parse_type(stream, source)?;
    let close = expect_symbol(stream, source, ">")?;
    Ok(Production::new(
        Span::join(name, close),
        ProductionKind::FrozenArray(Box::new(inner)),
    ))
}

fn parse_promise(stream: &mut TokenStream, source: &str) -> Result<Production, Unparsed> {
    let name = expect_identifier(stream)?;
    expect_symbol(stream, source, "<")?;
    let inner = if is_ident(stream, source, "void") {
        stream.consume();
        None
    } else {
        Some(Box::new(parse_type(stream, source)?))
    };
    let close = expect_symbol(stream, source, ">")?;
    Ok(Production::new(
        Span::join(name, close),
        ProductionKind::Promise(inner),
    ))
}

fn parse_record(stream: &mut TokenStream, source: &str) -> Result<Production, Unparsed> {
    let name = expect_identifier(stream)?;
    expect_symbol(stream, source, "<")?;
    let key = parse_type(stream, source)?;
    expect_symbol(stream, source, ",")?;
    let value = parse_type(stream, source)?;
    let close = expect_symbol(stream, source, ">")?;
    Ok(Production::new(
        Span::join(name, close),
        ProductionKind::Record(Box::new(key), Box::new(value)),
    ))
}

// ---------------------------------------------------------------------------
// Default / ConstValue
// ---------------------------------------------------------------------------

pub fn peek_default(stream: &TokenStream, source: &str) -> bool {
    is_symbol(stream, source, "=")
}

/// `= ConstValue | string | [] | {} | null`. Absence of `=` is "no default", not an
/// error — callers check `peek_default` first.
pub fn parse_default(stream: &mut TokenStream, source: &str) -> Result<Production, Unparsed> {
    let mark = stream.mark();
    let eq = expect_symbol(stream, source, "=").map_err(|e| {
        stream.restore(mark);
        e
    })?;

    let value = if is_symbol(stream, source, "[") && is_symbol_at(stream, source, 2, "]") {
        let a = stream.consume();
        let b = stream.consume();
        Production::new(Span::join(Span::new(a.start, a.end), Span::new(b.start, b.end)), ProductionKind::EmptySequence)
    } else if is_symbol(stream, source, "{") && is_symbol_at(stream, source, 2, "}") {
        let a = stream.consume();
        let b = stream.consume();
        Production::new(Span::join(Span::new(a.start, a.end), Span::new(b.start, b.end)), ProductionKind::EmptyDictionary)
    } else if is_ident(stream, source, "null") {
        let t = stream.consume();
        Production::new(Span::new(t.start, t.end), ProductionKind::NullLiteral)
    } else {
        match parse_const_value(stream, source) {
            Ok(p) => p,
            Err(_) => {
                let t = stream.peek(1);
                if t.kind == TokenKind::String {
                    stream.consume();
                    Production::new(Span::new(t.start, t.end), ProductionKind::ConstValue)
                } else {
                    stream.restore(mark);
                    return Err(Unparsed);
                }
            }
        }
    };

    Ok(Production::new(
        Span::join(eq, value.span),
        ProductionKind::Default(Box::new(value)),
    ))
}

/// Boolean / numeric literal, or the float special forms. Strings are handled by
/// [parse_default] directly since a bare `ConstValue` never matches a string literal.
pub fn parse_const_value(stream: &mut TokenStream, source: &str) -> Result<Production, Unparsed> {
    let t = stream.peek(1);
    match t.kind {
        TokenKind::Integer | TokenKind::Float => {
            stream.consume();
            Ok(Production::new(Span::new(t.start, t.end), ProductionKind::ConstValue))
        }
        TokenKind::Identifier if matches!(t.text(source), "true" | "false") => {
            stream.consume();
            Ok(Production::new(Span::new(t.start, t.end), ProductionKind::ConstValue))
        }
        _ => Err(Unparsed),
    }
}

// ---------------------------------------------------------------------------
// ArgumentList / Argument
// ---------------------------------------------------------------------------

pub fn parse_argument_list(
    stream: &mut TokenStream,
    source: &str,
) -> Result<Production, Unparsed> {
    let start = stream.leading_trivia_start();
    let mut args = Vec::new();
    if peek_argument(stream, source) {
        args.push(parse_argument(stream, source)?);
        while is_symbol(stream, source, ",") {
            stream.consume();
            args.push(parse_argument(stream, source)?);
        }
    }
    let end = args.last().map(|a: &Production| a.span.end).unwrap_or(start);
    Ok(Production::new(
        Span::new(start, end),
        ProductionKind::ArgumentList(args),
    ))
}

fn peek_argument(stream: &TokenStream, source: &str) -> bool {
    is_ident(stream, source, "optional")
        || is_symbol(stream, source, "[")
        || is_ident(stream, source, "in")
        || is_ident(stream, source, "out")
        || peek_type(stream, source)
}

fn parse_argument(stream: &mut TokenStream, source: &str) -> Result<Production, Unparsed> {
    let start = stream.leading_trivia_start();

    let extended_attributes = if peek_extended_attribute_list(stream, source) {
        Some(Box::new(parse_extended_attribute_list(stream, source)?))
    } else {
        None
    };

    // Legacy `in`/`out` argument-direction keyword: accepted, retained in the span,
    // dropped from the semantic argument (§4.3 Legacy tolerations). Surfacing the
    // `note` callback itself is the construct layer's job, since only it holds the
    // `ParserDelegate`.
    let mut legacy_direction = None;
    if is_ident(stream, source, "in") || is_ident(stream, source, "out") {
        let t = stream.consume();
        legacy_direction = Some(Span::new(t.start, t.end));
    }

    let optional = if is_ident(stream, source, "optional") {
        stream.consume();
        true
    } else {
        false
    };

    let type_ = parse_type(stream, source)?;

    let variadic = if is_symbol(stream, source, "...") {
        stream.consume();
        true
    } else {
        false
    };

    let name = expect_identifier(stream)?;

    let default = if optional && peek_default(stream, source) {
        Some(Box::new(parse_default(stream, source)?))
    } else {
        None
    };

    let mut end = name.end;
    if let Some(d) = &default {
        end = d.span.end;
    }

    let mut span = Span::new(start, end);
    if let Some(legacy) = legacy_direction {
        span = Span::join(span, legacy);
    }

    let kind = ProductionKind::Argument {
        extended_attributes,
        optional,
        type_: Box::new(type_),
        variadic,
        name,
        default,
        had_legacy_direction: legacy_direction.is_some(),
    };
    Ok(Production::new(span, kind))
}

// ---------------------------------------------------------------------------
// EnumValueList
// ---------------------------------------------------------------------------

pub fn parse_enum_value_list(
    stream: &mut TokenStream,
    source: &str,
) -> Result<Production, Unparsed> {
    let open = expect_symbol(stream, source, "{")?;
    let mut values = Vec::new();
    loop {
        let t = stream.peek(1);
        if t.kind != TokenKind::String {
            break;
        }
        stream.consume();
        values.push(Span::new(t.start, t.end));
        if is_symbol(stream, source, ",") {
            stream.consume();
        } else {
            break;
        }
    }
    let close = expect_symbol(stream, source, "}")?;
    Ok(Production::new(
        Span::join(open, close),
        ProductionKind::EnumValueList(values),
    ))
}

// ---------------------------------------------------------------------------
// Inheritance
// ---------------------------------------------------------------------------

pub fn peek_inheritance(stream: &TokenStream, source: &str) -> bool {
    is_symbol(stream, source, ":")
}

pub fn parse_inheritance(stream: &mut TokenStream, source: &str) -> Result<Production, Unparsed> {
    let mark = stream.mark();
    let colon = expect_symbol(stream, source, ":").map_err(|e| {
        stream.restore(mark);
        e
    })?;
    let name = expect_identifier(stream).map_err(|e| {
        stream.restore(mark);
        e
    })?;
    Ok(Production::new(
        Span::join(colon, name),
        ProductionKind::Inheritance(name),
    ))
}

// ---------------------------------------------------------------------------
// ExtendedAttributeList / ExtendedAttribute
// ---------------------------------------------------------------------------

pub fn peek_extended_attribute_list(stream: &TokenStream, source: &str) -> bool {
    is_symbol(stream, source, "[")
}

pub fn parse_extended_attribute_list(
    stream: &mut TokenStream,
    source: &str,
) -> Result<Production, Unparsed> {
    let open = expect_symbol(stream, source, "[")?;
    let mut attrs = vec![parse_extended_attribute(stream, source)?];
    while is_symbol(stream, source, ",") {
        stream.consume();
        attrs.push(parse_extended_attribute(stream, source)?);
    }
    let close = expect_symbol(stream, source, "]")?;
    Ok(Production::new(
        Span::join(open, close),
        ProductionKind::ExtendedAttributeList(attrs),
    ))
}

fn parse_extended_attribute(
    stream: &mut TokenStream,
    source: &str,
) -> Result<Production, Unparsed> {
    let start = stream.leading_trivia_start();
    let mark = stream.mark();

    // 1. NamedArgList: identifier = identifier ( ArgumentList )
    if let Some(p) = try_named_arg_list(stream, source, start) {
        return Ok(p);
    }
    stream.restore(mark);

    // 2. ArgList: identifier ( ArgumentList )
    if let Some(p) = try_arg_list(stream, source, start) {
        return Ok(p);
    }
    stream.restore(mark);

    // 3. Ident: identifier = identifier
    if let Some(p) = try_ident(stream, source, start) {
        return Ok(p);
    }
    stream.restore(mark);

    // 4. TypePair: identifier ( Type , Type )
    if let Some(p) = try_type_pair(stream, source, start) {
        return Ok(p);
    }
    stream.restore(mark);

    // 5. NoArgs: identifier
    if stream.peek(1).kind == TokenKind::Identifier {
        let name = expect_identifier(stream)?;
        return Ok(Production::new(
            Span::new(start, name.end),
            ProductionKind::ExtendedAttribute(ExtendedAttributeKind::NoArgs { name }),
        ));
    }
    stream.restore(mark);

    // Unknown: consume everything up to the next `,` or `]` at bracket-depth zero.
    let mut depth = 0i32;
    let unknown_start = stream.peek(1).start;
    let mut end = unknown_start;
    loop {
        let t = stream.peek(1);
        if t.kind == TokenKind::EndOfInput {
            break;
        }
        if t.kind == TokenKind::Symbol {
            match t.text(source) {
                "[" | "(" => depth += 1,
                "]" | ")" if depth > 0 => depth -= 1,
                "]" | ")" => break,
                "," if depth == 0 => break,
                _ => {}
            }
        }
        stream.consume();
        end = t.end;
    }
    Ok(Production::new(
        Span::new(start, end.max(unknown_start)),
        ProductionKind::ExtendedAttribute(ExtendedAttributeKind::Unknown),
    ))
}

fn try_named_arg_list(stream: &mut TokenStream, source: &str, start: usize) -> Option<Production> {
    let name = expect_identifier(stream).ok()?;
    expect_symbol(stream, source, "=").ok()?;
    let rhs_name = expect_identifier(stream).ok()?;
    expect_symbol(stream, source, "(").ok()?;
    let arguments = parse_argument_list(stream, source).ok()?;
    let close = expect_symbol(stream, source, ")").ok()?;
    Some(Production::new(
        Span::new(start, close.end),
        ProductionKind::ExtendedAttribute(ExtendedAttributeKind::NamedArgList {
            name,
            rhs_name,
            arguments: Box::new(arguments),
        }),
    ))
}

fn try_arg_list(stream: &mut TokenStream, source: &str, start: usize) -> Option<Production> {
    let name = expect_identifier(stream).ok()?;
    expect_symbol(stream, source, "(").ok()?;
    let arguments = parse_argument_list(stream, source).ok()?;
    let close = expect_symbol(stream, source, ")").ok()?;
    Some(Production::new(
        Span::new(start, close.end),
        ProductionKind::ExtendedAttribute(ExtendedAttributeKind::ArgList {
            name,
            arguments: Box::new(arguments),
        }),
    ))
}

fn try_ident(stream: &mut TokenStream, source: &str, start: usize) -> Option<Production> {
    let name = expect_identifier(stream).ok()?;
    expect_symbol(stream, source, "=").ok()?;
    let rhs = expect_identifier(stream).ok()?;
    Some(Production::new(
        Span::new(start, rhs.end),
        ProductionKind::ExtendedAttribute(ExtendedAttributeKind::Ident { name, rhs }),
    ))
}

fn try_type_pair(stream: &mut TokenStream, source: &str, start: usize) -> Option<Production> {
    let name = expect_identifier(stream).ok()?;
    expect_symbol(stream, source, "(").ok()?;
    let first = parse_type(stream, source).ok()?;
    expect_symbol(stream, source, ",").ok()?;
    let second = parse_type(stream, source).ok()?;
    let close = expect_symbol(stream, source, ")").ok()?;
    Some(Production::new(
        Span::new(start, close.end),
        ProductionKind::ExtendedAttribute(ExtendedAttributeKind::TypePair {
            name,
            first: Box::new(first),
            second: Box::new(second),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn stream_for(text: &str) -> (Vec<crate::token::Token>, String) {
        (tokenize(text), text.to_string())
    }

    #[test]
    fn parses_primitive_type() {
        let (tokens, source) = stream_for("long");
        let mut stream = TokenStream::new(&tokens);
        let p = parse_type(&mut stream, &source).unwrap();
        assert_eq!(p.text(&source), "long");
        assert!(matches!(p.kind, ProductionKind::Type { nullable: false, .. }));
    }

    #[test]
    fn parses_unsigned_long_long() {
        let (tokens, source) = stream_for("unsigned long long");
        let mut stream = TokenStream::new(&tokens);
        let p = parse_type(&mut stream, &source).unwrap();
        assert_eq!(p.text(&source), "unsigned long long");
    }

    #[test]
    fn parses_nullable_sequence() {
        let (tokens, source) = stream_for("sequence<long>?");
        let mut stream = TokenStream::new(&tokens);
        let p = parse_type(&mut stream, &source).unwrap();
        assert_eq!(p.text(&source), "sequence<long>?");
        match p.kind {
            ProductionKind::Type { nullable, .. } => assert!(nullable),
            _ => panic!("expected Type"),
        }
    }

    #[test]
    fn parses_union_type() {
        let (tokens, source) = stream_for("(long or DOMString)");
        let mut stream = TokenStream::new(&tokens);
        let p = parse_type(&mut stream, &source).unwrap();
        assert_eq!(p.text(&source), "(long or DOMString)");
    }

    #[test]
    fn parses_default_string() {
        let (tokens, source) = stream_for(r#"= "hi""#);
        let mut stream = TokenStream::new(&tokens);
        let p = parse_default(&mut stream, &source).unwrap();
        assert_eq!(p.text(&source), r#"= "hi""#);
    }

    #[test]
    fn classifies_named_arg_list_attribute() {
        let (tokens, source) = stream_for("[Foo=Bar(long x)]");
        let mut stream = TokenStream::new(&tokens);
        let p = parse_extended_attribute_list(&mut stream, &source).unwrap();
        match p.kind {
            ProductionKind::ExtendedAttributeList(attrs) => {
                assert_eq!(attrs.len(), 1);
                assert!(matches!(
                    attrs[0].kind,
                    ProductionKind::ExtendedAttribute(ExtendedAttributeKind::NamedArgList { .. })
                ));
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn classifies_no_args_attribute() {
        let (tokens, source) = stream_for("[Replaceable]");
        let mut stream = TokenStream::new(&tokens);
        let p = parse_extended_attribute_list(&mut stream, &source).unwrap();
        match p.kind {
            ProductionKind::ExtendedAttributeList(attrs) => {
                assert!(matches!(
                    attrs[0].kind,
                    ProductionKind::ExtendedAttribute(ExtendedAttributeKind::NoArgs { .. })
                ));
            }
            _ => panic!("expected list"),
        }
    }
}

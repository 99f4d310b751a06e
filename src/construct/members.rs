//! Interface and dictionary member parsing (§4.3): const, attribute, operation,
//! iterable/maplike/setlike, stringifier/serializer, and dictionary members.
use super::syntax_error;
use super::{
    expect_identifier, expect_sym, is_kw, is_sym, AttributeBody, Construct, ConstBody,
    ConstructId, ConstructKind, DictMemberBody, IdlType, MarkupSpan, MethodLike, ParseContext,
};
use crate::production::{
    parse_argument_list, parse_const_value, parse_default, parse_extended_attribute_list,
    parse_type, peek_default, peek_extended_attribute_list, ProductionKind, Span,
};
use crate::tokenizer::TokenStream;

/// Parse every member of an interface/callback-interface or dictionary body, stopping at
/// the closing `}` (left unconsumed — the caller owns it) or end of input.
pub(crate) fn parse_member_list(
    stream: &mut TokenStream,
    ctx: &mut ParseContext,
    is_dictionary: bool,
) -> Vec<ConstructId> {
    let mut members = Vec::new();
    loop {
        if stream.is_eof() || is_sym(stream, ctx.source, "}") {
            break;
        }
        let id = if is_dictionary {
            parse_one_dict_member(stream, ctx)
        } else {
            parse_one_interface_member(stream, ctx)
        };
        members.push(id);
    }
    members
}

fn finish(
    ctx: &mut ParseContext,
    span: Span,
    idl_type: IdlType,
    name: Option<Span>,
    extended_attributes: Vec<ConstructId>,
    kind: ConstructKind,
    markup_spans: Vec<MarkupSpan>,
) -> ConstructId {
    ctx.push(Construct {
        idl_type,
        name,
        parent: None,
        extended_attributes,
        span,
        kind,
        markup_spans,
    })
}

fn parse_one_interface_member(stream: &mut TokenStream, ctx: &mut ParseContext) -> ConstructId {
    let start = stream.leading_trivia_start();
    let mark = stream.mark();
    match try_interface_member(stream, ctx, start) {
        Some(id) => id,
        None => {
            stream.restore(mark);
            let span = syntax_error::recover(stream, ctx.source, start);
            syntax_error::make(ctx, span, "could not parse interface member")
        }
    }
}

fn try_interface_member(
    stream: &mut TokenStream,
    ctx: &mut ParseContext,
    start: usize,
) -> Option<ConstructId> {
    let ea_production = if peek_extended_attribute_list(stream, ctx.source) {
        Some(parse_extended_attribute_list(stream, ctx.source).ok()?)
    } else {
        None
    };
    let ea_ids = ctx.lower_extended_attributes(&ea_production);
    let mut markup = ea_production
        .as_ref()
        .map(|p| vec![MarkupSpan::Production(p.clone())])
        .unwrap_or_default();

    if is_kw(stream, ctx.source, "const") {
        let kw = stream.consume();
        let type_ = parse_type(stream, ctx.source).ok()?;
        let name = expect_identifier(stream).ok()?;
        expect_sym(stream, ctx.source, "=").ok()?;
        let value = parse_const_value(stream, ctx.source).ok()?;
        let semi = expect_sym(stream, ctx.source, ";").ok()?;
        markup.push(MarkupSpan::Keyword(Span::new(kw.start, kw.end)));
        markup.push(MarkupSpan::Production(type_.clone()));
        markup.push(MarkupSpan::Name(name));
        return Some(finish(
            ctx,
            Span::new(start, semi.end),
            IdlType::Const,
            Some(name),
            ea_ids,
            ConstructKind::Const(ConstBody { type_, value }),
            markup,
        ));
    }

    if is_kw(stream, ctx.source, "stringifier") && peek_stringifier_bare(stream, ctx.source) {
        let kw = stream.consume();
        let semi = expect_sym(stream, ctx.source, ";").ok()?;
        markup.push(MarkupSpan::Keyword(Span::new(kw.start, kw.end)));
        return Some(finish(
            ctx,
            Span::new(start, semi.end),
            IdlType::Stringifier,
            None,
            ea_ids,
            ConstructKind::Stringifier,
            markup,
        ));
    }

    if is_kw(stream, ctx.source, "serializer") && peek_stringifier_bare(stream, ctx.source) {
        let kw = stream.consume();
        let semi = expect_sym(stream, ctx.source, ";").ok()?;
        markup.push(MarkupSpan::Keyword(Span::new(kw.start, kw.end)));
        return Some(finish(
            ctx,
            Span::new(start, semi.end),
            IdlType::Serializer,
            None,
            ea_ids,
            ConstructKind::Serializer,
            markup,
        ));
    }

    if is_kw(stream, ctx.source, "iterable") {
        let kw = stream.consume();
        expect_sym(stream, ctx.source, "<").ok()?;
        let key_type = parse_type(stream, ctx.source).ok()?;
        let value_type = if is_sym(stream, ctx.source, ",") {
            stream.consume();
            Some(parse_type(stream, ctx.source).ok()?)
        } else {
            None
        };
        expect_sym(stream, ctx.source, ">").ok()?;
        let semi = expect_sym(stream, ctx.source, ";").ok()?;
        markup.push(MarkupSpan::Keyword(Span::new(kw.start, kw.end)));
        markup.push(MarkupSpan::Production(key_type.clone()));
        if let Some(v) = &value_type {
            markup.push(MarkupSpan::Production(v.clone()));
        }
        return Some(finish(
            ctx,
            Span::new(start, semi.end),
            IdlType::Iterable,
            None,
            ea_ids,
            ConstructKind::Iterable { key_type, value_type },
            markup,
        ));
    }

    if is_kw(stream, ctx.source, "maplike") {
        let kw = stream.consume();
        expect_sym(stream, ctx.source, "<").ok()?;
        let key_type = parse_type(stream, ctx.source).ok()?;
        expect_sym(stream, ctx.source, ",").ok()?;
        let value_type = parse_type(stream, ctx.source).ok()?;
        expect_sym(stream, ctx.source, ">").ok()?;
        let semi = expect_sym(stream, ctx.source, ";").ok()?;
        markup.push(MarkupSpan::Keyword(Span::new(kw.start, kw.end)));
        markup.push(MarkupSpan::Production(key_type.clone()));
        markup.push(MarkupSpan::Production(value_type.clone()));
        return Some(finish(
            ctx,
            Span::new(start, semi.end),
            IdlType::Maplike,
            None,
            ea_ids,
            ConstructKind::Maplike { key_type, value_type },
            markup,
        ));
    }

    if is_kw(stream, ctx.source, "setlike") {
        let kw = stream.consume();
        expect_sym(stream, ctx.source, "<").ok()?;
        let value_type = parse_type(stream, ctx.source).ok()?;
        expect_sym(stream, ctx.source, ">").ok()?;
        let semi = expect_sym(stream, ctx.source, ";").ok()?;
        markup.push(MarkupSpan::Keyword(Span::new(kw.start, kw.end)));
        markup.push(MarkupSpan::Production(value_type.clone()));
        return Some(finish(
            ctx,
            Span::new(start, semi.end),
            IdlType::Setlike,
            None,
            ea_ids,
            ConstructKind::Setlike { value_type },
            markup,
        ));
    }

    // Attribute: ["readonly"] "attribute" Type Identifier ";"
    let readonly = if is_kw(stream, ctx.source, "readonly") {
        stream.consume();
        true
    } else {
        false
    };
    if is_kw(stream, ctx.source, "attribute") {
        let kw = stream.consume();
        let type_ = parse_type(stream, ctx.source).ok()?;
        let name = expect_identifier(stream).ok()?;
        let semi = expect_sym(stream, ctx.source, ";").ok()?;
        markup.push(MarkupSpan::Keyword(Span::new(kw.start, kw.end)));
        markup.push(MarkupSpan::Production(type_.clone()));
        markup.push(MarkupSpan::Name(name));
        return Some(finish(
            ctx,
            Span::new(start, semi.end),
            IdlType::Attribute,
            Some(name),
            ea_ids,
            ConstructKind::Attribute(AttributeBody { readonly, type_ }),
            markup,
        ));
    }
    if readonly {
        // "readonly" only ever prefixes "attribute"; anything else under it is malformed.
        return None;
    }

    // Operation: optional special qualifiers ("getter"/"setter"/"deleter"/"legacycaller"),
    // a return type, an optional name, and a parenthesized argument list.
    while matches!(
        stream.peek(1).kind,
        crate::token::TokenKind::Identifier
    ) && matches!(
        stream.peek(1).text(ctx.source),
        "getter" | "setter" | "deleter" | "legacycaller"
    ) {
        let t = stream.consume();
        markup.push(MarkupSpan::Keyword(Span::new(t.start, t.end)));
    }

    let return_type = parse_type(stream, ctx.source).ok()?;
    let name = if stream.peek(1).kind == crate::token::TokenKind::Identifier {
        Some(expect_identifier(stream).ok()?)
    } else {
        None
    };
    expect_sym(stream, ctx.source, "(").ok()?;
    let arg_list = parse_argument_list(stream, ctx.source).ok()?;
    expect_sym(stream, ctx.source, ")").ok()?;
    let semi = expect_sym(stream, ctx.source, ";").ok()?;

    let arguments = match arg_list.kind {
        ProductionKind::ArgumentList(args) => args,
        _ => Vec::new(),
    };
    note_legacy_directions(ctx, &arguments);

    markup.push(MarkupSpan::Production(return_type.clone()));
    if let Some(n) = name {
        markup.push(MarkupSpan::Name(n));
    }

    Some(finish(
        ctx,
        Span::new(start, semi.end),
        IdlType::Method,
        name,
        ea_ids,
        ConstructKind::Method(MethodLike {
            return_type,
            arguments,
        }),
        markup,
    ))
}

/// Report each argument that accepted a legacy `in`/`out` direction keyword.
pub(crate) fn note_legacy_directions(ctx: &ParseContext, arguments: &[crate::production::Production]) {
    for arg in arguments {
        if let ProductionKind::Argument {
            had_legacy_direction: true,
            name,
            ..
        } = &arg.kind
        {
            ctx.note(&format!(
                "legacy in/out argument direction keyword accepted on '{}'",
                name.text(ctx.source)
            ));
        }
    }
}

/// `true` when `stringifier`/`serializer` is followed immediately by `;` — the anonymous
/// form — rather than prefixing an operation or attribute.
fn peek_stringifier_bare(stream: &TokenStream, source: &str) -> bool {
    let t = stream.peek(2);
    t.kind == crate::token::TokenKind::Symbol && t.text(source) == ";"
}

fn parse_one_dict_member(stream: &mut TokenStream, ctx: &mut ParseContext) -> ConstructId {
    let start = stream.leading_trivia_start();
    let mark = stream.mark();
    match try_dict_member(stream, ctx, start) {
        Some(id) => id,
        None => {
            stream.restore(mark);
            let span = syntax_error::recover(stream, ctx.source, start);
            syntax_error::make(ctx, span, "could not parse dictionary member")
        }
    }
}

fn try_dict_member(
    stream: &mut TokenStream,
    ctx: &mut ParseContext,
    start: usize,
) -> Option<ConstructId> {
    let ea_production = if peek_extended_attribute_list(stream, ctx.source) {
        Some(parse_extended_attribute_list(stream, ctx.source).ok()?)
    } else {
        None
    };
    let ea_ids = ctx.lower_extended_attributes(&ea_production);
    let mut markup = ea_production
        .as_ref()
        .map(|p| vec![MarkupSpan::Production(p.clone())])
        .unwrap_or_default();

    let required = if is_kw(stream, ctx.source, "required") {
        stream.consume();
        true
    } else {
        false
    };

    let type_ = parse_type(stream, ctx.source).ok()?;
    let name = expect_identifier(stream).ok()?;
    let default = if peek_default(stream, ctx.source) {
        Some(parse_default(stream, ctx.source).ok()?)
    } else {
        None
    };
    let semi = expect_sym(stream, ctx.source, ";").ok()?;

    markup.push(MarkupSpan::Production(type_.clone()));
    markup.push(MarkupSpan::Name(name));

    Some(finish(
        ctx,
        Span::new(start, semi.end),
        IdlType::DictMember,
        Some(name),
        ea_ids,
        ConstructKind::DictMember(DictMemberBody {
            required,
            type_,
            default,
        }),
        markup,
    ))
}

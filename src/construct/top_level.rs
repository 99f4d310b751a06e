//! Top-level declaration parsing (§4.3): interface, dictionary, callback, enum, typedef,
//! and the legacy `implements`/`includes` statement.
use super::members::{note_legacy_directions, parse_member_list};
use super::syntax_error;
use super::{
    expect_identifier, expect_sym, is_kw, is_kw_at, is_sym, CallbackFunction, Construct,
    ConstructId, ConstructKind, DictionaryBody, ImplementsBody, InterfaceBody, IdlType,
    MarkupSpan, ParseContext, TypedefBody,
};
use crate::production::{
    parse_argument_list, parse_enum_value_list, parse_inheritance, parse_type,
    peek_inheritance, ExtendedAttributeKind, ProductionKind, Span,
};
use crate::tokenizer::TokenStream;

pub(crate) fn parse_top_level_construct(
    stream: &mut TokenStream,
    ctx: &mut ParseContext,
) -> Option<ConstructId> {
    if stream.is_eof() {
        return None;
    }
    let start = stream.leading_trivia_start();
    let mark = stream.mark();
    match try_top_level(stream, ctx, start) {
        Some(id) => Some(id),
        None => {
            stream.restore(mark);
            let span = syntax_error::recover(stream, ctx.source, start);
            Some(syntax_error::make(
                ctx,
                span,
                "could not parse top-level declaration",
            ))
        }
    }
}

fn try_top_level(
    stream: &mut TokenStream,
    ctx: &mut ParseContext,
    start: usize,
) -> Option<ConstructId> {
    let ea_production = if crate::production::peek_extended_attribute_list(stream, ctx.source) {
        Some(crate::production::parse_extended_attribute_list(stream, ctx.source).ok()?)
    } else {
        None
    };
    let ea_ids = ctx.lower_extended_attributes(&ea_production);
    let mut markup = ea_production
        .as_ref()
        .map(|p| vec![MarkupSpan::Production(p.clone())])
        .unwrap_or_default();

    let partial = if is_kw(stream, ctx.source, "partial") {
        stream.consume();
        true
    } else {
        false
    };

    if is_kw(stream, ctx.source, "callback") && is_kw_at(stream, ctx.source, 2, "interface") {
        let kw1 = stream.consume();
        let kw2 = stream.consume();
        let name = expect_identifier(stream).ok()?;
        let inheritance = if peek_inheritance(stream, ctx.source) {
            Some(parse_inheritance(stream, ctx.source).ok()?)
        } else {
            None
        };
        expect_sym(stream, ctx.source, "{").ok()?;
        let mut members = parse_member_list(stream, ctx, false);
        let end = match close_body(stream, ctx, &mut members) {
            BodyEnd::Brace(_) => expect_sym(stream, ctx.source, ";").ok()?.end,
            BodyEnd::Eof(end) => end,
        };
        markup.push(MarkupSpan::Keyword(Span::new(kw1.start, kw2.end)));
        markup.push(MarkupSpan::Name(name));
        for &m in &members {
            markup.push(MarkupSpan::Member(m));
        }
        return Some(finish(
            ctx,
            Span::new(start, end),
            IdlType::Callback,
            Some(name),
            ea_ids,
            ConstructKind::CallbackInterface(InterfaceBody {
                inheritance,
                constructors: Vec::new(),
                members,
                partial,
            }),
            markup,
        ));
    }

    if is_kw(stream, ctx.source, "callback") {
        let kw = stream.consume();
        let name = expect_identifier(stream).ok()?;
        expect_sym(stream, ctx.source, "=").ok()?;
        let return_type = parse_type(stream, ctx.source).ok()?;
        expect_sym(stream, ctx.source, "(").ok()?;
        let arg_list = parse_argument_list(stream, ctx.source).ok()?;
        expect_sym(stream, ctx.source, ")").ok()?;
        let semi = expect_sym(stream, ctx.source, ";").ok()?;
        let arguments = match arg_list.kind {
            ProductionKind::ArgumentList(args) => args,
            _ => Vec::new(),
        };
        note_legacy_directions(ctx, &arguments);
        markup.push(MarkupSpan::Keyword(Span::new(kw.start, kw.end)));
        markup.push(MarkupSpan::Name(name));
        markup.push(MarkupSpan::Production(return_type.clone()));
        return Some(finish(
            ctx,
            Span::new(start, semi.end),
            IdlType::Callback,
            Some(name),
            ea_ids,
            ConstructKind::Callback(CallbackFunction {
                return_type,
                arguments,
            }),
            markup,
        ));
    }

    if is_kw(stream, ctx.source, "interface") {
        let kw = stream.consume();
        let name = expect_identifier(stream).ok()?;
        let inheritance = if peek_inheritance(stream, ctx.source) {
            Some(parse_inheritance(stream, ctx.source).ok()?)
        } else {
            None
        };
        expect_sym(stream, ctx.source, "{").ok()?;
        let mut parsed_members = parse_member_list(stream, ctx, false);
        let end = match close_body(stream, ctx, &mut parsed_members) {
            BodyEnd::Brace(_) => expect_sym(stream, ctx.source, ";").ok()?.end,
            BodyEnd::Eof(end) => end,
        };

        // Constructors are a derived view over the interface's own `[Constructor(...)]`
        // extended attribute, whose text is already covered by the `Production` markup
        // span pushed above; they don't get their own `Member` span here or their span
        // (reused from the extended attribute) would be walked a second time.
        let constructors = extract_constructors(ctx, &ea_ids);

        markup.push(MarkupSpan::Keyword(Span::new(kw.start, kw.end)));
        markup.push(MarkupSpan::Name(name));
        for &m in &parsed_members {
            markup.push(MarkupSpan::Member(m));
        }

        let mut members = parsed_members;
        for &c in constructors.iter().rev() {
            members.insert(0, c);
        }

        return Some(finish(
            ctx,
            Span::new(start, end),
            IdlType::Interface,
            Some(name),
            ea_ids,
            ConstructKind::Interface(InterfaceBody {
                inheritance,
                constructors,
                members,
                partial,
            }),
            markup,
        ));
    }

    if is_kw(stream, ctx.source, "dictionary") {
        let kw = stream.consume();
        let name = expect_identifier(stream).ok()?;
        let inheritance = if peek_inheritance(stream, ctx.source) {
            Some(parse_inheritance(stream, ctx.source).ok()?)
        } else {
            None
        };
        expect_sym(stream, ctx.source, "{").ok()?;
        let mut members = parse_member_list(stream, ctx, true);
        let end = match close_body(stream, ctx, &mut members) {
            BodyEnd::Brace(_) => expect_sym(stream, ctx.source, ";").ok()?.end,
            BodyEnd::Eof(end) => end,
        };
        markup.push(MarkupSpan::Keyword(Span::new(kw.start, kw.end)));
        markup.push(MarkupSpan::Name(name));
        for &m in &members {
            markup.push(MarkupSpan::Member(m));
        }
        return Some(finish(
            ctx,
            Span::new(start, end),
            IdlType::Dictionary,
            Some(name),
            ea_ids,
            ConstructKind::Dictionary(DictionaryBody {
                inheritance,
                members,
                partial,
            }),
            markup,
        ));
    }

    if is_kw(stream, ctx.source, "enum") {
        let kw = stream.consume();
        let name = expect_identifier(stream).ok()?;
        let values = parse_enum_value_list(stream, ctx.source).ok()?;
        let semi = expect_sym(stream, ctx.source, ";").ok()?;
        markup.push(MarkupSpan::Keyword(Span::new(kw.start, kw.end)));
        markup.push(MarkupSpan::Name(name));
        if let ProductionKind::EnumValueList(spans) = &values.kind {
            for s in spans {
                markup.push(MarkupSpan::EnumValue(*s));
            }
        }
        return Some(finish(
            ctx,
            Span::new(start, semi.end),
            IdlType::Enum,
            Some(name),
            ea_ids,
            ConstructKind::Enum { values },
            markup,
        ));
    }

    if is_kw(stream, ctx.source, "typedef") {
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
            IdlType::Typedef,
            Some(name),
            ea_ids,
            ConstructKind::Typedef(TypedefBody { type_ }),
            markup,
        ));
    }

    // Legacy `A implements B;` / modern `A includes B;`. The extended attribute list
    // parsed above (if any) belongs to this statement itself, per the resolved open
    // question on implements/includes attachment.
    if is_kw_at(stream, ctx.source, 2, "implements") || is_kw_at(stream, ctx.source, 2, "includes")
    {
        let name = expect_identifier(stream).ok()?;
        let is_includes = is_kw(stream, ctx.source, "includes");
        let kw = stream.consume();
        let target = expect_identifier(stream).ok()?;
        let semi = expect_sym(stream, ctx.source, ";").ok()?;
        if !is_includes {
            ctx.note("legacy 'implements' statement accepted; equivalent to 'includes'");
        }
        markup.push(MarkupSpan::Name(name));
        markup.push(MarkupSpan::Keyword(Span::new(kw.start, kw.end)));
        markup.push(MarkupSpan::Name(target));
        let idl_type = if is_includes {
            IdlType::Includes
        } else {
            IdlType::Implements
        };
        let kind = if is_includes {
            ConstructKind::Includes(ImplementsBody { target })
        } else {
            ConstructKind::Implements(ImplementsBody { target })
        };
        return Some(finish(
            ctx,
            Span::new(start, semi.end),
            idl_type,
            Some(name),
            ea_ids,
            kind,
            markup,
        ));
    }

    None
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

/// Where a brace-delimited body (interface/dictionary/callback interface) ended.
enum BodyEnd {
    /// The closing `}` was found; callers still need to consume the trailing `;`.
    Brace(usize),
    /// End of input was reached before `}`. The body is closed implicitly.
    Eof(usize),
}

/// Consume the `}` that closes an interface/dictionary/callback-interface body.
/// `parse_member_list` only stops at `}` or end of input, so if `}` isn't there, input
/// ran out first: the body is closed implicitly, a `SyntaxError` member captures the
/// (possibly empty) remaining tokens, and `warn` fires — per the unterminated-construct
/// policy, instead of discarding every member already parsed.
fn close_body(
    stream: &mut TokenStream,
    ctx: &mut ParseContext,
    members: &mut Vec<ConstructId>,
) -> BodyEnd {
    if stream.is_eof() {
        let tail_start = stream.leading_trivia_start();
        let span = syntax_error::recover(stream, ctx.source, tail_start);
        let id = syntax_error::make(
            ctx,
            span,
            "unterminated construct: reached end of input before closing '}'",
        );
        members.push(id);
        BodyEnd::Eof(span.end)
    } else {
        let close = stream.consume();
        BodyEnd::Brace(close.end)
    }
}

/// Pull `[Constructor(...)]`/`[LegacyFactoryFunction(...)]` attributes off an interface's
/// own extended-attribute list and turn each into a `Constructor` construct.
fn extract_constructors(ctx: &mut ParseContext, ea_ids: &[ConstructId]) -> Vec<ConstructId> {
    let mut constructors = Vec::new();
    for &id in ea_ids {
        let (name_text, arguments, span) = {
            let c = &ctx.arena[id.0];
            let name_text = c.name.map(|s| s.text(ctx.source).to_string());
            let arguments = match &c.kind {
                ConstructKind::ExtendedAttribute(ExtendedAttributeKind::ArgList {
                    arguments,
                    ..
                })
                | ConstructKind::ExtendedAttribute(ExtendedAttributeKind::NamedArgList {
                    arguments,
                    ..
                }) => match &arguments.kind {
                    ProductionKind::ArgumentList(args) => args.clone(),
                    _ => Vec::new(),
                },
                _ => Vec::new(),
            };
            (name_text, arguments, c.span)
        };
        if matches!(name_text.as_deref(), Some("Constructor") | Some("LegacyFactoryFunction")) {
            let ctor_id = ctx.push(Construct {
                idl_type: IdlType::Constructor,
                name: None,
                parent: None,
                extended_attributes: Vec::new(),
                span,
                kind: ConstructKind::Constructor(arguments),
                markup_spans: vec![MarkupSpan::Keyword(span)],
            });
            constructors.push(ctor_id);
        }
    }
    constructors
}

//! The markup driver (§4.5): walks constructs and their productions in source order,
//! invoking optional marker callbacks per named syntactic element and filling every gap
//! between marked regions with `marker.encode`, so markup identity holds even over
//! whitespace and comments the grammar itself ignores.
use crate::construct::{Construct, ConstructId, MarkupSpan};
use crate::production::{MarkupKind, Production};
use crate::Parser;

/// A `(prefix, suffix)` pair wrapping a marked span. `None` means "nothing to add here".
pub type Wrap = (Option<String>, Option<String>);

const NO_WRAP: Wrap = (None, None);

/// Caller-supplied annotation hooks. Every method is optional and defaults to a no-op;
/// implement only the categories you care about. `encode` is the one non-optional hook
/// in spirit — its default is the identity function, which is what makes the no-op
/// marker reproduce the original input exactly.
pub trait Marker {
    fn construct(&self, _text: &str, _construct: &Construct) -> Wrap {
        NO_WRAP
    }
    fn name(&self, _text: &str, _construct: &Construct) -> Wrap {
        NO_WRAP
    }
    fn type_(&self, _text: &str, _construct: &Construct) -> Wrap {
        NO_WRAP
    }
    fn primitive_type(&self, _text: &str, _construct: &Construct) -> Wrap {
        NO_WRAP
    }
    fn buffer_type(&self, _text: &str, _construct: &Construct) -> Wrap {
        NO_WRAP
    }
    fn string_type(&self, _text: &str, _construct: &Construct) -> Wrap {
        NO_WRAP
    }
    fn object_type(&self, _text: &str, _construct: &Construct) -> Wrap {
        NO_WRAP
    }
    fn type_name(&self, _text: &str, _construct: &Construct) -> Wrap {
        NO_WRAP
    }
    fn keyword(&self, _text: &str, _construct: &Construct) -> Wrap {
        NO_WRAP
    }
    fn enum_value(&self, _text: &str, _construct: &Construct) -> Wrap {
        NO_WRAP
    }
    fn encode(&self, text: &str) -> String {
        text.to_string()
    }
}

pub(crate) fn render(parser: &Parser, marker: &dyn Marker) -> String {
    let source = parser.serialize();
    let mut out = String::new();
    let mut cursor = 0usize;
    for &id in parser.top_level_ids() {
        let construct = parser.construct(id);
        emit_gap(&mut out, source, cursor, construct.span.start, marker);
        walk_construct(parser, id, source, marker, &mut out);
        cursor = construct.span.end;
    }
    emit_gap(&mut out, source, cursor, source.len(), marker);
    out
}

fn walk_construct(
    parser: &Parser,
    id: ConstructId,
    source: &str,
    marker: &dyn Marker,
    out: &mut String,
) {
    let construct = parser.construct(id);
    let (prefix, suffix) = marker.construct(construct.text(source), construct);
    if let Some(p) = prefix {
        out.push_str(&p);
    }

    let mut cursor = construct.span.start;
    for span_item in &construct.markup_spans {
        match span_item {
            MarkupSpan::Keyword(s) => {
                emit_gap(out, source, cursor, s.start, marker);
                emit_leaf(out, s.text(source), construct, marker, |m, t, c| {
                    m.keyword(t, c)
                });
                cursor = s.end;
            }
            MarkupSpan::Name(s) => {
                emit_gap(out, source, cursor, s.start, marker);
                emit_leaf(out, s.text(source), construct, marker, |m, t, c| m.name(t, c));
                cursor = s.end;
            }
            MarkupSpan::EnumValue(s) => {
                emit_gap(out, source, cursor, s.start, marker);
                emit_leaf(out, s.text(source), construct, marker, |m, t, c| {
                    m.enum_value(t, c)
                });
                cursor = s.end;
            }
            MarkupSpan::Production(prod) => {
                emit_gap(out, source, cursor, prod.span.start, marker);
                walk_production(prod, construct, marker, out, source);
                cursor = prod.span.end;
            }
            MarkupSpan::Member(member_id) => {
                let member = parser.construct(*member_id);
                emit_gap(out, source, cursor, member.span.start, marker);
                walk_construct(parser, *member_id, source, marker, out);
                cursor = member.span.end;
            }
        }
    }
    emit_gap(out, source, cursor, construct.span.end, marker);

    if let Some(s) = suffix {
        out.push_str(&s);
    }
}

fn emit_leaf(
    out: &mut String,
    text: &str,
    construct: &Construct,
    marker: &dyn Marker,
    method: impl Fn(&dyn Marker, &str, &Construct) -> Wrap,
) {
    let (prefix, suffix) = method(marker, text, construct);
    if let Some(p) = prefix {
        out.push_str(&p);
    }
    out.push_str(text);
    if let Some(s) = suffix {
        out.push_str(&s);
    }
}

fn walk_production(
    prod: &Production,
    construct: &Construct,
    marker: &dyn Marker,
    out: &mut String,
    source: &str,
) {
    let text = prod.text(source);
    let (prefix, suffix) = match prod.markup_kind() {
        Some(MarkupKind::Type) => marker.type_(text, construct),
        Some(MarkupKind::PrimitiveType) => marker.primitive_type(text, construct),
        Some(MarkupKind::StringType) => marker.string_type(text, construct),
        Some(MarkupKind::BufferType) => marker.buffer_type(text, construct),
        Some(MarkupKind::ObjectType) => marker.object_type(text, construct),
        Some(MarkupKind::TypeName) => marker.type_name(text, construct),
        _ => NO_WRAP,
    };
    if let Some(p) = prefix {
        out.push_str(&p);
    }

    let children = prod.children();
    if children.is_empty() {
        out.push_str(text);
    } else {
        let mut cursor = prod.span.start;
        for child in children {
            emit_gap(out, source, cursor, child.span.start, marker);
            walk_production(child, construct, marker, out, source);
            cursor = child.span.end;
        }
        emit_gap(out, source, cursor, prod.span.end, marker);
    }

    if let Some(s) = suffix {
        out.push_str(&s);
    }
}

fn emit_gap(out: &mut String, source: &str, from: usize, to: usize, marker: &dyn Marker) {
    if to > from {
        out.push_str(&marker.encode(&source[from..to]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Parser;

    struct NoOp;
    impl Marker for NoOp {}

    #[test]
    fn no_op_marker_reproduces_input() {
        let text = "interface Foo { attribute long bar; };";
        let parser = Parser::new(Some(text), None);
        assert_eq!(parser.markup(&NoOp), text);
    }

    struct Wrapping;
    impl Marker for Wrapping {
        fn keyword(&self, _text: &str, _construct: &Construct) -> Wrap {
            (Some("<kw>".to_string()), Some("</kw>".to_string()))
        }
    }

    #[test]
    fn keyword_marker_wraps_keyword_text_only() {
        let text = "typedef long MyLong;";
        let parser = Parser::new(Some(text), None);
        let marked = parser.markup(&Wrapping);
        assert!(marked.contains("<kw>typedef</kw>"));
        assert!(marked.ends_with(';'));
    }
}

//! Error recovery (§4.3): when a member or top-level declaration fails to parse, the
//! cursor is rewound to the failure point and tokens are absorbed up to the next
//! synchronization point, producing a `SyntaxError` construct instead of aborting.
use super::{Construct, ConstructId, ConstructKind, IdlType, MarkupSpan, ParseContext};
use crate::error::SyntaxDiagnostic;
use crate::production::Span;
use crate::token::TokenKind;
use crate::tokenizer::TokenStream;

/// Absorb tokens from the current cursor up to (and including) the next `;` at
/// brace-depth zero, or up to — but not including — the next unmatched `}`, whichever
/// comes first. Brace/paren/bracket nesting opened inside the skipped run is tracked so a
/// `;` inside a nested `{ ... }` doesn't end recovery early.
pub(crate) fn recover(stream: &mut TokenStream, source: &str, start: usize) -> Span {
    let mut depth = 0i32;
    let mut end = start;
    loop {
        let t = stream.peek(1);
        if t.kind == TokenKind::EndOfInput {
            end = t.start;
            break;
        }
        if t.kind == TokenKind::Symbol {
            match t.text(source) {
                "{" | "(" | "[" => depth += 1,
                "}" if depth == 0 => {
                    end = t.start;
                    break;
                }
                "}" | ")" | "]" => depth -= 1,
                ";" if depth == 0 => {
                    let tok = stream.consume();
                    end = tok.end;
                    break;
                }
                _ => {}
            }
        }
        stream.consume();
        end = t.end;
    }
    Span::new(start, end.max(start))
}

/// Build the `SyntaxError` construct for a skipped span and report it through `warn`.
pub(crate) fn make(ctx: &mut ParseContext, span: Span, reason: &str) -> ConstructId {
    let diagnostic = SyntaxDiagnostic::new(
        span.start,
        format!("{} (skipped {:?})", reason, span.text(ctx.source)),
    );
    ctx.warn(&format!("{} at {}", diagnostic, diagnostic.at(ctx.source)));
    ctx.push(Construct {
        idl_type: IdlType::SyntaxError,
        name: None,
        parent: None,
        extended_attributes: Vec::new(),
        span,
        kind: ConstructKind::SyntaxError { diagnostic },
        markup_spans: vec![MarkupSpan::Keyword(span)],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    #[test]
    fn recovers_to_next_semicolon() {
        let source = "garbage; attribute long bar;";
        let tokens = tokenize(source);
        let mut stream = TokenStream::new(&tokens);
        let span = recover(&mut stream, source, 0);
        assert_eq!(span.text(source), "garbage;");
    }

    #[test]
    fn recovers_to_closing_brace_without_consuming_it() {
        let source = "garbage }";
        let tokens = tokenize(source);
        let mut stream = TokenStream::new(&tokens);
        let span = recover(&mut stream, source, 0);
        assert_eq!(span.text(source), "garbage ");
        assert!(stream.peek(1).text(source) == "}");
    }
}

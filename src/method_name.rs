//! Method-name canonicalization (§4.4): a method's identity for search and overload
//! resolution is its name plus its argument names, not its types — two methods with the
//! same name and argument-name list but different types are indistinguishable here, which
//! matches how the parser's own path resolution treats them.
use crate::production::{Production, ProductionKind, Span};

struct ArgInfo {
    name: Span,
    optional: bool,
    variadic: bool,
}

fn arg_info(p: &Production) -> Option<ArgInfo> {
    match &p.kind {
        ProductionKind::Argument {
            optional,
            variadic,
            name,
            ..
        } => Some(ArgInfo {
            name: *name,
            optional: *optional,
            variadic: *variadic,
        }),
        _ => None,
    }
}

/// All legal argument-count variants, full form first, dropping trailing optional or
/// variadic arguments one at a time until a required argument blocks further dropping.
/// WebIDL only allows optional/variadic arguments to trail required ones, so this
/// enumerates exactly the combinations the grammar permits — no subset search needed.
pub fn normalized_method_names(name: &str, arguments: &[Production], source: &str) -> Vec<String> {
    let infos: Vec<ArgInfo> = arguments.iter().filter_map(arg_info).collect();
    let mut variants = Vec::new();
    let mut count = infos.len();
    loop {
        let joined = infos[..count]
            .iter()
            .map(|a| a.name.text(source))
            .collect::<Vec<_>>()
            .join(", ");
        variants.push(format!("{}({})", name, joined));
        if count == 0 {
            break;
        }
        let last = &infos[count - 1];
        if last.optional || last.variadic {
            count -= 1;
        } else {
            break;
        }
    }
    variants
}

pub fn normalized_method_name(name: &str, arguments: &[Production], source: &str) -> String {
    normalized_method_names(name, arguments, source)
        .into_iter()
        .next()
        .unwrap_or_else(|| format!("{}()", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::production::parse_argument_list;
    use crate::tokenizer::{tokenize, TokenStream};

    fn args(text: &str) -> (Vec<Production>, String) {
        let tokens = tokenize(text);
        let mut stream = TokenStream::new(&tokens);
        let list = parse_argument_list(&mut stream, text).unwrap();
        match list.kind {
            ProductionKind::ArgumentList(args) => (args, text.to_string()),
            _ => unreachable!(),
        }
    }

    #[test]
    fn drops_trailing_optional_argument() {
        let (args, source) = args("long x, optional long y");
        let names = normalized_method_names("draw", &args, &source);
        assert_eq!(names, vec!["draw(x, y)".to_string(), "draw(x)".to_string()]);
    }

    #[test]
    fn full_form_is_first_variant() {
        let (args, source) = args("long x, optional long y");
        let names = normalized_method_names("draw", &args, &source);
        assert_eq!(normalized_method_name("draw", &args, &source), names[0]);
    }

    #[test]
    fn no_arguments_yields_empty_parens() {
        let (args, source) = args("");
        assert_eq!(normalized_method_names("tick", &args, &source), vec!["tick()"]);
    }
}

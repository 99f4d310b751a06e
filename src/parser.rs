//! The parser façade (§6): owns the shared source buffer and construct arena, dispatches
//! top-level parsing, and answers find/markup/serialize queries against the result.
use crate::construct::{parse_top_level_construct, Construct, ConstructId, IdlType, ParseContext};
use crate::error::ParserError;
use crate::markup::{render, Marker};
use crate::token::Token;
use crate::tokenizer::{tokenize, TokenStream};

/// Diagnostics routed from the parser to the caller. Neither method aborts parsing —
/// both are purely informational (§6, §7).
pub trait ParserDelegate {
    /// A grammar mismatch or unterminated construct was recovered from.
    fn warn(&self, message: &str);
    /// A legacy, non-standard form was accepted and translated to its modern equivalent.
    fn note(&self, message: &str);
}

/// A WebIDL parser. Owns one growing source buffer; every `parse` call appends to it, so
/// constructs and productions can reference the input by byte offset without ever holding
/// a borrowed lifetime back to the caller.
pub struct Parser {
    source: String,
    arena: Vec<Construct>,
    top_level: Vec<ConstructId>,
    delegate: Option<Box<dyn ParserDelegate>>,
}

impl Parser {
    pub fn new(initial_text: Option<&str>, delegate: Option<Box<dyn ParserDelegate>>) -> Self {
        let mut parser = Parser {
            source: String::new(),
            arena: Vec::new(),
            top_level: Vec::new(),
            delegate,
        };
        if let Some(text) = initial_text {
            parser.parse(text);
        }
        parser
    }

    /// Append `text` to the source buffer and parse the top-level constructs it
    /// contributes, appending them to [`constructs`](Self::constructs).
    pub fn parse(&mut self, text: &str) {
        let base = self.source.len();
        self.source.push_str(text);

        let mut tokens: Vec<Token> = tokenize(text);
        for token in &mut tokens {
            token.start += base;
            token.end += base;
        }
        let mut stream = TokenStream::new(&tokens);

        loop {
            let mut ctx = ParseContext {
                source: &self.source,
                arena: &mut self.arena,
                delegate: self.delegate.as_deref(),
            };
            let Some(id) = parse_top_level_construct(&mut stream, &mut ctx) else {
                break;
            };
            assign_parents(&mut self.arena, id);
            self.top_level.push(id);
        }
    }

    pub fn reset(&mut self) {
        self.source.clear();
        self.arena.clear();
        self.top_level.clear();
    }

    /// Top-level constructs in source order. Not a contiguous arena slice — constructs
    /// are stored in construction order (members before the construct that owns them) —
    /// so this collects references rather than returning `&[Construct]` directly.
    pub fn constructs(&self) -> Vec<&Construct> {
        self.top_level.iter().map(|id| &self.arena[id.0]).collect()
    }

    pub(crate) fn top_level_ids(&self) -> &[ConstructId] {
        &self.top_level
    }

    pub(crate) fn construct(&self, id: ConstructId) -> &Construct {
        &self.arena[id.0]
    }

    pub fn complexity_factor(&self) -> u64 {
        self.top_level
            .iter()
            .map(|id| self.arena[id.0].complexity_factor(&self.arena))
            .sum()
    }

    pub fn find(&self, path: &str) -> Option<&Construct> {
        self.find_all(path).into_iter().next()
    }

    pub fn find_all(&self, path: &str) -> Vec<&Construct> {
        self.try_find_all(path).unwrap_or_default()
    }

    /// Fallible variant surfacing [`ParserError::EmptyPath`] for a malformed path, rather
    /// than silently treating it as "no match" the way [`find_all`](Self::find_all) does.
    pub fn try_find_all(&self, path: &str) -> Result<Vec<&Construct>, ParserError> {
        let segments: Vec<&str> = path
            .split(|c| c == '/' || c == '.')
            .filter(|s| !s.is_empty())
            .collect();
        if segments.is_empty() {
            return Err(ParserError::EmptyPath);
        }

        let mut frontier: Vec<ConstructId> = self.top_level.clone();
        let mut matched: Vec<ConstructId> = Vec::new();
        for (i, segment) in segments.iter().enumerate() {
            matched = frontier
                .iter()
                .copied()
                .filter(|id| segment_matches(&self.arena[id.0], segment, &self.source))
                .collect();
            if i + 1 < segments.len() {
                frontier = matched
                    .iter()
                    .flat_map(|id| self.arena[id.0].members().to_vec())
                    .collect();
            }
        }
        Ok(matched.into_iter().map(|id| &self.arena[id.0]).collect())
    }

    pub fn normalized_method_name(
        &self,
        name: &str,
        interface_name: Option<&str>,
    ) -> Option<String> {
        self.normalized_method_names(name, interface_name)
            .and_then(|v| v.into_iter().next())
    }

    pub fn normalized_method_names(
        &self,
        name: &str,
        interface_name: Option<&str>,
    ) -> Option<Vec<String>> {
        if let Some(open) = name.find('(') {
            let base = &name[..open];
            let close = name.rfind(')')?;
            let args: Vec<&str> = name[open + 1..close]
                .split(',')
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect();
            return Some(vec![format!("{}({})", base, args.join(", "))]);
        }

        for construct in self.method_constructs(interface_name) {
            if construct.name_text(&self.source) == Some(name) {
                let names = construct.method_names(&self.source);
                if !names.is_empty() {
                    return Some(names);
                }
            }
        }
        None
    }

    fn method_constructs(&self, interface_name: Option<&str>) -> Vec<&Construct> {
        let mut out = Vec::new();
        for &top_id in &self.top_level {
            let top = &self.arena[top_id.0];
            if let Some(wanted) = interface_name {
                if top.name_text(&self.source) != Some(wanted) {
                    continue;
                }
            }
            for &member_id in top.members() {
                let member = &self.arena[member_id.0];
                if matches!(member.idl_type, IdlType::Method | IdlType::Constructor) {
                    out.push(member);
                }
            }
        }
        out
    }

    pub fn markup(&self, marker: &dyn Marker) -> String {
        render(self, marker)
    }

    pub fn serialize(&self) -> &str {
        &self.source
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.get_by_name(name).is_some()
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Construct> {
        self.top_level
            .iter()
            .map(|id| &self.arena[id.0])
            .find(|c| c.name_text(&self.source) == Some(name))
    }

    pub fn len(&self) -> usize {
        self.top_level.len()
    }

    pub fn is_empty(&self) -> bool {
        self.top_level.is_empty()
    }
}

impl std::ops::Index<usize> for Parser {
    type Output = Construct;

    fn index(&self, index: usize) -> &Construct {
        &self.arena[self.top_level[index].0]
    }
}

fn segment_matches(construct: &Construct, segment: &str, source: &str) -> bool {
    if construct.name_text(source) == Some(segment) {
        return true;
    }
    if construct.method_names(source).iter().any(|m| m == segment) {
        return true;
    }
    construct.idl_type.tag() == segment
}

/// Wire up parent back-links for everything `id` owns, recursively. Run once per
/// freshly-parsed top-level construct since construct-layer parsing itself leaves
/// `parent` unset (it has no [ConstructId] for an ancestor that doesn't exist yet).
fn assign_parents(arena: &mut [Construct], id: ConstructId) {
    let children: Vec<ConstructId> = {
        let construct = &arena[id.0];
        let mut ids = construct.extended_attributes.clone();
        ids.extend(construct.members().iter().copied());
        ids
    };
    for child in children {
        arena[child.0].parent = Some(id);
        assign_parents(arena, child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_attribute_by_path() {
        let parser = Parser::new(Some("interface Foo { attribute long bar; };"), None);
        let found = parser.find("Foo/bar").expect("attribute found");
        assert_eq!(found.idl_type.tag(), "attribute");
    }

    #[test]
    fn round_trips_exactly() {
        let text = "interface Foo { attribute long bar; };";
        let parser = Parser::new(Some(text), None);
        assert_eq!(parser.serialize(), text);
    }

    #[test]
    fn complexity_factor_is_additive() {
        let parser = Parser::new(Some("interface Foo { attribute long bar; };"), None);
        let expected: u64 = parser
            .constructs()
            .iter()
            .map(|c| c.complexity_factor(&parser.arena))
            .sum();
        assert_eq!(parser.complexity_factor(), expected);
    }

    #[test]
    fn method_overload_names_drop_trailing_optional() {
        let parser = Parser::new(
            Some("interface Foo { void draw(long x, optional long y); };"),
            None,
        );
        let names = parser
            .normalized_method_names("draw", Some("Foo"))
            .unwrap();
        assert_eq!(names, vec!["draw(x, y)".to_string(), "draw(x)".to_string()]);
    }

    #[test]
    fn malformed_member_recovers_and_keeps_following_member() {
        let parser = Parser::new(
            Some("interface Foo { garbage; attribute long bar; };"),
            None,
        );
        let foo = parser.get_by_name("Foo").unwrap();
        assert_eq!(foo.members().len(), 2);
        assert!(parser.find("Foo/bar").is_some());
    }

    #[test]
    fn empty_input_yields_no_constructs() {
        let parser = Parser::new(Some(""), None);
        assert!(parser.is_empty());
        assert_eq!(parser.serialize(), "");
    }
}

//! End-to-end scenarios and universal invariants exercised against the public `Parser`
//! API, one test per concrete scenario plus the cross-cutting invariants.
use std::cell::RefCell;
use std::rc::Rc;
use webidl_pt::construct::ConstructKind;
use webidl_pt::{Marker, Parser, ParserDelegate};

struct RecordingDelegate {
    warnings: Rc<RefCell<Vec<String>>>,
}

impl ParserDelegate for RecordingDelegate {
    fn warn(&self, message: &str) {
        self.warnings.borrow_mut().push(message.to_string());
    }
    fn note(&self, _message: &str) {}
}

struct NoOp;
impl Marker for NoOp {}

#[test]
fn scenario_interface_with_attribute() {
    let parser = Parser::new(Some("interface Foo { attribute long bar; };"), None);
    let foo = parser.find("Foo").expect("interface found");
    assert_eq!(foo.idl_type.tag(), "interface");
    assert_eq!(foo.members().len(), 1);
    let bar = parser.find("Foo/bar").expect("attribute found");
    assert_eq!(bar.idl_type.tag(), "attribute");
    assert_eq!(bar.name_text(parser.serialize()), Some("bar"));
}

#[test]
fn scenario_constructor_extended_attribute() {
    let text = "[Constructor(long x)] interface Foo { };";
    let parser = Parser::new(Some(text), None);
    let foo = parser.find("Foo").expect("interface found");
    assert_eq!(foo.members().len(), 1);
    let ctor = parser
        .find("Foo/constructor")
        .expect("constructor reachable by tag");
    assert_eq!(ctor.idl_type.tag(), "constructor");
    assert_eq!(ctor.method_names(parser.serialize()), vec!["constructor(x)"]);
    assert_eq!(parser.markup(&NoOp), text);
}

#[test]
fn scenario_method_overload_names() {
    let parser = Parser::new(
        Some("interface Foo { void draw(long x, optional long y); };"),
        None,
    );
    let names = parser
        .normalized_method_names("draw", Some("Foo"))
        .expect("method found");
    assert_eq!(names, vec!["draw(x, y)".to_string(), "draw(x)".to_string()]);
}

#[test]
fn scenario_dictionary_with_inheritance_and_default() {
    let text = r#"dictionary D : Base { required long x; DOMString y = "hi"; };"#;
    let parser = Parser::new(Some(text), None);
    let d = parser.find("D").expect("dictionary found");
    assert_eq!(d.idl_type.tag(), "dictionary");
    assert_eq!(d.members().len(), 2);

    let x = parser.find("D/x").expect("member x found");
    match &x.kind {
        ConstructKind::DictMember(body) => {
            assert!(body.required);
            assert!(body.default.is_none());
        }
        _ => panic!("expected dict member"),
    }

    let y = parser.find("D/y").expect("member y found");
    match &y.kind {
        ConstructKind::DictMember(body) => {
            assert!(!body.required);
            let default = body.default.as_ref().expect("default present");
            assert_eq!(default.text(parser.serialize()), r#"= "hi""#);
        }
        _ => panic!("expected dict member"),
    }
}

#[test]
fn scenario_callback_function() {
    let text = "callback C = void (long x);";
    let parser = Parser::new(Some(text), None);
    let c = parser.find("C").expect("callback found");
    assert_eq!(c.idl_type.tag(), "callback");
    assert!(!c.has_parent());
    match &c.kind {
        ConstructKind::Callback(f) => {
            assert_eq!(f.return_type.text(parser.serialize()), "void");
            assert_eq!(f.arguments.len(), 1);
        }
        _ => panic!("expected callback"),
    }
}

#[test]
fn scenario_syntax_error_recovery_keeps_following_member() {
    let warnings = Rc::new(RefCell::new(Vec::new()));
    let delegate = RecordingDelegate {
        warnings: warnings.clone(),
    };
    let text = "interface Foo { garbage; attribute long bar; };";
    let parser = Parser::new(Some(text), Some(Box::new(delegate)));
    let foo = parser.find("Foo").expect("interface found");
    assert_eq!(foo.members().len(), 2);
    assert!(parser.find("Foo/bar").is_some());
    assert_eq!(parser.serialize(), text);
    assert_eq!(warnings.borrow().len(), 1);
}

#[test]
fn invariant_round_trip_identity() {
    let text = "interface Foo { attribute long bar; const long BAZ = 1; };";
    let parser = Parser::new(Some(text), None);
    assert_eq!(parser.serialize(), text);
}

#[test]
fn invariant_markup_identity_with_no_op_marker() {
    let text = "dictionary D : Base { required long x; DOMString y = \"hi\"; };";
    let parser = Parser::new(Some(text), None);
    assert_eq!(parser.markup(&NoOp), text);
}

#[test]
fn invariant_name_reachability() {
    let text = "interface Foo { attribute long bar; void draw(long x); };";
    let parser = Parser::new(Some(text), None);
    assert!(parser.find("Foo").is_some());
    assert!(parser.find("Foo/bar").is_some());
    assert!(parser.find("Foo/draw").is_some());
}

#[test]
fn invariant_complexity_grows_with_member_count() {
    let one_member = Parser::new(Some("interface Foo { attribute long bar; };"), None);
    let two_members = Parser::new(
        Some("interface Foo { attribute long bar; attribute long baz; };"),
        None,
    );
    assert!(two_members.complexity_factor() > one_member.complexity_factor());
}

#[test]
fn invariant_method_name_canonicality() {
    let parser = Parser::new(
        Some("interface Foo { void draw(long x, optional long y, optional long z); };"),
        None,
    );
    let draw = parser.find("Foo/draw").expect("method found");
    let names = draw.method_names(parser.serialize());
    assert_eq!(names.first(), draw.method_name(parser.serialize()).as_ref());
    assert_eq!(names[0], "draw(x, y, z)");
    assert!(names.contains(&"draw(x, y)".to_string()));
    assert!(names.contains(&"draw(x)".to_string()));
}

#[test]
fn boundary_empty_input() {
    let parser = Parser::new(Some(""), None);
    assert!(parser.is_empty());
    assert_eq!(parser.serialize(), "");
}

#[test]
fn boundary_whitespace_only_input() {
    let text = "  \n\t // a comment\n";
    let parser = Parser::new(Some(text), None);
    assert!(parser.is_empty());
    assert_eq!(parser.serialize(), text);
}

#[test]
fn boundary_eof_before_closing_brace_keeps_parsed_members() {
    let warnings = Rc::new(RefCell::new(Vec::new()));
    let delegate = RecordingDelegate {
        warnings: warnings.clone(),
    };
    let text = "interface Foo { attribute long bar;";
    let parser = Parser::new(Some(text), Some(Box::new(delegate)));
    let foo = parser.find("Foo").expect("interface found despite missing '}'");
    assert_eq!(foo.members().len(), 2);
    assert!(parser.find("Foo/bar").is_some());
    assert_eq!(parser.markup(&NoOp), text);
    assert!(!warnings.borrow().is_empty());
}

#[test]
fn boundary_eof_before_closing_brace_in_dictionary() {
    let warnings = Rc::new(RefCell::new(Vec::new()));
    let delegate = RecordingDelegate {
        warnings: warnings.clone(),
    };
    let text = "dictionary D { long x;";
    let parser = Parser::new(Some(text), Some(Box::new(delegate)));
    let d = parser.find("D").expect("dictionary found despite missing '}'");
    assert_eq!(d.members().len(), 2);
    assert!(parser.find("D/x").is_some());
    assert_eq!(parser.markup(&NoOp), text);
    assert!(!warnings.borrow().is_empty());
}

#[test]
fn boundary_malformed_member_does_not_corrupt_interface() {
    let warnings = Rc::new(RefCell::new(Vec::new()));
    let delegate = RecordingDelegate {
        warnings: warnings.clone(),
    };
    let text = "interface Foo { !!!; attribute long bar; const long N = 1; };";
    let parser = Parser::new(Some(text), Some(Box::new(delegate)));
    let foo = parser.find("Foo").expect("interface found");
    assert_eq!(foo.members().len(), 3);
    assert!(parser.find("Foo/bar").is_some());
    assert!(parser.find("Foo/N").is_some());
    assert_eq!(warnings.borrow().len(), 1);
}

//! webidl_pt is a recursive descent parser for the WebIDL interface-definition language.
//!
//! # Overview
//!
//! Given WebIDL source text, [Parser] produces a tree of [construct](construct::Construct)s —
//! interfaces, dictionaries, callbacks, enums, typedefs and their members — while retaining
//! enough information about the original source to reproduce it byte-for-byte
//! ([`Parser::serialize`]) and to emit a marker-annotated rendering of it
//! ([`Parser::markup`]).
//!
//! # Design
//!
//! Parsing happens in three layers, leaves first:
//! - [tokenizer] splits source text into a lossless, rewindable token stream.
//! - [production] holds one recursive-descent matcher per WebIDL grammar rule, modeled as
//!   a single tagged [`ProductionKind`](production::ProductionKind) enum rather than a
//!   class per rule.
//! - [construct] groups productions into named, navigable entities and implements
//!   the error-recovery policy that keeps a malformed member from corrupting the rest of
//!   an interface.
//!
//! [Parser] ties the three together and is the only type most callers need.
//!
//! # Example
//!
//! ```
//! use webidl_pt::Parser;
//!
//! let parser = Parser::new(
//!     Some("interface Greeter { void hello(DOMString name); };"),
//!     None,
//! );
//! let greeter = parser.find("Greeter").expect("interface parsed");
//! assert_eq!(greeter.idl_type.tag(), "interface");
//! assert_eq!(parser.serialize(), "interface Greeter { void hello(DOMString name); };");
//! ```
//!
//! # License
//! [webidl_pt](crate) is provided under the MIT OR Apache-2.0 license.
pub mod construct;
mod error;
mod markup;
mod method_name;
mod parser;
mod position;
pub mod production;
mod token;
mod tokenizer;

pub use construct::{Construct, ConstructId, IdlType};
pub use error::ParserError;
pub use markup::{Marker, Wrap};
pub use parser::{Parser, ParserDelegate};
pub use position::Position;
pub use token::{Token, TokenKind};

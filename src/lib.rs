//! Shape projection for nested schemas.
//!
//! Given a [`Schema`] and a [`Selection`] naming the fields a caller wants,
//! compute the exact [`Shape`] of the projected result: which keys exist, which
//! stay optional or nullable, and what each selected subtree becomes.
//! Malformed selections are rejected by [`Schema::validate`] before any shape
//! is computed.
//!
//! ```
//! use json_subset::{FieldSpec, Schema, SchemaNode, Selection};
//!
//! let mut schema = Schema::new();
//! schema.define("Item", SchemaNode::object([
//!     ("id", FieldSpec::required(SchemaNode::number())),
//!     ("tags", FieldSpec::maybe(SchemaNode::array(SchemaNode::string()))),
//!     ("children", FieldSpec::required(SchemaNode::array(SchemaNode::reference("Item")))),
//! ]));
//!
//! let selection = Selection::from_json_str(r#"{ "id": true, "children": { "tags": true } }"#).unwrap();
//! let shape = schema.subset(&SchemaNode::reference("Item"), &selection).unwrap();
//! assert_eq!(shape.to_string(), "{ children: { tags?: string[] | null }[]; id: number }");
//! ```
pub mod de;
pub mod error;
pub mod project;
pub mod schema;
pub mod selection;
pub mod shape;
pub mod validate;

#[cfg(test)]
pub(crate) mod testing;

pub use de::ParseError;
pub use error::{PathSegment, SelectionError, SelectionErrorKind, SelectionPath};
pub use schema::{FieldSpec, ScalarKind, Schema, SchemaNode};
pub use selection::{LegalSelections, SelectTarget, Selection};
pub use shape::{Shape, ShapeField};
pub use validate::Validated;

//! Shared fixtures for unit tests.
use crate::schema::{FieldSpec, Schema, SchemaNode};

fn obj_fields() -> Vec<(&'static str, FieldSpec)> {
    vec![
        ("number", FieldSpec::required(SchemaNode::number())),
        ("numberOpt", FieldSpec::maybe(SchemaNode::number())),
        ("string", FieldSpec::required(SchemaNode::string())),
        ("stringOpt", FieldSpec::maybe(SchemaNode::string())),
        ("array", FieldSpec::required(SchemaNode::array(SchemaNode::reference("Item")))),
        ("arrayOpt", FieldSpec::maybe(SchemaNode::array(SchemaNode::reference("Item")))),
        ("nested", FieldSpec::required(SchemaNode::reference("Nested"))),
        ("nestedOpt", FieldSpec::maybe(SchemaNode::reference("Nested"))),
    ]
}

/// `Item`, `Obj` and `Nested`: three mutually recursive object definitions.
/// `Nested` is `Obj` plus `obj: Obj` and `objOpt?: Obj | null`.
pub(crate) fn catalog() -> Schema {
    let mut nested = obj_fields();
    nested.push(("obj", FieldSpec::required(SchemaNode::reference("Obj"))));
    nested.push(("objOpt", FieldSpec::maybe(SchemaNode::reference("Obj"))));

    let mut schema = Schema::new();
    schema
        .define(
            "Item",
            SchemaNode::object([
                ("id", FieldSpec::required(SchemaNode::number())),
                ("value", FieldSpec::required(SchemaNode::string())),
                ("nested", FieldSpec::required(SchemaNode::reference("Nested"))),
                ("nestedOpt", FieldSpec::maybe(SchemaNode::reference("Nested"))),
            ]),
        )
        .define("Obj", SchemaNode::object(obj_fields()))
        .define("Nested", SchemaNode::object(nested));
    schema
}

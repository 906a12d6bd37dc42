//! Projected shapes: what a selection yields.
//!
//! Object keys are stored sorted, so two shapes compare equal exactly when
//! they describe the same structure regardless of the order keys were
//! selected in.
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::{FieldSpec, ScalarKind, SchemaNode, write_string_literal};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Shape {
    Scalar { scalar: ScalarKind },
    /// A named schema definition taken whole.
    Named { name: String },
    Object {
        #[serde(default)]
        fields: BTreeMap<String, ShapeField>,
    },
    Array { element: Box<Shape> },
    /// `inner | null`
    Nullable { inner: Box<Shape> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeField {
    #[serde(flatten)]
    pub shape: Shape,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// CONSTRUCTION
// ————————————————————————————————————————————————————————————————————————————

impl Shape {
    pub fn scalar(scalar: ScalarKind) -> Self {
        Self::Scalar { scalar }
    }
    pub fn boolean() -> Self {
        Self::scalar(ScalarKind::Boolean)
    }
    pub fn integer() -> Self {
        Self::scalar(ScalarKind::Integer)
    }
    pub fn number() -> Self {
        Self::scalar(ScalarKind::Number)
    }
    pub fn string() -> Self {
        Self::scalar(ScalarKind::String)
    }
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named { name: name.into() }
    }
    pub fn empty_object() -> Self {
        Self::Object { fields: BTreeMap::new() }
    }
    pub fn object<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, ShapeField)>,
        K: Into<String>,
    {
        Self::Object {
            fields: fields.into_iter().map(|(k, f)| (k.into(), f)).collect(),
        }
    }
    pub fn array(element: Shape) -> Self {
        Self::Array { element: Box::new(element) }
    }

    /// Wraps in `| null`; already-nullable shapes are left alone.
    pub fn nullable(self) -> Self {
        match self {
            Self::Nullable { .. } => self,
            other => Self::Nullable { inner: Box::new(other) },
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, Self::Nullable { .. })
    }

    /// Object fields, if this is an object shape.
    pub fn fields(&self) -> Option<&BTreeMap<String, ShapeField>> {
        match self {
            Self::Object { fields } => Some(fields),
            _ => None,
        }
    }
}

impl ShapeField {
    pub fn required(shape: Shape) -> Self {
        Self { shape, optional: false }
    }
    pub fn optional(shape: Shape) -> Self {
        Self { shape, optional: true }
    }
}

impl From<&SchemaNode> for Shape {
    /// Embeds a schema node unchanged; references stay by name.
    fn from(node: &SchemaNode) -> Self {
        match node {
            SchemaNode::Scalar { scalar } => Shape::scalar(scalar.clone()),
            SchemaNode::Ref { name } => Shape::named(name.clone()),
            SchemaNode::Array { element } => Shape::array(Shape::from(&**element)),
            SchemaNode::Object { fields } => Shape::Object {
                fields: fields
                    .iter()
                    .map(|(k, f)| (k.clone(), ShapeField::from(f)))
                    .collect(),
            },
        }
    }
}

impl From<&FieldSpec> for ShapeField {
    fn from(field: &FieldSpec) -> Self {
        let shape = Shape::from(&field.ty);
        ShapeField {
            shape: if field.nullable { shape.nullable() } else { shape },
            optional: field.optional,
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// RENDERING
// ————————————————————————————————————————————————————————————————————————————

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar { scalar } => write!(f, "{scalar}"),
            Self::Named { name } => f.write_str(name),
            Self::Object { fields } if fields.is_empty() => f.write_str("{}"),
            Self::Object { fields } => {
                f.write_str("{ ")?;
                for (i, (name, field)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write_key(f, name)?;
                    let mark = if field.optional { "?" } else { "" };
                    write!(f, "{mark}: {}", field.shape)?;
                }
                f.write_str(" }")
            }
            Self::Array { element } if element.is_union() => write!(f, "({element})[]"),
            Self::Array { element } => write!(f, "{element}[]"),
            Self::Nullable { inner } => write!(f, "{inner} | null"),
        }
    }
}

impl Shape {
    fn is_union(&self) -> bool {
        match self {
            Self::Nullable { .. } => true,
            Self::Scalar { scalar: ScalarKind::Enum(variants) } => variants.len() > 1,
            _ => false,
        }
    }
}

fn write_key(f: &mut fmt::Formatter<'_>, key: &str) -> fmt::Result {
    let plain = key
        .chars()
        .enumerate()
        .all(|(i, c)| c == '_' || c == '$' || c.is_ascii_alphabetic() || (i > 0 && c.is_ascii_digit()));
    if plain && !key.is_empty() {
        f.write_str(key)
    } else {
        write_string_literal(f, key)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// JSON SCHEMA CG
// ————————————————————————————————————————————————————————————————————————————

impl Shape {
    /// Draft-style JSON Schema for this shape. Named shapes become
    /// `$ref: #/$defs/<name>`.
    pub fn to_json_schema(&self) -> serde_json::Value {
        use serde_json::{Value, json};

        match self {
            Self::Scalar { scalar } => match scalar {
                ScalarKind::Boolean => json!({ "type": "boolean" }),
                ScalarKind::Integer => json!({ "type": "integer" }),
                ScalarKind::Number => json!({ "type": "number" }),
                ScalarKind::String => json!({ "type": "string" }),
                ScalarKind::Enum(variants) => json!({ "type": "string", "enum": variants }),
            },
            Self::Named { name } => json!({ "$ref": format!("#/$defs/{name}") }),
            Self::Object { fields } => {
                let mut props = serde_json::Map::new();
                let mut required = Vec::<Value>::new();
                for (name, field) in fields {
                    props.insert(name.clone(), field.shape.to_json_schema());
                    if !field.optional {
                        required.push(Value::from(name.clone()));
                    }
                }
                let mut o = json!({ "type": "object", "properties": props });
                if !required.is_empty() {
                    o["required"] = Value::Array(required);
                }
                o
            }
            Self::Array { element } => json!({
                "type": "array",
                "items": element.to_json_schema(),
            }),
            Self::Nullable { inner } => json!({
                "oneOf": [inner.to_json_schema(), { "type": "null" }]
            }),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

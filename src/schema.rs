//! Schema model: the declared shape of a document.
//!
//! A [`Schema`] is a registry of named definitions. Nodes refer to each other
//! through [`SchemaNode::Ref`], so recursive shapes (an item whose nested
//! object holds a list of items) stay finite; references are only followed as
//! deep as a selection actually descends.
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::SelectionErrorKind;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Leaf value types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    Boolean,
    Integer,
    Number,
    String,
    /// A closed set of string literals.
    Enum(Vec<String>),
}

/// One position in a document shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SchemaNode {
    Scalar { scalar: ScalarKind },
    Object {
        #[serde(default)]
        fields: IndexMap<String, FieldSpec>,
    },
    /// Homogeneous list. Elements carry no optional/nullable flags of their
    /// own, so a nullable element cannot be declared.
    Array { element: Box<SchemaNode> },
    /// Named definition in the enclosing [`Schema`].
    Ref { name: String },
}

/// A field of an object node.
///
/// `optional` = may be absent, `nullable` = may hold an explicit null. The two
/// flags are independent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    #[serde(flatten)]
    pub ty: SchemaNode,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub nullable: bool,
}

/// Registry of named schema definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    definitions: IndexMap<String, SchemaNode>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl SchemaNode {
    pub fn boolean() -> Self {
        Self::Scalar { scalar: ScalarKind::Boolean }
    }
    pub fn integer() -> Self {
        Self::Scalar { scalar: ScalarKind::Integer }
    }
    pub fn number() -> Self {
        Self::Scalar { scalar: ScalarKind::Number }
    }
    pub fn string() -> Self {
        Self::Scalar { scalar: ScalarKind::String }
    }
    pub fn enumeration<I, S>(variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Scalar {
            scalar: ScalarKind::Enum(variants.into_iter().map(Into::into).collect()),
        }
    }
    pub fn object<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, FieldSpec)>,
        K: Into<String>,
    {
        Self::Object {
            fields: fields.into_iter().map(|(k, f)| (k.into(), f)).collect(),
        }
    }
    pub fn array(element: SchemaNode) -> Self {
        Self::Array { element: Box::new(element) }
    }
    pub fn reference(name: impl Into<String>) -> Self {
        Self::Ref { name: name.into() }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Scalar { .. })
    }
}

impl FieldSpec {
    /// Present and non-null.
    pub fn required(ty: SchemaNode) -> Self {
        Self { ty, optional: false, nullable: false }
    }
    /// Optional *and* nullable, the usual `x?: T | null` field.
    pub fn maybe(ty: SchemaNode) -> Self {
        Self { ty, optional: true, nullable: true }
    }
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a named definition.
    pub fn define(&mut self, name: impl Into<String>, node: SchemaNode) -> &mut Self {
        self.definitions.insert(name.into(), node);
        self
    }

    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.definitions.get(name)
    }

    pub fn definitions(&self) -> impl Iterator<Item = (&str, &SchemaNode)> {
        self.definitions.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Follows `Ref` nodes until a structural node is reached.
    pub fn resolve<'a>(&'a self, node: &'a SchemaNode) -> Result<&'a SchemaNode, SelectionErrorKind> {
        let mut current = node;
        let mut hops = 0usize;
        while let SchemaNode::Ref { name } = current {
            // more hops than definitions means the chain loops back on itself
            if hops > self.definitions.len() {
                return Err(SelectionErrorKind::ReferenceCycle { name: name.clone() });
            }
            current = self
                .definitions
                .get(name)
                .ok_or_else(|| SelectionErrorKind::UnresolvedReference { name: name.clone() })?;
            hops += 1;
        }
        Ok(current)
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean => f.write_str("boolean"),
            Self::Integer => f.write_str("integer"),
            Self::Number => f.write_str("number"),
            Self::String => f.write_str("string"),
            Self::Enum(variants) if variants.is_empty() => f.write_str("never"),
            Self::Enum(variants) => {
                for (i, v) in variants.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write_string_literal(f, v)?;
                }
                Ok(())
            }
        }
    }
}

/// Quotes `s` with JSON string escapes, the same escapes a type annotation uses.
pub(crate) fn write_string_literal(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    let quoted = serde_json::to_string(s).map_err(|_| fmt::Error)?;
    f.write_str(&quoted)
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

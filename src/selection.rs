//! Selection model: which parts of a schema a caller wants.
//!
//! The JSON form mirrors the usual literal syntax for field picks:
//!
//! - `true` takes the whole subtree,
//! - `{ "id": true, "nested": { ... } }` picks fields of an object (or of every
//!   element of an array of objects),
//! - `[ <shape> ]` substitutes a caller-supplied shape verbatim.
use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::de::{ParseError, from_str_with_path, from_value_with_path};
use crate::error::SelectionErrorKind;
use crate::schema::{FieldSpec, ScalarKind, Schema, SchemaNode};
use crate::shape::Shape;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The whole subtree, as declared.
    All,
    /// A subset of an object's fields. Keys keep authoring order so rejections
    /// are reported deterministically.
    Fields(IndexMap<String, Selection>),
    /// Stop recursing and use this shape as the result.
    Override(Shape),
}

/// The selection forms a schema node admits.
#[derive(Debug, Clone, Copy)]
pub struct LegalSelections<'a> {
    /// Arrays stepped through to reach `target`; selections map over them.
    pub array_depth: usize,
    pub target: SelectTarget<'a>,
}

#[derive(Debug, Clone, Copy)]
pub enum SelectTarget<'a> {
    /// Only `All`.
    Scalar(&'a ScalarKind),
    /// `All`, `Override`, or `Fields` over these keys.
    Object(&'a IndexMap<String, FieldSpec>),
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Selection {
    pub fn fields<I, K>(picks: I) -> Self
    where
        I: IntoIterator<Item = (K, Selection)>,
        K: Into<String>,
    {
        Self::Fields(picks.into_iter().map(|(k, s)| (k.into(), s)).collect())
    }

    /// `Fields` with every key set to `All`.
    pub fn keys<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self::Fields(keys.into_iter().map(|k| (k.into(), Self::All)).collect())
    }

    pub fn override_with(shape: Shape) -> Self {
        Self::Override(shape)
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    pub fn from_json_str(src: &str) -> Result<Self, ParseError> {
        from_str_with_path(src)
    }

    pub fn from_json(value: serde_json::Value) -> Result<Self, ParseError> {
        from_value_with_path(value)
    }
}

impl Serialize for Selection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Selection::All => serializer.serialize_bool(true),
            Selection::Fields(picks) => serializer.collect_map(picks),
            Selection::Override(shape) => (shape,).serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Selection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SelectionVisitor)
    }
}

struct SelectionVisitor;

impl<'de> Visitor<'de> for SelectionVisitor {
    type Value = Selection;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("`true`, an object of field selections, or a one-element array holding a shape")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Selection, E> {
        if v {
            Ok(Selection::All)
        } else {
            Err(E::custom("`false` is not a selection; leave the key out instead"))
        }
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Selection, A::Error> {
        let mut picks = IndexMap::new();
        while let Some((key, pick)) = map.next_entry::<String, Selection>()? {
            picks.insert(key, pick);
        }
        Ok(Selection::Fields(picks))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Selection, A::Error> {
        let shape: Shape = seq
            .next_element()?
            .ok_or_else(|| <A::Error as de::Error>::invalid_length(0, &self))?;
        if seq.next_element::<de::IgnoredAny>()?.is_some() {
            return Err(de::Error::invalid_length(2, &self));
        }
        Ok(Selection::Override(shape))
    }
}

impl<'a> LegalSelections<'a> {
    pub fn allows_override(&self) -> bool {
        matches!(self.target, SelectTarget::Object(_))
    }

    pub fn field(&self, name: &str) -> Option<&'a FieldSpec> {
        match self.target {
            SelectTarget::Object(fields) => fields.get(name),
            SelectTarget::Scalar(_) => None,
        }
    }

    /// Shallow legality: the form of `selection` fits this node and every
    /// picked key exists. Does not descend into picks.
    pub fn admits(&self, selection: &Selection) -> bool {
        match (selection, self.target) {
            (Selection::All, _) => true,
            (_, SelectTarget::Scalar(_)) => false,
            (Selection::Override(_), SelectTarget::Object(_)) => true,
            (Selection::Fields(picks), SelectTarget::Object(fields)) => {
                picks.keys().all(|k| fields.contains_key(k))
            }
        }
    }
}

impl Schema {
    /// What may be selected at `node`. Arrays are stepped through, since a
    /// selection on an array applies to each element.
    pub fn legal_selections<'a>(
        &'a self,
        node: &'a SchemaNode,
    ) -> Result<LegalSelections<'a>, SelectionErrorKind> {
        let mut current = node;
        let mut array_depth = 0usize;
        loop {
            match self.resolve(current)? {
                SchemaNode::Array { element } => {
                    array_depth += 1;
                    current = element;
                }
                SchemaNode::Scalar { scalar } => {
                    return Ok(LegalSelections { array_depth, target: SelectTarget::Scalar(scalar) });
                }
                SchemaNode::Object { fields } => {
                    return Ok(LegalSelections { array_depth, target: SelectTarget::Object(fields) });
                }
                // resolve never yields a reference
                SchemaNode::Ref { name } => {
                    return Err(SelectionErrorKind::ReferenceCycle { name: name.clone() });
                }
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

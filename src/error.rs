//! Rejections raised while checking a selection against a schema.
use std::fmt;

use crate::schema::ScalarKind;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// A malformed selection, pinned to the exact site where it went wrong.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid selection at `{path}`: {kind}")]
pub struct SelectionError {
    pub path: SelectionPath,
    pub kind: SelectionErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionErrorKind {
    /// The selection names a key the schema object does not declare.
    #[error("unknown field `{field}`")]
    UnknownField { field: String },
    /// `Fields` or `Override` aimed at a scalar.
    #[error("cannot select into scalar `{scalar}`; only `true` is allowed here")]
    ScalarSelection { scalar: ScalarKind },
    /// Nested selection aimed at a field that is both optional and scalar.
    #[error("optional scalar field `{field}` does not support nested selection")]
    InvalidNestedSelectionOnOptionalScalar { field: String },
    #[error("schema reference `{name}` is not defined")]
    UnresolvedReference { name: String },
    #[error("schema reference `{name}` never resolves to a concrete node")]
    ReferenceCycle { name: String },
}

/// Where in a selection tree a rejection happened.
///
/// Renders as `nested.obj.array[].id`; the root renders as `$`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionPath {
    segments: Vec<PathSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Field(String),
    /// Stepping through an array into its element.
    Elements,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl SelectionError {
    pub fn new(path: SelectionPath, kind: SelectionErrorKind) -> Self {
        Self { path, kind }
    }
}

impl SelectionPath {
    pub fn root() -> Self {
        Self::default()
    }
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
    pub fn field(&self, name: &str) -> Self {
        self.with(PathSegment::Field(name.to_owned()))
    }
    pub fn elements(&self, depth: usize) -> Self {
        let mut out = self.clone();
        out.segments.extend(std::iter::repeat_n(PathSegment::Elements, depth));
        out
    }
    fn with(&self, segment: PathSegment) -> Self {
        let mut out = self.clone();
        out.segments.push(segment);
        out
    }
}

impl fmt::Display for SelectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("$");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 => f.write_str(name)?,
                PathSegment::Field(name) => write!(f, ".{name}")?,
                PathSegment::Elements => f.write_str("[]")?,
            }
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

//! Fixture files: a schema, a selection, and what projecting it must give.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use json_subset::{Schema, SchemaNode, Selection, SelectionErrorKind, Shape};
use serde::Deserialize;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// One file holds a list of cases sharing the same definitions.
#[derive(Debug, Deserialize)]
pub struct FixtureFile {
    #[serde(default)]
    pub definitions: Schema,
    pub cases: Vec<Case>,
}

#[derive(Debug, Deserialize)]
pub struct Case {
    pub name: String,
    pub root: SchemaNode,
    pub selection: Selection,
    pub expect: Expect,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expect {
    /// Structural equality with this shape.
    Shape(Shape),
    /// Equality with the rendered type annotation.
    Render(String),
    Error(ErrorKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnknownField,
    ScalarSelection,
    InvalidNestedSelectionOnOptionalScalar,
    UnresolvedReference,
    ReferenceCycle,
}

/// A case together with where it came from.
#[derive(Debug)]
pub struct Loaded {
    pub source: PathBuf,
    pub definitions: std::sync::Arc<Schema>,
    pub case: Case,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl ErrorKind {
    fn matches(self, kind: &SelectionErrorKind) -> bool {
        let actual = match kind {
            SelectionErrorKind::UnknownField { .. } => Self::UnknownField,
            SelectionErrorKind::ScalarSelection { .. } => Self::ScalarSelection,
            SelectionErrorKind::InvalidNestedSelectionOnOptionalScalar { .. } => {
                Self::InvalidNestedSelectionOnOptionalScalar
            }
            SelectionErrorKind::UnresolvedReference { .. } => Self::UnresolvedReference,
            SelectionErrorKind::ReferenceCycle { .. } => Self::ReferenceCycle,
        };
        actual == self
    }
}

pub fn load(path: &Path) -> Result<Vec<Loaded>> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read fixture file {}", path.display()))?;
    let file: FixtureFile = json_subset::de::from_str_with_path(&source)
        .with_context(|| format!("failed to parse fixture file {}", path.display()))?;
    let definitions = std::sync::Arc::new(file.definitions);
    Ok(file
        .cases
        .into_iter()
        .map(|case| Loaded {
            source: path.to_path_buf(),
            definitions: definitions.clone(),
            case,
        })
        .collect())
}

impl Loaded {
    /// `Ok` when the projection matches the expectation, otherwise a reason.
    pub fn run(&self) -> Result<(), String> {
        let case = &self.case;
        let result = self.definitions.subset(&case.root, &case.selection);
        match (&case.expect, result) {
            (Expect::Shape(expected), Ok(actual)) if *expected == actual => Ok(()),
            (Expect::Shape(expected), Ok(actual)) => Err(format!("expected {expected}\n        got {actual}")),
            (Expect::Render(expected), Ok(actual)) if *expected == actual.to_string() => Ok(()),
            (Expect::Render(expected), Ok(actual)) => Err(format!("expected {expected}\n        got {actual}")),
            (Expect::Error(kind), Err(err)) if kind.matches(&err.kind) => Ok(()),
            (Expect::Error(kind), Err(err)) => Err(format!("expected {kind:?} rejection, got: {err}")),
            (Expect::Error(kind), Ok(actual)) => Err(format!("expected {kind:?} rejection, got shape {actual}")),
            (_, Err(err)) => Err(format!("unexpected rejection: {err}")),
        }
    }
}

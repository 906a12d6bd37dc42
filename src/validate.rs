//! Selection checking.
//!
//! [`Schema::validate`] is the only way to obtain a [`Validated`], and
//! projection only accepts a [`Validated`], so no shape is ever computed for a
//! malformed selection. Checking stops at the first illegal site, in the order
//! the selection was written.
use tracing::{debug, instrument, trace};

use crate::error::{SelectionError, SelectionErrorKind, SelectionPath};
use crate::schema::{Schema, SchemaNode};
use crate::selection::{SelectTarget, Selection};

/// A `(schema, root, selection)` triple that passed [`Schema::validate`].
#[derive(Debug, Clone, Copy)]
pub struct Validated<'a> {
    pub(crate) schema: &'a Schema,
    pub(crate) root: &'a SchemaNode,
    pub(crate) selection: &'a Selection,
}

impl<'a> Validated<'a> {
    pub fn schema(&self) -> &'a Schema {
        self.schema
    }
    pub fn root(&self) -> &'a SchemaNode {
        self.root
    }
    pub fn selection(&self) -> &'a Selection {
        self.selection
    }
}

impl Schema {
    /// Checks `selection` against `root`.
    #[instrument(level = "debug", skip_all)]
    pub fn validate<'a>(
        &'a self,
        root: &'a SchemaNode,
        selection: &'a Selection,
    ) -> Result<Validated<'a>, SelectionError> {
        check(self, root, selection, &SelectionPath::root())
            .inspect_err(|err| debug!(%err, "selection rejected"))?;
        Ok(Validated { schema: self, root, selection })
    }
}

fn check(
    schema: &Schema,
    node: &SchemaNode,
    selection: &Selection,
    path: &SelectionPath,
) -> Result<(), SelectionError> {
    // `All` never looks inside the node, so references below it stay unresolved.
    if selection.is_all() {
        return Ok(());
    }
    let legal = schema
        .legal_selections(node)
        .map_err(|kind| SelectionError::new(path.clone(), kind))?;
    let here = path.elements(legal.array_depth);

    match (selection, legal.target) {
        (Selection::All, _) => Ok(()),
        (_, SelectTarget::Scalar(scalar)) => Err(SelectionError::new(
            here,
            SelectionErrorKind::ScalarSelection { scalar: scalar.clone() },
        )),
        (Selection::Override(_), SelectTarget::Object(_)) => Ok(()),
        (Selection::Fields(picks), SelectTarget::Object(fields)) => {
            for (name, pick) in picks {
                let at = here.field(name);
                trace!(path = %at, "checking pick");
                let Some(field) = fields.get(name) else {
                    return Err(SelectionError::new(
                        at,
                        SelectionErrorKind::UnknownField { field: name.clone() },
                    ));
                };
                if field.optional && !pick.is_all() {
                    let resolved = schema
                        .resolve(&field.ty)
                        .map_err(|kind| SelectionError::new(at.clone(), kind))?;
                    if resolved.is_scalar() {
                        return Err(SelectionError::new(
                            at,
                            SelectionErrorKind::InvalidNestedSelectionOnOptionalScalar {
                                field: name.clone(),
                            },
                        ));
                    }
                }
                check(schema, &field.ty, pick, &at)?;
            }
            Ok(())
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

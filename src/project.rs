//! The projection algorithm.
//!
//! One structural dispatch over the resolved schema node (array, object,
//! scalar). A field's optional/nullable flags are never consulted inside that
//! dispatch; they are reattached around whatever the field's projection turns
//! out to be, so selecting into a field only changes how much of it is
//! exposed, never whether it may be absent or null.
use std::collections::BTreeMap;

use tracing::{instrument, trace};

use crate::error::SelectionError;
use crate::schema::{FieldSpec, Schema, SchemaNode};
use crate::selection::Selection;
use crate::shape::{Shape, ShapeField};
use crate::validate::Validated;

impl Validated<'_> {
    /// The shape the validated selection yields.
    #[instrument(level = "debug", skip_all)]
    pub fn project(&self) -> Shape {
        project(self.schema, self.root, self.selection)
    }
}

impl Schema {
    /// Validate, then project.
    pub fn subset(&self, root: &SchemaNode, selection: &Selection) -> Result<Shape, SelectionError> {
        Ok(self.validate(root, selection)?.project())
    }
}

// Inputs have been validated. Combinations validation rejects fall back to the
// node as declared rather than panicking.
fn project(schema: &Schema, node: &SchemaNode, selection: &Selection) -> Shape {
    if selection.is_all() {
        return Shape::from(node);
    }
    let Ok(resolved) = schema.resolve(node) else {
        return Shape::from(node);
    };
    match (resolved, selection) {
        (SchemaNode::Array { element }, _) => Shape::array(project(schema, element, selection)),
        (SchemaNode::Object { .. }, Selection::Override(shape)) => shape.clone(),
        (SchemaNode::Object { fields }, Selection::Fields(picks)) => {
            let mut parts = Partitions::default();
            for (name, pick) in picks {
                let Some(field) = fields.get(name) else { continue };
                trace!(field = %name, "projecting");
                parts.insert(name, field, project_field(schema, field, pick));
            }
            parts.flatten()
        }
        (other, _) => Shape::from(other),
    }
}

fn project_field(schema: &Schema, field: &FieldSpec, selection: &Selection) -> Shape {
    let shape = project(schema, &field.ty, selection);
    if field.nullable { shape.nullable() } else { shape }
}

/// Always-present and possibly-absent keys of one projected object.
#[derive(Default)]
struct Partitions {
    required: BTreeMap<String, Shape>,
    optional: BTreeMap<String, Shape>,
}

impl Partitions {
    fn insert(&mut self, name: &str, field: &FieldSpec, shape: Shape) {
        let side = if field.optional { &mut self.optional } else { &mut self.required };
        side.insert(name.to_owned(), shape);
    }

    /// Merges both partitions into a single object shape.
    fn flatten(self) -> Shape {
        let required = self.required.into_iter().map(|(k, s)| (k, ShapeField::required(s)));
        let optional = self.optional.into_iter().map(|(k, s)| (k, ShapeField::optional(s)));
        Shape::Object { fields: required.chain(optional).collect() }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SelectionErrorKind;
    use crate::testing::catalog;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn subset_of(root: &str, selection: serde_json::Value) -> Shape {
        let selection = Selection::from_json(selection).unwrap();
        catalog().subset(&SchemaNode::reference(root), &selection).unwrap()
    }

    fn req(shape: Shape) -> ShapeField {
        ShapeField::required(shape)
    }

    fn opt(shape: Shape) -> ShapeField {
        ShapeField::optional(shape)
    }

    #[test]
    fn empty_selection_yields_empty_object() {
        assert_eq!(subset_of("Obj", json!({})), Shape::empty_object());
    }

    #[test]
    fn scalar_fields_keep_optionality_and_nullability() {
        let shape = subset_of("Obj", json!({ "number": true, "numberOpt": true }));
        let expected = Shape::object([
            ("number", req(Shape::number())),
            ("numberOpt", opt(Shape::number().nullable())),
        ]);
        assert_eq!(shape, expected);
    }

    #[test]
    fn whole_nested_objects_stay_named() {
        let shape = subset_of("Obj", json!({ "nested": true, "nestedOpt": true }));
        let expected = Shape::object([
            ("nested", req(Shape::named("Nested"))),
            ("nestedOpt", opt(Shape::named("Nested").nullable())),
        ]);
        assert_eq!(shape, expected);
        assert_eq!(shape.to_string(), "{ nested: Nested; nestedOpt?: Nested | null }");
    }

    #[test]
    fn partial_nested_objects() {
        let shape = subset_of(
            "Obj",
            json!({ "nested": { "number": true }, "nestedOpt": { "number": true } }),
        );
        let inner = Shape::object([("number", req(Shape::number()))]);
        let expected = Shape::object([
            ("nested", req(inner.clone())),
            ("nestedOpt", opt(inner.nullable())),
        ]);
        assert_eq!(shape, expected);
    }

    #[test]
    fn whole_arrays() {
        let shape = subset_of("Obj", json!({ "array": true, "arrayOpt": true }));
        let expected = Shape::object([
            ("array", req(Shape::array(Shape::named("Item")))),
            ("arrayOpt", opt(Shape::array(Shape::named("Item")).nullable())),
        ]);
        assert_eq!(shape, expected);
    }

    #[test]
    fn partial_array_elements_wrap_the_whole_array() {
        let shape = subset_of("Obj", json!({ "array": { "id": true }, "arrayOpt": { "id": true } }));
        let element = Shape::object([("id", req(Shape::number()))]);
        let expected = Shape::object([
            ("array", req(Shape::array(element.clone()))),
            ("arrayOpt", opt(Shape::array(element).nullable())),
        ]);
        assert_eq!(shape, expected);
        assert_eq!(
            shape.to_string(),
            "{ array: { id: number }[]; arrayOpt?: { id: number }[] | null }"
        );
    }

    #[test]
    fn subset_refuses_malformed_selections() {
        let schema = catalog();
        let root = SchemaNode::reference("Obj");
        for (selection, expected) in [
            (json!({ "notExist": true }), "unknown"),
            (json!({ "number": { "nested": true } }), "scalar"),
            (json!({ "numberOpt": { "something": true } }), "optional"),
        ] {
            let selection = Selection::from_json(selection).unwrap();
            let err = schema.subset(&root, &selection).unwrap_err();
            let kind = match err.kind {
                SelectionErrorKind::UnknownField { .. } => "unknown",
                SelectionErrorKind::ScalarSelection { .. } => "scalar",
                SelectionErrorKind::InvalidNestedSelectionOnOptionalScalar { .. } => "optional",
                _ => "other",
            };
            assert_eq!(kind, expected);
        }
    }

    #[test]
    fn optional_parent_stays_optional_and_nullable_at_any_depth() {
        let shape = subset_of("Obj", json!({ "nestedOpt": { "obj": { "string": true } } }));
        let expected = Shape::object([(
            "nestedOpt",
            opt(Shape::object([("obj", req(Shape::object([("string", req(Shape::string()))])))]).nullable()),
        )]);
        assert_eq!(shape, expected);

        let deeper = subset_of(
            "Item",
            json!({ "nestedOpt": { "arrayOpt": { "nested": { "obj": { "number": true } } } } }),
        );
        let field = &deeper.fields().unwrap()["nestedOpt"];
        assert!(field.optional);
        assert!(field.shape.is_nullable());
    }

    #[test]
    fn deep_selection_through_recursive_definitions() {
        let shape = subset_of("Obj", json!({ "nested": { "obj": { "array": { "id": true } } } }));
        let expected = Shape::object([(
            "nested",
            req(Shape::object([(
                "obj",
                req(Shape::object([(
                    "array",
                    req(Shape::array(Shape::object([("id", req(Shape::number()))]))),
                )])),
            )])),
        )]);
        assert_eq!(shape, expected);
        assert_eq!(shape.to_string(), "{ nested: { obj: { array: { id: number }[] } } }");
    }

    #[test]
    fn full_selection_is_identity() {
        let schema = catalog();
        for node in [
            SchemaNode::number(),
            SchemaNode::reference("Item"),
            SchemaNode::array(SchemaNode::reference("Obj")),
            schema.get("Nested").cloned().unwrap(),
        ] {
            let shape = schema.subset(&node, &Selection::All).unwrap();
            assert_eq!(shape, Shape::from(&node));
        }
    }

    #[test]
    fn array_selection_maps_over_elements() {
        let schema = catalog();
        let element = SchemaNode::reference("Item");
        let array = SchemaNode::array(element.clone());
        let selection = Selection::fields([("id", Selection::All), ("nested", Selection::keys(["string"]))]);

        let per_element = schema.subset(&element, &selection).unwrap();
        assert_eq!(schema.subset(&array, &selection).unwrap(), Shape::array(per_element));
    }

    #[test]
    fn override_short_circuits_without_inspecting_fields() {
        let schema = catalog();
        let custom = Shape::object([("anything", req(Shape::boolean()))]);
        let root = SchemaNode::reference("Obj");

        let whole = Selection::override_with(custom.clone());
        assert_eq!(schema.subset(&root, &whole).unwrap(), custom);

        let in_field = Selection::fields([
            ("nestedOpt", Selection::override_with(custom.clone())),
            ("array", Selection::override_with(custom.clone())),
        ]);
        let expected = Shape::object([
            ("nestedOpt", opt(custom.clone().nullable())),
            ("array", req(Shape::array(custom))),
        ]);
        assert_eq!(schema.subset(&root, &in_field).unwrap(), expected);
    }

    #[test]
    fn result_keys_are_exactly_the_picked_keys() {
        let shape = subset_of("Item", json!({ "value": true, "nestedOpt": { "number": true } }));
        let keys: Vec<&str> = shape.fields().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["nestedOpt", "value"]);
    }

    #[test]
    fn required_nullable_and_optional_non_nullable_fields() {
        let schema = Schema::new();
        let root = SchemaNode::object([
            ("a", FieldSpec::required(SchemaNode::string()).nullable()),
            ("b", FieldSpec::required(SchemaNode::string()).optional()),
            ("c", FieldSpec::required(SchemaNode::string())),
        ]);
        let shape = schema.subset(&root, &Selection::keys(["a", "b", "c"])).unwrap();
        assert_eq!(shape.to_string(), "{ a: string | null; b?: string; c: string }");
    }

    #[test]
    fn equal_inputs_project_identically_across_threads() {
        let schema = catalog();
        let root = SchemaNode::reference("Obj");
        let selection = Selection::from_json(json!({ "nested": { "obj": { "array": { "id": true } } } })).unwrap();
        let baseline = schema.subset(&root, &selection).unwrap();

        let (schema, root, selection) = (&schema, &root, &selection);
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(move || schema.subset(root, selection).unwrap()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), baseline);
            }
        });
    }
}

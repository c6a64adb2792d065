use tracing::{debug, warn};

use super::{is_denylisted, is_reserved, BindingError, BindingResult};
use crate::models::{NodeRepresentation, PropertyRepresentation};
use crate::repository::{Node, PropertyType, PropertyValue};

/// Add every mixin the node accepts. Mixins that cannot be added are skipped.
pub fn apply_mixins<N: Node>(node: &N, mixins: &[String]) -> BindingResult<()> {
    for mixin in mixins {
        if node.can_add_mixin(mixin)? {
            node.add_mixin(mixin)?;
        } else {
            warn!("Skipping mixin '{}' that cannot be added to {}", mixin, node.path()?);
        }
    }
    Ok(())
}

pub fn apply_properties<N: Node>(node: &N, properties: &[PropertyRepresentation]) -> BindingResult<()> {
    for property in properties {
        if is_denylisted(&property.name) {
            debug!("Ignoring housekeeping property '{}'", property.name);
            continue;
        }
        apply_property(node, property)?;
    }
    Ok(())
}

/// Set one property, replacing any previous value(s) wholesale.
///
/// A property cannot switch between single and multiple values in place, so an
/// existing property of the other cardinality is removed first.
pub fn apply_property<N: Node>(node: &N, property: &PropertyRepresentation) -> BindingResult<()> {
    if property.name.trim().is_empty() {
        return Err(BindingError::MissingField("name"));
    }
    let property_type = resolve_type(property)?;
    let coerce = |raw: &String| {
        property_type
            .parse_value(raw)
            .map_err(|e| BindingError::from_value_error(&property.name, e))
    };

    let value = if property.multiple {
        let values = property.values.iter().map(coerce).collect::<BindingResult<Vec<_>>>()?;
        PropertyValue::Multiple(property_type, values)
    } else {
        let first = property
            .values
            .first()
            .ok_or_else(|| BindingError::MissingValue(property.name.clone()))?;
        PropertyValue::Single(coerce(first)?)
    };

    if node.has_property(&property.name)? {
        let existing = node.property(&property.name)?;
        if existing.is_multiple() != property.multiple {
            node.remove_property(&property.name)?;
        }
    }
    node.set_property(&property.name, value)?;
    Ok(())
}

fn resolve_type(property: &PropertyRepresentation) -> BindingResult<PropertyType> {
    match PropertyType::from_name(&property.property_type) {
        Some(PropertyType::Undefined) => Ok(PropertyType::String),
        Some(property_type) => Ok(property_type),
        None => Err(BindingError::UnknownType {
            property: property.name.clone(),
            type_name: property.property_type.clone(),
        }),
    }
}

/// Create the whole subtree described by `children` under `node`.
///
/// Unlike the read path there is no depth budget: every nested level in the
/// submitted document is materialized.
pub fn apply_child_nodes<N: Node>(node: &N, children: &[NodeRepresentation]) -> BindingResult<()> {
    for child in children {
        if child.name.trim().is_empty() {
            return Err(BindingError::MissingField("name"));
        }
        if child.primary_type.trim().is_empty() {
            return Err(BindingError::MissingField("primaryType"));
        }
        let created = node.add_node(&child.name, &child.primary_type)?;
        populate(&created, child)?;
    }
    Ok(())
}

/// Apply mixins, then properties, then children of `representation` onto `node`
pub fn populate<N: Node>(node: &N, representation: &NodeRepresentation) -> BindingResult<()> {
    apply_mixins(node, &representation.mixin_types)?;
    apply_properties(node, &representation.properties)?;
    apply_child_nodes(node, &representation.children)
}

/// Replace the content of `node` in place with `representation`.
///
/// Client properties, children and mixins are stripped and the primary type is
/// reset before the representation is applied. The node keeps its identifier.
pub fn reset_node<N: Node>(node: &N, representation: &NodeRepresentation) -> BindingResult<()> {
    if representation.primary_type.trim().is_empty() {
        return Err(BindingError::MissingField("primaryType"));
    }

    for property in node.properties()? {
        if !is_reserved(&property.name) {
            node.remove_property(&property.name)?;
        }
    }
    for child in node.nodes()? {
        child.remove()?;
    }
    for mixin in node.mixin_types()? {
        node.remove_mixin(&mixin)?;
    }
    node.set_primary_type(&representation.primary_type)?;

    populate(node, representation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::representation_of;
    use crate::repository::memory::{MemoryNode, MemoryRepository, MemorySession};
    use crate::repository::{Credentials, Repository, RepositoryError, Session, Value};
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    fn session() -> MemorySession {
        let repository = MemoryRepository::new();
        let admin = Credentials::new("admin", "admin");
        repository.bootstrap(&admin).unwrap();
        repository.login(&admin).unwrap()
    }

    fn target(session: &MemorySession) -> MemoryNode {
        session.root_node().unwrap().add_node("target", "nt:unstructured").unwrap()
    }

    #[test]
    fn test_single_value_round_trip() {
        let session = session();
        let node = target(&session);
        apply_property(&node, &PropertyRepresentation::single("p", "String", "v")).unwrap();

        let read = representation_of(&node, 0).unwrap();
        let p = read.property("p").unwrap();
        assert!(!p.multiple);
        assert_eq!(p.values, vec!["v"]);
        assert_eq!(p.property_type, "String");
    }

    #[test]
    fn test_single_to_multiple_replaces_value() {
        let session = session();
        let node = target(&session);
        apply_property(&node, &PropertyRepresentation::single("p", "String", "old")).unwrap();
        apply_property(&node, &PropertyRepresentation::multiple("p", "String", ["a", "b"])).unwrap();

        let p = node.property("p").unwrap();
        assert!(p.is_multiple());
        assert_eq!(p.value.strings(), vec!["a", "b"]);
    }

    #[test]
    fn test_multiple_to_single_replaces_values() {
        let session = session();
        let node = target(&session);
        apply_property(&node, &PropertyRepresentation::multiple("p", "Long", ["1", "2"])).unwrap();
        apply_property(&node, &PropertyRepresentation::single("p", "Long", "3")).unwrap();

        let p = node.property("p").unwrap();
        assert!(!p.is_multiple());
        assert_eq!(p.values(), &[Value::Long(3)]);
    }

    #[test]
    fn test_same_cardinality_overwrites_without_merging() {
        let session = session();
        let node = target(&session);
        apply_property(&node, &PropertyRepresentation::multiple("p", "String", ["a", "b"])).unwrap();
        apply_property(&node, &PropertyRepresentation::multiple("p", "String", ["c"])).unwrap();
        assert_eq!(node.property("p").unwrap().value.strings(), vec!["c"]);
    }

    #[test]
    fn test_binary_is_base64_decoded() {
        let session = session();
        let node = target(&session);
        let encoded = STANDARD.encode("hello");
        apply_property(&node, &PropertyRepresentation::single("data", "Binary", encoded.clone())).unwrap();

        assert_eq!(node.property("data").unwrap().values(), &[Value::Binary(b"hello".to_vec())]);
        let read = representation_of(&node, 0).unwrap();
        let decoded = STANDARD.decode(&read.property("data").unwrap().values[0]).unwrap();
        assert_eq!(decoded, b"hello");
    }

    #[test]
    fn test_invalid_base64_is_an_encoding_error() {
        let session = session();
        let node = target(&session);
        let err = apply_property(&node, &PropertyRepresentation::single("data", "Binary", "%%%")).unwrap_err();
        assert!(matches!(err, BindingError::Encoding { .. }));
        assert!(!node.has_property("data").unwrap());
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let session = session();
        let node = target(&session);
        let err = apply_property(&node, &PropertyRepresentation::single("p", "Text", "v")).unwrap_err();
        assert_eq!(
            err,
            BindingError::UnknownType {
                property: "p".to_string(),
                type_name: "Text".to_string()
            }
        );
    }

    #[test]
    fn test_single_without_values_is_rejected() {
        let session = session();
        let node = target(&session);
        let empty = PropertyRepresentation {
            name: "p".to_string(),
            property_type: "String".to_string(),
            multiple: false,
            values: Vec::new(),
        };
        assert_eq!(
            apply_property(&node, &empty).unwrap_err(),
            BindingError::MissingValue("p".to_string())
        );
    }

    #[test]
    fn test_unparseable_value_is_rejected() {
        let session = session();
        let node = target(&session);
        let err = apply_property(&node, &PropertyRepresentation::single("n", "Long", "ten")).unwrap_err();
        assert!(matches!(err, BindingError::InvalidValue { .. }));
    }

    #[test]
    fn test_denylisted_properties_are_ignored() {
        let session = session();
        let node = target(&session);
        apply_properties(
            &node,
            &[
                PropertyRepresentation::multiple("hippo:paths", "String", ["x"]),
                PropertyRepresentation::single("hippo:related", "String", "y"),
                PropertyRepresentation::single("kept", "String", "z"),
            ],
        )
        .unwrap();
        assert!(!node.has_property("hippo:paths").unwrap());
        assert!(!node.has_property("hippo:related").unwrap());
        assert!(node.has_property("kept").unwrap());
    }

    #[test]
    fn test_unaddable_mixins_are_skipped() {
        let session = session();
        let node = target(&session);
        apply_mixins(
            &node,
            &["mix:versionable".to_string(), "not:a:real:mixin".to_string()],
        )
        .unwrap();
        assert_eq!(node.mixin_types().unwrap(), vec!["mix:versionable".to_string()]);
    }

    #[test]
    fn test_child_creation_has_no_depth_limit() {
        let session = session();
        let node = target(&session);

        let mut deepest = NodeRepresentation::new("level5", "nt:unstructured");
        deepest.properties.push(PropertyRepresentation::single("leaf", "Boolean", "true"));
        for level in (1..5).rev() {
            let mut parent = NodeRepresentation::new(format!("level{}", level), "nt:unstructured");
            parent.children.push(deepest);
            deepest = parent;
        }
        apply_child_nodes(&node, &[deepest]).unwrap();

        let leaf = session
            .property("/target/level1/level2/level3/level4/level5/leaf")
            .unwrap();
        assert_eq!(leaf.values(), &[Value::Boolean(true)]);

        // reading back stays bounded by the depth budget
        let read = representation_of(&node, 2).unwrap();
        assert!(read.children[0].children[0].children.is_empty());
    }

    #[test]
    fn test_child_without_primary_type_aborts() {
        let session = session();
        let node = target(&session);
        let child = NodeRepresentation::new("child", "");
        assert_eq!(
            apply_child_nodes(&node, &[child]).unwrap_err(),
            BindingError::MissingField("primaryType")
        );
    }

    #[test]
    fn test_duplicate_child_is_a_repository_error() {
        let session = session();
        let node = target(&session);
        let child = NodeRepresentation::new("child", "nt:unstructured");
        let err = apply_child_nodes(&node, &[child.clone(), child]).unwrap_err();
        assert!(matches!(err, BindingError::Repository(RepositoryError::ItemExists(_))));
    }

    #[test]
    fn test_reset_preserves_identifier() {
        let session = session();
        let node = target(&session);
        node.add_mixin("mix:referenceable").unwrap();
        apply_property(&node, &PropertyRepresentation::single("old", "String", "x")).unwrap();
        node.add_node("stale", "nt:unstructured").unwrap();
        let identifier = node.identifier().unwrap();

        let mut replacement = NodeRepresentation::new("target", "hippo:document");
        replacement.mixin_types.push("mix:versionable".to_string());
        replacement.properties.push(PropertyRepresentation::single("new", "String", "y"));
        replacement.children.push(NodeRepresentation::new("fresh", "nt:unstructured"));
        reset_node(&node, &replacement).unwrap();

        let read = representation_of(&node, 1).unwrap();
        assert_eq!(read.identifier, identifier);
        assert_eq!(read.primary_type, "hippo:document");
        assert_eq!(read.mixin_types, vec!["mix:versionable".to_string()]);
        assert_eq!(read.properties.len(), 1);
        assert_eq!(read.properties[0].name, "new");
        assert_eq!(read.children.len(), 1);
        assert_eq!(read.children[0].name, "fresh");
    }

    #[test]
    fn test_failed_write_leaves_nothing_after_discard() {
        let repository = MemoryRepository::new();
        let admin = Credentials::new("admin", "admin");
        repository.bootstrap(&admin).unwrap();

        let session = repository.login(&admin).unwrap();
        let node = target(&session);
        let mut child = NodeRepresentation::new("child", "nt:unstructured");
        child.properties.push(PropertyRepresentation::single("p", "Nope", "v"));
        assert!(apply_child_nodes(&node, &[child]).is_err());
        session.logout();

        let session = repository.login(&admin).unwrap();
        assert!(!session.node_exists("/target").unwrap());
    }
}

use super::{is_reserved, BindingResult};
use crate::models::{NodeRepresentation, PropertyRepresentation};
use crate::repository::{Node, Property};

/// Snapshot `node` with children expanded `depth` levels deep.
///
/// Depth 0 never lists children. The first repository error aborts the whole
/// snapshot; no partially populated representation is returned.
pub fn representation_of<N: Node>(node: &N, depth: u32) -> BindingResult<NodeRepresentation> {
    let mut representation = NodeRepresentation {
        name: node.name()?,
        identifier: node.identifier()?,
        path: node.path()?,
        primary_type: node.primary_type()?,
        mixin_types: node.mixin_types()?,
        ..Default::default()
    };

    for property in node.properties()? {
        if !is_reserved(&property.name) {
            representation.properties.push(property_representation_of(&property));
        }
    }

    if depth > 0 && node.has_nodes()? {
        for child in node.nodes()? {
            representation.children.push(representation_of(&child, depth - 1)?);
        }
    }

    Ok(representation)
}

pub fn property_representation_of(property: &Property) -> PropertyRepresentation {
    PropertyRepresentation {
        name: property.name.clone(),
        property_type: property.property_type().name().to_string(),
        multiple: property.is_multiple(),
        values: property.value.strings(),
    }
}

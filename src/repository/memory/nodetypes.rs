use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::repository::names::{
    JCR_MIXIN_TYPES, JCR_PRIMARY_TYPE, JCR_UUID, MIX_REFERENCEABLE, NT_EXTERNALGROUP,
    NT_EXTERNALUSER, NT_GROUP, NT_USER,
};

/// Registered mixin types and the mixins each one implies
static MIXIN_TYPES: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    let entries: [(&'static str, &'static [&'static str]); 20] = [
        ("mix:referenceable", &[]),
        ("mix:simpleVersionable", &[]),
        ("mix:versionable", &["mix:referenceable", "mix:simpleVersionable"]),
        ("mix:lockable", &[]),
        ("mix:shareable", &["mix:referenceable"]),
        ("mix:title", &[]),
        ("mix:created", &[]),
        ("mix:lastModified", &[]),
        ("mix:language", &[]),
        ("mix:mimeType", &[]),
        ("mix:etag", &[]),
        ("hippo:harddocument", &["mix:versionable", "mix:referenceable", "mix:simpleVersionable"]),
        ("hippo:harddocument_compat", &["mix:referenceable"]),
        ("hippo:named", &[]),
        ("hippo:translated", &[]),
        ("hippo:container", &[]),
        ("hippostd:publishable", &[]),
        ("hippostd:publishableSummary", &[]),
        ("hippostd:relaxed", &[]),
        ("hippotranslation:translated", &[]),
    ];
    entries.into_iter().collect()
});

/// Primary types that inherit from another registered primary type
static PRIMARY_SUPERTYPES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (NT_EXTERNALUSER, NT_USER),
        (NT_EXTERNALGROUP, NT_GROUP),
        ("nt:folder", "nt:hierarchyNode"),
        ("nt:file", "nt:hierarchyNode"),
        ("hippostd:folder", "hippo:document"),
        ("hippostd:directory", "hippo:document"),
    ])
});

/// Properties maintained by the repository itself
pub(crate) const PROTECTED_PROPERTIES: &[&str] = &[JCR_PRIMARY_TYPE, JCR_MIXIN_TYPES, JCR_UUID];

pub(crate) fn is_registered_mixin(name: &str) -> bool {
    MIXIN_TYPES.contains_key(name)
}

pub(crate) fn is_protected(property: &str) -> bool {
    PROTECTED_PROPERTIES.contains(&property)
}

/// Declared mixins plus everything they imply
pub(crate) fn effective_mixins(declared: &[String]) -> Vec<String> {
    let mut effective: Vec<String> = Vec::new();
    for mixin in declared {
        if !effective.contains(mixin) {
            effective.push(mixin.clone());
        }
        if let Some(implied) = MIXIN_TYPES.get(mixin.as_str()) {
            for name in implied.iter() {
                if !effective.iter().any(|m| m == name) {
                    effective.push(name.to_string());
                }
            }
        }
    }
    effective
}

pub(crate) fn is_referenceable(declared: &[String]) -> bool {
    effective_mixins(declared).iter().any(|m| m == MIX_REFERENCEABLE)
}

/// `nt:base` matches every node; primary types match their registered supertypes
pub(crate) fn is_node_type(primary_type: &str, declared_mixins: &[String], node_type: &str) -> bool {
    if node_type == "nt:base" || primary_type == node_type {
        return true;
    }
    let mut current = primary_type;
    while let Some(parent) = PRIMARY_SUPERTYPES.get(current) {
        if *parent == node_type {
            return true;
        }
        current = parent;
    }
    effective_mixins(declared_mixins).iter().any(|m| m == node_type)
}

/// Mixin can be added when registered and not already in effect
pub(crate) fn can_add_mixin(declared_mixins: &[String], mixin: &str) -> bool {
    is_registered_mixin(mixin) && !effective_mixins(declared_mixins).iter().any(|m| m == mixin)
}

use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use super::nodetypes;
use crate::repository::names::{JCR_MIXIN_TYPES, JCR_PRIMARY_TYPE, JCR_UUID};
use crate::repository::{
    absolute_path, Property, PropertyType, PropertyValue, RepositoryError, RepositoryResult, Value,
};

/// Identifier of the root node, fixed across restarts
pub const ROOT_ID: Uuid = Uuid::from_u128(0xcafebabe_cafe_babe_cafe_babecafebabe);

pub const ROOT_TYPE: &str = "rep:root";

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NodeRecord {
    pub name: String,
    pub parent: Option<Uuid>,
    pub primary_type: String,
    pub mixins: Vec<String>,
    pub properties: Vec<(String, PropertyValue)>,
    pub children: Vec<Uuid>,
}

/// Arena of node records making up one workspace tree
#[derive(Debug, Clone)]
pub(crate) struct Workspace {
    nodes: HashMap<Uuid, NodeRecord>,
    pub revision: u64,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            ROOT_ID,
            NodeRecord {
                name: String::new(),
                parent: None,
                primary_type: ROOT_TYPE.to_string(),
                mixins: Vec::new(),
                properties: Vec::new(),
                children: Vec::new(),
            },
        );
        Self { nodes, revision: 0 }
    }

    pub fn record(&self, id: Uuid) -> RepositoryResult<&NodeRecord> {
        self.nodes
            .get(&id)
            .ok_or_else(|| RepositoryError::InvalidItemState(format!("node {} has been removed", id)))
    }

    pub fn record_mut(&mut self, id: Uuid) -> RepositoryResult<&mut NodeRecord> {
        self.nodes
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::InvalidItemState(format!("node {} has been removed", id)))
    }

    #[cfg(test)]
    pub fn contains(&self, id: Uuid) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn path_of(&self, id: Uuid) -> RepositoryResult<String> {
        let mut segments = Vec::new();
        let mut current = self.record(id)?;
        while let Some(parent) = current.parent {
            segments.push(current.name.as_str());
            current = self.record(parent)?;
        }
        if segments.is_empty() {
            return Ok("/".to_string());
        }
        segments.reverse();
        Ok(format!("/{}", segments.join("/")))
    }

    /// Resolve an absolute path to a node id
    pub fn resolve(&self, path: &str) -> RepositoryResult<Option<Uuid>> {
        if !path.trim().starts_with('/') {
            return Err(RepositoryError::InvalidPath(format!("'{}' is not absolute", path)));
        }
        let path = absolute_path(path);
        let mut current = ROOT_ID;
        for segment in path.split('/').filter(|s| !s.is_empty() && *s != ".") {
            if segment == ".." {
                current = self.record(current)?.parent.unwrap_or(ROOT_ID);
                continue;
            }
            match self.child_named(current, segment)? {
                Some(child) => current = child,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    pub fn child_named(&self, parent: Uuid, name: &str) -> RepositoryResult<Option<Uuid>> {
        let record = self.record(parent)?;
        Ok(record
            .children
            .iter()
            .copied()
            .find(|child| self.nodes.get(child).map(|r| r.name == name).unwrap_or(false)))
    }

    pub fn add_child(&mut self, parent: Uuid, name: &str, primary_type: &str) -> RepositoryResult<Uuid> {
        validate_name(name)?;
        if primary_type.trim().is_empty() {
            return Err(RepositoryError::NoSuchNodeType("primary type is required".to_string()));
        }
        validate_name(primary_type).map_err(|_| RepositoryError::NoSuchNodeType(primary_type.to_string()))?;
        if self.child_named(parent, name)?.is_some() {
            let parent_path = self.path_of(parent)?;
            return Err(RepositoryError::ItemExists(format!(
                "{}/{}",
                parent_path.trim_end_matches('/'),
                name
            )));
        }

        let id = Uuid::new_v4();
        self.nodes.insert(
            id,
            NodeRecord {
                name: name.to_string(),
                parent: Some(parent),
                primary_type: primary_type.to_string(),
                mixins: Vec::new(),
                properties: Vec::new(),
                children: Vec::new(),
            },
        );
        self.record_mut(parent)?.children.push(id);
        Ok(id)
    }

    /// Remove a node and its whole subtree
    pub fn remove(&mut self, id: Uuid) -> RepositoryResult<()> {
        let parent = self
            .record(id)?
            .parent
            .ok_or_else(|| RepositoryError::ConstraintViolation("the root node cannot be removed".to_string()))?;
        if let Some(record) = self.nodes.get_mut(&parent) {
            record.children.retain(|child| *child != id);
        }
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if let Some(record) = self.nodes.remove(&next) {
                pending.extend(record.children);
            }
        }
        Ok(())
    }

    /// Node ids in document order, starting at the root
    pub fn document_order(&self) -> Vec<Uuid> {
        let mut ordered = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![ROOT_ID];
        while let Some(id) = stack.pop() {
            if let Some(record) = self.nodes.get(&id) {
                ordered.push(id);
                stack.extend(record.children.iter().rev().copied());
            }
        }
        ordered
    }

    /// Properties including the synthetic protected ones, in repository order
    pub fn properties(&self, id: Uuid) -> RepositoryResult<Vec<Property>> {
        let record = self.record(id)?;
        let node_path = self.path_of(id)?;
        let item_path = |name: &str| {
            if node_path == "/" {
                format!("/{}", name)
            } else {
                format!("{}/{}", node_path, name)
            }
        };

        let mut properties = vec![Property {
            name: JCR_PRIMARY_TYPE.to_string(),
            path: item_path(JCR_PRIMARY_TYPE),
            value: PropertyValue::Single(Value::Name(record.primary_type.clone())),
        }];
        if !record.mixins.is_empty() {
            properties.push(Property {
                name: JCR_MIXIN_TYPES.to_string(),
                path: item_path(JCR_MIXIN_TYPES),
                value: PropertyValue::Multiple(
                    PropertyType::Name,
                    record.mixins.iter().map(|m| Value::Name(m.clone())).collect(),
                ),
            });
        }
        if nodetypes::is_referenceable(&record.mixins) {
            properties.push(Property {
                name: JCR_UUID.to_string(),
                path: item_path(JCR_UUID),
                value: PropertyValue::Single(Value::String(id.to_string())),
            });
        }
        properties.extend(record.properties.iter().map(|(name, value)| Property {
            name: name.clone(),
            path: item_path(name),
            value: value.clone(),
        }));
        Ok(properties)
    }

    pub fn property(&self, id: Uuid, name: &str) -> RepositoryResult<Option<Property>> {
        Ok(self.properties(id)?.into_iter().find(|p| p.name == name))
    }

    /// Set a property; the cardinality of an existing property cannot change in place
    pub fn set_property(&mut self, id: Uuid, name: &str, value: PropertyValue) -> RepositoryResult<()> {
        validate_name(name)?;
        if nodetypes::is_protected(name) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "property {} is protected",
                name
            )));
        }
        if let PropertyValue::Multiple(property_type, values) = &value {
            if let Some(odd) = values.iter().find(|v| v.property_type() != *property_type) {
                return Err(RepositoryError::ValueFormat(format!(
                    "value of type {} in a {} multi-value property",
                    odd.property_type(),
                    property_type
                )));
            }
        }

        let record = self.record_mut(id)?;
        match record.properties.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, existing)) => {
                if existing.is_multiple() != value.is_multiple() {
                    let cardinality = if existing.is_multiple() { "multi-valued" } else { "single-valued" };
                    return Err(RepositoryError::ValueFormat(format!(
                        "property {} is {}; remove it before changing its cardinality",
                        name, cardinality
                    )));
                }
                *existing = value;
            }
            None => record.properties.push((name.to_string(), value)),
        }
        Ok(())
    }

    pub fn remove_property(&mut self, id: Uuid, name: &str) -> RepositoryResult<()> {
        if nodetypes::is_protected(name) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "property {} is protected",
                name
            )));
        }
        let node_path = self.path_of(id)?;
        let record = self.record_mut(id)?;
        let before = record.properties.len();
        record.properties.retain(|(existing, _)| existing != name);
        if record.properties.len() == before {
            return Err(RepositoryError::PathNotFound(format!(
                "{}/{}",
                node_path.trim_end_matches('/'),
                name
            )));
        }
        Ok(())
    }
}

impl Workspace {
    /// Replay the changes between `base` and `changed` onto this workspace.
    ///
    /// Records compare by their own content. Child lists merge as sets, so two
    /// sessions adding different children under one parent both land. A node
    /// changed differently on both sides, or changed on one side and removed on
    /// the other, is a conflict and leaves `self` half-merged.
    pub fn merge(&mut self, base: &Workspace, changed: &Workspace) -> RepositoryResult<()> {
        let conflict = |id: Uuid| {
            let path = changed
                .path_of(id)
                .or_else(|_| base.path_of(id))
                .unwrap_or_else(|_| id.to_string());
            RepositoryError::InvalidItemState(format!("{} was modified by another session", path))
        };

        let ids: HashSet<Uuid> = base.nodes.keys().chain(changed.nodes.keys()).copied().collect();
        let mut touched = Vec::new();

        for id in ids {
            let before = base.nodes.get(&id);
            let after = changed.nodes.get(&id);
            if before == after {
                continue;
            }
            let current = self.nodes.get(&id).cloned();

            let content_changed = !same_content(before, after);
            if content_changed
                && !same_content(before, current.as_ref())
                && !same_content(after, current.as_ref())
            {
                return Err(conflict(id));
            }

            match (after, current) {
                (None, None) => {}
                (None, Some(current)) => {
                    if before != Some(&current) {
                        return Err(conflict(id));
                    }
                    self.nodes.remove(&id);
                }
                (Some(_), None) if before.is_some() => return Err(conflict(id)),
                (Some(after), None) => {
                    self.nodes.insert(id, after.clone());
                }
                (Some(after), Some(current)) => {
                    let base_children = before.map(|b| b.children.as_slice()).unwrap_or_default();
                    let mut children = current.children.clone();
                    children.retain(|child| !base_children.contains(child) || after.children.contains(child));
                    for child in &after.children {
                        if !base_children.contains(child) && !children.contains(child) {
                            children.push(*child);
                        }
                    }

                    let mut record = if content_changed { after.clone() } else { current.clone() };
                    if children != current.children {
                        touched.push(id);
                    }
                    record.children = children;
                    self.nodes.insert(id, record);
                }
            }
        }

        for parent in touched {
            let record = self.record(parent)?;
            let mut names = HashSet::new();
            for child in &record.children {
                let child = self.nodes.get(child).ok_or_else(|| conflict(parent))?;
                if !names.insert(child.name.as_str()) {
                    let parent_path = self.path_of(parent)?;
                    return Err(RepositoryError::ItemExists(format!(
                        "{}/{}",
                        parent_path.trim_end_matches('/'),
                        child.name
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Equal apart from the child list
fn same_content(a: Option<&NodeRecord>, b: Option<&NodeRecord>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => {
            a.name == b.name
                && a.parent == b.parent
                && a.primary_type == b.primary_type
                && a.mixins == b.mixins
                && a.properties == b.properties
        }
        _ => false,
    }
}

/// Validate a node, property or node type name
pub(crate) fn validate_name(name: &str) -> RepositoryResult<()> {
    let invalid = |reason: &str| RepositoryError::InvalidPath(format!("'{}' {}", name, reason));

    if name.trim().is_empty() {
        return Err(invalid("is empty"));
    }
    if name == "." || name == ".." {
        return Err(invalid("is a reserved name"));
    }
    if name.chars().any(|c| matches!(c, '/' | '[' | ']' | '*' | '|') || c.is_control()) {
        return Err(invalid("contains illegal characters"));
    }
    let mut parts = name.splitn(2, ':');
    let first = parts.next().unwrap_or_default();
    if let Some(local) = parts.next() {
        if first.is_empty() || local.is_empty() || local.contains(':') {
            return Err(invalid("is not a valid qualified name"));
        }
    }
    Ok(())
}

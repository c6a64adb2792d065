use std::sync::Arc;
use uuid::Uuid;

use super::nodetypes;
use super::tree::{validate_name, NodeRecord, Workspace};
use super::SessionState;
use crate::repository::{Node, Property, PropertyValue, RepositoryError, RepositoryResult};

/// Node handle bound to one session's transient workspace
#[derive(Clone)]
pub struct MemoryNode {
    pub(super) state: Arc<SessionState>,
    pub(super) id: Uuid,
}

impl std::fmt::Debug for MemoryNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryNode").field("id", &self.id).finish()
    }
}

impl MemoryNode {
    pub(super) fn new(state: Arc<SessionState>, id: Uuid) -> Self {
        Self { state, id }
    }

    fn sibling(&self, id: Uuid) -> Self {
        Self::new(self.state.clone(), id)
    }

    fn with_record<T>(&self, f: impl FnOnce(&NodeRecord) -> T) -> RepositoryResult<T> {
        self.state.read(|ws| ws.record(self.id).map(f))
    }

    fn update(&self, f: impl FnOnce(&mut Workspace, Uuid) -> RepositoryResult<()>) -> RepositoryResult<()> {
        self.state.write(|ws| f(ws, self.id))
    }
}

impl Node for MemoryNode {
    fn name(&self) -> RepositoryResult<String> {
        self.with_record(|r| r.name.clone())
    }

    fn identifier(&self) -> RepositoryResult<String> {
        self.state.read(|ws| ws.record(self.id).map(|_| self.id.to_string()))
    }

    fn path(&self) -> RepositoryResult<String> {
        self.state.read(|ws| ws.path_of(self.id))
    }

    fn primary_type(&self) -> RepositoryResult<String> {
        self.with_record(|r| r.primary_type.clone())
    }

    fn set_primary_type(&self, node_type: &str) -> RepositoryResult<()> {
        if node_type.trim().is_empty() {
            return Err(RepositoryError::NoSuchNodeType("primary type is required".to_string()));
        }
        validate_name(node_type).map_err(|_| RepositoryError::NoSuchNodeType(node_type.to_string()))?;
        if nodetypes::is_registered_mixin(node_type) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "{} is a mixin type",
                node_type
            )));
        }
        self.update(|ws, id| {
            ws.record_mut(id)?.primary_type = node_type.to_string();
            Ok(())
        })
    }

    fn mixin_types(&self) -> RepositoryResult<Vec<String>> {
        self.with_record(|r| r.mixins.clone())
    }

    fn is_node_type(&self, node_type: &str) -> RepositoryResult<bool> {
        self.with_record(|r| nodetypes::is_node_type(&r.primary_type, &r.mixins, node_type))
    }

    fn can_add_mixin(&self, mixin: &str) -> RepositoryResult<bool> {
        self.with_record(|r| nodetypes::can_add_mixin(&r.mixins, mixin))
    }

    fn add_mixin(&self, mixin: &str) -> RepositoryResult<()> {
        if !nodetypes::is_registered_mixin(mixin) {
            return Err(RepositoryError::NoSuchNodeType(mixin.to_string()));
        }
        self.update(|ws, id| {
            let record = ws.record_mut(id)?;
            if !nodetypes::effective_mixins(&record.mixins).iter().any(|m| m == mixin) {
                record.mixins.push(mixin.to_string());
            }
            Ok(())
        })
    }

    fn remove_mixin(&self, mixin: &str) -> RepositoryResult<()> {
        self.update(|ws, id| {
            let record = ws.record_mut(id)?;
            let before = record.mixins.len();
            record.mixins.retain(|m| m != mixin);
            if record.mixins.len() == before {
                return Err(RepositoryError::NoSuchNodeType(format!(
                    "{} is not applied to this node",
                    mixin
                )));
            }
            Ok(())
        })
    }

    fn properties(&self) -> RepositoryResult<Vec<Property>> {
        self.state.read(|ws| ws.properties(self.id))
    }

    fn has_property(&self, name: &str) -> RepositoryResult<bool> {
        self.state.read(|ws| Ok(ws.property(self.id, name)?.is_some()))
    }

    fn property(&self, name: &str) -> RepositoryResult<Property> {
        self.state.read(|ws| {
            ws.property(self.id, name)?.ok_or_else(|| {
                let path = ws.path_of(self.id).unwrap_or_default();
                RepositoryError::PathNotFound(format!("{}/{}", path.trim_end_matches('/'), name))
            })
        })
    }

    fn set_property(&self, name: &str, value: PropertyValue) -> RepositoryResult<()> {
        self.update(|ws, id| ws.set_property(id, name, value))
    }

    fn remove_property(&self, name: &str) -> RepositoryResult<()> {
        self.update(|ws, id| ws.remove_property(id, name))
    }

    fn has_nodes(&self) -> RepositoryResult<bool> {
        self.with_record(|r| !r.children.is_empty())
    }

    fn nodes(&self) -> RepositoryResult<Vec<Self>> {
        self.with_record(|r| r.children.iter().map(|child| self.sibling(*child)).collect())
    }

    fn node(&self, name: &str) -> RepositoryResult<Self> {
        let child = self.state.read(|ws| ws.child_named(self.id, name))?;
        match child {
            Some(id) => Ok(self.sibling(id)),
            None => {
                let path = self.path()?;
                Err(RepositoryError::PathNotFound(format!(
                    "{}/{}",
                    path.trim_end_matches('/'),
                    name
                )))
            }
        }
    }

    fn add_node(&self, name: &str, primary_type: &str) -> RepositoryResult<Self> {
        if nodetypes::is_registered_mixin(primary_type) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "{} is a mixin type",
                primary_type
            )));
        }
        let mut created = None;
        self.update(|ws, id| {
            created = Some(ws.add_child(id, name, primary_type)?);
            Ok(())
        })?;
        created
            .map(|id| self.sibling(id))
            .ok_or_else(|| RepositoryError::Internal("node was not created".to_string()))
    }

    fn parent(&self) -> RepositoryResult<Self> {
        let parent = self.with_record(|r| r.parent)?;
        parent
            .map(|id| self.sibling(id))
            .ok_or_else(|| RepositoryError::PathNotFound("the root node has no parent".to_string()))
    }

    fn remove(&self) -> RepositoryResult<()> {
        self.update(|ws, id| ws.remove(id))
    }
}

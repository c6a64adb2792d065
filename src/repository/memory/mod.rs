//! In-process repository backed by an arena tree.
//!
//! Every session works on its own copy of the workspace. `save` replays the
//! session's changes onto whatever was persisted in the meantime and fails only
//! when another session changed the same node. Dropping the session discards
//! whatever was not saved.

mod node;
mod nodetypes;
mod query;
mod tree;

use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, info, warn};

pub use node::MemoryNode;
pub use tree::ROOT_ID;

use tree::Workspace;

use crate::auth;
use crate::repository::names::*;
use crate::repository::{
    split_path, Credentials, Node, Property, PropertyValue, QueryRequest, QueryResult, QueryRow,
    Repository, RepositoryError, RepositoryResult, Session, Value,
};

fn poisoned<T>(_: T) -> RepositoryError {
    RepositoryError::Internal("workspace lock poisoned".to_string())
}

struct Transient {
    /// Persisted state the session's changes are relative to
    base: Workspace,
    workspace: Workspace,
    dirty: bool,
}

pub(crate) struct SessionState {
    user_id: String,
    transient: Mutex<Transient>,
    persisted: Arc<RwLock<Workspace>>,
    live: AtomicBool,
}

impl SessionState {
    fn ensure_live(&self) -> RepositoryResult<()> {
        if self.live.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(RepositoryError::InvalidItemState("session has been closed".to_string()))
        }
    }

    pub(crate) fn read<T>(&self, f: impl FnOnce(&Workspace) -> RepositoryResult<T>) -> RepositoryResult<T> {
        self.ensure_live()?;
        let transient = self.transient.lock().map_err(poisoned)?;
        f(&transient.workspace)
    }

    pub(crate) fn write<T>(&self, f: impl FnOnce(&mut Workspace) -> RepositoryResult<T>) -> RepositoryResult<T> {
        self.ensure_live()?;
        let mut transient = self.transient.lock().map_err(poisoned)?;
        let result = f(&mut transient.workspace)?;
        transient.dirty = true;
        Ok(result)
    }
}

/// Session over a private copy of the workspace
pub struct MemorySession {
    state: Arc<SessionState>,
}

impl std::fmt::Debug for MemorySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySession").field("user_id", &self.state.user_id).finish()
    }
}

impl MemorySession {
    fn node_at(&self, path: &str) -> RepositoryResult<Option<MemoryNode>> {
        let id = self.state.read(|ws| ws.resolve(path))?;
        Ok(id.map(|id| MemoryNode::new(self.state.clone(), id)))
    }

    /// True when this session holds changes that were not saved yet
    pub fn has_pending_changes(&self) -> bool {
        self.state.transient.lock().map(|t| t.dirty).unwrap_or(false)
    }
}

impl Session for MemorySession {
    type Node = MemoryNode;

    fn user_id(&self) -> &str {
        &self.state.user_id
    }

    fn root_node(&self) -> RepositoryResult<MemoryNode> {
        self.state.ensure_live()?;
        Ok(MemoryNode::new(self.state.clone(), ROOT_ID))
    }

    fn node_exists(&self, path: &str) -> RepositoryResult<bool> {
        Ok(self.node_at(path)?.is_some())
    }

    fn node(&self, path: &str) -> RepositoryResult<MemoryNode> {
        self.node_at(path)?
            .ok_or_else(|| RepositoryError::PathNotFound(path.to_string()))
    }

    fn property_exists(&self, path: &str) -> RepositoryResult<bool> {
        let Some((parent, name)) = split_path(path) else {
            return Ok(false);
        };
        match self.node_at(&parent)? {
            Some(node) => node.has_property(&name),
            None => Ok(false),
        }
    }

    fn property(&self, path: &str) -> RepositoryResult<Property> {
        let (parent, name) =
            split_path(path).ok_or_else(|| RepositoryError::PathNotFound(path.to_string()))?;
        let node = self
            .node_at(&parent)?
            .ok_or_else(|| RepositoryError::PathNotFound(path.to_string()))?;
        node.property(&name)
    }

    fn query(&self, request: &QueryRequest) -> RepositoryResult<QueryResult<MemoryNode>> {
        let (ids, total_hits) = self.state.read(|ws| query::execute(ws, request))?;
        debug!(
            "Query '{}' ({}) matched {} node(s)",
            request.statement,
            request.language.as_str(),
            total_hits
        );
        let rows = ids
            .into_iter()
            .map(|id| QueryRow {
                node: MemoryNode::new(self.state.clone(), id),
                score: 1.0,
            })
            .collect();
        Ok(QueryResult { total_hits, rows })
    }

    fn save(&self) -> RepositoryResult<()> {
        self.state.ensure_live()?;
        let mut transient = self.state.transient.lock().map_err(poisoned)?;
        if !transient.dirty {
            return Ok(());
        }

        let mut persisted = self.state.persisted.write().map_err(poisoned)?;
        let mut merged = if persisted.revision == transient.base.revision {
            transient.workspace.clone()
        } else {
            let mut merged = persisted.clone();
            merged.merge(&transient.base, &transient.workspace)?;
            merged
        };
        merged.revision = persisted.revision + 1;

        *persisted = merged.clone();
        transient.base = merged.clone();
        transient.workspace = merged;
        transient.dirty = false;
        debug!(
            "Session of '{}' saved workspace revision {}",
            self.state.user_id, persisted.revision
        );
        Ok(())
    }

    fn logout(self) {
        // Drop does the rest
    }
}

impl Drop for MemorySession {
    fn drop(&mut self) {
        self.state.live.store(false, Ordering::Release);
        if self.has_pending_changes() {
            debug!("Discarding unsaved changes of '{}'", self.state.user_id);
        }
    }
}

/// Repository holding one workspace in memory
pub struct MemoryRepository {
    workspace: Arc<RwLock<Workspace>>,
    descriptors: HashMap<String, String>,
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRepository {
    pub fn new() -> Self {
        let descriptors = HashMap::from([
            (REP_NAME_DESC.to_string(), "In-Memory Content Repository".to_string()),
            (REP_VENDOR_DESC.to_string(), env!("CARGO_PKG_NAME").to_string()),
            (REP_VERSION_DESC.to_string(), env!("CARGO_PKG_VERSION").to_string()),
        ]);
        Self {
            workspace: Arc::new(RwLock::new(Workspace::new())),
            descriptors,
        }
    }

    pub fn with_descriptor(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.descriptors.insert(key.into(), value.into());
        self
    }

    /// Create the security configuration folders and the administrator account.
    /// Existing items are left alone, so calling this twice is harmless.
    pub fn bootstrap(&self, admin: &Credentials) -> RepositoryResult<()> {
        let mut ws = self.workspace.write().map_err(poisoned)?;

        let configuration = ensure_child(&mut ws, ROOT_ID, CONFIGURATION_PATH, NT_CONFIGURATION)?;
        let users = ensure_child(&mut ws, configuration, USERS_PATH, NT_USERFOLDER)?;
        let groups = ensure_child(&mut ws, configuration, GROUPS_PATH, NT_GROUPFOLDER)?;

        if ws.child_named(users, &admin.username)?.is_none() {
            let user = ws.add_child(users, &admin.username, NT_USER)?;
            ws.set_property(
                user,
                PROP_PASSWORD,
                PropertyValue::string(auth::hash_password(&admin.password)),
            )?;
            ws.set_property(
                user,
                PROP_PASSWORDLASTMODIFIED,
                PropertyValue::Single(Value::Date(Utc::now().fixed_offset())),
            )?;
            ws.set_property(user, PROP_ACTIVE, PropertyValue::Single(Value::Boolean(true)))?;
            ws.set_property(user, PROP_SECURITYPROVIDER, PropertyValue::string("internal"))?;
            info!("Bootstrapped administrator account '{}'", admin.username);
        }

        if ws.child_named(groups, "admin")?.is_none() {
            let group = ws.add_child(groups, "admin", NT_GROUP)?;
            ws.set_property(group, PROP_MEMBERS, PropertyValue::strings_of([admin.username.as_str()]))?;
            ws.set_property(group, PROP_SECURITYPROVIDER, PropertyValue::string("internal"))?;
        }

        ws.revision += 1;
        Ok(())
    }

    fn authenticate(&self, ws: &Workspace, credentials: &Credentials) -> RepositoryResult<()> {
        let denied = || RepositoryError::Login(format!("invalid credentials for '{}'", credentials.username));

        let users = ws.resolve(USERS_PATH)?.ok_or_else(denied)?;
        let user = ws.child_named(users, &credentials.username)?.ok_or_else(denied)?;
        let record = ws.record(user)?;
        if !is_user_record(record) {
            return Err(denied());
        }

        let active = ws
            .property(user, PROP_ACTIVE)?
            .and_then(|p| p.values().first().and_then(Value::as_bool))
            .unwrap_or(true);
        if !active {
            warn!("Login refused for inactive user '{}'", credentials.username);
            return Err(denied());
        }

        let stored = ws
            .property(user, PROP_PASSWORD)?
            .and_then(|p| p.string())
            .ok_or_else(denied)?;
        match auth::verify_password(&credentials.password, &stored) {
            Ok(true) => Ok(()),
            Ok(false) => Err(denied()),
            Err(e) => {
                warn!("Stored password of '{}' cannot be verified: {}", credentials.username, e);
                Err(denied())
            }
        }
    }
}

fn is_user_record(record: &tree::NodeRecord) -> bool {
    nodetypes::is_node_type(&record.primary_type, &record.mixins, NT_USER)
}

fn ensure_child(
    ws: &mut Workspace,
    parent: uuid::Uuid,
    path: &str,
    primary_type: &str,
) -> RepositoryResult<uuid::Uuid> {
    if let Some(existing) = ws.resolve(path)? {
        return Ok(existing);
    }
    let (_, name) =
        split_path(path).ok_or_else(|| RepositoryError::InvalidPath(path.to_string()))?;
    ws.add_child(parent, &name, primary_type)
}

impl Repository for MemoryRepository {
    type Session = MemorySession;

    fn login(&self, credentials: &Credentials) -> RepositoryResult<MemorySession> {
        let snapshot = {
            let ws = self.workspace.read().map_err(poisoned)?;
            self.authenticate(&ws, credentials)?;
            ws.clone()
        };
        debug!("Opened session for '{}' at revision {}", credentials.username, snapshot.revision);

        Ok(MemorySession {
            state: Arc::new(SessionState {
                user_id: credentials.username.clone(),
                transient: Mutex::new(Transient {
                    base: snapshot.clone(),
                    workspace: snapshot,
                    dirty: false,
                }),
                persisted: self.workspace.clone(),
                live: AtomicBool::new(true),
            }),
        })
    }

    fn descriptor(&self, key: &str) -> Option<String> {
        self.descriptors.get(key).cloned()
    }
}

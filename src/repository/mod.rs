//! Repository boundary
//!
//! The REST facade never talks to storage directly. Everything goes through the
//! `Repository` / `Session` / `Node` traits defined here: a repository hands out
//! sessions for authenticated credentials, a session resolves items by path and
//! runs queries, and node handles expose the item-level read/write operations.
//! All calls are synchronous; transient changes only become visible to other
//! sessions after `Session::save`.
//!
//! `memory` provides a complete in-process implementation.

pub mod memory;
pub mod names;
pub mod value;

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub use value::{PropertyType, PropertyValue, Value, ValueError};

/// Errors surfaced by repository implementations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RepositoryError {
    #[error("Login failed: {0}")]
    Login(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Item already exists: {0}")]
    ItemExists(String),

    #[error("Invalid item state: {0}")]
    InvalidItemState(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Value format error: {0}")]
    ValueFormat(String),

    #[error("No such node type: {0}")]
    NoSuchNodeType(String),

    #[error("Invalid path or name: {0}")]
    InvalidPath(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Repository error: {0}")]
    Internal(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Username/password pair presented at login
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Snapshot of a property as read from a node
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub path: String,
    pub value: PropertyValue,
}

impl Property {
    pub fn is_multiple(&self) -> bool {
        self.value.is_multiple()
    }

    pub fn property_type(&self) -> PropertyType {
        self.value.property_type()
    }

    pub fn values(&self) -> &[Value] {
        self.value.values()
    }

    /// First value's string form; what a scalar accessor returns on a single-valued property
    pub fn string(&self) -> Option<String> {
        self.values().first().map(|v| v.to_string())
    }
}

/// Query languages understood at the boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryLanguage {
    XPath,
    Sql,
    JcrSql2,
}

impl QueryLanguage {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryLanguage::XPath => "xpath",
            QueryLanguage::Sql => "sql",
            QueryLanguage::JcrSql2 => "JCR-SQL2",
        }
    }
}

impl FromStr for QueryLanguage {
    type Err = RepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xpath" => Ok(QueryLanguage::XPath),
            "sql" => Ok(QueryLanguage::Sql),
            "jcr-sql2" | "sql2" => Ok(QueryLanguage::JcrSql2),
            other => Err(RepositoryError::InvalidQuery(format!(
                "unsupported query language '{}'",
                other
            ))),
        }
    }
}

/// A query statement with optional paging
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub statement: String,
    pub language: QueryLanguage,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl QueryRequest {
    pub fn new(statement: impl Into<String>, language: QueryLanguage) -> Self {
        Self {
            statement: statement.into(),
            language,
            limit: None,
            offset: None,
        }
    }

    pub fn limit(mut self, limit: u64) -> Self {
        if limit > 0 {
            self.limit = Some(limit);
        }
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        if offset > 0 {
            self.offset = Some(offset);
        }
        self
    }
}

#[derive(Debug)]
pub struct QueryRow<N> {
    pub node: N,
    pub score: f64,
}

/// Rows of one result page plus the total hit count before paging
#[derive(Debug)]
pub struct QueryResult<N> {
    pub total_hits: u64,
    pub rows: Vec<QueryRow<N>>,
}

/// Entry point: a repository authenticates credentials and hands out sessions
pub trait Repository: Send + Sync + 'static {
    type Session: Session;

    fn login(&self, credentials: &Credentials) -> RepositoryResult<Self::Session>;

    /// Repository descriptor such as `jcr.repository.name`
    fn descriptor(&self, key: &str) -> Option<String>;
}

/// One authenticated, workspace-bound unit of work
pub trait Session {
    type Node: Node;

    fn user_id(&self) -> &str;

    fn root_node(&self) -> RepositoryResult<Self::Node>;

    fn node_exists(&self, path: &str) -> RepositoryResult<bool>;

    fn node(&self, path: &str) -> RepositoryResult<Self::Node>;

    fn property_exists(&self, path: &str) -> RepositoryResult<bool>;

    fn property(&self, path: &str) -> RepositoryResult<Property>;

    fn query(&self, request: &QueryRequest) -> RepositoryResult<QueryResult<Self::Node>>;

    /// Persist all transient changes made through this session
    fn save(&self) -> RepositoryResult<()>;

    /// Discard transient changes and close the session
    fn logout(self);
}

/// Handle to a node inside a session
pub trait Node: Sized {
    fn name(&self) -> RepositoryResult<String>;

    fn identifier(&self) -> RepositoryResult<String>;

    fn path(&self) -> RepositoryResult<String>;

    fn primary_type(&self) -> RepositoryResult<String>;

    fn set_primary_type(&self, node_type: &str) -> RepositoryResult<()>;

    /// Mixins declared on the node, in the order they were added
    fn mixin_types(&self) -> RepositoryResult<Vec<String>>;

    fn is_node_type(&self, node_type: &str) -> RepositoryResult<bool>;

    fn can_add_mixin(&self, mixin: &str) -> RepositoryResult<bool>;

    fn add_mixin(&self, mixin: &str) -> RepositoryResult<()>;

    fn remove_mixin(&self, mixin: &str) -> RepositoryResult<()>;

    /// All properties including protected system ones, in repository order
    fn properties(&self) -> RepositoryResult<Vec<Property>>;

    fn has_property(&self, name: &str) -> RepositoryResult<bool>;

    fn property(&self, name: &str) -> RepositoryResult<Property>;

    fn set_property(&self, name: &str, value: PropertyValue) -> RepositoryResult<()>;

    fn remove_property(&self, name: &str) -> RepositoryResult<()>;

    fn has_nodes(&self) -> RepositoryResult<bool>;

    fn nodes(&self) -> RepositoryResult<Vec<Self>>;

    fn node(&self, name: &str) -> RepositoryResult<Self>;

    fn add_node(&self, name: &str, primary_type: &str) -> RepositoryResult<Self>;

    fn parent(&self) -> RepositoryResult<Self>;

    /// Remove this node and its subtree
    fn remove(&self) -> RepositoryResult<()>;
}

/// Normalize a request path into an absolute repository path
pub fn absolute_path(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return "/".to_string();
    }
    let mut absolute = if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    };
    while absolute.len() > 1 && absolute.ends_with('/') {
        absolute.pop();
    }
    absolute
}

/// Split an absolute item path into its parent path and last segment
pub fn split_path(path: &str) -> Option<(String, String)> {
    let path = absolute_path(path);
    if path == "/" {
        return None;
    }
    let idx = path.rfind('/')?;
    let parent = if idx == 0 { "/".to_string() } else { path[..idx].to_string() };
    Some((parent, path[idx + 1..].to_string()))
}

use chrono::Utc;

use super::{quote_literal, ServiceError};
use crate::auth;
use crate::models::{Group, User};
use crate::repository::names::*;
use crate::repository::{Node, PropertyValue, QueryLanguage, QueryRequest, Session, Value};

const QUERY_USER: &str = "SELECT * FROM hipposys:user WHERE fn:name()='{}'";
const QUERY_USERS: &str = "SELECT * FROM hipposys:user";
const QUERY_LOCAL_MEMBERSHIPS: &str = "//element(*, hipposys:group)[@hipposys:members='{}']";

/// User accounts stored under the users folder, looked up through queries
pub struct UserService<'a, S: Session> {
    session: &'a S,
}

impl<'a, S: Session> UserService<'a, S> {
    pub fn new(session: &'a S) -> Self {
        Self { session }
    }

    pub fn select_one(&self, username: &str) -> Result<Option<S::Node>, ServiceError> {
        let statement = QUERY_USER.replace("{}", &quote_literal(username));
        let request = QueryRequest::new(statement, QueryLanguage::Sql).limit(1);
        let result = self.session.query(&request)?;
        Ok(result.rows.into_iter().next().map(|row| row.node))
    }

    pub fn select_404(&self, username: &str) -> Result<S::Node, ServiceError> {
        self.select_one(username)?
            .ok_or_else(|| ServiceError::NotFound(format!("User '{}' not found", username)))
    }

    pub fn exists(&self, username: &str) -> Result<bool, ServiceError> {
        Ok(self.select_one(username)?.is_some())
    }

    /// One page of users in repository order
    pub fn select_page(&self, limit: u64, offset: u64) -> Result<Vec<User>, ServiceError> {
        let request = QueryRequest::new(QUERY_USERS, QueryLanguage::Sql)
            .limit(limit)
            .offset(offset);
        let result = self.session.query(&request)?;
        result
            .rows
            .iter()
            .map(|row| user_from_node(&row.node))
            .collect()
    }

    pub fn find(&self, username: &str) -> Result<User, ServiceError> {
        let node = self.select_404(username)?;
        let mut user = user_from_node(&node)?;
        user.groups = Some(self.memberships(&user.username)?);
        Ok(user)
    }

    /// Groups listing the user as a member; empty when the user does not exist
    pub fn memberships(&self, username: &str) -> Result<Vec<Group>, ServiceError> {
        let statement = QUERY_LOCAL_MEMBERSHIPS.replace("{}", &quote_literal(username));
        let request = QueryRequest::new(statement, QueryLanguage::XPath);
        let result = self.session.query(&request)?;

        let mut groups = Vec::with_capacity(result.rows.len());
        for row in &result.rows {
            let node = &row.node;
            let mut group = Group::new(node.name()?);
            if node.has_property(PROP_DESCRIPTION)? {
                group.description = node.property(PROP_DESCRIPTION)?.string();
            }
            group.external = node.is_node_type(NT_EXTERNALGROUP)?;
            groups.push(group);
        }
        Ok(groups)
    }

    /// Create a user node; the caller saves the session
    pub fn create_one(&self, user: &User) -> Result<S::Node, ServiceError> {
        if user.username.trim().is_empty() {
            return Err(ServiceError::Validation("username is required".to_string()));
        }
        if self.exists(&user.username)? {
            return Err(ServiceError::Conflict(format!(
                "User with name '{}' already exists.",
                user.username
            )));
        }
        if user.external {
            return Err(ServiceError::Conflict(
                "External managed users can't be created through this interface.".to_string(),
            ));
        }
        let password = user
            .password
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ServiceError::Validation("password is required".to_string()))?;

        let folder = self.session.node(USERS_PATH)?;
        let node = folder.add_node(&user.username, NT_USER)?;
        set_optional_string(&node, PROP_EMAIL, user.email.as_deref())?;
        set_optional_string(&node, PROP_FIRSTNAME, user.first_name.as_deref())?;
        set_optional_string(&node, PROP_LASTNAME, user.last_name.as_deref())?;
        node.set_property(PROP_ACTIVE, PropertyValue::Single(Value::Boolean(user.active)))?;
        node.set_property(
            PROP_PASSWORDLASTMODIFIED,
            PropertyValue::Single(Value::Date(Utc::now().fixed_offset())),
        )?;
        node.set_property(PROP_PASSWORD, PropertyValue::string(auth::hash_password(password)))?;

        tracing::info!("Created user '{}'", user.username);
        Ok(node)
    }

    pub fn delete_404(&self, username: &str) -> Result<(), ServiceError> {
        let node = self.select_404(username)?;
        node.remove()?;
        tracing::info!("Deleted user '{}'", username);
        Ok(())
    }
}

fn set_optional_string<N: Node>(node: &N, name: &str, value: Option<&str>) -> Result<(), ServiceError> {
    match value {
        Some(value) => node.set_property(name, PropertyValue::string(value))?,
        None if node.has_property(name)? => node.remove_property(name)?,
        None => {}
    }
    Ok(())
}

/// Map a user node onto the public model; credentials never leave the node
pub fn user_from_node<N: Node>(node: &N) -> Result<User, ServiceError> {
    let mut user = User::new(node.name()?);
    user.path = Some(node.path()?.trim_start_matches('/').to_string());
    user.external = node.is_node_type(NT_EXTERNALUSER)?;

    for property in node.properties()? {
        let name = property.name.as_str();
        if name.starts_with("jcr:") {
            continue;
        }
        if name == PROP_EMAIL || name.eq_ignore_ascii_case("email") {
            user.email = property.string();
        } else if name == PROP_FIRSTNAME || name.eq_ignore_ascii_case("firstname") {
            user.first_name = property.string();
        } else if name == PROP_LASTNAME || name.eq_ignore_ascii_case("lastname") {
            user.last_name = property.string();
        } else if name == PROP_ACTIVE {
            user.active = property.values().first().and_then(Value::as_bool).unwrap_or(true);
        } else if name == PROP_SYSTEM {
            user.system = property.values().first().and_then(Value::as_bool).unwrap_or(false);
        } else if name == PROP_PASSWORDLASTMODIFIED {
            user.password_last_modified = property.values().first().and_then(Value::as_date);
        }
        // password, passkey, previous passwords and security provider are not exposed
    }
    Ok(user)
}

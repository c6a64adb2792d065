use super::{quote_literal, ServiceError};
use crate::models::Group;
use crate::repository::names::*;
use crate::repository::{Node, PropertyValue, QueryLanguage, QueryRequest, Session};

const QUERY_GROUP: &str = "SELECT * FROM hipposys:group WHERE fn:name()='{}'";
const QUERY_ALL: &str = "SELECT * FROM hipposys:group";

pub struct GroupService<'a, S: Session> {
    session: &'a S,
}

impl<'a, S: Session> GroupService<'a, S> {
    pub fn new(session: &'a S) -> Self {
        Self { session }
    }

    pub fn select_one(&self, name: &str) -> Result<Option<S::Node>, ServiceError> {
        let statement = QUERY_GROUP.replace("{}", &quote_literal(name));
        let request = QueryRequest::new(statement, QueryLanguage::Sql).limit(1);
        let result = self.session.query(&request)?;
        Ok(result.rows.into_iter().next().map(|row| row.node))
    }

    pub fn select_404(&self, name: &str) -> Result<S::Node, ServiceError> {
        self.select_one(name)?
            .ok_or_else(|| ServiceError::NotFound(format!("Group '{}' not found", name)))
    }

    pub fn select_page(&self, limit: u64, offset: u64) -> Result<Vec<Group>, ServiceError> {
        let request = QueryRequest::new(QUERY_ALL, QueryLanguage::Sql)
            .limit(limit)
            .offset(offset);
        let result = self.session.query(&request)?;
        result.rows.iter().map(|row| group_from_node(&row.node)).collect()
    }

    pub fn find(&self, name: &str) -> Result<Group, ServiceError> {
        group_from_node(&self.select_404(name)?)
    }

    /// Create a group node; the caller saves the session
    pub fn create_one(&self, group: &Group) -> Result<S::Node, ServiceError> {
        if group.name.trim().is_empty() {
            return Err(ServiceError::Validation("group name is required".to_string()));
        }
        if self.select_one(&group.name)?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Group with name '{}' already exists.",
                group.name
            )));
        }
        if group.external {
            return Err(ServiceError::Conflict(
                "External managed group can't be created through this interface.".to_string(),
            ));
        }

        let folder = self.session.node(GROUPS_PATH)?;
        let node = folder.add_node(&group.name, NT_GROUP)?;
        if let Some(description) = &group.description {
            node.set_property(PROP_DESCRIPTION, PropertyValue::string(description.as_str()))?;
        }
        if let Some(members) = &group.members {
            node.set_property(PROP_MEMBERS, PropertyValue::strings_of(members.iter().map(String::as_str)))?;
        }

        tracing::info!("Created group '{}'", group.name);
        Ok(node)
    }

    pub fn delete_404(&self, name: &str) -> Result<(), ServiceError> {
        self.select_404(name)?.remove()?;
        tracing::info!("Deleted group '{}'", name);
        Ok(())
    }
}

pub fn group_from_node<N: Node>(node: &N) -> Result<Group, ServiceError> {
    let mut group = Group::new(node.name()?);
    if node.has_property(PROP_DESCRIPTION)? {
        group.description = node.property(PROP_DESCRIPTION)?.string();
    }
    group.external = node.is_node_type(NT_EXTERNALGROUP)?;
    if node.has_property(PROP_MEMBERS)? {
        group.members = Some(node.property(PROP_MEMBERS)?.value.strings());
    }
    Ok(group)
}

use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use super::nodetypes;
use super::tree::Workspace;
use crate::repository::{QueryLanguage, QueryRequest, RepositoryError, RepositoryResult};

// //element(*, type)[@prop='value'] order by ...
static XPATH_ELEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^//element\(\s*\*\s*,\s*([^\s,()]+)\s*\)(?:\s*\[\s*@([^\s=\]]+)\s*=\s*'((?:[^']|'')*)'\s*\])?(?:\s+(?i:order\s+by)\s+.+)?$",
    )
    .expect("xpath pattern compiles")
});

// SELECT * FROM type [WHERE ...] [ORDER BY ...]
static SQL_SELECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?i:select)\s+\*\s+(?i:from)\s+(\[[^\]]+\]|[^\s\[\]]+)(?:\s+(?i:as)\s+\w+)?(?:\s+(?i:where)\s+(.+?))?(?:\s+(?i:order\s+by)\s+.+)?$",
    )
    .expect("sql pattern compiles")
});

static SQL_NAME_CONDITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i:fn:name|name|localname)\(\s*\w*\s*\)\s*=\s*'((?:[^']|'')*)'$")
        .expect("name condition pattern compiles")
});

static SQL_PROPERTY_CONDITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\w+\.)?\[?([^\s=\[\]]+)\]?\s*=\s*'((?:[^']|'')*)'$")
        .expect("property condition pattern compiles")
});

#[derive(Debug, Clone, PartialEq)]
enum Condition {
    Name(String),
    Property(String, String),
}

/// A parsed statement: every node of `node_type` matching the optional condition
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedQuery {
    node_type: String,
    condition: Option<Condition>,
}

fn unescape(literal: &str) -> String {
    literal.replace("''", "'")
}

fn invalid(statement: &str) -> RepositoryError {
    RepositoryError::InvalidQuery(format!("unsupported statement: {}", statement))
}

pub(crate) fn parse(statement: &str, language: QueryLanguage) -> RepositoryResult<ParsedQuery> {
    let statement = statement.trim();
    match language {
        QueryLanguage::XPath => {
            let caps = XPATH_ELEMENT.captures(statement).ok_or_else(|| invalid(statement))?;
            let condition = match (caps.get(2), caps.get(3)) {
                (Some(property), Some(value)) => Some(Condition::Property(
                    property.as_str().to_string(),
                    unescape(value.as_str()),
                )),
                _ => None,
            };
            Ok(ParsedQuery {
                node_type: caps[1].to_string(),
                condition,
            })
        }
        QueryLanguage::Sql | QueryLanguage::JcrSql2 => {
            let caps = SQL_SELECT.captures(statement).ok_or_else(|| invalid(statement))?;
            let node_type = caps[1].trim_start_matches('[').trim_end_matches(']').to_string();
            let condition = match caps.get(2).map(|m| m.as_str().trim()) {
                None => None,
                Some(clause) => {
                    if let Some(name) = SQL_NAME_CONDITION.captures(clause) {
                        Some(Condition::Name(unescape(&name[1])))
                    } else if let Some(property) = SQL_PROPERTY_CONDITION.captures(clause) {
                        Some(Condition::Property(
                            property[1].to_string(),
                            unescape(&property[2]),
                        ))
                    } else {
                        return Err(invalid(statement));
                    }
                }
            };
            Ok(ParsedQuery { node_type, condition })
        }
    }
}

/// Run a query against a workspace, returning one page of ids and the total hit count
pub(crate) fn execute(workspace: &Workspace, request: &QueryRequest) -> RepositoryResult<(Vec<Uuid>, u64)> {
    let parsed = parse(&request.statement, request.language)?;

    let mut hits = Vec::new();
    for id in workspace.document_order() {
        let record = workspace.record(id)?;
        if !nodetypes::is_node_type(&record.primary_type, &record.mixins, &parsed.node_type) {
            continue;
        }
        let matched = match &parsed.condition {
            None => true,
            Some(Condition::Name(name)) => record.name == *name,
            Some(Condition::Property(property, expected)) => workspace
                .property(id, property)?
                .map(|p| p.values().iter().any(|v| v.to_string() == *expected))
                .unwrap_or(false),
        };
        if matched {
            hits.push(id);
        }
    }

    let total = hits.len() as u64;
    let offset = request.offset.unwrap_or(0) as usize;
    let page: Vec<Uuid> = match request.limit {
        Some(limit) => hits.into_iter().skip(offset).take(limit as usize).collect(),
        None => hits.into_iter().skip(offset).collect(),
    };
    Ok((page, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::memory::tree::ROOT_ID;
    use crate::repository::PropertyValue;

    #[test]
    fn test_parse_facade_statements() {
        let by_name = parse(
            "SELECT * FROM hipposys:user WHERE fn:name()='admin'",
            QueryLanguage::Sql,
        )
        .unwrap();
        assert_eq!(by_name.node_type, "hipposys:user");
        assert_eq!(by_name.condition, Some(Condition::Name("admin".to_string())));

        let members = parse(
            "//element(*, hipposys:group)[@hipposys:members='editor']",
            QueryLanguage::XPath,
        )
        .unwrap();
        assert_eq!(
            members.condition,
            Some(Condition::Property("hipposys:members".to_string(), "editor".to_string()))
        );

        let sql2 = parse("SELECT * FROM [nt:unstructured] AS n", QueryLanguage::JcrSql2).unwrap();
        assert_eq!(sql2.node_type, "nt:unstructured");
        assert_eq!(sql2.condition, None);
    }

    #[test]
    fn test_quotes_are_unescaped() {
        let parsed = parse(
            "SELECT * FROM nt:base WHERE title='it''s'",
            QueryLanguage::Sql,
        )
        .unwrap();
        assert_eq!(
            parsed.condition,
            Some(Condition::Property("title".to_string(), "it's".to_string()))
        );
    }

    #[test]
    fn test_unsupported_statement_is_invalid() {
        let err = parse("/jcr:root/content//*", QueryLanguage::XPath).unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidQuery(_)));
        assert!(parse("DELETE FROM nt:base", QueryLanguage::Sql).is_err());
    }

    #[test]
    fn test_execute_pages_and_counts() {
        let mut ws = Workspace::new();
        for name in ["a", "b", "c"] {
            let id = ws.add_child(ROOT_ID, name, "nt:unstructured").unwrap();
            ws.set_property(id, "tags", PropertyValue::strings_of(["x", name])).unwrap();
        }

        let request = QueryRequest::new("SELECT * FROM nt:unstructured", QueryLanguage::Sql)
            .limit(2)
            .offset(1);
        let (page, total) = execute(&ws, &request).unwrap();
        assert_eq!(total, 3);
        assert_eq!(page.len(), 2);

        let request = QueryRequest::new(
            "//element(*, nt:unstructured)[@tags='b']",
            QueryLanguage::XPath,
        );
        let (page, total) = execute(&ws, &request).unwrap();
        assert_eq!(total, 1);
        assert_eq!(ws.record(page[0]).unwrap().name, "b");
    }
}

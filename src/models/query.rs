use serde::{Deserialize, Serialize};

use super::node::NodeRepresentation;

pub const DEFAULT_QUERY_LIMIT: u64 = 200;

fn default_language() -> String {
    "xpath".to_string()
}

fn default_limit() -> u64 {
    DEFAULT_QUERY_LIMIT
}

/// Query submitted as a JSON body or as request parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub statement: String,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_limit")]
    pub limit: u64,

    #[serde(default)]
    pub offset: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResultNode {
    pub score: f64,
    pub link: String,
    pub node: NodeRepresentation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResultRepresentation {
    /// Milliseconds spent executing and binding
    pub took: u64,
    pub hits: u64,
    pub nodes: Vec<QueryResultNode>,
}

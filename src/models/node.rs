use serde::{Deserialize, Serialize};

/// Snapshot of one node, expanded to the requested depth
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRepresentation {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub identifier: String,

    #[serde(default)]
    pub path: String,

    #[serde(default)]
    pub primary_type: String,

    #[serde(default)]
    pub mixin_types: Vec<String>,

    #[serde(default)]
    pub properties: Vec<PropertyRepresentation>,

    /// Child nodes; `children` is accepted as an input alias
    #[serde(default, rename = "nodes", alias = "children")]
    pub children: Vec<NodeRepresentation>,
}

impl NodeRepresentation {
    pub fn new(name: impl Into<String>, primary_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primary_type: primary_type.into(),
            ..Default::default()
        }
    }

    pub fn property(&self, name: &str) -> Option<&PropertyRepresentation> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn child(&self, name: &str) -> Option<&NodeRepresentation> {
        self.children.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyRepresentation {
    #[serde(default)]
    pub name: String,

    #[serde(rename = "type", default)]
    pub property_type: String,

    #[serde(default)]
    pub multiple: bool,

    #[serde(default)]
    pub values: Vec<String>,
}

impl PropertyRepresentation {
    pub fn single(name: impl Into<String>, property_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            property_type: property_type.into(),
            multiple: false,
            values: vec![value.into()],
        }
    }

    pub fn multiple<I, S>(name: impl Into<String>, property_type: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            property_type: property_type.into(),
            multiple: true,
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

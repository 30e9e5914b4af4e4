use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlogPayload {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodePayload {
    pub code: String,
    #[serde(default)]
    pub filepath: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectReply {
    pub analysis: String,
}

pub type DocumentationMap = Map<String, Value>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateDocReply {
    pub status: String,
    pub docstrings: DocumentationMap,
    pub markdown: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Manifest {
    pub name: String,
    pub description: String,
    pub endpoints: Vec<String>,
}

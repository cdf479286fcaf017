//! Response bodies the store reads.

use serde::Deserialize;
use serde_json::value::RawValue;
use serde_json::Value;
use std::collections::HashMap;

/// Reply to an index or delete request.
#[derive(Debug, Deserialize)]
pub(crate) struct WriteReply {
    #[serde(rename = "_version")]
    pub(crate) version: u64,
}

/// Reply to a document lookup.
#[derive(Debug, Deserialize)]
pub(crate) struct GetReply {
    #[serde(default)]
    pub(crate) found: bool,
    #[serde(rename = "_version")]
    pub(crate) version: Option<u64>,
    #[serde(rename = "_seq_no")]
    pub(crate) seq_no: Option<u64>,
    #[serde(rename = "_primary_term")]
    pub(crate) primary_term: Option<u64>,
    #[serde(rename = "_source")]
    pub(crate) source: Option<Box<RawValue>>,
}

/// Reply to a search.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchReply {
    pub(crate) hits: Hits,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Hits {
    pub(crate) hits: Vec<Hit>,
}

/// One search hit. The source is kept as the exact stored text.
#[derive(Debug, Deserialize)]
pub(crate) struct Hit {
    #[serde(rename = "_id")]
    pub(crate) id: String,
    #[serde(rename = "_version")]
    pub(crate) version: Option<u64>,
    #[serde(rename = "_source")]
    pub(crate) source: Box<RawValue>,
}

/// Reply to `GET /_cluster/health`.
#[derive(Debug, Deserialize)]
pub(crate) struct HealthReply {
    pub(crate) status: String,
}

/// Reply to `GET /{index}/_mapping/field/{field}`, keyed by index name.
pub(crate) type FieldMappingReply = HashMap<String, IndexFieldMappings>;

#[derive(Debug, Deserialize)]
pub(crate) struct IndexFieldMappings {
    #[serde(default)]
    pub(crate) mappings: HashMap<String, FieldMapping>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FieldMapping {
    #[serde(default)]
    pub(crate) mapping: HashMap<String, Value>,
}

impl FieldMapping {
    /// Returns true if the field is mapped as analyzed text.
    pub(crate) fn is_text(&self) -> bool {
        self.mapping
            .values()
            .any(|m| m.get("type").and_then(Value::as_str) == Some("text"))
    }
}

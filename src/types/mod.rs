//! Core data model: documents, backend response shapes, answer records
//!
//! Documents are open field maps mirroring whatever the retrieval backend
//! returns; only `id` and `featureVector` have dedicated accessors. The
//! response structs round-trip unrecognized keys via `#[serde(flatten)]` so
//! the outbound response mirrors the backend shape.

pub mod params;

pub use params::{ParamValue, QueryParams, RawParams};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field holding the space-separated feature vector on each document
pub const FEATURE_VECTOR_FIELD: &str = "featureVector";

/// Field attached to reranked documents carrying the ranker's confidence
pub const CONFIDENCE_FIELD: &str = "confidence";

/// One retrieved document: a mapping from field name to value.
///
/// Backend responses may wrap scalar fields in single-element lists;
/// [`Document::scalar`] normalizes those on read.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Document {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn new() -> Self {
        Self { fields: Map::new() }
    }

    /// Document identifier, normalized to a string
    pub fn id(&self) -> Option<String> {
        match self.scalar("id")? {
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }

    /// Field value with list-of-one normalized to its single element
    pub fn scalar(&self, name: &str) -> Option<Value> {
        match self.fields.get(name)? {
            Value::Array(items) => items.first().cloned(),
            other => Some(other.clone()),
        }
    }

    /// The raw space-separated feature vector string
    pub fn feature_vector(&self) -> Option<String> {
        match self.scalar(FEATURE_VECTOR_FIELD)? {
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }

    pub fn set(&mut self, name: &str, value: Value) {
        self.fields.insert(name.to_string(), value);
    }

    pub fn remove(&mut self, name: &str) {
        self.fields.remove(name);
    }
}

/// `response` body of a retrieval backend reply
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseBody {
    #[serde(rename = "numFound", default)]
    pub num_found: u64,
    #[serde(default)]
    pub start: u64,
    #[serde(default)]
    pub docs: Vec<Document>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Full retrieval backend reply, mirrored back to the caller.
///
/// `RSInput` is the backend's internal newline-delimited training blob; it is
/// only present when the request asked for it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    pub response: ResponseBody,
    #[serde(rename = "RSInput", skip_serializing_if = "Option::is_none")]
    pub rs_input: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of the rerank backend's `answers` list.
///
/// Transient: held only while reconciling reranked order back onto freshly
/// fetched documents, then discarded.
#[derive(Debug, Clone, Deserialize)]
pub struct AnswerRecord {
    pub answer_id: String,
    pub confidence: f64,
    /// Original rank position, when the ranker reports one; list order is
    /// the fallback
    #[serde(default)]
    pub rank: Option<u64>,
}

/// Ordered scores produced for one document by the scorer set
pub type ScoreRecord = Vec<f64>;

//! Query/document term overlap scorer

use crate::scorers::Scorer;
use crate::types::{Document, QueryParams, ScoreRecord};

/// Scores a document by the fraction of query terms present in one field.
///
/// Output is `weight * matches / query_terms`, in `[0, weight]`.
pub struct TermOverlapScorer {
    name: String,
    field: String,
    weight: f64,
}

impl TermOverlapScorer {
    pub fn new(name: &str, field: &str, weight: f64) -> Self {
        Self {
            name: name.to_string(),
            field: field.to_string(),
            weight,
        }
    }

    fn tokenize(text: &str) -> Vec<String> {
        text.split_whitespace().map(|t| t.to_lowercase()).collect()
    }
}

impl Scorer for TermOverlapScorer {
    fn required_fields(&self) -> Vec<String> {
        vec![self.field.clone()]
    }

    fn headers(&self) -> Vec<String> {
        vec![self.name.clone()]
    }

    fn score(&self, params: &QueryParams, doc: &Document) -> ScoreRecord {
        let query_terms = Self::tokenize(&params.q);
        if query_terms.is_empty() {
            return vec![0.0];
        }

        let field_text = match doc.scalar(&self.field) {
            Some(serde_json::Value::String(s)) => s,
            Some(other) => other.to_string(),
            None => return vec![0.0],
        };
        let doc_terms = Self::tokenize(&field_text);

        let matches = query_terms
            .iter()
            .filter(|qt| doc_terms.contains(qt))
            .count();

        vec![self.weight * matches as f64 / query_terms.len() as f64]
    }
}

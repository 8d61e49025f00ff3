//! Field length scorer

use crate::scorers::Scorer;
use crate::types::{Document, QueryParams, ScoreRecord};

/// Scores a document by the character length of one field, normalized
/// against `scale` and capped at 1.0. Longer answers score higher up to the
/// scale point; a missing field scores zero.
pub struct FieldLengthScorer {
    name: String,
    field: String,
    scale: f64,
}

impl FieldLengthScorer {
    pub fn new(name: &str, field: &str, scale: f64) -> Self {
        Self {
            name: name.to_string(),
            field: field.to_string(),
            scale,
        }
    }
}

impl Scorer for FieldLengthScorer {
    fn required_fields(&self) -> Vec<String> {
        vec![self.field.clone()]
    }

    fn headers(&self) -> Vec<String> {
        vec![self.name.clone()]
    }

    fn score(&self, _params: &QueryParams, doc: &Document) -> ScoreRecord {
        let text = match doc.scalar(&self.field) {
            Some(serde_json::Value::String(s)) => s,
            Some(other) => other.to_string(),
            None => return vec![0.0],
        };
        if self.scale <= 0.0 {
            return vec![0.0];
        }
        vec![(text.chars().count() as f64 / self.scale).min(1.0)]
    }
}

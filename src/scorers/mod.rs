//! Custom scorer plug-ins
//!
//! Scorers are interchangeable strategy objects selected by a JSON
//! configuration file at process start. Each one declares the document
//! fields it needs, the header names for the scores it emits, and a
//! deterministic scoring function over one (request, document) pair.
//! A [`ScorerSet`] aggregates them in configuration order; the set is shared
//! read-only across concurrent requests.

pub mod fields;
pub mod overlap;

pub use fields::FieldLengthScorer;
pub use overlap::TermOverlapScorer;

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::errors::{RankError, Result};
use crate::types::{Document, QueryParams, ScoreRecord};

/// One custom scorer strategy.
///
/// Implementations must be stateless with respect to the request: the same
/// (params, document) pair always yields the same scores.
pub trait Scorer: Send + Sync {
    /// Document fields this scorer needs fetched from the retrieval backend
    fn required_fields(&self) -> Vec<String>;

    /// Header names for the scores, in emission order
    fn headers(&self) -> Vec<String>;

    /// Score one document; length and order match [`Scorer::headers`]
    fn score(&self, params: &QueryParams, doc: &Document) -> ScoreRecord;
}

/// Scorer selection entry in the configuration file
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScorerSpec {
    TermOverlap {
        name: String,
        field: String,
        #[serde(default = "default_weight")]
        weight: f64,
    },
    FieldLength {
        name: String,
        field: String,
        #[serde(default = "default_scale")]
        scale: f64,
    },
}

fn default_weight() -> f64 {
    1.0
}

fn default_scale() -> f64 {
    500.0
}

#[derive(Debug, Clone, Deserialize)]
struct ScorerFile {
    scorers: Vec<ScorerSpec>,
}

/// The full ordered set of configured scorers
pub struct ScorerSet {
    scorers: Vec<Box<dyn Scorer>>,
}

impl std::fmt::Debug for ScorerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScorerSet")
            .field("headers", &self.get_headers())
            .finish()
    }
}

impl ScorerSet {
    pub fn new(scorers: Vec<Box<dyn Scorer>>) -> Self {
        Self { scorers }
    }

    /// Load scorer configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let file: ScorerFile = serde_json::from_str(&contents)
            .map_err(|e| RankError::ScorerConfig(format!("{}: {}", path.display(), e)))?;
        Ok(Self::from_specs(&file.scorers))
    }

    pub fn from_specs(specs: &[ScorerSpec]) -> Self {
        let scorers = specs
            .iter()
            .map(|spec| -> Box<dyn Scorer> {
                match spec {
                    ScorerSpec::TermOverlap {
                        name,
                        field,
                        weight,
                    } => Box::new(TermOverlapScorer::new(name, field, *weight)),
                    ScorerSpec::FieldLength { name, field, scale } => {
                        Box::new(FieldLengthScorer::new(name, field, *scale))
                    }
                }
            })
            .collect();
        Self { scorers }
    }

    /// Union of every scorer's required fields, sorted and deduped
    pub fn get_required_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = self
            .scorers
            .iter()
            .flat_map(|s| s.required_fields())
            .collect();
        fields.sort();
        fields.dedup();
        fields
    }

    /// Header names across all scorers, in configuration order
    pub fn get_headers(&self) -> Vec<String> {
        self.scorers.iter().flat_map(|s| s.headers()).collect()
    }

    /// Score one document with every scorer, concatenated in order
    pub fn scores(&self, params: &QueryParams, doc: &Document) -> ScoreRecord {
        self.scorers
            .iter()
            .flat_map(|s| s.score(params, doc))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.scorers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scorers.is_empty()
    }
}

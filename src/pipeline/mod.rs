//! Request pipeline
//!
//! One [`Pipeline`] instance serves every request: it owns the retrieval
//! client, the shared read-only scorer set, and the answer-file directory.
//! A request is processed strictly sequentially — retrieval, augmentation,
//! optional blob rewrite, and (with a `ranker_id`) the rerank flow. Each
//! request allocates its own result set and score records; nothing mutable
//! is shared across requests.

pub mod augment;
pub mod blob;
pub mod rerank;

pub use augment::FeatureAugmenter;
pub use blob::rewrite_blob;
pub use rerank::Reranker;

use std::path::PathBuf;
use std::sync::Arc;

use crate::client::{RetrievalClient, SearchBackend};
use crate::errors::{RankError, Result};
use crate::scorers::ScorerSet;
use crate::types::params::{DEFAULT_RERANK_ROWS, DEFAULT_SEARCH_ROWS};
use crate::types::{QueryParams, SearchResponse, FEATURE_VECTOR_FIELD};

/// Default row limits, overridable from configuration
#[derive(Debug, Clone)]
pub struct PipelineDefaults {
    pub search_rows: u32,
    pub rerank_rows: u32,
}

impl Default for PipelineDefaults {
    fn default() -> Self {
        Self {
            search_rows: DEFAULT_SEARCH_ROWS,
            rerank_rows: DEFAULT_RERANK_ROWS,
        }
    }
}

/// The full query-processing pipeline
pub struct Pipeline<C: SearchBackend = RetrievalClient> {
    scorers: Arc<ScorerSet>,
    client: C,
    answer_dir: PathBuf,
    defaults: PipelineDefaults,
}

impl<C: SearchBackend> Pipeline<C> {
    pub fn new(
        scorers: Arc<ScorerSet>,
        client: C,
        answer_dir: PathBuf,
        defaults: PipelineDefaults,
    ) -> Self {
        Self {
            scorers,
            client,
            answer_dir,
            defaults,
        }
    }

    /// Entry point for one query request.
    ///
    /// A present `ranker_id` hands the whole request to the rerank flow;
    /// otherwise the plain search path runs and the rerank backend is never
    /// contacted.
    pub async fn fcselect(&self, params: &QueryParams) -> Result<SearchResponse> {
        if params.ranker_id.is_some() {
            let reranker = Reranker::new(&self.client, &self.scorers, &self.answer_dir);
            reranker.run(params, &self.defaults).await
        } else {
            self.search(params).await
        }
    }

    /// Plain search path: retrieve, augment, and optionally rewrite the
    /// training blob from a second blob-returning retrieval call
    async fn search(&self, params: &QueryParams) -> Result<SearchResponse> {
        let rows = params.rows.unwrap_or(self.defaults.search_rows);
        let display = params.display_fields();

        let mut base_params = vec![
            ("q".to_string(), params.q.clone()),
            ("rows".to_string(), rows.to_string()),
            ("fl".to_string(), required_fl(&self.scorers, &display)),
            ("wt".to_string(), "json".to_string()),
        ];
        if let Some(gt) = &params.gt {
            base_params.push(("gt".to_string(), gt.clone()));
        }

        let mut retrieved = self.client.fcselect(&base_params).await?;

        let augmenter = FeatureAugmenter::new(&self.scorers);
        let scores = augmenter.augment(params, &mut retrieved.response.docs);

        if params.rs_input_requested() {
            let mut rs_params = base_params.clone();
            if let Some(value) = &params.generate_header {
                rs_params.push(("generateHeader".to_string(), value.clone()));
            }
            if let Some(value) = &params.return_rs_input {
                rs_params.push(("returnRSInput".to_string(), value.clone()));
            }

            let rs_response = self.client.fcselect(&rs_params).await?;
            let blob = rs_response.rs_input.ok_or_else(|| {
                RankError::ContractViolation(
                    "blob-returning retrieval response missing RSInput".to_string(),
                )
            })?;

            retrieved.rs_input = Some(rewrite_blob(
                &blob,
                &scores,
                &self.scorers.get_headers(),
                params.header_requested(),
            )?);
        }

        Ok(retrieved)
    }
}

/// The `fl` superset sent to the retrieval backend: every scorer-required
/// field, the feature vector itself, and the caller's display fields.
/// Sorted and deduped so the request is deterministic.
pub(crate) fn required_fl(scorers: &ScorerSet, display_fields: &[String]) -> String {
    let mut fields = scorers.get_required_fields();
    fields.push(FEATURE_VECTOR_FIELD.to_string());
    fields.extend(display_fields.iter().cloned());
    fields.sort();
    fields.dedup();
    fields.join(",")
}

//! Rerank path: augment, persist, submit, reconcile
//!
//! When a request carries a `ranker_id` the reranker subsumes the whole
//! flow: its own blob-returning retrieval call, augmentation, blob rewrite,
//! a persisted answer file submitted to the rerank backend, and a final
//! reconciliation lookup that reorders freshly fetched documents by the
//! ranker's answer order and attaches its confidence scores.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::client::SearchBackend;
use crate::errors::{RankError, Result};
use crate::pipeline::augment::FeatureAugmenter;
use crate::pipeline::blob::rewrite_blob;
use crate::pipeline::{required_fl, PipelineDefaults};
use crate::scorers::ScorerSet;
use crate::types::{AnswerRecord, Document, QueryParams, SearchResponse, CONFIDENCE_FIELD};

/// Executes the rerank flow for one request
pub struct Reranker<'a, C: SearchBackend> {
    client: &'a C,
    scorers: &'a ScorerSet,
    answer_dir: &'a Path,
}

impl<'a, C: SearchBackend> Reranker<'a, C> {
    pub fn new(client: &'a C, scorers: &'a ScorerSet, answer_dir: &'a Path) -> Self {
        Self {
            client,
            scorers,
            answer_dir,
        }
    }

    pub async fn run(
        &self,
        params: &QueryParams,
        defaults: &PipelineDefaults,
    ) -> Result<SearchResponse> {
        let ranker_id = params
            .ranker_id
            .as_deref()
            .ok_or(RankError::MissingParam("ranker_id"))?;
        let rows = params.rows.unwrap_or(defaults.rerank_rows);
        let search_rows = params.search_rows.unwrap_or(defaults.search_rows);

        // Retrieval with the scorer-required field superset and the training
        // blob. Contract checks happen before any side effects.
        let display = params.display_fields();
        let fc_params = vec![
            ("q".to_string(), params.q.clone()),
            ("rows".to_string(), search_rows.to_string()),
            ("fl".to_string(), required_fl(self.scorers, &display)),
            ("wt".to_string(), "json".to_string()),
            ("generateHeader".to_string(), "true".to_string()),
            ("returnRSInput".to_string(), "true".to_string()),
        ];
        let mut retrieved = self.client.fcselect(&fc_params).await?;
        let rs_input = retrieved.rs_input.clone().ok_or_else(|| {
            RankError::ContractViolation("retrieval response missing RSInput".to_string())
        })?;

        let augmenter = FeatureAugmenter::new(self.scorers);
        let scores = augmenter.augment(params, &mut retrieved.response.docs);

        let rewritten = rewrite_blob(&rs_input, &scores, &self.scorers.get_headers(), true)?;
        let header = rewritten.lines().next().unwrap_or_default().to_string();

        let rows_out: Vec<(String, Vec<String>)> = retrieved
            .response
            .docs
            .iter()
            .map(|doc| {
                let id = doc.id().unwrap_or_default();
                let features = doc
                    .feature_vector()
                    .unwrap_or_default()
                    .split_whitespace()
                    .map(|t| t.to_string())
                    .collect();
                (id, features)
            })
            .collect();

        let answer_file = persist_answer_file(self.answer_dir, &header, &rows_out).await?;
        let answers = self.client.rank(ranker_id, &answer_file).await?;

        self.reconcile(&answers, params, rows).await
    }

    /// Fetch the reranked documents fresh and order them by original rank
    async fn reconcile(
        &self,
        answers: &[AnswerRecord],
        params: &QueryParams,
        rows: u32,
    ) -> Result<SearchResponse> {
        let id_query = answers
            .iter()
            .map(|a| format!("id:{}", a.answer_id))
            .collect::<Vec<_>>()
            .join(" ");
        let lookup_params = vec![
            ("q".to_string(), id_query),
            ("fl".to_string(), params.fl_string()),
            ("wt".to_string(), "json".to_string()),
        ];
        let mut response = self.client.select(&lookup_params).await?;

        let fetched = std::mem::take(&mut response.response.docs);
        let mut docs = order_by_rank(answers, fetched);
        docs.truncate(rows as usize);
        response.response.docs = docs;
        Ok(response)
    }
}

/// Place each fetched document at its answer's original rank position and
/// attach the confidence score. Output order depends only on the answers'
/// ranks, never on lookup arrival order; ids the lookup did not return are
/// dropped.
pub fn order_by_rank(answers: &[AnswerRecord], fetched: Vec<Document>) -> Vec<Document> {
    // Ranker-reported ranks win when every answer carries one; otherwise
    // the answers list order stands in for rank.
    let mut ordered: Vec<&AnswerRecord> = answers.iter().collect();
    if answers.iter().all(|a| a.rank.is_some()) {
        ordered.sort_by_key(|a| a.rank.unwrap_or(u64::MAX));
    }

    let position: HashMap<&str, usize> = ordered
        .iter()
        .enumerate()
        .map(|(i, a)| (a.answer_id.as_str(), i))
        .collect();
    let confidence: HashMap<&str, f64> = answers
        .iter()
        .map(|a| (a.answer_id.as_str(), a.confidence))
        .collect();

    let mut slots: Vec<Option<Document>> = vec![None; answers.len()];
    for mut doc in fetched {
        let Some(id) = doc.id() else { continue };
        if let (Some(&pos), Some(&conf)) = (position.get(id.as_str()), confidence.get(id.as_str()))
        {
            doc.set(CONFIDENCE_FIELD, json!(conf));
            slots[pos] = Some(doc);
        }
    }
    slots.into_iter().flatten().collect()
}

/// Persist the augmented rows as the delimited answer file submitted to the
/// ranker. The uuid token keeps concurrent requests from colliding; the file
/// is an audit artifact and is not cleaned up afterwards.
pub async fn persist_answer_file(
    dir: &Path,
    header: &str,
    rows: &[(String, Vec<String>)],
) -> Result<PathBuf> {
    let name = format!(
        "answer_{}_{}.csv",
        Utc::now().timestamp(),
        Uuid::new_v4().simple()
    );
    let path = dir.join(name);

    let mut contents = String::new();
    contents.push_str(header);
    contents.push('\n');
    for (id, features) in rows {
        contents.push_str(id);
        for feature in features {
            contents.push(',');
            contents.push_str(feature);
        }
        contents.push('\n');
    }

    tokio::fs::write(&path, contents).await?;
    Ok(path)
}

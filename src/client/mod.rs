//! HTTP client for the retrieval and rerank backends
//!
//! Wraps the three remote calls the pipeline makes: the feature-returning
//! retrieval handler (`fcselect`), the plain lookup handler (`select`), and
//! the ranker submission endpoint. Every call carries basic auth and a
//! bounded timeout; a non-success status or timeout is terminal for the
//! request — no retries at this layer.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart;
use reqwest::Client;
use serde_json::Value;

use crate::errors::{RankError, Result};
use crate::types::{AnswerRecord, SearchResponse};

/// Request timeout for backend calls (10 seconds)
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Short timeout for reachability probes
const PING_TIMEOUT: Duration = Duration::from_secs(2);

/// The remote calls the pipeline makes, as a trait seam so an in-memory
/// backend can stand in for the hosted service under test
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Feature-returning retrieval call
    async fn fcselect(&self, params: &[(String, String)]) -> Result<SearchResponse>;

    /// Plain lookup call, used for the reconciliation fetch of reranked
    /// documents
    async fn select(&self, params: &[(String, String)]) -> Result<SearchResponse>;

    /// Submit a persisted answer file to the ranker and return its
    /// `answers` list
    async fn rank(&self, ranker_id: &str, answer_file: &Path) -> Result<Vec<AnswerRecord>>;
}

/// Client for the hosted search/rerank service
#[derive(Debug, Clone)]
pub struct RetrievalClient {
    client: Client,
    service_url: String,
    username: String,
    password: String,
    cluster_id: String,
    collection: String,
}

impl RetrievalClient {
    pub fn new(
        service_url: &str,
        username: &str,
        password: &str,
        cluster_id: &str,
        collection: &str,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(RankError::Http)?;

        Ok(Self {
            client,
            service_url: service_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
            cluster_id: cluster_id.to_string(),
            collection: collection.to_string(),
        })
    }

    fn collection_url(&self, handler: &str) -> String {
        format!(
            "{}/v1/solr_clusters/{}/solr/{}/{}",
            self.service_url, self.cluster_id, self.collection, handler
        )
    }

    fn ranker_url(&self, ranker_id: &str) -> String {
        format!("{}/v1/rankers/{}/rank", self.service_url, ranker_id)
    }

    /// Check whether the retrieval backend is reachable
    pub async fn ping(&self) -> bool {
        self.client
            .get(self.collection_url("select"))
            .basic_auth(&self.username, Some(&self.password))
            .query(&[("q", "id:*"), ("rows", "0"), ("wt", "json")])
            .timeout(PING_TIMEOUT)
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    async fn into_json(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(RankError::RemoteCall {
                status: status.as_u16(),
                body,
            });
        }

        let value: Value = response.json().await?;
        if !value.is_object() {
            return Err(RankError::ContractViolation(format!(
                "response is not a mapping: {}",
                value
            )));
        }
        Ok(value)
    }

    fn parse_search_response(value: Value) -> Result<SearchResponse> {
        if value.get("response").is_none() {
            return Err(RankError::ContractViolation(format!(
                "response object missing 'response' key: {}",
                value
            )));
        }
        serde_json::from_value(value)
            .map_err(|e| RankError::ContractViolation(format!("malformed search response: {}", e)))
    }
}

#[async_trait]
impl SearchBackend for RetrievalClient {
    /// Feature-returning retrieval call (POST form parameters)
    async fn fcselect(&self, params: &[(String, String)]) -> Result<SearchResponse> {
        let response = self
            .client
            .post(self.collection_url("fcselect"))
            .basic_auth(&self.username, Some(&self.password))
            .form(params)
            .send()
            .await?;

        let value = Self::into_json(response).await?;
        Self::parse_search_response(value)
    }

    async fn select(&self, params: &[(String, String)]) -> Result<SearchResponse> {
        let response = self
            .client
            .get(self.collection_url("select"))
            .basic_auth(&self.username, Some(&self.password))
            .query(params)
            .send()
            .await?;

        let value = Self::into_json(response).await?;
        Self::parse_search_response(value)
    }

    async fn rank(&self, ranker_id: &str, answer_file: &Path) -> Result<Vec<AnswerRecord>> {
        let bytes = tokio::fs::read(answer_file).await?;
        let file_name = answer_file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "answer_data.csv".to_string());

        let part = multipart::Part::bytes(bytes).file_name(file_name);
        let form = multipart::Form::new().part("answer_data", part);

        let response = self
            .client
            .post(self.ranker_url(ranker_id))
            .basic_auth(&self.username, Some(&self.password))
            .header(reqwest::header::ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await?;

        let value = Self::into_json(response).await?;
        let answers = value
            .get("answers")
            .cloned()
            .ok_or_else(|| RankError::ContractViolation(format!("no answers in response: {}", value)))?;
        serde_json::from_value(answers)
            .map_err(|e| RankError::ContractViolation(format!("malformed answers list: {}", e)))
    }
}

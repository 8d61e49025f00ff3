//! rankbridge - feature-augmenting search middleware
//!
//! Sits between a search client and a hosted search/rerank backend: forwards
//! a query to the retrieval endpoint, merges custom scorer output into each
//! document's feature vector, rewrites the backend's training-input blob in
//! lockstep, and — when a ranker id is supplied — submits the augmented data
//! to the reranking endpoint and reorders the results by the returned
//! confidence scores.
//!
//! # Architecture
//!
//! - [`scorers`]: pluggable scoring strategies selected by configuration
//! - [`client`]: remote calls to the retrieval and rerank backends
//! - [`pipeline`]: augmentation, blob rewriting, and rerank reconciliation
//! - [`boundary`]: query parsing and error translation at the edge

pub mod boundary;
pub mod client;
pub mod errors;
pub mod pipeline;
pub mod scorers;
pub mod types;

// Re-export commonly used types
pub use errors::{RankError, Result};
pub use pipeline::{Pipeline, PipelineDefaults};

pub mod cli;
pub mod config;

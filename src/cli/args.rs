//! Command-line argument parsing for rankbridge
//!
//! Provides clap-based CLI with subcommands and verbosity control. The
//! query arguments map one-to-one onto the inbound query interface the
//! pipeline consumes.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::types::{ParamValue, RawParams};

/// rankbridge - augment search feature vectors with custom scorers and
/// rerank results via a remote ranker
#[derive(Parser, Debug)]
#[command(name = "rankbridge")]
#[command(version = "0.3.0")]
#[command(about = "Feature-augmenting middleware for a hosted search/rerank service", long_about = None)]
pub struct Args {
    /// Query string to run through the pipeline
    #[arg(value_name = "QUERY")]
    pub query: Option<String>,

    /// Number of results to return
    #[arg(long)]
    pub rows: Option<u32>,

    /// Row count for the initial retrieval on the rerank path
    #[arg(long)]
    pub search_rows: Option<u32>,

    /// Ground-truth field name
    #[arg(long)]
    pub gt: Option<String>,

    /// Comma-separated display field list
    #[arg(long)]
    pub fl: Option<String>,

    /// Ranker id; switches the request onto the rerank path
    #[arg(long)]
    pub ranker_id: Option<String>,

    /// Ask the backend to generate a training blob header
    #[arg(long)]
    pub generate_header: bool,

    /// Return the rewritten training blob in the response
    #[arg(long)]
    pub return_rs_input: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Scorer configuration JSON file (overrides config)
    #[arg(long)]
    pub scorer_config: Option<PathBuf>,

    /// Directory for persisted answer files (overrides config)
    #[arg(long)]
    pub answer_dir: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress all output except the response)
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that the retrieval backend is reachable
    Ping,

    /// Display current configuration
    Config,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else if self.verbose > 0 {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }

    /// Check that a query or a subcommand was provided, not both
    pub fn validate(&self) -> Result<(), String> {
        if self.command.is_none() && self.query.is_none() {
            return Err(
                "Query required. Use 'rankbridge <QUERY>' or run a subcommand.".to_string(),
            );
        }

        if self.command.is_some() && self.query.is_some() {
            return Err("Cannot specify a query with a subcommand.".to_string());
        }

        Ok(())
    }

    /// Build the raw boundary parameter multimap from the query arguments
    pub fn to_raw_params(&self) -> RawParams {
        let mut params = RawParams::new();
        let mut set = |key: &str, value: Option<String>| {
            if let Some(v) = value {
                params.insert(key.to_string(), ParamValue::Scalar(v));
            }
        };

        set("q", self.query.clone());
        set("rows", self.rows.map(|r| r.to_string()));
        set("search_rows", self.search_rows.map(|r| r.to_string()));
        set("gt", self.gt.clone());
        set("fl", self.fl.clone());
        set("ranker_id", self.ranker_id.clone());
        if self.generate_header {
            set("generateHeader", Some("true".to_string()));
        }
        if self.return_rs_input {
            set("returnRSInput", Some("true".to_string()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::QueryParams;

    fn base_args() -> Args {
        Args {
            query: Some("what is rust".to_string()),
            rows: None,
            search_rows: None,
            gt: None,
            fl: None,
            ranker_id: None,
            generate_header: false,
            return_rs_input: false,
            config: None,
            scorer_config: None,
            answer_dir: None,
            verbose: 0,
            quiet: false,
            command: None,
        }
    }

    #[test]
    fn test_verbosity_levels() {
        let mut args = base_args();
        assert_eq!(args.verbosity(), Verbosity::Normal);

        args.verbose = 1;
        assert_eq!(args.verbosity(), Verbosity::Verbose);

        args.quiet = true;
        assert_eq!(args.verbosity(), Verbosity::Quiet);
    }

    #[test]
    fn test_validate_requires_query_or_subcommand() {
        let mut args = base_args();
        assert!(args.validate().is_ok());

        args.query = None;
        assert!(args.validate().is_err());

        args.command = Some(Commands::Ping);
        assert!(args.validate().is_ok());

        args.query = Some("x".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_raw_params_feed_query_params() {
        let mut args = base_args();
        args.rows = Some(5);
        args.ranker_id = Some("ranker-1".to_string());
        args.generate_header = true;

        let params = QueryParams::from_raw(&args.to_raw_params()).unwrap();
        assert_eq!(params.q, "what is rust");
        assert_eq!(params.rows, Some(5));
        assert_eq!(params.ranker_id.as_deref(), Some("ranker-1"));
        assert!(params.header_requested());
        assert!(!params.rs_input_requested());
    }

    #[test]
    fn test_flags_absent_by_default() {
        let args = base_args();
        let raw = args.to_raw_params();
        assert!(raw.get("generateHeader").is_none());
        assert!(raw.get("returnRSInput").is_none());
    }
}

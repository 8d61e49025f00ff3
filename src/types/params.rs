//! Query parameter normalization
//!
//! The inbound boundary hands over a multimap where every value may be a
//! scalar or a list (an artifact of query-string parsing). That ambiguity is
//! resolved exactly once here: [`QueryParams::from_raw`] produces a strict
//! struct and no core component ever branches on "is this a list" again.

use std::collections::HashMap;

use crate::errors::{RankError, Result};

/// Default display fields when the request omits `fl`
pub const DEFAULT_FL: &str = "id,title,text";

/// Default result count on the plain search path
pub const DEFAULT_SEARCH_ROWS: u32 = 30;

/// Default result count on the rerank path
pub const DEFAULT_RERANK_ROWS: u32 = 10;

/// A raw parameter value as parsed at the boundary
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Scalar(String),
    List(Vec<String>),
}

impl ParamValue {
    /// First scalar value, mirroring "take the head of a repeated parameter"
    pub fn first(&self) -> Option<&str> {
        match self {
            ParamValue::Scalar(s) => Some(s.as_str()),
            ParamValue::List(items) => items.first().map(|s| s.as_str()),
        }
    }
}

/// Raw parameter multimap produced by the boundary
pub type RawParams = HashMap<String, ParamValue>;

/// Normalized, validated request parameters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    /// Query string (required)
    pub q: String,
    /// Final result count; defaults differ per path
    pub rows: Option<u32>,
    /// Row count for the initial retrieval call on the rerank path
    pub search_rows: Option<u32>,
    /// Ground-truth field name
    pub gt: Option<String>,
    /// Comma-separated display field list
    pub fl: Option<String>,
    /// Presence switches the whole request onto the rerank path
    pub ranker_id: Option<String>,
    /// Raw `generateHeader` value, echoed to the backend
    pub generate_header: Option<String>,
    /// Raw `returnRSInput` value, echoed to the backend
    pub return_rs_input: Option<String>,
}

impl QueryParams {
    /// Normalize a raw boundary multimap into strict parameters.
    ///
    /// `q` is required; numeric parameters must parse. Every other key is
    /// optional and unrecognized keys are ignored.
    pub fn from_raw(raw: &RawParams) -> Result<Self> {
        let scalar = |key: &str| raw.get(key).and_then(|v| v.first()).map(|s| s.to_string());

        let q = scalar("q").ok_or(RankError::MissingParam("q"))?;

        let parse_u32 = |key: &'static str| -> Result<Option<u32>> {
            match raw.get(key).and_then(|v| v.first()) {
                Some(s) => s
                    .trim()
                    .parse::<u32>()
                    .map(Some)
                    .map_err(|_| RankError::InvalidParam {
                        name: key,
                        value: s.to_string(),
                    }),
                None => Ok(None),
            }
        };

        Ok(Self {
            q,
            rows: parse_u32("rows")?,
            search_rows: parse_u32("search_rows")?,
            gt: scalar("gt"),
            fl: scalar("fl"),
            ranker_id: scalar("ranker_id"),
            generate_header: scalar("generateHeader"),
            return_rs_input: scalar("returnRSInput"),
        })
    }

    /// Display fields, comma-split and trimmed
    pub fn display_fields(&self) -> Vec<String> {
        self.fl
            .as_deref()
            .unwrap_or(DEFAULT_FL)
            .split(',')
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect()
    }

    /// The effective `fl` string sent back to the caller on lookups
    pub fn fl_string(&self) -> String {
        self.fl.clone().unwrap_or_else(|| DEFAULT_FL.to_string())
    }

    /// Whether the backend should regenerate the training blob header
    pub fn header_requested(&self) -> bool {
        self.generate_header.as_deref() == Some("true")
    }

    /// Whether the training blob should be returned and rewritten
    pub fn rs_input_requested(&self) -> bool {
        self.return_rs_input.is_some()
    }
}

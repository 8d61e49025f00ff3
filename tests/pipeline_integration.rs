//! End-to-end tests for the augmentation → blob rewrite → reconciliation
//! chain, exercised over in-memory fixtures (no live backend).

use std::sync::Arc;

use serde_json::json;

use rankbridge::pipeline::augment::FeatureAugmenter;
use rankbridge::pipeline::blob::rewrite_blob;
use rankbridge::pipeline::rerank::{order_by_rank, persist_answer_file};
use rankbridge::scorers::{ScorerSet, ScorerSpec};
use rankbridge::types::{AnswerRecord, Document, QueryParams, SearchResponse};

fn scorer_set() -> Arc<ScorerSet> {
    Arc::new(ScorerSet::from_specs(&[
        ScorerSpec::TermOverlap {
            name: "overlap_text".into(),
            field: "text".into(),
            weight: 1.0,
        },
        ScorerSpec::FieldLength {
            name: "len_text".into(),
            field: "text".into(),
            scale: 20.0,
        },
    ]))
}

fn retrieval_fixture() -> SearchResponse {
    serde_json::from_value(json!({
        "responseHeader": {"status": 0},
        "response": {
            "numFound": 2,
            "start": 0,
            "docs": [
                {
                    "id": "doc-1",
                    "title": "Rust intro",
                    "text": "rust is fast",
                    "featureVector": "0.1 0.2"
                },
                {
                    "id": "doc-2",
                    "title": "Unrelated",
                    "text": "gardening tips",
                    "featureVector": "0.3 0.4"
                }
            ]
        },
        "RSInput": "f1,f2,gt\n0.1,0.2,yes\n0.3,0.4,no\n"
    }))
    .unwrap()
}

fn query(fl: &str) -> QueryParams {
    QueryParams {
        q: "rust".into(),
        fl: Some(fl.into()),
        generate_header: Some("true".into()),
        return_rs_input: Some("true".into()),
        ..Default::default()
    }
}

#[test]
fn augmented_vectors_and_blob_stay_in_lockstep() {
    let scorers = scorer_set();
    let params = query("id,title,text");
    let mut response = retrieval_fixture();
    let blob = response.rs_input.clone().unwrap();

    let augmenter = FeatureAugmenter::new(&scorers);
    let scores = augmenter.augment(&params, &mut response.response.docs);

    // Every vector grew by exactly one token per scorer
    for doc in &response.response.docs {
        let fv = doc.feature_vector().unwrap();
        assert_eq!(fv.split_whitespace().count(), 2 + scorers.len());
    }

    let rewritten = rewrite_blob(&blob, &scores, &scorers.get_headers(), true).unwrap();
    let lines: Vec<&str> = rewritten.lines().collect();
    assert_eq!(lines[0], "f1,f2,overlap_text,len_text,gt");
    assert_eq!(lines.len(), 3);

    // Blob rows carry the same formatted score strings as the vectors
    for (line, doc) in lines[1..].iter().zip(&response.response.docs) {
        let fv = doc.feature_vector().unwrap();
        let appended: Vec<&str> = fv.split_whitespace().skip(2).collect();
        assert!(line.contains(&appended.join(",")));
        assert!(line.ends_with("yes") || line.ends_with("no"));
    }

    // doc-1 matches the query, doc-2 does not
    let first = response.response.docs[0].feature_vector().unwrap();
    let second = response.response.docs[1].feature_vector().unwrap();
    assert!(first.contains("1.0000"));
    let second_scores: Vec<&str> = second.split_whitespace().skip(2).collect();
    assert_eq!(second_scores[0], "0.0");
}

#[test]
fn display_field_pruning_respects_request() {
    let scorers = scorer_set();
    // Caller only asked for id and title; `text` was fetched for the scorers
    let params = query("id,title");
    let mut response = retrieval_fixture();

    let augmenter = FeatureAugmenter::new(&scorers);
    augmenter.augment(&params, &mut response.response.docs);

    for doc in &response.response.docs {
        assert!(doc.fields.get("text").is_none());
        assert!(doc.fields.get("title").is_some());
        assert!(doc.feature_vector().is_some());
    }
}

#[test]
fn reranked_order_survives_lookup_shuffle() {
    let answers = vec![
        AnswerRecord {
            answer_id: "doc-2".into(),
            confidence: 0.91,
            rank: Some(1),
        },
        AnswerRecord {
            answer_id: "doc-1".into(),
            confidence: 0.42,
            rank: Some(2),
        },
    ];
    let fetched: Vec<Document> = vec![
        serde_json::from_value(json!({"id": "doc-1", "title": "Rust intro"})).unwrap(),
        serde_json::from_value(json!({"id": "doc-2", "title": "Unrelated"})).unwrap(),
    ];

    let ordered = order_by_rank(&answers, fetched);
    assert_eq!(ordered[0].id().unwrap(), "doc-2");
    assert_eq!(ordered[0].scalar("confidence"), Some(json!(0.91)));
    assert_eq!(ordered[1].id().unwrap(), "doc-1");
    assert_eq!(ordered[1].scalar("confidence"), Some(json!(0.42)));
}

#[tokio::test]
async fn answer_file_matches_augmented_rows() {
    let scorers = scorer_set();
    let params = query("id,title,text");
    let mut response = retrieval_fixture();
    let blob = response.rs_input.clone().unwrap();

    let augmenter = FeatureAugmenter::new(&scorers);
    let scores = augmenter.augment(&params, &mut response.response.docs);
    let rewritten = rewrite_blob(&blob, &scores, &scorers.get_headers(), true).unwrap();
    let header = rewritten.lines().next().unwrap();

    let rows: Vec<(String, Vec<String>)> = response
        .response
        .docs
        .iter()
        .map(|doc| {
            (
                doc.id().unwrap(),
                doc.feature_vector()
                    .unwrap()
                    .split_whitespace()
                    .map(|t| t.to_string())
                    .collect(),
            )
        })
        .collect();

    let dir = tempfile::tempdir().unwrap();
    let path = persist_answer_file(dir.path(), header, &rows).await.unwrap();

    let contents = std::fs::read_to_string(path).unwrap();
    let mut lines = contents.lines();
    assert_eq!(lines.next().unwrap(), "f1,f2,overlap_text,len_text,gt");
    let first_row = lines.next().unwrap();
    assert!(first_row.starts_with("doc-1,0.1,0.2,"));
    assert_eq!(lines.count(), 1);
}

#[test]
fn blob_mismatch_is_rejected_not_truncated() {
    let scorers = scorer_set();
    let params = query("id,title,text");
    let mut response = retrieval_fixture();
    // Backend blob lost a row relative to the docs list
    let blob = "f1,f2,gt\n0.1,0.2,yes\n";

    let augmenter = FeatureAugmenter::new(&scorers);
    let scores = augmenter.augment(&params, &mut response.response.docs);

    let err = rewrite_blob(blob, &scores, &scorers.get_headers(), true).unwrap_err();
    assert!(err.to_string().contains("misaligned"));
}

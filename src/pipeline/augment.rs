//! Feature vector augmentation
//!
//! Merges scorer output into each retrieved document: the scores are
//! formatted and appended to the document's `featureVector`, and fields that
//! were only fetched to satisfy scorer input requirements are pruned.

use serde_json::Value;

use crate::scorers::ScorerSet;
use crate::types::{Document, QueryParams, ScoreRecord, FEATURE_VECTOR_FIELD};

/// Quantize a score for the feature vector and the training blob.
///
/// Four decimal places; any non-positive score renders as the literal
/// `"0.0"`. This is policy, not display rounding — the blob rewriter emits
/// the same strings.
pub fn format_score(score: f64) -> String {
    if score > 0.0 {
        format!("{:.4}", score)
    } else {
        "0.0".to_string()
    }
}

/// Merges scorer output into retrieved documents in place
pub struct FeatureAugmenter<'a> {
    scorers: &'a ScorerSet,
}

impl<'a> FeatureAugmenter<'a> {
    pub fn new(scorers: &'a ScorerSet) -> Self {
        Self { scorers }
    }

    /// Augment every document's feature vector and prune scorer-only fields.
    ///
    /// Returns the score records in document order, for the blob rewriter.
    pub fn augment(&self, params: &QueryParams, docs: &mut [Document]) -> Vec<ScoreRecord> {
        let display = params.display_fields();
        let drop_fields = self.fields_to_drop(&display);

        docs.iter_mut()
            .map(|doc| {
                let reduced = reduced_view(doc, &display);
                let scores = self.scorers.scores(params, &reduced);

                let mut fv = doc.feature_vector().unwrap_or_default();
                for score in &scores {
                    if !fv.is_empty() {
                        fv.push(' ');
                    }
                    fv.push_str(&format_score(*score));
                }
                doc.set(FEATURE_VECTOR_FIELD, Value::String(fv));

                for field in &drop_fields {
                    doc.remove(field);
                }

                scores
            })
            .collect()
    }

    /// Fields fetched only for scorer input: required fields that are
    /// neither the feature vector itself nor explicitly requested for
    /// display
    pub fn fields_to_drop(&self, display_fields: &[String]) -> Vec<String> {
        self.scorers
            .get_required_fields()
            .into_iter()
            .filter(|f| f != FEATURE_VECTOR_FIELD && !display_fields.iter().any(|d| d == f))
            .collect()
    }
}

/// Reduced per-document view handed to the scorers: display fields only
/// (never the raw feature vector), with list-of-one values normalized to
/// scalars
fn reduced_view(doc: &Document, display_fields: &[String]) -> Document {
    let mut reduced = Document::new();
    for field in display_fields {
        if field == FEATURE_VECTOR_FIELD {
            continue;
        }
        if let Some(value) = doc.scalar(field) {
            reduced.set(field, value);
        }
    }
    reduced
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorers::{Scorer, ScorerSet};
    use serde_json::json;

    /// Scorer returning canned values keyed by document id
    struct FixedScorer {
        headers: Vec<String>,
        fields: Vec<String>,
        by_id: Vec<(String, Vec<f64>)>,
    }

    impl Scorer for FixedScorer {
        fn required_fields(&self) -> Vec<String> {
            self.fields.clone()
        }

        fn headers(&self) -> Vec<String> {
            self.headers.clone()
        }

        fn score(&self, _params: &QueryParams, doc: &Document) -> ScoreRecord {
            let id = doc
                .scalar("id")
                .and_then(|v| v.as_str().map(|s| s.to_string()))
                .unwrap_or_default();
            self.by_id
                .iter()
                .find(|(i, _)| *i == id)
                .map(|(_, s)| s.clone())
                .unwrap_or_default()
        }
    }

    fn doc(value: serde_json::Value) -> Document {
        serde_json::from_value(value).unwrap()
    }

    fn params_with_fl(fl: &str) -> QueryParams {
        QueryParams {
            q: "test".into(),
            fl: Some(fl.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_scenario_two_docs_quantized_append() {
        // Spec-level scenario: scores 0.5/-1.0 and 0.0/0.9 appended as
        // "0.5000 0.0" and "0.0 0.9000"
        let set = ScorerSet::new(vec![Box::new(FixedScorer {
            headers: vec!["s1".into(), "s2".into()],
            fields: vec!["text".into()],
            by_id: vec![
                ("a".into(), vec![0.5, -1.0]),
                ("b".into(), vec![0.0, 0.9]),
            ],
        })]);
        let augmenter = FeatureAugmenter::new(&set);

        let mut docs = vec![
            doc(json!({"id": "a", "featureVector": "0.1 0.2", "text": "t"})),
            doc(json!({"id": "b", "featureVector": "0.3 0.4", "text": "t"})),
        ];
        let scores = augmenter.augment(&params_with_fl("id,title,text"), &mut docs);

        assert_eq!(docs[0].feature_vector().unwrap(), "0.1 0.2 0.5000 0.0");
        assert_eq!(docs[1].feature_vector().unwrap(), "0.3 0.4 0.0 0.9000");
        assert_eq!(scores, vec![vec![0.5, -1.0], vec![0.0, 0.9]]);
    }

    #[test]
    fn test_token_count_after_augmentation() {
        let set = ScorerSet::new(vec![Box::new(FixedScorer {
            headers: vec!["s1".into()],
            fields: vec![],
            by_id: vec![("a".into(), vec![1.25])],
        })]);
        let augmenter = FeatureAugmenter::new(&set);

        let mut docs = vec![doc(json!({"id": "a", "featureVector": "1 2 3"}))];
        augmenter.augment(&params_with_fl("id"), &mut docs);

        let fv = docs[0].feature_vector().unwrap();
        assert_eq!(fv.split_whitespace().count(), 4);
        assert!(fv.ends_with("1.2500"));
    }

    #[test]
    fn test_scorer_only_fields_are_pruned() {
        let set = ScorerSet::new(vec![Box::new(FixedScorer {
            headers: vec!["s1".into()],
            fields: vec!["body".into(), "title".into()],
            by_id: vec![("a".into(), vec![0.1])],
        })]);
        let augmenter = FeatureAugmenter::new(&set);

        let mut docs = vec![doc(json!({
            "id": "a",
            "featureVector": "0.1",
            "title": "kept",
            "body": "fetched for the scorer only"
        }))];
        augmenter.augment(&params_with_fl("id,title"), &mut docs);

        assert!(docs[0].fields.get("body").is_none());
        assert_eq!(docs[0].scalar("title"), Some(json!("kept")));
        assert!(docs[0].feature_vector().is_some());
    }

    #[test]
    fn test_fields_to_drop_excludes_feature_vector_and_display() {
        let set = ScorerSet::new(vec![Box::new(FixedScorer {
            headers: vec!["s1".into()],
            fields: vec![
                "featureVector".into(),
                "text".into(),
                "topic".into(),
            ],
            by_id: vec![],
        })]);
        let augmenter = FeatureAugmenter::new(&set);
        let drop = augmenter.fields_to_drop(&["id".into(), "text".into()]);
        assert_eq!(drop, vec!["topic".to_string()]);
    }

    #[test]
    fn test_reduced_view_excludes_feature_vector() {
        let d = doc(json!({
            "id": "a",
            "featureVector": "0.1 0.2",
            "title": ["Wrapped"]
        }));
        let reduced = reduced_view(
            &d,
            &["id".into(), "title".into(), "featureVector".into()],
        );
        assert!(reduced.fields.get(FEATURE_VECTOR_FIELD).is_none());
        assert_eq!(reduced.scalar("title"), Some(json!("Wrapped")));
    }

    #[test]
    fn test_format_score_policy() {
        assert_eq!(format_score(0.5), "0.5000");
        assert_eq!(format_score(0.0), "0.0");
        assert_eq!(format_score(-1.0), "0.0");
        assert_eq!(format_score(1.23456), "1.2346");
    }
}

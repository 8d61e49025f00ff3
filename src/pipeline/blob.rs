//! Training blob rewriting
//!
//! The retrieval backend's `RSInput` blob is newline-delimited: an optional
//! header line, then one comma-separated row per scored document ending in a
//! ground-truth/relevance column. Rewriting inserts the new score columns
//! between the original feature columns and the trailing value, row for row
//! in document order, and extends the header with the scorer names.
//!
//! Alignment is positional, so it is validated up front: a blob whose
//! data-row count disagrees with the score-record count is rejected instead
//! of silently truncated. Blank lines never consume a score record.

use crate::errors::{RankError, Result};
use crate::pipeline::augment::format_score;
use crate::types::ScoreRecord;

/// Rewrite a training blob with one score record per data row.
///
/// `generate_header` marks the first line as a header to be extended with
/// `scorer_headers`. An empty score-record sequence passes the blob through
/// unchanged. Pure function of its inputs.
pub fn rewrite_blob(
    blob: &str,
    scores: &[ScoreRecord],
    scorer_headers: &[String],
    generate_header: bool,
) -> Result<String> {
    if scores.is_empty() {
        return Ok(blob.to_string());
    }

    let lines: Vec<&str> = blob.split('\n').collect();
    let header_skip = usize::from(generate_header);
    let data_lines = lines
        .iter()
        .skip(header_skip)
        .filter(|l| !l.trim().is_empty())
        .count();
    if data_lines != scores.len() {
        return Err(RankError::BlobMisaligned {
            data_lines,
            score_records: scores.len(),
        });
    }

    let mut out = String::with_capacity(blob.len() + scores.len() * 8 * scores[0].len().max(1));
    let mut score_cursor = 0usize;

    for (index, line) in lines.iter().enumerate() {
        if generate_header && index == 0 {
            out.push_str(&synthesize_header(line, scorer_headers));
            out.push('\n');
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }

        let (features, relevance) = split_last_comma(line);
        let record = &scores[score_cursor];
        score_cursor += 1;

        out.push_str(features);
        if !record.is_empty() {
            out.push(',');
            for (i, score) in record.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&format_score(*score));
            }
        }
        out.push(',');
        out.push_str(relevance);
        out.push('\n');
    }

    Ok(out)
}

/// Extend a header line: `features, scorer_names, ground_truth`
fn synthesize_header(header: &str, scorer_headers: &[String]) -> String {
    if scorer_headers.is_empty() {
        return header.to_string();
    }
    let (features, ground_truth) = split_last_comma(header);
    format!(
        "{},{},{}",
        features,
        scorer_headers.join(","),
        ground_truth
    )
}

/// Split on the last comma: everything before it, and the trailing segment
fn split_last_comma(line: &str) -> (&str, &str) {
    match line.rfind(',') {
        Some(pos) => (&line[..pos], &line[pos + 1..]),
        None => ("", line),
    }
}

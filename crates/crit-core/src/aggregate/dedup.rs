//! Similarity-based deduplication of findings.
//!
//! Findings are bucketed by file so most comparisons stay local. Findings
//! without a file share one "general" bucket, which is reconciled against the
//! file buckets in a final cross-bucket pass.
//!
//! Greedy passes repeat until one merges nothing, so no surviving pair scores
//! at or above the threshold and a second run is a no-op.

use std::collections::HashMap;

use crate::aggregate::similarity::similarity;
use crate::finding::Finding;

/// Merge near-duplicates, keeping the more severe finding of each merged pair.
///
/// Input order is preserved within each bucket. The output lists file
/// buckets in order of first appearance, followed by general findings.
pub fn deduplicate(findings: Vec<Finding>, threshold: f64) -> Vec<Finding> {
    let mut file_buckets: Vec<Vec<Finding>> = Vec::new();
    let mut bucket_index: HashMap<String, usize> = HashMap::new();
    let mut general: Vec<Finding> = Vec::new();

    for finding in findings {
        match finding.file.clone() {
            Some(file) => {
                let idx = *bucket_index.entry(file).or_insert_with(|| {
                    file_buckets.push(Vec::new());
                    file_buckets.len() - 1
                });
                file_buckets[idx].push(finding);
            }
            None => general.push(finding),
        }
    }

    let mut merged: Vec<Finding> = file_buckets
        .into_iter()
        .flat_map(|bucket| dedup_until_stable(bucket, threshold))
        .collect();

    if general.is_empty() {
        return merged;
    }

    merged.extend(dedup_until_stable(general, threshold));
    let (mut located, general): (Vec<Finding>, Vec<Finding>) =
        dedup_until_stable(merged, threshold)
            .into_iter()
            .partition(|f| f.file.is_some());
    located.extend(general);
    located
}

/// Repeat [`dedup_pass`] until a pass merges nothing. A replacement can make
/// the new survivor similar to a finding accepted before it.
fn dedup_until_stable(mut findings: Vec<Finding>, threshold: f64) -> Vec<Finding> {
    loop {
        let before = findings.len();
        findings = dedup_pass(findings, threshold);
        if findings.len() == before {
            return findings;
        }
    }
}

/// One greedy pass: each finding is compared against everything accepted so
/// far; the first match at or above `threshold` is a duplicate.
pub(crate) fn dedup_pass(findings: Vec<Finding>, threshold: f64) -> Vec<Finding> {
    let mut accepted: Vec<Finding> = Vec::with_capacity(findings.len());

    for finding in findings {
        let duplicate_of = accepted
            .iter()
            .position(|kept| similarity(kept, &finding) >= threshold);

        match duplicate_of {
            Some(idx) => {
                if finding.severity.is_more_severe_than(accepted[idx].severity) {
                    accepted[idx] = finding;
                }
            }
            None => accepted.push(finding),
        }
    }

    accepted
}

//! Multi-Framework Aggregator
//!
//! Combines the output of several scoring passes ("frameworks", e.g. a
//! strict and a lenient weighting profile) into one ranked list, and
//! surfaces where the frameworks agree or disagree.
//!
//! All functions here are pure transformations over immutable score
//! lists; there is no hidden accumulator state.

use crate::scoring::{rank, CandidateScore};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// One framework's scoring pass, tagged with its name
#[derive(Debug, Clone)]
pub struct FrameworkScores {
    pub framework: String,
    pub scores: Vec<CandidateScore>,
}

impl FrameworkScores {
    pub fn new(framework: &str, scores: Vec<CandidateScore>) -> Self {
        Self { framework: framework.to_string(), scores }
    }
}

/// Combine per-framework scores into a single ranked list.
///
/// A skill's combined score is the weighted average of its
/// `combined_score` across frameworks; a framework that did not score the
/// skill contributes 0 (it is counted, not excluded). Frameworks missing
/// from `weights` get weight 1.0. Tier is the strongest seen anywhere;
/// matched-rule provenance is the deduplicated union.
pub fn combine(
    score_sets: &[FrameworkScores],
    weights: &HashMap<String, f64>,
) -> Vec<CandidateScore> {
    let total_weight: f64 = score_sets
        .iter()
        .map(|set| weights.get(&set.framework).copied().unwrap_or(1.0))
        .sum();
    if total_weight <= 0.0 {
        return Vec::new();
    }

    let mut merged: BTreeMap<&str, CandidateScore> = BTreeMap::new();

    for set in score_sets {
        let weight = weights.get(&set.framework).copied().unwrap_or(1.0);
        for score in &set.scores {
            let entry = merged
                .entry(score.skill_id.as_str())
                .or_insert_with(|| CandidateScore::unscored(&score.skill_id));

            // Weighted sums; divided by total_weight below so frameworks
            // that skipped this skill count as zero.
            entry.relevance += score.relevance * weight;
            entry.impact += score.impact * weight;
            entry.urgency += score.urgency * weight;
            entry.combined_score += score.combined_score * weight;
            entry.tier = entry.tier.max(score.tier);
            for trigger in &score.matched_rules {
                if !entry.matched_rules.contains(trigger) {
                    entry.matched_rules.push(trigger.clone());
                }
            }
        }
    }

    let mut combined: Vec<CandidateScore> = merged
        .into_values()
        .map(|mut score| {
            score.relevance /= total_weight;
            score.impact /= total_weight;
            score.urgency /= total_weight;
            score.combined_score /= total_weight;
            score
        })
        .collect();

    rank(&mut combined);
    debug!(
        frameworks = score_sets.len(),
        skills = combined.len(),
        "framework scores combined"
    );
    combined
}

/// Skills that appear in the top-N of *every* framework's ranked list.
pub fn consensus(score_sets: &[FrameworkScores], top_n: usize) -> BTreeSet<String> {
    let mut iter = score_sets.iter().map(|set| top_ids(&set.scores, top_n));

    let Some(mut agreed) = iter.next() else {
        return BTreeSet::new();
    };
    for ids in iter {
        agreed = agreed.intersection(&ids).cloned().collect();
    }
    agreed
}

/// Per-skill score variance across frameworks, sorted descending.
///
/// High variance marks the skills the frameworks disagree about most.
/// As in [`combine`], a framework that did not score a skill contributes
/// a 0 observation.
pub fn variance(score_sets: &[FrameworkScores]) -> Vec<(String, f64)> {
    if score_sets.is_empty() {
        return Vec::new();
    }
    let n = score_sets.len() as f64;

    let mut observations: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for set in score_sets {
        for score in &set.scores {
            observations.entry(score.skill_id.as_str()).or_default().push(score.combined_score);
        }
    }

    let mut result: Vec<(String, f64)> = observations
        .into_iter()
        .map(|(skill_id, mut values)| {
            values.resize(score_sets.len(), 0.0); // missing frameworks
            let mean = values.iter().sum::<f64>() / n;
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            (skill_id.to_string(), var)
        })
        .collect();

    result.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    result
}

fn top_ids(scores: &[CandidateScore], top_n: usize) -> BTreeSet<String> {
    let mut ranked = scores.to_vec();
    rank(&mut ranked);
    ranked.into_iter().take(top_n).map(|s| s.skill_id).collect()
}

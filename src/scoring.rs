//! Scoring Engine
//!
//! Turns matched rules into one ranked [`CandidateScore`] per skill.
//!
//! Dimensions:
//! - `relevance` (0-3): max over matching rules of tier base value
//!   (must=3, should=2, could=1) times the rule's weight, clamped to 3.
//!   Corroborating rules take the max, never a sum.
//! - `impact` (0-2): 2 when the skill is flagged critical, otherwise the
//!   documented fallback of 1.
//! - `urgency` (0-1): 1 when any matching rule is flagged urgent,
//!   otherwise the documented fallback of 0.5.
//!
//! `combined_score = relevance*w_r + impact*w_i + urgency*w_u`. The
//! default weights are (3, 2, 1); they are configuration, not constants.

use crate::corpus::Registry;
use crate::evaluator::MatchedRule;
use crate::rules::Tier;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

const RELEVANCE_MAX: f64 = 3.0;
const IMPACT_DEFAULT: f64 = 1.0;
const IMPACT_CRITICAL: f64 = 2.0;
const URGENCY_DEFAULT: f64 = 0.5;
const URGENCY_FLAGGED: f64 = 1.0;

/// Weights applied to the three scoring dimensions.
///
/// The source material states `Score = Relevance*3 + Impact*2 + Urgency*1`
/// but also demonstrates a 0.4/0.4/0.2 profile, so the weights are
/// caller-configurable with [`ScoringWeights::standard`] as the default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoringWeights {
    pub relevance: f64,
    pub impact: f64,
    pub urgency: f64,
}

impl ScoringWeights {
    /// The standard 3/2/1 weighting
    pub fn standard() -> Self {
        Self { relevance: 3.0, impact: 2.0, urgency: 1.0 }
    }

    /// The balanced 0.4/0.4/0.2 weighting
    pub fn balanced() -> Self {
        Self { relevance: 0.4, impact: 0.4, urgency: 0.2 }
    }

    pub fn custom(relevance: f64, impact: f64, urgency: f64) -> Self {
        Self { relevance, impact, urgency }
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self::standard()
    }
}

/// Per-skill score with full breakdown and rule provenance
#[derive(Debug, Clone, Serialize)]
pub struct CandidateScore {
    pub skill_id: String,
    /// 0-3, from the strongest matching rule
    pub relevance: f64,
    /// 0-2, raised by the critical-domain flag
    pub impact: f64,
    /// 0-1, raised by an urgent rule
    pub urgency: f64,
    pub combined_score: f64,
    /// Strongest tier among matching rules
    pub tier: Tier,
    /// Trigger labels of every rule that recommended this skill
    pub matched_rules: Vec<String>,
}

impl CandidateScore {
    /// A zeroed score for skills included without any matching rule
    /// (baseline injection).
    pub fn unscored(skill_id: &str) -> Self {
        Self {
            skill_id: skill_id.to_string(),
            relevance: 0.0,
            impact: 0.0,
            urgency: 0.0,
            combined_score: 0.0,
            tier: Tier::Could,
            matched_rules: Vec::new(),
        }
    }
}

// Per-skill accumulator; max/any/count only, so the order in which rules
// are folded in cannot change the result.
#[derive(Debug)]
struct Accumulator {
    raw_relevance: f64,
    tier: Tier,
    urgent: bool,
    matched_rules: Vec<String>,
}

/// Score every unique skill referenced by the matched rules.
///
/// Returns candidates ranked by combined score (descending), with ties
/// broken by tier, then number of corroborating rules, then skill id.
/// A skill with no matching rule never appears.
pub fn score(
    candidates: &[MatchedRule],
    registry: &Registry,
    weights: ScoringWeights,
) -> Vec<CandidateScore> {
    // BTreeMap keeps accumulation deterministic across runs
    let mut by_skill: BTreeMap<&str, Accumulator> = BTreeMap::new();

    for matched in candidates {
        for skill_id in &matched.skill_refs {
            let entry = by_skill.entry(skill_id.as_str()).or_insert_with(|| Accumulator {
                raw_relevance: 0.0,
                tier: matched.tier,
                urgent: false,
                matched_rules: Vec::new(),
            });
            entry.raw_relevance = entry.raw_relevance.max(matched.tier.relevance() * matched.weight);
            entry.tier = entry.tier.max(matched.tier);
            entry.urgent |= matched.urgent;
            entry.matched_rules.push(matched.trigger.clone());
        }
    }

    let mut scored: Vec<CandidateScore> = by_skill
        .into_iter()
        .filter_map(|(skill_id, acc)| {
            let Some(skill) = registry.lookup(skill_id) else {
                // Refs are validated at load time; this only happens if a
                // caller mixes a rule set with a registry it was not
                // validated against.
                warn!(skill_id, "matched rule references unknown skill, dropping");
                return None;
            };

            let relevance = acc.raw_relevance.clamp(0.0, RELEVANCE_MAX);
            let impact = if skill.critical { IMPACT_CRITICAL } else { IMPACT_DEFAULT };
            let urgency = if acc.urgent { URGENCY_FLAGGED } else { URGENCY_DEFAULT };
            let combined_score =
                relevance * weights.relevance + impact * weights.impact + urgency * weights.urgency;

            Some(CandidateScore {
                skill_id: skill_id.to_string(),
                relevance,
                impact,
                urgency,
                combined_score,
                tier: acc.tier,
                matched_rules: acc.matched_rules,
            })
        })
        .collect();

    rank(&mut scored);
    scored
}

/// Sort candidates into the canonical output order: combined score, then
/// tier, then corroboration count, then skill id for determinism.
pub fn rank(scored: &mut [CandidateScore]) {
    scored.sort_by(|a, b| {
        b.combined_score
            .total_cmp(&a.combined_score)
            .then(b.tier.cmp(&a.tier))
            .then(b.matched_rules.len().cmp(&a.matched_rules.len()))
            .then(a.skill_id.cmp(&b.skill_id))
    });
}

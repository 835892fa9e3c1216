//! Budget-Constrained Selector and Baseline Injector
//!
//! Greedy selection over the ranked candidate list: walk in descending
//! score order and include anything whose effort still fits. A candidate
//! that does not fit is skipped, not a stopping point - a cheaper,
//! lower-ranked skill later in the list may still be accepted.
//!
//! Baseline skills are injected afterwards regardless of fit. Their
//! effort still debits the remaining capacity, which is the one place it
//! may go negative; when that happens the result is flagged over budget.

use crate::corpus::{Registry, SkillDescriptor};
use crate::scoring::CandidateScore;
use serde::Serialize;
use tracing::{debug, warn};

/// One accepted skill with its score and provenance
#[derive(Debug, Clone, Serialize)]
pub struct Selection {
    pub skill: SkillDescriptor,
    pub score: CandidateScore,
    /// True when the baseline list caused (or would have caused) this
    /// skill's inclusion
    pub included_by_baseline: bool,
}

/// Outcome of budget-constrained selection
#[derive(Debug, Clone, Serialize)]
pub struct SelectionResult {
    /// Accepted skills, scored entries first in rank order, then
    /// baseline-only additions
    pub selected: Vec<Selection>,
    /// Capacity left after selection; `None` when the query had no
    /// capacity limit. Negative only after baseline injection.
    pub remaining_capacity: Option<f64>,
    /// Set when baseline injection pushed the capacity below zero
    pub over_budget: bool,
}

/// Greedily select the highest-scoring candidates that fit the capacity.
///
/// `capacity: None` means unbounded. Before baseline injection the
/// remaining capacity is always >= 0.
pub fn select(
    ranked: &[CandidateScore],
    registry: &Registry,
    capacity: Option<f64>,
) -> SelectionResult {
    let mut remaining = capacity;
    let mut selected = Vec::new();

    for candidate in ranked {
        let Some(skill) = registry.lookup(&candidate.skill_id) else {
            warn!(skill_id = %candidate.skill_id, "ranked candidate not in registry, skipping");
            continue;
        };

        let fits = match remaining {
            Some(left) => skill.default_effort <= left,
            None => true,
        };
        if !fits {
            // Keep walking: a cheaper item further down may still fit
            debug!(
                skill_id = %skill.id,
                effort = skill.default_effort,
                "candidate does not fit remaining capacity, skipping"
            );
            continue;
        }

        if let Some(left) = remaining.as_mut() {
            *left -= skill.default_effort;
        }
        selected.push(Selection {
            skill: skill.clone(),
            score: candidate.clone(),
            included_by_baseline: false,
        });
    }

    SelectionResult {
        selected,
        remaining_capacity: remaining,
        over_budget: false,
    }
}

/// Add every baseline skill to the selection, regardless of budget fit.
///
/// A baseline skill already selected on merit keeps its scored entry and
/// is only flagged; its effort is not charged twice. New baseline entries
/// carry a zeroed score and may drive the remaining capacity negative,
/// which sets `over_budget`.
pub fn inject_baseline(
    mut selection: SelectionResult,
    baseline: &[String],
    registry: &Registry,
) -> SelectionResult {
    for id in baseline {
        if let Some(existing) = selection.selected.iter_mut().find(|s| &s.skill.id == id) {
            existing.included_by_baseline = true;
            continue;
        }

        let Some(skill) = registry.lookup(id) else {
            // Baseline ids are validated at rule-set load time
            warn!(skill_id = %id, "baseline skill not in registry, skipping");
            continue;
        };

        if let Some(left) = selection.remaining_capacity.as_mut() {
            *left -= skill.default_effort;
        }
        selection.selected.push(Selection {
            skill: skill.clone(),
            score: CandidateScore::unscored(id),
            included_by_baseline: true,
        });
    }

    if let Some(left) = selection.remaining_capacity {
        if left < 0.0 {
            warn!(remaining = left, "baseline injection exceeded capacity");
            selection.over_budget = true;
        }
    }

    selection
}

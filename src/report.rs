//! Output Assembler
//!
//! Turns a [`SelectionResult`] into the final ordered, explainable
//! report: entries grouped by tier (must/should/could/baseline), each
//! carrying its score breakdown and the rules that caused its inclusion.
//! Pure transformation, no side effects.

use crate::rules::Tier;
use crate::selector::SelectionResult;
use serde::Serialize;

/// One skill in the final report, with its full explanation
#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub skill_id: String,
    pub title: String,
    pub tier: &'static str,
    pub combined_score: f64,
    pub relevance: f64,
    pub impact: f64,
    pub urgency: f64,
    /// Trigger labels of the rules that recommended this skill; empty for
    /// baseline-only entries
    pub matched_rules: Vec<String>,
    pub included_by_baseline: bool,
}

/// Final ranked, tiered output of a query
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrderedReport {
    pub must: Vec<ReportEntry>,
    pub should: Vec<ReportEntry>,
    pub could: Vec<ReportEntry>,
    /// Skills included only because of the baseline list
    pub baseline: Vec<ReportEntry>,
    /// Capacity left after selection; `None` when the query was
    /// unbounded, negative only when baseline injection overran it
    pub remaining_capacity: Option<f64>,
    pub over_budget: bool,
}

impl OrderedReport {
    /// All entries across groups, in must/should/could/baseline order
    pub fn entries(&self) -> impl Iterator<Item = &ReportEntry> {
        self.must
            .iter()
            .chain(self.should.iter())
            .chain(self.could.iter())
            .chain(self.baseline.iter())
    }

    pub fn contains(&self, skill_id: &str) -> bool {
        self.entries().any(|e| e.skill_id == skill_id)
    }

    pub fn len(&self) -> usize {
        self.must.len() + self.should.len() + self.could.len() + self.baseline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Assemble the tiered report from a selection.
///
/// Entries with at least one matched rule land in their tier's group and
/// keep their rank order; entries included purely by baseline go in the
/// baseline group.
pub fn assemble(selection: &SelectionResult) -> OrderedReport {
    let mut report = OrderedReport {
        remaining_capacity: selection.remaining_capacity,
        over_budget: selection.over_budget,
        ..OrderedReport::default()
    };

    for item in &selection.selected {
        let entry = ReportEntry {
            skill_id: item.skill.id.clone(),
            title: item.skill.title.clone(),
            tier: if item.score.matched_rules.is_empty() {
                "baseline"
            } else {
                item.score.tier.as_str()
            },
            combined_score: item.score.combined_score,
            relevance: item.score.relevance,
            impact: item.score.impact,
            urgency: item.score.urgency,
            matched_rules: item.score.matched_rules.clone(),
            included_by_baseline: item.included_by_baseline,
        };

        if entry.matched_rules.is_empty() {
            report.baseline.push(entry);
        } else {
            match item.score.tier {
                Tier::Must => report.must.push(entry),
                Tier::Should => report.should.push(entry),
                Tier::Could => report.could.push(entry),
            }
        }
    }

    report
}

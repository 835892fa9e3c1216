//! Rule Evaluator
//!
//! Applies every rule's trigger to a task context and collects the rules
//! that fire. Matching is pure: the rule set and registry are read-only,
//! and the relative order of matches never affects the final scores
//! (scoring accumulates with max/count, which are order-independent).

use crate::rules::{RuleSet, Tier, Trigger};
use tracing::debug;

/// Per-query input: a free-text task description plus optional structured
/// hints. Created per query, read-only, discarded afterwards.
#[derive(Debug, Clone, Default)]
pub struct TaskContext {
    /// Free-text description of the task
    pub description: String,
    /// Domain hint (e.g. "authentication")
    pub domain: Option<String>,
    /// Lifecycle phase hint (e.g. "development")
    pub phase: Option<String>,
    /// Task-type hint (e.g. "feature", "bugfix")
    pub task_type: Option<String>,
}

impl TaskContext {
    pub fn new(description: &str) -> Self {
        Self {
            description: description.to_string(),
            ..Self::default()
        }
    }

    pub fn with_domain(mut self, domain: &str) -> Self {
        self.domain = Some(domain.to_string());
        self
    }

    pub fn with_phase(mut self, phase: &str) -> Self {
        self.phase = Some(phase.to_string());
        self
    }

    pub fn with_task_type(mut self, task_type: &str) -> Self {
        self.task_type = Some(task_type.to_string());
        self
    }
}

/// A rule that fired for a task, with everything scoring needs
#[derive(Debug, Clone)]
pub struct MatchedRule {
    /// Index of the rule within the rule set (provenance)
    pub rule_index: usize,
    /// Human-readable trigger label, e.g. `keyword:"authentication"`
    pub trigger: String,
    /// Skills this rule recommends
    pub skill_refs: Vec<String>,
    pub tier: Tier,
    pub weight: f64,
    pub urgent: bool,
}

/// Evaluate every rule against the task and return the ones that fire.
///
/// An empty result is a valid outcome, not an error - the baseline
/// injector guarantees non-empty output downstream.
pub fn evaluate(task: &TaskContext, rules: &RuleSet) -> Vec<MatchedRule> {
    let description_lower = task.description.to_lowercase();

    let matched: Vec<MatchedRule> = rules
        .rules()
        .iter()
        .enumerate()
        .filter(|(_, rule)| trigger_fires(&rule.trigger, task, &description_lower))
        .map(|(i, rule)| MatchedRule {
            rule_index: i,
            trigger: rule.trigger.label(),
            skill_refs: rule.skill_refs.clone(),
            tier: rule.tier,
            weight: rule.weight,
            urgent: rule.urgent,
        })
        .collect();

    debug!(
        rules = rules.len(),
        fired = matched.len(),
        "rule evaluation complete"
    );
    matched
}

/// Apply a single trigger. Hint-based triggers do not fire when the hint
/// is absent.
fn trigger_fires(trigger: &Trigger, task: &TaskContext, description_lower: &str) -> bool {
    match trigger {
        Trigger::Keyword(kw) => description_lower.contains(kw.as_str()),
        Trigger::Pattern(re) => re.is_match(&task.description),
        Trigger::Domain(d) => task.domain.as_deref() == Some(d.as_str()),
        Trigger::Phase(p) => task.phase.as_deref() == Some(p.as_str()),
        Trigger::TaskType(t) => task.task_type.as_deref() == Some(t.as_str()),
    }
}

//! Rule Set Loader
//!
//! Parses and validates the declarative rule configuration that maps task
//! triggers (keywords, patterns, structured hints) to skill references.
//!
//! Rule configs are TOML-first with JSON fallback. Note that in TOML the
//! top-level `baseline` key must appear before the first `[[rules]]`
//! table:
//!
//! ```toml
//! baseline = ["system-thinking"]
//!
//! [[rules]]
//! trigger_kind = "keyword"
//! matcher = "authentication"
//! skill_refs = ["auth-jwt"]
//! tier = "must"
//! weight = 1.0
//! ```
//!
//! Validation is exhaustive: a single load attempt reports every problem
//! (unknown skill ref, bad tier, negative weight, invalid regex) so the
//! config can be fixed in one pass.

use crate::corpus::Registry;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Priority class of a recommendation, independent of numeric score.
///
/// Ordering is `Could < Should < Must`, so `max()` picks the strongest
/// tier among corroborating rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Could,
    Should,
    Must,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Must => "must",
            Tier::Should => "should",
            Tier::Could => "could",
        }
    }

    /// Base relevance contribution: must=3, should=2, could=1
    pub fn relevance(&self) -> f64 {
        match self {
            Tier::Must => 3.0,
            Tier::Should => 2.0,
            Tier::Could => 1.0,
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "must" => Some(Tier::Must),
            "should" => Some(Tier::Should),
            "could" => Some(Tier::Could),
            _ => None,
        }
    }
}

/// Compiled trigger, one per rule
#[derive(Debug, Clone)]
pub enum Trigger {
    /// Case-insensitive substring match against the task description
    Keyword(String),
    /// Regex match against the task description
    Pattern(Regex),
    /// Exact match against the domain hint
    Domain(String),
    /// Exact match against the phase hint
    Phase(String),
    /// Exact match against the task-type hint
    TaskType(String),
}

impl Trigger {
    /// Human-readable provenance label, e.g. `keyword:"authentication"`
    pub fn label(&self) -> String {
        match self {
            Trigger::Keyword(kw) => format!("keyword:\"{}\"", kw),
            Trigger::Pattern(re) => format!("pattern:\"{}\"", re.as_str()),
            Trigger::Domain(d) => format!("domain:\"{}\"", d),
            Trigger::Phase(p) => format!("phase:\"{}\"", p),
            Trigger::TaskType(t) => format!("task_type:\"{}\"", t),
        }
    }
}

/// Validated rule: trigger plus the skills it recommends
#[derive(Debug, Clone)]
pub struct Rule {
    pub trigger: Trigger,
    /// Skill ids this rule recommends (all verified against the registry)
    pub skill_refs: Vec<String>,
    pub tier: Tier,
    /// Score multiplier applied to the tier's base relevance
    pub weight: f64,
    /// Urgency signal; raises the urgency dimension for matched skills
    pub urgent: bool,
}

/// Raw rule as it appears in the config file, before validation.
///
/// `trigger_kind` and `tier` are plain strings here so that every invalid
/// value can be collected into one aggregate error instead of failing at
/// deserialization time.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleSpec {
    #[serde(default)]
    pub trigger_kind: String,
    #[serde(default)]
    pub matcher: String,
    #[serde(default)]
    pub skill_refs: Vec<String>,
    #[serde(default)]
    pub tier: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub urgent: bool,
}

fn default_weight() -> f64 {
    1.0
}

/// Top-level rule configuration file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleConfig {
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
    /// Skills always included in the output, regardless of scoring
    #[serde(default)]
    pub baseline: Vec<String>,
}

impl RuleConfig {
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }
}

/// A single problem found while validating a rule config
#[derive(Debug, Clone, thiserror::Error)]
pub enum RuleIssue {
    #[error("rule {rule}: unknown trigger kind '{value}'")]
    InvalidTriggerKind { rule: usize, value: String },

    #[error("rule {rule}: empty matcher")]
    EmptyMatcher { rule: usize },

    #[error("rule {rule}: invalid pattern '{pattern}': {message}")]
    InvalidPattern { rule: usize, pattern: String, message: String },

    #[error("rule {rule}: unknown skill ref '{id}'")]
    UnknownSkillRef { rule: usize, id: String },

    #[error("rule {rule}: no skill refs")]
    NoSkillRefs { rule: usize },

    #[error("rule {rule}: invalid tier '{value}' (expected must/should/could)")]
    InvalidTier { rule: usize, value: String },

    #[error("rule {rule}: weight must be non-negative, got {weight}")]
    NegativeWeight { rule: usize, weight: f64 },

    #[error("baseline: unknown skill ref '{id}'")]
    UnknownBaselineSkill { id: String },
}

/// Aggregate rule-config validation failure; collects every problem found.
#[derive(Debug, Clone)]
pub struct RuleConfigError {
    pub issues: Vec<RuleIssue>,
}

impl fmt::Display for RuleConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule config validation failed ({} problem(s)): ", self.issues.len())?;
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", issue)?;
        }
        Ok(())
    }
}

impl std::error::Error for RuleConfigError {}

/// Immutable, validated set of rules plus the baseline skill list.
///
/// A reload replaces the whole set atomically; rules are never mutated in
/// place.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
    baseline: Vec<String>,
}

impl RuleSet {
    /// Validate a raw config against the registry and compile its triggers
    pub fn load(config: RuleConfig, registry: &Registry) -> Result<Self, RuleConfigError> {
        let mut issues = Vec::new();
        let mut rules = Vec::with_capacity(config.rules.len());

        for (i, spec) in config.rules.iter().enumerate() {
            let mut ok = true;

            if spec.matcher.is_empty() {
                issues.push(RuleIssue::EmptyMatcher { rule: i });
                ok = false;
            }

            let trigger = match spec.trigger_kind.as_str() {
                "keyword" => Some(Trigger::Keyword(spec.matcher.to_lowercase())),
                "pattern" => match Regex::new(&spec.matcher) {
                    Ok(re) => Some(Trigger::Pattern(re)),
                    Err(e) => {
                        issues.push(RuleIssue::InvalidPattern {
                            rule: i,
                            pattern: spec.matcher.clone(),
                            message: e.to_string(),
                        });
                        None
                    }
                },
                "domain" => Some(Trigger::Domain(spec.matcher.clone())),
                "phase" => Some(Trigger::Phase(spec.matcher.clone())),
                "task_type" => Some(Trigger::TaskType(spec.matcher.clone())),
                other => {
                    issues.push(RuleIssue::InvalidTriggerKind {
                        rule: i,
                        value: other.to_string(),
                    });
                    None
                }
            };

            if spec.skill_refs.is_empty() {
                issues.push(RuleIssue::NoSkillRefs { rule: i });
                ok = false;
            }
            for id in &spec.skill_refs {
                if !registry.contains(id) {
                    issues.push(RuleIssue::UnknownSkillRef { rule: i, id: id.clone() });
                    ok = false;
                }
            }

            let tier = Tier::parse(&spec.tier);
            if tier.is_none() {
                issues.push(RuleIssue::InvalidTier { rule: i, value: spec.tier.clone() });
            }

            if spec.weight < 0.0 {
                issues.push(RuleIssue::NegativeWeight { rule: i, weight: spec.weight });
                ok = false;
            }

            if let (Some(trigger), Some(tier), true) = (trigger, tier, ok) {
                rules.push(Rule {
                    trigger,
                    skill_refs: spec.skill_refs.clone(),
                    tier,
                    weight: spec.weight,
                    urgent: spec.urgent,
                });
            }
        }

        for id in &config.baseline {
            if !registry.contains(id) {
                issues.push(RuleIssue::UnknownBaselineSkill { id: id.clone() });
            }
        }

        if !issues.is_empty() {
            return Err(RuleConfigError { issues });
        }

        tracing::debug!(
            rules = rules.len(),
            baseline = config.baseline.len(),
            "rule set loaded"
        );
        Ok(Self {
            rules,
            baseline: config.baseline,
        })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn baseline(&self) -> &[String] {
        &self.baseline
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::SkillDescriptor;

    fn test_registry() -> Registry {
        Registry::load(vec![
            SkillDescriptor::new("auth-jwt", "JWT Authentication"),
            SkillDescriptor::new("system-thinking", "Systems Thinking"),
        ])
        .unwrap()
    }

    #[test]
    fn test_load_valid_config() {
        let config = RuleConfig::from_toml(
            r#"
baseline = ["system-thinking"]

[[rules]]
trigger_kind = "keyword"
matcher = "authentication"
skill_refs = ["auth-jwt"]
tier = "must"
weight = 1.0
"#,
        )
        .unwrap();

        let rules = RuleSet::load(config, &test_registry()).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules.rules()[0].tier, Tier::Must);
        assert_eq!(rules.baseline(), ["system-thinking"]);
    }

    #[test]
    fn test_unknown_skill_ref_rejected() {
        let config = RuleConfig {
            rules: vec![RuleSpec {
                trigger_kind: "keyword".to_string(),
                matcher: "ghost".to_string(),
                skill_refs: vec!["ghost-skill".to_string()],
                tier: "must".to_string(),
                weight: 1.0,
                urgent: false,
            }],
            baseline: vec![],
        };

        let err = RuleSet::load(config, &test_registry()).unwrap_err();
        assert!(err
            .issues
            .iter()
            .any(|i| matches!(i, RuleIssue::UnknownSkillRef { id, .. } if id == "ghost-skill")));
        assert!(err.to_string().contains("ghost-skill"));
    }

    #[test]
    fn test_all_problems_reported_in_one_pass() {
        let config = RuleConfig {
            rules: vec![
                RuleSpec {
                    trigger_kind: "telepathy".to_string(),
                    matcher: "x".to_string(),
                    skill_refs: vec!["auth-jwt".to_string()],
                    tier: "must".to_string(),
                    weight: 1.0,
                    urgent: false,
                },
                RuleSpec {
                    trigger_kind: "keyword".to_string(),
                    matcher: "auth".to_string(),
                    skill_refs: vec!["auth-jwt".to_string()],
                    tier: "mandatory".to_string(),
                    weight: -2.0,
                    urgent: false,
                },
            ],
            baseline: vec!["nobody".to_string()],
        };

        let err = RuleSet::load(config, &test_registry()).unwrap_err();
        // telepathy kind + bad tier + negative weight + unknown baseline
        assert_eq!(err.issues.len(), 4);
    }

    #[test]
    fn test_invalid_regex_rejected() {
        let config = RuleConfig {
            rules: vec![RuleSpec {
                trigger_kind: "pattern".to_string(),
                matcher: "([unclosed".to_string(),
                skill_refs: vec!["auth-jwt".to_string()],
                tier: "should".to_string(),
                weight: 1.0,
                urgent: false,
            }],
            baseline: vec![],
        };

        let err = RuleSet::load(config, &test_registry()).unwrap_err();
        assert!(matches!(err.issues[0], RuleIssue::InvalidPattern { .. }));
    }

    #[test]
    fn test_tier_ordering() {
        assert!(Tier::Must > Tier::Should);
        assert!(Tier::Should > Tier::Could);
        assert_eq!(Tier::Must.relevance(), 3.0);
        assert_eq!(Tier::Could.relevance(), 1.0);
    }

    #[test]
    fn test_json_config() {
        let config = RuleConfig::from_json(
            r#"{
                "rules": [{
                    "trigger_kind": "domain",
                    "matcher": "authentication",
                    "skill_refs": ["auth-jwt"],
                    "tier": "should"
                }],
                "baseline": []
            }"#,
        )
        .unwrap();

        let rules = RuleSet::load(config, &test_registry()).unwrap();
        assert_eq!(rules.rules()[0].weight, 1.0); // default
    }
}

//! Skill Orchestrator
//!
//! Owns the loaded `(Registry, RuleSet)` pair and runs the query
//! pipeline:
//!
//! ```text
//! TaskContext -> MatchedRule[] -> CandidateScore[] -> SelectionResult -> OrderedReport
//! ```
//!
//! The engine is in one of two states: **Unloaded** (queries fail with
//! [`EngineError::NotReady`]) or **Loaded**. `load()`/`reload()` swap an
//! `Arc` snapshot atomically, so a reload can never tear the view of an
//! in-flight query, and a failed reload leaves the previous state active.

use crate::aggregator::{combine, FrameworkScores};
use crate::config::EngineConfig;
use crate::corpus::{CorpusFile, CorpusLoadError, Registry, SkillDescriptor};
use crate::evaluator::{evaluate, TaskContext};
use crate::report::{assemble, OrderedReport};
use crate::rules::{RuleConfig, RuleConfigError, RuleSet};
use crate::scoring::score;
use crate::selector::{inject_baseline, select};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Engine-level errors
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Query attempted before a successful load
    #[error("engine not ready: no corpus/rule set loaded")]
    NotReady,

    #[error(transparent)]
    Corpus(#[from] CorpusLoadError),

    #[error(transparent)]
    Rules(#[from] RuleConfigError),

    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {}", .path.display(), .message)]
    Parse { path: PathBuf, message: String },
}

// Immutable snapshot shared by all in-flight queries
#[derive(Debug)]
struct LoadedState {
    registry: Registry,
    rules: RuleSet,
}

/// The orchestration engine
///
/// Cheap to share behind an `Arc`; all query methods take `&self` and
/// never block each other except for the pointer-sized snapshot swap.
pub struct Orchestrator {
    state: RwLock<Option<Arc<LoadedState>>>,
    config: EngineConfig,
}

impl Orchestrator {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            state: RwLock::new(None),
            config,
        }
    }

    /// Create with default configuration (standard 3/2/1 weights)
    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_loaded(&self) -> bool {
        self.state.read().is_some()
    }

    /// Validate corpus records and rule config, then atomically swap them
    /// in. On failure nothing is swapped: a fresh engine stays Unloaded
    /// and a loaded engine keeps serving its previous state.
    pub fn load(
        &self,
        records: Vec<SkillDescriptor>,
        rules: RuleConfig,
    ) -> Result<(), EngineError> {
        let registry = Registry::load(records)?;
        let rules = RuleSet::load(rules, &registry)?;

        info!(
            skills = registry.len(),
            rules = rules.len(),
            baseline = rules.baseline().len(),
            "engine loaded"
        );
        *self.state.write() = Some(Arc::new(LoadedState { registry, rules }));
        Ok(())
    }

    /// Replace the loaded state with a new corpus and rule set.
    ///
    /// Same contract as [`load`](Self::load); the name marks intent at
    /// call sites.
    pub fn reload(
        &self,
        records: Vec<SkillDescriptor>,
        rules: RuleConfig,
    ) -> Result<(), EngineError> {
        self.load(records, rules)
    }

    /// Load corpus and rule config from files (TOML or JSON, by
    /// extension, with a try-both fallback for anything else).
    pub async fn load_from_files(
        &self,
        corpus_path: &Path,
        rules_path: &Path,
    ) -> Result<(), EngineError> {
        let corpus_content = read_file(corpus_path).await?;
        let rules_content = read_file(rules_path).await?;

        let records = parse_corpus(corpus_path, &corpus_content)?;
        let rules = parse_rules(rules_path, &rules_content)?;
        self.load(records, rules)
    }

    /// Run the full single-pass pipeline for a task.
    ///
    /// `capacity: None` means no budget limit. An empty rule-match set is
    /// not an error; the report then contains only baseline skills.
    pub fn query(
        &self,
        task: &TaskContext,
        capacity: Option<f64>,
    ) -> Result<OrderedReport, EngineError> {
        let snapshot = self.snapshot()?;

        let matched = evaluate(task, &snapshot.rules);
        if matched.is_empty() {
            debug!("no rules fired, falling through to baseline-only output");
        }

        let ranked = score(&matched, &snapshot.registry, self.config.weights);
        let selection = select(&ranked, &snapshot.registry, capacity);
        let selection = inject_baseline(selection, snapshot.rules.baseline(), &snapshot.registry);
        Ok(assemble(&selection))
    }

    /// Run every configured scoring profile and aggregate the results.
    ///
    /// Falls back to [`query`](Self::query) when no profiles are
    /// configured.
    pub fn query_multi(
        &self,
        task: &TaskContext,
        capacity: Option<f64>,
    ) -> Result<OrderedReport, EngineError> {
        if self.config.profiles.is_empty() {
            return self.query(task, capacity);
        }
        let snapshot = self.snapshot()?;

        let score_sets = self.run_profiles(task, &snapshot);
        let votes: HashMap<String, f64> = self
            .config
            .profiles
            .iter()
            .map(|p| (p.name.clone(), p.vote))
            .collect();

        let ranked = combine(&score_sets, &votes);
        let selection = select(&ranked, &snapshot.registry, capacity);
        let selection = inject_baseline(selection, snapshot.rules.baseline(), &snapshot.registry);
        Ok(assemble(&selection))
    }

    /// Score a task under every configured profile without selecting.
    ///
    /// Feed the result to [`crate::aggregator::consensus`] or
    /// [`crate::aggregator::variance`] to inspect cross-profile agreement.
    pub fn framework_scores(
        &self,
        task: &TaskContext,
    ) -> Result<Vec<FrameworkScores>, EngineError> {
        let snapshot = self.snapshot()?;
        Ok(self.run_profiles(task, &snapshot))
    }

    fn run_profiles(&self, task: &TaskContext, state: &LoadedState) -> Vec<FrameworkScores> {
        let matched = evaluate(task, &state.rules);
        self.config
            .profiles
            .iter()
            .map(|profile| {
                FrameworkScores::new(
                    &profile.name,
                    score(&matched, &state.registry, profile.weights),
                )
            })
            .collect()
    }

    // Clone the Arc once per query so a concurrent reload cannot change
    // the view mid-pipeline.
    fn snapshot(&self) -> Result<Arc<LoadedState>, EngineError> {
        self.state.read().clone().ok_or(EngineError::NotReady)
    }
}

async fn read_file(path: &Path) -> Result<String, EngineError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn parse_corpus(path: &Path, content: &str) -> Result<Vec<SkillDescriptor>, EngineError> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    let parsed: Result<CorpusFile, String> = match extension {
        "toml" => toml::from_str(content).map_err(|e| e.to_string()),
        "json" => serde_json::from_str(content).map_err(|e| e.to_string()),
        _ => toml::from_str(content)
            .or_else(|_| serde_json::from_str(content))
            .map_err(|e| e.to_string()),
    };

    parsed
        .map(|file| file.skills)
        .map_err(|message| EngineError::Parse {
            path: path.to_path_buf(),
            message,
        })
}

fn parse_rules(path: &Path, content: &str) -> Result<RuleConfig, EngineError> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    let parsed: Result<RuleConfig, String> = match extension {
        "toml" => RuleConfig::from_toml(content).map_err(|e| e.to_string()),
        "json" => RuleConfig::from_json(content).map_err(|e| e.to_string()),
        _ => RuleConfig::from_toml(content)
            .or_else(|_| RuleConfig::from_json(content))
            .map_err(|e| e.to_string()),
    };

    parsed.map_err(|message| EngineError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleSpec;

    fn records() -> Vec<SkillDescriptor> {
        vec![
            SkillDescriptor::new("auth-jwt", "JWT Authentication").with_effort(3.0),
            SkillDescriptor::new("system-thinking", "Systems Thinking").with_effort(1.0),
        ]
    }

    fn rule_config() -> RuleConfig {
        RuleConfig {
            rules: vec![RuleSpec {
                trigger_kind: "keyword".to_string(),
                matcher: "authentication".to_string(),
                skill_refs: vec!["auth-jwt".to_string()],
                tier: "must".to_string(),
                weight: 1.0,
                urgent: false,
            }],
            baseline: vec!["system-thinking".to_string()],
        }
    }

    #[test]
    fn test_query_before_load_rejected() {
        let engine = Orchestrator::with_defaults();
        let err = engine.query(&TaskContext::new("anything"), None).unwrap_err();
        assert!(matches!(err, EngineError::NotReady));
    }

    #[test]
    fn test_load_then_query() {
        let engine = Orchestrator::with_defaults();
        engine.load(records(), rule_config()).unwrap();
        assert!(engine.is_loaded());

        let report = engine
            .query(&TaskContext::new("build user authentication API"), Some(100.0))
            .unwrap();
        assert!(report.contains("auth-jwt"));
        assert!(report.contains("system-thinking"));
    }

    #[test]
    fn test_failed_load_stays_unloaded() {
        let engine = Orchestrator::with_defaults();
        let mut bad = rule_config();
        bad.rules[0].skill_refs = vec!["ghost-skill".to_string()];

        let err = engine.load(records(), bad).unwrap_err();
        assert!(err.to_string().contains("ghost-skill"));
        assert!(!engine.is_loaded());
    }

    #[test]
    fn test_failed_reload_keeps_previous_state() {
        let engine = Orchestrator::with_defaults();
        engine.load(records(), rule_config()).unwrap();

        let mut bad = rule_config();
        bad.rules[0].tier = "mandatory".to_string();
        assert!(engine.reload(records(), bad).is_err());

        // Previous rule set still answers queries
        let report = engine
            .query(&TaskContext::new("authentication work"), None)
            .unwrap();
        assert!(report.contains("auth-jwt"));
    }

    #[test]
    fn test_query_multi_without_profiles_falls_back() {
        let engine = Orchestrator::with_defaults();
        engine.load(records(), rule_config()).unwrap();

        let single = engine
            .query(&TaskContext::new("authentication work"), None)
            .unwrap();
        let multi = engine
            .query_multi(&TaskContext::new("authentication work"), None)
            .unwrap();
        assert_eq!(single.len(), multi.len());
    }

    #[tokio::test]
    async fn test_load_from_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let corpus_path = dir.path().join("corpus.toml");
        let rules_path = dir.path().join("rules.toml");

        tokio::fs::write(
            &corpus_path,
            r#"
[[skills]]
id = "auth-jwt"
title = "JWT Authentication"

[[skills]]
id = "system-thinking"
title = "Systems Thinking"
"#,
        )
        .await
        .unwrap();

        tokio::fs::write(
            &rules_path,
            r#"
baseline = ["system-thinking"]

[[rules]]
trigger_kind = "keyword"
matcher = "authentication"
skill_refs = ["auth-jwt"]
tier = "must"
"#,
        )
        .await
        .unwrap();

        let engine = Orchestrator::with_defaults();
        engine.load_from_files(&corpus_path, &rules_path).await.unwrap();
        assert!(engine.is_loaded());
    }

    #[tokio::test]
    async fn test_missing_file_reports_path() {
        let engine = Orchestrator::with_defaults();
        let err = engine
            .load_from_files(Path::new("/nonexistent/corpus.toml"), Path::new("/nonexistent/rules.toml"))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Io { .. }));
    }
}

//! Engine Lifecycle Integration Tests
//!
//! Covers the Unloaded/Loaded state machine: queries rejected before
//! load, atomic reload behavior, and file-based loading.

use anyhow::Result;
use skill_orchestrator::{
    EngineError, Orchestrator, RuleConfig, SkillDescriptor, TaskContext,
};
use std::sync::Arc;
use tempfile::TempDir;

fn corpus_v1() -> Vec<SkillDescriptor> {
    vec![
        SkillDescriptor::new("auth-jwt", "JWT Authentication"),
        SkillDescriptor::new("system-thinking", "Systems Thinking"),
    ]
}

fn rules_v1() -> RuleConfig {
    RuleConfig::from_toml(
        r#"
baseline = ["system-thinking"]

[[rules]]
trigger_kind = "keyword"
matcher = "authentication"
skill_refs = ["auth-jwt"]
tier = "must"
"#,
    )
    .unwrap()
}

#[test]
fn test_unloaded_engine_rejects_queries() {
    let engine = Orchestrator::with_defaults();
    assert!(!engine.is_loaded());

    let err = engine
        .query(&TaskContext::new("authentication work"), None)
        .unwrap_err();
    assert!(matches!(err, EngineError::NotReady));

    let err = engine
        .query_multi(&TaskContext::new("authentication work"), None)
        .unwrap_err();
    assert!(matches!(err, EngineError::NotReady));
}

#[test]
fn test_reload_swaps_rule_set_atomically() -> Result<()> {
    let engine = Orchestrator::with_defaults();
    engine.load(corpus_v1(), rules_v1())?;

    let before = engine.query(&TaskContext::new("authentication work"), None)?;
    assert!(before.contains("auth-jwt"));

    // New rule set drops the authentication rule entirely
    let rules_v2 = RuleConfig::from_toml(
        r#"
[[rules]]
trigger_kind = "keyword"
matcher = "observability"
skill_refs = ["system-thinking"]
tier = "could"
"#,
    )?;
    engine.reload(corpus_v1(), rules_v2)?;

    let after = engine.query(&TaskContext::new("authentication work"), None)?;
    assert!(!after.contains("auth-jwt"));
    Ok(())
}

#[test]
fn test_bad_reload_keeps_serving_old_state() -> Result<()> {
    let engine = Orchestrator::with_defaults();
    engine.load(corpus_v1(), rules_v1())?;

    let broken = RuleConfig::from_toml(
        r#"
[[rules]]
trigger_kind = "keyword"
matcher = "x"
skill_refs = ["ghost-skill"]
tier = "must"
"#,
    )?;
    let err = engine.reload(corpus_v1(), broken).unwrap_err();
    assert!(err.to_string().contains("ghost-skill"));

    // Engine still Loaded, still answering with the previous rule set
    assert!(engine.is_loaded());
    let report = engine.query(&TaskContext::new("authentication work"), None)?;
    assert!(report.contains("auth-jwt"));
    Ok(())
}

#[test]
fn test_concurrent_queries_during_reload() -> Result<()> {
    let engine = Arc::new(Orchestrator::with_defaults());
    engine.load(corpus_v1(), rules_v1())?;

    let mut handles = Vec::new();
    for _ in 0..4 {
        let engine = Arc::clone(&engine);
        handles.push(std::thread::spawn(move || {
            for _ in 0..50 {
                // Every query must see a consistent snapshot: either the
                // old or the new rule set, never a half-loaded one
                let report = engine
                    .query(&TaskContext::new("authentication work"), None)
                    .expect("engine stays loaded throughout");
                assert!(report.contains("system-thinking"));
            }
        }));
    }

    for _ in 0..10 {
        engine.reload(corpus_v1(), rules_v1())?;
    }
    for handle in handles {
        handle.join().unwrap();
    }
    Ok(())
}

#[tokio::test]
async fn test_load_from_json_files() -> Result<()> {
    let dir = TempDir::new()?;
    let corpus_path = dir.path().join("corpus.json");
    let rules_path = dir.path().join("rules.json");

    tokio::fs::write(
        &corpus_path,
        r#"{
            "skills": [
                {"id": "auth-jwt", "title": "JWT Authentication", "default_effort": 2.0},
                {"id": "system-thinking", "title": "Systems Thinking"}
            ]
        }"#,
    )
    .await?;

    tokio::fs::write(
        &rules_path,
        r#"{
            "rules": [{
                "trigger_kind": "keyword",
                "matcher": "authentication",
                "skill_refs": ["auth-jwt"],
                "tier": "must"
            }],
            "baseline": ["system-thinking"]
        }"#,
    )
    .await?;

    let engine = Orchestrator::with_defaults();
    engine.load_from_files(&corpus_path, &rules_path).await?;

    let report = engine.query(&TaskContext::new("authentication service"), Some(10.0))?;
    assert!(report.contains("auth-jwt"));
    assert!(report.contains("system-thinking"));
    Ok(())
}

#[tokio::test]
async fn test_malformed_corpus_file_stays_unloaded() -> Result<()> {
    let dir = TempDir::new()?;
    let corpus_path = dir.path().join("corpus.toml");
    let rules_path = dir.path().join("rules.toml");

    // Duplicate skill ids
    tokio::fs::write(
        &corpus_path,
        r#"
[[skills]]
id = "auth-jwt"
title = "JWT Authentication"

[[skills]]
id = "auth-jwt"
title = "Duplicate"
"#,
    )
    .await?;
    tokio::fs::write(&rules_path, "rules = []\nbaseline = []\n").await?;

    let engine = Orchestrator::with_defaults();
    let err = engine
        .load_from_files(&corpus_path, &rules_path)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Corpus(_)));
    assert!(!engine.is_loaded());
    Ok(())
}

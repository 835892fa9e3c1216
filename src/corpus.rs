//! Corpus Registry
//!
//! In-memory catalog of skill descriptors. Descriptors are metadata only
//! (id, title, domain, tags, phase, effort) - document bodies are never
//! parsed by this crate. The registry is built once at load time and is
//! read-only afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Lifecycle phase a skill applies to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Planning,
    #[default]
    Development,
    Deployment,
    Maintenance,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Planning => "planning",
            Phase::Development => "development",
            Phase::Deployment => "deployment",
            Phase::Maintenance => "maintenance",
        }
    }
}

/// Immutable catalog entry for a single skill document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillDescriptor {
    /// Unique skill id (e.g. "auth-jwt")
    #[serde(default)]
    pub id: String,
    /// Human-readable title
    #[serde(default)]
    pub title: String,
    /// Category the skill belongs to (e.g. "authentication")
    #[serde(default)]
    pub domain: Option<String>,
    /// Searchable tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Lifecycle phase the skill targets
    #[serde(default)]
    pub phase: Phase,
    /// Reading/application effort, in the caller's capacity units
    #[serde(default = "default_effort")]
    pub default_effort: f64,
    /// Critical-domain flag; raises the impact signal during scoring
    #[serde(default)]
    pub critical: bool,
}

fn default_effort() -> f64 {
    1.0
}

impl SkillDescriptor {
    /// Create a minimal descriptor
    pub fn new(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            domain: None,
            tags: Vec::new(),
            phase: Phase::default(),
            default_effort: default_effort(),
            critical: false,
        }
    }

    /// Set the domain
    pub fn with_domain(mut self, domain: &str) -> Self {
        self.domain = Some(domain.to_string());
        self
    }

    /// Set the effort cost
    pub fn with_effort(mut self, effort: f64) -> Self {
        self.default_effort = effort;
        self
    }

    /// Mark the skill as belonging to a critical domain
    pub fn with_critical(mut self, critical: bool) -> Self {
        self.critical = critical;
        self
    }
}

/// A single problem found while validating corpus records
#[derive(Debug, Clone, thiserror::Error)]
pub enum CorpusIssue {
    #[error("record {index}: missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("record {index}: duplicate skill id '{id}'")]
    DuplicateId { index: usize, id: String },

    #[error("record {index} ('{id}'): effort must be non-negative, got {effort}")]
    NegativeEffort { index: usize, id: String, effort: f64 },
}

/// Aggregate corpus validation failure; collects every problem found
/// rather than stopping at the first.
#[derive(Debug, Clone)]
pub struct CorpusLoadError {
    pub issues: Vec<CorpusIssue>,
}

impl fmt::Display for CorpusLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "corpus validation failed ({} problem(s)): ", self.issues.len())?;
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", issue)?;
        }
        Ok(())
    }
}

impl std::error::Error for CorpusLoadError {}

/// Read-only catalog of all known skills
///
/// Built once from a sequence of descriptor records; `all()` preserves
/// insertion order. Lookups and iteration are pure.
#[derive(Debug, Clone)]
pub struct Registry {
    skills: Vec<SkillDescriptor>,
    index: HashMap<String, usize>,
}

impl Registry {
    /// Build a registry from descriptor records
    ///
    /// Validation is exhaustive: every missing field, duplicate id, and
    /// negative effort is reported in a single [`CorpusLoadError`].
    pub fn load(records: Vec<SkillDescriptor>) -> Result<Self, CorpusLoadError> {
        let mut issues = Vec::new();
        let mut skills = Vec::with_capacity(records.len());
        let mut index: HashMap<String, usize> = HashMap::with_capacity(records.len());

        for (i, record) in records.into_iter().enumerate() {
            if record.id.is_empty() {
                issues.push(CorpusIssue::MissingField { index: i, field: "id" });
                continue;
            }
            if record.title.is_empty() {
                issues.push(CorpusIssue::MissingField { index: i, field: "title" });
                continue;
            }
            if record.default_effort < 0.0 {
                issues.push(CorpusIssue::NegativeEffort {
                    index: i,
                    id: record.id.clone(),
                    effort: record.default_effort,
                });
                continue;
            }
            if index.contains_key(&record.id) {
                issues.push(CorpusIssue::DuplicateId { index: i, id: record.id.clone() });
                continue;
            }

            index.insert(record.id.clone(), skills.len());
            skills.push(record);
        }

        if !issues.is_empty() {
            return Err(CorpusLoadError { issues });
        }

        tracing::debug!(skills = skills.len(), "corpus registry loaded");
        Ok(Self { skills, index })
    }

    /// Look up a skill by id
    pub fn lookup(&self, id: &str) -> Option<&SkillDescriptor> {
        self.index.get(id).map(|&i| &self.skills[i])
    }

    /// Check whether a skill id exists
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// All descriptors, in insertion order
    pub fn all(&self) -> &[SkillDescriptor] {
        &self.skills
    }

    /// Number of skills in the catalog
    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

/// On-disk corpus file shape: `[[skills]]` in TOML or `{"skills": [...]}`
/// in JSON.
#[derive(Debug, Deserialize)]
pub struct CorpusFile {
    #[serde(default)]
    pub skills: Vec<SkillDescriptor>,
}

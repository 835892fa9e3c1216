//! Configuration management

use crate::scoring::ScoringWeights;
use std::path::PathBuf;

/// One additional scoring pass for multi-framework queries
#[derive(Debug, Clone)]
pub struct ScoringProfile {
    /// Framework name, used as the key in the aggregation weights
    pub name: String,
    /// Dimension weights this pass scores with
    pub weights: ScoringWeights,
    /// This framework's vote weight during aggregation
    pub vote: f64,
}

impl ScoringProfile {
    pub fn new(name: &str, weights: ScoringWeights) -> Self {
        Self {
            name: name.to_string(),
            weights,
            vote: 1.0,
        }
    }

    pub fn with_vote(mut self, vote: f64) -> Self {
        self.vote = vote;
        self
    }
}

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Dimension weights for single-pass queries (default 3/2/1)
    pub weights: ScoringWeights,
    /// Scoring passes for `query_multi`; empty means single-pass only
    pub profiles: Vec<ScoringProfile>,
    /// Corpus file path (optional, for `load_from_files`)
    pub corpus_path: Option<PathBuf>,
    /// Rule config file path (optional, for `load_from_files`)
    pub rules_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::standard(),
            profiles: Vec::new(),
            corpus_path: None,
            rules_path: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    ///
    /// Recognized variables: `SKILL_CORPUS_PATH`, `SKILL_RULES_PATH`, and
    /// `SKILL_SCORE_RELEVANCE` / `SKILL_SCORE_IMPACT` /
    /// `SKILL_SCORE_URGENCY` to override the default 3/2/1 weights.
    /// Unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        let corpus_path = std::env::var("SKILL_CORPUS_PATH").map(PathBuf::from).ok();
        let rules_path = std::env::var("SKILL_RULES_PATH").map(PathBuf::from).ok();

        let defaults = ScoringWeights::standard();
        let weights = ScoringWeights {
            relevance: env_f64("SKILL_SCORE_RELEVANCE").unwrap_or(defaults.relevance),
            impact: env_f64("SKILL_SCORE_IMPACT").unwrap_or(defaults.impact),
            urgency: env_f64("SKILL_SCORE_URGENCY").unwrap_or(defaults.urgency),
        };

        Self {
            weights,
            profiles: Vec::new(),
            corpus_path,
            rules_path,
        }
    }

    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_profile(mut self, profile: ScoringProfile) -> Self {
        self.profiles.push(profile);
        self
    }
}

fn env_f64(name: &str) -> Option<f64> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

//! Skill Orchestrator
//!
//! Rule-driven selection engine over a corpus of skill documents: given a
//! task description, it decides which skills are worth reading, ranks
//! them, and fits them into a capacity budget.
//!
//! # Features
//!
//! - **Declarative rules**: keyword/pattern/hint triggers mapped to skill
//!   references, TOML or JSON, validated exhaustively at load time
//! - **Weighted scoring**: relevance/impact/urgency dimensions with
//!   configurable weights (3/2/1 standard, 0.4/0.4/0.2 balanced)
//! - **Multi-framework aggregation**: combine several scoring profiles,
//!   detect consensus and disagreement
//! - **Budget-constrained selection**: greedy fit-if-possible over a
//!   capacity limit, with always-included baseline skills
//! - **Atomic reload**: queries snapshot the loaded state; a reload never
//!   tears an in-flight query and a failed reload keeps the old state
//!
//! # Architecture
//!
//! ```text
//! TaskContext ──► Rule Evaluator ──► Scoring Engine ──► Aggregator
//!                  (Registry +           │              (optional,
//!                   RuleSet)             ▼               multi-profile)
//!                                  CandidateScore[]          │
//!                                        │◄──────────────────┘
//!                                        ▼
//!                                 Budget Selector ──► Baseline Injector
//!                                        │
//!                                        ▼
//!                                  OrderedReport
//! ```
//!
//! # Example
//!
//! ```
//! use skill_orchestrator::{
//!     Orchestrator, RuleConfig, SkillDescriptor, TaskContext,
//! };
//!
//! let engine = Orchestrator::with_defaults();
//! engine
//!     .load(
//!         vec![
//!             SkillDescriptor::new("auth-jwt", "JWT Authentication"),
//!             SkillDescriptor::new("system-thinking", "Systems Thinking"),
//!         ],
//!         RuleConfig::from_toml(
//!             r#"
//! baseline = ["system-thinking"]
//!
//! [[rules]]
//! trigger_kind = "keyword"
//! matcher = "authentication"
//! skill_refs = ["auth-jwt"]
//! tier = "must"
//! "#,
//!         )
//!         .unwrap(),
//!     )
//!     .unwrap();
//!
//! let report = engine
//!     .query(&TaskContext::new("build user authentication API"), Some(100.0))
//!     .unwrap();
//! assert!(report.contains("auth-jwt"));
//! assert!(report.contains("system-thinking"));
//! ```

pub mod aggregator;
pub mod config;
pub mod corpus;
pub mod engine;
pub mod evaluator;
pub mod report;
pub mod rules;
pub mod scoring;
pub mod selector;

pub use aggregator::{combine, consensus, variance, FrameworkScores};
pub use config::{EngineConfig, ScoringProfile};
pub use corpus::{CorpusIssue, CorpusLoadError, Phase, Registry, SkillDescriptor};
pub use engine::{EngineError, Orchestrator};
pub use evaluator::{evaluate, MatchedRule, TaskContext};
pub use report::{assemble, OrderedReport, ReportEntry};
pub use rules::{Rule, RuleConfig, RuleConfigError, RuleIssue, RuleSet, Tier, Trigger};
pub use scoring::{score, CandidateScore, ScoringWeights};
pub use selector::{inject_baseline, select, Selection, SelectionResult};

//! feedback-insights - Business Insight Aggregation Engine
//!
//! Takes a batch of feedback that an upstream stage has already labelled
//! (sentiment, topic, optionally emotion) and turns it into what a business
//! owner acts on: which problems customers hit, how many, how bad, what it
//! risks, and what to do about it.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use feedback_insights::{ingest, EngineConfig, InsightEngine, LlmProvider};
//! use std::sync::Arc;
//!
//! let config = EngineConfig::load_or_default()?;
//! let provider = LlmProvider::from_env().map(|p| Arc::new(p) as _);
//! let engine = InsightEngine::with_provider(config, provider);
//!
//! let batch = ingest::load_file(&path)?;
//! let bundle = engine.analyze_ingested(batch).await;
//! ```
//!
//! # Architecture
//!
//! ```text
//! records ──► classifier ──► aggregator ──┬─► summary ─────────┐
//!               (ruleset)                 └─► recommendations ─┴─► InsightBundle
//!                                               (provider | templates)
//! ```

pub mod aggregator;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod ingest;
pub mod llm;
pub mod recommend;
pub mod ruleset;
pub mod summary;
pub mod types;

// Core types
pub use config::{EngineConfig, RiskThresholds};
pub use engine::InsightEngine;
pub use error::{InsightError, ProviderError};
pub use types::*;

// Pipeline stages
pub use aggregator::{aggregate, rank_reports, uncategorized};
pub use classifier::{Classifications, ProblemClassifier};
pub use ruleset::{find_category, ruleset, ProblemCategory};
pub use summary::{
    business_risk_level, churn_risk, positive_strengths, problem_summary, sentiment_alerts, summarize,
};

// Recommendations
pub use llm::{LlmConfig, LlmProvider};
pub use recommend::{fallback_recommendations, RecommendationEngine, RecommendationProvider};

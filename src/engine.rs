//! The insight engine: one batch in, one bundle out
//!
//! ```rust,ignore
//! let engine = InsightEngine::new(EngineConfig::default());
//! let outcome = ingest::load_file(&path)?;
//! let bundle = engine.analyze_ingested(outcome).await;
//! println!("{}", serde_json::to_string_pretty(&bundle)?);
//! ```

use crate::aggregator;
use crate::classifier::ProblemClassifier;
use crate::config::EngineConfig;
use crate::fingerprint::batch_fingerprint;
use crate::ingest::IngestOutcome;
use crate::recommend::{RecommendationEngine, RecommendationProvider};
use crate::ruleset::{ruleset, ProblemCategory};
use crate::summary;
use crate::types::{FeedbackRecord, InsightBundle, SkippedRecord};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

pub struct InsightEngine {
    config: EngineConfig,
    categories: &'static [ProblemCategory],
    classifier: ProblemClassifier,
    recommender: RecommendationEngine,
}

impl InsightEngine {
    /// Engine over the built-in ruleset with template recommendations
    pub fn new(config: EngineConfig) -> Self {
        Self::with_provider(config, None)
    }

    pub fn with_provider(
        config: EngineConfig,
        provider: Option<Arc<dyn RecommendationProvider>>,
    ) -> Self {
        let categories = ruleset();
        Self {
            classifier: ProblemClassifier::new(categories),
            recommender: RecommendationEngine::new(provider, config.clone()),
            categories,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Analyze records that were already validated
    pub async fn analyze(&self, records: Vec<FeedbackRecord>) -> InsightBundle {
        self.run(records, Vec::new()).await
    }

    /// Analyze an ingestion result, carrying its skipped rows into the bundle
    pub async fn analyze_ingested(&self, outcome: IngestOutcome) -> InsightBundle {
        self.run(outcome.records, outcome.skipped).await
    }

    async fn run(&self, records: Vec<FeedbackRecord>, skipped: Vec<SkippedRecord>) -> InsightBundle {
        let records: Arc<[FeedbackRecord]> = Arc::from(records);
        let fingerprint = batch_fingerprint(&records);

        let matches = self
            .classifier
            .classify_parallel(Arc::clone(&records), self.config.parallel_chunk_size)
            .await;

        let problem_reports = aggregator::aggregate(&records, &matches, self.categories, &self.config);
        let uncategorized = aggregator::uncategorized(&records, &matches, &self.config);
        let executive_summary = summary::summarize(&records, &problem_reports, &self.config);
        let recommendations = self.recommender.recommend(&problem_reports).await;

        tracing::info!(
            "Analyzed {} records ({} negative, {} skipped): {} problem categories, risk {}",
            records.len(),
            executive_summary.total_negative,
            skipped.len(),
            problem_reports.len(),
            executive_summary.business_risk_level
        );

        InsightBundle {
            run_id: Uuid::new_v4().to_string(),
            generated_at: Utc::now(),
            batch_fingerprint: fingerprint,
            topic_counts: aggregator::topic_counts(&records),
            emotion_counts: aggregator::emotion_counts(&records),
            problem_reports,
            uncategorized,
            executive_summary,
            recommendations: recommendations.items,
            recommendation_source: recommendations.source,
            skipped_records: skipped,
        }
    }
}

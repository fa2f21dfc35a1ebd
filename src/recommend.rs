//! Recommendation Engine
//!
//! An optional `RecommendationProvider` (usually an LLM) gets the first
//! shot. Anything short of a usable answer within the timeout drops to the
//! static category actions; provider failures never reach the caller.

use crate::aggregator::rank_reports;
use crate::config::EngineConfig;
use crate::error::ProviderError;
use crate::types::{ProblemReport, RecommendationList, RecommendationSource};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

/// Something that can turn ranked problem reports into recommendations
#[async_trait]
pub trait RecommendationProvider: Send + Sync {
    async fn generate(&self, reports: &[ProblemReport]) -> Result<Vec<String>, ProviderError>;
}

pub struct RecommendationEngine {
    provider: Option<Arc<dyn RecommendationProvider>>,
    config: EngineConfig,
}

impl RecommendationEngine {
    pub fn new(provider: Option<Arc<dyn RecommendationProvider>>, config: EngineConfig) -> Self {
        Self { provider, config }
    }

    /// Template-only engine
    pub fn fallback_only(config: EngineConfig) -> Self {
        Self::new(None, config)
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Ranked, deduplicated recommendations for these reports.
    ///
    /// Empty only when there are no reports.
    pub async fn recommend(&self, reports: &[ProblemReport]) -> RecommendationList {
        if reports.is_empty() {
            return RecommendationList::empty();
        }

        let mut ranked = reports.to_vec();
        rank_reports(&mut ranked);

        if let Some(provider) = &self.provider {
            match self.ask_provider(provider.as_ref(), &ranked).await {
                Ok(items) => {
                    tracing::debug!("Provider returned {} recommendations", items.len());
                    return RecommendationList {
                        items,
                        source: RecommendationSource::Provider,
                    };
                }
                Err(e) => {
                    tracing::warn!("Recommendation provider failed, using templates: {}", e);
                }
            }
        }

        RecommendationList {
            items: fallback_recommendations(&ranked, self.config.max_recommendations),
            source: RecommendationSource::Fallback,
        }
    }

    async fn ask_provider(
        &self,
        provider: &dyn RecommendationProvider,
        ranked: &[ProblemReport],
    ) -> Result<Vec<String>, ProviderError> {
        let timeout = self.config.provider_timeout();
        let raw = tokio::time::timeout(timeout, provider.generate(ranked))
            .await
            .map_err(|_| ProviderError::Timeout {
                timeout_ms: self.config.provider_timeout_ms,
            })??;

        let items = clean_provider_output(raw, self.config.max_recommendations);
        if items.is_empty() {
            return Err(ProviderError::Malformed(
                "no usable recommendations in response".to_string(),
            ));
        }
        Ok(items)
    }
}

/// Immediate then strategic actions per report, in report order, deduped
/// by exact text and capped.
pub fn fallback_recommendations(ranked: &[ProblemReport], max: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    ranked
        .iter()
        .flat_map(|r| r.immediate_actions.iter().chain(r.strategic_actions.iter()))
        .filter(|action| seen.insert(action.as_str()))
        .take(max)
        .cloned()
        .collect()
}

/// Strip bullets and numbering, drop blanks and duplicates, cap
fn clean_provider_output(raw: Vec<String>, max: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.into_iter()
        .map(|item| strip_list_marker(&item).to_string())
        .filter(|item| !item.is_empty())
        .filter(|item| seen.insert(item.clone()))
        .take(max)
        .collect()
}

/// "- foo", "* foo", "3. foo", "3) foo" -> "foo"
pub(crate) fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    let line = line.trim_start_matches(['-', '*', '•']).trim_start();
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(stripped) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return stripped.trim();
        }
    }
    line.trim()
}

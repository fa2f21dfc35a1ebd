//! LLM-backed recommendation provider
//!
//! Talks to any OpenAI-compatible chat completions endpoint; Groq by
//! default. This is the only place the crate reads the environment.

use crate::error::ProviderError;
use crate::recommend::RecommendationProvider;
use crate::types::ProblemReport;
use async_trait::async_trait;

const SYSTEM_PROMPT: &str = "You are a concise business analyst.";

/// Configuration for the chat completions provider
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// API base URL
    pub api_url: String,

    /// API key (from environment)
    pub api_key: String,

    /// Model to use (default: llama-3.1-8b-instant)
    pub model: String,

    pub temperature: f64,

    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            api_key: std::env::var("GROQ_API_KEY").unwrap_or_default(),
            model: std::env::var("GROQ_MODEL")
                .unwrap_or_else(|_| "llama-3.1-8b-instant".to_string()),
            temperature: 0.2,
            max_tokens: 512,
        }
    }
}

impl LlmConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

pub struct LlmProvider {
    client: reqwest::Client,
    config: LlmConfig,
}

impl LlmProvider {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Provider built from the environment, or `None` without an API key
    pub fn from_env() -> Option<Self> {
        let config = LlmConfig::default();
        if config.is_configured() {
            Some(Self::new(config))
        } else {
            tracing::debug!("GROQ_API_KEY not set, LLM recommendations disabled");
            None
        }
    }
}

#[async_trait]
impl RecommendationProvider for LlmProvider {
    async fn generate(&self, reports: &[ProblemReport]) -> Result<Vec<String>, ProviderError> {
        if !self.config.is_configured() {
            return Err(ProviderError::Unavailable("GROQ_API_KEY not set".to_string()));
        }

        let request_body = serde_json::json!({
            "model": self.config.model,
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": build_prompt(reports)}
            ]
        });

        let api_response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        if !api_response.status().is_success() {
            let status = api_response.status();
            let error_text = api_response.text().await.unwrap_or_default();
            return Err(ProviderError::Http(format!("{}: {}", status, error_text)));
        }

        let response_json: serde_json::Value = api_response.json().await?;
        let content = response_json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| ProviderError::Malformed("missing choices[0].message.content".to_string()))?;

        Ok(parse_recommendations(content))
    }
}

/// Build the user prompt from ranked reports
pub fn build_prompt(reports: &[ProblemReport]) -> String {
    let findings: String = reports
        .iter()
        .map(|r| {
            let quotes = r
                .sample_quotes
                .iter()
                .map(|q| format!("    \"{}\"", q))
                .collect::<Vec<_>>()
                .join("\n");
            format!(
                "- {} ({} severity): {} customers, {}% of negative feedback. Impact: {}.\n{}",
                r.category,
                r.severity,
                r.affected_count,
                r.pct_of_negative,
                r.business_impact_statement,
                quotes
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Analyze these customer feedback problem areas and provide strategic business recommendations.
Focus on business implications and actionable strategies, not on repeating the feedback.

## Problem Areas (most urgent first)
{findings}

## Instructions
Provide up to 5 recommendations, one per line, each under 30 words, covering:
1. Business process improvements
2. Operational changes needed
3. Strategic initiatives that address root causes
"#,
        findings = findings
    )
}

/// One recommendation per non-empty line; headings ending in ':' dropped
pub fn parse_recommendations(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter(|l| !l.ends_with(':'))
        .map(|l| l.trim_start_matches(['-', '*']).trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Severity, TimelineBand};

    fn report() -> ProblemReport {
        ProblemReport {
            category: "Delivery".to_string(),
            severity: Severity::High,
            affected_count: 3,
            pct_of_negative: 60.0,
            business_impact_statement: "Customer retention and satisfaction".to_string(),
            timeline_band: TimelineBand::Month,
            roi_estimate_pct: 25.0,
            projected_roi_pct: 75.0,
            prevalence: Severity::Critical,
            immediate_actions: vec![],
            strategic_actions: vec![],
            sample_quotes: vec!["arrived late".to_string()],
        }
    }

    #[test]
    fn test_prompt_mentions_reports() {
        let prompt = build_prompt(&[report()]);
        assert!(prompt.contains("Delivery (High severity): 3 customers, 60% of negative feedback"));
        assert!(prompt.contains("\"arrived late\""));
    }

    #[test]
    fn test_parse_recommendations() {
        let content = r#"
Here are my recommendations:

- Renegotiate carrier SLAs with penalties
* Add proactive delay notifications
3. Audit the returns process
"#;
        let items = parse_recommendations(content);
        assert_eq!(
            items,
            vec![
                "Renegotiate carrier SLAs with penalties",
                "Add proactive delay notifications",
                "3. Audit the returns process",
            ]
        );
    }

    #[tokio::test]
    async fn test_unconfigured_provider_is_unavailable() {
        let provider = LlmProvider::new(LlmConfig {
            api_key: String::new(),
            ..LlmConfig::default()
        });
        let result = provider.generate(&[report()]).await;
        assert!(matches!(result, Err(ProviderError::Unavailable(_))));
    }
}

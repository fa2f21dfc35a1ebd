//! Core types for the feedback insight engine
//!
//! Records come in from the upstream analysis stage, everything else is
//! derived per batch and thrown away after the bundle is emitted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Sentiment label attached upstream
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl Sentiment {
    /// Parse an upstream label, case-insensitive.
    ///
    /// Accepts the plain names, their short forms, and the `label_N`
    /// outputs of three-way sentiment classifiers. Returns `None` for
    /// anything else, including the empty string.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "positive" | "pos" | "label_2" => Some(Sentiment::Positive),
            "negative" | "neg" | "label_0" => Some(Sentiment::Negative),
            "neutral" | "neu" | "label_1" => Some(Sentiment::Neutral),
            _ => None,
        }
    }
}

/// One analyzed piece of customer feedback
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedbackRecord {
    pub id: String,
    pub text: String,
    pub sentiment: Sentiment,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub emotion: Option<String>,
}

impl FeedbackRecord {
    pub fn new(id: impl Into<String>, text: impl Into<String>, sentiment: Sentiment) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            sentiment,
            topic: String::new(),
            emotion: None,
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    pub fn with_emotion(mut self, emotion: impl Into<String>) -> Self {
        self.emotion = Some(emotion.into());
        self
    }

    pub fn is_negative(&self) -> bool {
        self.sentiment == Sentiment::Negative
    }
}

/// Business priority of a problem category.
///
/// Declaration order is priority order, so `Critical < High` under `Ord`
/// and an ascending sort puts the most severe first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// How soon a category should be resolved
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TimelineBand {
    #[serde(rename = "0-7d")]
    Week,
    #[serde(rename = "0-30d")]
    Month,
    #[serde(rename = "3-12mo")]
    Quarters,
}

impl TimelineBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimelineBand::Week => "0-7d",
            TimelineBand::Month => "0-30d",
            TimelineBand::Quarters => "3-12mo",
        }
    }
}

impl fmt::Display for TimelineBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Per-category impact for one batch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProblemReport {
    pub category: String,
    pub severity: Severity,
    pub affected_count: usize,
    pub pct_of_negative: f64,
    pub business_impact_statement: String,
    pub timeline_band: TimelineBand,
    pub roi_estimate_pct: f64,
    /// Base ROI scaled by how widespread the problem is in this batch
    pub projected_roi_pct: f64,
    /// Observed spread tier; informational, ranking uses `severity`
    pub prevalence: Severity,
    pub immediate_actions: Vec<String>,
    pub strategic_actions: Vec<String>,
    pub sample_quotes: Vec<String>,
}

/// Negative records no category claimed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UncategorizedReport {
    pub affected_count: usize,
    pub pct_of_negative: f64,
    pub sample_quotes: Vec<String>,
}

/// Batch-level risk classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BusinessRiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for BusinessRiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BusinessRiskLevel::Low => "Low",
            BusinessRiskLevel::Medium => "Medium",
            BusinessRiskLevel::High => "High",
            BusinessRiskLevel::Critical => "Critical",
        };
        f.pad(s)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BrandReputationRisk {
    Low,
    Medium,
    High,
}

impl fmt::Display for BrandReputationRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BrandReputationRisk::Low => "Low",
            BrandReputationRisk::Medium => "Medium",
            BrandReputationRisk::High => "High",
        };
        f.pad(s)
    }
}

/// Executive view of one batch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutiveSummary {
    pub satisfaction_pct: f64,
    pub dissatisfaction_pct: f64,
    pub neutral_pct: f64,
    pub business_risk_level: BusinessRiskLevel,
    pub estimated_churn_risk_pct: f64,
    pub revenue_impact_statement: String,
    pub brand_reputation_risk: BrandReputationRisk,
    pub total_records: usize,
    pub total_negative: usize,
    pub critical_issue_count: usize,
    pub high_issue_count: usize,
    pub satisfaction_impact: String,
    pub key_findings: Vec<String>,
    /// Headline lines on the sentiment split
    pub sentiment_alerts: Vec<String>,
    /// What positive feedback praises most
    pub strengths: Vec<String>,
    pub problem_summary: String,
    /// Organisation-wide actions, empty when nothing is negative
    pub immediate_actions: Vec<String>,
    pub strategic_initiatives: Vec<String>,
}

/// Where the recommendation list came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationSource {
    /// The injected provider answered with a usable list
    Provider,
    /// Static category actions
    Fallback,
    /// Nothing to recommend
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationList {
    pub items: Vec<String>,
    pub source: RecommendationSource,
}

impl RecommendationList {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            source: RecommendationSource::None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A record dropped during ingestion
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkippedRecord {
    pub index: usize,
    pub reason: String,
}

/// Everything the presentation layer needs from one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightBundle {
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub batch_fingerprint: String,
    pub problem_reports: Vec<ProblemReport>,
    pub uncategorized: Option<UncategorizedReport>,
    pub executive_summary: ExecutiveSummary,
    pub recommendations: Vec<String>,
    pub recommendation_source: RecommendationSource,
    pub topic_counts: BTreeMap<String, usize>,
    pub emotion_counts: BTreeMap<String, usize>,
    pub skipped_records: Vec<SkippedRecord>,
}

/// Round to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `part / whole * 100`, one decimal, zero when `whole` is zero
pub fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round1(part as f64 / whole as f64 * 100.0)
}

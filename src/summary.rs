//! Executive Summary Generator
//!
//! The decision logic is split into small pure functions over plain numbers
//! so each threshold can be checked on its own.

use crate::classifier::normalize;
use crate::config::{EngineConfig, RiskThresholds};
use crate::types::{
    percent, round1, BrandReputationRisk, BusinessRiskLevel, ExecutiveSummary, FeedbackRecord,
    ProblemReport, Sentiment, Severity,
};

/// Satisfaction benchmark quoted in the key findings
pub const SATISFACTION_BENCHMARK_PCT: f64 = 80.0;

/// Organisation-wide actions whenever any feedback is negative
pub const ORG_IMMEDIATE_ACTIONS: [&str; 4] = [
    "Implement 24-hour response protocol for all negative feedback",
    "Create escalation matrix for critical issues requiring management intervention",
    "Establish cross-functional customer experience improvement team",
    "Deploy real-time customer feedback monitoring dashboard",
];

pub const ORG_STRATEGIC_INITIATIVES: [&str; 4] = [
    "Develop comprehensive customer experience transformation roadmap",
    "Implement predictive customer satisfaction modeling",
    "Create customer success program to proactively address issues",
    "Establish customer feedback governance with quarterly business reviews",
];

/// Praise vocabulary per strength area, checked against positive records.
/// Order breaks ties when two areas are equally praised.
const STRENGTH_AREAS: &[(&str, &[&str])] = &[
    ("Service", &["great service", "excellent service", "helpful", "friendly", "support"]),
    ("Quality", &["quality", "perfect"]),
    ("Delivery", &["fast", "quick", "delivery", "shipping", "on time"]),
    ("Website", &["easy", "simple", "website", "user-friendly"]),
    ("Pricing", &["value", "worth", "affordable", "price"]),
];

/// Summarize one batch for executives
pub fn summarize(
    records: &[FeedbackRecord],
    reports: &[ProblemReport],
    config: &EngineConfig,
) -> ExecutiveSummary {
    let total = records.len();
    let count = |s: Sentiment| records.iter().filter(|r| r.sentiment == s).count();
    let positive = count(Sentiment::Positive);
    let negative = count(Sentiment::Negative);
    let neutral = count(Sentiment::Neutral);

    let satisfaction_pct = percent(positive, total);
    let dissatisfaction_pct = percent(negative, total);
    let neutral_pct = percent(neutral, total);

    let critical_issue_count = count_severity(reports, Severity::Critical);
    let high_issue_count = count_severity(reports, Severity::High);

    let level = business_risk_level(dissatisfaction_pct, critical_issue_count, &config.risk);
    let churn = churn_risk(dissatisfaction_pct, config.churn_fraction);

    let key_findings = key_findings(
        satisfaction_pct,
        level,
        critical_issue_count,
        high_issue_count,
        reports,
    );

    let (immediate_actions, strategic_initiatives) = if negative > 0 {
        (to_strings(&ORG_IMMEDIATE_ACTIONS), to_strings(&ORG_STRATEGIC_INITIATIVES))
    } else {
        (Vec::new(), Vec::new())
    };

    ExecutiveSummary {
        satisfaction_pct,
        dissatisfaction_pct,
        neutral_pct,
        business_risk_level: level,
        estimated_churn_risk_pct: churn,
        revenue_impact_statement: revenue_impact_statement(level, churn),
        brand_reputation_risk: brand_reputation_risk(level),
        total_records: total,
        total_negative: negative,
        critical_issue_count,
        high_issue_count,
        satisfaction_impact: satisfaction_impact(reports).to_string(),
        key_findings,
        sentiment_alerts: sentiment_alerts(satisfaction_pct, dissatisfaction_pct, neutral_pct),
        strengths: positive_strengths(records),
        problem_summary: problem_summary(reports, negative),
        immediate_actions,
        strategic_initiatives,
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn count_severity(reports: &[ProblemReport], severity: Severity) -> usize {
    reports.iter().filter(|r| r.severity == severity).count()
}

/// Batch risk from dissatisfaction and the number of Critical categories.
///
/// Non-decreasing in both arguments.
pub fn business_risk_level(
    dissatisfaction_pct: f64,
    critical_reports: usize,
    thresholds: &RiskThresholds,
) -> BusinessRiskLevel {
    let has_critical = critical_reports > 0;
    if has_critical && dissatisfaction_pct >= thresholds.critical_dissatisfaction {
        BusinessRiskLevel::Critical
    } else if has_critical || dissatisfaction_pct >= thresholds.high_dissatisfaction {
        BusinessRiskLevel::High
    } else if dissatisfaction_pct >= thresholds.medium_dissatisfaction {
        BusinessRiskLevel::Medium
    } else {
        BusinessRiskLevel::Low
    }
}

/// Share of customers expected to churn, in percent, capped at 100
pub fn churn_risk(dissatisfaction_pct: f64, churn_fraction: f64) -> f64 {
    round1((dissatisfaction_pct * churn_fraction).clamp(0.0, 100.0))
}

pub fn revenue_impact_statement(level: BusinessRiskLevel, churn_pct: f64) -> String {
    match level {
        BusinessRiskLevel::Critical => format!(
            "CRITICAL: Estimated {:.1}% revenue loss risk - immediate intervention required",
            churn_pct
        ),
        BusinessRiskLevel::High => format!(
            "HIGH: Estimated {:.1}% revenue loss risk - urgent action needed",
            churn_pct
        ),
        BusinessRiskLevel::Medium => format!(
            "MEDIUM: Estimated {:.1}% revenue loss risk - proactive measures recommended",
            churn_pct
        ),
        BusinessRiskLevel::Low => format!(
            "LOW: Estimated {:.1}% revenue loss risk - monitor and maintain",
            churn_pct
        ),
    }
}

pub fn brand_reputation_risk(level: BusinessRiskLevel) -> BrandReputationRisk {
    match level {
        BusinessRiskLevel::Critical | BusinessRiskLevel::High => BrandReputationRisk::High,
        BusinessRiskLevel::Medium => BrandReputationRisk::Medium,
        BusinessRiskLevel::Low => BrandReputationRisk::Low,
    }
}

/// CSAT impact by how many customers the reported problems touch
pub fn satisfaction_impact(reports: &[ProblemReport]) -> &'static str {
    let affected: usize = reports.iter().map(|r| r.affected_count).sum();
    match affected {
        0 => "No significant CSAT impact identified",
        1..=4 => "MINOR: Limited problem areas with manageable CSAT impact",
        5..=9 => "MODERATE: Several problem areas impacting customer experience",
        _ => "SIGNIFICANT: Multiple problem categories affecting customer satisfaction",
    }
}

fn key_findings(
    satisfaction_pct: f64,
    level: BusinessRiskLevel,
    critical: usize,
    high: usize,
    reports: &[ProblemReport],
) -> Vec<String> {
    let mut findings = vec![
        format!("Critical Issues: {} categories require immediate attention", critical),
        format!("High Priority Issues: {} categories need urgent action", high),
        format!(
            "Total Problem Categories: {} areas affecting customer experience",
            reports.len()
        ),
        format!(
            "Customer Satisfaction: {:.1}% (Industry benchmark: {}%+)",
            satisfaction_pct, SATISFACTION_BENCHMARK_PCT
        ),
        format!("Business Risk: {} level", level),
    ];

    if let Some(top) = reports.first() {
        findings.push(format!(
            "Top Problem: {} affects {:.1}% of dissatisfied customers ({} severity, resolve within {})",
            top.category, top.pct_of_negative, top.severity, top.timeline_band
        ));
    }

    findings
}

/// Headline lines on the overall sentiment split.
///
/// At most one of the negative/positive lines fires; the neutral line is
/// independent.
pub fn sentiment_alerts(satisfaction_pct: f64, dissatisfaction_pct: f64, neutral_pct: f64) -> Vec<String> {
    let mut alerts = Vec::new();

    if dissatisfaction_pct > 50.0 {
        alerts.push(format!(
            "Critical Alert: High negative sentiment ({:.1}%) indicates urgent customer experience issues requiring immediate attention",
            dissatisfaction_pct
        ));
    } else if dissatisfaction_pct > satisfaction_pct {
        alerts.push(format!(
            "Primary concern: Negative feedback dominates ({:.1}% vs {:.1}% positive) - customer satisfaction below acceptable levels",
            dissatisfaction_pct, satisfaction_pct
        ));
    } else if satisfaction_pct > 60.0 {
        alerts.push(format!(
            "Positive trend: Strong customer satisfaction ({:.1}% positive) - maintain and scale successful practices",
            satisfaction_pct
        ));
    }

    if neutral_pct > 30.0 {
        alerts.push(format!(
            "Opportunity: High neutral sentiment ({:.1}%) suggests room for improvement to convert neutral customers to advocates",
            neutral_pct
        ));
    }

    alerts
}

/// What positive customers praise most
pub fn positive_strengths(records: &[FeedbackRecord]) -> Vec<String> {
    let positives: Vec<String> = records
        .iter()
        .filter(|r| r.sentiment == Sentiment::Positive)
        .map(|r| normalize(&r.text))
        .collect();
    if positives.is_empty() {
        return Vec::new();
    }

    let counts: Vec<(&str, usize)> = STRENGTH_AREAS
        .iter()
        .map(|(area, words)| {
            let words: Vec<String> = words.iter().map(|w| normalize(w).trim_end().to_string()).collect();
            let hits = positives
                .iter()
                .filter(|text| words.iter().any(|w| text.contains(w.as_str())))
                .count();
            (*area, hits)
        })
        .collect();

    let mut strengths = Vec::new();

    let mut top: Option<(&str, usize)> = None;
    for &(area, hits) in &counts {
        if hits > top.map_or(0, |(_, best)| best) {
            top = Some((area, hits));
        }
    }
    if let Some((area, hits)) = top {
        strengths.push(format!(
            "Key strength: {} excellence drives {:.1}% of positive feedback - scale these practices",
            area,
            percent(hits, positives.len())
        ));
    }

    let areas = counts.iter().filter(|(_, hits)| *hits > 0).count();
    if areas > 2 {
        strengths.push(format!(
            "Multiple strengths identified ({} areas) - leverage these competitive advantages in marketing and operations",
            areas
        ));
    }

    strengths
}

/// One-line digest of the problem reports, sections joined by " | "
pub fn problem_summary(reports: &[ProblemReport], total_negative: usize) -> String {
    if reports.is_empty() {
        return "No specific problems identified in negative feedback.".to_string();
    }

    let mut parts = Vec::new();

    let mut top_critical: Option<&ProblemReport> = None;
    for report in reports.iter().filter(|r| r.severity == Severity::Critical) {
        if top_critical.map_or(true, |best| report.pct_of_negative > best.pct_of_negative) {
            top_critical = Some(report);
        }
    }
    if let Some(top) = top_critical {
        parts.push(format!(
            "CRITICAL: {:.1}% of dissatisfied customers face {} issues",
            top.pct_of_negative, top.category
        ));
    }

    let high = count_severity(reports, Severity::High);
    if high > 0 {
        parts.push(format!("HIGH PRIORITY: {} problem categories require immediate attention", high));
    }

    let instances: usize = reports.iter().map(|r| r.affected_count).sum();
    parts.push(format!(
        "TOTAL IMPACT: {} problem instances across {} categories affecting {} dissatisfied customers",
        instances,
        reports.len(),
        total_negative
    ));

    parts.join(" | ")
}

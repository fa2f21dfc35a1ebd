//! Impact Aggregator: turns per-record matches into per-category reports

use crate::classifier::Classifications;
use crate::config::EngineConfig;
use crate::ruleset::ProblemCategory;
use crate::types::{percent, round1, FeedbackRecord, ProblemReport, Severity, UncategorizedReport};
use std::collections::BTreeMap;

/// Build one report per category matched at least once.
///
/// Records are walked in batch order, so sample quotes keep the order the
/// caller supplied regardless of how the matches were computed.
pub fn aggregate(
    records: &[FeedbackRecord],
    matches: &Classifications,
    categories: &[ProblemCategory],
    config: &EngineConfig,
) -> Vec<ProblemReport> {
    let total_negative = records.iter().filter(|r| r.is_negative()).count();
    if total_negative == 0 {
        return Vec::new();
    }

    let mut hits: BTreeMap<&str, Vec<&FeedbackRecord>> = BTreeMap::new();

    for (index, record) in records.iter().enumerate() {
        if !record.is_negative() {
            continue;
        }
        let Some(names) = matches.get(&index) else {
            continue;
        };
        // names is a set, so each record lands at most once per category
        for name in names {
            hits.entry(name.as_str()).or_default().push(record);
        }
    }

    let mut reports = Vec::with_capacity(hits.len());
    for (name, matched) in hits {
        let Some(category) = categories.iter().find(|c| c.name == name) else {
            tracing::warn!("Match for unknown category {:?} ignored", name);
            continue;
        };

        let affected_count = matched.len();
        let pct_of_negative = percent(affected_count, total_negative);

        reports.push(ProblemReport {
            category: category.name.clone(),
            severity: category.severity,
            affected_count,
            pct_of_negative,
            business_impact_statement: category.business_impact_statement.clone(),
            timeline_band: category.timeline_band,
            roi_estimate_pct: category.roi_estimate_pct,
            projected_roi_pct: projected_roi(category.roi_estimate_pct, pct_of_negative),
            prevalence: prevalence_tier(pct_of_negative, affected_count),
            immediate_actions: category.immediate_actions.clone(),
            strategic_actions: category.strategic_actions.clone(),
            sample_quotes: sample_quotes(&matched, config),
        });
    }

    rank_reports(&mut reports);
    reports
}

/// Negative records that matched no category, if there are any
pub fn uncategorized(
    records: &[FeedbackRecord],
    matches: &Classifications,
    config: &EngineConfig,
) -> Option<UncategorizedReport> {
    let negatives = records.iter().filter(|r| r.is_negative()).count();
    let unmatched: Vec<&FeedbackRecord> = records
        .iter()
        .enumerate()
        .filter(|(i, r)| r.is_negative() && matches.get(i).map_or(true, |m| m.is_empty()))
        .map(|(_, r)| r)
        .collect();

    if unmatched.is_empty() {
        return None;
    }

    Some(UncategorizedReport {
        affected_count: unmatched.len(),
        pct_of_negative: percent(unmatched.len(), negatives),
        sample_quotes: sample_quotes(&unmatched, config),
    })
}

/// Severity first (Critical leads), then most affected, then name
pub fn rank_reports(reports: &mut [ProblemReport]) {
    reports.sort_by(|a, b| {
        a.severity
            .cmp(&b.severity)
            .then_with(|| b.affected_count.cmp(&a.affected_count))
            .then_with(|| a.category.cmp(&b.category))
    });
}

/// How widespread a problem is within the batch
pub fn prevalence_tier(pct_of_negative: f64, affected_count: usize) -> Severity {
    if pct_of_negative >= 30.0 || affected_count >= 10 {
        Severity::Critical
    } else if pct_of_negative >= 15.0 || affected_count >= 5 {
        Severity::High
    } else if pct_of_negative >= 5.0 || affected_count >= 2 {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Base ROI scaled by spread, capped at three times the base
pub fn projected_roi(base_roi_pct: f64, pct_of_negative: f64) -> f64 {
    let multiplier = (pct_of_negative / 10.0).min(3.0);
    round1(base_roi_pct * multiplier)
}

/// Occurrences of each non-empty topic label
pub fn topic_counts(records: &[FeedbackRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        let topic = record.topic.trim();
        if !topic.is_empty() {
            *counts.entry(topic.to_string()).or_insert(0) += 1;
        }
    }
    counts
}

/// Occurrences of each non-empty emotion label, lower-cased
pub fn emotion_counts(records: &[FeedbackRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for emotion in records.iter().filter_map(|r| r.emotion.as_deref()) {
        let emotion = emotion.trim().to_lowercase();
        if !emotion.is_empty() {
            *counts.entry(emotion).or_insert(0) += 1;
        }
    }
    counts
}

fn sample_quotes(records: &[&FeedbackRecord], config: &EngineConfig) -> Vec<String> {
    records
        .iter()
        .take(config.max_sample_quotes)
        .map(|r| truncate_quote(r.text.trim(), config.quote_max_chars))
        .collect()
}

/// Cut to `max_chars` characters, ending in "..." when shortened
pub fn truncate_quote(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let cut: String = text.chars().take(keep).collect();
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ProblemClassifier;
    use crate::ruleset::ruleset;
    use crate::types::Sentiment;

    fn record(id: usize, text: &str, sentiment: Sentiment) -> FeedbackRecord {
        FeedbackRecord::new(id.to_string(), text, sentiment)
    }

    fn run(records: &[FeedbackRecord]) -> Vec<ProblemReport> {
        let matches = ProblemClassifier::default().classify_batch(records);
        aggregate(records, &matches, ruleset(), &EngineConfig::default())
    }

    #[test]
    fn test_no_negative_feedback_yields_no_reports() {
        let records = vec![
            record(0, "late delivery but fine", Sentiment::Positive),
            record(1, "ok", Sentiment::Neutral),
        ];
        assert!(run(&records).is_empty());
        assert!(run(&[]).is_empty());
    }

    #[test]
    fn test_counts_and_percentages() {
        let records = vec![
            record(0, "package arrived late", Sentiment::Negative),
            record(1, "rude staff", Sentiment::Negative),
            record(2, "delayed shipping", Sentiment::Negative),
            record(3, "the weather was bad", Sentiment::Negative),
            record(4, "great", Sentiment::Positive),
        ];
        let reports = run(&records);

        let delivery = reports.iter().find(|r| r.category == "Delivery").unwrap();
        assert_eq!(delivery.affected_count, 2);
        assert_eq!(delivery.pct_of_negative, 50.0);
        assert_eq!(delivery.projected_roi_pct, 75.0);
        assert_eq!(delivery.prevalence, Severity::Critical);

        let service = reports.iter().find(|r| r.category == "Service").unwrap();
        assert_eq!(service.affected_count, 1);
        assert_eq!(service.pct_of_negative, 25.0);
    }

    #[test]
    fn test_sample_quotes_keep_batch_order_and_cap() {
        let records: Vec<_> = (0..5)
            .map(|i| record(i, &format!("order {} arrived late", i), Sentiment::Negative))
            .collect();
        let reports = run(&records);
        assert_eq!(
            reports[0].sample_quotes,
            vec!["order 0 arrived late", "order 1 arrived late", "order 2 arrived late"]
        );
    }

    #[test]
    fn test_reports_ranked_by_severity_then_count() {
        let records = vec![
            record(0, "too expensive", Sentiment::Negative),
            record(1, "too expensive", Sentiment::Negative),
            record(2, "too expensive", Sentiment::Negative),
            record(3, "arrived broken", Sentiment::Negative),
            record(4, "rude staff", Sentiment::Negative),
            record(5, "arrived late, rude staff", Sentiment::Negative),
            record(6, "rude driver", Sentiment::Negative),
        ];
        let order: Vec<_> = run(&records).into_iter().map(|r| r.category).collect();
        // Quality is Critical; Service (3) beats Delivery (2) within High
        assert_eq!(order, vec!["Quality", "Service", "Delivery", "Pricing"]);
    }

    #[test]
    fn test_ties_break_on_name() {
        let records = vec![
            record(0, "rude staff", Sentiment::Negative),
            record(1, "arrived late", Sentiment::Negative),
        ];
        let order: Vec<_> = run(&records).into_iter().map(|r| r.category).collect();
        assert_eq!(order, vec!["Delivery", "Service"]);
    }

    #[test]
    fn test_uncategorized_bucket() {
        let records = vec![
            record(0, "arrived late", Sentiment::Negative),
            record(1, "I just did not like it", Sentiment::Negative),
            record(2, "meh", Sentiment::Neutral),
        ];
        let matches = ProblemClassifier::default().classify_batch(&records);
        let bucket = uncategorized(&records, &matches, &EngineConfig::default()).unwrap();
        assert_eq!(bucket.affected_count, 1);
        assert_eq!(bucket.pct_of_negative, 50.0);
        assert_eq!(bucket.sample_quotes, vec!["I just did not like it"]);

        let all_matched = vec![record(0, "arrived late", Sentiment::Negative)];
        let matches = ProblemClassifier::default().classify_batch(&all_matched);
        assert!(uncategorized(&all_matched, &matches, &EngineConfig::default()).is_none());
    }

    #[test]
    fn test_prevalence_tiers() {
        assert_eq!(prevalence_tier(35.0, 1), Severity::Critical);
        assert_eq!(prevalence_tier(1.0, 10), Severity::Critical);
        assert_eq!(prevalence_tier(15.0, 1), Severity::High);
        assert_eq!(prevalence_tier(4.0, 2), Severity::Medium);
        assert_eq!(prevalence_tier(1.0, 1), Severity::Low);
    }

    #[test]
    fn test_projected_roi_is_capped() {
        assert_eq!(projected_roi(25.0, 10.0), 25.0);
        assert_eq!(projected_roi(40.0, 100.0), 120.0);
        assert_eq!(projected_roi(30.0, 0.0), 0.0);
    }

    #[test]
    fn test_truncate_quote_respects_char_boundaries() {
        assert_eq!(truncate_quote("short", 10), "short");
        assert_eq!(truncate_quote("héllo wörld again", 10), "héllo w...");
    }

    #[test]
    fn test_topic_and_emotion_counts() {
        let records = vec![
            record(0, "a", Sentiment::Negative).with_topic("delivery").with_emotion("Anger"),
            record(1, "b", Sentiment::Negative).with_topic("delivery").with_emotion("anger"),
            record(2, "c", Sentiment::Positive).with_topic("").with_emotion("joy"),
        ];
        let topics = topic_counts(&records);
        assert_eq!(topics.get("delivery"), Some(&2));
        assert_eq!(topics.len(), 1);

        let emotions = emotion_counts(&records);
        assert_eq!(emotions.get("anger"), Some(&2));
        assert_eq!(emotions.get("joy"), Some(&1));
    }
}

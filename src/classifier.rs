//! Problem Classifier: maps negative feedback onto problem categories
//!
//! Matching is lexical and deterministic. Text and triggers are normalized
//! the same way (lower-case, punctuation as separators, single spaces).
//! A keyword must start on a word boundary but may carry a suffix, so
//! "price" hits "prices went up" while "late" misses "chocolate". Topic
//! triggers match whole words only.

use crate::ruleset::{ruleset, ProblemCategory};
use crate::types::FeedbackRecord;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Batch position -> matched category names.
///
/// Keyed by position rather than record id so two records sharing an id
/// keep separate match sets.
pub type Classifications = BTreeMap<usize, BTreeSet<String>>;

#[derive(Debug)]
struct CompiledRule {
    name: String,
    /// Normalized with the trailing pad dropped: " late"
    keywords: Vec<String>,
    /// Normalized and fully padded: " shipping "
    topics: Vec<String>,
}

impl CompiledRule {
    fn from_category(category: &ProblemCategory) -> Self {
        Self {
            name: category.name.clone(),
            keywords: compile_triggers(&category.trigger_keywords)
                .into_iter()
                .map(|k| k.trim_end().to_string())
                .collect(),
            topics: compile_triggers(&category.trigger_topics),
        }
    }

    fn matches(&self, text: &str, topic: &str) -> bool {
        self.keywords.iter().any(|k| text.contains(k.as_str()))
            || (!topic.trim().is_empty() && self.topics.iter().any(|t| topic.contains(t.as_str())))
    }
}

fn compile_triggers(triggers: &[String]) -> Vec<String> {
    triggers
        .iter()
        .map(|t| normalize(t))
        .filter(|t| !t.trim().is_empty())
        .collect()
}

/// Lower-case, turn every non-alphanumeric char into a separator, collapse
/// runs of separators and pad both ends with a single space.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    format!(" {} ", words.join(" "))
}

/// Classifies records against a fixed set of categories.
///
/// Cheap to clone; the compiled rules are shared.
#[derive(Debug, Clone)]
pub struct ProblemClassifier {
    rules: Arc<Vec<CompiledRule>>,
}

impl Default for ProblemClassifier {
    fn default() -> Self {
        Self::new(ruleset())
    }
}

impl ProblemClassifier {
    pub fn new(categories: &[ProblemCategory]) -> Self {
        let rules = categories.iter().map(CompiledRule::from_category).collect();
        Self {
            rules: Arc::new(rules),
        }
    }

    /// Category names matched by one record.
    ///
    /// Non-negative records always yield the empty set.
    pub fn classify(&self, record: &FeedbackRecord) -> BTreeSet<String> {
        if !record.is_negative() {
            return BTreeSet::new();
        }

        let text = normalize(&record.text);
        let topic = normalize(&record.topic);

        self.rules
            .iter()
            .filter(|rule| rule.matches(&text, &topic))
            .map(|rule| rule.name.clone())
            .collect()
    }

    /// Classify a whole batch on the current thread
    pub fn classify_batch(&self, records: &[FeedbackRecord]) -> Classifications {
        self.classify_range(records, 0)
    }

    fn classify_range(&self, records: &[FeedbackRecord], offset: usize) -> Classifications {
        records
            .iter()
            .enumerate()
            .map(|(i, r)| (offset + i, self.classify(r)))
            .collect()
    }

    /// Classify a batch in chunks on the blocking pool.
    ///
    /// Chunks are independent; the merge is a single-threaded reduction
    /// into an ordered map, so the result equals `classify_batch`.
    pub async fn classify_parallel(
        &self,
        records: Arc<[FeedbackRecord]>,
        chunk_size: usize,
    ) -> Classifications {
        let chunk_size = chunk_size.max(1);
        if records.len() <= chunk_size {
            return self.classify_batch(&records);
        }

        let mut handles = Vec::new();
        for start in (0..records.len()).step_by(chunk_size) {
            let end = (start + chunk_size).min(records.len());
            let records = Arc::clone(&records);
            let classifier = self.clone();
            let handle = tokio::task::spawn_blocking(move || {
                classifier.classify_range(&records[start..end], start)
            });
            handles.push((start, end, handle));
        }

        tracing::debug!(
            "Classifying {} records in {} chunks",
            records.len(),
            handles.len()
        );

        let mut merged = Classifications::new();
        for (start, end, handle) in handles {
            match handle.await {
                Ok(chunk) => merged.extend(chunk),
                Err(e) => {
                    tracing::warn!("Classification worker failed ({}), redoing chunk inline", e);
                    merged.extend(self.classify_range(&records[start..end], start));
                }
            }
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Sentiment;

    fn negative(text: &str) -> FeedbackRecord {
        FeedbackRecord::new("r1", text, Sentiment::Negative)
    }

    fn names(set: &BTreeSet<String>) -> Vec<&str> {
        set.iter().map(|s| s.as_str()).collect()
    }

    #[test]
    fn test_normalize_collapses_whitespace_and_punctuation() {
        assert_eq!(normalize("  Arrived   LATE!!  "), " arrived late ");
        assert_eq!(normalize("hard-to-use\tsite"), " hard to use site ");
        assert_eq!(normalize(""), "  ");
    }

    #[test]
    fn test_non_negative_records_are_not_classified() {
        let classifier = ProblemClassifier::default();
        let positive = FeedbackRecord::new("p", "delivery was late", Sentiment::Positive);
        let neutral = FeedbackRecord::new("n", "delivery was late", Sentiment::Neutral);
        assert!(classifier.classify(&positive).is_empty());
        assert!(classifier.classify(&neutral).is_empty());
    }

    #[test]
    fn test_multiple_categories_match() {
        let classifier = ProblemClassifier::default();
        let matched = classifier.classify(&negative("Slow delivery and rude support staff"));
        assert!(matched.contains("Delivery"));
        assert!(matched.contains("Service"));
        assert!(matched.contains("Support"));
    }

    #[test]
    fn test_keywords_match_on_word_boundaries() {
        let classifier = ProblemClassifier::default();
        assert!(classifier.classify(&negative("The chocolate tasted odd")).is_empty());
        assert!(!classifier
            .classify(&negative("staff were unhelpful"))
            .contains("Support"));
        assert_eq!(
            names(&classifier.classify(&negative("It arrived   LATE"))),
            vec!["Delivery"]
        );
    }

    #[test]
    fn test_keywords_match_inflected_forms() {
        let classifier = ProblemClassifier::default();
        assert_eq!(
            names(&classifier.classify(&negative("Prices went up again"))),
            vec!["Pricing"]
        );
        assert_eq!(
            names(&classifier.classify(&negative("My packages never came"))),
            vec!["Delivery"]
        );
        assert!(classifier
            .classify(&negative("They were rudely dismissive"))
            .contains("Service"));
        // suffixes only, the start of the word still has to line up
        assert!(!classifier
            .classify(&negative("staff were unhelpful"))
            .contains("Support"));
    }

    #[test]
    fn test_topic_triggers_need_whole_words() {
        let classifier = ProblemClassifier::default();
        let record = negative("I am very unhappy").with_topic("apparel");
        assert!(classifier.classify(&record).is_empty());
    }

    #[test]
    fn test_batch_results_keyed_by_position() {
        let classifier = ProblemClassifier::default();
        let records = vec![
            FeedbackRecord::new("x", "arrived late", Sentiment::Negative),
            FeedbackRecord::new("x", "rude staff", Sentiment::Negative),
        ];
        let matches = classifier.classify_batch(&records);
        assert_eq!(matches.len(), 2);
        assert!(matches[&0].contains("Delivery"));
        assert_eq!(names(&matches[&1]), vec!["Service"]);
    }

    #[test]
    fn test_phrase_keywords_tolerate_whitespace() {
        let classifier = ProblemClassifier::default();
        let matched = classifier.classify(&negative("Item was NOT  as\ndescribed"));
        assert!(matched.contains("Product"));
    }

    #[test]
    fn test_topic_label_matches() {
        let classifier = ProblemClassifier::default();
        let record = negative("I am very unhappy").with_topic("Shipping Issues");
        assert_eq!(names(&classifier.classify(&record)), vec!["Delivery"]);

        let record = negative("I am very unhappy").with_topic("");
        assert!(classifier.classify(&record).is_empty());
    }

    #[test]
    fn test_classification_is_deterministic() {
        let classifier = ProblemClassifier::default();
        let record = negative("Overpriced, broken and the checkout was confusing");
        let first = classifier.classify(&record);
        for _ in 0..5 {
            assert_eq!(classifier.classify(&record), first);
        }
        let other = ProblemClassifier::default();
        assert_eq!(other.classify(&record), first);
    }

    #[tokio::test]
    async fn test_parallel_matches_sequential() {
        let classifier = ProblemClassifier::default();
        let texts = [
            "package arrived late",
            "rude staff",
            "great stuff",
            "too expensive for what it is",
            "no response from support",
            "website navigation is confusing",
        ];
        let records: Vec<FeedbackRecord> = (0..50)
            .map(|i| {
                let sentiment = if i % 3 == 0 { Sentiment::Positive } else { Sentiment::Negative };
                FeedbackRecord::new(i.to_string(), texts[i % texts.len()], sentiment)
            })
            .collect();

        let sequential = classifier.classify_batch(&records);
        let parallel = classifier
            .classify_parallel(Arc::from(records.into_boxed_slice()), 7)
            .await;
        assert_eq!(sequential, parallel);
        assert_eq!(parallel.len(), 50);
    }
}

//! Ingestion of upstream analysis output
//!
//! The upstream stage emits loosely shaped JSON rows. Rows that break the
//! input contract are skipped and counted; the rest of the batch carries on.

use crate::error::{InsightError, InsightResult};
use crate::types::{FeedbackRecord, Sentiment, SkippedRecord};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::Path;

const TEXT_KEYS: &[&str] = &["text", "feedback_text", "feedback"];
const SENTIMENT_KEYS: &[&str] = &["sentiment", "sentiment_label"];
const EMOTION_KEYS: &[&str] = &["emotion", "emotion_label"];

/// Records that passed validation plus the ones that did not
#[derive(Debug, Clone, Default)]
pub struct IngestOutcome {
    pub records: Vec<FeedbackRecord>,
    pub skipped: Vec<SkippedRecord>,
}

/// Parse a JSON array of rows
pub fn parse_rows(rows: &[Value]) -> IngestOutcome {
    let mut outcome = IngestOutcome::default();
    let mut ids = HashSet::new();

    for (index, row) in rows.iter().enumerate() {
        let parsed = parse_record(index, row).and_then(|record| {
            if ids.insert(record.id.clone()) {
                Ok(record)
            } else {
                Err(InsightError::schema(index, format!("duplicate id {:?}", record.id)))
            }
        });

        match parsed {
            Ok(record) => outcome.records.push(record),
            Err(e) => {
                tracing::warn!("Skipping malformed feedback: {}", e);
                outcome.skipped.push(SkippedRecord {
                    index,
                    reason: e.to_string(),
                });
            }
        }
    }

    if !outcome.skipped.is_empty() {
        tracing::warn!(
            "Skipped {} of {} feedback records",
            outcome.skipped.len(),
            rows.len()
        );
    }
    outcome
}

/// Parse either a JSON array or JSON Lines
pub fn parse_str(input: &str) -> InsightResult<IngestOutcome> {
    let trimmed = input.trim_start();
    if trimmed.is_empty() {
        return Ok(IngestOutcome::default());
    }

    if trimmed.starts_with('[') {
        let rows: Vec<Value> = serde_json::from_str(trimmed)?;
        return Ok(parse_rows(&rows));
    }

    // JSON Lines: a line that is not JSON still occupies an index
    let rows: Vec<Value> = input
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).unwrap_or(Value::Null))
        .collect();
    Ok(parse_rows(&rows))
}

pub fn load_file(path: &Path) -> InsightResult<IngestOutcome> {
    let raw = std::fs::read_to_string(path)?;
    parse_str(&raw)
}

fn parse_record(index: usize, row: &Value) -> InsightResult<FeedbackRecord> {
    let obj = row
        .as_object()
        .ok_or_else(|| InsightError::schema(index, "record is not a JSON object"))?;

    let text = match first_present(obj, TEXT_KEYS) {
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err(InsightError::schema(index, "text must be a string")),
        None => return Err(InsightError::schema(index, "missing required field `text`")),
    };

    let sentiment = match first_present(obj, SENTIMENT_KEYS) {
        Some(Value::String(s)) if !s.trim().is_empty() => Sentiment::from_label(s)
            .ok_or_else(|| InsightError::schema(index, format!("unknown sentiment {:?}", s)))?,
        Some(Value::String(_)) | None => {
            tracing::warn!("Record {} has no sentiment, treating as neutral", index);
            Sentiment::Neutral
        }
        Some(_) => return Err(InsightError::schema(index, "sentiment must be a string")),
    };

    let topic = match obj.get("topic") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(_) => return Err(InsightError::schema(index, "topic must be a string")),
    };

    let emotion = match first_present(obj, EMOTION_KEYS) {
        None => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(s.trim().to_string()),
        Some(_) => return Err(InsightError::schema(index, "emotion must be a string")),
    };

    let id = match obj.get("id") {
        None | Some(Value::Null) => index.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(_) => return Err(InsightError::schema(index, "id must be a string or number")),
    };

    Ok(FeedbackRecord {
        id,
        text,
        sentiment,
        topic,
        emotion,
    })
}

/// First non-null value under any of `keys`
fn first_present<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

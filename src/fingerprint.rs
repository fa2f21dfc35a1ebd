//! Batch fingerprints
//!
//! A SHA-256 over the canonical JSON of the accepted records. Two runs with
//! the same fingerprint saw the same input and must produce the same
//! reports and summary.

use crate::types::FeedbackRecord;
use sha2::{Digest, Sha256};

/// Hex SHA-256 of the batch, order-sensitive
pub fn batch_fingerprint(records: &[FeedbackRecord]) -> String {
    let mut hasher = Sha256::new();
    for record in records {
        // Serializing a plain struct of strings and enums cannot fail
        let bytes = serde_json::to_vec(record).unwrap_or_default();
        hasher.update((bytes.len() as u64).to_le_bytes());
        hasher.update(&bytes);
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Sentiment;

    fn batch() -> Vec<FeedbackRecord> {
        vec![
            FeedbackRecord::new("0", "arrived late", Sentiment::Negative).with_topic("delivery"),
            FeedbackRecord::new("1", "love it", Sentiment::Positive),
        ]
    }

    #[test]
    fn test_fingerprint_is_stable() {
        assert_eq!(batch_fingerprint(&batch()), batch_fingerprint(&batch()));
        assert_eq!(batch_fingerprint(&batch()).len(), 64);
    }

    #[test]
    fn test_fingerprint_changes_with_content_and_order() {
        let base = batch_fingerprint(&batch());

        let mut edited = batch();
        edited[1].sentiment = Sentiment::Neutral;
        assert_ne!(batch_fingerprint(&edited), base);

        let mut reversed = batch();
        reversed.reverse();
        assert_ne!(batch_fingerprint(&reversed), base);
    }

    #[test]
    fn test_empty_batch_has_fingerprint() {
        assert_eq!(
            batch_fingerprint(&[]),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}

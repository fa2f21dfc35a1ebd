//! Category Ruleset: the declarative table of problem categories
//!
//! Each row carries its own triggers and the business metadata copied onto
//! every report for that category. The classifier walks the table
//! uniformly; adding a category means adding a row here and nothing else.

use crate::types::{Severity, TimelineBand};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// A named class of customer complaint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemCategory {
    pub name: String,

    /// Words or phrases that pull a record into this category
    pub trigger_keywords: Vec<String>,

    /// Upstream topic labels that pull a record into this category
    pub trigger_topics: Vec<String>,

    pub severity: Severity,
    pub business_impact_statement: String,
    pub timeline_band: TimelineBand,

    /// Expected return on fixing the problem, in percent
    pub roi_estimate_pct: f64,

    pub immediate_actions: Vec<String>,
    pub strategic_actions: Vec<String>,
}

static RULESET: Lazy<Vec<ProblemCategory>> = Lazy::new(|| {
    vec![
        delivery(),
        quality(),
        service(),
        website(),
        pricing(),
        product(),
        support(),
    ]
});

/// The process-wide ruleset. Built on first use, never mutated.
pub fn ruleset() -> &'static [ProblemCategory] {
    &RULESET
}

/// Look up a category by name, ignoring case
pub fn find_category(name: &str) -> Option<&'static ProblemCategory> {
    ruleset().iter().find(|c| c.name.eq_ignore_ascii_case(name.trim()))
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// CATEGORY DEFINITIONS
// ============================================================================

fn delivery() -> ProblemCategory {
    ProblemCategory {
        name: "Delivery".to_string(),
        trigger_keywords: strings(&[
            "late", "delayed", "slow", "delivery", "shipping", "arrived", "tracking", "package",
        ]),
        trigger_topics: strings(&["delivery", "shipping", "shipment", "logistics"]),
        severity: Severity::High,
        business_impact_statement: "Customer retention and satisfaction".to_string(),
        timeline_band: TimelineBand::Month,
        roi_estimate_pct: 25.0,
        immediate_actions: strings(&[
            "Implement real-time delivery tracking system",
            "Establish carrier partnerships with performance SLAs",
        ]),
        strategic_actions: strings(&[
            "Create delivery notification system with ETA updates",
            "Develop delivery performance dashboard for monitoring",
        ]),
    }
}

fn quality() -> ProblemCategory {
    ProblemCategory {
        name: "Quality".to_string(),
        trigger_keywords: strings(&[
            "broken",
            "damaged",
            "poor quality",
            "defective",
            "faulty",
            "low quality",
            "substandard",
        ]),
        trigger_topics: strings(&["quality", "defect", "damage"]),
        severity: Severity::Critical,
        business_impact_statement: "Brand reputation and customer trust".to_string(),
        timeline_band: TimelineBand::Week,
        roi_estimate_pct: 30.0,
        immediate_actions: strings(&[
            "Implement supplier quality audits and certifications",
            "Establish quality control checkpoints in production",
        ]),
        strategic_actions: strings(&[
            "Create quality feedback loop with suppliers",
            "Develop quality metrics dashboard for continuous monitoring",
        ]),
    }
}

fn service() -> ProblemCategory {
    ProblemCategory {
        name: "Service".to_string(),
        trigger_keywords: strings(&[
            "rude",
            "unhelpful",
            "poor service",
            "bad service",
            "customer service",
            "unprofessional",
        ]),
        trigger_topics: strings(&["service", "staff"]),
        severity: Severity::High,
        business_impact_statement: "Customer experience and loyalty".to_string(),
        timeline_band: TimelineBand::Month,
        roi_estimate_pct: 35.0,
        immediate_actions: strings(&[
            "Implement comprehensive staff training programs",
            "Establish customer service performance metrics",
        ]),
        strategic_actions: strings(&[
            "Create escalation procedures for complex issues",
            "Develop customer service quality assurance program",
        ]),
    }
}

fn website() -> ProblemCategory {
    ProblemCategory {
        name: "Website".to_string(),
        trigger_keywords: strings(&[
            "confusing",
            "difficult",
            "hard to use",
            "website",
            "checkout",
            "navigation",
            "buggy",
            "slow",
        ]),
        trigger_topics: strings(&["website", "checkout", "app", "ux"]),
        severity: Severity::Medium,
        business_impact_statement: "Conversion rates and user experience".to_string(),
        timeline_band: TimelineBand::Month,
        roi_estimate_pct: 40.0,
        immediate_actions: strings(&[
            "Conduct comprehensive UX/UI audit and redesign",
            "Implement A/B testing for critical user flows",
        ]),
        strategic_actions: strings(&[
            "Optimize website performance and loading times",
            "Create user testing program for continuous improvement",
        ]),
    }
}

fn pricing() -> ProblemCategory {
    ProblemCategory {
        name: "Pricing".to_string(),
        trigger_keywords: strings(&[
            "expensive",
            "overpriced",
            "too expensive",
            "cost",
            "price",
            "value",
            "worth",
        ]),
        trigger_topics: strings(&["pricing", "price", "cost"]),
        severity: Severity::Low,
        business_impact_statement: "Competitive positioning and sales conversion".to_string(),
        timeline_band: TimelineBand::Quarters,
        roi_estimate_pct: 20.0,
        immediate_actions: strings(&[
            "Conduct competitive pricing analysis",
            "Develop value-based pricing strategy",
        ]),
        strategic_actions: strings(&[
            "Create pricing transparency and communication plan",
            "Implement dynamic pricing optimization",
        ]),
    }
}

fn product() -> ProblemCategory {
    ProblemCategory {
        name: "Product".to_string(),
        trigger_keywords: strings(&[
            "missing",
            "wrong",
            "incorrect",
            "not as described",
            "product",
            "incomplete",
            "defective",
        ]),
        trigger_topics: strings(&["product", "item"]),
        severity: Severity::Medium,
        business_impact_statement: "Product-market fit and customer satisfaction".to_string(),
        timeline_band: TimelineBand::Quarters,
        roi_estimate_pct: 25.0,
        immediate_actions: strings(&[
            "Enhance product descriptions and specifications",
            "Implement product quality assurance processes",
        ]),
        strategic_actions: strings(&[
            "Create customer feedback integration in product development",
            "Develop product performance monitoring system",
        ]),
    }
}

fn support() -> ProblemCategory {
    ProblemCategory {
        name: "Support".to_string(),
        trigger_keywords: strings(&[
            "no response",
            "slow response",
            "support",
            "help",
            "assistance",
            "unresponsive",
        ]),
        trigger_topics: strings(&["support", "helpdesk", "help desk"]),
        severity: Severity::High,
        business_impact_statement: "Customer satisfaction and retention".to_string(),
        timeline_band: TimelineBand::Month,
        roi_estimate_pct: 30.0,
        immediate_actions: strings(&[
            "Implement 24/7 customer support system",
            "Establish response time SLAs and monitoring",
        ]),
        strategic_actions: strings(&[
            "Create multi-channel support strategy",
            "Develop customer support analytics dashboard",
        ]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ruleset_has_all_categories() {
        let names: Vec<_> = ruleset().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Delivery", "Quality", "Service", "Website", "Pricing", "Product", "Support"]
        );

        let mut unique = names.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), names.len(), "Category names should be unique");
    }

    #[test]
    fn test_categories_have_required_fields() {
        for category in ruleset() {
            assert!(!category.trigger_keywords.is_empty(), "{} has no keywords", category.name);
            assert!(!category.trigger_topics.is_empty(), "{} has no topics", category.name);
            assert!(!category.immediate_actions.is_empty(), "{} has no immediate actions", category.name);
            assert!(!category.strategic_actions.is_empty(), "{} has no strategic actions", category.name);
            assert!(category.roi_estimate_pct > 0.0);
            assert!(!category.business_impact_statement.is_empty());
        }
    }

    #[test]
    fn test_triggers_are_lowercase() {
        for category in ruleset() {
            for trigger in category.trigger_keywords.iter().chain(&category.trigger_topics) {
                assert_eq!(trigger, &trigger.to_lowercase(), "{} trigger {:?}", category.name, trigger);
            }
        }
    }

    #[test]
    fn test_find_category_ignores_case() {
        assert_eq!(find_category("delivery").map(|c| c.severity), Some(Severity::High));
        assert_eq!(find_category(" QUALITY ").map(|c| c.severity), Some(Severity::Critical));
        assert!(find_category("weather").is_none());
    }
}

//! insights - feedback insight CLI
//!
//! Run with: insights analyze <batch.json|batch.jsonl> [--json] [--llm]

use anyhow::{Context, Result};
use feedback_insights::{
    fingerprint, ingest, ruleset, EngineConfig, InsightBundle, InsightEngine, LlmProvider,
    RecommendationProvider,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage:
  insights analyze <batch.json|batch.jsonl> [--json] [--llm] [--config=PATH] [--max-recommendations=N] [--quiet]
  insights categories [--json]
  insights fingerprint <batch>";

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let quiet = args.iter().any(|a| a == "--quiet");
    init_tracing(quiet);

    let positional = positional_args(&args);

    match positional.first().copied() {
        Some("analyze") => {
            let path = positional
                .get(1)
                .context("analyze needs a batch file\n\n".to_string() + USAGE)?;
            run_analyze(Path::new(path), &args).await
        }
        Some("categories") => run_categories(args.iter().any(|a| a == "--json")),
        Some("fingerprint") => {
            let path = positional.get(1).context("fingerprint needs a batch file")?;
            run_fingerprint(Path::new(path))
        }
        _ => {
            eprintln!("{}", USAGE);
            Ok(())
        }
    }
}

/// Non-flag arguments after the program name
fn positional_args(args: &[String]) -> Vec<&str> {
    args.iter()
        .skip(1)
        .filter(|a| !a.starts_with("--"))
        .map(|a| a.as_str())
        .collect()
}

fn init_tracing(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    let prefix = format!("--{}=", name);
    args.iter().find_map(|a| a.strip_prefix(prefix.as_str()))
}

fn load_config(args: &[String]) -> Result<EngineConfig> {
    let mut config = match flag_value(args, "config") {
        Some(path) => EngineConfig::load(&PathBuf::from(path))
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => EngineConfig::load_or_default().context("Failed to load default config")?,
    };

    if let Some(max) = flag_value(args, "max-recommendations") {
        config.max_recommendations = max
            .parse()
            .with_context(|| format!("Invalid --max-recommendations value: {}", max))?;
    }
    config.validate()?;
    Ok(config)
}

async fn run_analyze(path: &Path, args: &[String]) -> Result<()> {
    let config = load_config(args)?;
    let json_output = args.iter().any(|a| a == "--json");

    let provider: Option<Arc<dyn RecommendationProvider>> = if args.iter().any(|a| a == "--llm") {
        match LlmProvider::from_env() {
            Some(p) => Some(Arc::new(p)),
            None => {
                tracing::warn!("--llm given but GROQ_API_KEY is not set, using templates");
                None
            }
        }
    } else {
        None
    };

    let batch = ingest::load_file(path)
        .with_context(|| format!("Failed to read batch from {:?}", path))?;
    tracing::info!(
        "Loaded {} records from {:?} ({} skipped)",
        batch.records.len(),
        path,
        batch.skipped.len()
    );

    let engine = InsightEngine::with_provider(config, provider);
    let bundle = engine.analyze_ingested(batch).await;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&bundle)?);
    } else {
        print_report(&bundle);
    }
    Ok(())
}

fn run_categories(json_output: bool) -> Result<()> {
    if json_output {
        println!("{}", serde_json::to_string_pretty(ruleset())?);
        return Ok(());
    }

    for category in ruleset() {
        println!(
            "{:<10} {:<8} {:<7} ROI {:>4}%  {}",
            category.name,
            category.severity,
            category.timeline_band,
            category.roi_estimate_pct,
            category.business_impact_statement
        );
        println!("           keywords: {}", category.trigger_keywords.join(", "));
        println!("           topics:   {}", category.trigger_topics.join(", "));
    }
    Ok(())
}

fn run_fingerprint(path: &Path) -> Result<()> {
    let batch = ingest::load_file(path)
        .with_context(|| format!("Failed to read batch from {:?}", path))?;
    println!("{}", fingerprint::batch_fingerprint(&batch.records));
    Ok(())
}

fn print_report(bundle: &InsightBundle) {
    let s = &bundle.executive_summary;

    println!("\nFEEDBACK INSIGHTS");
    println!("=================");
    println!("Records analyzed: {} ({} negative)", s.total_records, s.total_negative);
    if !bundle.skipped_records.is_empty() {
        println!("Skipped records:  {}", bundle.skipped_records.len());
    }
    println!(
        "Satisfaction: {}%  Dissatisfaction: {}%  Neutral: {}%",
        s.satisfaction_pct, s.dissatisfaction_pct, s.neutral_pct
    );
    println!(
        "Business risk: {}  Brand reputation risk: {}  Churn risk: {}%",
        s.business_risk_level, s.brand_reputation_risk, s.estimated_churn_risk_pct
    );
    println!("{}", s.revenue_impact_statement);
    println!("{}", s.satisfaction_impact);
    println!("{}", s.problem_summary);
    for alert in &s.sentiment_alerts {
        println!("{}", alert);
    }

    if bundle.problem_reports.is_empty() {
        println!("\nNo problem categories identified.");
    } else {
        println!("\nPROBLEMS");
        for report in &bundle.problem_reports {
            println!(
                "  [{}] {} - {} affected ({}% of negative), fix within {}, ROI ~{}%",
                report.severity,
                report.category,
                report.affected_count,
                report.pct_of_negative,
                report.timeline_band,
                report.projected_roi_pct
            );
            for quote in &report.sample_quotes {
                println!("      \"{}\"", quote);
            }
        }
    }

    if let Some(other) = &bundle.uncategorized {
        println!(
            "  [-] Uncategorized - {} affected ({}% of negative)",
            other.affected_count, other.pct_of_negative
        );
    }

    if !bundle.recommendations.is_empty() {
        println!("\nRECOMMENDATIONS ({:?})", bundle.recommendation_source);
        for (i, rec) in bundle.recommendations.iter().enumerate() {
            println!("  {}. {}", i + 1, rec);
        }
    }

    println!("\nKEY FINDINGS");
    for finding in &s.key_findings {
        println!("  - {}", finding);
    }
    for strength in &s.strengths {
        println!("  - {}", strength);
    }

    if !s.immediate_actions.is_empty() {
        println!("\nIMMEDIATE ACTIONS");
        for action in &s.immediate_actions {
            println!("  - {}", action);
        }
        println!("\nSTRATEGIC INITIATIVES");
        for initiative in &s.strategic_initiatives {
            println!("  - {}", initiative);
        }
    }
    println!("\nbatch {}", bundle.batch_fingerprint);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_positional_args_tolerate_empty_argv() {
        assert!(positional_args(&[]).is_empty());
        assert!(positional_args(&args(&["insights"])).is_empty());
    }

    #[test]
    fn test_positional_args_skip_flags() {
        let argv = args(&["insights", "analyze", "--json", "batch.json", "--config=x.json"]);
        assert_eq!(positional_args(&argv), vec!["analyze", "batch.json"]);
        assert_eq!(flag_value(&argv, "config"), Some("x.json"));
        assert_eq!(flag_value(&argv, "max-recommendations"), None);
    }
}

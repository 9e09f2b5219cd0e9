use habitat_algo::config::Settings;
use habitat_algo::models::AnswerSet;
use habitat_algo::services::{AnthropicClient, BatchScorer, FileStore, QualityJudge, UsageTracker};
use habitat_algo::MatchPipeline;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    // Initialize logging
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level)),
        )
        .with_target(false)
        .with_level(true);

    if settings.logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting habitat matching run...");

    let answers_path = std::env::args().nth(1).unwrap_or_else(|| {
        error!("Usage: habitat-algo <answers.json>");
        std::process::exit(2);
    });

    let raw = std::fs::read_to_string(&answers_path)?;
    let answers: AnswerSet = serde_json::from_str(&raw).map_err(|e| {
        error!("Could not parse {}: {}", answers_path, e);
        std::io::Error::new(std::io::ErrorKind::InvalidData, e)
    })?;

    info!(answers = answers.len(), "Answers loaded from {}", answers_path);

    let store = FileStore::load(
        &settings.data.listings,
        &settings.data.evaluations,
        &settings.data.tags,
    )
    .map_err(|e| {
        error!("Could not load listing data: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
    })?;

    let oracle = Arc::new(AnthropicClient::new(
        settings.oracle.endpoint.clone(),
        settings.oracle.api_key.clone(),
        settings.oracle.api_version.clone(),
        settings.oracle.timeout_secs,
    ));

    let usage = Arc::new(UsageTracker::new());
    let scorer = BatchScorer::new(
        oracle.clone(),
        usage.clone(),
        settings.oracle.scoring_model.clone(),
    );
    let judge = QualityJudge::new(oracle, usage.clone(), settings.oracle.judge_model.clone());
    let pipeline = MatchPipeline::new(scorer, judge, usage.clone());

    let report = pipeline.run(&answers, store.candidates()).await;

    info!(
        total = report.total_candidates,
        admitted = report.admitted,
        scored = report.scored,
        matches = report.matches.len(),
        grade = %report.judgment.overall_grade,
        "Matching run finished"
    );

    let totals = usage.snapshot();
    let cost = usage.estimate(pipeline.runs_judged());
    info!(
        input_tokens = totals.input_tokens,
        output_tokens = totals.output_tokens,
        total_cost_usd = format!("{:.4}", cost.total_cost_usd).as_str(),
        "Token usage"
    );

    println!(
        "{}",
        serde_json::to_string_pretty(&report)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?
    );

    Ok(())
}

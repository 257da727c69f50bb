// Recommend: command-line entry point
//
// Reads a JSON request bundle (farm, climate_history, catalog, params),
// runs the engine and prints the RecommendationSet as pretty JSON.
// Usage: cargo run --features cli --bin recommend

use std::fs;
use std::path::Path;

use anyhow::Context;
use seed_recommender::{EngineConfig, RecommendationEngine, RecommendationRequest};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seed_recommender=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Configuration from environment variables
    let request_file = std::env::var("REQUEST_FILE")
        .unwrap_or_else(|_| "data/sample_request.json".to_string());
    let config_file = std::env::var("ENGINE_CONFIG").ok();

    tracing::info!("Configuration:");
    tracing::info!("  REQUEST_FILE: {}", request_file);
    tracing::info!("  ENGINE_CONFIG: {}", config_file.as_deref().unwrap_or("(defaults)"));

    let config = match &config_file {
        Some(path) => EngineConfig::load(Path::new(path))?,
        None => EngineConfig::default(),
    };

    let contents = fs::read_to_string(&request_file)
        .with_context(|| format!("Failed to read request file: {}", request_file))?;
    let request: RecommendationRequest = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse request JSON: {}", request_file))?;

    let engine = RecommendationEngine::new(config).context("Invalid engine configuration")?;
    let set = engine
        .handle(&request)
        .with_context(|| format!("Recommendation failed for farm '{}'", request.farm.id))?;

    println!("{}", serde_json::to_string_pretty(&set)?);
    Ok(())
}

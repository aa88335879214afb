pub mod config;
pub mod errors;
pub mod grounding;
pub mod llm;
pub mod pipeline;
pub mod server;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::errors::GatewayResult;
use crate::llm::handle::GatewayHandle;
use crate::pipeline::{GroundingPipeline, PipelineSettings};

pub async fn run() -> GatewayResult<()> {
    // Load .env file if present (ignore error if not found)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tars_gateway_lib=info,tower_http=info")),
        )
        .init();

    // A missing or broken config still starts the server; the gateway just stays not-ready.
    let cfg = match config::load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load config; starting with defaults");
            AppConfig::default()
        }
    };

    let gateway = Arc::new(GatewayHandle::not_ready("inference gateway starting"));
    gateway.connect(&cfg.model).await;
    let pipeline = Arc::new(GroundingPipeline::new(gateway, PipelineSettings::from(&cfg)));

    server::serve(&cfg.server, pipeline).await
}
